//! Off-thread CSV export

use std::fs;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use anyhow::{bail, Context, Result};
use chrono::Local;
use flume::Sender;
use parking_lot::Mutex;

use volttools::error::MeterError;
use volttools::pin::Pin;
use volttools::ser;

use crate::app::Event;

pub struct SaveCsv {
    pub pins: Arc<Mutex<Vec<Pin>>>,
    pub dir: PathBuf,
}

pub enum SaveMessage {
    Save(SaveCsv),
}

/// Progress and outcome of one export, reported back to the main loop.
#[derive(Clone, Debug, PartialEq)]
pub enum SaveEvent {
    Progress(u8),
    Done(PathBuf),
    Failed(String),
}

pub struct SaveHandle {
    pub sender: flume::Sender<SaveMessage>,
}

impl SaveHandle {
    pub fn new(tx_event: Sender<Event>) -> SaveHandle {
        let (sender, receiver) = flume::unbounded();
        thread::spawn(move || {
            while let Ok(msg) = receiver.recv() {
                match msg {
                    SaveMessage::Save(save) => {
                        let notify = |event: SaveEvent| {
                            let _ = tx_event.send(Event::Save(event));
                        };
                        match write_csv(&save, &notify) {
                            Ok(path) => notify(SaveEvent::Done(path)),
                            Err(e) => notify(SaveEvent::Failed(format!("{:#}", e))),
                        }
                    }
                }
            }
        });
        SaveHandle { sender }
    }
}

fn write_csv(save: &SaveCsv, notify: &impl Fn(SaveEvent)) -> Result<PathBuf> {
    {
        // Nothing to save means no file at all, not an empty one.
        let pins = save.pins.lock();
        if pins.first().map_or(0, |p| p.len()) == 0 {
            bail!(MeterError::NothingToSave);
        }
    }

    fs::create_dir_all(&save.dir).map_err(|_| MeterError::StorageUnavailable(save.dir.clone()))?;

    let mut path = save
        .dir
        .join(Local::now().format("%Y-%m-%d_%H-%M-%S").to_string());
    path.set_extension("csv");
    if path.exists() {
        bail!("export file already exists");
    }

    let file = fs::File::create(&path).context("cannot create file")?;
    let mut wtr = csv::Writer::from_writer(BufWriter::new(file));

    let pins = save.pins.lock();
    ser::csv_with_progress(&mut wtr, &pins, |pct| notify(SaveEvent::Progress(pct)))?;
    Ok(path)
}
