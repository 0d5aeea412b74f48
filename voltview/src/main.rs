use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use flume::RecvTimeoutError;
use indicatif::ProgressBar;
use log::{info, warn};
use parking_lot::Mutex;

use voltview::acquisition::{AcquisitionHandle, Control, Notice};
use voltview::app::{self, App, Event};
use voltview::save::{SaveEvent, SaveHandle};
use voltview::source::SineSource;
use voltview::timer;
use voltview::view::{DisplaySink, LogSink};
use voltview::viewport::Viewport;
use voltview::Cli;
use volttools::cfg::Settings;

const GIT_VERSION: &str = git_version::git_version!(fallback = "unknown");

/// Structure of `main`
///
/// ## Threads
///
/// Three workers besides this thread:
/// - the acquisition loop, which owns the source and all series writes
/// - the export worker, which holds the output file
/// - the refresh ticker, which nudges the view while measuring
///
/// All of them report back over one event channel that this loop drains.
fn main() -> Result<()> {
    let args: Cli = argh::from_env();

    if args.version {
        println!(concat!(env!("CARGO_BIN_NAME"), " {}"), GIT_VERSION);
        return Ok(());
    }

    env_logger::init();

    // Settings are read once at startup; a missing file means defaults.
    let settings_path = PathBuf::from(&args.settings);
    let settings: Settings = match File::open(&settings_path) {
        Ok(f) => {
            serde_json::from_reader(BufReader::new(f)).context("settings file is corrupt")?
        }
        Err(_) => Settings::default(),
    };
    let settings = settings.clamped();

    let pins = Arc::new(Mutex::new(app::pins_from_settings(&settings)));
    let viewport = Arc::new(Viewport::new(
        settings.time_range,
        settings.interval_secs(),
    ));

    let (tx_event, rx_event) = flume::unbounded();

    let acquisition = AcquisitionHandle::new(
        Box::new(SineSource::new()),
        pins.clone(),
        viewport.clone(),
        settings.measurement_interval,
        settings.measurement_unit,
        tx_event.clone(),
    );
    let save = SaveHandle::new(tx_event.clone());

    let mut app = App::new(
        settings,
        PathBuf::from(&args.export_dir),
        pins.clone(),
        viewport.clone(),
        acquisition.sender.clone(),
        save.sender.clone(),
    );

    timer::main(tx_event.clone(), app.paused.clone())?;

    // One console view follows the shared window.
    let (_view_id, rx_range) = viewport.subscribe();
    let mut sink = LogSink::new(0.0, app.settings.time_range);

    let started = Instant::now();
    let run_for = Duration::from_secs(args.seconds);
    let mut progress: Option<ProgressBar> = None;
    let mut exporting = false;
    let mut export_pending = false;

    // Main loop - blocks on receiving notices, save events and ticks
    loop {
        match rx_event.recv_timeout(Duration::from_millis(250)) {
            Ok(Event::Acquisition(notice)) => {
                let just_connected = notice == Notice::Connected;
                app.on_notice(notice);
                // Measurement starts as soon as the source is up.
                if just_connected {
                    app.set_paused(false);
                }
            }
            Ok(Event::Save(SaveEvent::Progress(pct))) => {
                progress
                    .get_or_insert_with(|| ProgressBar::new(100))
                    .set_position(pct as u64);
            }
            Ok(Event::Save(SaveEvent::Done(path))) => {
                if let Some(pb) = progress.take() {
                    pb.finish_and_clear();
                }
                info!("saved {}", path.display());
                export_pending = false;
            }
            Ok(Event::Save(SaveEvent::Failed(reason))) => {
                if let Some(pb) = progress.take() {
                    pb.finish_and_clear();
                }
                warn!("export failed: {}", reason);
                export_pending = false;
            }
            Ok(Event::Refresh) => {
                // Adopt the newest window push, then repaint.
                if let Some((min, max)) = rx_range.try_iter().last() {
                    sink.set_visible_range(min, max);
                }
                sink.render(&pins.lock());
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if started.elapsed() < run_for {
            continue;
        }
        if args.export && !exporting {
            exporting = true;
            export_pending = true;
            app.start_export();
        }
        if !export_pending {
            break;
        }
    }

    app.set_paused(true);

    // Settings are written once at suspend.
    let record = app.settings_snapshot();
    let json = serde_json::to_string_pretty(&record)?;
    let f = File::create(&settings_path)
        .with_context(|| format!("cannot write {}", settings_path.display()))?;
    let mut wtr = BufWriter::new(f);
    wtr.write_all(json.as_bytes())?;

    let _ = acquisition.sender.send(Control::Shutdown);
    let _ = acquisition.join_handle.join();

    Ok(())
}
