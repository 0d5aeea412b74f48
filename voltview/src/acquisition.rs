//! Periodic sampling on a dedicated acquisition thread
//!
//! The thread owns the source, the measurement clock, and all writes into
//! the pin series. It idles blocked on its control channel while paused or
//! disconnected, and waits in short slices while running so a pause or an
//! interval change lands quickly even with minute-long sample intervals.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use flume::{Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;

use volttools::cfg::{self, MeasurementUnit};
use volttools::error::MeterError;
use volttools::pin::Pin;

use crate::app::Event;
use crate::clock::MeasurementClock;
use crate::source::AnalogSource;
use crate::viewport::Viewport;

/// Longest single wait between control checks.
const SLICE: Duration = Duration::from_millis(200);

/// Control messages into the acquisition thread.
pub enum Control {
    /// Retry the source handshake after a disconnect.
    Connect,
    Start,
    Pause,
    SetInterval { interval: u32, unit: MeasurementUnit },
    Clear,
    Shutdown,
}

/// Notifications from the acquisition thread.
#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    Connected,
    Disconnected,
    Incompatible,
    /// A start was refused because no source is connected.
    NotConnected,
    Sample { elapsed: f64 },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum RunState {
    Paused,
    Running,
    Disconnected,
}

pub struct AcquisitionHandle {
    pub sender: Sender<Control>,
    pub join_handle: thread::JoinHandle<()>,
}

impl AcquisitionHandle {
    pub fn new(
        source: Box<dyn AnalogSource>,
        pins: Arc<Mutex<Vec<Pin>>>,
        viewport: Arc<Viewport>,
        interval: u32,
        unit: MeasurementUnit,
        tx_event: Sender<Event>,
    ) -> AcquisitionHandle {
        let (sender, receiver) = flume::unbounded();
        let join_handle = thread::spawn(move || {
            run(source, pins, viewport, interval, unit, receiver, tx_event);
        });
        AcquisitionHandle {
            sender,
            join_handle,
        }
    }
}

fn period(interval: u32, unit: MeasurementUnit) -> Duration {
    Duration::from_millis(interval as u64 * unit.ms_multiplier())
}

fn run(
    mut source: Box<dyn AnalogSource>,
    pins: Arc<Mutex<Vec<Pin>>>,
    viewport: Arc<Viewport>,
    mut interval: u32,
    mut unit: MeasurementUnit,
    rx: Receiver<Control>,
    tx: Sender<Event>,
) {
    let notify = |notice: Notice| {
        let _ = tx.send(Event::Acquisition(notice));
    };

    let mut state = try_connect(source.as_mut(), &notify);

    let mut clock = MeasurementClock::new();
    let mut last_mark = Instant::now();
    let mut deadline = last_mark;

    loop {
        let msg = match state {
            RunState::Running => {
                let now = Instant::now();
                if now >= deadline {
                    match measure(source.as_mut(), &pins, &viewport, &mut clock) {
                        Ok(elapsed) => {
                            notify(Notice::Sample { elapsed });
                            last_mark = now;
                            deadline = now + period(interval, unit);
                        }
                        Err(err) => {
                            // Any sampling fault counts as a lost
                            // connection; data appended so far stays.
                            state = RunState::Disconnected;
                            clock.rearm();
                            match err {
                                MeterError::Incompatible => notify(Notice::Incompatible),
                                _ => notify(Notice::Disconnected),
                            }
                        }
                    }
                    continue;
                }
                // The deadline is re-read every slice: SetInterval may
                // have moved it while we waited.
                match rx.recv_timeout(SLICE.min(deadline - now)) {
                    Ok(msg) => msg,
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            _ => match rx.recv() {
                Ok(msg) => msg,
                Err(_) => break,
            },
        };

        match msg {
            Control::Connect => {
                if state == RunState::Disconnected {
                    state = try_connect(source.as_mut(), &notify);
                }
            }
            Control::Start => {
                if state == RunState::Disconnected {
                    notify(Notice::NotConnected);
                } else {
                    state = RunState::Running;
                    // Sample immediately on start.
                    deadline = Instant::now();
                }
            }
            Control::Pause => {
                if state == RunState::Running {
                    state = RunState::Paused;
                }
                // The next resumed sample must not count the paused gap.
                clock.rearm();
            }
            Control::SetInterval {
                interval: value,
                unit: new_unit,
            } => {
                interval = value.clamp(
                    cfg::MIN_MEASUREMENT_INTERVAL,
                    cfg::MAX_MEASUREMENT_INTERVAL,
                );
                unit = new_unit;
                // The next sample keeps its cadence from the last one.
                deadline = last_mark + period(interval, unit);
            }
            Control::Clear => {
                clock.reset();
                let mut pins = pins.lock();
                for pin in pins.iter_mut() {
                    pin.clear_series();
                }
            }
            Control::Shutdown => break,
        }
    }
}

fn try_connect(source: &mut dyn AnalogSource, notify: &impl Fn(Notice)) -> RunState {
    match source.connect() {
        Ok(()) => {
            notify(Notice::Connected);
            RunState::Paused
        }
        Err(MeterError::Incompatible) => {
            notify(Notice::Incompatible);
            RunState::Disconnected
        }
        Err(_) => {
            notify(Notice::Disconnected);
            RunState::Disconnected
        }
    }
}

/// One full scan: advance the clock, read every pin, append in lockstep,
/// then let the viewport follow the new data.
fn measure(
    source: &mut dyn AnalogSource,
    pins: &Mutex<Vec<Pin>>,
    viewport: &Viewport,
    clock: &mut MeasurementClock,
) -> Result<f64, MeterError> {
    let elapsed = clock.tick(Instant::now());

    // Source reads happen outside the lock so a slow read cannot stall a
    // render in progress.
    let numbers: Vec<u8> = pins.lock().iter().map(|p| p.number).collect();
    let mut voltages = Vec::with_capacity(numbers.len());
    for number in numbers {
        voltages.push(source.read_voltage(number)?);
    }

    {
        let mut pins = pins.lock();
        for (pin, voltage) in pins.iter_mut().zip(voltages) {
            // The clock never runs backwards, so the series accepts this.
            pin.push(elapsed, voltage)?;
        }
    }
    viewport.on_new_data(elapsed);
    Ok(elapsed)
}
