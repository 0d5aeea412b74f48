//! Application state and transitions, minus any rendering
//!
//! [`App`] is the presentation thread's half of the system: it owns the
//! settings, mirrors the pause/connection state, and turns user actions
//! into control messages for the worker threads.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::offset::Local;
use log::{info, warn};
use parking_lot::Mutex;

use volttools::cfg::{self, MeasurementUnit, PinSettings, Settings, ViewMode};
use volttools::pin::{Pin, PLOT_COLORS};
use volttools::PINS;

use crate::acquisition::{Control, Notice};
use crate::save::{SaveCsv, SaveEvent, SaveMessage};
use crate::viewport::Viewport;

/// Everything that can land on the main event loop.
pub enum Event {
    Acquisition(Notice),
    Save(SaveEvent),
    Refresh,
}

pub struct App {
    pub pins: Arc<Mutex<Vec<Pin>>>,
    pub viewport: Arc<Viewport>,
    pub settings: Settings,
    pub export_dir: PathBuf,
    /// Shared with the refresh ticker, which no-ops while this is set.
    pub paused: Arc<AtomicBool>,
    paused_before: bool,
    pub connected: bool,
    /// Latest measurement time, maintained from sample notices.
    pub time: f64,
    tx_acquisition: flume::Sender<Control>,
    tx_save: flume::Sender<SaveMessage>,
}

impl App {
    pub fn new(
        settings: Settings,
        export_dir: PathBuf,
        pins: Arc<Mutex<Vec<Pin>>>,
        viewport: Arc<Viewport>,
        tx_acquisition: flume::Sender<Control>,
        tx_save: flume::Sender<SaveMessage>,
    ) -> App {
        App {
            pins,
            viewport,
            settings,
            export_dir,
            paused: Arc::new(AtomicBool::new(true)),
            paused_before: true,
            connected: false,
            time: 0.0,
            tx_acquisition,
            tx_save,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    /// Ask the acquisition thread to retry the source handshake.
    pub fn reconnect(&mut self) {
        let _ = self.tx_acquisition.send(Control::Connect);
    }

    /// Pausing always works; starting needs a connected source.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused_before = self.is_paused();
        if !paused && !self.connected {
            info!("not connected");
            return;
        }
        self.paused.store(paused, Ordering::Relaxed);
        let _ = self.tx_acquisition.send(if paused {
            Control::Pause
        } else {
            Control::Start
        });
    }

    /// Undo the innermost `set_paused`, used around capacity changes and
    /// export snapshots that force a pause.
    pub fn restore_paused(&mut self) {
        let before = self.paused_before;
        self.set_paused(before);
    }

    pub fn set_measurement_interval(&mut self, interval: u32) {
        self.settings.measurement_interval = interval.clamp(
            cfg::MIN_MEASUREMENT_INTERVAL,
            cfg::MAX_MEASUREMENT_INTERVAL,
        );
        self.apply_interval();
    }

    pub fn set_measurement_unit(&mut self, unit: MeasurementUnit) {
        self.settings.measurement_unit = unit;
        self.apply_interval();
    }

    fn apply_interval(&mut self) {
        info!(
            "interval: {} {}",
            self.settings.measurement_interval, self.settings.measurement_unit
        );
        let _ = self.tx_acquisition.send(Control::SetInterval {
            interval: self.settings.measurement_interval,
            unit: self.settings.measurement_unit,
        });
        self.viewport
            .on_interval_changed(self.settings.interval_secs(), self.time);
    }

    /// Resize every pin's buffer; measurement is paused around the change.
    pub fn set_max_datapoints(&mut self, num_datapoints: usize) {
        self.set_paused(true);
        self.settings.num_datapoints =
            num_datapoints.clamp(cfg::MIN_NUM_DATAPOINTS, cfg::MAX_NUM_DATAPOINTS);
        {
            let mut pins = self.pins.lock();
            for pin in pins.iter_mut() {
                pin.set_max_datapoints(self.settings.num_datapoints);
            }
        }
        self.restore_paused();
    }

    /// Wipe all measured data and rewind the window to t=0.
    pub fn clear(&mut self) {
        self.set_paused(true);
        // The acquisition thread resets its clock and the series; ordering
        // against the pause above is guaranteed by the control channel.
        let _ = self.tx_acquisition.send(Control::Clear);
        self.time = 0.0;
        self.viewport.on_clear();
        self.restore_paused();
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        self.settings.view_mode = view_mode;
        // The newly active view may have missed pushes; give every view
        // the current window again.
        self.viewport.rebroadcast();
    }

    pub fn switch_view(&mut self) {
        let next = match self.settings.view_mode {
            ViewMode::Single => ViewMode::Grid,
            ViewMode::Grid => ViewMode::Single,
        };
        self.set_view_mode(next);
    }

    pub fn set_settings_visible(&mut self, visible: bool) {
        self.settings.settings_visible = visible;
    }

    /// Snapshot the current data to a timestamped CSV, off this thread.
    pub fn start_export(&mut self) {
        self.set_paused(true);
        let _ = self.tx_save.send(SaveMessage::Save(SaveCsv {
            pins: self.pins.clone(),
            dir: self.export_dir.clone(),
        }));
        self.restore_paused();
    }

    /// React to an acquisition notice; these carry the user-visible
    /// notifications.
    pub fn on_notice(&mut self, notice: Notice) {
        match notice {
            Notice::Connected => {
                self.connected = true;
                info!("connected");
            }
            Notice::Disconnected => {
                self.set_paused(true);
                self.connected = false;
                warn!("disconnected");
            }
            Notice::Incompatible => {
                self.set_paused(true);
                self.connected = false;
                warn!("incompatible firmware");
            }
            Notice::NotConnected => info!("not connected"),
            Notice::Sample { elapsed } => self.time = elapsed,
        }
    }

    /// The settings value to persist at suspend.
    pub fn settings_snapshot(&self) -> Settings {
        let (min, max) = self.viewport.range();
        let pins = self.pins.lock();
        Settings {
            timestamp: Some(Local::now()),
            time_range: max - min,
            pins: pins
                .iter()
                .map(|pin| PinSettings {
                    number: pin.number,
                    visible: Some(pin.visible),
                    label: Some(pin.label.clone()),
                    color: Some(pin.color),
                })
                .collect(),
            ..self.settings.clone()
        }
    }
}

/// Build the pin set from persisted metadata, cycling the palette for pins
/// seen for the first time.
pub fn pins_from_settings(settings: &Settings) -> Vec<Pin> {
    let mut color_iterator = 0;
    let mut next_color = || {
        let color = PLOT_COLORS[color_iterator % PLOT_COLORS.len()];
        color_iterator += 1;
        color
    };
    PINS.iter()
        .map(|&number| {
            let mut pin = match settings.pins.iter().find(|p| p.number == number) {
                Some(saved) => Pin::with_meta(
                    number,
                    saved.visible.unwrap_or(true),
                    saved.label.clone().unwrap_or_default(),
                    saved.color.unwrap_or_else(&mut next_color),
                ),
                None => Pin::new(number, next_color()),
            };
            pin.set_max_datapoints(settings.num_datapoints);
            pin
        })
        .collect()
}
