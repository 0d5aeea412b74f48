//! Settings persisted between runs
//!
//! One [`Settings`] value is read from disk when the app starts and written
//! back when it suspends. For concreteness the on-disk format is JSON; the
//! struct is plain serde, so anything key-value shaped works.
//!
//! Series data is deliberately not part of this: only pin metadata and the
//! measurement parameters survive a restart.

use chrono::{offset::Local, DateTime};
use serde::{Deserialize, Serialize};

pub const MIN_MEASUREMENT_INTERVAL: u32 = 5;
pub const MAX_MEASUREMENT_INTERVAL: u32 = 200;
pub const DEFAULT_MEASUREMENT_INTERVAL: u32 = 50;

pub const MIN_NUM_DATAPOINTS: usize = 1000;
pub const MAX_NUM_DATAPOINTS: usize = 10000;
pub const DEFAULT_NUM_DATAPOINTS: usize = 6000;

/// Default visible window width in seconds
pub const TIME_RANGE_DEFAULT: f64 = 5.0;

/// Which plot layout is active
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// All visible pins overlaid in one chart
    Single,
    /// One small chart per pin
    Grid,
}

/// Unit the measurement interval is counted in
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementUnit {
    Ms,
    Sec,
    Min,
}

impl MeasurementUnit {
    pub fn ms_multiplier(self) -> u64 {
        match self {
            MeasurementUnit::Ms => 1,
            MeasurementUnit::Sec => 1000,
            MeasurementUnit::Min => 60000,
        }
    }
}

impl std::fmt::Display for MeasurementUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(match self {
            MeasurementUnit::Ms => "ms",
            MeasurementUnit::Sec => "sec",
            MeasurementUnit::Min => "min",
        })
    }
}

/// Persisted display metadata for one pin. All fields are optional so a
/// hand-edited file can name only what it wants to override.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PinSettings {
    pub number: u8,
    pub visible: Option<bool>,
    pub label: Option<String>,
    pub color: Option<u32>,
}

/// Everything the app persists across restarts.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Settings {
    /// When this file was written
    pub timestamp: Option<DateTime<Local>>,
    pub view_mode: ViewMode,
    /// Interval value, counted in `measurement_unit`s
    pub measurement_interval: u32,
    pub measurement_unit: MeasurementUnit,
    /// Capacity of every pin's series
    pub num_datapoints: usize,
    /// Width of the visible window in seconds
    pub time_range: f64,
    pub settings_visible: bool,
    #[serde(default = "emptyvec", skip_serializing_if = "Vec::is_empty")]
    pub pins: Vec<PinSettings>,
}

fn emptyvec<T>() -> Vec<T> {
    Vec::new()
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            timestamp: None,
            view_mode: ViewMode::Single,
            measurement_interval: DEFAULT_MEASUREMENT_INTERVAL,
            measurement_unit: MeasurementUnit::Ms,
            num_datapoints: DEFAULT_NUM_DATAPOINTS,
            time_range: TIME_RANGE_DEFAULT,
            settings_visible: true,
            pins: Vec::new(),
        }
    }
}

impl Settings {
    /// Pull every numeric field back into its allowed window. Applied on
    /// load so a hand-edited file cannot wedge the acquisition loop.
    pub fn clamped(mut self) -> Settings {
        self.measurement_interval = self
            .measurement_interval
            .clamp(MIN_MEASUREMENT_INTERVAL, MAX_MEASUREMENT_INTERVAL);
        self.num_datapoints = self
            .num_datapoints
            .clamp(MIN_NUM_DATAPOINTS, MAX_NUM_DATAPOINTS);
        if !self.time_range.is_finite() || self.time_range <= 0.0 {
            self.time_range = TIME_RANGE_DEFAULT;
        }
        self
    }

    /// Full sample interval in milliseconds
    pub fn interval_ms(&self) -> u64 {
        self.measurement_interval as u64 * self.measurement_unit.ms_multiplier()
    }

    /// Full sample interval in seconds
    pub fn interval_secs(&self) -> f64 {
        self.interval_ms() as f64 / 1000.0
    }
}
