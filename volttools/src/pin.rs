//! One monitored analog input and its sample history

use crate::error::MeterError;
use crate::series::BoundedSeries;
use crate::Sample;

/// Shades of purple, blue, green, and yellow, cycled over freshly created
/// pins that have no persisted color.
pub const PLOT_COLORS: [u32; 8] = [
    0x9c27b0, 0x673ab7, 0x3f51b5, 0x2196f3, 0x03a9f4, 0x009688, 0x4caf50, 0xcddc39,
];

/// One physical analog input: identity, display metadata, and the series
/// of everything measured on it so far.
pub struct Pin {
    /// Board pin number
    pub number: u8,
    /// Whether the pin is drawn in the views
    pub visible: bool,
    /// User-editable label
    pub label: String,
    /// 0xRRGGBB display color, opaque to everything but the views
    pub color: u32,
    series: BoundedSeries,
}

impl Pin {
    pub fn new(number: u8, color: u32) -> Pin {
        Pin::with_meta(number, true, String::new(), color)
    }

    pub fn with_meta(number: u8, visible: bool, label: String, color: u32) -> Pin {
        Pin {
            number,
            visible,
            label,
            color,
            series: BoundedSeries::new(crate::cfg::DEFAULT_NUM_DATAPOINTS),
        }
    }

    /// Append one measurement to the series.
    pub fn push(&mut self, time: f64, voltage: f64) -> Result<(), MeterError> {
        self.series.append(time, voltage)
    }

    pub fn clear_series(&mut self) {
        self.series.clear();
    }

    pub fn set_max_datapoints(&mut self, num_datapoints: usize) {
        self.series.set_capacity(num_datapoints);
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn sample(&self, step: usize) -> Option<Sample> {
        self.series.get(step)
    }

    pub fn time(&self, step: usize) -> Option<f64> {
        self.series.get(step).map(|s| s.time)
    }

    pub fn voltage(&self, step: usize) -> Option<f64> {
        self.series.get(step).map(|s| s.voltage)
    }

    pub fn series(&self) -> &BoundedSeries {
        &self.series
    }
}

/// Pins are the same pin iff they sit on the same board number.
impl PartialEq for Pin {
    fn eq(&self, other: &Pin) -> bool {
        self.number == other.number
    }
}
