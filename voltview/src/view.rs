//! Display sinks: consumers of series data and window pushes

use log::debug;

use volttools::pin::Pin;

/// One rendering surface. The chart widgets live outside this crate; the
/// demo binary ships a logging sink, tests use recording sinks.
pub trait DisplaySink {
    /// Repaint from the current series data.
    fn render(&mut self, pins: &[Pin]);
    /// The shared window moved; adopt it.
    fn set_visible_range(&mut self, min: f64, max: f64);
}

/// Headless sink that logs the newest sample of every visible pin.
pub struct LogSink {
    min: f64,
    max: f64,
}

impl LogSink {
    pub fn new(min: f64, max: f64) -> LogSink {
        LogSink { min, max }
    }
}

impl DisplaySink for LogSink {
    fn render(&mut self, pins: &[Pin]) {
        for pin in pins.iter().filter(|p| p.visible) {
            if let Some(sample) = pin.series().last() {
                debug!(
                    "v{} = {:.3} V at t = {:.2} s (window {:.2}..{:.2})",
                    pin.number, sample.voltage, sample.time, self.min, self.max
                );
            }
        }
    }

    fn set_visible_range(&mut self, min: f64, max: f64) {
        self.min = min;
        self.max = max;
    }
}
