//! Measurement time, frozen while paused

use std::time::Instant;

/// Accumulates measurement-active time, distinct from wall-clock time.
///
/// The gap between two ticks only counts if the clock was not re-armed in
/// between. Pausing re-arms it, so the first sample after a resume
/// contributes nothing and paused wall-clock time never enters `elapsed`.
///
/// Ticks take the current `Instant` as an argument, which keeps the
/// arithmetic testable without sleeping.
#[derive(Debug)]
pub struct MeasurementClock {
    elapsed: f64,
    last_sample: Option<Instant>,
}

impl MeasurementClock {
    pub fn new() -> MeasurementClock {
        MeasurementClock {
            elapsed: 0.0,
            last_sample: None,
        }
    }

    /// Advance by the gap since the previous tick and return the total.
    pub fn tick(&mut self, now: Instant) -> f64 {
        if let Some(last) = self.last_sample {
            self.elapsed += now.duration_since(last).as_secs_f64();
        }
        self.last_sample = Some(now);
        self.elapsed
    }

    /// Forget the previous tick so the next gap is not counted.
    pub fn rearm(&mut self) {
        self.last_sample = None;
    }

    /// Back to zero, re-armed.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.last_sample = None;
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

impl Default for MeasurementClock {
    fn default() -> MeasurementClock {
        MeasurementClock::new()
    }
}
