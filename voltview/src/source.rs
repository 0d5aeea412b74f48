//! Acquisition sources: where voltages come from

use std::collections::VecDeque;

use volttools::error::MeterError;

/// Something that can produce a voltage per analog pin on demand.
///
/// `connect` runs once on the acquisition thread before any sampling;
/// `Err(Incompatible)` there means the firmware handshake failed. Every
/// later fault surfaces through `read_voltage` and is treated by the loop
/// as a lost connection.
pub trait AnalogSource: Send {
    fn connect(&mut self) -> Result<(), MeterError>;

    /// One voltage sample for `pin`, in volts.
    fn read_voltage(&mut self, pin: u8) -> Result<f64, MeterError>;
}

/// Deterministic demo source: a slow sine per pin, phase-shifted by pin
/// index on top of a pin-dependent offset. Stands in for the board when
/// none is attached.
pub struct SineSource {
    reads: u64,
}

impl SineSource {
    pub fn new() -> SineSource {
        SineSource { reads: 0 }
    }
}

impl Default for SineSource {
    fn default() -> SineSource {
        SineSource::new()
    }
}

impl AnalogSource for SineSource {
    fn connect(&mut self) -> Result<(), MeterError> {
        Ok(())
    }

    fn read_voltage(&mut self, pin: u8) -> Result<f64, MeterError> {
        self.reads += 1;
        let offset = pin.saturating_sub(volttools::FIRST_PIN) as f64 * 0.05;
        let phase = self.reads as f64 * 0.02 + pin as f64;
        Ok(1.65 + offset + 0.8 * phase.sin())
    }
}

/// In-memory source useful for tests and deterministic playback: pops one
/// queued voltage per read and reports a lost connection once drained.
pub struct ManualSource {
    queue: VecDeque<f64>,
}

impl ManualSource {
    pub fn new(voltages: impl IntoIterator<Item = f64>) -> ManualSource {
        ManualSource {
            queue: voltages.into_iter().collect(),
        }
    }
}

impl AnalogSource for ManualSource {
    fn connect(&mut self) -> Result<(), MeterError> {
        Ok(())
    }

    fn read_voltage(&mut self, _pin: u8) -> Result<f64, MeterError> {
        self.queue.pop_front().ok_or(MeterError::ConnectionLost)
    }
}

/// A source whose firmware handshake always fails.
pub struct IncompatibleSource;

impl AnalogSource for IncompatibleSource {
    fn connect(&mut self) -> Result<(), MeterError> {
        Err(MeterError::Incompatible)
    }

    fn read_voltage(&mut self, _pin: u8) -> Result<f64, MeterError> {
        Err(MeterError::Incompatible)
    }
}
