pub mod cfg;
pub mod error;
pub mod pin;
pub mod ser;
pub mod series;

/// One voltage measurement
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug)]
pub struct Sample {
    /// Measurement time in seconds since the series began
    pub time: f64,
    /// Measured voltage in volts
    pub voltage: f64,
}

/// First analog input pin opened on the board
pub const FIRST_PIN: u8 = 31;
/// Last analog input pin opened on the board
pub const LAST_PIN: u8 = 42;
/// Number of monitored pins
pub const NUM_PINS: usize = (LAST_PIN - FIRST_PIN + 1) as usize;

/// All monitored pin numbers in board order
pub const PINS: [u8; NUM_PINS] = [31, 32, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42];
