//! Error taxonomy shared across the workspace

use std::path::PathBuf;
use thiserror::Error;

/// Everything here is recoverable: connection faults idle the acquisition
/// loop, export faults abort the export. Nothing tears down the process.
#[derive(Debug, Error)]
pub enum MeterError {
    #[error("connection to the board lost")]
    ConnectionLost,
    #[error("board firmware is incompatible")]
    Incompatible,
    #[error("sample at t={new}s precedes newest entry at t={last}s")]
    NonMonotonicTime { last: f64, new: f64 },
    #[error("pin {pin} holds {found} samples, expected {expected}")]
    MisalignedSeries {
        pin: u8,
        expected: usize,
        found: usize,
    },
    #[error("storage directory {} is unavailable", .0.display())]
    StorageUnavailable(PathBuf),
    #[error("no samples to save")]
    NothingToSave,
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("file io failed: {0}")]
    Io(#[from] std::io::Error),
}
