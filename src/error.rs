use std::io;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single hardware probe call.
///
/// These never reach subscribers: the scheduler recovers from every variant
/// by falling back to the last known readings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProbeError {
    #[error("Probe unavailable: {0}")]
    Unavailable(String),

    #[error("Probe timed out after {0:?}")]
    Timeout(Duration),

    #[error("Probe returned an invalid reading: {0}")]
    InvalidReading(String),
}

impl ProbeError {
    pub fn unavailable<S: Into<String>>(msg: S) -> Self {
        ProbeError::Unavailable(msg.into())
    }

    pub fn invalid_reading<S: Into<String>>(msg: S) -> Self {
        ProbeError::InvalidReading(msg.into())
    }
}

/// Custom error type for the thermwatch library
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invariant violation on {sensor}: {value} outside [{min}, {max}]")]
    InvariantViolation {
        sensor: String,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Result type alias for thermwatch
pub type Result<T> = std::result::Result<T, MonitorError>;

impl MonitorError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        MonitorError::Config(msg.into())
    }

    pub fn invariant_violation<S: Into<String>>(sensor: S, value: f64, min: f64, max: f64) -> Self {
        MonitorError::InvariantViolation {
            sensor: sensor.into(),
            value,
            min,
            max,
        }
    }
}
