//! Custom error types for Corsair Commander Pro devices.
//!
//! Validation failures are raised before any frame is built. Transport
//! failures are passed through from hidapi unchanged.

use thiserror::Error;

use crate::device::SequenceStep;

/// Main error type for Commander Pro operations.
#[derive(Error, Debug)]
pub enum CommanderError {
    /// Device not found during enumeration.
    #[error("Commander Pro not found. Check USB connection and permissions.")]
    DeviceNotFound,

    /// HID communication error.
    #[error("HID communication error: {0}")]
    HidError(#[from] hidapi::HidError),

    /// The transport returned fewer bytes than a full response report.
    #[error("Short read from device: got {actual} bytes, expected {expected}")]
    ShortRead { expected: usize, actual: usize },

    /// A channel, fan, thermometer or rail index outside its valid range.
    #[error("Invalid {kind} index {value}. Valid range: 0-{max}")]
    IndexOutOfRange {
        kind: &'static str,
        value: u32,
        max: u8,
    },

    /// Duty cycle value out of valid range.
    #[error("Invalid duty cycle {value}%. Valid range: {min}%-{max}%")]
    InvalidDuty { value: u32, min: u8, max: u8 },

    /// Fan speed target that does not fit in 16 bits.
    #[error("Invalid fan speed {0} RPM. Valid range: 0-65535")]
    InvalidSpeed(u32),

    /// Temperature that cannot be represented on the wire.
    #[error("Invalid temperature {0}°C. Valid range: 0-655.35°C")]
    InvalidTemperature(f64),

    /// Fan curve with the wrong number of points.
    #[error("Invalid fan curve: {0}")]
    InvalidCurve(String),

    /// Wrong number of colours for an LED effect.
    #[error("Invalid colour count {0}. Between 1 and 3 colours are required")]
    InvalidColors(usize),

    /// Generic invalid input error.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration file could not be read or parsed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The LED programming sequence stopped part-way through.
    ///
    /// The device keeps whatever was written before `step`; there is no
    /// abort command, so the channel is left partially programmed.
    #[error("LED programming failed at step {step}: {source}")]
    LedSequence {
        step: SequenceStep,
        #[source]
        source: Box<CommanderError>,
    },
}

/// Result type alias for Commander Pro operations.
pub type Result<T> = std::result::Result<T, CommanderError>;
