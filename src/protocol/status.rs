//! Response parsing for status and version queries.
//!
//! Every response starts with a reserved zero byte; fields begin at byte 1.

use serde::Serialize;

use crate::protocol::commands::{FAN_COUNT, THERMOMETER_COUNT};
use crate::protocol::frame::ResponseFrame;
use crate::protocol::units::{decode_temperature, decode_voltage};

/// Offset of the first field in every response.
const OFFSET_FIELDS: usize = 1;

// =============================================================================
// Connectivity
// =============================================================================

/// Fan header state from GET_FAN_CONFIG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanConnection {
    /// Nothing connected (or auto mode with no fan detected).
    Disconnected,
    ThreePin,
    FourPin,
    /// Undocumented code, typically 0x03.
    Unknown(u8),
}

impl FanConnection {
    pub fn from_code(code: u8) -> Self {
        match code {
            0x00 => FanConnection::Disconnected,
            0x01 => FanConnection::ThreePin,
            0x02 => FanConnection::FourPin,
            other => FanConnection::Unknown(other),
        }
    }

    pub fn is_connected(self) -> bool {
        matches!(self, FanConnection::ThreePin | FanConnection::FourPin)
    }

    pub fn label(self) -> &'static str {
        match self {
            FanConnection::Disconnected => "disconnected",
            FanConnection::ThreePin => "connected (3 pins)",
            FanConnection::FourPin => "connected (4 pins)",
            FanConnection::Unknown(_) => "unknown",
        }
    }
}

/// Thermistor state from GET_THERMOMETER_CONFIG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThermometerConnection {
    Disconnected,
    Connected,
    Unknown(u8),
}

impl ThermometerConnection {
    pub fn from_code(code: u8) -> Self {
        match code {
            0x00 => ThermometerConnection::Disconnected,
            0x01 => ThermometerConnection::Connected,
            other => ThermometerConnection::Unknown(other),
        }
    }

    pub fn is_connected(self) -> bool {
        self == ThermometerConnection::Connected
    }

    pub fn label(self) -> &'static str {
        match self {
            ThermometerConnection::Disconnected => "disconnected",
            ThermometerConnection::Connected => "connected",
            ThermometerConnection::Unknown(_) => "unknown",
        }
    }
}

/// Parse a GET_FAN_CONFIG response: one code per fan in bytes 1-6.
pub fn parse_fan_config(resp: &ResponseFrame) -> [FanConnection; FAN_COUNT] {
    resp.bytes::<FAN_COUNT>(OFFSET_FIELDS)
        .map(FanConnection::from_code)
}

/// Parse a GET_THERMOMETER_CONFIG response: one code per sensor in bytes 1-4.
pub fn parse_thermometer_config(resp: &ResponseFrame) -> [ThermometerConnection; THERMOMETER_COUNT] {
    resp.bytes::<THERMOMETER_COUNT>(OFFSET_FIELDS)
        .map(ThermometerConnection::from_code)
}

/// Fan speed in RPM (bytes 1-2, big-endian).
pub fn parse_fan_speed(resp: &ResponseFrame) -> u16 {
    resp.u16_at(OFFSET_FIELDS)
}

/// Fan duty in percent (byte 1).
pub fn parse_fan_duty(resp: &ResponseFrame) -> u8 {
    resp.u8_at(OFFSET_FIELDS)
}

/// Temperature in °C (bytes 1-2, hundredths of a degree).
pub fn parse_temperature(resp: &ResponseFrame) -> f64 {
    decode_temperature(resp.u16_at(OFFSET_FIELDS))
}

/// Rail voltage in volts (bytes 1-2, millivolts).
pub fn parse_voltage(resp: &ResponseFrame) -> f64 {
    decode_voltage(resp.u16_at(OFFSET_FIELDS))
}

// =============================================================================
// Status Samples
// =============================================================================

/// Value part of a status sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatusValue {
    Text(String),
    Integer(u32),
    Float(f64),
}

impl std::fmt::Display for StatusValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusValue::Text(text) => write!(f, "{}", text),
            StatusValue::Integer(n) => write!(f, "{}", n),
            StatusValue::Float(x) => write!(f, "{:.2}", x),
        }
    }
}

/// A `(label, value, unit)` status entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSample {
    pub label: String,
    pub value: StatusValue,
    pub unit: &'static str,
}

impl StatusSample {
    pub fn text(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: StatusValue::Text(value.into()),
            unit: "",
        }
    }

    pub fn integer(label: impl Into<String>, value: u32, unit: &'static str) -> Self {
        Self {
            label: label.into(),
            value: StatusValue::Integer(value),
            unit,
        }
    }

    pub fn float(label: impl Into<String>, value: f64, unit: &'static str) -> Self {
        Self {
            label: label.into(),
            value: StatusValue::Float(value),
            unit,
        }
    }
}

impl std::fmt::Display for StatusSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.unit.is_empty() {
            write!(f, "{:<28} {}", self.label, self.value)
        } else {
            write!(f, "{:<28} {} {}", self.label, self.value, self.unit)
        }
    }
}

// =============================================================================
// Versions
// =============================================================================

/// Firmware version (`X.Y.Z`), e.g. 0x0004AD => 0.4.173.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl FirmwareVersion {
    pub fn parse(resp: &ResponseFrame) -> Self {
        let [major, minor, patch] = resp.bytes::<3>(OFFSET_FIELDS);
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl std::fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Bootloader version (`X.Y`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BootloaderVersion {
    pub major: u8,
    pub minor: u8,
}

impl BootloaderVersion {
    pub fn parse(resp: &ResponseFrame) -> Self {
        let [major, minor] = resp.bytes::<2>(OFFSET_FIELDS);
        Self { major, minor }
    }
}

impl std::fmt::Display for BootloaderVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Software id (`W.X.Y.Z`). Meaning of the parts is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SoftwareId(pub [u8; 4]);

impl SoftwareId {
    pub fn parse(resp: &ResponseFrame) -> Self {
        Self(resp.bytes::<4>(OFFSET_FIELDS))
    }
}

impl std::fmt::Display for SoftwareId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [w, x, y, z] = self.0;
        write!(f, "{}.{}.{}.{}", w, x, y, z)
    }
}

/// Identification read by `initialize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub firmware: FirmwareVersion,
    pub bootloader: BootloaderVersion,
    pub software: SoftwareId,
}

impl std::fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Firmware version   = {}", self.firmware)?;
        writeln!(f, "Bootloader version = {}", self.bootloader)?;
        write!(f, "Software version   = {}", self.software)
    }
}
