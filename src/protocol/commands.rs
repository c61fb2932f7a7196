//! Command catalog for the Corsair Commander Pro.
//!
//! Protocol based on reverse-engineering from the OpenCorsairLink and liquidctl projects:
//! https://github.com/audiohacked/OpenCorsairLink/issues/70

use serde::{Deserialize, Serialize};

use crate::error::{CommanderError, Result};
use crate::protocol::frame::RequestFrame;
use crate::protocol::units::{encode_temperature, validate_duty, validate_rpm};

// =============================================================================
// Constants
// =============================================================================

/// Length of every outbound report (command frame).
pub const WRITE_LENGTH: usize = 64;

/// Length of every inbound report (response frame).
pub const READ_LENGTH: usize = 16;

/// Corsair Vendor ID.
pub const CORSAIR_VID: u16 = 0x1B1C;

/// Commander Pro Product ID.
pub const COMMANDER_PRO_PID: u16 = 0x0C10;

/// Number of fan headers.
pub const FAN_COUNT: usize = 6;

/// Number of thermistor inputs.
pub const THERMOMETER_COUNT: usize = 4;

/// Number of LED channels.
pub const CHANNEL_COUNT: usize = 2;

/// Maximum number of LED groups (fans) per LED channel.
pub const MAX_LED_GROUPS: usize = 6;

// =============================================================================
// Commands
// =============================================================================

/// One-byte command codes, grouped by subsystem.
///
/// Commands marked as unconfirmed are listed for completeness but have no
/// public operation on the device session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    // Diagnostics
    /// Device status. Unconfirmed.
    ReadStatus = 0x01,
    GetFirmwareVersion = 0x02,
    GetSoftwareId = 0x03,
    /// Unconfirmed.
    WriteDeviceId = 0x04,
    /// Unconfirmed.
    StartFirmwareUpdate = 0x05,
    GetBootloaderVersion = 0x06,
    /// Unconfirmed.
    WriteTestFlag = 0x07,

    // Temperatures
    /// Thermistor connected/disconnected flags.
    GetThermometerConfig = 0x10,
    GetTemperature = 0x11,
    /// Measure the 12V, 5V or 3.3V rail.
    GetVoltage = 0x12,

    // Fans
    /// Fan connector modes (disconnected, 3-pin, 4-pin).
    GetFanConfig = 0x20,
    GetFanSpeed = 0x21,
    GetFanSpeedPwm = 0x22,
    SetFanSpeedPercent = 0x23,
    SetFanSpeedRpm = 0x24,
    SetFanSpeedGraph = 0x25,
    /// External temperature sample for graph mode.
    SetFanTempInfo = 0x26,
    /// 3-pin force mode. Unconfirmed.
    SetFanForce = 0x27,
    /// Fan detection type.
    SetFanMode = 0x28,
    /// Unconfirmed.
    GetFanMode = 0x29,

    // LEDs
    /// LED strip mask. Response layout unknown.
    GetLedStripMask = 0x30,
    /// Unconfirmed.
    SetLedValue = 0x31,
    /// Unconfirmed.
    SetLedColourValues = 0x32,
    /// Apply LED changes.
    SetLedTrigger = 0x33,
    SetLedClear = 0x34,
    /// Per-group effect configuration.
    SetLedMode = 0x35,
    SetLedTempInfo = 0x36,
    SetLedGroupClear = 0x37,
    SetLedGroupMode = 0x38,
    SetLedBrightness = 0x39,
    /// LED count. Response layout unknown.
    GetLedCount = 0x3A,
    /// Only sent after an LED port type change. Unconfirmed.
    SetLedPortType = 0x3B,
}

impl Command {
    /// Get the wire value of this command.
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} (0x{:02X})", self, self.code())
    }
}

// =============================================================================
// Addressing
// =============================================================================

/// LED channel (physical LED data port).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    #[serde(rename = "channel_1")]
    One,
    #[serde(rename = "channel_2")]
    Two,
}

impl Channel {
    pub const ALL: [Channel; CHANNEL_COUNT] = [Channel::One, Channel::Two];

    /// Resolve a zero-based channel index.
    pub fn from_index(index: u8) -> Result<Self> {
        match index {
            0 => Ok(Channel::One),
            1 => Ok(Channel::Two),
            _ => Err(CommanderError::IndexOutOfRange {
                kind: "channel",
                value: index.into(),
                max: (CHANNEL_COUNT - 1) as u8,
            }),
        }
    }

    pub const fn id(self) -> u8 {
        match self {
            Channel::One => 0x00,
            Channel::Two => 0x01,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Channel {}", self.id() + 1)
    }
}

macro_rules! slot_index {
    ($(#[$meta:meta])* $name:ident, $kind:literal, $count:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "u8", into = "u8")]
        pub struct $name(u8);

        impl $name {
            /// Validate a zero-based index.
            pub fn new(index: u8) -> Result<Self> {
                if usize::from(index) < $count {
                    Ok(Self(index))
                } else {
                    Err(CommanderError::IndexOutOfRange {
                        kind: $kind,
                        value: index.into(),
                        max: ($count - 1) as u8,
                    })
                }
            }

            /// Every valid slot in physical enumeration order.
            pub fn all() -> impl Iterator<Item = Self> {
                (0..$count as u8).map(Self)
            }

            pub const fn index(self) -> u8 {
                self.0
            }
        }

        impl TryFrom<u8> for $name {
            type Error = CommanderError;

            fn try_from(index: u8) -> Result<Self> {
                Self::new(index)
            }
        }

        impl From<$name> for u8 {
            fn from(slot: $name) -> u8 {
                slot.0
            }
        }
    };
}

slot_index!(
    /// Fan header index (0-5 for fan 1-6), as used by speed and thermal commands.
    FanSlot,
    "fan",
    FAN_COUNT
);

slot_index!(
    /// Thermistor index (0-3 for thermometer 1-4).
    ThermometerSlot,
    "thermometer",
    THERMOMETER_COUNT
);

/// Voltage rail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoltageRail {
    Rail12V,
    Rail5V,
    Rail3V3,
}

impl VoltageRail {
    pub const ALL: [VoltageRail; 3] = [VoltageRail::Rail12V, VoltageRail::Rail5V, VoltageRail::Rail3V3];

    pub fn from_index(index: u8) -> Result<Self> {
        Self::ALL
            .get(usize::from(index))
            .copied()
            .ok_or(CommanderError::IndexOutOfRange {
                kind: "voltage rail",
                value: index.into(),
                max: 2,
            })
    }

    pub const fn id(self) -> u8 {
        match self {
            VoltageRail::Rail12V => 0,
            VoltageRail::Rail5V => 1,
            VoltageRail::Rail3V3 => 2,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            VoltageRail::Rail12V => "12V rail",
            VoltageRail::Rail5V => "5V rail",
            VoltageRail::Rail3V3 => "3.3V rail",
        }
    }
}

/// LED group byte offsets, indexed by fan slot.
///
/// Each group occupies a 12-unit stride in the LED address space.
pub const LED_GROUP_OFFSETS: [u8; MAX_LED_GROUPS] = [0x00, 0x0C, 0x18, 0x24, 0x30, 0x3C];

/// LED group (one fan's LED ring) within a channel.
///
/// This is a separate address space from [`FanSlot`]: group 4 is offset
/// 0x24, not 0x03.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedGroup {
    Fan1,
    Fan2,
    Fan3,
    Fan4,
    Fan5,
    Fan6,
}

impl LedGroup {
    pub const ALL: [LedGroup; MAX_LED_GROUPS] = [
        LedGroup::Fan1,
        LedGroup::Fan2,
        LedGroup::Fan3,
        LedGroup::Fan4,
        LedGroup::Fan5,
        LedGroup::Fan6,
    ];

    /// Byte offset of this group in the LED address space.
    pub const fn offset(self) -> u8 {
        LED_GROUP_OFFSETS[self as usize]
    }
}

impl From<FanSlot> for LedGroup {
    fn from(slot: FanSlot) -> Self {
        LedGroup::ALL[usize::from(slot.index())]
    }
}

// =============================================================================
// LED Enumerations
// =============================================================================

/// LED hardware attached to a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedType {
    Strip,
    HdFan,
    SpFan,
    MlFan,
}

impl LedType {
    pub const fn id(self) -> u8 {
        match self {
            LedType::Strip => 0x0A,
            LedType::HdFan => 0x0C,
            LedType::SpFan => 0x01,
            LedType::MlFan => 0x04,
        }
    }
}

/// LED effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    RainbowWave,
    ColourShift,
    ColourPulse,
    ColourWave,
    Static,
    /// Colour follows temperature, see `notify_led_temperature`.
    Temperature,
    Visor,
    Marquee,
    Blink,
    Sequential,
    Rainbow,
}

impl Effect {
    pub const ALL: [Effect; 11] = [
        Effect::RainbowWave,
        Effect::ColourShift,
        Effect::ColourPulse,
        Effect::ColourWave,
        Effect::Static,
        Effect::Temperature,
        Effect::Visor,
        Effect::Marquee,
        Effect::Blink,
        Effect::Sequential,
        Effect::Rainbow,
    ];

    pub const fn id(self) -> u8 {
        self as u8
    }
}

/// LED effect speed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speed {
    #[default]
    High,
    Medium,
    Slow,
}

impl Speed {
    pub const fn id(self) -> u8 {
        match self {
            Speed::High => 0x00,
            Speed::Medium => 0x01,
            Speed::Slow => 0x02,
        }
    }
}

/// LED effect direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Backward,
    #[default]
    Forward,
}

impl Direction {
    pub const fn id(self) -> u8 {
        match self {
            Direction::Backward => 0x00,
            Direction::Forward => 0x01,
        }
    }
}

/// LED colour mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColourMode {
    #[default]
    Alternating,
    /// Device picks colours; supplied colours are not transmitted.
    Random,
}

impl ColourMode {
    pub const fn id(self) -> u8 {
        match self {
            ColourMode::Alternating => 0x00,
            ColourMode::Random => 0x01,
        }
    }
}

/// Channel brightness tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Brightness {
    #[default]
    Max,
    Medium,
    Low,
    Zero,
}

impl Brightness {
    pub const fn id(self) -> u8 {
        match self {
            Brightness::Max => 0x64,
            Brightness::Medium => 0x42,
            Brightness::Low => 0x21,
            Brightness::Zero => 0x00,
        }
    }
}

// =============================================================================
// Fan Enumerations
// =============================================================================

/// Fan connector detection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanMode {
    Auto,
    ThreePin,
    FourPin,
}

impl FanMode {
    pub const fn id(self) -> u8 {
        match self {
            FanMode::Auto => 0x00,
            FanMode::ThreePin => 0x01,
            FanMode::FourPin => 0x02,
        }
    }
}

// =============================================================================
// Command Builders
// =============================================================================

/// Query frame whose only field is an index in byte 1.
fn build_indexed_query(command: Command, index: u8) -> RequestFrame {
    RequestFrame::new(command).with_u8(1, index)
}

/// Read the speed of one fan in RPM.
pub fn build_fan_speed_query(fan: FanSlot) -> RequestFrame {
    build_indexed_query(Command::GetFanSpeed, fan.index())
}

/// Read the duty of one fan in percent.
pub fn build_fan_duty_query(fan: FanSlot) -> RequestFrame {
    build_indexed_query(Command::GetFanSpeedPwm, fan.index())
}

/// Read one thermometer.
pub fn build_temperature_query(thermometer: ThermometerSlot) -> RequestFrame {
    build_indexed_query(Command::GetTemperature, thermometer.index())
}

/// Read one voltage rail.
pub fn build_voltage_query(rail: VoltageRail) -> RequestFrame {
    build_indexed_query(Command::GetVoltage, rail.id())
}

/// Read the LED strip mask of a channel.
pub fn build_led_strip_mask_query(channel: Channel) -> RequestFrame {
    build_indexed_query(Command::GetLedStripMask, channel.id())
}

/// Fixed duty: `[0x23, fan, duty]`.
///
/// # Errors
/// Returns `InvalidDuty` if `duty` is above 100%.
pub fn build_fixed_duty_cmd(fan: FanSlot, duty: u8) -> Result<RequestFrame> {
    let duty = validate_duty(duty.into())?;
    Ok(RequestFrame::new(Command::SetFanSpeedPercent)
        .with_u8(1, fan.index())
        .with_u8(2, duty))
}

/// Fixed RPM target: `[0x24, fan, rpm (u16 BE)]`.
pub fn build_fixed_rpm_cmd(fan: FanSlot, rpm: u32) -> Result<RequestFrame> {
    let rpm = validate_rpm(rpm)?;
    Ok(RequestFrame::new(Command::SetFanSpeedRpm)
        .with_u8(1, fan.index())
        .with_u16(2, rpm))
}

/// External temperature sample for graph mode: `[0x26, sensor, temp x100 (u16 BE)]`.
pub fn build_fan_temperature_info_cmd(sensor: u8, celsius: f64) -> Result<RequestFrame> {
    let raw = encode_temperature(celsius)?;
    Ok(RequestFrame::new(Command::SetFanTempInfo)
        .with_u8(1, sensor)
        .with_u16(2, raw))
}

/// Fan detection mode: `[0x28, 0x02, fan, mode]`.
pub fn build_fan_mode_cmd(fan: FanSlot, mode: FanMode) -> RequestFrame {
    RequestFrame::new(Command::SetFanMode)
        .with_u8(1, 0x02)
        .with_u8(2, fan.index())
        .with_u8(3, mode.id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_codes() {
        assert_eq!(Command::GetFirmwareVersion.code(), 0x02);
        assert_eq!(Command::SetFanSpeedGraph.code(), 0x25);
        assert_eq!(Command::SetLedGroupClear.code(), 0x37);
        assert_eq!(Command::SetLedPortType.code(), 0x3B);
    }

    #[test]
    fn test_led_group_stride() {
        let slot = FanSlot::new(3).unwrap();
        assert_eq!(LedGroup::from(slot).offset(), 0x24);
        assert_ne!(LedGroup::from(slot).offset(), slot.index());

        let offsets: Vec<u8> = FanSlot::all().map(|s| LedGroup::from(s).offset()).collect();
        assert_eq!(offsets, vec![0x00, 0x0C, 0x18, 0x24, 0x30, 0x3C]);
    }

    #[test]
    fn test_slot_ranges() {
        assert!(FanSlot::new(5).is_ok());
        assert!(FanSlot::new(6).is_err());
        assert!(ThermometerSlot::new(3).is_ok());
        assert!(ThermometerSlot::new(4).is_err());
        assert!(Channel::from_index(1).is_ok());
        assert!(Channel::from_index(2).is_err());
        assert_eq!(VoltageRail::from_index(2).unwrap(), VoltageRail::Rail3V3);
        assert!(VoltageRail::from_index(3).is_err());
        assert_eq!(FanSlot::all().count(), FAN_COUNT);
    }

    #[test]
    fn test_enum_wire_values() {
        assert_eq!(LedType::HdFan.id(), 0x0C);
        assert_eq!(LedType::MlFan.id(), 0x04);
        assert_eq!(Effect::Static.id(), 0x04);
        assert_eq!(Effect::Rainbow.id(), 0x0A);
        assert_eq!(Brightness::Medium.id(), 0x42);
        assert_eq!(ColourMode::Random.id(), 0x01);
        assert_eq!(FanMode::FourPin.id(), 0x02);
    }

    #[test]
    fn test_slot_deserialize_validates() {
        let slot: FanSlot = serde_json::from_str("2").unwrap();
        assert_eq!(slot.index(), 2);
        assert!(serde_json::from_str::<FanSlot>("6").is_err());
    }

    #[test]
    fn test_fixed_duty_cmd() {
        let cmd = build_fixed_duty_cmd(FanSlot::new(2).unwrap(), 75).unwrap();
        assert_eq!(&cmd.as_bytes()[..4], &[0x23, 0x02, 75, 0x00]);
        assert!(build_fixed_duty_cmd(FanSlot::new(2).unwrap(), 101).is_err());
    }

    #[test]
    fn test_fixed_rpm_cmd() {
        let cmd = build_fixed_rpm_cmd(FanSlot::new(1).unwrap(), 1200).unwrap();
        assert_eq!(&cmd.as_bytes()[..4], &[0x24, 0x01, 0x04, 0xB0]);
        assert!(build_fixed_rpm_cmd(FanSlot::new(1).unwrap(), 70_000).is_err());
    }

    #[test]
    fn test_fan_temperature_info_cmd() {
        let cmd = build_fan_temperature_info_cmd(1, 42.5).unwrap();
        // 4250 = 0x109A
        assert_eq!(&cmd.as_bytes()[..4], &[0x26, 0x01, 0x10, 0x9A]);
        assert!(build_fan_temperature_info_cmd(0, -5.0).is_err());
    }

    #[test]
    fn test_fan_mode_cmd() {
        let cmd = build_fan_mode_cmd(FanSlot::new(4).unwrap(), FanMode::ThreePin);
        assert_eq!(&cmd.as_bytes()[..4], &[0x28, 0x02, 0x04, 0x01]);
    }

    #[test]
    fn test_queries() {
        assert_eq!(
            &build_fan_speed_query(FanSlot::new(5).unwrap()).as_bytes()[..2],
            &[0x21, 0x05]
        );
        assert_eq!(
            &build_temperature_query(ThermometerSlot::new(3).unwrap()).as_bytes()[..2],
            &[0x11, 0x03]
        );
        assert_eq!(
            &build_voltage_query(VoltageRail::Rail5V).as_bytes()[..2],
            &[0x12, 0x01]
        );
        assert_eq!(
            &build_led_strip_mask_query(Channel::Two).as_bytes()[..2],
            &[0x30, 0x01]
        );
    }
}
