//! Parsing utilities for CLI arguments and configuration values.
//!
//! This module provides reusable parsing functions for common input formats
//! used throughout the application.

use crate::config::SpeedProfile;
use crate::error::{CommanderError, Result};
use crate::protocol::{Brightness, Channel, Effect, FanMode, FanSlot, LedType, ThermometerSlot};

// =============================================================================
// Color Parsing
// =============================================================================

/// Parse a hex color string into RGB components.
///
/// Accepts formats: `#RRGGBB` or `RRGGBB`
///
/// # Example
/// ```
/// use corsair_commander_rs::utils::parsing::parse_hex_color;
///
/// let (r, g, b) = parse_hex_color("#FF5500").unwrap();
/// assert_eq!(r, 255);
/// assert_eq!(g, 85);
/// assert_eq!(b, 0);
/// ```
pub fn parse_hex_color(hex: &str) -> Result<(u8, u8, u8)> {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(CommanderError::InvalidInput(format!(
            "Invalid color hex: {}",
            hex
        )));
    }

    let component = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map_err(|_| CommanderError::InvalidInput(format!("Invalid color hex: {}", hex)))
    };
    Ok((component(0..2)?, component(2..4)?, component(4..6)?))
}

// =============================================================================
// Speed Profile Parsing
// =============================================================================

/// Parse a speed profile name into a SpeedProfile enum.
///
/// Accepts "silent", "performance", "fixed:XX" or
/// "custom:T:D,T:D,..." with up to six temperature/duty pairs.
///
/// # Example
/// ```
/// use corsair_commander_rs::utils::parsing::parse_speed_profile;
/// use corsair_commander_rs::config::SpeedProfile;
///
/// let profile = parse_speed_profile("silent").unwrap();
/// assert!(matches!(profile, SpeedProfile::Silent));
///
/// let fixed = parse_speed_profile("fixed:75").unwrap();
/// assert!(matches!(fixed, SpeedProfile::Fixed(75)));
/// ```
pub fn parse_speed_profile(name: &str) -> Result<SpeedProfile> {
    let lower = name.to_lowercase();

    if lower == "silent" {
        return Ok(SpeedProfile::Silent);
    }

    if lower == "performance" {
        return Ok(SpeedProfile::Performance);
    }

    if let Some(rest) = lower.strip_prefix("fixed:") {
        let duty: u8 = rest.parse().map_err(|_| {
            CommanderError::InvalidInput("Invalid duty value. Use 'fixed:XX' where XX is 0-100".into())
        })?;
        return Ok(SpeedProfile::Fixed(duty));
    }

    if let Some(rest) = lower.strip_prefix("custom:") {
        let points = rest
            .split(',')
            .map(parse_profile_point)
            .collect::<Result<Vec<_>>>()?;
        return Ok(SpeedProfile::Custom(points));
    }

    Err(CommanderError::InvalidInput(format!(
        "Unknown profile '{}'. Use: silent, performance, fixed:XX or custom:T:D,...",
        name
    )))
}

/// Parse one `T:D` (°C, duty %) pair.
fn parse_profile_point(point: &str) -> Result<(u8, u8)> {
    let invalid = || {
        CommanderError::InvalidInput(format!(
            "Invalid profile point '{}'. Use 'T:D', e.g. '40:60'",
            point
        ))
    };
    let (temp, duty) = point.trim().split_once(':').ok_or_else(invalid)?;
    let temp = temp.trim().parse().map_err(|_| invalid())?;
    let duty = duty.trim().parse().map_err(|_| invalid())?;
    Ok((temp, duty))
}

/// Parse a fan curve of `T:RPM` pairs, e.g. "30:800,45:1200,60:2000".
pub fn parse_curve_points(points: &str) -> Result<Vec<(u16, u32)>> {
    points
        .split(',')
        .map(|point| {
            let invalid = || {
                CommanderError::InvalidInput(format!(
                    "Invalid curve point '{}'. Use 'T:RPM', e.g. '40:1200'",
                    point
                ))
            };
            let (temp, rpm) = point.trim().split_once(':').ok_or_else(invalid)?;
            let temp = temp.trim().parse().map_err(|_| invalid())?;
            let rpm = rpm.trim().parse().map_err(|_| invalid())?;
            Ok((temp, rpm))
        })
        .collect()
}

// =============================================================================
// Device Address Parsing
// =============================================================================

/// Parse a one-based LED channel number ("1" or "2").
pub fn parse_channel(name: &str) -> Result<Channel> {
    match name.trim().to_lowercase().trim_start_matches("channel_") {
        "1" => Ok(Channel::One),
        "2" => Ok(Channel::Two),
        _ => Err(CommanderError::InvalidInput(format!(
            "Unknown channel '{}'. Use: 1 or 2",
            name
        ))),
    }
}

/// Parse a one-based fan header number (1-6).
pub fn parse_fan(value: &str) -> Result<FanSlot> {
    FanSlot::new(parse_one_based(value, "fan")?)
}

/// Parse a one-based thermometer number (1-4).
pub fn parse_thermometer(value: &str) -> Result<ThermometerSlot> {
    ThermometerSlot::new(parse_one_based(value, "thermometer")?)
}

fn parse_one_based(value: &str, kind: &str) -> Result<u8> {
    value
        .trim()
        .parse::<u8>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .ok_or_else(|| CommanderError::InvalidInput(format!("Invalid {} number '{}'", kind, value)))
}

// =============================================================================
// LED Parsing
// =============================================================================

/// Parse an effect name such as "rainbow_wave" or "rainbow-wave".
pub fn parse_effect(name: &str) -> Result<Effect> {
    parse_snake_case(name, "effect")
}

/// Parse an LED type name: "strip", "hd_fan", "sp_fan" or "ml_fan".
pub fn parse_led_type(name: &str) -> Result<LedType> {
    parse_snake_case(name, "LED type")
}

/// Parse a brightness tier: "max", "medium", "low" or "zero".
pub fn parse_brightness(name: &str) -> Result<Brightness> {
    parse_snake_case(name, "brightness")
}

/// Reuse the serde names of an enum for CLI input.
fn parse_snake_case<T: serde::de::DeserializeOwned>(name: &str, kind: &str) -> Result<T> {
    let normalized = name.trim().to_lowercase().replace('-', "_");
    serde_json::from_value(serde_json::Value::String(normalized))
        .map_err(|_| CommanderError::InvalidInput(format!("Unknown {} '{}'", kind, name)))
}

// =============================================================================
// Fan Mode Parsing
// =============================================================================

/// Parse a fan detection mode: "auto", "3pin" or "4pin".
pub fn parse_fan_mode(name: &str) -> Result<FanMode> {
    match name.trim().to_lowercase().as_str() {
        "auto" => Ok(FanMode::Auto),
        "3pin" | "3-pin" | "dc" => Ok(FanMode::ThreePin),
        "4pin" | "4-pin" | "pwm" => Ok(FanMode::FourPin),
        _ => Err(CommanderError::InvalidInput(format!(
            "Unknown fan mode '{}'. Use: auto, 3pin or 4pin",
            name
        ))),
    }
}

// =============================================================================
// Tests
// =============================================================================
