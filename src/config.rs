//! Fan speed profiles and lighting configuration files.
//!
//! Provides pre-defined profiles and loading of JSON LED configurations.

use std::path::Path;

use crate::error::{CommanderError, Result};
use crate::protocol::{CURVE_POINTS, LedChannelConfig};

// =============================================================================
// Speed Profiles
// =============================================================================

/// Pre-defined speed profile.
#[derive(Debug, Clone, PartialEq)]
pub enum SpeedProfile {
    /// Silent mode - low speeds, ramps up only at high temps.
    Silent,
    /// Performance mode - aggressive cooling curve.
    Performance,
    /// Fixed speed for all temperatures.
    Fixed(u8),
    /// Custom temperature/duty curve of up to six points.
    Custom(Vec<(u8, u8)>),
}

impl SpeedProfile {
    /// (°C, duty %) points for `CommanderPro::set_speed_profile`.
    ///
    /// # Errors
    /// Returns `InvalidCurve` for a custom profile with no points or more
    /// than six.
    pub fn to_duty_profile(&self) -> Result<Vec<(u8, u8)>> {
        match self {
            SpeedProfile::Silent => Ok(PROFILE_SILENT.to_vec()),
            SpeedProfile::Performance => Ok(PROFILE_PERFORMANCE.to_vec()),
            SpeedProfile::Fixed(duty) => Ok(vec![(FIXED_PROFILE_TEMPERATURE, *duty)]),
            SpeedProfile::Custom(points) => {
                if points.is_empty() || points.len() > CURVE_POINTS {
                    return Err(CommanderError::InvalidCurve(format!(
                        "expected 1-{} points, got {}",
                        CURVE_POINTS,
                        points.len()
                    )));
                }
                Ok(points.clone())
            }
        }
    }

    /// Get profile name for display.
    pub fn name(&self) -> &'static str {
        match self {
            SpeedProfile::Silent => "Silent",
            SpeedProfile::Performance => "Performance",
            SpeedProfile::Fixed(_) => "Fixed",
            SpeedProfile::Custom(_) => "Custom",
        }
    }
}

impl std::fmt::Display for SpeedProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpeedProfile::Fixed(duty) => write!(f, "Fixed ({}%)", duty),
            _ => write!(f, "{}", self.name()),
        }
    }
}

// =============================================================================
// Pre-defined Profile Curves
// =============================================================================

/// Silent profile - minimal noise, ramps at 50°C+.
pub const PROFILE_SILENT: [(u8, u8); 6] =
    [(25, 30), (35, 30), (45, 40), (50, 55), (55, 75), (60, 100)];

/// Performance profile - aggressive cooling.
pub const PROFILE_PERFORMANCE: [(u8, u8); 6] =
    [(20, 50), (30, 55), (40, 65), (50, 80), (55, 90), (60, 100)];

/// Single point used for fixed profiles; padding turns it into a plateau.
const FIXED_PROFILE_TEMPERATURE: u8 = 20;

// =============================================================================
// Lighting Configuration
// =============================================================================

/// Load a channel's LED configuration from a JSON file.
///
/// ```json
/// {
///   "channel": "channel_1",
///   "led_type": "hd_fan",
///   "brightness": "medium",
///   "groups": [
///     { "group": "fan1", "effect": "static", "colours": ["#FF0000"] }
///   ]
/// }
/// ```
///
/// # Errors
/// Returns `InvalidConfig` if the file cannot be read, is not valid JSON for
/// a channel configuration, or lists more than six groups.
pub fn load_led_config(path: impl AsRef<Path>) -> Result<LedChannelConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| CommanderError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
    parse_led_config(&text)
}

/// Parse a channel's LED configuration from JSON text.
pub fn parse_led_config(text: &str) -> Result<LedChannelConfig> {
    let config: LedChannelConfig =
        serde_json::from_str(text).map_err(|e| CommanderError::InvalidConfig(e.to_string()))?;
    config
        .validate()
        .map_err(|e| CommanderError::InvalidConfig(e.to_string()))?;
    Ok(config)
}
