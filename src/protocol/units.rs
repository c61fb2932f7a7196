//! Conversions between wire values and human units.

use log::warn;

use crate::error::{CommanderError, Result};

/// Temperatures travel as hundredths of a degree Celsius.
pub const TEMPERATURE_SCALE: f64 = 100.0;

/// Voltages travel as millivolts.
pub const VOLTAGE_SCALE: f64 = 1000.0;

/// Maximum duty cycle percentage.
pub const MAX_DUTY: u8 = 100;

/// Highest RPM target inside the device's calibrated range. Targets above
/// this make the fan fall back to full PWM duty.
pub const RPM_WARNING_THRESHOLD: u16 = 2500;

/// Empirical RPM per duty percent, used to express duty profiles on the
/// RPM-based graph command.
pub const RPM_PER_DUTY_PERCENT: u16 = 25;

/// Encode a temperature in °C as hundredths of a degree.
///
/// # Errors
/// Returns `InvalidTemperature` if the scaled value does not fit in 16 bits.
pub fn encode_temperature(celsius: f64) -> Result<u16> {
    let scaled = (celsius * TEMPERATURE_SCALE).round();
    if !scaled.is_finite() || scaled < 0.0 || scaled > f64::from(u16::MAX) {
        return Err(CommanderError::InvalidTemperature(celsius));
    }
    Ok(scaled as u16)
}

pub fn decode_temperature(raw: u16) -> f64 {
    f64::from(raw) / TEMPERATURE_SCALE
}

pub fn decode_voltage(raw: u16) -> f64 {
    f64::from(raw) / VOLTAGE_SCALE
}

/// Validate a duty cycle percentage. The wire value is the percentage itself.
pub fn validate_duty(duty: u32) -> Result<u8> {
    if duty > u32::from(MAX_DUTY) {
        return Err(CommanderError::InvalidDuty {
            value: duty,
            min: 0,
            max: MAX_DUTY,
        });
    }
    Ok(duty as u8)
}

/// Validate an RPM target. Values above [`RPM_WARNING_THRESHOLD`] are
/// accepted with a warning.
pub fn validate_rpm(rpm: u32) -> Result<u16> {
    let rpm = u16::try_from(rpm).map_err(|_| CommanderError::InvalidSpeed(rpm))?;
    if rpm > RPM_WARNING_THRESHOLD {
        warn!(
            "Fan speed {} RPM exceeds {} RPM; the fan may fall back to 100% PWM",
            rpm, RPM_WARNING_THRESHOLD
        );
    }
    Ok(rpm)
}

/// Approximate the RPM equivalent of a duty percentage.
pub fn duty_to_rpm(duty: u8) -> Result<u16> {
    let duty = validate_duty(duty.into())?;
    Ok(u16::from(duty) * RPM_PER_DUTY_PERCENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_temperature_scaling() {
        assert_eq!(encode_temperature(20.0).unwrap(), 2000);
        assert_eq!(encode_temperature(35.26).unwrap(), 3526);
        assert_eq!(decode_temperature(3125), 31.25);
        assert_eq!(encode_temperature(655.35).unwrap(), u16::MAX);
    }

    #[test]
    fn test_temperature_out_of_range() {
        assert!(encode_temperature(-1.0).is_err());
        assert!(encode_temperature(656.0).is_err());
        assert!(encode_temperature(f64::NAN).is_err());
    }

    #[test]
    fn test_voltage_scaling() {
        assert_eq!(decode_voltage(12_032), 12.032);
        assert_eq!(decode_voltage(3_300), 3.3);
    }

    #[test]
    fn test_rpm_validation() {
        assert_eq!(validate_rpm(0).unwrap(), 0);
        // Above the calibrated range is a warning, not an error.
        assert_eq!(validate_rpm(3000).unwrap(), 3000);
        assert_eq!(validate_rpm(65_535).unwrap(), 65_535);
        assert!(matches!(
            validate_rpm(65_536),
            Err(CommanderError::InvalidSpeed(65_536))
        ));
    }

    #[test]
    fn test_duty_to_rpm() {
        assert_eq!(duty_to_rpm(0).unwrap(), 0);
        assert_eq!(duty_to_rpm(40).unwrap(), 1000);
        assert_eq!(duty_to_rpm(100).unwrap(), 2500);
        assert!(duty_to_rpm(101).is_err());
    }

    proptest! {
        #[test]
        fn temperature_roundtrips_within_rounding(celsius in 0.0f64..655.0) {
            let raw = encode_temperature(celsius).unwrap();
            prop_assert!((decode_temperature(raw) - celsius).abs() <= 0.005 + 1e-9);
        }

        #[test]
        fn duty_roundtrips_exactly(duty in 0u32..=100) {
            prop_assert_eq!(u32::from(validate_duty(duty).unwrap()), duty);
        }

        #[test]
        fn duty_above_range_is_rejected(duty in 101u32..10_000) {
            prop_assert!(validate_duty(duty).is_err());
        }
    }
}
