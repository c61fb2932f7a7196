//! Graph-mode fan curves.
//!
//! A curve is six (temperature, RPM) points bound to one thermometer and one
//! fan. Point order is the caller's responsibility; the device interpolates
//! between consecutive points as given.

use crate::error::{CommanderError, Result};
use crate::protocol::commands::{Command, FanSlot, ThermometerSlot};
use crate::protocol::frame::RequestFrame;
use crate::protocol::units::{decode_temperature, duty_to_rpm, encode_temperature, validate_rpm};

/// Number of points in a graph-mode curve.
pub const CURVE_POINTS: usize = 6;

const OFFSET_FAN: usize = 1;
const OFFSET_THERMOMETER: usize = 2;
const OFFSET_TEMPERATURES: usize = 3;
const OFFSET_SPEEDS: usize = 15;

/// A validated 6-point temperature → RPM curve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanCurve {
    thermometer: ThermometerSlot,
    fan: FanSlot,
    /// Hundredths of a degree, as sent on the wire.
    temperatures: [u16; CURVE_POINTS],
    speeds: [u16; CURVE_POINTS],
}

impl FanCurve {
    /// Build a curve from exactly six temperatures (°C) and six speeds (RPM).
    ///
    /// # Errors
    /// Returns `InvalidCurve` unless both slices hold six values, and
    /// `InvalidTemperature`/`InvalidSpeed` for values that do not fit the wire.
    pub fn new(
        thermometer: ThermometerSlot,
        fan: FanSlot,
        temperatures: &[u16],
        speeds: &[u32],
    ) -> Result<Self> {
        if temperatures.len() != CURVE_POINTS {
            return Err(CommanderError::InvalidCurve(format!(
                "need {} temperatures, {} were given",
                CURVE_POINTS,
                temperatures.len()
            )));
        }
        if speeds.len() != CURVE_POINTS {
            return Err(CommanderError::InvalidCurve(format!(
                "need {} speeds, {} were given",
                CURVE_POINTS,
                speeds.len()
            )));
        }

        let mut curve = Self {
            thermometer,
            fan,
            temperatures: [0; CURVE_POINTS],
            speeds: [0; CURVE_POINTS],
        };
        for i in 0..CURVE_POINTS {
            curve.temperatures[i] = encode_temperature(f64::from(temperatures[i]))?;
            curve.speeds[i] = validate_rpm(speeds[i])?;
        }
        Ok(curve)
    }

    /// Build a curve from 1-6 (°C, RPM) points, repeating the last point
    /// until there are six.
    pub fn padded(
        thermometer: ThermometerSlot,
        fan: FanSlot,
        points: &[(u16, u32)],
    ) -> Result<Self> {
        let Some(&last) = points.last() else {
            return Err(CommanderError::InvalidCurve("no points given".into()));
        };
        if points.len() > CURVE_POINTS {
            return Err(CommanderError::InvalidCurve(format!(
                "at most {} points allowed, {} were given",
                CURVE_POINTS,
                points.len()
            )));
        }

        let mut padded = points.to_vec();
        padded.resize(CURVE_POINTS, last);

        let temperatures: Vec<u16> = padded.iter().map(|&(t, _)| t).collect();
        let speeds: Vec<u32> = padded.iter().map(|&(_, s)| s).collect();
        Self::new(thermometer, fan, &temperatures, &speeds)
    }

    /// Build a curve from a (°C, duty %) profile of up to six points.
    ///
    /// The device only accepts RPM targets, so each duty is approximated as
    /// `duty * 25` RPM.
    pub fn from_duty_profile(
        thermometer: ThermometerSlot,
        fan: FanSlot,
        profile: &[(u8, u8)],
    ) -> Result<Self> {
        let points = profile
            .iter()
            .map(|&(temp, duty)| Ok((u16::from(temp), u32::from(duty_to_rpm(duty)?))))
            .collect::<Result<Vec<_>>>()?;
        Self::padded(thermometer, fan, &points)
    }

    pub fn thermometer(&self) -> ThermometerSlot {
        self.thermometer
    }

    pub fn fan(&self) -> FanSlot {
        self.fan
    }

    /// Temperatures in °C.
    pub fn temperatures(&self) -> [f64; CURVE_POINTS] {
        self.temperatures.map(decode_temperature)
    }

    /// Speeds in RPM.
    pub fn speeds(&self) -> [u16; CURVE_POINTS] {
        self.speeds
    }

    /// Encode as a SET_FAN_SPEED_GRAPH frame.
    ///
    /// Layout: `[0x25, fan, thermometer, temps (6 x u16 BE), speeds (6 x u16 BE)]`.
    pub fn to_frame(&self) -> RequestFrame {
        let frame = RequestFrame::new(Command::SetFanSpeedGraph)
            .with_u8(OFFSET_FAN, self.fan.index())
            .with_u8(OFFSET_THERMOMETER, self.thermometer.index());

        (0..CURVE_POINTS).fold(frame, |frame, i| {
            frame
                .with_u16(OFFSET_TEMPERATURES + 2 * i, self.temperatures[i])
                .with_u16(OFFSET_SPEEDS + 2 * i, self.speeds[i])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn slots() -> (ThermometerSlot, FanSlot) {
        (ThermometerSlot::new(0).unwrap(), FanSlot::new(0).unwrap())
    }

    fn u16_fields(frame: &RequestFrame, start: usize) -> Vec<u16> {
        (0..CURVE_POINTS).map(|i| frame.u16_at(start + 2 * i)).collect()
    }

    #[test]
    fn test_graph_frame() {
        let (thermometer, fan) = slots();
        let curve = FanCurve::new(
            thermometer,
            fan,
            &[20, 30, 40, 60, 80, 100],
            &[800, 1000, 1250, 1500, 2000, 2500],
        )
        .unwrap();
        let frame = curve.to_frame();

        assert_eq!(frame.u8_at(0), Command::SetFanSpeedGraph.code());
        assert_eq!(frame.u8_at(1), 0);
        assert_eq!(frame.u8_at(2), 0);
        assert_eq!(
            u16_fields(&frame, 3),
            vec![2000, 3000, 4000, 6000, 8000, 10000]
        );
        assert_eq!(
            u16_fields(&frame, 15),
            vec![800, 1000, 1250, 1500, 2000, 2500]
        );
        // Big-endian: 2000 = 0x07D0
        assert_eq!(&frame.as_bytes()[3..5], &[0x07, 0xD0]);
        assert!(frame.as_bytes()[27..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_graph_frame_addressing() {
        let curve = FanCurve::new(
            ThermometerSlot::new(3).unwrap(),
            FanSlot::new(5).unwrap(),
            &[20; 6],
            &[1000; 6],
        )
        .unwrap();
        let frame = curve.to_frame();
        assert_eq!(frame.u8_at(1), 5);
        assert_eq!(frame.u8_at(2), 3);
    }

    #[test]
    fn test_wrong_lengths_rejected() {
        let (thermometer, fan) = slots();
        assert!(matches!(
            FanCurve::new(thermometer, fan, &[20, 30], &[800; 6]),
            Err(CommanderError::InvalidCurve(_))
        ));
        assert!(matches!(
            FanCurve::new(thermometer, fan, &[20; 6], &[800; 7]),
            Err(CommanderError::InvalidCurve(_))
        ));
    }

    #[test]
    fn test_padding_repeats_last_point() {
        let (thermometer, fan) = slots();
        let curve =
            FanCurve::padded(thermometer, fan, &[(25, 600), (40, 1200), (70, 2000)]).unwrap();
        let frame = curve.to_frame();

        assert_eq!(
            u16_fields(&frame, 3),
            vec![2500, 4000, 7000, 7000, 7000, 7000]
        );
        assert_eq!(
            u16_fields(&frame, 15),
            vec![600, 1200, 2000, 2000, 2000, 2000]
        );
    }

    #[test]
    fn test_padding_limits() {
        let (thermometer, fan) = slots();
        assert!(FanCurve::padded(thermometer, fan, &[]).is_err());
        assert!(FanCurve::padded(thermometer, fan, &[(30, 1000); 7]).is_err());
    }

    #[test]
    fn test_duty_profile_conversion() {
        let (thermometer, fan) = slots();
        let curve = FanCurve::from_duty_profile(thermometer, fan, &[(30, 40), (50, 100)]).unwrap();

        assert_eq!(curve.speeds(), [1000, 2500, 2500, 2500, 2500, 2500]);
        assert_eq!(curve.temperatures(), [30.0, 50.0, 50.0, 50.0, 50.0, 50.0]);
        assert!(FanCurve::from_duty_profile(thermometer, fan, &[(30, 120)]).is_err());
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let (thermometer, fan) = slots();
        assert!(matches!(
            FanCurve::new(thermometer, fan, &[20, 30, 40, 60, 80, 700], &[800; 6]),
            Err(CommanderError::InvalidTemperature(_))
        ));
        assert!(matches!(
            FanCurve::new(thermometer, fan, &[20; 6], &[800, 800, 800, 800, 800, 70_000]),
            Err(CommanderError::InvalidSpeed(70_000))
        ));
    }
}
