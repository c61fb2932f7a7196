//! Corsair Commander Pro device implementation.
//!
//! High-level interface for the fan, thermistor, voltage and LED functions of
//! the controller.

use hidapi::{HidApi, HidDevice};
use log::{info, warn};

use crate::device::dispatcher::Dispatcher;
use crate::device::sequencer::LedSequencer;
use crate::device::transport::Transport;
use crate::error::{CommanderError, Result};
use crate::protocol::lighting::{LedEffectConfig, build_led_temperature};
use crate::protocol::{
    BootloaderVersion, Brightness, COMMANDER_PRO_PID, CORSAIR_VID, Channel, ColourMode, Command,
    DeviceInfo, Direction, Effect, FAN_COUNT, FanConnection, FanCurve, FanMode, FanSlot,
    FirmwareVersion, LedChannelConfig, LedGroup, LedType, RequestFrame, ResponseFrame, Rgb,
    SoftwareId, Speed, StatusSample, THERMOMETER_COUNT, ThermometerConnection, ThermometerSlot,
    VoltageRail, build_fan_duty_query, build_fan_mode_cmd, build_fan_speed_query,
    build_fan_temperature_info_cmd, build_fixed_duty_cmd, build_fixed_rpm_cmd,
    build_led_strip_mask_query, build_temperature_query, build_voltage_query, parse_fan_config,
    parse_fan_duty, parse_fan_speed, parse_temperature, parse_thermometer_config, parse_voltage,
};

// =============================================================================
// CommanderPro
// =============================================================================

/// Corsair Commander Pro session.
///
/// Owns the device transport. Every operation is a synchronous
/// write-then-read; callers sharing one device across threads must
/// serialize access to the session themselves.
///
/// # Example
///
/// ```no_run
/// use corsair_commander_rs::device::CommanderPro;
/// use corsair_commander_rs::protocol::FanSlot;
///
/// let mut commander = CommanderPro::open()?;
/// let info = commander.initialize()?;
/// println!("{}", info);
///
/// for sample in commander.get_status()? {
///     println!("{}", sample);
/// }
///
/// commander.set_fixed_speed(FanSlot::new(0)?, 60)?;
/// # Ok::<(), corsair_commander_rs::error::CommanderError>(())
/// ```
pub struct CommanderPro<T: Transport = HidDevice> {
    dispatcher: Dispatcher<T>,
    info: Option<DeviceInfo>,
}

impl CommanderPro<HidDevice> {
    /// Open the first available Commander Pro.
    ///
    /// # Errors
    /// Returns `DeviceNotFound` if no Commander Pro is connected.
    pub fn open() -> Result<Self> {
        let api = HidApi::new()?;

        let info = api
            .device_list()
            .find(|info| info.vendor_id() == CORSAIR_VID && info.product_id() == COMMANDER_PRO_PID)
            .ok_or(CommanderError::DeviceNotFound)?;
        let device = info.open_device(&api)?;

        Ok(Self::new(device))
    }

    /// Open a Commander Pro by HID path.
    ///
    /// Useful when multiple devices are connected.
    pub fn open_path(path: &std::ffi::CStr) -> Result<Self> {
        let api = HidApi::new()?;
        let device = api.open_path(path)?;
        Ok(Self::new(device))
    }

    /// List all connected Commander Pro devices as (path, serial_number) tuples.
    pub fn list_devices() -> Result<Vec<(String, Option<String>)>> {
        let api = HidApi::new()?;

        let devices = api
            .device_list()
            .filter(|info| info.vendor_id() == CORSAIR_VID && info.product_id() == COMMANDER_PRO_PID)
            .map(|info| {
                (
                    info.path().to_string_lossy().into_owned(),
                    info.serial_number().map(String::from),
                )
            })
            .collect();

        Ok(devices)
    }
}

impl<T: Transport> CommanderPro<T> {
    /// Wrap an already-open transport.
    pub fn new(transport: T) -> Self {
        Self {
            dispatcher: Dispatcher::new(transport),
            info: None,
        }
    }

    /// Read and log the firmware, bootloader and software versions.
    pub fn initialize(&mut self) -> Result<DeviceInfo> {
        let info = DeviceInfo {
            firmware: self.firmware_version()?,
            bootloader: self.bootloader_version()?,
            software: self.software_id()?,
        };

        info!("Commander Pro info:");
        info!("Firmware version = {}", info.firmware);
        info!("Bootloader version = {}", info.bootloader);
        info!("Software version = {}", info.software);

        self.info = Some(info);
        Ok(info)
    }

    /// Versions read by the last `initialize()`, if any.
    pub fn device_info(&self) -> Option<DeviceInfo> {
        self.info
    }

    pub fn transport(&self) -> &T {
        self.dispatcher.transport()
    }

    // =========================================================================
    // Versions
    // =========================================================================

    pub fn firmware_version(&mut self) -> Result<FirmwareVersion> {
        let resp = self.query(Command::GetFirmwareVersion)?;
        Ok(FirmwareVersion::parse(&resp))
    }

    pub fn bootloader_version(&mut self) -> Result<BootloaderVersion> {
        let resp = self.query(Command::GetBootloaderVersion)?;
        Ok(BootloaderVersion::parse(&resp))
    }

    pub fn software_id(&mut self) -> Result<SoftwareId> {
        let resp = self.query(Command::GetSoftwareId)?;
        Ok(SoftwareId::parse(&resp))
    }

    // =========================================================================
    // LED Control
    // =========================================================================

    /// Program a channel's LED groups.
    ///
    /// This writes four priming frames, one frame per group in `config`, and a
    /// trigger. Groups not listed in `config` are left blank.
    ///
    /// # Errors
    /// A transport failure part-way leaves the channel partially programmed;
    /// the device has no way to roll back. The returned `LedSequence` error
    /// names the step that failed. Re-applying a full configuration recovers.
    pub fn set_led_config(&mut self, config: LedChannelConfig) -> Result<()> {
        LedSequencer::new(config)?.run(&mut self.dispatcher)
    }

    /// Apply one effect to all six LED groups of a channel.
    ///
    /// Uses HD fan LEDs at full brightness, high speed, forward direction and
    /// alternating colours. `colours` must hold 1-3 entries.
    pub fn set_color(&mut self, channel: Channel, effect: Effect, colours: &[Rgb]) -> Result<()> {
        let mut config = LedChannelConfig::new(channel, LedType::HdFan, Brightness::Max);
        for group in LedGroup::ALL {
            config = config.with_group(
                LedEffectConfig::new(group, effect)
                    .with_colours(colours)?
                    .with_speed(Speed::High)
                    .with_direction(Direction::Forward)
                    .with_colour_mode(ColourMode::Alternating),
            );
        }
        self.set_led_config(config)
    }

    /// Report the current temperature for the temperature LED effect.
    ///
    /// Meant to be sent repeatedly while that effect is active.
    pub fn notify_led_temperature(&mut self, channel: Channel, celsius: u16) -> Result<()> {
        self.dispatcher
            .execute(&build_led_temperature(channel, celsius))?;
        Ok(())
    }

    /// Raw GET_LED_STRIP_MASK response. The layout is undocumented.
    pub fn led_strip_mask(&mut self, channel: Channel) -> Result<ResponseFrame> {
        self.dispatcher.execute(&build_led_strip_mask_query(channel))
    }

    /// Raw GET_LED_COUNT response. The layout is undocumented.
    pub fn port_led_count(&mut self) -> Result<ResponseFrame> {
        self.query(Command::GetLedCount)
    }

    // =========================================================================
    // Fan Control
    // =========================================================================

    /// Set a fixed fan duty.
    ///
    /// # Errors
    /// Returns `InvalidDuty` if `duty` is above 100%.
    pub fn set_fixed_speed(&mut self, fan: FanSlot, duty: u8) -> Result<()> {
        let cmd = build_fixed_duty_cmd(fan, duty)?;
        self.dispatcher.execute(&cmd)?;
        Ok(())
    }

    /// Set a fixed fan speed in RPM.
    ///
    /// Targets above 2500 RPM are sent but logged as a warning: out of the
    /// calibrated range the fan drops to 100% PWM.
    pub fn set_fixed_rpm(&mut self, fan: FanSlot, rpm: u32) -> Result<()> {
        let cmd = build_fixed_rpm_cmd(fan, rpm)?;
        self.dispatcher.execute(&cmd)?;
        Ok(())
    }

    /// Put a fan in graph mode following `curve`.
    pub fn set_speed_graph(&mut self, curve: &FanCurve) -> Result<()> {
        self.dispatcher.execute(&curve.to_frame())?;
        Ok(())
    }

    /// Apply several curves, one frame per curve, in order.
    pub fn set_speed_graphs(&mut self, curves: &[FanCurve]) -> Result<()> {
        curves.iter().try_for_each(|curve| self.set_speed_graph(curve))
    }

    /// Follow a (°C, duty %) profile of up to six points on thermometer 1.
    ///
    /// The profile is converted to RPM (`duty * 25`) and padded to six
    /// points by repeating the last one.
    pub fn set_speed_profile(&mut self, fan: FanSlot, profile: &[(u8, u8)]) -> Result<()> {
        let thermometer = ThermometerSlot::new(0)?;
        let curve = FanCurve::from_duty_profile(thermometer, fan, profile)?;
        self.set_speed_graph(&curve)
    }

    /// Feed an external temperature reading to the device for graph mode.
    pub fn send_temperature_info(&mut self, sensor: u8, celsius: f64) -> Result<()> {
        let cmd = build_fan_temperature_info_cmd(sensor, celsius)?;
        self.dispatcher.execute(&cmd)?;
        Ok(())
    }

    /// Set a fan header's detection mode.
    ///
    /// The effect of this command on the device is unconfirmed.
    pub fn set_fan_mode(&mut self, fan: FanSlot, mode: FanMode) -> Result<()> {
        self.dispatcher.execute(&build_fan_mode_cmd(fan, mode))?;
        Ok(())
    }

    // =========================================================================
    // Readings
    // =========================================================================

    pub fn fan_connections(&mut self) -> Result<[FanConnection; FAN_COUNT]> {
        let resp = self.query(Command::GetFanConfig)?;
        Ok(parse_fan_config(&resp))
    }

    /// Fan speed in RPM.
    pub fn fan_speed(&mut self, fan: FanSlot) -> Result<u16> {
        let resp = self.dispatcher.execute(&build_fan_speed_query(fan))?;
        Ok(parse_fan_speed(&resp))
    }

    /// Fan duty in percent.
    pub fn fan_duty(&mut self, fan: FanSlot) -> Result<u8> {
        let resp = self.dispatcher.execute(&build_fan_duty_query(fan))?;
        Ok(parse_fan_duty(&resp))
    }

    pub fn thermometer_connections(
        &mut self,
    ) -> Result<[ThermometerConnection; THERMOMETER_COUNT]> {
        let resp = self.query(Command::GetThermometerConfig)?;
        Ok(parse_thermometer_config(&resp))
    }

    /// Temperature in °C.
    pub fn temperature(&mut self, thermometer: ThermometerSlot) -> Result<f64> {
        let resp = self
            .dispatcher
            .execute(&build_temperature_query(thermometer))?;
        Ok(parse_temperature(&resp))
    }

    /// Rail voltage in volts.
    pub fn voltage(&mut self, rail: VoltageRail) -> Result<f64> {
        let resp = self.dispatcher.execute(&build_voltage_query(rail))?;
        Ok(parse_voltage(&resp))
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Full status: fans 1-6, thermometers 1-4, then the 12V, 5V and 3.3V rails.
    pub fn get_status(&mut self) -> Result<Vec<StatusSample>> {
        let mut samples = self.fan_status()?;
        samples.extend(self.thermometer_status()?);
        samples.extend(self.power_status()?);
        Ok(samples)
    }

    /// Connection state of every fan, plus speed for connected fans.
    pub fn fan_status(&mut self) -> Result<Vec<StatusSample>> {
        let connections = self.fan_connections()?;

        let mut samples = Vec::new();
        for (fan, connection) in FanSlot::all().zip(connections) {
            let name = format!("Fan {}", fan.index() + 1);
            if let FanConnection::Unknown(code) = connection {
                warn!("{} reported undocumented mode 0x{:02X}", name, code);
            }
            samples.push(StatusSample::text(format!("{} status", name), connection.label()));

            if connection.is_connected() {
                let rpm = self.fan_speed(fan)?;
                samples.push(StatusSample::integer(format!("{} speed", name), rpm.into(), "rpm"));
            }
        }
        Ok(samples)
    }

    /// Connection state of every thermometer, plus temperature for connected ones.
    pub fn thermometer_status(&mut self) -> Result<Vec<StatusSample>> {
        let connections = self.thermometer_connections()?;

        let mut samples = Vec::new();
        for (thermometer, connection) in ThermometerSlot::all().zip(connections) {
            let name = format!("Thermometer {}", thermometer.index() + 1);
            if let ThermometerConnection::Unknown(code) = connection {
                warn!("{} reported undocumented state 0x{:02X}", name, code);
            }
            samples.push(StatusSample::text(format!("{} status", name), connection.label()));

            if connection.is_connected() {
                let celsius = self.temperature(thermometer)?;
                samples.push(StatusSample::float(
                    format!("{} temperature", name),
                    celsius,
                    "°C",
                ));
            }
        }
        Ok(samples)
    }

    /// Voltage of each supply rail.
    pub fn power_status(&mut self) -> Result<Vec<StatusSample>> {
        VoltageRail::ALL
            .into_iter()
            .map(|rail| Ok(StatusSample::float(rail.label(), self.voltage(rail)?, "V")))
            .collect()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn query(&mut self, command: Command) -> Result<ResponseFrame> {
        self.dispatcher.execute(&RequestFrame::new(command))
    }
}

impl<T: Transport> std::fmt::Debug for CommanderPro<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommanderPro")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::transport::mock::{Event, MockTransport};
    use crate::protocol::StatusValue;
    use pretty_assertions::assert_eq;

    fn labels(samples: &[StatusSample]) -> Vec<&str> {
        samples.iter().map(|s| s.label.as_str()).collect()
    }

    #[test]
    fn test_initialize_reads_versions() {
        let mut transport = MockTransport::new();
        transport.push_response(&[0x00, 0x08, 0x1E]);
        transport.push_response(&[0x00, 0x03]);
        transport.push_response(&[0x00, 0x00, 0x00, 0x04]);
        let mut commander = CommanderPro::new(transport);

        let info = commander.initialize().unwrap();
        assert_eq!(info.firmware.to_string(), "0.8.30");
        assert_eq!(info.bootloader.to_string(), "0.3");
        assert_eq!(info.software.to_string(), "0.0.0.4");
        assert_eq!(commander.device_info(), Some(info));
        assert_eq!(commander.transport().commands(), vec![0x02, 0x06, 0x03]);
    }

    #[test]
    fn test_fan_status_queries_only_connected() {
        let mut transport = MockTransport::new();
        // Fan 3 is 4-pin, fan 5 reports an undocumented code.
        transport.push_response(&[0x00, 0x00, 0x02, 0x00, 0x03, 0x00]);
        transport.push_response(&[0x03, 0xE8]);
        let mut commander = CommanderPro::new(transport);

        let samples = commander.fan_status().unwrap();

        assert_eq!(
            labels(&samples),
            vec![
                "Fan 1 status",
                "Fan 2 status",
                "Fan 3 status",
                "Fan 3 speed",
                "Fan 4 status",
                "Fan 5 status",
                "Fan 6 status",
            ]
        );
        assert_eq!(samples[2].value, StatusValue::Text("connected (4 pins)".into()));
        assert_eq!(samples[3].value, StatusValue::Integer(1000));
        assert_eq!(samples[3].unit, "rpm");
        assert_eq!(samples[5].value, StatusValue::Text("unknown".into()));

        let written = commander.transport().written();
        assert_eq!(written.len(), 2);
        assert_eq!(&written[1][..2], &[0x21, 0x02]);
    }

    #[test]
    fn test_full_status_order() {
        let mut transport = MockTransport::new();
        transport.push_response(&[0x01, 0x00, 0x00, 0x00, 0x00, 0x00]); // fan config
        transport.push_response(&[0x02, 0x58]); // fan 1: 600 rpm
        transport.push_response(&[0x00, 0x01, 0x00, 0x00]); // thermometer config
        transport.push_response(&[0x0A, 0x28]); // thermometer 2: 26.00 C
        transport.push_response(&[0x2E, 0xE0]); // 12.000 V
        transport.push_response(&[0x13, 0x88]); // 5.000 V
        transport.push_response(&[0x0C, 0xE4]); // 3.300 V
        let mut commander = CommanderPro::new(transport);

        let samples = commander.get_status().unwrap();

        assert_eq!(samples.len(), 6 + 1 + 4 + 1 + 3);
        assert_eq!(samples[1].value, StatusValue::Integer(600));
        assert_eq!(samples[9].label, "Thermometer 2 temperature");
        assert_eq!(samples[9].value, StatusValue::Float(26.0));
        assert_eq!(samples[9].unit, "°C");
        assert_eq!(
            labels(&samples[12..]),
            vec!["12V rail", "5V rail", "3.3V rail"]
        );
        assert_eq!(samples[12].value, StatusValue::Float(12.0));
        assert_eq!(samples[14].value, StatusValue::Float(3.3));

        assert_eq!(
            commander.transport().commands(),
            vec![0x20, 0x21, 0x10, 0x11, 0x12, 0x12, 0x12]
        );
        // Every standalone query clears stale reports first.
        let clears = commander
            .transport()
            .events
            .iter()
            .filter(|e| **e == Event::Clear)
            .count();
        assert_eq!(clears, 7);
    }

    #[test]
    fn test_set_fixed_speed_validates_before_io() {
        let mut commander = CommanderPro::new(MockTransport::new());
        let fan = FanSlot::new(1).unwrap();

        assert!(matches!(
            commander.set_fixed_speed(fan, 101),
            Err(CommanderError::InvalidDuty { value: 101, .. })
        ));
        assert!(commander.transport().events.is_empty());

        commander.set_fixed_speed(fan, 40).unwrap();
        assert_eq!(&commander.transport().written()[0][..3], &[0x23, 0x01, 40]);
    }

    #[test]
    fn test_set_fixed_rpm() {
        let mut commander = CommanderPro::new(MockTransport::new());
        commander.set_fixed_rpm(FanSlot::new(5).unwrap(), 3000).unwrap();
        assert_eq!(
            &commander.transport().written()[0][..4],
            &[0x24, 0x05, 0x0B, 0xB8]
        );
    }

    #[test]
    fn test_set_speed_profile_pads_and_converts() {
        let mut commander = CommanderPro::new(MockTransport::new());
        commander
            .set_speed_profile(FanSlot::new(2).unwrap(), &[(30, 20), (45, 60), (60, 100)])
            .unwrap();

        let frame = commander.transport().written()[0].to_vec();
        assert_eq!(&frame[..3], &[0x25, 0x02, 0x00]);
        let speeds: Vec<u16> = (0..6)
            .map(|i| u16::from_be_bytes([frame[15 + 2 * i], frame[16 + 2 * i]]))
            .collect();
        assert_eq!(speeds, vec![500, 1500, 2500, 2500, 2500, 2500]);
    }

    #[test]
    fn test_set_speed_graphs_in_order() {
        let mut commander = CommanderPro::new(MockTransport::new());
        let thermometer = ThermometerSlot::new(0).unwrap();
        let curves: Vec<FanCurve> = FanSlot::all()
            .map(|fan| {
                FanCurve::new(
                    thermometer,
                    fan,
                    &[20, 30, 40, 60, 80, 100],
                    &[800, 1000, 1250, 1500, 2000, 2500],
                )
                .unwrap()
            })
            .collect();

        commander.set_speed_graphs(&curves).unwrap();

        let fans: Vec<u8> = commander.transport().written().iter().map(|f| f[1]).collect();
        assert_eq!(fans, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_set_color_programs_all_groups() {
        let mut commander = CommanderPro::new(MockTransport::new());
        commander
            .set_color(Channel::Two, Effect::Static, &[Rgb::new(0x10, 0x20, 0x30)])
            .unwrap();

        let written = commander.transport().written();
        assert_eq!(written.len(), 4 + 6 + 1);
        let offsets: Vec<u8> = written[4..10].iter().map(|f| f[2]).collect();
        assert_eq!(offsets, vec![0x00, 0x0C, 0x18, 0x24, 0x30, 0x3C]);
        for frame in &written[4..10] {
            assert_eq!(&frame[..10], &[0x35, 0x01, frame[2], 0x0C, 0x04, 0x00, 0x01, 0x00, 0xFF, 0x10]);
            assert_eq!(&frame[10..18], &[0x20, 0x30, 0, 0, 0, 0, 0, 0]);
        }
    }

    #[test]
    fn test_set_color_rejects_bad_colour_count() {
        let mut commander = CommanderPro::new(MockTransport::new());
        assert!(matches!(
            commander.set_color(Channel::One, Effect::Static, &[]),
            Err(CommanderError::InvalidColors(0))
        ));
        assert!(commander.transport().events.is_empty());
    }

    #[test]
    fn test_led_temperature_and_temperature_info() {
        let mut commander = CommanderPro::new(MockTransport::new());
        commander.notify_led_temperature(Channel::One, 45).unwrap();
        commander.send_temperature_info(2, 31.5).unwrap();

        let written = commander.transport().written();
        assert_eq!(&written[0][..5], &[0x36, 0x00, 0x00, 0x00, 45]);
        // 3150 = 0x0C4E
        assert_eq!(&written[1][..4], &[0x26, 0x02, 0x0C, 0x4E]);
    }

    #[test]
    fn test_diagnostic_reads_are_opaque() {
        let mut transport = MockTransport::new();
        transport.push_response(&[0xAA, 0xBB]);
        let mut commander = CommanderPro::new(transport);

        let mask = commander.led_strip_mask(Channel::Two).unwrap();
        assert_eq!(mask.bytes::<2>(1), [0xAA, 0xBB]);
        let count = commander.port_led_count().unwrap();
        assert!(count.as_bytes().iter().all(|&b| b == 0));
        assert_eq!(commander.transport().commands(), vec![0x30, 0x3A]);
    }

    #[test]
    fn test_transport_error_propagates() {
        // Write 0 (fan config) is acknowledged with all fans disconnected;
        // write 1 (thermometer config) fails.
        let mut commander = CommanderPro::new(MockTransport::new().failing_on_write(1));
        let err = commander.get_status().unwrap_err();
        assert!(matches!(err, CommanderError::HidError(_)));
        assert_eq!(commander.transport().commands(), vec![0x20]);
    }
}
