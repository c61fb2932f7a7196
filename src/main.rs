//! Corsair Commander Pro Control CLI
//!
//! Command-line interface for monitoring and controlling the Corsair Commander Pro.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::ffi::CString;
use std::path::{Path, PathBuf};

use corsair_commander_rs::config::{SpeedProfile, load_led_config};
use corsair_commander_rs::device::CommanderPro;
use corsair_commander_rs::protocol::{
    Channel, FanCurve, FanMode, FanSlot, Rgb, ThermometerSlot, VoltageRail,
};
use corsair_commander_rs::utils::parsing::{
    parse_channel, parse_curve_points, parse_effect, parse_fan, parse_fan_mode, parse_hex_color,
    parse_speed_profile, parse_thermometer,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Corsair Commander Pro Control Tool
#[derive(Parser, Debug)]
#[command(name = "commander-pro-cli")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// HID path of the device to use (see `list`)
    #[arg(long, global = true)]
    path: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List connected Commander Pro devices
    List,

    /// Show firmware, bootloader and software versions
    Info,

    /// Show fan, thermometer and voltage status
    Status {
        /// Print the status as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set a fixed fan duty
    SetSpeed {
        /// Fan number (1-6)
        #[arg(value_parser = parse_fan)]
        fan: FanSlot,

        /// Duty cycle percentage (0-100)
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        duty: u8,
    },

    /// Set a fixed fan speed in RPM
    SetRpm {
        /// Fan number (1-6)
        #[arg(value_parser = parse_fan)]
        fan: FanSlot,

        /// Target speed in RPM
        rpm: u32,
    },

    /// Apply a speed profile (follows thermometer 1)
    SetProfile {
        /// Fan number (1-6)
        #[arg(value_parser = parse_fan)]
        fan: FanSlot,

        /// Profile name: silent, performance, fixed:XX or custom:T:D,...
        #[arg(value_parser = parse_speed_profile)]
        profile: SpeedProfile,
    },

    /// Program a fan curve against a thermometer
    SetGraph {
        /// Fan number (1-6)
        #[arg(value_parser = parse_fan)]
        fan: FanSlot,

        /// Thermometer number (1-4)
        #[arg(short, long, default_value = "1", value_parser = parse_thermometer)]
        thermometer: ThermometerSlot,

        /// Up to six T:RPM points, e.g. "30:800,45:1200,60:2000"
        points: String,
    },

    /// Apply one LED effect to every fan on a channel
    SetColor {
        /// LED channel (1-2)
        #[arg(value_parser = parse_channel)]
        channel: Channel,

        /// Effect name, e.g. static, rainbow_wave, colour_pulse
        effect: String,

        /// One to three colours as #RRGGBB
        #[arg(num_args = 1..=3, value_parser = parse_hex_color)]
        colors: Vec<(u8, u8, u8)>,
    },

    /// Program a channel from a JSON LED configuration file
    ApplyLeds {
        /// Path to the configuration file
        file: PathBuf,
    },

    /// Send the current temperature for the temperature LED effect
    LedTemperature {
        /// LED channel (1-2)
        #[arg(value_parser = parse_channel)]
        channel: Channel,

        /// Temperature in °C
        celsius: u16,
    },

    /// Feed an external temperature reading to the device
    TemperatureInfo {
        /// Sensor index
        sensor: u8,

        /// Temperature in °C
        celsius: f64,
    },

    /// Set a fan header's detection mode
    SetFanMode {
        /// Fan number (1-6)
        #[arg(value_parser = parse_fan)]
        fan: FanSlot,

        /// Mode: auto, 3pin or 4pin
        #[arg(value_parser = parse_fan_mode)]
        mode: FanMode,
    },

    /// Debug: dump fan duties and raw LED diagnostic reports
    Diagnostics,
}

// =============================================================================
// Main
// =============================================================================

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose).context("Failed to initialize logging")?;

    let path = args.path.as_deref();
    match args.command {
        Command::List => cmd_list(),
        Command::Info => cmd_info(path),
        Command::Status { json } => cmd_status(path, json),
        Command::SetSpeed { fan, duty } => cmd_set_speed(path, fan, duty),
        Command::SetRpm { fan, rpm } => cmd_set_rpm(path, fan, rpm),
        Command::SetProfile { fan, profile } => cmd_set_profile(path, fan, &profile),
        Command::SetGraph {
            fan,
            thermometer,
            points,
        } => cmd_set_graph(path, fan, thermometer, &points),
        Command::SetColor {
            channel,
            effect,
            colors,
        } => cmd_set_color(path, channel, &effect, &colors),
        Command::ApplyLeds { file } => cmd_apply_leds(path, &file),
        Command::LedTemperature { channel, celsius } => {
            cmd_led_temperature(path, channel, celsius)
        }
        Command::TemperatureInfo { sensor, celsius } => {
            cmd_temperature_info(path, sensor, celsius)
        }
        Command::SetFanMode { fan, mode } => cmd_set_fan_mode(path, fan, mode),
        Command::Diagnostics => cmd_diagnostics(path),
    }
}

/// Log to stderr so `status --json` output stays clean.
fn setup_logging(verbosity: u8) -> std::result::Result<(), fern::InitError> {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}] {}: {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;

    Ok(())
}

fn open_device(path: Option<&str>) -> Result<CommanderPro> {
    let commander = match path {
        Some(path) => {
            let path = CString::new(path).context("Device path contains a NUL byte")?;
            CommanderPro::open_path(&path)
        }
        None => CommanderPro::open(),
    };
    commander.context("Failed to open Commander Pro")
}

// =============================================================================
// Command Implementations
// =============================================================================

fn cmd_list() -> Result<()> {
    let devices = CommanderPro::list_devices().context("Failed to enumerate HID devices")?;

    if devices.is_empty() {
        println!("❌ No Commander Pro devices found.");
        return Ok(());
    }

    println!("🔌 Found {} Commander Pro device(s):", devices.len());
    for (i, (path, serial)) in devices.iter().enumerate() {
        println!(
            "  {}. {} (serial: {})",
            i + 1,
            path,
            serial.as_deref().unwrap_or("unknown")
        );
    }
    Ok(())
}

fn cmd_info(path: Option<&str>) -> Result<()> {
    let mut commander = open_device(path)?;
    let info = commander
        .initialize()
        .context("Failed to initialize device")?;
    println!("{}", info);
    Ok(())
}

fn cmd_status(path: Option<&str>, json: bool) -> Result<()> {
    let mut commander = open_device(path)?;
    let status = commander.get_status().context("Failed to read status")?;

    if json {
        let text = serde_json::to_string_pretty(&status).context("Failed to encode status")?;
        println!("{}", text);
    } else {
        for sample in &status {
            println!("{}", sample);
        }
    }
    Ok(())
}

fn cmd_set_speed(path: Option<&str>, fan: FanSlot, duty: u8) -> Result<()> {
    let mut commander = open_device(path)?;
    commander
        .set_fixed_speed(fan, duty)
        .context("Failed to set fan duty")?;
    println!("✅ Fan {} set to {}%", fan.index() + 1, duty);
    Ok(())
}

fn cmd_set_rpm(path: Option<&str>, fan: FanSlot, rpm: u32) -> Result<()> {
    let mut commander = open_device(path)?;
    commander
        .set_fixed_rpm(fan, rpm)
        .context("Failed to set fan RPM")?;
    println!("✅ Fan {} set to {} RPM", fan.index() + 1, rpm);
    Ok(())
}

fn cmd_set_profile(
    path: Option<&str>,
    fan: FanSlot,
    profile: &SpeedProfile,
) -> Result<()> {
    let points = profile.to_duty_profile()?;
    let mut commander = open_device(path)?;
    commander
        .set_speed_profile(fan, &points)
        .context("Failed to apply speed profile")?;
    println!("✅ Fan {} now follows the {} profile", fan.index() + 1, profile);
    Ok(())
}

fn cmd_set_graph(
    path: Option<&str>,
    fan: FanSlot,
    thermometer: ThermometerSlot,
    points: &str,
) -> Result<()> {
    let points = parse_curve_points(points)?;
    let curve = FanCurve::padded(thermometer, fan, &points)?;

    let mut commander = open_device(path)?;
    commander
        .set_speed_graph(&curve)
        .context("Failed to program fan curve")?;

    println!(
        "✅ Fan {} follows thermometer {}:",
        fan.index() + 1,
        thermometer.index() + 1
    );
    for (temp, rpm) in curve.temperatures().iter().zip(curve.speeds()) {
        println!("   {:>6.2}°C -> {:>5} RPM", temp, rpm);
    }
    Ok(())
}

fn cmd_set_color(
    path: Option<&str>,
    channel: Channel,
    effect: &str,
    colors: &[(u8, u8, u8)],
) -> Result<()> {
    let effect = parse_effect(effect)?;
    let colours: Vec<Rgb> = colors.iter().map(|&(r, g, b)| Rgb::new(r, g, b)).collect();

    let mut commander = open_device(path)?;
    commander
        .set_color(channel, effect, &colours)
        .context("Failed to program LEDs")?;
    println!("✅ {} set to {:?}", channel, effect);
    Ok(())
}

fn cmd_apply_leds(path: Option<&str>, file: &Path) -> Result<()> {
    let config = load_led_config(file)
        .with_context(|| format!("Failed to load LED configuration {:?}", file))?;
    let channel = config.channel;
    let groups = config.groups.len();

    let mut commander = open_device(path)?;
    commander
        .set_led_config(config)
        .context("Failed to program LEDs")?;
    println!("✅ {} programmed with {} LED group(s)", channel, groups);
    Ok(())
}

fn cmd_led_temperature(path: Option<&str>, channel: Channel, celsius: u16) -> Result<()> {
    let mut commander = open_device(path)?;
    commander
        .notify_led_temperature(channel, celsius)
        .context("Failed to send LED temperature")?;
    println!("✅ {} temperature set to {}°C", channel, celsius);
    Ok(())
}

fn cmd_temperature_info(path: Option<&str>, sensor: u8, celsius: f64) -> Result<()> {
    let mut commander = open_device(path)?;
    commander
        .send_temperature_info(sensor, celsius)
        .context("Failed to send temperature info")?;
    println!("✅ Sensor {} temperature set to {:.2}°C", sensor, celsius);
    Ok(())
}

fn cmd_set_fan_mode(
    path: Option<&str>,
    fan: FanSlot,
    mode: FanMode,
) -> Result<()> {
    let mut commander = open_device(path)?;
    commander
        .set_fan_mode(fan, mode)
        .context("Failed to set fan mode")?;
    println!("✅ Fan {} mode set to {:?}", fan.index() + 1, mode);
    Ok(())
}

fn cmd_diagnostics(path: Option<&str>) -> Result<()> {
    let mut commander = open_device(path)?;
    let info = commander
        .initialize()
        .context("Failed to initialize device")?;

    println!("🔍 {}", info);
    println!("{}", "─".repeat(50));

    for fan in FanSlot::all() {
        let duty = commander.fan_duty(fan)?;
        println!("  Fan {} duty:        {:>3}%", fan.index() + 1, duty);
    }
    for rail in VoltageRail::ALL {
        let volts = commander.voltage(rail)?;
        println!("  {:<18} {:.3} V", rail.label(), volts);
    }

    println!("{}", "─".repeat(50));
    for channel in Channel::ALL {
        let mask = commander.led_strip_mask(channel)?;
        println!("  {} LED mask: {:02X?}", channel, mask.as_bytes());
    }
    let count = commander.port_led_count()?;
    println!("  LED count:          {:02X?}", count.as_bytes());
    Ok(())
}
