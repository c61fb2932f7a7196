//! Corsair Commander Pro Library
//!
//! A Rust driver for the Corsair Commander Pro fan and lighting controller.
//!
//! # Features
//!
//! - Read device status (fan speeds, temperatures, rail voltages)
//! - Set fixed fan duty or RPM, or program temperature-driven fan curves
//! - Program LED effects on both lighting channels
//!
//! # Example
//!
//! ```no_run
//! use corsair_commander_rs::device::CommanderPro;
//! use corsair_commander_rs::protocol::{Channel, Effect, FanSlot, Rgb};
//! use corsair_commander_rs::config::SpeedProfile;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Open and initialize the device
//!     let mut commander = CommanderPro::open()?;
//!     let info = commander.initialize()?;
//!     println!("Connected! Firmware: {}", info.firmware);
//!
//!     // Read current status
//!     for sample in commander.get_status()? {
//!         println!("{}", sample);
//!     }
//!
//!     // Set a fixed speed on fan 1
//!     let fan = FanSlot::new(0)?;
//!     commander.set_fixed_speed(fan, 50)?;
//!
//!     // Or use a profile
//!     let profile = SpeedProfile::Silent.to_duty_profile()?;
//!     commander.set_speed_profile(fan, &profile)?;
//!
//!     // Solid red on every fan of channel 1
//!     commander.set_color(Channel::One, Effect::Static, &[Rgb::new(255, 0, 0)])?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod device;
pub mod error;
pub mod protocol;
pub mod utils;

// Re-exports for convenience
pub use device::CommanderPro;
pub use error::{CommanderError, Result};
pub use protocol::{Channel, FanSlot, ThermometerSlot};
