//! HID protocol implementation for the Corsair Commander Pro.
//!
//! This module contains the command catalog, the fixed-length frame codec,
//! unit conversions, and the builders and parsers for each command. Nothing
//! in here performs device I/O.

pub mod commands;
pub mod curve;
pub mod frame;
pub mod lighting;
pub mod status;
pub mod units;

pub use commands::*;
pub use curve::{CURVE_POINTS, FanCurve};
pub use frame::{RequestFrame, ResponseFrame};
pub use lighting::{LedChannelConfig, LedEffectConfig, Rgb};
pub use status::*;
