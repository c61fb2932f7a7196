//! LED effect configuration and the frames that program it.

use serde::{Deserialize, Serialize};

use crate::error::{CommanderError, Result};
use crate::protocol::commands::{
    Brightness, Channel, ColourMode, Command, Direction, Effect, LedGroup, LedType, MAX_LED_GROUPS,
    Speed,
};
use crate::protocol::frame::RequestFrame;

// =============================================================================
// Frame Offsets (SET_LED_MODE)
// =============================================================================

const OFFSET_CHANNEL: usize = 1;
const OFFSET_GROUP: usize = 2;
const OFFSET_LED_TYPE: usize = 3;
const OFFSET_EFFECT: usize = 4;
const OFFSET_SPEED: usize = 5;
const OFFSET_DIRECTION: usize = 6;
const OFFSET_COLOUR_MODE: usize = 7;
const OFFSET_MODE_MARKER: usize = 8;
const OFFSET_COLOURS: usize = 9;

/// Constant byte 8 of every SET_LED_MODE frame.
const MODE_MARKER: u8 = 0xFF;

/// Number of colour slots per effect.
pub const COLOUR_SLOTS: usize = 3;

// =============================================================================
// Colours
// =============================================================================

/// An RGB colour triple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ColourRepr", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl From<Rgb> for String {
    fn from(colour: Rgb) -> String {
        colour.to_string()
    }
}

/// Accepted JSON shapes for a colour: `"#RRGGBB"` or `[r, g, b]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ColourRepr {
    Triple([u8; 3]),
    Hex(HexColour),
}

impl From<ColourRepr> for Rgb {
    fn from(repr: ColourRepr) -> Self {
        match repr {
            ColourRepr::Triple([r, g, b]) => Rgb::new(r, g, b),
            ColourRepr::Hex(HexColour(colour)) => colour,
        }
    }
}

struct HexColour(Rgb);

impl<'de> Deserialize<'de> for HexColour {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        crate::utils::parsing::parse_hex_color(&text)
            .map(|(r, g, b)| HexColour(Rgb::new(r, g, b)))
            .map_err(serde::de::Error::custom)
    }
}

/// Accept 1-3 colours in configuration files.
fn deserialize_colours<'de, D: serde::Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<[Rgb; COLOUR_SLOTS], D::Error> {
    let colours = Vec::<Rgb>::deserialize(deserializer)?;
    pad_colours(&colours).map_err(serde::de::Error::custom)
}

/// Pad 1-3 colours to the three colour slots with black.
///
/// # Errors
/// Returns `InvalidColors` for zero or more than three colours.
pub fn pad_colours(colours: &[Rgb]) -> Result<[Rgb; COLOUR_SLOTS]> {
    if colours.is_empty() || colours.len() > COLOUR_SLOTS {
        return Err(CommanderError::InvalidColors(colours.len()));
    }
    let mut out = [Rgb::BLACK; COLOUR_SLOTS];
    out[..colours.len()].copy_from_slice(colours);
    Ok(out)
}

// =============================================================================
// Configuration
// =============================================================================

/// Effect programming for one LED group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedEffectConfig {
    pub group: LedGroup,
    pub effect: Effect,
    #[serde(default)]
    pub speed: Speed,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub colour_mode: ColourMode,
    /// Ignored by the device in [`ColourMode::Random`].
    #[serde(default, deserialize_with = "deserialize_colours")]
    pub colours: [Rgb; COLOUR_SLOTS],
}

impl LedEffectConfig {
    /// Effect with default speed, direction and colour mode, all colours black.
    pub fn new(group: LedGroup, effect: Effect) -> Self {
        Self {
            group,
            effect,
            speed: Speed::default(),
            direction: Direction::default(),
            colour_mode: ColourMode::default(),
            colours: [Rgb::BLACK; COLOUR_SLOTS],
        }
    }

    /// Set 1-3 colours, padding the rest with black.
    pub fn with_colours(mut self, colours: &[Rgb]) -> Result<Self> {
        self.colours = pad_colours(colours)?;
        Ok(self)
    }

    pub fn with_speed(mut self, speed: Speed) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_colour_mode(mut self, colour_mode: ColourMode) -> Self {
        self.colour_mode = colour_mode;
        self
    }
}

/// Full LED programming for a channel.
///
/// Groups are programmed in the order given. Built by the caller and
/// consumed once by the LED sequencer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedChannelConfig {
    pub channel: Channel,
    pub led_type: LedType,
    #[serde(default)]
    pub brightness: Brightness,
    pub groups: Vec<LedEffectConfig>,
}

impl LedChannelConfig {
    pub fn new(channel: Channel, led_type: LedType, brightness: Brightness) -> Self {
        Self {
            channel,
            led_type,
            brightness,
            groups: Vec::new(),
        }
    }

    pub fn with_group(mut self, group: LedEffectConfig) -> Self {
        self.groups.push(group);
        self
    }

    /// Check the group count against the channel's capacity.
    pub fn validate(&self) -> Result<()> {
        if self.groups.len() > MAX_LED_GROUPS {
            return Err(CommanderError::InvalidInput(format!(
                "{} LED groups given, a channel holds at most {}",
                self.groups.len(),
                MAX_LED_GROUPS
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Frame Builders
// =============================================================================

/// Clear existing LED group assignments.
pub fn build_group_clear() -> RequestFrame {
    RequestFrame::new(Command::SetLedGroupClear)
}

/// Clear the LED pixel buffer.
pub fn build_clear() -> RequestFrame {
    RequestFrame::new(Command::SetLedClear)
}

/// Set the brightness tier: `[0x39, 0x00, tier]`.
pub fn build_brightness(brightness: Brightness) -> RequestFrame {
    RequestFrame::new(Command::SetLedBrightness)
        .with_u8(1, 0x00)
        .with_u8(2, brightness.id())
}

/// Enter group configuration mode: `[0x38, 0x00, 0x01]`.
pub fn build_group_mode() -> RequestFrame {
    RequestFrame::new(Command::SetLedGroupMode)
        .with_u8(1, 0x00)
        .with_u8(2, 0x01)
}

/// Effect frame for one LED group.
pub fn build_led_mode(
    channel: Channel,
    led_type: LedType,
    config: &LedEffectConfig,
) -> RequestFrame {
    let frame = RequestFrame::new(Command::SetLedMode)
        .with_u8(OFFSET_CHANNEL, channel.id())
        .with_u8(OFFSET_GROUP, config.group.offset())
        .with_u8(OFFSET_LED_TYPE, led_type.id())
        .with_u8(OFFSET_EFFECT, config.effect.id())
        .with_u8(OFFSET_SPEED, config.speed.id())
        .with_u8(OFFSET_DIRECTION, config.direction.id())
        .with_u8(OFFSET_COLOUR_MODE, config.colour_mode.id())
        .with_u8(OFFSET_MODE_MARKER, MODE_MARKER);

    if config.colour_mode == ColourMode::Random {
        return frame;
    }

    config
        .colours
        .iter()
        .enumerate()
        .fold(frame, |frame, (i, colour)| {
            frame.with_bytes(OFFSET_COLOURS + 3 * i, &colour.to_bytes())
        })
}

/// Commit all group frames: `[0x33, 0x00, 0xFF]`.
pub fn build_trigger() -> RequestFrame {
    RequestFrame::new(Command::SetLedTrigger).with_u8(2, 0xFF)
}

/// Temperature sample for the temperature-reactive effect.
///
/// `celsius` is sent unscaled in bytes 3-4.
pub fn build_led_temperature(channel: Channel, celsius: u16) -> RequestFrame {
    RequestFrame::new(Command::SetLedTempInfo)
        .with_u8(1, channel.id())
        .with_u16(3, celsius)
}
