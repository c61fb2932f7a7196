//! LED programming sequence.
//!
//! Programming a channel takes four priming frames, one SET_LED_MODE frame per
//! LED group and a final trigger, strictly in that order:
//!
//! ```text
//! GroupClear -> Clear -> Brightness -> GroupMode -> Group(0..n) -> Trigger -> Done
//! ```
//!
//! Responses carry no information and are only used as completion signals.
//! The device has no abort command: if the transport fails part-way, the
//! channel stays partially programmed. The failing step is reported in
//! [`CommanderError::LedSequence`] so callers can tell how far it got.

use log::debug;

use crate::device::dispatcher::Dispatcher;
use crate::device::transport::Transport;
use crate::error::{CommanderError, Result};
use crate::protocol::lighting::{
    build_brightness, build_clear, build_group_clear, build_group_mode, build_led_mode,
    build_trigger,
};
use crate::protocol::{LedChannelConfig, RequestFrame};

/// Position in the LED programming sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceStep {
    GroupClear,
    Clear,
    Brightness,
    GroupMode,
    /// Index into the configuration's group list.
    Group(usize),
    Trigger,
    Done,
}

impl SequenceStep {
    /// The step after this one for a configuration with `groups` LED groups.
    pub fn next(self, groups: usize) -> Self {
        match self {
            SequenceStep::GroupClear => SequenceStep::Clear,
            SequenceStep::Clear => SequenceStep::Brightness,
            SequenceStep::Brightness => SequenceStep::GroupMode,
            SequenceStep::GroupMode => Self::group_or_trigger(0, groups),
            SequenceStep::Group(i) => Self::group_or_trigger(i + 1, groups),
            SequenceStep::Trigger | SequenceStep::Done => SequenceStep::Done,
        }
    }

    fn group_or_trigger(index: usize, groups: usize) -> Self {
        if index < groups {
            SequenceStep::Group(index)
        } else {
            SequenceStep::Trigger
        }
    }

    /// Group frames go out back-to-back; every other step clears stale
    /// reports first.
    pub fn clears_stale_reports(self) -> bool {
        !matches!(self, SequenceStep::Group(_))
    }
}

impl std::fmt::Display for SequenceStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceStep::GroupClear => write!(f, "group clear"),
            SequenceStep::Clear => write!(f, "clear"),
            SequenceStep::Brightness => write!(f, "brightness"),
            SequenceStep::GroupMode => write!(f, "group mode"),
            SequenceStep::Group(i) => write!(f, "group {}", i + 1),
            SequenceStep::Trigger => write!(f, "trigger"),
            SequenceStep::Done => write!(f, "done"),
        }
    }
}

/// Drives one [`LedChannelConfig`] through the programming sequence.
#[derive(Debug)]
pub struct LedSequencer {
    config: LedChannelConfig,
    step: SequenceStep,
}

impl LedSequencer {
    /// Validate `config` and start at the first step.
    pub fn new(config: LedChannelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            step: SequenceStep::GroupClear,
        })
    }

    pub fn step(&self) -> SequenceStep {
        self.step
    }

    /// Frame for the current step, or `None` once done.
    pub fn frame(&self) -> Option<RequestFrame> {
        let config = &self.config;
        let frame = match self.step {
            SequenceStep::GroupClear => build_group_clear(),
            SequenceStep::Clear => build_clear(),
            SequenceStep::Brightness => build_brightness(config.brightness),
            SequenceStep::GroupMode => build_group_mode(),
            SequenceStep::Group(i) => {
                build_led_mode(config.channel, config.led_type, &config.groups[i])
            }
            SequenceStep::Trigger => build_trigger(),
            SequenceStep::Done => return None,
        };
        Some(frame)
    }

    /// Move to the next step.
    pub fn advance(&mut self) {
        self.step = self.step.next(self.config.groups.len());
    }

    /// Run every remaining step against `dispatcher`.
    ///
    /// # Errors
    /// Returns `LedSequence` naming the step whose exchange failed. Frames
    /// before that step have already been applied.
    pub fn run<T: Transport>(mut self, dispatcher: &mut Dispatcher<T>) -> Result<()> {
        debug!(
            "Programming {} with {} LED group(s)",
            self.config.channel,
            self.config.groups.len()
        );

        while let Some(frame) = self.frame() {
            let step = self.step;
            let exchanged = if step.clears_stale_reports() {
                dispatcher.execute(&frame)
            } else {
                dispatcher.execute_in_sequence(&frame)
            };
            exchanged.map_err(|source| CommanderError::LedSequence {
                step,
                source: Box::new(source),
            })?;
            self.advance();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::transport::mock::{Event, MockTransport};
    use crate::protocol::{
        Brightness, Channel, ColourMode, Effect, LedEffectConfig, LedGroup, LedType, Rgb,
    };
    use pretty_assertions::assert_eq;

    fn two_group_config() -> LedChannelConfig {
        let colours = [Rgb::new(255, 0, 0), Rgb::new(0, 255, 0)];
        LedChannelConfig::new(Channel::One, LedType::HdFan, Brightness::Medium)
            .with_group(
                LedEffectConfig::new(LedGroup::Fan1, Effect::ColourPulse)
                    .with_colours(&colours)
                    .unwrap()
                    .with_colour_mode(ColourMode::Alternating),
            )
            .with_group(
                LedEffectConfig::new(LedGroup::Fan2, Effect::ColourPulse)
                    .with_colours(&colours)
                    .unwrap()
                    .with_colour_mode(ColourMode::Alternating),
            )
    }

    #[test]
    fn test_step_transitions() {
        let mut step = SequenceStep::GroupClear;
        let mut seen = vec![step];
        while step != SequenceStep::Done {
            step = step.next(2);
            seen.push(step);
        }
        assert_eq!(
            seen,
            vec![
                SequenceStep::GroupClear,
                SequenceStep::Clear,
                SequenceStep::Brightness,
                SequenceStep::GroupMode,
                SequenceStep::Group(0),
                SequenceStep::Group(1),
                SequenceStep::Trigger,
                SequenceStep::Done,
            ]
        );
        assert_eq!(SequenceStep::GroupMode.next(0), SequenceStep::Trigger);
    }

    #[test]
    fn test_two_group_sequence_order() {
        let mut dispatcher = Dispatcher::new(MockTransport::new());
        LedSequencer::new(two_group_config())
            .unwrap()
            .run(&mut dispatcher)
            .unwrap();

        let transport = dispatcher.transport();
        assert_eq!(
            transport.commands(),
            vec![0x37, 0x34, 0x39, 0x38, 0x35, 0x35, 0x33]
        );

        let written = transport.written();
        assert_eq!(written[2][2], Brightness::Medium.id());
        assert_eq!(written[4][2], 0x00);
        assert_eq!(written[5][2], 0x0C);

        use Event::{Clear, Read, Write};
        let shape: Vec<&str> = transport
            .events
            .iter()
            .map(|event| match event {
                Clear => "clear",
                Write(_) => "write",
                Read => "read",
            })
            .collect();
        assert_eq!(
            shape,
            vec![
                "clear", "write", "read", // group clear
                "clear", "write", "read", // clear
                "clear", "write", "read", // brightness
                "clear", "write", "read", // group mode
                "write", "read", // group 1
                "write", "read", // group 2
                "clear", "write", "read", // trigger
            ]
        );
    }

    #[test]
    fn test_failure_reports_step() {
        // Writes 0-3 are priming, 4 is the first group, 5 the second.
        let mut dispatcher = Dispatcher::new(MockTransport::new().failing_on_write(5));
        let err = LedSequencer::new(two_group_config())
            .unwrap()
            .run(&mut dispatcher)
            .unwrap_err();

        match err {
            CommanderError::LedSequence { step, source } => {
                assert_eq!(step, SequenceStep::Group(1));
                assert!(matches!(*source, CommanderError::HidError(_)));
            }
            other => panic!("expected LedSequence, got {:?}", other),
        }
        // No roll back and no trigger after the failure.
        assert_eq!(
            dispatcher.transport().commands(),
            vec![0x37, 0x34, 0x39, 0x38, 0x35]
        );
    }

    #[test]
    fn test_failure_on_first_step() {
        let mut dispatcher = Dispatcher::new(MockTransport::new().failing_on_write(0));
        let err = LedSequencer::new(two_group_config())
            .unwrap()
            .run(&mut dispatcher)
            .unwrap_err();
        assert!(matches!(
            err,
            CommanderError::LedSequence {
                step: SequenceStep::GroupClear,
                ..
            }
        ));
    }

    #[test]
    fn test_too_many_groups_rejected_before_io() {
        let mut config = LedChannelConfig::new(Channel::Two, LedType::SpFan, Brightness::Max);
        for _ in 0..7 {
            config = config.with_group(LedEffectConfig::new(LedGroup::Fan1, Effect::Static));
        }
        assert!(LedSequencer::new(config).is_err());
    }
}
