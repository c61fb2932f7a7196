//! Device layer for the Corsair Commander Pro.
//!
//! The request dispatcher and LED sequencer sit on top of a small
//! [`Transport`] trait; [`CommanderPro`] is the caller-facing session.

pub mod commander;
pub mod dispatcher;
pub mod sequencer;
pub mod transport;

pub use commander::CommanderPro;
pub use dispatcher::Dispatcher;
pub use sequencer::{LedSequencer, SequenceStep};
pub use transport::Transport;
