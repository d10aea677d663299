//! Preview modal lifecycle and playback-session state machine.

pub mod state;
