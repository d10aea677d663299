//! Thumbnail retry/backoff bookkeeping.

pub mod state;
