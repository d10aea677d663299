//! Two-phase upload: raw file store, then gallery registration.

pub mod logic;
pub mod state;
