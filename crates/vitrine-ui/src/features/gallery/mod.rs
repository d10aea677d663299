//! Listing, filtering, optimistic likes and delete bookkeeping.

pub mod logic;
pub mod state;
