//! Cross-feature store and shared pure helpers.

pub mod logic;
pub mod store;
