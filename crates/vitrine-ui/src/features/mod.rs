//! Feature slices: pure state transformations and request planners.
//!
//! Everything in this tree is host-testable; wasm-only orchestration lives
//! under `app/`, `components/` and `playback/`.

pub mod gallery;
pub mod preview;
pub mod thumbs;
pub mod upload;
