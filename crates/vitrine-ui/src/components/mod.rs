//! Presentational components (wasm only).

pub(crate) mod banner;
pub(crate) mod confirm;
pub(crate) mod filters;
pub(crate) mod gallery;
pub(crate) mod media_card;
pub(crate) mod pagination;
pub(crate) mod preview;
pub(crate) mod thumb;
pub(crate) mod upload;
