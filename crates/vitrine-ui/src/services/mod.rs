//! Network services (wasm only).

pub(crate) mod api;
