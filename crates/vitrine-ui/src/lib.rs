#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
//! Embeddable media gallery widget for the forum platform.
//!
//! The crate splits into a host-testable layer — listing filters, optimistic
//! like bookkeeping, thumbnail retry, upload validation, and the playback
//! session lifecycle, all pure transitions — and a wasm-only layer that
//! renders them and executes the side effects (network, media elements,
//! timers, fullscreen).

pub mod core;
pub mod features;
pub mod i18n;
pub mod models;

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod components;
#[cfg(target_arch = "wasm32")]
mod playback;
#[cfg(target_arch = "wasm32")]
mod services;

#[cfg(target_arch = "wasm32")]
pub use app::run_app;

#[cfg(test)]
mod tests {
    use crate::core::logic::{clamp_aspect, total_pages};
    use crate::i18n::{LocaleCode, TranslationBundle};

    #[test]
    fn translation_fallbacks_work() {
        let bundle = TranslationBundle::new(LocaleCode::Fr);
        assert_eq!(bundle.text("tabs.all", ""), "Tous les médias");
        assert_eq!(bundle.text("tabs.missing_key", "Default"), "Default");
    }

    #[test]
    fn shared_math_helpers_hold_their_bounds() {
        assert_eq!(total_pages(0, 24), 1);
        assert_eq!(total_pages(25, 24), 2);
        assert!((clamp_aspect(10.0) - 2.4).abs() < 1e-9);
    }
}
