//! Persistence and environment helpers for the widget shell.

use crate::i18n::{DEFAULT_LOCALE, LocaleCode};
use crate::models::WidgetConfig;
use gloo::console;
use gloo::storage::{LocalStorage, Storage};
use gloo::utils::window;
use wasm_bindgen::JsValue;

pub(crate) const LOCALE_KEY: &str = "vitrine.locale";

/// Read the host embed config once at boot. The host publishes it as a
/// plain object on `window.__VITRINE__`; round-trip through JSON so the
/// parsing (and its string-or-array tag handling) stays host-testable.
pub(crate) fn host_config() -> WidgetConfig {
    js_sys::Reflect::get(&window(), &JsValue::from_str("__VITRINE__"))
        .ok()
        .filter(|value| !value.is_undefined() && !value.is_null())
        .and_then(|value| js_sys::JSON::stringify(&value).ok())
        .and_then(|json| json.as_string())
        .and_then(|json| serde_json::from_str::<serde_json::Value>(&json).ok())
        .map(|value| WidgetConfig::from_value(&value))
        .unwrap_or_default()
}

/// API base URL: host-configured, else same-origin relative paths.
pub(crate) fn api_base_url(config: &WidgetConfig) -> String {
    config.api_base.clone().unwrap_or_default()
}

pub(crate) fn load_locale() -> LocaleCode {
    if let Ok(value) = LocalStorage::get::<String>(LOCALE_KEY) {
        if let Some(locale) = LocaleCode::from_lang_tag(&value) {
            return locale;
        }
    }
    if let Some(lang) = window().navigator().language() {
        if let Some(locale) = LocaleCode::from_lang_tag(&lang) {
            return locale;
        }
    }
    DEFAULT_LOCALE
}

pub(crate) fn persist_locale(locale: LocaleCode) {
    if let Err(err) = LocalStorage::set(LOCALE_KEY, locale.code()) {
        console::error!("storage operation failed", LOCALE_KEY, err.to_string());
    }
}
