//! Lightweight JSON-backed translations with per-locale bundles.

use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;

/// Supported locale codes for the embedded widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocaleCode {
    /// German.
    De,
    /// English.
    En,
    /// French.
    Fr,
}

impl LocaleCode {
    /// All supported locales in display order.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::De, Self::En, Self::Fr]
    }

    /// RFC 5646 string for the locale.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::De => "de",
            Self::En => "en",
            Self::Fr => "fr",
        }
    }

    /// Human-friendly label for dropdowns.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::De => "Deutsch",
            Self::En => "English",
            Self::Fr => "Français",
        }
    }

    /// Map an arbitrary browser language tag to a supported locale, falling back to None.
    #[must_use]
    pub fn from_lang_tag(tag: &str) -> Option<Self> {
        let lowered = tag.to_ascii_lowercase();
        let base = lowered.split('-').next().unwrap_or_default();
        Self::all()
            .iter()
            .copied()
            .find(|locale| locale.code() == base)
    }
}

/// Default fallback locale.
pub const DEFAULT_LOCALE: LocaleCode = LocaleCode::En;

/// Translation bundle containing a parsed JSON tree for the locale.
#[derive(Clone, Debug)]
pub struct TranslationBundle {
    /// Locale backing this bundle.
    pub locale: LocaleCode,
    tree: Value,
    rtl: bool,
}

impl PartialEq for TranslationBundle {
    fn eq(&self, other: &Self) -> bool {
        self.locale == other.locale
    }
}

impl TranslationBundle {
    /// Build a translation bundle for the given locale, falling back to English.
    ///
    /// The bundle will gracefully degrade to English strings when a key is missing.
    #[must_use]
    pub fn new(locale: LocaleCode) -> Self {
        let raw = raw_locale(locale);
        let tree: Value = serde_json::from_str(raw).unwrap_or(Value::Null);
        let rtl = tree
            .get("meta")
            .and_then(|meta| meta.get("rtl"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        Self { locale, tree, rtl }
    }

    /// Resolve a dotted path (`section.key`) with English fallback and caller default.
    #[must_use]
    pub fn text(&self, path: &str, default: &str) -> String {
        resolve(&self.tree, path)
            .or_else(|| resolve(&EN_FALLBACK.tree, path))
            .unwrap_or_else(|| default.to_string())
    }

    /// Whether the locale prefers RTL layout (bidi).
    #[must_use]
    pub const fn rtl(&self) -> bool {
        self.rtl
    }
}

static EN_FALLBACK: LazyLock<TranslationBundle> =
    LazyLock::new(|| TranslationBundle::new(LocaleCode::En));

fn resolve(tree: &Value, path: &str) -> Option<String> {
    let mut node = tree;
    for segment in path.split('.') {
        node = node.get(segment)?;
    }
    node.as_str().map(ToString::to_string)
}

const fn raw_locale(locale: LocaleCode) -> &'static str {
    match locale {
        LocaleCode::De => include_str!("../../i18n/de.json"),
        LocaleCode::En => include_str!("../../i18n/en.json"),
        LocaleCode::Fr => include_str!("../../i18n/fr.json"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_falls_back_to_default() {
        let bundle = TranslationBundle::new(LocaleCode::Fr);
        assert_eq!(bundle.text("nonexistent.key", "fallback"), "fallback");
    }

    #[test]
    fn non_english_bundle_falls_back_to_english_per_key() {
        let bundle = TranslationBundle::new(LocaleCode::De);
        assert_eq!(bundle.text("tabs.mine", ""), "Meine Medien");
        // A key present only in the English tree still resolves.
        assert!(!bundle.text("banner.dismiss", "x").is_empty());
    }

    #[test]
    fn bundles_load_all_locales() {
        for locale in LocaleCode::all() {
            let bundle = TranslationBundle::new(locale);
            assert!(!bundle.text("nav.gallery", "Gallery").is_empty());
            assert!(!bundle.rtl());
        }
    }

    #[test]
    fn lang_tags_map_to_base_locale() {
        assert_eq!(LocaleCode::from_lang_tag("fr-CA"), Some(LocaleCode::Fr));
        assert_eq!(LocaleCode::from_lang_tag("de"), Some(LocaleCode::De));
        assert_eq!(LocaleCode::from_lang_tag("ja-JP"), None);
    }
}
