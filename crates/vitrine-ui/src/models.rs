//! UI-side models derived from the REST DTOs plus the host embed config.

use serde_json::Value;
use vitrine_api_models::{MediaItemDto, MediaKind, MediaStatus};

/// UI-friendly media snapshot used across list/state helpers.
///
/// Built from [`MediaItemDto`] with kind/status normalized, then augmented
/// with per-item mutation bookkeeping that is never serialized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaCard {
    /// Opaque stable identifier; primary key for all item operations.
    pub public_id: String,
    /// Display title.
    pub title: String,
    /// Longer description (empty if missing).
    pub description: String,
    /// Normalized media kind.
    pub kind: MediaKind,
    /// Normalized processing status.
    pub status: MediaStatus,
    /// Subject/category label (empty if missing).
    pub subject: String,
    /// Thumbnail image URL, when one has been generated.
    pub thumbnail_url: Option<String>,
    /// Tags applied to the item.
    pub tags: Vec<String>,
    /// Whether the viewer has liked the item.
    pub liked: bool,
    /// Total like count.
    pub likes_count: u32,
    /// Whether playback is permitted for the viewer.
    pub playable: bool,
    /// Declared pixel width, when known.
    pub width: Option<u32>,
    /// Declared pixel height, when known.
    pub height: Option<u32>,
    /// A like/unlike call is outstanding for this item.
    pub like_pending: bool,
}

impl From<MediaItemDto> for MediaCard {
    fn from(dto: MediaItemDto) -> Self {
        Self {
            public_id: dto.public_id,
            title: dto.title,
            description: dto.description.unwrap_or_default(),
            kind: MediaKind::from_wire(&dto.media_type),
            status: MediaStatus::from_wire(&dto.status),
            subject: dto.gender.unwrap_or_default(),
            thumbnail_url: dto.thumbnail_url,
            tags: dto.tags,
            liked: dto.liked,
            likes_count: dto.likes_count,
            playable: dto.playable,
            width: dto.width,
            height: dto.height,
            like_pending: false,
        }
    }
}

/// Active listing tab.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GalleryTab {
    /// Public listing (`GET /media`).
    #[default]
    All,
    /// Viewer-owned listing (`GET /media/my`).
    Mine,
}

/// Host embed configuration read once at startup from `window.__VITRINE__`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WidgetConfig {
    /// REST base URL; same-origin when absent.
    pub api_base: Option<String>,
    /// Allow-list of selectable tags.
    pub tags: Vec<String>,
    /// Navigation label override.
    pub nav_label: Option<String>,
    /// Whether the host shows the gallery nav entry.
    pub show_nav: bool,
    /// Optional upload-terms URL linked from the upload panel.
    pub terms_url: Option<String>,
    /// Preferred page size.
    pub per_page: Option<u32>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            api_base: None,
            tags: Vec::new(),
            nav_label: None,
            show_nav: true,
            terms_url: None,
            per_page: None,
        }
    }
}

impl WidgetConfig {
    /// Parse the host config object. Hosts have shipped the tag allow-list
    /// both as a delimited string and as an array; accept either.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let get_str =
            |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            api_base: get_str("api_base"),
            tags: value.get("tags").map(parse_tag_list).unwrap_or_default(),
            nav_label: get_str("nav_label"),
            show_nav: value
                .get("show_nav")
                .and_then(Value::as_bool)
                .unwrap_or(true),
            terms_url: get_str("terms_url"),
            per_page: value
                .get("per_page")
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok()),
        }
    }
}

fn parse_tag_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_normalizes_kind_and_status() {
        let dto: MediaItemDto = serde_json::from_str(
            r#"{"public_id":"m1","title":"clip","media_type":"movie","status":"transcoding"}"#,
        )
        .unwrap();
        let card = MediaCard::from(dto);
        assert_eq!(card.kind, MediaKind::Video);
        assert_eq!(card.status, MediaStatus::Processing);
        assert!(!card.like_pending);
        assert_eq!(card.likes_count, 0);
    }

    #[test]
    fn widget_config_accepts_string_or_array_tags() {
        let from_string = WidgetConfig::from_value(
            &serde_json::json!({"tags": "demo, art ,", "per_page": 12}),
        );
        assert_eq!(from_string.tags, vec!["demo", "art"]);
        assert_eq!(from_string.per_page, Some(12));
        assert!(from_string.show_nav);

        let from_array = WidgetConfig::from_value(
            &serde_json::json!({"tags": ["demo", " art "], "show_nav": false}),
        );
        assert_eq!(from_array.tags, vec!["demo", "art"]);
        assert!(!from_array.show_nav);
    }

    #[test]
    fn widget_config_defaults_when_host_omits_fields() {
        let config = WidgetConfig::from_value(&serde_json::json!({}));
        assert_eq!(config, WidgetConfig::default());
        assert!(config.show_nav);
    }
}
