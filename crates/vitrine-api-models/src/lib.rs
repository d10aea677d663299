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
//! Shared HTTP DTOs for the Vitrine gallery API.
//!
//! These types mirror the wire contract consumed by the widget: the listing
//! envelope, item records, playback grants, and the feature-flag document.
//! Normalization of the looser server spellings (media kinds, status labels)
//! lives here so every consumer sees one canonical vocabulary.

use serde::{Deserialize, Serialize};

/// Canonical media kinds after wire normalization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image.
    Image,
    /// Video with a playable stream.
    Video,
    /// Audio-only stream.
    Audio,
}

impl MediaKind {
    /// Normalize the heterogeneous spellings different backend versions emit.
    ///
    /// Accepts canonical names, legacy aliases, and MIME-style prefixes
    /// (`video/mp4`). Unknown values fall back to [`MediaKind::Image`], the
    /// safest rendering path.
    #[must_use]
    pub fn from_wire(raw: &str) -> Self {
        let lowered = raw.trim().to_ascii_lowercase();
        let base = lowered.split('/').next().unwrap_or_default();
        match base {
            "video" | "movie" | "clip" | "film" => Self::Video,
            "audio" | "sound" | "track" | "music" | "voice" => Self::Audio,
            _ => Self::Image,
        }
    }

    /// Wire value used when the widget itself sends a kind filter.
    #[must_use]
    pub const fn as_wire(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

/// Server-side transcoding lifecycle for an item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaStatus {
    /// Accepted, waiting for a transcoder slot.
    Queued,
    /// Transcoding in progress.
    Processing,
    /// Fully processed and servable.
    Ready,
    /// Processing failed; eligible for requeue.
    Failed,
}

impl MediaStatus {
    /// Normalize status labels, tolerating legacy spellings.
    #[must_use]
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "queued" | "pending" | "waiting" => Self::Queued,
            "processing" | "transcoding" | "in_progress" => Self::Processing,
            "failed" | "error" => Self::Failed,
            _ => Self::Ready,
        }
    }

    /// Wire value for status filters.
    #[must_use]
    pub const fn as_wire(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }

    /// Whether the backend is still writing to this record.
    #[must_use]
    pub const fn in_flight(self) -> bool {
        matches!(self, Self::Queued | Self::Processing)
    }
}

/// One media item as returned by the listing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaItemDto {
    /// Opaque stable identifier; primary key for all item operations.
    pub public_id: String,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Optional longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// Raw media kind as the server spells it; normalize via
    /// [`MediaKind::from_wire`].
    #[serde(default)]
    pub media_type: String,
    /// Raw processing status; normalize via [`MediaStatus::from_wire`].
    #[serde(default)]
    pub status: String,
    /// Subject/category label, used by the subject filter.
    #[serde(default)]
    pub gender: Option<String>,
    /// Thumbnail image URL, when one has been generated.
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    /// Tags applied to the item.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Whether the requesting viewer has liked the item.
    #[serde(default)]
    pub liked: bool,
    /// Total like count.
    #[serde(default)]
    pub likes_count: u32,
    /// Whether playback is currently permitted for the viewer.
    #[serde(default)]
    pub playable: bool,
    /// Declared pixel width, when known.
    #[serde(default)]
    pub width: Option<u32>,
    /// Declared pixel height, when known.
    #[serde(default)]
    pub height: Option<u32>,
}

/// Envelope for `GET /media` and `GET /media/my`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaListResponse {
    /// Items for the requested page.
    #[serde(default)]
    pub media_items: Vec<MediaItemDto>,
    /// Total matching items across all pages, when reported.
    #[serde(default)]
    pub total: Option<u32>,
    /// Echoed page number, when reported.
    #[serde(default)]
    pub page: Option<u32>,
    /// Echoed page size, when reported.
    #[serde(default)]
    pub per_page: Option<u32>,
}

/// Registration payload for `POST /media` after the raw file is stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterMediaRequest {
    /// Identifier returned by the raw upload endpoint.
    pub upload_id: String,
    /// Item title.
    pub title: String,
    /// Subject/category choice.
    pub gender: String,
    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional tag set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Watermark toggle, only sent for image/video uploads when the user may
    /// toggle it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watermark_enabled: Option<bool>,
    /// Watermark preset under the current field name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watermark_choice: Option<String>,
    /// Same preset under the legacy field name; older servers read this one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watermark_preset_id: Option<String>,
    /// Explicit authorization acknowledgment.
    pub authorized: bool,
}

/// Response from the raw upload endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResponse {
    /// Opaque upload identifier; absent when storage rejected the file.
    #[serde(default)]
    pub id: Option<String>,
}

/// Minimal acknowledgment returned by like/unlike.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AckResponse {
    /// Whether the mutation was applied. No counts are returned.
    #[serde(default)]
    pub success: bool,
}

/// Security policy attached to a playback grant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecurityPolicyDto {
    /// Whether the client must send keep-alive heartbeats.
    #[serde(default)]
    pub heartbeat_enabled: bool,
    /// Server-requested heartbeat cadence in seconds.
    #[serde(default)]
    pub heartbeat_interval_seconds: Option<u32>,
    /// Whether the client should release the token on close/end.
    #[serde(default)]
    pub revoke_enabled: bool,
}

/// Playback grant from `GET /media/:id/play`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayGrant {
    /// Progressive stream URL.
    #[serde(default)]
    pub stream_url: Option<String>,
    /// Adaptive playlist URL, preferred when present.
    #[serde(default, alias = "playlist_url")]
    pub hls_url: Option<String>,
    /// Opaque session token carried by heartbeat/revoke calls.
    #[serde(default)]
    pub token: Option<String>,
    /// Session policy; absent means no heartbeat and no revoke.
    #[serde(default)]
    pub security: Option<SecurityPolicyDto>,
}

/// Token payload for heartbeat and revoke calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenRequest {
    /// The active playback token.
    pub token: String,
}

/// Watermark feature flags from `GET /media/config`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatermarkConfig {
    /// Whether watermarking is available at all.
    #[serde(default)]
    pub enabled: bool,
    /// Whether the uploader may turn the watermark on/off.
    #[serde(default)]
    pub user_can_toggle: bool,
    /// Whether the uploader may pick a preset.
    #[serde(default)]
    pub user_can_choose_preset: bool,
    /// Selectable presets; servers have shipped this under two names.
    #[serde(default, alias = "presets")]
    pub choices: Vec<String>,
    /// Preset preselected when the uploader makes no choice.
    #[serde(default)]
    pub default_choice: Option<String>,
}

/// Feature-flag document for the gallery widget.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GalleryConfig {
    /// Watermark capability flags.
    #[serde(default)]
    pub watermark: WatermarkConfig,
}

/// Error body most endpoints return on failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    /// Human-readable error text, when the server provides one.
    #[serde(default, alias = "message")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_kind_normalizes_aliases_and_mime_prefixes() {
        assert_eq!(MediaKind::from_wire("video"), MediaKind::Video);
        assert_eq!(MediaKind::from_wire("Movie"), MediaKind::Video);
        assert_eq!(MediaKind::from_wire("video/mp4"), MediaKind::Video);
        assert_eq!(MediaKind::from_wire("audio/ogg"), MediaKind::Audio);
        assert_eq!(MediaKind::from_wire("track"), MediaKind::Audio);
        assert_eq!(MediaKind::from_wire("photo"), MediaKind::Image);
        assert_eq!(MediaKind::from_wire(""), MediaKind::Image);
    }

    #[test]
    fn media_status_tolerates_legacy_labels() {
        assert_eq!(MediaStatus::from_wire("pending"), MediaStatus::Queued);
        assert_eq!(
            MediaStatus::from_wire("transcoding"),
            MediaStatus::Processing
        );
        assert_eq!(MediaStatus::from_wire("error"), MediaStatus::Failed);
        assert_eq!(MediaStatus::from_wire("ready"), MediaStatus::Ready);
        assert!(MediaStatus::Queued.in_flight());
        assert!(!MediaStatus::Ready.in_flight());
    }

    #[test]
    fn list_envelope_defaults_missing_fields() {
        let parsed: MediaListResponse =
            serde_json::from_str(r#"{"media_items":[{"public_id":"a1"}]}"#).unwrap();
        assert_eq!(parsed.media_items.len(), 1);
        assert_eq!(parsed.media_items[0].public_id, "a1");
        assert_eq!(parsed.total, None);
        assert!(!parsed.media_items[0].liked);
    }

    #[test]
    fn play_grant_accepts_playlist_alias() {
        let parsed: PlayGrant = serde_json::from_str(
            r#"{"stream_url":"https://cdn/x.mp4","playlist_url":"https://cdn/x.m3u8","token":"t"}"#,
        )
        .unwrap();
        assert_eq!(parsed.hls_url.as_deref(), Some("https://cdn/x.m3u8"));
        assert!(parsed.security.is_none());
    }

    #[test]
    fn watermark_config_accepts_presets_alias() {
        let parsed: WatermarkConfig = serde_json::from_str(
            r#"{"enabled":true,"user_can_choose_preset":true,"presets":["corner","center"]}"#,
        )
        .unwrap();
        assert_eq!(parsed.choices, vec!["corner", "center"]);
        assert!(parsed.enabled);
        assert!(!parsed.user_can_toggle);
    }

    #[test]
    fn register_request_omits_unset_watermark_fields() {
        let request = RegisterMediaRequest {
            upload_id: "u1".into(),
            title: "t".into(),
            gender: "any".into(),
            description: None,
            tags: None,
            watermark_enabled: None,
            watermark_choice: None,
            watermark_preset_id: None,
            authorized: true,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("watermark"));
        assert!(json.contains("\"authorized\":true"));
    }
}
