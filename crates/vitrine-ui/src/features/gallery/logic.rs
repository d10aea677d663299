//! Request planning and defensive client-side filtering for the listing.

use crate::core::logic::encode_query;
use crate::features::gallery::state::GalleryState;
use crate::models::{GalleryTab, MediaCard};

/// Planned listing request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListRequest {
    /// Path plus query string, ready for the HTTP client.
    pub path: String,
    /// Whether the tag set was included; drives the 5xx fallback.
    pub tags_sent: bool,
}

/// How a failed listing call should be handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListFailure {
    /// 403/404: fixed "not available" message, no retry.
    Unavailable,
    /// 5xx with tags in the query: downgrade the session to local tag
    /// filtering, notice once, retry without tags.
    TagFallback,
    /// Anything else: surface the server text or a generic fallback.
    Surface,
}

/// Build the listing request for the current filter state.
///
/// Tags travel as one comma-delimited parameter until the session marks the
/// endpoint tag-unsupported. The status filter only applies to `/media/my`.
#[must_use]
pub fn build_list_request(state: &GalleryState) -> ListRequest {
    let base = match state.tab {
        GalleryTab::All => "/media",
        GalleryTab::Mine => "/media/my",
    };
    let mut pairs = vec![
        ("page", state.page.to_string()),
        ("per_page", state.per_page.to_string()),
    ];
    if let Some(kind) = state.kind_filter {
        pairs.push(("media_type", kind.as_wire().to_string()));
    }
    if let Some(subject) = &state.subject_filter {
        pairs.push(("gender", subject.clone()));
    }
    let tags_sent = !state.tag_filter.is_empty() && !state.tags_unsupported;
    if tags_sent {
        pairs.push(("tags", state.tag_filter.join(",")));
    }
    if state.tab == GalleryTab::Mine {
        if let Some(status) = state.status_filter {
            pairs.push(("status", status.as_wire().to_string()));
        }
    }
    ListRequest {
        path: format!("{base}?{}", encode_query(&pairs)),
        tags_sent,
    }
}

/// Classify a listing failure by status code.
#[must_use]
pub const fn classify_list_failure(status: u16, tags_sent: bool) -> ListFailure {
    match status {
        403 | 404 => ListFailure::Unavailable,
        500..=599 if tags_sent => ListFailure::TagFallback,
        _ => ListFailure::Surface,
    }
}

/// Re-apply the active filters to a fetched page.
///
/// The server is expected to have filtered already; this pass guarantees a
/// server bug never produces visibly inconsistent results. Tag filtering is
/// conjunctive: an item must carry every selected tag.
#[must_use]
pub fn apply_client_filters(state: &GalleryState, items: Vec<MediaCard>) -> Vec<MediaCard> {
    items
        .into_iter()
        .filter(|item| {
            if let Some(kind) = state.kind_filter {
                if item.kind != kind {
                    return false;
                }
            }
            if let Some(subject) = &state.subject_filter {
                if !item.subject.is_empty() && item.subject != *subject {
                    return false;
                }
            }
            if !state
                .tag_filter
                .iter()
                .all(|tag| item.tags.iter().any(|t| t == tag))
            {
                return false;
            }
            if state.tab == GalleryTab::Mine {
                if let Some(status) = state.status_filter {
                    if item.status != status {
                        return false;
                    }
                }
            }
            true
        })
        .collect()
}

/// Page-scoped text match over title, description and tags.
#[must_use]
pub fn matches_query(card: &MediaCard, query: &str) -> bool {
    let needle = query.to_lowercase();
    card.title.to_lowercase().contains(&needle)
        || card.description.to_lowercase().contains(&needle)
        || card
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(&needle))
}

/// Whether a follow-up silent refresh should be scheduled after this page.
/// Only the Mine tab polls, and only while something is still transcoding.
#[must_use]
pub fn should_schedule_poll(state: &GalleryState) -> bool {
    state.tab == GalleryTab::Mine && state.rows.iter().any(|row| row.status.in_flight())
}

/// Page to navigate to after a delete left the current page empty.
#[must_use]
pub const fn page_after_delete(page: u32, remaining_on_page: usize) -> Option<u32> {
    if remaining_on_page == 0 && page > 1 {
        Some(page - 1)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::gallery::state::set_rows;
    use vitrine_api_models::{MediaKind, MediaStatus};

    fn card(id: &str, kind: MediaKind, tags: &[&str]) -> MediaCard {
        MediaCard {
            public_id: id.to_string(),
            title: String::new(),
            description: String::new(),
            kind,
            status: MediaStatus::Ready,
            subject: String::new(),
            thumbnail_url: None,
            tags: tags.iter().map(ToString::to_string).collect(),
            liked: false,
            likes_count: 0,
            playable: true,
            width: None,
            height: None,
            like_pending: false,
        }
    }

    #[test]
    fn request_carries_filters_and_tags() {
        let state = GalleryState {
            kind_filter: Some(MediaKind::Video),
            tag_filter: vec!["demo".into()],
            ..GalleryState::default()
        };
        let request = build_list_request(&state);
        assert!(request.tags_sent);
        assert_eq!(
            request.path,
            "/media?page=1&per_page=24&media_type=video&tags=demo"
        );
    }

    #[test]
    fn downgraded_session_omits_tags() {
        let state = GalleryState {
            tag_filter: vec!["demo".into()],
            tags_unsupported: true,
            ..GalleryState::default()
        };
        let request = build_list_request(&state);
        assert!(!request.tags_sent);
        assert!(!request.path.contains("tags="));
    }

    #[test]
    fn status_filter_only_applies_to_mine() {
        let mut state = GalleryState {
            status_filter: Some(MediaStatus::Failed),
            ..GalleryState::default()
        };
        assert!(!build_list_request(&state).path.contains("status="));
        state.tab = crate::models::GalleryTab::Mine;
        let request = build_list_request(&state);
        assert!(request.path.starts_with("/media/my?"));
        assert!(request.path.contains("status=failed"));
    }

    #[test]
    fn failure_classification() {
        assert_eq!(classify_list_failure(403, false), ListFailure::Unavailable);
        assert_eq!(classify_list_failure(404, true), ListFailure::Unavailable);
        assert_eq!(classify_list_failure(500, true), ListFailure::TagFallback);
        assert_eq!(classify_list_failure(500, false), ListFailure::Surface);
        assert_eq!(classify_list_failure(422, true), ListFailure::Surface);
    }

    #[test]
    fn defensive_filter_strips_server_mismatches() {
        // Server ignored the filters: returns an audio item tagged "demo"
        // and an untagged video item. Both must be stripped.
        let state = GalleryState {
            kind_filter: Some(MediaKind::Video),
            tag_filter: vec!["demo".into()],
            ..GalleryState::default()
        };
        let fetched = vec![
            card("audio-demo", MediaKind::Audio, &["demo"]),
            card("video-untagged", MediaKind::Video, &[]),
            card("video-demo", MediaKind::Video, &["demo", "extra"]),
        ];
        let kept = apply_client_filters(&state, fetched);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].public_id, "video-demo");
    }

    #[test]
    fn polling_only_on_mine_with_in_flight_items() {
        let mut state = GalleryState::default();
        let mut processing = card("p", MediaKind::Image, &[]);
        processing.status = MediaStatus::Processing;
        set_rows(&mut state, vec![processing.clone()]);
        assert!(!should_schedule_poll(&state));
        state.tab = crate::models::GalleryTab::Mine;
        assert!(should_schedule_poll(&state));
        set_rows(&mut state, vec![card("r", MediaKind::Image, &[])]);
        assert!(!should_schedule_poll(&state));
    }

    #[test]
    fn empty_page_steps_back_except_on_first() {
        assert_eq!(page_after_delete(2, 0), Some(1));
        assert_eq!(page_after_delete(1, 0), None);
        assert_eq!(page_after_delete(3, 5), None);
    }
}
