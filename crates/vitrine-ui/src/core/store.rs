//! App-wide yewdux store slices.
//!
//! # Design
//! - Keep shared UI state in one store to avoid ad-hoc contexts.
//! - Use small, focused slices so reducers stay predictable.
//! - Cross-slice consistency (the preview's item snapshot tracking the list)
//!   goes through the helpers here, never through re-derivation in views.

use crate::features::gallery::state::{self as gallery, GalleryState, LikeRollback};
use crate::features::preview::state::{self as preview, PreviewState};
use crate::features::thumbs::state::ThumbsState;
use crate::features::upload::state::UploadState;
use crate::models::{MediaCard, WidgetConfig};
use vitrine_api_models::{MediaListResponse, WatermarkConfig};
use yewdux::store::Store;

/// Startup configuration slice: host embed config plus server feature flags.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ConfigState {
    /// Host embed configuration, read once at boot.
    pub widget: WidgetConfig,
    /// Watermark capability flags from `GET /media/config`.
    pub watermark: WatermarkConfig,
}

/// Global application store for shared state.
#[derive(Clone, Debug, PartialEq, Store, Default)]
pub struct AppStore {
    /// Listing/filter/mutation state.
    pub gallery: GalleryState,
    /// Thumbnail retry bookkeeping, decoupled from the replaceable rows.
    pub thumbs: ThumbsState,
    /// Upload panel state.
    pub upload: UploadState,
    /// Preview/playback session state.
    pub preview: PreviewState,
    /// Startup configuration.
    pub config: ConfigState,
}

/// Apply a fetched (and already client-filtered) page to the store.
///
/// Page/size/total fall back to the locally held values when the server
/// envelope omits them.
pub fn apply_page(store: &mut AppStore, cards: Vec<MediaCard>, envelope: &MediaListResponse) {
    if let Some(page) = envelope.page {
        store.gallery.page = page.max(1);
    }
    if let Some(per_page) = envelope.per_page {
        store.gallery.per_page = per_page.max(1);
    }
    store.gallery.total = envelope
        .total
        .unwrap_or_else(|| u32::try_from(cards.len()).unwrap_or(u32::MAX));
    gallery::set_rows(&mut store.gallery, cards);
    sync_preview_item(store);
}

/// Optimistically toggle a like, keeping the preview snapshot in step.
pub fn begin_like(store: &mut AppStore, id: &str) -> Option<LikeRollback> {
    let rollback = gallery::begin_like(&mut store.gallery, id);
    if rollback.is_some() {
        sync_preview_item(store);
    }
    rollback
}

/// Confirm a like call.
pub fn settle_like(store: &mut AppStore, id: &str) {
    gallery::settle_like(&mut store.gallery, id);
    sync_preview_item(store);
}

/// Roll a failed like back to the exact pre-mutation values.
pub fn rollback_like(store: &mut AppStore, id: &str, rollback: LikeRollback) {
    gallery::rollback_like(&mut store.gallery, id, rollback);
    sync_preview_item(store);
}

fn sync_preview_item(store: &mut AppStore) {
    let Some(id) = store
        .preview
        .item
        .as_ref()
        .map(|item| item.public_id.clone())
    else {
        return;
    };
    if let Some(row) = gallery::select_row(&store.gallery, &id) {
        preview::sync_item(&mut store.preview, &row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::preview::state::open;
    use vitrine_api_models::{MediaKind, MediaStatus};

    fn card(id: &str, likes: u32) -> MediaCard {
        MediaCard {
            public_id: id.to_string(),
            title: String::new(),
            description: String::new(),
            kind: MediaKind::Video,
            status: MediaStatus::Ready,
            subject: String::new(),
            thumbnail_url: None,
            tags: Vec::new(),
            liked: false,
            likes_count: likes,
            playable: true,
            width: None,
            height: None,
            like_pending: false,
        }
    }

    #[test]
    fn page_application_falls_back_to_held_values() {
        let mut store = AppStore::default();
        store.gallery.page = 2;
        store.gallery.per_page = 12;
        let envelope = MediaListResponse {
            media_items: Vec::new(),
            total: Some(30),
            page: None,
            per_page: None,
        };
        apply_page(&mut store, vec![card("a", 0)], &envelope);
        assert_eq!(store.gallery.page, 2);
        assert_eq!(store.gallery.per_page, 12);
        assert_eq!(store.gallery.total, 30);
        assert_eq!(store.gallery.rows.len(), 1);
    }

    #[test]
    fn missing_total_falls_back_to_row_count() {
        let mut store = AppStore::default();
        let envelope = MediaListResponse {
            media_items: Vec::new(),
            total: None,
            page: Some(1),
            per_page: Some(24),
        };
        apply_page(&mut store, vec![card("a", 0), card("b", 0)], &envelope);
        assert_eq!(store.gallery.total, 2);
    }

    #[test]
    fn like_mutations_propagate_to_open_preview() {
        let mut store = AppStore::default();
        gallery::set_rows(&mut store.gallery, vec![card("v1", 3)]);
        open(&mut store.preview, card("v1", 3));
        let rollback = begin_like(&mut store, "v1").unwrap();
        assert_eq!(
            store.preview.item.as_ref().map(|item| item.likes_count),
            Some(4)
        );
        rollback_like(&mut store, "v1", rollback);
        assert_eq!(
            store.preview.item.as_ref().map(|item| item.likes_count),
            Some(3)
        );
        assert!(store.preview.item.as_ref().is_some_and(|item| !item.liked));
    }
}
