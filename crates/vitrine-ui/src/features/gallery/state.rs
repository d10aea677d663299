//! Gallery slice and pure state transformations for testing outside wasm.

use crate::features::gallery::logic::matches_query;
use crate::models::{GalleryTab, MediaCard};
use std::rc::Rc;
use vitrine_api_models::{MediaKind, MediaStatus};

/// Default page size when neither the host nor the server dictates one.
pub const DEFAULT_PER_PAGE: u32 = 24;

/// Gallery slice stored in the app state.
///
/// The row list is replaced wholesale on every refresh and every optimistic
/// mutation; per-item retry bookkeeping lives in the thumbs slice instead so
/// it survives the replacement.
#[derive(Clone, Debug, PartialEq)]
pub struct GalleryState {
    /// Current page rows, in server order.
    pub rows: Vec<Rc<MediaCard>>,
    /// Active listing tab.
    pub tab: GalleryTab,
    /// Free-text query, applied client-side to the current page only.
    pub query: String,
    /// Media-kind filter.
    pub kind_filter: Option<MediaKind>,
    /// Subject/category filter.
    pub subject_filter: Option<String>,
    /// Selected tag set; items must carry every selected tag.
    pub tag_filter: Vec<String>,
    /// Status filter, honored on the Mine tab only.
    pub status_filter: Option<MediaStatus>,
    /// Current page, 1-based.
    pub page: u32,
    /// Page size.
    pub per_page: u32,
    /// Total matching items as last reported by the server.
    pub total: u32,
    /// The listing endpoint rejected tag parameters this session; filter
    /// tags locally and stop sending them.
    pub tags_unsupported: bool,
    /// A non-silent refresh is in flight.
    pub loading: bool,
    /// Transient informational banner.
    pub notice: Option<String>,
    /// Failure banner.
    pub error: Option<String>,
    /// Item awaiting delete confirmation.
    pub confirm_delete: Option<String>,
    /// A delete call is outstanding; the dialog is not dismissible.
    pub delete_busy: bool,
}

impl Default for GalleryState {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            tab: GalleryTab::All,
            query: String::new(),
            kind_filter: None,
            subject_filter: None,
            tag_filter: Vec::new(),
            status_filter: None,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            total: 0,
            tags_unsupported: false,
            loading: false,
            notice: None,
            error: None,
            confirm_delete: None,
            delete_busy: false,
        }
    }
}

/// Snapshot taken before an optimistic like so a failed call can restore
/// the exact prior values instead of recomputing them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LikeRollback {
    /// Liked flag before the optimistic update.
    pub prev_liked: bool,
    /// Like count before the optimistic update.
    pub prev_count: u32,
    /// Direction of the in-flight call (`true` = like, `false` = unlike).
    pub next_liked: bool,
}

/// Replace list rows with a new snapshot.
pub fn set_rows(state: &mut GalleryState, rows: Vec<MediaCard>) {
    state.rows = rows.into_iter().map(Rc::new).collect();
}

/// Clear both user-message channels; every action does this before running.
pub fn clear_messages(state: &mut GalleryState) {
    state.notice = None;
    state.error = None;
}

/// Switch tabs, resetting the page and the mine-only status filter.
pub fn set_tab(state: &mut GalleryState, tab: GalleryTab) {
    if state.tab == tab {
        return;
    }
    state.tab = tab;
    state.page = 1;
    if tab == GalleryTab::All {
        state.status_filter = None;
    }
}

/// Set the media-kind filter and reset to page 1.
pub fn set_kind_filter(state: &mut GalleryState, kind: Option<MediaKind>) {
    state.kind_filter = kind;
    state.page = 1;
}

/// Set the subject filter and reset to page 1.
pub fn set_subject_filter(state: &mut GalleryState, subject: Option<String>) {
    state.subject_filter = subject;
    state.page = 1;
}

/// Toggle one tag in the selected set and reset to page 1.
pub fn toggle_tag(state: &mut GalleryState, tag: &str) {
    if let Some(index) = state.tag_filter.iter().position(|t| t == tag) {
        state.tag_filter.remove(index);
    } else {
        state.tag_filter.push(tag.to_string());
    }
    state.page = 1;
}

/// Set the mine-only status filter and reset to page 1.
pub fn set_status_filter(state: &mut GalleryState, status: Option<MediaStatus>) {
    state.status_filter = status;
    state.page = 1;
}

/// Change the page size and reset to page 1.
pub fn set_per_page(state: &mut GalleryState, per_page: u32) {
    state.per_page = per_page.max(1);
    state.page = 1;
}

/// Navigate to a page, clamped to the valid range.
pub fn set_page(state: &mut GalleryState, page: u32) {
    let last = crate::core::logic::total_pages(state.total, state.per_page);
    state.page = page.clamp(1, last);
}

/// Apply the optimistic half of a like toggle.
///
/// Returns `None` when the item is unknown or a mutation is already pending
/// for it (double-submit guard); otherwise flips `liked`, adjusts the count
/// by exactly one (floored at zero by the unsigned type), marks the item
/// pending, and hands back the snapshot needed for rollback.
pub fn begin_like(state: &mut GalleryState, id: &str) -> Option<LikeRollback> {
    let index = state.rows.iter().position(|row| row.public_id == id)?;
    let current = &state.rows[index];
    if current.like_pending {
        return None;
    }
    let rollback = LikeRollback {
        prev_liked: current.liked,
        prev_count: current.likes_count,
        next_liked: !current.liked,
    };
    let mut next = (**current).clone();
    next.liked = rollback.next_liked;
    next.likes_count = if rollback.next_liked {
        next.likes_count.saturating_add(1)
    } else {
        next.likes_count.saturating_sub(1)
    };
    next.like_pending = true;
    replace_row(state, index, next);
    Some(rollback)
}

/// Confirm a like call: keep the optimistic values, clear the pending flag.
pub fn settle_like(state: &mut GalleryState, id: &str) {
    let Some(index) = state.rows.iter().position(|row| row.public_id == id) else {
        return;
    };
    let mut next = (*state.rows[index]).clone();
    next.like_pending = false;
    replace_row(state, index, next);
}

/// Restore the exact pre-mutation values after a failed like call.
pub fn rollback_like(state: &mut GalleryState, id: &str, rollback: LikeRollback) {
    let Some(index) = state.rows.iter().position(|row| row.public_id == id) else {
        return;
    };
    let mut next = (*state.rows[index]).clone();
    next.liked = rollback.prev_liked;
    next.likes_count = rollback.prev_count;
    next.like_pending = false;
    replace_row(state, index, next);
}

/// Read the rows that survive the page-scoped text query.
#[must_use]
pub fn visible_rows(state: &GalleryState) -> Vec<Rc<MediaCard>> {
    let query = state.query.trim();
    if query.is_empty() {
        return state.rows.clone();
    }
    state
        .rows
        .iter()
        .filter(|row| matches_query(row, query))
        .cloned()
        .collect()
}

/// Read a row by id.
#[must_use]
pub fn select_row(state: &GalleryState, id: &str) -> Option<Rc<MediaCard>> {
    state.rows.iter().find(|row| row.public_id == id).cloned()
}

fn replace_row(state: &mut GalleryState, index: usize, next: MediaCard) {
    // Wholesale replacement keeps change detection reliable.
    let mut rows = state.rows.clone();
    rows[index] = Rc::new(next);
    state.rows = rows;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: &str, liked: bool, likes: u32) -> MediaCard {
        MediaCard {
            public_id: id.to_string(),
            title: format!("item {id}"),
            description: String::new(),
            kind: MediaKind::Image,
            status: MediaStatus::Ready,
            subject: String::new(),
            thumbnail_url: None,
            tags: Vec::new(),
            liked,
            likes_count: likes,
            playable: true,
            width: None,
            height: None,
            like_pending: false,
        }
    }

    fn seeded(cards: Vec<MediaCard>) -> GalleryState {
        let mut state = GalleryState::default();
        set_rows(&mut state, cards);
        state
    }

    #[test]
    fn like_toggle_parity_and_count() {
        let mut state = seeded(vec![card("a", false, 2)]);
        for _ in 0..3 {
            let rollback = begin_like(&mut state, "a").unwrap();
            assert!(state.rows[0].like_pending);
            assert_eq!(state.rows[0].liked, rollback.next_liked);
            settle_like(&mut state, "a");
        }
        // Odd number of successful toggles: liked, count +1 net.
        assert!(state.rows[0].liked);
        assert_eq!(state.rows[0].likes_count, 3);
    }

    #[test]
    fn unlike_floors_count_at_zero() {
        let mut state = seeded(vec![card("a", true, 0)]);
        begin_like(&mut state, "a").unwrap();
        assert!(!state.rows[0].liked);
        assert_eq!(state.rows[0].likes_count, 0);
    }

    #[test]
    fn rollback_restores_exact_prior_values() {
        let mut state = seeded(vec![card("a", true, 7)]);
        let rollback = begin_like(&mut state, "a").unwrap();
        assert!(!state.rows[0].liked);
        assert_eq!(state.rows[0].likes_count, 6);
        rollback_like(&mut state, "a", rollback);
        assert!(state.rows[0].liked);
        assert_eq!(state.rows[0].likes_count, 7);
        assert!(!state.rows[0].like_pending);
    }

    #[test]
    fn pending_flag_blocks_double_submit() {
        let mut state = seeded(vec![card("a", false, 0)]);
        assert!(begin_like(&mut state, "a").is_some());
        assert!(begin_like(&mut state, "a").is_none());
        assert_eq!(state.rows[0].likes_count, 1);
    }

    #[test]
    fn filter_changes_reset_page() {
        let mut state = GalleryState {
            page: 3,
            total: 100,
            ..GalleryState::default()
        };
        set_kind_filter(&mut state, Some(MediaKind::Video));
        assert_eq!(state.page, 1);
        state.page = 2;
        toggle_tag(&mut state, "demo");
        assert_eq!(state.page, 1);
        assert_eq!(state.tag_filter, vec!["demo"]);
        toggle_tag(&mut state, "demo");
        assert!(state.tag_filter.is_empty());
    }

    #[test]
    fn tab_switch_resets_page_and_mine_only_filter() {
        let mut state = GalleryState::default();
        set_tab(&mut state, GalleryTab::Mine);
        set_status_filter(&mut state, Some(MediaStatus::Failed));
        state.page = 2;
        set_tab(&mut state, GalleryTab::All);
        assert_eq!(state.page, 1);
        assert_eq!(state.status_filter, None);
    }

    #[test]
    fn text_query_is_page_scoped_and_case_insensitive() {
        let mut a = card("a", false, 0);
        a.title = "Sunset timelapse".into();
        let mut b = card("b", false, 0);
        b.tags = vec!["sunrise".into()];
        let mut state = seeded(vec![a, b]);
        state.query = "SUNSET".into();
        let visible = visible_rows(&state);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].public_id, "a");
    }

    #[test]
    fn page_clamps_to_total() {
        let mut state = GalleryState {
            total: 30,
            per_page: 24,
            ..GalleryState::default()
        };
        set_page(&mut state, 9);
        assert_eq!(state.page, 2);
        set_page(&mut state, 0);
        assert_eq!(state.page, 1);
    }
}
