//! Per-item thumbnail load bookkeeping.
//!
//! Kept in its own slice, keyed by `public_id`, because the item list is
//! replaced wholesale on every refresh: attempts and permanent failures must
//! survive that replacement or permanent failures would flicker back to a
//! loading state.

use std::collections::{HashMap, HashSet};

/// Retries attempted before an id is suppressed for the session.
pub const RETRY_LIMIT: u8 = 3;
/// First backoff delay; doubles per attempt (500/1000/2000 ms).
pub const BASE_DELAY_MS: u32 = 500;

/// Thumbnail slice stored in the app state.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ThumbsState {
    /// Consecutive failed attempts per id.
    pub attempts: HashMap<String, u8>,
    /// Ids suppressed to a placeholder for the rest of the session.
    pub failed: HashSet<String>,
}

/// What the loader should do after a failed image load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThumbOutcome {
    /// Retry the same URL (cache-busted) after the given delay.
    Retry {
        /// 1-based attempt number about to be made.
        attempt: u8,
        /// Backoff delay before the retry.
        delay_ms: u32,
    },
    /// Retry budget exhausted; show the placeholder permanently.
    GiveUp,
}

/// Record a failed load and decide whether to retry.
pub fn record_failure(state: &mut ThumbsState, id: &str) -> ThumbOutcome {
    if state.failed.contains(id) {
        return ThumbOutcome::GiveUp;
    }
    let attempt = state
        .attempts
        .get(id)
        .copied()
        .unwrap_or(0)
        .saturating_add(1);
    if attempt > RETRY_LIMIT {
        state.attempts.remove(id);
        state.failed.insert(id.to_string());
        return ThumbOutcome::GiveUp;
    }
    state.attempts.insert(id.to_string(), attempt);
    ThumbOutcome::Retry {
        attempt,
        delay_ms: backoff_delay_ms(attempt),
    }
}

/// Record a successful load, clearing all bookkeeping for the id.
pub fn record_success(state: &mut ThumbsState, id: &str) {
    state.attempts.remove(id);
    state.failed.remove(id);
}

/// Whether the id is permanently suppressed this session.
#[must_use]
pub fn is_failed(state: &ThumbsState, id: &str) -> bool {
    state.failed.contains(id)
}

/// Exponential backoff: `BASE_DELAY_MS * 2^(attempt-1)`.
#[must_use]
pub const fn backoff_delay_ms(attempt: u8) -> u32 {
    BASE_DELAY_MS << attempt.saturating_sub(1)
}

/// Same resource with a cache-busting parameter so the retry bypasses a
/// cached error response.
#[must_use]
pub fn cache_busted(url: &str, attempt: u8) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}retry={attempt}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_failures_yield_three_backoff_retries_then_give_up() {
        let mut state = ThumbsState::default();
        assert_eq!(
            record_failure(&mut state, "a"),
            ThumbOutcome::Retry {
                attempt: 1,
                delay_ms: 500
            }
        );
        assert_eq!(
            record_failure(&mut state, "a"),
            ThumbOutcome::Retry {
                attempt: 2,
                delay_ms: 1000
            }
        );
        assert_eq!(
            record_failure(&mut state, "a"),
            ThumbOutcome::Retry {
                attempt: 3,
                delay_ms: 2000
            }
        );
        assert_eq!(record_failure(&mut state, "a"), ThumbOutcome::GiveUp);
        assert!(is_failed(&state, "a"));
        // Failure memory outlives any list refresh and never retries again.
        assert_eq!(record_failure(&mut state, "a"), ThumbOutcome::GiveUp);
    }

    #[test]
    fn success_clears_attempts_and_permanent_flag() {
        let mut state = ThumbsState::default();
        record_failure(&mut state, "a");
        record_success(&mut state, "a");
        assert!(!is_failed(&state, "a"));
        assert_eq!(
            record_failure(&mut state, "a"),
            ThumbOutcome::Retry {
                attempt: 1,
                delay_ms: 500
            }
        );
        for _ in 0..4 {
            record_failure(&mut state, "b");
        }
        assert!(is_failed(&state, "b"));
        record_success(&mut state, "b");
        assert!(!is_failed(&state, "b"));
    }

    #[test]
    fn ids_are_tracked_independently() {
        let mut state = ThumbsState::default();
        record_failure(&mut state, "a");
        assert_eq!(
            record_failure(&mut state, "b"),
            ThumbOutcome::Retry {
                attempt: 1,
                delay_ms: 500
            }
        );
    }

    #[test]
    fn cache_buster_respects_existing_query() {
        assert_eq!(cache_busted("https://cdn/t.jpg", 2), "https://cdn/t.jpg?retry=2");
        assert_eq!(
            cache_busted("https://cdn/t.jpg?w=120", 1),
            "https://cdn/t.jpg?w=120&retry=1"
        );
    }
}
