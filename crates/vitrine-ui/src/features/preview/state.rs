//! Pure transitions for the preview/playback controller.
//!
//! The wasm component executes the side effects (network, media element,
//! timers); every decision is made here so the whole lifecycle is testable
//! on the host. Stale async responses are dropped by comparing the epoch
//! captured before the await against the current one — there is no request
//! cancellation.

use crate::core::logic::clamp_aspect;
use crate::models::MediaCard;
use vitrine_api_models::{MediaKind, PlayGrant, SecurityPolicyDto};

/// Floor applied to the server-declared heartbeat cadence.
pub const MIN_HEARTBEAT_SECS: u32 = 5;
/// Wait before re-acquiring a grant right after a revoke, giving the server's
/// concurrent-session window time to release the old grant.
pub const REACQUIRE_GRACE_MS: u32 = 400;
/// Player-error retries allowed per opened session.
pub const PLAYER_ERROR_RETRY_LIMIT: u8 = 3;

/// Lifecycle phase of the preview session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PreviewPhase {
    /// No session.
    #[default]
    Closed,
    /// Image item, display URL being fetched.
    ImageLoading,
    /// Image item, displayed.
    ImageReady,
    /// Audio/video item opened; no grant acquired yet.
    ReadyNoToken,
    /// Grant request in flight.
    AcquiringToken,
    /// Media attached and playing.
    Playing,
    /// Media attached and paused.
    Paused,
    /// Playback finished; grant released.
    Ended,
}

/// Session security policy, normalized from the grant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SessionPolicy {
    /// Keep-alive heartbeats required while playing.
    pub heartbeat_enabled: bool,
    /// Server-declared cadence in seconds (pre-floor).
    pub heartbeat_interval_secs: u32,
    /// Token should be released on close/end.
    pub revoke_enabled: bool,
}

impl SessionPolicy {
    /// Heartbeat cadence with the floor applied.
    #[must_use]
    pub const fn effective_interval_secs(&self) -> u32 {
        if self.heartbeat_interval_secs < MIN_HEARTBEAT_SECS {
            MIN_HEARTBEAT_SECS
        } else {
            self.heartbeat_interval_secs
        }
    }

    fn from_dto(dto: Option<SecurityPolicyDto>) -> Self {
        dto.map_or_else(Self::default, |policy| Self {
            heartbeat_enabled: policy.heartbeat_enabled,
            heartbeat_interval_secs: policy.heartbeat_interval_seconds.unwrap_or(0),
            revoke_enabled: policy.revoke_enabled,
        })
    }
}

/// Preview slice stored in the app state. Exactly one session is live at a
/// time; opening a new one tears the previous one down first.
#[derive(Clone, Debug, PartialEq)]
pub struct PreviewState {
    /// Whether the modal is open.
    pub open: bool,
    /// Item snapshot shown by the modal.
    pub item: Option<MediaCard>,
    /// Lifecycle phase.
    pub phase: PreviewPhase,
    /// Progressive stream or image display URL.
    pub stream_url: Option<String>,
    /// Adaptive playlist URL, preferred for attachment when present.
    pub hls_url: Option<String>,
    /// Opaque playback token.
    pub token: Option<String>,
    /// Session policy from the last grant.
    pub policy: SessionPolicy,
    /// Bumped on every open/close; async responses carrying an older value
    /// are stale and must be dropped.
    pub epoch: u64,
    /// Transient capacity/preemption notice shown inside the modal.
    pub notice: Option<String>,
    /// Muted flag.
    pub muted: bool,
    /// Playback position in seconds.
    pub position: f64,
    /// Media duration in seconds (0 until metadata loads).
    pub duration: f64,
    /// Fullscreen (real or CSS fallback) active.
    pub fullscreen: bool,
    /// Display aspect ratio, clamped.
    pub aspect: f64,
    /// Player-error retries consumed this session.
    pub error_retries: u8,
    /// A token was just revoked; the next acquire waits a short grace delay.
    pub just_revoked: bool,
}

impl Default for PreviewState {
    fn default() -> Self {
        Self {
            open: false,
            item: None,
            phase: PreviewPhase::Closed,
            stream_url: None,
            hls_url: None,
            token: None,
            policy: SessionPolicy::default(),
            epoch: 0,
            notice: None,
            muted: false,
            position: 0.0,
            duration: 0.0,
            fullscreen: false,
            aspect: 1.0,
            error_retries: 0,
            just_revoked: false,
        }
    }
}

/// Side effects the caller must execute when a session is torn down.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Teardown {
    /// Token to revoke best-effort, when one was held and policy allows.
    pub revoke_token: Option<String>,
    /// Fullscreen was active and must be exited.
    pub exit_fullscreen: bool,
}

/// Network step required right after opening.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OpenAction {
    /// Image item: fetch the display grant immediately.
    FetchDisplay {
        /// Item to fetch for.
        media_id: String,
        /// Epoch to check on arrival.
        epoch: u64,
    },
    /// Audio/video: defer all network until explicit play.
    Deferred,
}

/// Result of opening an item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenPlan {
    /// Teardown of the previous session, if one was live.
    pub teardown: Teardown,
    /// Follow-up network step.
    pub action: OpenAction,
}

/// What an explicit play press should do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayPlan {
    /// Not playable in the current phase.
    Ignore,
    /// A source is already attached; just resume.
    Resume,
    /// Acquire a fresh grant.
    Acquire {
        /// Item to acquire for.
        media_id: String,
        /// Epoch to check on arrival.
        epoch: u64,
        /// Delay before the request (post-revoke grace window).
        grace_ms: u32,
    },
}

/// Decision after a media-element error event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorOutcome {
    /// No source was attached yet; the event is meaningless.
    Ignore,
    /// Re-acquire a grant and re-attach.
    Retry {
        /// Item to re-acquire for.
        media_id: String,
        /// Epoch to check on arrival.
        epoch: u64,
        /// Resume playback after re-attach.
        resume: bool,
    },
    /// Retry budget exhausted; surface the failure.
    GiveUp,
}

/// Open an item, tearing down any previous session first.
pub fn open(state: &mut PreviewState, card: MediaCard) -> OpenPlan {
    let teardown = reset(state);
    state.epoch += 1;
    state.open = true;
    state.aspect = match (card.width, card.height) {
        (Some(w), Some(h)) if h > 0 => clamp_aspect(f64::from(w) / f64::from(h)),
        _ => 1.0,
    };
    let action = if card.kind == MediaKind::Image {
        state.phase = PreviewPhase::ImageLoading;
        OpenAction::FetchDisplay {
            media_id: card.public_id.clone(),
            epoch: state.epoch,
        }
    } else {
        state.phase = PreviewPhase::ReadyNoToken;
        OpenAction::Deferred
    };
    state.item = Some(card);
    OpenPlan { teardown, action }
}

/// Close the modal, resetting to the Closed defaults.
pub fn close(state: &mut PreviewState) -> Teardown {
    let teardown = reset(state);
    state.epoch += 1;
    teardown
}

/// Plan an explicit play press.
pub fn request_play(state: &mut PreviewState) -> PlayPlan {
    let Some(item) = &state.item else {
        return PlayPlan::Ignore;
    };
    if item.kind == MediaKind::Image || !state.open {
        return PlayPlan::Ignore;
    }
    match state.phase {
        PreviewPhase::Playing | PreviewPhase::AcquiringToken => PlayPlan::Ignore,
        PreviewPhase::Paused if state.attach_url().is_some() => {
            state.phase = PreviewPhase::Playing;
            PlayPlan::Resume
        }
        _ => {
            state.notice = None;
            state.phase = PreviewPhase::AcquiringToken;
            PlayPlan::Acquire {
                media_id: item.public_id.clone(),
                epoch: state.epoch,
                grace_ms: if state.just_revoked {
                    REACQUIRE_GRACE_MS
                } else {
                    0
                },
            }
        }
    }
}

/// Apply an arrived grant; returns false (and changes nothing) when the
/// response is stale for the current session.
pub fn apply_grant(state: &mut PreviewState, epoch: u64, grant: &PlayGrant) -> bool {
    if !state.open || epoch != state.epoch {
        return false;
    }
    state.stream_url.clone_from(&grant.stream_url);
    state.hls_url.clone_from(&grant.hls_url);
    state.token.clone_from(&grant.token);
    state.policy = SessionPolicy::from_dto(grant.security);
    state.just_revoked = false;
    if state.phase == PreviewPhase::ImageLoading {
        state.phase = PreviewPhase::ImageReady;
    }
    true
}

impl PreviewState {
    /// URL the playback backend should attach, playlist preferred.
    #[must_use]
    pub fn attach_url(&self) -> Option<String> {
        self.hls_url.clone().or_else(|| self.stream_url.clone())
    }
}

/// Attachment finished and playback started.
pub fn mark_playing(state: &mut PreviewState) {
    if state.open {
        state.phase = PreviewPhase::Playing;
    }
}

/// Playback paused by the user.
pub fn mark_paused(state: &mut PreviewState) {
    if state.phase == PreviewPhase::Playing {
        state.phase = PreviewPhase::Paused;
    }
}

/// 429 on grant acquisition: capacity notice, grant state cleared, retryable.
pub fn capacity_limited(state: &mut PreviewState) {
    clear_grant(state);
    state.phase = PreviewPhase::ReadyNoToken;
}

/// 429 on a heartbeat: another session pre-empted this one. Playback stops
/// and the grant is cleared, but the modal stays open so the user can press
/// play to re-acquire.
pub fn preempted(state: &mut PreviewState) {
    clear_grant(state);
    state.phase = PreviewPhase::ReadyNoToken;
    state.position = 0.0;
}

/// Natural end of playback: release the grant so the next play acquires
/// fresh state. Returns the token to revoke best-effort.
pub fn natural_end(state: &mut PreviewState) -> Option<String> {
    let token = revocable_token(state);
    clear_grant(state);
    state.position = 0.0;
    state.phase = PreviewPhase::Ended;
    state.just_revoked = token.is_some();
    token
}

/// Media-element error. Only meaningful once a source was attached; bounded
/// to [`PLAYER_ERROR_RETRY_LIMIT`] retries per opened session.
pub fn player_error(state: &mut PreviewState) -> ErrorOutcome {
    if state.attach_url().is_none() {
        return ErrorOutcome::Ignore;
    }
    let Some(item) = &state.item else {
        return ErrorOutcome::Ignore;
    };
    if state.error_retries >= PLAYER_ERROR_RETRY_LIMIT {
        clear_grant(state);
        state.phase = PreviewPhase::ReadyNoToken;
        return ErrorOutcome::GiveUp;
    }
    state.error_retries += 1;
    let resume = state.phase == PreviewPhase::Playing;
    let media_id = item.public_id.clone();
    clear_grant(state);
    state.phase = PreviewPhase::AcquiringToken;
    ErrorOutcome::Retry {
        media_id,
        epoch: state.epoch,
        resume,
    }
}

/// Record a dimension source (declared, poster natural, media natural).
pub fn note_dimensions(state: &mut PreviewState, width: f64, height: f64) {
    if height > 0.0 && width > 0.0 {
        state.aspect = clamp_aspect(width / height);
    }
}

/// Track transport progress from the media element.
pub fn note_progress(state: &mut PreviewState, position: f64, duration: f64) {
    state.position = position;
    if duration.is_finite() && duration > 0.0 {
        state.duration = duration;
    }
}

/// Keep the modal's item snapshot in sync after a list mutation.
pub fn sync_item(state: &mut PreviewState, card: &MediaCard) {
    if let Some(item) = &mut state.item {
        if item.public_id == card.public_id {
            *item = card.clone();
        }
    }
}

fn revocable_token(state: &mut PreviewState) -> Option<String> {
    if state.policy.revoke_enabled {
        state.token.take()
    } else {
        None
    }
}

fn clear_grant(state: &mut PreviewState) {
    state.stream_url = None;
    state.hls_url = None;
    state.token = None;
}

fn reset(state: &mut PreviewState) -> Teardown {
    let teardown = Teardown {
        revoke_token: revocable_token(state),
        exit_fullscreen: state.fullscreen,
    };
    let epoch = state.epoch;
    *state = PreviewState::default();
    state.epoch = epoch;
    teardown
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_api_models::MediaStatus;

    fn card(id: &str, kind: MediaKind) -> MediaCard {
        MediaCard {
            public_id: id.to_string(),
            title: String::new(),
            description: String::new(),
            kind,
            status: MediaStatus::Ready,
            subject: String::new(),
            thumbnail_url: None,
            tags: Vec::new(),
            liked: false,
            likes_count: 0,
            playable: true,
            width: None,
            height: None,
            like_pending: false,
        }
    }

    fn grant(token: &str, heartbeat: bool) -> PlayGrant {
        PlayGrant {
            stream_url: Some("https://cdn/v.mp4".into()),
            hls_url: Some("https://cdn/v.m3u8".into()),
            token: Some(token.into()),
            security: Some(SecurityPolicyDto {
                heartbeat_enabled: heartbeat,
                heartbeat_interval_seconds: Some(2),
                revoke_enabled: true,
            }),
        }
    }

    #[test]
    fn video_open_defers_network_and_close_without_play_revokes_nothing() {
        let mut state = PreviewState::default();
        let plan = open(&mut state, card("v1", MediaKind::Video));
        assert_eq!(plan.action, OpenAction::Deferred);
        assert_eq!(state.phase, PreviewPhase::ReadyNoToken);
        assert!(state.token.is_none());
        let teardown = close(&mut state);
        assert_eq!(teardown.revoke_token, None);
        assert!(!state.open);
    }

    #[test]
    fn image_open_fetches_display_immediately() {
        let mut state = PreviewState::default();
        let plan = open(&mut state, card("i1", MediaKind::Image));
        let OpenAction::FetchDisplay { media_id, epoch } = plan.action else {
            panic!("expected immediate fetch");
        };
        assert_eq!(media_id, "i1");
        assert_eq!(epoch, state.epoch);
        assert_eq!(state.phase, PreviewPhase::ImageLoading);
    }

    #[test]
    fn play_acquires_then_resume_reuses_source() {
        let mut state = PreviewState::default();
        open(&mut state, card("v1", MediaKind::Video));
        let PlayPlan::Acquire {
            epoch, grace_ms, ..
        } = request_play(&mut state)
        else {
            panic!("expected acquire");
        };
        assert_eq!(grace_ms, 0);
        assert!(apply_grant(&mut state, epoch, &grant("t1", true)));
        mark_playing(&mut state);
        mark_paused(&mut state);
        assert_eq!(request_play(&mut state), PlayPlan::Resume);
        assert_eq!(state.phase, PreviewPhase::Playing);
    }

    #[test]
    fn stale_grant_is_dropped() {
        let mut state = PreviewState::default();
        open(&mut state, card("v1", MediaKind::Video));
        let PlayPlan::Acquire { epoch, .. } = request_play(&mut state) else {
            panic!("expected acquire");
        };
        // User closed and reopened while the request was in flight.
        close(&mut state);
        open(&mut state, card("v2", MediaKind::Video));
        assert!(!apply_grant(&mut state, epoch, &grant("t1", false)));
        assert!(state.token.is_none());
    }

    #[test]
    fn heartbeat_preemption_keeps_modal_open_and_retryable() {
        let mut state = PreviewState::default();
        open(&mut state, card("v1", MediaKind::Video));
        let PlayPlan::Acquire { epoch, .. } = request_play(&mut state) else {
            panic!("expected acquire");
        };
        apply_grant(&mut state, epoch, &grant("t1", true));
        mark_playing(&mut state);
        preempted(&mut state);
        assert!(state.open);
        assert!(state.token.is_none());
        assert!(state.attach_url().is_none());
        assert_eq!(state.phase, PreviewPhase::ReadyNoToken);
        assert!(matches!(
            request_play(&mut state),
            PlayPlan::Acquire { .. }
        ));
    }

    #[test]
    fn natural_end_revokes_and_next_play_waits_grace() {
        let mut state = PreviewState::default();
        open(&mut state, card("v1", MediaKind::Video));
        let PlayPlan::Acquire { epoch, .. } = request_play(&mut state) else {
            panic!("expected acquire");
        };
        apply_grant(&mut state, epoch, &grant("t1", true));
        mark_playing(&mut state);
        assert_eq!(natural_end(&mut state).as_deref(), Some("t1"));
        assert_eq!(state.phase, PreviewPhase::Ended);
        assert!(state.attach_url().is_none());
        let PlayPlan::Acquire { grace_ms, .. } = request_play(&mut state) else {
            panic!("expected acquire");
        };
        assert_eq!(grace_ms, REACQUIRE_GRACE_MS);
    }

    #[test]
    fn close_revokes_held_token_and_exits_fullscreen() {
        let mut state = PreviewState::default();
        open(&mut state, card("v1", MediaKind::Video));
        let PlayPlan::Acquire { epoch, .. } = request_play(&mut state) else {
            panic!("expected acquire");
        };
        apply_grant(&mut state, epoch, &grant("t9", false));
        state.fullscreen = true;
        let teardown = close(&mut state);
        assert_eq!(teardown.revoke_token.as_deref(), Some("t9"));
        assert!(teardown.exit_fullscreen);
        assert_eq!(state, PreviewState {
            epoch: state.epoch,
            ..PreviewState::default()
        });
    }

    #[test]
    fn player_error_retries_are_bounded_per_session() {
        let mut state = PreviewState::default();
        open(&mut state, card("v1", MediaKind::Video));
        // Errors before any source is attached are ignored.
        assert_eq!(player_error(&mut state), ErrorOutcome::Ignore);
        for attempt in 1..=PLAYER_ERROR_RETRY_LIMIT {
            let PlayPlan::Acquire { epoch, .. } = request_play(&mut state) else {
                panic!("expected acquire");
            };
            apply_grant(&mut state, epoch, &grant("t", false));
            mark_playing(&mut state);
            match player_error(&mut state) {
                ErrorOutcome::Retry { resume, .. } => {
                    assert!(resume);
                    assert_eq!(state.error_retries, attempt);
                }
                other => panic!("expected retry, got {other:?}"),
            }
        }
        let epoch = state.epoch;
        apply_grant(&mut state, epoch, &grant("t", false));
        assert_eq!(player_error(&mut state), ErrorOutcome::GiveUp);
    }

    #[test]
    fn heartbeat_interval_is_floored() {
        let policy = SessionPolicy {
            heartbeat_enabled: true,
            heartbeat_interval_secs: 2,
            revoke_enabled: true,
        };
        assert_eq!(policy.effective_interval_secs(), MIN_HEARTBEAT_SECS);
        let relaxed = SessionPolicy {
            heartbeat_interval_secs: 30,
            ..policy
        };
        assert_eq!(relaxed.effective_interval_secs(), 30);
    }

    #[test]
    fn aspect_comes_from_first_available_dimensions() {
        let mut state = PreviewState::default();
        let mut item = card("v1", MediaKind::Video);
        item.width = Some(1920);
        item.height = Some(1080);
        open(&mut state, item);
        assert!((state.aspect - 1920.0 / 1080.0).abs() < 1e-9);
        // Extreme media natural size is clamped.
        note_dimensions(&mut state, 100.0, 1000.0);
        assert!((state.aspect - 0.5).abs() < 1e-9);
    }

    #[test]
    fn sync_item_tracks_list_mutations() {
        let mut state = PreviewState::default();
        open(&mut state, card("v1", MediaKind::Video));
        let mut updated = card("v1", MediaKind::Video);
        updated.liked = true;
        updated.likes_count = 4;
        sync_item(&mut state, &updated);
        assert!(state.item.as_ref().is_some_and(|item| item.liked));
        sync_item(&mut state, &card("other", MediaKind::Video));
        assert_eq!(
            state.item.as_ref().map(|item| item.likes_count),
            Some(4)
        );
    }
}
