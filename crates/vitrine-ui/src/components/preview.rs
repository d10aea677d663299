//! Preview modal and playback orchestration.
//!
//! All decisions live in the pure preview transitions; this component owns
//! the side effects only: grant requests, source attachment, the heartbeat
//! timer, revocation, and fullscreen. Every async continuation re-checks the
//! session epoch before touching state, so responses that outlive their
//! session are dropped instead of cancelled.

use crate::app::api::ApiCtx;
use crate::core::store::AppStore;
use crate::features::preview::state::{
    self as preview, ErrorOutcome, PlayPlan, PreviewPhase, Teardown,
};
use crate::i18n::{DEFAULT_LOCALE, TranslationBundle};
use crate::playback::{AttachHandle, attach};
use crate::services::api::ApiClient;
use gloo::console;
use gloo::events::EventListener;
use gloo::timers::callback::Interval;
use gloo_timers::future::TimeoutFuture;
use std::cell::RefCell;
use std::rc::Rc;
use vitrine_api_models::MediaKind;
use wasm_bindgen::JsCast;
use web_sys::{HtmlImageElement, HtmlMediaElement, HtmlVideoElement};
use yew::platform::spawn_local;
use yew::prelude::*;
use yewdux::prelude::*;

/// Everything the async playback flows need, cheap to clone into tasks.
#[derive(Clone)]
struct PlaybackCtx {
    client: Rc<ApiClient>,
    dispatch: Dispatch<AppStore>,
    media_ref: NodeRef,
    attach_handle: Rc<RefCell<Option<AttachHandle>>>,
    bundle: TranslationBundle,
}

#[function_component(PreviewModal)]
#[allow(clippy::too_many_lines)]
pub(crate) fn preview_modal() -> Html {
    let bundle = use_context::<TranslationBundle>()
        .unwrap_or_else(|| TranslationBundle::new(DEFAULT_LOCALE));
    // The shell always provides the context; the fallback client targets the
    // same origin and only exists to keep hook order unconditional.
    let api = use_context::<ApiCtx>().unwrap_or_else(|| ApiCtx::new(String::new()));
    let dispatch = Dispatch::<AppStore>::new();
    let state = use_selector(|store: &AppStore| store.preview.clone());
    let media_ref = use_node_ref();
    let wrapper_ref = use_node_ref();
    let attach_handle = use_mut_ref(|| None as Option<AttachHandle>);

    let ctx = PlaybackCtx {
        client: api.client.clone(),
        dispatch: dispatch.clone(),
        media_ref: media_ref.clone(),
        attach_handle: attach_handle.clone(),
        bundle: bundle.clone(),
    };

    {
        // Each epoch bump is a session boundary: whatever source the previous
        // session attached must be released.
        let ctx = ctx.clone();
        use_effect_with_deps(
            move |_| {
                move || detach_current(&ctx)
            },
            state.epoch,
        );
    }
    {
        // Image sessions fetch their display grant as soon as they open.
        let ctx = ctx.clone();
        let phase = state.phase;
        let media_id = state
            .item
            .as_ref()
            .map(|item| item.public_id.clone())
            .unwrap_or_default();
        use_effect_with_deps(
            move |&(epoch, phase)| {
                if phase == PreviewPhase::ImageLoading {
                    spawn_local(async move { fetch_display(&ctx, &media_id, epoch).await });
                }
                || {}
            },
            (state.epoch, phase),
        );
    }
    {
        // Keep-alive heartbeats while playing; a 429 means another session
        // pre-empted this one.
        let ctx = ctx.clone();
        let beating = state.phase == PreviewPhase::Playing && state.policy.heartbeat_enabled;
        let interval_secs = state.policy.effective_interval_secs();
        use_effect_with_deps(
            move |(beating, token, interval_secs): &(bool, Option<String>, u32)| {
                let timer = if *beating {
                    token.as_ref().map(|token| {
                        let token = token.clone();
                        Interval::new(interval_secs * 1000, move || {
                            let ctx = ctx.clone();
                            let token = token.clone();
                            spawn_local(async move { send_heartbeat(&ctx, &token).await });
                        })
                    })
                } else {
                    None
                };
                move || drop(timer)
            },
            (beating, state.token.clone(), interval_secs),
        );
    }
    {
        // Escape closes; fullscreen exits are mirrored back into state.
        let ctx = ctx.clone();
        use_effect_with_deps(
            move |&open| {
                let listeners = open.then(|| {
                    let document = gloo::utils::document();
                    let close_ctx = ctx.clone();
                    let keydown = EventListener::new(&document, "keydown", move |event| {
                        let is_escape = event
                            .dyn_ref::<web_sys::KeyboardEvent>()
                            .is_some_and(|key| key.key() == "Escape");
                        if is_escape {
                            close_session(&close_ctx);
                        }
                    });
                    let sync_ctx = ctx.clone();
                    let fullscreen =
                        EventListener::new(&document, "fullscreenchange", move |_| {
                            if gloo::utils::document().fullscreen_element().is_none() {
                                sync_ctx
                                    .dispatch
                                    .reduce_mut(|store| store.preview.fullscreen = false);
                            }
                        });
                    (keydown, fullscreen)
                });
                move || drop(listeners)
            },
            state.open,
        );
    }

    if !state.open {
        return html! {};
    }
    let Some(item) = state.item.clone() else {
        return html! {};
    };

    let on_close = {
        let ctx = ctx.clone();
        Callback::from(move |_: MouseEvent| close_session(&ctx))
    };
    let on_play = {
        let ctx = ctx.clone();
        Callback::from(move |_: MouseEvent| {
            let mut plan = PlayPlan::Ignore;
            ctx.dispatch
                .reduce_mut(|store| plan = preview::request_play(&mut store.preview));
            match plan {
                PlayPlan::Ignore => {}
                PlayPlan::Resume => {
                    if let Some(media) = ctx.media_ref.cast::<HtmlMediaElement>() {
                        let _ = media.play();
                    }
                }
                PlayPlan::Acquire {
                    media_id,
                    epoch,
                    grace_ms,
                } => {
                    let ctx = ctx.clone();
                    spawn_local(async move {
                        if grace_ms > 0 {
                            TimeoutFuture::new(grace_ms).await;
                        }
                        acquire_and_attach(&ctx, &media_id, epoch, true).await;
                    });
                }
            }
        })
    };
    let on_pause = {
        let media_ref = media_ref.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(media) = media_ref.cast::<HtmlMediaElement>() {
                let _ = media.pause();
            }
        })
    };
    let on_mute = {
        let dispatch = dispatch.clone();
        let media_ref = media_ref.clone();
        let muted = state.muted;
        Callback::from(move |_: MouseEvent| {
            if let Some(media) = media_ref.cast::<HtmlMediaElement>() {
                media.set_muted(!muted);
            }
            dispatch.reduce_mut(|store| store.preview.muted = !muted);
        })
    };
    let on_fullscreen = {
        let dispatch = dispatch.clone();
        let wrapper_ref = wrapper_ref.clone();
        let media_ref = media_ref.clone();
        let fullscreen = state.fullscreen;
        Callback::from(move |_: MouseEvent| {
            if fullscreen {
                gloo::utils::document().exit_fullscreen();
                dispatch.reduce_mut(|store| store.preview.fullscreen = false);
                return;
            }
            // Real fullscreen when the platform grants it, on the wrapper
            // first, the bare media element second; the CSS class is the
            // fallback either way.
            if let Some(element) = wrapper_ref.cast::<web_sys::Element>() {
                let _ = element.request_fullscreen();
            } else if let Some(media) = media_ref.cast::<web_sys::Element>() {
                let _ = media.request_fullscreen();
            }
            dispatch.reduce_mut(|store| store.preview.fullscreen = true);
        })
    };

    let media_onplay = {
        let dispatch = dispatch.clone();
        Callback::from(move |_: Event| {
            dispatch.reduce_mut(|store| preview::mark_playing(&mut store.preview));
        })
    };
    let media_onpause = {
        let dispatch = dispatch.clone();
        Callback::from(move |_: Event| {
            dispatch.reduce_mut(|store| preview::mark_paused(&mut store.preview));
        })
    };
    let media_ontimeupdate = {
        let dispatch = dispatch.clone();
        Callback::from(move |event: Event| {
            let media = event.target_unchecked_into::<HtmlMediaElement>();
            dispatch.reduce_mut(|store| {
                preview::note_progress(&mut store.preview, media.current_time(), media.duration());
            });
        })
    };
    let media_onloadedmetadata = {
        let dispatch = dispatch.clone();
        Callback::from(move |event: Event| {
            let media = event.target_unchecked_into::<HtmlMediaElement>();
            dispatch.reduce_mut(|store| {
                if let Some(video) = media.dyn_ref::<HtmlVideoElement>() {
                    preview::note_dimensions(
                        &mut store.preview,
                        f64::from(video.video_width()),
                        f64::from(video.video_height()),
                    );
                }
                preview::note_progress(&mut store.preview, media.current_time(), media.duration());
            });
        })
    };
    let media_onended = {
        let ctx = ctx.clone();
        Callback::from(move |_: Event| {
            let mut token = None;
            ctx.dispatch
                .reduce_mut(|store| token = preview::natural_end(&mut store.preview));
            detach_current(&ctx);
            if let Some(token) = token {
                spawn_revoke(&ctx, token);
            }
        })
    };
    let media_onerror = {
        let ctx = ctx.clone();
        Callback::from(move |_: Event| {
            let mut outcome = ErrorOutcome::Ignore;
            ctx.dispatch
                .reduce_mut(|store| outcome = preview::player_error(&mut store.preview));
            match outcome {
                ErrorOutcome::Ignore => {}
                ErrorOutcome::Retry {
                    media_id,
                    epoch,
                    resume,
                } => {
                    detach_current(&ctx);
                    let ctx = ctx.clone();
                    spawn_local(async move {
                        acquire_and_attach(&ctx, &media_id, epoch, resume).await;
                    });
                }
                ErrorOutcome::GiveUp => {
                    detach_current(&ctx);
                    let message = ctx
                        .bundle
                        .text("preview.play_failed", "Playback could not be started.");
                    ctx.dispatch
                        .reduce_mut(|store| store.preview.notice = Some(message));
                }
            }
        })
    };
    let image_onload = {
        let dispatch = dispatch.clone();
        Callback::from(move |event: Event| {
            let image = event.target_unchecked_into::<HtmlImageElement>();
            dispatch.reduce_mut(|store| {
                preview::note_dimensions(
                    &mut store.preview,
                    f64::from(image.natural_width()),
                    f64::from(image.natural_height()),
                );
            });
        })
    };

    let playing = state.phase == PreviewPhase::Playing;
    let surface = match item.kind {
        MediaKind::Image => match (&state.phase, state.attach_url()) {
            (PreviewPhase::ImageReady, Some(url)) => html! {
                <img class="vitrine-preview-image" src={url} alt={item.title.clone()}
                    onload={image_onload} />
            },
            _ => html! { <div class="vitrine-preview-loading" /> },
        },
        MediaKind::Video => html! {
            <video
                ref={media_ref.clone()}
                playsinline=true
                muted={state.muted}
                onplay={media_onplay}
                onpause={media_onpause}
                ontimeupdate={media_ontimeupdate}
                onloadedmetadata={media_onloadedmetadata}
                onended={media_onended}
                onerror={media_onerror}
            />
        },
        MediaKind::Audio => html! {
            <audio
                ref={media_ref.clone()}
                muted={state.muted}
                onplay={media_onplay}
                onpause={media_onpause}
                ontimeupdate={media_ontimeupdate}
                onloadedmetadata={media_onloadedmetadata}
                onended={media_onended}
                onerror={media_onerror}
            />
        },
    };

    html! {
        <div class="vitrine-preview-backdrop">
            <div
                ref={wrapper_ref}
                class={classes!(
                    "vitrine-preview",
                    state.fullscreen.then_some("fullscreen"),
                )}
            >
                <header class="vitrine-preview-head">
                    <h3>{&item.title}</h3>
                    <button onclick={on_close} aria-label={bundle.text("preview.close", "Close")}>
                        {"✕"}
                    </button>
                </header>
                {if let Some(notice) = &state.notice {
                    html! { <p class="vitrine-preview-notice" role="status">{notice}</p> }
                } else { html!{} }}
                <div
                    class="vitrine-preview-surface"
                    style={format!("aspect-ratio: {:.4}", state.aspect)}
                >
                    {surface}
                </div>
                {if item.kind == MediaKind::Image { html!{} } else {
                    html! {
                        <div class="vitrine-preview-transport">
                            {if playing {
                                html! {
                                    <button onclick={on_pause}>
                                        {bundle.text("preview.pause", "Pause")}
                                    </button>
                                }
                            } else {
                                html! {
                                    <button onclick={on_play}>
                                        {bundle.text("preview.play", "Play")}
                                    </button>
                                }
                            }}
                            <span class="vitrine-preview-clock">
                                {format!(
                                    "{} / {}",
                                    format_time(state.position),
                                    format_time(state.duration),
                                )}
                            </span>
                            <button onclick={on_mute}>
                                {if state.muted {
                                    bundle.text("preview.unmute", "Unmute")
                                } else {
                                    bundle.text("preview.mute", "Mute")
                                }}
                            </button>
                            <button onclick={on_fullscreen}>
                                {if state.fullscreen {
                                    bundle.text("preview.exit_fullscreen", "Exit fullscreen")
                                } else {
                                    bundle.text("preview.fullscreen", "Fullscreen")
                                }}
                            </button>
                        </div>
                    }
                }}
            </div>
        </div>
    }
}

/// Acquire a grant, attach the granted source, and optionally start playback.
async fn acquire_and_attach(ctx: &PlaybackCtx, media_id: &str, epoch: u64, resume: bool) {
    match ctx.client.play_grant(media_id).await {
        Ok(grant) => {
            let mut applied = false;
            ctx.dispatch
                .reduce_mut(|store| applied = preview::apply_grant(&mut store.preview, epoch, &grant));
            if !applied {
                console::warn!("dropping stale playback grant");
                return;
            }
            let Some(url) = ctx.dispatch.get().preview.attach_url() else {
                fail_acquire(
                    ctx,
                    epoch,
                    ctx.bundle
                        .text("preview.play_failed", "Playback could not be started."),
                );
                return;
            };
            let Some(media) = ctx.media_ref.cast::<HtmlMediaElement>() else {
                return;
            };
            detach_current(ctx);
            match attach(&media, &url).await {
                Ok(handle) => {
                    if ctx.dispatch.get().preview.epoch != epoch {
                        handle.detach(&media);
                        return;
                    }
                    media.set_muted(ctx.dispatch.get().preview.muted);
                    *ctx.attach_handle.borrow_mut() = Some(handle);
                    if resume {
                        let _ = media.play();
                        ctx.dispatch
                            .reduce_mut(|store| preview::mark_playing(&mut store.preview));
                    } else {
                        ctx.dispatch
                            .reduce_mut(|store| preview::mark_paused(&mut store.preview));
                    }
                }
                Err(err) => {
                    console::error!("source attach failed", err.to_string());
                    fail_acquire(
                        ctx,
                        epoch,
                        ctx.bundle
                            .text("preview.play_failed", "Playback could not be started."),
                    );
                }
            }
        }
        Err(err) if err.status == 429 => {
            if ctx.dispatch.get().preview.epoch != epoch {
                return;
            }
            let message = ctx.bundle.text(
                "preview.busy_sessions",
                "Too many active playback sessions. Try again shortly.",
            );
            ctx.dispatch.reduce_mut(|store| {
                preview::capacity_limited(&mut store.preview);
                store.preview.notice = Some(message);
            });
        }
        Err(err) => {
            console::error!("playback grant failed", err.to_string());
            fail_acquire(
                ctx,
                epoch,
                ctx.bundle
                    .text("preview.play_failed", "Playback could not be started."),
            );
        }
    }
}

/// Fetch the display grant for an image session.
async fn fetch_display(ctx: &PlaybackCtx, media_id: &str, epoch: u64) {
    match ctx.client.play_grant(media_id).await {
        Ok(grant) => {
            let mut applied = false;
            ctx.dispatch
                .reduce_mut(|store| applied = preview::apply_grant(&mut store.preview, epoch, &grant));
            if !applied {
                console::warn!("dropping stale display grant");
            }
        }
        Err(err) => {
            console::error!("display grant failed", err.to_string());
            if ctx.dispatch.get().preview.epoch != epoch {
                return;
            }
            let message = ctx
                .bundle
                .text("preview.image_failed", "Could not load the image.");
            ctx.dispatch
                .reduce_mut(|store| store.preview.notice = Some(message));
        }
    }
}

async fn send_heartbeat(ctx: &PlaybackCtx, token: &str) {
    match ctx.client.heartbeat(token).await {
        Ok(()) => {}
        Err(err) if err.status == 429 => {
            let message = ctx.bundle.text(
                "preview.preempted",
                "Playback was taken over by another session. Press play to resume.",
            );
            ctx.dispatch.reduce_mut(|store| {
                preview::preempted(&mut store.preview);
                store.preview.notice = Some(message);
            });
            detach_current(ctx);
        }
        Err(err) => {
            // Transient failures are tolerated; the next beat tries again.
            console::warn!("heartbeat failed", err.to_string());
        }
    }
}

fn close_session(ctx: &PlaybackCtx) {
    let mut teardown = Teardown::default();
    ctx.dispatch
        .reduce_mut(|store| teardown = preview::close(&mut store.preview));
    detach_current(ctx);
    execute_teardown(ctx, teardown);
}

/// Run the side effects a session teardown demands.
fn execute_teardown(ctx: &PlaybackCtx, teardown: Teardown) {
    if let Some(token) = teardown.revoke_token {
        spawn_revoke(ctx, token);
    }
    if teardown.exit_fullscreen {
        gloo::utils::document().exit_fullscreen();
    }
}

fn spawn_revoke(ctx: &PlaybackCtx, token: String) {
    let client = ctx.client.clone();
    spawn_local(async move {
        if let Err(err) = client.revoke(&token).await {
            // Best-effort by contract.
            console::warn!("revoke failed", err.to_string());
        }
    });
}

fn detach_current(ctx: &PlaybackCtx) {
    if let Some(handle) = ctx.attach_handle.borrow_mut().take() {
        if let Some(media) = ctx.media_ref.cast::<HtmlMediaElement>() {
            handle.detach(&media);
        }
    }
}

fn fail_acquire(ctx: &PlaybackCtx, epoch: u64, message: String) {
    if ctx.dispatch.get().preview.epoch != epoch {
        return;
    }
    ctx.dispatch.reduce_mut(|store| {
        preview::capacity_limited(&mut store.preview);
        store.preview.notice = Some(message);
    });
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let total = seconds as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
