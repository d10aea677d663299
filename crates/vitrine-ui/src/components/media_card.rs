//! Single gallery tile: thumbnail, status badge, like/delete/retry actions.

use crate::components::thumb::ThumbImage;
use crate::i18n::{DEFAULT_LOCALE, TranslationBundle};
use crate::models::MediaCard;
use std::rc::Rc;
use vitrine_api_models::{MediaKind, MediaStatus};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct MediaCardProps {
    pub card: Rc<MediaCard>,
    /// Rendered on the owner tab: exposes delete and retry actions.
    pub mine: bool,
    pub on_like: Callback<String>,
    pub on_open: Callback<String>,
    pub on_delete: Callback<String>,
    pub on_retry: Callback<String>,
}

#[function_component(MediaCardView)]
pub(crate) fn media_card_view(props: &MediaCardProps) -> Html {
    let bundle = use_context::<TranslationBundle>()
        .unwrap_or_else(|| TranslationBundle::new(DEFAULT_LOCALE));
    let card = &props.card;
    let id = card.public_id.clone();

    let open = {
        let on_open = props.on_open.clone();
        let id = id.clone();
        let ready = card.status == MediaStatus::Ready;
        Callback::from(move |_: MouseEvent| {
            if ready {
                on_open.emit(id.clone());
            }
        })
    };
    let like = {
        let on_like = props.on_like.clone();
        let id = id.clone();
        Callback::from(move |event: MouseEvent| {
            event.stop_propagation();
            on_like.emit(id.clone());
        })
    };
    let delete = {
        let on_delete = props.on_delete.clone();
        let id = id.clone();
        Callback::from(move |event: MouseEvent| {
            event.stop_propagation();
            on_delete.emit(id.clone());
        })
    };
    let retry = {
        let on_retry = props.on_retry.clone();
        let id = id.clone();
        Callback::from(move |event: MouseEvent| {
            event.stop_propagation();
            on_retry.emit(id.clone());
        })
    };

    let kind_class = match card.kind {
        MediaKind::Image => "kind-image",
        MediaKind::Video => "kind-video",
        MediaKind::Audio => "kind-audio",
    };
    let status_badge = match card.status {
        MediaStatus::Queued => Some(bundle.text("gallery.status_queued", "Queued")),
        MediaStatus::Processing => {
            Some(bundle.text("gallery.status_processing", "Processing…"))
        }
        MediaStatus::Failed => Some(bundle.text("gallery.status_failed", "Processing failed")),
        MediaStatus::Ready => None,
    };
    let like_label = if card.liked {
        bundle.text("gallery.unlike", "Unlike")
    } else {
        bundle.text("gallery.like", "Like")
    };

    html! {
        <article class={classes!("vitrine-card", kind_class)} onclick={open}>
            <ThumbImage
                id={card.public_id.clone()}
                url={card.thumbnail_url.clone()}
                alt={card.title.clone()}
            />
            {if let Some(badge) = status_badge {
                html! { <span class="vitrine-status-badge">{badge}</span> }
            } else { html!{} }}
            <h4 class="vitrine-card-title">{&card.title}</h4>
            <div class="vitrine-card-actions">
                <button
                    class={classes!("vitrine-like", card.liked.then_some("liked"))}
                    disabled={card.like_pending}
                    onclick={like}
                    aria-label={like_label}
                >
                    {format!("♥ {}", card.likes_count)}
                </button>
                {if props.mine && card.status == MediaStatus::Failed {
                    html! {
                        <button class="vitrine-retry" onclick={retry}>
                            {bundle.text("gallery.retry_processing", "Retry processing")}
                        </button>
                    }
                } else { html!{} }}
                {if props.mine {
                    html! {
                        <button class="vitrine-delete" onclick={delete}>
                            {bundle.text("gallery.delete", "Delete")}
                        </button>
                    }
                } else { html!{} }}
            </div>
        </article>
    }
}
