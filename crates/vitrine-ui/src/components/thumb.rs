//! Thumbnail image with bounded retry.
//!
//! Failed loads are retried up to three times with 500/1000/2000 ms backoff
//! and a cache-busting query parameter. After the budget is exhausted the id
//! is remembered in the store and renders a placeholder for the rest of the
//! session, including across list refreshes.

use crate::core::store::AppStore;
use crate::features::thumbs::state::{
    ThumbOutcome, cache_busted, is_failed, record_failure, record_success,
};
use gloo::timers::callback::Timeout;
use yew::prelude::*;
use yewdux::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct ThumbProps {
    pub id: String,
    pub url: Option<String>,
    pub alt: String,
}

#[function_component(ThumbImage)]
pub(crate) fn thumb_image(props: &ThumbProps) -> Html {
    let dispatch = Dispatch::<AppStore>::new();
    let suppressed = use_selector_with_deps(
        |store: &AppStore, id: &String| is_failed(&store.thumbs, id),
        props.id.clone(),
    );
    // Current `src`; `None` while a retry is pending or no URL exists.
    let src = use_state(|| props.url.clone());
    let retry_timer = use_mut_ref(|| None as Option<Timeout>);

    {
        // Re-arm when the row is replaced with a different resource.
        let src = src.clone();
        let retry_timer = retry_timer.clone();
        use_effect_with_deps(
            move |(_, url): &(String, Option<String>)| {
                retry_timer.borrow_mut().take();
                src.set(url.clone());
                move || {
                    retry_timer.borrow_mut().take();
                }
            },
            (props.id.clone(), props.url.clone()),
        );
    }

    let onload = {
        let dispatch = dispatch.clone();
        let id = props.id.clone();
        Callback::from(move |_: Event| {
            let id = id.clone();
            dispatch.reduce_mut(move |store| record_success(&mut store.thumbs, &id));
        })
    };

    let onerror = {
        let id = props.id.clone();
        let url = props.url.clone();
        let src = src.clone();
        let retry_timer = retry_timer.clone();
        Callback::from(move |_: Event| {
            let mut outcome = ThumbOutcome::GiveUp;
            {
                let id = id.clone();
                dispatch
                    .reduce_mut(|store| outcome = record_failure(&mut store.thumbs, &id));
            }
            // Placeholder shows immediately; the retry swaps the URL back in.
            src.set(None);
            if let ThumbOutcome::Retry { attempt, delay_ms } = outcome {
                if let Some(url) = url.clone() {
                    let src = src.clone();
                    let handle = Timeout::new(delay_ms, move || {
                        src.set(Some(cache_busted(&url, attempt)));
                    });
                    *retry_timer.borrow_mut() = Some(handle);
                }
            }
        })
    };

    if *suppressed || props.url.is_none() {
        return html! { <div class="vitrine-thumb placeholder" aria-hidden="true" /> };
    }
    if let Some(src) = (*src).clone() {
        html! {
            <img
                class="vitrine-thumb"
                src={src}
                alt={props.alt.clone()}
                loading="lazy"
                {onload}
                {onerror}
            />
        }
    } else {
        html! { <div class="vitrine-thumb placeholder" aria-hidden="true" /> }
    }
}
