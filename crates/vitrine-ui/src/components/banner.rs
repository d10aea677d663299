//! Notice/error banner pair.
//!
//! Exactly two user-visible channels exist: a transient informational notice
//! and a failure banner. Actions clear both before running, so at most one
//! is populated per action.

use crate::i18n::{DEFAULT_LOCALE, TranslationBundle};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct BannerProps {
    pub notice: Option<String>,
    pub error: Option<String>,
    pub on_dismiss: Callback<()>,
}

#[function_component(BannerHost)]
pub(crate) fn banner_host(props: &BannerProps) -> Html {
    let bundle = use_context::<TranslationBundle>()
        .unwrap_or_else(|| TranslationBundle::new(DEFAULT_LOCALE));
    let dismiss_label = bundle.text("banner.dismiss", "Dismiss");
    let dismiss = {
        let on_dismiss = props.on_dismiss.clone();
        Callback::from(move |_: MouseEvent| on_dismiss.emit(()))
    };
    html! {
        <>
            {if let Some(notice) = &props.notice {
                html! {
                    <div class="vitrine-banner notice" role="status">
                        <span>{notice}</span>
                        <button onclick={dismiss.clone()}>{dismiss_label.clone()}</button>
                    </div>
                }
            } else { html!{} }}
            {if let Some(error) = &props.error {
                html! {
                    <div class="vitrine-banner error" role="alert">
                        <span>{error}</span>
                        <button onclick={dismiss}>{dismiss_label}</button>
                    </div>
                }
            } else { html!{} }}
        </>
    }
}
