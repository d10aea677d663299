//! Tab switcher and filter bar.
//!
//! Server-backed filters (tab, kind, subject, tags, status, page size) emit
//! `on_changed` so the app reloads the list; the free-text query only narrows
//! the already-loaded page and triggers no request.

use crate::core::store::AppStore;
use crate::features::gallery::state as gallery;
use crate::i18n::{DEFAULT_LOCALE, TranslationBundle};
use crate::models::GalleryTab;
use vitrine_api_models::{MediaKind, MediaStatus};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;
use yewdux::prelude::*;

const PER_PAGE_CHOICES: [u32; 4] = [12, 24, 48, 96];

#[derive(Properties, PartialEq)]
pub(crate) struct FilterBarProps {
    /// Tag allow-list from the host config; empty hides the tag row.
    pub tags: Vec<String>,
    /// Fired after any server-backed filter change.
    pub on_changed: Callback<()>,
}

#[function_component(FilterBar)]
#[allow(clippy::too_many_lines)]
pub(crate) fn filter_bar(props: &FilterBarProps) -> Html {
    let bundle = use_context::<TranslationBundle>()
        .unwrap_or_else(|| TranslationBundle::new(DEFAULT_LOCALE));
    let dispatch = Dispatch::<AppStore>::new();
    let state = use_selector(|store: &AppStore| store.gallery.clone());

    let set_tab = {
        let dispatch = dispatch.clone();
        let on_changed = props.on_changed.clone();
        Callback::from(move |tab: GalleryTab| {
            dispatch.reduce_mut(|store| gallery::set_tab(&mut store.gallery, tab));
            on_changed.emit(());
        })
    };
    let on_kind = {
        let dispatch = dispatch.clone();
        let on_changed = props.on_changed.clone();
        Callback::from(move |event: Event| {
            let value = event.target_unchecked_into::<HtmlSelectElement>().value();
            let kind = match value.as_str() {
                "image" => Some(MediaKind::Image),
                "video" => Some(MediaKind::Video),
                "audio" => Some(MediaKind::Audio),
                _ => None,
            };
            dispatch.reduce_mut(|store| gallery::set_kind_filter(&mut store.gallery, kind));
            on_changed.emit(());
        })
    };
    let on_subject = {
        let dispatch = dispatch.clone();
        let on_changed = props.on_changed.clone();
        Callback::from(move |event: Event| {
            let value = event
                .target_unchecked_into::<HtmlInputElement>()
                .value()
                .trim()
                .to_string();
            let subject = (!value.is_empty()).then_some(value);
            dispatch
                .reduce_mut(|store| gallery::set_subject_filter(&mut store.gallery, subject));
            on_changed.emit(());
        })
    };
    let on_status = {
        let dispatch = dispatch.clone();
        let on_changed = props.on_changed.clone();
        Callback::from(move |event: Event| {
            let value = event.target_unchecked_into::<HtmlSelectElement>().value();
            let status = match value.as_str() {
                "" => None,
                raw => Some(MediaStatus::from_wire(raw)),
            };
            dispatch.reduce_mut(|store| gallery::set_status_filter(&mut store.gallery, status));
            on_changed.emit(());
        })
    };
    let on_per_page = {
        let dispatch = dispatch.clone();
        let on_changed = props.on_changed.clone();
        Callback::from(move |event: Event| {
            let value = event.target_unchecked_into::<HtmlSelectElement>().value();
            if let Ok(per_page) = value.parse::<u32>() {
                dispatch
                    .reduce_mut(|store| gallery::set_per_page(&mut store.gallery, per_page));
                on_changed.emit(());
            }
        })
    };
    let on_query = {
        let dispatch = dispatch.clone();
        Callback::from(move |event: InputEvent| {
            let value = event.target_unchecked_into::<HtmlInputElement>().value();
            dispatch.reduce_mut(|store| store.gallery.query = value);
        })
    };
    let toggle_tag = {
        let on_changed = props.on_changed.clone();
        Callback::from(move |tag: String| {
            dispatch.reduce_mut(|store| gallery::toggle_tag(&mut store.gallery, &tag));
            on_changed.emit(());
        })
    };

    let mine = state.tab == GalleryTab::Mine;
    let tab_button = |tab: GalleryTab, label: String| {
        let set_tab = set_tab.clone();
        let active = state.tab == tab;
        html! {
            <button
                class={classes!("vitrine-tab", active.then_some("active"))}
                onclick={Callback::from(move |_: MouseEvent| set_tab.emit(tab))}
            >{label}</button>
        }
    };

    html! {
        <div class="vitrine-filters">
            <div class="vitrine-tabs" role="tablist">
                {tab_button(GalleryTab::All, bundle.text("tabs.all", "All media"))}
                {tab_button(GalleryTab::Mine, bundle.text("tabs.mine", "My media"))}
            </div>
            <select onchange={on_kind}>
                <option value="" selected={state.kind_filter.is_none()}>
                    {bundle.text("filters.all_types", "All types")}
                </option>
                <option value="image" selected={state.kind_filter == Some(MediaKind::Image)}>
                    {bundle.text("filters.image", "Images")}
                </option>
                <option value="video" selected={state.kind_filter == Some(MediaKind::Video)}>
                    {bundle.text("filters.video", "Videos")}
                </option>
                <option value="audio" selected={state.kind_filter == Some(MediaKind::Audio)}>
                    {bundle.text("filters.audio", "Audio")}
                </option>
            </select>
            <input
                type="text"
                placeholder={bundle.text("filters.all_subjects", "All subjects")}
                value={state.subject_filter.clone().unwrap_or_default()}
                onchange={on_subject}
            />
            {if mine {
                html! {
                    <select onchange={on_status}>
                        <option value="" selected={state.status_filter.is_none()}>
                            {bundle.text("filters.any_status", "Any status")}
                        </option>
                        {for [
                            (MediaStatus::Queued, "filters.status_queued", "Queued"),
                            (MediaStatus::Processing, "filters.status_processing", "Processing"),
                            (MediaStatus::Ready, "filters.status_ready", "Ready"),
                            (MediaStatus::Failed, "filters.status_failed", "Failed"),
                        ].into_iter().map(|(status, key, fallback)| html! {
                            <option
                                value={status.as_wire()}
                                selected={state.status_filter == Some(status)}
                            >{bundle.text(key, fallback)}</option>
                        })}
                    </select>
                }
            } else { html!{} }}
            {if props.tags.is_empty() { html!{} } else {
                html! {
                    <div class="vitrine-tag-row" aria-label={bundle.text("filters.tags_label", "Tags")}>
                        {for props.tags.iter().cloned().map(|tag| {
                            let selected = state.tag_filter.iter().any(|t| t == &tag);
                            let toggle_tag = toggle_tag.clone();
                            let value = tag.clone();
                            html! {
                                <button
                                    class={classes!("vitrine-tag", selected.then_some("selected"))}
                                    onclick={Callback::from(move |_: MouseEvent| {
                                        toggle_tag.emit(value.clone());
                                    })}
                                >{tag}</button>
                            }
                        })}
                    </div>
                }
            }}
            <select onchange={on_per_page} aria-label={bundle.text("filters.per_page", "Per page")}>
                {for PER_PAGE_CHOICES.into_iter().map(|choice| html! {
                    <option
                        value={choice.to_string()}
                        selected={state.per_page == choice}
                    >{choice.to_string()}</option>
                })}
            </select>
            <input
                type="search"
                class="vitrine-query"
                placeholder={bundle.text("filters.search_placeholder", "Filter this page…")}
                aria-label={bundle.text("filters.search_label", "Filter the current page")}
                value={state.query.clone()}
                oninput={on_query}
            />
        </div>
    }
}
