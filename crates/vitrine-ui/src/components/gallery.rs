//! Gallery grid: rows, loading/empty states, pagination.

use crate::components::media_card::MediaCardView;
use crate::components::pagination::Pager;
use crate::core::logic::total_pages;
use crate::core::store::AppStore;
use crate::features::gallery::state::visible_rows;
use crate::i18n::{DEFAULT_LOCALE, TranslationBundle};
use crate::models::GalleryTab;
use yew::prelude::*;
use yewdux::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct GalleryViewProps {
    pub on_like: Callback<String>,
    pub on_open: Callback<String>,
    pub on_delete: Callback<String>,
    pub on_retry: Callback<String>,
    pub on_page: Callback<u32>,
}

#[function_component(GalleryView)]
pub(crate) fn gallery_view(props: &GalleryViewProps) -> Html {
    let bundle = use_context::<TranslationBundle>()
        .unwrap_or_else(|| TranslationBundle::new(DEFAULT_LOCALE));
    let state = use_selector(|store: &AppStore| store.gallery.clone());
    let rows = visible_rows(&state);
    let mine = state.tab == GalleryTab::Mine;

    let body = if state.loading {
        html! { <p class="vitrine-loading">{bundle.text("gallery.loading", "Loading…")}</p> }
    } else if rows.is_empty() {
        html! { <p class="vitrine-empty">{bundle.text("gallery.empty", "No media to show.")}</p> }
    } else {
        html! {
            <div class="vitrine-grid">
                {for rows.into_iter().map(|card| {
                    let key = card.public_id.clone();
                    html! {
                        <MediaCardView
                            {key}
                            {card}
                            {mine}
                            on_like={props.on_like.clone()}
                            on_open={props.on_open.clone()}
                            on_delete={props.on_delete.clone()}
                            on_retry={props.on_retry.clone()}
                        />
                    }
                })}
            </div>
        }
    };

    html! {
        <section class="vitrine-gallery">
            {body}
            <Pager
                page={state.page}
                total_pages={total_pages(state.total, state.per_page)}
                on_page={props.on_page.clone()}
            />
        </section>
    }
}
