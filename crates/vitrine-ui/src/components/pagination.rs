//! Page navigation for the gallery grid.

use crate::i18n::{DEFAULT_LOCALE, TranslationBundle};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct PagerProps {
    pub page: u32,
    pub total_pages: u32,
    pub on_page: Callback<u32>,
}

#[function_component(Pager)]
pub(crate) fn pager(props: &PagerProps) -> Html {
    let bundle = use_context::<TranslationBundle>()
        .unwrap_or_else(|| TranslationBundle::new(DEFAULT_LOCALE));
    if props.total_pages <= 1 {
        return html! {};
    }
    let prev = {
        let on_page = props.on_page.clone();
        let page = props.page;
        Callback::from(move |_: MouseEvent| on_page.emit(page.saturating_sub(1).max(1)))
    };
    let next = {
        let on_page = props.on_page.clone();
        let page = props.page;
        Callback::from(move |_: MouseEvent| on_page.emit(page + 1))
    };
    html! {
        <nav class="vitrine-pager">
            <button
                disabled={props.page <= 1}
                onclick={prev}
                aria-label={bundle.text("gallery.prev_page", "Previous page")}
            >{"‹"}</button>
            <span>
                {format!(
                    "{} {} {} {}",
                    bundle.text("gallery.page", "Page"),
                    props.page,
                    bundle.text("gallery.of", "of"),
                    props.total_pages
                )}
            </span>
            <button
                disabled={props.page >= props.total_pages}
                onclick={next}
                aria-label={bundle.text("gallery.next_page", "Next page")}
            >{"›"}</button>
        </nav>
    }
}
