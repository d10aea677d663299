//! Delete confirmation dialog.

use crate::i18n::{DEFAULT_LOCALE, TranslationBundle};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct ConfirmProps {
    pub open: bool,
    /// A delete call is outstanding; the dialog must not be dismissible.
    pub busy: bool,
    pub on_confirm: Callback<()>,
    pub on_cancel: Callback<()>,
}

#[function_component(ConfirmDialog)]
pub(crate) fn confirm_dialog(props: &ConfirmProps) -> Html {
    let bundle = use_context::<TranslationBundle>()
        .unwrap_or_else(|| TranslationBundle::new(DEFAULT_LOCALE));
    if !props.open {
        return html! {};
    }
    let confirm = {
        let on_confirm = props.on_confirm.clone();
        Callback::from(move |_: MouseEvent| on_confirm.emit(()))
    };
    let cancel = {
        let on_cancel = props.on_cancel.clone();
        Callback::from(move |_: MouseEvent| on_cancel.emit(()))
    };
    html! {
        <div class="vitrine-confirm-backdrop">
            <div class="vitrine-confirm" role="alertdialog">
                <h3>{bundle.text("confirm.delete_title", "Delete this item?")}</h3>
                <p>{bundle.text("confirm.delete_body", "")}</p>
                <div class="actions">
                    <button disabled={props.busy} onclick={cancel}>
                        {bundle.text("confirm.cancel", "Cancel")}
                    </button>
                    <button class="danger" disabled={props.busy} onclick={confirm}>
                        {bundle.text("confirm.delete_cta", "Delete")}
                    </button>
                </div>
            </div>
        </div>
    }
}
