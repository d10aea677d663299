//! Upload panel: file picker, metadata form, watermark controls.
//!
//! The form edits the staged draft in the store; submission itself (raw
//! upload, then registration) is orchestrated by the app shell.

use crate::core::store::AppStore;
use crate::features::upload::logic::staged_kind;
use crate::i18n::{DEFAULT_LOCALE, TranslationBundle};
use vitrine_api_models::MediaKind;
use web_sys::{HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};
use yew::prelude::*;
use yewdux::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct UploadPanelProps {
    /// Tag allow-list from the host config.
    pub tags: Vec<String>,
    /// Optional upload-terms URL linked below the form.
    pub terms_url: Option<String>,
    pub on_submit: Callback<()>,
}

#[function_component(UploadPanel)]
#[allow(clippy::too_many_lines)]
pub(crate) fn upload_panel(props: &UploadPanelProps) -> Html {
    let bundle = use_context::<TranslationBundle>()
        .unwrap_or_else(|| TranslationBundle::new(DEFAULT_LOCALE));
    let dispatch = Dispatch::<AppStore>::new();
    let upload = use_selector(|store: &AppStore| store.upload.clone());
    let watermark = use_selector(|store: &AppStore| store.config.watermark.clone());
    if !upload.open {
        return html! {};
    }

    let on_file = {
        let dispatch = dispatch.clone();
        Callback::from(move |event: Event| {
            let input = event.target_unchecked_into::<HtmlInputElement>();
            let picked = input.files().and_then(|files| files.get(0));
            dispatch.reduce_mut(|store| {
                let draft = &mut store.upload.draft;
                if let Some(file) = picked {
                    draft.file_name = Some(file.name());
                    draft.file_mime = file.type_();
                    draft.file = Some(file);
                } else {
                    draft.file_name = None;
                    draft.file_mime = String::new();
                    draft.file = None;
                }
            });
        })
    };
    let on_title = field_setter(&dispatch, |draft, value| draft.title = value);
    let on_subject = field_setter(&dispatch, |draft, value| draft.subject = value);
    let on_description = {
        let dispatch = dispatch.clone();
        Callback::from(move |event: Event| {
            let value = event.target_unchecked_into::<HtmlTextAreaElement>().value();
            dispatch.reduce_mut(|store| store.upload.draft.description = value);
        })
    };
    let on_watermark_toggle = {
        let dispatch = dispatch.clone();
        Callback::from(move |event: Event| {
            let checked = event.target_unchecked_into::<HtmlInputElement>().checked();
            dispatch.reduce_mut(|store| store.upload.draft.watermark_enabled = checked);
        })
    };
    let on_watermark_choice = {
        let dispatch = dispatch.clone();
        Callback::from(move |event: Event| {
            let value = event.target_unchecked_into::<HtmlSelectElement>().value();
            dispatch.reduce_mut(|store| {
                store.upload.draft.watermark_choice = (!value.is_empty()).then_some(value);
            });
        })
    };
    let on_authorized = {
        let dispatch = dispatch.clone();
        Callback::from(move |event: Event| {
            let checked = event.target_unchecked_into::<HtmlInputElement>().checked();
            dispatch.reduce_mut(|store| store.upload.draft.authorized = checked);
        })
    };
    let toggle_tag = Callback::from(move |tag: String| {
        dispatch.reduce_mut(|store| {
            let tags = &mut store.upload.draft.tags;
            if let Some(index) = tags.iter().position(|t| t == &tag) {
                tags.remove(index);
            } else {
                tags.push(tag);
            }
        });
    });
    let submit = {
        let on_submit = props.on_submit.clone();
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            on_submit.emit(());
        })
    };

    // Watermark controls only make sense for image/video files.
    let watermark_applies =
        watermark.enabled && staged_kind(&upload.draft) != MediaKind::Audio;
    let draft = &upload.draft;

    html! {
        <form class="vitrine-upload" onsubmit={submit}>
            <h3>{bundle.text("upload.title", "Upload media")}</h3>
            <label class="vitrine-file-pick">
                {bundle.text("upload.pick_file", "Choose a file")}
                <input type="file" accept="image/*,video/*,audio/*" onchange={on_file} />
            </label>
            {if let Some(name) = &draft.file_name {
                html! {
                    <p class="vitrine-file-name">
                        {format!("{} {name}", bundle.text("upload.file_ready", "Ready:"))}
                    </p>
                }
            } else { html!{} }}
            <label>
                {bundle.text("upload.title_label", "Title")}
                <input
                    type="text"
                    placeholder={bundle.text("upload.title_placeholder", "Give it a title")}
                    value={draft.title.clone()}
                    onchange={on_title}
                />
            </label>
            <label>
                {bundle.text("upload.subject_label", "Subject")}
                <input
                    type="text"
                    placeholder={bundle.text("upload.subject_placeholder", "Pick a subject")}
                    value={draft.subject.clone()}
                    onchange={on_subject}
                />
            </label>
            <label>
                {bundle.text("upload.description_label", "Description")}
                <textarea value={draft.description.clone()} onchange={on_description} />
            </label>
            {if props.tags.is_empty() { html!{} } else {
                html! {
                    <div class="vitrine-tag-row" aria-label={bundle.text("upload.tags_label", "Tags")}>
                        {for props.tags.iter().cloned().map(|tag| {
                            let selected = draft.tags.iter().any(|t| t == &tag);
                            let toggle_tag = toggle_tag.clone();
                            let value = tag.clone();
                            html! {
                                <button
                                    type="button"
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
            {if watermark_applies && watermark.user_can_toggle {
                html! {
                    <label class="vitrine-check">
                        <input
                            type="checkbox"
                            checked={draft.watermark_enabled}
                            onchange={on_watermark_toggle}
                        />
                        {bundle.text("upload.watermark_label", "Apply watermark")}
                    </label>
                }
            } else { html!{} }}
            {if watermark_applies && watermark.user_can_choose_preset
                && !watermark.choices.is_empty()
            {
                html! {
                    <label>
                        {bundle.text("upload.watermark_preset", "Watermark style")}
                        <select onchange={on_watermark_choice}>
                            {for watermark.choices.iter().cloned().map(|choice| {
                                let selected = draft.watermark_choice.as_deref()
                                    == Some(choice.as_str())
                                    || (draft.watermark_choice.is_none()
                                        && watermark.default_choice.as_deref()
                                            == Some(choice.as_str()));
                                html! {
                                    <option value={choice.clone()} {selected}>{choice}</option>
                                }
                            })}
                        </select>
                    </label>
                }
            } else { html!{} }}
            <label class="vitrine-check">
                <input type="checkbox" checked={draft.authorized} onchange={on_authorized} />
                {bundle.text(
                    "upload.authorize_label",
                    "I am authorized to publish this file.",
                )}
            </label>
            {if let Some(terms_url) = &props.terms_url {
                html! {
                    <a href={terms_url.clone()} target="_blank" rel="noopener">
                        {bundle.text("upload.terms", "Upload terms")}
                    </a>
                }
            } else { html!{} }}
            {if let Some(error) = &upload.error {
                html! { <p class="vitrine-upload-error" role="alert">{error}</p> }
            } else { html!{} }}
            <button type="submit" disabled={upload.busy}>
                {if upload.busy {
                    bundle.text("upload.uploading", "Uploading…")
                } else {
                    bundle.text("upload.submit", "Upload")
                }}
            </button>
        </form>
    }
}

fn field_setter(
    dispatch: &Dispatch<AppStore>,
    apply: impl Fn(&mut crate::features::upload::state::UploadDraft, String) + 'static,
) -> Callback<Event> {
    let dispatch = dispatch.clone();
    Callback::from(move |event: Event| {
        let value = event.target_unchecked_into::<HtmlInputElement>().value();
        dispatch.reduce_mut(|store| apply(&mut store.upload.draft, value));
    })
}
