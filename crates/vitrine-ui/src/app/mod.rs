//! Widget shell: boot, list refresh orchestration, top-level callbacks.

pub(crate) mod api;
mod preferences;

use crate::components::banner::BannerHost;
use crate::components::confirm::ConfirmDialog;
use crate::components::filters::FilterBar;
use crate::components::gallery::GalleryView;
use crate::components::preview::PreviewModal;
use crate::components::upload::UploadPanel;
use crate::core::store::{self as store, AppStore};
use crate::features::gallery::logic::{
    ListFailure, apply_client_filters, build_list_request, classify_list_failure,
    page_after_delete, should_schedule_poll,
};
use crate::features::gallery::state as gallery;
use crate::features::preview::state::{self as preview, Teardown};
use crate::features::upload::logic::{build_register_request, staged_kind, validate};
use crate::features::upload::state::{self as upload, UploadDraft};
use crate::i18n::{LocaleCode, TranslationBundle};
use crate::models::{GalleryTab, MediaCard};
use crate::services::api::{ApiClient, ApiError};
use api::ApiCtx;
use gloo::console;
use gloo::timers::callback::Timeout;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys::HtmlSelectElement;
use yew::platform::spawn_local;
use yew::prelude::*;
use yewdux::prelude::*;

/// Silent re-poll cadence while owned items are still transcoding.
const POLL_DELAY_MS: u32 = 4000;

/// Everything the async flows need, cheap to clone into tasks.
#[derive(Clone)]
struct ShellCtx {
    client: Rc<ApiClient>,
    dispatch: Dispatch<AppStore>,
    poll_timer: Rc<RefCell<Option<Timeout>>>,
    bundle: TranslationBundle,
}

#[function_component(VitrineApp)]
#[allow(clippy::too_many_lines)]
fn vitrine_app() -> Html {
    let locale = use_state(preferences::load_locale);
    let bundle = use_memo(|locale: &LocaleCode| TranslationBundle::new(*locale), *locale);
    let api = use_memo(
        |_| {
            let widget = preferences::host_config();
            ApiCtx::new(preferences::api_base_url(&widget))
        },
        (),
    );
    let dispatch = Dispatch::<AppStore>::new();
    let poll_timer = use_mut_ref(|| None as Option<Timeout>);
    let ctx = ShellCtx {
        client: api.client.clone(),
        dispatch: dispatch.clone(),
        poll_timer: poll_timer.clone(),
        bundle: (*bundle).clone(),
    };

    {
        // Boot: host config into the store, feature flags, first page.
        let ctx = ctx.clone();
        use_effect_with_deps(
            move |_| {
                let widget = preferences::host_config();
                ctx.dispatch.reduce_mut(|store| {
                    if let Some(per_page) = widget.per_page {
                        store.gallery.per_page = per_page.max(1);
                    }
                    store.config.widget = widget;
                });
                {
                    let ctx = ctx.clone();
                    spawn_local(async move {
                        match ctx.client.fetch_config().await {
                            Ok(config) => ctx.dispatch.reduce_mut(|store| {
                                store.config.watermark = config.watermark;
                            }),
                            Err(err) => {
                                console::warn!("feature flags unavailable", err.to_string());
                            }
                        }
                    });
                }
                spawn_refresh(ctx, false);
                || {}
            },
            (),
        );
    }

    let config = use_selector(|store: &AppStore| store.config.widget.clone());
    let messages = use_selector(|store: &AppStore| {
        (store.gallery.notice.clone(), store.gallery.error.clone())
    });
    let confirm = use_selector(|store: &AppStore| {
        (store.gallery.confirm_delete.is_some(), store.gallery.delete_busy)
    });

    let on_refresh = {
        let ctx = ctx.clone();
        Callback::from(move |()| spawn_refresh(ctx.clone(), false))
    };
    let on_page = {
        let ctx = ctx.clone();
        Callback::from(move |page: u32| {
            ctx.dispatch
                .reduce_mut(|store| gallery::set_page(&mut store.gallery, page));
            spawn_refresh(ctx.clone(), false);
        })
    };
    let on_like = {
        let ctx = ctx.clone();
        Callback::from(move |id: String| {
            let mut rollback = None;
            ctx.dispatch.reduce_mut(|store| {
                gallery::clear_messages(&mut store.gallery);
                rollback = store::begin_like(store, &id);
            });
            let Some(rollback) = rollback else {
                return;
            };
            let ctx = ctx.clone();
            spawn_local(async move {
                let call = if rollback.next_liked {
                    ctx.client.like(&id).await
                } else {
                    ctx.client.unlike(&id).await
                };
                match call {
                    Ok(()) => ctx.dispatch.reduce_mut(|store| store::settle_like(store, &id)),
                    Err(err) => {
                        console::warn!("like toggle failed", err.to_string());
                        let message = ctx
                            .bundle
                            .text("gallery.like_failed", "Could not update the like.");
                        ctx.dispatch.reduce_mut(|store| {
                            store::rollback_like(store, &id, rollback);
                            store.gallery.error = Some(message);
                        });
                    }
                }
            });
        })
    };
    let on_open = {
        let ctx = ctx.clone();
        Callback::from(move |id: String| {
            let mut teardown = None;
            ctx.dispatch.reduce_mut(|store| {
                if let Some(row) = gallery::select_row(&store.gallery, &id) {
                    let plan = preview::open(&mut store.preview, (*row).clone());
                    teardown = Some(plan.teardown);
                }
            });
            // The modal drives the follow-up fetch; only the previous
            // session's teardown runs here.
            if let Some(teardown) = teardown {
                run_teardown(&ctx, teardown);
            }
        })
    };
    let on_delete_request = {
        let ctx = ctx.clone();
        Callback::from(move |id: String| {
            let in_flight_notice = ctx.bundle.text(
                "confirm.delete_in_flight",
                "Items still processing cannot be deleted yet.",
            );
            ctx.dispatch.reduce_mut(|store| {
                gallery::clear_messages(&mut store.gallery);
                let in_flight = gallery::select_row(&store.gallery, &id)
                    .is_some_and(|row| row.status.in_flight());
                if in_flight {
                    store.gallery.notice = Some(in_flight_notice);
                } else {
                    store.gallery.confirm_delete = Some(id.clone());
                }
            });
        })
    };
    let on_confirm_delete = {
        let ctx = ctx.clone();
        Callback::from(move |()| {
            let mut target = None;
            ctx.dispatch.reduce_mut(|store| {
                if store.gallery.delete_busy {
                    return;
                }
                target = store.gallery.confirm_delete.clone();
                if target.is_some() {
                    store.gallery.delete_busy = true;
                }
            });
            if let Some(id) = target {
                let ctx = ctx.clone();
                spawn_local(async move { run_delete(&ctx, &id).await });
            }
        })
    };
    let on_cancel_delete = {
        let dispatch = dispatch.clone();
        Callback::from(move |()| {
            dispatch.reduce_mut(|store| {
                if !store.gallery.delete_busy {
                    store.gallery.confirm_delete = None;
                }
            });
        })
    };
    let on_retry = {
        let ctx = ctx.clone();
        Callback::from(move |id: String| {
            ctx.dispatch
                .reduce_mut(|store| gallery::clear_messages(&mut store.gallery));
            let ctx = ctx.clone();
            spawn_local(async move {
                match ctx.client.retry_processing(&id).await {
                    Ok(()) => run_refresh(&ctx, true).await,
                    Err(err) => {
                        let message = if err.message.is_empty() {
                            ctx.bundle
                                .text("gallery.retry_failed", "Could not requeue the item.")
                        } else {
                            err.message
                        };
                        ctx.dispatch
                            .reduce_mut(|store| store.gallery.error = Some(message));
                    }
                }
            });
        })
    };
    let on_upload_submit = {
        let ctx = ctx.clone();
        Callback::from(move |()| {
            let draft = ctx.dispatch.get().upload.draft.clone();
            if let Err(issue) = validate(&draft) {
                let message = ctx.bundle.text(issue.message_key(), "");
                ctx.dispatch
                    .reduce_mut(|store| store.upload.error = Some(message));
                return;
            }
            let Some(file) = draft.file.clone() else {
                return;
            };
            ctx.dispatch.reduce_mut(|store| {
                store.upload.error = None;
                store.upload.busy = true;
            });
            let ctx = ctx.clone();
            spawn_local(async move { run_upload(&ctx, &draft, &file).await });
        })
    };
    let toggle_upload = {
        let dispatch = dispatch.clone();
        Callback::from(move |_: MouseEvent| {
            dispatch.reduce_mut(|store| store.upload.open = !store.upload.open);
        })
    };
    let on_dismiss = {
        let dispatch = dispatch.clone();
        Callback::from(move |()| {
            dispatch.reduce_mut(|store| gallery::clear_messages(&mut store.gallery));
        })
    };
    let on_locale = {
        let locale = locale.clone();
        Callback::from(move |event: Event| {
            let value = event.target_unchecked_into::<HtmlSelectElement>().value();
            if let Some(code) = LocaleCode::from_lang_tag(&value) {
                preferences::persist_locale(code);
                locale.set(code);
            }
        })
    };

    html! {
        <ContextProvider<TranslationBundle> context={(*bundle).clone()}>
        <ContextProvider<ApiCtx> context={(*api).clone()}>
            <div class="vitrine-widget" dir={if bundle.rtl() { "rtl" } else { "ltr" }}>
                <header class="vitrine-head">
                    {if config.show_nav {
                        html! {
                            <h2>{config.nav_label.clone().unwrap_or_else(|| {
                                bundle.text("nav.gallery", "Gallery")
                            })}</h2>
                        }
                    } else { html!{} }}
                    <select onchange={on_locale}>
                        {for LocaleCode::all().into_iter().map(|code| html! {
                            <option value={code.code()} selected={code == *locale}>
                                {code.label()}
                            </option>
                        })}
                    </select>
                    <button class="vitrine-upload-toggle" onclick={toggle_upload}>
                        {bundle.text("upload.title", "Upload media")}
                    </button>
                </header>
                <BannerHost
                    notice={messages.0.clone()}
                    error={messages.1.clone()}
                    on_dismiss={on_dismiss}
                />
                <FilterBar tags={config.tags.clone()} on_changed={on_refresh} />
                <UploadPanel
                    tags={config.tags.clone()}
                    terms_url={config.terms_url.clone()}
                    on_submit={on_upload_submit}
                />
                <GalleryView
                    {on_like}
                    {on_open}
                    on_delete={on_delete_request}
                    {on_retry}
                    {on_page}
                />
                <PreviewModal />
                <ConfirmDialog
                    open={confirm.0}
                    busy={confirm.1}
                    on_confirm={on_confirm_delete}
                    on_cancel={on_cancel_delete}
                />
            </div>
        </ContextProvider<ApiCtx>>
        </ContextProvider<TranslationBundle>>
    }
}

fn spawn_refresh(ctx: ShellCtx, silent: bool) {
    spawn_local(async move { run_refresh(&ctx, silent).await });
}

/// Fetch the current page, applying the defensive client-side filter pass
/// and downgrading the session to local tag filtering on a tagged 5xx.
async fn run_refresh(ctx: &ShellCtx, silent: bool) {
    ctx.poll_timer.borrow_mut().take();
    ctx.dispatch.reduce_mut(|store| {
        gallery::clear_messages(&mut store.gallery);
        if !silent {
            store.gallery.loading = true;
        }
    });
    loop {
        let request = build_list_request(&ctx.dispatch.get().gallery);
        match ctx.client.fetch_media(&request.path).await {
            Ok(envelope) => {
                ctx.dispatch.reduce_mut(|store| {
                    let cards = envelope
                        .media_items
                        .iter()
                        .cloned()
                        .map(MediaCard::from)
                        .collect();
                    let cards = apply_client_filters(&store.gallery, cards);
                    store::apply_page(store, cards, &envelope);
                    store.gallery.loading = false;
                });
                schedule_poll(ctx);
                return;
            }
            Err(err) => match classify_list_failure(err.status, request.tags_sent) {
                ListFailure::TagFallback => {
                    console::warn!(
                        "listing rejected the tag query; filtering tags locally from now on"
                    );
                    let notice = ctx.bundle.text(
                        "gallery.tag_fallback",
                        "The server declined tag queries; tags are now filtered locally.",
                    );
                    ctx.dispatch.reduce_mut(|store| {
                        store.gallery.tags_unsupported = true;
                        store.gallery.notice = Some(notice);
                    });
                    // Loop around: the rebuilt request omits tags.
                }
                ListFailure::Unavailable => {
                    let message = ctx
                        .bundle
                        .text("gallery.not_available", "This gallery is not available.");
                    ctx.dispatch.reduce_mut(|store| {
                        store.gallery.loading = false;
                        store.gallery.error = Some(message);
                    });
                    return;
                }
                ListFailure::Surface => {
                    let message = if err.message.is_empty() {
                        ctx.bundle.text("gallery.load_failed", "Could not load media.")
                    } else {
                        err.message
                    };
                    ctx.dispatch.reduce_mut(|store| {
                        store.gallery.loading = false;
                        store.gallery.error = Some(message);
                    });
                    return;
                }
            },
        }
    }
}

fn schedule_poll(ctx: &ShellCtx) {
    if !should_schedule_poll(&ctx.dispatch.get().gallery) {
        return;
    }
    let next = ctx.clone();
    let handle = Timeout::new(POLL_DELAY_MS, move || spawn_refresh(next, true));
    *ctx.poll_timer.borrow_mut() = Some(handle);
}

async fn run_delete(ctx: &ShellCtx, id: &str) {
    match ctx.client.delete_media(id).await {
        Ok(()) => {
            let mut teardown = None;
            ctx.dispatch.reduce_mut(|store| {
                store.gallery.delete_busy = false;
                store.gallery.confirm_delete = None;
                let showing = store.preview.open
                    && store
                        .preview
                        .item
                        .as_ref()
                        .is_some_and(|item| item.public_id == id);
                if showing {
                    teardown = Some(preview::close(&mut store.preview));
                }
            });
            if let Some(teardown) = teardown {
                run_teardown(ctx, teardown);
            }
            run_refresh(ctx, false).await;
            let snapshot = ctx.dispatch.get();
            if let Some(previous) =
                page_after_delete(snapshot.gallery.page, snapshot.gallery.rows.len())
            {
                ctx.dispatch
                    .reduce_mut(|store| store.gallery.page = previous);
                run_refresh(ctx, false).await;
            }
        }
        Err(err) => {
            let message = if err.message.is_empty() {
                ctx.bundle
                    .text("gallery.delete_failed", "Could not delete the item.")
            } else {
                err.message
            };
            ctx.dispatch.reduce_mut(|store| {
                store.gallery.delete_busy = false;
                store.gallery.confirm_delete = None;
                store.gallery.error = Some(message);
            });
        }
    }
}

async fn run_upload(ctx: &ShellCtx, draft: &UploadDraft, file: &web_sys::File) {
    match upload_calls(ctx, draft, file).await {
        Ok(()) => {
            let notice = ctx
                .bundle
                .text("upload.done", "Upload accepted; processing has started.");
            ctx.dispatch.reduce_mut(|store| {
                upload::clear_draft(&mut store.upload);
                store.upload.open = false;
                store.upload.busy = false;
                gallery::set_tab(&mut store.gallery, GalleryTab::Mine);
                store.gallery.page = 1;
                store.gallery.notice = Some(notice);
            });
            run_refresh(ctx, false).await;
        }
        Err(message) => {
            ctx.dispatch.reduce_mut(|store| {
                store.upload.busy = false;
                store.upload.error = Some(message);
            });
        }
    }
}

/// Two-phase upload: raw file to storage, then registration of the item.
async fn upload_calls(
    ctx: &ShellCtx,
    draft: &UploadDraft,
    file: &web_sys::File,
) -> Result<(), String> {
    let kind = staged_kind(draft);
    let upload_id = ctx
        .client
        .upload_file(file, kind.as_wire())
        .await
        .map_err(|err| upload_error_text(&ctx.bundle, &err))?;
    let Some(upload_id) = upload_id else {
        return Err(ctx
            .bundle
            .text("upload.no_id", "The storage service returned no upload id."));
    };
    let watermark = ctx.dispatch.get().config.watermark.clone();
    let request = build_register_request(draft, upload_id, &watermark);
    ctx.client
        .register_media(&request)
        .await
        .map_err(|err| upload_error_text(&ctx.bundle, &err))
}

fn upload_error_text(bundle: &TranslationBundle, err: &ApiError) -> String {
    match err.status {
        403 | 404 => bundle.text(
            "upload.not_permitted",
            "Uploading is not permitted for this account.",
        ),
        _ if !err.message.is_empty() => err.message.clone(),
        _ => bundle.text("upload.failed", "Upload failed."),
    }
}

fn run_teardown(ctx: &ShellCtx, teardown: Teardown) {
    if let Some(token) = teardown.revoke_token {
        let client = ctx.client.clone();
        spawn_local(async move {
            if let Err(err) = client.revoke(&token).await {
                console::warn!("revoke failed", err.to_string());
            }
        });
    }
    if teardown.exit_fullscreen {
        gloo::utils::document().exit_fullscreen();
    }
}

/// Mount the widget into the host page: the `vitrine-root` element when the
/// host provides one, the document body otherwise.
pub fn run_app() {
    console_error_panic_hook::set_once();
    match gloo::utils::document().get_element_by_id("vitrine-root") {
        Some(root) => {
            yew::Renderer::<VitrineApp>::with_root(root).render();
        }
        None => {
            yew::Renderer::<VitrineApp>::new().render();
        }
    }
}
