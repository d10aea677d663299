//! Adaptive source attachment.
//!
//! Backend selection at attach time: native HLS support when the platform
//! has it, a dynamically loaded hls.js client otherwise, direct `src`
//! assignment as the last resort. Exactly one handle is live at a time and
//! [`AttachHandle::detach`] is the single teardown entrypoint.

use gloo::console;
use js_sys::{Array, Function, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlMediaElement, HtmlScriptElement};

const HLS_SCRIPT_URL: &str = "https://cdn.jsdelivr.net/npm/hls.js@1/dist/hls.min.js";
const HLS_MIME: &str = "application/vnd.apple.mpegurl";

/// Live attachment to a media element.
#[derive(Debug)]
pub(crate) enum AttachHandle {
    /// Plain `src` assignment (progressive stream or fallback).
    Direct,
    /// Native adaptive playback through `src`.
    Native,
    /// hls.js instance owning the media source.
    Hls(JsValue),
}

impl AttachHandle {
    /// Tear the attachment down and release the media element's source.
    pub(crate) fn detach(&self, media: &HtmlMediaElement) {
        if let Self::Hls(instance) = self {
            if let Err(err) = call_method(instance, "destroy", &[]) {
                console::warn!("hls teardown failed", err.to_string());
            }
        }
        let _ = media.remove_attribute("src");
        media.load();
    }
}

/// Whether a URL points at an adaptive-streaming playlist.
pub(crate) fn is_hls_url(url: &str) -> bool {
    url.split(['?', '#'])
        .next()
        .unwrap_or(url)
        .to_ascii_lowercase()
        .ends_with(".m3u8")
}

/// Attach a stream URL to the media element, choosing a backend.
pub(crate) async fn attach(
    media: &HtmlMediaElement,
    url: &str,
) -> anyhow::Result<AttachHandle> {
    if !is_hls_url(url) {
        media.set_src(url);
        return Ok(AttachHandle::Direct);
    }
    if !media.can_play_type(HLS_MIME).is_empty() {
        media.set_src(url);
        return Ok(AttachHandle::Native);
    }
    let ctor = ensure_hls_loaded().await?;
    if !hls_supported(&ctor) {
        console::warn!("hls.js reports no MSE support; assigning source directly");
        media.set_src(url);
        return Ok(AttachHandle::Direct);
    }
    let instance = Reflect::construct(&ctor, &Array::new())
        .map_err(|err| anyhow::anyhow!("hls constructor: {err:?}"))?;
    call_method(&instance, "loadSource", &[JsValue::from_str(url)])?;
    call_method(&instance, "attachMedia", &[JsValue::from(media.clone())])?;
    Ok(AttachHandle::Hls(instance))
}

async fn ensure_hls_loaded() -> anyhow::Result<Function> {
    if let Some(ctor) = global_hls() {
        return Ok(ctor);
    }
    load_script(HLS_SCRIPT_URL).await?;
    global_hls().ok_or_else(|| anyhow::anyhow!("hls.js loaded without exposing a constructor"))
}

fn global_hls() -> Option<Function> {
    Reflect::get(&gloo::utils::window(), &JsValue::from_str("Hls"))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}

fn hls_supported(ctor: &Function) -> bool {
    Reflect::get(ctor, &JsValue::from_str("isSupported"))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
        .and_then(|is_supported| is_supported.call0(ctor).ok())
        .and_then(|value| value.as_bool())
        .unwrap_or(false)
}

async fn load_script(src: &str) -> anyhow::Result<()> {
    let document = gloo::utils::document();
    let promise = Promise::new(&mut |resolve, reject| {
        let script = document
            .create_element("script")
            .ok()
            .and_then(|element| element.dyn_into::<HtmlScriptElement>().ok());
        let Some(script) = script else {
            let _ = reject.call0(&JsValue::NULL);
            return;
        };
        script.set_src(src);
        script.set_onload(Some(&resolve));
        script.set_onerror(Some(&reject));
        if let Some(body) = document.body() {
            let _ = body.append_child(&script);
        } else {
            let _ = reject.call0(&JsValue::NULL);
        }
    });
    JsFuture::from(promise)
        .await
        .map(|_| ())
        .map_err(|err| anyhow::anyhow!("script load {src}: {err:?}"))
}

fn call_method(target: &JsValue, name: &str, args: &[JsValue]) -> anyhow::Result<JsValue> {
    let method: Function = Reflect::get(target, &JsValue::from_str(name))
        .map_err(|err| anyhow::anyhow!("{name}: {err:?}"))?
        .dyn_into()
        .map_err(|_| anyhow::anyhow!("{name} is not callable"))?;
    let result = match args {
        [] => method.call0(target),
        [one] => method.call1(target, one),
        _ => {
            let list = Array::new();
            for arg in args {
                list.push(arg);
            }
            method.apply(target, &list)
        }
    };
    result.map_err(|err| anyhow::anyhow!("{name}: {err:?}"))
}
