//! HTTP client helpers (REST).

use gloo_net::http::{Request, Response};
use std::fmt;
use vitrine_api_models::{
    ErrorBody, GalleryConfig, MediaListResponse, PlayGrant, RegisterMediaRequest, TokenRequest,
    UploadResponse,
};
use web_sys::FormData;

/// Typed failure for every REST call: the HTTP status (0 for network-level
/// failures) plus the server-provided error text when one was sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ApiError {
    pub status: u16,
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "request failed (status {})", self.status)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl From<gloo_net::Error> for ApiError {
    fn from(err: gloo_net::Error) -> Self {
        Self {
            status: 0,
            message: err.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct ApiClient {
    pub base_url: String,
}

impl ApiClient {
    pub(crate) fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<T: for<'de> serde::Deserialize<'de>>(
        &self,
        path: &str,
    ) -> Result<T, ApiError> {
        let resp = Request::get(&self.url(path)).send().await?;
        let resp = check(resp).await?;
        Ok(resp.json::<T>().await?)
    }

    async fn post_json<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<Response, ApiError> {
        let resp = Request::post(&self.url(path)).json(body)?.send().await?;
        check(resp).await
    }

    async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        let resp = Request::post(&self.url(path)).send().await?;
        check(resp).await.map(|_| ())
    }

    /// Fetch a listing page; the caller supplies the planned path+query.
    pub(crate) async fn fetch_media(&self, path: &str) -> Result<MediaListResponse, ApiError> {
        self.get_json(path).await
    }

    /// Fetch the gallery feature flags.
    pub(crate) async fn fetch_config(&self) -> Result<GalleryConfig, ApiError> {
        self.get_json("/media/config").await
    }

    /// Phase one of an upload: store the raw file, returning the upload id.
    pub(crate) async fn upload_file(
        &self,
        file: &web_sys::File,
        kind_marker: &str,
    ) -> Result<Option<String>, ApiError> {
        let form = FormData::new().map_err(|err| ApiError {
            status: 0,
            message: format!("form-data failed: {err:?}"),
        })?;
        form.append_with_blob_and_filename("file", file, &file.name())
            .map_err(|err| ApiError {
                status: 0,
                message: format!("attach file: {err:?}"),
            })?;
        let _ = form.append_with_str("type", kind_marker);
        let resp = Request::post(&self.url("/uploads.json"))
            .body(form)
            .send()
            .await?;
        let resp = check(resp).await?;
        Ok(resp.json::<UploadResponse>().await?.id)
    }

    /// Phase two of an upload: register the stored file as a gallery item.
    pub(crate) async fn register_media(
        &self,
        request: &RegisterMediaRequest,
    ) -> Result<(), ApiError> {
        self.post_json("/media", request).await.map(|_| ())
    }

    pub(crate) async fn like(&self, id: &str) -> Result<(), ApiError> {
        self.post_empty(&format!("/media/{id}/like")).await
    }

    pub(crate) async fn unlike(&self, id: &str) -> Result<(), ApiError> {
        self.post_empty(&format!("/media/{id}/unlike")).await
    }

    pub(crate) async fn delete_media(&self, id: &str) -> Result<(), ApiError> {
        let resp = Request::delete(&self.url(&format!("/media/{id}"))).send().await?;
        check(resp).await.map(|_| ())
    }

    /// Requeue server-side processing for a failed item.
    pub(crate) async fn retry_processing(&self, id: &str) -> Result<(), ApiError> {
        self.post_empty(&format!("/media/{id}/retry")).await
    }

    /// Acquire a playback grant.
    pub(crate) async fn play_grant(&self, id: &str) -> Result<PlayGrant, ApiError> {
        self.get_json(&format!("/media/{id}/play")).await
    }

    /// Keep the playback session alive. 429 means pre-empted.
    pub(crate) async fn heartbeat(&self, token: &str) -> Result<(), ApiError> {
        self.post_json(
            "/media/heartbeat",
            &TokenRequest {
                token: token.to_string(),
            },
        )
        .await
        .map(|_| ())
    }

    /// Release a playback grant; callers treat failures as best-effort.
    pub(crate) async fn revoke(&self, token: &str) -> Result<(), ApiError> {
        self.post_json(
            "/media/revoke",
            &TokenRequest {
                token: token.to_string(),
            },
        )
        .await
        .map(|_| ())
    }
}

async fn check(resp: Response) -> Result<Response, ApiError> {
    if resp.ok() {
        return Ok(resp);
    }
    let status = resp.status();
    let message = match resp.text().await {
        Ok(body) => serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|parsed| parsed.error)
            .unwrap_or_default(),
        Err(_) => String::new(),
    };
    Err(ApiError { status, message })
}
