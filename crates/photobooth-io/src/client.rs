//! Backend client built on the browser `fetch` API.
//!
//! Every call is a single request with no retry.  Capture requests can
//! be bounded: a `gloo-timers` callback aborts the request through an
//! `AbortController`, which surfaces as [`ClientError::Aborted`].
//!
//! All functions in this module require a browser environment
//! (`wasm32-unknown-unknown` target).

use std::time::Duration;

use photobooth_sequencer::endpoint::{self, Endpoint, FORM_CONTENT_TYPE};
use photobooth_sequencer::reply::{
    self, CameraList, CapturedImage, ConfirmReply, Diagnostics, Health, SetCameraReply,
};
use photobooth_sequencer::BoothConfig;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, AbortSignal, Request, RequestInit, Response};

/// Errors from a backend request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// A browser API call failed, or `fetch` rejected (network error,
    /// CORS refusal, backend down).
    #[error("browser API error: {0}")]
    JsError(String),

    /// The backend answered with an error.
    #[error("{0}")]
    Backend(String),

    /// The reply body did not parse.
    #[error("unexpected reply: {0}")]
    Decode(String),

    /// The request was aborted before it finished.
    #[error("request aborted")]
    Aborted,
}

impl From<JsValue> for ClientError {
    fn from(value: JsValue) -> Self {
        if let Some(exception) = value.dyn_ref::<web_sys::DomException>() {
            if exception.name() == "AbortError" {
                return Self::Aborted;
            }
            return Self::JsError(exception.message());
        }
        Self::JsError(
            value
                .as_string()
                .unwrap_or_else(|| format!("{value:?}")),
        )
    }
}

impl From<photobooth_sequencer::BoothError> for ClientError {
    fn from(value: photobooth_sequencer::BoothError) -> Self {
        Self::Decode(value.to_string())
    }
}

/// A completed HTTP exchange.
struct RawReply {
    status: u16,
    status_text: String,
    body: String,
}

impl RawReply {
    const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Fail on a non-2xx status.
    fn success(self) -> Result<Self, ClientError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ClientError::Backend(reply::status_message(
                self.status,
                &self.status_text,
                &self.body,
            )))
        }
    }
}

/// Thin wrapper around the backend endpoints.
///
/// Cheap to clone; holds only the configuration needed to build URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoothClient {
    config: BoothConfig,
}

impl BoothClient {
    /// Create a client for the backend named in `config`.
    #[must_use]
    pub const fn new(config: BoothConfig) -> Self {
        Self { config }
    }

    /// The configuration this client was built from.
    #[must_use]
    pub const fn config(&self) -> &BoothConfig {
        &self.config
    }

    /// Switch the backend to the camera at `camera_port`.
    ///
    /// Returns the port the backend reports as selected.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Backend`] if the backend rejects the port,
    /// [`ClientError::Decode`] if the reply is not the expected JSON,
    /// and [`ClientError::JsError`] if the request could not be made.
    #[allow(clippy::future_not_send)] // WASM is single-threaded; fetch futures are !Send
    pub async fn switch_camera(&self, camera_port: &str) -> Result<Option<String>, ClientError> {
        let body = endpoint::set_camera_body(camera_port);
        let raw = self
            .send(Endpoint::SetCamera, Some(&body), None)
            .await?
            .success()?;
        SetCameraReply::from_json(&raw.body)?
            .accepted()
            .map_err(ClientError::Backend)
    }

    /// Capture one photo.
    ///
    /// With `timeout`, the request is aborted after that long and
    /// [`ClientError::Aborted`] is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Aborted`] on timeout,
    /// [`ClientError::Backend`] if the backend reports a failure, and
    /// [`ClientError::JsError`] if the request could not be made.
    #[allow(clippy::future_not_send)] // WASM is single-threaded; fetch futures are !Send
    pub async fn capture(&self, timeout: Option<Duration>) -> Result<CapturedImage, ClientError> {
        let controller = AbortController::new()?;
        let _abort_timer = timeout.map(|limit| {
            let controller = controller.clone();
            gloo_timers::callback::Timeout::new(millis(limit), move || controller.abort())
        });
        let raw = self
            .send(Endpoint::Capture, None, Some(&controller.signal()))
            .await?;
        reply::interpret_capture(raw.status, &raw.status_text, &raw.body).map_err(ClientError::Backend)
    }

    /// Tell the backend to drop the captured image and resume preview.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails.
    #[allow(clippy::future_not_send)] // WASM is single-threaded; fetch futures are !Send
    pub async fn return_live(&self) -> Result<(), ClientError> {
        self.send(Endpoint::ReturnLive, None, None).await?.success()?;
        Ok(())
    }

    /// Accept the captured photo and resume preview.
    ///
    /// Returns the fresh preview URL the backend hands out, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails or the body is not
    /// the expected JSON.
    #[allow(clippy::future_not_send)] // WASM is single-threaded; fetch futures are !Send
    pub async fn confirm(&self) -> Result<Option<String>, ClientError> {
        let raw = self.send(Endpoint::Confirm, None, None).await?.success()?;
        Ok(ConfirmReply::from_json(&raw.body)?.video)
    }

    /// Stop the backend's preview stream.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails.
    #[allow(clippy::future_not_send)] // WASM is single-threaded; fetch futures are !Send
    pub async fn stop_stream(&self) -> Result<(), ClientError> {
        self.send(Endpoint::Stop, None, None).await?.success()?;
        Ok(())
    }

    /// List the cameras the backend can see.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails or the body is not
    /// the expected JSON.
    #[allow(clippy::future_not_send)] // WASM is single-threaded; fetch futures are !Send
    pub async fn cameras(&self) -> Result<CameraList, ClientError> {
        let raw = self.send(Endpoint::Cameras, None, None).await?.success()?;
        Ok(CameraList::from_json(&raw.body)?)
    }

    /// Fetch backend status.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails or the body is not
    /// the expected JSON.
    #[allow(clippy::future_not_send)] // WASM is single-threaded; fetch futures are !Send
    pub async fn health(&self) -> Result<Health, ClientError> {
        let raw = self.send(Endpoint::Health, None, None).await?.success()?;
        Ok(Health::from_json(&raw.body)?)
    }

    /// Fetch detected cameras and preview state.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails or the body is not
    /// the expected JSON.
    #[allow(clippy::future_not_send)] // WASM is single-threaded; fetch futures are !Send
    pub async fn diagnostics(&self) -> Result<Diagnostics, ClientError> {
        let raw = self.send(Endpoint::Diag, None, None).await?.success()?;
        Ok(Diagnostics::from_json(&raw.body)?)
    }

    /// Issue one request and read the whole body as text.
    #[allow(clippy::future_not_send)]
    async fn send(
        &self,
        endpoint: Endpoint,
        form_body: Option<&str>,
        signal: Option<&AbortSignal>,
    ) -> Result<RawReply, ClientError> {
        let window =
            web_sys::window().ok_or_else(|| ClientError::JsError("no global window".into()))?;

        let init = RequestInit::new();
        init.set_method(endpoint.method().as_str());
        if let Some(body) = form_body {
            init.set_body(&JsValue::from_str(body));
        }
        if let Some(signal) = signal {
            init.set_signal(Some(signal));
        }

        let url = self.config.endpoint_url(endpoint);
        let request = Request::new_with_str_and_init(&url, &init)?;
        if form_body.is_some() {
            request.headers().set("Content-Type", FORM_CONTENT_TYPE)?;
        }

        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await?
            .dyn_into()
            .map_err(|_| ClientError::JsError("fetch did not return a Response".into()))?;

        let body = JsFuture::from(response.text()?)
            .await?
            .as_string()
            .unwrap_or_default();

        Ok(RawReply {
            status: response.status(),
            status_text: response.status_text(),
            body,
        })
    }
}

/// Clamp a duration to the `u32` milliseconds browser timers take.
#[must_use]
pub fn millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}
