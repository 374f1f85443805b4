//! Image download via a temporary anchor.
//!
//! The backend serves the latest capture at `/download`.  Setting
//! `window.location` would replace the panel, so this module clicks a
//! temporary `<a download>` element instead and lets the browser save
//! the response.  Cross-origin backends ignore the `download`
//! attribute; `target="_blank"` keeps the panel open in that case.
//!
//! All functions in this module require a browser environment
//! (`wasm32-unknown-unknown` target).

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;

/// Errors that can occur when triggering a download.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for DownloadError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// Navigate a temporary anchor at `url` to download it.
///
/// `filename` suggests a save name; `None` leaves it to the server's
/// `Content-Disposition`.
///
/// # Errors
///
/// Returns [`DownloadError::JsError`] if any browser API call fails
/// (e.g., element creation or the missing `<body>`).
pub fn trigger_download(url: &str, filename: Option<&str>) -> Result<(), DownloadError> {
    let window =
        web_sys::window().ok_or_else(|| DownloadError::JsError("no global window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| DownloadError::JsError("no document".into()))?;

    let anchor: web_sys::HtmlAnchorElement = document
        .create_element("a")?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|e| DownloadError::JsError(format!("failed to cast element: {e:?}")))?;

    anchor.set_href(url);
    anchor.set_download(filename.unwrap_or_default());
    anchor.set_target("_blank");
    anchor.set_rel("noopener");

    let body = document
        .body()
        .ok_or_else(|| DownloadError::JsError("no document body".into()))?;
    body.append_child(&anchor)?;
    anchor.click();

    // Best-effort cleanup; the navigation has already started.
    let _ = body.remove_child(&anchor);

    Ok(())
}
