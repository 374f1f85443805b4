//! JSON replies from the backend.
//!
//! Older backends answer `/capture` with plain text (`"Capturing"`),
//! newer ones with `{"ok": true, "url": ...}`.  [`interpret_capture`]
//! accepts both.

use serde::{Deserialize, Serialize};

use crate::types::BoothError;

/// Body of a `/capture` reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureReply {
    /// Whether the backend reports success.
    #[serde(default)]
    pub ok: bool,
    /// Relative URL of the saved image, e.g. `/captured_images/IMG_0001.jpg`.
    #[serde(default)]
    pub url: Option<String>,
    /// Absolute path of the image on the backend host.
    #[serde(default, rename = "serverPath")]
    pub server_path: Option<String>,
    /// Error message when `ok` is false.
    #[serde(default)]
    pub error: Option<String>,
}

/// A successfully captured image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedImage {
    /// Relative URL of the image on the backend, if it reported one.
    pub url: Option<String>,
    /// Path on the backend host, if reported.
    pub server_path: Option<String>,
}

impl CapturedImage {
    /// File name of the capture, taken from the backend path or URL.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.server_path
            .as_deref()
            .or(self.url.as_deref())
            .and_then(|p| p.rsplit(['/', '\\']).next())
            .filter(|name| !name.is_empty())
    }
}

/// Turn a raw `/capture` response into a result.
///
/// - 2xx with a JSON body: success iff `ok` is true.
/// - 2xx with a non-JSON body: success (legacy plain-text reply).
/// - anything else: failure, using the JSON `error` field if present,
///   otherwise the status line and a trimmed body.
///
/// # Errors
///
/// Returns the failure message for the user.
pub fn interpret_capture(status: u16, status_text: &str, body: &str) -> Result<CapturedImage, String> {
    let parsed = serde_json::from_str::<CaptureReply>(body).ok();
    let success = (200..300).contains(&status);
    match (success, parsed) {
        (true, Some(reply)) if reply.ok => Ok(CapturedImage {
            url: reply.url,
            server_path: reply.server_path,
        }),
        (true, None) => Ok(CapturedImage::default()),
        (_, Some(CaptureReply {
            error: Some(error), ..
        })) => Err(error),
        (true, Some(_)) => Err("backend reported failure".to_owned()),
        (false, _) => Err(status_message(status, status_text, body)),
    }
}

/// `"HTTP 503 Service Unavailable: <body>"`, with the body trimmed and
/// shortened.
#[must_use]
pub fn status_message(status: u16, status_text: &str, body: &str) -> String {
    const MAX_BODY: usize = 120;
    let mut message = format!("HTTP {status}");
    if !status_text.is_empty() {
        message.push(' ');
        message.push_str(status_text);
    }
    let body = body.trim();
    if !body.is_empty() {
        message.push_str(": ");
        match body.char_indices().nth(MAX_BODY) {
            Some((cut, _)) => {
                message.push_str(&body[..cut]);
                message.push('\u{2026}');
            }
            None => message.push_str(body),
        }
    }
    message
}

/// One detected camera.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraInfo {
    /// Camera model as reported by gphoto2 autodetect.
    pub model: String,
    /// gphoto2 port string, e.g. `usb:001,005`.
    pub port: String,
}

/// Body of a `/cameras` reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraList {
    /// Cameras found by autodetect.
    #[serde(default)]
    pub cameras: Vec<CameraInfo>,
    /// Port currently in use, if any.
    #[serde(default)]
    pub selected_port: Option<String>,
}

impl CameraList {
    /// Parse a `/cameras` body.
    ///
    /// # Errors
    ///
    /// Returns [`BoothError::UnexpectedReply`] if the body is not the
    /// expected JSON.
    pub fn from_json(body: &str) -> Result<Self, BoothError> {
        serde_json::from_str(body).map_err(|e| BoothError::UnexpectedReply(e.to_string()))
    }
}

/// Body of a `/set_camera` reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetCameraReply {
    /// Whether the switch was accepted.
    #[serde(default)]
    pub ok: bool,
    /// Port now in use.
    #[serde(default)]
    pub selected_port: Option<String>,
    /// Reason when `ok` is false.
    #[serde(default)]
    pub error: Option<String>,
}

impl SetCameraReply {
    /// Parse a `/set_camera` body.
    ///
    /// # Errors
    ///
    /// Returns [`BoothError::UnexpectedReply`] if the body is not the
    /// expected JSON.
    pub fn from_json(body: &str) -> Result<Self, BoothError> {
        serde_json::from_str(body).map_err(|e| BoothError::UnexpectedReply(e.to_string()))
    }

    /// The port the backend switched to.
    ///
    /// # Errors
    ///
    /// Returns the backend's reason if it refused the switch.
    pub fn accepted(self) -> Result<Option<String>, String> {
        if self.ok {
            Ok(self.selected_port)
        } else {
            Err(self
                .error
                .unwrap_or_else(|| "camera switch rejected".to_owned()))
        }
    }
}

/// Body of a `/confirm` reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmReply {
    /// Fresh preview URL, e.g. `/video_feed?ts=1700000000000`.
    #[serde(default)]
    pub video: Option<String>,
}

impl ConfirmReply {
    /// Parse a `/confirm` body.
    ///
    /// # Errors
    ///
    /// Returns [`BoothError::UnexpectedReply`] if the body is not the
    /// expected JSON.
    pub fn from_json(body: &str) -> Result<Self, BoothError> {
        serde_json::from_str(body).map_err(|e| BoothError::UnexpectedReply(e.to_string()))
    }
}

/// Body of an `/api/diag` reply: what autodetect sees right now plus
/// the preview state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Cameras found by autodetect.
    #[serde(default)]
    pub detected: Vec<CameraInfo>,
    /// Port in use.
    #[serde(default)]
    pub selected_port: Option<String>,
    /// Preview thread is running.
    #[serde(default)]
    pub running: bool,
    /// Whether the camera supports preview frames; `None` if not probed yet.
    #[serde(default)]
    pub supports_preview: Option<bool>,
    /// Number of open preview streams.
    #[serde(default)]
    pub viewers: u32,
    /// Backend mode: `"live"` or `"captured"`.
    #[serde(default)]
    pub mode: String,
    /// Last camera error, if any.
    #[serde(default)]
    pub last_error: Option<String>,
    /// Preview frame rate cap.
    #[serde(default)]
    pub preview_fps: f64,
}

impl Diagnostics {
    /// Parse an `/api/diag` body.
    ///
    /// # Errors
    ///
    /// Returns [`BoothError::UnexpectedReply`] if the body is not the
    /// expected JSON.
    pub fn from_json(body: &str) -> Result<Self, BoothError> {
        serde_json::from_str(body).map_err(|e| BoothError::UnexpectedReply(e.to_string()))
    }

    /// Whether the port in use is among the detected cameras.  `None`
    /// when no port is pinned (autodetect).
    #[must_use]
    pub fn selected_detected(&self) -> Option<bool> {
        let port = self.selected_port.as_deref()?;
        Some(self.detected.iter().any(|camera| camera.port == port))
    }
}

/// Body of an `/api/health` reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Health {
    /// Backend is up.
    #[serde(default)]
    pub ok: bool,
    /// Preview thread is running.
    #[serde(default)]
    pub running: bool,
    /// Number of open preview streams.
    #[serde(default)]
    pub viewers: u32,
    /// Backend mode: `"live"` or `"captured"`.
    #[serde(default)]
    pub mode: String,
    /// Port in use.
    #[serde(default)]
    pub selected_port: Option<String>,
    /// Whether the camera supports preview frames; `None` if not probed yet.
    #[serde(default)]
    pub supports_preview: Option<bool>,
    /// Last camera error, if any.
    #[serde(default)]
    pub last_error: Option<String>,
    /// Preview frame rate cap.
    #[serde(default)]
    pub preview_fps: f64,
}

impl Health {
    /// Parse an `/api/health` body.
    ///
    /// # Errors
    ///
    /// Returns [`BoothError::UnexpectedReply`] if the body is not the
    /// expected JSON.
    pub fn from_json(body: &str) -> Result<Self, BoothError> {
        serde_json::from_str(body).map_err(|e| BoothError::UnexpectedReply(e.to_string()))
    }

    /// One-line summary for the status bar.
    #[must_use]
    pub fn summary(&self) -> String {
        let port = self.selected_port.as_deref().unwrap_or("auto");
        let preview = match self.supports_preview {
            Some(true) => "preview",
            Some(false) => "no preview",
            None => "preview unknown",
        };
        format!(
            "{} \u{00B7} {port} \u{00B7} {preview} \u{00B7} {} viewer(s)",
            if self.mode.is_empty() { "unknown" } else { &self.mode },
            self.viewers
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn json_success_carries_url() {
        let body = r#"{"ok": true, "url": "/captured_images/IMG_1.jpg", "serverPath": "/srv/IMG_1.jpg"}"#;
        let image = interpret_capture(200, "OK", body).unwrap();
        assert_eq!(image.url.as_deref(), Some("/captured_images/IMG_1.jpg"));
        assert_eq!(image.file_name(), Some("IMG_1.jpg"));
    }

    #[test]
    fn plain_text_success_is_accepted() {
        let image = interpret_capture(200, "OK", "Capturing").unwrap();
        assert_eq!(image, CapturedImage::default());
        assert_eq!(image.file_name(), None);
    }

    #[test]
    fn ok_false_is_failure() {
        let err = interpret_capture(200, "OK", r#"{"ok": false, "error": "busy"}"#).unwrap_err();
        assert_eq!(err, "busy");
        let err = interpret_capture(200, "OK", r#"{"ok": false}"#).unwrap_err();
        assert_eq!(err, "backend reported failure");
    }

    #[test]
    fn error_status_prefers_json_error() {
        let err = interpret_capture(
            503,
            "Service Unavailable",
            r#"{"ok": false, "error": "No camera detected by libgphoto2"}"#,
        )
        .unwrap_err();
        assert_eq!(err, "No camera detected by libgphoto2");
    }

    #[test]
    fn error_status_without_json_uses_status_line() {
        let err = interpret_capture(500, "Internal Server Error", "  boom \n").unwrap_err();
        assert_eq!(err, "HTTP 500 Internal Server Error: boom");
        let err = interpret_capture(404, "", "").unwrap_err();
        assert_eq!(err, "HTTP 404");
    }

    #[test]
    fn status_message_truncates_long_bodies() {
        let body = "x".repeat(500);
        let message = status_message(500, "", &body);
        assert!(message.ends_with('\u{2026}'));
        assert!(message.len() < 200);
    }

    #[test]
    fn camera_list_parses_backend_shape() {
        let list = CameraList::from_json(
            r#"{"cameras": [{"model": "Canon EOS 700D", "port": "usb:001,005"}], "selected_port": null}"#,
        )
        .unwrap();
        assert_eq!(list.cameras.len(), 1);
        assert_eq!(list.cameras[0].port, "usb:001,005");
        assert_eq!(list.selected_port, None);
        assert!(CameraList::from_json("nope").is_err());
    }

    #[test]
    fn health_summary() {
        let health = Health::from_json(
            r#"{"ok": true, "running": true, "viewers": 1, "mode": "live",
                "selected_port": "usb:001,005", "supports_preview": true,
                "last_error": null, "preview_fps": 18.0}"#,
        )
        .unwrap();
        assert_eq!(
            health.summary(),
            "live \u{00B7} usb:001,005 \u{00B7} preview \u{00B7} 1 viewer(s)"
        );
        let empty = Health::default();
        assert!(empty.summary().starts_with("unknown"));
    }

    #[test]
    fn set_camera_reply_yields_selected_port() {
        let reply =
            SetCameraReply::from_json(r#"{"ok": true, "selected_port": "usb:001,005"}"#).unwrap();
        assert_eq!(reply.accepted(), Ok(Some("usb:001,005".to_owned())));
    }

    #[test]
    fn set_camera_reply_ok_false_is_rejection() {
        let reply = SetCameraReply::from_json(r#"{"ok": false, "error": "no such port"}"#).unwrap();
        assert_eq!(reply.accepted(), Err("no such port".to_owned()));
        let reply = SetCameraReply::from_json("{}").unwrap();
        assert_eq!(reply.accepted(), Err("camera switch rejected".to_owned()));
        assert!(SetCameraReply::from_json("camera_port required").is_err());
    }

    #[test]
    fn confirm_reply_carries_fresh_feed() {
        let reply = ConfirmReply::from_json(r#"{"video": "/video_feed?ts=42"}"#).unwrap();
        assert_eq!(reply.video.as_deref(), Some("/video_feed?ts=42"));
        assert_eq!(ConfirmReply::from_json("{}").unwrap().video, None);
    }

    #[test]
    fn diagnostics_parse_and_check_selected_port() {
        let diag = Diagnostics::from_json(
            r#"{"detected": [{"model": "Nikon DSC D5300", "port": "usb:002,004"}],
                "selected_port": "usb:001,005", "running": false,
                "supports_preview": null, "viewers": 0, "mode": "live",
                "last_error": "Could not claim the USB device", "preview_fps": 18.0}"#,
        )
        .unwrap();
        assert_eq!(diag.detected.len(), 1);
        assert_eq!(diag.selected_detected(), Some(false));
        assert_eq!(
            diag.last_error.as_deref(),
            Some("Could not claim the USB device")
        );

        let auto = Diagnostics::default();
        assert_eq!(auto.selected_detected(), None);
    }
}
