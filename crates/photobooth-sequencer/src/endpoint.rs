//! Backend endpoints and `application/x-www-form-urlencoded` helpers.
//!
//! The backend is a small Flask service wrapping gphoto2.  Paths and
//! methods here must match its routes.

use std::fmt::Write;

use crate::types::BoothError;

/// MIME type for form-encoded request bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Form field carrying the gphoto2 port string for `/set_camera`.
pub const CAMERA_PORT_FIELD: &str = "camera_port";

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

impl Method {
    /// Method name as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// A backend route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Switch the active camera (form body `camera_port=<port>`).
    SetCamera,
    /// Capture one full-resolution photo.
    Capture,
    /// Accept the captured photo and go back to live preview; replies
    /// with a fresh preview URL.
    Confirm,
    /// Drop the captured image and go back to live preview.
    ReturnLive,
    /// The most recent captured image (navigated to, not fetched).
    Download,
    /// Detected cameras, as JSON.
    Cameras,
    /// Backend status, as JSON.
    Health,
    /// Detected cameras plus preview state, as JSON.
    Diag,
    /// MJPEG live preview stream (used as an `<img>` source).
    VideoFeed,
    /// Stop the preview stream.
    Stop,
}

impl Endpoint {
    /// Path on the backend, with a leading slash.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::SetCamera => "/set_camera",
            Self::Capture => "/capture",
            Self::Confirm => "/confirm",
            Self::ReturnLive => "/return_live",
            Self::Download => "/download",
            Self::Cameras => "/cameras",
            Self::Health => "/api/health",
            Self::Diag => "/api/diag",
            Self::VideoFeed => "/video_feed",
            Self::Stop => "/stop",
        }
    }

    /// Method the backend expects.
    #[must_use]
    pub const fn method(self) -> Method {
        match self {
            Self::SetCamera | Self::Capture | Self::Confirm | Self::ReturnLive | Self::Stop => {
                Method::Post
            }
            Self::Download | Self::Cameras | Self::Health | Self::Diag | Self::VideoFeed => {
                Method::Get
            }
        }
    }
}

/// Encode `value` as a form component.
///
/// ASCII alphanumerics and `*-._` pass through, space becomes `+`, and
/// every other byte of the UTF-8 encoding becomes `%XX` (uppercase),
/// matching the browser's `URLSearchParams` serializer.
#[must_use]
pub fn form_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'*' | b'-' | b'.' | b'_' => {
                out.push(char::from(byte));
            }
            b' ' => out.push('+'),
            _ => {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}

/// Decode a form component (`+` as space, `%XX` escapes).
///
/// # Errors
///
/// Returns [`BoothError::MalformedEncoding`] for a truncated or
/// non-hex escape, or if the decoded bytes are not UTF-8.
pub fn form_decode(value: &str) -> Result<String, BoothError> {
    let malformed = || BoothError::MalformedEncoding(value.to_owned());
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                // `from_str_radix` alone would accept a sign (`%+1`).
                let hex = bytes
                    .get(i + 1..i + 3)
                    .filter(|hex| hex.iter().all(u8::is_ascii_hexdigit))
                    .ok_or_else(malformed)?;
                let hex = std::str::from_utf8(hex).map_err(|_| malformed())?;
                let byte = u8::from_str_radix(hex, 16).map_err(|_| malformed())?;
                out.push(byte);
                i += 3;
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }
    String::from_utf8(out).map_err(|_| malformed())
}

/// Split a query string (with or without the leading `?`) into decoded
/// key/value pairs.  Pairs without `=` get an empty value.
///
/// # Errors
///
/// Returns [`BoothError::MalformedEncoding`] if any key or value has a
/// broken escape.
pub fn parse_query(query: &str) -> Result<Vec<(String, String)>, BoothError> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            Ok((form_decode(key)?, form_decode(value)?))
        })
        .collect()
}

/// Form body for `/set_camera`.
#[must_use]
pub fn set_camera_body(camera_port: &str) -> String {
    format!("{CAMERA_PORT_FIELD}={}", form_encode(camera_port))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn set_camera_body_escapes_port() {
        assert_eq!(set_camera_body("usb:001,005"), "camera_port=usb%3A001%2C005");
    }

    #[test]
    fn form_encode_passes_unreserved() {
        assert_eq!(form_encode("aZ09*-._"), "aZ09*-._");
        assert_eq!(form_encode("a b"), "a+b");
        assert_eq!(form_encode("a/b?c"), "a%2Fb%3Fc");
        assert_eq!(form_encode("ptp:"), "ptp%3A");
        // Multi-byte UTF-8 escapes every byte.
        assert_eq!(form_encode("é"), "%C3%A9");
    }

    #[test]
    fn form_decode_reverses_encode() {
        for raw in ["usb:001,005", "a b+c", "é/ü", ""] {
            assert_eq!(form_decode(&form_encode(raw)).unwrap(), raw);
        }
        assert_eq!(form_decode("usb%3a001").unwrap(), "usb:001");
    }

    #[test]
    fn form_decode_rejects_broken_escapes() {
        assert!(matches!(
            form_decode("abc%2"),
            Err(BoothError::MalformedEncoding(_))
        ));
        assert!(form_decode("%zz").is_err());
        assert!(form_decode("%FF").is_err());
        assert!(form_decode("%+1").is_err());
        assert!(form_decode("%-1").is_err());
        assert!(parse_query("backend=%+A").is_err());
    }

    #[test]
    fn parse_query_handles_prefix_and_bare_keys() {
        let pairs = parse_query("?backend=http%3A%2F%2Fpi%3A8080&faithful&&x=a+b").unwrap();
        assert_eq!(
            pairs,
            vec![
                ("backend".to_owned(), "http://pi:8080".to_owned()),
                ("faithful".to_owned(), String::new()),
                ("x".to_owned(), "a b".to_owned()),
            ]
        );
        assert!(parse_query("").unwrap().is_empty());
    }

    #[test]
    fn methods_match_backend_routes() {
        assert_eq!(Endpoint::SetCamera.method(), Method::Post);
        assert_eq!(Endpoint::Capture.method(), Method::Post);
        assert_eq!(Endpoint::ReturnLive.method(), Method::Post);
        assert_eq!(Endpoint::Download.method(), Method::Get);
        assert_eq!(Endpoint::Health.path(), "/api/health");
        assert_eq!(Endpoint::Confirm.path(), "/confirm");
        assert_eq!(Endpoint::Confirm.method(), Method::Post);
        assert_eq!(Endpoint::Diag.path(), "/api/diag");
        assert_eq!(Endpoint::Diag.method(), Method::Get);
        assert_eq!(Method::Post.as_str(), "POST");
    }
}
