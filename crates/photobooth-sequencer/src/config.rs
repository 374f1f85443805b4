//! Panel configuration.
//!
//! Everything has a working default: an empty `backend` means the
//! backend serves the panel itself (same origin).  The app overrides
//! fields from the page's query string via [`BoothConfig::apply_query`],
//! so a kiosk can be pointed at `?backend=http://booth.local:8080`
//! without a rebuild.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::endpoint::{self, Endpoint};
use crate::sequence::{CapturePolicy, FailurePolicy};
use crate::timing::SequenceTiming;
use crate::types::BoothError;

/// Configuration for the control panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoothConfig {
    /// Base URL of the backend, without a trailing path.  Empty for
    /// same-origin.
    pub backend: String,

    /// Countdown timing.
    pub timing: SequenceTiming,

    /// Capture request timeout and failure handling.
    pub capture: CapturePolicy,

    /// Whether to show the MJPEG live preview.
    pub preview_enabled: bool,
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            backend: String::new(),
            timing: SequenceTiming::default(),
            capture: CapturePolicy::default(),
            preview_enabled: true,
        }
    }
}

impl BoothConfig {
    /// Absolute (or same-origin relative) URL of `endpoint`.
    #[must_use]
    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        self.url_for(endpoint.path())
    }

    /// URL for an arbitrary backend path, such as the relative image
    /// URL returned by `/capture`.  Absolute URLs pass through.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_owned();
        }
        let base = self.backend.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// Live preview URL.  `nonce` is appended so the browser opens a
    /// fresh stream instead of reusing a stalled one.
    #[must_use]
    pub fn video_feed_url(&self, nonce: u64) -> String {
        format!("{}?ts={nonce}", self.endpoint_url(Endpoint::VideoFeed))
    }

    /// Override fields from a query string such as
    /// `?backend=http%3A%2F%2Fpi%3A8080&timeout_ms=20000&faithful=1`.
    ///
    /// Recognized keys: `backend`, `tick_ms`, `pre_capture_ms`,
    /// `post_capture_ms`, `count`, `timeout_ms` (`0` disables the
    /// timeout), `faithful`, `preview`.  Unknown keys are ignored.
    /// Each bad value is skipped and reported; the rest still apply.
    pub fn apply_query(&mut self, query: &str) -> Vec<BoothError> {
        let pairs = match endpoint::parse_query(query) {
            Ok(pairs) => pairs,
            Err(e) => return vec![e],
        };
        let mut errors = Vec::new();
        for (key, value) in pairs {
            if let Err(e) = self.apply_pair(&key, &value) {
                errors.push(e);
            }
        }
        if let Err(e) = self.timing.validate() {
            self.timing = SequenceTiming::default();
            errors.push(e);
        }
        errors
    }

    fn apply_pair(&mut self, key: &str, value: &str) -> Result<(), BoothError> {
        let invalid = || BoothError::InvalidParameter {
            key: key.to_owned(),
            value: value.to_owned(),
        };
        let millis = || value.parse::<u64>().map(Duration::from_millis).map_err(|_| invalid());
        match key {
            "backend" => value.clone_into(&mut self.backend),
            "tick_ms" => self.timing.tick = millis()?,
            "pre_capture_ms" => self.timing.pre_capture_delay = millis()?,
            "post_capture_ms" => self.timing.post_capture_delay = millis()?,
            "count" => self.timing.initial_count = value.parse().map_err(|_| invalid())?,
            "timeout_ms" => {
                let timeout = millis()?;
                self.capture.timeout = (!timeout.is_zero()).then_some(timeout);
            }
            "faithful" => {
                self.capture.failure = if parse_flag(value).ok_or_else(invalid)? {
                    FailurePolicy::Faithful
                } else {
                    FailurePolicy::Recover
                };
            }
            "preview" => self.preview_enabled = parse_flag(value).ok_or_else(invalid)?,
            _ => {}
        }
        Ok(())
    }
}

/// Parse a boolean query flag.  A bare key (`?faithful`) counts as true.
fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "" | "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn same_origin_urls_are_relative() {
        let config = BoothConfig::default();
        assert_eq!(config.endpoint_url(Endpoint::Capture), "/capture");
        assert_eq!(config.endpoint_url(Endpoint::Health), "/api/health");
    }

    #[test]
    fn backend_base_is_joined_without_double_slash() {
        let config = BoothConfig {
            backend: "http://pi:8080/".into(),
            ..BoothConfig::default()
        };
        assert_eq!(
            config.endpoint_url(Endpoint::SetCamera),
            "http://pi:8080/set_camera"
        );
        assert_eq!(
            config.url_for("/captured_images/a.jpg"),
            "http://pi:8080/captured_images/a.jpg"
        );
        assert_eq!(config.url_for("https://cdn/x.jpg"), "https://cdn/x.jpg");
        assert_eq!(config.video_feed_url(7), "http://pi:8080/video_feed?ts=7");
    }

    #[test]
    fn query_overrides_fields() {
        let mut config = BoothConfig::default();
        let errors = config.apply_query(
            "?backend=http%3A%2F%2Fbooth.local%3A8080&timeout_ms=20000&faithful=1&preview=0&count=5&tick_ms=800",
        );
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(config.backend, "http://booth.local:8080");
        assert_eq!(config.capture.timeout, Some(Duration::from_secs(20)));
        assert_eq!(config.capture.failure, FailurePolicy::Faithful);
        assert!(!config.preview_enabled);
        assert_eq!(config.timing.initial_count, 5);
        assert_eq!(config.timing.tick, Duration::from_millis(800));
    }

    #[test]
    fn zero_timeout_disables_it() {
        let mut config = BoothConfig::default();
        assert!(config.apply_query("timeout_ms=0").is_empty());
        assert_eq!(config.capture.timeout, None);
    }

    #[test]
    fn bad_values_are_reported_and_skipped() {
        let mut config = BoothConfig::default();
        let errors = config.apply_query("tick_ms=fast&faithful=maybe&backend=http%3A%2F%2Fx");
        assert_eq!(errors.len(), 2);
        assert!(matches!(
            &errors[0],
            BoothError::InvalidParameter { key, .. } if key == "tick_ms"
        ));
        assert_eq!(config.timing.tick, SequenceTiming::DEFAULT_TICK);
        assert_eq!(config.backend, "http://x");
    }

    #[test]
    fn invalid_timing_falls_back_to_defaults() {
        let mut config = BoothConfig::default();
        let errors = config.apply_query("tick_ms=0");
        assert_eq!(errors.len(), 1);
        assert_eq!(config.timing, SequenceTiming::default());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut config = BoothConfig::default();
        assert!(config.apply_query("utm_source=poster").is_empty());
        assert_eq!(config, BoothConfig::default());
    }

    #[test]
    fn config_json_round_trips_defaults() {
        let json = serde_json::to_string(&BoothConfig::default()).unwrap();
        let parsed: BoothConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, BoothConfig::default());
        let partial: BoothConfig = serde_json::from_str(r#"{"backend": "http://pi"}"#).unwrap();
        assert_eq!(partial.capture, CapturePolicy::default());
    }
}
