//! Page-level helpers: configuration from the URL, cache-busting nonces.

use photobooth_sequencer::BoothConfig;

/// Build the panel configuration from defaults plus the page's query
/// string.
///
/// Bad parameters are logged to the browser console and skipped.
#[must_use]
pub fn config_from_location() -> BoothConfig {
    let mut config = BoothConfig::default();
    let Some(search) = web_sys::window().and_then(|w| w.location().search().ok()) else {
        return config;
    };
    for error in config.apply_query(&search) {
        web_sys::console::warn_1(&format!("ignoring query parameter: {error}").into());
    }
    config
}

/// Millisecond timestamp, used to force the browser to reopen a stream.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Date.now() is a positive integral f64
pub fn nonce() -> u64 {
    js_sys::Date::now() as u64
}
