use dioxus::logger::tracing::{info, warn};
use dioxus::prelude::*;
use photobooth_io::page;
use photobooth_io::{
    BoothClient, CaptureControls, CountdownOverlay, LiveControls, StatusBar, download,
    use_booth_state,
};
use photobooth_sequencer::{Endpoint, Panel};

fn main() {
    dioxus::launch(app);
}

/// Root application component.
///
/// Owns the backend client and the page state, and swaps between the
/// live and capture panels.  While a capture sequence runs, neither
/// panel is rendered and the countdown overlay covers the page.
#[allow(clippy::too_many_lines)]
fn app() -> Element {
    // --- Application state ---
    let client = use_hook(|| {
        let config = page::config_from_location();
        info!(backend = %config.backend, "photobooth panel starting");
        BoothClient::new(config)
    });
    let state = use_booth_state();
    let mut error = state.error;
    let mut captured = state.captured;
    let mut feed_nonce = use_signal(page::nonce);
    // Preview URL handed out by `/confirm`; replaces the nonce URL.
    let mut confirmed_feed = use_signal(|| Option::<String>::None);

    // --- Capture handler ---
    let on_capture = {
        let client = client.clone();
        move |()| {
            if let Err(e) = state.begin_capture(client.clone()) {
                warn!(error = %e, "capture ignored");
            }
        }
    };

    let on_cancel = move |()| state.cancel_capture();

    // --- Download handler ---
    let on_download = {
        let client = client.clone();
        move |()| {
            let url = client.config().endpoint_url(Endpoint::Download);
            let name = captured
                .read()
                .as_ref()
                .and_then(|image| image.file_name().map(str::to_owned));
            if let Err(e) = download::trigger_download(&url, name.as_deref()) {
                error.set(Some(format!("Download failed: {e}")));
            }
        }
    };

    // --- Return-to-live handler ---
    // The backend drops the captured image; reopen the preview stream
    // with a fresh nonce so the browser does not show a stale frame.
    let on_return_live = {
        let client = client.clone();
        move |()| {
            let client = client.clone();
            spawn(async move {
                if let Err(e) = client.return_live().await {
                    warn!(error = %e, "return to live failed");
                    error.set(Some(format!("Could not return to live view: {e}")));
                }
                captured.set(None);
                confirmed_feed.set(None);
                feed_nonce.set(page::nonce());
                state.show_live_controls();
            });
        }
    };

    // --- Keep-photo handler ---
    // Same as return-to-live, but the backend hands out the preview URL.
    let on_confirm = {
        let client = client.clone();
        move |()| {
            let client = client.clone();
            spawn(async move {
                let feed = match client.confirm().await {
                    Ok(feed) => feed,
                    Err(e) => {
                        warn!(error = %e, "confirm failed");
                        error.set(Some(format!("Could not return to live view: {e}")));
                        None
                    }
                };
                if feed.is_none() {
                    feed_nonce.set(page::nonce());
                }
                confirmed_feed.set(feed);
                captured.set(None);
                state.show_live_controls();
            });
        }
    };

    // --- Visible panel ---
    let config = client.config();
    let panel = if state.is_stalled() || state.is_capturing() {
        rsx! {}
    } else {
        match state.panels.read().visible() {
            Panel::LiveControls => rsx! {
                LiveControls {
                    client: client.clone(),
                    preview_url: config.preview_enabled.then(|| match confirmed_feed() {
                        Some(feed) => config.url_for(&feed),
                        None => config.video_feed_url(feed_nonce()),
                    }),
                    on_capture: on_capture,
                }
            },
            Panel::CaptureControls => {
                let image = captured();
                rsx! {
                    CaptureControls {
                        image_url: image.as_ref().and_then(|i| i.url.as_deref()).map(|u| config.url_for(u)),
                        file_name: image.as_ref().and_then(|i| i.file_name()).map(str::to_owned),
                        on_download: on_download,
                        on_confirm: on_confirm,
                        on_return_live: on_return_live,
                    }
                }
            }
        }
    };

    // --- Layout ---
    rsx! {
        style { dangerous_inner_html: include_str!("../assets/booth.css") }

        div { class: "app",
            header { class: "app-header",
                h1 { class: "title", "Photobooth" }
                StatusBar { client: client.clone() }
            }

            // Error banner
            if let Some(ref err) = error() {
                div { class: "error-banner", role: "alert",
                    p { "{err}" }
                    button {
                        class: "btn btn-small",
                        onclick: move |_| error.set(None),
                        "Dismiss"
                    }
                }
            }

            main { class: "app-main", {panel} }

            if let Some(content) = (state.overlay)() {
                CountdownOverlay {
                    content: content,
                    on_cancel: on_cancel,
                }
            }
        }
    }
}
