//! Backend status bar, refreshed from `/api/health`, with on-demand
//! details from `/api/diag`.

use std::time::Duration;

use dioxus::logger::tracing::debug;
use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdInfo;
use photobooth_sequencer::{Diagnostics, Health};

use crate::client::{BoothClient, ClientError};

/// How often the status bar polls the backend.
const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Props for the [`StatusBar`] component.
#[derive(Props, Clone, PartialEq)]
pub struct StatusBarProps {
    /// Backend client.
    client: BoothClient,
}

/// One-line backend status: mode, port, preview support, last error.
///
/// The details button fetches `/api/diag` each time it opens, so the
/// camera list reflects what autodetect sees at that moment.
#[component]
pub fn StatusBar(props: StatusBarProps) -> Element {
    let mut health = use_signal(|| Option::<Result<Health, ClientError>>::None);
    let mut details = use_signal(|| Option::<Result<Diagnostics, ClientError>>::None);
    let mut details_open = use_signal(|| false);

    // --- Details toggle ---
    let toggle_details = {
        let client = props.client.clone();
        move |_| {
            let open = !details_open();
            details_open.set(open);
            if !open {
                return;
            }
            details.set(None);
            let client = client.clone();
            spawn(async move {
                let result = client.diagnostics().await;
                if let Err(ref e) = result {
                    debug!(error = %e, "diagnostics fetch failed");
                }
                details.set(Some(result));
            });
        }
    };

    // --- Health polling ---
    // Runs for the lifetime of the component; the task is dropped with it.
    let client = props.client;
    use_effect(move || {
        let client = client.clone();
        spawn(async move {
            loop {
                let result = client.health().await;
                if let Err(ref e) = result {
                    debug!(error = %e, "health poll failed");
                }
                health.set(Some(result));
                gloo_timers::future::sleep(POLL_INTERVAL).await;
            }
        });
    });

    let content = match health() {
        None => rsx! {
            span { class: "status-dot status-unknown" }
            "Connecting to camera server..."
        },
        Some(Err(e)) => rsx! {
            span { class: "status-dot status-down" }
            "Camera server unreachable: {e}"
        },
        Some(Ok(h)) => {
            let summary = h.summary();
            rsx! {
                span { class: if h.ok { "status-dot status-up" } else { "status-dot status-down" } }
                "{summary}"
                if let Some(ref err) = h.last_error {
                    span { class: "text-error status-error", "{err}" }
                }
            }
        }
    };

    let details_body = match details() {
        None => rsx! { p { class: "text-muted", "Loading diagnostics..." } },
        Some(Err(e)) => rsx! { p { class: "text-error", "Diagnostics unavailable: {e}" } },
        Some(Ok(diag)) => render_diagnostics(&diag),
    };

    rsx! {
        div { class: "status-bar", role: "status",
            {content}
            button {
                class: "btn btn-icon btn-small",
                title: "Camera details",
                aria_label: "Camera details",
                aria_expanded: "{details_open}",
                onclick: toggle_details,
                Icon { icon: LdInfo, width: 14, height: 14 }
            }
        }
        if details_open() {
            div { class: "status-details", {details_body} }
        }
    }
}

/// Detected cameras and the preview state.
fn render_diagnostics(diag: &Diagnostics) -> Element {
    let selected = diag.selected_port.as_deref().unwrap_or("auto");
    let warning = (diag.selected_detected() == Some(false))
        .then(|| format!("Selected port {selected} is not among the detected cameras"));
    let preview = if diag.running { "running" } else { "stopped" };
    let fps = diag.preview_fps;
    let viewers = diag.viewers;
    rsx! {
        p { class: "text-muted",
            "Port {selected} · preview {preview} at {fps} fps · {viewers} viewer(s)"
        }
        if let Some(ref warning) = warning {
            p { class: "text-error", "{warning}" }
        }
        if diag.detected.is_empty() {
            p { class: "text-muted", "No camera detected" }
        } else {
            ul { class: "status-cameras",
                for camera in diag.detected.iter() {
                    li { key: "{camera.port}", "{camera.model} ({camera.port})" }
                }
            }
        }
    }
}
