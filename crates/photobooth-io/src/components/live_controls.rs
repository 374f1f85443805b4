//! Live-view panel: preview stream, capture button, camera picker.

use dioxus::logger::tracing::warn;
use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::{LdCamera, LdPause, LdPlay};

use super::CameraPicker;
use crate::client::BoothClient;

/// Props for the [`LiveControls`] component.
#[derive(Props, Clone, PartialEq)]
pub struct LiveControlsProps {
    /// Backend client.
    client: BoothClient,
    /// MJPEG stream URL, or `None` when preview is disabled.
    preview_url: Option<String>,
    /// Called when the capture button is pressed.
    on_capture: EventHandler<()>,
}

/// Controls shown before a capture.
///
/// The preview is a plain `<img>` pointed at the backend's MJPEG
/// stream.  Pausing it removes the image (closing the stream) and asks
/// the backend to stop grabbing preview frames.
#[component]
pub fn LiveControls(props: LiveControlsProps) -> Element {
    let mut streaming = use_signal(|| true);
    let mut stream_error = use_signal(|| Option::<String>::None);

    let toggle_stream = {
        let client = props.client.clone();
        move |_| {
            let client = client.clone();
            let resume = !streaming();
            streaming.set(resume);
            if !resume {
                spawn(async move {
                    if let Err(e) = client.stop_stream().await {
                        warn!(error = %e, "stop stream failed");
                        stream_error.set(Some(format!("Could not stop preview: {e}")));
                    }
                });
            }
        }
    };

    rsx! {
        section { class: "panel", aria_label: "Live controls",
            if let Some(ref url) = props.preview_url {
                div { class: "preview",
                    if streaming() {
                        img {
                            src: "{url}",
                            alt: "Live camera preview",
                            onerror: move |_| {
                                stream_error.set(Some("Live preview unavailable".into()));
                            },
                            onload: move |_| stream_error.set(None),
                        }
                    } else {
                        p { class: "preview-paused", "Preview paused" }
                    }
                }
            }

            if let Some(ref err) = stream_error() {
                p { class: "text-error", "{err}" }
            }

            div { class: "button-row",
                button {
                    class: "btn btn-primary btn-large",
                    onclick: move |_| props.on_capture.call(()),
                    Icon { icon: LdCamera, width: 24, height: 24 }
                    "Take photo"
                }
                if props.preview_url.is_some() {
                    button {
                        class: "btn",
                        onclick: toggle_stream,
                        if streaming() {
                            Icon { icon: LdPause, width: 18, height: 18 }
                            "Pause preview"
                        } else {
                            Icon { icon: LdPlay, width: 18, height: 18 }
                            "Resume preview"
                        }
                    }
                }
            }

            CameraPicker { client: props.client.clone() }
        }
    }
}
