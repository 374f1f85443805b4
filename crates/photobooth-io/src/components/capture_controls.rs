//! Post-capture panel: captured image, download, back to live.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::{LdArrowLeft, LdCheck, LdDownload};

/// Props for the [`CaptureControls`] component.
#[derive(Props, Clone, PartialEq)]
pub struct CaptureControlsProps {
    /// URL of the captured image, if the backend reported one.
    image_url: Option<String>,
    /// File name shown under the image.
    file_name: Option<String>,
    /// Called when the download button is pressed.
    on_download: EventHandler<()>,
    /// Called when the user keeps the photo and continues.
    on_confirm: EventHandler<()>,
    /// Called when the return-to-live button is pressed.
    on_return_live: EventHandler<()>,
}

/// Controls shown after a capture.
///
/// Keeping the photo and going back both return to live view; keeping
/// it also gets a fresh preview URL from the backend.
#[component]
pub fn CaptureControls(props: CaptureControlsProps) -> Element {
    rsx! {
        section { class: "panel", aria_label: "Capture controls",
            if let Some(ref url) = props.image_url {
                figure { class: "preview",
                    img { src: "{url}", alt: "Captured photo" }
                    if let Some(ref name) = props.file_name {
                        figcaption { class: "text-muted", "{name}" }
                    }
                }
            } else {
                p { class: "text-muted", "Photo captured." }
            }

            div { class: "button-row",
                button {
                    class: "btn btn-primary",
                    onclick: move |_| props.on_download.call(()),
                    Icon { icon: LdDownload, width: 18, height: 18 }
                    "Download"
                }
                button {
                    class: "btn",
                    onclick: move |_| props.on_confirm.call(()),
                    Icon { icon: LdCheck, width: 18, height: 18 }
                    "Keep photo"
                }
                button {
                    class: "btn",
                    onclick: move |_| props.on_return_live.call(()),
                    Icon { icon: LdArrowLeft, width: 18, height: 18 }
                    "Back to live view"
                }
            }
        }
    }
}
