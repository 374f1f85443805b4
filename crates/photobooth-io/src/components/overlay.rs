//! Full-screen countdown overlay.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdX;
use photobooth_sequencer::OverlayContent;

/// Props for the [`CountdownOverlay`] component.
#[derive(Props, Clone, PartialEq)]
pub struct CountdownOverlayProps {
    /// What to display.
    content: OverlayContent,
    /// Called when the user presses the cancel button.
    on_cancel: EventHandler<()>,
}

/// Covers the page with the current countdown number or the capture
/// glyph.
///
/// The count is keyed on its value so the pulse animation restarts on
/// every tick.
#[component]
pub fn CountdownOverlay(props: CountdownOverlayProps) -> Element {
    let label = props.content.label();
    let class = match props.content {
        OverlayContent::Count(_) => "overlay-count",
        OverlayContent::CaptureGlyph => "overlay-count overlay-glyph",
    };

    rsx! {
        div {
            class: "overlay",
            role: "status",
            aria_live: "assertive",

            div { key: "{label}", class: "{class}", "{label}" }

            button {
                class: "overlay-cancel",
                aria_label: "Cancel capture",
                title: "Cancel",
                onclick: move |_| props.on_cancel.call(()),
                Icon { icon: LdX, width: 28, height: 28 }
            }
        }
    }
}
