//! Camera selection dropdown backed by `/cameras` and `/set_camera`.

use dioxus::logger::tracing::{info, warn};
use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdRefreshCw;
use photobooth_sequencer::CameraList;

use crate::client::{BoothClient, ClientError};

/// Props for the [`CameraPicker`] component.
#[derive(Props, Clone, PartialEq)]
pub struct CameraPickerProps {
    /// Backend client.
    client: BoothClient,
}

/// Lists detected cameras and switches the backend to the chosen one.
///
/// The list is fetched on mount and on refresh.  After a switch the
/// dropdown shows the port the backend reports as selected; the backend
/// restarts its preview on the new port by itself.  A failed switch
/// refetches the list.
#[component]
pub fn CameraPicker(props: CameraPickerProps) -> Element {
    let mut switch_error = use_signal(|| Option::<String>::None);
    let mut switching = use_signal(|| false);

    let mut cameras = use_signal(|| Option::<Result<CameraList, ClientError>>::None);
    let mut refresh = use_signal(|| 0u64);

    // --- Camera list fetch ---
    // Re-runs on mount and whenever `refresh` is bumped.  A fetch that
    // finishes after a newer one started is dropped.
    {
        let client = props.client.clone();
        use_effect(move || {
            let my_refresh = refresh();
            let client = client.clone();
            cameras.set(None);
            spawn(async move {
                let result = client.cameras().await;
                if *refresh.peek() != my_refresh {
                    return;
                }
                if let Err(ref e) = result {
                    warn!(error = %e, "camera list fetch failed");
                }
                cameras.set(Some(result));
            });
        });
    }

    let on_change = {
        let client = props.client.clone();
        move |evt: FormEvent| {
            let port = evt.value();
            if port.is_empty() {
                return;
            }
            let client = client.clone();
            switching.set(true);
            spawn(async move {
                match client.switch_camera(&port).await {
                    Ok(selected) => {
                        info!(%port, ?selected, "camera switched");
                        switch_error.set(None);
                        // Show what the backend actually selected.
                        if let Some(Ok(list)) = cameras.write().as_mut() {
                            list.selected_port = selected.or(Some(port));
                        }
                    }
                    Err(e) => {
                        warn!(%port, error = %e, "camera switch failed");
                        switch_error.set(Some(format!("Could not switch to {port}: {e}")));
                        // Resync the dropdown with the backend.
                        refresh += 1;
                    }
                }
                switching.set(false);
            });
        }
    };

    let body = match &*cameras.read() {
        None => rsx! { p { class: "text-muted", "Looking for cameras..." } },
        Some(Err(e)) => rsx! { p { class: "text-error", "Camera list unavailable: {e}" } },
        Some(Ok(list)) if list.cameras.is_empty() => {
            rsx! { p { class: "text-muted", "No camera detected" } }
        }
        Some(Ok(list)) => render_select(list, switching(), on_change),
    };

    rsx! {
        div { class: "camera-picker",
            label { r#for: "camera-port", class: "label", "Camera" }
            div { class: "camera-picker-row",
                {body}
                button {
                    class: "btn btn-icon",
                    title: "Refresh camera list",
                    aria_label: "Refresh camera list",
                    onclick: move |_| refresh += 1,
                    Icon { icon: LdRefreshCw, width: 16, height: 16 }
                }
            }
            if let Some(ref err) = switch_error() {
                p { class: "text-error", "{err}" }
            }
        }
    }
}

/// Render the `<select>` for a non-empty camera list.
fn render_select(
    list: &CameraList,
    disabled: bool,
    on_change: impl FnMut(FormEvent) + 'static,
) -> Element {
    let selected = list.selected_port.clone().unwrap_or_default();
    rsx! {
        select {
            id: "camera-port",
            class: "select",
            disabled,
            onchange: on_change,
            if list.selected_port.is_none() {
                option { value: "", selected: true, "Auto-detect" }
            }
            for camera in list.cameras.iter() {
                option {
                    key: "{camera.port}",
                    value: "{camera.port}",
                    selected: camera.port == selected,
                    "{camera.model} ({camera.port})"
                }
            }
        }
    }
}
