//! Dioxus UI components for the photobooth panel.
//!
//! Provides the countdown overlay, the live and capture control panels,
//! the camera picker, and the backend status bar.

mod camera_picker;
mod capture_controls;
mod live_controls;
mod overlay;
mod status;

pub use camera_picker::CameraPicker;
pub use capture_controls::CaptureControls;
pub use live_controls::LiveControls;
pub use overlay::CountdownOverlay;
pub use status::StatusBar;
