//! photobooth-io: Browser I/O and Dioxus component library.
//!
//! Talks to the gphoto2 backend with `fetch`, drives the capture
//! sequence with browser timers, triggers downloads, and provides the
//! UI components for the photobooth panel.

pub mod client;
pub mod components;
pub mod download;
pub mod page;
pub mod runner;

pub use client::{BoothClient, ClientError};
pub use components::{CameraPicker, CaptureControls, CountdownOverlay, LiveControls, StatusBar};
pub use runner::{BoothState, use_booth_state};
