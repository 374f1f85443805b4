//! photobooth-sequencer: capture countdown state machine (sans-IO).
//!
//! Models the photobooth's only piece of temporal logic, the
//! 3-2-1 countdown that ends in a capture request, as an explicit
//! state machine that emits [`Effect`]s and tells its driver what to
//! [`Wait`] for next.  Also holds the view-switcher model, the backend
//! endpoint table and its JSON replies, and the panel configuration.
//!
//! This crate has **no I/O dependencies** -- timers, `fetch`, and the
//! DOM all live in `photobooth-io`.  The [`timeline`] module drives a
//! sequence against a virtual clock so every ordering contract can be
//! checked natively.

pub mod config;
pub mod countdown;
pub mod endpoint;
pub mod panels;
pub mod reply;
pub mod sequence;
pub mod session;
pub mod timeline;
pub mod timing;
pub mod types;

pub use config::BoothConfig;
pub use countdown::{CountdownState, OverlayContent, Phase};
pub use endpoint::{Endpoint, Method};
pub use panels::{Panel, Panels};
pub use reply::{
    CameraInfo, CameraList, CapturedImage, ConfirmReply, Diagnostics, Health, SetCameraReply,
};
pub use sequence::{
    CapturePolicy, CaptureSequence, Effect, Event, FailurePolicy, Outcome, Transition, Wait,
};
pub use session::{CaptureSession, SessionError};
pub use timing::SequenceTiming;
pub use types::BoothError;
