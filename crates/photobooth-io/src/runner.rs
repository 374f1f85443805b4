//! Drives a [`photobooth_sequencer::CaptureSequence`] with browser
//! timers and the backend client, writing its effects into Dioxus
//! signals.
//!
//! [`BoothState`] bundles the signals the page renders from (overlay,
//! visible panel, error banner, last capture) together with the running
//! sequence.  Components receive it as a prop instead of looking up
//! elements by id.
//!
//! At most one sequence runs at a time; the [`CaptureSession`] in the
//! state refuses to start another while one is in progress.

use std::time::Duration;

use dioxus::logger::tracing::{debug, info, warn};
use dioxus::core::Task;
use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use photobooth_sequencer::{
    CaptureSession, CapturedImage, Effect, Event, OverlayContent, Panels, SessionError,
    Transition, Wait,
};

use crate::client::{BoothClient, ClientError, millis};

/// Page state driven by the capture sequence and the view switcher.
#[derive(Clone, Copy, PartialEq)]
pub struct BoothState {
    /// Overlay content; `None` when no overlay is on the page.
    pub overlay: Signal<Option<OverlayContent>>,
    /// Which control panel is shown.
    pub panels: Signal<Panels>,
    /// Message for the error banner.
    pub error: Signal<Option<String>>,
    /// Most recent successful capture.
    pub captured: Signal<Option<CapturedImage>>,
    session: Signal<CaptureSession>,
    task: Signal<Option<Task>>,
}

/// Create the page state.  Call once from the root component.
pub fn use_booth_state() -> BoothState {
    BoothState {
        overlay: use_signal(|| None),
        panels: use_signal(Panels::default),
        error: use_signal(|| None),
        captured: use_signal(|| None),
        session: use_signal(CaptureSession::new),
        task: use_signal(|| None),
    }
}

impl BoothState {
    /// Whether a sequence owns the page.  The control panels are hidden
    /// while this is true.
    #[must_use]
    pub fn is_capturing(&self) -> bool {
        self.session.read().is_capturing()
    }

    /// Whether a finished sequence left the page without any panel
    /// (failure under [`photobooth_sequencer::FailurePolicy::Faithful`]).
    /// Only a reload recovers from this.
    #[must_use]
    pub fn is_stalled(&self) -> bool {
        self.session.read().is_stalled()
    }

    /// Show the live controls.
    pub fn show_live_controls(mut self) {
        self.panels.write().show_live_controls();
    }

    /// Show the capture controls.
    pub fn show_capture_controls(mut self) {
        self.panels.write().show_capture_controls();
    }

    /// Start the countdown and capture.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::AlreadyRunning`] if a sequence is in
    /// progress or the page is stalled.
    pub fn begin_capture(mut self, client: BoothClient) -> Result<(), SessionError> {
        let config = client.config();
        let first = self
            .session
            .write()
            .begin(config.timing, config.capture)?;
        info!(
            count = config.timing.initial_count,
            timeout_ms = ?config.capture.timeout.map(millis),
            "capture sequence started"
        );
        self.error.set(None);
        let task = spawn(drive(self, client, first));
        self.task.set(Some(task));
        Ok(())
    }

    /// Abort the running sequence, if any.
    pub fn cancel_capture(mut self) {
        let Some(transition) = self.session.write().handle(Event::Cancel) else {
            return;
        };
        if let Some(task) = self.task.write().take() {
            task.cancel();
        }
        let _ = self.apply(&transition.effects);
        if matches!(transition.wait, Wait::Finished(_)) {
            self.finish();
        }
    }

    /// Apply effects to the page.
    ///
    /// Returns the capture timeout if the effects include a capture
    /// request; the request itself is made by the caller when it
    /// reaches [`Wait::CaptureResponse`].
    fn apply(&mut self, effects: &[Effect]) -> Option<Option<Duration>> {
        let mut capture = None;
        for effect in effects {
            debug!(?effect, "sequence effect");
            match effect {
                Effect::ShowOverlay { content } => self.overlay.set(Some(*content)),
                Effect::RemoveOverlay => self.overlay.set(None),
                Effect::SendCapture { timeout } => capture = Some(*timeout),
                Effect::ShowPanel { panel } => self.panels.write().show(*panel),
                Effect::ReportError { message } => self.error.set(Some(message.clone())),
            }
        }
        capture
    }

    /// Perform the capture request and translate the result into an
    /// event for the sequence.
    #[allow(clippy::future_not_send)] // WASM is single-threaded; fetch futures are !Send
    async fn capture(mut self, client: &BoothClient, timeout: Option<Duration>) -> Event {
        match client.capture(timeout).await {
            Ok(image) => {
                info!(url = ?image.url, "capture succeeded");
                self.captured.set(Some(image));
                Event::CaptureSucceeded
            }
            Err(ClientError::Aborted) => {
                warn!("capture request timed out");
                Event::CaptureTimedOut
            }
            Err(e) => {
                warn!(error = %e, "capture request failed");
                Event::CaptureFailed(e.to_string())
            }
        }
    }

    /// Log how the sequence ended.  The session has already freed the
    /// slot, or kept it if the page is stalled.
    fn finish(&mut self) {
        self.task.set(None);
        let session = self.session.peek();
        let outcome = session.last_outcome();
        if session.is_stalled() {
            warn!(?outcome, "capture sequence ended without restoring a panel; reload required");
        } else {
            info!(?outcome, "capture sequence finished");
        }
    }
}

/// Run the sequence to completion.
#[allow(clippy::future_not_send)] // WASM is single-threaded; signals and fetch are !Send
async fn drive(mut state: BoothState, client: BoothClient, first: Transition) {
    let mut transition = first;
    loop {
        let capture = state.apply(&transition.effects);

        let event = match transition.wait {
            Wait::Timer(delay) => {
                TimeoutFuture::new(millis(delay)).await;
                Event::TimerElapsed
            }
            Wait::CaptureResponse => match capture {
                Some(timeout) => state.capture(&client, timeout).await,
                None => Event::CaptureFailed("capture request was not issued".into()),
            },
            Wait::Finished(_) => {
                state.finish();
                return;
            }
        };

        let next = state.session.write().handle(event);
        match next {
            Some(next) => transition = next,
            None => {
                debug!("sequence ignored event; stopping driver");
                return;
            }
        }
    }
}
