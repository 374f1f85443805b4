//! The page's single capture slot.
//!
//! A page runs at most one [`CaptureSequence`] at a time.  A sequence
//! that finishes by showing a panel frees the slot.  One that finishes
//! without a panel change (a failure under
//! [`FailurePolicy::Faithful`](crate::FailurePolicy::Faithful)) keeps
//! it: the page is stalled and nothing can start until a reload.

use crate::sequence::{CapturePolicy, CaptureSequence, Effect, Event, Outcome, Transition, Wait};
use crate::timing::SequenceTiming;

/// Errors from starting a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// A capture sequence is already running, or a finished one left
    /// the page stalled.
    #[error("a capture is already in progress")]
    AlreadyRunning,
}

/// Holds the running sequence, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureSession {
    sequence: Option<CaptureSequence>,
    last_outcome: Option<Outcome>,
}

impl CaptureSession {
    /// An empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sequence: None,
            last_outcome: None,
        }
    }

    /// Start a sequence and return its first transition.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::AlreadyRunning`] if the slot is taken.
    pub fn begin(
        &mut self,
        timing: SequenceTiming,
        policy: CapturePolicy,
    ) -> Result<Transition, SessionError> {
        if self.sequence.is_some() {
            return Err(SessionError::AlreadyRunning);
        }
        let (sequence, first) = CaptureSequence::begin(timing, policy);
        self.sequence = Some(sequence);
        Ok(self.track(first))
    }

    /// Feed an event to the running sequence.
    ///
    /// Returns `None` if no sequence is running or the event does not
    /// apply to it.
    pub fn handle(&mut self, event: Event) -> Option<Transition> {
        let transition = self.sequence.as_mut()?.handle(event)?;
        Some(self.track(transition))
    }

    /// Whether the slot is taken.  The control panels stay hidden while
    /// this is true.
    #[must_use]
    pub const fn is_capturing(&self) -> bool {
        self.sequence.is_some()
    }

    /// Whether a finished sequence left the page without a panel.
    #[must_use]
    pub fn is_stalled(&self) -> bool {
        self.sequence
            .as_ref()
            .is_some_and(CaptureSequence::is_finished)
    }

    /// Outcome of the most recent finished sequence.
    #[must_use]
    pub const fn last_outcome(&self) -> Option<&Outcome> {
        self.last_outcome.as_ref()
    }

    /// Free the slot once a sequence finishes by showing a panel.
    fn track(&mut self, transition: Transition) -> Transition {
        if let Wait::Finished(outcome) = &transition.wait {
            self.last_outcome = Some(outcome.clone());
            let restored = transition
                .effects
                .iter()
                .any(|effect| matches!(effect, Effect::ShowPanel { .. }));
            if restored {
                self.sequence = None;
            }
        }
        transition
    }
}
