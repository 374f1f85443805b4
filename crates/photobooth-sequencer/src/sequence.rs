//! The capture sequence: countdown, capture glyph, capture request,
//! hand-back to the controls.
//!
//! [`CaptureSequence`] is a sans-IO state machine.  It never sleeps and
//! never talks to the network; instead every step returns a
//! [`Transition`] listing the [`Effect`]s to apply right away and the
//! single [`Wait`] the driver must complete before feeding the next
//! [`Event`] back in:
//!
//! ```rust
//! use photobooth_sequencer::{CapturePolicy, CaptureSequence, Event, SequenceTiming, Wait};
//!
//! let (mut sequence, mut transition) =
//!     CaptureSequence::begin(SequenceTiming::default(), CapturePolicy::default());
//! loop {
//!     // ...apply transition.effects to the page...
//!     let event = match transition.wait {
//!         Wait::Timer(_) => Event::TimerElapsed, // after sleeping
//!         Wait::CaptureResponse => Event::CaptureSucceeded, // after fetch
//!         Wait::Finished(_) => break,
//!     };
//!     transition = sequence.handle(event).expect("event matches wait");
//! }
//! ```
//!
//! # States
//!
//! ```text
//! Counting --tick--> Counting ... --tick--> Captured --delay--> AwaitingReply
//!   --reply--> Restoring --delay--> Finished
//! ```
//!
//! Events that do not apply to the current state return `None` from
//! [`CaptureSequence::handle`] and change nothing, so a stray timer or
//! a reply that arrives after cancellation cannot disturb the page.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::countdown::{CountdownState, OverlayContent, Phase};
use crate::panels::Panel;
use crate::timing::SequenceTiming;

/// What happens when the capture request fails or times out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Report the error, then return to the live controls after the
    /// post-capture delay so the user can try again.
    #[default]
    Recover,
    /// Leave the page as it is (overlay gone, no panel change).  This
    /// is the historical dead end that required a page reload.
    Faithful,
}

/// Capture request handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapturePolicy {
    /// Reaction to a failed or timed-out capture.
    pub failure: FailurePolicy,

    /// Upper bound on the capture request.  `None` waits forever.
    #[serde(with = "crate::timing::duration_ms::option", rename = "timeout_ms")]
    pub timeout: Option<Duration>,
}

impl CapturePolicy {
    /// Default bound on the capture request.  gphoto2 captures on the
    /// backend include an autofocus pass and the file transfer, which
    /// takes a few seconds on slow bodies.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
}

impl Default for CapturePolicy {
    fn default() -> Self {
        Self {
            failure: FailurePolicy::default(),
            timeout: Some(Self::DEFAULT_TIMEOUT),
        }
    }
}

/// Input fed back into the machine by its driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The timer requested by [`Wait::Timer`] fired.
    TimerElapsed,
    /// The capture request returned a success reply.
    CaptureSucceeded,
    /// The capture request failed (network error, error status, or an
    /// `ok: false` reply).
    CaptureFailed(String),
    /// The capture request hit [`CapturePolicy::timeout`].
    CaptureTimedOut,
    /// The user aborted the sequence.
    Cancel,
}

/// Something the driver must do to the page or the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    /// Show the overlay (creating it if absent) with this content.
    ShowOverlay {
        /// What the overlay displays.
        content: OverlayContent,
    },
    /// Remove the overlay from the page.
    RemoveOverlay,
    /// Issue the capture request.  Always followed by
    /// [`Wait::CaptureResponse`].
    SendCapture {
        /// Bound on the request, from [`CapturePolicy::timeout`].
        #[serde(with = "crate::timing::duration_ms::option", rename = "timeout_ms")]
        timeout: Option<Duration>,
    },
    /// Make this panel the visible one.
    ShowPanel {
        /// Panel to show.
        panel: Panel,
    },
    /// Surface an error message to the user.
    ReportError {
        /// Human-readable message.
        message: String,
    },
}

/// What the driver waits for before the next event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wait {
    /// Sleep for this long, then send [`Event::TimerElapsed`].
    Timer(Duration),
    /// Await the capture request started by [`Effect::SendCapture`],
    /// then send its result.
    CaptureResponse,
    /// Nothing left to do.
    Finished(Outcome),
}

/// How a sequence ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    /// The capture succeeded and the capture controls are shown.
    Completed,
    /// The capture request failed.
    Failed(String),
    /// The capture request did not finish in time.
    TimedOut,
    /// The user cancelled before the capture request was answered.
    Cancelled,
}

impl Outcome {
    /// Panel shown when a sequence ends this way.
    #[must_use]
    pub const fn restores(&self) -> Panel {
        match self {
            Self::Completed => Panel::CaptureControls,
            Self::Failed(_) | Self::TimedOut | Self::Cancelled => Panel::LiveControls,
        }
    }
}

/// Output of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a transition's effects must be applied and its wait honoured"]
pub struct Transition {
    /// Effects to apply immediately, in order.
    pub effects: Vec<Effect>,
    /// What to wait for next.
    pub wait: Wait,
}

impl Transition {
    const fn new(effects: Vec<Effect>, wait: Wait) -> Self {
        Self { effects, wait }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Countdown,
    AwaitingReply,
    Restoring(Outcome),
    Finished(Outcome),
}

/// One run of the capture countdown.
///
/// Owns the [`CountdownState`] for as long as the overlay exists; the
/// countdown is dropped the moment the overlay is removed, so the
/// overlay is removed at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSequence {
    timing: SequenceTiming,
    policy: CapturePolicy,
    countdown: Option<CountdownState>,
    step: Step,
}

impl CaptureSequence {
    /// Start a sequence: create the overlay showing the first count.
    pub fn begin(timing: SequenceTiming, policy: CapturePolicy) -> (Self, Transition) {
        let countdown = CountdownState::new(timing.initial_count);
        let wait = match countdown.phase() {
            Phase::Counting => Wait::Timer(timing.tick),
            Phase::Captured | Phase::Done => Wait::Timer(timing.pre_capture_delay),
        };
        let effects = countdown
            .content()
            .map(|content| Effect::ShowOverlay { content })
            .into_iter()
            .collect();
        let sequence = Self {
            timing,
            policy,
            countdown: Some(countdown),
            step: Step::Countdown,
        };
        (sequence, Transition::new(effects, wait))
    }

    /// The live countdown, if the overlay is still up.
    #[must_use]
    pub const fn countdown(&self) -> Option<&CountdownState> {
        self.countdown.as_ref()
    }

    /// The outcome, once the sequence has finished.
    #[must_use]
    pub const fn outcome(&self) -> Option<&Outcome> {
        match &self.step {
            Step::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Whether the sequence has finished.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self.step, Step::Finished(_))
    }

    /// Feed an event into the machine.
    ///
    /// Returns `None` if the event does not apply to the current state
    /// (e.g. a capture reply after cancellation).
    pub fn handle(&mut self, event: Event) -> Option<Transition> {
        match (self.step.clone(), event) {
            (Step::Countdown, Event::TimerElapsed) => Some(self.on_countdown_timer()),
            (Step::AwaitingReply, Event::CaptureSucceeded) => {
                Some(self.restore_after_delay(Vec::new(), Outcome::Completed))
            }
            (Step::AwaitingReply, Event::CaptureFailed(reason)) => {
                Some(self.on_capture_error(Outcome::Failed(reason)))
            }
            (Step::AwaitingReply, Event::CaptureTimedOut) => {
                Some(self.on_capture_error(Outcome::TimedOut))
            }
            (Step::Restoring(outcome), Event::TimerElapsed) => {
                let panel = outcome.restores();
                Some(self.finish(vec![Effect::ShowPanel { panel }], outcome))
            }
            (Step::Countdown | Step::AwaitingReply, Event::Cancel) => {
                let mut effects = self.take_overlay();
                effects.push(Effect::ShowPanel {
                    panel: Outcome::Cancelled.restores(),
                });
                Some(self.finish(effects, Outcome::Cancelled))
            }
            // The capture already happened; cancelling only skips the
            // remaining delay.
            (Step::Restoring(outcome), Event::Cancel) => {
                let panel = outcome.restores();
                Some(self.finish(vec![Effect::ShowPanel { panel }], outcome))
            }
            _ => None,
        }
    }

    fn on_countdown_timer(&mut self) -> Transition {
        let Some(countdown) = self.countdown.as_mut() else {
            // Countdown step always owns a countdown; treat a missing
            // one as already past the glyph.
            return self.send_capture(Vec::new());
        };
        match countdown.phase() {
            Phase::Counting => {
                countdown.tick();
                let wait = match countdown.phase() {
                    Phase::Counting => Wait::Timer(self.timing.tick),
                    Phase::Captured | Phase::Done => Wait::Timer(self.timing.pre_capture_delay),
                };
                let effects = countdown
                    .content()
                    .map(|content| Effect::ShowOverlay { content })
                    .into_iter()
                    .collect();
                Transition::new(effects, wait)
            }
            Phase::Captured | Phase::Done => {
                let effects = self.take_overlay();
                self.send_capture(effects)
            }
        }
    }

    fn send_capture(&mut self, mut effects: Vec<Effect>) -> Transition {
        effects.push(Effect::SendCapture {
            timeout: self.policy.timeout,
        });
        self.step = Step::AwaitingReply;
        Transition::new(effects, Wait::CaptureResponse)
    }

    fn on_capture_error(&mut self, outcome: Outcome) -> Transition {
        match self.policy.failure {
            FailurePolicy::Faithful => self.finish(Vec::new(), outcome),
            FailurePolicy::Recover => {
                let message = match &outcome {
                    Outcome::Failed(reason) => format!("Capture failed: {reason}"),
                    _ => "Capture timed out; the camera did not answer".to_owned(),
                };
                self.restore_after_delay(vec![Effect::ReportError { message }], outcome)
            }
        }
    }

    fn restore_after_delay(&mut self, effects: Vec<Effect>, outcome: Outcome) -> Transition {
        self.step = Step::Restoring(outcome);
        Transition::new(effects, Wait::Timer(self.timing.post_capture_delay))
    }

    fn finish(&mut self, effects: Vec<Effect>, outcome: Outcome) -> Transition {
        self.step = Step::Finished(outcome.clone());
        Transition::new(effects, Wait::Finished(outcome))
    }

    /// Drop the countdown and emit the overlay removal, if the overlay
    /// is still up.
    fn take_overlay(&mut self) -> Vec<Effect> {
        match self.countdown.take() {
            Some(mut countdown) => {
                countdown.finish();
                vec![Effect::RemoveOverlay]
            }
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn show(n: u32) -> Effect {
        Effect::ShowOverlay {
            content: OverlayContent::Count(n),
        }
    }

    fn glyph() -> Effect {
        Effect::ShowOverlay {
            content: OverlayContent::CaptureGlyph,
        }
    }

    fn send(policy: CapturePolicy) -> Effect {
        Effect::SendCapture {
            timeout: policy.timeout,
        }
    }

    /// Run a default sequence up to the point where it waits on the
    /// capture reply.
    fn until_reply(policy: CapturePolicy) -> CaptureSequence {
        let (mut seq, _) = CaptureSequence::begin(SequenceTiming::default(), policy);
        for _ in 0..4 {
            let _ = seq.handle(Event::TimerElapsed).unwrap();
        }
        seq
    }

    #[test]
    fn begin_shows_first_count() {
        let (seq, t) = CaptureSequence::begin(SequenceTiming::default(), CapturePolicy::default());
        assert_eq!(t.effects, vec![show(3)]);
        assert_eq!(t.wait, Wait::Timer(Duration::from_secs(1)));
        assert_eq!(seq.countdown().unwrap().remaining(), 3);
        assert!(!seq.is_finished());
    }

    #[test]
    fn full_success_path() {
        let policy = CapturePolicy::default();
        let (mut seq, _) = CaptureSequence::begin(SequenceTiming::default(), policy);

        let t = seq.handle(Event::TimerElapsed).unwrap();
        assert_eq!(t.effects, vec![show(2)]);
        assert_eq!(t.wait, Wait::Timer(Duration::from_secs(1)));

        let t = seq.handle(Event::TimerElapsed).unwrap();
        assert_eq!(t.effects, vec![show(1)]);

        let t = seq.handle(Event::TimerElapsed).unwrap();
        assert_eq!(t.effects, vec![glyph()]);
        assert_eq!(t.wait, Wait::Timer(Duration::from_millis(500)));
        assert_eq!(seq.countdown().unwrap().phase(), Phase::Captured);

        let t = seq.handle(Event::TimerElapsed).unwrap();
        assert_eq!(t.effects, vec![Effect::RemoveOverlay, send(policy)]);
        assert_eq!(t.wait, Wait::CaptureResponse);
        assert!(seq.countdown().is_none());

        let t = seq.handle(Event::CaptureSucceeded).unwrap();
        assert!(t.effects.is_empty());
        assert_eq!(t.wait, Wait::Timer(Duration::from_millis(500)));

        let t = seq.handle(Event::TimerElapsed).unwrap();
        assert_eq!(
            t.effects,
            vec![Effect::ShowPanel {
                panel: Panel::CaptureControls
            }]
        );
        assert_eq!(t.wait, Wait::Finished(Outcome::Completed));
        assert_eq!(seq.outcome(), Some(&Outcome::Completed));
    }

    #[test]
    fn reply_before_capture_is_ignored() {
        let (mut seq, _) =
            CaptureSequence::begin(SequenceTiming::default(), CapturePolicy::default());
        assert_eq!(seq.handle(Event::CaptureSucceeded), None);
        assert_eq!(seq.handle(Event::CaptureTimedOut), None);
        assert_eq!(seq.countdown().unwrap().remaining(), 3);
    }

    #[test]
    fn timer_while_awaiting_reply_is_ignored() {
        let mut seq = until_reply(CapturePolicy::default());
        assert_eq!(seq.handle(Event::TimerElapsed), None);
    }

    #[test]
    fn failure_recovers_to_live_controls() {
        let mut seq = until_reply(CapturePolicy::default());
        let t = seq.handle(Event::CaptureFailed("HTTP 503".into())).unwrap();
        assert_eq!(
            t.effects,
            vec![Effect::ReportError {
                message: "Capture failed: HTTP 503".into()
            }]
        );
        assert_eq!(t.wait, Wait::Timer(Duration::from_millis(500)));

        let t = seq.handle(Event::TimerElapsed).unwrap();
        assert_eq!(
            t.effects,
            vec![Effect::ShowPanel {
                panel: Panel::LiveControls
            }]
        );
        assert_eq!(t.wait, Wait::Finished(Outcome::Failed("HTTP 503".into())));
    }

    #[test]
    fn timeout_recovers_to_live_controls() {
        let mut seq = until_reply(CapturePolicy::default());
        let t = seq.handle(Event::CaptureTimedOut).unwrap();
        assert!(matches!(t.effects.as_slice(), [Effect::ReportError { .. }]));
        let t = seq.handle(Event::TimerElapsed).unwrap();
        assert_eq!(t.wait, Wait::Finished(Outcome::TimedOut));
    }

    #[test]
    fn faithful_failure_leaves_page_alone() {
        let policy = CapturePolicy {
            failure: FailurePolicy::Faithful,
            timeout: None,
        };
        let mut seq = until_reply(policy);
        let t = seq.handle(Event::CaptureFailed("refused".into())).unwrap();
        assert!(t.effects.is_empty());
        assert_eq!(t.wait, Wait::Finished(Outcome::Failed("refused".into())));
    }

    #[test]
    fn cancel_during_countdown_removes_overlay_once() {
        let (mut seq, _) =
            CaptureSequence::begin(SequenceTiming::default(), CapturePolicy::default());
        let _ = seq.handle(Event::TimerElapsed).unwrap();
        let t = seq.handle(Event::Cancel).unwrap();
        assert_eq!(
            t.effects,
            vec![
                Effect::RemoveOverlay,
                Effect::ShowPanel {
                    panel: Panel::LiveControls
                }
            ]
        );
        assert_eq!(t.wait, Wait::Finished(Outcome::Cancelled));
        assert!(seq.countdown().is_none());

        // Nothing applies after the end.
        assert_eq!(seq.handle(Event::TimerElapsed), None);
        assert_eq!(seq.handle(Event::Cancel), None);
    }

    #[test]
    fn cancel_during_glyph_sends_no_capture() {
        let (mut seq, _) =
            CaptureSequence::begin(SequenceTiming::default(), CapturePolicy::default());
        for _ in 0..3 {
            let _ = seq.handle(Event::TimerElapsed).unwrap();
        }
        assert_eq!(seq.countdown().unwrap().phase(), Phase::Captured);

        let t = seq.handle(Event::Cancel).unwrap();
        assert_eq!(
            t.effects,
            vec![
                Effect::RemoveOverlay,
                Effect::ShowPanel {
                    panel: Panel::LiveControls
                }
            ]
        );
        assert_eq!(t.wait, Wait::Finished(Outcome::Cancelled));

        // The pre-capture timer firing late must not send the request.
        assert_eq!(seq.handle(Event::TimerElapsed), None);
    }

    #[test]
    fn cancel_while_awaiting_reply_ignores_late_reply() {
        let mut seq = until_reply(CapturePolicy::default());
        let t = seq.handle(Event::Cancel).unwrap();
        // Overlay already gone; only the panel changes.
        assert_eq!(
            t.effects,
            vec![Effect::ShowPanel {
                panel: Panel::LiveControls
            }]
        );
        assert_eq!(seq.handle(Event::CaptureSucceeded), None);
        assert_eq!(seq.outcome(), Some(&Outcome::Cancelled));
    }

    #[test]
    fn cancel_while_restoring_skips_delay() {
        let mut seq = until_reply(CapturePolicy::default());
        let _ = seq.handle(Event::CaptureSucceeded).unwrap();
        let t = seq.handle(Event::Cancel).unwrap();
        assert_eq!(
            t.effects,
            vec![Effect::ShowPanel {
                panel: Panel::CaptureControls
            }]
        );
        assert_eq!(t.wait, Wait::Finished(Outcome::Completed));
    }

    #[test]
    fn zero_count_goes_straight_to_glyph() {
        let timing = SequenceTiming {
            initial_count: 0,
            ..SequenceTiming::default()
        };
        let (mut seq, t) = CaptureSequence::begin(timing, CapturePolicy::default());
        assert_eq!(t.effects, vec![glyph()]);
        assert_eq!(t.wait, Wait::Timer(timing.pre_capture_delay));
        let t = seq.handle(Event::TimerElapsed).unwrap();
        assert_eq!(t.effects[0], Effect::RemoveOverlay);
        assert_eq!(t.wait, Wait::CaptureResponse);
    }

    #[test]
    fn effects_serialize_with_tags() {
        let json = serde_json::to_value(Effect::ShowOverlay {
            content: OverlayContent::Count(2),
        })
        .unwrap();
        assert_eq!(json["effect"], "show_overlay");
        assert_eq!(json["content"]["kind"], "count");
        assert_eq!(json["content"]["value"], 2);

        let json = serde_json::to_value(Effect::SendCapture { timeout: None }).unwrap();
        assert_eq!(json["effect"], "send_capture");
        assert!(json["timeout_ms"].is_null());
    }
}
