//! Run a capture sequence against a virtual clock.
//!
//! [`simulate`] plays the role of the browser driver: it applies no
//! effects, it just records when each one would happen, assuming every
//! timer fires exactly on schedule and the backend answers according
//! to a [`ResponseScript`].  Tests use it to check the sequence's
//! ordering and timing contracts; `photobooth-timeline` prints it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::sequence::{CapturePolicy, CaptureSequence, Effect, Event, Outcome, Wait};
use crate::timing::{SequenceTiming, duration_ms};

/// How the simulated backend answers the capture request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseScript {
    /// Success reply after this long.
    SucceedAfter(Duration),
    /// Failure reply after this long, with this reason.
    FailAfter(Duration, String),
    /// No reply at all.
    Never,
}

/// One effect at a point in simulated time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Time since the sequence began.
    #[serde(with = "duration_ms", rename = "at_ms")]
    pub at: Duration,
    /// What happened.
    #[serde(flatten)]
    pub effect: Effect,
}

/// Result of a simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    /// Effects in the order they were emitted.
    pub entries: Vec<TimelineEntry>,
    /// Final outcome, or `None` if the sequence is stuck waiting on a
    /// reply that never comes and no timeout is set.
    pub outcome: Option<Outcome>,
    /// When the sequence finished or got stuck.
    #[serde(with = "duration_ms", rename = "end_ms")]
    pub end: Duration,
}

impl Timeline {
    /// Entries matching `pred`, in order.
    pub fn matching(&self, pred: impl Fn(&Effect) -> bool) -> impl Iterator<Item = &TimelineEntry> {
        self.entries.iter().filter(move |entry| pred(&entry.effect))
    }

    /// Number of capture requests sent.
    #[must_use]
    pub fn capture_requests(&self) -> usize {
        self.matching(|e| matches!(e, Effect::SendCapture { .. }))
            .count()
    }

    /// Time of the first entry matching `pred`.
    #[must_use]
    pub fn first_at(&self, pred: impl Fn(&Effect) -> bool) -> Option<Duration> {
        self.matching(pred).next().map(|entry| entry.at)
    }
}

/// Simulate one sequence from start to finish.
#[must_use]
pub fn simulate(timing: SequenceTiming, policy: CapturePolicy, script: &ResponseScript) -> Timeline {
    let mut now = Duration::ZERO;
    let mut entries = Vec::new();
    let (mut sequence, mut transition) = CaptureSequence::begin(timing, policy);

    loop {
        entries.extend(transition.effects.into_iter().map(|effect| TimelineEntry { at: now, effect }));

        let event = match transition.wait {
            Wait::Timer(delay) => {
                now += delay;
                Event::TimerElapsed
            }
            Wait::CaptureResponse => match reply_after(script, policy.timeout) {
                Some((after, event)) => {
                    now += after;
                    event
                }
                None => {
                    return Timeline {
                        entries,
                        outcome: None,
                        end: now,
                    };
                }
            },
            Wait::Finished(outcome) => {
                return Timeline {
                    entries,
                    outcome: Some(outcome),
                    end: now,
                };
            }
        };

        match sequence.handle(event) {
            Some(next) => transition = next,
            None => {
                return Timeline {
                    entries,
                    outcome: sequence.outcome().cloned(),
                    end: now,
                };
            }
        }
    }
}

/// Which event ends the capture wait, and after how long.  A reply that
/// arrives exactly at the timeout loses to the timeout.
fn reply_after(script: &ResponseScript, timeout: Option<Duration>) -> Option<(Duration, Event)> {
    let reply = match script {
        ResponseScript::SucceedAfter(after) => Some((*after, Event::CaptureSucceeded)),
        ResponseScript::FailAfter(after, reason) => {
            Some((*after, Event::CaptureFailed(reason.clone())))
        }
        ResponseScript::Never => None,
    };
    match (reply, timeout) {
        (Some((after, event)), Some(limit)) if after < limit => Some((after, event)),
        (Some(_) | None, Some(limit)) => Some((limit, Event::CaptureTimedOut)),
        (reply, None) => reply,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::FailurePolicy;

    #[test]
    fn slow_reply_loses_to_timeout() {
        let policy = CapturePolicy {
            failure: FailurePolicy::Recover,
            timeout: Some(Duration::from_secs(2)),
        };
        let timeline = simulate(
            SequenceTiming::default(),
            policy,
            &ResponseScript::SucceedAfter(Duration::from_secs(2)),
        );
        assert_eq!(timeline.outcome, Some(Outcome::TimedOut));
        // 3.5 s countdown + 2 s timeout + 0.5 s restore.
        assert_eq!(timeline.end, Duration::from_secs(6));
    }

    #[test]
    fn never_without_timeout_gets_stuck() {
        let policy = CapturePolicy {
            failure: FailurePolicy::Recover,
            timeout: None,
        };
        let timeline = simulate(SequenceTiming::default(), policy, &ResponseScript::Never);
        assert_eq!(timeline.outcome, None);
        assert_eq!(timeline.end, Duration::from_millis(3500));
        assert_eq!(timeline.capture_requests(), 1);
    }

    #[test]
    fn serializes_flat_entries() {
        let timeline = simulate(
            SequenceTiming::default(),
            CapturePolicy::default(),
            &ResponseScript::SucceedAfter(Duration::from_millis(100)),
        );
        let json = serde_json::to_value(&timeline).unwrap_or_default();
        assert_eq!(json["entries"][0]["at_ms"], 0);
        assert_eq!(json["entries"][0]["effect"], "show_overlay");
        assert_eq!(json["outcome"]["outcome"], "completed");
        assert_eq!(json["end_ms"], 4100);
    }
}
