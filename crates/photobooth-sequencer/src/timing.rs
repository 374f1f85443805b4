//! Countdown timing constants.
//!
//! The 1000 ms tick and the two 500 ms delays are the values the
//! photobooth has always used.  They are kept as the defaults of
//! [`SequenceTiming`] so they can be tuned without editing the state
//! machine.
//!
//! Durations are serialized as whole milliseconds (`u64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::BoothError;

/// Serde support for `std::time::Duration` as whole milliseconds.
pub(crate) mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as milliseconds (`u64`, saturating).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        u64::try_from(duration.as_millis())
            .unwrap_or(u64::MAX)
            .serialize(serializer)
    }

    /// Deserialize a `Duration` from milliseconds (`u64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }

    /// Same as the parent module, for `Option<Duration>` (`null` = `None`).
    pub mod option {
        use std::time::Duration;

        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        /// Serialize an optional `Duration` as milliseconds or `null`.
        #[allow(clippy::ref_option)] // signature dictated by serde(with)
        pub fn serialize<S: Serializer>(
            duration: &Option<Duration>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            duration
                .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
                .serialize(serializer)
        }

        /// Deserialize an optional `Duration` from milliseconds or `null`.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Duration>, D::Error> {
            Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
        }
    }
}

/// Timing of one capture sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceTiming {
    /// Number shown first on the overlay; counts down to 1.
    pub initial_count: u32,

    /// Interval between countdown ticks.
    #[serde(with = "duration_ms", rename = "tick_ms")]
    pub tick: Duration,

    /// How long the capture glyph stays up before the overlay is
    /// removed and the capture request is sent.
    #[serde(with = "duration_ms", rename = "pre_capture_ms")]
    pub pre_capture_delay: Duration,

    /// Delay between the capture reply and restoring the controls.
    #[serde(with = "duration_ms", rename = "post_capture_ms")]
    pub post_capture_delay: Duration,
}

impl SequenceTiming {
    /// Default first countdown value.
    pub const DEFAULT_INITIAL_COUNT: u32 = 3;
    /// Default tick interval.
    pub const DEFAULT_TICK: Duration = Duration::from_millis(1000);
    /// Default glyph-to-capture delay.
    pub const DEFAULT_PRE_CAPTURE_DELAY: Duration = Duration::from_millis(500);
    /// Default reply-to-controls delay.
    pub const DEFAULT_POST_CAPTURE_DELAY: Duration = Duration::from_millis(500);

    /// Upper bound on `initial_count`.  Anything longer is almost
    /// certainly a typo in a query string.
    pub const MAX_INITIAL_COUNT: u32 = 60;

    /// Check the invariants the state machine relies on.
    ///
    /// # Errors
    ///
    /// Returns [`BoothError::InvalidConfig`] if the tick is zero or the
    /// initial count exceeds [`Self::MAX_INITIAL_COUNT`].
    pub fn validate(&self) -> Result<(), BoothError> {
        if self.tick.is_zero() {
            return Err(BoothError::InvalidConfig("tick must be non-zero".into()));
        }
        if self.initial_count > Self::MAX_INITIAL_COUNT {
            return Err(BoothError::InvalidConfig(format!(
                "initial count {} exceeds maximum of {}",
                self.initial_count,
                Self::MAX_INITIAL_COUNT
            )));
        }
        Ok(())
    }

    /// Time from the start of the sequence until the capture request is
    /// sent, assuming timers fire on schedule.
    #[must_use]
    pub fn until_capture(&self) -> Duration {
        self.tick * self.initial_count + self.pre_capture_delay
    }
}

impl Default for SequenceTiming {
    fn default() -> Self {
        Self {
            initial_count: Self::DEFAULT_INITIAL_COUNT,
            tick: Self::DEFAULT_TICK,
            pre_capture_delay: Self::DEFAULT_PRE_CAPTURE_DELAY,
            post_capture_delay: Self::DEFAULT_POST_CAPTURE_DELAY,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_booth_schedule() {
        let timing = SequenceTiming::default();
        assert_eq!(timing.initial_count, 3);
        assert_eq!(timing.tick, Duration::from_secs(1));
        assert_eq!(timing.pre_capture_delay, Duration::from_millis(500));
        assert_eq!(timing.post_capture_delay, Duration::from_millis(500));
        assert_eq!(timing.until_capture(), Duration::from_millis(3500));
    }

    #[test]
    fn zero_tick_is_rejected() {
        let timing = SequenceTiming {
            tick: Duration::ZERO,
            ..SequenceTiming::default()
        };
        assert!(matches!(
            timing.validate(),
            Err(BoothError::InvalidConfig(_))
        ));
    }

    #[test]
    fn oversized_count_is_rejected() {
        let timing = SequenceTiming {
            initial_count: SequenceTiming::MAX_INITIAL_COUNT + 1,
            ..SequenceTiming::default()
        };
        assert!(timing.validate().is_err());
    }

    #[test]
    fn serializes_as_milliseconds() {
        let json = serde_json::to_value(SequenceTiming::default()).unwrap();
        assert_eq!(json["tick_ms"], 1000);
        assert_eq!(json["pre_capture_ms"], 500);
        assert_eq!(json["post_capture_ms"], 500);
        assert_eq!(json["initial_count"], 3);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let timing: SequenceTiming = serde_json::from_str(r#"{"tick_ms": 250}"#).unwrap();
        assert_eq!(timing.tick, Duration::from_millis(250));
        assert_eq!(timing.initial_count, 3);
        assert_eq!(timing.post_capture_delay, Duration::from_millis(500));
    }
}
