//! Countdown state shown on the capture overlay.

use serde::{Deserialize, Serialize};

/// Lifecycle phase of a [`CountdownState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Numbers are being shown; ticks decrement `remaining`.
    Counting,
    /// Count reached zero; the capture glyph is shown.
    Captured,
    /// The overlay has been taken down.
    Done,
}

/// What the overlay currently displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum OverlayContent {
    /// A countdown number.
    Count(u32),
    /// The "shutter" indicator shown once the count reaches zero.
    CaptureGlyph,
}

impl OverlayContent {
    /// Text rendered on the overlay.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::Count(n) => n.to_string(),
            Self::CaptureGlyph => "\u{1F4F8}".to_owned(),
        }
    }
}

/// The transient countdown entity.
///
/// Created when a capture begins and dropped once the overlay is
/// removed.  `remaining` only ever decreases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownState {
    remaining: u32,
    phase: Phase,
}

impl CountdownState {
    /// Start a countdown at `initial`.
    ///
    /// A zero start goes straight to [`Phase::Captured`].
    #[must_use]
    pub const fn new(initial: u32) -> Self {
        let phase = if initial == 0 {
            Phase::Captured
        } else {
            Phase::Counting
        };
        Self {
            remaining: initial,
            phase,
        }
    }

    /// Remaining count.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Content the overlay should show for the current state, or `None`
    /// once the countdown is done.
    #[must_use]
    pub const fn content(&self) -> Option<OverlayContent> {
        match self.phase {
            Phase::Counting => Some(OverlayContent::Count(self.remaining)),
            Phase::Captured => Some(OverlayContent::CaptureGlyph),
            Phase::Done => None,
        }
    }

    /// Apply one tick.
    ///
    /// Decrements `remaining`; moves to [`Phase::Captured`] when it hits
    /// zero.  Ticks outside [`Phase::Counting`] are no-ops.  Returns the
    /// phase after the tick.
    pub const fn tick(&mut self) -> Phase {
        if let Phase::Counting = self.phase {
            self.remaining = self.remaining.saturating_sub(1);
            if self.remaining == 0 {
                self.phase = Phase::Captured;
            }
        }
        self.phase
    }

    /// Mark the countdown as finished (overlay removed).
    pub const fn finish(&mut self) {
        self.phase = Phase::Done;
    }
}
