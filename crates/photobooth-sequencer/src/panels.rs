//! Which control panel is visible.
//!
//! The page has exactly two panels and shows exactly one of them.
//! [`Panels`] stores a single [`Panel`] value, so the mutual exclusion
//! holds by construction.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two control panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    /// Live preview with the capture button and camera picker.
    LiveControls,
    /// Post-capture panel: download and return-to-live.
    CaptureControls,
}

impl Panel {
    /// Display label for the panel.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::LiveControls => "Live controls",
            Self::CaptureControls => "Capture controls",
        }
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// View-switcher state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panels {
    visible: Panel,
}

impl Panels {
    /// Start with `visible` shown.
    #[must_use]
    pub const fn new(visible: Panel) -> Self {
        Self { visible }
    }

    /// The panel currently shown.
    #[must_use]
    pub const fn visible(&self) -> Panel {
        self.visible
    }

    /// Whether `panel` is the one shown.
    #[must_use]
    pub fn is_visible(&self, panel: Panel) -> bool {
        self.visible == panel
    }

    /// Show `panel` and hide the other.  Idempotent.
    pub const fn show(&mut self, panel: Panel) {
        self.visible = panel;
    }

    /// Show the live controls.
    pub const fn show_live_controls(&mut self) {
        self.show(Panel::LiveControls);
    }

    /// Show the capture controls.
    pub const fn show_capture_controls(&mut self) {
        self.show(Panel::CaptureControls);
    }
}

impl Default for Panels {
    fn default() -> Self {
        Self::new(Panel::LiveControls)
    }
}
