//! Operator setting session.
//!
//! While a session is active the countdown is paused and Up/Down edit a
//! pending copy of the durations. The Mode button walks
//! `Idle → SelectingRed → SelectingYellow → SelectingGreen` and commits on the
//! press after `SelectingGreen`.

use crate::config::DurationBounds;
use crate::phase::{LightColor, PhaseDurations};

/// Where the session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingMode {
    /// No session; the countdown runs.
    #[default]
    Idle,
    /// Editing red. Red is green + yellow, so this edits green.
    SelectingRed,
    /// Editing yellow.
    SelectingYellow,
    /// Editing green.
    SelectingGreen,
}

impl SettingMode {
    /// Colour being edited, if any.
    pub const fn selected_color(self) -> Option<LightColor> {
        match self {
            SettingMode::Idle => None,
            SettingMode::SelectingRed => Some(LightColor::Red),
            SettingMode::SelectingYellow => Some(LightColor::Yellow),
            SettingMode::SelectingGreen => Some(LightColor::Green),
        }
    }

    #[inline]
    pub const fn is_active(self) -> bool {
        !matches!(self, SettingMode::Idle)
    }
}

/// Result of a Mode press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionStep {
    /// The session moved to a new selection.
    Selecting(SettingMode),
    /// The session ended; these durations are now authoritative.
    Committed(PhaseDurations),
}

/// Pending duration edits.
#[derive(Debug, Clone)]
pub struct SettingSession {
    mode: SettingMode,
    pending: PhaseDurations,
    bounds: DurationBounds,
}

impl SettingSession {
    /// Creates an idle session. `initial` only seeds the pending copy.
    pub fn new(initial: PhaseDurations, bounds: DurationBounds) -> Self {
        Self {
            mode: SettingMode::Idle,
            pending: initial,
            bounds,
        }
    }

    #[inline]
    pub fn mode(&self) -> SettingMode {
        self.mode
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.mode.is_active()
    }

    /// Pending durations being edited.
    #[inline]
    pub fn pending(&self) -> PhaseDurations {
        self.pending
    }

    /// Handles a Mode press.
    ///
    /// Entering the session copies `current` into the pending durations; the
    /// press after `SelectingGreen` hands them back for commit.
    pub fn on_mode(&mut self, current: PhaseDurations) -> SessionStep {
        self.mode = match self.mode {
            SettingMode::Idle => {
                self.pending = current;
                SettingMode::SelectingRed
            }
            SettingMode::SelectingRed => SettingMode::SelectingYellow,
            SettingMode::SelectingYellow => SettingMode::SelectingGreen,
            SettingMode::SelectingGreen => {
                self.mode = SettingMode::Idle;
                return SessionStep::Committed(self.pending);
            }
        };
        SessionStep::Selecting(self.mode)
    }

    /// Handles an Up press. Returns true if a pending value was edited.
    pub fn on_up(&mut self) -> bool {
        self.step_selected(1)
    }

    /// Handles a Down press. Returns true if a pending value was edited.
    pub fn on_down(&mut self) -> bool {
        self.step_selected(-1)
    }

    fn step_selected(&mut self, delta: i8) -> bool {
        match self.mode.selected_color() {
            Some(color) => {
                self.pending = self.pending.adjust(color, delta, self.bounds);
                true
            }
            None => false,
        }
    }

    /// Pending value of the selected colour, if a session is active.
    pub fn selected_value(&self) -> Option<u8> {
        self.mode
            .selected_color()
            .map(|color| self.pending.get(color))
    }

    /// Leaves the session without committing.
    pub fn cancel(&mut self) {
        self.mode = SettingMode::Idle;
    }
}
