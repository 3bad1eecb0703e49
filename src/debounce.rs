//! Tick-sampled button debouncing.
//!
//! Each logical button gets a [`ButtonDebouncer`] that turns raw active-low
//! pin samples into one clean [`ButtonEdge`] per physical press and release.

use crate::hal::ButtonSource;

/// Logical operator buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonId {
    /// Enters and steps through the setting session.
    Mode,
    /// Increments the selected duration.
    Up,
    /// Decrements the selected duration.
    Down,
    /// Requests an emergency green extension.
    Emergency,
}

impl ButtonId {
    pub const COUNT: usize = 4;

    pub const ALL: [ButtonId; Self::COUNT] = [
        ButtonId::Mode,
        ButtonId::Up,
        ButtonId::Down,
        ButtonId::Emergency,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A debounced change of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEdge {
    /// No change this tick.
    #[default]
    None,
    /// The button has been stably pressed.
    Pressed,
    /// The button has been stably released.
    Released,
}

/// Stable-for-N-samples filter for one button.
///
/// A new level has to be seen on `threshold` consecutive samples before the
/// edge is reported. Any sample at the old level restarts the count, so
/// contact bounce never surfaces.
#[derive(Debug, Clone, Copy)]
pub struct ButtonDebouncer {
    pressed: bool,
    count: u8,
    threshold: u8,
}

impl ButtonDebouncer {
    /// Creates a released debouncer. A zero threshold behaves like one.
    pub const fn new(threshold: u8) -> Self {
        Self {
            pressed: false,
            count: 0,
            threshold: if threshold == 0 { 1 } else { threshold },
        }
    }

    /// Feeds one raw sample. `level_high` is the pin level; low means pressed.
    pub fn sample(&mut self, level_high: bool) -> ButtonEdge {
        let raw_pressed = !level_high;
        if raw_pressed == self.pressed {
            self.count = 0;
            return ButtonEdge::None;
        }

        self.count = self.count.saturating_add(1);
        if self.count < self.threshold {
            return ButtonEdge::None;
        }

        self.count = 0;
        self.pressed = raw_pressed;
        if raw_pressed {
            ButtonEdge::Pressed
        } else {
            ButtonEdge::Released
        }
    }

    /// Debounced state.
    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }
}

/// Edges produced by one sampling pass over all buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonEvents {
    edges: [ButtonEdge; ButtonId::COUNT],
}

impl ButtonEvents {
    #[inline]
    pub fn edge(&self, button: ButtonId) -> ButtonEdge {
        self.edges[button.index()]
    }

    /// Returns true if `button` was pressed this tick.
    #[inline]
    pub fn pressed(&self, button: ButtonId) -> bool {
        self.edge(button) == ButtonEdge::Pressed
    }

    /// Returns true if no button changed.
    pub fn is_empty(&self) -> bool {
        self.edges.iter().all(|edge| *edge == ButtonEdge::None)
    }
}

/// Debouncers for every [`ButtonId`].
#[derive(Debug, Clone)]
pub struct Debouncer {
    buttons: [ButtonDebouncer; ButtonId::COUNT],
}

impl Debouncer {
    pub const fn new(threshold: u8) -> Self {
        Self {
            buttons: [ButtonDebouncer::new(threshold); ButtonId::COUNT],
        }
    }

    /// Samples every button once through `source`.
    pub fn sample_all<B: ButtonSource>(&mut self, source: &mut B) -> ButtonEvents {
        let mut events = ButtonEvents::default();
        for button in ButtonId::ALL {
            let level = source.sample(button);
            events.edges[button.index()] = self.buttons[button.index()].sample(level);
        }
        events
    }

    /// Debounced state of `button`.
    pub fn is_pressed(&self, button: ButtonId) -> bool {
        self.buttons[button.index()].is_pressed()
    }
}
