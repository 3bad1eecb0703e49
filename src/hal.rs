//! Capability traits for the hardware around the controller.
//!
//! The controller never touches pins or registers. Each board implements these
//! traits for its lamps, digit display, buttons and buzzer. Every method is
//! called from the tick interrupt and must finish in bounded time.

use crate::debounce::ButtonId;
use crate::display::DisplayDigits;
use crate::phase::{Direction, LightColor, Phase};
use embedded_hal::digital::InputPin;

/// The six intersection lamps as a bit pattern.
///
/// Bit layout: north-south red, yellow, green in bits 0..=2, east-west red,
/// yellow, green in bits 3..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LampPattern(u8);

impl LampPattern {
    pub const NS_RED: u8 = 0x01;
    pub const NS_YELLOW: u8 = 0x02;
    pub const NS_GREEN: u8 = 0x04;
    pub const EW_RED: u8 = 0x08;
    pub const EW_YELLOW: u8 = 0x10;
    pub const EW_GREEN: u8 = 0x20;

    /// Every lamp off.
    pub const OFF: LampPattern = LampPattern(0);

    /// Both directions red. Used whenever the phase cannot be trusted.
    pub const ALL_RED: LampPattern = LampPattern(Self::NS_RED | Self::EW_RED);

    /// Builds a pattern from raw bits, ignoring bits above bit 5.
    pub const fn from_bits(bits: u8) -> Self {
        LampPattern(bits & 0x3F)
    }

    #[inline]
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Bit for one lamp.
    pub const fn lamp_bit(direction: Direction, color: LightColor) -> u8 {
        match (direction, color) {
            (Direction::NorthSouth, LightColor::Red) => Self::NS_RED,
            (Direction::NorthSouth, LightColor::Yellow) => Self::NS_YELLOW,
            (Direction::NorthSouth, LightColor::Green) => Self::NS_GREEN,
            (Direction::EastWest, LightColor::Red) => Self::EW_RED,
            (Direction::EastWest, LightColor::Yellow) => Self::EW_YELLOW,
            (Direction::EastWest, LightColor::Green) => Self::EW_GREEN,
        }
    }

    /// Exactly the two lamps of `phase`, everything else off.
    pub const fn for_phase(phase: Phase) -> Self {
        LampPattern(
            Self::lamp_bit(Direction::NorthSouth, phase.signal(Direction::NorthSouth))
                | Self::lamp_bit(Direction::EastWest, phase.signal(Direction::EastWest)),
        )
    }

    /// Pattern for a raw phase index; anything out of range is all red.
    pub fn for_raw_phase(raw: u8) -> Self {
        match Phase::try_from(raw) {
            Ok(phase) => Self::for_phase(phase),
            Err(_) => Self::ALL_RED,
        }
    }

    /// Returns true if the lamp is lit.
    pub const fn is_lit(&self, direction: Direction, color: LightColor) -> bool {
        self.0 & Self::lamp_bit(direction, color) != 0
    }

    /// Same pattern with one lamp switched off.
    pub const fn without(self, direction: Direction, color: LightColor) -> Self {
        LampPattern(self.0 & !Self::lamp_bit(direction, color))
    }
}

/// Trait for the six lamp outputs.
pub trait LampSink {
    /// Drives all six lamps to `lamps`. Lamps not in the pattern are turned off.
    fn set_lamps(&mut self, lamps: LampPattern);

    /// Shows the steady lamp combination of `phase`.
    fn set_phase(&mut self, phase: Phase) {
        self.set_lamps(LampPattern::for_phase(phase));
    }
}

/// Trait for the two-digit countdown display.
pub trait DigitSink {
    /// Performs one bounded refresh step for `digits`.
    fn show_digits(&mut self, digits: DisplayDigits);
}

/// Trait for reading the raw operator buttons.
pub trait ButtonSource {
    /// Reads the raw level of `button`. Buttons are active-low: `false` means
    /// the contact is closed.
    fn sample(&mut self, button: ButtonId) -> bool;
}

/// Trait for the buzzer.
pub trait AlertSink {
    /// Starts a beep of `duration_ms`. Must not block; the buzzer driver ends
    /// the beep on its own.
    fn pulse(&mut self, duration_ms: u16);
}

/// [`ButtonSource`] over four `embedded-hal` input pins, indexed by
/// [`ButtonId::index`].
///
/// A failed pin read counts as released so that a flaky input can never
/// produce a press.
pub struct PinButtons<P: InputPin> {
    pins: [P; ButtonId::COUNT],
}

impl<P: InputPin> PinButtons<P> {
    /// Creates the source from pins ordered `[Mode, Up, Down, Emergency]`.
    pub fn new(pins: [P; ButtonId::COUNT]) -> Self {
        Self { pins }
    }

    /// Returns the pins.
    pub fn release(self) -> [P; ButtonId::COUNT] {
        self.pins
    }
}

impl<P: InputPin> ButtonSource for PinButtons<P> {
    fn sample(&mut self, button: ButtonId) -> bool {
        self.pins[button.index()].is_high().unwrap_or(true)
    }
}
