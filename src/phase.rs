//! The four-phase intersection cycle and its derived-time arithmetic.
//!
//! Provides [`PhaseMachine`], which owns the running phase, the per-phase
//! duration table and the seconds-remaining countdown, and computes the wait
//! time each direction has to display.

use crate::config::{ControllerConfig, DurationBounds};

/// One of the two conflicting traffic flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    NorthSouth,
    EastWest,
}

/// Lamp colour shown to a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LightColor {
    Red,
    Yellow,
    Green,
}

/// One of the four fixed lamp combinations of the cycle.
///
/// The discriminants are the cycle order; [`Phase::next`] is
/// `(index + 1) mod 4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Phase {
    /// North-south moves, east-west waits.
    NsGreenEwRed = 0,
    /// North-south clears, east-west still waits.
    NsYellowEwRed = 1,
    /// East-west moves, north-south waits.
    NsRedEwGreen = 2,
    /// East-west clears, north-south still waits.
    NsRedEwYellow = 3,
}

impl Phase {
    /// All phases in cycle order.
    pub const ALL: [Phase; 4] = [
        Phase::NsGreenEwRed,
        Phase::NsYellowEwRed,
        Phase::NsRedEwGreen,
        Phase::NsRedEwYellow,
    ];

    /// Position of this phase in the cycle.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The phase that follows this one.
    #[inline]
    pub const fn next(self) -> Phase {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Colour shown to `direction` during this phase.
    pub const fn signal(self, direction: Direction) -> LightColor {
        match (self, direction) {
            (Phase::NsGreenEwRed, Direction::NorthSouth) => LightColor::Green,
            (Phase::NsYellowEwRed, Direction::NorthSouth) => LightColor::Yellow,
            (Phase::NsRedEwGreen, Direction::EastWest) => LightColor::Green,
            (Phase::NsRedEwYellow, Direction::EastWest) => LightColor::Yellow,
            _ => LightColor::Red,
        }
    }

    /// The direction that is green or yellow.
    pub const fn moving_direction(self) -> Direction {
        match self {
            Phase::NsGreenEwRed | Phase::NsYellowEwRed => Direction::NorthSouth,
            Phase::NsRedEwGreen | Phase::NsRedEwYellow => Direction::EastWest,
        }
    }

    /// Returns true if one direction is green.
    pub const fn is_green(self) -> bool {
        matches!(self, Phase::NsGreenEwRed | Phase::NsRedEwGreen)
    }
}

/// A raw phase index outside `0..4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidPhase(pub u8);

impl core::fmt::Display for InvalidPhase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "phase index {} is out of range 0..4", self.0)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidPhase {}

impl TryFrom<u8> for Phase {
    type Error = InvalidPhase;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Phase::ALL
            .get(raw as usize)
            .copied()
            .ok_or(InvalidPhase(raw))
    }
}

/// Configured light durations in whole seconds.
///
/// Only green and yellow are stored. Red always equals green + yellow because
/// a direction stays red through the other direction's green and yellow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhaseDurations {
    green: u8,
    yellow: u8,
}

impl PhaseDurations {
    /// Creates durations clamped into `bounds`.
    pub const fn new(green: u8, yellow: u8, bounds: DurationBounds) -> Self {
        Self {
            green: bounds.clamp(green),
            yellow: bounds.clamp(yellow),
        }
    }

    /// Power-on durations of a configuration.
    pub const fn from_config(config: &ControllerConfig) -> Self {
        Self::new(config.green_time, config.yellow_time, config.bounds)
    }

    #[inline]
    pub const fn green(&self) -> u8 {
        self.green
    }

    #[inline]
    pub const fn yellow(&self) -> u8 {
        self.yellow
    }

    /// Red time, derived as green + yellow.
    #[inline]
    pub const fn red(&self) -> u8 {
        self.green.saturating_add(self.yellow)
    }

    /// Duration of a light colour.
    pub const fn get(&self, color: LightColor) -> u8 {
        match color {
            LightColor::Red => self.red(),
            LightColor::Yellow => self.yellow,
            LightColor::Green => self.green,
        }
    }

    /// Steps the duration of `color` by `delta`, saturating at `bounds`.
    ///
    /// Red has no storage of its own, so stepping red steps green.
    pub const fn adjust(self, color: LightColor, delta: i8, bounds: DurationBounds) -> Self {
        match color {
            LightColor::Red | LightColor::Green => Self {
                green: bounds.step(self.green, delta),
                yellow: self.yellow,
            },
            LightColor::Yellow => Self {
                green: self.green,
                yellow: bounds.step(self.yellow, delta),
            },
        }
    }

    /// How long `phase` lasts.
    pub const fn for_phase(&self, phase: Phase) -> u8 {
        if phase.is_green() {
            self.green
        } else {
            self.yellow
        }
    }

    /// Per-phase duration table in cycle order.
    pub const fn phase_table(&self) -> [u8; 4] {
        [
            self.for_phase(Phase::NsGreenEwRed),
            self.for_phase(Phase::NsYellowEwRed),
            self.for_phase(Phase::NsRedEwGreen),
            self.for_phase(Phase::NsRedEwYellow),
        ]
    }
}

/// Unclamped wait time each direction must display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WaitTimes {
    pub north_south: u8,
    pub east_west: u8,
}

impl WaitTimes {
    pub const fn get(&self, direction: Direction) -> u8 {
        match direction {
            Direction::NorthSouth => self.north_south,
            Direction::EastWest => self.east_west,
        }
    }
}

/// Reasons an emergency extension is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExtensionError {
    /// The countdown is paused by an active setting session.
    SettingsActive,
    /// No direction is green right now.
    NoGreenPhase,
    /// A previous extension was granted too recently.
    CoolingDown {
        /// Seconds until the next request can be granted.
        seconds_left: u8,
    },
    /// This phase already received the maximum total extension.
    LimitReached,
    /// The controller is holding all red after a fault.
    Faulted,
}

impl core::fmt::Display for ExtensionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ExtensionError::SettingsActive => {
                write!(f, "countdown is paused by a setting session")
            }
            ExtensionError::NoGreenPhase => {
                write!(f, "no direction is green")
            }
            ExtensionError::CoolingDown { seconds_left } => {
                write!(f, "extension cooling down, {} s left", seconds_left)
            }
            ExtensionError::LimitReached => {
                write!(f, "maximum extension for this phase already granted")
            }
            ExtensionError::Faulted => {
                write!(f, "controller is in the all-red fault state")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ExtensionError {}

/// The four-state traffic cycle with its countdown.
///
/// Starts in [`Phase::NsGreenEwRed`] and runs forever. Every transition
/// reloads the countdown from the duration table of the new phase.
#[derive(Debug, Clone)]
pub struct PhaseMachine {
    phase: Phase,
    seconds_remaining: u8,
    durations: PhaseDurations,
    table: [u8; 4],
    flashing: bool,
    extension_used: u8,
    cooldown: u8,
}

impl PhaseMachine {
    /// Creates a machine at the start of the north-south green.
    pub fn new(durations: PhaseDurations) -> Self {
        let table = durations.phase_table();
        Self {
            phase: Phase::NsGreenEwRed,
            seconds_remaining: table[Phase::NsGreenEwRed.index()],
            durations,
            table,
            flashing: false,
            extension_used: 0,
            cooldown: 0,
        }
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn seconds_remaining(&self) -> u8 {
        self.seconds_remaining
    }

    #[inline]
    pub fn durations(&self) -> PhaseDurations {
        self.durations
    }

    /// Configured length of `phase`.
    #[inline]
    pub fn duration_of(&self, phase: Phase) -> u8 {
        self.table[phase.index()]
    }

    /// Returns true while the last-seconds warning flash is active.
    #[inline]
    pub fn is_flashing(&self) -> bool {
        self.flashing
    }

    /// Recomputes the flash flag against `threshold` and returns it.
    pub fn update_flashing(&mut self, threshold: u8) -> bool {
        self.flashing = self.seconds_remaining > 0 && self.seconds_remaining <= threshold;
        self.flashing
    }

    /// Moves to the next phase and reloads its countdown.
    pub fn advance(&mut self) -> Phase {
        self.jump_to(self.phase.next());
        self.phase
    }

    /// Starts `phase` from its full duration.
    pub fn jump_to(&mut self, phase: Phase) {
        self.phase = phase;
        self.seconds_remaining = self.duration_of(phase);
        self.flashing = false;
        self.extension_used = 0;
    }

    /// Accounts for one elapsed second.
    ///
    /// Returns the new phase if the countdown ran out. Zero is never left
    /// observable: reaching it transitions immediately.
    pub fn count_down(&mut self) -> Option<Phase> {
        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        if self.seconds_remaining == 0 {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Wait time each direction must display.
    ///
    /// The moving direction shows the countdown. The waiting direction also
    /// stays red through the following phase when that phase is the moving
    /// direction's yellow, so its wait includes that duration.
    pub fn wait_times(&self) -> WaitTimes {
        let remaining = self.seconds_remaining;
        let waiting = if self.phase.is_green() {
            remaining.saturating_add(self.duration_of(self.phase.next()))
        } else {
            remaining
        };

        match self.phase.moving_direction() {
            Direction::NorthSouth => WaitTimes {
                north_south: remaining,
                east_west: waiting,
            },
            Direction::EastWest => WaitTimes {
                north_south: waiting,
                east_west: remaining,
            },
        }
    }

    /// Commits new durations.
    ///
    /// The table for all four phases is rebuilt and the running countdown is
    /// cut down to the new length of the current phase if it now exceeds it.
    pub fn apply_durations(&mut self, durations: PhaseDurations) {
        self.durations = durations;
        self.table = durations.phase_table();

        let limit = self.duration_of(self.phase);
        if self.seconds_remaining > limit {
            self.seconds_remaining = limit;
        }
    }

    /// Extends the current green by up to `config.emergency_bonus` seconds.
    ///
    /// Returns the seconds actually granted. The total per phase is capped at
    /// `config.emergency_max_extend`, the countdown never exceeds
    /// `config.bounds.max()`, and a granted request starts a cooldown of
    /// `config.emergency_cooldown` seconds.
    pub fn extend_green(&mut self, config: &ControllerConfig) -> Result<u8, ExtensionError> {
        if !self.phase.is_green() {
            return Err(ExtensionError::NoGreenPhase);
        }

        if self.cooldown > 0 {
            return Err(ExtensionError::CoolingDown {
                seconds_left: self.cooldown,
            });
        }

        let budget = config
            .emergency_max_extend
            .saturating_sub(self.extension_used);
        let headroom = config
            .bounds
            .max()
            .saturating_sub(self.seconds_remaining);
        let granted = config.emergency_bonus.min(budget).min(headroom);
        if granted == 0 {
            return Err(ExtensionError::LimitReached);
        }

        self.seconds_remaining += granted;
        self.extension_used += granted;
        self.cooldown = config.emergency_cooldown;
        Ok(granted)
    }

    /// Runs down the extension cooldown by one second.
    pub fn cool_down(&mut self) {
        self.cooldown = self.cooldown.saturating_sub(1);
    }
}
