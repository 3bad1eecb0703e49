//! Tick counting for the periodic timer interrupt.

/// Trait for abstracting the hardware timer that drives the tick.
///
/// Implement this for a timer whose reload value must be rewritten on every
/// interrupt (e.g. a free-running 16-bit counter without auto-reload). The
/// interrupt entry calls [`Timebase::reload`] before doing anything else so
/// that the tick period does not depend on how long the previous tick took.
/// Timers with hardware auto-reload can implement it as a no-op.
pub trait Timebase {
    /// Rewrites the timer's reload value for the next period.
    fn reload(&mut self);
}

/// What a single tick produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickOutcome {
    /// Monotonic tick count after this tick (wraps at `u32::MAX`).
    pub tick: u32,
    /// True exactly once every `ticks_per_second` ticks.
    pub second_elapsed: bool,
}

/// Monotonic tick counter with a one-second accumulator.
///
/// Drift is not corrected: one second is always `ticks_per_second` ticks,
/// whatever the timer divisor error is.
#[derive(Debug, Clone)]
pub struct TickClock {
    ticks: u32,
    sub_second: u16,
    ticks_per_second: u16,
}

impl TickClock {
    /// Creates a clock at tick zero. A zero rate is treated as one tick per second.
    pub const fn new(ticks_per_second: u16) -> Self {
        Self {
            ticks: 0,
            sub_second: 0,
            ticks_per_second: if ticks_per_second == 0 {
                1
            } else {
                ticks_per_second
            },
        }
    }

    /// Accounts for one tick.
    pub fn advance(&mut self) -> TickOutcome {
        self.ticks = self.ticks.wrapping_add(1);
        self.sub_second += 1;

        let second_elapsed = self.sub_second >= self.ticks_per_second;
        if second_elapsed {
            self.sub_second = 0;
        }

        TickOutcome {
            tick: self.ticks,
            second_elapsed,
        }
    }

    /// Total ticks since creation.
    #[inline]
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Ticks accumulated towards the next second.
    #[inline]
    pub fn sub_second_ticks(&self) -> u16 {
        self.sub_second
    }

    #[inline]
    pub fn ticks_per_second(&self) -> u16 {
        self.ticks_per_second
    }
}
