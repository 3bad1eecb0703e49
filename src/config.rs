//! Compile-time configuration for the controller.
//!
//! All tunables live here as constants and are gathered into
//! [`ControllerConfig::DEFAULT`]. Boards that need different values build their
//! own `const` configuration with the `with_*` builders; nothing is read at
//! runtime.

/// Period of the hardware timer interrupt in milliseconds.
pub const TICK_PERIOD_MS: u16 = 2;

/// Number of ticks that make up one second.
pub const TICKS_PER_SECOND: u16 = 1000 / TICK_PERIOD_MS;

/// Default green time in seconds.
pub const DEFAULT_GREEN_TIME: u8 = 25;

/// Default yellow time in seconds.
pub const DEFAULT_YELLOW_TIME: u8 = 5;

/// Shortest duration an operator may configure for a light.
pub const MIN_LIGHT_TIME: u8 = 5;

/// Longest duration an operator may configure for a light.
pub const MAX_LIGHT_TIME: u8 = 99;

/// Consecutive stable samples required before a button edge is reported.
pub const DEBOUNCE_TICKS: u8 = 10;

/// Remaining seconds at or below which the moving direction's lamp flashes.
pub const FLASH_THRESHOLD: u8 = 3;

/// Ticks between two flash toggles (500 ms).
pub const FLASH_TOGGLE_TICKS: u16 = 250;

/// Seconds granted by one emergency extension.
pub const EMERGENCY_BONUS: u8 = 10;

/// Upper bound on the total emergency extension within a single phase.
pub const EMERGENCY_MAX_EXTEND: u8 = 15;

/// Seconds after a granted extension during which further requests are refused.
pub const EMERGENCY_COOLDOWN: u8 = 10;

/// Default beep length of the last-seconds warning.
pub const WARNING_BEEP_MS: u16 = 100;

/// Buzzer acknowledgement for an accepted key press.
pub const KEY_BEEP_MS: u16 = 50;

/// Buzzer acknowledgement for a granted emergency extension.
pub const EMERGENCY_BEEP_MS: u16 = 100;

/// Inclusive bounds applied to every configured light duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DurationBounds {
    min: u8,
    max: u8,
}

impl DurationBounds {
    /// Creates bounds. A zero minimum is raised to one second and `max` is
    /// raised to `min` if given in the wrong order.
    pub const fn new(min: u8, max: u8) -> Self {
        let min = if min == 0 { 1 } else { min };
        let max = if max < min { min } else { max };
        Self { min, max }
    }

    /// Lower bound in seconds.
    pub const fn min(&self) -> u8 {
        self.min
    }

    /// Upper bound in seconds.
    pub const fn max(&self) -> u8 {
        self.max
    }

    /// Clamps `value` into the bounds.
    pub const fn clamp(&self, value: u8) -> u8 {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    /// Adds `delta` to `value` without leaving the bounds.
    pub const fn step(&self, value: u8, delta: i8) -> u8 {
        let stepped = value as i16 + delta as i16;
        if stepped < self.min as i16 {
            self.min
        } else if stepped > self.max as i16 {
            self.max
        } else {
            stepped as u8
        }
    }
}

impl Default for DurationBounds {
    fn default() -> Self {
        Self::new(MIN_LIGHT_TIME, MAX_LIGHT_TIME)
    }
}

/// Full controller configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerConfig {
    /// Ticks per second of the driving timer.
    pub ticks_per_second: u16,
    /// Power-on green time.
    pub green_time: u8,
    /// Power-on yellow time.
    pub yellow_time: u8,
    /// Bounds for every light duration.
    pub bounds: DurationBounds,
    /// Debounce stability threshold in ticks.
    pub debounce_ticks: u8,
    /// Remaining seconds at which the warning flash starts. Zero disables it.
    pub flash_threshold: u8,
    /// Ticks between flash toggles.
    pub flash_toggle_ticks: u16,
    /// Remaining seconds at which a warning beep sounds every second.
    pub warning_beep_threshold: Option<u8>,
    /// Length of each warning beep.
    pub warning_beep_ms: u16,
    /// Seconds granted by one emergency extension.
    pub emergency_bonus: u8,
    /// Cap on the total extension granted within one phase.
    pub emergency_max_extend: u8,
    /// Cooldown between two granted extensions.
    pub emergency_cooldown: u8,
    /// Acknowledgement beep for accepted Mode presses. Zero disables it.
    pub key_beep_ms: u16,
    /// Acknowledgement beep for a granted extension. Zero disables it.
    pub emergency_beep_ms: u16,
}

impl ControllerConfig {
    /// Reference hardware configuration: 2 ms tick, 25 s green, 5 s yellow.
    pub const DEFAULT: Self = Self {
        ticks_per_second: TICKS_PER_SECOND,
        green_time: DEFAULT_GREEN_TIME,
        yellow_time: DEFAULT_YELLOW_TIME,
        bounds: DurationBounds::new(MIN_LIGHT_TIME, MAX_LIGHT_TIME),
        debounce_ticks: DEBOUNCE_TICKS,
        flash_threshold: FLASH_THRESHOLD,
        flash_toggle_ticks: FLASH_TOGGLE_TICKS,
        warning_beep_threshold: None,
        warning_beep_ms: WARNING_BEEP_MS,
        emergency_bonus: EMERGENCY_BONUS,
        emergency_max_extend: EMERGENCY_MAX_EXTEND,
        emergency_cooldown: EMERGENCY_COOLDOWN,
        key_beep_ms: KEY_BEEP_MS,
        emergency_beep_ms: EMERGENCY_BEEP_MS,
    };

    pub const fn with_ticks_per_second(mut self, ticks: u16) -> Self {
        self.ticks_per_second = if ticks == 0 { 1 } else { ticks };
        self
    }

    pub const fn with_durations(mut self, green: u8, yellow: u8) -> Self {
        self.green_time = green;
        self.yellow_time = yellow;
        self
    }

    pub const fn with_bounds(mut self, min: u8, max: u8) -> Self {
        self.bounds = DurationBounds::new(min, max);
        self
    }

    pub const fn with_debounce_ticks(mut self, ticks: u8) -> Self {
        self.debounce_ticks = if ticks == 0 { 1 } else { ticks };
        self
    }

    pub const fn with_flash(mut self, threshold: u8, toggle_ticks: u16) -> Self {
        self.flash_threshold = threshold;
        self.flash_toggle_ticks = if toggle_ticks == 0 { 1 } else { toggle_ticks };
        self
    }

    pub const fn with_warning_beep(mut self, threshold: Option<u8>, beep_ms: u16) -> Self {
        self.warning_beep_threshold = threshold;
        self.warning_beep_ms = beep_ms;
        self
    }

    pub const fn with_emergency(mut self, bonus: u8, max_extend: u8, cooldown: u8) -> Self {
        self.emergency_bonus = bonus;
        self.emergency_max_extend = max_extend;
        self.emergency_cooldown = cooldown;
        self
    }

    pub const fn with_beeps(mut self, key_ms: u16, emergency_ms: u16) -> Self {
        self.key_beep_ms = key_ms;
        self.emergency_beep_ms = emergency_ms;
        self
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tick_rate_is_one_second() {
        assert_eq!(
            ControllerConfig::DEFAULT.ticks_per_second as u32 * TICK_PERIOD_MS as u32,
            1000
        );
    }

    #[test]
    fn bounds_step_saturates_at_both_ends() {
        let bounds = DurationBounds::new(5, 99);
        assert_eq!(bounds.step(99, 1), 99);
        assert_eq!(bounds.step(5, -1), 5);
        assert_eq!(bounds.step(50, 1), 51);
    }

    #[test]
    fn bounds_never_allow_zero_seconds() {
        let bounds = DurationBounds::new(0, 0);
        assert_eq!(bounds.min(), 1);
        assert_eq!(bounds.max(), 1);
        assert_eq!(bounds.clamp(0), 1);
    }
}
