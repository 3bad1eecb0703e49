//! Shared test infrastructure for intersection-controller integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use intersection_controller::{
    AlertSink, ButtonId, ButtonSource, ControllerConfig, DigitSink, DisplayDigits, LampPattern,
    LampSink, Scheduler, Timebase,
};

// ============================================================================
// Mock Lamps
// ============================================================================

/// Mock lamp port that records every write
pub struct MockLamps {
    current: LampPattern,
    history: heapless::Vec<LampPattern, 64>,
    writes: usize,
}

impl MockLamps {
    pub fn new() -> Self {
        Self {
            current: LampPattern::OFF,
            history: heapless::Vec::new(),
            writes: 0,
        }
    }

    pub fn current(&self) -> LampPattern {
        self.current
    }

    /// First 64 patterns written
    pub fn history(&self) -> &[LampPattern] {
        &self.history
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl LampSink for MockLamps {
    fn set_lamps(&mut self, lamps: LampPattern) {
        self.current = lamps;
        self.writes += 1;
        let _ = self.history.push(lamps);
    }
}

// ============================================================================
// Mock Display
// ============================================================================

/// Mock display that keeps the last digits it was asked to show
pub struct MockDigits {
    last: Option<DisplayDigits>,
    refreshes: usize,
}

impl MockDigits {
    pub fn new() -> Self {
        Self {
            last: None,
            refreshes: 0,
        }
    }

    pub fn last(&self) -> Option<DisplayDigits> {
        self.last
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes
    }
}

impl DigitSink for MockDigits {
    fn show_digits(&mut self, digits: DisplayDigits) {
        self.last = Some(digits);
        self.refreshes += 1;
    }
}

// ============================================================================
// Mock Buttons
// ============================================================================

/// Mock button inputs with settable raw levels (active-low)
pub struct MockButtons {
    levels: [bool; ButtonId::COUNT],
}

impl MockButtons {
    pub fn new() -> Self {
        Self {
            levels: [true; ButtonId::COUNT],
        }
    }

    /// Closes the contact (drives the line low)
    pub fn hold(&mut self, button: ButtonId) {
        self.levels[button.index()] = false;
    }

    pub fn release(&mut self, button: ButtonId) {
        self.levels[button.index()] = true;
    }
}

impl ButtonSource for MockButtons {
    fn sample(&mut self, button: ButtonId) -> bool {
        self.levels[button.index()]
    }
}

// ============================================================================
// Mock Buzzer
// ============================================================================

/// Mock buzzer that records pulse lengths
pub struct MockAlert {
    pulses: heapless::Vec<u16, 32>,
}

impl MockAlert {
    pub fn new() -> Self {
        Self {
            pulses: heapless::Vec::new(),
        }
    }

    pub fn pulses(&self) -> &[u16] {
        &self.pulses
    }
}

impl AlertSink for MockAlert {
    fn pulse(&mut self, duration_ms: u16) {
        let _ = self.pulses.push(duration_ms);
    }
}

// ============================================================================
// Mock Timebase
// ============================================================================

/// Mock timer that counts reloads
pub struct MockTimebase {
    pub reloads: u32,
}

impl MockTimebase {
    pub fn new() -> Self {
        Self { reloads: 0 }
    }
}

impl Timebase for MockTimebase {
    fn reload(&mut self) {
        self.reloads += 1;
    }
}

// ============================================================================
// Test Helper Functions
// ============================================================================

pub type TestScheduler = Scheduler<MockLamps, MockDigits, MockButtons, MockAlert>;

/// Ticks per second used by the tests
pub const TEST_TPS: u16 = 50;

/// Debounce threshold used by the tests
pub const TEST_DEBOUNCE: u8 = 2;

/// Fast configuration: 50 ticks per second, 2-tick debounce, 5 s green,
/// 3 s yellow, durations down to 1 s, no flashing.
pub fn test_config() -> ControllerConfig {
    ControllerConfig::DEFAULT
        .with_ticks_per_second(TEST_TPS)
        .with_debounce_ticks(TEST_DEBOUNCE)
        .with_bounds(1, 99)
        .with_durations(5, 3)
        .with_flash(0, 10)
}

pub fn new_scheduler(config: ControllerConfig) -> TestScheduler {
    Scheduler::new(
        config,
        MockLamps::new(),
        MockDigits::new(),
        MockButtons::new(),
        MockAlert::new(),
    )
}

pub fn run_ticks(scheduler: &mut TestScheduler, ticks: u32) {
    for _ in 0..ticks {
        scheduler.tick();
    }
}

pub fn run_seconds(scheduler: &mut TestScheduler, seconds: u32) {
    run_ticks(scheduler, seconds * scheduler.config().ticks_per_second as u32);
}

/// Presses and releases a button, holding each level for the debounce time.
///
/// Takes `2 * TEST_DEBOUNCE` ticks; the press registers on tick `TEST_DEBOUNCE`.
pub fn press(scheduler: &mut TestScheduler, button: ButtonId) {
    scheduler.buttons_mut().hold(button);
    run_ticks(scheduler, TEST_DEBOUNCE as u32);
    scheduler.buttons_mut().release(button);
    run_ticks(scheduler, TEST_DEBOUNCE as u32);
}

/// Drains every pending event into a vector
pub fn drain_events(
    scheduler: &mut TestScheduler,
) -> heapless::Vec<intersection_controller::ControllerEvent, 16> {
    let mut events = heapless::Vec::new();
    while let Some(event) = scheduler.next_event() {
        let _ = events.push(event);
    }
    events
}
