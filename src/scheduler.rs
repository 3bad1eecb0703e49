//! Tick-driven controller root.
//!
//! Provides [`Scheduler`], which owns every piece of controller state and is
//! advanced by calling [`Scheduler::tick`] from the periodic timer interrupt.
//! Each tick samples the buttons, refreshes one display position, advances the
//! clock and, once per second, runs the phase countdown.

use crate::clock::{TickClock, TickOutcome};
use crate::config::ControllerConfig;
use crate::debounce::{ButtonEvents, ButtonId, Debouncer};
use crate::display::DisplayDigits;
use crate::hal::{AlertSink, ButtonSource, DigitSink, LampPattern, LampSink};
use crate::phase::{ExtensionError, InvalidPhase, Phase, PhaseDurations, PhaseMachine};
use crate::settings::{SessionStep, SettingMode, SettingSession};
use heapless::Deque;

/// Capacity of the event queue between the tick handler and the main loop.
pub const EVENT_QUEUE_DEPTH: usize = 8;

/// Notifications produced by the tick handler for the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerEvent {
    /// One second of tick time passed (also while the countdown is paused).
    SecondElapsed,
    /// The cycle moved to a new phase.
    PhaseChanged(Phase),
    /// The setting session moved to a new mode.
    SettingsChanged(SettingMode),
    /// New durations became authoritative.
    DurationsCommitted(PhaseDurations),
    /// An emergency extension was granted.
    EmergencyExtended {
        /// Seconds added to the running green.
        granted: u8,
    },
    /// A corrupt phase was detected; lamps are held all red until reset.
    Fault,
}

/// Consistent copy of the controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    pub phase: Phase,
    pub seconds_remaining: u8,
    pub sub_second_ticks: u16,
    pub durations: PhaseDurations,
    pub digits: DisplayDigits,
    pub setting: SettingMode,
    pub flashing: bool,
    pub faulted: bool,
    pub ticks: u32,
}

/// The controller root: one tick of work per timer interrupt.
///
/// # Type Parameters
/// * `L` - Lamp outputs
/// * `D` - Digit display
/// * `B` - Raw button inputs
/// * `A` - Buzzer
pub struct Scheduler<L: LampSink, D: DigitSink, B: ButtonSource, A: AlertSink> {
    config: ControllerConfig,
    clock: TickClock,
    machine: PhaseMachine,
    session: SettingSession,
    debouncer: Debouncer,
    digits: DisplayDigits,
    lamps_shown: Option<LampPattern>,
    flash_lit: bool,
    flash_ticks: u16,
    faulted: bool,
    events: Deque<ControllerEvent, EVENT_QUEUE_DEPTH>,
    lamps: L,
    display: D,
    buttons: B,
    alert: A,
}

impl<L: LampSink, D: DigitSink, B: ButtonSource, A: AlertSink> Scheduler<L, D, B, A> {
    /// Creates a controller at the start of the north-south green and drives
    /// the lamps to that phase.
    pub fn new(config: ControllerConfig, lamps: L, display: D, buttons: B, alert: A) -> Self {
        let durations = PhaseDurations::from_config(&config);
        let machine = PhaseMachine::new(durations);
        let digits = DisplayDigits::from_wait_times(machine.wait_times());

        let mut scheduler = Self {
            config,
            clock: TickClock::new(config.ticks_per_second),
            machine,
            session: SettingSession::new(durations, config.bounds),
            debouncer: Debouncer::new(config.debounce_ticks),
            digits,
            lamps_shown: None,
            flash_lit: true,
            flash_ticks: 0,
            faulted: false,
            events: Deque::new(),
            lamps,
            display,
            buttons,
            alert,
        };
        scheduler.update_lamps();
        scheduler
    }

    /// Runs one tick. Call exactly once per timer period.
    pub fn tick(&mut self) -> TickOutcome {
        let buttons = self.debouncer.sample_all(&mut self.buttons);
        if !buttons.is_empty() {
            self.handle_buttons(buttons);
        }

        self.digits = self.derive_digits();
        self.display.show_digits(self.digits);

        let outcome = self.clock.advance();
        if outcome.second_elapsed {
            self.on_second();
        }

        self.advance_flash();
        self.update_lamps();
        outcome
    }

    fn on_second(&mut self) {
        self.machine.cool_down();
        self.push_event(ControllerEvent::SecondElapsed);

        if self.session.is_active() || self.faulted {
            return;
        }

        match self.machine.count_down() {
            Some(phase) => {
                #[cfg(feature = "defmt")]
                defmt::info!(
                    "phase -> {} ({} s)",
                    phase,
                    self.machine.seconds_remaining()
                );
                self.flash_ticks = 0;
                self.flash_lit = true;
                self.push_event(ControllerEvent::PhaseChanged(phase));
            }
            None => {
                if let Some(threshold) = self.config.warning_beep_threshold {
                    if self.machine.seconds_remaining() <= threshold {
                        self.alert.pulse(self.config.warning_beep_ms);
                    }
                }
            }
        }

        self.digits = self.derive_digits();
    }

    fn handle_buttons(&mut self, buttons: ButtonEvents) {
        if buttons.pressed(ButtonId::Mode) && !self.faulted {
            self.handle_mode();
        }

        if buttons.pressed(ButtonId::Up) {
            self.session.on_up();
        }

        if buttons.pressed(ButtonId::Down) {
            self.session.on_down();
        }

        if buttons.pressed(ButtonId::Emergency) {
            if let Err(_refused) = self.request_emergency_extension() {
                #[cfg(feature = "defmt")]
                defmt::debug!("emergency request refused: {}", _refused);
            }
        }
    }

    fn handle_mode(&mut self) {
        match self.session.on_mode(self.machine.durations()) {
            SessionStep::Selecting(mode) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("setting mode {}", mode);
                self.push_event(ControllerEvent::SettingsChanged(mode));
            }
            SessionStep::Committed(durations) => {
                #[cfg(feature = "defmt")]
                defmt::info!(
                    "durations committed: green {} yellow {} red {}",
                    durations.green(),
                    durations.yellow(),
                    durations.red()
                );
                self.machine.apply_durations(durations);
                self.push_event(ControllerEvent::DurationsCommitted(durations));
                self.push_event(ControllerEvent::SettingsChanged(SettingMode::Idle));
            }
        }

        if self.config.key_beep_ms > 0 {
            self.alert.pulse(self.config.key_beep_ms);
        }
    }

    /// Extends the running green, as if the emergency button was pressed.
    ///
    /// Returns the seconds granted.
    pub fn request_emergency_extension(&mut self) -> Result<u8, ExtensionError> {
        if self.faulted {
            return Err(ExtensionError::Faulted);
        }
        if self.session.is_active() {
            return Err(ExtensionError::SettingsActive);
        }

        let granted = self.machine.extend_green(&self.config)?;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "emergency extension +{} s, {} s left",
            granted,
            self.machine.seconds_remaining()
        );
        self.push_event(ControllerEvent::EmergencyExtended { granted });
        if self.config.emergency_beep_ms > 0 {
            self.alert.pulse(self.config.emergency_beep_ms);
        }
        self.digits = self.derive_digits();
        Ok(granted)
    }

    /// Jumps to a phase given as a raw index and restarts its countdown.
    ///
    /// An index outside the cycle puts the controller into the fail-safe
    /// state: all lamps red and the countdown held until [`Scheduler::reset`].
    pub fn set_raw_phase(&mut self, raw: u8) -> Result<Phase, InvalidPhase> {
        match Phase::try_from(raw) {
            Ok(phase) => {
                self.machine.jump_to(phase);
                self.flash_ticks = 0;
                self.flash_lit = true;
                self.digits = self.derive_digits();
                self.update_lamps();
                Ok(phase)
            }
            Err(err) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("{}, forcing all red", err.0);
                self.faulted = true;
                self.session.cancel();
                self.push_event(ControllerEvent::Fault);
                self.update_lamps();
                Err(err)
            }
        }
    }

    /// Restarts the cycle at the north-south green with the current durations.
    ///
    /// Clears a fault and drops an unfinished setting session.
    pub fn reset(&mut self) {
        self.machine = PhaseMachine::new(self.machine.durations());
        self.session.cancel();
        self.faulted = false;
        self.flash_ticks = 0;
        self.flash_lit = true;
        self.digits = self.derive_digits();
        self.update_lamps();
    }

    fn derive_digits(&self) -> DisplayDigits {
        match self.session.selected_value() {
            Some(value) => DisplayDigits::from_value(value),
            None => DisplayDigits::from_wait_times(self.machine.wait_times()),
        }
    }

    fn update_lamps(&mut self) {
        let pattern = if self.faulted {
            LampPattern::ALL_RED
        } else {
            self.flash_pattern()
        };

        // Only touch the outputs on change.
        if self.lamps_shown != Some(pattern) {
            self.lamps.set_lamps(pattern);
            self.lamps_shown = Some(pattern);
        }
    }

    /// Runs the flash cadence for one tick.
    fn advance_flash(&mut self) {
        let threshold = if self.session.is_active() {
            0
        } else {
            self.config.flash_threshold
        };

        if self.machine.update_flashing(threshold) {
            self.flash_ticks += 1;
            if self.flash_ticks >= self.config.flash_toggle_ticks {
                self.flash_ticks = 0;
                self.flash_lit = !self.flash_lit;
            }
        } else {
            self.flash_ticks = 0;
            self.flash_lit = true;
        }
    }

    fn flash_pattern(&self) -> LampPattern {
        let phase = self.machine.phase();
        let steady = LampPattern::for_phase(phase);
        if self.flash_lit {
            steady
        } else {
            let moving = phase.moving_direction();
            steady.without(moving, phase.signal(moving))
        }
    }

    /// Queues `event`. On a full queue the oldest `SecondElapsed` makes room
    /// for a state change; a `SecondElapsed` that finds no room is dropped.
    fn push_event(&mut self, event: ControllerEvent) {
        if self.events.is_full()
            && (event == ControllerEvent::SecondElapsed || !self.evict_second_elapsed())
        {
            #[cfg(feature = "defmt")]
            defmt::warn!("event queue full, dropped {}", event);
            return;
        }

        if let Err(_dropped) = self.events.push_back(event) {
            #[cfg(feature = "defmt")]
            defmt::warn!("event queue full, dropped {}", _dropped);
        }
    }

    /// Removes the oldest `SecondElapsed`. Returns false if there was none.
    fn evict_second_elapsed(&mut self) -> bool {
        let mut kept = Deque::new();
        let mut evicted = false;
        while let Some(queued) = self.events.pop_front() {
            if !evicted && queued == ControllerEvent::SecondElapsed {
                evicted = true;
                continue;
            }
            let _ = kept.push_back(queued);
        }
        self.events = kept;
        evicted
    }

    /// Takes the oldest pending event.
    pub fn next_event(&mut self) -> Option<ControllerEvent> {
        self.events.pop_front()
    }

    /// Number of events waiting to be drained.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Copies the observable state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.machine.phase(),
            seconds_remaining: self.machine.seconds_remaining(),
            sub_second_ticks: self.clock.sub_second_ticks(),
            durations: self.machine.durations(),
            digits: self.digits,
            setting: self.session.mode(),
            flashing: self.machine.is_flashing(),
            faulted: self.faulted,
            ticks: self.clock.ticks(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    pub fn seconds_remaining(&self) -> u8 {
        self.machine.seconds_remaining()
    }

    pub fn durations(&self) -> PhaseDurations {
        self.machine.durations()
    }

    /// Digits shown by the most recent refresh.
    pub fn digits(&self) -> DisplayDigits {
        self.digits
    }

    pub fn setting_mode(&self) -> SettingMode {
        self.session.mode()
    }

    /// Pending durations of the setting session.
    pub fn pending_durations(&self) -> PhaseDurations {
        self.session.pending()
    }

    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn lamps(&self) -> &L {
        &self.lamps
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn buttons_mut(&mut self) -> &mut B {
        &mut self.buttons
    }

    pub fn alert(&self) -> &A {
        &self.alert
    }
}
