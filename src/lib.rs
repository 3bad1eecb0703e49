#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`Scheduler`**: Owns all controller state; call `tick()` once per timer interrupt
//! - **`PhaseMachine`**: The four-phase cycle, its duration table and the seconds countdown
//! - **`PhaseDurations`**: Green and yellow times; red is always green + yellow
//! - **`SettingSession`**: Operator editing of the durations through Mode/Up/Down
//! - **`Debouncer`**: Turns raw active-low button samples into clean press edges
//! - **`DigitMux`**: Drives two seven-segment digits over one shared segment bus
//! - **`LampSink`**, **`DigitSink`**, **`ButtonSource`**, **`AlertSink`**: Traits to implement for your hardware
//! - **`Timebase`**: Trait for timers that must be reloaded on every interrupt
//! - **`SharedScheduler`**: Critical-section slot sharing the scheduler with the main loop
//!
//! The library never blocks inside `tick()` and never allocates. Lamp outputs
//! are only written when the lamp pattern changes.

pub mod clock;
pub mod config;
pub mod debounce;
pub mod display;
pub mod hal;
pub mod phase;
pub mod scheduler;
pub mod settings;
pub mod shared;

pub use clock::{TickClock, TickOutcome, Timebase};
pub use config::{ControllerConfig, DurationBounds};
pub use debounce::{ButtonDebouncer, ButtonEdge, ButtonEvents, ButtonId, Debouncer};
pub use display::{DigitBus, DigitMux, DigitPosition, DisplayDigits};
pub use hal::{AlertSink, ButtonSource, DigitSink, LampPattern, LampSink, PinButtons};
pub use phase::{
    Direction, ExtensionError, InvalidPhase, LightColor, Phase, PhaseDurations, PhaseMachine,
    WaitTimes,
};
pub use scheduler::{ControllerEvent, EVENT_QUEUE_DEPTH, Scheduler, Snapshot};
pub use settings::{SessionStep, SettingMode, SettingSession};
pub use shared::SharedScheduler;
