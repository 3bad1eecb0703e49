#![no_std]
#![no_main]

use cortex_m::peripheral::syst::SystClkSource;
use cortex_m_rt::{entry, exception};
use panic_halt as _;
use intersection_controller::{
    AlertSink, ButtonId, ButtonSource, ControllerConfig, DigitBus, DigitMux, DigitPosition,
    LampPattern, LampSink, Scheduler, SharedScheduler, Timebase,
};

/// Core clock assumed for the SysTick reload value
const CORE_CLOCK_HZ: u32 = 8_000_000;

// ============================================================================
// Minimal Hardware Implementations
// ============================================================================

/// Zero-size lamp port for measuring library overhead
pub struct MinimalLamps;

impl LampSink for MinimalLamps {
    fn set_lamps(&mut self, lamps: LampPattern) {
        core::hint::black_box(lamps.bits());
    }
}

/// Zero-size segment bus
pub struct MinimalBus;

impl DigitBus for MinimalBus {
    fn select(&mut self, position: Option<DigitPosition>) {
        core::hint::black_box(position);
    }

    fn write_segments(&mut self, segments: u8) {
        core::hint::black_box(segments);
    }
}

/// Buttons that are never pressed
pub struct MinimalButtons;

impl ButtonSource for MinimalButtons {
    fn sample(&mut self, button: ButtonId) -> bool {
        core::hint::black_box(button);
        true
    }
}

pub struct MinimalBuzzer;

impl AlertSink for MinimalBuzzer {
    fn pulse(&mut self, duration_ms: u16) {
        core::hint::black_box(duration_ms);
    }
}

/// SysTick reloads in hardware
pub struct AutoReload;

impl Timebase for AutoReload {
    fn reload(&mut self) {}
}

type Controller = Scheduler<MinimalLamps, DigitMux<MinimalBus>, MinimalButtons, MinimalBuzzer>;

static CONTROLLER: SharedScheduler<Controller> = SharedScheduler::new();

/// SysTick interrupt handler - called every 2ms
#[exception]
fn SysTick() {
    CONTROLLER.on_interrupt(&mut AutoReload);
}

#[entry]
fn main() -> ! {
    let config = ControllerConfig::DEFAULT;
    CONTROLLER.install(Scheduler::new(
        config,
        MinimalLamps,
        DigitMux::new(MinimalBus),
        MinimalButtons,
        MinimalBuzzer,
    ));

    if let Some(mut peripherals) = cortex_m::Peripherals::take() {
        let syst = &mut peripherals.SYST;
        syst.set_clock_source(SystClkSource::Core);
        syst.set_reload(CORE_CLOCK_HZ / config.ticks_per_second as u32 - 1);
        syst.clear_current();
        syst.enable_counter();
        syst.enable_interrupt();
    }

    loop {
        cortex_m::asm::wfi();

        while let Some(event) = CONTROLLER.next_event() {
            core::hint::black_box(event);
        }
        core::hint::black_box(CONTROLLER.snapshot());
        // Keeps the extension path linked without ever taking it.
        if core::hint::black_box(false) {
            core::hint::black_box(CONTROLLER.request_emergency_extension());
        }
    }
}
