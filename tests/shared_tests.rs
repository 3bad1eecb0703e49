//! Integration tests for SharedScheduler

mod common;
use common::*;

use intersection_controller::{ControllerEvent, Phase, SharedScheduler};

static CONTROLLER: SharedScheduler<TestScheduler> = SharedScheduler::new();

#[test]
fn static_slot_drives_the_cycle() {
    assert!(CONTROLLER.install(new_scheduler(test_config())).is_none());

    let mut timer = MockTimebase::new();
    for _ in 0..TEST_TPS * 5 {
        CONTROLLER.on_interrupt(&mut timer);
    }

    let snapshot = CONTROLLER.snapshot().unwrap();
    assert_eq!(snapshot.phase, Phase::NsYellowEwRed);
    assert_eq!(snapshot.seconds_remaining, 3);
    assert_eq!(timer.reloads, TEST_TPS as u32 * 5);

    assert!(CONTROLLER.take().is_some());
    assert!(!CONTROLLER.is_installed());
}

#[test]
fn interrupt_reloads_timer_even_when_empty() {
    let shared: SharedScheduler<TestScheduler> = SharedScheduler::new();
    let mut timer = MockTimebase::new();

    assert_eq!(shared.on_interrupt(&mut timer), None);
    assert_eq!(timer.reloads, 1);
    assert_eq!(shared.snapshot(), None);
    assert_eq!(shared.next_event(), None);
}

#[test]
fn tick_outcome_reports_second_boundary() {
    let shared = SharedScheduler::new();
    shared.install(new_scheduler(test_config()));
    let mut timer = MockTimebase::new();

    for _ in 1..TEST_TPS {
        let outcome = shared.on_interrupt(&mut timer).unwrap();
        assert!(!outcome.second_elapsed);
    }
    let outcome = shared.on_interrupt(&mut timer).unwrap();
    assert!(outcome.second_elapsed);
    assert_eq!(outcome.tick, TEST_TPS as u32);
}

#[test]
fn main_loop_drains_events_and_requests_extension() {
    let shared = SharedScheduler::new();
    shared.install(new_scheduler(test_config()));
    let mut timer = MockTimebase::new();

    for _ in 0..TEST_TPS {
        shared.on_interrupt(&mut timer);
    }
    assert_eq!(shared.next_event(), Some(ControllerEvent::SecondElapsed));
    assert_eq!(shared.next_event(), None);

    assert_eq!(shared.request_emergency_extension(), Some(Ok(10)));
    assert_eq!(
        shared.next_event(),
        Some(ControllerEvent::EmergencyExtended { granted: 10 })
    );
    assert_eq!(shared.snapshot().map(|s| s.seconds_remaining), Some(14));

    let lamps_written = shared.with(|scheduler| scheduler.lamps().writes());
    assert_eq!(lamps_written, Some(1));
}
