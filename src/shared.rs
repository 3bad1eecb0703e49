//! Sharing the controller between the tick interrupt and the main loop.
//!
//! [`SharedScheduler`] is meant to live in a `static`. The interrupt handler
//! calls [`SharedScheduler::on_interrupt`]; the main loop reads snapshots and
//! drains events. Every access runs inside a `critical_section`, so a reader
//! never sees a half-applied tick.

use core::cell::RefCell;
use critical_section::Mutex;

use crate::clock::{TickOutcome, Timebase};
use crate::hal::{AlertSink, ButtonSource, DigitSink, LampSink};
use crate::phase::ExtensionError;
use crate::scheduler::{ControllerEvent, Scheduler, Snapshot};

/// Interrupt-safe slot for a value shared with an interrupt handler.
///
/// The slot starts empty so it can be built in a `const` context and filled
/// once the peripherals are configured.
pub struct SharedScheduler<S> {
    inner: Mutex<RefCell<Option<S>>>,
}

impl<S> SharedScheduler<S> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Installs `value`, returning whatever was installed before.
    pub fn install(&self, value: S) -> Option<S> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).replace(value))
    }

    /// Removes the installed value.
    pub fn take(&self) -> Option<S> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).take())
    }

    pub fn is_installed(&self) -> bool {
        critical_section::with(|cs| self.inner.borrow_ref(cs).is_some())
    }

    /// Runs `f` on the installed value inside a critical section.
    ///
    /// Returns `None` if nothing is installed. Keep `f` short: interrupts are
    /// masked while it runs.
    pub fn with<R>(&self, f: impl FnOnce(&mut S) -> R) -> Option<R> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).as_mut().map(f))
    }
}

impl<S> Default for SharedScheduler<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L, D, B, A> SharedScheduler<Scheduler<L, D, B, A>>
where
    L: LampSink,
    D: DigitSink,
    B: ButtonSource,
    A: AlertSink,
{
    /// Interrupt entry point: reloads the timer, then runs one tick.
    ///
    /// Returns `None` while no scheduler is installed. The timer is reloaded
    /// either way.
    pub fn on_interrupt<T: Timebase>(&self, timebase: &mut T) -> Option<TickOutcome> {
        timebase.reload();
        self.with(|scheduler| scheduler.tick())
    }

    /// Consistent copy of the controller state.
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.with(|scheduler| scheduler.snapshot())
    }

    /// Takes the oldest pending event.
    pub fn next_event(&self) -> Option<ControllerEvent> {
        self.with(|scheduler| scheduler.next_event()).flatten()
    }

    /// Requests an emergency extension from outside the interrupt.
    pub fn request_emergency_extension(&self) -> Option<Result<u8, ExtensionError>> {
        self.with(|scheduler| scheduler.request_emergency_extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_slot_runs_nothing() {
        let shared: SharedScheduler<u32> = SharedScheduler::new();
        assert!(!shared.is_installed());
        assert_eq!(shared.with(|value| *value + 1), None);
    }

    #[test]
    fn install_replaces_and_take_empties() {
        let shared = SharedScheduler::new();
        assert_eq!(shared.install(1u32), None);
        assert_eq!(shared.install(2), Some(1));
        assert_eq!(
            shared.with(|value| {
                *value += 1;
                *value
            }),
            Some(3)
        );
        assert_eq!(shared.take(), Some(3));
        assert!(!shared.is_installed());
    }
}
