//! Interrupt-safe sharing of a controller
//!
//! The tick handler usually runs in a timer ISR while the command API runs
//! in thread context. [`Shared`] guards a controller with one critical
//! section per instance, the embedded rendering of a per-controller
//! spinlock: on single-core targets this masks interrupts for the few
//! microseconds a tick or command takes.

use core::cell::RefCell;

use critical_section::Mutex;

/// A controller cell shared between thread context and the timer ISR
///
/// ```ignore
/// static MOTOR: Shared<Controller> = Shared::new(controller);
///
/// // In the timer ISR:
/// MOTOR.with(|controller| controller.on_tick());
///
/// // In thread context:
/// MOTOR.with(|controller| controller.move_by(1000))?;
/// ```
pub struct Shared<T> {
    inner: Mutex<RefCell<T>>,
}

impl<T> Shared<T> {
    /// Wrap a value for cross-context sharing
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Run `f` on the inner value inside a critical section
    pub fn with<U>(&self, f: impl FnOnce(&mut T) -> U) -> U {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    /// Consume the cell and return the inner value
    pub fn into_inner(self) -> T {
        self.inner.into_inner().into_inner()
    }
}
