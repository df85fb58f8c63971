//! Timing source contract
//!
//! A timing source is a one-shot countdown shared by nothing: one instance
//! per controlled motor. Arming it with an interval schedules a single tick
//! that many nanoseconds in the future. Whoever services that tick (a timer
//! ISR on hardware, the harness loop in simulation) calls
//! [`MotionController::on_tick`].
//!
//! [`MotionController::on_tick`]: crate::motion::MotionController::on_tick

use crate::error::Error;

/// Trait for one-shot step timers
pub trait TimingSource {
    /// Arm the timer to fire once after `interval_ns` nanoseconds
    ///
    /// Re-arming an already-armed timer replaces the pending interval.
    fn start(&mut self, interval_ns: u64) -> Result<(), Error>;

    /// Disarm the timer, cancelling any pending tick
    fn stop(&mut self) -> Result<(), Error>;

    /// The armed interval in nanoseconds, 0 if disarmed
    fn interval_ns(&self) -> u64;

    /// Check whether a tick is pending
    fn is_armed(&self) -> bool {
        self.interval_ns() != 0
    }
}
