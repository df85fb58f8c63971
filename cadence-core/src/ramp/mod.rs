//! Ramp generators
//!
//! A ramp generator is a pure state machine over step counts and intervals:
//! given a step budget it yields the sequence of inter-step intervals that
//! realizes a velocity profile, and it knows how to plan a decelerated stop
//! from the current speed. No I/O, no timing; the motion controller calls
//! into it from the tick path.

mod constant;
mod math;
mod trapezoidal;

pub use constant::Constant;
pub use trapezoidal::{Trapezoidal, TrapezoidalProfile};

use crate::error::Error;

/// Trait for velocity-profile generators
///
/// Phase order is fixed: pre-deceleration, acceleration, cruise,
/// deceleration. Every successful [`next_interval`] call consumes exactly
/// one step from the current phase.
///
/// [`next_interval`]: RampGenerator::next_interval
pub trait RampGenerator {
    /// Plan a new move of `step_count` steps
    ///
    /// Initializes the internal phase counters, taking the current speed
    /// into account. Returns the total number of steps the ramp will emit,
    /// which equals `step_count` except when the motor is still too fast to
    /// come down to the target speed within the budget.
    fn prepare_move(&mut self, step_count: u32) -> Result<u32, Error>;

    /// Reconfigure the ramp to bring motion to rest from the current speed
    ///
    /// Clears the non-deceleration phase counters. Returns how many more
    /// steps will be emitted before rest; 0 means the stop is immediate.
    fn prepare_stop(&mut self) -> Result<u32, Error>;

    /// Advance one step and return the interval to wait before it
    ///
    /// Returns 0 once the planned steps are exhausted, meaning motion is
    /// done.
    fn next_interval(&mut self) -> u64;

    /// The interval scheduled for the upcoming step, 0 when at rest
    fn current_interval(&self) -> u64;

    /// Discard any plan and return to rest
    ///
    /// Used when motion is cancelled out-of-band (device disable), where
    /// the decelerating path of [`prepare_stop`] does not apply.
    ///
    /// [`prepare_stop`]: RampGenerator::prepare_stop
    fn reset(&mut self);
}

/// Runtime-selectable ramp
///
/// A controller is generic over its ramp type; binding this variant type
/// lets the application swap between ramp kinds at runtime.
#[derive(Debug, Clone)]
pub enum AnyRamp {
    /// Constant-velocity profile
    Constant(Constant),
    /// Trapezoidal profile
    Trapezoidal(Trapezoidal),
}

impl RampGenerator for AnyRamp {
    fn prepare_move(&mut self, step_count: u32) -> Result<u32, Error> {
        match self {
            AnyRamp::Constant(ramp) => ramp.prepare_move(step_count),
            AnyRamp::Trapezoidal(ramp) => ramp.prepare_move(step_count),
        }
    }

    fn prepare_stop(&mut self) -> Result<u32, Error> {
        match self {
            AnyRamp::Constant(ramp) => ramp.prepare_stop(),
            AnyRamp::Trapezoidal(ramp) => ramp.prepare_stop(),
        }
    }

    fn next_interval(&mut self) -> u64 {
        match self {
            AnyRamp::Constant(ramp) => ramp.next_interval(),
            AnyRamp::Trapezoidal(ramp) => ramp.next_interval(),
        }
    }

    fn current_interval(&self) -> u64 {
        match self {
            AnyRamp::Constant(ramp) => ramp.current_interval(),
            AnyRamp::Trapezoidal(ramp) => ramp.current_interval(),
        }
    }

    fn reset(&mut self) {
        match self {
            AnyRamp::Constant(ramp) => ramp.reset(),
            AnyRamp::Trapezoidal(ramp) => ramp.reset(),
        }
    }
}

impl From<Constant> for AnyRamp {
    fn from(ramp: Constant) -> Self {
        AnyRamp::Constant(ramp)
    }
}

impl From<Trapezoidal> for AnyRamp {
    fn from(ramp: Trapezoidal) -> Self {
        AnyRamp::Trapezoidal(ramp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_ramp_delegates() {
        let mut ramp = AnyRamp::from(Constant::new(1_000_000));
        assert_eq!(ramp.prepare_move(3).unwrap(), 3);
        assert_eq!(ramp.next_interval(), 1_000_000);
        assert_eq!(ramp.current_interval(), 1_000_000);

        ramp = AnyRamp::from(Trapezoidal::new(TrapezoidalProfile::default()));
        assert_eq!(ramp.current_interval(), 0);
        assert!(ramp.prepare_move(10).unwrap() >= 10);
        assert!(ramp.next_interval() > 0);
    }
}
