//! Trapezoidal ramp
//!
//! Integer-only rendering of the step-timing recurrence from David Austin's
//! "Generate stepper-motor speed profiles in real time" (the AVR446
//! application note): starting from `c0 = f * sqrt(2 / accel) * 0.676`, each
//! accelerating step shortens the interval by `(2*c + rest) / (4*n + 1)` and
//! each decelerating step lengthens it by `(2*c + rest) / (4*m)`, where the
//! division remainder is carried into the next step so the truncation error
//! does not accumulate.

use super::math;
use super::RampGenerator;
use crate::error::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Velocity profile parameters for a trapezoidal ramp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrapezoidalProfile {
    /// Inter-step interval at cruise speed, in nanoseconds
    pub interval_ns: u64,
    /// Acceleration in steps/s^2
    pub acceleration: u32,
    /// Deceleration in steps/s^2
    pub deceleration: u32,
}

impl Default for TrapezoidalProfile {
    fn default() -> Self {
        Self {
            interval_ns: 1_000_000, // 1000 steps/s
            acceleration: 1000,
            deceleration: 1000,
        }
    }
}

/// Trapezoidal velocity profile
///
/// Splits a move into up to four phases: pre-deceleration (when the motor is
/// currently faster than the new cruise speed), acceleration, cruise, and
/// deceleration. The phase boundaries are planned from the closed-form step
/// counts `(f / interval)^2 / (2 * rate)`; inside each phase the intervals
/// follow the integer recurrence described in the module documentation.
#[derive(Debug, Clone)]
pub struct Trapezoidal {
    profile: TrapezoidalProfile,

    current_interval: u64,

    pre_decel_steps_left: u32,
    accel_steps_left: u32,
    run_steps_left: u32,
    decel_steps_left: u32,

    /// Step index `n` on the acceleration curve
    acceleration_idx: u32,
    /// Remainder carried between recurrence steps
    interval_rest: u64,
    first_accel_interval: u64,
    last_decel_interval: u64,
}

impl Trapezoidal {
    /// Create a trapezoidal ramp at rest
    pub fn new(profile: TrapezoidalProfile) -> Self {
        Self {
            profile,
            current_interval: 0,
            pre_decel_steps_left: 0,
            accel_steps_left: 0,
            run_steps_left: 0,
            decel_steps_left: 0,
            acceleration_idx: 0,
            interval_rest: 0,
            first_accel_interval: 0,
            last_decel_interval: 0,
        }
    }

    /// The active profile
    pub fn profile(&self) -> &TrapezoidalProfile {
        &self.profile
    }

    /// Replace the profile used by subsequent plans
    ///
    /// The running speed is kept, so a later `prepare_move` toward a slower
    /// cruise interval goes through the pre-deceleration phase.
    pub fn set_profile(&mut self, profile: TrapezoidalProfile) {
        self.profile = profile;
    }

    fn validate_profile(&self) -> Result<(), Error> {
        if self.profile.interval_ns == 0
            || self.profile.acceleration == 0
            || self.profile.deceleration == 0
        {
            return Err(Error::InvalidArgument);
        }
        Ok(())
    }

    /// One decelerating recurrence step over `steps_left` remaining steps
    fn lengthened_interval(&mut self, steps_left: u64) -> u64 {
        let num = 2 * self.current_interval + self.interval_rest;
        let den = 4 * steps_left;
        self.interval_rest = num % den;
        self.current_interval + num / den
    }

    fn saturated_steps(interval_ns: u64, rate: u32) -> u32 {
        math::ramp_steps(interval_ns, rate).min(u32::MAX as u64) as u32
    }
}

impl RampGenerator for Trapezoidal {
    fn prepare_move(&mut self, step_count: u32) -> Result<u32, Error> {
        self.validate_profile()?;

        let accel_lim = Self::saturated_steps(self.profile.interval_ns, self.profile.acceleration);
        let decel_lim = Self::saturated_steps(self.profile.interval_ns, self.profile.deceleration);
        let stop_lim = Self::saturated_steps(self.current_interval, self.profile.deceleration);

        if self.current_interval != 0 && self.current_interval <= self.profile.interval_ns {
            // Already at or above the cruise speed: shed the excess speed
            // first, then cruise, then decelerate to rest.
            self.pre_decel_steps_left = stop_lim.saturating_sub(decel_lim);
            self.accel_steps_left = 0;
            self.acceleration_idx = accel_lim;
            self.decel_steps_left = decel_lim;
            self.run_steps_left = step_count
                .saturating_sub(self.pre_decel_steps_left)
                .saturating_sub(self.decel_steps_left);
        } else {
            // At rest or below the cruise speed: accelerate the remaining
            // way up. `stop_lim` is the point already reached on the curve,
            // 0 when starting from standstill.
            self.pre_decel_steps_left = 0;
            self.accel_steps_left = accel_lim.saturating_sub(stop_lim);
            self.acceleration_idx = stop_lim;

            if self.accel_steps_left as u64 + decel_lim as u64 >= step_count as u64 {
                // Not enough budget to reach cruise speed; split the steps
                // between the two slopes in proportion to their rates.
                let acceleration = self.profile.acceleration as u64;
                let deceleration = self.profile.deceleration as u64;
                self.decel_steps_left =
                    (step_count as u64 * acceleration / (acceleration + deceleration)) as u32;
                self.accel_steps_left = step_count - self.decel_steps_left;
                self.run_steps_left = 0;
            } else {
                self.decel_steps_left = decel_lim;
                self.run_steps_left = step_count - self.accel_steps_left - self.decel_steps_left;
            }
        }

        self.interval_rest = 0;
        self.first_accel_interval = math::initial_interval(self.profile.acceleration);
        self.last_decel_interval = math::initial_interval(self.profile.deceleration);

        Ok(self
            .pre_decel_steps_left
            .saturating_add(self.accel_steps_left)
            .saturating_add(self.run_steps_left)
            .saturating_add(self.decel_steps_left))
    }

    fn prepare_stop(&mut self) -> Result<u32, Error> {
        if self.profile.deceleration == 0 {
            return Err(Error::InvalidArgument);
        }

        let decel_steps = Self::saturated_steps(self.current_interval, self.profile.deceleration);

        self.pre_decel_steps_left = 0;
        self.accel_steps_left = 0;
        self.run_steps_left = 0;
        self.decel_steps_left = decel_steps;
        self.interval_rest = 0;
        self.last_decel_interval = math::initial_interval(self.profile.deceleration);
        if decel_steps == 0 {
            self.current_interval = 0;
            self.acceleration_idx = 0;
        }

        Ok(decel_steps)
    }

    fn next_interval(&mut self) -> u64 {
        let interval = if self.pre_decel_steps_left > 0 {
            let remaining = self.pre_decel_steps_left as u64 + self.decel_steps_left as u64;
            let interval = self.lengthened_interval(remaining);
            self.pre_decel_steps_left -= 1;
            interval
        } else if self.accel_steps_left > 0 {
            let interval = if self.acceleration_idx == 0 {
                self.interval_rest = 0;
                self.first_accel_interval
            } else {
                let num = 2 * self.current_interval + self.interval_rest;
                let den = 4 * self.acceleration_idx as u64 + 1;
                self.interval_rest = num % den;
                self.current_interval
                    .saturating_sub(num / den)
                    .max(self.profile.interval_ns)
            };
            self.acceleration_idx += 1;
            self.accel_steps_left -= 1;
            interval
        } else if self.run_steps_left > 0 {
            self.run_steps_left -= 1;
            self.profile.interval_ns
        } else if self.decel_steps_left > 0 {
            let interval = if self.decel_steps_left == 1 {
                self.last_decel_interval.max(self.current_interval)
            } else {
                self.lengthened_interval(self.decel_steps_left as u64)
            };
            self.decel_steps_left -= 1;
            interval
        } else {
            self.current_interval = 0;
            self.acceleration_idx = 0;
            self.interval_rest = 0;
            return 0;
        };

        self.current_interval = interval;
        interval
    }

    fn current_interval(&self) -> u64 {
        self.current_interval
    }

    fn reset(&mut self) {
        self.current_interval = 0;
        self.pre_decel_steps_left = 0;
        self.accel_steps_left = 0;
        self.run_steps_left = 0;
        self.decel_steps_left = 0;
        self.acceleration_idx = 0;
        self.interval_rest = 0;
    }
}
