//! Hardware stepper contract
//!
//! A stepper driver knows how to energize coils for exactly one micro-step
//! in a given direction and to report hardware conditions (stall, end stop,
//! fault). It knows nothing about velocity profiles or scheduling.

use crate::error::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Motor travel direction
///
/// Doubles as the position delta per step: one step in the positive
/// direction moves the position counter by +1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Toward larger positions
    Positive,
    /// Toward smaller positions
    Negative,
}

impl Direction {
    /// Position delta contributed by one step in this direction
    pub fn delta(self) -> i32 {
        match self {
            Direction::Positive => 1,
            Direction::Negative => -1,
        }
    }

    /// Get the opposite direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Positive => Direction::Negative,
            Direction::Negative => Direction::Positive,
        }
    }

    /// Direction of a signed step count (`Positive` for zero)
    pub fn from_sign(steps: i32) -> Self {
        if steps < 0 {
            Direction::Negative
        } else {
            Direction::Positive
        }
    }
}

/// Micro-step resolution, powers of two from full step to 1/256
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MicroStepResolution {
    /// Full steps
    Full,
    /// 1/2 step
    M2,
    /// 1/4 step
    M4,
    /// 1/8 step
    M8,
    /// 1/16 step
    M16,
    /// 1/32 step
    M32,
    /// 1/64 step
    M64,
    /// 1/128 step
    M128,
    /// 1/256 step
    M256,
}

impl MicroStepResolution {
    /// Micro-steps per full step
    pub fn steps(self) -> u16 {
        match self {
            MicroStepResolution::Full => 1,
            MicroStepResolution::M2 => 2,
            MicroStepResolution::M4 => 4,
            MicroStepResolution::M8 => 8,
            MicroStepResolution::M16 => 16,
            MicroStepResolution::M32 => 32,
            MicroStepResolution::M64 => 64,
            MicroStepResolution::M128 => 128,
            MicroStepResolution::M256 => 256,
        }
    }

    /// Resolution for a micro-steps-per-full-step count
    pub fn try_from_steps(steps: u16) -> Result<Self, Error> {
        match steps {
            1 => Ok(MicroStepResolution::Full),
            2 => Ok(MicroStepResolution::M2),
            4 => Ok(MicroStepResolution::M4),
            8 => Ok(MicroStepResolution::M8),
            16 => Ok(MicroStepResolution::M16),
            32 => Ok(MicroStepResolution::M32),
            64 => Ok(MicroStepResolution::M64),
            128 => Ok(MicroStepResolution::M128),
            256 => Ok(MicroStepResolution::M256),
            _ => Err(Error::InvalidArgument),
        }
    }
}

/// Hardware conditions reported by a stepper driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HardwareEvent {
    /// Motor stall detected (e.g. sensorless load measurement)
    StallDetected,
    /// End stop on the negative travel limit triggered
    LeftEndStopDetected,
    /// End stop on the positive travel limit triggered
    RightEndStopDetected,
    /// Driver fault (overtemperature, short, undervoltage, ...)
    FaultDetected,
}

/// Trait for hardware stepper drivers
///
/// Implementations energize coils and emit step pulses while abstracting
/// the underlying interface (step/dir pins, SPI register writes, ...).
/// All operations are non-blocking apart from the short pin-level setup
/// and pulse times a concrete driver may need.
pub trait StepperDriver {
    /// Energize the coils; does not move the motor
    fn enable(&mut self) -> Result<(), Error>;

    /// Cancel any motion and de-energize the coils
    fn disable(&mut self) -> Result<(), Error>;

    /// Check whether the coils are energized
    fn is_enabled(&self) -> bool;

    /// Emit exactly one micro-step in the given direction
    fn step(&mut self, direction: Direction) -> Result<(), Error>;

    /// Select the micro-step resolution
    ///
    /// Optional capability; the default implementation reports
    /// [`Error::NotImplemented`].
    fn set_micro_step_resolution(&mut self, _resolution: MicroStepResolution) -> Result<(), Error> {
        Err(Error::NotImplemented)
    }

    /// Read the active micro-step resolution
    ///
    /// Optional capability; the default implementation reports
    /// [`Error::NotImplemented`].
    fn micro_step_resolution(&self) -> Result<MicroStepResolution, Error> {
        Err(Error::NotImplemented)
    }
}
