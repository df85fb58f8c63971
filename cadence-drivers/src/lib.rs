//! Hardware stepper driver implementations
//!
//! Drivers implement the [`StepperDriver`] contract from `cadence-core` on
//! top of `embedded-hal` pins, so they work on any platform with an
//! `OutputPin` implementation.
//!
//! [`StepperDriver`]: cadence_core::StepperDriver

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod gpio;

pub use gpio::{GpioStepper, GpioStepperConfig, ModePins};
