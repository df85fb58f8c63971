//! Board-agnostic stepper motion control
//!
//! This crate contains everything needed to turn high-level motion commands
//! (move by N micro-steps, move to a position, run continuously, stop) into
//! a precisely-timed sequence of single-step pulses:
//!
//! - Hardware abstraction traits (stepper driver, timing source)
//! - Ramp generators (constant velocity, trapezoidal) using integer-only
//!   AVR446-style interval math
//! - The motion controller state machine (position, direction, events)
//! - An interrupt-safe cell for sharing a controller with a timer ISR
//!
//! Nothing in here touches hardware. Timers and step/dir pins come in
//! through the traits; `cadence-drivers` provides pin-level drivers and
//! `cadence-sim` a host-side simulation harness.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod error;
pub mod event;
pub mod motion;
pub mod ramp;
pub mod shared;
pub mod traits;

pub use error::Error;
pub use event::Event;
pub use motion::{MotionController, MotionState};
pub use ramp::RampGenerator;
pub use traits::{Direction, HardwareEvent, MicroStepResolution, StepperDriver, TimingSource};
