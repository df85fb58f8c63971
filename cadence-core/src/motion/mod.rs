//! Motion controller
//!
//! Owns position, direction and the relative target, and orchestrates the
//! timing source and ramp generator: on each tick it commands the hardware
//! stepper to emit one micro-step, updates position, asks the ramp for the
//! next interval and re-arms the timer until the move completes.

mod controller;

pub use controller::{MotionController, MotionState, EVENT_QUEUE_DEPTH};
