//! Hardware abstraction traits
//!
//! These traits decouple the motion controller from concrete hardware:
//! the stepper driver knows how to emit one micro-step, the timing source
//! knows how to call back after an interval. Implementations live in
//! `cadence-drivers` (real pins) and `cadence-sim` (virtual clock).

pub mod stepper;
pub mod timing;

pub use stepper::{Direction, HardwareEvent, MicroStepResolution, StepperDriver};
pub use timing::TimingSource;
