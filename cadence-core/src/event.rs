//! Events emitted by the motion controller
//!
//! Motion events are produced by the controller itself; hardware events are
//! forwarded unchanged from the stepper driver. The two kinds are disjoint.

use crate::traits::HardwareEvent;

/// Events delivered through [`MotionController::take_event`]
///
/// [`MotionController::take_event`]: crate::motion::MotionController::take_event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Motion events
    /// A finite move ran out of steps and the motor is at rest
    StepsCompleted,
    /// A requested decelerated stop has completed
    Stopped,

    // Hardware events, forwarded verbatim from the stepper driver
    /// Hardware condition reported by the driver
    Hardware(HardwareEvent),
}

impl Event {
    /// Check if this event was produced by the motion controller
    pub fn is_motion_event(&self) -> bool {
        matches!(self, Event::StepsCompleted | Event::Stopped)
    }

    /// Check if this event was forwarded from the hardware stepper
    pub fn is_hardware_event(&self) -> bool {
        matches!(self, Event::Hardware(_))
    }
}

impl From<HardwareEvent> for Event {
    fn from(event: HardwareEvent) -> Self {
        Event::Hardware(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motion_events() {
        assert!(Event::StepsCompleted.is_motion_event());
        assert!(Event::Stopped.is_motion_event());
        assert!(!Event::Hardware(HardwareEvent::StallDetected).is_motion_event());
    }

    #[test]
    fn test_hardware_events() {
        assert!(Event::Hardware(HardwareEvent::FaultDetected).is_hardware_event());
        assert!(!Event::StepsCompleted.is_hardware_event());
    }

    #[test]
    fn test_forwarding_preserves_kind() {
        let event: Event = HardwareEvent::LeftEndStopDetected.into();
        assert_eq!(event, Event::Hardware(HardwareEvent::LeftEndStopDetected));
    }
}
