//! Motion controller state machine

use heapless::Deque;

use crate::error::Error;
use crate::event::Event;
use crate::ramp::RampGenerator;
use crate::traits::{Direction, HardwareEvent, StepperDriver, TimingSource};

/// Capacity of the controller's event queue
///
/// Events past this depth are dropped; the queue is drained by the
/// application between commands, so the depth only has to cover bursts.
pub const EVENT_QUEUE_DEPTH: usize = 8;

/// Controller motion states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionState {
    /// At rest, no steps scheduled
    Idle,
    /// Executing a finite move
    RunningFinite,
    /// Executing an infinite run
    RunningInfinite,
    /// Decelerating to rest after a stop request
    Decelerating,
    /// Decelerating to rest before resuming in the opposite direction
    Reversing,
}

/// Motion controller for a single stepper motor
///
/// Drives a [`StepperDriver`] through a [`TimingSource`] using the bound
/// [`RampGenerator`] to shape the velocity. All mutators are non-blocking:
/// they plan, arm the timer and return; motion proceeds on [`on_tick`]
/// calls made by whoever services the timer.
///
/// Events (move completion, stop completion, forwarded hardware conditions)
/// are queued in production order and drained with [`take_event`].
///
/// [`on_tick`]: MotionController::on_tick
/// [`take_event`]: MotionController::take_event
pub struct MotionController<D, T, R> {
    device: D,
    timer: T,
    ramp: Option<R>,

    position: i32,
    direction: Direction,
    /// Steps remaining in the commanded move. `i32::MAX` / `i32::MIN` are
    /// the infinite-run sentinels and are never decremented.
    relative_target: i32,
    state: MotionState,

    events: Deque<Event, EVENT_QUEUE_DEPTH>,
}

impl<D, T, R> MotionController<D, T, R>
where
    D: StepperDriver,
    T: TimingSource,
    R: RampGenerator,
{
    /// Create a controller at rest, position 0, positive direction
    pub fn new(device: D, timer: T) -> Self {
        Self {
            device,
            timer,
            ramp: None,
            position: 0,
            direction: Direction::Positive,
            relative_target: 0,
            state: MotionState::Idle,
            events: Deque::new(),
        }
    }

    /// Bind the ramp used by subsequent moves
    ///
    /// Swapping the ramp while a move is in flight cancels that move hard
    /// (timer disarmed, plan cleared) since the new ramp has no knowledge
    /// of the old plan.
    pub fn set_ramp(&mut self, ramp: R) {
        if self.relative_target != 0 {
            self.disarm_timer();
            self.relative_target = 0;
            self.state = MotionState::Idle;
        }
        self.ramp = Some(ramp);
    }

    /// The bound ramp, if any
    pub fn ramp(&self) -> Option<&R> {
        self.ramp.as_ref()
    }

    /// Replace the position counter; no motion side effect
    pub fn set_position(&mut self, position: i32) {
        self.position = position;
    }

    /// Current position in micro-steps
    ///
    /// May lag the physical rotor by the one step currently in flight.
    pub fn position(&self) -> i32 {
        self.position
    }

    /// Check whether a move is in progress
    pub fn is_moving(&self) -> bool {
        self.relative_target != 0
    }

    /// Current motion state
    pub fn state(&self) -> MotionState {
        self.state
    }

    /// Current travel direction
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Pop the oldest pending event
    pub fn take_event(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    /// Forward a hardware condition reported by the stepper driver
    ///
    /// The event is delivered unchanged through the same queue as motion
    /// events, in arrival order.
    pub fn notify_hardware_event(&mut self, event: HardwareEvent) {
        self.push_event(Event::Hardware(event));
    }

    /// Energize the motor
    pub fn enable(&mut self) -> Result<(), Error> {
        self.device.enable()
    }

    /// De-energize the motor, cancelling any in-flight motion immediately
    ///
    /// The position counter is left as-is; it may be out of sync with the
    /// rotor if the motor was moving.
    pub fn disable(&mut self) -> Result<(), Error> {
        self.device.disable()?;
        self.disarm_timer();
        if let Some(ramp) = self.ramp.as_mut() {
            ramp.reset();
        }
        self.relative_target = 0;
        self.state = MotionState::Idle;
        Ok(())
    }

    /// Plan a relative move of `micro_steps` steps
    ///
    /// The sign selects the direction. A move opposing the current travel
    /// direction first decelerates to rest, then resumes toward the new
    /// target; a move in the current direction replaces the in-flight plan.
    /// `move_by(0)` completes immediately, emitting [`Event::StepsCompleted`]
    /// without a single tick.
    pub fn move_by(&mut self, micro_steps: i32) -> Result<(), Error> {
        if !self.device.is_enabled() {
            return Err(Error::Canceled);
        }
        let Some(ramp) = self.ramp.as_mut() else {
            return Err(Error::NotReady);
        };

        let direction = Direction::from_sign(micro_steps);
        if micro_steps != 0 && self.relative_target != 0 && direction != self.direction {
            ramp.prepare_stop()?;
            self.relative_target = micro_steps;
            self.state = MotionState::Reversing;
            return Ok(());
        }

        ramp.prepare_move(micro_steps.unsigned_abs())?;
        let first = ramp.next_interval();
        if micro_steps != 0 {
            self.direction = direction;
        }
        self.relative_target = micro_steps;
        self.arm_or_complete(first);
        Ok(())
    }

    /// Plan a move to the absolute position `target`
    pub fn move_to(&mut self, target: i32) -> Result<(), Error> {
        let delta = (target as i64 - self.position as i64)
            .clamp(i32::MIN as i64 + 1, i32::MAX as i64 - 1) as i32;
        self.move_by(delta)
    }

    /// Start an infinite run in the given direction
    ///
    /// The relative target is pegged at the sentinel and never decremented;
    /// the run continues until [`stop`], [`disable`] or a new move.
    ///
    /// [`stop`]: MotionController::stop
    /// [`disable`]: MotionController::disable
    pub fn run(&mut self, direction: Direction) -> Result<(), Error> {
        if !self.device.is_enabled() {
            return Err(Error::Canceled);
        }
        let Some(ramp) = self.ramp.as_mut() else {
            return Err(Error::NotReady);
        };

        let sentinel = match direction {
            Direction::Positive => i32::MAX,
            Direction::Negative => i32::MIN,
        };

        if self.relative_target != 0 && direction != self.direction {
            ramp.prepare_stop()?;
            self.relative_target = sentinel;
            self.state = MotionState::Reversing;
            return Ok(());
        }

        ramp.prepare_move(i32::MAX as u32)?;
        let first = ramp.next_interval();
        self.direction = direction;
        self.relative_target = sentinel;
        self.arm_or_complete(first);
        Ok(())
    }

    /// Decelerate to rest using the bound ramp
    ///
    /// Returns immediately; [`Event::Stopped`] is emitted once the
    /// deceleration completes (right away if no deceleration is needed).
    /// A no-op when nothing is moving.
    pub fn stop(&mut self) -> Result<(), Error> {
        if self.relative_target == 0 {
            return Ok(());
        }
        let Some(ramp) = self.ramp.as_mut() else {
            return Ok(());
        };

        let decel_steps = ramp.prepare_stop()?;
        if decel_steps == 0 {
            self.disarm_timer();
            self.relative_target = 0;
            self.state = MotionState::Idle;
            self.push_event(Event::Stopped);
            return Ok(());
        }

        let first = ramp.next_interval();
        let signed_steps = decel_steps.min(i32::MAX as u32) as i32;
        self.relative_target = match self.direction {
            Direction::Positive => signed_steps,
            Direction::Negative => -signed_steps,
        };
        self.state = MotionState::Decelerating;
        if first > 0 {
            self.arm_timer(first);
        } else {
            self.disarm_timer();
            self.relative_target = 0;
            self.state = MotionState::Idle;
            self.push_event(Event::Stopped);
        }
        Ok(())
    }

    /// Advance the controller by one timer tick
    ///
    /// Called by the owner of the timing source when the armed interval has
    /// elapsed: emits one micro-step, updates position and target, and
    /// re-arms the timer with the ramp's next interval until the move
    /// completes.
    pub fn on_tick(&mut self) {
        if self.relative_target == 0 && self.state == MotionState::Idle {
            self.disarm_timer();
            return;
        }

        if let Err(_error) = self.device.step(self.direction) {
            #[cfg(feature = "defmt")]
            defmt::warn!("step emit failed: {}", _error);
        }

        self.position = self.position.wrapping_add(self.direction.delta());
        if self.relative_target != i32::MAX && self.relative_target != i32::MIN {
            self.relative_target = self.relative_target.wrapping_sub(self.direction.delta());
        }

        let Some(ramp) = self.ramp.as_mut() else {
            self.disarm_timer();
            return;
        };

        let next = ramp.next_interval();
        if next > 0 {
            self.arm_timer(next);
            return;
        }
        self.disarm_timer();

        if self.relative_target != 0 {
            self.resume_pending_move();
        } else {
            let event = if self.state == MotionState::Decelerating {
                Event::Stopped
            } else {
                Event::StepsCompleted
            };
            self.state = MotionState::Idle;
            self.push_event(event);
        }
    }

    /// Borrow the hardware stepper
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Borrow the hardware stepper mutably (for driver-specific control)
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Borrow the timing source
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Borrow the timing source mutably
    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// Start the move held in `relative_target` after a deceleration ended
    ///
    /// This is the boundary where the travel direction may change: the ramp
    /// has no steps scheduled here.
    fn resume_pending_move(&mut self) {
        self.direction = Direction::from_sign(self.relative_target);
        let steps = self.relative_target.unsigned_abs();

        let Some(ramp) = self.ramp.as_mut() else {
            return;
        };
        match ramp.prepare_move(steps) {
            Ok(_) => {
                let first = ramp.next_interval();
                self.arm_or_complete(first);
            }
            Err(_error) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("pending move replan failed: {}", _error);
                self.relative_target = 0;
                self.state = MotionState::Idle;
            }
        }
    }

    /// Arm the timer for a freshly planned move, or complete it on the spot
    /// when the ramp has nothing to emit
    fn arm_or_complete(&mut self, first_interval: u64) {
        let infinite = self.relative_target == i32::MAX || self.relative_target == i32::MIN;
        if first_interval > 0 {
            self.state = if infinite {
                MotionState::RunningInfinite
            } else {
                MotionState::RunningFinite
            };
            self.arm_timer(first_interval);
        } else {
            self.disarm_timer();
            self.relative_target = 0;
            self.state = MotionState::Idle;
            self.push_event(Event::StepsCompleted);
        }
    }

    fn arm_timer(&mut self, interval_ns: u64) {
        if let Err(_error) = self.timer.start(interval_ns) {
            #[cfg(feature = "defmt")]
            defmt::warn!("timer arm failed: {}", _error);
        }
    }

    fn disarm_timer(&mut self) {
        if let Err(_error) = self.timer.stop() {
            #[cfg(feature = "defmt")]
            defmt::warn!("timer disarm failed: {}", _error);
        }
    }

    fn push_event(&mut self, event: Event) {
        if let Err(_dropped) = self.events.push_back(event) {
            #[cfg(feature = "defmt")]
            defmt::warn!("event queue full, dropped {}", _dropped);
        }
    }
}
