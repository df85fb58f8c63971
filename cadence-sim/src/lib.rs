//! Host-side simulation harness
//!
//! Runs a [`MotionController`] against a virtual clock: [`VirtualTimer`]
//! stands in for the hardware step timer, [`SimStepper`] records every pulse
//! the controller emits, and [`Simulator`] advances virtual time tick by
//! tick, collecting events and elapsed nanoseconds. Nothing here sleeps;
//! simulated seconds of motion run in microseconds of test time.

use cadence_core::error::Error;
use cadence_core::event::Event;
use cadence_core::motion::MotionController;
use cadence_core::ramp::RampGenerator;
use cadence_core::traits::{Direction, MicroStepResolution, StepperDriver, TimingSource};

/// Virtual-clock timing source
///
/// Holds the armed interval; the harness reads it to know how far to
/// advance the clock before firing the next tick.
#[derive(Debug, Default)]
pub struct VirtualTimer {
    interval_ns: u64,
}

impl VirtualTimer {
    /// Create a disarmed timer
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimingSource for VirtualTimer {
    fn start(&mut self, interval_ns: u64) -> Result<(), Error> {
        self.interval_ns = interval_ns;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Error> {
        self.interval_ns = 0;
        Ok(())
    }

    fn interval_ns(&self) -> u64 {
        self.interval_ns
    }
}

/// Step-recording fake stepper
///
/// Keeps a journal of every emitted pulse and supports fault injection to
/// exercise the controller's log-and-continue paths.
#[derive(Debug)]
pub struct SimStepper {
    enabled: bool,
    steps: Vec<Direction>,
    resolution: MicroStepResolution,
    fail_next_steps: usize,
}

impl Default for SimStepper {
    fn default() -> Self {
        Self::new()
    }
}

impl SimStepper {
    /// Create a disabled stepper with an empty journal
    pub fn new() -> Self {
        Self {
            enabled: false,
            steps: Vec::new(),
            resolution: MicroStepResolution::Full,
            fail_next_steps: 0,
        }
    }

    /// All pulses emitted so far, in order
    pub fn steps(&self) -> &[Direction] {
        &self.steps
    }

    /// Net displacement of the journal in micro-steps
    pub fn net_steps(&self) -> i64 {
        self.steps
            .iter()
            .map(|direction| direction.delta() as i64)
            .sum()
    }

    /// Make the next `count` step pulses fail with [`Error::Io`]
    pub fn inject_step_failures(&mut self, count: usize) {
        self.fail_next_steps = count;
    }
}

impl StepperDriver for SimStepper {
    fn enable(&mut self) -> Result<(), Error> {
        self.enabled = true;
        Ok(())
    }

    fn disable(&mut self) -> Result<(), Error> {
        self.enabled = false;
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn step(&mut self, direction: Direction) -> Result<(), Error> {
        if !self.enabled {
            return Err(Error::NotReady);
        }
        if self.fail_next_steps > 0 {
            self.fail_next_steps -= 1;
            return Err(Error::Io);
        }
        self.steps.push(direction);
        Ok(())
    }

    fn set_micro_step_resolution(&mut self, resolution: MicroStepResolution) -> Result<(), Error> {
        self.resolution = resolution;
        Ok(())
    }

    fn micro_step_resolution(&self) -> Result<MicroStepResolution, Error> {
        Ok(self.resolution)
    }
}

/// A controller wired to the simulated device and timer
pub type SimController<R> = MotionController<SimStepper, VirtualTimer, R>;

/// What happened while the simulator ran
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Ticks fired
    pub ticks: usize,
    /// Virtual nanoseconds elapsed across those ticks
    pub elapsed_ns: u64,
    /// Events drained from the controller, in production order
    pub events: Vec<Event>,
}

/// Tick-by-tick simulation driver
pub struct Simulator;

impl Simulator {
    /// Fire ticks until the controller disarms its timer
    ///
    /// `max_ticks` bounds runaway plans (an infinite run never disarms by
    /// itself); hitting the bound is reported, not an error, so tests can
    /// assert on it either way.
    pub fn run_until_idle<R: RampGenerator>(
        controller: &mut SimController<R>,
        max_ticks: usize,
    ) -> RunReport {
        let mut report = RunReport::default();
        Self::drain_events(controller, &mut report);

        while report.ticks < max_ticks {
            let interval = controller.timer().interval_ns();
            if interval == 0 {
                break;
            }
            report.elapsed_ns += interval;
            report.ticks += 1;
            controller.on_tick();
            Self::drain_events(controller, &mut report);
        }
        report
    }

    /// Fire exactly `ticks` ticks (or fewer if the controller goes idle)
    pub fn run_ticks<R: RampGenerator>(
        controller: &mut SimController<R>,
        ticks: usize,
    ) -> RunReport {
        let mut report = RunReport::default();
        Self::drain_events(controller, &mut report);

        for _ in 0..ticks {
            let interval = controller.timer().interval_ns();
            if interval == 0 {
                break;
            }
            report.elapsed_ns += interval;
            report.ticks += 1;
            controller.on_tick();
            Self::drain_events(controller, &mut report);
        }
        report
    }

    fn drain_events<R: RampGenerator>(controller: &mut SimController<R>, report: &mut RunReport) {
        while let Some(event) = controller.take_event() {
            report.events.push(event);
        }
    }
}
