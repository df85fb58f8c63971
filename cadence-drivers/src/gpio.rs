//! Step/dir/enable GPIO driver
//!
//! Drives the common step/dir interface shared by the A4988, DRV8825,
//! TMC2208-in-legacy-mode and similar driver chips: a rising edge on STEP
//! moves one micro-step in the direction selected by DIR, ENABLE gates the
//! output stage. With the optional MS1..MS3 mode pins connected, the driver
//! also selects the micro-step resolution (A4988 truth table, up to 1/16).

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};

use cadence_core::error::Error;
use cadence_core::traits::{Direction, MicroStepResolution, StepperDriver};

/// Pin-level timing configuration
///
/// Defaults follow the A4988 datasheet: 650 ns between a DIR change and the
/// step pulse, and a 2 us high time on STEP (minimum is 1.9 us).
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpioStepperConfig {
    /// STEP high time in nanoseconds
    pub step_pulse_ns: u32,
    /// Delay between setting DIR and pulsing STEP, in nanoseconds
    pub dir_setup_ns: u32,
    /// Swap the DIR pin polarity (wiring-dependent)
    pub invert_dir: bool,
}

impl Default for GpioStepperConfig {
    fn default() -> Self {
        Self {
            step_pulse_ns: 2_000,
            dir_setup_ns: 650,
            invert_dir: false,
        }
    }
}

/// Micro-step mode pins (MS1..MS3) for resolution control
#[derive(Debug)]
pub struct ModePins<MS1, MS2, MS3> {
    ms1: MS1,
    ms2: MS2,
    ms3: MS3,
    resolution: MicroStepResolution,
}

/// Step/dir/enable stepper driver over GPIO
///
/// The `Mode` parameter is `()` for drivers wired without mode pins
/// (resolution control then reports [`Error::NotImplemented`]) or
/// [`ModePins`] when MS1..MS3 are connected.
pub struct GpioStepper<Step, Dir, En, Delay, Mode = ()> {
    step: Step,
    dir: Dir,
    enable: En,
    delay: Delay,
    mode: Mode,
    config: GpioStepperConfig,
    enabled: bool,
}

impl<Step, Dir, En, Delay> GpioStepper<Step, Dir, En, Delay>
where
    Step: OutputPin,
    Dir: OutputPin,
    En: OutputPin,
    Delay: DelayNs,
{
    /// Create a driver from STEP, DIR and ENABLE pins
    ///
    /// The motor starts disabled; call [`StepperDriver::enable`] before
    /// stepping.
    pub fn new(step: Step, dir: Dir, enable: En, delay: Delay, config: GpioStepperConfig) -> Self {
        Self {
            step,
            dir,
            enable,
            delay,
            mode: (),
            config,
            enabled: false,
        }
    }

    /// Attach MS1..MS3 mode pins and select the initial resolution
    pub fn with_mode_pins<MS1, MS2, MS3>(
        self,
        ms1: MS1,
        ms2: MS2,
        ms3: MS3,
        resolution: MicroStepResolution,
    ) -> Result<GpioStepper<Step, Dir, En, Delay, ModePins<MS1, MS2, MS3>>, Error>
    where
        MS1: OutputPin,
        MS2: OutputPin,
        MS3: OutputPin,
    {
        let mut driver = GpioStepper {
            step: self.step,
            dir: self.dir,
            enable: self.enable,
            delay: self.delay,
            mode: ModePins {
                ms1,
                ms2,
                ms3,
                resolution,
            },
            config: self.config,
            enabled: self.enabled,
        };
        driver.apply_resolution(resolution)?;
        Ok(driver)
    }
}

impl<Step, Dir, En, Delay, Mode> GpioStepper<Step, Dir, En, Delay, Mode>
where
    Step: OutputPin,
    Dir: OutputPin,
    En: OutputPin,
    Delay: DelayNs,
{
    /// Release the pins and delay provider
    pub fn release(self) -> (Step, Dir, En, Delay, Mode) {
        (self.step, self.dir, self.enable, self.delay, self.mode)
    }

    fn set_output_stage(&mut self, on: bool) -> Result<(), Error> {
        // ENABLE is active low on the A4988 family.
        let state = if on { PinState::Low } else { PinState::High };
        self.enable.set_state(state).map_err(|_| Error::Io)?;
        self.enabled = on;
        Ok(())
    }

    fn emit_step(&mut self, direction: Direction) -> Result<(), Error> {
        if !self.enabled {
            return Err(Error::NotReady);
        }

        let dir_high = matches!(direction, Direction::Positive) != self.config.invert_dir;
        self.dir
            .set_state(PinState::from(dir_high))
            .map_err(|_| Error::Io)?;
        self.delay.delay_ns(self.config.dir_setup_ns);

        self.step.set_high().map_err(|_| Error::Io)?;
        self.delay.delay_ns(self.config.step_pulse_ns);
        self.step.set_low().map_err(|_| Error::Io)?;

        Ok(())
    }
}

impl<Step, Dir, En, Delay, MS1, MS2, MS3>
    GpioStepper<Step, Dir, En, Delay, ModePins<MS1, MS2, MS3>>
where
    MS1: OutputPin,
    MS2: OutputPin,
    MS3: OutputPin,
{
    fn apply_resolution(&mut self, resolution: MicroStepResolution) -> Result<(), Error> {
        let (ms1, ms2, ms3) = mode_signals(resolution)?;
        self.mode.ms1.set_state(ms1).map_err(|_| Error::Io)?;
        self.mode.ms2.set_state(ms2).map_err(|_| Error::Io)?;
        self.mode.ms3.set_state(ms3).map_err(|_| Error::Io)?;
        self.mode.resolution = resolution;
        Ok(())
    }
}

impl<Step, Dir, En, Delay> StepperDriver for GpioStepper<Step, Dir, En, Delay>
where
    Step: OutputPin,
    Dir: OutputPin,
    En: OutputPin,
    Delay: DelayNs,
{
    fn enable(&mut self) -> Result<(), Error> {
        self.set_output_stage(true)
    }

    fn disable(&mut self) -> Result<(), Error> {
        self.set_output_stage(false)
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn step(&mut self, direction: Direction) -> Result<(), Error> {
        self.emit_step(direction)
    }
}

impl<Step, Dir, En, Delay, MS1, MS2, MS3> StepperDriver
    for GpioStepper<Step, Dir, En, Delay, ModePins<MS1, MS2, MS3>>
where
    Step: OutputPin,
    Dir: OutputPin,
    En: OutputPin,
    Delay: DelayNs,
    MS1: OutputPin,
    MS2: OutputPin,
    MS3: OutputPin,
{
    fn enable(&mut self) -> Result<(), Error> {
        self.set_output_stage(true)
    }

    fn disable(&mut self) -> Result<(), Error> {
        self.set_output_stage(false)
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn step(&mut self, direction: Direction) -> Result<(), Error> {
        self.emit_step(direction)
    }

    fn set_micro_step_resolution(&mut self, resolution: MicroStepResolution) -> Result<(), Error> {
        self.apply_resolution(resolution)
    }

    fn micro_step_resolution(&self) -> Result<MicroStepResolution, Error> {
        Ok(self.mode.resolution)
    }
}

/// MS1..MS3 levels for a resolution, per the A4988 truth table
///
/// The chip only decodes up to 1/16; finer settings are rejected.
fn mode_signals(
    resolution: MicroStepResolution,
) -> Result<(PinState, PinState, PinState), Error> {
    use PinState::{High, Low};

    match resolution {
        MicroStepResolution::Full => Ok((Low, Low, Low)),
        MicroStepResolution::M2 => Ok((High, Low, Low)),
        MicroStepResolution::M4 => Ok((Low, High, Low)),
        MicroStepResolution::M8 => Ok((High, High, Low)),
        MicroStepResolution::M16 => Ok((High, High, High)),
        _ => Err(Error::InvalidArgument),
    }
}
