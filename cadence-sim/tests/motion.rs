//! End-to-end motion scenarios against the virtual clock

use cadence_core::event::Event;
use cadence_core::motion::{MotionController, MotionState};
use cadence_core::ramp::{Constant, RampGenerator, Trapezoidal, TrapezoidalProfile};
use cadence_core::traits::{Direction, HardwareEvent, TimingSource};

use cadence_sim::{SimController, SimStepper, Simulator, VirtualTimer};

fn constant_controller(interval_ns: u64) -> SimController<Constant> {
    let mut controller = MotionController::new(SimStepper::new(), VirtualTimer::new());
    controller.set_ramp(Constant::new(interval_ns));
    controller.enable().unwrap();
    controller
}

fn trapezoidal_controller(
    acceleration: u32,
    deceleration: u32,
    interval_ns: u64,
) -> SimController<Trapezoidal> {
    let mut controller = MotionController::new(SimStepper::new(), VirtualTimer::new());
    controller.set_ramp(Trapezoidal::new(TrapezoidalProfile {
        interval_ns,
        acceleration,
        deceleration,
    }));
    controller.enable().unwrap();
    controller
}

#[test]
fn constant_ramp_runs_exact_steps_at_exact_times() {
    let mut controller = constant_controller(1_000_000);
    controller.set_position(0);
    controller.move_by(10).unwrap();

    let report = Simulator::run_until_idle(&mut controller, 100);
    assert_eq!(report.ticks, 10);
    assert_eq!(report.elapsed_ns, 10_000_000);
    assert_eq!(report.events, vec![Event::StepsCompleted]);
    assert_eq!(controller.position(), 10);
    assert_eq!(controller.device().steps().len(), 10);
}

#[test]
fn short_trapezoidal_move_is_a_symmetric_triangle() {
    let mut controller = trapezoidal_controller(500, 500, 1_000_000);
    controller.move_by(20).unwrap();

    // First interval is the initial interval for a = 500 steps/s^2.
    assert_eq!(controller.timer().interval_ns(), 42_753_993);

    let report = Simulator::run_until_idle(&mut controller, 100);
    assert_eq!(report.ticks, 20);
    assert_eq!(report.elapsed_ns, 360_925_246);
    assert_eq!(controller.position(), 20);
    assert_eq!(report.events, vec![Event::StepsCompleted]);
}

#[test]
fn long_trapezoidal_move_splits_budget_across_slopes() {
    let mut controller = trapezoidal_controller(1000, 1000, 500_000);
    controller.move_by(1000).unwrap();

    let report = Simulator::run_until_idle(&mut controller, 2000);
    assert_eq!(report.ticks, 1000);
    assert_eq!(controller.position(), 1000);
}

#[test]
fn move_to_lands_exactly_and_is_idempotent() {
    let mut controller = trapezoidal_controller(500, 500, 1_000_000);
    controller.set_position(250);
    controller.move_to(-50).unwrap();

    Simulator::run_until_idle(&mut controller, 2000);
    assert_eq!(controller.position(), -50);

    // Replaying the same target moves nothing.
    controller.move_to(-50).unwrap();
    let report = Simulator::run_until_idle(&mut controller, 10);
    assert_eq!(report.ticks, 0);
    assert_eq!(report.events, vec![Event::StepsCompleted]);
    assert_eq!(controller.position(), -50);
}

#[test]
fn move_by_zero_completes_with_no_ticks() {
    let mut controller = constant_controller(1_000_000);
    controller.move_by(0).unwrap();

    let report = Simulator::run_until_idle(&mut controller, 10);
    assert_eq!(report.ticks, 0);
    assert_eq!(report.events, vec![Event::StepsCompleted]);
}

#[test]
fn back_and_forth_returns_to_start() {
    let mut controller = trapezoidal_controller(800, 800, 750_000);
    controller.move_by(333).unwrap();
    Simulator::run_until_idle(&mut controller, 5000);
    controller.move_by(-333).unwrap();
    Simulator::run_until_idle(&mut controller, 5000);

    assert_eq!(controller.position(), 0);
    assert_eq!(controller.device().net_steps(), 0);
}

#[test]
fn reversal_during_cruise_decelerates_then_pays_back_the_overshoot() {
    let mut controller = trapezoidal_controller(500, 500, 1_000_000);
    controller.move_by(5000).unwrap();

    // Into the cruise phase: 1000 acceleration steps, then constant speed.
    let report = Simulator::run_ticks(&mut controller, 2000);
    assert!(report.events.is_empty());
    let reversal_position = controller.position();

    controller.move_by(-1000).unwrap();
    assert_eq!(controller.state(), MotionState::Reversing);

    let report = Simulator::run_until_idle(&mut controller, 20_000);
    // One deceleration with no Stopped event, then the reversed move; the
    // commanded displacement is exact despite the overshoot.
    assert_eq!(report.events, vec![Event::StepsCompleted]);
    assert_eq!(controller.position(), reversal_position - 1000);
    assert_eq!(controller.state(), MotionState::Idle);
}

#[test]
fn stop_during_acceleration_takes_the_closed_form_step_count() {
    let mut controller = trapezoidal_controller(500, 500, 1_000_000);
    controller.run(Direction::Positive).unwrap();
    assert_eq!(controller.state(), MotionState::RunningInfinite);

    Simulator::run_ticks(&mut controller, 50);
    assert_eq!(controller.position(), 50);

    // Speed after 50 ramp steps is sqrt(2 * a * n); stopping takes about n
    // more steps at the symmetric rate.
    let interval = controller
        .ramp()
        .map(|ramp| ramp.current_interval())
        .unwrap();
    let speed = 1_000_000_000 / interval;
    let expected_decel_steps = (speed * speed / 1000) as i32;

    controller.stop().unwrap();
    assert_eq!(controller.state(), MotionState::Decelerating);

    let report = Simulator::run_until_idle(&mut controller, 1000);
    assert_eq!(report.ticks, expected_decel_steps as usize);
    assert_eq!(report.events, vec![Event::Stopped]);
    assert_eq!(controller.position(), 50 + expected_decel_steps);
}

#[test]
fn run_and_stop_terminate_in_finite_time() {
    let mut controller = trapezoidal_controller(2000, 2000, 200_000);
    controller.run(Direction::Negative).unwrap();
    Simulator::run_ticks(&mut controller, 10_000);
    assert!(controller.is_moving());

    controller.stop().unwrap();
    let report = Simulator::run_until_idle(&mut controller, 20_000);
    assert!(report.ticks < 20_000);
    assert_eq!(report.events, vec![Event::Stopped]);
    assert!(!controller.is_moving());
}

#[test]
fn infinite_run_is_cancelled_by_disable() {
    let mut controller = constant_controller(1_000_000);
    controller.run(Direction::Positive).unwrap();

    Simulator::run_ticks(&mut controller, 500);
    assert!(controller.is_moving());
    assert_eq!(controller.position(), 500);

    controller.disable().unwrap();
    assert!(!controller.is_moving());
    assert!(!controller.timer().is_armed());
    assert_eq!(controller.position(), 500);

    // The next command observes an idle, disabled controller.
    assert!(controller.move_by(10).is_err());
}

#[test]
fn step_failures_do_not_derail_accounting() {
    let mut controller = constant_controller(1_000_000);
    controller.device_mut().inject_step_failures(4);
    controller.move_by(10).unwrap();

    let report = Simulator::run_until_idle(&mut controller, 100);
    assert_eq!(report.ticks, 10);
    assert_eq!(report.events, vec![Event::StepsCompleted]);
    // Intended motion is accounted; the journal shows the missing pulses.
    assert_eq!(controller.position(), 10);
    assert_eq!(controller.device().steps().len(), 6);
}

#[test]
fn hardware_events_interleave_with_motion_events() {
    let mut controller = constant_controller(1_000_000);
    controller.notify_hardware_event(HardwareEvent::LeftEndStopDetected);
    controller.move_by(3).unwrap();

    let report = Simulator::run_until_idle(&mut controller, 10);
    assert_eq!(
        report.events,
        vec![
            Event::Hardware(HardwareEvent::LeftEndStopDetected),
            Event::StepsCompleted,
        ]
    );
}

#[test]
fn trapezoidal_timeline_accelerates_cruises_and_decelerates() {
    let mut controller = trapezoidal_controller(500, 500, 1_000_000);
    controller.move_by(5000).unwrap();

    // Record every armed interval along the way.
    let mut intervals = Vec::new();
    loop {
        let interval = controller.timer().interval_ns();
        if interval == 0 {
            break;
        }
        intervals.push(interval);
        controller.on_tick();
    }

    assert_eq!(intervals.len(), 5000);
    assert!(intervals[..1000].windows(2).all(|w| w[0] >= w[1]));
    assert!(intervals[1000..4000].iter().all(|&i| i == 1_000_000));
    assert!(intervals[4000..].windows(2).all(|w| w[0] <= w[1]));
}
