//! starting / stopping semantics against simulated hardware.

use std::time::Duration;

use vctl_common::hardware::HardwareError;
use vctl_controllers::control::{Controller, MultiJointVelocityController, SingleJointController};
use vctl_controllers::error::ControllerError;
use vctl_controllers::state::{LifecycleState, TransitionResult};
use vctl_hal::SimulatedJointInterface;

use super::arm;

const DT: Duration = Duration::from_millis(1);

#[test]
fn starting_resets_command_to_zero() {
    let mut hw = SimulatedJointInterface::new(["j1", "j2"]);
    let mut ctrl = MultiJointVelocityController::init(&mut hw, &["j1", "j2"], &arm()).unwrap();
    let tx = ctrl.command_sender();

    ctrl.starting(Duration::ZERO);
    tx.send(&[0.5, 1.5]).unwrap();
    ctrl.update(DT, DT);
    assert_eq!(ctrl.output(), &[0.5, 1.5]);

    ctrl.stopping(DT * 2);
    ctrl.starting(DT * 3);
    assert_eq!(ctrl.command(), &[0.0, 0.0]);

    // No command since starting: zero output.
    ctrl.update(DT * 4, DT);
    assert_eq!(ctrl.output(), &[0.0, 0.0]);
}

#[test]
fn command_sent_before_starting_is_ignored() {
    let mut hw = SimulatedJointInterface::new(["j1"]);
    let probe = hw.probe("j1").unwrap();
    let mut ctrl = SingleJointController::init(&mut hw, "j1", &arm()).unwrap();

    ctrl.command_sender().send_scalar(0.9).unwrap();
    assert_eq!(ctrl.starting(Duration::ZERO), TransitionResult::Ok(LifecycleState::Running));
    ctrl.update(DT, DT);
    assert_eq!(probe.command(), 0.0);

    ctrl.command_sender().send_scalar(0.9).unwrap();
    ctrl.update(DT * 2, DT);
    assert_eq!(probe.command(), 0.9);
}

#[test]
fn repeated_starting_keeps_running_command() {
    let mut hw = SimulatedJointInterface::new(["j1", "j2"]);
    let probes = [hw.probe("j1").unwrap(), hw.probe("j2").unwrap()];
    let mut ctrl = MultiJointVelocityController::init(&mut hw, &["j1", "j2"], &arm()).unwrap();

    ctrl.starting(Duration::ZERO);
    ctrl.command_sender().send(&[0.5, -1.5]).unwrap();
    ctrl.update(DT, DT);

    assert!(matches!(ctrl.starting(DT * 2), TransitionResult::Rejected(_)));
    assert_eq!(ctrl.lifecycle(), LifecycleState::Running);
    assert_eq!(ctrl.command(), &[0.5, -1.5]);

    ctrl.update(DT * 3, DT);
    assert_eq!(ctrl.output(), &[0.5, -1.5]);
    assert_eq!(probes[0].command(), 0.5);
    assert_eq!(probes[1].command(), -1.5);
}

#[test]
fn stopping_drives_every_handle_to_zero() {
    let mut hw = SimulatedJointInterface::new(["j1", "j2"]);
    let probes = [hw.probe("j1").unwrap(), hw.probe("j2").unwrap()];
    let mut ctrl = MultiJointVelocityController::init(&mut hw, &["j1", "j2"], &arm()).unwrap();

    ctrl.starting(Duration::ZERO);
    ctrl.command_sender().send(&[-0.8, 5.0]).unwrap();
    ctrl.update(DT, DT);
    assert_eq!(probes[1].command(), 2.0);

    assert_eq!(ctrl.stopping(DT * 2), TransitionResult::Ok(LifecycleState::Stopped));
    for probe in &probes {
        assert_eq!(probe.command(), 0.0);
    }

    // Updates after stopping do not touch the hardware.
    let writes = probes[0].writes();
    ctrl.update(DT * 3, DT);
    assert_eq!(probes[0].writes(), writes);
}

#[test]
fn stopping_writes_zero_even_when_not_running() {
    let mut hw = SimulatedJointInterface::new(["j1"]);
    let probe = hw.probe("j1").unwrap();
    let mut ctrl = SingleJointController::init(&mut hw, "j1", &arm()).unwrap();

    assert!(matches!(ctrl.stopping(Duration::ZERO), TransitionResult::Rejected(_)));
    assert_eq!(probe.writes(), 1);
    assert_eq!(probe.command(), 0.0);
    assert_eq!(ctrl.lifecycle(), LifecycleState::Initialized);
}

#[test]
fn unknown_joint_never_reaches_running() {
    let mut hw = SimulatedJointInterface::new(["j1", "j2"]);

    let err = MultiJointVelocityController::init(&mut hw, &["j1", "ghost"], &arm());
    assert!(matches!(err, Err(ControllerError::JointNotInModel(ref n)) if n == "ghost"));

    // In the description, absent from the hardware.
    let mut partial = SimulatedJointInterface::new(["j1"]);
    let err = SingleJointController::init(&mut partial, "j2", &arm());
    assert!(matches!(
        err,
        Err(ControllerError::Hardware(HardwareError::UnknownJoint(_)))
    ));
}

#[test]
fn handles_released_when_controller_dropped() {
    let mut hw = SimulatedJointInterface::new(["j1"]);
    let ctrl = SingleJointController::init(&mut hw, "j1", &arm()).unwrap();
    assert!(SingleJointController::init(&mut hw, "j1", &arm()).is_err());

    drop(ctrl);
    assert!(SingleJointController::init(&mut hw, "j1", &arm()).is_ok());
}
