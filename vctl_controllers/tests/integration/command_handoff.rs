//! Command handoff: producer threads → mailbox → RT update.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use vctl_common::kinematics::KinematicModel;
use vctl_controllers::control::{Controller, MultiJointVelocityController};
use vctl_controllers::error::CommandError;
use vctl_hal::SimulatedJointInterface;

use super::arm;

const DT: Duration = Duration::from_millis(1);

/// `count` joints without a velocity bound.
fn unbounded(count: usize) -> (KinematicModel, Vec<String>) {
    let names: Vec<String> = (0..count).map(|i| format!("j{i}")).collect();
    let mut toml = String::new();
    for name in &names {
        toml.push_str(&format!(
            "[[joints]]\nname = \"{name}\"\nlimits = {{ velocity = inf }}\n\n"
        ));
    }
    (KinematicModel::from_toml(&toml).unwrap(), names)
}

#[test]
fn two_joint_vector_is_saturated_per_joint() {
    let mut hw = SimulatedJointInterface::new(["j1", "j2"]);
    let (p1, p2) = (hw.probe("j1").unwrap(), hw.probe("j2").unwrap());
    let mut ctrl = MultiJointVelocityController::init(&mut hw, &["j1", "j2"], &arm()).unwrap();

    ctrl.starting(Duration::ZERO);
    ctrl.command_sender().send(&[1.5, -3.0]).unwrap();
    ctrl.update(DT, DT);

    assert_eq!(p1.command(), 1.0);
    assert_eq!(p2.command(), -2.0);
}

#[test]
fn command_published_between_cycles_is_applied_next_cycle() {
    let mut hw = SimulatedJointInterface::new(["j1", "j2"]);
    let mut ctrl = MultiJointVelocityController::init(&mut hw, &["j1", "j2"], &arm()).unwrap();
    let tx = ctrl.command_sender();

    ctrl.starting(Duration::ZERO);
    ctrl.update(DT, DT);
    assert_eq!(ctrl.output(), &[0.0, 0.0]);

    tx.send(&[0.25, -0.5]).unwrap();
    ctrl.update(DT * 2, DT);
    assert_eq!(ctrl.output(), &[0.25, -0.5]);

    // No new command: the previous one stays in effect.
    ctrl.update(DT * 3, DT);
    assert_eq!(ctrl.output(), &[0.25, -0.5]);
}

#[test]
fn length_mismatch_keeps_previous_command() {
    let mut hw = SimulatedJointInterface::new(["j1", "j2"]);
    let mut ctrl = MultiJointVelocityController::init(&mut hw, &["j1", "j2"], &arm()).unwrap();
    let tx = ctrl.command_sender();

    ctrl.starting(Duration::ZERO);
    tx.send(&[0.5, 0.5]).unwrap();
    ctrl.update(DT, DT);

    assert_eq!(
        tx.send(&[0.1, 0.2, 0.3]),
        Err(CommandError::LengthMismatch {
            expected: 2,
            actual: 3
        })
    );
    ctrl.update(DT * 2, DT);
    assert_eq!(ctrl.output(), &[0.5, 0.5]);
}

#[test]
fn concurrent_writer_never_produces_torn_vector() {
    const JOINTS: usize = 16;
    const COMMANDS: u32 = 20_000;

    let (model, names) = unbounded(JOINTS);
    let mut hw = SimulatedJointInterface::new(names.iter().cloned());
    let mut ctrl = MultiJointVelocityController::init(&mut hw, names.as_slice(), &model).unwrap();
    let tx = ctrl.command_sender();
    ctrl.starting(Duration::ZERO);

    let done = Arc::new(AtomicBool::new(false));
    let writer = {
        let done = Arc::clone(&done);
        thread::spawn(move || {
            // Every published vector is uniform: [k; JOINTS].
            for k in 1..=COMMANDS {
                tx.send(&[f64::from(k); JOINTS]).unwrap();
            }
            done.store(true, Ordering::Release);
        })
    };

    let mut last = 0.0;
    let mut time = Duration::ZERO;
    while !done.load(Ordering::Acquire) {
        time += DT;
        ctrl.update(time, DT);
        let out = ctrl.output();
        assert!(
            out.iter().all(|v| *v == out[0]),
            "torn vector observed: {out:?}"
        );
        // Last write wins: values never go backwards.
        assert!(out[0] >= last, "{} after {last}", out[0]);
        last = out[0];
    }
    writer.join().unwrap();

    ctrl.update(time + DT, DT);
    assert_eq!(ctrl.output(), &[f64::from(COMMANDS); JOINTS]);
}

#[test]
fn multiple_producers_are_serialised() {
    const JOINTS: usize = 8;

    let (model, names) = unbounded(JOINTS);
    let mut hw = SimulatedJointInterface::new(names.iter().cloned());
    let mut ctrl = MultiJointVelocityController::init(&mut hw, names.as_slice(), &model).unwrap();
    ctrl.starting(Duration::ZERO);

    let producers: Vec<_> = [1.0, -1.0]
        .into_iter()
        .map(|sign| {
            let tx = ctrl.command_sender();
            thread::spawn(move || {
                for k in 1..=5_000u32 {
                    tx.send(&[sign * f64::from(k); JOINTS]).unwrap();
                }
            })
        })
        .collect();

    for cycle in 1..=2_000u32 {
        ctrl.update(DT * cycle, DT);
        let out = ctrl.output();
        assert!(out.iter().all(|v| *v == out[0]), "torn vector observed: {out:?}");
    }
    for p in producers {
        p.join().unwrap();
    }
}
