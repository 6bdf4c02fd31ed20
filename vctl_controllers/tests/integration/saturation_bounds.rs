//! Output bound holds for arbitrary limits and commands.

use std::time::Duration;

use proptest::prelude::*;
use vctl_common::kinematics::{DescribedJoint, JointLimits, KinematicModel};
use vctl_controllers::control::{Controller, MultiJointVelocityController, SingleJointController};
use vctl_hal::SimulatedJointInterface;

const DT: Duration = Duration::from_millis(1);

fn model(limits: &[f64]) -> KinematicModel {
    KinematicModel {
        name: "generated".to_string(),
        joints: limits
            .iter()
            .enumerate()
            .map(|(i, &velocity)| DescribedJoint {
                name: format!("j{i}"),
                limits: JointLimits {
                    velocity,
                    effort: 0.0,
                    lower: 0.0,
                    upper: 0.0,
                },
            })
            .collect(),
    }
}

/// Finite values, infinities and exact-limit hits.
fn command_value() -> impl Strategy<Value = f64> {
    prop_oneof![
        -1e6f64..1e6,
        Just(f64::INFINITY),
        Just(f64::NEG_INFINITY),
        Just(0.0),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn every_output_within_its_limit(
        (limits, commands) in (1usize..12).prop_flat_map(|n| (
            prop::collection::vec(0.0f64..100.0, n),
            prop::collection::vec(command_value(), n),
        ))
    ) {
        let model = model(&limits);
        let names: Vec<String> = model.joint_names().map(str::to_string).collect();
        let mut hw = SimulatedJointInterface::from_model(&model);
        let probes: Vec<_> = names.iter().map(|n| hw.probe(n).unwrap()).collect();
        let mut ctrl = MultiJointVelocityController::init(&mut hw, names.as_slice(), &model).unwrap();

        ctrl.starting(Duration::ZERO);
        ctrl.command_sender().send(&commands).unwrap();
        ctrl.update(DT, DT);

        for (i, probe) in probes.iter().enumerate() {
            let out = probe.command();
            prop_assert!(out >= -limits[i] && out <= limits[i], "joint {i}: {out} vs {}", limits[i]);
            if commands[i].abs() <= limits[i] {
                prop_assert_eq!(out, commands[i]);
            }
        }
    }

    #[test]
    fn command_at_limit_passes_unchanged(limit in 0.0f64..1e3, negative in any::<bool>()) {
        let model = model(&[limit]);
        let mut hw = SimulatedJointInterface::from_model(&model);
        let mut ctrl = SingleJointController::init(&mut hw, "j0", &model).unwrap();

        let command = if negative { -limit } else { limit };
        ctrl.starting(Duration::ZERO);
        ctrl.command_sender().send_scalar(command).unwrap();
        ctrl.update(DT, DT);
        prop_assert_eq!(ctrl.output(), command);
    }
}

#[test]
fn single_joint_limit_five_command_five() {
    let model = model(&[5.0]);
    let mut hw = SimulatedJointInterface::from_model(&model);
    let probe = hw.probe("j0").unwrap();
    let mut ctrl = SingleJointController::init(&mut hw, "j0", &model).unwrap();

    ctrl.starting(Duration::ZERO);
    ctrl.command_sender().send_scalar(5.0).unwrap();
    ctrl.update(DT, DT);
    assert_eq!(probe.command(), 5.0);
}

#[test]
fn infinite_commands_clamp_to_limit() {
    let model = model(&[1.0, 2.0]);
    let mut hw = SimulatedJointInterface::from_model(&model);
    let mut ctrl = MultiJointVelocityController::init_all(&mut hw, &model).unwrap();

    ctrl.starting(Duration::ZERO);
    ctrl.command_sender()
        .send(&[f64::INFINITY, f64::NEG_INFINITY])
        .unwrap();
    ctrl.update(DT, DT);
    assert_eq!(ctrl.output(), &[1.0, -2.0]);
}
