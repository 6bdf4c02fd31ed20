//! Configuration + robot description files → running controller.

use std::fs;
use std::time::Duration;

use tempfile::TempDir;
use vctl_common::config::ConfigError;
use vctl_common::kinematics::{FileKinematicSource, KinematicError};
use vctl_controllers::config::load_config;
use vctl_controllers::control::{Controller, ControllerKind, MultiJointVelocityController};
use vctl_controllers::error::ControllerError;
use vctl_hal::SimulatedJointInterface;

use super::ARM_TOML;

const HOST_TOML: &str = r#"
[shared]
service_name = "integration"
log_level = "debug"

[controller]
type = "MultiJointVelocityController"
robot_description = "robot.toml"
cycle_time_us = 500
state_publish_rate = 0.0
"#;

fn write_files(dir: &TempDir, host: &str, robot: &str) {
    fs::write(dir.path().join("controller.toml"), host).unwrap();
    fs::write(dir.path().join("robot.toml"), robot).unwrap();
}

#[test]
fn config_drives_controller_construction() {
    let dir = TempDir::new().unwrap();
    write_files(&dir, HOST_TOML, ARM_TOML);

    let cfg = load_config(&dir.path().join("controller.toml")).unwrap();
    assert_eq!(cfg.controller.kind, ControllerKind::MultiJointVelocityController);
    assert_eq!(cfg.controller.cycle_time(), Duration::from_micros(500));

    let source = FileKinematicSource::new(&cfg.controller.robot_description);
    let mut hw = SimulatedJointInterface::new(["j2", "j1"]);
    let mut ctrl = MultiJointVelocityController::init_all(&mut hw, &source).unwrap();
    assert_eq!(ctrl.limits().names().collect::<Vec<_>>(), vec!["j2", "j1"]);

    ctrl.starting(Duration::ZERO);
    ctrl.command_sender().send(&[3.0, 3.0]).unwrap();
    ctrl.update(Duration::from_micros(500), Duration::from_micros(500));
    assert_eq!(ctrl.output(), &[2.0, 1.0]);
}

#[test]
fn unreadable_description_fails_init() {
    let dir = TempDir::new().unwrap();
    write_files(&dir, HOST_TOML, "[[joints]\nname = ");

    let cfg = load_config(&dir.path().join("controller.toml")).unwrap();
    let source = FileKinematicSource::new(&cfg.controller.robot_description);
    let mut hw = SimulatedJointInterface::new(["j1"]);

    let err = MultiJointVelocityController::init(&mut hw, &["j1"], &source);
    assert!(matches!(
        err,
        Err(ControllerError::Kinematics(KinematicError::Load(ConfigError::ParseError(_))))
    ));
    assert!(!hw.probe("j1").unwrap().is_claimed());
}

#[test]
fn missing_description_fails_init() {
    let source = FileKinematicSource::new("/nonexistent/robot.toml");
    let mut hw = SimulatedJointInterface::new(["j1"]);
    assert!(matches!(
        MultiJointVelocityController::init(&mut hw, &["j1"], &source),
        Err(ControllerError::Kinematics(KinematicError::Load(ConfigError::FileNotFound(_))))
    ));
}

#[test]
fn shipped_configuration_is_valid() {
    let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/controller.toml");
    let cfg = load_config(&root).unwrap();
    assert!(cfg.controller.robot_description.ends_with("robot.toml"));

    let source = FileKinematicSource::new(&cfg.controller.robot_description);
    let mut hw = SimulatedJointInterface::new(cfg.controller.joints.iter().cloned());
    let ctrl =
        MultiJointVelocityController::init(&mut hw, cfg.controller.joints.as_slice(), &source)
            .unwrap();
    assert_eq!(ctrl.joint_count(), cfg.controller.joints.len());
}
