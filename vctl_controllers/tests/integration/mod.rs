use vctl_common::kinematics::KinematicModel;

mod command_handoff;
mod cycle_host;
mod host_config;
mod lifecycle_hooks;
mod saturation_bounds;

/// Two-joint arm: j1 limited to 1.0, j2 to 2.0.
pub const ARM_TOML: &str = r#"
name = "test-arm"

[[joints]]
name = "j1"
[joints.limits]
velocity = 1.0
effort = 10.0
lower = -1.0
upper = 1.0

[[joints]]
name = "j2"
[joints.limits]
velocity = 2.0
effort = 10.0
lower = -2.0
upper = 2.0
"#;

pub fn arm() -> KinematicModel {
    KinematicModel::from_toml(ARM_TOML).expect("valid test description")
}
