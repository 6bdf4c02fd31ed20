//! Controller host configuration.
//!
//! ```toml
//! [shared]
//! service_name = "arm-velocity"
//! log_level = "info"
//!
//! [controller]
//! type = "MultiJointVelocityController"
//! joints = ["shoulder", "elbow"]        # optional, default: all hardware joints
//! robot_description = "robot.toml"     # relative to this file
//! cycle_time_us = 1000
//! state_publish_rate = 50.0            # Hz, 0 disables
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use vctl_common::config::{ConfigError, ConfigLoader, SharedConfig};
use vctl_common::consts::{
    DEFAULT_CYCLE_TIME_US, DEFAULT_STATE_PUBLISH_RATE, MAX_CYCLE_TIME_US, MAX_JOINTS,
    MIN_CYCLE_TIME_US,
};

use crate::control::ControllerKind;
use crate::telemetry::publish_period;

/// `[controller]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControllerConfig {
    /// Controller type name.
    #[serde(rename = "type")]
    pub kind: ControllerKind,

    /// Joints to drive, in command-vector order. Empty means every joint the
    /// hardware exposes.
    #[serde(default)]
    pub joints: Vec<String>,

    /// Robot description (TOML).
    pub robot_description: PathBuf,

    /// Cycle period [µs].
    #[serde(default = "default_cycle_time_us")]
    pub cycle_time_us: u32,

    /// State publication rate [Hz]; 0 disables.
    #[serde(default = "default_state_publish_rate")]
    pub state_publish_rate: f64,
}

fn default_cycle_time_us() -> u32 {
    DEFAULT_CYCLE_TIME_US
}

fn default_state_publish_rate() -> f64 {
    DEFAULT_STATE_PUBLISH_RATE
}

impl ControllerConfig {
    /// Cycle period.
    pub fn cycle_time(&self) -> Duration {
        Duration::from_micros(u64::from(self.cycle_time_us))
    }

    /// Check parameter bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_CYCLE_TIME_US..=MAX_CYCLE_TIME_US).contains(&self.cycle_time_us) {
            return Err(ConfigError::ValidationError(format!(
                "cycle_time_us {} outside [{MIN_CYCLE_TIME_US}, {MAX_CYCLE_TIME_US}]",
                self.cycle_time_us
            )));
        }
        if !self.state_publish_rate.is_finite() || self.state_publish_rate < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "state_publish_rate must be finite and >= 0, got {}",
                self.state_publish_rate
            )));
        }
        if self.state_publish_rate > 0.0 && publish_period(self.state_publish_rate).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "state_publish_rate {} too small: publish period does not fit a duration",
                self.state_publish_rate
            )));
        }
        if self.joints.len() > MAX_JOINTS {
            return Err(ConfigError::ValidationError(format!(
                "{} joints configured, at most {MAX_JOINTS} supported",
                self.joints.len()
            )));
        }
        if self.kind == ControllerKind::SingleJointController && self.joints.len() != 1 {
            return Err(ConfigError::ValidationError(format!(
                "{} needs exactly one joint, {} configured",
                self.kind,
                self.joints.len()
            )));
        }
        Ok(())
    }
}

/// Complete host configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    /// Shared settings.
    pub shared: SharedConfig,
    /// Controller settings.
    pub controller: ControllerConfig,
}

impl HostConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.controller.validate()
    }
}

/// Load and validate the host configuration.
///
/// A relative `robot_description` is resolved against the directory of
/// `path`.
pub fn load_config(path: &Path) -> Result<HostConfig, ConfigError> {
    let mut config = <HostConfig as ConfigLoader>::load(path)?;
    config.validate()?;

    if config.controller.robot_description.is_relative() {
        if let Some(dir) = path.parent() {
            config.controller.robot_description = dir.join(&config.controller.robot_description);
        }
    }
    Ok(config)
}

/// Parse and validate host configuration from TOML text (paths left as
/// written).
pub fn load_config_from_str(content: &str) -> Result<HostConfig, ConfigError> {
    let config = HostConfig::from_toml_str(content)?;
    config.validate()?;
    Ok(config)
}

// ─── Tests ──────────────────────────────────────────────────────────
