//! Kinematic description (robot limits model).
//!
//! The description is an explicit dependency handed to controller
//! initialisation through [`KinematicSource`]; nothing here is global.
//! Only the per-joint limits are modelled, the structural part of a robot
//! model is not needed by the controllers.
//!
//! # TOML Example
//!
//! ```toml
//! name = "two-link-arm"
//!
//! [[joints]]
//! name = "shoulder"
//! [joints.limits]
//! velocity = 1.0
//! effort = 40.0
//! lower = -1.57
//! upper = 1.57
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, ConfigLoader};

/// Errors loading a kinematic description.
#[derive(Debug, Clone, Error)]
pub enum KinematicError {
    /// The description could not be read or parsed.
    #[error("failed to load kinematic description: {0}")]
    Load(#[from] ConfigError),

    /// The same joint name appears twice.
    #[error("joint '{0}' is described more than once")]
    DuplicateJoint(String),
}

/// Limits of one joint as stated by the description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointLimits {
    /// Velocity bound [rad/s or m/s].
    pub velocity: f64,
    /// Effort bound [Nm or N].
    #[serde(default)]
    pub effort: f64,
    /// Lower position bound.
    #[serde(default)]
    pub lower: f64,
    /// Upper position bound.
    #[serde(default)]
    pub upper: f64,
}

/// One described joint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescribedJoint {
    /// Joint name.
    pub name: String,
    /// Joint limits.
    pub limits: JointLimits,
}

/// Parsed kinematic description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KinematicModel {
    /// Robot name.
    #[serde(default)]
    pub name: String,
    /// Described joints.
    #[serde(default)]
    pub joints: Vec<DescribedJoint>,
}

impl KinematicModel {
    /// Parse and validate a description from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, KinematicError> {
        let model = Self::from_toml_str(content)?;
        model.validate()?;
        Ok(model)
    }

    /// Check joint names are unique.
    pub fn validate(&self) -> Result<(), KinematicError> {
        let mut seen = HashSet::new();
        for joint in &self.joints {
            if !seen.insert(joint.name.as_str()) {
                return Err(KinematicError::DuplicateJoint(joint.name.clone()));
            }
        }
        Ok(())
    }

    /// Limits of the named joint, `None` if the joint is not described.
    pub fn joint(&self, name: &str) -> Option<&JointLimits> {
        self.joints
            .iter()
            .find(|j| j.name == name)
            .map(|j| &j.limits)
    }

    /// Described joint names, in file order.
    pub fn joint_names(&self) -> impl Iterator<Item = &str> {
        self.joints.iter().map(|j| j.name.as_str())
    }
}

/// Source of a kinematic description, queried once at controller init.
///
/// Loading may block (file access); it must never be called from the RT path.
pub trait KinematicSource {
    /// Load the description.
    fn load(&self) -> Result<KinematicModel, KinematicError>;
}

/// An already-parsed model is its own source.
impl KinematicSource for KinematicModel {
    fn load(&self) -> Result<KinematicModel, KinematicError> {
        Ok(self.clone())
    }
}

/// Description stored in a TOML file.
#[derive(Debug, Clone)]
pub struct FileKinematicSource {
    path: PathBuf,
}

impl FileKinematicSource {
    /// Source reading `path` on every `load()`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the description file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KinematicSource for FileKinematicSource {
    fn load(&self) -> Result<KinematicModel, KinematicError> {
        let model = <KinematicModel as ConfigLoader>::load(&self.path)?;
        model.validate()?;
        Ok(model)
    }
}
