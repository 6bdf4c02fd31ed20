//! Per-joint limit types.
//!
//! A [`JointSpec`] is resolved once at controller initialisation from the
//! kinematic description and never changes afterwards. A [`LimitTable`]
//! holds the ordered set of specs for one controller; index `i` in the table
//! is index `i` in the command vector.

use heapless::Vec as FixedVec;
use serde::Serialize;
use thiserror::Error;

use crate::consts::MAX_JOINTS;
use crate::kinematics::JointLimits;

/// Errors building a limit table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JointError {
    /// Velocity limit is negative or NaN.
    #[error("joint '{joint}' has invalid velocity limit {value}")]
    InvalidVelocityLimit {
        /// Joint name.
        joint: String,
        /// Offending limit.
        value: f64,
    },

    /// No joints were given.
    #[error("a controller needs at least one joint")]
    NoJoints,

    /// More joints than the fixed RT buffers can hold.
    #[error("{count} joints requested, at most {max} supported")]
    TooManyJoints {
        /// Requested joint count.
        count: usize,
        /// Capacity.
        max: usize,
    },
}

/// Immutable limits of one controlled joint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JointSpec {
    /// Joint name, as known to the hardware interface and the description.
    pub name: String,
    /// Symmetric velocity bound, `>= 0`.
    pub velocity_limit: f64,
    /// Effort bound from the description. Informational.
    pub effort_limit: f64,
    /// Upper position bound. Loaded but not enforced by any controller.
    pub position_upper: f64,
    /// Lower position bound. Loaded but not enforced by any controller.
    pub position_lower: f64,
}

impl JointSpec {
    /// Build a spec from the limits found in the kinematic description.
    pub fn from_limits(name: &str, limits: &JointLimits) -> Self {
        Self {
            name: name.to_string(),
            velocity_limit: limits.velocity,
            effort_limit: limits.effort,
            position_upper: limits.upper,
            position_lower: limits.lower,
        }
    }

    /// Check the velocity bound is usable for saturation.
    ///
    /// `+inf` is accepted (an unbounded joint); negative values and NaN are not.
    pub fn validate(&self) -> Result<(), JointError> {
        if self.velocity_limit.is_nan() || self.velocity_limit < 0.0 {
            return Err(JointError::InvalidVelocityLimit {
                joint: self.name.clone(),
                value: self.velocity_limit,
            });
        }
        Ok(())
    }
}

/// Ordered, fixed-capacity table of joint specs for one controller.
#[derive(Debug, Clone)]
pub struct LimitTable {
    joints: FixedVec<JointSpec, MAX_JOINTS>,
}

impl LimitTable {
    /// Build a validated table.
    ///
    /// # Errors
    /// - `JointError::NoJoints` if `specs` is empty.
    /// - `JointError::TooManyJoints` if more than [`MAX_JOINTS`] specs are given.
    /// - `JointError::InvalidVelocityLimit` for the first unusable bound.
    pub fn new(specs: Vec<JointSpec>) -> Result<Self, JointError> {
        if specs.is_empty() {
            return Err(JointError::NoJoints);
        }
        let count = specs.len();
        if count > MAX_JOINTS {
            return Err(JointError::TooManyJoints {
                count,
                max: MAX_JOINTS,
            });
        }

        let mut joints = FixedVec::new();
        for spec in specs {
            spec.validate()?;
            joints
                .push(spec)
                .map_err(|_| JointError::TooManyJoints {
                    count,
                    max: MAX_JOINTS,
                })?;
        }
        Ok(Self { joints })
    }

    /// Number of joints.
    #[inline]
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// Always false for a constructed table; provided for API symmetry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Velocity bound of joint `index`.
    #[inline]
    pub fn velocity_limit(&self, index: usize) -> f64 {
        self.joints[index].velocity_limit
    }

    /// Spec of joint `index`, if it exists.
    pub fn get(&self, index: usize) -> Option<&JointSpec> {
        self.joints.get(index)
    }

    /// Specs as a slice, in command-vector order.
    pub fn as_slice(&self) -> &[JointSpec] {
        &self.joints
    }

    /// Specs in command-vector order.
    pub fn iter(&self) -> impl Iterator<Item = &JointSpec> {
        self.joints.iter()
    }

    /// Joint names in command-vector order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.joints.iter().map(|j| j.name.as_str())
    }
}
