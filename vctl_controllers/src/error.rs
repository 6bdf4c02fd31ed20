//! Controller error types.
//!
//! - [`ControllerError`] - fatal at `init`, the controller is never built.
//! - [`CommandError`] - a producer's command was rejected; the previously
//!   published command stays in effect.
//!
//! Nothing on the RT path returns an error: out-of-range commands are
//! clamped, unusable mailbox reads keep the last applied command.

use thiserror::Error;
use vctl_common::hardware::HardwareError;
use vctl_common::joint::JointError;
use vctl_common::kinematics::KinematicError;

/// Initialisation failure.
#[derive(Debug, Clone, Error)]
pub enum ControllerError {
    /// The kinematic description could not be loaded or parsed.
    #[error("kinematic description unavailable: {0}")]
    Kinematics(#[from] KinematicError),

    /// A requested joint is not part of the kinematic description.
    #[error("joint '{0}' not found in kinematic description")]
    JointNotInModel(String),

    /// The hardware interface cannot provide a handle for a joint.
    #[error("hardware handle unavailable: {0}")]
    Hardware(#[from] HardwareError),

    /// No joints were requested.
    #[error("controller needs at least one joint")]
    NoJoints,

    /// More joints than the fixed RT buffers hold.
    #[error("{count} joints requested, at most {max} supported")]
    TooManyJoints {
        /// Requested joint count.
        count: usize,
        /// Capacity.
        max: usize,
    },

    /// A velocity bound is negative or NaN.
    #[error("joint '{joint}' has invalid velocity limit {value}")]
    InvalidLimit {
        /// Joint name.
        joint: String,
        /// Offending bound.
        value: f64,
    },
}

impl From<JointError> for ControllerError {
    fn from(e: JointError) -> Self {
        match e {
            JointError::NoJoints => Self::NoJoints,
            JointError::TooManyJoints { count, max } => Self::TooManyJoints { count, max },
            JointError::InvalidVelocityLimit { joint, value } => {
                Self::InvalidLimit { joint, value }
            }
        }
    }
}

/// Rejected inbound command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Vector length differs from the controller's joint count.
    #[error("command has {actual} entries, controller drives {expected} joints")]
    LengthMismatch {
        /// Joint count fixed at init.
        expected: usize,
        /// Received length.
        actual: usize,
    },

    /// An entry is NaN.
    #[error("command entry {index} is NaN")]
    NotANumber {
        /// Offending index.
        index: usize,
    },
}
