//! Prelude module for common re-exports.
//!
//! ```rust
//! use vctl_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{DEFAULT_CYCLE_TIME, DEFAULT_CYCLE_TIME_US, MAX_JOINTS};

// ─── Joints & Kinematics ────────────────────────────────────────────
pub use crate::joint::{JointError, JointSpec, LimitTable};
pub use crate::kinematics::{
    FileKinematicSource, JointLimits, KinematicError, KinematicModel, KinematicSource,
};

// ─── Hardware ───────────────────────────────────────────────────────
pub use crate::hardware::{ActuatorHandle, HardwareError, JointCommandInterface};
