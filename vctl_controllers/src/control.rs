//! Saturating velocity controllers.
//!
//! Both controllers implement [`Controller`], the interface the
//! [`CycleRunner`](crate::cycle::CycleRunner) drives:
//!
//! | Hook | Context | Effect |
//! |------|---------|--------|
//! | `starting` | RT-safe | command ← 0, earlier commands become stale |
//! | `update` | RT | snapshot command, saturate, write handles |
//! | `stopping` | RT-safe | every handle ← 0.0 |

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::state::{LifecycleState, TransitionResult};

mod joint_group;
pub mod multi_joint;
pub mod saturation;
pub mod single_joint;

pub use multi_joint::MultiJointVelocityController;
pub use saturation::{Clamp, Saturated, saturate};
pub use single_joint::SingleJointController;

/// Periodic controller driven by the cycle host.
pub trait Controller {
    /// Registered type name.
    fn type_name(&self) -> &'static str;

    /// Current lifecycle state.
    fn lifecycle(&self) -> LifecycleState;

    /// Enter `Running`. Resets the command to zero.
    fn starting(&mut self, time: Duration) -> TransitionResult;

    /// One control cycle. Must not allocate, block or perform I/O.
    fn update(&mut self, time: Duration, period: Duration);

    /// Leave `Running`. Writes 0.0 to every actuator before returning.
    fn stopping(&mut self, time: Duration) -> TransitionResult;
}

impl<C: Controller + ?Sized> Controller for Box<C> {
    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }

    fn lifecycle(&self) -> LifecycleState {
        (**self).lifecycle()
    }

    fn starting(&mut self, time: Duration) -> TransitionResult {
        (**self).starting(time)
    }

    fn update(&mut self, time: Duration, period: Duration) {
        (**self).update(time, period)
    }

    fn stopping(&mut self, time: Duration) -> TransitionResult {
        (**self).stopping(time)
    }
}

/// Controller types selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerKind {
    /// [`SingleJointController`].
    SingleJointController,
    /// [`MultiJointVelocityController`].
    MultiJointVelocityController,
}

impl ControllerKind {
    /// Type name as used in configuration.
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::SingleJointController => single_joint::TYPE_NAME,
            Self::MultiJointVelocityController => multi_joint::TYPE_NAME,
        }
    }
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for ControllerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            single_joint::TYPE_NAME => Ok(Self::SingleJointController),
            multi_joint::TYPE_NAME => Ok(Self::MultiJointVelocityController),
            other => Err(format!("unknown controller type '{other}'")),
        }
    }
}
