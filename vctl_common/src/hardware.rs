//! Hardware capability traits.
//!
//! Controllers never talk to a concrete backend. They see:
//! - [`JointCommandInterface`] - lists joints and hands out actuator handles
//! - [`ActuatorHandle`] - the sole egress for one joint's command
//!
//! # Ownership
//!
//! A handle is claimed once and owned by exactly one controller for its
//! lifetime. A second claim for the same joint fails with
//! [`HardwareError::HandleClaimed`] until the first handle is dropped.
//!
//! # Timing Contracts
//!
//! | Operation | RT Constraint |
//! |-----------|---------------|
//! | `joint_names()` | None (init) |
//! | `joint_handle()` | None (init) |
//! | `set_command()` | **HARD**: no allocation, no blocking |

use thiserror::Error;

/// Errors resolving hardware handles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HardwareError {
    /// The interface does not expose a joint with this name.
    #[error("hardware interface has no joint '{0}'")]
    UnknownJoint(String),

    /// The joint's handle is already owned by another controller.
    #[error("handle for joint '{0}' is already claimed")]
    HandleClaimed(String),
}

/// Command sink of one joint.
pub trait ActuatorHandle: Send {
    /// Name of the joint this handle drives.
    fn joint_name(&self) -> &str;

    /// Write the command for the next hardware write-out.
    ///
    /// Called from the RT cycle: must not allocate or block.
    fn set_command(&mut self, value: f64);
}

/// Hardware interface exposing commandable joints.
pub trait JointCommandInterface {
    /// Concrete handle type.
    type Handle: ActuatorHandle;

    /// Names of all joints this interface can command, in interface order.
    fn joint_names(&self) -> Vec<String>;

    /// Claim the handle for `name`.
    ///
    /// # Errors
    /// - `HardwareError::UnknownJoint` if no such joint exists.
    /// - `HardwareError::HandleClaimed` if the handle is already owned.
    fn joint_handle(&mut self, name: &str) -> Result<Self::Handle, HardwareError>;
}
