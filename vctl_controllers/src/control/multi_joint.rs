//! Multi-joint velocity controller.
//!
//! Drives N joints from one command vector. Every cycle each entry is
//! clamped to its joint's velocity bound and written to the joint's
//! actuator:
//!
//! ```text
//! out[i] = clamp(command[i], -limit[i], limit[i])
//! ```
//!
//! Joint count and order are fixed at `init`; the command vector must match
//! them exactly.

use std::time::Duration;

use vctl_common::hardware::{ActuatorHandle, JointCommandInterface};
use vctl_common::joint::LimitTable;
use vctl_common::kinematics::KinematicSource;

use super::Controller;
use super::joint_group::JointGroup;
use crate::command::CommandSender;
use crate::error::ControllerError;
use crate::state::{LifecycleState, TransitionResult};
use crate::telemetry::StatePublisher;

/// Registered type name.
pub const TYPE_NAME: &str = "MultiJointVelocityController";

/// Vector-commanded controller with per-joint saturation.
pub struct MultiJointVelocityController<H> {
    group: JointGroup<H>,
}

impl<H: ActuatorHandle> MultiJointVelocityController<H> {
    /// Build a controller for `joint_names`, in that order.
    ///
    /// Limits come from `kinematics` (loaded once, may block). Handles are
    /// claimed from `hw` and owned by the controller until it is dropped.
    ///
    /// # Errors
    /// - `ControllerError::NoJoints` / `TooManyJoints` for a bad joint count.
    /// - `ControllerError::Kinematics` if the description cannot be loaded.
    /// - `ControllerError::JointNotInModel` for a joint missing from it.
    /// - `ControllerError::InvalidLimit` for a negative or NaN velocity bound.
    /// - `ControllerError::Hardware` if a handle cannot be claimed.
    pub fn init<I, K, S>(hw: &mut I, joint_names: &[S], kinematics: &K) -> Result<Self, ControllerError>
    where
        I: JointCommandInterface<Handle = H> + ?Sized,
        K: KinematicSource + ?Sized,
        S: AsRef<str>,
    {
        let group = JointGroup::init(TYPE_NAME, hw, joint_names, kinematics)?;
        Ok(Self { group })
    }

    /// Build a controller for every joint the hardware interface exposes,
    /// in interface order.
    pub fn init_all<I, K>(hw: &mut I, kinematics: &K) -> Result<Self, ControllerError>
    where
        I: JointCommandInterface<Handle = H> + ?Sized,
        K: KinematicSource + ?Sized,
    {
        let names = hw.joint_names();
        Self::init(hw, names.as_slice(), kinematics)
    }

    /// Attach a state publisher (builder style).
    pub fn with_state_publisher(mut self, publisher: StatePublisher) -> Self {
        self.group.set_publisher(publisher);
        self
    }

    /// Producer handle for vector commands.
    pub fn command_sender(&self) -> CommandSender {
        self.group.command_sender()
    }

    /// Number of controlled joints.
    pub fn joint_count(&self) -> usize {
        self.group.len()
    }

    /// Resolved per-joint limits.
    pub fn limits(&self) -> &LimitTable {
        self.group.limits()
    }

    /// Command currently applied.
    pub fn command(&self) -> &[f64] {
        self.group.command()
    }

    /// Last saturated output.
    pub fn output(&self) -> &[f64] {
        self.group.output()
    }

    /// Cycles executed while running.
    pub fn cycles(&self) -> u64 {
        self.group.cycles()
    }

    /// Mailbox reads abandoned because of concurrent writes.
    pub fn contended_reads(&self) -> u64 {
        self.group.contended_reads()
    }
}

impl<H: ActuatorHandle> Controller for MultiJointVelocityController<H> {
    fn type_name(&self) -> &'static str {
        self.group.type_name()
    }

    fn lifecycle(&self) -> LifecycleState {
        self.group.state()
    }

    fn starting(&mut self, time: Duration) -> TransitionResult {
        self.group.starting(time)
    }

    #[inline]
    fn update(&mut self, time: Duration, period: Duration) {
        self.group.update(time, period)
    }

    fn stopping(&mut self, time: Duration) -> TransitionResult {
        self.group.stopping(time)
    }
}
