//! Single-joint passthrough controller.
//!
//! One joint, scalar command. The command is written to the actuator
//! unchanged unless it exceeds the joint's velocity bound, in which case it
//! is clamped.

use std::time::Duration;

use vctl_common::hardware::{ActuatorHandle, JointCommandInterface};
use vctl_common::joint::JointSpec;
use vctl_common::kinematics::KinematicSource;

use super::Controller;
use super::joint_group::JointGroup;
use crate::command::CommandSender;
use crate::error::ControllerError;
use crate::state::{LifecycleState, TransitionResult};
use crate::telemetry::StatePublisher;

/// Registered type name.
pub const TYPE_NAME: &str = "SingleJointController";

/// Scalar-commanded controller for one joint.
pub struct SingleJointController<H> {
    group: JointGroup<H>,
}

impl<H: ActuatorHandle> SingleJointController<H> {
    /// Build a controller for `joint_name`.
    ///
    /// # Errors
    /// Same as [`MultiJointVelocityController::init`](super::MultiJointVelocityController::init)
    /// for a one-element joint list.
    pub fn init<I, K>(hw: &mut I, joint_name: &str, kinematics: &K) -> Result<Self, ControllerError>
    where
        I: JointCommandInterface<Handle = H> + ?Sized,
        K: KinematicSource + ?Sized,
    {
        let group = JointGroup::init(TYPE_NAME, hw, &[joint_name], kinematics)?;
        Ok(Self { group })
    }

    /// Attach a state publisher (builder style).
    pub fn with_state_publisher(mut self, publisher: StatePublisher) -> Self {
        self.group.set_publisher(publisher);
        self
    }

    /// Producer handle; use [`CommandSender::send_scalar`].
    pub fn command_sender(&self) -> CommandSender {
        self.group.command_sender()
    }

    /// Limits of the controlled joint.
    pub fn joint(&self) -> &JointSpec {
        // A constructed group always holds exactly one joint.
        &self.group.limits().as_slice()[0]
    }

    /// Command currently applied.
    pub fn command(&self) -> f64 {
        self.group.command()[0]
    }

    /// Last saturated output.
    pub fn output(&self) -> f64 {
        self.group.output()[0]
    }
}

impl<H: ActuatorHandle> Controller for SingleJointController<H> {
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
