//! Simulated joint command interface.
//!
//! Every joint is backed by a shared [`JointCell`]: the controller writes
//! commands through a [`SimulatedActuator`], tests and the host observe them
//! through an [`ActuatorProbe`], and [`SimulatedJointInterface::advance`]
//! integrates the commanded velocity into a joint position.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tracing::{debug, info};
use vctl_common::hardware::{ActuatorHandle, HardwareError, JointCommandInterface};
use vctl_common::kinematics::KinematicModel;

/// Lock-free storage behind one simulated joint.
#[derive(Debug, Default)]
pub struct JointCell {
    /// Last command (f64 bits).
    command: AtomicU64,
    /// Number of `set_command` calls.
    writes: AtomicU64,
    /// Whether a controller currently owns the handle.
    claimed: AtomicBool,
}

impl JointCell {
    #[inline]
    fn command(&self) -> f64 {
        f64::from_bits(self.command.load(Ordering::Acquire))
    }
}

/// Actuator handle handed to a controller.
///
/// Dropping the handle releases the claim.
#[derive(Debug)]
pub struct SimulatedActuator {
    name: String,
    cell: Arc<JointCell>,
}

impl ActuatorHandle for SimulatedActuator {
    fn joint_name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn set_command(&mut self, value: f64) {
        self.cell.command.store(value.to_bits(), Ordering::Release);
        self.cell.writes.fetch_add(1, Ordering::Relaxed);
    }
}

impl Drop for SimulatedActuator {
    fn drop(&mut self) {
        self.cell.claimed.store(false, Ordering::Release);
    }
}

/// Read-only view of a simulated joint's command sink.
#[derive(Debug, Clone)]
pub struct ActuatorProbe {
    cell: Arc<JointCell>,
}

impl ActuatorProbe {
    /// Last commanded value (0.0 before the first write).
    pub fn command(&self) -> f64 {
        self.cell.command()
    }

    /// Number of commands written so far.
    pub fn writes(&self) -> u64 {
        self.cell.writes.load(Ordering::Relaxed)
    }

    /// Whether a controller currently owns the handle.
    pub fn is_claimed(&self) -> bool {
        self.cell.claimed.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
struct SimJoint {
    name: String,
    cell: Arc<JointCell>,
    position: f64,
}

/// Velocity-commanded joint interface with ideal actuators.
#[derive(Debug, Default)]
pub struct SimulatedJointInterface {
    joints: Vec<SimJoint>,
}

impl SimulatedJointInterface {
    /// Interface exposing the given joints, all at position 0.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let joints: Vec<SimJoint> = names
            .into_iter()
            .map(|name| SimJoint {
                name: name.into(),
                cell: Arc::new(JointCell::default()),
                position: 0.0,
            })
            .collect();
        info!("Simulated joint interface with {} joints", joints.len());
        Self { joints }
    }

    /// Interface exposing every joint of a kinematic description.
    pub fn from_model(model: &KinematicModel) -> Self {
        Self::new(model.joint_names())
    }

    /// Probe for the named joint.
    pub fn probe(&self, name: &str) -> Option<ActuatorProbe> {
        self.find(name).map(|j| ActuatorProbe {
            cell: Arc::clone(&j.cell),
        })
    }

    /// Integrate commanded velocities over `dt`.
    pub fn advance(&mut self, dt: Duration) {
        let dt = dt.as_secs_f64();
        for joint in &mut self.joints {
            joint.position += joint.cell.command() * dt;
        }
    }

    /// Simulated position of the named joint.
    pub fn position(&self, name: &str) -> Option<f64> {
        self.find(name).map(|j| j.position)
    }

    fn find(&self, name: &str) -> Option<&SimJoint> {
        self.joints.iter().find(|j| j.name == name)
    }
}

impl JointCommandInterface for SimulatedJointInterface {
    type Handle = SimulatedActuator;

    fn joint_names(&self) -> Vec<String> {
        self.joints.iter().map(|j| j.name.clone()).collect()
    }

    fn joint_handle(&mut self, name: &str) -> Result<SimulatedActuator, HardwareError> {
        let joint = self
            .find(name)
            .ok_or_else(|| HardwareError::UnknownJoint(name.to_string()))?;

        if joint.cell.claimed.swap(true, Ordering::AcqRel) {
            return Err(HardwareError::HandleClaimed(name.to_string()));
        }
        debug!("Claimed simulated handle for joint {}", name);

        Ok(SimulatedActuator {
            name: joint.name.clone(),
            cell: Arc::clone(&joint.cell),
        })
    }
}
