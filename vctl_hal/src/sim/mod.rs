//! Simulated hardware backend.
//!
//! Stands in for a real joint command interface during development,
//! in the host binary and in tests.

mod interface;

pub use interface::{ActuatorProbe, JointCell, SimulatedActuator, SimulatedJointInterface};
