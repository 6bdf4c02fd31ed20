//! # Velocity Controllers HAL Library
//!
//! Hardware backends implementing the capability traits defined in
//! `vctl_common::hardware`.
//!
//! # Module Structure
//!
//! - [`sim`] - Simulated joint command interface
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────┐  set_command   ┌─────────────────────────┐
//! │  Controller (RT)   │ ─────────────► │  SimulatedActuator      │
//! └────────────────────┘                │      │ Arc<JointCell>   │
//!                                       │      ▼                  │
//! ┌────────────────────┐  command()     │  ActuatorProbe          │
//! │  Host / tests      │ ◄───────────── │  SimulatedJointInterface│
//! └────────────────────┘                └─────────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod sim;

pub use crate::sim::{ActuatorProbe, SimulatedActuator, SimulatedJointInterface};
