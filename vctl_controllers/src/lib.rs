//! # Velocity Controllers Library
//!
//! Real-time joint controllers that pass a commanded velocity through to
//! the actuators, clamped to each joint's symmetric velocity bound.
//!
//! - [`control::SingleJointController`] - one joint, scalar command
//! - [`control::MultiJointVelocityController`] - N joints, vector command
//!
//! ## Command Handoff
//!
//! Commands arrive from non-RT producers through a [`command::CommandSender`]
//! and are snapshot-read by the RT cycle from a single-slot seqlock
//! mailbox. The RT side never locks, allocates or blocks; a vector is
//! always applied whole.
//!
//! ## Zero-Allocation RT Loop
//!
//! Limit tables, command buffers and actuator handles are sized at
//! `init` into fixed-capacity storage bounded by
//! [`MAX_JOINTS`](vctl_common::consts::MAX_JOINTS). `update`, `starting`
//! and `stopping` perform no heap allocation.

#![deny(clippy::disallowed_types)]

pub mod command;
pub mod config;
pub mod control;
pub mod cycle;
pub mod error;
pub mod state;
pub mod telemetry;
