//! Velocity Controllers Common Library
//!
//! Shared types used by the controller, hardware and host crates.
//!
//! # Module Structure
//!
//! - [`consts`] - Fixed capacities and defaults
//! - [`config`] - Configuration loading traits and types
//! - [`joint`] - Per-joint limit specs and the limit table
//! - [`kinematics`] - Kinematic description and its source trait
//! - [`hardware`] - Hardware capability traits
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```toml
//! [dependencies]
//! vctl_common = { path = "../vctl_common" }
//! ```
//!
//! ```rust
//! use vctl_common::prelude::*;
//! ```

pub mod config;
pub mod consts;
pub mod hardware;
pub mod joint;
pub mod kinematics;
pub mod prelude;
