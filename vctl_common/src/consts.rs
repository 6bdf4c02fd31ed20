//! System-wide constants for the controller workspace.
//!
//! Single source of truth for fixed capacities and defaults.

use std::time::Duration;

use static_assertions::const_assert;

/// Maximum number of joints a single controller instance can own.
///
/// Bounds every fixed-capacity buffer on the RT path (command mailbox,
/// limit table, state samples).
pub const MAX_JOINTS: usize = 64;

// Per-joint saturation tracking is packed into one `u64`.
const_assert!(MAX_JOINTS <= 64);

/// Default control cycle time in microseconds (1 kHz).
pub const DEFAULT_CYCLE_TIME_US: u32 = 1000;

/// Default control cycle time as Duration.
pub const DEFAULT_CYCLE_TIME: Duration = Duration::from_micros(DEFAULT_CYCLE_TIME_US as u64);

/// Shortest accepted control cycle [µs].
pub const MIN_CYCLE_TIME_US: u32 = 100;

/// Longest accepted control cycle [µs].
pub const MAX_CYCLE_TIME_US: u32 = 1_000_000;

/// Default state publication rate [Hz].
pub const DEFAULT_STATE_PUBLISH_RATE: f64 = 50.0;

/// Default controller host configuration path.
pub const DEFAULT_CONFIG_PATH: &str = "config/controller.toml";
