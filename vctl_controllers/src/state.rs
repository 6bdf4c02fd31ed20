//! Controller lifecycle state machine.

pub mod lifecycle;

pub use lifecycle::{LifecycleEvent, LifecycleState, LifecycleStateMachine, TransitionResult};
