//! Controller lifecycle: Uninitialized → Initialized → Running ⇄ Stopped.
//!
//! | from | event | to |
//! |------|-------|----|
//! | Uninitialized | InitComplete | Initialized |
//! | Uninitialized | InitFailed | Uninitialized |
//! | Initialized, Stopped | Start | Running |
//! | Running | Stop | Stopped |
//!
//! Every other combination is rejected and leaves the state unchanged.

use serde::Serialize;

/// Lifecycle state of one controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum LifecycleState {
    /// Not yet initialised, or initialisation failed.
    #[default]
    Uninitialized,
    /// Limits loaded and handles claimed; outputs not driven.
    Initialized,
    /// `update` drives the actuators every cycle.
    Running,
    /// Outputs forced to zero; may be started again.
    Stopped,
}

/// Result of a lifecycle transition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionResult {
    /// Transition succeeded, new state.
    Ok(LifecycleState),
    /// Transition rejected, reason.
    Rejected(&'static str),
}

impl TransitionResult {
    /// True if the transition was applied.
    #[inline]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }
}

/// Lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Limits resolved and handles acquired.
    InitComplete,
    /// Initialisation failed.
    InitFailed,
    /// Host starts the controller.
    Start,
    /// Host stops the controller.
    Stop,
}

/// Holder of the current lifecycle state.
#[derive(Debug, Clone, Default)]
pub struct LifecycleStateMachine {
    state: LifecycleState,
}

impl LifecycleStateMachine {
    /// New machine in `Uninitialized`.
    pub const fn new() -> Self {
        Self {
            state: LifecycleState::Uninitialized,
        }
    }

    /// Current state.
    #[inline]
    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    /// True while the controller drives its actuators.
    #[inline]
    pub const fn is_running(&self) -> bool {
        matches!(self.state, LifecycleState::Running)
    }

    /// Attempt a transition.
    pub fn handle_event(&mut self, event: LifecycleEvent) -> TransitionResult {
        use LifecycleEvent::*;
        use LifecycleState::*;

        let next = match (self.state, event) {
            (Uninitialized, InitComplete) => Initialized,
            (Uninitialized, InitFailed) => Uninitialized,
            (Initialized, Start) | (Stopped, Start) => Running,
            (Running, Stop) => Stopped,
            _ => return TransitionResult::Rejected(invalid_transition_reason(self.state, event)),
        };

        self.state = next;
        TransitionResult::Ok(next)
    }
}

fn invalid_transition_reason(state: LifecycleState, event: LifecycleEvent) -> &'static str {
    use LifecycleEvent::*;
    use LifecycleState::*;
    match (state, event) {
        (Uninitialized, _) => "Uninitialized: only InitComplete or InitFailed allowed",
        (_, InitComplete) | (_, InitFailed) => "already initialised",
        (Running, Start) => "Running: already started",
        (Initialized, Stop) => "Initialized: never started",
        (Stopped, Stop) => "Stopped: already stopped",
        _ => "invalid event for current state",
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
