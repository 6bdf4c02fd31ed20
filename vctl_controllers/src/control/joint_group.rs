//! Shared machinery of the saturating controllers.
//!
//! A [`JointGroup`] owns the limit table, the claimed actuator handles, the
//! RT end of the command mailbox and the lifecycle state. Both controllers
//! are thin facades over it.

use std::time::Duration;

use heapless::Vec as FixedVec;
use tracing::{debug, error, info, warn};
use vctl_common::consts::MAX_JOINTS;
use vctl_common::hardware::{ActuatorHandle, JointCommandInterface};
use vctl_common::joint::{JointSpec, LimitTable};
use vctl_common::kinematics::KinematicSource;

use crate::command::{CommandMailbox, CommandSender};
use crate::control::saturation::saturate;
use crate::error::ControllerError;
use crate::state::{LifecycleEvent, LifecycleState, LifecycleStateMachine, TransitionResult};
use crate::telemetry::StatePublisher;

pub(crate) struct JointGroup<H> {
    type_name: &'static str,
    limits: LimitTable,
    handles: FixedVec<H, MAX_JOINTS>,
    mailbox: CommandMailbox,
    /// Last accepted command.
    command: [f64; MAX_JOINTS],
    /// Last written output.
    output: [f64; MAX_JOINTS],
    /// Bit `i` set while joint `i` is saturated.
    saturated: u64,
    lifecycle: LifecycleStateMachine,
    publisher: Option<StatePublisher>,
    cycles: u64,
}

impl<H: ActuatorHandle> JointGroup<H> {
    /// Resolve limits for `names` and claim their handles.
    pub(crate) fn init<I, K, S>(
        type_name: &'static str,
        hw: &mut I,
        names: &[S],
        kinematics: &K,
    ) -> Result<Self, ControllerError>
    where
        I: JointCommandInterface<Handle = H> + ?Sized,
        K: KinematicSource + ?Sized,
        S: AsRef<str>,
    {
        if names.is_empty() {
            error!("{type_name}: no joints given");
            return Err(ControllerError::NoJoints);
        }
        if names.len() > MAX_JOINTS {
            return Err(ControllerError::TooManyJoints {
                count: names.len(),
                max: MAX_JOINTS,
            });
        }

        let model = kinematics.load().map_err(|e| {
            error!("{type_name}: failed to load kinematic description: {e}");
            ControllerError::Kinematics(e)
        })?;

        let mut specs = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let limits = model.joint(name).ok_or_else(|| {
                error!("{type_name}: could not find joint '{name}' in kinematic description");
                ControllerError::JointNotInModel(name.to_string())
            })?;
            specs.push(JointSpec::from_limits(name, limits));
        }
        let limits = LimitTable::new(specs)?;

        let mut handles = FixedVec::new();
        for spec in limits.iter() {
            let handle = hw.joint_handle(&spec.name).map_err(|e| {
                error!("{type_name}: {e}");
                ControllerError::Hardware(e)
            })?;
            debug!(
                "Got joint {} (velocity limit {})",
                spec.name, spec.velocity_limit
            );
            if handles.push(handle).is_err() {
                return Err(ControllerError::TooManyJoints {
                    count: limits.len(),
                    max: MAX_JOINTS,
                });
            }
        }

        let mailbox = CommandMailbox::new(limits.len()).ok_or(ControllerError::NoJoints)?;

        let mut lifecycle = LifecycleStateMachine::new();
        lifecycle.handle_event(LifecycleEvent::InitComplete);
        info!("{type_name} initialised with {} joint(s)", limits.len());

        Ok(Self {
            type_name,
            limits,
            handles,
            mailbox,
            command: [0.0; MAX_JOINTS],
            output: [0.0; MAX_JOINTS],
            saturated: 0,
            lifecycle,
            publisher: None,
            cycles: 0,
        })
    }

    #[inline]
    pub(crate) fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.limits.len()
    }

    pub(crate) fn limits(&self) -> &LimitTable {
        &self.limits
    }

    pub(crate) fn command_sender(&self) -> CommandSender {
        self.mailbox.sender()
    }

    pub(crate) fn command(&self) -> &[f64] {
        &self.command[..self.len()]
    }

    pub(crate) fn output(&self) -> &[f64] {
        &self.output[..self.len()]
    }

    #[inline]
    pub(crate) fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub(crate) fn set_publisher(&mut self, publisher: StatePublisher) {
        self.publisher = Some(publisher);
    }

    pub(crate) fn cycles(&self) -> u64 {
        self.cycles
    }

    pub(crate) fn contended_reads(&self) -> u64 {
        self.mailbox.contended_reads()
    }

    /// Zero the command and discard anything published before now.
    ///
    /// A rejected start (already running) leaves the command untouched.
    pub(crate) fn starting(&mut self, time: Duration) -> TransitionResult {
        let result = self.lifecycle.handle_event(LifecycleEvent::Start);
        match result {
            TransitionResult::Ok(_) => {
                self.command = [0.0; MAX_JOINTS];
                self.saturated = 0;
                self.mailbox.mark_stale();
                info!("{} starting at t={:?}", self.type_name, time)
            }
            TransitionResult::Rejected(reason) => {
                warn!("{} start rejected: {reason}", self.type_name)
            }
        }
        result
    }

    /// RT cycle body. No-op unless running.
    pub(crate) fn update(&mut self, time: Duration, _period: Duration) {
        if !self.lifecycle.is_running() {
            return;
        }
        let n = self.limits.len();

        // Contended or unchanged: keep the previous command.
        self.mailbox.poll(&mut self.command[..n]);

        for i in 0..n {
            let command = self.command[i];
            let limit = self.limits.velocity_limit(i);
            let s = saturate(command, limit);

            let bit = 1u64 << i;
            if s.clamp.is_active() {
                if self.saturated & bit == 0 {
                    self.saturated |= bit;
                    debug!(
                        "Joint {} saturated: command {} clamped to {}",
                        self.handles[i].joint_name(),
                        command,
                        s.value
                    );
                }
            } else {
                self.saturated &= !bit;
            }

            self.handles[i].set_command(s.value);
            self.output[i] = s.value;
        }

        if let Some(publisher) = self.publisher.as_mut() {
            publisher.offer(time, &self.command[..n], &self.output[..n]);
        }
        self.cycles += 1;
    }

    /// Drive every actuator to zero, then leave `Running`.
    pub(crate) fn stopping(&mut self, time: Duration) -> TransitionResult {
        info!(
            "{} shutting down at t={:?}, commanding zero velocity",
            self.type_name, time
        );
        let n = self.limits.len();
        for (handle, out) in self.handles.iter_mut().zip(&mut self.output[..n]) {
            handle.set_command(0.0);
            *out = 0.0;
        }
        self.saturated = 0;

        let result = self.lifecycle.handle_event(LifecycleEvent::Stop);
        if let TransitionResult::Rejected(reason) = result {
            debug!("{} stop transition skipped: {reason}", self.type_name);
        }
        result
    }
}
