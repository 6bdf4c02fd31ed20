//! Best-effort controller state publication.
//!
//! The RT cycle offers a [`JointControllerState`] sample every cycle; the
//! [`StatePublisher`] forwards at most one per publish period over a bounded
//! channel with `try_send`. A full or disconnected channel drops the sample
//! and counts it. Publishing never blocks the cycle.

use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use heapless::Vec as FixedVec;
use serde::Serialize;
use vctl_common::consts::MAX_JOINTS;

/// Samples buffered between the RT cycle and the consumer.
pub const STATE_CHANNEL_CAPACITY: usize = 16;

/// One joint's values for a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JointSample {
    /// Commanded velocity.
    pub command: f64,
    /// Saturated output written to the actuator.
    pub output: f64,
    /// `command - output` (non-zero while saturated).
    pub error: f64,
}

/// Controller state for one cycle.
#[derive(Debug, Clone, Serialize)]
pub struct JointControllerState {
    /// Publication counter.
    pub seq: u64,
    /// Controller time of the sample.
    pub stamp: Duration,
    /// Per-joint samples in command-vector order.
    pub joints: FixedVec<JointSample, MAX_JOINTS>,
}

/// Period between samples for `rate_hz`, if one is representable.
pub fn publish_period(rate_hz: f64) -> Option<Duration> {
    if !rate_hz.is_finite() || rate_hz <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(1.0 / rate_hz).ok()
}

/// RT-side rate-limited, non-blocking publisher.
#[derive(Debug)]
pub struct StatePublisher {
    tx: Sender<JointControllerState>,
    period: Duration,
    last_publish: Option<Duration>,
    seq: u64,
    dropped: u64,
}

impl StatePublisher {
    /// Publisher emitting at most `rate_hz` samples per second.
    ///
    /// Returns `None` for a rate of 0 (publishing disabled) or a rate that
    /// is negative, not finite, or too small for its period to fit a
    /// [`Duration`].
    pub fn channel(rate_hz: f64) -> Option<(Self, Receiver<JointControllerState>)> {
        let period = publish_period(rate_hz)?;
        let (tx, rx) = bounded(STATE_CHANNEL_CAPACITY);
        let publisher = Self {
            tx,
            period,
            last_publish: None,
            seq: 0,
            dropped: 0,
        };
        Some((publisher, rx))
    }

    /// Offer the current cycle's values. Returns true if a sample was sent.
    ///
    /// `command` and `output` must have the same length.
    pub fn offer(&mut self, time: Duration, command: &[f64], output: &[f64]) -> bool {
        if let Some(last) = self.last_publish {
            if time < last + self.period {
                return false;
            }
        }
        self.last_publish = Some(time);

        let mut joints = FixedVec::new();
        for (&command, &output) in command.iter().zip(output) {
            if joints
                .push(JointSample {
                    command,
                    output,
                    error: command - output,
                })
                .is_err()
            {
                break;
            }
        }

        let msg = JointControllerState {
            seq: self.seq,
            stamp: time,
            joints,
        };
        match self.tx.try_send(msg) {
            Ok(()) => {
                self.seq += 1;
                true
            }
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                self.dropped += 1;
                false
            }
        }
    }

    /// Samples dropped because the consumer was slow or gone.
    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
