//! Single-slot seqlock command mailbox.
//!
//! One slot holds the latest command vector. Producers overwrite it
//! unconditionally (last write wins); the RT cycle snapshot-reads it.
//!
//! ## Protocol
//!
//! Writer (serialised among producers by a mutex the reader never touches):
//! 1. `seq` → odd
//! 2. store payload words
//! 3. `seq` → even (release)
//!
//! Reader (lock-free, allocation-free):
//! 1. load `seq` (acquire); odd means a write is in progress, retry
//! 2. copy payload words into a scratch buffer
//! 3. fence, re-load `seq`; accept only if unchanged
//!
//! After [`MAX_READ_RETRIES`] failed attempts the reader gives up for this
//! cycle and the caller keeps its previously applied command. A vector is
//! therefore always applied whole or not at all.

use std::hint::spin_loop;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering, fence};

use parking_lot::Mutex;
use tracing::warn;
use vctl_common::consts::MAX_JOINTS;

use crate::error::CommandError;

/// Snapshot attempts per RT read before giving up for the cycle.
pub const MAX_READ_RETRIES: u32 = 8;

/// Shared slot.
#[derive(Debug)]
struct Slot {
    /// Even: stable. Odd: write in progress.
    seq: AtomicU64,
    /// Fixed command length.
    len: usize,
    /// f64 bits.
    words: [AtomicU64; MAX_JOINTS],
    /// Serialises producers.
    writer: Mutex<()>,
}

impl Slot {
    /// Sequence of the next stable state: a write in progress counts as
    /// already published.
    #[inline]
    fn settled_seq(&self) -> u64 {
        (self.seq.load(Ordering::Acquire) + 1) & !1
    }
}

/// Result of one RT poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A newer command was copied out.
    Fresh,
    /// Nothing newer than the last accepted command.
    Unchanged,
    /// Every attempt collided with a write; output left untouched.
    Contended,
}

/// RT-side end of the mailbox. Owned by exactly one controller.
#[derive(Debug)]
pub struct CommandMailbox {
    slot: Arc<Slot>,
    /// Sequence of the last accepted (or deliberately skipped) snapshot.
    last_seen: u64,
    contended: u64,
}

impl CommandMailbox {
    /// Mailbox for commands of exactly `len` entries, initially all zero.
    ///
    /// Returns `None` if `len` is zero or exceeds [`MAX_JOINTS`].
    pub fn new(len: usize) -> Option<Self> {
        if len == 0 || len > MAX_JOINTS {
            return None;
        }
        Some(Self {
            slot: Arc::new(Slot {
                seq: AtomicU64::new(0),
                len,
                words: [const { AtomicU64::new(0) }; MAX_JOINTS],
                writer: Mutex::new(()),
            }),
            last_seen: 0,
            contended: 0,
        })
    }

    /// Command length.
    #[inline]
    pub fn len(&self) -> usize {
        self.slot.len
    }

    /// Always false for a constructed mailbox.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slot.len == 0
    }

    /// New producer handle.
    pub fn sender(&self) -> CommandSender {
        CommandSender {
            slot: Arc::clone(&self.slot),
        }
    }

    /// Copy the published command into `out` if it is newer than the last
    /// one accepted.
    ///
    /// RT-safe: no locks, no allocation, at most [`MAX_READ_RETRIES`]
    /// snapshot attempts. `out` is only written on [`ReadOutcome::Fresh`].
    pub fn poll(&mut self, out: &mut [f64]) -> ReadOutcome {
        let slot = &*self.slot;
        let n = slot.len.min(out.len());
        let mut scratch = [0.0f64; MAX_JOINTS];

        for _ in 0..MAX_READ_RETRIES {
            let s1 = slot.seq.load(Ordering::Acquire);
            if s1 & 1 == 1 {
                spin_loop();
                continue;
            }
            if s1 <= self.last_seen {
                return ReadOutcome::Unchanged;
            }

            for (dst, word) in scratch[..n].iter_mut().zip(&slot.words[..n]) {
                *dst = f64::from_bits(word.load(Ordering::Relaxed));
            }
            fence(Ordering::Acquire);
            let s2 = slot.seq.load(Ordering::Relaxed);

            if s1 == s2 {
                out[..n].copy_from_slice(&scratch[..n]);
                self.last_seen = s1;
                return ReadOutcome::Fresh;
            }
            spin_loop();
        }

        self.contended += 1;
        ReadOutcome::Contended
    }

    /// Treat everything published so far, including a write in progress,
    /// as already seen.
    pub fn mark_stale(&mut self) {
        self.last_seen = self.slot.settled_seq();
    }

    /// Polls that gave up because of concurrent writes.
    #[inline]
    pub fn contended_reads(&self) -> u64 {
        self.contended
    }
}

/// Producer handle. Cheap to clone; usable from any non-RT thread.
#[derive(Debug, Clone)]
pub struct CommandSender {
    slot: Arc<Slot>,
}

impl CommandSender {
    /// Number of entries a command must have.
    #[inline]
    pub fn len(&self) -> usize {
        self.slot.len
    }

    /// Always false for a constructed sender.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slot.len == 0
    }

    /// Publish a command vector, replacing any pending one.
    ///
    /// ±∞ is accepted (it saturates to the joint bound downstream).
    ///
    /// # Errors
    /// - `CommandError::LengthMismatch` if `values.len()` differs from the
    ///   joint count.
    /// - `CommandError::NotANumber` for the first NaN entry.
    ///
    /// On error nothing is published and the previous command stays in effect.
    pub fn send(&self, values: &[f64]) -> Result<(), CommandError> {
        if let Err(e) = self.check(values) {
            warn!("Rejected command: {e}");
            return Err(e);
        }

        let slot = &*self.slot;
        let _guard = slot.writer.lock();

        let s = slot.seq.load(Ordering::Relaxed);
        slot.seq.store(s + 1, Ordering::Relaxed);
        fence(Ordering::Release);

        for (word, v) in slot.words.iter().zip(values) {
            word.store(v.to_bits(), Ordering::Relaxed);
        }

        slot.seq.store(s + 2, Ordering::Release);
        Ok(())
    }

    /// Publish a one-entry command.
    pub fn send_scalar(&self, value: f64) -> Result<(), CommandError> {
        self.send(&[value])
    }

    fn check(&self, values: &[f64]) -> Result<(), CommandError> {
        if values.len() != self.slot.len {
            return Err(CommandError::LengthMismatch {
                expected: self.slot.len,
                actual: values.len(),
            });
        }
        match values.iter().position(|v| v.is_nan()) {
            Some(index) => Err(CommandError::NotANumber { index }),
            None => Ok(()),
        }
    }
}
