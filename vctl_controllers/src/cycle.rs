//! Periodic controller host: starting → update loop → stopping.
//!
//! ## RT Setup Sequence
//! 1. `mlockall(MCL_CURRENT | MCL_FUTURE)` - lock all pages.
//! 2. Prefault stack pages.
//! 3. `sched_setaffinity` - pin to an isolated CPU core.
//! 4. `sched_setscheduler(SCHED_FIFO, prio)` - RT priority.
//!
//! ## Cycle Loop
//! Absolute-time pacing: `clock_nanosleep(TIMER_ABSTIME)` on
//! `CLOCK_MONOTONIC` with the `rt` feature, deadline-based
//! `std::thread::sleep` otherwise. Each cycle calls the controller's
//! `update(time, period)` and then the host's write phase (the hardware
//! write-out). Overruns are counted and logged; the loop keeps running.
//!
//! Shutdown is cooperative: the loop observes an `AtomicBool` and calls
//! `stopping` before returning, so the actuators see 0.0 before the
//! hardware interface is released.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

use crate::control::Controller;
use crate::state::TransitionResult;

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-cycle timing statistics.
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycle_count: u64,
    /// Last cycle body duration [ns].
    pub last_cycle_ns: i64,
    /// Minimum cycle body duration [ns].
    pub min_cycle_ns: i64,
    /// Maximum cycle body duration [ns].
    pub max_cycle_ns: i64,
    /// Running sum for average computation.
    pub sum_cycle_ns: i64,
    /// Cycles whose body exceeded the budget.
    pub overruns: u64,
    /// Maximum wake-up latency [ns].
    pub max_latency_ns: i64,
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleStats {
    /// Zeroed stats.
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: i64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
            max_latency_ns: 0,
        }
    }

    /// Record one cycle. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, duration_ns: i64, latency_ns: i64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        self.min_cycle_ns = self.min_cycle_ns.min(duration_ns);
        self.max_cycle_ns = self.max_cycle_ns.max(duration_ns);
        self.sum_cycle_ns += duration_ns;
        self.max_latency_ns = self.max_latency_ns.max(latency_ns);
    }

    /// Average cycle body duration [ns] (0 if no cycles).
    #[inline]
    pub fn avg_cycle_ns(&self) -> i64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.sum_cycle_ns / self.cycle_count as i64
        }
    }
}

// ─── RT Setup ───────────────────────────────────────────────────────

/// Errors during RT setup or cycle pacing.
#[derive(Debug, Error)]
pub enum CycleError {
    /// RT system call failed.
    #[error("RT setup error: {0}")]
    RtSetup(String),

    /// Cycle time outside the accepted range.
    #[error("invalid cycle time {0:?}")]
    InvalidCycleTime(Duration),
}

#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), CycleError> {
    use nix::sys::mman::{MlockallFlags, mlockall};
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| CycleError::RtSetup(format!("mlockall failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), CycleError> {
    Ok(())
}

/// Touch 256 KiB of stack so the cycle does not fault it in.
fn prefault_stack() {
    let mut buf = [0u8; 256 * 1024];
    for byte in buf.iter_mut() {
        // SAFETY: `byte` is a valid, exclusive reference into `buf`.
        unsafe { core::ptr::write_volatile(byte, 0xFF) };
    }
    core::hint::black_box(&buf);
}

#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), CycleError> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| CycleError::RtSetup(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| CycleError::RtSetup(format!("sched_setaffinity failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), CycleError> {
    Ok(())
}

#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), CycleError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    // SAFETY: `param` is a valid sched_param; pid 0 is the calling thread.
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(CycleError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), CycleError> {
    Ok(())
}

/// Full RT setup. Call on the cycle thread before [`CycleRunner::run`].
///
/// Without the `rt` feature every step except stack prefaulting is a no-op.
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), CycleError> {
    rt_mlockall()?;
    prefault_stack();
    rt_set_affinity(cpu_core)?;
    rt_set_scheduler(rt_priority)?;
    Ok(())
}

// ─── Pacing ─────────────────────────────────────────────────────────

/// Drift-free absolute-deadline pacing.
struct Pacer {
    period: Duration,
    #[cfg(feature = "rt")]
    next_wake: nix::sys::time::TimeSpec,
    #[cfg(not(feature = "rt"))]
    next_wake: Instant,
}

impl Pacer {
    #[cfg(feature = "rt")]
    fn new(period: Duration) -> Result<Self, CycleError> {
        use nix::time::{ClockId, clock_gettime};
        let now = clock_gettime(ClockId::CLOCK_MONOTONIC)
            .map_err(|e| CycleError::RtSetup(format!("clock_gettime: {e}")))?;
        Ok(Self {
            period,
            next_wake: now,
        })
    }

    #[cfg(not(feature = "rt"))]
    fn new(period: Duration) -> Result<Self, CycleError> {
        Ok(Self {
            period,
            next_wake: Instant::now(),
        })
    }

    /// Sleep until the next cycle boundary. Returns the wake latency [ns].
    #[cfg(feature = "rt")]
    fn wait(&mut self) -> i64 {
        use nix::time::{ClockId, ClockNanosleepFlags, clock_gettime, clock_nanosleep};

        self.next_wake = timespec_add_ns(self.next_wake, self.period.as_nanos() as i64);
        let clock = ClockId::CLOCK_MONOTONIC;
        let _ = clock_nanosleep(clock, ClockNanosleepFlags::TIMER_ABSTIME, &self.next_wake);
        match clock_gettime(clock) {
            Ok(now) => timespec_diff_ns(&now, &self.next_wake).max(0),
            Err(_) => 0,
        }
    }

    #[cfg(not(feature = "rt"))]
    fn wait(&mut self) -> i64 {
        self.next_wake += self.period;
        let now = Instant::now();
        if let Some(remaining) = self.next_wake.checked_duration_since(now) {
            std::thread::sleep(remaining);
        } else {
            // Fell behind by more than a period: resynchronise.
            self.next_wake = now;
        }
        Instant::now()
            .saturating_duration_since(self.next_wake)
            .as_nanos() as i64
    }
}

// ─── Cycle Runner ───────────────────────────────────────────────────

/// Overrun warnings are emitted for the first overrun and then every Nth.
const OVERRUN_LOG_INTERVAL: u64 = 1000;

/// Periodic host for one [`Controller`].
pub struct CycleRunner<C> {
    controller: C,
    cycle_time: Duration,
    stats: CycleStats,
}

impl<C: Controller> CycleRunner<C> {
    /// Runner driving `controller` every `cycle_time`.
    pub fn new(controller: C, cycle_time: Duration) -> Result<Self, CycleError> {
        if cycle_time.is_zero() {
            return Err(CycleError::InvalidCycleTime(cycle_time));
        }
        Ok(Self {
            controller,
            cycle_time,
            stats: CycleStats::new(),
        })
    }

    /// Driven controller.
    pub fn controller(&self) -> &C {
        &self.controller
    }

    /// Driven controller, mutably.
    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }

    /// Timing statistics of the last run.
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// Give the controller back.
    pub fn into_inner(self) -> C {
        self.controller
    }

    /// Run until `running` is cleared.
    ///
    /// `write_phase` runs after every `update` with the measured period; it
    /// is where the host pushes actuator commands to the hardware.
    ///
    /// # Errors
    /// `CycleError::RtSetup` if the monotonic clock cannot be read. Start
    /// rejection is logged and the loop is skipped; `stopping` still runs.
    pub fn run<F>(&mut self, running: &AtomicBool, mut write_phase: F) -> Result<(), CycleError>
    where
        F: FnMut(Duration),
    {
        let budget_ns = self.cycle_time.as_nanos() as i64;
        let epoch = Instant::now();
        let mut pacer = Pacer::new(self.cycle_time)?;
        self.stats = CycleStats::new();

        let started = self.controller.starting(Duration::ZERO);
        info!(
            "{} cycle loop entered (cycle_time={:?})",
            self.controller.type_name(),
            self.cycle_time
        );

        let mut last = epoch;
        if matches!(started, TransitionResult::Ok(_)) {
            while running.load(Ordering::Acquire) {
                let cycle_start = Instant::now();
                let time = cycle_start - epoch;
                let period = cycle_start - last;
                last = cycle_start;

                // ═══ UPDATE ═══
                self.controller.update(time, period);
                // ═══ WRITE ═══
                write_phase(period);

                let duration_ns = cycle_start.elapsed().as_nanos() as i64;
                if duration_ns > budget_ns {
                    self.stats.overruns += 1;
                    if self.stats.overruns == 1
                        || self.stats.overruns % OVERRUN_LOG_INTERVAL == 0
                    {
                        warn!(
                            "Cycle overrun: {duration_ns}ns > {budget_ns}ns budget ({} total)",
                            self.stats.overruns
                        );
                    }
                }

                let latency_ns = pacer.wait();
                self.stats.record(duration_ns, latency_ns);
            }
        }

        self.controller.stopping(epoch.elapsed());
        write_phase(Duration::ZERO);

        info!(
            "Cycle loop left after {} cycles (avg {}ns, max {}ns, {} overruns)",
            self.stats.cycle_count,
            self.stats.avg_cycle_ns(),
            self.stats.max_cycle_ns,
            self.stats.overruns
        );
        Ok(())
    }
}

// ─── Time Helpers ───────────────────────────────────────────────────

#[cfg(feature = "rt")]
fn timespec_add_ns(ts: nix::sys::time::TimeSpec, ns: i64) -> nix::sys::time::TimeSpec {
    use nix::sys::time::TimeSpec;
    let mut secs = ts.tv_sec();
    let mut nanos = ts.tv_nsec() + ns;
    while nanos >= 1_000_000_000 {
        secs += 1;
        nanos -= 1_000_000_000;
    }
    TimeSpec::new(secs, nanos)
}

#[cfg(feature = "rt")]
fn timespec_diff_ns(a: &nix::sys::time::TimeSpec, b: &nix::sys::time::TimeSpec) -> i64 {
    (a.tv_sec() - b.tv_sec()) * 1_000_000_000 + (a.tv_nsec() - b.tv_nsec())
}

// ─── Tests ──────────────────────────────────────────────────────────
