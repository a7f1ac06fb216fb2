//! Re-arm timers for the scheduling loop.
//!
//! The scheduler owns exactly one `Timer`. It arms it after every pass and
//! cancels it on stop; whoever drives the timer calls back into the scheduler
//! with the handle that fired. Handles let the scheduler ignore a firing that
//! raced with a cancel.

use std::time::{Duration, Instant};

use crate::error::{MetronomeError, Result};

/// Identifies one arming of a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

pub trait Timer {
    /// Schedule a single firing `delay` from now.
    fn arm(&mut self, delay: Duration) -> Result<TimerHandle>;

    /// Drop a pending firing. Unknown or already fired handles are ignored.
    fn cancel(&mut self, handle: TimerHandle);
}

/// Single-slot timer backed by `Instant` deadlines.
///
/// The runtime thread sleeps on its command channel until `deadline()` and
/// then collects the expired handle with `take_expired`. Only one deadline
/// can be pending; arming a second one is refused.
#[derive(Debug, Default)]
pub struct DeadlineTimer {
    pending: Option<(TimerHandle, Instant)>,
    next_id: u64,
}

impl DeadlineTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|(_, at)| at)
    }

    /// Take the pending handle if its deadline is at or before `now`.
    pub fn take_expired(&mut self, now: Instant) -> Option<TimerHandle> {
        match self.pending {
            Some((handle, at)) if at <= now => {
                self.pending = None;
                Some(handle)
            }
            _ => None,
        }
    }
}

impl Timer for DeadlineTimer {
    fn arm(&mut self, delay: Duration) -> Result<TimerHandle> {
        if let Some((handle, _)) = self.pending {
            return Err(MetronomeError::TimerArmFailure(format!(
                "timer {} is still pending",
                handle.0
            )));
        }
        let deadline = Instant::now().checked_add(delay).ok_or_else(|| {
            MetronomeError::TimerArmFailure(format!("delay {delay:?} overflows the clock"))
        })?;

        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.pending = Some((handle, deadline));
        Ok(handle)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if matches!(self.pending, Some((pending, _)) if pending == handle) {
            self.pending = None;
        }
    }
}

/// Timer fired by hand, for deterministic tests.
///
/// Records every arm and cancel; `fail_next_arm` simulates an exhausted
/// timer facility.
#[derive(Debug, Default)]
pub struct ManualTimer {
    pending: Option<(TimerHandle, Duration)>,
    next_id: u64,
    armed: usize,
    cancelled: usize,
    fail_next: Option<String>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The pending firing and the delay it was armed with.
    pub fn pending(&self) -> Option<(TimerHandle, Duration)> {
        self.pending
    }

    /// Consume the pending firing, as if its delay elapsed.
    pub fn fire(&mut self) -> Option<TimerHandle> {
        self.pending.take().map(|(handle, _)| handle)
    }

    pub fn fail_next_arm(&mut self, reason: impl Into<String>) {
        self.fail_next = Some(reason.into());
    }

    /// Successful arms so far.
    pub fn armed_count(&self) -> usize {
        self.armed
    }

    /// Cancels that removed a pending firing.
    pub fn cancelled_count(&self) -> usize {
        self.cancelled
    }
}

impl Timer for ManualTimer {
    fn arm(&mut self, delay: Duration) -> Result<TimerHandle> {
        if let Some(reason) = self.fail_next.take() {
            return Err(MetronomeError::TimerArmFailure(reason));
        }
        if let Some((handle, _)) = self.pending {
            return Err(MetronomeError::TimerArmFailure(format!(
                "timer {} is still pending",
                handle.0
            )));
        }
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.pending = Some((handle, delay));
        self.armed += 1;
        Ok(handle)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if matches!(self.pending, Some((pending, _)) if pending == handle) {
            self.pending = None;
            self.cancelled += 1;
        }
    }
}
