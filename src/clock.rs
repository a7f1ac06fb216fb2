//! Monotonic clocks that all scheduling arithmetic is expressed in.
//!
//! Times are `f64` seconds since the clock was created. Wall-clock time is
//! never used: the scheduler only ever compares timestamps taken from the
//! same clock the audio engine renders against.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A time source that never runs backwards.
pub trait SchedulerClock {
    /// Current time in seconds.
    fn now(&self) -> f64;
}

/// Frame counter advanced by the audio callback.
///
/// This is the clock the emitter hands out: a click scheduled for `t` starts
/// on frame `round(t * sample_rate)`, so the control thread and the audio
/// thread agree on time down to a single sample.
#[derive(Clone, Debug)]
pub struct EngineClock {
    frames: Arc<AtomicU64>,
    sample_rate: f64,
}

impl EngineClock {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
            sample_rate: sample_rate as f64,
        }
    }

    /// Frames rendered so far (called from the control thread).
    pub fn frame(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    /// Advance by one rendered block (called from the audio callback).
    pub fn advance(&self, frames: usize) {
        self.frames.fetch_add(frames as u64, Ordering::Release);
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate as f32
    }

    /// Frame on which an event at `seconds` begins.
    pub fn frame_at(&self, seconds: f64) -> u64 {
        (seconds.max(0.0) * self.sample_rate).round() as u64
    }
}

impl SchedulerClock for EngineClock {
    fn now(&self) -> f64 {
        self.frame() as f64 / self.sample_rate
    }
}

/// Hand-driven clock for deterministic tests and offline runs.
///
/// Clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    bits: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(seconds: f64) -> Self {
        let clock = Self::new();
        clock.set(seconds);
        clock
    }

    /// Jump to `seconds`. Earlier times are ignored.
    pub fn set(&self, seconds: f64) {
        let now = self.now();
        if seconds > now {
            self.bits.store(seconds.to_bits(), Ordering::Release);
        }
    }

    pub fn advance(&self, seconds: f64) {
        self.set(self.now() + seconds.max(0.0));
    }
}

impl SchedulerClock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }
}
