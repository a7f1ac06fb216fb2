//! In-memory backend that records requests instead of playing them.
//!
//! Time comes from a `ManualClock`, so scheduling can be driven step by step
//! without a sound card or any sleeping.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::{
    clock::{ManualClock, SchedulerClock},
    engine::{backend::AudioBackend, click::ClickRequest, emitter::AudioEmitter},
    error::{MetronomeError, Result},
};

#[derive(Clone, Debug)]
pub struct RecordingBackend {
    clock: ManualClock,
    requests: Arc<Mutex<Vec<ClickRequest>>>,
    unavailable: Arc<AtomicBool>,
    /// Total requests accepted before `emit` starts failing
    emit_limit: Arc<AtomicUsize>,
    refuse_open: Arc<AtomicBool>,
    opened: Arc<AtomicUsize>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self {
            clock: ManualClock::default(),
            requests: Arc::default(),
            unavailable: Arc::default(),
            emit_limit: Arc::new(AtomicUsize::new(usize::MAX)),
            refuse_open: Arc::default(),
            opened: Arc::default(),
        }
    }
}

impl RecordingBackend {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            ..Self::default()
        }
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// Every request emitted so far, in emission order.
    pub fn requests(&self) -> Vec<ClickRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Onset times of every request emitted so far.
    pub fn times(&self) -> Vec<f64> {
        self.requests().iter().map(|r| r.time).collect()
    }

    /// Make every subsequent `emit` fail as if the device went away.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Release);
    }

    /// Accept `total` requests overall, then fail like a lost device.
    pub fn fail_after(&self, total: usize) {
        self.emit_limit.store(total, Ordering::Release);
    }

    /// Make `open` fail.
    pub fn refuse_open(&self, refuse: bool) {
        self.refuse_open.store(refuse, Ordering::Release);
    }

    /// How many times an output has been opened.
    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::Acquire)
    }
}

impl AudioBackend for RecordingBackend {
    type Output = RecordingEmitter;

    fn open(&mut self) -> Result<RecordingEmitter> {
        if self.refuse_open.load(Ordering::Acquire) {
            return Err(MetronomeError::AudioUnavailable(
                "recording backend refused to open".into(),
            ));
        }
        self.opened.fetch_add(1, Ordering::AcqRel);
        Ok(RecordingEmitter {
            backend: self.clone(),
        })
    }
}

pub struct RecordingEmitter {
    backend: RecordingBackend,
}

impl AudioEmitter for RecordingEmitter {
    fn now(&self) -> f64 {
        self.backend.clock.now()
    }

    fn emit(&mut self, request: &ClickRequest) -> Result<()> {
        if self.backend.unavailable.load(Ordering::Acquire) {
            return Err(MetronomeError::AudioUnavailable(
                "recording backend marked unavailable".into(),
            ));
        }
        let mut requests = self
            .backend
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if requests.len() >= self.backend.emit_limit.load(Ordering::Acquire) {
            return Err(MetronomeError::AudioUnavailable(
                "recording backend ran out of room".into(),
            ));
        }
        requests.push(*request);
        Ok(())
    }
}
