//! Control-thread side of click emission.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rtrb::Producer;

use crate::{
    clock::{EngineClock, SchedulerClock},
    engine::click::ClickRequest,
    error::{MetronomeError, Result},
};

/// Renders one click at an exact time on the emitter's own clock.
///
/// `emit` returns as soon as the request is handed over; the onset is
/// honoured by whatever renders audio, not by the caller's timing.
pub trait AudioEmitter {
    /// Current time on the clock that `ClickRequest::time` is measured against.
    fn now(&self) -> f64;

    fn emit(&mut self, request: &ClickRequest) -> Result<()>;

    /// Fail if the output has stopped making progress for longer than
    /// `stall_after`. Called once per scheduling pass.
    fn check_progress(&mut self, _stall_after: Duration) -> Result<()> {
        Ok(())
    }
}

/// Emitter feeding a `ClickEngine` through a lock-free queue.
pub struct OutputEmitter {
    tx: Producer<ClickRequest>,
    clock: EngineClock,
    fault: Arc<AtomicBool>,
    /// Frame counter at the last check and when it was last seen moving
    last_frame: u64,
    last_progress: Instant,
}

impl OutputEmitter {
    pub(crate) fn new(tx: Producer<ClickRequest>, clock: EngineClock, fault: Arc<AtomicBool>) -> Self {
        Self {
            last_frame: clock.frame(),
            last_progress: Instant::now(),
            tx,
            clock,
            fault,
        }
    }

    /// Flag the output stream raises when the device errors out.
    pub fn fault_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.fault)
    }

    fn check_fault(&self) -> Result<()> {
        if self.fault.load(Ordering::Acquire) {
            return Err(MetronomeError::AudioUnavailable(
                "output stream reported an error".into(),
            ));
        }
        Ok(())
    }
}

impl AudioEmitter for OutputEmitter {
    fn now(&self) -> f64 {
        self.clock.now()
    }

    fn emit(&mut self, request: &ClickRequest) -> Result<()> {
        self.check_fault()?;
        self.tx.push(*request).map_err(|_| {
            MetronomeError::AudioUnavailable(
                "click queue is full; the audio engine is not consuming".into(),
            )
        })
    }

    /// The callback may stop without raising an error (suspended device);
    /// a frame counter that stops moving is the only sign of it.
    fn check_progress(&mut self, stall_after: Duration) -> Result<()> {
        self.check_fault()?;

        let frame = self.clock.frame();
        if frame != self.last_frame {
            self.last_frame = frame;
            self.last_progress = Instant::now();
            return Ok(());
        }

        let stalled = self.last_progress.elapsed();
        if stalled > stall_after {
            return Err(MetronomeError::AudioUnavailable(format!(
                "audio engine stalled: no frames rendered for {} ms",
                stalled.as_millis()
            )));
        }
        Ok(())
    }
}
