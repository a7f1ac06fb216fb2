//! Lookahead scheduler: the control loop that keeps the click queue full.
//!
//! Each pass queues every beat whose onset falls before `now + lookahead`,
//! then re-arms the timer for another pass `poll_interval` later. The timer
//! only decides *when we look*; onsets are exact timestamps the emitter
//! renders on its own clock, so timer jitter never moves a beat.
//!
//! Beat `n` is scheduled at `origin + n * 60 / bpm`. Computing it from the
//! beat index instead of accumulating intervals keeps the sequence on the
//! ideal grid however many passes it takes to get there.

pub mod config;
pub mod timer;

use crate::{
    engine::emitter::AudioEmitter,
    error::{MetronomeError, Result},
    tempo::Tempo,
};

pub use config::SchedulerConfig;

/// Lookahead windows the output clock may stand still before the output
/// counts as lost.
pub const STALL_LOOKAHEADS: u32 = 4;
pub use timer::{DeadlineTimer, ManualTimer, Timer, TimerHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No re-arm pending, nothing emitted
    Idle,
    /// Exactly one re-arm pending between passes
    Running,
}

/// A beat handed to the emitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    /// Index since the last activation, starting at 0
    pub beat: u64,
    /// Onset on the emitter's clock
    pub time: f64,
}

pub struct LookaheadScheduler<T: Timer> {
    config: SchedulerConfig,
    tempo: Tempo,
    state: RunState,
    /// Onset of beat 0 for the current run
    origin: f64,
    /// Index of the next beat not yet handed to the emitter
    beat: u64,
    pending: Option<TimerHandle>,
    timer: T,
}

impl<T: Timer> LookaheadScheduler<T> {
    pub fn new(config: SchedulerConfig, timer: T) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            tempo: config.tempo,
            config,
            state: RunState::Idle,
            origin: 0.0,
            beat: 0,
            pending: None,
            timer,
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Onset of the next beat that has not been emitted yet.
    pub fn next_pulse_time(&self) -> f64 {
        self.origin + self.beat as f64 * self.tempo.seconds_per_beat()
    }

    /// Beats emitted since the last activation.
    pub fn beats_scheduled(&self) -> u64 {
        self.beat
    }

    pub fn pending_timer(&self) -> Option<TimerHandle> {
        self.pending
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// Change tempo for the next activation. Out-of-range values are clamped.
    ///
    /// Fails with `TempoLocked` while running.
    pub fn set_tempo(&mut self, bpm: u32) -> Result<Tempo> {
        if self.is_running() {
            tracing::warn!(bpm, "tempo change refused while running");
            return Err(MetronomeError::TempoLocked);
        }
        self.tempo = Tempo::clamped(bpm);
        Ok(self.tempo)
    }

    /// Start from the emitter's current time and run the first pass at once.
    ///
    /// Does nothing (and returns no pulses) if already running.
    pub fn activate<E: AudioEmitter>(&mut self, emitter: &mut E) -> Result<Vec<Pulse>> {
        let mut pulses = Vec::new();
        self.activate_into(emitter, &mut pulses).map(|()| pulses)
    }

    /// `activate`, appending queued pulses to `pulses`. Pulses queued before
    /// a failure are kept there.
    pub fn activate_into<E: AudioEmitter>(
        &mut self,
        emitter: &mut E,
        pulses: &mut Vec<Pulse>,
    ) -> Result<()> {
        if self.is_running() {
            tracing::debug!("activate ignored: already running");
            return Ok(());
        }

        self.origin = emitter.now();
        self.beat = 0;
        self.state = RunState::Running;
        tracing::info!(tempo = %self.tempo, origin = self.origin, "scheduler started");

        self.step(emitter, pulses)
    }

    /// Timer callback. Firings that are stale or arrive while idle are ignored.
    pub fn on_timer<E: AudioEmitter>(
        &mut self,
        handle: TimerHandle,
        emitter: &mut E,
    ) -> Result<Vec<Pulse>> {
        let mut pulses = Vec::new();
        self.on_timer_into(handle, emitter, &mut pulses)
            .map(|()| pulses)
    }

    /// `on_timer`, appending queued pulses to `pulses`. Pulses queued before
    /// a failure are kept there.
    pub fn on_timer_into<E: AudioEmitter>(
        &mut self,
        handle: TimerHandle,
        emitter: &mut E,
        pulses: &mut Vec<Pulse>,
    ) -> Result<()> {
        if !self.is_running() || self.pending != Some(handle) {
            tracing::trace!(timer = handle.id(), "ignoring stale timer firing");
            return Ok(());
        }
        self.pending = None;
        self.step(emitter, pulses)
    }

    /// Cancel the pending re-arm and go idle. Clicks already handed to the
    /// emitter still play.
    ///
    /// Returns whether the scheduler was running.
    pub fn deactivate(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.halt();
        tracing::info!(beats = self.beat, "scheduler stopped");
        true
    }

    fn step<E: AudioEmitter>(&mut self, emitter: &mut E, pulses: &mut Vec<Pulse>) -> Result<()> {
        let stall_after = self.config.lookahead * STALL_LOOKAHEADS;
        if let Err(err) = emitter.check_progress(stall_after) {
            self.fail(&err);
            return Err(err);
        }

        let now = emitter.now();
        let horizon = now + self.config.lookahead.as_secs_f64();
        let queued_before = pulses.len();

        while self.next_pulse_time() < horizon {
            let time = self.next_pulse_time();
            if let Err(err) = emitter.emit(&self.config.click.at(time)) {
                self.fail(&err);
                return Err(err);
            }
            tracing::trace!(beat = self.beat, time, "pulse scheduled");
            pulses.push(Pulse {
                beat: self.beat,
                time,
            });
            self.beat += 1;
        }

        if !self.is_running() {
            return Ok(());
        }

        match self.timer.arm(self.config.poll_interval) {
            Ok(handle) => self.pending = Some(handle),
            Err(err) => {
                self.fail(&err);
                return Err(err);
            }
        }

        tracing::debug!(
            now,
            queued = pulses.len() - queued_before,
            next = self.next_pulse_time(),
            "scheduling pass"
        );
        Ok(())
    }

    fn halt(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.timer.cancel(handle);
        }
        self.state = RunState::Idle;
    }

    fn fail(&mut self, err: &MetronomeError) {
        tracing::error!(beats = self.beat, "scheduler halted: {err}");
        self.halt();
    }
}
