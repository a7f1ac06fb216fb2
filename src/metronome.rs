//! Host-facing metronome: tempo, start/stop and the audio output lifecycle.
//!
//! `Metronome` is single threaded. It owns the backend it was built with and
//! opens the actual output on the first activation, keeping it (and with it
//! the scheduler clock) until the metronome is dropped. For a metronome on
//! its own thread see `runtime::spawn`.

use crate::{
    engine::{backend::AudioBackend, emitter::AudioEmitter},
    error::{MetronomeError, Result},
    scheduler::{LookaheadScheduler, Pulse, SchedulerConfig, Timer, TimerHandle},
    tempo::Tempo,
};

/// Things the host may want to react to, in the order they happened.
#[derive(Debug, Clone, PartialEq)]
pub enum MetronomeEvent {
    /// Scheduling began; beat 0 sounds at `at` on the output clock
    Started { at: f64 },
    /// A beat was handed to the audio output
    Pulse(Pulse),
    /// Scheduling stopped, by request or after a fault
    Stopped,
    /// A fatal error ended the session
    Fault(MetronomeError),
}

pub struct Metronome<B: AudioBackend, T: Timer> {
    backend: B,
    output: Option<B::Output>,
    scheduler: LookaheadScheduler<T>,
    events: Vec<MetronomeEvent>,
}

impl<B: AudioBackend, T: Timer> Metronome<B, T> {
    pub fn new(backend: B, timer: T, config: SchedulerConfig) -> Result<Self> {
        Ok(Self {
            backend,
            output: None,
            scheduler: LookaheadScheduler::new(config, timer)?,
            events: Vec::new(),
        })
    }

    pub fn tempo(&self) -> Tempo {
        self.scheduler.tempo()
    }

    /// Set the tempo, clamping into the supported range.
    ///
    /// Fails with `TempoLocked` while running.
    pub fn set_tempo(&mut self, bpm: u32) -> Result<Tempo> {
        self.scheduler.set_tempo(bpm)
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn scheduler(&self) -> &LookaheadScheduler<T> {
        &self.scheduler
    }

    pub fn timer_mut(&mut self) -> &mut T {
        self.scheduler.timer_mut()
    }

    /// Current output clock time, once the output has been opened.
    pub fn now(&self) -> Option<f64> {
        self.output.as_ref().map(AudioEmitter::now)
    }

    pub fn is_output_open(&self) -> bool {
        self.output.is_some()
    }

    /// Start clicking. Opens the audio output on first use.
    ///
    /// A no-op while already running.
    pub fn activate(&mut self) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }

        if self.output.is_none() {
            match self.backend.open() {
                Ok(output) => self.output = Some(output),
                Err(err) => {
                    tracing::error!("could not open audio output: {err}");
                    self.events.push(MetronomeEvent::Fault(err.clone()));
                    return Err(err);
                }
            }
        }
        let Some(output) = self.output.as_mut() else {
            return Err(MetronomeError::AudioUnavailable("output not open".into()));
        };

        self.events.push(MetronomeEvent::Started { at: output.now() });
        let mut pulses = Vec::new();
        let result = self.scheduler.activate_into(output, &mut pulses);
        self.record(pulses, result)
    }

    /// Stop clicking. Clicks already handed to the output finish naturally.
    pub fn deactivate(&mut self) {
        if self.scheduler.deactivate() {
            self.events.push(MetronomeEvent::Stopped);
        }
    }

    /// Route a timer firing to the scheduler.
    pub fn on_timer(&mut self, handle: TimerHandle) -> Result<()> {
        let Some(output) = self.output.as_mut() else {
            return Ok(());
        };
        let mut pulses = Vec::new();
        let result = self.scheduler.on_timer_into(handle, output, &mut pulses);
        self.record(pulses, result)
    }

    /// Take every event recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<MetronomeEvent> {
        std::mem::take(&mut self.events)
    }

    /// Report every pulse that reached the output, then the fault if any.
    fn record(&mut self, pulses: Vec<Pulse>, result: Result<()>) -> Result<()> {
        self.events
            .extend(pulses.into_iter().map(MetronomeEvent::Pulse));
        if let Err(err) = &result {
            self.events.push(MetronomeEvent::Fault(err.clone()));
            self.events.push(MetronomeEvent::Stopped);
        }
        result
    }
}
