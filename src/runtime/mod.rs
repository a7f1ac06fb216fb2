//! Metronome on a dedicated background thread.
//!
//! The thread owns the `Metronome`, its `DeadlineTimer` and the audio output
//! (cpal streams are not `Send`, so the output is opened on this thread and
//! never leaves it). Between passes the thread blocks on its command channel
//! with the timer deadline as timeout: a command wakes it early, a timeout
//! means the timer fired.
//!
//! ```ignore
//! use clickwork::{engine::CpalBackend, runtime, SchedulerConfig};
//!
//! let metronome = runtime::spawn(CpalBackend::new(), SchedulerConfig::default())?;
//! metronome.set_tempo(96)?;
//! metronome.activate()?;
//! ```

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender, TrySendError};

use crate::{
    engine::backend::AudioBackend,
    error::{MetronomeError, Result},
    metronome::{Metronome, MetronomeEvent},
    scheduler::{DeadlineTimer, SchedulerConfig, Timer},
    tempo::Tempo,
};

/// Events buffered for the host before new ones are dropped.
pub const EVENT_QUEUE_SIZE: usize = 256;

enum Command {
    SetTempo {
        bpm: u32,
        reply: Sender<Result<Tempo>>,
    },
    Activate {
        reply: Sender<Result<()>>,
    },
    Deactivate {
        reply: Sender<()>,
    },
    Shutdown,
}

/// State mirrored out of the thread for cheap queries.
#[derive(Clone)]
struct Shared {
    running: Arc<AtomicBool>,
    tempo: Arc<AtomicU32>,
    dropped: Arc<AtomicU64>,
}

/// Event forwarding from the thread to the host.
struct EventSink {
    tx: Sender<MetronomeEvent>,
    /// Set while the host is behind; cleared by the next successful send
    overflowing: bool,
}

impl EventSink {
    fn send(&mut self, event: MetronomeEvent, dropped: &AtomicU64) {
        match self.tx.try_send(event) {
            Ok(()) => self.overflowing = false,
            Err(TrySendError::Disconnected(_)) => {}
            Err(TrySendError::Full(event)) => {
                dropped.fetch_add(1, Ordering::Relaxed);
                if self.overflowing {
                    tracing::debug!(?event, "event queue full, dropping event");
                } else {
                    self.overflowing = true;
                    tracing::warn!("event queue full; dropping events until the host catches up");
                }
            }
        }
    }
}

/// Control surface for a metronome running on its own thread.
///
/// Dropping the handle stops the metronome, joins the thread and releases
/// the audio output.
pub struct MetronomeHandle {
    commands: Sender<Command>,
    events: Receiver<MetronomeEvent>,
    shared: Shared,
    thread: Option<JoinHandle<()>>,
}

/// Start the scheduler thread. The audio output is opened lazily by the
/// first `activate`.
pub fn spawn<B>(backend: B, config: SchedulerConfig) -> Result<MetronomeHandle>
where
    B: AudioBackend + Send + 'static,
{
    config.validate()?;

    let (command_tx, command_rx) = unbounded();
    let (event_tx, event_rx) = bounded(EVENT_QUEUE_SIZE);
    let shared = Shared {
        running: Arc::new(AtomicBool::new(false)),
        tempo: Arc::new(AtomicU32::new(config.tempo.bpm() as u32)),
        dropped: Arc::new(AtomicU64::new(0)),
    };

    let thread_shared = shared.clone();
    let thread = thread::Builder::new()
        .name("clickwork-scheduler".into())
        .spawn(move || run(backend, config, command_rx, event_tx, thread_shared))
        .map_err(|e| MetronomeError::RuntimeSpawn(e.to_string()))?;

    Ok(MetronomeHandle {
        commands: command_tx,
        events: event_rx,
        shared,
        thread: Some(thread),
    })
}

impl MetronomeHandle {
    /// Set the tempo, clamping into range. Fails with `TempoLocked` while
    /// running.
    pub fn set_tempo(&self, bpm: u32) -> Result<Tempo> {
        self.request(|reply| Command::SetTempo { bpm, reply })?
    }

    /// Start clicking; returns once the first scheduling pass has run.
    pub fn activate(&self) -> Result<()> {
        self.request(|reply| Command::Activate { reply })?
    }

    pub fn deactivate(&self) -> Result<()> {
        self.request(|reply| Command::Deactivate { reply })
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    pub fn tempo(&self) -> Tempo {
        Tempo::clamped(self.shared.tempo.load(Ordering::Acquire))
    }

    /// Pulses, state changes and faults in the order they happened.
    pub fn events(&self) -> &Receiver<MetronomeEvent> {
        &self.events
    }

    pub fn try_event(&self) -> Option<MetronomeEvent> {
        self.events.try_recv().ok()
    }

    /// Events lost because the host did not read them in time.
    pub fn dropped_events(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }

    /// Stop and join the thread.
    pub fn shutdown(mut self) {
        self.stop_thread();
    }

    fn request<R>(&self, command: impl FnOnce(Sender<R>) -> Command) -> Result<R> {
        let (reply_tx, reply_rx) = bounded(1);
        self.commands
            .send(command(reply_tx))
            .map_err(|_| MetronomeError::RuntimeGone)?;
        reply_rx.recv().map_err(|_| MetronomeError::RuntimeGone)
    }

    fn stop_thread(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        // The thread may already be gone; joining below is what matters
        let _ = self.commands.send(Command::Shutdown);
        if thread.join().is_err() {
            tracing::error!("scheduler thread panicked");
        }
    }
}

impl Drop for MetronomeHandle {
    fn drop(&mut self) {
        self.stop_thread();
    }
}

fn run<B: AudioBackend>(
    backend: B,
    config: SchedulerConfig,
    commands: Receiver<Command>,
    events: Sender<MetronomeEvent>,
    shared: Shared,
) {
    let mut events = EventSink {
        tx: events,
        overflowing: false,
    };
    let mut metronome = match Metronome::new(backend, DeadlineTimer::new(), config) {
        Ok(metronome) => metronome,
        Err(err) => {
            tracing::error!("scheduler thread could not start: {err}");
            return;
        }
    };
    tracing::debug!("scheduler thread started");

    loop {
        let command = match metronome.timer_mut().deadline() {
            Some(deadline) => match commands.recv_deadline(deadline) {
                Ok(command) => Some(command),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            },
            None => match commands.recv() {
                Ok(command) => Some(command),
                Err(_) => break,
            },
        };

        match command {
            None => {
                if let Some(handle) = metronome.timer_mut().take_expired(Instant::now()) {
                    if let Err(err) = metronome.on_timer(handle) {
                        tracing::debug!("scheduling pass failed: {err}");
                    }
                }
                publish(&mut metronome, &shared, &mut events);
            }
            Some(Command::SetTempo { bpm, reply }) => {
                let result = metronome.set_tempo(bpm);
                publish(&mut metronome, &shared, &mut events);
                let _ = reply.send(result);
            }
            Some(Command::Activate { reply }) => {
                let result = metronome.activate();
                publish(&mut metronome, &shared, &mut events);
                let _ = reply.send(result);
            }
            Some(Command::Deactivate { reply }) => {
                metronome.deactivate();
                publish(&mut metronome, &shared, &mut events);
                let _ = reply.send(());
            }
            Some(Command::Shutdown) => break,
        }
    }

    metronome.deactivate();
    publish(&mut metronome, &shared, &mut events);
    tracing::debug!("scheduler thread exiting");
}

fn publish<B: AudioBackend, T: Timer>(
    metronome: &mut Metronome<B, T>,
    shared: &Shared,
    events: &mut EventSink,
) {
    shared
        .running
        .store(metronome.is_running(), Ordering::Release);
    shared
        .tempo
        .store(metronome.tempo().bpm() as u32, Ordering::Release);

    for event in metronome.drain_events() {
        events.send(event, &shared.dropped);
    }
}
