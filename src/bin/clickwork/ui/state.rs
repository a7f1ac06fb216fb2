//! What the UI knows about the metronome between frames

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use clickwork::{MetronomeEvent, Pulse, Tempo};

/// How long the beat indicator stays lit
const FLASH: Duration = Duration::from_millis(100);

pub struct UiState {
    pub tempo: Tempo,
    pub running: bool,
    /// Last beat that has actually sounded
    pub beat: Option<u64>,
    /// Status line text (errors, hints)
    pub status: Option<String>,
    /// Output clock time matched to the instant we learned about it
    origin: Option<(Instant, f64)>,
    /// Pulses handed to the audio output that have not sounded yet
    upcoming: VecDeque<Pulse>,
    flash_until: Option<Instant>,
}

impl UiState {
    pub fn new(tempo: Tempo) -> Self {
        Self {
            tempo,
            running: false,
            beat: None,
            status: None,
            origin: None,
            upcoming: VecDeque::new(),
            flash_until: None,
        }
    }

    pub fn apply(&mut self, event: MetronomeEvent, received: Instant) {
        match event {
            MetronomeEvent::Started { at } => {
                self.origin = Some((received, at));
                self.upcoming.clear();
                self.beat = None;
                self.status = None;
            }
            MetronomeEvent::Pulse(pulse) => self.upcoming.push_back(pulse),
            MetronomeEvent::Stopped => {
                self.origin = None;
                self.upcoming.clear();
                self.flash_until = None;
            }
            MetronomeEvent::Fault(err) => self.status = Some(err.to_string()),
        }
    }

    /// Move pulses whose time has come into `beat`.
    pub fn tick(&mut self, now: Instant) {
        let Some((instant, at)) = self.origin else {
            return;
        };

        while let Some(pulse) = self.upcoming.front() {
            let offset = Duration::from_secs_f64((pulse.time - at).max(0.0));
            let sounds_at = instant + offset;
            if sounds_at > now {
                break;
            }
            self.beat = Some(pulse.beat);
            self.flash_until = Some(sounds_at + FLASH);
            self.upcoming.pop_front();
        }
    }

    pub fn is_flashing(&self, now: Instant) -> bool {
        self.flash_until.is_some_and(|until| now < until)
    }
}
