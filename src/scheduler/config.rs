use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    engine::click::ClickSound,
    error::{MetronomeError, Result},
    tempo::Tempo,
};

/// Tuning for the lookahead loop.
///
/// `poll_interval` must be well below `lookahead`: the window then gets
/// refilled several times before it could run dry, even when the re-arm
/// timer is late by about one poll interval.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerConfig {
    /// How far ahead of `now` pulses are queued on each pass
    pub lookahead: Duration,
    /// Delay between passes while running
    pub poll_interval: Duration,
    /// Tempo at construction
    pub tempo: Tempo,
    pub click: ClickSound,
}

impl SchedulerConfig {
    pub const DEFAULT_LOOKAHEAD: Duration = Duration::from_millis(100);
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(25);

    pub fn new() -> Self {
        Self {
            lookahead: Self::DEFAULT_LOOKAHEAD,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            tempo: Tempo::default(),
            click: ClickSound::default(),
        }
    }

    pub fn lookahead(mut self, lookahead: Duration) -> Self {
        self.lookahead = lookahead;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn tempo(mut self, tempo: Tempo) -> Self {
        self.tempo = tempo;
        self
    }

    pub fn click(mut self, click: ClickSound) -> Self {
        self.click = click;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.lookahead.is_zero() || self.poll_interval.is_zero() {
            return Err(MetronomeError::InvalidConfig(
                "lookahead and poll interval must be positive".into(),
            ));
        }
        if self.poll_interval >= self.lookahead {
            return Err(MetronomeError::InvalidConfig(format!(
                "poll interval {:?} must be shorter than the lookahead window {:?}",
                self.poll_interval, self.lookahead
            )));
        }
        self.click.validate()
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new()
    }
}
