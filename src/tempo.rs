//! Tempo in whole beats per minute.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MetronomeError, Result};

/// A tempo that is always inside `[Tempo::MIN_BPM, Tempo::MAX_BPM]`.
///
/// Out-of-range input never reaches the scheduler: `Tempo::clamped` pins it
/// to the nearest bound, `Tempo::try_new` rejects it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tempo(u16);

impl Tempo {
    pub const MIN_BPM: u16 = 40;
    pub const MAX_BPM: u16 = 300;
    pub const DEFAULT_BPM: u16 = 120;

    /// Strict constructor: out-of-range values are an error.
    pub fn try_new(bpm: u32) -> Result<Self> {
        if bpm < Self::MIN_BPM as u32 || bpm > Self::MAX_BPM as u32 {
            return Err(MetronomeError::InvalidTempo { bpm });
        }
        Ok(Self(bpm as u16))
    }

    /// Lenient constructor used for user input: clamps into range.
    pub fn clamped(bpm: u32) -> Self {
        match Self::try_new(bpm) {
            Ok(tempo) => tempo,
            Err(err) => {
                let pinned = bpm.clamp(Self::MIN_BPM as u32, Self::MAX_BPM as u32) as u16;
                tracing::warn!("{err}; clamping to {pinned} BPM");
                Self(pinned)
            }
        }
    }

    pub fn bpm(self) -> u16 {
        self.0
    }

    /// Beat interval in seconds (`60 / BPM`).
    pub fn seconds_per_beat(self) -> f64 {
        60.0 / self.0 as f64
    }

    /// Shift by `delta` BPM, staying inside the supported range.
    pub fn nudged(self, delta: i32) -> Self {
        let bpm = (self.0 as i32 + delta).clamp(Self::MIN_BPM as i32, Self::MAX_BPM as i32);
        Self(bpm as u16)
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self(Self::DEFAULT_BPM)
    }
}

impl TryFrom<u32> for Tempo {
    type Error = MetronomeError;

    fn try_from(bpm: u32) -> Result<Self> {
        Self::try_new(bpm)
    }
}

impl From<Tempo> for u32 {
    fn from(tempo: Tempo) -> Self {
        tempo.0 as u32
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} BPM", self.0)
    }
}
