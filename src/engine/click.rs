//! What a click sounds like and when it should start.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MetronomeError, Result};

/// Sound parameters applied to every click.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickSound {
    /// Sine pitch in Hz
    pub frequency_hz: f32,
    /// Seconds from onset until the envelope reaches `floor`
    pub duration: f32,
    /// Level on the onset sample
    pub peak_gain: f32,
    /// Target of the exponential decay; must stay above zero
    pub floor: f32,
}

impl ClickSound {
    pub const DEFAULT_FREQUENCY_HZ: f32 = 800.0;
    pub const DEFAULT_DURATION: f32 = 0.1;
    pub const DEFAULT_PEAK_GAIN: f32 = 0.3;
    pub const DEFAULT_FLOOR: f32 = 0.01;

    pub fn frequency(mut self, hz: f32) -> Self {
        self.frequency_hz = hz;
        self
    }

    pub fn duration(mut self, seconds: f32) -> Self {
        self.duration = seconds;
        self
    }

    pub fn peak_gain(mut self, gain: f32) -> Self {
        self.peak_gain = gain;
        self
    }

    pub fn floor(mut self, floor: f32) -> Self {
        self.floor = floor;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(20.0..=20_000.0).contains(&self.frequency_hz) {
            return Err(MetronomeError::InvalidConfig(format!(
                "click frequency {} Hz is outside 20..=20000",
                self.frequency_hz
            )));
        }
        if !(self.duration > 0.0 && self.duration.is_finite()) {
            return Err(MetronomeError::InvalidConfig(format!(
                "click duration {} s must be positive",
                self.duration
            )));
        }
        if !(self.peak_gain > 0.0 && self.peak_gain <= 1.0) {
            return Err(MetronomeError::InvalidConfig(format!(
                "peak gain {} must be in (0, 1]",
                self.peak_gain
            )));
        }
        if !(self.floor > 0.0 && self.floor < self.peak_gain) {
            return Err(MetronomeError::InvalidConfig(format!(
                "envelope floor {} must be above zero and below the peak gain",
                self.floor
            )));
        }
        Ok(())
    }

    /// Request for one click starting at `time` (scheduler clock seconds).
    pub fn at(&self, time: f64) -> ClickRequest {
        ClickRequest {
            time,
            frequency_hz: self.frequency_hz,
            duration: self.duration,
            peak_gain: self.peak_gain,
            floor: self.floor,
        }
    }
}

impl Default for ClickSound {
    fn default() -> Self {
        Self {
            frequency_hz: Self::DEFAULT_FREQUENCY_HZ,
            duration: Self::DEFAULT_DURATION,
            peak_gain: Self::DEFAULT_PEAK_GAIN,
            floor: Self::DEFAULT_FLOOR,
        }
    }
}

/// One fire-and-forget click handed from the control loop to the audio engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickRequest {
    /// Onset in scheduler clock seconds
    pub time: f64,
    pub frequency_hz: f32,
    pub duration: f32,
    pub peak_gain: f32,
    pub floor: f32,
}
