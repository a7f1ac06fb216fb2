use crate::{graph::node::RenderCtx, MIN_TIME};

/*
Click Envelope
==============

A metronome click is a single percussive hit: the level jumps straight to
its peak on the start frame and dies away exponentially. There is no
sustain and no note-off; the envelope ends on its own after `duration`.

Vocabulary
----------

  peak        Level on the very first sample (e.g. 0.3).

  floor       Level reached exactly `duration` seconds after the start. An
              exponential curve never touches zero, so the ramp targets a
              small positive value instead (0.01 by default) and the
              envelope cuts to silence right after it.

  ratio       Per-sample multiplier that walks `peak` down to `floor`.


The Shape: Exponential Decay
----------------------------

  Level
   peak ┐╲
        │ ╲
        │  ╲_
        │    ╲__
  floor │       ╲____
    0.0 └────────────┴──→ Time
        start        start + duration

    level(n) = peak * (floor / peak) ^ (n / N)      N = duration * sample_rate

This is the same curve an "exponential ramp to value" produces in most audio
engines: equal time steps give equal ratios of loudness, which is how struck
objects actually decay.


The Math: Duration to Ratio
---------------------------

    ratio = (floor / peak) ^ (1 / N)

Example: peak 0.3, floor 0.01, 100 ms at 48kHz
  - N = 4800 samples
  - ratio = (0.01 / 0.3) ^ (1 / 4800) ≈ 0.999291

Each sample we emit `level` and then do `level *= ratio`. After N samples
the level sits at the floor and the stage returns to Idle.
*/

/// Stage of the one-shot envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,     // Not triggered, or finished; output is 0
    Decaying, // Walking from peak down to floor
}

pub struct Envelope {
    // Shape parameters
    peak: f32,
    floor: f32,
    duration: f32, // seconds from peak to floor

    // Runtime state
    stage: EnvelopeState,
    level: f32,
    ratio: f32,
    remaining_samples: u32,
}

impl Envelope {
    /// Exponential decay from `peak` to `floor` over `duration` seconds.
    ///
    /// `floor` is kept strictly positive and below `peak`.
    pub fn decay(peak: f32, floor: f32, duration: f32) -> Self {
        let peak = peak.clamp(f32::EPSILON, 1.0);
        Self {
            peak,
            floor: floor.clamp(f32::MIN_POSITIVE, peak),
            duration: duration.max(MIN_TIME),

            stage: EnvelopeState::Idle,
            level: 0.0,
            ratio: 1.0,
            remaining_samples: 0,
        }
    }

    /// Start the hit: jump to peak and precompute the per-sample ratio.
    pub fn note_on(&mut self, ctx: &RenderCtx) {
        let total = (self.duration * ctx.sample_rate).round().max(1.0);
        self.ratio = (self.floor / self.peak).powf(1.0 / total);
        self.remaining_samples = total as u32;
        self.level = self.peak;
        self.stage = EnvelopeState::Decaying;
    }

    /// Produce one sample of envelope output.
    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            EnvelopeState::Idle => 0.0,
            EnvelopeState::Decaying => {
                let out = self.level;
                self.level *= self.ratio;
                self.remaining_samples -= 1;

                if self.remaining_samples == 0 {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                }
                out
            }
        }
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    pub fn is_active(&self) -> bool {
        self.stage == EnvelopeState::Decaying
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }
}
