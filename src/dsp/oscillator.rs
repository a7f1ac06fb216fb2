use std::f32::consts::TAU;

use crate::graph::node::RenderCtx;

/// Phase-accumulating sine oscillator.
///
/// Phase is kept in cycles (`0.0..1.0`) so long renders never lose precision
/// to an ever-growing angle.
pub struct OscillatorBlock {
    phase: f32,
}

impl OscillatorBlock {
    pub fn sine() -> Self {
        Self { phase: 0.0 }
    }

    /// Restart at zero phase so every click has the same waveform.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    pub fn render(&mut self, destination: &mut [f32], ctx: &RenderCtx) {
        let increment = ctx.frequency / ctx.sample_rate;
        for sample in destination.iter_mut() {
            *sample = (TAU * self.phase).sin();
            self.phase += increment;
            if self.phase >= 1.0 {
                self.phase -= 1.0;
            }
        }
    }
}
