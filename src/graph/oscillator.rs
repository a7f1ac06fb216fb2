use crate::dsp::oscillator::OscillatorBlock;
use crate::graph::node::{GraphNode, RenderCtx};

/// Audio-band sine oscillator.
///
/// A pure sine is the whole timbre of the click; the envelope does the rest.
pub struct OscNode {
    osc: OscillatorBlock,
    /// Fixed frequency (Hz). If Some, ignores ctx.frequency and uses this instead.
    base_frequency: Option<f32>,
}

impl OscNode {
    pub fn sine() -> Self {
        Self {
            osc: OscillatorBlock::sine(),
            base_frequency: None,
        }
    }

    /// Pin the pitch, ignoring the frequency from RenderCtx.
    pub fn with_frequency(mut self, freq: f32) -> Self {
        // Clamp to audible range (20 Hz - 20 kHz)
        self.base_frequency = Some(freq.clamp(20.0, 20_000.0));
        self
    }
}

impl GraphNode for OscNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let ctx = RenderCtx {
            frequency: self.base_frequency.unwrap_or(ctx.frequency),
            ..*ctx
        };
        self.osc.render(out, &ctx);
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        self.osc.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn fixed_frequency_overrides_context() {
        let sample_rate = 48_000.0;
        let ctx = RenderCtx::from_freq(sample_rate, 440.0);
        let mut osc = OscNode::sine().with_frequency(800.0);

        let mut buffer = vec![0.0f32; 64];
        osc.render_block(&mut buffer, &ctx);

        let sample_index = 12;
        let expected = (TAU * 800.0 * sample_index as f32 / sample_rate).sin();
        let actual = buffer[sample_index];
        assert!(
            (actual - expected).abs() < 1e-4,
            "expected {expected}, got {actual}"
        );
    }
}
