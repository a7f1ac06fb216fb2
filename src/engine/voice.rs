//! A single click being rendered on the audio thread.

use crate::{
    engine::click::ClickRequest,
    graph::{Amplify, EnvNode, GraphNode, NodeExt, OscNode, RenderCtx},
};

/// One sound-generation unit: a sine amplified by its decay envelope,
/// pinned to an absolute start frame.
///
/// Created per request and retired by the engine once the envelope is done.
pub struct ClickVoice {
    start_frame: u64,
    started: bool,
    ctx: RenderCtx,
    node: Amplify<OscNode, EnvNode>,
}

impl ClickVoice {
    pub fn new(request: &ClickRequest, start_frame: u64, sample_rate: f32) -> Self {
        let node = OscNode::sine()
            .with_frequency(request.frequency_hz)
            .amplify(EnvNode::decay(
                request.peak_gain,
                request.floor,
                request.duration,
            ));

        Self {
            start_frame,
            started: false,
            ctx: RenderCtx::from_freq(sample_rate, request.frequency_hz),
            node,
        }
    }

    pub fn start_frame(&self) -> u64 {
        self.start_frame
    }

    /// True once the click has played out completely.
    pub fn is_finished(&self) -> bool {
        self.started && !self.node.is_active()
    }

    /// Mix this click into `out`, which covers frames
    /// `block_start..block_start + out.len()`.
    ///
    /// `scratch` must be at least `out.len()` long. A click whose start frame
    /// has already passed starts on the first frame of the block.
    pub fn mix_into(&mut self, out: &mut [f32], block_start: u64, scratch: &mut [f32]) {
        let block_end = block_start + out.len() as u64;
        if self.start_frame >= block_end || self.is_finished() {
            return;
        }

        let offset = if self.started {
            0
        } else {
            self.started = true;
            self.node.note_on(&self.ctx);
            self.start_frame.saturating_sub(block_start) as usize
        };

        let rendered = &mut scratch[..out.len() - offset];
        self.node.render_block(rendered, &self.ctx);

        for (o, s) in out[offset..].iter_mut().zip(rendered.iter()) {
            *o += *s;
        }
    }
}
