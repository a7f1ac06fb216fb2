use crate::{
    dsp::envelope::Envelope,
    graph::node::{GraphNode, RenderCtx},
};

/// Graph wrapper around the one-shot decay envelope.
pub struct EnvNode {
    env: Envelope,
}

impl EnvNode {
    pub fn decay(peak: f32, floor: f32, duration: f32) -> Self {
        Self {
            env: Envelope::decay(peak, floor, duration),
        }
    }
}

impl GraphNode for EnvNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        self.env.render(out);
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.env.note_on(ctx);
    }

    fn is_active(&self) -> bool {
        self.env.is_active()
    }
}
