use crate::graph::node::{GraphNode, RenderCtx};

/// Frames of modulator rendered per pass; keeps the scratch space on the stack.
const CHUNK: usize = 256;

/// Signal multiplied sample by sample with a modulator (usually an envelope).
pub struct Amplify<N, M> {
    pub signal: N,
    pub modulator: M,
}

impl<N, M> Amplify<N, M> {
    pub fn new(signal: N, modulator: M) -> Self {
        Self { signal, modulator }
    }
}

impl<N: GraphNode, M: GraphNode> GraphNode for Amplify<N, M> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        // Render signal into output
        self.signal.render_block(out, ctx);

        // Modulator in stack-sized chunks (RT-safe, no allocation)
        let mut scratch = [0.0f32; CHUNK];
        for chunk in out.chunks_mut(CHUNK) {
            let frames = &mut scratch[..chunk.len()];
            frames.fill(0.0);
            self.modulator.render_block(frames, ctx);

            for (o, m) in chunk.iter_mut().zip(frames.iter()) {
                *o *= *m;
            }
        }
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.signal.note_on(ctx);
        self.modulator.note_on(ctx);
    }

    /// The modulator gates the output, so it alone decides when we are done.
    fn is_active(&self) -> bool {
        self.modulator.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EnvNode, NodeExt, OscNode};

    #[test]
    fn envelope_gates_the_oscillator() {
        let ctx = RenderCtx::from_freq(48_000.0, 800.0);
        let mut node = OscNode::sine().amplify(EnvNode::decay(0.3, 0.01, 0.01));
        assert!(!node.is_active());

        node.note_on(&ctx);
        assert!(node.is_active());

        // 10 ms = 480 frames, spread over several chunks
        let mut out = vec![0.0f32; 1024];
        node.render_block(&mut out, &ctx);

        assert!(out[..480].iter().any(|s| s.abs() > 0.1));
        assert!(out[481..].iter().all(|s| *s == 0.0));
        assert!(!node.is_active());
    }
}
