//! Graph nodes that make up a click voice.
//!
//! Nodes wrap the low-level DSP primitives with triggering and block-based
//! rendering. A click is `OscNode::sine().amplify(EnvNode::decay(..))`; see
//! `engine::voice`.

/// Signal times modulator.
pub mod amplify;
/// Envelope node (one-shot exponential decay).
pub mod envelope;
/// Fluent `.amplify()` composition.
pub mod extensions;
/// Core traits shared by all graph nodes.
pub mod node;
/// Sine oscillator node.
pub mod oscillator;

pub use amplify::Amplify;
pub use envelope::EnvNode;
pub use extensions::NodeExt;
pub use node::{GraphNode, RenderCtx};
pub use oscillator::OscNode;
