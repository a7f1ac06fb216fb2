//! Low-level DSP primitives used by the click graph nodes.
//!
//! These components are allocation-free and realtime-safe, so the audio
//! callback can own and render them directly.

/// One-shot exponential decay envelope.
pub mod envelope;
/// Sine oscillator.
pub mod oscillator;

pub use envelope::EnvelopeState;
