//! Lookahead click scheduling for metronomes.
//!
//! A coarse, jittery control loop (`scheduler`) queues every beat that falls
//! inside a short lookahead window; a realtime audio engine (`engine`) starts
//! each click on its exact sample frame. Timer jitter on the control side
//! therefore never reaches the audible output.

pub mod clock;
pub mod dsp; // Oscillator and envelope primitives
pub mod engine; // Audio emitter and click rendering
pub mod error;
pub mod graph; // Click voice building blocks
pub mod metronome;
pub mod runtime; // Background scheduler thread
pub mod scheduler;
pub mod tempo;

pub use error::{MetronomeError, Result};
pub use metronome::{Metronome, MetronomeEvent};
pub use scheduler::{LookaheadScheduler, Pulse, RunState, SchedulerConfig};
pub use tempo::Tempo;

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
