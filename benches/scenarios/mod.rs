//! Scenario benchmarks: the audio callback and the control loop.

mod engine;
mod scheduler;

pub use engine::bench_engine;
pub use scheduler::bench_scheduler;
