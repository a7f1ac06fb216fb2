//! Error type shared by the scheduler, the audio engine and the runtime.

use thiserror::Error;

/// Everything that can go wrong while driving the metronome.
///
/// `AudioUnavailable` and `TimerArmFailure` are fatal to a running session:
/// the scheduler drops back to idle before the error reaches the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetronomeError {
    #[error("tempo {bpm} BPM is outside the supported range")]
    InvalidTempo { bpm: u32 },

    #[error("audio output unavailable: {0}")]
    AudioUnavailable(String),

    #[error("failed to arm scheduler timer: {0}")]
    TimerArmFailure(String),

    #[error("tempo cannot change while the metronome is running")]
    TempoLocked,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("metronome runtime has shut down")]
    RuntimeGone,

    #[error("failed to start the scheduler thread: {0}")]
    RuntimeSpawn(String),
}

pub type Result<T, E = MetronomeError> = std::result::Result<T, E>;
