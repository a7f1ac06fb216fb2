//! Audio outputs the metronome can open.

use std::sync::atomic::Ordering;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::{
    engine::{
        click::ClickRequest,
        emitter::{AudioEmitter, OutputEmitter},
        renderer::{click_channel, CLICK_QUEUE_SIZE},
    },
    error::{MetronomeError, Result},
};

/// Factory for the audio output.
///
/// The backend is handed over at construction; the output itself is only
/// opened on first activation and lives until its owner is dropped.
pub trait AudioBackend {
    type Output: AudioEmitter;

    fn open(&mut self) -> Result<Self::Output>;
}

/// Default cpal output device.
#[derive(Debug, Clone, Default)]
pub struct CpalBackend;

impl CpalBackend {
    pub fn new() -> Self {
        Self
    }
}

/// A running cpal stream plus the emitter that feeds it.
///
/// Dropping it stops the stream.
pub struct CpalOutput {
    emitter: OutputEmitter,
    _stream: cpal::Stream,
}

impl AudioEmitter for CpalOutput {
    fn now(&self) -> f64 {
        self.emitter.now()
    }

    fn emit(&mut self, request: &ClickRequest) -> Result<()> {
        self.emitter.emit(request)
    }

    fn check_progress(&mut self, stall_after: Duration) -> Result<()> {
        self.emitter.check_progress(stall_after)
    }
}

fn unavailable(context: &str, err: impl std::fmt::Display) -> MetronomeError {
    MetronomeError::AudioUnavailable(format!("{context}: {err}"))
}

impl AudioBackend for CpalBackend {
    type Output = CpalOutput;

    fn open(&mut self) -> Result<CpalOutput> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| MetronomeError::AudioUnavailable("no default output device".into()))?;
        let config = device
            .default_output_config()
            .map_err(|e| unavailable("failed to fetch default output config", e))?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let (emitter, mut engine) = click_channel(sample_rate, CLICK_QUEUE_SIZE);
        let fault = emitter.fault_flag();
        let mut mono = vec![0.0f32; crate::MAX_BLOCK_SIZE];

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _| {
                    for frame_block in data.chunks_mut(crate::MAX_BLOCK_SIZE * channels) {
                        let frames = frame_block.len() / channels;
                        let block = &mut mono[..frames];
                        engine.render(block);

                        // Copy to output (mono to all channels)
                        for (i, &s) in block.iter().enumerate() {
                            for ch in 0..channels {
                                frame_block[i * channels + ch] = s;
                            }
                        }
                    }
                },
                move |err| {
                    tracing::error!("audio stream error: {err}");
                    fault.store(true, Ordering::Release);
                },
                None,
            )
            .map_err(|e| unavailable("failed to build output stream", e))?;

        stream
            .play()
            .map_err(|e| unavailable("failed to start output stream", e))?;

        tracing::info!(
            device = %device.name().unwrap_or_else(|_| "unknown".into()),
            sample_rate,
            channels,
            "audio output opened"
        );

        Ok(CpalOutput {
            emitter,
            _stream: stream,
        })
    }
}
