//! Audio-thread half of the emitter.
//!
//! The control loop pushes `ClickRequest`s into a lock-free ring buffer; the
//! audio callback drains it at the top of every block and starts each click
//! on the exact frame its timestamp maps to. Nothing in `render` allocates:
//! voice storage and scratch buffers are reserved up front.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use rtrb::{Consumer, RingBuffer};

use crate::{
    clock::EngineClock,
    engine::{click::ClickRequest, emitter::OutputEmitter, voice::ClickVoice},
    MAX_BLOCK_SIZE,
};

/// Clicks that may overlap before the oldest one is cut.
pub const MAX_VOICES: usize = 32;

/// Default capacity of the request queue between the two threads.
pub const CLICK_QUEUE_SIZE: usize = 64;

pub struct ClickEngine {
    rx: Consumer<ClickRequest>,
    clock: EngineClock,
    voices: Vec<ClickVoice>,
    scratch: Vec<f32>,
}

/// Build a connected emitter/engine pair sharing one clock.
///
/// The emitter stays on the control thread, the engine moves into the audio
/// callback.
pub fn click_channel(sample_rate: f32, capacity: usize) -> (OutputEmitter, ClickEngine) {
    let (tx, rx) = RingBuffer::<ClickRequest>::new(capacity.max(1));
    let clock = EngineClock::new(sample_rate);
    let fault = Arc::new(AtomicBool::new(false));

    let emitter = OutputEmitter::new(tx, clock.clone(), fault);
    let engine = ClickEngine {
        rx,
        clock,
        voices: Vec::with_capacity(MAX_VOICES),
        scratch: vec![0.0; MAX_BLOCK_SIZE],
    };

    (emitter, engine)
}

impl ClickEngine {
    /// Render the next `out.len()` frames and advance the clock past them.
    pub fn render(&mut self, out: &mut [f32]) {
        self.drain_requests();
        out.fill(0.0);

        for block in out.chunks_mut(MAX_BLOCK_SIZE) {
            let block_start = self.clock.frame();
            for voice in self.voices.iter_mut() {
                voice.mix_into(block, block_start, &mut self.scratch);
            }
            self.clock.advance(block.len());
        }

        self.voices.retain(|voice| !voice.is_finished());
    }

    /// Clicks queued or currently sounding.
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn clock(&self) -> &EngineClock {
        &self.clock
    }

    fn drain_requests(&mut self) {
        let sample_rate = self.clock.sample_rate();
        while let Ok(request) = self.rx.pop() {
            if self.voices.len() == MAX_VOICES {
                // Steal the earliest-starting click
                if let Some(idx) = self
                    .voices
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, v)| v.start_frame())
                    .map(|(idx, _)| idx)
                {
                    self.voices.swap_remove(idx);
                }
            }
            let start_frame = self.clock.frame_at(request.time);
            self.voices
                .push(ClickVoice::new(&request, start_frame, sample_rate));
        }
    }
}
