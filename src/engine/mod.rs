//! Audio emitter: turns timestamped click requests into sound.
//!
//! The control thread talks to an `AudioEmitter`; the production emitter
//! forwards requests to a `ClickEngine` running inside the cpal callback.

pub mod backend;
pub mod click;
pub mod emitter;
pub mod recording;
pub mod renderer;
pub mod voice;

pub use backend::{AudioBackend, CpalBackend, CpalOutput};
pub use click::{ClickRequest, ClickSound};
pub use emitter::{AudioEmitter, OutputEmitter};
pub use recording::{RecordingBackend, RecordingEmitter};
pub use renderer::{click_channel, ClickEngine};
