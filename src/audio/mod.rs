//! Audio
//!
//! Sound-effect pooling on top of a small software mixer.
//!
//! - `AudioController`: buckets of clip instances keyed by file path
//! - `AudioSlot`: the game's single controller, guarded against double init
//! - `Mixer` / `WavLoader`: cpal output and hound decoding

pub mod clip;
pub mod controller;
pub mod mixer;

pub use clip::{Clip, ClipLoader};
pub use controller::{AudioController, AudioSlot};
pub use mixer::{Mixer, MixerClip, WavLoader};

/// The pool wired to the default output device
pub type StandardAudio = AudioController<WavLoader>;
