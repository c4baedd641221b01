//! Clip abstraction
//!
//! A clip is one independently playable instance of a decoded sound. The
//! controller only needs to know whether a clip is busy and how to restart
//! it, so playback backends plug in through these two traits.

use crate::error::Result;

pub trait Clip {
    /// Whether the clip is currently producing sound
    fn is_playing(&self) -> bool;

    /// Move the playback cursor back to the first frame
    fn rewind(&mut self);

    fn start(&mut self);

    fn stop(&mut self);
}

/// Turns an opaque asset path into a fresh clip instance.
pub trait ClipLoader {
    type Clip: Clip;

    fn load(&mut self, path: &str) -> Result<Self::Clip>;
}
