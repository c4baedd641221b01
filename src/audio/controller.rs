//! Audio Buffer Controller
//!
//! Plays sound effects without cutting off a copy that is already playing.
//! Every logical sound (keyed by its file path) owns a bucket of clip
//! instances; `play` restarts the first idle one. When the whole bucket is
//! busy the trigger is dropped rather than allocating a new clip, so memory
//! stays bounded by what the game chose to `load`.

use std::collections::HashMap;

use super::clip::{Clip, ClipLoader};
use crate::error::{Result, StandardsError};

/// Largest number of buckets reserved up front. Larger capacities are valid
/// but the map grows on demand past this point.
pub const MAX_PREALLOCATED_BUCKETS: usize = 1024;

/// Pool of reusable clips, one bucket per sound path
pub struct AudioController<L: ClipLoader> {
    /// Bucket per sound id, clips in load order
    buffers: HashMap<String, Vec<L::Clip>>,
    loader: L,
}

impl<L: ClipLoader> AudioController<L> {
    /// Create a pool sized for `capacity` distinct sounds.
    pub fn new(capacity: i64, loader: L) -> Result<Self> {
        if capacity <= 0 {
            return Err(StandardsError::InvalidCapacity(capacity));
        }
        let hint = usize::try_from(capacity)
            .unwrap_or(usize::MAX)
            .min(MAX_PREALLOCATED_BUCKETS);
        Ok(Self {
            buffers: HashMap::with_capacity(hint),
            loader,
        })
    }

    /// Register one more idle clip for `id`, creating its bucket on first use.
    /// A loader failure leaves the pool untouched.
    pub fn load(&mut self, id: &str) -> Result<()> {
        let clip = self.loader.load(id)?;
        let bucket = self.buffers.entry(id.to_string()).or_default();
        bucket.push(clip);
        log::debug!("Loaded clip {} for '{}'", bucket.len(), id);
        Ok(())
    }

    /// Start the first idle clip for `id` from the beginning.
    ///
    /// Returns `Ok(false)` when every clip in the bucket is busy; nothing is
    /// started in that case.
    pub fn play(&mut self, id: &str) -> Result<bool> {
        let bucket = self
            .buffers
            .get_mut(id)
            .ok_or_else(|| StandardsError::UnknownSound(id.to_string()))?;

        match bucket.iter_mut().find(|clip| !clip.is_playing()) {
            Some(clip) => {
                clip.rewind();
                clip.start();
                Ok(true)
            }
            None => {
                log::debug!("All {} clips for '{}' busy, dropping trigger", bucket.len(), id);
                Ok(false)
            }
        }
    }

    /// Stop every playing clip in every bucket
    pub fn stop_all(&mut self) {
        for clip in self.buffers.values_mut().flatten() {
            if clip.is_playing() {
                clip.stop();
            }
        }
    }

    /// Whether `id` has been loaded at least once
    pub fn contains(&self, id: &str) -> bool {
        self.buffers.contains_key(id)
    }

    /// Number of clips registered under `id`
    pub fn bucket_len(&self, id: &str) -> usize {
        self.buffers.get(id).map_or(0, Vec::len)
    }

    /// Number of clips under `id` that are currently playing
    pub fn playing_count(&self, id: &str) -> usize {
        self.buffers
            .get(id)
            .map_or(0, |bucket| bucket.iter().filter(|c| c.is_playing()).count())
    }

    /// Number of distinct sounds
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// True before the first successful `load`
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// The loader clips are created through
    pub fn loader(&self) -> &L {
        &self.loader
    }
}

/// Holds the game's single audio controller.
///
/// A game initialises its pool once at startup; a second `init` is a
/// programming error and is reported instead of silently replacing the pool.
pub struct AudioSlot<L: ClipLoader> {
    controller: Option<AudioController<L>>,
}

impl<L: ClipLoader> AudioSlot<L> {
    /// An empty slot
    pub const fn new() -> Self {
        Self { controller: None }
    }

    /// Create the controller. Fails on a non-positive capacity or if the
    /// slot is already occupied.
    pub fn init(&mut self, capacity: i64, loader: L) -> Result<&mut AudioController<L>> {
        if capacity <= 0 {
            return Err(StandardsError::InvalidCapacity(capacity));
        }
        if self.controller.is_some() {
            return Err(StandardsError::AlreadyInitialized);
        }
        log::info!("Audio buffer initialised with capacity {}", capacity);
        Ok(self.controller.insert(AudioController::new(capacity, loader)?))
    }

    /// Whether `init` has succeeded
    pub fn is_initialized(&self) -> bool {
        self.controller.is_some()
    }

    /// The controller, if initialised
    pub fn get(&self) -> Option<&AudioController<L>> {
        self.controller.as_ref()
    }

    /// Mutable access to the controller, if initialised
    pub fn get_mut(&mut self) -> Option<&mut AudioController<L>> {
        self.controller.as_mut()
    }
}

impl<L: ClipLoader> Default for AudioSlot<L> {
    fn default() -> Self {
        Self::new()
    }
}
