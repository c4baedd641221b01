//! Error types shared by every Standards subsystem

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StandardsError {
    /// Audio pool created with a non-positive capacity
    #[error("the amount of audio buffers must be greater than 0 (got {0})")]
    InvalidCapacity(i64),

    /// Audio pool slot already holds a controller
    #[error("the audio buffer already exists")]
    AlreadyInitialized,

    /// `play` called for an id that was never loaded
    #[error("unknown sound id: {0}")]
    UnknownSound(String),

    /// Clip loading or output device failure
    #[error("audio error: {0}")]
    Audio(String),

    /// Rejected configuration value
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Animation frame index past the end of the frame set
    #[error("frame {index} out of range (frame count {len})")]
    FrameOutOfRange { index: usize, len: usize },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// RON parse failure
    #[error("config parse error: {0}")]
    Config(#[from] ron::error::SpannedError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl From<hound::Error> for StandardsError {
    fn from(e: hound::Error) -> Self {
        StandardsError::Audio(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StandardsError>;
