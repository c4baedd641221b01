//! Game configuration
//!
//! Window size, title, tick rate and audio pool capacity. Stored as RON so a
//! game can ship a `game.ron` next to its assets; every field has a default.

use std::path::Path;

use macroquad::window::Conf;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StandardsError};

/// Number of milliseconds per second
pub const SECONDS_TO_MS: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Settings for one game window
pub struct GameConfig {
    pub width: i32,
    pub height: i32,
    pub title: String,
    /// Target ticks per second
    pub fps: u32,
    /// Expected number of distinct sounds in the audio pool
    pub audio_buffers: i64,
    pub resizable: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Standards".to_string(),
            fps: 60,
            audio_buffers: 16,
            resizable: false,
        }
    }
}

impl GameConfig {
    pub fn new(width: i32, height: i32, fps: u32, title: impl Into<String>) -> Self {
        Self {
            width,
            height,
            title: title.into(),
            fps,
            ..Default::default()
        }
    }

    /// Load and validate a RON config file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_ron_str(&contents)?;
        log::info!("Loaded game config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate RON text
    pub fn from_ron_str(s: &str) -> Result<Self> {
        let config: GameConfig = ron::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject zero fps, a non-positive window size or audio capacity
    pub fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            return Err(StandardsError::InvalidConfig("fps must be greater than 0".into()));
        }
        if self.width <= 0 || self.height <= 0 {
            return Err(StandardsError::InvalidConfig(format!(
                "window size must be positive (got {}x{})",
                self.width, self.height
            )));
        }
        if self.audio_buffers <= 0 {
            return Err(StandardsError::InvalidCapacity(self.audio_buffers));
        }
        Ok(())
    }

    /// Tick period in whole milliseconds (integer division, so 60 fps -> 16ms)
    pub fn period_ms(&self) -> u32 {
        period_ms(self.fps)
    }

    /// Window settings for `#[macroquad::main]`
    pub fn window_conf(&self) -> Conf {
        Conf {
            window_title: self.title.clone(),
            window_width: self.width,
            window_height: self.height,
            window_resizable: self.resizable,
            high_dpi: true,
            ..Default::default()
        }
    }
}

/// Convert a target FPS into a timer period. Zero fps yields a zero period.
pub fn period_ms(fps: u32) -> u32 {
    if fps == 0 {
        0
    } else {
        SECONDS_TO_MS / fps
    }
}
