//! Standards: a small 2D game scaffold
//!
//! Everything a simple arcade game needs on top of macroquad:
//! - Fixed-rate game loop host with a stop flag
//! - Object handler with AABB collision and camera culling
//! - Pooled sound effects that overlap instead of cutting each other off
//! - Sprite animation views

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod audio;
pub mod config;
pub mod error;
pub mod game;
pub mod view;

pub use config::GameConfig;
pub use error::{Result, StandardsError};
