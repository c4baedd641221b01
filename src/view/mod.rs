//! Rendering views
//!
//! Views draw model state; they never mutate it. `AnimationView` blits the
//! current frame of a sprite animation at an object's position.

pub mod animation;
pub mod sheet;

pub use animation::{Animated, Animation, AnimationView, FrameSet};
pub use sheet::slice_sheet;

pub trait Renderable {
    fn render(&self);
}
