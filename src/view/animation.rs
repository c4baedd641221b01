//! Sprite animation
//!
//! `FrameSet` holds the frames and the current index, `Animation` decides
//! when to move to the next frame, and `AnimationView` draws the current
//! texture with optional rotation.

use image::RgbaImage;
use macroquad::color::WHITE;
use macroquad::math::{Vec2, vec2};
use macroquad::texture::{draw_texture_ex, DrawTextureParams, Texture2D};

use crate::error::{Result, StandardsError};
use crate::game::object::Body;
use super::sheet::{slice_sheet, to_texture};
use super::Renderable;

#[derive(Debug, Clone)]
/// Ordered animation frames with a current index
pub struct FrameSet<F> {
    frames: Vec<F>,
    current: usize,
}

impl<F> FrameSet<F> {
    pub fn new(frames: Vec<F>) -> Self {
        Self { frames, current: 0 }
    }

    pub fn frames(&self) -> &[F] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// None only for an empty set
    pub fn current_frame(&self) -> Option<&F> {
        self.frames.get(self.current)
    }

    /// Jump to `index`; out-of-range indices are rejected and leave the
    /// current frame unchanged
    pub fn set_current_frame(&mut self, index: usize) -> Result<()> {
        if index >= self.frames.len() {
            return Err(StandardsError::FrameOutOfRange { index, len: self.frames.len() });
        }
        self.current = index;
        Ok(())
    }
}

/// Frame timing: advance one frame every `delay` ticks, wrapping around
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Animation {
    frame_count: usize,
    delay: u32,
    counter: u32,
    frame: usize,
    looping: bool,
}

impl Animation {
    /// Looping animation; a delay of 0 is treated as 1
    pub fn new(frame_count: usize, delay: u32) -> Self {
        Self {
            frame_count,
            delay: delay.max(1),
            counter: 0,
            frame: 0,
            looping: true,
        }
    }

    /// Stop on the last frame instead of wrapping
    pub fn once(mut self) -> Self {
        self.looping = false;
        self
    }

    /// Advance by one tick; returns the frame to show
    pub fn tick(&mut self) -> usize {
        if self.frame_count == 0 {
            return 0;
        }
        self.counter += 1;
        if self.counter >= self.delay {
            self.counter = 0;
            if self.frame + 1 < self.frame_count {
                self.frame += 1;
            } else if self.looping {
                self.frame = 0;
            }
        }
        self.frame
    }

    /// Frame currently shown
    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn is_finished(&self) -> bool {
        !self.looping && self.frame_count > 0 && self.frame == self.frame_count - 1
    }

    /// Back to the first frame
    pub fn reset(&mut self) {
        self.counter = 0;
        self.frame = 0;
    }

    /// Show `frame` for a full delay before advancing. Clamped to the last frame.
    pub fn set_frame(&mut self, frame: usize) {
        self.counter = 0;
        self.frame = frame.min(self.frame_count.saturating_sub(1));
    }
}

/// Frames paired with their timing, kept in step
#[derive(Debug, Clone)]
pub struct Animated<F> {
    frames: FrameSet<F>,
    animation: Animation,
}

impl<F> Animated<F> {
    pub fn new(frames: Vec<F>, delay: u32) -> Self {
        let animation = Animation::new(frames.len(), delay);
        Self { frames: FrameSet::new(frames), animation }
    }

    pub fn frames(&self) -> &FrameSet<F> {
        &self.frames
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    /// Jump to `index`; the animation continues from there
    pub fn set_current_frame(&mut self, index: usize) -> Result<()> {
        self.frames.set_current_frame(index)?;
        self.animation.set_frame(index);
        Ok(())
    }

    /// One tick of timing; returns the frame now shown
    pub fn advance(&mut self) -> Option<&F> {
        let frame = self.animation.tick();
        // Animation never yields an index past frame_count
        let _ = self.frames.set_current_frame(frame);
        self.frames.current_frame()
    }

    pub fn current_frame(&self) -> Option<&F> {
        self.frames.current_frame()
    }
}

/// Textured animation drawn at a body's position
pub struct AnimationView {
    frames: Animated<Texture2D>,
    /// Position of the parent object, refreshed by `sync`
    anchor: Vec2,
    /// Radians, applied around the frame centre
    pub rotation: f32,
}

impl AnimationView {
    /// Frames advance every `delay` calls to `sync`
    pub fn new(frames: Vec<Texture2D>, delay: u32) -> Self {
        Self {
            frames: Animated::new(frames, delay),
            anchor: Vec2::ZERO,
            rotation: 0.0,
        }
    }

    /// Slice an RGBA sprite sheet into textures. Needs a live macroquad context.
    pub fn from_sheet(sheet: &RgbaImage, frame_width: u32, frame_height: u32, delay: u32) -> Result<Self> {
        let frames = slice_sheet(sheet, frame_width, frame_height)?
            .iter()
            .map(to_texture)
            .collect();
        Ok(Self::new(frames, delay))
    }

    pub fn frames(&self) -> &FrameSet<Texture2D> {
        self.frames.frames()
    }

    /// Show frame `index`; later `sync` calls animate onward from it
    pub fn set_current_frame(&mut self, index: usize) -> Result<()> {
        self.frames.set_current_frame(index)
    }

    /// Follow the parent body and advance the animation by one tick
    pub fn sync(&mut self, body: &Body) {
        self.anchor = body.position;
        self.frames.advance();
    }

    /// Draw at an explicit position with rotation
    pub fn render_at(&self, x: f32, y: f32, theta: f32) {
        if let Some(tex) = self.frames.current_frame() {
            draw_texture_ex(
                tex,
                x,
                y,
                WHITE,
                DrawTextureParams { rotation: theta, ..Default::default() },
            );
        }
    }

    /// Draw stretched to `width` x `height`. Rotation pivots on the centre
    /// of the unscaled frame, matching `render_at`.
    pub fn render_scaled(&self, x: f32, y: f32, width: f32, height: f32, theta: f32) {
        if let Some(tex) = self.frames.current_frame() {
            let pivot = vec2(x + tex.width() / 2.0, y + tex.height() / 2.0);
            draw_texture_ex(
                tex,
                x,
                y,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(vec2(width, height)),
                    rotation: theta,
                    pivot: Some(pivot),
                    ..Default::default()
                },
            );
        }
    }

    /// Draw at the synced body position
    pub fn render_rotated(&self, theta: f32) {
        self.render_at(self.anchor.x, self.anchor.y, theta);
    }
}

impl Renderable for AnimationView {
    fn render(&self) {
        self.render_rotated(self.rotation);
    }
}
