//! 2D follow camera
//!
//! Eases toward a target point each tick and defines the visible region used
//! for culling and for mapping mouse coordinates into the world.

use macroquad::camera::Camera2D;
use macroquad::math::{Rect, Vec2};

use crate::error::{Result, StandardsError};

#[derive(Debug, Clone, Copy, PartialEq)]
/// Follow camera over a world with y pointing down
pub struct Camera {
    /// World-space centre of the view
    pub position: Vec2,
    /// Visible size in world units
    pub viewport: Vec2,
    /// Fraction of the distance to the target covered per tick, in (0, 1]
    smoothing: f32,
}

impl Camera {
    /// Camera showing `width` x `height` world units, initially over the
    /// region starting at the origin
    pub fn new(width: f32, height: f32, smoothing: f32) -> Result<Self> {
        if !(smoothing > 0.0 && smoothing <= 1.0) {
            return Err(StandardsError::InvalidConfig(format!(
                "camera smoothing must be in (0, 1], got {}",
                smoothing
            )));
        }
        if width <= 0.0 || height <= 0.0 {
            return Err(StandardsError::InvalidConfig(format!(
                "camera viewport must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            position: Vec2::new(width * 0.5, height * 0.5),
            viewport: Vec2::new(width, height),
            smoothing,
        })
    }

    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    /// Move one step toward `target`
    pub fn follow(&mut self, target: Vec2) {
        self.position += (target - self.position) * self.smoothing;
    }

    /// Jump straight to `target`
    pub fn snap_to(&mut self, target: Vec2) {
        self.position = target;
    }

    /// Visible world region
    pub fn view_rect(&self) -> Rect {
        let half = self.viewport * 0.5;
        Rect::new(
            self.position.x - half.x,
            self.position.y - half.y,
            self.viewport.x,
            self.viewport.y,
        )
    }

    /// Whether `rect` is on screen, with `margin` extra pixels on each side
    pub fn contains(&self, rect: &Rect, margin: f32) -> bool {
        let view = self.view_rect();
        let expanded = Rect::new(
            view.x - margin,
            view.y - margin,
            view.w + margin * 2.0,
            view.h + margin * 2.0,
        );
        expanded.overlaps(rect)
    }

    /// Screen pixel -> world coordinate
    pub fn to_world(&self, screen: Vec2) -> Vec2 {
        screen + self.view_rect().point()
    }

    /// World coordinate -> screen pixel
    pub fn to_screen(&self, world: Vec2) -> Vec2 {
        world - self.view_rect().point()
    }

    /// Camera for `set_camera` so draws can use world coordinates.
    ///
    /// `from_display_rect` is y-up; the rect is flipped so world y grows
    /// downward like screen and mouse coordinates.
    pub fn to_camera2d(&self) -> Camera2D {
        let v = self.view_rect();
        Camera2D::from_display_rect(Rect::new(v.x, v.y + v.h, v.w, -v.h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use macroquad::camera::Camera as _;
    use macroquad::math::vec3;

    #[test]
    fn test_rejects_bad_smoothing() {
        assert!(Camera::new(100.0, 100.0, 0.0).is_err());
        assert!(Camera::new(100.0, 100.0, 1.5).is_err());
        assert!(Camera::new(100.0, 100.0, f32::NAN).is_err());
        assert!(Camera::new(0.0, 100.0, 0.5).is_err());
    }

    #[test]
    fn test_follow_eases_toward_target() {
        let mut cam = Camera::new(100.0, 100.0, 0.5).unwrap();
        cam.snap_to(Vec2::ZERO);
        cam.follow(Vec2::new(10.0, 0.0));
        assert_eq!(cam.position, Vec2::new(5.0, 0.0));
        cam.follow(Vec2::new(10.0, 0.0));
        assert_eq!(cam.position, Vec2::new(7.5, 0.0));
    }

    #[test]
    fn test_full_smoothing_locks_on() {
        let mut cam = Camera::new(100.0, 100.0, 1.0).unwrap();
        cam.follow(Vec2::new(-40.0, 12.0));
        assert_eq!(cam.position, Vec2::new(-40.0, 12.0));
    }

    #[test]
    fn test_view_and_coordinate_mapping() {
        let mut cam = Camera::new(200.0, 100.0, 1.0).unwrap();
        cam.snap_to(Vec2::new(500.0, 500.0));
        assert_eq!(cam.view_rect(), Rect::new(400.0, 450.0, 200.0, 100.0));
        assert_eq!(cam.to_world(Vec2::new(10.0, 10.0)), Vec2::new(410.0, 460.0));
        assert_eq!(cam.to_screen(Vec2::new(410.0, 460.0)), Vec2::new(10.0, 10.0));
    }

    #[test]
    fn test_camera2d_draws_y_down() {
        let mut cam = Camera::new(1280.0, 720.0, 1.0).unwrap();
        cam.snap_to(Vec2::new(640.0, 360.0));
        let matrix = cam.to_camera2d().matrix();

        // Top-left of the view lands on the top-left of clip space
        let top_left = cam.view_rect().point();
        let clip = matrix.transform_point3(vec3(top_left.x, top_left.y, 0.0));
        assert!((clip.x + 1.0).abs() < 1e-5);
        assert!((clip.y - 1.0).abs() < 1e-5);

        // Mouse at the top of the screen maps to a world point drawn at the top
        let world = cam.to_world(Vec2::new(640.0, 0.0));
        let clip = matrix.transform_point3(vec3(world.x, world.y, 0.0));
        assert!((clip.y - 1.0).abs() < 1e-5);

        let bottom = matrix.transform_point3(vec3(640.0, 720.0, 0.0));
        assert!((bottom.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_contains_with_margin() {
        let cam = Camera::new(100.0, 100.0, 1.0).unwrap();
        let offscreen = Rect::new(110.0, 10.0, 5.0, 5.0);
        assert!(!cam.contains(&offscreen, 0.0));
        assert!(cam.contains(&offscreen, 20.0));
    }
}
