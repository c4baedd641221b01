//! Game objects
//!
//! Everything a handler updates is a `GameObject`: a kind tag, a `Body` with
//! the physical state the collision pass needs, and per-frame hooks.

use macroquad::math::{Rect, Vec2};

/// What an object is, for collision filtering and game rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Player,
    Enemy,
    /// Static obstacle; moving objects are pushed out of it
    Block,
    Bullet,
    Pickup,
    Other,
}

/// Position, size, velocity and health of an axis-aligned object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    /// Top-left corner
    pub position: Vec2,
    pub size: Vec2,
    pub velocity: Vec2,
    pub health: f32,
    pub max_health: f32,
    alive: bool,
}

impl Body {
    /// Stationary body with 100 health
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            size: Vec2::new(width, height),
            velocity: Vec2::ZERO,
            health: 100.0,
            max_health: 100.0,
            alive: true,
        }
    }

    /// Set both current and maximum health
    pub fn with_health(mut self, health: f32) -> Self {
        self.health = health;
        self.max_health = health;
        self
    }

    /// Set the per-tick velocity
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Axis-aligned bounding box
    pub fn bounds(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.size.x, self.size.y)
    }

    /// Centre point of the box
    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    /// Move so the box is centred on `center`
    pub fn set_center(&mut self, center: Vec2) {
        self.position = center - self.size * 0.5;
    }

    /// Move by one tick of velocity
    pub fn integrate(&mut self) {
        self.position += self.velocity;
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Mark dead regardless of health
    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Subtract health. Returns true when this hit killed the body.
    pub fn damage(&mut self, amount: f32) -> bool {
        if !self.alive {
            return false;
        }
        self.health = (self.health - amount).max(0.0);
        if self.health <= 0.0 {
            self.alive = false;
            return true;
        }
        false
    }

    /// Restore health up to the maximum; dead bodies stay dead
    pub fn heal(&mut self, amount: f32) {
        if self.alive {
            self.health = (self.health + amount).min(self.max_health);
        }
    }
}

/// Anything a `Handler` can update, draw and collide
pub trait GameObject {
    fn kind(&self) -> ObjectKind;

    fn body(&self) -> &Body;

    fn body_mut(&mut self) -> &mut Body;

    /// Per-frame update. Default moves the body by its velocity.
    fn tick(&mut self) {
        self.body_mut().integrate();
    }

    fn render(&self) {}

    /// Called once per overlapping pair per frame, on both objects
    fn on_collision(&mut self, _other: ObjectKind, _other_bounds: Rect) {}

    fn is_alive(&self) -> bool {
        self.body().is_alive()
    }

    /// Keep ticking and colliding even when outside the camera's view.
    /// Objects with their own lifetime (projectiles, timers) need this to
    /// expire off-screen.
    fn always_active(&self) -> bool {
        false
    }
}

impl<T: GameObject + ?Sized> GameObject for Box<T> {
    fn kind(&self) -> ObjectKind {
        (**self).kind()
    }
    fn body(&self) -> &Body {
        (**self).body()
    }
    fn body_mut(&mut self) -> &mut Body {
        (**self).body_mut()
    }
    fn tick(&mut self) {
        (**self).tick()
    }
    fn render(&self) {
        (**self).render()
    }
    fn on_collision(&mut self, other: ObjectKind, other_bounds: Rect) {
        (**self).on_collision(other, other_bounds)
    }
    fn is_alive(&self) -> bool {
        (**self).is_alive()
    }
    fn always_active(&self) -> bool {
        (**self).always_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_kills_once() {
        let mut body = Body::new(0.0, 0.0, 8.0, 8.0).with_health(10.0);
        assert!(!body.damage(4.0));
        assert!(body.damage(20.0));
        assert_eq!(body.health, 0.0);
        assert!(!body.is_alive());
        // Already dead: further hits don't report another kill
        assert!(!body.damage(1.0));
    }

    #[test]
    fn test_heal_is_capped() {
        let mut body = Body::new(0.0, 0.0, 1.0, 1.0).with_health(10.0);
        body.damage(5.0);
        body.heal(50.0);
        assert_eq!(body.health, 10.0);
    }

    #[test]
    fn test_center_and_integrate() {
        let mut body = Body::new(10.0, 20.0, 4.0, 6.0).with_velocity(Vec2::new(1.0, -2.0));
        assert_eq!(body.center(), Vec2::new(12.0, 23.0));
        body.integrate();
        assert_eq!(body.bounds(), Rect::new(11.0, 18.0, 4.0, 6.0));
        body.set_center(Vec2::ZERO);
        assert_eq!(body.position, Vec2::new(-2.0, -3.0));
    }
}
