//! Game Module
//!
//! The pieces a 2D game is assembled from:
//! - `host`: fixed-rate tick/render loop
//! - `object` / `death`: game objects and death notification
//! - `handler` / `collision`: object set, per-frame update and AABB contacts
//! - `camera`: follow camera and culling region
//! - `entity` / `event`: generational ids and per-frame event queues

pub mod camera;
pub mod collision;
pub mod death;
pub mod entity;
pub mod event;
pub mod handler;
pub mod host;
pub mod object;

pub use camera::Camera;
pub use collision::CollisionHandler;
pub use death::{DeathListener, DeathWatch};
pub use entity::EntityId;
pub use event::{CollisionEvent, DeathEvent, EventQueue};
pub use handler::Handler;
pub use host::{run, Game, GameLoop, HostContext, LoopState, StopHandle};
pub use object::{Body, GameObject, ObjectKind};
