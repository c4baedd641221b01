//! Collision Handler
//!
//! Runs one frame of the object set:
//! 1. Tick every active object (all of them, or only those near the camera)
//! 2. Pairwise AABB test between active objects
//! 3. Notify both sides, queue a `CollisionEvent`, and push movers out of
//!    `Block`s along the axis of least penetration
//! 4. Apply deferred removals and sweep dead objects into `DeathEvent`s
//!
//! Pair testing is O(n^2); fine for the few hundred objects a level holds.

use macroquad::math::Rect;

use super::camera::Camera;
use super::entity::EntityId;
use super::event::{CollisionEvent, DeathEvent, EventQueue};
use super::handler::Handler;
use super::object::{GameObject, ObjectKind};

/// Extra distance around the view in which objects still update
pub const DEFAULT_CULL_MARGIN: f32 = 64.0;

/// Object handler plus the per-frame collision pass
pub struct CollisionHandler<O> {
    handler: Handler<O>,
    camera: Option<Camera>,
    cull_margin: f32,
    pub collisions: EventQueue<CollisionEvent>,
    pub deaths: EventQueue<DeathEvent>,
}

impl<O: GameObject> CollisionHandler<O> {
    /// With a camera, only objects near the view update and render
    pub fn new(camera: Option<Camera>) -> Self {
        Self {
            handler: Handler::new(),
            camera,
            cull_margin: DEFAULT_CULL_MARGIN,
            collisions: EventQueue::new(),
            deaths: EventQueue::new(),
        }
    }

    /// Replace or remove the culling camera
    pub fn set_camera(&mut self, camera: Option<Camera>) {
        self.camera = camera;
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.camera.as_mut()
    }

    /// Distance outside the view that still counts as active
    pub fn set_cull_margin(&mut self, margin: f32) {
        self.cull_margin = margin.max(0.0);
    }

    /// Add an object to the level
    pub fn add_entity(&mut self, object: O) -> EntityId {
        self.handler.add(object)
    }

    /// Remove at the end of the next `update`
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        self.handler.remove(id)
    }

    /// The underlying object set
    pub fn handler(&self) -> &Handler<O> {
        &self.handler
    }

    /// Mutable access to the object set
    pub fn handler_mut(&mut self) -> &mut Handler<O> {
        &mut self.handler
    }

    fn is_active(&self, obj: &O) -> bool {
        obj.always_active()
            || self
                .camera
                .as_ref()
                .map_or(true, |cam| cam.contains(&obj.body().bounds(), self.cull_margin))
    }

    /// Ids of objects that update and collide this frame
    pub fn active_ids(&self) -> Vec<EntityId> {
        self.handler
            .iter()
            .filter(|(_, obj)| self.is_active(obj))
            .map(|(id, _)| id)
            .collect()
    }

    /// One frame: tick, collide, remove. Events from earlier frames that were
    /// not drained are discarded.
    pub fn update(&mut self) {
        self.collisions.clear();
        self.deaths.clear();

        let active = self.active_ids();
        for &id in &active {
            if let Some(obj) = self.handler.get_mut(id) {
                obj.tick();
            }
        }

        self.resolve_collisions(&active);

        self.handler.flush();
        for (entity, obj) in self.handler.sweep_dead() {
            log::debug!("Entity {} ({:?}) died", entity, obj.kind());
            self.deaths.send(DeathEvent {
                entity,
                kind: obj.kind(),
                bounds: obj.body().bounds(),
            });
        }
    }

    fn resolve_collisions(&mut self, active: &[EntityId]) {
        for (i, &a) in active.iter().enumerate() {
            for &b in &active[i + 1..] {
                let Some((obj_a, obj_b)) = self.handler.get_pair_mut(a, b) else {
                    continue;
                };
                if !obj_a.is_alive() || !obj_b.is_alive() {
                    continue;
                }

                let Some(overlap) = overlap(&obj_a.body().bounds(), &obj_b.body().bounds()) else {
                    continue;
                };

                let (kind_a, kind_b) = (obj_a.kind(), obj_b.kind());
                obj_a.on_collision(kind_b, obj_b.body().bounds());
                obj_b.on_collision(kind_a, obj_a.body().bounds());

                match (kind_a == ObjectKind::Block, kind_b == ObjectKind::Block) {
                    (true, false) => push_out(obj_b, &obj_a.body().bounds()),
                    (false, true) => push_out(obj_a, &obj_b.body().bounds()),
                    _ => {}
                }

                self.collisions.send(CollisionEvent {
                    a,
                    a_kind: kind_a,
                    b,
                    b_kind: kind_b,
                    overlap,
                });
            }
        }
    }

    /// Draw active objects (camera transform is the caller's business)
    pub fn render(&self) {
        for (_, obj) in self.handler.iter() {
            if self.is_active(obj) {
                obj.render();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.handler.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handler.is_empty()
    }
}

/// Overlap of two rects with positive area; touching edges don't count
pub fn overlap(a: &Rect, b: &Rect) -> Option<Rect> {
    a.intersect(*b).filter(|r| r.w > 0.0 && r.h > 0.0)
}

/// Move `obj` out of `block` along the shallower axis and cancel its
/// velocity on that axis
fn push_out<O: GameObject + ?Sized>(obj: &mut O, block: &Rect) {
    let bounds = obj.body().bounds();
    let Some(hit) = overlap(&bounds, block) else {
        return;
    };

    let body = obj.body_mut();
    if hit.w < hit.h {
        if bounds.center().x < block.center().x {
            body.position.x -= hit.w;
        } else {
            body.position.x += hit.w;
        }
        body.velocity.x = 0.0;
    } else {
        if bounds.center().y < block.center().y {
            body.position.y -= hit.h;
        } else {
            body.position.y += hit.h;
        }
        body.velocity.y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::object::Body;
    use macroquad::math::Vec2;

    struct Thing {
        kind: ObjectKind,
        body: Body,
        hits: Vec<ObjectKind>,
        ticks: u32,
        pinned: bool,
    }

    impl Thing {
        fn new(kind: ObjectKind, x: f32, y: f32, size: f32) -> Self {
            Self { kind, body: Body::new(x, y, size, size), hits: Vec::new(), ticks: 0, pinned: false }
        }
    }

    impl GameObject for Thing {
        fn kind(&self) -> ObjectKind {
            self.kind
        }
        fn body(&self) -> &Body {
            &self.body
        }
        fn body_mut(&mut self) -> &mut Body {
            &mut self.body
        }
        fn tick(&mut self) {
            self.ticks += 1;
            self.body.integrate();
        }
        fn on_collision(&mut self, other: ObjectKind, _: Rect) {
            self.hits.push(other);
            if self.kind == ObjectKind::Bullet {
                self.body.kill();
            }
        }
        fn always_active(&self) -> bool {
            self.pinned
        }
    }

    #[test]
    fn test_overlap_ignores_touching_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(overlap(&a, &Rect::new(10.0, 0.0, 10.0, 10.0)).is_none());
        assert_eq!(
            overlap(&a, &Rect::new(8.0, 5.0, 10.0, 10.0)),
            Some(Rect::new(8.0, 5.0, 2.0, 5.0))
        );
    }

    #[test]
    fn test_collision_notifies_both_and_queues_event() {
        let mut sch = CollisionHandler::new(None);
        let p = sch.add_entity(Thing::new(ObjectKind::Player, 0.0, 0.0, 10.0));
        let e = sch.add_entity(Thing::new(ObjectKind::Enemy, 5.0, 5.0, 10.0));
        sch.add_entity(Thing::new(ObjectKind::Pickup, 100.0, 100.0, 10.0));

        sch.update();

        assert_eq!(sch.handler().get(p).unwrap().hits, vec![ObjectKind::Enemy]);
        assert_eq!(sch.handler().get(e).unwrap().hits, vec![ObjectKind::Player]);
        assert_eq!(sch.collisions.len(), 1);
        let ev = sch.collisions.iter().next().unwrap();
        assert!(ev.involves(ObjectKind::Player, ObjectKind::Enemy));
    }

    #[test]
    fn test_block_pushes_mover_out_on_shallow_axis() {
        let mut sch = CollisionHandler::new(None);
        sch.add_entity(Thing::new(ObjectKind::Block, 100.0, 0.0, 64.0));
        let mut player = Thing::new(ObjectKind::Player, 80.0, 20.0, 16.0);
        player.body.velocity = Vec2::new(10.0, 0.0);
        let p = sch.add_entity(player);

        sch.update();

        // Moved to x=90, overlapping the block by 6px horizontally
        let body = sch.handler().get(p).unwrap().body;
        assert_eq!(body.position.x, 84.0);
        assert_eq!(body.position.y, 20.0);
        assert_eq!(body.velocity.x, 0.0);
    }

    #[test]
    fn test_block_pushes_faller_up_on_vertical_axis() {
        let mut sch = CollisionHandler::new(None);
        sch.add_entity(Thing::new(ObjectKind::Block, 0.0, 100.0, 64.0));
        let mut player = Thing::new(ObjectKind::Player, 20.0, 80.0, 16.0);
        player.body.velocity = Vec2::new(0.0, 8.0);
        let p = sch.add_entity(player);

        sch.update();

        // Lands at y=88: 4px deep vertically, 16px wide horizontally
        let body = sch.handler().get(p).unwrap().body;
        assert_eq!(body.position.x, 20.0);
        assert_eq!(body.position.y, 84.0);
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn test_overlapping_blocks_stay_put() {
        let mut sch = CollisionHandler::new(None);
        let a = sch.add_entity(Thing::new(ObjectKind::Block, 0.0, 0.0, 32.0));
        let b = sch.add_entity(Thing::new(ObjectKind::Block, 20.0, 10.0, 32.0));

        sch.update();

        assert_eq!(sch.handler().get(a).unwrap().body.position, Vec2::new(0.0, 0.0));
        assert_eq!(sch.handler().get(b).unwrap().body.position, Vec2::new(20.0, 10.0));
        assert_eq!(sch.handler().get(a).unwrap().hits, vec![ObjectKind::Block]);
        assert_eq!(sch.collisions.len(), 1);
    }

    #[test]
    fn test_always_active_objects_tick_off_screen() {
        let cam = Camera::new(100.0, 100.0, 1.0).unwrap();
        let mut sch = CollisionHandler::new(Some(cam));
        sch.set_cull_margin(0.0);
        let mut shot = Thing::new(ObjectKind::Bullet, 1000.0, 10.0, 4.0);
        shot.pinned = true;
        let shot = sch.add_entity(shot);
        let idle = sch.add_entity(Thing::new(ObjectKind::Enemy, 1000.0, 50.0, 4.0));

        sch.update();

        assert_eq!(sch.handler().get(shot).unwrap().ticks, 1);
        assert_eq!(sch.handler().get(idle).unwrap().ticks, 0);
        assert_eq!(sch.active_ids(), vec![shot]);

        // Dies off-screen and is swept like any other object
        sch.handler_mut().get_mut(shot).unwrap().body.kill();
        sch.update();
        assert!(sch.handler().get(shot).is_none());
        assert_eq!(sch.deaths.len(), 1);
    }

    #[test]
    fn test_dead_objects_become_death_events() {
        let mut sch = CollisionHandler::new(None);
        sch.add_entity(Thing::new(ObjectKind::Block, 0.0, 0.0, 64.0));
        let bullet = sch.add_entity(Thing::new(ObjectKind::Bullet, 10.0, 10.0, 4.0));

        sch.update();

        assert!(sch.handler().get(bullet).is_none());
        assert_eq!(sch.deaths.len(), 1);
        let death = sch.deaths.drain().next().unwrap();
        assert_eq!(death.entity, bullet);
        assert_eq!(death.kind, ObjectKind::Bullet);
        assert_eq!(sch.len(), 1);
    }

    #[test]
    fn test_camera_culls_far_objects() {
        let cam = Camera::new(100.0, 100.0, 1.0).unwrap();
        let mut sch = CollisionHandler::new(Some(cam));
        sch.set_cull_margin(0.0);
        let near = sch.add_entity(Thing::new(ObjectKind::Enemy, 10.0, 10.0, 5.0));
        let far = sch.add_entity(Thing::new(ObjectKind::Enemy, 1000.0, 10.0, 5.0));

        sch.update();

        assert_eq!(sch.handler().get(near).unwrap().ticks, 1);
        assert_eq!(sch.handler().get(far).unwrap().ticks, 0);
        assert_eq!(sch.active_ids(), vec![near]);
    }

    #[test]
    fn test_removed_entity_leaves_after_frame() {
        let mut sch = CollisionHandler::new(None);
        let a = sch.add_entity(Thing::new(ObjectKind::Other, 0.0, 0.0, 1.0));
        assert!(sch.remove_entity(a));
        sch.update();
        assert!(sch.is_empty());
        // Explicit removals are not deaths
        assert!(sch.deaths.is_empty());
    }
}
