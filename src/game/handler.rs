//! Object handler
//!
//! Owns the live game objects of a level. Objects are stored sparsely by
//! slot index; removal during a frame is deferred until `flush` so the
//! update and collision passes can iterate without invalidating ids.

use super::entity::{EntityAllocator, EntityId};
use super::object::GameObject;

struct Slot<O> {
    id: EntityId,
    object: O,
}

/// Live objects of a level, addressed by generational ids
pub struct Handler<O> {
    ids: EntityAllocator,
    slots: Vec<Option<Slot<O>>>,
    /// Removals requested this frame
    pending: Vec<EntityId>,
}

impl<O: GameObject> Handler<O> {
    /// Empty handler
    pub fn new() -> Self {
        Self {
            ids: EntityAllocator::new(),
            slots: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Insert an object; the returned id stays valid until it is removed
    pub fn add(&mut self, object: O) -> EntityId {
        let id = self.ids.allocate();
        let idx = id.index() as usize;
        if idx >= self.slots.len() {
            self.slots.resize_with(idx + 1, || None);
        }
        self.slots[idx] = Some(Slot { id, object });
        id
    }

    /// Queue `id` for removal at the next `flush`
    pub fn remove(&mut self, id: EntityId) -> bool {
        if self.contains(id) && !self.pending.contains(&id) {
            self.pending.push(id);
            return true;
        }
        false
    }

    /// Remove immediately. None if `id` is stale.
    pub fn remove_now(&mut self, id: EntityId) -> Option<O> {
        if !self.ids.free(id) {
            return None;
        }
        self.slots[id.index() as usize].take().map(|slot| slot.object)
    }

    /// Apply queued removals, returning the removed objects
    pub fn flush(&mut self) -> Vec<(EntityId, O)> {
        let pending = std::mem::take(&mut self.pending);
        pending
            .into_iter()
            .filter_map(|id| self.remove_now(id).map(|obj| (id, obj)))
            .collect()
    }

    /// Remove every object whose body is dead
    pub fn sweep_dead(&mut self) -> Vec<(EntityId, O)> {
        let dead: Vec<EntityId> = self
            .iter()
            .filter(|(_, obj)| !obj.is_alive())
            .map(|(id, _)| id)
            .collect();
        dead.into_iter()
            .filter_map(|id| self.remove_now(id).map(|obj| (id, obj)))
            .collect()
    }

    /// Whether `id` still refers to a live object
    pub fn contains(&self, id: EntityId) -> bool {
        self.ids.is_alive(id)
    }

    /// Look up an object; stale ids return None
    pub fn get(&self, id: EntityId) -> Option<&O> {
        self.slots
            .get(id.index() as usize)?
            .as_ref()
            .filter(|slot| slot.id == id)
            .map(|slot| &slot.object)
    }

    /// Mutable lookup; stale ids return None
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut O> {
        self.slots
            .get_mut(id.index() as usize)?
            .as_mut()
            .filter(|slot| slot.id == id)
            .map(|slot| &mut slot.object)
    }

    /// Two distinct objects at once
    pub fn get_pair_mut(&mut self, a: EntityId, b: EntityId) -> Option<(&mut O, &mut O)> {
        if a.index() == b.index() || !self.contains(a) || !self.contains(b) {
            return None;
        }
        let (lo, hi, swapped) = if a.index() < b.index() { (a, b, false) } else { (b, a, true) };
        let (head, tail) = self.slots.split_at_mut(hi.index() as usize);
        let first = &mut head[lo.index() as usize].as_mut()?.object;
        let second = &mut tail[0].as_mut()?.object;
        Some(if swapped { (second, first) } else { (first, second) })
    }

    /// Iterate live objects in slot order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &O)> {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_ref().map(|s| (s.id, &s.object)))
    }

    /// Mutably iterate live objects in slot order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut O)> {
        self.slots
            .iter_mut()
            .filter_map(|slot| slot.as_mut().map(|s| (s.id, &mut s.object)))
    }

    /// Snapshot of every live id
    pub fn ids(&self) -> Vec<EntityId> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// Run `tick` on every object
    pub fn tick_all(&mut self) {
        for (_, obj) in self.iter_mut() {
            obj.tick();
        }
    }

    /// Run `render` on every object
    pub fn render_all(&self) {
        for (_, obj) in self.iter() {
            obj.render();
        }
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.ids.alive_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<O: GameObject> Default for Handler<O> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::object::{Body, ObjectKind};
    use macroquad::math::Vec2;

    struct Dot {
        body: Body,
        ticks: u32,
    }

    impl Dot {
        fn new(x: f32) -> Self {
            Self { body: Body::new(x, 0.0, 1.0, 1.0), ticks: 0 }
        }
    }

    impl GameObject for Dot {
        fn kind(&self) -> ObjectKind {
            ObjectKind::Other
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
    }

    #[test]
    fn test_add_get_and_deferred_remove() {
        let mut h = Handler::new();
        let a = h.add(Dot::new(1.0));
        let b = h.add(Dot::new(2.0));
        assert_eq!(h.len(), 2);

        assert!(h.remove(a));
        assert!(!h.remove(a));
        // Still present until flush
        assert!(h.get(a).is_some());

        let removed = h.flush();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].0, a);
        assert!(h.get(a).is_none());
        assert_eq!(h.get(b).unwrap().body.position.x, 2.0);
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn test_stale_id_does_not_alias_new_object() {
        let mut h = Handler::new();
        let old = h.add(Dot::new(1.0));
        h.remove_now(old);
        let new = h.add(Dot::new(9.0));

        assert_eq!(old.index(), new.index());
        assert!(h.get(old).is_none());
        assert!(h.get_mut(old).is_none());
        assert_eq!(h.get(new).unwrap().body.position.x, 9.0);
    }

    #[test]
    fn test_tick_all_and_sweep_dead() {
        let mut h = Handler::new();
        let a = h.add(Dot::new(0.0));
        let b = h.add(Dot::new(0.0));
        h.get_mut(a).unwrap().body.velocity = Vec2::new(2.0, 0.0);

        h.tick_all();
        assert_eq!(h.get(a).unwrap().body.position.x, 2.0);
        assert_eq!(h.get(b).unwrap().ticks, 1);

        h.get_mut(b).unwrap().body.kill();
        let dead = h.sweep_dead();
        assert_eq!(dead.iter().map(|(id, _)| *id).collect::<Vec<_>>(), vec![b]);
        assert_eq!(h.ids(), vec![a]);
    }

    #[test]
    fn test_get_pair_mut_in_either_order() {
        let mut h = Handler::new();
        let a = h.add(Dot::new(1.0));
        let b = h.add(Dot::new(2.0));

        let (x, y) = h.get_pair_mut(b, a).unwrap();
        assert_eq!(x.body.position.x, 2.0);
        assert_eq!(y.body.position.x, 1.0);
        assert!(h.get_pair_mut(a, a).is_none());
    }
}
