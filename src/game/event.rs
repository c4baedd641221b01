//! Per-frame event queues
//!
//! The collision handler records contacts here instead of calling back into
//! game code while it still holds every object borrowed. The game drains the
//! queue after `update` (play a sound, spawn particles, score...).

use macroquad::math::Rect;

use super::entity::EntityId;
use super::object::ObjectKind;

#[derive(Debug)]
/// Events of one type collected during a frame
pub struct EventQueue<T> {
    events: Vec<T>,
}

impl<T> EventQueue<T> {
    /// Empty queue
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append an event
    pub fn send(&mut self, event: T) {
        self.events.push(event);
    }

    /// Look at queued events without removing them
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.events.iter()
    }

    /// Take every queued event, leaving the queue empty
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.events.drain(..)
    }

    /// Discard every queued event
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Number of queued events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Two objects overlapped this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    pub a: EntityId,
    pub a_kind: ObjectKind,
    pub b: EntityId,
    pub b_kind: ObjectKind,
    /// Overlap area at the time of the check
    pub overlap: Rect,
}

impl CollisionEvent {
    /// True if this contact is between the two given kinds, in either order
    pub fn involves(&self, x: ObjectKind, y: ObjectKind) -> bool {
        (self.a_kind == x && self.b_kind == y) || (self.a_kind == y && self.b_kind == x)
    }

    /// The id of the participant with `kind`, if any
    pub fn entity_of(&self, kind: ObjectKind) -> Option<EntityId> {
        if self.a_kind == kind {
            Some(self.a)
        } else if self.b_kind == kind {
            Some(self.b)
        } else {
            None
        }
    }
}

/// An object was swept after its health reached zero
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeathEvent {
    pub entity: EntityId,
    pub kind: ObjectKind,
    /// Where it was when it died
    pub bounds: Rect,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_drain_empties() {
        let mut q = EventQueue::new();
        q.send(1);
        q.send(2);
        assert_eq!(q.len(), 2);
        let drained: Vec<_> = q.drain().collect();
        assert_eq!(drained, vec![1, 2]);
        assert!(q.is_empty());
    }

    #[test]
    fn test_collision_event_lookup() {
        let ev = CollisionEvent {
            a: EntityId::new(0, 0),
            a_kind: ObjectKind::Bullet,
            b: EntityId::new(4, 1),
            b_kind: ObjectKind::Block,
            overlap: Rect::new(0.0, 0.0, 1.0, 1.0),
        };
        assert!(ev.involves(ObjectKind::Block, ObjectKind::Bullet));
        assert!(!ev.involves(ObjectKind::Player, ObjectKind::Block));
        assert_eq!(ev.entity_of(ObjectKind::Block), Some(EntityId::new(4, 1)));
        assert_eq!(ev.entity_of(ObjectKind::Enemy), None);
    }
}
