//! Entity ids
//!
//! Objects in a handler are addressed by a slot index plus a generation.
//! Removing an object bumps its slot's generation, so an id held by a bullet
//! that targeted a destroyed brick can never reach whatever reuses the slot.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Handle to an object in a `Handler`
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot in the handler's storage
    pub fn index(&self) -> u32 {
        self.index
    }

    /// How many times the slot had been freed when this id was issued
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Hands out ids and recycles freed slots (LIFO)
#[derive(Debug, Default)]
pub struct EntityAllocator {
    generations: Vec<u32>,
    free: Vec<u32>,
    alive: usize,
}

impl EntityAllocator {
    /// Allocator with no slots
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a fresh id, reusing the most recently freed slot
    pub fn allocate(&mut self) -> EntityId {
        self.alive += 1;
        match self.free.pop() {
            Some(index) => EntityId::new(index, self.generations[index as usize]),
            None => {
                self.generations.push(0);
                EntityId::new(self.generations.len() as u32 - 1, 0)
            }
        }
    }

    /// Returns false if `id` was already stale
    pub fn free(&mut self, id: EntityId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        self.generations[id.index as usize] += 1;
        self.free.push(id.index);
        self.alive -= 1;
        true
    }

    /// Whether `id` matches the current generation of its slot
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.generations.get(id.index as usize) == Some(&id.generation)
    }

    /// Ids allocated and not yet freed
    pub fn alive_count(&self) -> usize {
        self.alive
    }

    /// Slots ever handed out
    pub fn slot_count(&self) -> usize {
        self.generations.len()
    }
}
