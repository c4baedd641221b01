//! Death notification
//!
//! Objects only expose `is_alive`; the code that owns them decides what
//! happens when one dies. `DeathWatch` keeps the "was alive last frame" flag
//! so the listener fires exactly once on the alive -> dead transition.

/// What to do when a watched object dies
pub trait DeathListener {
    fn upon_death(&mut self);
}

impl<F: FnMut()> DeathListener for F {
    fn upon_death(&mut self) {
        self()
    }
}

#[derive(Debug, Clone, Copy)]
/// Remembers whether the watched object was alive last frame
pub struct DeathWatch {
    was_alive: bool,
}

impl DeathWatch {
    /// Starts armed (object assumed alive)
    pub fn new() -> Self {
        Self { was_alive: true }
    }

    /// Feed the current alive state. Returns true (and notifies) on the
    /// frame the object dies.
    pub fn check(&mut self, alive: bool, listener: &mut impl DeathListener) -> bool {
        if !alive && self.was_alive {
            self.was_alive = false;
            listener.upon_death();
            return true;
        }
        if alive {
            self.was_alive = true;
        }
        false
    }

    /// True once the listener has run and the object has not come back
    pub fn has_fired(&self) -> bool {
        !self.was_alive
    }
}

impl Default for DeathWatch {
    fn default() -> Self {
        Self::new()
    }
}
