//! Organism state and the arena that owns it.

use humus_core::{Cadence, Category, OrganismKind, Position};
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Stable handle for organisms backed by a generational slot map.
    pub struct OrganismId;
}

/// Sole owner of every live organism
pub type OrganismArena = SlotMap<OrganismId, Organism>;

/// An organism in the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organism {
    pub kind: OrganismKind,
    pub position: Position,
    pub age: u64,
    pub max_lifetime: u64,
    pub reproduction_interval: u64,
    /// Clock value when the organism was created
    pub born_at: u64,
}

impl Organism {
    pub fn new(kind: OrganismKind, position: Position, cadence: &Cadence, born_at: u64) -> Self {
        Self {
            kind,
            position,
            age: 0,
            max_lifetime: cadence.max_lifetime,
            reproduction_interval: cadence.reproduction_interval,
            born_at,
        }
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    /// Advance one tick, returning the new age
    pub fn grow_older(&mut self) -> u64 {
        self.age += 1;
        self.age
    }

    pub fn exceeded_lifetime(&self) -> bool {
        self.age > self.max_lifetime
    }

    pub fn due_to_reproduce(&self) -> bool {
        self.reproduction_interval > 0 && self.age > 0 && self.age % self.reproduction_interval == 0
    }
}
