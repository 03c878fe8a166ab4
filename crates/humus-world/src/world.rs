//! World state: grid, organism arena and live-sets.

use crate::dispersal;
use crate::grid::Grid;
use crate::organism::{Organism, OrganismArena, OrganismId};
use crate::population::LiveSet;
use humus_core::{
    Category, Error, KindProfiles, OrganismKind, PopulationStats, Position, Result,
    SimulationConfig, WrapMode,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Placement attempts before a random spawn gives up
const SPAWN_ATTEMPTS: usize = 100;

/// Everything the lifecycle engine mutates during a tick
pub struct World {
    pub(crate) grid: Grid,
    pub(crate) organisms: OrganismArena,
    pub(crate) bacteria: LiveSet,
    pub(crate) plants: LiveSet,
    pub(crate) profiles: KindProfiles,
    pub(crate) wrap_mode: WrapMode,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) clock: u64,
    pub(crate) stats: PopulationStats,
}

impl World {
    /// Build an empty world; `config` must already be validated
    pub fn new(config: &SimulationConfig) -> Self {
        let world_config = &config.world;
        Self {
            grid: Grid::new(
                world_config.width,
                world_config.height,
                world_config.initial_soil,
                world_config.clamp_at_zero,
            ),
            organisms: OrganismArena::with_key(),
            bacteria: LiveSet::new(),
            plants: LiveSet::new(),
            profiles: config.profiles.clone(),
            wrap_mode: world_config.wrap_mode,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            clock: 0,
            stats: PopulationStats::new(),
        }
    }

    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn profiles(&self) -> &KindProfiles {
        &self.profiles
    }

    pub fn stats(&self) -> &PopulationStats {
        &self.stats
    }

    pub fn organism(&self, id: OrganismId) -> Option<&Organism> {
        self.organisms.get(id)
    }

    pub fn live_set(&self, category: Category) -> &LiveSet {
        match category {
            Category::Bacteria => &self.bacteria,
            Category::Plant => &self.plants,
        }
    }

    fn live_set_mut(&mut self, category: Category) -> &mut LiveSet {
        match category {
            Category::Bacteria => &mut self.bacteria,
            Category::Plant => &mut self.plants,
        }
    }

    pub fn is_alive(&self, id: OrganismId) -> bool {
        self.organisms.contains_key(id)
    }

    /// Live organisms of one category in iteration order
    pub fn organisms_in(&self, category: Category) -> impl Iterator<Item = (OrganismId, &Organism)> + '_ {
        self.live_set(category)
            .iter()
            .filter_map(move |id| self.organisms.get(id).map(|organism| (id, organism)))
    }

    pub fn count_of(&self, kind: OrganismKind) -> usize {
        self.organisms_in(kind.category())
            .filter(|(_, organism)| organism.kind == kind)
            .count()
    }

    /// Create an organism of age 0 and register it everywhere
    pub fn spawn(&mut self, kind: OrganismKind, position: Position) -> Result<OrganismId> {
        if !self.grid.contains(position) {
            return Err(Error::OutOfBounds {
                x: position.x,
                y: position.y,
                width: self.grid.width,
                height: self.grid.height,
            });
        }

        let cadence = self.profiles.cadence(kind);
        let id = self
            .organisms
            .insert(Organism::new(kind, position, &cadence, self.clock));
        self.live_set_mut(kind.category()).insert(id);
        self.grid.register(position, kind, id)?;
        Ok(id)
    }

    /// Spawn at a uniformly random cell that still has room for `kind`
    pub fn spawn_at_random(&mut self, kind: OrganismKind) -> Result<Option<OrganismId>> {
        let cap = self.profiles.density_cap(kind);
        for _ in 0..SPAWN_ATTEMPTS {
            let position = dispersal::random_position(self.grid.width, self.grid.height, &mut self.rng);
            if let Some(cap) = cap {
                if self.grid.population(position, kind)? >= cap {
                    continue;
                }
            }
            return self.spawn(kind, position).map(Some);
        }

        debug!(
            kind = %kind,
            attempts = SPAWN_ATTEMPTS,
            tick = self.clock,
            "No room found for random spawn"
        );
        Ok(None)
    }

    /// Remove an organism from the arena, its live-set and its cell in one step
    pub(crate) fn remove(&mut self, id: OrganismId) -> Result<Organism> {
        let organism = self.organisms.remove(id).ok_or_else(|| {
            Error::InvariantViolation(format!("organism {id:?} removed twice"))
        })?;
        if !self.live_set_mut(organism.category()).remove(id) {
            return Err(Error::InvariantViolation(format!(
                "{} {id:?} missing from its live-set",
                organism.kind
            )));
        }
        self.grid.unregister(organism.position, organism.kind, id)?;
        Ok(organism)
    }

    /// Check that arena, live-sets and cell occupant indices agree
    pub fn verify_consistency(&self) -> Result<()> {
        let tracked = self.bacteria.len() + self.plants.len();
        if tracked != self.organisms.len() {
            return Err(Error::InvariantViolation(format!(
                "{} organisms in the arena but {tracked} in live-sets",
                self.organisms.len()
            )));
        }

        for category in [Category::Bacteria, Category::Plant] {
            for id in self.live_set(category).iter() {
                let organism = self.organisms.get(id).ok_or_else(|| {
                    Error::InvariantViolation(format!("live-set holds removed organism {id:?}"))
                })?;
                if organism.category() != category {
                    return Err(Error::InvariantViolation(format!(
                        "{} {id:?} is in the {category:?} live-set",
                        organism.kind
                    )));
                }
                if !self.grid.cell_at(organism.position)?.contains(organism.kind, id) {
                    return Err(Error::InvariantViolation(format!(
                        "{} {id:?} is not registered at {}",
                        organism.kind, organism.position
                    )));
                }
            }
        }

        let mut registered = 0;
        for (position, cell) in self.grid.iter() {
            for (kind, id) in cell.occupants() {
                let organism = self.organisms.get(id).ok_or_else(|| {
                    Error::InvariantViolation(format!("cell {position} holds removed organism {id:?}"))
                })?;
                if organism.position != position || organism.kind != kind {
                    return Err(Error::InvariantViolation(format!(
                        "cell {position} lists {id:?} as {kind}, organism is {} at {}",
                        organism.kind, organism.position
                    )));
                }
                registered += 1;
            }
        }
        if registered != self.organisms.len() {
            return Err(Error::InvariantViolation(format!(
                "{registered} cell registrations for {} organisms",
                self.organisms.len()
            )));
        }

        Ok(())
    }
}
