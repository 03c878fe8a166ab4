//! Per-organism tick state machine and per-kind death/reproduction policies.
//!
//! Every live organism is stepped once per tick:
//! 1. age by one tick
//! 2. die of old age once `age > max_lifetime`
//! 3. die if the kind's threshold check fails (pollution, starvation, crowding)
//! 4. reproduce when `age % reproduction_interval == 0`
//!
//! A death ends the step; nothing else runs for that organism.

use crate::dispersal;
use crate::organism::OrganismId;
use crate::world::World;
use humus_core::{
    BacteriaSpawn, DeathCause, Error, NutrientKind, OrganismKind, Position, Result,
};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use tracing::{debug, trace};

/// What happened to an organism during its step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Survived,
    /// Reproduction was due; `None` when the target cell was full
    Reproduced(Option<OrganismId>),
    Died(DeathCause),
}

impl World {
    /// Run one lifecycle step for a live organism
    pub fn step_organism(&mut self, id: OrganismId) -> Result<StepOutcome> {
        let organism = self.organisms.get_mut(id).ok_or_else(|| {
            Error::InvariantViolation(format!("organism {id:?} stepped after removal"))
        })?;

        organism.grow_older();
        let kind = organism.kind;
        let position = organism.position;
        let too_old = organism.exceeded_lifetime();
        let due = organism.due_to_reproduce();

        if too_old {
            self.die(id, DeathCause::OldAge)?;
            return Ok(StepOutcome::Died(DeathCause::OldAge));
        }

        if let Some(cause) = self.check_death(kind, position)? {
            self.die(id, cause)?;
            return Ok(StepOutcome::Died(cause));
        }

        if due {
            let child = self.reproduce(kind, position)?;
            return Ok(StepOutcome::Reproduced(child));
        }

        Ok(StepOutcome::Survived)
    }

    /// Threshold death check; plants consume their share of the cell first
    fn check_death(&mut self, kind: OrganismKind, position: Position) -> Result<Option<DeathCause>> {
        if let Some(profile) = self.profiles.bacteria(kind) {
            let Some(nutrient) = kind.produced_nutrient() else {
                return Ok(None);
            };
            let level = self.grid.cell_at(position)?.nutrient(nutrient);
            if level > profile.nutrient_ceiling {
                return Ok(Some(DeathCause::Pollution));
            }
            return Ok(None);
        }

        let Some(profile) = self.profiles.plant(kind) else {
            return Ok(None);
        };

        for nutrient in NutrientKind::all() {
            let decay = profile.decay_per_tick(nutrient);
            if decay != 0.0 {
                self.grid.adjust_nutrient(position, nutrient, -decay)?;
            }
        }

        let cell = self.grid.cell_at(position)?;
        let starving = profile
            .watched
            .iter()
            .any(|nutrient| cell.nutrient(*nutrient) <= profile.nutrient_floor);
        if starving {
            return Ok(Some(DeathCause::Starvation));
        }

        if cell.population(kind) > profile.density_cap {
            return Ok(Some(DeathCause::Overcrowding));
        }

        Ok(None)
    }

    /// Place a child of `kind` near `origin`
    fn reproduce(&mut self, kind: OrganismKind, origin: Position) -> Result<Option<OrganismId>> {
        let distance = self.profiles.cadence(kind).dispersal_distance;
        let target = dispersal::new_position(
            origin,
            self.grid.width,
            self.grid.height,
            distance,
            self.wrap_mode,
            &mut self.rng,
        );
        if !self.grid.contains(target) {
            return Err(Error::InvariantViolation(format!(
                "dispersal from {origin} produced out-of-bounds {target}"
            )));
        }

        if let Some(cap) = self.profiles.density_cap(kind) {
            if self.grid.population(target, kind)? >= cap {
                self.stats.record_crowded_birth(kind);
                trace!(
                    kind = %kind,
                    target_x = target.x,
                    target_y = target.y,
                    tick = self.clock,
                    "Reproduction skipped: target cell full"
                );
                return Ok(None);
            }
        }

        let child = self.spawn(kind, target)?;
        self.stats.record_birth(kind);
        trace!(
            kind = %kind,
            parent_x = origin.x,
            parent_y = origin.y,
            child_x = target.x,
            child_y = target.y,
            tick = self.clock,
            "Organism reproduced"
        );
        Ok(Some(child))
    }

    /// Death transition: remove the organism, then apply its kind's side effects
    pub(crate) fn die(&mut self, id: OrganismId, cause: DeathCause) -> Result<()> {
        let organism = self.remove(id)?;
        let kind = organism.kind;
        let position = organism.position;

        match kind {
            OrganismKind::NitrogenBacteria
            | OrganismKind::PhosphorusBacteria
            | OrganismKind::PotassiumBacteria
            | OrganismKind::OxygenBacteria => {
                if let (Some(nutrient), Some(profile)) =
                    (kind.produced_nutrient(), self.profiles.bacteria(kind))
                {
                    self.grid
                        .adjust_nutrient(position, nutrient, profile.death_yield)?;
                }
            }
            OrganismKind::GrassPlant => {
                self.grid.add_plant_matter(position)?;
                self.release_nutrients(kind, position)?;
                let spawn = self
                    .profiles
                    .plant(kind)
                    .and_then(|profile| profile.spawn.clone());
                if let Some(spawn) = spawn {
                    self.spawn_decomposers(&spawn, position)?;
                }
            }
            OrganismKind::TreePlant => {
                self.grid.add_tree_matter(position)?;
                self.release_nutrients(kind, position)?;
            }
        }

        self.stats.record_death(kind, cause);
        debug!(
            event = "organism_death",
            kind = %kind,
            cause = %cause,
            age = organism.age,
            born_at = organism.born_at,
            position_x = position.x,
            position_y = position.y,
            tick = self.clock,
            "Organism died"
        );
        Ok(())
    }

    fn release_nutrients(&mut self, kind: OrganismKind, position: Position) -> Result<()> {
        let Some(profile) = self.profiles.plant(kind) else {
            return Ok(());
        };
        for (nutrient, multiple) in profile.death_release.non_zero() {
            self.grid
                .adjust_nutrient(position, nutrient, profile.nutrient_constant * multiple)?;
        }
        Ok(())
    }

    /// Spawn bacteria at a decomposing plant's cell
    fn spawn_decomposers(&mut self, spawn: &BacteriaSpawn, position: Position) -> Result<()> {
        let weights = WeightedIndex::new(spawn.weights.iter().map(|(_, weight)| *weight))
            .map_err(|e| Error::Config(format!("invalid bacteria spawn weights: {e}")))?;
        let count = self.rng.gen_range(spawn.min..=spawn.max);

        for _ in 0..count {
            let (kind, _) = spawn.weights[weights.sample(&mut self.rng)];
            self.spawn(kind, position)?;
            self.stats.record_spawn(kind);
        }

        trace!(
            count = count,
            position_x = position.x,
            position_y = position.y,
            tick = self.clock,
            "Decomposers spawned"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use humus_core::{Nutrients, SimulationConfig};

    fn world_with_soil(soil: Nutrients) -> World {
        let mut config = SimulationConfig::default();
        config.world.initial_soil = soil;
        World::new(&config)
    }

    fn rich_soil() -> Nutrients {
        Nutrients {
            nitrogen: 10.0,
            phosphorus: 10.0,
            potassium: 10.0,
            carbon: 10.0,
            oxygen: 0.0,
        }
    }

    #[test]
    fn test_step_ages_by_one() {
        let mut world = world_with_soil(Nutrients::zero());
        let id = world
            .spawn(OrganismKind::PhosphorusBacteria, Position::new(3, 3))
            .unwrap();

        assert_eq!(world.step_organism(id).unwrap(), StepOutcome::Survived);
        assert_eq!(world.organism(id).unwrap().age, 1);
    }

    #[test]
    fn test_old_age_releases_yield_once() {
        let mut world = world_with_soil(Nutrients::zero());
        world
            .profiles
            .cadence_mut(OrganismKind::OxygenBacteria)
            .max_lifetime = 1;
        world
            .profiles
            .cadence_mut(OrganismKind::OxygenBacteria)
            .reproduction_interval = 100;
        let pos = Position::new(0, 0);
        let id = world.spawn(OrganismKind::OxygenBacteria, pos).unwrap();

        assert_eq!(world.step_organism(id).unwrap(), StepOutcome::Survived);
        assert_eq!(
            world.step_organism(id).unwrap(),
            StepOutcome::Died(DeathCause::OldAge)
        );
        assert_eq!(world.grid.cell_at(pos).unwrap().nutrient(NutrientKind::Oxygen), 1.0);
        assert!(matches!(
            world.step_organism(id),
            Err(Error::InvariantViolation(_))
        ));
        assert_eq!(world.grid.cell_at(pos).unwrap().nutrient(NutrientKind::Oxygen), 1.0);
    }

    #[test]
    fn test_bacteria_die_of_pollution() {
        let mut soil = Nutrients::zero();
        soil.potassium = 12.5;
        let mut world = world_with_soil(soil);
        let pos = Position::new(6, 2);
        let id = world.spawn(OrganismKind::PotassiumBacteria, pos).unwrap();

        assert_eq!(
            world.step_organism(id).unwrap(),
            StepOutcome::Died(DeathCause::Pollution)
        );
        assert_eq!(
            world.grid.cell_at(pos).unwrap().nutrient(NutrientKind::Potassium),
            13.5
        );
    }

    #[test]
    fn test_ceiling_is_strict() {
        let mut soil = Nutrients::zero();
        soil.nitrogen = 12.0;
        let mut world = world_with_soil(soil);
        let id = world
            .spawn(OrganismKind::NitrogenBacteria, Position::new(1, 1))
            .unwrap();
        assert_eq!(world.step_organism(id).unwrap(), StepOutcome::Survived);
    }

    #[test]
    fn test_plant_consumes_each_tick() {
        let mut world = world_with_soil(rich_soil());
        let pos = Position::new(8, 8);
        let id = world.spawn(OrganismKind::GrassPlant, pos).unwrap();

        world.step_organism(id).unwrap();
        let cell = world.grid.cell_at(pos).unwrap();
        assert!((cell.nutrient(NutrientKind::Nitrogen) - (10.0 - 0.025)).abs() < 1e-12);
        assert!((cell.nutrient(NutrientKind::Phosphorus) - (10.0 - 0.0125)).abs() < 1e-12);
        assert_eq!(cell.nutrient(NutrientKind::Carbon), 10.0);
    }

    #[test]
    fn test_starving_grass_decomposes() {
        let mut world = world_with_soil(Nutrients::zero());
        let pos = Position::new(10, 10);
        let id = world.spawn(OrganismKind::GrassPlant, pos).unwrap();

        assert_eq!(
            world.step_organism(id).unwrap(),
            StepOutcome::Died(DeathCause::Starvation)
        );

        let cell = world.grid.cell_at(pos).unwrap();
        assert_eq!(cell.plant_matter, 1);
        assert_eq!(cell.nutrient(NutrientKind::Carbon), 2.0);
        assert_eq!(cell.nutrient(NutrientKind::Nitrogen), 0.0);

        let spawned: usize = OrganismKind::bacteria()
            .iter()
            .map(|kind| cell.population(*kind))
            .sum();
        assert!((1..=3).contains(&spawned));
        assert_eq!(world.bacteria.len(), spawned);
        assert!(world.verify_consistency().is_ok());
    }

    #[test]
    fn test_dead_tree_leaves_matter_without_spawn() {
        let mut world = world_with_soil(Nutrients::zero());
        let pos = Position::new(2, 9);
        let id = world.spawn(OrganismKind::TreePlant, pos).unwrap();

        assert_eq!(
            world.step_organism(id).unwrap(),
            StepOutcome::Died(DeathCause::Starvation)
        );
        let cell = world.grid.cell_at(pos).unwrap();
        assert_eq!(cell.tree_matter, 1);
        assert_eq!(cell.plant_matter, 0);
        assert!(world.bacteria.is_empty());
    }

    #[test]
    fn test_overcrowded_grass_thins_out() {
        let mut world = world_with_soil(rich_soil());
        let pos = Position::new(5, 5);
        let ids: Vec<_> = (0..13)
            .map(|_| world.spawn(OrganismKind::GrassPlant, pos).unwrap())
            .collect();

        assert_eq!(
            world.step_organism(ids[0]).unwrap(),
            StepOutcome::Died(DeathCause::Overcrowding)
        );
        assert_eq!(world.step_organism(ids[1]).unwrap(), StepOutcome::Survived);
        assert_eq!(world.grid.population(pos, OrganismKind::GrassPlant).unwrap(), 12);
    }

    #[test]
    fn test_reproduction_places_child_nearby() {
        let mut world = world_with_soil(Nutrients::zero());
        world
            .profiles
            .cadence_mut(OrganismKind::NitrogenBacteria)
            .reproduction_interval = 1;
        let origin = Position::new(5, 5);
        let parent = world.spawn(OrganismKind::NitrogenBacteria, origin).unwrap();

        let StepOutcome::Reproduced(Some(child)) = world.step_organism(parent).unwrap() else {
            panic!("expected a child");
        };
        let child = world.organism(child).unwrap();
        assert_eq!(child.age, 0);
        assert_ne!(child.position.x, origin.x);
        assert_ne!(child.position.y, origin.y);
        assert_eq!(child.position.chebyshev_distance(&origin), 1);

        let parent = world.organism(parent).unwrap();
        assert_eq!(parent.age, 1);
        assert_eq!(parent.position, origin);
    }

    #[test]
    fn test_reproduction_blocked_by_full_cell() {
        let mut config = SimulationConfig::default();
        config.world.width = 1;
        config.world.height = 1;
        config.world.initial_soil = rich_soil();
        config.profiles.tree.cadence.reproduction_interval = 1;
        let mut world = World::new(&config);

        let pos = Position::new(0, 0);
        let first = world.spawn(OrganismKind::TreePlant, pos).unwrap();
        world.spawn(OrganismKind::TreePlant, pos).unwrap();

        assert_eq!(
            world.step_organism(first).unwrap(),
            StepOutcome::Reproduced(None)
        );
        assert_eq!(world.grid.population(pos, OrganismKind::TreePlant).unwrap(), 2);
        assert_eq!(
            world.stats.tally(OrganismKind::TreePlant).crowded_births,
            1
        );
    }
}
