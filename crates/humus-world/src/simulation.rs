//! Tick scheduler and run loop.

use crate::grid::Grid;
use crate::lifecycle::StepOutcome;
use crate::organism::{Organism, OrganismId};
use crate::seeding::SeedingSchedule;
use crate::snapshot::WorldSnapshot;
use crate::world::World;
use humus_core::{
    Category, DeathCause, OrganismKind, PopulationStats, Position, Result, SimulationConfig,
};
use serde::{Deserialize, Serialize};
use tracing::{event, info, instrument, trace, Level};

/// End condition for [`Simulation::run`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunUntil {
    /// Run until the clock reaches this tick
    Tick(u64),
    /// Run exactly this many more ticks
    Ticks(u64),
}

/// Counts for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub tick: u64,
    pub stepped: usize,
    pub births: usize,
    pub deaths: usize,
    pub seeded: usize,
}

pub struct Simulation {
    world: World,
    seeding: SeedingSchedule,
    config: SimulationConfig,
}

impl Simulation {
    /// Validate `config`, build the world and place the initial organisms
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let mut world = World::new(&config);
        for seed in &config.initial_organisms {
            world.spawn(seed.kind, seed.position)?;
        }

        info!(
            width = config.world.width,
            height = config.world.height,
            seed = config.seed,
            initial_organisms = config.initial_organisms.len(),
            seeding_events = config.seeding.len(),
            "Simulation created"
        );

        Ok(Self {
            world,
            seeding: SeedingSchedule::new(config.seeding.clone()),
            config,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn clock(&self) -> u64 {
        self.world.clock()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn grid(&self) -> &Grid {
        self.world.grid()
    }

    /// Mutable grid access for preparing soil between ticks
    pub fn grid_mut(&mut self) -> &mut Grid {
        self.world.grid_mut()
    }

    pub fn organism(&self, id: OrganismId) -> Option<&Organism> {
        self.world.organism(id)
    }

    pub fn bacteria_count(&self) -> usize {
        self.world.live_set(Category::Bacteria).len()
    }

    pub fn plant_count(&self) -> usize {
        self.world.live_set(Category::Plant).len()
    }

    pub fn count_of(&self, kind: OrganismKind) -> usize {
        self.world.count_of(kind)
    }

    pub fn stats(&self) -> &PopulationStats {
        self.world.stats()
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        self.world.snapshot()
    }

    /// Add an organism of age 0 outside the seeding schedule
    pub fn spawn(&mut self, kind: OrganismKind, position: Position) -> Result<OrganismId> {
        self.world.spawn(kind, position)
    }

    /// Run the simulation until the end condition is met
    pub fn run(&mut self, until: RunUntil) -> Result<SimulationResult> {
        self.drive(until, None)
    }

    /// Run the simulation, handing the post-tick snapshot to `observer` after every tick
    pub fn run_with<F>(&mut self, until: RunUntil, mut observer: F) -> Result<SimulationResult>
    where
        F: FnMut(&WorldSnapshot),
    {
        self.drive(until, Some(&mut observer))
    }

    #[instrument(skip(self, observer), fields(start_tick = self.world.clock()))]
    fn drive(
        &mut self,
        until: RunUntil,
        mut observer: Option<&mut dyn FnMut(&WorldSnapshot)>,
    ) -> Result<SimulationResult> {
        let start = self.world.clock();
        let end = match until {
            RunUntil::Tick(tick) => tick.max(start),
            RunUntil::Ticks(count) => start + count,
        };
        info!("Running simulation from tick {} to {}", start, end);

        let mut remaining = end - start;
        while remaining > 0 {
            self.tick()?;
            remaining -= 1;
            if let Some(observer) = observer.as_mut() {
                observer(&self.world.snapshot());
            }
        }

        self.emit_run_summary(start);

        Ok(SimulationResult {
            snapshot: self.world.snapshot(),
            stats: self.world.stats().clone(),
            total_ticks: self.world.clock() - start,
        })
    }

    /// Execute one simulation step: plants, then bacteria, then seeding
    pub fn tick(&mut self) -> Result<TickSummary> {
        let mut summary = TickSummary {
            tick: self.world.clock(),
            ..Default::default()
        };

        // Bacteria decompose what the plants left behind this tick
        self.run_pass(Category::Plant, &mut summary)?;
        self.run_pass(Category::Bacteria, &mut summary)?;

        summary.seeded = self.seeding.apply(&mut self.world)?;

        if cfg!(debug_assertions) {
            self.world.verify_consistency()?;
        }

        trace!(
            tick = summary.tick,
            stepped = summary.stepped,
            births = summary.births,
            deaths = summary.deaths,
            seeded = summary.seeded,
            "Tick complete"
        );

        self.world.clock += 1;

        let interval = self.config.metrics_interval;
        if interval > 0 && self.world.clock % interval == 0 {
            self.emit_population_metrics();
        }

        Ok(summary)
    }

    /// Step every organism of `category` that was alive when the pass began
    fn run_pass(&mut self, category: Category, summary: &mut TickSummary) -> Result<()> {
        let frozen = self.world.live_set(category).snapshot();

        for id in frozen {
            // Killed earlier in this pass
            if !self.world.is_alive(id) {
                continue;
            }

            summary.stepped += 1;
            match self.world.step_organism(id)? {
                StepOutcome::Died(_) => summary.deaths += 1,
                StepOutcome::Reproduced(Some(_)) => summary.births += 1,
                StepOutcome::Reproduced(None) | StepOutcome::Survived => {}
            }
        }

        Ok(())
    }

    /// Emit population gauges
    fn emit_population_metrics(&self) {
        let snapshot = self.world.snapshot();
        let population = snapshot.population();
        let count = |kind: OrganismKind| population.get(&kind).copied().unwrap_or(0);

        info!(
            event = "population_metrics",
            tick = self.world.clock(),
            bacteria = snapshot.bacteria.len(),
            plants = snapshot.plants.len(),
            nitrogen_bacteria = count(OrganismKind::NitrogenBacteria),
            phosphorus_bacteria = count(OrganismKind::PhosphorusBacteria),
            potassium_bacteria = count(OrganismKind::PotassiumBacteria),
            oxygen_bacteria = count(OrganismKind::OxygenBacteria),
            grass = count(OrganismKind::GrassPlant),
            trees = count(OrganismKind::TreePlant),
            total_nitrogen = snapshot.totals.nutrients.nitrogen,
            total_phosphorus = snapshot.totals.nutrients.phosphorus,
            total_potassium = snapshot.totals.nutrients.potassium,
            total_carbon = snapshot.totals.nutrients.carbon,
            total_oxygen = snapshot.totals.nutrients.oxygen,
            plant_matter = snapshot.totals.plant_matter,
            tree_matter = snapshot.totals.tree_matter,
            "Population metrics snapshot"
        );

        event!(
            Level::INFO,
            gauge_name = "population_total",
            gauge_value = snapshot.bacteria.len() + snapshot.plants.len(),
            tick = self.world.clock(),
            "Population gauge"
        );
    }

    fn emit_run_summary(&self, start: u64) {
        let stats = self.world.stats();

        info!(
            event = "run_summary",
            start_tick = start,
            final_tick = self.world.clock(),
            bacteria_alive = self.bacteria_count(),
            plants_alive = self.plant_count(),
            births_total = stats.total_births(),
            deaths_total = stats.total_deaths(),
            deaths_old_age = stats.deaths_by(DeathCause::OldAge),
            deaths_pollution = stats.deaths_by(DeathCause::Pollution),
            deaths_starvation = stats.deaths_by(DeathCause::Starvation),
            deaths_overcrowding = stats.deaths_by(DeathCause::Overcrowding),
            "Run complete"
        );

        for (kind, tally) in &stats.kinds {
            info!(
                event = "kind_summary",
                kind = %kind,
                alive = self.world.count_of(*kind),
                births = tally.births,
                crowded_births = tally.crowded_births,
                spawned = tally.spawned,
                deaths = tally.total_deaths(),
                "Kind totals"
            );
        }

        event!(
            Level::INFO,
            gauge_name = "final_population",
            gauge_value = self.bacteria_count() + self.plant_count(),
            "Final population gauge"
        );
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SimulationResult {
    pub snapshot: WorldSnapshot,
    pub stats: PopulationStats,
    pub total_ticks: u64,
}
