//! Configuration types for the simulation.

use crate::error::{Error, Result};
use crate::types::{NutrientKind, Nutrients, OrganismKind, Position};
use serde::{Deserialize, Serialize};

/// How dispersal coordinates are folded back onto the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WrapMode {
    /// Anything below zero becomes `max - 1`, anything at or past `max` becomes 0
    #[default]
    SingleStep,
    /// True modulo wraparound
    Toroidal,
}

/// World configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Width of the world grid
    pub width: i32,
    /// Height of the world grid
    pub height: i32,
    /// Nutrient levels every cell starts with
    pub initial_soil: Nutrients,
    /// Clamp nutrient levels at zero after every adjustment
    pub clamp_at_zero: bool,
    /// Wraparound policy for dispersal
    pub wrap_mode: WrapMode,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
            initial_soil: Nutrients {
                nitrogen: 8.0,
                phosphorus: 8.0,
                potassium: 8.0,
                carbon: 4.0,
                oxygen: 0.0,
            },
            clamp_at_zero: true,
            wrap_mode: WrapMode::SingleStep,
        }
    }
}

/// Timing shared by every organism kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cadence {
    /// Ticks survived before natural death
    pub max_lifetime: u64,
    /// Reproduce whenever age is a multiple of this
    pub reproduction_interval: u64,
    /// Maximum per-axis child displacement
    pub dispersal_distance: i32,
}

impl Cadence {
    pub fn new(max_lifetime: u64, reproduction_interval: u64, dispersal_distance: i32) -> Self {
        Self {
            max_lifetime,
            reproduction_interval,
            dispersal_distance,
        }
    }
}

/// Bacteria policy: decompose into a nutrient, die of self-pollution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacteriaProfile {
    pub cadence: Cadence,
    /// Amount of the produced nutrient released on death
    pub death_yield: f64,
    /// Produced nutrient level above which the bacterium dies
    pub nutrient_ceiling: f64,
}

impl Default for BacteriaProfile {
    fn default() -> Self {
        Self {
            cadence: Cadence::new(20, 5, 1),
            death_yield: 1.0,
            nutrient_ceiling: 12.0,
        }
    }
}

/// Bacteria released when a plant decomposes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacteriaSpawn {
    pub min: u32,
    pub max: u32,
    /// Relative draw weight per bacteria kind
    pub weights: Vec<(OrganismKind, f64)>,
}

impl Default for BacteriaSpawn {
    fn default() -> Self {
        Self {
            min: 1,
            max: 3,
            weights: vec![
                (OrganismKind::NitrogenBacteria, 0.5),
                (OrganismKind::PhosphorusBacteria, 0.2),
                (OrganismKind::PotassiumBacteria, 0.2),
                (OrganismKind::OxygenBacteria, 0.1),
            ],
        }
    }
}

/// Plant policy: consume nutrients, starve below a floor, thin out above a density cap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantProfile {
    pub cadence: Cadence,
    /// Maximum plants of this kind in one cell
    pub density_cap: usize,
    /// Per-kind scale for consumption and death release
    pub nutrient_constant: f64,
    /// Watched nutrient level at or below which the plant starves
    pub nutrient_floor: f64,
    /// Nutrients checked against the floor
    pub watched: Vec<NutrientKind>,
    /// Per-nutrient consumption rate; per tick the plant removes
    /// `nutrient_constant * rate / max_lifetime` from its cell
    pub consumption: Nutrients,
    /// Multiples of `nutrient_constant` added to the cell on death (may be negative)
    pub death_release: Nutrients,
    /// Bacteria spawned at the plant's cell on death
    pub spawn: Option<BacteriaSpawn>,
}

impl PlantProfile {
    pub fn grass() -> Self {
        Self {
            cadence: Cadence::new(40, 8, 2),
            density_cap: 12,
            nutrient_constant: 1.0,
            nutrient_floor: 0.5,
            watched: vec![
                NutrientKind::Nitrogen,
                NutrientKind::Phosphorus,
                NutrientKind::Potassium,
            ],
            consumption: Nutrients {
                nitrogen: 1.0,
                phosphorus: 0.5,
                potassium: 0.5,
                ..Nutrients::zero()
            },
            death_release: Nutrients {
                carbon: 2.0,
                nitrogen: -1.0,
                phosphorus: -0.5,
                potassium: -0.5,
                ..Nutrients::zero()
            },
            spawn: Some(BacteriaSpawn::default()),
        }
    }

    pub fn tree() -> Self {
        Self {
            cadence: Cadence::new(200, 25, 3),
            density_cap: 2,
            nutrient_constant: 2.0,
            nutrient_floor: 1.0,
            watched: vec![
                NutrientKind::Carbon,
                NutrientKind::Nitrogen,
                NutrientKind::Phosphorus,
                NutrientKind::Potassium,
            ],
            consumption: Nutrients {
                carbon: 1.0,
                nitrogen: 0.5,
                phosphorus: 0.5,
                potassium: 0.5,
                ..Nutrients::zero()
            },
            death_release: Nutrients::zero(),
            spawn: None,
        }
    }

    /// Amount of `kind` removed from the cell each tick
    pub fn decay_per_tick(&self, kind: NutrientKind) -> f64 {
        if self.cadence.max_lifetime == 0 {
            return 0.0;
        }
        self.nutrient_constant * self.consumption.get(kind) / self.cadence.max_lifetime as f64
    }
}

/// Per-kind behavior tables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KindProfiles {
    pub nitrogen_bacteria: BacteriaProfile,
    pub phosphorus_bacteria: BacteriaProfile,
    pub potassium_bacteria: BacteriaProfile,
    pub oxygen_bacteria: BacteriaProfile,
    pub grass: PlantProfile,
    pub tree: PlantProfile,
}

impl Default for KindProfiles {
    fn default() -> Self {
        Self {
            nitrogen_bacteria: BacteriaProfile::default(),
            phosphorus_bacteria: BacteriaProfile::default(),
            potassium_bacteria: BacteriaProfile::default(),
            oxygen_bacteria: BacteriaProfile::default(),
            grass: PlantProfile::grass(),
            tree: PlantProfile::tree(),
        }
    }
}

impl KindProfiles {
    pub fn bacteria(&self, kind: OrganismKind) -> Option<&BacteriaProfile> {
        match kind {
            OrganismKind::NitrogenBacteria => Some(&self.nitrogen_bacteria),
            OrganismKind::PhosphorusBacteria => Some(&self.phosphorus_bacteria),
            OrganismKind::PotassiumBacteria => Some(&self.potassium_bacteria),
            OrganismKind::OxygenBacteria => Some(&self.oxygen_bacteria),
            OrganismKind::GrassPlant | OrganismKind::TreePlant => None,
        }
    }

    pub fn bacteria_mut(&mut self, kind: OrganismKind) -> Option<&mut BacteriaProfile> {
        match kind {
            OrganismKind::NitrogenBacteria => Some(&mut self.nitrogen_bacteria),
            OrganismKind::PhosphorusBacteria => Some(&mut self.phosphorus_bacteria),
            OrganismKind::PotassiumBacteria => Some(&mut self.potassium_bacteria),
            OrganismKind::OxygenBacteria => Some(&mut self.oxygen_bacteria),
            OrganismKind::GrassPlant | OrganismKind::TreePlant => None,
        }
    }

    pub fn plant(&self, kind: OrganismKind) -> Option<&PlantProfile> {
        match kind {
            OrganismKind::GrassPlant => Some(&self.grass),
            OrganismKind::TreePlant => Some(&self.tree),
            _ => None,
        }
    }

    pub fn plant_mut(&mut self, kind: OrganismKind) -> Option<&mut PlantProfile> {
        match kind {
            OrganismKind::GrassPlant => Some(&mut self.grass),
            OrganismKind::TreePlant => Some(&mut self.tree),
            _ => None,
        }
    }

    pub fn cadence(&self, kind: OrganismKind) -> Cadence {
        match kind {
            OrganismKind::NitrogenBacteria => self.nitrogen_bacteria.cadence,
            OrganismKind::PhosphorusBacteria => self.phosphorus_bacteria.cadence,
            OrganismKind::PotassiumBacteria => self.potassium_bacteria.cadence,
            OrganismKind::OxygenBacteria => self.oxygen_bacteria.cadence,
            OrganismKind::GrassPlant => self.grass.cadence,
            OrganismKind::TreePlant => self.tree.cadence,
        }
    }

    pub fn cadence_mut(&mut self, kind: OrganismKind) -> &mut Cadence {
        match kind {
            OrganismKind::NitrogenBacteria => &mut self.nitrogen_bacteria.cadence,
            OrganismKind::PhosphorusBacteria => &mut self.phosphorus_bacteria.cadence,
            OrganismKind::PotassiumBacteria => &mut self.potassium_bacteria.cadence,
            OrganismKind::OxygenBacteria => &mut self.oxygen_bacteria.cadence,
            OrganismKind::GrassPlant => &mut self.grass.cadence,
            OrganismKind::TreePlant => &mut self.tree.cadence,
        }
    }

    /// Per-cell population limit, if the kind has one
    pub fn density_cap(&self, kind: OrganismKind) -> Option<usize> {
        self.plant(kind).map(|profile| profile.density_cap)
    }

    fn validate(&self) -> Result<()> {
        for kind in OrganismKind::all() {
            let cadence = self.cadence(kind);
            if cadence.max_lifetime == 0 {
                return Err(Error::Config(format!("{kind}: max_lifetime must be positive")));
            }
            if cadence.reproduction_interval == 0 {
                return Err(Error::Config(format!(
                    "{kind}: reproduction_interval must be positive"
                )));
            }
            if cadence.dispersal_distance < 1 {
                return Err(Error::Config(format!(
                    "{kind}: dispersal_distance must be at least 1"
                )));
            }
        }

        for kind in [OrganismKind::GrassPlant, OrganismKind::TreePlant] {
            let Some(profile) = self.plant(kind) else { continue };
            if let Some(spawn) = &profile.spawn {
                if spawn.min > spawn.max {
                    return Err(Error::Config(format!(
                        "{kind}: spawn range {}..={} is empty",
                        spawn.min, spawn.max
                    )));
                }
                if spawn.weights.is_empty() {
                    return Err(Error::Config(format!("{kind}: spawn weights are empty")));
                }
                for (spawned, weight) in &spawn.weights {
                    if !spawned.is_bacteria() {
                        return Err(Error::Config(format!(
                            "{kind}: can only spawn bacteria, not {spawned}"
                        )));
                    }
                    if !weight.is_finite() || *weight < 0.0 {
                        return Err(Error::Config(format!(
                            "{kind}: invalid spawn weight {weight} for {spawned}"
                        )));
                    }
                }
                if spawn.weights.iter().all(|(_, weight)| *weight == 0.0) {
                    return Err(Error::Config(format!("{kind}: spawn weights are all zero")));
                }
            }
        }

        Ok(())
    }
}

/// Time-windowed population seeding: while `start_tick <= clock < end_tick`,
/// spawn `per_tick` organisms of `kind` at random positions every tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedingEvent {
    pub kind: OrganismKind,
    pub start_tick: u64,
    pub end_tick: u64,
    pub per_tick: u32,
}

impl SeedingEvent {
    pub fn new(kind: OrganismKind, start_tick: u64, end_tick: u64, per_tick: u32) -> Self {
        Self {
            kind,
            start_tick,
            end_tick,
            per_tick,
        }
    }

    pub fn is_active(&self, tick: u64) -> bool {
        self.start_tick <= tick && tick < self.end_tick
    }
}

/// Organism placed into the world at construction
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SeedOrganism {
    pub kind: OrganismKind,
    pub position: Position,
}

impl SeedOrganism {
    pub fn new(kind: OrganismKind, x: i32, y: i32) -> Self {
        Self {
            kind,
            position: Position::new(x, y),
        }
    }
}

/// Simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// World configuration
    pub world: WorldConfig,
    /// Per-kind behavior
    pub profiles: KindProfiles,
    /// Scheduled population seeding
    pub seeding: Vec<SeedingEvent>,
    /// Organisms present before the first tick
    pub initial_organisms: Vec<SeedOrganism>,
    /// Emit population metrics every this many ticks (0 disables)
    pub metrics_interval: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            world: WorldConfig::default(),
            profiles: KindProfiles::default(),
            seeding: vec![
                SeedingEvent::new(OrganismKind::GrassPlant, 100, 125, 5),
                SeedingEvent::new(OrganismKind::TreePlant, 200, 215, 5),
            ],
            initial_organisms: Vec::new(),
            metrics_interval: 100,
        }
    }
}

impl SimulationConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check the configuration before any tick runs
    pub fn validate(&self) -> Result<()> {
        let (width, height) = (self.world.width, self.world.height);
        if width <= 0 || height <= 0 {
            return Err(Error::Config(format!(
                "world dimensions must be positive, got {width}x{height}"
            )));
        }

        for kind in NutrientKind::all() {
            let level = self.world.initial_soil.get(kind);
            if !level.is_finite() {
                return Err(Error::Config(format!("initial {kind} level is not finite")));
            }
        }

        self.profiles.validate()?;

        for seed in &self.initial_organisms {
            if !seed.position.in_bounds(width, height) {
                return Err(Error::Config(format!(
                    "initial {} at {} is outside the {width}x{height} grid",
                    seed.kind, seed.position
                )));
            }
        }

        for event in &self.seeding {
            if event.start_tick > event.end_tick {
                return Err(Error::Config(format!(
                    "seeding window for {} starts at {} after it ends at {}",
                    event.kind, event.start_tick, event.end_tick
                )));
            }
        }

        Ok(())
    }
}
