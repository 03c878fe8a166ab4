//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 2D position in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn add(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Whether the position lies inside a `width` x `height` grid
    pub fn in_bounds(&self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.x < width && self.y >= 0 && self.y < height
    }

    /// Chebyshev distance to another position (ignores wraparound)
    pub fn chebyshev_distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Soil nutrient tracked per cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NutrientKind {
    Nitrogen,
    Phosphorus,
    Potassium,
    Carbon,
    Oxygen,
}

impl NutrientKind {
    pub fn all() -> [NutrientKind; 5] {
        [
            NutrientKind::Nitrogen,
            NutrientKind::Phosphorus,
            NutrientKind::Potassium,
            NutrientKind::Carbon,
            NutrientKind::Oxygen,
        ]
    }
}

impl fmt::Display for NutrientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NutrientKind::Nitrogen => "nitrogen",
            NutrientKind::Phosphorus => "phosphorus",
            NutrientKind::Potassium => "potassium",
            NutrientKind::Carbon => "carbon",
            NutrientKind::Oxygen => "oxygen",
        };
        f.write_str(name)
    }
}

/// Nutrient quantities, one value per [`NutrientKind`].
///
/// Used both for absolute cell concentrations and for per-nutrient
/// rates/multipliers in kind profiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrients {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub carbon: f64,
    pub oxygen: f64,
}

impl Nutrients {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: NutrientKind) -> f64 {
        match kind {
            NutrientKind::Nitrogen => self.nitrogen,
            NutrientKind::Phosphorus => self.phosphorus,
            NutrientKind::Potassium => self.potassium,
            NutrientKind::Carbon => self.carbon,
            NutrientKind::Oxygen => self.oxygen,
        }
    }

    pub fn get_mut(&mut self, kind: NutrientKind) -> &mut f64 {
        match kind {
            NutrientKind::Nitrogen => &mut self.nitrogen,
            NutrientKind::Phosphorus => &mut self.phosphorus,
            NutrientKind::Potassium => &mut self.potassium,
            NutrientKind::Carbon => &mut self.carbon,
            NutrientKind::Oxygen => &mut self.oxygen,
        }
    }

    pub fn set(&mut self, kind: NutrientKind, value: f64) {
        *self.get_mut(kind) = value;
    }

    /// Non-zero entries in [`NutrientKind::all`] order
    pub fn non_zero(&self) -> impl Iterator<Item = (NutrientKind, f64)> + '_ {
        NutrientKind::all()
            .into_iter()
            .map(move |kind| (kind, self.get(kind)))
            .filter(|(_, value)| *value != 0.0)
    }

    /// Element-wise sum
    pub fn accumulate(&mut self, other: &Nutrients) {
        for kind in NutrientKind::all() {
            *self.get_mut(kind) += other.get(kind);
        }
    }
}

/// Broad organism grouping; each category has its own live-set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Bacteria,
    Plant,
}

/// Organism species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OrganismKind {
    NitrogenBacteria,
    PhosphorusBacteria,
    PotassiumBacteria,
    OxygenBacteria,
    GrassPlant,
    TreePlant,
}

impl OrganismKind {
    pub fn all() -> [OrganismKind; 6] {
        [
            OrganismKind::NitrogenBacteria,
            OrganismKind::PhosphorusBacteria,
            OrganismKind::PotassiumBacteria,
            OrganismKind::OxygenBacteria,
            OrganismKind::GrassPlant,
            OrganismKind::TreePlant,
        ]
    }

    pub fn bacteria() -> [OrganismKind; 4] {
        [
            OrganismKind::NitrogenBacteria,
            OrganismKind::PhosphorusBacteria,
            OrganismKind::PotassiumBacteria,
            OrganismKind::OxygenBacteria,
        ]
    }

    pub fn category(&self) -> Category {
        match self {
            OrganismKind::GrassPlant | OrganismKind::TreePlant => Category::Plant,
            _ => Category::Bacteria,
        }
    }

    pub fn is_bacteria(&self) -> bool {
        self.category() == Category::Bacteria
    }

    /// Nutrient a bacterium releases into its cell when it dies
    pub fn produced_nutrient(&self) -> Option<NutrientKind> {
        match self {
            OrganismKind::NitrogenBacteria => Some(NutrientKind::Nitrogen),
            OrganismKind::PhosphorusBacteria => Some(NutrientKind::Phosphorus),
            OrganismKind::PotassiumBacteria => Some(NutrientKind::Potassium),
            OrganismKind::OxygenBacteria => Some(NutrientKind::Oxygen),
            OrganismKind::GrassPlant | OrganismKind::TreePlant => None,
        }
    }
}

impl fmt::Display for OrganismKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
