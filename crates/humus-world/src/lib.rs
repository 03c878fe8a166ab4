//! Soil ecology simulation engine.
//!
//! This crate implements the bounded 2D grid where bacteria and plants
//! consume and release nutrients, reproduce, disperse and die.

pub mod dispersal;
pub mod grid;
pub mod lifecycle;
pub mod organism;
pub mod population;
pub mod seeding;
pub mod simulation;
pub mod snapshot;
pub mod world;

pub use grid::{Cell, Grid, SoilTotals};
pub use lifecycle::StepOutcome;
pub use organism::{Organism, OrganismId};
pub use population::LiveSet;
pub use seeding::SeedingSchedule;
pub use simulation::{RunUntil, Simulation, SimulationResult, TickSummary};
pub use snapshot::{CellSnapshot, OrganismSnapshot, WorldSnapshot};
pub use world::World;
