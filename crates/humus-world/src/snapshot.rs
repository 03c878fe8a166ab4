//! Read-only end-of-tick view of the world.

use crate::grid::SoilTotals;
use crate::organism::OrganismId;
use crate::world::World;
use humus_core::{Category, Nutrients, OrganismKind, Position};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub position: Position,
    pub nutrients: Nutrients,
    pub plant_matter: u64,
    pub tree_matter: u64,
    pub occupants: BTreeMap<OrganismKind, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganismSnapshot {
    pub id: OrganismId,
    pub kind: OrganismKind,
    pub position: Position,
    pub age: u64,
}

/// Copy of the world state handed to observers after each tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub width: i32,
    pub height: i32,
    /// Row-major, one entry per cell
    pub cells: Vec<CellSnapshot>,
    pub bacteria: Vec<OrganismSnapshot>,
    pub plants: Vec<OrganismSnapshot>,
    pub totals: SoilTotals,
}

impl WorldSnapshot {
    pub fn cell(&self, position: Position) -> Option<&CellSnapshot> {
        if !position.in_bounds(self.width, self.height) {
            return None;
        }
        self.cells.get((position.y * self.width + position.x) as usize)
    }

    pub fn count_of(&self, kind: OrganismKind) -> usize {
        let organisms = match kind.category() {
            Category::Bacteria => &self.bacteria,
            Category::Plant => &self.plants,
        };
        organisms.iter().filter(|organism| organism.kind == kind).count()
    }

    /// Live organism counts per kind
    pub fn population(&self) -> BTreeMap<OrganismKind, usize> {
        let mut counts = BTreeMap::new();
        for organism in self.bacteria.iter().chain(&self.plants) {
            *counts.entry(organism.kind).or_insert(0) += 1;
        }
        counts
    }
}

impl World {
    pub fn snapshot(&self) -> WorldSnapshot {
        let cells = self
            .grid
            .iter()
            .map(|(position, cell)| CellSnapshot {
                position,
                nutrients: cell.nutrients,
                plant_matter: cell.plant_matter,
                tree_matter: cell.tree_matter,
                occupants: cell.occupant_counts(),
            })
            .collect();

        let organisms = |category: Category| {
            self.organisms_in(category)
                .map(|(id, organism)| OrganismSnapshot {
                    id,
                    kind: organism.kind,
                    position: organism.position,
                    age: organism.age,
                })
                .collect::<Vec<_>>()
        };

        WorldSnapshot {
            tick: self.clock,
            width: self.grid.width,
            height: self.grid.height,
            cells,
            bacteria: organisms(Category::Bacteria),
            plants: organisms(Category::Plant),
            totals: self.grid.totals(),
        }
    }
}
