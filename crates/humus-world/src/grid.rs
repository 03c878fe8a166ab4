//! 2D grid of soil cells.

use crate::organism::OrganismId;
use humus_core::{Error, NutrientKind, Nutrients, OrganismKind, Position, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One grid location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub nutrients: Nutrients,
    /// Grass that has died here
    pub plant_matter: u64,
    /// Trees that have died here
    pub tree_matter: u64,
    occupants: BTreeMap<OrganismKind, BTreeSet<OrganismId>>,
}

impl Cell {
    pub fn new(nutrients: Nutrients) -> Self {
        Self {
            nutrients,
            plant_matter: 0,
            tree_matter: 0,
            occupants: BTreeMap::new(),
        }
    }

    pub fn nutrient(&self, kind: NutrientKind) -> f64 {
        self.nutrients.get(kind)
    }

    /// Live organisms of `kind` in this cell
    pub fn population(&self, kind: OrganismKind) -> usize {
        self.occupants.get(&kind).map_or(0, BTreeSet::len)
    }

    pub fn contains(&self, kind: OrganismKind, id: OrganismId) -> bool {
        self.occupants
            .get(&kind)
            .is_some_and(|ids| ids.contains(&id))
    }

    /// Occupant counts per kind, omitting kinds with nobody present
    pub fn occupant_counts(&self) -> BTreeMap<OrganismKind, usize> {
        self.occupants
            .iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(kind, ids)| (*kind, ids.len()))
            .collect()
    }

    pub(crate) fn occupants(&self) -> impl Iterator<Item = (OrganismKind, OrganismId)> + '_ {
        self.occupants
            .iter()
            .flat_map(|(kind, ids)| ids.iter().map(move |id| (*kind, *id)))
    }
}

/// Grid-wide nutrient and biomass sums
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoilTotals {
    pub nutrients: Nutrients,
    pub plant_matter: u64,
    pub tree_matter: u64,
}

/// A fixed-size rectangular grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    clamp_at_zero: bool,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(width: i32, height: i32, initial_soil: Nutrients, clamp_at_zero: bool) -> Self {
        let size = (width.max(0) as usize) * (height.max(0) as usize);
        Self {
            width,
            height,
            clamp_at_zero,
            cells: vec![Cell::new(initial_soil); size],
        }
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.in_bounds(self.width, self.height)
    }

    /// Get the cell at a position
    pub fn cell_at(&self, pos: Position) -> Result<&Cell> {
        let index = self.index_of(pos)?;
        Ok(&self.cells[index])
    }

    /// Get the mutable cell at a position
    pub fn cell_at_mut(&mut self, pos: Position) -> Result<&mut Cell> {
        let index = self.index_of(pos)?;
        Ok(&mut self.cells[index])
    }

    /// Apply a signed delta to one nutrient, returning the new level
    pub fn adjust_nutrient(&mut self, pos: Position, kind: NutrientKind, delta: f64) -> Result<f64> {
        let clamp = self.clamp_at_zero;
        let level = self.cell_at_mut(pos)?.nutrients.get_mut(kind);
        *level += delta;
        if clamp && *level < 0.0 {
            *level = 0.0;
        }
        Ok(*level)
    }

    pub fn add_plant_matter(&mut self, pos: Position) -> Result<()> {
        self.cell_at_mut(pos)?.plant_matter += 1;
        Ok(())
    }

    pub fn add_tree_matter(&mut self, pos: Position) -> Result<()> {
        self.cell_at_mut(pos)?.tree_matter += 1;
        Ok(())
    }

    /// Live organisms of `kind` at a position
    pub fn population(&self, pos: Position, kind: OrganismKind) -> Result<usize> {
        Ok(self.cell_at(pos)?.population(kind))
    }

    pub(crate) fn register(&mut self, pos: Position, kind: OrganismKind, id: OrganismId) -> Result<()> {
        self.cell_at_mut(pos)?
            .occupants
            .entry(kind)
            .or_default()
            .insert(id);
        Ok(())
    }

    pub(crate) fn unregister(&mut self, pos: Position, kind: OrganismKind, id: OrganismId) -> Result<()> {
        let removed = self
            .cell_at_mut(pos)?
            .occupants
            .get_mut(&kind)
            .is_some_and(|ids| ids.remove(&id));
        if !removed {
            return Err(Error::InvariantViolation(format!(
                "{kind} {id:?} is not registered at {pos}"
            )));
        }
        Ok(())
    }

    /// Sum nutrients and biomass over every cell
    pub fn totals(&self) -> SoilTotals {
        let mut totals = SoilTotals::default();
        for cell in &self.cells {
            totals.nutrients.accumulate(&cell.nutrients);
            totals.plant_matter += cell.plant_matter;
            totals.tree_matter += cell.tree_matter;
        }
        totals
    }

    fn index_of(&self, pos: Position) -> Result<usize> {
        if !self.contains(pos) {
            return Err(Error::OutOfBounds {
                x: pos.x,
                y: pos.y,
                width: self.width,
                height: self.height,
            });
        }
        Ok((pos.y * self.width + pos.x) as usize)
    }

    /// Get position from index
    pub fn index_to_pos(&self, index: usize) -> Position {
        let x = (index as i32) % self.width;
        let y = (index as i32) / self.width;
        Position::new(x, y)
    }

    /// Iterator over all positions
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.cells.len()).map(move |i| self.index_to_pos(i))
    }

    /// Iterator over all cells with positions
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (self.index_to_pos(i), cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn soil(level: f64) -> Nutrients {
        Nutrients {
            nitrogen: level,
            phosphorus: level,
            potassium: level,
            carbon: level,
            oxygen: level,
        }
    }

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(10, 5, soil(3.0), true);
        assert_eq!(grid.width, 10);
        assert_eq!(grid.height, 5);
        assert_eq!(grid.cells.len(), 50);
        assert_eq!(grid.positions().count(), 50);

        let cell = grid.cell_at(Position::new(9, 4)).unwrap();
        assert_eq!(cell.nutrient(NutrientKind::Carbon), 3.0);
        assert_eq!(cell.plant_matter, 0);
    }

    #[test]
    fn test_out_of_range_access() {
        let grid = Grid::new(10, 10, soil(0.0), true);
        assert!(matches!(
            grid.cell_at(Position::new(-1, 0)),
            Err(Error::OutOfBounds { x: -1, y: 0, .. })
        ));
        assert!(grid.cell_at(Position::new(10, 0)).is_err());
        assert!(grid.cell_at(Position::new(0, 10)).is_err());
    }

    #[test]
    fn test_index_layout_is_row_major() {
        let grid = Grid::new(4, 3, soil(0.0), true);
        assert_eq!(grid.index_to_pos(0), Position::new(0, 0));
        assert_eq!(grid.index_to_pos(5), Position::new(1, 1));
        assert_eq!(grid.index_of(Position::new(3, 2)).unwrap(), 11);
    }

    #[test]
    fn test_adjust_nutrient_clamps() {
        let mut grid = Grid::new(4, 4, soil(1.0), true);
        let pos = Position::new(2, 2);

        assert_eq!(grid.adjust_nutrient(pos, NutrientKind::Nitrogen, 0.5).unwrap(), 1.5);
        assert_eq!(grid.adjust_nutrient(pos, NutrientKind::Nitrogen, -4.0).unwrap(), 0.0);
        assert_eq!(grid.cell_at(pos).unwrap().nutrient(NutrientKind::Phosphorus), 1.0);
    }

    #[test]
    fn test_adjust_nutrient_unbounded() {
        let mut grid = Grid::new(4, 4, soil(1.0), false);
        let level = grid
            .adjust_nutrient(Position::new(0, 0), NutrientKind::Oxygen, -3.0)
            .unwrap();
        assert_eq!(level, -2.0);
    }

    #[test]
    fn test_occupant_bookkeeping() {
        let mut ids: SlotMap<OrganismId, ()> = SlotMap::with_key();
        let a = ids.insert(());
        let b = ids.insert(());

        let mut grid = Grid::new(4, 4, soil(0.0), true);
        let pos = Position::new(1, 3);
        grid.register(pos, OrganismKind::GrassPlant, a).unwrap();
        grid.register(pos, OrganismKind::GrassPlant, b).unwrap();
        grid.register(pos, OrganismKind::OxygenBacteria, b).unwrap();

        assert_eq!(grid.population(pos, OrganismKind::GrassPlant).unwrap(), 2);
        assert_eq!(grid.population(pos, OrganismKind::TreePlant).unwrap(), 0);

        grid.unregister(pos, OrganismKind::GrassPlant, a).unwrap();
        assert_eq!(grid.population(pos, OrganismKind::GrassPlant).unwrap(), 1);

        let counts = grid.cell_at(pos).unwrap().occupant_counts();
        assert_eq!(counts.get(&OrganismKind::GrassPlant), Some(&1));
        assert_eq!(counts.get(&OrganismKind::OxygenBacteria), Some(&1));
    }

    #[test]
    fn test_unregister_missing_is_invariant_violation() {
        let mut ids: SlotMap<OrganismId, ()> = SlotMap::with_key();
        let a = ids.insert(());

        let mut grid = Grid::new(4, 4, soil(0.0), true);
        let result = grid.unregister(Position::new(0, 0), OrganismKind::TreePlant, a);
        assert!(matches!(result, Err(Error::InvariantViolation(_))));
    }

    #[test]
    fn test_totals() {
        let mut grid = Grid::new(2, 2, soil(1.0), true);
        grid.add_plant_matter(Position::new(0, 1)).unwrap();
        grid.add_tree_matter(Position::new(1, 1)).unwrap();
        grid.add_tree_matter(Position::new(1, 1)).unwrap();

        let totals = grid.totals();
        assert_eq!(totals.nutrients.nitrogen, 4.0);
        assert_eq!(totals.plant_matter, 1);
        assert_eq!(totals.tree_matter, 2);
    }
}
