//! Plant arena with a cell index for neighbourhood queries.

use std::ops::Range;

use clr_landscape_core::{CellCoord, PlantId, PlantParameters};

use crate::{landscape::Landscape, plant::Plant};

/// Every plant of a run, stored contiguously per cell in row-major cell order.
///
/// Because plants of a cell are allocated back to back, the index from cell to
/// residents is a single range per cell and never needs rebuilding: plants are
/// neither added nor removed during a run.
#[derive(Clone, Debug)]
pub struct PlantPopulation {
    size: u32,
    plants: Vec<Plant>,
    cell_ranges: Vec<Range<usize>>,
}

impl PlantPopulation {
    /// Places `plants_per_cell` healthy plants in every coffee cell.
    #[must_use]
    pub fn build(landscape: &Landscape, parameters: &PlantParameters) -> Self {
        let per_cell = parameters.plants_per_cell as usize;
        let mut plants = Vec::with_capacity(landscape.coffee_count() * per_cell);
        let mut cell_ranges = Vec::with_capacity(landscape.cell_count());

        for (index, coffee) in landscape.cells().iter().enumerate() {
            let start = plants.len();
            if *coffee {
                if let Some(cell) = CellCoord::from_index(index, landscape.size()) {
                    plants.extend(
                        (0..parameters.plants_per_cell)
                            .map(|local| Plant::new(cell, local, parameters)),
                    );
                }
            }
            cell_ranges.push(start..plants.len());
        }

        Self {
            size: landscape.size(),
            plants,
            cell_ranges,
        }
    }

    /// Number of plants in the population.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plants.len()
    }

    /// Whether the population holds no plants.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }

    /// Returns the plant with the provided identifier.
    #[must_use]
    pub fn get(&self, plant: PlantId) -> Option<&Plant> {
        self.plants.get(plant.index())
    }

    pub(crate) fn get_mut(&mut self, plant: PlantId) -> Option<&mut Plant> {
        self.plants.get_mut(plant.index())
    }

    /// Iterates all plants with their identifiers in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (PlantId, &Plant)> {
        self.plants
            .iter()
            .enumerate()
            .filter_map(|(index, plant)| Some((plant_id(index)?, plant)))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Plant> {
        self.plants.iter_mut()
    }

    /// Identifiers of the plants resident in `cell`, in local index order.
    pub fn ids_in(&self, cell: CellCoord) -> impl Iterator<Item = PlantId> {
        self.range_of(cell).filter_map(plant_id)
    }

    /// Plants resident in `cell`, in local index order.
    #[must_use]
    pub fn plants_in(&self, cell: CellCoord) -> &[Plant] {
        self.plants.get(self.range_of(cell)).unwrap_or(&[])
    }

    /// Identifiers of the plants resident in the 8 cells surrounding `cell`.
    pub fn ids_around(&self, cell: CellCoord) -> impl Iterator<Item = PlantId> + '_ {
        cell.neighbors(self.size)
            .flat_map(move |neighbor| self.ids_in(neighbor))
    }

    /// Number of plants resident in the 8 cells surrounding `cell`.
    #[must_use]
    pub fn count_around(&self, cell: CellCoord) -> usize {
        cell.neighbors(self.size)
            .map(|neighbor| self.range_of(neighbor).len())
            .sum()
    }

    fn range_of(&self, cell: CellCoord) -> Range<usize> {
        cell.index(self.size)
            .and_then(|index| self.cell_ranges.get(index).cloned())
            .unwrap_or(0..0)
    }
}

fn plant_id(index: usize) -> Option<PlantId> {
    u32::try_from(index).ok().map(PlantId::new)
}
