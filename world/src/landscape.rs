//! Immutable land-cover map for a single run.

use clr_landscape_core::CellCoord;

/// Square grid classifying every cell as coffee or non-coffee.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Landscape {
    size: u32,
    coffee: Vec<bool>,
}

impl Landscape {
    /// Creates a landscape from row-major coffee flags.
    ///
    /// Returns `None` when the flag count does not match `size * size`.
    #[must_use]
    pub fn from_cells(size: u32, coffee: Vec<bool>) -> Option<Self> {
        let edge = usize::try_from(size).ok()?;
        if coffee.len() != edge.checked_mul(edge)? {
            return None;
        }
        Some(Self { size, coffee })
    }

    /// Landscape in which every cell carries coffee.
    #[must_use]
    pub fn all_coffee(size: u32) -> Self {
        let edge = size as usize;
        Self {
            size,
            coffee: vec![true; edge * edge],
        }
    }

    /// Edge length of the grid.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Number of cells in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.coffee.len()
    }

    /// Reports whether the provided cell carries coffee. Out-of-bounds cells do not.
    #[must_use]
    pub fn is_coffee(&self, cell: CellCoord) -> bool {
        cell.index(self.size)
            .and_then(|index| self.coffee.get(index).copied())
            .unwrap_or(false)
    }

    /// Iterates coffee cells in row-major order.
    pub fn coffee_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let size = self.size;
        self.coffee
            .iter()
            .enumerate()
            .filter(|(_, coffee)| **coffee)
            .filter_map(move |(index, _)| CellCoord::from_index(index, size))
    }

    /// Number of coffee cells.
    #[must_use]
    pub fn coffee_count(&self) -> usize {
        self.coffee.iter().filter(|coffee| **coffee).count()
    }

    /// Row-major coffee flags.
    #[must_use]
    pub fn cells(&self) -> &[bool] {
        &self.coffee
    }
}
