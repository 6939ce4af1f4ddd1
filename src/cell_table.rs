use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::cell_type::CellType;

/// Size of the simulated PBMC table generated once per session.
pub const CELL_COUNT: usize = 2_500;

/// Coordinates are drawn uniformly from this symmetric range.
pub const COORD_RANGE: f32 = 10.0;

/// One simulated cell: a synthetic UMAP position plus a uniformly drawn
/// cell-type label. The display color is derived from the label and is not
/// stored.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SimulatedCell {
    pub id: usize,
    pub coord1: f32,
    pub coord2: f32,
    pub cell_type: CellType,
}

impl SimulatedCell {
    pub fn display_color(&self) -> &'static str {
        self.cell_type.color_hex()
    }
}

/// The session's immutable collection of simulated cells. Only the derived
/// expression overlay changes after generation.
#[derive(Debug, Clone, Default)]
pub struct CellTable {
    cells: Vec<SimulatedCell>,
}

impl CellTable {
    /// Fresh table with per-session randomness; coordinate positions are
    /// not stable across runs.
    pub fn generate(count: usize) -> Self {
        Self::generate_with(count, &mut rand::thread_rng())
    }

    /// Reproducible table for tests and deterministic exports.
    pub fn generate_seeded(count: usize, seed: u64) -> Self {
        Self::generate_with(count, &mut StdRng::seed_from_u64(seed))
    }

    fn generate_with<R: Rng>(count: usize, rng: &mut R) -> Self {
        let cells = (0..count)
            .map(|id| SimulatedCell {
                id,
                coord1: rng.gen_range(-COORD_RANGE..=COORD_RANGE),
                coord2: rng.gen_range(-COORD_RANGE..=COORD_RANGE),
                cell_type: CellType::ALL[rng.gen_range(0..CellType::ALL.len())],
            })
            .collect();
        Self { cells }
    }

    pub fn cells(&self) -> &[SimulatedCell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_count_and_ranges() {
        let table = CellTable::generate(CELL_COUNT);
        assert_eq!(table.len(), 2_500);
        for cell in table.cells() {
            assert!((-COORD_RANGE..=COORD_RANGE).contains(&cell.coord1));
            assert!((-COORD_RANGE..=COORD_RANGE).contains(&cell.coord2));
            assert!(CellType::ALL.contains(&cell.cell_type));
        }
    }

    #[test]
    fn test_ids_are_sequential() {
        let table = CellTable::generate_seeded(10, 7);
        let ids: Vec<usize> = table.cells().iter().map(|c| c.id).collect();
        assert_eq!(ids, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = CellTable::generate_seeded(100, 42);
        let b = CellTable::generate_seeded(100, 42);
        for (ca, cb) in a.cells().iter().zip(b.cells()) {
            assert_eq!(ca.coord1, cb.coord1);
            assert_eq!(ca.coord2, cb.coord2);
            assert_eq!(ca.cell_type, cb.cell_type);
        }
    }

    #[test]
    fn test_display_color_follows_cell_type() {
        let table = CellTable::generate_seeded(50, 1);
        for cell in table.cells() {
            assert_eq!(cell.display_color(), cell.cell_type.color_hex());
        }
    }
}
