//! Weighted random grid generation

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::GridSpec;
use crate::symbols::SymbolCatalog;

/// A spin's symbol grid, column-major (reel → rows)
///
/// Produced fresh each spin and owned by that spin until evaluation
/// completes. Cells hold catalog codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    cells: Vec<Vec<u32>>,
}

impl Grid {
    /// Build a grid from raw columns
    pub fn from_cells(cells: Vec<Vec<u32>>) -> Self {
        Self { cells }
    }

    /// Number of reels
    pub fn reels(&self) -> usize {
        self.cells.len()
    }

    /// Number of rows (0 for an empty grid)
    pub fn rows(&self) -> usize {
        self.cells.first().map(Vec::len).unwrap_or(0)
    }

    /// Symbol code at (reel, row), if in bounds
    pub fn symbol_at(&self, reel: usize, row: usize) -> Option<u32> {
        self.cells.get(reel).and_then(|r| r.get(row)).copied()
    }

    /// Reel columns, left to right
    pub fn columns(&self) -> &[Vec<u32>] {
        &self.cells
    }

    /// Iterate all cell codes
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.cells.iter().flatten().copied()
    }
}

/// Per-cell weighted symbol sampler
///
/// The cumulative weight table is precomputed once at load from the
/// catalog; each cell draw is an independent weighted selection with no
/// spatial correlation. Given the same RNG state the generator is pure.
#[derive(Debug, Clone)]
pub struct ReelGenerator {
    cumulative: Vec<f64>,
    total: f64,
}

impl ReelGenerator {
    /// Build a generator from a validated catalog
    pub fn new(catalog: &SymbolCatalog) -> Self {
        let mut cumulative = Vec::with_capacity(catalog.len());
        let mut total = 0.0;
        for symbol in catalog.symbols() {
            total += symbol.weight;
            cumulative.push(total);
        }
        Self { cumulative, total }
    }

    /// Draw one symbol code
    fn draw(&self, rng: &mut impl Rng) -> u32 {
        let x = rng.random_range(0.0..self.total);
        self.cumulative.partition_point(|&c| c <= x) as u32
    }

    /// Generate a fresh randomized grid
    pub fn generate(&self, grid: GridSpec, rng: &mut impl Rng) -> Grid {
        let reels = grid.reels as usize;
        let rows = grid.rows as usize;
        let mut cells = Vec::with_capacity(reels);
        for _ in 0..reels {
            let mut column = Vec::with_capacity(rows);
            for _ in 0..rows {
                column.push(self.draw(rng));
            }
            cells.push(column);
        }
        Grid::from_cells(cells)
    }
}
