//! Paylines and win evaluation

use serde::{Deserialize, Serialize};

use crate::reels::Grid;
use crate::symbols::SymbolCatalog;

/// A payline definition
///
/// One row per reel, left to right; cell `i` of the line is grid position
/// `(i, rows[i])`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payline {
    /// Payline index (0-based)
    pub index: u8,
    /// Row positions for each reel (e.g. [0, 1, 2, 1, 0] for a "V")
    pub rows: Vec<u8>,
}

impl Payline {
    /// Create a straight line (same row across all reels)
    pub fn straight(index: u8, row: u8, reel_count: u8) -> Self {
        Self {
            index,
            rows: vec![row; reel_count as usize],
        }
    }

    /// Cell coordinates as (reel, row) pairs, left to right
    pub fn cells(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .map(|(reel, &row)| (reel as u8, row))
    }
}

/// Reference payline patterns for the 5×4 Neon Shinobi grid (25 lines)
pub fn standard_25_paylines() -> Vec<Payline> {
    let patterns: [[u8; 5]; 25] = [
        // Straight lines
        [1, 1, 1, 1, 1],
        [2, 2, 2, 2, 2],
        [0, 0, 0, 0, 0],
        [3, 3, 3, 3, 3],
        // V shapes
        [0, 1, 2, 1, 0],
        [3, 2, 1, 2, 3],
        [1, 0, 0, 0, 1],
        [2, 3, 3, 3, 2],
        // Steps
        [0, 0, 1, 2, 2],
        [3, 3, 2, 1, 1],
        [1, 2, 3, 2, 1],
        [2, 1, 0, 1, 2],
        // Zigzag
        [0, 1, 0, 1, 0],
        [3, 2, 3, 2, 3],
        [1, 1, 2, 1, 1],
        [2, 2, 1, 2, 2],
        // Wide zigzag
        [0, 2, 0, 2, 0],
        [3, 1, 3, 1, 3],
        [1, 3, 1, 3, 1],
        [2, 0, 2, 0, 2],
        [0, 3, 0, 3, 0],
        [3, 0, 3, 0, 3],
        // Complex
        [1, 0, 1, 0, 1],
        [2, 3, 2, 3, 2],
        [0, 1, 1, 1, 0],
    ];
    patterns
        .iter()
        .enumerate()
        .map(|(i, rows)| Payline {
            index: i as u8,
            rows: rows.to_vec(),
        })
        .collect()
}

/// A win on a single payline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineWin {
    /// Payline index
    pub line_index: u8,
    /// Winning symbol id
    pub symbol: String,
    /// Run length (3..=reels)
    pub run_length: u8,
    /// Payout in credits (value × length multiplier × bet)
    pub payout: u64,
    /// Positions of the run's cells (reel, row)
    pub positions: Vec<(u8, u8)>,
    /// Wild positions within the run
    pub wild_positions: Vec<(u8, u8)>,
}

/// Result of evaluating one grid
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Evaluation {
    /// Qualifying line wins
    pub line_wins: Vec<LineWin>,
    /// Sum of all line payouts
    pub total_payout: u64,
    /// Scatter symbols anywhere on the grid
    pub scatter_count: u8,
}

impl Evaluation {
    pub fn is_win(&self) -> bool {
        self.total_payout > 0
    }
}

/// Payline evaluator
///
/// Owns the catalog and the payline table; shared read-only across spins.
/// `evaluate` is a pure function of (grid, bet, paylines, catalog) — it
/// never consults session state, so every outcome is reproducible from the
/// grid alone.
#[derive(Debug, Clone)]
pub struct PayTable {
    catalog: SymbolCatalog,
    paylines: Vec<Payline>,
    /// Payout multipliers for run lengths 3, 4, 5
    length_multipliers: [u64; 3],
    wild_code: Option<u32>,
}

impl PayTable {
    /// Create a paytable with the reference length multipliers (1×/3×/10×)
    pub fn new(catalog: SymbolCatalog, paylines: Vec<Payline>) -> Self {
        let wild_code = catalog.wild_code();
        Self {
            catalog,
            paylines,
            length_multipliers: [1, 3, 10],
            wild_code,
        }
    }

    /// The Neon Shinobi reference paytable: 12 symbols, 25 lines
    pub fn neon_shinobi() -> Self {
        Self::new(SymbolCatalog::neon_shinobi(), standard_25_paylines())
    }

    /// Override the run-length multiplier table
    pub fn with_length_multipliers(mut self, multipliers: [u64; 3]) -> Self {
        self.length_multipliers = multipliers;
        self
    }

    pub fn catalog(&self) -> &SymbolCatalog {
        &self.catalog
    }

    pub fn paylines(&self) -> &[Payline] {
        &self.paylines
    }

    /// Multiplier for a qualifying run length (0 below the 3 minimum)
    pub fn length_multiplier(&self, run_length: u8) -> u64 {
        if run_length < 3 {
            return 0;
        }
        let idx = ((run_length - 3) as usize).min(self.length_multipliers.len() - 1);
        self.length_multipliers[idx]
    }

    /// Evaluate a grid against all paylines plus scatter counting
    pub fn evaluate(&self, grid: &Grid, bet: u32) -> Evaluation {
        let mut line_wins = Vec::new();
        for payline in &self.paylines {
            if let Some(win) = self.evaluate_line(grid, payline, bet) {
                line_wins.push(win);
            }
        }

        let total_payout = line_wins.iter().map(|w| w.payout).sum();
        let scatter_count = self.count_scatters(grid);

        Evaluation {
            line_wins,
            total_payout,
            scatter_count,
        }
    }

    fn evaluate_line(&self, grid: &Grid, payline: &Payline, bet: u32) -> Option<LineWin> {
        if payline.rows.len() != grid.reels() {
            return None;
        }

        // Walk left to right. The run symbol is fixed by the first non-wild
        // cell; wilds extend any run; scatters stop extension and never
        // substitute. A run that never meets a non-wild cell pays as wilds.
        let mut run_code: Option<u32> = None;
        let mut positions = Vec::new();
        let mut wild_positions = Vec::new();

        for (reel, row) in payline.cells() {
            let code = grid.symbol_at(reel as usize, row as usize)?;
            let symbol = self.catalog.by_code(code)?;

            if symbol.is_scatter() {
                break;
            }
            if symbol.is_wild() {
                wild_positions.push((reel, row));
                positions.push((reel, row));
                continue;
            }
            match run_code {
                None => {
                    run_code = Some(code);
                    positions.push((reel, row));
                }
                Some(established) if established == code => {
                    positions.push((reel, row));
                }
                Some(_) => break,
            }
        }

        let run_length = positions.len() as u8;
        if run_length < 3 {
            return None;
        }

        let code = run_code.or(self.wild_code)?;
        let symbol = self.catalog.by_code(code)?;
        let payout = symbol.payout * self.length_multiplier(run_length) * bet as u64;
        if payout == 0 {
            return None;
        }

        Some(LineWin {
            line_index: payline.index,
            symbol: symbol.id.clone(),
            run_length,
            payout,
            positions,
            wild_positions,
        })
    }

    /// Count scatter symbols anywhere on the grid
    ///
    /// Saturates at `u8::MAX`; the trigger threshold only cares about the
    /// low end, so large configured grids must not wrap the count.
    fn count_scatters(&self, grid: &Grid) -> u8 {
        let Some(scatter) = self.catalog.scatter_code() else {
            return 0;
        };
        let count = grid.iter().filter(|&code| code == scatter).count();
        count.min(u8::MAX as usize) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paytable() -> PayTable {
        PayTable::neon_shinobi()
    }

    /// Grid builder: fill with a non-matching checkerboard of card symbols,
    /// then place `overrides` as (reel, row, id).
    fn grid_with(pt: &PayTable, overrides: &[(usize, usize, &str)]) -> Grid {
        let filler = ["a", "k", "q", "j"];
        let mut cells = vec![vec![0u32; 4]; 5];
        for (reel, column) in cells.iter_mut().enumerate() {
            for (row, cell) in column.iter_mut().enumerate() {
                // offset per reel so no line ever runs 3 of a kind
                let id = filler[(reel + row * 2 + reel / 2) % filler.len()];
                *cell = pt.catalog().code_of(id).unwrap();
            }
        }
        for &(reel, row, id) in overrides {
            cells[reel][row] = pt.catalog().code_of(id).unwrap();
        }
        Grid::from_cells(cells)
    }

    /// Losing grid: every reel a uniform column of a different symbol.
    fn losing_grid(pt: &PayTable) -> Grid {
        let ids = ["a", "k", "q", "j", "10"];
        let cells = ids
            .iter()
            .map(|id| vec![pt.catalog().code_of(id).unwrap(); 4])
            .collect();
        Grid::from_cells(cells)
    }

    #[test]
    fn test_losing_grid_pays_nothing() {
        let pt = paytable();
        let eval = pt.evaluate(&losing_grid(&pt), 10);
        assert_eq!(eval.total_payout, 0);
        assert!(eval.line_wins.is_empty());
    }

    #[test]
    fn test_run_of_two_pays_nothing() {
        let pt = paytable();
        // katana on line 0 (middle row 1), reels 0-1 only
        let grid = grid_with(&pt, &[(0, 1, "katana"), (1, 1, "katana")]);
        let eval = pt.evaluate(&grid, 10);
        assert!(!eval.line_wins.iter().any(|w| w.symbol == "katana"));
    }

    #[test]
    fn test_run_of_three_pays_value_times_bet() {
        let pt = paytable();
        let grid = grid_with(&pt, &[(0, 1, "chip"), (1, 1, "chip"), (2, 1, "chip")]);
        let eval = pt.evaluate(&grid, 10);
        let win = eval
            .line_wins
            .iter()
            .find(|w| w.symbol == "chip")
            .expect("chip run should pay");
        assert_eq!(win.run_length, 3);
        assert_eq!(win.line_index, 0);
        assert_eq!(win.payout, 500 * 1 * 10);
    }

    #[test]
    fn test_katana_four_run_reference_scenario() {
        // 4-symbol ENERGY_KATANA run at bet 10: 750 × 3 × 10 = 22500
        let pt = paytable();
        let grid = grid_with(
            &pt,
            &[(0, 1, "katana"), (1, 1, "katana"), (2, 1, "katana"), (3, 1, "katana")],
        );
        let eval = pt.evaluate(&grid, 10);
        let win = eval.line_wins.iter().find(|w| w.symbol == "katana").unwrap();
        assert_eq!(win.payout, 22_500);
    }

    #[test]
    fn test_five_wilds_pay_wild_value_at_10x() {
        let pt = paytable();
        let grid = grid_with(
            &pt,
            &[(0, 1, "wild"), (1, 1, "wild"), (2, 1, "wild"), (3, 1, "wild"), (4, 1, "wild")],
        );
        let eval = pt.evaluate(&grid, 10);
        let win = eval.line_wins.iter().find(|w| w.line_index == 0).unwrap();
        assert_eq!(win.symbol, "wild");
        assert_eq!(win.run_length, 5);
        assert_eq!(win.payout, 1000 * 10 * 10);
        assert_eq!(win.wild_positions.len(), 5);
    }

    #[test]
    fn test_wild_substitutes_in_a_run() {
        let pt = paytable();
        // drone, wild, drone on line 0: run of 3 drones
        let grid = grid_with(&pt, &[(0, 1, "drone"), (1, 1, "wild"), (2, 1, "drone")]);
        let eval = pt.evaluate(&grid, 10);
        let win = eval.line_wins.iter().find(|w| w.symbol == "drone").unwrap();
        assert_eq!(win.run_length, 3);
        assert_eq!(win.wild_positions, vec![(1, 1)]);
    }

    #[test]
    fn test_leading_wilds_take_first_non_wild_symbol() {
        let pt = paytable();
        // wild, wild, mask: run symbol is mask, length 3
        let grid = grid_with(&pt, &[(0, 1, "wild"), (1, 1, "wild"), (2, 1, "mask")]);
        let eval = pt.evaluate(&grid, 10);
        let win = eval.line_wins.iter().find(|w| w.line_index == 0).unwrap();
        assert_eq!(win.symbol, "mask");
        assert_eq!(win.payout, 300 * 1 * 10);
    }

    #[test]
    fn test_scatter_stops_a_run() {
        let pt = paytable();
        // pad, pad, hack, pad, pad: scatter breaks the run at length 2
        let grid = grid_with(
            &pt,
            &[(0, 1, "pad"), (1, 1, "pad"), (2, 1, "hack"), (3, 1, "pad"), (4, 1, "pad")],
        );
        let eval = pt.evaluate(&grid, 10);
        assert!(!eval.line_wins.iter().any(|w| w.symbol == "pad"));
        assert_eq!(eval.scatter_count, 1);
    }

    #[test]
    fn test_runs_must_start_at_first_reel() {
        let pt = paytable();
        // chip run on reels 1-3 only: does not qualify
        let grid = grid_with(&pt, &[(1, 1, "chip"), (2, 1, "chip"), (3, 1, "chip")]);
        let eval = pt.evaluate(&grid, 10);
        assert!(!eval.line_wins.iter().any(|w| w.symbol == "chip"));
    }

    #[test]
    fn test_scatters_counted_anywhere() {
        let pt = paytable();
        let grid = grid_with(&pt, &[(0, 0, "hack"), (2, 3, "hack"), (4, 2, "hack")]);
        let eval = pt.evaluate(&grid, 10);
        assert_eq!(eval.scatter_count, 3);
        // scatters contribute no direct payout
        assert!(eval.line_wins.iter().all(|w| w.symbol != "hack"));
    }

    #[test]
    fn test_scatter_count_saturates_on_oversized_grids() {
        let pt = paytable();
        let hack = pt.catalog().code_of("hack").unwrap();
        // 5 reels x 60 rows, every cell a scatter: 300 > u8::MAX
        let grid = Grid::from_cells(vec![vec![hack; 60]; 5]);
        let eval = pt.evaluate(&grid, 1);
        assert_eq!(eval.scatter_count, u8::MAX);
        assert_eq!(eval.total_payout, 0);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let pt = paytable();
        let grid = grid_with(&pt, &[(0, 1, "chip"), (1, 1, "chip"), (2, 1, "chip")]);
        let a = pt.evaluate(&grid, 7);
        let b = pt.evaluate(&grid, 7);
        assert_eq!(a.total_payout, b.total_payout);
        assert_eq!(a.scatter_count, b.scatter_count);
    }

    #[test]
    fn test_payout_scales_with_bet() {
        let pt = paytable();
        let grid = grid_with(&pt, &[(0, 1, "chip"), (1, 1, "chip"), (2, 1, "chip")]);
        let at_1 = pt.evaluate(&grid, 1).total_payout;
        let at_9 = pt.evaluate(&grid, 9).total_payout;
        assert_eq!(at_9, at_1 * 9);
    }

    #[test]
    fn test_length_multiplier_table() {
        let pt = paytable();
        assert_eq!(pt.length_multiplier(2), 0);
        assert_eq!(pt.length_multiplier(3), 1);
        assert_eq!(pt.length_multiplier(4), 3);
        assert_eq!(pt.length_multiplier(5), 10);
    }
}
