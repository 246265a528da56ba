//! Symbol catalog: definitions, appearance weights, load-time validation

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Symbol classification
///
/// A symbol is exactly one kind, so the "never both wild and scatter"
/// invariant holds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// Regular paying symbol
    Regular,
    /// Wild — substitutes for any non-scatter symbol in a payline run
    Wild,
    /// Scatter — counted anywhere on the grid, triggers the Cyber Hack bonus
    Scatter,
}

/// A symbol definition
///
/// Immutable after catalog load. `weight` is the relative appearance weight
/// used only by the reel generator; payouts are per-run base values fed to
/// the payline evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    /// Unique symbol id (e.g. "wild", "katana", "hack")
    pub id: String,
    /// Base payout value for a qualifying run
    pub payout: u64,
    /// Symbol kind
    pub kind: SymbolKind,
    /// Relative appearance weight (positive, finite)
    pub weight: f64,
}

impl Symbol {
    /// Create a regular paying symbol
    pub fn regular(id: impl Into<String>, payout: u64, weight: f64) -> Self {
        Self {
            id: id.into(),
            payout,
            kind: SymbolKind::Regular,
            weight,
        }
    }

    /// Create a wild symbol
    pub fn wild(id: impl Into<String>, payout: u64, weight: f64) -> Self {
        Self {
            id: id.into(),
            payout,
            kind: SymbolKind::Wild,
            weight,
        }
    }

    /// Create a scatter symbol (pays nothing on lines)
    pub fn scatter(id: impl Into<String>, weight: f64) -> Self {
        Self {
            id: id.into(),
            payout: 0,
            kind: SymbolKind::Scatter,
            weight,
        }
    }

    pub fn is_wild(&self) -> bool {
        self.kind == SymbolKind::Wild
    }

    pub fn is_scatter(&self) -> bool {
        self.kind == SymbolKind::Scatter
    }
}

/// Catalog load and lookup errors
///
/// All of these are configuration errors: they are fatal at load time and
/// cannot occur at spin time once the catalog validated.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("duplicate symbol id: {0}")]
    DuplicateSymbol(String),

    #[error("symbol {id} has invalid weight {weight} (must be positive and finite)")]
    InvalidWeight { id: String, weight: f64 },

    #[error("catalog contains no symbols")]
    EmptyCatalog,
}

/// Static table of symbol definitions
///
/// Loaded once at startup and never mutated; concurrent reads are always
/// safe. Each symbol is assigned a dense `u32` code (its load order) which
/// is what grids store.
#[derive(Debug, Clone)]
pub struct SymbolCatalog {
    symbols: Vec<Symbol>,
    by_id: HashMap<String, u32>,
}

impl SymbolCatalog {
    /// Load and validate a catalog
    pub fn load(symbols: Vec<Symbol>) -> Result<Self, CatalogError> {
        if symbols.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }

        let mut by_id = HashMap::with_capacity(symbols.len());
        for (code, symbol) in symbols.iter().enumerate() {
            if !(symbol.weight.is_finite() && symbol.weight > 0.0) {
                return Err(CatalogError::InvalidWeight {
                    id: symbol.id.clone(),
                    weight: symbol.weight,
                });
            }
            if by_id.insert(symbol.id.clone(), code as u32).is_some() {
                return Err(CatalogError::DuplicateSymbol(symbol.id.clone()));
            }
        }

        Ok(Self { symbols, by_id })
    }

    /// The Neon Shinobi reference catalog (5×4, cyberpunk theme)
    ///
    /// Weights are non-uniform: premium symbols land rarely, card symbols
    /// carry most of the reel mass. See the `calibration` module for the
    /// closed-form payback these weights produce.
    pub fn neon_shinobi() -> Self {
        let symbols = vec![
            Symbol::wild("wild", 1000, 1.0),
            Symbol::regular("katana", 750, 2.0),
            Symbol::regular("chip", 500, 3.0),
            Symbol::regular("drone", 400, 4.0),
            Symbol::regular("mask", 300, 5.0),
            Symbol::regular("pad", 250, 6.0),
            Symbol::scatter("hack", 2.0),
            Symbol::regular("a", 150, 10.0),
            Symbol::regular("k", 125, 11.0),
            Symbol::regular("q", 100, 12.0),
            Symbol::regular("j", 75, 13.0),
            Symbol::regular("10", 50, 14.0),
        ];
        // Static table, known valid.
        Self::load(symbols).expect("reference catalog is valid")
    }

    /// Look up a symbol by id
    pub fn lookup(&self, id: &str) -> Result<&Symbol, CatalogError> {
        self.code_of(id).map(|code| &self.symbols[code as usize])
    }

    /// Dense code for a symbol id
    pub fn code_of(&self, id: &str) -> Result<u32, CatalogError> {
        self.by_id
            .get(id)
            .copied()
            .ok_or_else(|| CatalogError::UnknownSymbol(id.to_string()))
    }

    /// Symbol for a grid code
    pub fn by_code(&self, code: u32) -> Option<&Symbol> {
        self.symbols.get(code as usize)
    }

    /// Appearance weight for a symbol id
    pub fn weight_of(&self, id: &str) -> Result<f64, CatalogError> {
        self.lookup(id).map(|s| s.weight)
    }

    /// All symbol ids, in code order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(|s| s.id.as_str())
    }

    /// All symbol definitions, in code order
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Code of the wild symbol, if the catalog has one
    pub fn wild_code(&self) -> Option<u32> {
        self.symbols
            .iter()
            .position(|s| s.is_wild())
            .map(|i| i as u32)
    }

    /// Code of the scatter symbol, if the catalog has one
    pub fn scatter_code(&self) -> Option<u32> {
        self.symbols
            .iter()
            .position(|s| s.is_scatter())
            .map(|i| i as u32)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
