//! Engine configuration

use serde::{Deserialize, Serialize};

/// Grid specification (reels × rows)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of reels (columns)
    pub reels: u8,
    /// Number of visible rows per reel
    pub rows: u8,
}

impl GridSpec {
    /// Neon Shinobi reference grid: 5×4
    pub fn standard_5x4() -> Self {
        Self { reels: 5, rows: 4 }
    }

    /// Total grid positions
    pub fn total_positions(&self) -> usize {
        self.reels as usize * self.rows as usize
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::standard_5x4()
    }
}

/// Allowed bet range, in credits
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BetLimits {
    pub min: u32,
    pub max: u32,
}

impl BetLimits {
    pub fn contains(&self, bet: u32) -> bool {
        bet >= self.min && bet <= self.max
    }
}

impl Default for BetLimits {
    fn default() -> Self {
        Self { min: 1, max: 100 }
    }
}

/// Bonus feature tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BonusConfig {
    /// Scatters needed to trigger the Cyber Hack bonus
    pub scatter_trigger_count: u8,
    /// Per-spin probability of the Shadow Dash free-spin feature
    pub shadow_dash_probability: f64,
    /// Free spins awarded by Shadow Dash
    pub free_spin_count: u32,
    /// Multiplier increase applied after each free spin
    pub multiplier_step: f64,
}

impl Default for BonusConfig {
    fn default() -> Self {
        Self {
            scatter_trigger_count: 3,
            shadow_dash_probability: 0.05,
            free_spin_count: 10,
            multiplier_step: 1.0,
        }
    }
}

/// Configuration errors, fatal at load time
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("bet limits invalid: min {min} must be positive and <= max {max}")]
    InvalidBetLimits { min: u32, max: u32 },

    #[error("shadow dash probability {0} outside [0, 1]")]
    InvalidProbability(f64),

    #[error("grid must have at least 3 reels and 1 row, got {reels}x{rows}")]
    InvalidGrid { reels: u8, rows: u8 },

    #[error("payline {index} does not fit the {reels}x{rows} grid")]
    InvalidPayline { index: u8, reels: u8, rows: u8 },

    #[error("config parse failed: {0}")]
    Parse(String),
}

/// Full engine configuration surface
///
/// Loaded once, static for the life of a session. The symbol catalog and
/// payline table are configured alongside this (see `SlotSession`
/// constructors); everything scalar lives here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Grid dimensions
    pub grid: GridSpec,
    /// Bet bounds
    pub bet: BetLimits,
    /// Target long-run payback ratio, in percent (e.g. 96.8)
    pub target_rtp: f64,
    /// Bonus feature tuning
    pub bonus: BonusConfig,
    /// Consecutive wins required to enter overdrive
    pub overdrive_streak: u32,
    /// Credits a fresh session starts with
    pub starting_credits: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid: GridSpec::standard_5x4(),
            bet: BetLimits::default(),
            target_rtp: 96.8,
            bonus: BonusConfig::default(),
            overdrive_streak: 5,
            starting_credits: 1000,
        }
    }
}

impl EngineConfig {
    /// Validate scalar fields
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.reels < 3 || self.grid.rows == 0 {
            return Err(ConfigError::InvalidGrid {
                reels: self.grid.reels,
                rows: self.grid.rows,
            });
        }
        if self.bet.min == 0 || self.bet.min > self.bet.max {
            return Err(ConfigError::InvalidBetLimits {
                min: self.bet.min,
                max: self.bet.max,
            });
        }
        let p = self.bonus.shadow_dash_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(ConfigError::InvalidProbability(p));
        }
        Ok(())
    }

    /// Export as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Import from JSON (validated)
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
