//! Session state machine
//!
//! Owns credits, bet, win streak, overdrive and free-spin state, and drives
//! the `Idle → Spinning → Evaluating → Idle | BonusActive` phase cycle.
//! Every mutation goes through `&mut self` on [`SlotSession`], so only one
//! spin can ever be in flight and the session RNG is never interleaved.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::bonus::{BonusEngine, BonusEvent};
use crate::config::{ConfigError, EngineConfig};
use crate::events::EventSink;
use crate::paytable::{LineWin, PayTable};
use crate::reels::{Grid, ReelGenerator};

/// Spin lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinPhase {
    /// Ready for a spin request
    Idle,
    /// A spin is in flight (presentation latency lives here)
    Spinning,
    /// Grid generated, outcome being settled
    Evaluating,
    /// A Cyber Hack reward is pending from the caller
    BonusActive,
}

/// Player-visible session state
///
/// Mutated only by [`SlotSession`] transitions; callers receive clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Current credit balance (never negative by construction)
    pub credits: u64,
    /// Bet of the most recent spin request
    pub bet: u32,
    /// Consecutive winning spins
    pub consecutive_wins: u32,
    /// Overdrive presentation flag (streak reached the threshold)
    pub overdrive_active: bool,
    /// Free spins left from a Shadow Dash award
    pub free_spins_remaining: u32,
    /// Multiplier applied to free-spin payouts (≥ 1.0)
    pub free_spin_multiplier: f64,
}

/// Everything the presentation layer needs to show one resolved spin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpinOutcome {
    /// The symbol grid this spin produced
    pub grid: Grid,
    /// Sum of qualifying line payouts — pure in (grid, bet, paylines)
    pub total_payout: u64,
    /// Per-line win detail
    pub line_wins: Vec<LineWin>,
    /// Scatter symbols anywhere on the grid
    pub scatter_count: u8,
    /// Foregrounded bonus event
    pub bonus: BonusEvent,
    /// Multiplier applied at settlement (free spins), 1.0 otherwise
    pub multiplier: f64,
    /// Amount actually added to credits (`total_payout` × multiplier)
    pub credited: u64,
}

/// Runtime spin errors
///
/// Every rejection leaves session state byte-for-byte unchanged; a spin
/// either fully completes its transition or does not start.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SpinError {
    #[error("insufficient credits: have {credits}, bet {bet}")]
    InsufficientCredits { credits: u64, bet: u32 },

    #[error("bet {bet} outside allowed range {min}..={max}")]
    InvalidBet { bet: u32, min: u32, max: u32 },

    #[error("{op} not allowed in phase {phase:?}")]
    InvalidStateTransition { op: &'static str, phase: SpinPhase },
}

/// Per-session accounting
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_spins: u64,
    /// Credits actually wagered (free spins wager nothing)
    pub total_bet: u64,
    /// Credits returned, including bonus rewards
    pub total_win: u64,
    pub wins: u64,
    pub losses: u64,
    pub cyber_hacks: u64,
    pub shadow_dashes: u64,
    pub free_spins_played: u64,
    pub max_win_ratio: f64,
}

impl SessionStats {
    /// Realized RTP in percent
    pub fn rtp(&self) -> f64 {
        if self.total_bet > 0 {
            self.total_win as f64 / self.total_bet as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Fraction of spins that paid anything, in percent
    pub fn hit_rate(&self) -> f64 {
        if self.total_spins > 0 {
            self.wins as f64 / self.total_spins as f64 * 100.0
        } else {
            0.0
        }
    }
}

/// The spin-outcome engine's session driver
///
/// Single-player, single-session: one spin in flight at a time, enforced by
/// the phase acting as a mutual-exclusion gate. One session-scoped RNG
/// serves both reel draws and the Shadow Dash Bernoulli draw.
pub struct SlotSession {
    config: EngineConfig,
    paytable: PayTable,
    generator: ReelGenerator,
    bonus: BonusEngine,
    state: SessionState,
    phase: SpinPhase,
    rng: StdRng,
    stats: SessionStats,
    sinks: Vec<Box<dyn EventSink>>,
    spin_count: u64,
    /// In-flight spin bookkeeping for cancellation
    pending_debit: u32,
    pending_free_spin: bool,
}

// Sinks are trait objects, so Debug is written by hand.
impl std::fmt::Debug for SlotSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotSession")
            .field("phase", &self.phase)
            .field("state", &self.state)
            .field("spin_count", &self.spin_count)
            .field("sinks", &self.sinks.len())
            .finish_non_exhaustive()
    }
}

impl SlotSession {
    /// Create a session with the Neon Shinobi reference paytable
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_paytable(config, PayTable::neon_shinobi())
    }

    /// Create a session with a custom paytable
    pub fn with_paytable(config: EngineConfig, paytable: PayTable) -> Result<Self, ConfigError> {
        config.validate()?;
        for payline in paytable.paylines() {
            let fits = payline.rows.len() == config.grid.reels as usize
                && payline.rows.iter().all(|&row| row < config.grid.rows);
            if !fits {
                return Err(ConfigError::InvalidPayline {
                    index: payline.index,
                    reels: config.grid.reels,
                    rows: config.grid.rows,
                });
            }
        }

        let catalog = paytable.catalog();
        let first_weight = catalog.symbols()[0].weight;
        if catalog.symbols().iter().all(|s| s.weight == first_weight) {
            log::warn!("uniform symbol weights: payback is uncalibrated");
        }
        let theoretical = crate::calibration::theoretical_rtp(&paytable, config.grid);
        if (theoretical - config.target_rtp).abs() > 1.0 {
            log::warn!(
                "weight table yields theoretical RTP {theoretical:.1}%, target is {:.1}%",
                config.target_rtp
            );
        }

        let generator = ReelGenerator::new(paytable.catalog());
        let bonus = BonusEngine::new(&config.bonus);
        let state = SessionState {
            credits: config.starting_credits,
            bet: config.bet.min,
            consecutive_wins: 0,
            overdrive_active: false,
            free_spins_remaining: 0,
            free_spin_multiplier: 1.0,
        };

        Ok(Self {
            config,
            paytable,
            generator,
            bonus,
            state,
            phase: SpinPhase::Idle,
            rng: StdRng::from_os_rng(),
            stats: SessionStats::default(),
            sinks: Vec::new(),
            spin_count: 0,
            pending_debit: 0,
            pending_free_spin: false,
        })
    }

    /// Seed the session RNG for reproducible spins
    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Register an outbound event sink
    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Read-only state snapshot
    pub fn state(&self) -> SessionState {
        self.state.clone()
    }

    pub fn phase(&self) -> SpinPhase {
        self.phase
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn paytable(&self) -> &PayTable {
        &self.paytable
    }

    // ═══════════════════════════════════════════════════════════════════════
    // TRANSITIONS
    // ═══════════════════════════════════════════════════════════════════════

    /// `Idle → Spinning`: validate the bet and take the debit
    ///
    /// Re-entrant requests (any phase but `Idle`) are rejected, not queued,
    /// and leave the session untouched. A free spin debits nothing.
    pub fn request_spin(&mut self, bet: u32) -> Result<(), SpinError> {
        if self.phase != SpinPhase::Idle {
            return Err(SpinError::InvalidStateTransition {
                op: "request_spin",
                phase: self.phase,
            });
        }
        if !self.config.bet.contains(bet) {
            return Err(SpinError::InvalidBet {
                bet,
                min: self.config.bet.min,
                max: self.config.bet.max,
            });
        }

        if self.state.free_spins_remaining > 0 {
            self.pending_free_spin = true;
            self.pending_debit = 0;
        } else {
            if self.state.credits < bet as u64 {
                return Err(SpinError::InsufficientCredits {
                    credits: self.state.credits,
                    bet,
                });
            }
            self.state.credits -= bet as u64;
            self.pending_free_spin = false;
            self.pending_debit = bet;
        }

        self.state.bet = bet;
        self.phase = SpinPhase::Spinning;
        self.notify_state();
        Ok(())
    }

    /// Abort an in-flight spin before evaluation begins
    ///
    /// Refunds any debit; nothing is ever partially applied.
    pub fn cancel_spin(&mut self) -> Result<(), SpinError> {
        if self.phase != SpinPhase::Spinning {
            return Err(SpinError::InvalidStateTransition {
                op: "cancel_spin",
                phase: self.phase,
            });
        }
        self.state.credits += self.pending_debit as u64;
        self.pending_debit = 0;
        self.pending_free_spin = false;
        self.phase = SpinPhase::Idle;
        self.notify_state();
        Ok(())
    }

    /// `Spinning → Evaluating → Idle | BonusActive`: generate and settle
    pub fn resolve_spin(&mut self) -> Result<SpinOutcome, SpinError> {
        if self.phase != SpinPhase::Spinning {
            return Err(SpinError::InvalidStateTransition {
                op: "resolve_spin",
                phase: self.phase,
            });
        }
        self.phase = SpinPhase::Evaluating;
        let grid = self.generator.generate(self.config.grid, &mut self.rng);
        Ok(self.settle(grid))
    }

    /// Request and resolve in one call
    pub fn spin(&mut self, bet: u32) -> Result<SpinOutcome, SpinError> {
        self.request_spin(bet)?;
        self.resolve_spin()
    }

    /// `BonusActive → Idle`: apply the externally-resolved Cyber Hack reward
    pub fn resolve_bonus_reward(&mut self, amount: u64) -> Result<(), SpinError> {
        if self.phase != SpinPhase::BonusActive {
            return Err(SpinError::InvalidStateTransition {
                op: "resolve_bonus_reward",
                phase: self.phase,
            });
        }
        self.state.credits += amount;
        self.stats.total_win += amount;
        self.phase = SpinPhase::Idle;
        self.notify_state();
        Ok(())
    }

    /// Settle an evaluated grid into session state (the `outcomeReady` edge)
    fn settle(&mut self, grid: Grid) -> SpinOutcome {
        self.spin_count += 1;
        let bet = self.state.bet;
        let was_free_spin = self.pending_free_spin;

        let eval = self.paytable.evaluate(&grid, bet);
        let check = self.bonus.check(eval.scatter_count, &mut self.rng);

        let multiplier = if was_free_spin {
            self.state.free_spin_multiplier
        } else {
            1.0
        };
        let credited = (eval.total_payout as f64 * multiplier).round() as u64;
        self.state.credits += credited;

        // Win streak and overdrive
        if eval.total_payout > 0 {
            self.state.consecutive_wins += 1;
            if self.state.consecutive_wins >= self.config.overdrive_streak {
                self.state.overdrive_active = true;
            }
        } else {
            self.state.consecutive_wins = 0;
            self.state.overdrive_active = false;
        }

        // Free-spin bookkeeping: decrement, then step the multiplier for the
        // next free spin, or reset it once the feature ends.
        if was_free_spin {
            self.state.free_spins_remaining -= 1;
            if self.state.free_spins_remaining == 0 {
                self.state.free_spin_multiplier = 1.0;
            } else {
                self.state.free_spin_multiplier += self.config.bonus.multiplier_step;
            }
            self.stats.free_spins_played += 1;
        }

        // Shadow Dash award applies even when Cyber Hack is foregrounded
        if check.shadow_dash {
            self.state.free_spins_remaining = self.config.bonus.free_spin_count;
            self.state.free_spin_multiplier = 1.0;
            self.stats.shadow_dashes += 1;
            log::info!("shadow dash: {} free spins awarded", self.config.bonus.free_spin_count);
        }
        if check.cyber_hack {
            self.stats.cyber_hacks += 1;
            log::info!("cyber hack triggered ({} scatters)", eval.scatter_count);
        }

        // Accounting
        self.stats.total_spins += 1;
        self.stats.total_bet += self.pending_debit as u64;
        self.stats.total_win += credited;
        if eval.total_payout > 0 {
            self.stats.wins += 1;
        } else {
            self.stats.losses += 1;
        }
        let ratio = credited as f64 / bet.max(1) as f64;
        if ratio > self.stats.max_win_ratio {
            self.stats.max_win_ratio = ratio;
        }

        let outcome = SpinOutcome {
            grid,
            total_payout: eval.total_payout,
            line_wins: eval.line_wins,
            scatter_count: eval.scatter_count,
            bonus: check.event(),
            multiplier,
            credited,
        };

        self.pending_debit = 0;
        self.pending_free_spin = false;
        self.phase = if check.cyber_hack {
            SpinPhase::BonusActive
        } else {
            SpinPhase::Idle
        };

        log::debug!(
            "spin {}: payout {} (x{multiplier}), scatters {}, bonus {:?}, credits {}",
            self.spin_count,
            outcome.total_payout,
            outcome.scatter_count,
            outcome.bonus,
            self.state.credits
        );

        self.notify_outcome(&outcome);
        if outcome.bonus != BonusEvent::None {
            self.notify_bonus(outcome.bonus);
        }
        self.notify_state();

        outcome
    }

    fn notify_outcome(&mut self, outcome: &SpinOutcome) {
        for sink in &mut self.sinks {
            sink.on_outcome(outcome);
        }
    }

    fn notify_bonus(&mut self, event: BonusEvent) {
        for sink in &mut self.sinks {
            sink.on_bonus_triggered(event);
        }
    }

    fn notify_state(&mut self) {
        for sink in &mut self.sinks {
            sink.on_state_changed(&self.state);
        }
    }
}
