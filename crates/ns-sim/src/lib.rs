//! Batch spin simulator
//!
//! Drives many independent [`SlotSession`]s in parallel and aggregates
//! their stats into a [`BatchReport`], for validating realized RTP and
//! hit rate against the closed-form expectation. Runs are fully
//! deterministic for a given `(seed, sessions, spins_per_session)` tuple:
//! per-session seeds are derived up front from one ChaCha8 stream, so
//! thread scheduling cannot change the outcome.

use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use ns_engine::calibration;
use ns_engine::config::{ConfigError, EngineConfig};
use ns_engine::paytable::PayTable;
use ns_engine::session::{SessionStats, SlotSession, SpinError, SpinPhase};

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIG
// ═══════════════════════════════════════════════════════════════════════════════

/// Batch run parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Independent sessions to run
    pub sessions: u64,
    /// Spins attempted per session (a session may bust earlier)
    pub spins_per_session: u64,
    /// Bet per spin
    pub bet: u32,
    /// Master seed; per-session seeds derive from it
    pub seed: u64,
    /// Worker threads (0 = all cores)
    pub workers: usize,
    /// Flat reward credited whenever a session enters the Cyber Hack bonus
    pub cyber_hack_reward: u64,
    /// Engine configuration shared by every session
    pub engine: EngineConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            sessions: 1_000,
            spins_per_session: 1_000,
            bet: 1,
            seed: 0x5EED,
            workers: 0,
            cyber_hack_reward: 50,
            engine: EngineConfig::default(),
        }
    }
}

/// Batch simulation errors
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("invalid simulation config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Engine(#[from] ConfigError),

    #[error(transparent)]
    Spin(#[from] SpinError),
}

// ═══════════════════════════════════════════════════════════════════════════════
// REPORT
// ═══════════════════════════════════════════════════════════════════════════════

/// Aggregated results of one batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub sessions: u64,
    /// Sessions that ran out of credits before finishing their spins
    pub busted_sessions: u64,
    pub total_spins: u64,
    pub total_bet: u64,
    pub total_win: u64,
    /// Realized RTP in percent, Cyber Hack rewards included
    pub rtp: f64,
    /// Closed-form line-game RTP in percent for the configured paytable
    pub theoretical_rtp: f64,
    pub hit_rate: f64,
    pub cyber_hacks: u64,
    pub shadow_dashes: u64,
    pub free_spins_played: u64,
    /// Largest single-spin credited/bet ratio seen anywhere in the batch
    pub max_win_ratio: f64,
}

impl BatchReport {
    fn from_stats(
        config: &SimConfig,
        paytable: &PayTable,
        stats: &[SessionStats],
        busted: u64,
    ) -> Self {
        let total_bet: u64 = stats.iter().map(|s| s.total_bet).sum();
        let total_win: u64 = stats.iter().map(|s| s.total_win).sum();
        let total_spins: u64 = stats.iter().map(|s| s.total_spins).sum();
        let wins: u64 = stats.iter().map(|s| s.wins).sum();

        Self {
            sessions: stats.len() as u64,
            busted_sessions: busted,
            total_spins,
            total_bet,
            total_win,
            rtp: if total_bet > 0 {
                total_win as f64 / total_bet as f64 * 100.0
            } else {
                0.0
            },
            theoretical_rtp: calibration::theoretical_rtp(paytable, config.engine.grid),
            hit_rate: if total_spins > 0 {
                wins as f64 / total_spins as f64 * 100.0
            } else {
                0.0
            },
            cyber_hacks: stats.iter().map(|s| s.cyber_hacks).sum(),
            shadow_dashes: stats.iter().map(|s| s.shadow_dashes).sum(),
            free_spins_played: stats.iter().map(|s| s.free_spins_played).sum(),
            max_win_ratio: stats
                .iter()
                .map(|s| s.max_win_ratio)
                .fold(0.0, f64::max),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BATCH RUNNER
// ═══════════════════════════════════════════════════════════════════════════════

/// Run one session to completion and return its stats
fn run_session(
    config: &SimConfig,
    paytable: &PayTable,
    seed: u64,
) -> Result<(SessionStats, bool), SimError> {
    let mut session = SlotSession::with_paytable(config.engine.clone(), paytable.clone())?;
    session.seed(seed);
    let mut busted = false;

    for _ in 0..config.spins_per_session {
        match session.spin(config.bet) {
            Ok(_) => {}
            Err(SpinError::InsufficientCredits { .. }) => {
                busted = true;
                break;
            }
            Err(e) => return Err(e.into()),
        }
        if session.phase() == SpinPhase::BonusActive {
            session.resolve_bonus_reward(config.cyber_hack_reward)?;
        }
    }

    Ok((session.stats().clone(), busted))
}

/// Run the whole batch with the Neon Shinobi reference paytable
pub fn run_batch(config: &SimConfig) -> Result<BatchReport, SimError> {
    run_batch_with_paytable(config, &PayTable::neon_shinobi())
}

/// Run the whole batch across a rayon pool with a custom paytable
///
/// Every session plays the given table, and the report's theoretical RTP
/// is derived from the same table.
pub fn run_batch_with_paytable(
    config: &SimConfig,
    paytable: &PayTable,
) -> Result<BatchReport, SimError> {
    if config.sessions == 0 {
        return Err(SimError::InvalidConfig("sessions must be > 0".into()));
    }
    if config.spins_per_session == 0 {
        return Err(SimError::InvalidConfig(
            "spins_per_session must be > 0".into(),
        ));
    }
    config.engine.validate()?;

    // Seeds are drawn sequentially before any thread starts, so the batch
    // is reproducible whatever the pool does.
    let mut seeder = ChaCha8Rng::seed_from_u64(config.seed);
    let seeds: Vec<u64> = (0..config.sessions).map(|_| seeder.random()).collect();

    let workers = if config.workers == 0 {
        num_cpus::get()
    } else {
        config.workers
    };
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| SimError::InvalidConfig(e.to_string()))?;

    log::info!(
        "batch: {} sessions x {} spins on {workers} workers (seed {})",
        config.sessions,
        config.spins_per_session,
        config.seed
    );

    let completed = Mutex::new(0u64);
    let log_every = (config.sessions / 10).max(1);

    let results: Vec<Result<(SessionStats, bool), SimError>> = pool.install(|| {
        seeds
            .par_iter()
            .map(|&seed| {
                let result = run_session(config, paytable, seed);
                let mut done = completed.lock();
                *done += 1;
                if *done % log_every == 0 {
                    log::info!("batch: {}/{} sessions done", *done, config.sessions);
                }
                result
            })
            .collect()
    });

    let mut stats = Vec::with_capacity(results.len());
    let mut busted = 0u64;
    for result in results {
        let (s, b) = result?;
        if b {
            busted += 1;
        }
        stats.push(s);
    }

    let report = BatchReport::from_stats(config, paytable, &stats, busted);
    log::info!(
        "batch: rtp {:.2}% (theoretical {:.2}%), hit rate {:.2}%",
        report.rtp,
        report.theoretical_rtp,
        report.hit_rate
    );
    Ok(report)
}
