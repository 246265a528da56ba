//! Batch simulator CLI
//!
//! `ns-sim --sessions 10000 --spins 1000 --json` prints a payback report
//! for the reference paytable. `RUST_LOG=info` shows batch progress.

use clap::Parser;

use ns_engine::config::EngineConfig;
use ns_sim::{BatchReport, SimConfig, run_batch};

#[derive(Parser, Debug)]
#[command(name = "ns-sim", about = "Batch spin simulator for payback validation")]
struct Args {
    /// Independent sessions to run
    #[arg(long, default_value_t = 1_000)]
    sessions: u64,

    /// Spins attempted per session
    #[arg(long, default_value_t = 1_000)]
    spins: u64,

    /// Bet per spin
    #[arg(long, default_value_t = 1)]
    bet: u32,

    /// Master seed
    #[arg(long, default_value_t = 0x5EED)]
    seed: u64,

    /// Worker threads (0 = all cores)
    #[arg(long, default_value_t = 0)]
    workers: usize,

    /// Flat Cyber Hack reward in credits
    #[arg(long, default_value_t = 50)]
    cyber_hack_reward: u64,

    /// Starting credits per session
    #[arg(long, default_value_t = 1_000)]
    credits: u64,

    /// Emit the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let config = SimConfig {
        sessions: args.sessions,
        spins_per_session: args.spins,
        bet: args.bet,
        seed: args.seed,
        workers: args.workers,
        cyber_hack_reward: args.cyber_hack_reward,
        engine: EngineConfig {
            starting_credits: args.credits,
            ..EngineConfig::default()
        },
    };

    match run_batch(&config) {
        Ok(report) => print_report(&report, args.json),
        Err(e) => {
            log::error!("batch failed: {e}");
            std::process::exit(1);
        }
    }
}

fn print_report(report: &BatchReport, json: bool) {
    if json {
        match serde_json::to_string_pretty(report) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                log::error!("report serialization failed: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    println!("sessions          {:>12}", report.sessions);
    println!("  busted          {:>12}", report.busted_sessions);
    println!("spins             {:>12}", report.total_spins);
    println!("wagered           {:>12}", report.total_bet);
    println!("returned          {:>12}", report.total_win);
    println!("rtp               {:>11.2}%", report.rtp);
    println!("  theoretical     {:>11.2}%", report.theoretical_rtp);
    println!("hit rate          {:>11.2}%", report.hit_rate);
    println!("cyber hacks       {:>12}", report.cyber_hacks);
    println!("shadow dashes     {:>12}", report.shadow_dashes);
    println!("free spins played {:>12}", report.free_spins_played);
    println!("max win ratio     {:>11.1}x", report.max_win_ratio);
}
