//! Triage Shift - headless runner
//!
//! Plays one shift with the autopilot, prints the result and records it on
//! the leaderboard.

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use triage_shift::core::config::{Character, Difficulty, ShiftConfig};
use triage_shift::core::error::Result;
use triage_shift::leaderboard::{today, LeaderboardEntry, LeaderboardFilter, LeaderboardStore};
use triage_shift::simulation::{Autopilot, FinalStats, ShiftEvent, ShiftPlayer, ShiftSession};
use triage_shift::triage::ConditionCatalog;

/// Triage Shift - run an emergency department shift headless
#[derive(Parser, Debug)]
#[command(name = "triage-shift")]
#[command(about = "Play a triage shift with the autopilot and record the score")]
struct Args {
    /// Character: veteran, empath, efficient or resourceful
    #[arg(long, default_value = "veteran")]
    character: String,

    /// Difficulty: easy, medium or hard
    #[arg(long, default_value = "medium")]
    difficulty: String,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// TOML file overriding shift constants
    #[arg(long)]
    config: Option<PathBuf>,

    /// TOML file replacing the condition catalog
    #[arg(long)]
    conditions: Option<PathBuf>,

    /// Directory holding the leaderboard files
    #[arg(long, default_value = "leaderboard")]
    leaderboard_dir: PathBuf,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Do not write the result to the leaderboard
    #[arg(long)]
    no_record: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct RunSummary {
    seed: u64,
    stats: FinalStats,
    dilemmas_resolved: usize,
    top: Vec<LeaderboardEntry>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("triage_shift=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let character: Character = args.character.parse()?;
    let difficulty: Difficulty = args.difficulty.parse()?;
    let config = match &args.config {
        Some(path) => ShiftConfig::load_from_toml(path)?,
        None => ShiftConfig::default(),
    };
    let seed = args.seed.unwrap_or_else(rand::random);

    let mut session = ShiftSession::new(character, difficulty, config.clone(), seed)?;
    if let Some(path) = &args.conditions {
        session = session.with_catalog(ConditionCatalog::load_from_toml(path)?);
    }

    let mut pilot = Autopilot::with_seed(seed.wrapping_add(1));
    let mut dilemmas_resolved = 0;
    session.start();
    while !session.is_over() {
        pilot.act(&mut session);
        session.advance_seconds(1);
        dilemmas_resolved += session
            .drain_events()
            .iter()
            .filter(|e| matches!(e, ShiftEvent::DilemmaResolved { .. }))
            .count();
    }

    let Some(stats) = session.final_stats().cloned() else {
        return Ok(());
    };

    let store = LeaderboardStore::new(args.leaderboard_dir.clone(), &config);
    if !args.no_record {
        store.record(&stats, &today())?;
    }
    let top = store.view(LeaderboardFilter::Character, character, difficulty);

    if args.json {
        let summary = RunSummary {
            seed,
            stats,
            dilemmas_resolved,
            top,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(seed, &stats, &top);
    }

    Ok(())
}

fn print_summary(seed: u64, stats: &FinalStats, top: &[LeaderboardEntry]) {
    println!("=== SHIFT OVER ===");
    println!(
        "{} on {} (seed {})",
        stats.character.display_name(),
        stats.difficulty,
        seed
    );
    println!("Final score:     {}", stats.score);
    println!("Patients saved:  {}", stats.saved);
    println!("Patients lost:   {} ({} untriaged)", stats.lost, stats.untriaged);
    println!(
        "Triage accuracy: {}% ({}/{})",
        stats.accuracy, stats.accurate_assessments, stats.total_assessments
    );
    println!("Dilemmas faced:  {}", stats.dilemmas);

    if !top.is_empty() {
        println!();
        println!("=== LEADERBOARD ({} / {}) ===", stats.character, stats.difficulty);
        for (rank, entry) in top.iter().enumerate() {
            println!(
                "#{:<3} {:<12} {:>6}  saved {:<3} lost {:<3} {:>3}%  {}",
                rank + 1,
                entry.name,
                entry.score,
                entry.saved,
                entry.lost,
                entry.accuracy,
                entry.date
            );
        }
    }
}
