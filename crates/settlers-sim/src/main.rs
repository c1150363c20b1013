//! Headless simulator: plays seeded all-AI games and reports statistics.

use anyhow::{Context, Result};
use clap::Parser;
use settlers_core::game::PLAYER_COUNT;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod report;
mod runner;

use report::Summary;

#[derive(Debug, Parser)]
#[command(name = "settlers-sim")]
#[command(about = "Play all-AI settlers games and summarize the results")]
struct Args {
    /// Number of games to play
    #[arg(long, default_value_t = 10)]
    games: u32,

    /// Seed of the first game; game `i` uses `seed + i`
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Stop a game after this many seat turns
    #[arg(long, default_value_t = 500)]
    max_turns: u32,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Log filter, overriding RUST_LOG (e.g. "debug" or "settlers_core=debug")
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = args
        .log_level
        .clone()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".into());
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(games = args.games, seed = args.seed, "starting simulation");

    let records = (0..args.games as u64)
        .map(|i| {
            let seed = args.seed.wrapping_add(i);
            runner::play_game(seed, args.max_turns)
                .with_context(|| format!("game with seed {seed}"))
        })
        .collect::<Result<Vec<_>>>()?;

    let summary = Summary::from_records(records, PLAYER_COUNT);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{summary}");
    }

    Ok(())
}
