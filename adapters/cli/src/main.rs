#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line adapter that runs a Path Defence match.

mod scenario;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use path_defence_core::Outcome;
use path_defence_engine::query;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "path-defence", about = "Headless Path Defence match runner")]
struct Args {
    /// RNG seed; a random seed is drawn when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// JSON scenario file to run instead of the built-in demo.
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Safety cap on simulated ticks before the match is interrupted.
    #[arg(long, default_value_t = 200_000)]
    max_ticks: u64,
}

/// Entry point for the Path Defence command-line runner.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);
    let scenario = match &args.scenario {
        Some(path) => scenario::load(path)?,
        None => scenario::demo(),
    };
    println!("Map: {} (seed {seed})", scenario.name);

    let mut engine = scenario::build_engine(scenario, seed)?;
    let mut ticks = 0;
    while query::outcome(&engine).is_none() && ticks < args.max_ticks {
        if !query::wave_active(&engine) {
            let _ = engine.begin_wave();
        }
        engine.tick().context("simulation fault")?;
        ticks += 1;
    }
    if query::outcome(&engine).is_none() {
        engine.interrupt();
    }

    match query::outcome(&engine) {
        Some(Outcome::Victory) => println!("You win!"),
        Some(Outcome::Failure) => println!("You lose..."),
        _ => println!("Game interrupted..."),
    }
    println!(
        "Ticks: {ticks}, base health: {}, money: {}, defences: {}",
        query::base_health(&engine),
        query::money(&engine),
        query::defence_view(&engine).len(),
    );
    Ok(())
}
