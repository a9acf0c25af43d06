#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for running and tuning the spawn director headlessly.

mod simulation;
mod tuning;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use spawn_director_core::{SessionVariant, TICKS_PER_SECOND};
use spawn_director_system_scheduler::{DefinitionReport, DryRunReport};
use spawn_director_system_session::Director;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::simulation::{SimulationConfig, SimulationSummary};

#[derive(Parser, Debug)]
#[command(
    name = "spawn-director",
    version,
    about = "Headless driver for the adaptive spawn director"
)]
struct Cli {
    /// Seed every session's random stream is derived from
    #[arg(long, global = true, default_value_t = 0)]
    seed: u64,

    /// TOML file overriding director tuning
    #[arg(long, global = true)]
    tuning: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Play one session against the reference world and summarise it
    Simulate(SimulateArgs),
    /// Evaluate a catalog's firing cadence without spawning anything
    Tune(TuneArgs),
}

#[derive(Args, Debug)]
struct SimulateArgs {
    /// Ticks to simulate
    #[arg(long, default_value_t = 5 * 60 * u64::from(TICKS_PER_SECOND))]
    ticks: u64,

    /// Session variant to start
    #[arg(long, value_enum, default_value_t = Variant::Normal)]
    variant: Variant,

    /// Monsters removed every simulated second
    #[arg(long, default_value_t = 15)]
    attrition: u32,

    /// Ticks a boss survives before it is defeated
    #[arg(long, default_value_t = 20 * u64::from(TICKS_PER_SECOND))]
    boss_lifetime: u64,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct TuneArgs {
    /// Catalog to evaluate
    #[arg(long, value_enum, default_value_t = Variant::Normal)]
    variant: Variant,

    /// Priority at which the evaluation stops, overriding the tuning file
    #[arg(long)]
    threshold: Option<f64>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    Normal,
    Cinematic,
    Joke,
}

impl From<Variant> for SessionVariant {
    fn from(variant: Variant) -> Self {
        match variant {
            Variant::Normal => Self::Normal,
            Variant::Cinematic => Self::Cinematic,
            Variant::Joke => Self::Joke,
        }
    }
}

/// Entry point for the spawn director command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut tuning = tuning::load(cli.tuning.as_deref())?;

    match cli.command {
        CliCommand::Simulate(args) => {
            let mut director = Director::new(tuning, cli.seed);
            let config = SimulationConfig {
                ticks: args.ticks,
                variant: args.variant.into(),
                attrition: args.attrition,
                boss_lifetime: args.boss_lifetime,
            };
            let summary = simulation::run(&mut director, &config)
                .context("spawn session terminated")?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
        }
        CliCommand::Tune(args) => {
            if let Some(threshold) = args.threshold {
                tuning.dry_run_threshold = threshold;
            }
            let director = Director::new(tuning, cli.seed);
            let report = director
                .dry_run_session(args.variant.into())
                .context("failed to evaluate spawn catalog")?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_dry_run(&report);
            }
        }
    }
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_summary(summary: &SimulationSummary) {
    let outcomes = &summary.outcomes;
    println!("session kind:     {:?}", summary.kind);
    println!("ticks:            {}", summary.ticks);
    println!(
        "outcomes:         fired {} / gate rejected {} / at capacity {} / boss present {}",
        outcomes.fired, outcomes.gate_rejected, outcomes.at_capacity, outcomes.boss_present
    );
    if outcomes.paused > 0 || outcomes.idle > 0 {
        println!(
            "                  paused {} / idle {}",
            outcomes.paused, outcomes.idle
        );
    }
    println!(
        "monsters:         peak {} / final {} / spawned {}",
        summary.peak_monsters, summary.final_monsters, summary.spawned_total
    );
    println!(
        "bosses defeated:  {} (ceiling now {})",
        summary.bosses_defeated, summary.final_limit
    );
    print_definitions(&summary.definitions);
}

fn print_dry_run(report: &DryRunReport) {
    println!("firings:          {}", report.firings);
    println!("bosses defeated:  {}", report.bosses_defeated);
    if report.truncated {
        println!("stopped at the firing bound before reaching the threshold");
    }
    print_definitions(&report.definitions);
}

fn print_definitions(definitions: &[DefinitionReport]) {
    if definitions.is_empty() {
        return;
    }
    println!();
    println!(
        "{:<28} {:>9} {:>9} {:>14} {:>14}",
        "definition", "firings", "spawned", "priority", "change"
    );
    for report in definitions {
        println!(
            "{:<28} {:>9} {:>9} {:>14.2} {:>14.2}",
            report.name, report.firings, report.spawned, report.priority, report.change
        );
    }
}
