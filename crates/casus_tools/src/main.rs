//! Casus - Development Tools

use std::path::{Path, PathBuf};
use std::process;

use casus_core::agent::CivId;
use casus_core::decision::WarLedger;
use casus_core::params::ScoringParameters;
use casus_core::world::WorldSnapshot;
use casus_tools::batch::decide_parallel;
use casus_tools::loader::{load_params, load_world};
use casus_tools::report::{evaluate_candidates, format_candidate_table, format_decision};
use casus_tools::validate::validate_data_directory;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "casus-tools")]
#[command(about = "Development tools for the Casus war decision engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate data files
    Validate {
        /// Path to data directory
        #[arg(default_value = "assets/data")]
        path: String,
    },

    /// Show the score breakdown and gate verdict for every candidate
    Evaluate {
        /// Scoring parameters file (defaults if omitted)
        #[arg(short, long)]
        params: Option<PathBuf>,

        /// World snapshot file
        #[arg(short, long, default_value = "assets/data/world.ron")]
        world: PathBuf,

        /// Deciding civilization
        #[arg(short, long)]
        civ: u32,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Decide war for one civilization, or for all of them in parallel
    Decide {
        /// Scoring parameters file (defaults if omitted)
        #[arg(short, long)]
        params: Option<PathBuf>,

        /// World snapshot file
        #[arg(short, long, default_value = "assets/data/world.ron")]
        world: PathBuf,

        /// Deciding civilization (all civilizations if omitted)
        #[arg(short, long)]
        civ: Option<u32>,

        /// Worker threads for whole-world decisions (0 = auto)
        #[arg(short, long, default_value = "0")]
        threads: usize,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path } => {
            tracing::info!("Validating data files in: {path}");
            match validate_data_directory(Path::new(&path)) {
                Ok(()) => tracing::info!("Validation passed"),
                Err(e) => fail(&format!("Validation failed: {e}")),
            }
        }
        Commands::Evaluate {
            params,
            world,
            civ,
            json,
        } => cmd_evaluate(params.as_deref(), &world, CivId(civ), json),
        Commands::Decide {
            params,
            world,
            civ,
            threads,
            json,
        } => cmd_decide(params.as_deref(), &world, civ.map(CivId), threads, json),
    }
}

fn fail(message: &str) -> ! {
    tracing::error!("{message}");
    process::exit(1);
}

fn load_inputs(params: Option<&Path>, world: &Path) -> (ScoringParameters, WorldSnapshot) {
    let params = match params {
        Some(path) => load_params(path).unwrap_or_else(|e| fail(&e.to_string())),
        None => ScoringParameters::default(),
    };
    let world = load_world(world).unwrap_or_else(|e| fail(&e.to_string()));
    (params, world)
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => fail(&format!("Failed to encode JSON: {e}")),
    }
}

fn cmd_evaluate(params: Option<&Path>, world: &Path, civ: CivId, json: bool) {
    let (params, world) = load_inputs(params, world);

    let reports =
        evaluate_candidates(&world, &params, civ).unwrap_or_else(|e| fail(&e.to_string()));

    if json {
        print_json(&reports);
    } else {
        print!("{}", format_candidate_table(&reports));
    }
}

fn cmd_decide(params: Option<&Path>, world: &Path, civ: Option<CivId>, threads: usize, json: bool) {
    let (params, world) = load_inputs(params, world);

    if let Some(civ) = civ {
        let mut ledger = WarLedger::new(world.turn);
        let decision = world
            .decide_for(civ, &params, &mut ledger)
            .unwrap_or_else(|e| fail(&e.to_string()));
        if json {
            print_json(&decision);
        } else {
            println!("{}", format_decision(&world, &decision));
        }
        return;
    }

    // Configure thread pool if specified
    if threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .ok(); // Ignore if already set
    }

    let turn = decide_parallel(&world, &params).unwrap_or_else(|e| fail(&e.to_string()));
    if json {
        print_json(&turn);
    } else {
        println!("Turn {}: {} wars declared", turn.turn, turn.wars_declared());
        for decision in &turn.decisions {
            println!("  {}", format_decision(&world, decision));
        }
    }
}
