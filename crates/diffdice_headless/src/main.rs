//! Headless dice-differences strategy runner.
//!
//! Reports are written to stdout, logs to stderr, results to JSON files.
//!
//! # Usage
//!
//! ```bash
//! # Rank every strategy, 1000 games each
//! cargo run --release -p diffdice_headless -- sweep --games 1000 --seed 42
//!
//! # Sweep from a config file
//! cargo run --release -p diffdice_headless -- sweep --config configs/sweep.ron
//!
//! # Play one strategy and print every move of the first games
//! cargo run -p diffdice_headless -- play --strategy "0:1,1:1,2:1,3:1,4:1,5:1" --games 5 --trace
//!
//! # Analyze saved sweep results
//! cargo run -p diffdice_headless -- analyze --input results/sweep_results.json --strategy "2:6"
//!
//! # Verify a sweep is reproducible
//! cargo run --release -p diffdice_headless -- verify --games 100 --seed 12345 --runs 3
//! ```

use std::fmt::Display;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use diffdice_core::strategy::Strategy;
use diffdice_headless::{
    render_play_summary, render_ranked_table, render_strategy_rank, render_trace, run_play,
    run_sweep, verify_determinism, PlayConfig, SweepConfig, SweepResults,
};

/// Games listed individually in a play report.
const PLAY_REPORT_GAMES: usize = 50;

#[derive(Parser)]
#[command(name = "diffdice_headless")]
#[command(about = "Headless strategy runner for the dice-differences game")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play repeated games of one strategy
    Play {
        /// Strategy, e.g. "0:1,3:5" or "1,0,0,5,0,0"
        #[arg(short, long, conflicts_with = "config")]
        strategy: Option<String>,

        /// RON play config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of games to play
        #[arg(short, long)]
        games: Option<u32>,

        /// Dice seed (random if omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Print every move of every game
        #[arg(long)]
        trace: bool,

        /// Output directory for results
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Evaluate and rank every strategy
    Sweep {
        /// RON sweep config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Games per strategy
        #[arg(short, long)]
        games: Option<u32>,

        /// Base seed (random if omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Worker threads (0 = auto)
        #[arg(short, long)]
        parallel: Option<u32>,

        /// Output directory for results
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rows to print
        #[arg(short, long)]
        top: Option<usize>,
    },

    /// Print rankings from saved sweep results
    Analyze {
        /// Input sweep results JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Rows to print
        #[arg(short, long, default_value = "20")]
        top: usize,

        /// Look up this strategy's rank
        #[arg(short, long)]
        strategy: Option<String>,

        /// Write the report to a file as well
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify determinism by running the same sweep several times
    Verify {
        /// Games per strategy
        #[arg(short, long, default_value = "100")]
        games: u32,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs (at least 2)
        #[arg(short, long, default_value = "3", value_parser = clap::value_parser!(u32).range(2..))]
        runs: u32,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for reports)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Commands::Play {
            strategy,
            config,
            games,
            seed,
            trace,
            output,
        } => cmd_play(strategy, config, games, seed, trace, output),
        Commands::Sweep {
            config,
            games,
            seed,
            parallel,
            output,
            top,
        } => cmd_sweep(config, games, seed, parallel, output, top),
        Commands::Analyze {
            input,
            top,
            strategy,
            output,
        } => cmd_analyze(input, top, strategy, output),
        Commands::Verify { games, seed, runs } => cmd_verify(games, seed, runs),
    }
}

/// Log an error and exit with status 1.
fn fail(context: &str, error: impl Display) -> ! {
    tracing::error!(error = %error, "{}", context);
    eprintln!("FATAL: {context}: {error}");
    std::process::exit(1);
}

fn parse_strategy(text: &str) -> Strategy {
    text.parse()
        .unwrap_or_else(|e| fail(&format!("Invalid strategy '{text}'"), e))
}

/// Play repeated games of one strategy
fn cmd_play(
    strategy: Option<String>,
    config_path: Option<PathBuf>,
    games: Option<u32>,
    seed: Option<u64>,
    trace: bool,
    output: Option<PathBuf>,
) {
    let mut config = match (config_path, strategy) {
        (Some(path), _) => {
            PlayConfig::load(&path).unwrap_or_else(|e| fail("Failed to load play config", e))
        }
        (None, Some(text)) => PlayConfig {
            strategy: parse_strategy(&text),
            ..PlayConfig::default()
        },
        (None, None) => fail("Missing strategy", "pass --strategy or --config"),
    };
    if let Some(games) = games {
        config.games = games;
    }
    if let Some(seed) = seed {
        config.seed = Some(seed);
    }
    if trace {
        config.trace = true;
    }
    if let Some(output) = output {
        config.output_dir = output;
    }
    if let Err(e) = config.validate() {
        fail("Invalid play config", e);
    }

    let results = run_play(&config, None).unwrap_or_else(|e| fail("Detail run failed", e));

    if config.trace {
        for record in &results.games {
            println!("{}", render_trace(record));
        }
    }
    println!("{}", render_play_summary(&results, PLAY_REPORT_GAMES));

    let path = config.output_dir.join("play_results.json");
    match results.save(&path) {
        Ok(()) => tracing::info!(path = %path.display(), "Results saved"),
        Err(e) => fail("Failed to save results", e),
    }
}

/// Evaluate and rank every strategy
fn cmd_sweep(
    config_path: Option<PathBuf>,
    games: Option<u32>,
    seed: Option<u64>,
    parallel: Option<u32>,
    output: Option<PathBuf>,
    top: Option<usize>,
) {
    let mut config = match config_path {
        Some(path) => {
            SweepConfig::load(&path).unwrap_or_else(|e| fail("Failed to load sweep config", e))
        }
        None => SweepConfig::default(),
    };
    if let Some(games) = games {
        config.repetitions = games;
    }
    if let Some(seed) = seed {
        config.seed = Some(seed);
    }
    if let Some(parallel) = parallel {
        config.parallel_workers = parallel;
    }
    if let Some(output) = output {
        config.output_dir = output;
    }
    if let Some(top) = top {
        config.top = top;
    }

    let num_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        repetitions = config.repetitions,
        parallel = config.parallel_workers,
        output = %config.output_dir.display(),
        cpus_available = num_cpus,
        "Sweep requested"
    );

    let results = run_sweep(&config, None).unwrap_or_else(|e| fail("Sweep failed", e));

    println!("{}", render_ranked_table(&results.table, Some(config.top)));
    println!("Completed in {:.2}s", results.duration_seconds);

    let path = config.output_dir.join("sweep_results.json");
    match results.save(&path) {
        Ok(()) => tracing::info!(path = %path.display(), "Results saved"),
        Err(e) => fail("Failed to save results", e),
    }
}

/// Print rankings from saved sweep results
fn cmd_analyze(input: PathBuf, top: usize, strategy: Option<String>, output: Option<PathBuf>) {
    tracing::info!(input = %input.display(), "Analyzing sweep results");

    let results = SweepResults::load(&input)
        .unwrap_or_else(|e| fail(&format!("Failed to load '{}'", input.display()), e));

    let mut report = render_ranked_table(&results.table, Some(top));
    if let Some(text) = strategy {
        report.push('\n');
        report.push_str(&render_strategy_rank(&results.table, &parse_strategy(&text)));
        report.push('\n');
    }
    println!("{report}");

    if let Some(path) = output {
        match std::fs::write(&path, &report) {
            Ok(()) => tracing::info!(path = %path.display(), "Report written"),
            Err(e) => fail("Failed to write report", e),
        }
    }
}

/// Verify determinism by running the same sweep several times
fn cmd_verify(games: u32, seed: u64, runs: u32) {
    tracing::info!(games, seed, runs, "Verifying sweep determinism");

    let config = SweepConfig::new(games).with_seed(seed);
    let report =
        verify_determinism(&config, runs).unwrap_or_else(|e| fail("Verification failed", e));

    if report.is_deterministic {
        eprintln!("PASS: All {} runs produced identical tables", report.runs());
    } else {
        if let Some(run) = report.first_mismatch() {
            eprintln!("FAIL: Run {run} diverged from run 0");
        }
        eprintln!("FAIL: Non-determinism detected!");
        std::process::exit(1);
    }
}
