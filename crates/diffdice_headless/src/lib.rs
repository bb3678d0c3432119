//! Headless strategy runner for the dice-differences game.
//!
//! This crate drives the engine in `diffdice_core` from the command line:
//!
//! - **Sweeps**: every valid strategy, evaluated in parallel and ranked
//! - **Detail runs**: repeated games of one strategy, with optional traces
//! - **Verification**: the same sweep run repeatedly must hash identically
//!
//! Results are written as JSON, configuration is read from RON or flags,
//! and logs go to stderr.
//!
//! # Example
//!
//! ```bash
//! # Rank all 462 strategies over 1000 games each
//! cargo run -p diffdice_headless -- sweep --games 1000 --seed 42
//!
//! # Play one strategy with move traces
//! cargo run -p diffdice_headless -- play --strategy "{0:1, 1:1, 2:1, 3:1, 4:1, 5:1}" --trace
//!
//! # Re-render a saved sweep
//! cargo run -p diffdice_headless -- analyze --input results/sweep_results.json --top 10
//! ```

pub mod config;
pub mod play;
pub mod report;
pub mod sweep;
pub mod verify;

pub use config::{ConfigError, PlayConfig, SweepConfig};
pub use play::{run_play, GameRecord, PlayResults};
pub use report::{render_play_summary, render_ranked_table, render_strategy_rank, render_trace};
pub use sweep::{run_sweep, run_sweep_with, Execution, SweepError, SweepProgress, SweepResults};
pub use verify::{verify_determinism, VerifyReport, MIN_RUNS};
