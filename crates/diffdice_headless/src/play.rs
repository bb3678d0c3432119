//! Detail runs: repeated games of one strategy.
//!
//! Produces the per-game move counts (with optional traces) and a separate
//! summary, for a single hand-picked strategy.

use std::path::Path;

use diffdice_core::batch::run_batch_with;
use diffdice_core::cancel::CancelToken;
use diffdice_core::dice::{entropy_seed, RngDice};
use diffdice_core::error::SimError;
use diffdice_core::game::Move;
use diffdice_core::stats::Summary;
use diffdice_core::strategy::Strategy;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::PlayConfig;

/// One game of a detail run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Game number, starting at 1.
    pub game: u32,
    /// Moves taken.
    pub moves: u32,
    /// Every roll, when tracing was on.
    pub trace: Option<Vec<Move>>,
}

/// Results of a detail run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayResults {
    /// Strategy played.
    pub strategy: Strategy,
    /// Dice seed used.
    pub seed: u64,
    /// Games in play order.
    pub games: Vec<GameRecord>,
    /// Mean, min and max over all games.
    pub summary: Summary,
}

impl PlayResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Play `config.games` games of `config.strategy`.
///
/// The cancel token is checked between games.
pub fn run_play(config: &PlayConfig, cancel: Option<&CancelToken>) -> Result<PlayResults, SimError> {
    config.validate()?;
    let seed = config.seed.unwrap_or_else(entropy_seed);
    info!(
        strategy = %config.strategy,
        games = config.games,
        seed,
        trace = config.trace,
        "Starting detail run"
    );

    let mut dice = RngDice::seeded(seed);
    let results = run_batch_with(&config.strategy, &config.batch_config(), &mut dice, cancel)?;
    let summary = results
        .summary()
        .ok_or(SimError::InvalidRepetitionCount(0))?;

    let games = results
        .outcomes()
        .zip(1..)
        .map(|(outcome, game)| GameRecord {
            game,
            moves: outcome.moves,
            trace: outcome.trace,
        })
        .collect();

    info!(
        mean = summary.mean,
        min = summary.min,
        max = summary.max,
        "Detail run complete"
    );

    Ok(PlayResults {
        strategy: config.strategy,
        seed,
        games,
        summary,
    })
}
