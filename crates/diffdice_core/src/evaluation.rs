//! Exhaustive strategy evaluation and ranking.
//!
//! Each strategy is played on its own random stream, derived from the sweep's
//! base seed and the strategy's enumeration index. A sweep is therefore
//! reproducible from `(seed, repetitions)` alone, no matter how the work is
//! split across threads.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::batch::{run_batch, BatchConfig};
use crate::cancel::CancelToken;
use crate::dice::{entropy_seed, stream_seed};
use crate::enumerate::{StrategyEnumerator, STRATEGY_COUNT};
use crate::error::{Result, SimError};
use crate::strategy::Strategy;

/// Inputs shared by every strategy in a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepSettings {
    /// Games per strategy. Must be at least 1.
    pub repetitions: u32,
    /// Base seed. `None` draws one from entropy.
    pub seed: Option<u64>,
}

impl SweepSettings {
    /// Settings for `repetitions` games per strategy.
    pub fn new(repetitions: u32) -> Self {
        Self {
            repetitions,
            seed: None,
        }
    }

    /// Set the base seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reject settings that cannot run.
    pub fn validate(&self) -> Result<()> {
        BatchConfig::new(self.repetitions).validate()
    }

    /// The base seed to use, drawing one if none was configured.
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(entropy_seed)
    }
}

/// Summary row for one strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyEvaluation {
    /// Position of the strategy in enumeration order.
    pub index: usize,
    /// Strategy evaluated.
    pub strategy: Strategy,
    /// Mean moves per game.
    pub mean: f64,
    /// Shortest game.
    pub min: u32,
    /// Longest game.
    pub max: u32,
}

/// Evaluate one strategy on the stream for `index`.
pub fn evaluate(
    index: usize,
    strategy: &Strategy,
    repetitions: u32,
    base_seed: u64,
) -> Result<StrategyEvaluation> {
    let config = BatchConfig::new(repetitions).with_seed(stream_seed(base_seed, index as u64));
    let results = run_batch(strategy, &config)?;
    let summary = results
        .summary()
        .ok_or(SimError::InvalidRepetitionCount(0))?;

    Ok(StrategyEvaluation {
        index,
        strategy: *strategy,
        mean: summary.mean,
        min: summary.min,
        max: summary.max,
    })
}

/// Evaluate every strategy in order and rank them.
///
/// Settings are validated before any game is played. Cancellation is
/// checked before each strategy.
pub fn evaluate_all(settings: &SweepSettings, cancel: Option<&CancelToken>) -> Result<RankedTable> {
    evaluate_all_with(settings, cancel, |_| {})
}

/// [`evaluate_all`], calling `on_row` after each strategy is evaluated.
pub fn evaluate_all_with<F>(
    settings: &SweepSettings,
    cancel: Option<&CancelToken>,
    mut on_row: F,
) -> Result<RankedTable>
where
    F: FnMut(&StrategyEvaluation),
{
    settings.validate()?;
    let seed = settings.resolve_seed();
    info!(
        seed,
        repetitions = settings.repetitions,
        strategies = STRATEGY_COUNT,
        "Starting sweep"
    );

    let mut rows = Vec::with_capacity(STRATEGY_COUNT);
    for (index, strategy) in StrategyEnumerator::new().enumerate() {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(SimError::Cancelled {
                completed: index,
                total: STRATEGY_COUNT,
            });
        }
        let row = evaluate(index, &strategy, settings.repetitions, seed)?;
        on_row(&row);
        rows.push(row);
    }

    let table = RankedTable::from_evaluations(seed, settings.repetitions, rows);
    if let Some(best) = table.best() {
        info!(best = %best.strategy, mean = best.mean, "Sweep complete");
    }
    Ok(table)
}

/// Every evaluated strategy, fastest-clearing first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTable {
    /// Base seed the sweep ran with.
    pub seed: u64,
    /// Games per strategy.
    pub repetitions: u32,
    rows: Vec<StrategyEvaluation>,
}

impl RankedTable {
    /// Rank evaluations by mean moves.
    ///
    /// Rows may arrive in any order. They are first put back into
    /// enumeration order so that equal means keep a deterministic order.
    #[must_use]
    pub fn from_evaluations(
        seed: u64,
        repetitions: u32,
        mut rows: Vec<StrategyEvaluation>,
    ) -> Self {
        rows.sort_unstable_by_key(|row| row.index);
        rows.sort_by(|a, b| a.mean.total_cmp(&b.mean));
        Self {
            seed,
            repetitions,
            rows,
        }
    }

    /// Rows in rank order.
    pub fn rows(&self) -> &[StrategyEvaluation] {
        &self.rows
    }

    /// Lowest-mean strategy.
    pub fn best(&self) -> Option<&StrategyEvaluation> {
        self.rows.first()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Zero-based rank of `strategy`, if it was evaluated.
    pub fn position_of(&self, strategy: &Strategy) -> Option<usize> {
        self.rows.iter().position(|row| row.strategy == *strategy)
    }

    /// Hash of the seed, repetition count and every row in rank order.
    ///
    /// Means are hashed by bit pattern, so any numeric drift changes the hash.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        self.repetitions.hash(&mut hasher);
        for row in &self.rows {
            row.index.hash(&mut hasher);
            row.strategy.hash(&mut hasher);
            row.mean.to_bits().hash(&mut hasher);
            row.min.hash(&mut hasher);
            row.max.hash(&mut hasher);
        }
        hasher.finish()
    }
}
