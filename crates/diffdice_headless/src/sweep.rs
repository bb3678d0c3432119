//! Parallel exhaustive sweep.
//!
//! Evaluates all 462 strategies across a rayon pool. Every strategy runs on
//! its own seeded stream and the rows are re-ranked from enumeration order,
//! so the table matches a sequential sweep with the same seed exactly.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use diffdice_core::cancel::CancelToken;
use diffdice_core::enumerate::{StrategyEnumerator, STRATEGY_COUNT};
use diffdice_core::error::SimError;
use diffdice_core::evaluation::{evaluate, evaluate_all_with, RankedTable, StrategyEvaluation};
use diffdice_core::strategy::Strategy;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::SweepConfig;

/// Error type for sweeps.
#[derive(Error, Debug)]
pub enum SweepError {
    /// Invalid input or cancellation.
    #[error(transparent)]
    Sim(#[from] SimError),
    /// Worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    /// A reproducibility check needs at least two runs to compare.
    #[error("Verification needs at least 2 runs, got {0}")]
    TooFewRuns(u32),
}

/// How the strategies are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    /// One strategy after another on the calling thread.
    Sequential,
    /// Strategies spread across a rayon pool.
    Parallel,
}

/// Progress tracking for sweeps
#[derive(Debug)]
pub struct SweepProgress {
    /// Total strategies
    pub total: usize,
    completed: AtomicUsize,
    start_time: Instant,
}

impl SweepProgress {
    /// Create new progress tracker
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a finished strategy, returning the new completion count
    pub fn record_completion(&self) -> usize {
        self.completed.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Get current completion count
    pub fn current(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    /// Get completion percentage
    pub fn percentage(&self) -> f64 {
        self.current() as f64 / self.total.max(1) as f64 * 100.0
    }

    /// Get estimated time remaining
    pub fn eta(&self) -> Duration {
        let completed = self.current();
        if completed == 0 {
            return Duration::from_secs(0);
        }

        let elapsed = self.start_time.elapsed();
        let per_strategy = elapsed.as_secs_f64() / completed as f64;
        let remaining = self.total.saturating_sub(completed);
        Duration::from_secs_f64(per_strategy * remaining as f64)
    }

    /// Log progress every tenth of the sweep
    fn report(&self, completed: usize) {
        let step = (self.total / 10).max(1);
        if completed % step == 0 || completed == self.total {
            let eta = self.eta();
            info!(
                completed,
                total = self.total,
                percent = self.percentage(),
                eta_secs = eta.as_secs(),
                "Sweep progress"
            );
        }
    }
}

/// Results from a sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepResults {
    /// Configuration used, with the resolved seed filled in
    pub config: SweepConfig,
    /// Ranked strategies
    pub table: RankedTable,
    /// Total runtime
    pub duration_seconds: f64,
}

impl SweepResults {
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

/// Run a parallel sweep.
pub fn run_sweep(
    config: &SweepConfig,
    cancel: Option<&CancelToken>,
) -> Result<SweepResults, SweepError> {
    run_sweep_with(config, cancel, Execution::Parallel)
}

/// Run a sweep with the given scheduling.
///
/// The config is validated and the seed resolved before any game is played.
pub fn run_sweep_with(
    config: &SweepConfig,
    cancel: Option<&CancelToken>,
    execution: Execution,
) -> Result<SweepResults, SweepError> {
    config.validate()?;
    let start = Instant::now();
    let seed = config.settings().resolve_seed();
    let resolved = SweepConfig {
        seed: Some(seed),
        ..config.clone()
    };

    info!(
        seed,
        repetitions = config.repetitions,
        parallel_workers = config.parallel_workers,
        execution = ?execution,
        "Sweep configuration"
    );

    let table = match execution {
        Execution::Sequential => {
            let progress = SweepProgress::new(STRATEGY_COUNT);
            evaluate_all_with(&resolved.settings(), cancel, |_| {
                progress.report(progress.record_completion());
            })?
        }
        Execution::Parallel => {
            let rows = if config.parallel_workers > 0 {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(config.parallel_workers as usize)
                    .build()?
                    .install(|| evaluate_parallel(config.repetitions, seed, cancel))
            } else {
                evaluate_parallel(config.repetitions, seed, cancel)
            }?;
            RankedTable::from_evaluations(seed, config.repetitions, rows)
        }
    };

    let duration_seconds = start.elapsed().as_secs_f64();
    info!(
        strategies = table.len(),
        duration_secs = duration_seconds,
        "Sweep complete"
    );

    Ok(SweepResults {
        config: resolved,
        table,
        duration_seconds,
    })
}

fn evaluate_parallel(
    repetitions: u32,
    seed: u64,
    cancel: Option<&CancelToken>,
) -> Result<Vec<StrategyEvaluation>, SimError> {
    let strategies: Vec<(usize, Strategy)> = StrategyEnumerator::new().enumerate().collect();
    let progress = SweepProgress::new(strategies.len());

    strategies
        .par_iter()
        .map(|(index, strategy)| {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                return Err(SimError::Cancelled {
                    completed: progress.current(),
                    total: progress.total,
                });
            }
            let row = evaluate(*index, strategy, repetitions, seed)?;
            debug!(index = *index, strategy = %strategy, mean = row.mean, "Strategy evaluated");
            progress.report(progress.record_completion());
            Ok(row)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_tracking() {
        let progress = SweepProgress::new(100);
        assert_eq!(progress.current(), 0);
        assert_eq!(progress.percentage(), 0.0);
        assert_eq!(progress.eta(), Duration::from_secs(0));

        progress.record_completion();
        progress.record_completion();
        assert_eq!(progress.record_completion(), 3);
        assert_eq!(progress.current(), 3);
        assert!((progress.percentage() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_sweep_rejects_zero_repetitions() {
        let err = run_sweep(&SweepConfig::new(0), None).unwrap_err();
        assert!(matches!(
            err,
            SweepError::Sim(SimError::InvalidRepetitionCount(0))
        ));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let config = SweepConfig::new(3).with_seed(77).with_parallel(3);
        let parallel = run_sweep_with(&config, None, Execution::Parallel).unwrap();
        let sequential = run_sweep_with(&config, None, Execution::Sequential).unwrap();
        assert_eq!(parallel.table, sequential.table);
        assert_eq!(parallel.table.len(), STRATEGY_COUNT);
    }

    #[test]
    fn test_unseeded_sweep_records_seed() {
        let results = run_sweep(&SweepConfig::new(1), None).unwrap();
        assert_eq!(results.config.seed, Some(results.table.seed));
    }

    #[test]
    fn test_cancelled_sweep() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = run_sweep(&SweepConfig::new(2).with_seed(1), Some(&cancel)).unwrap_err();
        assert!(matches!(err, SweepError::Sim(SimError::Cancelled { .. })));
    }
}
