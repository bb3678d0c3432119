//! Batch runner: repeated games of one strategy.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cancel::CancelToken;
use crate::dice::{entropy_seed, DiceSource, RngDice};
use crate::error::{Result, SimError};
use crate::game::{play_game, GameOutcome, Move};
use crate::stats::Summary;
use crate::strategy::Strategy;

/// Configuration for a batch of games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Games to play. Must be at least 1.
    pub repetitions: u32,
    /// Keep the move trace of every game.
    pub trace: bool,
    /// Seed for the dice. `None` draws one from entropy.
    pub seed: Option<u64>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            repetitions: 1000,
            trace: false,
            seed: None,
        }
    }
}

impl BatchConfig {
    /// Config for `repetitions` games without traces.
    pub fn new(repetitions: u32) -> Self {
        Self {
            repetitions,
            ..Default::default()
        }
    }

    /// Set the dice seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Keep per-game move traces.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Reject configurations that cannot run.
    pub fn validate(&self) -> Result<()> {
        if self.repetitions == 0 {
            return Err(SimError::InvalidRepetitionCount(0));
        }
        Ok(())
    }
}

/// Move counts from repeated games of one strategy, in play order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Strategy that was played.
    pub strategy: Strategy,
    /// Seed the dice were built from, when known.
    pub seed: Option<u64>,
    /// Moves per game, indexed by repetition.
    pub move_counts: Vec<u32>,
    /// Move traces aligned with `move_counts`, when tracing was on.
    pub traces: Option<Vec<Vec<Move>>>,
}

impl ResultSet {
    /// Number of games played.
    pub fn len(&self) -> usize {
        self.move_counts.len()
    }

    /// Whether no games were played.
    pub fn is_empty(&self) -> bool {
        self.move_counts.is_empty()
    }

    /// Mean, min and max of the move counts.
    pub fn summary(&self) -> Option<Summary> {
        Summary::from_moves(&self.move_counts)
    }

    /// Per-game outcomes in play order.
    pub fn outcomes(&self) -> impl Iterator<Item = GameOutcome> + '_ {
        self.move_counts.iter().enumerate().map(|(i, &moves)| GameOutcome {
            moves,
            trace: self.traces.as_ref().and_then(|t| t.get(i).cloned()),
        })
    }
}

/// Play `config.repetitions` games of `strategy` on seeded dice.
///
/// When the config carries no seed one is drawn from entropy and recorded
/// on the result.
pub fn run_batch(strategy: &Strategy, config: &BatchConfig) -> Result<ResultSet> {
    config.validate()?;
    let seed = config.seed.unwrap_or_else(entropy_seed);
    let mut dice = RngDice::seeded(seed);
    let mut results = run_batch_with(strategy, config, &mut dice, None)?;
    results.seed = Some(seed);
    Ok(results)
}

/// Play repeated games on caller-supplied dice.
///
/// `config.seed` is ignored. The cancel token, if any, is checked before
/// each game.
pub fn run_batch_with<D: DiceSource + ?Sized>(
    strategy: &Strategy,
    config: &BatchConfig,
    dice: &mut D,
    cancel: Option<&CancelToken>,
) -> Result<ResultSet> {
    config.validate()?;
    let total = config.repetitions as usize;
    let mut move_counts = Vec::with_capacity(total);
    let mut traces = config.trace.then(|| Vec::with_capacity(total));

    for completed in 0..total {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(SimError::Cancelled { completed, total });
        }
        let outcome = play_game(strategy, dice, config.trace);
        move_counts.push(outcome.moves);
        if let (Some(traces), Some(trace)) = (traces.as_mut(), outcome.trace) {
            traces.push(trace);
        }
    }

    debug!(
        strategy = %strategy,
        games = total,
        total_moves = move_counts.iter().map(|&m| u64::from(m)).sum::<u64>(),
        "Batch complete"
    );

    Ok(ResultSet {
        strategy: *strategy,
        seed: None,
        move_counts,
        traces,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;

    #[test]
    fn test_batch_config_default() {
        let config = BatchConfig::default();
        assert_eq!(config.repetitions, 1000);
        assert!(!config.trace);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_batch_config_builder() {
        let config = BatchConfig::new(25).with_seed(12345).with_trace(true);
        assert_eq!(config.repetitions, 25);
        assert_eq!(config.seed, Some(12345));
        assert!(config.trace);
    }

    #[test]
    fn test_zero_repetitions_rejected() {
        let err = run_batch(&Strategy::one_each(), &BatchConfig::new(0)).unwrap_err();
        assert_eq!(err, SimError::InvalidRepetitionCount(0));
    }

    #[test]
    fn test_batch_length_and_order() {
        let config = BatchConfig::new(50).with_seed(9);
        let results = run_batch(&Strategy::one_each(), &config).unwrap();
        assert_eq!(results.len(), 50);
        assert_eq!(results.seed, Some(9));
        assert!(results.traces.is_none());
        assert!(results.move_counts.iter().all(|&m| m >= 6));

        let again = run_batch(&Strategy::one_each(), &config).unwrap();
        assert_eq!(results.move_counts, again.move_counts);
    }

    #[test]
    fn test_unseeded_batch_records_seed() {
        let strategy = Strategy::concentrated(1).unwrap();
        let results = run_batch(&strategy, &BatchConfig::new(3)).unwrap();
        let seed = results.seed.unwrap();
        let replay = run_batch(&strategy, &BatchConfig::new(3).with_seed(seed)).unwrap();
        assert_eq!(results.move_counts, replay.move_counts);
    }

    #[test]
    fn test_traces_align_with_counts() {
        let config = BatchConfig::new(20).with_seed(4).with_trace(true);
        let results = run_batch(&Strategy::concentrated(3).unwrap(), &config).unwrap();
        let traces = results.traces.as_ref().unwrap();
        assert_eq!(traces.len(), 20);
        for (trace, &moves) in traces.iter().zip(&results.move_counts) {
            assert_eq!(trace.len(), moves as usize);
        }
        assert!(results.outcomes().all(|o| o.removals() == 6));
    }

    #[test]
    fn test_scripted_batch() {
        // Two games of one_each, each a perfect permutation.
        let mut dice = ScriptedDice::from_differences(&[0, 1, 2, 3, 4, 5, 5, 4, 3, 2, 1, 0]);
        let results =
            run_batch_with(&Strategy::one_each(), &BatchConfig::new(2), &mut dice, None).unwrap();
        assert_eq!(results.move_counts, vec![6, 6]);
        let summary = results.summary().unwrap();
        assert_eq!(summary.min, 6);
        assert_eq!(summary.max, 6);
    }

    /// Dice that raise cancellation once a fixed number of rolls is used.
    struct CancellingDice {
        inner: ScriptedDice,
        rolls_before_cancel: usize,
        rolled: usize,
        cancel: CancelToken,
    }

    impl DiceSource for CancellingDice {
        fn roll_pair(&mut self) -> (u8, u8) {
            self.rolled += 1;
            if self.rolled == self.rolls_before_cancel {
                self.cancel.cancel();
            }
            self.inner.roll_pair()
        }
    }

    #[test]
    fn test_cancel_mid_batch_finishes_current_game() {
        // one_each on a perfect permutation takes exactly 6 rolls per game.
        let perfect: Vec<u8> = (0..5).flat_map(|_| 0..6).collect();
        let cancel = CancelToken::new();
        let mut dice = CancellingDice {
            inner: ScriptedDice::from_differences(&perfect),
            // Raised during the third game.
            rolls_before_cancel: 14,
            rolled: 0,
            cancel: cancel.clone(),
        };
        let err = run_batch_with(
            &Strategy::one_each(),
            &BatchConfig::new(5),
            &mut dice,
            Some(&cancel),
        )
        .unwrap_err();
        assert_eq!(
            err,
            SimError::Cancelled {
                completed: 3,
                total: 5
            }
        );
        assert_eq!(dice.rolled, 18);
    }

    #[test]
    fn test_cancel_between_repetitions() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut dice = RngDice::seeded(1);
        let err = run_batch_with(
            &Strategy::one_each(),
            &BatchConfig::new(10),
            &mut dice,
            Some(&cancel),
        )
        .unwrap_err();
        assert_eq!(
            err,
            SimError::Cancelled {
                completed: 0,
                total: 10
            }
        );
    }
}
