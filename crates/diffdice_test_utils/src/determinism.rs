//! Determinism testing utilities.
//!
//! Provides a harness for verifying that seeded batches and sweeps
//! produce identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! A sweep must be reproducible from its base seed and repetition count.
//! Sources of non-determinism include:
//!
//! - **Shared generators**: two workers drawing from one RNG interleave
//!   differently on every run. Each strategy gets its own stream.
//!
//! - **Completion order**: parallel workers finish in any order. Rows are
//!   put back into enumeration order before ranking.
//!
//! - **Unstable sorts**: equal means must keep enumeration order.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: single games on scripted dice
//! 2. **Property tests**: random strategies still obey game invariants
//! 3. **Integration tests**: full sweeps are reproducible
//! 4. **Parallel tests**: N threads running the same batch all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use diffdice_core::batch::{run_batch, BatchConfig};
use diffdice_core::evaluation::RankedTable;
use diffdice_core::game::Move;
use diffdice_core::strategy::Strategy;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic runs).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Runs are non-deterministic!\n\
                 Runs: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run `produce` several times and compare the hashes of its output.
///
/// # Example
///
/// ```ignore
/// use diffdice_test_utils::determinism::{verify_determinism, compute_hash};
///
/// let result = verify_determinism(
///     5,
///     || run_batch(&strategy, &config).unwrap().move_counts,
///     compute_hash,
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<T, Produce, HashFn>(
    runs: usize,
    produce: Produce,
    hash: HashFn,
) -> DeterminismResult
where
    Produce: Fn() -> T,
    HashFn: Fn(&T) -> u64,
{
    let hashes: Vec<u64> = (0..runs).map(|_| hash(&produce())).collect();
    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
    }
}

/// Run a seeded batch twice and check the move counts match.
///
/// # Panics
///
/// Panics if the config is invalid or carries no seed.
pub fn verify_batch_determinism(strategy: &Strategy, config: &BatchConfig) -> bool {
    assert!(config.seed.is_some(), "determinism needs a seeded config");
    verify_determinism(
        2,
        || {
            run_batch(strategy, config)
                .expect("batch config should be valid")
                .move_counts
        },
        compute_hash,
    )
    .is_deterministic
}

/// Run the same seeded batch on `threads` scoped threads and collect hashes.
///
/// Catches hidden shared state between concurrently running batches.
///
/// # Panics
///
/// Panics if the config is invalid or a worker thread panics.
pub fn run_parallel_batches_scoped(
    strategy: &Strategy,
    config: &BatchConfig,
    threads: usize,
) -> DeterminismResult {
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                s.spawn(|| {
                    let results = run_batch(strategy, config).expect("batch config should be valid");
                    compute_hash(&results.move_counts)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("batch thread panicked"))
            .collect()
    });

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    DeterminismResult {
        is_deterministic,
        hashes,
    }
}

/// Index of the first move where two traces differ.
///
/// A trace that is a strict prefix of the other diverges at its length.
#[must_use]
pub fn find_first_divergence(a: &[Move], b: &[Move]) -> Option<usize> {
    a.iter()
        .zip(b)
        .position(|(x, y)| x != y)
        .or_else(|| (a.len() != b.len()).then(|| a.len().min(b.len())))
}

/// Hash of a ranked table's rows, seed and repetition count.
#[must_use]
pub fn table_hash(table: &RankedTable) -> u64 {
    table.state_hash()
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for engine testing.
///
/// These generate random but reproducible strategies and dice scripts.
pub mod strategies {
    use diffdice_core::strategy::{Strategy as CounterStrategy, BUCKETS, BUDGET};
    use proptest::prelude::*;

    /// Generate a valid counter strategy.
    ///
    /// Each of the six counters independently picks a difference, so every
    /// valid strategy can be produced.
    pub fn arb_strategy() -> impl Strategy<Value = CounterStrategy> {
        proptest::collection::vec(0..BUCKETS, usize::from(BUDGET)).prop_map(|placements| {
            let mut counts = [0i64; BUCKETS];
            for bucket in placements {
                counts[bucket] += 1;
            }
            CounterStrategy::from_counts(&counts).expect("six placements always sum to six")
        })
    }

    /// Generate six bucket counts that do not sum to six.
    pub fn arb_invalid_counts() -> impl Strategy<Value = Vec<i64>> {
        proptest::collection::vec(-3i64..8, BUCKETS)
            .prop_filter("counts must not sum to six", |c| c.iter().sum::<i64>() != 6)
    }

    /// Generate a dice difference in 0..=5.
    pub fn arb_difference() -> impl Strategy<Value = u8> {
        0u8..6
    }

    /// Generate a die pair.
    pub fn arb_roll() -> impl Strategy<Value = (u8, u8)> {
        (1u8..=6, 1u8..=6)
    }

    /// Generate a base seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use diffdice_core::dice::RngDice;
    use diffdice_core::game::play_game;
    use proptest::prelude::*;

    #[test]
    fn test_seeded_batch_is_deterministic() {
        let config = BatchConfig::new(100).with_seed(777);
        assert!(verify_batch_determinism(&fixtures::split(0, 5), &config));
    }

    #[test]
    fn test_parallel_batches_match() {
        let config = BatchConfig::new(200).with_seed(31337);
        let result = run_parallel_batches_scoped(&fixtures::one_each(), &config, 4);
        assert_eq!(result.hashes.len(), 4);
        result.assert_deterministic();
    }

    #[test]
    fn test_different_seeds_diverge() {
        let strategy = fixtures::one_each();
        let result = verify_determinism(
            2,
            || {
                use std::sync::atomic::{AtomicU64, Ordering};
                static SEED: AtomicU64 = AtomicU64::new(0);
                let seed = SEED.fetch_add(1, Ordering::Relaxed);
                run_batch(&strategy, &BatchConfig::new(200).with_seed(seed))
                    .unwrap()
                    .move_counts
            },
            compute_hash,
        );
        assert!(!result.is_deterministic);
        assert_eq!(result.unique_hashes().len(), 2);
    }

    #[test]
    #[should_panic(expected = "non-deterministic")]
    fn test_assert_deterministic_panics() {
        DeterminismResult {
            is_deterministic: false,
            hashes: vec![1, 2],
        }
        .assert_deterministic();
    }

    #[test]
    fn test_find_first_divergence() {
        let strategy = fixtures::all_on(1);
        let a = play_game(&strategy, &mut RngDice::seeded(1), true).trace.unwrap();
        let b = play_game(&strategy, &mut RngDice::seeded(1), true).trace.unwrap();
        assert_eq!(find_first_divergence(&a, &b), None);
        assert_eq!(find_first_divergence(&a, &a[..3]), Some(3));

        let mut c = a.clone();
        c[2].removed = !c[2].removed;
        assert_eq!(find_first_divergence(&a, &c), Some(2));
    }

    proptest! {
        /// Generated strategies are always valid.
        #[test]
        fn prop_arb_strategy_sums_to_budget(s in strategies::arb_strategy()) {
            let total: u32 = s.counts().iter().map(|&c| u32::from(c)).sum();
            prop_assert_eq!(total, 6);
        }

        /// Counts that miss the budget never validate.
        #[test]
        fn prop_invalid_counts_rejected(counts in strategies::arb_invalid_counts()) {
            prop_assert!(diffdice_core::strategy::Strategy::from_counts(&counts).is_err());
        }

        /// Any strategy and seed give a reproducible batch.
        #[test]
        fn prop_any_seed_is_deterministic(
            s in strategies::arb_strategy(),
            seed in strategies::arb_seed(),
        ) {
            let config = BatchConfig::new(5).with_seed(seed);
            prop_assert!(verify_batch_determinism(&s, &config));
        }
    }
}
