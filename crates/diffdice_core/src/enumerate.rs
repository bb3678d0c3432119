//! Exhaustive strategy enumeration.
//!
//! Strategies are weak compositions of [`BUDGET`] into [`BUCKETS`] parts.
//! They are generated directly, one successor at a time, in lexicographic
//! order of the count tuple: `[0,0,0,0,0,6]` first and `[6,0,0,0,0,0]` last.

use std::iter::FusedIterator;

use crate::strategy::{Strategy, BUCKETS, BUDGET};

const fn binomial(n: usize, k: usize) -> usize {
    let mut result = 1;
    let mut i = 0;
    while i < k {
        result = result * (n - i) / (i + 1);
        i += 1;
    }
    result
}

/// Number of valid strategies: C(BUDGET + BUCKETS - 1, BUCKETS - 1) = 462.
pub const STRATEGY_COUNT: usize = binomial(BUDGET as usize + BUCKETS - 1, BUCKETS - 1);

/// Iterator over every valid [`Strategy`] in a fixed order.
#[derive(Debug, Clone)]
pub struct StrategyEnumerator {
    next: Option<[u8; BUCKETS]>,
    remaining: usize,
}

impl Default for StrategyEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

impl StrategyEnumerator {
    /// Start from the lexicographically smallest strategy.
    #[must_use]
    pub fn new() -> Self {
        let mut first = [0; BUCKETS];
        first[BUCKETS - 1] = BUDGET;
        Self {
            next: Some(first),
            remaining: STRATEGY_COUNT,
        }
    }

    /// Lexicographic successor, or `None` once every counter sits in bucket 0.
    fn successor(counts: [u8; BUCKETS]) -> Option<[u8; BUCKETS]> {
        // Rightmost non-empty bucket that has a bucket to its left.
        let k = (1..BUCKETS).rev().find(|&k| counts[k] > 0)?;
        let moved = counts[k];
        let mut next = counts;
        next[k - 1] += 1;
        next[k] = 0;
        next[BUCKETS - 1] = moved - 1;
        Some(next)
    }
}

impl Iterator for StrategyEnumerator {
    type Item = Strategy;

    fn next(&mut self) -> Option<Strategy> {
        let current = self.next?;
        self.next = Self::successor(current);
        self.remaining -= 1;
        Some(Strategy::from_valid(current))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for StrategyEnumerator {}

impl FusedIterator for StrategyEnumerator {}

/// Every valid strategy in enumeration order.
#[must_use]
pub fn all_strategies() -> Vec<Strategy> {
    StrategyEnumerator::new().collect()
}
