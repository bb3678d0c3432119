//! Counter placement strategies.
//!
//! A [`Strategy`] says how many of the six counters sit on each dice
//! difference. It can only be built through validating constructors, so any
//! `Strategy` value always holds exactly [`BUDGET`] counters.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Number of difference buckets (`|d1 - d2|` ranges over 0..=5).
pub const BUCKETS: usize = 6;

/// Total counters every strategy must place.
pub const BUDGET: u8 = 6;

/// Validated allocation of [`BUDGET`] counters across [`BUCKETS`] differences.
///
/// Serialized as a `difference -> count` map with empty buckets omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<i64, i64>", into = "BTreeMap<u8, u8>")]
pub struct Strategy {
    counts: [u8; BUCKETS],
}

impl Strategy {
    /// Build from one count per difference, in difference order.
    pub fn from_counts(counts: &[i64]) -> Result<Self> {
        if counts.len() != BUCKETS {
            return Err(SimError::invalid_strategy(format!(
                "expected {BUCKETS} bucket counts, got {}",
                counts.len()
            )));
        }
        let mut buckets = [0i64; BUCKETS];
        buckets.copy_from_slice(counts);
        Self::validate(buckets)
    }

    /// Build from `(difference, count)` pairs. Missing differences count as zero.
    pub fn from_map<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (i64, i64)>,
    {
        let mut buckets = [0i64; BUCKETS];
        let mut seen = [false; BUCKETS];
        for (diff, count) in entries {
            let index = usize::try_from(diff)
                .ok()
                .filter(|&i| i < BUCKETS)
                .ok_or_else(|| {
                    SimError::invalid_strategy(format!(
                        "difference {diff} is outside 0..={}",
                        BUCKETS - 1
                    ))
                })?;
            if seen[index] {
                return Err(SimError::invalid_strategy(format!(
                    "difference {diff} given more than once"
                )));
            }
            seen[index] = true;
            buckets[index] = count;
        }
        Self::validate(buckets)
    }

    /// All counters on a single difference.
    pub fn concentrated(diff: u8) -> Result<Self> {
        Self::from_map([(i64::from(diff), i64::from(BUDGET))])
    }

    /// One counter on every difference.
    #[must_use]
    pub const fn one_each() -> Self {
        Self { counts: [1; BUCKETS] }
    }

    /// Build from counts already known to be valid (used by the enumerator).
    pub(crate) const fn from_valid(counts: [u8; BUCKETS]) -> Self {
        Self { counts }
    }

    fn validate(buckets: [i64; BUCKETS]) -> Result<Self> {
        if let Some((diff, count)) = buckets.iter().enumerate().find(|(_, &c)| c < 0) {
            return Err(SimError::invalid_strategy(format!(
                "difference {diff} has negative count {count}"
            )));
        }
        if let Some((diff, count)) = buckets
            .iter()
            .enumerate()
            .find(|(_, &c)| c > i64::from(BUDGET))
        {
            return Err(SimError::invalid_strategy(format!(
                "difference {diff} has {count} counters, more than {BUDGET}"
            )));
        }
        let total: i64 = buckets.iter().sum();
        if total != i64::from(BUDGET) {
            return Err(SimError::invalid_strategy(format!(
                "counts sum to {total}, expected {BUDGET}"
            )));
        }
        // Every count is now in 0..=BUDGET, so the narrowing is lossless.
        let counts = buckets.map(|c| c as u8);
        Ok(Self { counts })
    }

    /// Counts indexed by difference.
    pub const fn counts(&self) -> [u8; BUCKETS] {
        self.counts
    }

    /// Counters placed on `diff` (zero for differences outside 0..=5).
    pub fn count(&self, diff: u8) -> u8 {
        self.counts.get(usize::from(diff)).copied().unwrap_or(0)
    }

    /// Number of distinct differences holding at least one counter.
    pub fn covered(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Non-empty `(difference, count)` buckets in difference order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .map(|(d, &c)| (d as u8, c))
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (diff, count)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{diff}:{count}")?;
        }
        write!(f, "}}")
    }
}

impl FromStr for Strategy {
    type Err = SimError;

    /// Accepts `0:1,3:5` (braces and spaces optional) or six plain counts
    /// such as `1,0,0,5,0,0`.
    fn from_str(s: &str) -> Result<Self> {
        let body = s.trim().trim_start_matches('{').trim_end_matches('}').trim();
        let parse = |token: &str| {
            token.trim().parse::<i64>().map_err(|_| {
                SimError::invalid_strategy(format!("'{}' is not an integer", token.trim()))
            })
        };
        let tokens = body.split(',').filter(|t| !t.trim().is_empty());

        if body.contains(':') {
            let pairs = tokens
                .map(|token| {
                    let (diff, count) = token.split_once(':').ok_or_else(|| {
                        SimError::invalid_strategy(format!(
                            "'{}' is not a difference:count pair",
                            token.trim()
                        ))
                    })?;
                    Ok((parse(diff)?, parse(count)?))
                })
                .collect::<Result<Vec<_>>>()?;
            Self::from_map(pairs)
        } else {
            let counts = tokens.map(parse).collect::<Result<Vec<_>>>()?;
            Self::from_counts(&counts)
        }
    }
}

impl TryFrom<BTreeMap<i64, i64>> for Strategy {
    type Error = SimError;

    fn try_from(map: BTreeMap<i64, i64>) -> Result<Self> {
        Self::from_map(map)
    }
}

impl From<Strategy> for BTreeMap<u8, u8> {
    fn from(strategy: Strategy) -> Self {
        strategy.iter().collect()
    }
}
