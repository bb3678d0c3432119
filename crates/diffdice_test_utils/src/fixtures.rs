//! Test fixtures and helpers.
//!
//! Named strategies and dice scripts for consistent testing.

use diffdice_core::dice::ScriptedDice;
use diffdice_core::strategy::Strategy;

/// All six counters on `diff`.
///
/// # Panics
///
/// Panics if `diff` is greater than 5.
#[must_use]
pub fn all_on(diff: u8) -> Strategy {
    Strategy::concentrated(diff).expect("difference must be in 0..=5")
}

/// One counter on every difference.
#[must_use]
pub fn one_each() -> Strategy {
    Strategy::one_each()
}

/// Three counters on each of two differences.
///
/// # Panics
///
/// Panics if the differences are equal or out of range.
#[must_use]
pub fn split(a: u8, b: u8) -> Strategy {
    Strategy::from_map([(i64::from(a), 3), (i64::from(b), 3)])
        .expect("split needs two distinct differences in 0..=5")
}

/// Parse a strategy literal such as `"1:2,4:4"`.
///
/// # Panics
///
/// Panics on an invalid literal.
#[must_use]
pub fn strategy(literal: &str) -> Strategy {
    literal
        .parse()
        .unwrap_or_else(|e| panic!("bad strategy literal {literal:?}: {e}"))
}

/// Differences that clear `strategy` with no misses, in difference order.
#[must_use]
pub fn perfect_differences(strategy: &Strategy) -> Vec<u8> {
    strategy
        .iter()
        .flat_map(|(diff, count)| std::iter::repeat(diff).take(usize::from(count)))
        .collect()
}

/// Dice that clear `strategy` in exactly six moves.
#[must_use]
pub fn perfect_dice(strategy: &Strategy) -> ScriptedDice {
    ScriptedDice::from_differences(&perfect_differences(strategy))
}

/// Dice whose differences are `3,0,0,2,0,0,0,0`.
///
/// Against [`all_on`]`(0)` this game lasts eight moves with two misses.
#[must_use]
pub fn zero_heavy_dice() -> ScriptedDice {
    ScriptedDice::from_differences(&[3, 0, 0, 2, 0, 0, 0, 0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_differences() {
        assert_eq!(perfect_differences(&split(1, 4)), vec![1, 1, 1, 4, 4, 4]);
        assert_eq!(perfect_differences(&one_each()), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(perfect_differences(&all_on(2)), vec![2; 6]);
    }

    #[test]
    fn test_strategy_literal() {
        assert_eq!(strategy("2:6"), all_on(2));
    }
}
