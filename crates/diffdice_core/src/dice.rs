//! Dice sources.
//!
//! Every game draws its rolls through [`DiceSource`], so the engine can run
//! on a seeded generator, on fresh entropy, or on a fixed script of rolls
//! when a test or replay needs exact control.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::game::Move;

/// Number of faces on each die.
pub const FACES: u8 = 6;

/// Produces pairs of independent die faces in `1..=6`.
pub trait DiceSource {
    /// Roll both dice once.
    fn roll_pair(&mut self) -> (u8, u8);
}

impl<D: DiceSource + ?Sized> DiceSource for &mut D {
    fn roll_pair(&mut self) -> (u8, u8) {
        (**self).roll_pair()
    }
}

/// Absolute difference between two die faces.
#[must_use]
pub const fn difference(die1: u8, die2: u8) -> u8 {
    die1.abs_diff(die2)
}

/// Derive the seed for an independent random stream.
///
/// Parallel workers each take their own `stream` index (the strategy's
/// enumeration index in a sweep), so no two workers share a generator and
/// results do not depend on scheduling.
#[must_use]
pub const fn stream_seed(base: u64, stream: u64) -> u64 {
    // splitmix64 finaliser over the combined input
    let mut z = base ^ stream.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Draw a fresh seed from the thread-local generator.
///
/// Callers record the returned value so an unseeded run can be replayed.
#[must_use]
pub fn entropy_seed() -> u64 {
    rand::rng().random()
}

/// Dice backed by any [`Rng`].
#[derive(Debug, Clone)]
pub struct RngDice<R = SmallRng> {
    rng: R,
}

impl RngDice<SmallRng> {
    /// Deterministic dice for a given seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }

    /// Dice seeded from system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::seeded(entropy_seed())
    }
}

impl<R: Rng> RngDice<R> {
    /// Wrap an existing generator.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> DiceSource for RngDice<R> {
    fn roll_pair(&mut self) -> (u8, u8) {
        let die1 = self.rng.random_range(1..=FACES);
        let die2 = self.rng.random_range(1..=FACES);
        (die1, die2)
    }
}

/// Replays a fixed sequence of rolls.
///
/// # Panics
///
/// [`DiceSource::roll_pair`] panics once the script is exhausted. A game
/// that outlives its script was given the wrong script.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    rolls: Vec<(u8, u8)>,
    cursor: usize,
}

impl ScriptedDice {
    /// Script from explicit die pairs.
    ///
    /// # Panics
    ///
    /// Panics if any face is outside `1..=6`.
    #[must_use]
    pub fn from_pairs(rolls: Vec<(u8, u8)>) -> Self {
        for &(a, b) in &rolls {
            assert!(
                (1..=FACES).contains(&a) && (1..=FACES).contains(&b),
                "die faces must be in 1..=6, got ({a}, {b})"
            );
        }
        Self { rolls, cursor: 0 }
    }

    /// Script that yields the given differences, rolling `(1, 1 + d)`.
    ///
    /// # Panics
    ///
    /// Panics if any difference is greater than 5.
    #[must_use]
    pub fn from_differences(differences: &[u8]) -> Self {
        Self::from_pairs(differences.iter().map(|&d| (1, 1 + d)).collect())
    }

    /// Script that replays the rolls of a recorded trace.
    #[must_use]
    pub fn from_moves(moves: &[Move]) -> Self {
        Self::from_pairs(moves.iter().map(|m| (m.die1, m.die2)).collect())
    }

    /// Rolls not yet consumed.
    pub fn remaining(&self) -> usize {
        self.rolls.len() - self.cursor
    }
}

impl DiceSource for ScriptedDice {
    fn roll_pair(&mut self) -> (u8, u8) {
        let roll = *self
            .rolls
            .get(self.cursor)
            .unwrap_or_else(|| panic!("dice script exhausted after {} rolls", self.cursor));
        self.cursor += 1;
        roll
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difference_is_symmetric() {
        assert_eq!(difference(1, 6), 5);
        assert_eq!(difference(6, 1), 5);
        assert_eq!(difference(4, 4), 0);
    }

    #[test]
    fn test_seeded_dice_in_range_and_reproducible() {
        let mut a = RngDice::seeded(42);
        let mut b = RngDice::seeded(42);
        for _ in 0..1000 {
            let roll = a.roll_pair();
            assert_eq!(roll, b.roll_pair());
            assert!((1..=6).contains(&roll.0));
            assert!((1..=6).contains(&roll.1));
        }
    }

    #[test]
    fn test_seeded_dice_cover_all_faces() {
        let mut dice = RngDice::seeded(7);
        let mut seen = [false; 6];
        for _ in 0..500 {
            let (a, b) = dice.roll_pair();
            seen[usize::from(a - 1)] = true;
            seen[usize::from(b - 1)] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_stream_seeds_differ() {
        let seeds: Vec<u64> = (0..462).map(|i| stream_seed(99, i)).collect();
        let mut unique = seeds.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), seeds.len());
        assert_ne!(stream_seed(1, 0), stream_seed(2, 0));
    }

    #[test]
    fn test_scripted_differences() {
        let mut dice = ScriptedDice::from_differences(&[0, 5, 3]);
        assert_eq!(dice.roll_pair(), (1, 1));
        assert_eq!(dice.roll_pair(), (1, 6));
        assert_eq!(dice.remaining(), 1);
        assert_eq!(dice.roll_pair(), (1, 4));
        assert_eq!(dice.remaining(), 0);
    }

    #[test]
    #[should_panic(expected = "exhausted")]
    fn test_scripted_exhaustion_panics() {
        let mut dice = ScriptedDice::from_differences(&[1]);
        dice.roll_pair();
        dice.roll_pair();
    }

    #[test]
    #[should_panic(expected = "1..=6")]
    fn test_scripted_rejects_bad_face() {
        let _ = ScriptedDice::from_pairs(vec![(0, 3)]);
    }
}
