//! Single-game simulator.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::dice::{difference, DiceSource};
use crate::strategy::{Strategy, BUCKETS};

/// Counters still on the board during one game.
///
/// Counters on the same difference are interchangeable, so the multiset is
/// stored as a remaining count per difference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterMultiset {
    remaining: [u8; BUCKETS],
}

impl CounterMultiset {
    /// Place every counter of `strategy` on the board.
    #[must_use]
    pub fn new(strategy: &Strategy) -> Self {
        Self {
            remaining: strategy.counts(),
        }
    }

    /// Whether a counter on `diff` is still present.
    pub fn contains(&self, diff: u8) -> bool {
        self.remaining
            .get(usize::from(diff))
            .is_some_and(|&c| c > 0)
    }

    /// Remove one counter on `diff`. Returns false if none was present.
    pub fn remove_one(&mut self, diff: u8) -> bool {
        match self.remaining.get_mut(usize::from(diff)) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }

    /// Total counters left.
    pub fn remaining(&self) -> u32 {
        self.remaining.iter().map(|&c| u32::from(c)).sum()
    }

    /// Whether the board is clear.
    pub fn is_empty(&self) -> bool {
        self.remaining.iter().all(|&c| c == 0)
    }
}

/// One roll of both dice and what it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// First die face.
    pub die1: u8,
    /// Second die face.
    pub die2: u8,
    /// `|die1 - die2|`.
    pub difference: u8,
    /// A counter on `difference` was present and removed.
    pub removed: bool,
}

/// Result of one complete game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    /// Rolls taken until the board was clear.
    pub moves: u32,
    /// Every roll in order, when tracing was requested.
    pub trace: Option<Vec<Move>>,
}

impl GameOutcome {
    /// Iterate the recorded moves from the start.
    ///
    /// Empty when the game was played without tracing. Can be called any
    /// number of times, so a presentation layer may replay at its own pace.
    pub fn replay(&self) -> impl Iterator<Item = &Move> + '_ {
        self.trace.iter().flatten()
    }

    /// Number of moves that removed a counter.
    pub fn removals(&self) -> usize {
        self.replay().filter(|m| m.removed).count()
    }
}

/// Play one game of `strategy` to completion.
///
/// Loops until every counter is removed. There is no move ceiling: each
/// roll has a positive chance of hitting any remaining difference.
pub fn play_game<D: DiceSource + ?Sized>(
    strategy: &Strategy,
    dice: &mut D,
    keep_trace: bool,
) -> GameOutcome {
    let mut board = CounterMultiset::new(strategy);
    let mut moves = 0u32;
    let mut trace = keep_trace.then(Vec::new);

    while !board.is_empty() {
        moves += 1;
        let (die1, die2) = dice.roll_pair();
        let diff = difference(die1, die2);
        let removed = board.remove_one(diff);

        trace!(moves, die1, die2, diff, removed, "roll");

        if let Some(trace) = trace.as_mut() {
            trace.push(Move {
                die1,
                die2,
                difference: diff,
                removed,
            });
        }
    }

    GameOutcome { moves, trace }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::{RngDice, ScriptedDice};

    #[test]
    fn test_multiset_remove() {
        let strategy = Strategy::from_counts(&[2, 0, 0, 0, 0, 4]).unwrap();
        let mut board = CounterMultiset::new(&strategy);
        assert_eq!(board.remaining(), 6);
        assert!(board.contains(0));
        assert!(!board.contains(1));
        assert!(!board.contains(6));

        assert!(board.remove_one(0));
        assert!(board.remove_one(0));
        assert!(!board.remove_one(0));
        assert!(!board.remove_one(3));
        assert_eq!(board.remaining(), 4);
        assert!(!board.is_empty());
    }

    #[test]
    fn test_scripted_game_one_each() {
        let mut dice = ScriptedDice::from_differences(&[5, 3, 1, 0, 4, 2]);
        let outcome = play_game(&Strategy::one_each(), &mut dice, true);
        assert_eq!(outcome.moves, 6);
        assert!(outcome.replay().all(|m| m.removed));
        assert_eq!(dice.remaining(), 0);
    }

    #[test]
    fn test_misses_are_recorded() {
        let strategy = Strategy::concentrated(1).unwrap();
        let mut dice = ScriptedDice::from_differences(&[0, 1, 1, 2, 1, 1, 1, 1]);
        let outcome = play_game(&strategy, &mut dice, true);
        assert_eq!(outcome.moves, 8);
        assert_eq!(outcome.removals(), 6);

        let trace = outcome.trace.as_ref().unwrap();
        assert!(!trace[0].removed);
        assert!(!trace[3].removed);
        assert_eq!(trace[3].difference, 2);
    }

    #[test]
    fn test_no_trace_when_disabled() {
        let mut dice = RngDice::seeded(3);
        let outcome = play_game(&Strategy::one_each(), &mut dice, false);
        assert!(outcome.moves >= 6);
        assert!(outcome.trace.is_none());
        assert_eq!(outcome.replay().count(), 0);
    }

    #[test]
    fn test_trace_length_matches_moves() {
        let mut dice = RngDice::seeded(11);
        for diff in 0..6 {
            let strategy = Strategy::concentrated(diff).unwrap();
            let outcome = play_game(&strategy, &mut dice, true);
            assert_eq!(outcome.replay().count(), outcome.moves as usize);
            assert_eq!(outcome.removals(), 6);
            assert!(outcome.trace.unwrap().last().unwrap().removed);
        }
    }

    #[test]
    fn test_replay_reproduces_game() {
        let strategy = Strategy::from_counts(&[0, 3, 3, 0, 0, 0]).unwrap();
        let first = play_game(&strategy, &mut RngDice::seeded(5), true);
        let mut script = ScriptedDice::from_moves(first.trace.as_ref().unwrap());
        let second = play_game(&strategy, &mut script, true);
        assert_eq!(first, second);
    }
}
