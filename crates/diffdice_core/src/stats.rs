//! Move-count summaries.

use serde::{Deserialize, Serialize};

/// Summary statistics over a set of game lengths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Games summarised.
    pub games: usize,
    /// Mean moves per game.
    pub mean: f64,
    /// Shortest game.
    pub min: u32,
    /// Longest game.
    pub max: u32,
    /// Population standard deviation of moves per game.
    pub std_dev: f64,
}

impl Summary {
    /// Summarise move counts. `None` for an empty slice.
    #[must_use]
    pub fn from_moves(moves: &[u32]) -> Option<Self> {
        let min = *moves.iter().min()?;
        let max = *moves.iter().max()?;
        let games = moves.len();

        let total: u64 = moves.iter().map(|&m| u64::from(m)).sum();
        let mean = total as f64 / games as f64;
        let variance = moves
            .iter()
            .map(|&m| {
                let delta = f64::from(m) - mean;
                delta * delta
            })
            .sum::<f64>()
            / games as f64;

        Some(Self {
            games,
            mean,
            min,
            max,
            std_dev: variance.sqrt(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_has_no_summary() {
        assert!(Summary::from_moves(&[]).is_none());
    }

    #[test]
    fn test_single_game_collapses() {
        let s = Summary::from_moves(&[13]).unwrap();
        assert_eq!(s.games, 1);
        assert_eq!(s.min, 13);
        assert_eq!(s.max, 13);
        assert!((s.mean - 13.0).abs() < f64::EPSILON);
        assert!(s.std_dev.abs() < f64::EPSILON);
    }

    #[test]
    fn test_basic_stats() {
        let s = Summary::from_moves(&[6, 10, 8, 12]).unwrap();
        assert_eq!(s.min, 6);
        assert_eq!(s.max, 12);
        assert!((s.mean - 9.0).abs() < 1e-9);
        assert!((s.std_dev - 5.0f64.sqrt()).abs() < 1e-9);
    }
}
