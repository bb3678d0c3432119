//! # Dice Differences Core
//!
//! Strategy engine for the dice-differences elimination game.
//!
//! Six counters are placed on the six possible absolute differences of two
//! dice (0 to 5). Each move rolls both dice and removes one counter matching
//! the difference, if any. A game ends when no counters remain.
//!
//! This crate contains **only** the engine:
//! - No rendering
//! - No file IO
//! - No unseeded randomness unless the caller asks for it
//!
//! ## Crate Structure
//!
//! - [`dice`] - Dice sources (seeded, entropy, scripted)
//! - [`strategy`] - Validated counter placements
//! - [`game`] - Single-game simulator
//! - [`batch`] - Repeated games of one strategy
//! - [`enumerate`] - Every valid strategy, in a stable order
//! - [`evaluation`] - Exhaustive sweep and ranked table
//! - [`stats`] - Move-count summaries

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod batch;
pub mod cancel;
pub mod dice;
pub mod enumerate;
pub mod error;
pub mod evaluation;
pub mod game;
pub mod stats;
pub mod strategy;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::batch::{run_batch, run_batch_with, BatchConfig, ResultSet};
    pub use crate::cancel::CancelToken;
    pub use crate::dice::{difference, stream_seed, DiceSource, RngDice, ScriptedDice};
    pub use crate::enumerate::{all_strategies, StrategyEnumerator, STRATEGY_COUNT};
    pub use crate::error::{Result, SimError};
    pub use crate::evaluation::{
        evaluate, evaluate_all, evaluate_all_with, RankedTable, StrategyEvaluation, SweepSettings,
    };
    pub use crate::game::{play_game, CounterMultiset, GameOutcome, Move};
    pub use crate::stats::Summary;
    pub use crate::strategy::{Strategy, BUCKETS, BUDGET};
}
