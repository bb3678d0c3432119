//! Plain-text reports for sweeps and detail runs.

use diffdice_core::evaluation::RankedTable;
use diffdice_core::strategy::Strategy;

use crate::play::{GameRecord, PlayResults};

/// Render the ranked table, best row first and marked with `*`.
///
/// `top` limits the rows shown; `None` shows every row.
pub fn render_ranked_table(table: &RankedTable, top: Option<usize>) -> String {
    let shown = top.unwrap_or(table.len()).min(table.len());
    let mut out = String::new();

    out.push_str(&format!(
        "  {:>4}  {:<34} {:>9} {:>5} {:>5}\n",
        "Rank", "Strategy", "Mean", "Min", "Max"
    ));
    out.push_str(&format!("  {}\n", "-".repeat(61)));
    for (rank, row) in table.rows().iter().take(shown).enumerate() {
        let marker = if rank == 0 { '*' } else { ' ' };
        out.push_str(&format!(
            "{marker} {:>4}  {:<34} {:>9.3} {:>5} {:>5}\n",
            rank + 1,
            row.strategy.to_string(),
            row.mean,
            row.min,
            row.max
        ));
    }
    out.push_str(&format!(
        "\nShowing {shown} of {} strategies ({} games each, seed {})\n",
        table.len(),
        table.repetitions,
        table.seed
    ));
    out
}

/// Describe where `strategy` landed in the table.
pub fn render_strategy_rank(table: &RankedTable, strategy: &Strategy) -> String {
    match table.position_of(strategy) {
        Some(position) => {
            let row = table.rows()[position];
            format!(
                "{strategy} ranked {} of {}: mean {:.3}, min {}, max {}",
                position + 1,
                table.len(),
                row.mean,
                row.min,
                row.max
            )
        }
        None => format!("{strategy} was not evaluated"),
    }
}

/// One line per move of a traced game.
pub fn render_trace(record: &GameRecord) -> String {
    let mut out = String::new();
    out.push_str(&format!("Game {}: {} moves\n", record.game, record.moves));
    for (i, m) in record.trace.iter().flatten().enumerate() {
        let outcome = if m.removed {
            "Counter removed"
        } else {
            "No counter removed"
        };
        out.push_str(&format!(
            "Move {}: Die1={}, Die2={}, Difference={} -> {outcome}\n",
            i + 1,
            m.die1,
            m.die2,
            m.difference
        ));
    }
    out
}

/// Per-game move counts followed by the summary, as two separate blocks.
pub fn render_play_summary(results: &PlayResults, max_games: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("Strategy {} (seed {})\n", results.strategy, results.seed));
    out.push_str(&format!("\n  {:>6} {:>11}\n", "Game", "Total Moves"));
    for record in results.games.iter().take(max_games) {
        out.push_str(&format!("  {:>6} {:>11}\n", record.game, record.moves));
    }
    if results.games.len() > max_games {
        out.push_str(&format!(
            "  ... and {} more games\n",
            results.games.len() - max_games
        ));
    }

    let s = &results.summary;
    out.push_str(&format!("\nGames:         {}\n", s.games));
    out.push_str(&format!("Average moves: {:.3}\n", s.mean));
    out.push_str(&format!("Min moves:     {}\n", s.min));
    out.push_str(&format!("Max moves:     {}\n", s.max));
    out.push_str(&format!("Std dev:       {:.3}\n", s.std_dev));
    out
}
