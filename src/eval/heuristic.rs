//! Single-ply position heuristic
//!
//! Scores one empty cell for a player by looking at the runs that a stone
//! there would extend, for both colors. Offense and defense are weighted the
//! same, so a cell that blocks an opponent's four scores as high as one that
//! makes our own four. A small center-proximity term breaks ties toward the
//! middle of the board early in the game.
//!
//! Used by the AI opponent and by the Strategy Guide item.

use crate::board::{Board, Player, Pos};
use crate::rules::DIRECTIONS;

use super::patterns::run_score;

/// Center bonus is `(CENTER_REACH - manhattan_distance) * CENTER_WEIGHT`.
/// Goes negative far from the center.
const CENTER_REACH: i32 = 10;
const CENTER_WEIGHT: i32 = 2;

/// Length and open ends of the `player` run a stone at `pos` would sit in.
/// The candidate cell counts as one stone regardless of its contents.
fn measure_run(board: &Board, pos: Pos, player: Player, dr: i32, dc: i32) -> (u32, u32) {
    let mut count = 1u32;
    let mut open_ends = 0u32;

    for sign in [1, -1] {
        let mut step = 1;
        loop {
            match board.step(pos, dr * sign, dc * sign, step) {
                Some(p) if board.get_stone(p) == Some(player) => {
                    count += 1;
                    step += 1;
                }
                Some(p) => {
                    if board.get_stone(p).is_none() {
                        open_ends += 1;
                    }
                    break;
                }
                None => break,
            }
        }
    }

    (count, open_ends)
}

/// Center-proximity term for a cell
#[inline]
pub fn center_bonus(board: &Board, pos: Pos) -> i32 {
    (CENTER_REACH - pos.manhattan(board.size().center())) * CENTER_WEIGHT
}

/// Score a candidate cell for `player`.
///
/// Sums, over the four axes, the run score for `player` and for the
/// opponent at this cell, plus the center bonus.
#[must_use]
pub fn evaluate_position(board: &Board, pos: Pos, player: Player) -> i32 {
    let opponent = player.opponent();
    let mut score = 0;

    for &(dr, dc) in &DIRECTIONS {
        let (count, open) = measure_run(board, pos, player, dr, dc);
        score += run_score(count, open);

        let (count, open) = measure_run(board, pos, opponent, dr, dc);
        score += run_score(count, open);
    }

    score + center_bonus(board, pos)
}

/// Highest-scoring cell for `player`.
///
/// Candidates are `allowed` when given (a slip-penalty restriction), else
/// every empty cell. Ties go to the first cell in row-major order.
pub fn best_position(board: &Board, player: Player, allowed: Option<&[Pos]>) -> Option<Pos> {
    let mut candidates: Vec<Pos> = match allowed {
        Some(cells) => cells.iter().copied().filter(|&p| board.is_empty(p)).collect(),
        None => board.empty_cells(),
    };
    candidates.sort();

    let mut best: Option<(Pos, i32)> = None;
    for pos in candidates {
        let score = evaluate_position(board, pos, player);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((pos, score));
        }
    }
    best.map(|(pos, _)| pos)
}

/// The `n` best empty cells for `player`, best first; ties keep row-major order.
pub fn top_positions(board: &Board, player: Player, n: usize) -> Vec<Pos> {
    let mut scored: Vec<(Pos, i32)> = board
        .empty_cells()
        .into_iter()
        .map(|pos| (pos, evaluate_position(board, pos, player)))
        .collect();
    // Stable sort keeps row-major order among equal scores
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.into_iter().take(n).map(|(pos, _)| pos).collect()
}
