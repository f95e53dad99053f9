//! Win condition checking
//!
//! A placement wins when it completes a contiguous run of five or more
//! same-color stones along any of the four axes. The whole run is reported
//! as the winning line, not just five of it.

use crate::board::{Board, Player, Pos};

/// Direction vectors for line checking (4 directions)
pub const DIRECTIONS: [(i32, i32); 4] = [
    (0, 1),  // Horizontal
    (1, 0),  // Vertical
    (1, 1),  // Diagonal SE
    (1, -1), // Diagonal SW
];

/// Stones needed in a row to win
pub const WIN_LENGTH: usize = 5;

/// Contiguous `player` run through `pos` along one axis, ordered from the
/// negative end to the positive end. `pos` itself is always included.
fn run_through(board: &Board, pos: Pos, player: Player, dr: i32, dc: i32) -> Vec<Pos> {
    let mut line = vec![pos];

    // Extend in negative direction first
    let mut step = 1;
    while let Some(prev) = board.step(pos, -dr, -dc, step) {
        if board.get_stone(prev) != Some(player) {
            break;
        }
        line.insert(0, prev);
        step += 1;
    }

    // Extend in positive direction
    step = 1;
    while let Some(next) = board.step(pos, dr, dc, step) {
        if board.get_stone(next) != Some(player) {
            break;
        }
        line.push(next);
        step += 1;
    }

    line
}

/// Find the winning line created by a stone at `pos`.
///
/// Returns the full contiguous run (at least five positions) for the first
/// axis that has one, or `None`. The cell at `pos` must hold `player`.
pub fn find_winning_line(board: &Board, pos: Pos, player: Player) -> Option<Vec<Pos>> {
    if board.get_stone(pos) != Some(player) {
        return None;
    }
    DIRECTIONS
        .iter()
        .map(|&(dr, dc)| run_through(board, pos, player, dr, dc))
        .find(|line| line.len() >= WIN_LENGTH)
}
