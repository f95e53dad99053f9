//! Run scores for position evaluation
//!
//! A run is the contiguous same-color sequence through a candidate cell
//! along one axis; its score depends on length and how many ends are open.

/// Scoring table for runs
pub struct PatternScore;

impl PatternScore {
    /// Five or more - immediate win
    pub const FIVE: i32 = 1_000_000;
    /// Open four: _OOOO_
    pub const OPEN_FOUR: i32 = 100_000;
    /// Closed four: XOOOO_ or _OOOOX
    pub const CLOSED_FOUR: i32 = 10_000;
    /// Open three: _OOO_
    pub const OPEN_THREE: i32 = 1_000;
    /// Closed three: XOOO_ or _OOOX
    pub const CLOSED_THREE: i32 = 100;
    /// Open two: _OO_
    pub const OPEN_TWO: i32 = 10;
    /// Closed two: XOO_ or _OOX
    pub const CLOSED_TWO: i32 = 5;
    /// Lone stone
    pub const SINGLE: i32 = 1;
}

/// Map a run length and its open-end count (0..=2) to a score.
/// Dead runs of two to four (both ends blocked) are worth nothing.
pub fn run_score(count: u32, open_ends: u32) -> i32 {
    match (count, open_ends) {
        (c, _) if c >= 5 => PatternScore::FIVE,
        (4, 2) => PatternScore::OPEN_FOUR,
        (4, 1) => PatternScore::CLOSED_FOUR,
        (3, 2) => PatternScore::OPEN_THREE,
        (3, 1) => PatternScore::CLOSED_THREE,
        (2, 2) => PatternScore::OPEN_TWO,
        (2, 1) => PatternScore::CLOSED_TWO,
        (1, _) => PatternScore::SINGLE,
        _ => 0,
    }
}
