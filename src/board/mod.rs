//! Board representation for blind-box Gomoku

pub mod bitboard;
pub mod board;


use serde::{Deserialize, Serialize};

// Re-exports
pub use bitboard::Bitboard;
pub use board::Board;

/// Largest supported board side (19x19)
pub const MAX_BOARD_SIZE: usize = 19;
pub const MAX_CELLS: usize = MAX_BOARD_SIZE * MAX_BOARD_SIZE; // 361

/// Player colors. Black always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    Black,
    White,
}

impl Player {
    /// Get opponent color
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Player::Black => "Black",
            Player::White => "White",
        }
    }
}

/// Supported board sizes, fixed when a board is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum BoardSize {
    #[default]
    Fifteen,
    Nineteen,
}

impl BoardSize {
    /// Number of lines per side
    #[inline]
    pub fn side(self) -> usize {
        match self {
            BoardSize::Fifteen => 15,
            BoardSize::Nineteen => 19,
        }
    }

    /// Total number of cells
    #[inline]
    pub fn cells(self) -> usize {
        self.side() * self.side()
    }

    /// Center intersection
    #[inline]
    pub fn center(self) -> Pos {
        let mid = (self.side() / 2) as u8;
        Pos::new(mid, mid)
    }
}

impl TryFrom<usize> for BoardSize {
    type Error = UnsupportedBoardSize;

    fn try_from(side: usize) -> Result<Self, Self::Error> {
        match side {
            15 => Ok(BoardSize::Fifteen),
            19 => Ok(BoardSize::Nineteen),
            other => Err(UnsupportedBoardSize(other)),
        }
    }
}

impl From<BoardSize> for usize {
    fn from(size: BoardSize) -> usize {
        size.side()
    }
}

/// Rejected board side length
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unsupported board size {0} (expected 15 or 19)")]
pub struct UnsupportedBoardSize(pub usize);

/// Position on the board (0-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub row: u8,
    pub col: u8,
}

impl Pos {
    #[inline]
    pub fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Step `steps` times along `(dr, dc)`; `None` if that leaves the
    /// non-negative quadrant. Upper bounds are the board's job.
    #[inline]
    pub fn offset(self, dr: i32, dc: i32, steps: i32) -> Option<Pos> {
        let r = self.row as i32 + dr * steps;
        let c = self.col as i32 + dc * steps;
        if r < 0 || c < 0 || r >= MAX_BOARD_SIZE as i32 || c >= MAX_BOARD_SIZE as i32 {
            return None;
        }
        Some(Pos::new(r as u8, c as u8))
    }

    /// Manhattan distance to another position
    #[inline]
    pub fn manhattan(self, other: Pos) -> i32 {
        (self.row as i32 - other.row as i32).abs() + (self.col as i32 - other.col as i32).abs()
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl PartialOrd for Pos {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pos {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.row, self.col).cmp(&(other.row, other.col))
    }
}

/// A placed stone as recorded on the move stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub pos: Pos,
    pub player: Player,
    /// Ordering key only
    pub timestamp: u64,
}
