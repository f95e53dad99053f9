//! Board structure with move stack for undo

use super::bitboard::Bitboard;
use super::{BoardSize, Move, Player, Pos};

/// Game board: per-color occupancy plus the stack of placed moves
#[derive(Debug, Clone)]
pub struct Board {
    size: BoardSize,
    /// Black stones bitboard
    black: Bitboard,
    /// White stones bitboard
    white: Bitboard,
    /// Placed moves, oldest first
    moves: Vec<Move>,
    /// Next move timestamp
    clock: u64,
}

impl Board {
    pub fn new(size: BoardSize) -> Self {
        Self {
            size,
            black: Bitboard::new(),
            white: Bitboard::new(),
            moves: Vec::with_capacity(size.cells()),
            clock: 0,
        }
    }

    #[inline]
    pub fn size(&self) -> BoardSize {
        self.size
    }

    /// Lines per side
    #[inline]
    pub fn side(&self) -> usize {
        self.size.side()
    }

    #[inline]
    fn index(&self, pos: Pos) -> usize {
        pos.row as usize * self.side() + pos.col as usize
    }

    #[inline]
    fn pos_at(&self, idx: usize) -> Pos {
        Pos::new((idx / self.side()) as u8, (idx % self.side()) as u8)
    }

    /// Bounds check only
    #[inline]
    pub fn is_valid_position(&self, pos: Pos) -> bool {
        (pos.row as usize) < self.side() && (pos.col as usize) < self.side()
    }

    /// Step from `pos` along a direction, staying on this board
    #[inline]
    pub fn step(&self, pos: Pos, dr: i32, dc: i32, steps: i32) -> Option<Pos> {
        pos.offset(dr, dc, steps).filter(|&p| self.is_valid_position(p))
    }

    /// True only for an in-bounds, unoccupied cell
    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        self.is_valid_position(pos) && self.get_stone(pos).is_none()
    }

    /// Get stone at position (`None` for empty or out of bounds)
    #[inline]
    pub fn get_stone(&self, pos: Pos) -> Option<Player> {
        if !self.is_valid_position(pos) {
            return None;
        }
        let idx = self.index(pos);
        if self.black.get(idx) {
            Some(Player::Black)
        } else if self.white.get(idx) {
            Some(Player::White)
        } else {
            None
        }
    }

    fn stones_mut(&mut self, player: Player) -> &mut Bitboard {
        match player {
            Player::Black => &mut self.black,
            Player::White => &mut self.white,
        }
    }

    /// Place a stone and push it on the move stack.
    /// Fails if the cell is occupied or out of bounds.
    pub fn place_stone(&mut self, pos: Pos, player: Player) -> bool {
        if !self.is_empty(pos) {
            return false;
        }
        let idx = self.index(pos);
        self.stones_mut(player).set(idx);
        self.moves.push(Move {
            pos,
            player,
            timestamp: self.clock,
        });
        self.clock += 1;
        true
    }

    /// Clear a cell without touching the move stack.
    /// Fails if the cell is already empty or out of bounds.
    pub fn remove_stone(&mut self, pos: Pos) -> bool {
        if !self.is_valid_position(pos) || self.get_stone(pos).is_none() {
            return false;
        }
        let idx = self.index(pos);
        self.black.clear(idx);
        self.white.clear(idx);
        true
    }

    /// Drop the most recent stack entry for `pos` without touching the grid.
    /// Paired with `remove_stone` when a stone is taken off by an item so
    /// that undo never targets a cell that no longer holds its stone.
    pub fn excise_move(&mut self, pos: Pos) -> Option<Move> {
        let at = self.moves.iter().rposition(|m| m.pos == pos)?;
        Some(self.moves.remove(at))
    }

    /// Pop the last stacked move and clear its cell.
    /// The cell is only cleared if it still holds that move's stone.
    pub fn undo_move(&mut self) -> Option<Move> {
        let last = self.moves.pop()?;
        if self.get_stone(last.pos) == Some(last.player) {
            let idx = self.index(last.pos);
            self.stones_mut(last.player).clear(idx);
        }
        Some(last)
    }

    /// Clear grid and stack; size unchanged
    pub fn reset(&mut self) {
        self.black = Bitboard::new();
        self.white = Bitboard::new();
        self.moves.clear();
        self.clock = 0;
    }

    /// Move stack, oldest first
    #[inline]
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    #[inline]
    pub fn last_move(&self) -> Option<&Move> {
        self.moves.last()
    }

    /// Positions holding `player`'s stones, row-major
    pub fn stones(&self, player: Player) -> Vec<Pos> {
        let bb = match player {
            Player::Black => &self.black,
            Player::White => &self.white,
        };
        bb.iter_ones().map(|idx| self.pos_at(idx)).collect()
    }

    /// Number of `player`'s stones on the board
    #[inline]
    pub fn stone_count(&self, player: Player) -> u32 {
        match player {
            Player::Black => self.black.count(),
            Player::White => self.white.count(),
        }
    }

    /// Total stones on board
    #[inline]
    pub fn total_stones(&self) -> u32 {
        self.black.count() + self.white.count()
    }

    /// Every empty cell, row-major
    pub fn empty_cells(&self) -> Vec<Pos> {
        (0..self.size.cells())
            .filter(|&idx| !self.black.get(idx) && !self.white.get(idx))
            .map(|idx| self.pos_at(idx))
            .collect()
    }

    /// No empty cell remains
    #[inline]
    pub fn is_full(&self) -> bool {
        self.total_stones() as usize >= self.size.cells()
    }

    /// Check if board is empty
    #[inline]
    pub fn is_board_empty(&self) -> bool {
        self.black.is_empty() && self.white.is_empty()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BoardSize::default())
    }
}
