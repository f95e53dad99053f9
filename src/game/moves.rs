//! Per-player move bookkeeping

use serde::Serialize;

use crate::board::{Player, Pos};
use crate::items::ItemType;

/// Move counters for one player.
///
/// `current_extra_moves == extra_moves_earned - extra_moves_used` must hold
/// whenever the engine is observed; [`MoveCounts::repair`] restores it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MoveCounts {
    /// Turns completed through normal turn order
    pub original_move_count: u32,
    pub extra_moves_earned: u32,
    pub extra_moves_used: u32,
    /// Bonus moves still banked
    pub current_extra_moves: u32,
}

impl MoveCounts {
    pub fn grant_extra(&mut self) {
        self.extra_moves_earned += 1;
        self.current_extra_moves += 1;
    }

    /// Spend one banked move; false if none left
    pub fn consume_extra(&mut self) -> bool {
        if self.current_extra_moves == 0 {
            return false;
        }
        self.current_extra_moves -= 1;
        self.extra_moves_used += 1;
        true
    }

    #[inline]
    pub fn expected_extra_moves(&self) -> u32 {
        self.extra_moves_earned.saturating_sub(self.extra_moves_used)
    }

    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.current_extra_moves == self.expected_extra_moves()
    }

    /// Recompute the banked count from earned/used. Returns true if it drifted.
    pub fn repair(&mut self) -> bool {
        let expected = self.expected_extra_moves();
        if self.current_extra_moves == expected {
            return false;
        }
        self.current_extra_moves = expected;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MoveEventKind {
    NormalMove,
    ExtraMove,
    ItemTrigger(ItemType),
}

/// One entry in the chronological move/event log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveEvent {
    /// Ordering key
    pub seq: u64,
    pub player: Player,
    pub kind: MoveEventKind,
    /// Placement cell; `None` for item triggers
    pub pos: Option<Pos>,
}
