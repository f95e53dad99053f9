//! Game state machine types

use std::time::Duration;

use serde::Serialize;

use crate::board::{Player, Pos};
use crate::items::ItemType;

/// Top-level lifecycle: `Ready -> Playing -> {Paused <-> Playing, Over}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameState {
    Ready,
    Playing,
    Paused,
    Over,
}

/// Interaction sub-state while playing. Exactly one is active.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SubState {
    Normal,
    /// A human triggered Precise Strike and must pick an opponent stone.
    /// The next submitted position is a target, not a placement.
    SelectingStrikeTarget {
        triggered_by: Player,
        had_extra_move: bool,
    },
    /// Name of the item just opened, shown until `until` on the game clock
    ShowingItemName { item: ItemType, until: Duration },
    /// Recommended cells, cleared by the next placement
    ShowingStrategyGuide { positions: Vec<Pos> },
    /// The current player may only play one of `allowed`
    HandSlipPenalty { allowed: Vec<Pos> },
}

impl SubState {
    /// Sub-states that need a player action before the turn can end
    #[inline]
    pub fn requires_interaction(&self) -> bool {
        matches!(self, SubState::SelectingStrikeTarget { .. })
    }
}

/// Effects an item queues for the other side, applied once when the turn
/// next passes to `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingEffect {
    pub target: Player,
    pub kind: PendingKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PendingKind {
    OpponentAcceleration,
    SlipPenalty,
}

/// An item as it applies to a player: an entry in the item log, or a live
/// continuous effect such as Toughen Heart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayerItem {
    pub item: ItemType,
    pub player: Player,
    /// Game clock when triggered
    pub acquired_at: Duration,
}

/// Finished game. `winner == None` is a draw with an empty line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameResult {
    pub winner: Option<Player>,
    /// Full contiguous winning run, ordered along its axis
    pub winning_line: Vec<Pos>,
}

impl GameResult {
    pub fn win(winner: Player, winning_line: Vec<Pos>) -> Self {
        Self {
            winner: Some(winner),
            winning_line,
        }
    }

    pub fn draw() -> Self {
        Self {
            winner: None,
            winning_line: Vec::new(),
        }
    }

    #[inline]
    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }
}

/// What an accepted submission did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// A stone was placed
    Placed { pos: Pos, player: Player },
    /// The submission picked a Precise Strike target; no stone was placed
    StrikeResolved(StrikeResolution),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeResolution {
    Removed(Pos),
    /// Absorbed by the target's Toughen Heart
    Blocked,
}

/// Transient message with an expiry on the game clock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub text: String,
    pub until: Duration,
}
