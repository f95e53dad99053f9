//! Item effects
//!
//! Effects fire for the player whose stone landed on a blind box. Removal
//! attacks (Chaos Strike, Precise Strike, Self Mistake) can be absorbed by
//! the victim's Toughen Heart, which is used up by the block.

use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::board::{Player, Pos};
use crate::eval::top_positions;
use crate::items::ItemType;

use super::engine::{slot, GameEngine, ITEM_NAME_DISPLAY};
use super::error::MoveError;
use super::moves::MoveEventKind;
use super::state::{MoveOutcome, PendingEffect, PendingKind, PlayerItem, StrikeResolution, SubState};

/// Cells recommended by the Strategy Guide
pub const GUIDE_POSITIONS: usize = 3;

impl GameEngine {
    /// Open the unopened box at `pos`, if any, and run its effect for `player`.
    /// Unless the effect moved the sub-state elsewhere, the item name is
    /// shown for [`ITEM_NAME_DISPLAY`].
    pub(super) fn open_blind_box_at(&mut self, pos: Pos, player: Player) {
        let Some(idx) = self.unopened_box_at(pos) else {
            return;
        };
        self.blind_boxes[idx].opened = true;
        let item = self.blind_boxes[idx].item;
        self.last_item_used = Some(item);
        info!(%pos, ?player, ?item, "blind box opened");

        self.trigger_item(player, item);

        if matches!(
            self.sub_state,
            SubState::Normal | SubState::ShowingItemName { .. }
        ) {
            self.sub_state = SubState::ShowingItemName {
                item,
                until: self.now + ITEM_NAME_DISPLAY,
            };
        }
    }

    /// Apply `item`'s effect as if `player` had opened it
    pub fn trigger_item(&mut self, player: Player, item: ItemType) {
        self.item_log.push(PlayerItem {
            item,
            player,
            acquired_at: self.now,
        });
        self.log_event(player, MoveEventKind::ItemTrigger(item), None);

        match item {
            ItemType::ChaosStrike => {
                self.random_strike(player.opponent(), item);
            }
            ItemType::PreciseStrike => {
                let target = player.opponent();
                if self.is_ai_controlled(player) {
                    self.random_strike(target, item);
                } else if self.board.stone_count(target) == 0 {
                    self.show_notification(format!("{} has no stone to strike", target.name()));
                } else {
                    let had_extra_move = self.move_counts(player).current_extra_moves > 0;
                    self.sub_state = SubState::SelectingStrikeTarget {
                        triggered_by: player,
                        had_extra_move,
                    };
                    debug!(?player, had_extra_move, "selecting strike target");
                }
            }
            ItemType::AcceleratedMove => self.grant_extra_move(player),
            ItemType::StrategyGuide => {
                self.grant_extra_move(player);
                if !self.is_ai_controlled(player) {
                    let positions = top_positions(&self.board, player, GUIDE_POSITIONS);
                    debug!(?player, ?positions, "strategy guide");
                    self.sub_state = SubState::ShowingStrategyGuide { positions };
                }
            }
            ItemType::ToughenHeart => {
                self.active_effects.push(PlayerItem {
                    item,
                    player,
                    acquired_at: self.now,
                });
            }
            ItemType::SelfMistake => {
                self.random_strike(player, item);
            }
            ItemType::OpponentAcceleration => self.queue_for_opponent(player, PendingKind::OpponentAcceleration),
            ItemType::SlipPenalty => self.queue_for_opponent(player, PendingKind::SlipPenalty),
        }
    }

    fn grant_extra_move(&mut self, player: Player) {
        self.move_counts[slot(player)].grant_extra();
        self.verify_move_counts();
    }

    fn queue_for_opponent(&mut self, player: Player, kind: PendingKind) {
        self.pending_effects.push(PendingEffect {
            target: player.opponent(),
            kind,
        });
    }

    /// Consume `victim`'s Toughen Heart against a removal attack.
    /// Returns true if the attack was blocked.
    pub(super) fn absorb_attack(&mut self, victim: Player, attack: ItemType) -> bool {
        if !attack.is_removal_attack() {
            return false;
        }
        let Some(idx) = self
            .active_effects
            .iter()
            .position(|e| e.player == victim && e.item == ItemType::ToughenHeart)
        else {
            return false;
        };
        self.active_effects.remove(idx);
        info!(?victim, ?attack, "toughen heart blocked attack");
        self.show_notification(format!(
            "{}'s Toughen Heart blocked {}",
            victim.name(),
            attack.name()
        ));
        true
    }

    /// Remove one random stone of `victim`, unless they have no stones or
    /// their Toughen Heart absorbs the attack.
    fn random_strike(&mut self, victim: Player, attack: ItemType) -> Option<StrikeResolution> {
        let stones = self.board.stones(victim);
        if stones.is_empty() {
            return None;
        }
        if self.absorb_attack(victim, attack) {
            return Some(StrikeResolution::Blocked);
        }
        let &pos = stones.choose(&mut self.rng)?;
        self.strike_stone(pos);
        Some(StrikeResolution::Removed(pos))
    }

    /// Take a stone off the board and out of the undo stack
    pub(super) fn strike_stone(&mut self, pos: Pos) {
        if self.board.remove_stone(pos) {
            self.board.excise_move(pos);
            info!(%pos, "stone removed");
        }
    }

    /// Handle a submission made while choosing a Precise Strike target.
    /// Only an opponent stone is accepted; anything else leaves the
    /// selection pending.
    pub(super) fn resolve_strike_target(
        &mut self,
        pos: Pos,
        triggered_by: Player,
        had_extra_move: bool,
    ) -> Result<MoveOutcome, MoveError> {
        let target = triggered_by.opponent();
        if self.board.get_stone(pos) != Some(target) {
            return Err(MoveError::NotAStrikeTarget);
        }

        let resolution = if self.absorb_attack(target, ItemType::PreciseStrike) {
            StrikeResolution::Blocked
        } else {
            self.strike_stone(pos);
            StrikeResolution::Removed(pos)
        };
        debug!(?resolution, had_extra_move, "strike resolved");

        self.sub_state = SubState::Normal;
        self.finish_turn(triggered_by);
        self.emit_change();
        Ok(MoveOutcome::StrikeResolved(resolution))
    }
}
