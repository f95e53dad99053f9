//! Blind-box Gomoku game engine
//!
//! [`GameEngine`] owns the board, all item and turn state, and the AI
//! opponent. Everything runs on the caller's thread: the front-end submits
//! moves through [`GameEngine::make_move`] and drives the game clock with
//! [`GameEngine::advance`], which also fires the delayed AI reply.
//!
//! # Move pipeline
//!
//! 1. Reject when not playing, or when it is the AI's turn in PvE.
//! 2. While a Precise Strike target is being chosen, the position is a
//!    target selection and no stone is placed.
//! 3. Reject cells outside an active hand-slip restriction.
//! 4. Place the stone; reject occupied cells.
//! 5. Log the move (normal or extra).
//! 6. Win or draw ends the game.
//! 7. Clear a satisfied slip restriction and any strategy guide.
//! 8. Open the blind box on the cell, if any.
//! 9. Spawn a new blind box, then either spend a banked extra move or pass
//!    the turn and apply effects queued for the incoming player.
//!
//! # Example
//!
//! ```
//! use blindbox_gomoku::{GameConfig, GameEngine, GameMode, Pos, Player};
//!
//! let config = GameConfig { mode: GameMode::Pvp, enable_items: false, ..Default::default() };
//! let mut engine = GameEngine::with_seed(config, 7);
//! engine.start_new_game();
//!
//! assert!(engine.make_move(Pos::new(7, 7)));
//! assert_eq!(engine.current_player(), Player::White);
//! assert!(!engine.make_move(Pos::new(7, 7)), "occupied");
//! ```

use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::board::{Board, BoardSize, Move, Player, Pos};
use crate::eval::best_position;
use crate::items::{BlindBox, ItemSystem, ItemType};
use crate::rules::find_winning_line;

use super::config::{ConfigPatch, GameConfig, GameMode};
use super::error::MoveError;
use super::moves::{MoveCounts, MoveEvent, MoveEventKind};
use super::observer::{Observers, SubscriptionId};
use super::state::{
    GameResult, GameState, MoveOutcome, Notification, PendingEffect, PendingKind, PlayerItem,
    SubState,
};

/// Delay between the turn passing to the AI and the AI placing its stone
pub const AI_MOVE_DELAY: Duration = Duration::from_millis(500);
/// How long an opened item's name is displayed
pub const ITEM_NAME_DISPLAY: Duration = Duration::from_millis(1500);
/// How long a notification stays visible
pub const NOTIFICATION_DISPLAY: Duration = Duration::from_millis(2000);
/// Cells offered under a hand-slip penalty
pub const SLIP_CHOICES: usize = 3;

#[inline]
pub(super) fn slot(player: Player) -> usize {
    match player {
        Player::Black => 0,
        Player::White => 1,
    }
}

#[derive(Debug)]
pub struct GameEngine {
    pub(super) config: GameConfig,
    pub(super) board: Board,
    pub(super) state: GameState,
    pub(super) sub_state: SubState,
    pub(super) current_player: Player,
    pub(super) result: Option<GameResult>,
    pub(super) blind_boxes: Vec<BlindBox>,
    pub(super) last_item_used: Option<ItemType>,
    /// Live continuous effects (Toughen Heart)
    pub(super) active_effects: Vec<PlayerItem>,
    /// Every item triggered this game, oldest first
    pub(super) item_log: Vec<PlayerItem>,
    pub(super) pending_effects: Vec<PendingEffect>,
    pub(super) move_counts: [MoveCounts; 2],
    pub(super) move_events: Vec<MoveEvent>,
    /// The next placement spends a banked extra move
    pub(super) on_extra_move: bool,
    pub(super) notification: Option<Notification>,
    /// Due time of the single outstanding AI move
    pub(super) ai_due: Option<Duration>,
    /// Game clock
    pub(super) now: Duration,
    pub(super) seq: u64,
    pub(super) rng: StdRng,
    observers: Observers,
}

impl GameEngine {
    /// Create an engine in the `Ready` state, seeded from OS entropy
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create an engine with a reproducible random stream
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Self {
        Self {
            board: Board::new(config.board_size),
            config,
            state: GameState::Ready,
            sub_state: SubState::Normal,
            current_player: Player::Black,
            result: None,
            blind_boxes: Vec::new(),
            last_item_used: None,
            active_effects: Vec::new(),
            item_log: Vec::new(),
            pending_effects: Vec::new(),
            move_counts: [MoveCounts::default(); 2],
            move_events: Vec::new(),
            on_extra_move: false,
            notification: None,
            ai_due: None,
            now: Duration::ZERO,
            seq: 0,
            rng,
            observers: Observers::default(),
        }
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Throw away the current game and start a fresh one. If the AI plays
    /// Black it is scheduled to open.
    pub fn start_new_game(&mut self) {
        self.ai_due = None;
        self.board = Board::new(self.config.board_size);
        self.state = GameState::Playing;
        self.sub_state = SubState::Normal;
        self.current_player = Player::Black;
        self.result = None;
        self.blind_boxes.clear();
        self.last_item_used = None;
        self.active_effects.clear();
        self.item_log.clear();
        self.pending_effects.clear();
        self.move_counts = [MoveCounts::default(); 2];
        self.move_events.clear();
        self.on_extra_move = false;
        self.notification = None;

        info!(
            mode = ?self.config.mode,
            size = self.board.side(),
            items = self.config.enable_items,
            "new game"
        );

        self.spawn_blind_box();
        self.maybe_schedule_ai();
        self.emit_change();
    }

    pub fn restart(&mut self) {
        self.start_new_game();
    }

    /// Pause a running game. Returns false if not playing.
    pub fn pause(&mut self) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        self.state = GameState::Paused;
        debug!("paused");
        self.emit_change();
        true
    }

    /// Resume a paused game. Returns false if not paused.
    pub fn resume(&mut self) -> bool {
        if self.state != GameState::Paused {
            return false;
        }
        self.state = GameState::Playing;
        debug!("resumed");
        self.maybe_schedule_ai();
        self.emit_change();
        true
    }

    /// Switch board size; starts a new game on the new board
    pub fn set_board_size(&mut self, size: BoardSize) {
        self.ai_due = None;
        self.config.board_size = size;
        self.start_new_game();
    }

    /// Merge a partial config. A board size change starts a new game;
    /// returns true in that case.
    pub fn update_config(&mut self, patch: &ConfigPatch) -> bool {
        let old_size = self.config.board_size;
        let mut next = self.config.clone();
        next.apply(patch);
        let resize = next.board_size != old_size;
        self.config = next;
        debug!(?patch, "config updated");

        if resize {
            self.set_board_size(self.config.board_size);
            return true;
        }
        if !self.is_ai_turn() {
            self.ai_due = None;
        }
        self.maybe_schedule_ai();
        self.emit_change();
        false
    }

    /// Submit a position for the player to move. True only if a stone was
    /// placed; a Precise Strike target selection reports false.
    pub fn make_move(&mut self, pos: Pos) -> bool {
        matches!(self.try_move(pos), Ok(MoveOutcome::Placed { .. }))
    }

    /// Typed form of [`make_move`](Self::make_move)
    pub fn try_move(&mut self, pos: Pos) -> Result<MoveOutcome, MoveError> {
        if self.state != GameState::Playing {
            return Err(MoveError::GameNotActive);
        }
        if !self.is_human_turn() {
            return Err(MoveError::NotYourTurn);
        }
        let outcome = self.submit(pos);
        if let Err(err) = &outcome {
            debug!(%pos, %err, "move rejected");
        }
        outcome
    }

    /// Take back the last move. In PvE an AI reply is taken back together
    /// with the AI's extra moves and the human move before it. Item effects,
    /// blind boxes and move counters are not rolled back.
    pub fn undo_move(&mut self) -> bool {
        if self.state == GameState::Ready || self.board.moves().is_empty() {
            return false;
        }
        self.ai_due = None;

        let Some(last) = self.board.undo_move() else {
            return false;
        };
        let mut undone = vec![last];
        if let Some(ai) = self.config.ai_color() {
            if last.player == ai {
                // The AI's whole turn, extra moves included, then one human move
                while self.board.last_move().is_some_and(|m| m.player == ai) {
                    undone.extend(self.board.undo_move());
                }
                undone.extend(self.board.undo_move());
            }
        }
        let handed_to = undone.last().map_or(last.player, |m: &Move| m.player);

        self.state = GameState::Playing;
        self.result = None;
        self.sub_state = SubState::Normal;
        self.pending_effects.clear();
        self.on_extra_move = false;
        self.current_player = handed_to;

        info!(undone = undone.len(), to = ?handed_to, "undo");
        self.maybe_schedule_ai();
        self.emit_change();
        true
    }

    /// Move the game clock forward. Expires the item-name display and the
    /// notification, then fires the AI move if it is due.
    pub fn advance(&mut self, dt: Duration) {
        self.now += dt;
        let mut changed = false;

        if let SubState::ShowingItemName { until, .. } = self.sub_state {
            if until <= self.now {
                self.sub_state = SubState::Normal;
                changed = true;
            }
        }
        if self.notification.as_ref().is_some_and(|n| n.until <= self.now) {
            self.notification = None;
            changed = true;
        }
        if self.ai_due.is_some_and(|due| due <= self.now) {
            self.ai_due = None;
            // A placement notifies on its own
            if self.run_ai_move() {
                return;
            }
        }

        if changed {
            self.emit_change();
        }
    }

    pub fn subscribe(&mut self, callback: impl FnMut() + 'static) -> SubscriptionId {
        self.observers.subscribe(Box::new(callback))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Drop an unopened blind box holding `item` on an empty cell.
    /// Returns false if the cell is off the board, occupied or already boxed.
    pub fn place_blind_box(&mut self, pos: Pos, item: ItemType) -> bool {
        if !self.board.is_empty(pos) || self.unopened_box_at(pos).is_some() {
            return false;
        }
        let created_at = self.next_seq();
        self.blind_boxes.push(BlindBox {
            pos,
            item,
            opened: false,
            created_at,
        });
        true
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Full configuration snapshot
    pub fn config(&self) -> GameConfig {
        self.config.clone()
    }

    #[inline]
    pub fn state(&self) -> GameState {
        self.state
    }

    #[inline]
    pub fn sub_state(&self) -> &SubState {
        &self.sub_state
    }

    #[inline]
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }

    pub fn winner(&self) -> Option<Player> {
        self.result.as_ref().and_then(|r| r.winner)
    }

    /// Every blind box this game, opened ones included
    #[inline]
    pub fn blind_boxes(&self) -> &[BlindBox] {
        &self.blind_boxes
    }

    #[inline]
    pub fn last_item_used(&self) -> Option<ItemType> {
        self.last_item_used
    }

    pub fn strategy_guide_positions(&self) -> &[Pos] {
        match &self.sub_state {
            SubState::ShowingStrategyGuide { positions } => positions,
            _ => &[],
        }
    }

    /// Continuous effects currently protecting `player`
    pub fn active_effects(&self, player: Player) -> impl Iterator<Item = &PlayerItem> + '_ {
        self.active_effects.iter().filter(move |e| e.player == player)
    }

    pub fn has_effect(&self, player: Player, item: ItemType) -> bool {
        self.active_effects(player).any(|e| e.item == item)
    }

    /// Cells the current player is limited to by a hand-slip penalty
    pub fn allowed_positions(&self) -> Option<&[Pos]> {
        match &self.sub_state {
            SubState::HandSlipPenalty { allowed } => Some(allowed),
            _ => None,
        }
    }

    /// Player whose Precise Strike is awaiting a target
    pub fn precise_strike_player(&self) -> Option<Player> {
        match self.sub_state {
            SubState::SelectingStrikeTarget { triggered_by, .. } => Some(triggered_by),
            _ => None,
        }
    }

    pub fn notification(&self) -> Option<&str> {
        self.notification.as_ref().map(|n| n.text.as_str())
    }

    #[inline]
    pub fn move_counts(&self, player: Player) -> &MoveCounts {
        &self.move_counts[slot(player)]
    }

    /// Chronological log of placements and item triggers for both players
    #[inline]
    pub fn move_events(&self) -> &[MoveEvent] {
        &self.move_events
    }

    pub fn move_events_for(&self, player: Player) -> impl Iterator<Item = &MoveEvent> + '_ {
        self.move_events.iter().filter(move |e| e.player == player)
    }

    #[inline]
    pub fn item_log(&self) -> &[PlayerItem] {
        &self.item_log
    }

    #[inline]
    pub fn pending_effects(&self) -> &[PendingEffect] {
        &self.pending_effects
    }

    pub fn last_move(&self) -> Option<Pos> {
        self.board.last_move().map(|m| m.pos)
    }

    pub fn is_ai_controlled(&self, player: Player) -> bool {
        self.config.ai_color() == Some(player)
    }

    pub fn is_ai_turn(&self) -> bool {
        self.is_ai_controlled(self.current_player)
    }

    pub fn is_human_turn(&self) -> bool {
        !self.is_ai_turn()
    }

    /// An AI move is scheduled and not yet fired
    #[inline]
    pub fn ai_pending(&self) -> bool {
        self.ai_due.is_some()
    }

    /// Game clock
    #[inline]
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn subscriber_count(&self) -> usize {
        self.observers.len()
    }

    // ------------------------------------------------------------------
    // Move pipeline
    // ------------------------------------------------------------------

    /// Shared by human and AI submissions; turn ownership is already checked
    pub(super) fn submit(&mut self, pos: Pos) -> Result<MoveOutcome, MoveError> {
        if let SubState::SelectingStrikeTarget {
            triggered_by,
            had_extra_move,
        } = self.sub_state
        {
            return self.resolve_strike_target(pos, triggered_by, had_extra_move);
        }

        if !self.board.is_valid_position(pos) {
            return Err(MoveError::OutOfBounds(pos));
        }
        if let SubState::HandSlipPenalty { allowed } = &self.sub_state {
            if !allowed.contains(&pos) {
                return Err(MoveError::OutsideSlipRestriction);
            }
        }

        let player = self.current_player;
        if !self.board.place_stone(pos, player) {
            return Err(MoveError::Occupied(pos));
        }

        let kind = if std::mem::take(&mut self.on_extra_move) {
            MoveEventKind::ExtraMove
        } else {
            MoveEventKind::NormalMove
        };
        self.log_event(player, kind, Some(pos));
        debug!(%pos, ?player, ?kind, "stone placed");
        let placed = MoveOutcome::Placed { pos, player };

        if let Some(line) = find_winning_line(&self.board, pos, player) {
            info!(?player, len = line.len(), "five in a row");
            self.finish_game(GameResult::win(player, line));
            return Ok(placed);
        }
        if self.board.is_full() {
            info!("board full, draw");
            self.finish_game(GameResult::draw());
            return Ok(placed);
        }

        // A legal move under a slip penalty satisfies it; a guide is used up
        // by any move.
        if matches!(
            self.sub_state,
            SubState::HandSlipPenalty { .. } | SubState::ShowingStrategyGuide { .. }
        ) {
            self.sub_state = SubState::Normal;
        }

        self.open_blind_box_at(pos, player);

        self.spawn_blind_box();
        if !self.sub_state.requires_interaction() {
            self.finish_turn(player);
        }
        self.emit_change();
        Ok(placed)
    }

    fn finish_game(&mut self, result: GameResult) {
        self.state = GameState::Over;
        self.result = Some(result);
        self.ai_due = None;
        self.emit_change();
    }

    /// End `player`'s placement: spend a banked extra move and keep the turn,
    /// or pass the turn and apply effects queued for the incoming player.
    pub(super) fn finish_turn(&mut self, player: Player) {
        if self.move_counts[slot(player)].consume_extra() {
            self.on_extra_move = true;
            self.verify_move_counts();
            debug!(?player, "extra move");
            self.maybe_schedule_ai();
            return;
        }

        self.move_counts[slot(player)].original_move_count += 1;
        self.current_player = player.opponent();
        self.apply_pending_effects(self.current_player);
        self.verify_move_counts();
        self.maybe_schedule_ai();
    }

    fn apply_pending_effects(&mut self, incoming: Player) {
        let (due, rest): (Vec<_>, Vec<_>) = self
            .pending_effects
            .drain(..)
            .partition(|e| e.target == incoming);
        self.pending_effects = rest;

        for effect in due {
            match effect.kind {
                PendingKind::OpponentAcceleration => {
                    self.move_counts[slot(incoming)].grant_extra();
                    self.show_notification(format!("{} gets an extra move", incoming.name()));
                    info!(player = ?incoming, "opponent acceleration applied");
                }
                PendingKind::SlipPenalty => self.enter_slip_penalty(incoming),
            }
        }
    }

    fn enter_slip_penalty(&mut self, player: Player) {
        let empty = self.board.empty_cells();
        let mut allowed: Vec<Pos> = empty
            .choose_multiple(&mut self.rng, SLIP_CHOICES)
            .copied()
            .collect();
        if allowed.is_empty() {
            return;
        }
        allowed.sort();
        info!(?player, ?allowed, "hand slip penalty");
        self.sub_state = SubState::HandSlipPenalty { allowed };
        self.show_notification(format!("{}'s hand slipped!", player.name()));
    }

    /// Self-healing check of `current == earned - used` for both players.
    /// Returns true if anything had to be repaired.
    pub fn verify_move_counts(&mut self) -> bool {
        let mut repaired = false;
        for player in [Player::Black, Player::White] {
            let counts = &mut self.move_counts[slot(player)];
            let before = counts.current_extra_moves;
            if counts.repair() {
                warn!(
                    ?player,
                    before,
                    after = counts.current_extra_moves,
                    "extra move count drifted, repaired"
                );
                repaired = true;
            }
        }
        repaired
    }

    // ------------------------------------------------------------------
    // Blind boxes
    // ------------------------------------------------------------------

    pub(super) fn unopened_box_at(&self, pos: Pos) -> Option<usize> {
        self.blind_boxes
            .iter()
            .position(|b| b.pos == pos && !b.opened)
    }

    /// Add one random box if items are on and the unopened limit allows it
    pub(super) fn spawn_blind_box(&mut self) {
        if !self.config.items_active() {
            return;
        }
        let unopened = self.blind_boxes.iter().filter(|b| !b.opened).count();
        if unopened >= self.config.blind_box_limit {
            return;
        }
        let available: Vec<Pos> = self
            .board
            .empty_cells()
            .into_iter()
            .filter(|&p| self.unopened_box_at(p).is_none())
            .collect();
        let created_at = self.seq;
        if let Some(bx) = ItemSystem::generate_blind_box(&mut self.rng, &available, created_at) {
            self.seq += 1;
            debug!(pos = %bx.pos, "blind box spawned");
            self.blind_boxes.push(bx);
        }
    }

    // ------------------------------------------------------------------
    // AI
    // ------------------------------------------------------------------

    /// Schedule the AI if it is to move and nothing is outstanding
    pub(super) fn maybe_schedule_ai(&mut self) {
        if self.state != GameState::Playing
            || !self.is_ai_turn()
            || self.sub_state.requires_interaction()
            || self.ai_due.is_some()
        {
            return;
        }
        self.ai_due = Some(self.now + AI_MOVE_DELAY);
    }

    /// Fire the scheduled AI move. The game may have moved on since it was
    /// scheduled, so every precondition is checked again.
    fn run_ai_move(&mut self) -> bool {
        if self.state != GameState::Playing
            || self.config.mode != GameMode::Pve
            || !self.is_ai_turn()
            || self.sub_state.requires_interaction()
        {
            return false;
        }

        let player = self.current_player;
        let Some(pos) = best_position(&self.board, player, self.allowed_positions()) else {
            return false;
        };
        match self.submit(pos) {
            Ok(_) => {
                info!(%pos, ?player, "ai move");
                true
            }
            Err(err) => {
                warn!(%pos, %err, "ai move rejected");
                false
            }
        }
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    pub(super) fn next_seq(&mut self) -> u64 {
        let seq = self.seq;
        self.seq += 1;
        seq
    }

    pub(super) fn log_event(&mut self, player: Player, kind: MoveEventKind, pos: Option<Pos>) {
        let seq = self.next_seq();
        self.move_events.push(MoveEvent {
            seq,
            player,
            kind,
            pos,
        });
    }

    pub(super) fn show_notification(&mut self, text: String) {
        self.notification = Some(Notification {
            text,
            until: self.now + NOTIFICATION_DISPLAY,
        });
    }

    pub(super) fn emit_change(&mut self) {
        self.observers.notify();
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

