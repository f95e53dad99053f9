use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use super::*;
use crate::board::{BoardSize, Player, Pos};
use crate::items::ItemType;

fn engine_with(config: GameConfig) -> GameEngine {
    let mut engine = GameEngine::with_seed(config, 42);
    engine.start_new_game();
    engine
}

/// PvP, no random blind boxes
fn pvp() -> GameEngine {
    engine_with(GameConfig {
        mode: GameMode::Pvp,
        enable_items: false,
        ..Default::default()
    })
}

/// PvE with the human on `human`, no random blind boxes
fn pve(human: Player) -> GameEngine {
    engine_with(GameConfig {
        mode: GameMode::Pve,
        player_color: human,
        enable_items: false,
        ..Default::default()
    })
}

fn play(engine: &mut GameEngine, moves: &[(u8, u8)]) {
    for &(r, c) in moves {
        assert!(engine.make_move(Pos::new(r, c)), "move ({}, {}) rejected", r, c);
    }
}

fn assert_counts_consistent(engine: &GameEngine) {
    for player in [Player::Black, Player::White] {
        let counts = engine.move_counts(player);
        assert_eq!(
            counts.current_extra_moves,
            counts.extra_moves_earned - counts.extra_moves_used,
            "{:?} counts drifted: {:?}",
            player,
            counts
        );
    }
}

// ----------------------------------------------------------------------
// Lifecycle
// ----------------------------------------------------------------------

#[test]
fn test_new_engine_is_ready() {
    let mut engine = GameEngine::with_seed(GameConfig::default(), 1);
    assert_eq!(engine.state(), GameState::Ready);
    assert!(!engine.make_move(Pos::new(7, 7)));
    assert_eq!(engine.try_move(Pos::new(7, 7)), Err(MoveError::GameNotActive));
    assert!(!engine.undo_move(), "undo is a no-op before the game starts");
}

#[test]
fn test_start_new_game() {
    let engine = pvp();
    assert_eq!(engine.state(), GameState::Playing);
    assert_eq!(*engine.sub_state(), SubState::Normal);
    assert_eq!(engine.current_player(), Player::Black);
    assert!(engine.board().is_board_empty());
    assert!(engine.result().is_none());
}

#[test]
fn test_pause_and_resume() {
    let mut engine = pvp();
    assert!(engine.pause());
    assert!(!engine.pause(), "already paused");
    assert_eq!(engine.state(), GameState::Paused);
    assert!(!engine.make_move(Pos::new(7, 7)));
    assert!(engine.resume());
    assert!(!engine.resume());
    assert!(engine.make_move(Pos::new(7, 7)));
}

#[test]
fn test_restart_replaces_state() {
    let mut engine = pvp();
    play(&mut engine, &[(7, 7), (7, 8)]);
    engine.trigger_item(Player::Black, ItemType::ToughenHeart);
    engine.restart();
    assert!(engine.board().is_board_empty());
    assert!(engine.move_events().is_empty());
    assert!(!engine.has_effect(Player::Black, ItemType::ToughenHeart));
    assert_eq!(*engine.move_counts(Player::Black), MoveCounts::default());
}

#[test]
fn test_set_board_size_starts_fresh_game() {
    let mut engine = pvp();
    play(&mut engine, &[(7, 7)]);
    engine.set_board_size(BoardSize::Nineteen);
    assert_eq!(engine.board().side(), 19);
    assert!(engine.board().is_board_empty());
    assert_eq!(engine.config().board_size, BoardSize::Nineteen);
    assert!(engine.make_move(Pos::new(18, 18)));
}

#[test]
fn test_update_config_partial_merge() {
    let mut engine = pvp();
    play(&mut engine, &[(7, 7)]);
    let restarted = engine.update_config(&ConfigPatch {
        difficulty: Some(Difficulty::Hard),
        ..Default::default()
    });
    assert!(!restarted);
    let config = engine.config();
    assert_eq!(config.difficulty, Difficulty::Hard);
    assert_eq!(config.mode, GameMode::Pvp);
    assert_eq!(engine.board().total_stones(), 1, "no resize, game kept");

    let restarted = engine.update_config(&ConfigPatch {
        board_size: Some(BoardSize::Nineteen),
        ..Default::default()
    });
    assert!(restarted, "resize reports the new game");
    assert_eq!(engine.board().side(), 19);
    assert!(engine.board().is_board_empty());
}

// ----------------------------------------------------------------------
// Placement, win, draw
// ----------------------------------------------------------------------

#[test]
fn test_occupied_cell_rejected_without_side_effects() {
    let mut engine = pvp();
    play(&mut engine, &[(7, 7)]);
    let events = engine.move_events().len();
    assert_eq!(engine.try_move(Pos::new(7, 7)), Err(MoveError::Occupied(Pos::new(7, 7))));
    assert_eq!(engine.current_player(), Player::White);
    assert_eq!(engine.move_events().len(), events);
    assert_eq!(engine.board().moves().len(), 1);
}

#[test]
fn test_out_of_bounds_rejected() {
    let mut engine = pvp();
    assert_eq!(engine.try_move(Pos::new(15, 0)), Err(MoveError::OutOfBounds(Pos::new(15, 0))));
    assert_eq!(engine.current_player(), Player::Black);
}

#[test]
fn test_position_past_largest_board_rejected() {
    let mut engine = pvp();
    assert!(!engine.make_move(Pos::new(20, 0)));
    assert_eq!(engine.try_move(Pos::new(3, 255)), Err(MoveError::OutOfBounds(Pos::new(3, 255))));
    assert!(engine.board().is_board_empty());
    assert_eq!(engine.current_player(), Player::Black);
}

#[test]
fn test_turns_alternate() {
    let mut engine = pvp();
    play(&mut engine, &[(7, 7)]);
    assert_eq!(engine.current_player(), Player::White);
    play(&mut engine, &[(7, 8)]);
    assert_eq!(engine.current_player(), Player::Black);
    assert_eq!(engine.move_counts(Player::Black).original_move_count, 1);
    assert_eq!(engine.move_counts(Player::White).original_move_count, 1);
    assert_eq!(engine.move_events()[0].kind, MoveEventKind::NormalMove);
}

#[test]
fn test_five_in_a_row_wins() {
    let mut engine = pvp();
    play(
        &mut engine,
        &[(0, 0), (5, 0), (0, 1), (5, 1), (0, 2), (5, 2), (0, 3), (5, 3), (0, 4)],
    );
    assert_eq!(engine.state(), GameState::Over);
    let result = engine.result().expect("result");
    assert_eq!(result.winner, Some(Player::Black));
    assert_eq!(
        result.winning_line,
        (0..5).map(|c| Pos::new(0, c)).collect::<Vec<_>>()
    );
    assert!(!engine.make_move(Pos::new(9, 9)), "no moves after game over");
}

#[test]
fn test_overline_reported_in_full() {
    let mut engine = pvp();
    // Black builds 0..2 and 4..5, then fills 3 for a six
    play(
        &mut engine,
        &[(0, 0), (5, 0), (0, 1), (5, 1), (0, 2), (5, 2), (0, 4), (6, 5), (0, 5), (8, 8), (0, 3)],
    );
    let result = engine.result().expect("result");
    assert_eq!(result.winner, Some(Player::Black));
    assert_eq!(result.winning_line.len(), 6);
}

#[test]
fn test_full_board_is_draw() {
    let mut engine = pvp();
    // Column pairs alternate color and shift every row: no run longer than two
    let color = |r: u8, c: u8| if ((c / 2) + r) % 2 == 0 { Player::Black } else { Player::White };
    let cells: Vec<Pos> = (0..15).flat_map(|r| (0..15).map(move |c| Pos::new(r, c))).collect();
    let black: Vec<Pos> = cells.iter().copied().filter(|p| color(p.row, p.col) == Player::Black).collect();
    let white: Vec<Pos> = cells.iter().copied().filter(|p| color(p.row, p.col) == Player::White).collect();
    assert_eq!((black.len(), white.len()), (113, 112));

    for i in 0..black.len() {
        assert!(engine.make_move(black[i]));
        if i < white.len() {
            assert!(engine.make_move(white[i]));
        }
    }

    assert_eq!(engine.state(), GameState::Over);
    let result = engine.result().expect("result");
    assert!(result.is_draw());
    assert_eq!(engine.winner(), None);
}

// ----------------------------------------------------------------------
// Undo
// ----------------------------------------------------------------------

#[test]
fn test_undo_pvp_single_move() {
    let mut engine = pvp();
    play(&mut engine, &[(7, 7), (7, 8)]);
    assert!(engine.undo_move());
    assert_eq!(engine.current_player(), Player::White);
    assert!(engine.board().is_empty(Pos::new(7, 8)));
    assert_eq!(engine.board().get_stone(Pos::new(7, 7)), Some(Player::Black));
}

#[test]
fn test_undo_without_moves() {
    let mut engine = pvp();
    assert!(!engine.undo_move());
}

#[test]
fn test_undo_after_win_resumes_play() {
    let mut engine = pvp();
    play(
        &mut engine,
        &[(0, 0), (5, 0), (0, 1), (5, 1), (0, 2), (5, 2), (0, 3), (5, 3), (0, 4)],
    );
    assert!(engine.undo_move());
    assert_eq!(engine.state(), GameState::Playing);
    assert!(engine.result().is_none());
    assert_eq!(engine.current_player(), Player::Black);
}

#[test]
fn test_undo_pve_takes_back_ai_reply_too() {
    let mut engine = pve(Player::Black);
    play(&mut engine, &[(7, 7)]);
    engine.advance(AI_MOVE_DELAY);
    assert_eq!(engine.board().total_stones(), 2);

    assert!(engine.undo_move());
    assert!(engine.board().is_board_empty());
    assert_eq!(engine.current_player(), Player::Black);
    assert!(!engine.ai_pending());
}

#[test]
fn test_undo_pve_takes_back_ai_extra_moves() {
    let mut engine = pve(Player::Black);
    play(&mut engine, &[(7, 7)]);
    engine.trigger_item(Player::White, ItemType::AcceleratedMove);
    engine.advance(AI_MOVE_DELAY);
    assert_eq!(engine.current_player(), Player::White, "AI keeps the turn");
    engine.advance(AI_MOVE_DELAY);
    assert_eq!(engine.board().stone_count(Player::White), 2);
    assert_eq!(engine.current_player(), Player::Black);

    assert!(engine.undo_move());
    assert!(engine.board().is_board_empty(), "both AI stones and the human move");
    assert_eq!(engine.current_player(), Player::Black);
    assert!(!engine.ai_pending());
}

#[test]
fn test_undo_ai_opening_returns_to_ai() {
    let mut engine = pve(Player::White);
    engine.advance(AI_MOVE_DELAY);
    assert_eq!(engine.board().total_stones(), 1);

    assert!(engine.undo_move());
    assert!(engine.board().is_board_empty());
    assert_eq!(engine.current_player(), Player::Black, "Black still opens");
    assert!(engine.ai_pending());
}

#[test]
fn test_undo_pve_before_ai_replies() {
    let mut engine = pve(Player::Black);
    play(&mut engine, &[(7, 7)]);
    assert!(engine.ai_pending());
    assert!(engine.undo_move());
    assert!(!engine.ai_pending(), "pending AI move cancelled");
    assert!(engine.board().is_board_empty());
    engine.advance(AI_MOVE_DELAY * 2);
    assert!(engine.board().is_board_empty(), "cancelled AI never moves");
}

#[test]
fn test_undo_clears_interaction_state() {
    let mut engine = pvp();
    play(&mut engine, &[(0, 0), (14, 14)]);
    engine.trigger_item(Player::Black, ItemType::PreciseStrike);
    assert_eq!(engine.precise_strike_player(), Some(Player::Black));
    engine.trigger_item(Player::Black, ItemType::SlipPenalty);
    assert!(engine.undo_move());
    assert_eq!(*engine.sub_state(), SubState::Normal);
    assert!(engine.pending_effects().is_empty());
}

#[test]
fn test_undo_after_item_removal_targets_real_stone() {
    let mut engine = pvp();
    play(&mut engine, &[(7, 7), (0, 0)]);
    // White's only stone is struck; its stack entry goes with it
    engine.trigger_item(Player::Black, ItemType::ChaosStrike);
    assert!(engine.board().is_empty(Pos::new(0, 0)));
    assert_eq!(engine.board().moves().len(), 1);

    assert!(engine.undo_move());
    assert!(engine.board().is_board_empty(), "undo removed Black's stone");
}

// ----------------------------------------------------------------------
// AI
// ----------------------------------------------------------------------

#[test]
fn test_pve_rejects_move_on_ai_turn() {
    let mut engine = pve(Player::Black);
    play(&mut engine, &[(7, 7)]);
    assert_eq!(engine.try_move(Pos::new(0, 0)), Err(MoveError::NotYourTurn));
    assert_eq!(engine.board().total_stones(), 1);
}

#[test]
fn test_ai_replies_adjacent_after_delay() {
    let mut engine = pve(Player::Black);
    play(&mut engine, &[(7, 7)]);

    let adjacent = crate::eval::evaluate_position(engine.board(), Pos::new(7, 8), Player::White);
    let corner = crate::eval::evaluate_position(engine.board(), Pos::new(0, 0), Player::White);
    assert!(adjacent > corner);

    engine.advance(AI_MOVE_DELAY - Duration::from_millis(1));
    assert_eq!(engine.board().total_stones(), 1, "AI waits for its delay");
    engine.advance(Duration::from_millis(1));

    // Orthogonal neighbors tie; the first in row-major order wins
    assert_eq!(engine.board().get_stone(Pos::new(6, 7)), Some(Player::White));
    assert_eq!(engine.current_player(), Player::Black);
    assert!(!engine.ai_pending());
}

#[test]
fn test_ai_as_black_opens_in_center() {
    let mut engine = pve(Player::White);
    assert!(engine.ai_pending());
    assert_eq!(engine.try_move(Pos::new(0, 0)), Err(MoveError::NotYourTurn));
    engine.advance(AI_MOVE_DELAY);
    assert_eq!(engine.board().get_stone(Pos::new(7, 7)), Some(Player::Black));
    assert!(engine.is_human_turn());
}

#[test]
fn test_ai_does_not_move_while_paused() {
    let mut engine = pve(Player::Black);
    play(&mut engine, &[(7, 7)]);
    engine.pause();
    engine.advance(AI_MOVE_DELAY);
    assert_eq!(engine.board().total_stones(), 1);
    assert!(engine.resume());
    assert!(engine.ai_pending());
    engine.advance(AI_MOVE_DELAY);
    assert_eq!(engine.board().total_stones(), 2);
}

#[test]
fn test_restart_cancels_pending_ai() {
    let mut engine = pve(Player::Black);
    play(&mut engine, &[(7, 7)]);
    engine.restart();
    assert!(!engine.ai_pending());
    engine.advance(AI_MOVE_DELAY);
    assert!(engine.board().is_board_empty());
}

// ----------------------------------------------------------------------
// Items
// ----------------------------------------------------------------------

#[test]
fn test_blind_box_opens_and_stays_listed() {
    let mut engine = pvp();
    assert!(engine.place_blind_box(Pos::new(7, 7), ItemType::ToughenHeart));
    assert!(!engine.place_blind_box(Pos::new(7, 7), ItemType::ChaosStrike), "already boxed");
    play(&mut engine, &[(7, 7)]);

    let boxes = engine.blind_boxes();
    assert_eq!(boxes.len(), 1);
    assert!(boxes[0].opened);
    assert_eq!(engine.last_item_used(), Some(ItemType::ToughenHeart));
    assert!(engine.has_effect(Player::Black, ItemType::ToughenHeart));
    assert!(matches!(
        engine.sub_state(),
        SubState::ShowingItemName { item: ItemType::ToughenHeart, .. }
    ));

    engine.advance(ITEM_NAME_DISPLAY);
    assert_eq!(*engine.sub_state(), SubState::Normal);
}

#[test]
fn test_item_name_kept_for_newer_box() {
    let mut engine = pvp();
    engine.place_blind_box(Pos::new(7, 7), ItemType::ToughenHeart);
    engine.place_blind_box(Pos::new(0, 0), ItemType::AcceleratedMove);
    play(&mut engine, &[(7, 7)]);

    let half = ITEM_NAME_DISPLAY / 2;
    engine.advance(half);
    play(&mut engine, &[(0, 0)]);

    // First display's expiry passes while the second is still showing
    engine.advance(ITEM_NAME_DISPLAY - half);
    assert!(matches!(
        engine.sub_state(),
        SubState::ShowingItemName { item: ItemType::AcceleratedMove, .. }
    ));

    engine.advance(half);
    assert_eq!(*engine.sub_state(), SubState::Normal);
}

#[test]
fn test_item_name_expiry_keeps_slip_penalty() {
    let mut engine = pvp();
    engine.place_blind_box(Pos::new(7, 7), ItemType::SlipPenalty);
    play(&mut engine, &[(7, 7)]);
    let allowed = engine.allowed_positions().expect("restriction").to_vec();

    engine.advance(ITEM_NAME_DISPLAY * 2);
    assert_eq!(*engine.sub_state(), SubState::HandSlipPenalty { allowed });
}

#[test]
fn test_blind_box_not_on_occupied_cell() {
    let mut engine = pvp();
    play(&mut engine, &[(7, 7)]);
    assert!(!engine.place_blind_box(Pos::new(7, 7), ItemType::ChaosStrike));
}

#[test]
fn test_accelerated_move_keeps_turn() {
    let mut engine = pvp();
    engine.place_blind_box(Pos::new(7, 7), ItemType::AcceleratedMove);
    play(&mut engine, &[(7, 7)]);
    assert_eq!(engine.current_player(), Player::Black, "extra move keeps the turn");

    let counts = *engine.move_counts(Player::Black);
    assert_eq!(counts.extra_moves_earned, 1);
    assert_eq!(counts.extra_moves_used, 1);
    assert_eq!(counts.current_extra_moves, 0);

    play(&mut engine, &[(7, 8)]);
    assert_eq!(engine.current_player(), Player::White);
    let kinds: Vec<MoveEventKind> = engine.move_events().iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            MoveEventKind::NormalMove,
            MoveEventKind::ItemTrigger(ItemType::AcceleratedMove),
            MoveEventKind::ExtraMove,
        ]
    );
    assert_counts_consistent(&engine);
}

#[test]
fn test_toughen_heart_blocks_one_chaos_strike() {
    let mut engine = pvp();
    play(&mut engine, &[(7, 7), (0, 0), (7, 8), (0, 1)]);
    engine.trigger_item(Player::White, ItemType::ToughenHeart);
    assert!(engine.has_effect(Player::White, ItemType::ToughenHeart));

    engine.trigger_item(Player::Black, ItemType::ChaosStrike);
    assert_eq!(engine.board().stone_count(Player::White), 2, "strike absorbed");
    assert!(!engine.has_effect(Player::White, ItemType::ToughenHeart), "effect consumed");
    assert!(engine.notification().is_some());

    engine.trigger_item(Player::Black, ItemType::ChaosStrike);
    assert_eq!(engine.board().stone_count(Player::White), 1);
    assert_eq!(engine.board().stone_count(Player::Black), 2);
}

#[test]
fn test_toughen_heart_blocks_self_mistake() {
    let mut engine = pvp();
    play(&mut engine, &[(7, 7), (0, 0)]);
    engine.trigger_item(Player::Black, ItemType::ToughenHeart);
    engine.trigger_item(Player::Black, ItemType::SelfMistake);
    assert_eq!(engine.board().stone_count(Player::Black), 1);
    engine.trigger_item(Player::Black, ItemType::SelfMistake);
    assert_eq!(engine.board().stone_count(Player::Black), 0);
}

#[test]
fn test_strike_without_stones_keeps_immunity() {
    let mut engine = pvp();
    play(&mut engine, &[(7, 7)]);
    engine.trigger_item(Player::White, ItemType::ToughenHeart);
    engine.trigger_item(Player::Black, ItemType::ChaosStrike);
    assert!(engine.has_effect(Player::White, ItemType::ToughenHeart), "nothing to block");
}

#[test]
fn test_notification_expires() {
    let mut engine = pvp();
    play(&mut engine, &[(7, 7), (0, 0)]);
    engine.trigger_item(Player::White, ItemType::ToughenHeart);
    engine.trigger_item(Player::Black, ItemType::ChaosStrike);
    assert!(engine.notification().is_some());
    engine.advance(NOTIFICATION_DISPLAY);
    assert!(engine.notification().is_none());
}

#[test]
fn test_precise_strike_target_selection() {
    let mut engine = pvp();
    engine.place_blind_box(Pos::new(7, 7), ItemType::PreciseStrike);
    play(&mut engine, &[(0, 0), (14, 14), (7, 7)]);

    let selecting = SubState::SelectingStrikeTarget {
        triggered_by: Player::Black,
        had_extra_move: false,
    };
    assert_eq!(*engine.sub_state(), selecting);
    assert_eq!(engine.current_player(), Player::Black);

    // Empty cell and own stone are not targets
    assert!(!engine.make_move(Pos::new(3, 3)));
    assert_eq!(*engine.sub_state(), selecting);
    assert!(engine.board().is_empty(Pos::new(3, 3)));
    assert_eq!(engine.try_move(Pos::new(0, 0)), Err(MoveError::NotAStrikeTarget));
    assert_eq!(*engine.sub_state(), selecting);

    let stones_before = engine.board().total_stones();
    assert_eq!(
        engine.try_move(Pos::new(14, 14)),
        Ok(MoveOutcome::StrikeResolved(StrikeResolution::Removed(Pos::new(14, 14))))
    );
    assert_eq!(engine.board().total_stones(), stones_before - 1);
    assert_eq!(*engine.sub_state(), SubState::Normal);
    assert_eq!(engine.current_player(), Player::White);
}

#[test]
fn test_precise_strike_selection_reports_false() {
    let mut engine = pvp();
    play(&mut engine, &[(0, 0), (14, 14)]);
    engine.trigger_item(Player::Black, ItemType::PreciseStrike);
    assert!(!engine.make_move(Pos::new(14, 14)), "a strike never counts as a placement");
    assert!(engine.board().is_empty(Pos::new(14, 14)));
    assert_eq!(engine.precise_strike_player(), None);
}

#[test]
fn test_precise_strike_blocked_by_toughen_heart() {
    let mut engine = pvp();
    play(&mut engine, &[(0, 0), (14, 14)]);
    engine.trigger_item(Player::White, ItemType::ToughenHeart);
    engine.trigger_item(Player::Black, ItemType::PreciseStrike);
    assert_eq!(
        engine.try_move(Pos::new(14, 14)),
        Ok(MoveOutcome::StrikeResolved(StrikeResolution::Blocked))
    );
    assert_eq!(engine.board().get_stone(Pos::new(14, 14)), Some(Player::White));
    assert!(!engine.has_effect(Player::White, ItemType::ToughenHeart));
    assert_eq!(*engine.sub_state(), SubState::Normal);
}

#[test]
fn test_precise_strike_keeps_turn_with_extra_move() {
    let mut engine = pvp();
    play(&mut engine, &[(0, 0), (14, 14)]);
    engine.trigger_item(Player::Black, ItemType::AcceleratedMove);
    engine.trigger_item(Player::Black, ItemType::PreciseStrike);
    assert_eq!(
        *engine.sub_state(),
        SubState::SelectingStrikeTarget {
            triggered_by: Player::Black,
            had_extra_move: true
        }
    );
    engine.make_move(Pos::new(14, 14));
    assert_eq!(engine.current_player(), Player::Black);
    assert_counts_consistent(&engine);
}

#[test]
fn test_precise_strike_by_ai_is_automatic() {
    let mut engine = pve(Player::Black);
    play(&mut engine, &[(7, 7)]);
    engine.trigger_item(Player::White, ItemType::PreciseStrike);
    assert_eq!(engine.precise_strike_player(), None);
    assert_eq!(engine.board().stone_count(Player::Black), 0);
}

#[test]
fn test_human_strike_in_pve_hands_turn_to_ai() {
    let mut engine = pve(Player::Black);
    engine.place_blind_box(Pos::new(8, 8), ItemType::PreciseStrike);
    play(&mut engine, &[(7, 7)]);
    engine.advance(AI_MOVE_DELAY);
    let ai_stone = engine.board().stones(Player::White)[0];

    play(&mut engine, &[(8, 8)]);
    assert_eq!(engine.precise_strike_player(), Some(Player::Black));
    assert!(!engine.ai_pending(), "AI waits while a target is chosen");

    assert!(!engine.make_move(ai_stone));
    assert!(engine.board().is_empty(ai_stone));
    assert!(engine.is_ai_turn());
    assert!(engine.ai_pending());
}

#[test]
fn test_strategy_guide_shows_three_positions_until_next_move() {
    let mut engine = pvp();
    engine.place_blind_box(Pos::new(7, 7), ItemType::StrategyGuide);
    play(&mut engine, &[(7, 7)]);

    let guide = engine.strategy_guide_positions().to_vec();
    assert_eq!(guide.len(), GUIDE_POSITIONS);
    assert!(guide.iter().all(|&p| engine.board().is_empty(p)));
    assert_eq!(engine.current_player(), Player::Black, "guide grants an extra move");

    // Guide outlives the item-name timer; only a move clears it
    engine.advance(ITEM_NAME_DISPLAY * 2);
    assert_eq!(engine.strategy_guide_positions(), guide.as_slice());

    play(&mut engine, &[(guide[0].row, guide[0].col)]);
    assert!(engine.strategy_guide_positions().is_empty());
    assert_eq!(engine.current_player(), Player::White);
}

#[test]
fn test_strategy_guide_for_ai_skips_display() {
    let mut engine = pve(Player::Black);
    play(&mut engine, &[(7, 7)]);
    engine.trigger_item(Player::White, ItemType::StrategyGuide);
    assert!(engine.strategy_guide_positions().is_empty());
    assert_eq!(engine.move_counts(Player::White).current_extra_moves, 1);
}

#[test]
fn test_slip_penalty_restricts_next_player() {
    let mut engine = pvp();
    engine.place_blind_box(Pos::new(7, 7), ItemType::SlipPenalty);
    play(&mut engine, &[(7, 7)]);

    assert_eq!(engine.current_player(), Player::White);
    let allowed = engine.allowed_positions().expect("restriction").to_vec();
    assert_eq!(allowed.len(), SLIP_CHOICES);
    assert!(matches!(engine.sub_state(), SubState::HandSlipPenalty { .. }));

    let outside = engine
        .board()
        .empty_cells()
        .into_iter()
        .find(|p| !allowed.contains(p))
        .expect("free cell outside the restriction");
    assert_eq!(engine.try_move(outside), Err(MoveError::OutsideSlipRestriction));
    assert_eq!(engine.board().total_stones(), 1, "no board mutation");

    assert!(engine.make_move(allowed[1]));
    assert!(engine.allowed_positions().is_none());
    assert_eq!(*engine.sub_state(), SubState::Normal);
    assert_eq!(engine.current_player(), Player::Black);
}

#[test]
fn test_slip_penalty_for_ai_uses_allowed_cells() {
    let mut engine = pve(Player::Black);
    engine.place_blind_box(Pos::new(7, 7), ItemType::SlipPenalty);
    play(&mut engine, &[(7, 7)]);
    let allowed = engine.allowed_positions().expect("restriction").to_vec();
    engine.advance(AI_MOVE_DELAY);
    let ai_stone = engine.board().stones(Player::White)[0];
    assert!(allowed.contains(&ai_stone));
}

#[test]
fn test_opponent_acceleration_grants_next_player_two_moves() {
    let mut engine = pvp();
    engine.place_blind_box(Pos::new(7, 7), ItemType::OpponentAcceleration);
    play(&mut engine, &[(7, 7)]);
    assert_eq!(engine.current_player(), Player::White);
    assert_eq!(engine.move_counts(Player::White).current_extra_moves, 1);
    assert!(engine.pending_effects().is_empty(), "applied exactly once");

    play(&mut engine, &[(0, 0)]);
    assert_eq!(engine.current_player(), Player::White);
    play(&mut engine, &[(0, 1)]);
    assert_eq!(engine.current_player(), Player::Black);
    assert_counts_consistent(&engine);
}

#[test]
fn test_deferred_effect_waits_for_turn_to_pass() {
    let mut engine = pvp();
    engine.trigger_item(Player::Black, ItemType::AcceleratedMove);
    engine.trigger_item(Player::Black, ItemType::SlipPenalty);
    play(&mut engine, &[(7, 7)]);
    assert_eq!(engine.current_player(), Player::Black);
    assert_eq!(engine.pending_effects().len(), 1, "still queued during the extra move");

    play(&mut engine, &[(7, 8)]);
    assert_eq!(engine.current_player(), Player::White);
    assert!(engine.allowed_positions().is_some());
    assert!(engine.pending_effects().is_empty());
}

#[test]
fn test_items_enabled_spawns_boxes_within_limit() {
    let mut engine = engine_with(GameConfig {
        mode: GameMode::Pvp,
        enable_items: true,
        blind_box_limit: 2,
        ..Default::default()
    });
    assert_eq!(engine.blind_boxes().len(), 1, "one box at game start");

    for (r, c) in [(0, 0), (14, 14), (0, 14), (14, 0)] {
        let pos = Pos::new(r, c);
        if !engine.board().is_empty(pos) || engine.precise_strike_player().is_some() {
            continue;
        }
        if let Some(allowed) = engine.allowed_positions() {
            let cell = allowed[0];
            engine.make_move(cell);
        } else {
            engine.make_move(pos);
        }
        let unopened = engine.blind_boxes().iter().filter(|b| !b.opened).count();
        assert!(unopened <= 2);
    }
}

#[test]
fn test_extra_move_invariant_over_random_game() {
    let mut engine = engine_with(GameConfig {
        mode: GameMode::Pvp,
        enable_items: true,
        blind_box_limit: 6,
        ..Default::default()
    });

    for step in 0..400usize {
        if engine.state() != GameState::Playing {
            break;
        }
        match engine.sub_state().clone() {
            SubState::SelectingStrikeTarget { triggered_by, .. } => {
                let target = engine.board().stones(triggered_by.opponent())[0];
                assert!(engine.try_move(target).is_ok());
            }
            SubState::HandSlipPenalty { allowed } => {
                assert!(engine.make_move(allowed[step % allowed.len()]));
            }
            _ => {
                let empty = engine.board().empty_cells();
                assert!(engine.make_move(empty[(step * 37) % empty.len()]));
            }
        }
        engine.advance(Duration::from_millis(250));
        assert_counts_consistent(&engine);
    }
    assert!(!engine.item_log().is_empty(), "items were exercised");
}

#[test]
fn test_verify_move_counts_repairs_drift() {
    let mut engine = pvp();
    engine.move_counts[0].extra_moves_earned = 2;
    engine.move_counts[0].current_extra_moves = 5;
    assert!(engine.verify_move_counts());
    assert_eq!(engine.move_counts(Player::Black).current_extra_moves, 2);
    assert!(!engine.verify_move_counts());
}

#[test]
fn test_item_log_records_triggers() {
    let mut engine = pvp();
    engine.trigger_item(Player::White, ItemType::ToughenHeart);
    engine.trigger_item(Player::Black, ItemType::OpponentAcceleration);
    let log: Vec<(Player, ItemType)> = engine.item_log().iter().map(|e| (e.player, e.item)).collect();
    assert_eq!(
        log,
        vec![
            (Player::White, ItemType::ToughenHeart),
            (Player::Black, ItemType::OpponentAcceleration),
        ]
    );
    assert_eq!(engine.move_events_for(Player::White).count(), 1);
}

// ----------------------------------------------------------------------
// Observers
// ----------------------------------------------------------------------

#[test]
fn test_subscribers_notified_on_changes() {
    let mut engine = pve(Player::Black);
    let hits = Rc::new(Cell::new(0u32));
    let h = Rc::clone(&hits);
    let id = engine.subscribe(move || h.set(h.get() + 1));

    play(&mut engine, &[(7, 7)]);
    let after_move = hits.get();
    assert!(after_move >= 1);

    engine.advance(AI_MOVE_DELAY);
    assert!(hits.get() > after_move, "AI move notifies");

    let before_resize = hits.get();
    engine.set_board_size(BoardSize::Nineteen);
    assert!(hits.get() > before_resize, "resize notifies");

    assert!(engine.unsubscribe(id));
    let frozen = hits.get();
    engine.restart();
    assert_eq!(hits.get(), frozen);
    assert_eq!(engine.subscriber_count(), 0);
}

#[test]
fn test_subscribers_notified_on_win() {
    let mut engine = pvp();
    play(&mut engine, &[(0, 0), (5, 0), (0, 1), (5, 1), (0, 2), (5, 2), (0, 3), (5, 3)]);
    let hits = Rc::new(Cell::new(0u32));
    let h = Rc::clone(&hits);
    engine.subscribe(move || h.set(h.get() + 1));
    play(&mut engine, &[(0, 4)]);
    assert!(hits.get() >= 1);
    assert_eq!(engine.state(), GameState::Over);
}
