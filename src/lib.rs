//! Gomoku with blind boxes
//!
//! Free-style Gomoku (five or more in a row wins) on a 15x15 or 19x19 board,
//! with face-down blind boxes scattered over empty cells. Landing a stone on
//! a box reveals its item and fires the effect for the player who landed:
//! removing stones, granting extra moves, recommending cells, shielding
//! against attacks, or handicapping the next turn.
//!
//! # Architecture
//!
//! - [`board`]: Board with per-color bitboards and a move stack for undo
//! - [`rules`]: Win-line detection
//! - [`items`]: Item catalog and blind-box generation
//! - [`eval`]: Single-ply position heuristic used by the AI and the Strategy Guide
//! - [`game`]: The game engine state machine
//! - [`ui`]: egui front-end that renders the engine and forwards clicks
//!
//! # Quick Start
//!
//! ```
//! use blindbox_gomoku::{GameConfig, GameEngine, Pos, Player, AI_MOVE_DELAY};
//!
//! // PvE with the human on Black, items off for a predictable game
//! let config = GameConfig { enable_items: false, ..Default::default() };
//! let mut engine = GameEngine::with_seed(config, 1);
//! engine.start_new_game();
//!
//! assert!(engine.make_move(Pos::new(7, 7)));
//! assert!(engine.ai_pending());
//!
//! // The AI answers once its delay has elapsed on the game clock
//! engine.advance(AI_MOVE_DELAY);
//! assert_eq!(engine.current_player(), Player::Black);
//! assert_eq!(engine.board().total_stones(), 2);
//! ```

pub mod board;
pub mod eval;
pub mod game;
pub mod items;
pub mod rules;
pub mod ui;

// Re-export commonly used types for convenience
pub use board::{Board, BoardSize, Move, Player, Pos};
pub use game::{
    ConfigPatch, GameConfig, GameEngine, GameMode, GameResult, GameState, MoveError, MoveOutcome,
    SubState, AI_MOVE_DELAY,
};
pub use items::{BlindBox, ItemSystem, ItemType};
