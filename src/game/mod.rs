//! Game engine: turn order, blind-box item effects and the AI opponent

pub mod config;
mod effects;
pub mod engine;
pub mod error;
pub mod moves;
mod observer;
pub mod state;

#[cfg(test)]
mod tests;

// Re-exports
pub use config::{ConfigError, ConfigPatch, Difficulty, GameConfig, GameMode};
pub use effects::GUIDE_POSITIONS;
pub use engine::{GameEngine, AI_MOVE_DELAY, ITEM_NAME_DISPLAY, NOTIFICATION_DISPLAY, SLIP_CHOICES};
pub use error::MoveError;
pub use moves::{MoveCounts, MoveEvent, MoveEventKind};
pub use observer::SubscriptionId;
pub use state::{
    GameResult, GameState, MoveOutcome, Notification, PendingEffect, PendingKind, PlayerItem,
    StrikeResolution, SubState,
};
