//! Game configuration
//!
//! A full [`GameConfig`] snapshot is read with `GameEngine::config`; changes
//! arrive as a [`ConfigPatch`] whose `Some` fields are merged in.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::{BoardSize, Player};

/// Who controls each side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    /// Player vs player (hotseat)
    Pvp,
    /// Player vs the built-in AI
    #[default]
    Pve,
}

/// Carried through configuration but not read by the AI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub mode: GameMode,
    /// Human's color in PvE; the AI takes the other one
    pub player_color: Player,
    pub difficulty: Difficulty,
    pub enable_items: bool,
    /// Most unopened blind boxes on the board at once
    pub blind_box_limit: usize,
    pub board_size: BoardSize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            mode: GameMode::Pve,
            player_color: Player::Black,
            difficulty: Difficulty::Normal,
            enable_items: true,
            blind_box_limit: 3,
            board_size: BoardSize::Fifteen,
        }
    }
}

/// Partial configuration update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigPatch {
    pub mode: Option<GameMode>,
    pub player_color: Option<Player>,
    pub difficulty: Option<Difficulty>,
    pub enable_items: Option<bool>,
    pub blind_box_limit: Option<usize>,
    pub board_size: Option<BoardSize>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl GameConfig {
    /// Merge the `Some` fields of `patch` into this config
    pub fn apply(&mut self, patch: &ConfigPatch) {
        if let Some(mode) = patch.mode {
            self.mode = mode;
        }
        if let Some(color) = patch.player_color {
            self.player_color = color;
        }
        if let Some(difficulty) = patch.difficulty {
            self.difficulty = difficulty;
        }
        if let Some(enable) = patch.enable_items {
            self.enable_items = enable;
        }
        if let Some(limit) = patch.blind_box_limit {
            self.blind_box_limit = limit;
        }
        if let Some(size) = patch.board_size {
            self.board_size = size;
        }
    }

    /// The AI's color in PvE, `None` in PvP
    pub fn ai_color(&self) -> Option<Player> {
        match self.mode {
            GameMode::Pve => Some(self.player_color.opponent()),
            GameMode::Pvp => None,
        }
    }

    /// Blind boxes can appear at all
    #[inline]
    pub fn items_active(&self) -> bool {
        self.enable_items && self.blind_box_limit > 0
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
