//! Move rejection reasons

use crate::board::Pos;

/// Why a submitted position was not accepted. A rejected submission never
/// changes game state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("game is not in progress")]
    GameNotActive,
    #[error("not your turn")]
    NotYourTurn,
    #[error("position {0} is off the board")]
    OutOfBounds(Pos),
    #[error("position {0} is occupied")]
    Occupied(Pos),
    #[error("hand slip: only the highlighted cells may be played")]
    OutsideSlipRestriction,
    #[error("precise strike must target an opponent stone")]
    NotAStrikeTarget,
}
