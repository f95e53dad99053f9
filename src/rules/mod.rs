//! Game rules for blind-box Gomoku
//!
//! Standard free-style rules: five or more in a row wins, overlines included.

pub mod win;

// Re-exports for convenient access
pub use win::{find_winning_line, DIRECTIONS};
