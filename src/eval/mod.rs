//! Position evaluation for the AI opponent and the Strategy Guide item

pub mod heuristic;
pub mod patterns;

pub use heuristic::{best_position, center_bonus, evaluate_position, top_positions};
pub use patterns::{run_score, PatternScore};
