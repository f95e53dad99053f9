//! egui front-end
//!
//! Drives a [`GameEngine`](crate::game::GameEngine) from the frame loop: the
//! frame delta is fed to `advance`, clicks go to `try_move`.

mod app;
mod board_view;
mod theme;

pub use app::BlindBoxApp;
