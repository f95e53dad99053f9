//! Colors and sizes for the GUI

use egui::Color32;

use crate::board::BoardSize;

// Board - warm wood tones
pub const BOARD_BG: Color32 = Color32::from_rgb(222, 184, 135);
pub const GRID_LINE: Color32 = Color32::from_rgb(60, 40, 20);
pub const STAR_POINT: Color32 = Color32::from_rgb(50, 35, 20);

// Stones
pub const BLACK_STONE: Color32 = Color32::from_rgb(25, 25, 30);
pub const BLACK_STONE_HIGHLIGHT: Color32 = Color32::from_rgb(70, 70, 80);
pub const WHITE_STONE: Color32 = Color32::from_rgb(250, 250, 252);
pub const WHITE_STONE_SHADOW: Color32 = Color32::from_rgb(190, 190, 195);

// Markers
pub const LAST_MOVE_MARKER: Color32 = Color32::from_rgb(230, 60, 60);
pub const WIN_HIGHLIGHT: Color32 = Color32::from_rgb(50, 220, 50);
pub const BLIND_BOX: Color32 = Color32::from_rgb(150, 90, 200);
pub const BLIND_BOX_TEXT: Color32 = Color32::from_rgb(255, 240, 120);
pub const GUIDE_MARKER: Color32 = Color32::from_rgb(40, 160, 230);
pub const SLIP_MARKER: Color32 = Color32::from_rgb(255, 150, 40);
pub const STRIKE_TARGET: Color32 = Color32::from_rgb(255, 50, 50);

pub fn hover_valid() -> Color32 {
    Color32::from_rgba_unmultiplied(80, 80, 80, 100)
}

pub fn hover_invalid() -> Color32 {
    Color32::from_rgba_unmultiplied(255, 50, 50, 100)
}

// Panel - dark theme
pub const PANEL_BG: Color32 = Color32::from_rgb(25, 27, 31);
pub const CARD_BG: Color32 = Color32::from_rgb(35, 38, 43);
pub const BUTTON_BG: Color32 = Color32::from_rgb(50, 53, 58);
pub const BOARD_AREA_BG: Color32 = Color32::from_rgb(40, 42, 46);
pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(240, 240, 245);
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(160, 165, 175);
pub const TEXT_MUTED: Color32 = Color32::from_rgb(120, 125, 135);

// Status
pub const STATUS_OK: Color32 = Color32::from_rgb(80, 200, 120);
pub const STATUS_WARNING: Color32 = Color32::from_rgb(255, 180, 50);
pub const STATUS_ALERT: Color32 = Color32::from_rgb(255, 70, 70);
pub const STRENGTHENING: Color32 = Color32::from_rgb(90, 200, 140);
pub const WEAKENING: Color32 = Color32::from_rgb(230, 100, 100);

// Sizes
pub const BOARD_MARGIN: f32 = 40.0;
pub const STONE_RADIUS_RATIO: f32 = 0.45;
pub const STAR_POINT_RADIUS: f32 = 4.0;
pub const GRID_LINE_WIDTH: f32 = 1.0;
pub const LAST_MOVE_MARKER_RADIUS: f32 = 5.0;

/// Star points (hoshi) for a board size
pub fn star_points(size: BoardSize) -> &'static [(u8, u8)] {
    match size {
        BoardSize::Fifteen => &[(3, 3), (3, 11), (7, 7), (11, 3), (11, 11)],
        BoardSize::Nineteen => &[
            (3, 3), (3, 9), (3, 15),
            (9, 3), (9, 9), (9, 15),
            (15, 3), (15, 9), (15, 15),
        ],
    }
}
