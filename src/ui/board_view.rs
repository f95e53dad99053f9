//! Board rendering and click handling

use egui::{Color32, CornerRadius, Painter, Pos2, Rect, Sense, Stroke, Vec2};

use crate::board::{Board, Player, Pos};
use crate::game::{GameEngine, GameState, SubState};

use super::theme::*;

/// Renders the engine's board and turns clicks into board positions
pub struct BoardView {
    /// Cached for coordinate conversion
    cell_size: f32,
    side: usize,
    board_rect: Rect,
}

impl Default for BoardView {
    fn default() -> Self {
        Self {
            cell_size: 30.0,
            side: 15,
            board_rect: Rect::NOTHING,
        }
    }
}

impl BoardView {
    /// Draw the board and return the clicked cell, if the click is one the
    /// engine could accept.
    pub fn show(&mut self, ui: &mut egui::Ui, engine: &GameEngine) -> Option<Pos> {
        let board = engine.board();
        self.side = board.side();

        let available = ui.available_size();
        let extent = available.x.min(available.y) - 20.0;
        self.cell_size = (extent - 2.0 * BOARD_MARGIN) / (self.side as f32 - 1.0);

        let (response, painter) = ui.allocate_painter(Vec2::new(extent, extent), Sense::click());
        self.board_rect = response.rect;

        painter.rect_filled(self.board_rect, CornerRadius::same(4), BOARD_BG);
        self.draw_grid(&painter);
        self.draw_star_points(&painter, board);
        self.draw_coordinates(&painter);

        self.draw_blind_boxes(&painter, engine);
        self.draw_stones(&painter, board);

        if let Some(pos) = engine.last_move() {
            self.draw_last_move_marker(&painter, pos);
        }
        if let Some(result) = engine.result() {
            self.draw_winning_line(&painter, &result.winning_line);
        }
        for &pos in engine.strategy_guide_positions() {
            self.draw_ring(&painter, pos, GUIDE_MARKER);
        }
        if let Some(allowed) = engine.allowed_positions() {
            for &pos in allowed {
                self.draw_ring(&painter, pos, SLIP_MARKER);
            }
        }
        if let Some(striker) = engine.precise_strike_player() {
            for pos in board.stones(striker.opponent()) {
                self.draw_ring(&painter, pos, STRIKE_TARGET);
            }
        }

        let interactive = engine.state() == GameState::Playing && engine.is_human_turn();
        if !interactive {
            return None;
        }

        let pointer = response.hover_pos()?;
        let pos = self.screen_to_board(pointer)?;
        let valid = Self::accepts(engine, pos);
        self.draw_hover_preview(&painter, pos, engine.current_player(), valid);

        (response.clicked() && valid).then_some(pos)
    }

    /// Whether a click on `pos` would be taken by the engine
    fn accepts(engine: &GameEngine, pos: Pos) -> bool {
        let board = engine.board();
        match engine.sub_state() {
            SubState::SelectingStrikeTarget { triggered_by, .. } => {
                board.get_stone(pos) == Some(triggered_by.opponent())
            }
            SubState::HandSlipPenalty { allowed } => allowed.contains(&pos) && board.is_empty(pos),
            _ => board.is_empty(pos),
        }
    }

    fn line_end(&self) -> f32 {
        BOARD_MARGIN + (self.side as f32 - 1.0) * self.cell_size
    }

    fn draw_grid(&self, painter: &Painter) {
        let stroke = Stroke::new(GRID_LINE_WIDTH, GRID_LINE);
        let end = self.line_end();

        for i in 0..self.side {
            let offset = BOARD_MARGIN + i as f32 * self.cell_size;
            let min = self.board_rect.min;
            painter.line_segment(
                [min + Vec2::new(offset, BOARD_MARGIN), min + Vec2::new(offset, end)],
                stroke,
            );
            painter.line_segment(
                [min + Vec2::new(BOARD_MARGIN, offset), min + Vec2::new(end, offset)],
                stroke,
            );
        }
    }

    fn draw_star_points(&self, painter: &Painter, board: &Board) {
        for &(row, col) in star_points(board.size()) {
            let center = self.board_to_screen(Pos::new(row, col));
            painter.circle_filled(center, STAR_POINT_RADIUS, STAR_POINT);
        }
    }

    /// Column letters and row numbers, counted from the bottom
    fn draw_coordinates(&self, painter: &Painter) {
        let font = egui::FontId::proportional(12.0);

        for col in 0..self.side {
            let letter = (b'A' + col as u8) as char;
            let x = self.board_rect.min.x + BOARD_MARGIN + col as f32 * self.cell_size;
            for y in [self.board_rect.min.y + 12.0, self.board_rect.max.y - 12.0] {
                painter.text(Pos2::new(x, y), egui::Align2::CENTER_CENTER, letter, font.clone(), GRID_LINE);
            }
        }

        for row in 0..self.side {
            let label = (self.side - row).to_string();
            let y = self.board_rect.min.y + BOARD_MARGIN + row as f32 * self.cell_size;
            for x in [self.board_rect.min.x + 12.0, self.board_rect.max.x - 12.0] {
                painter.text(Pos2::new(x, y), egui::Align2::CENTER_CENTER, &label, font.clone(), GRID_LINE);
            }
        }
    }

    /// Unopened boxes on empty cells show as "?"
    fn draw_blind_boxes(&self, painter: &Painter, engine: &GameEngine) {
        let half = self.cell_size * STONE_RADIUS_RATIO * 0.9;
        for bx in engine.blind_boxes().iter().filter(|b| !b.opened) {
            if !engine.board().is_empty(bx.pos) {
                continue;
            }
            let center = self.board_to_screen(bx.pos);
            let rect = Rect::from_center_size(center, Vec2::splat(half * 2.0));
            painter.rect_filled(rect, CornerRadius::same(3), BLIND_BOX);
            painter.text(
                center,
                egui::Align2::CENTER_CENTER,
                "?",
                egui::FontId::proportional(self.cell_size * 0.5),
                BLIND_BOX_TEXT,
            );
        }
    }

    fn draw_stones(&self, painter: &Painter, board: &Board) {
        for player in [Player::Black, Player::White] {
            for pos in board.stones(player) {
                self.draw_stone(painter, pos, player);
            }
        }
    }

    fn draw_stone(&self, painter: &Painter, pos: Pos, player: Player) {
        let center = self.board_to_screen(pos);
        let radius = self.cell_size * STONE_RADIUS_RATIO;
        let shadow = center + Vec2::new(2.0, 2.0);

        match player {
            Player::Black => {
                painter.circle_filled(shadow, radius, Color32::from_rgba_unmultiplied(0, 0, 0, 60));
                painter.circle_filled(center, radius, BLACK_STONE);
                painter.circle_filled(
                    center + Vec2::new(-radius * 0.3, -radius * 0.3),
                    radius * 0.2,
                    BLACK_STONE_HIGHLIGHT,
                );
            }
            Player::White => {
                painter.circle_filled(shadow, radius, Color32::from_rgba_unmultiplied(0, 0, 0, 40));
                painter.circle_filled(center, radius, WHITE_STONE);
                painter.circle_stroke(center, radius * 0.85, Stroke::new(radius * 0.1, WHITE_STONE_SHADOW));
            }
        }
    }

    fn draw_last_move_marker(&self, painter: &Painter, pos: Pos) {
        painter.circle_filled(self.board_to_screen(pos), LAST_MOVE_MARKER_RADIUS, LAST_MOVE_MARKER);
    }

    /// Connect and ring every stone of the winning run
    fn draw_winning_line(&self, painter: &Painter, line: &[Pos]) {
        let stroke = Stroke::new(4.0, WIN_HIGHLIGHT);
        for pair in line.windows(2) {
            painter.line_segment([self.board_to_screen(pair[0]), self.board_to_screen(pair[1])], stroke);
        }
        for &pos in line {
            let radius = self.cell_size * STONE_RADIUS_RATIO + 3.0;
            painter.circle_stroke(self.board_to_screen(pos), radius, stroke);
        }
    }

    fn draw_ring(&self, painter: &Painter, pos: Pos, color: Color32) {
        let radius = self.cell_size * STONE_RADIUS_RATIO + 2.0;
        painter.circle_stroke(self.board_to_screen(pos), radius, Stroke::new(3.0, color));
    }

    fn draw_hover_preview(&self, painter: &Painter, pos: Pos, turn: Player, valid: bool) {
        let center = self.board_to_screen(pos);
        let radius = self.cell_size * STONE_RADIUS_RATIO;

        let color = match (valid, turn) {
            (false, _) => hover_invalid(),
            (true, Player::Black) => Color32::from_rgba_unmultiplied(20, 20, 20, 80),
            (true, Player::White) => Color32::from_rgba_unmultiplied(240, 240, 240, 80),
        };
        painter.circle_filled(center, radius, color);
        if valid {
            painter.circle_stroke(center, radius, Stroke::new(1.0, hover_valid()));
        }
    }

    pub fn screen_to_board(&self, screen_pos: Pos2) -> Option<Pos> {
        let relative = screen_pos - self.board_rect.min;
        let col = ((relative.x - BOARD_MARGIN + self.cell_size * 0.5) / self.cell_size).floor() as i32;
        let row = ((relative.y - BOARD_MARGIN + self.cell_size * 0.5) / self.cell_size).floor() as i32;

        let side = self.side as i32;
        if (0..side).contains(&col) && (0..side).contains(&row) {
            Some(Pos::new(row as u8, col as u8))
        } else {
            None
        }
    }

    pub fn board_to_screen(&self, pos: Pos) -> Pos2 {
        let x = self.board_rect.min.x + BOARD_MARGIN + pos.col as f32 * self.cell_size;
        let y = self.board_rect.min.y + BOARD_MARGIN + pos.row as f32 * self.cell_size;
        Pos2::new(x, y)
    }
}
