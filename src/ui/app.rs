//! Main window

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use eframe::egui;
use egui::{CentralPanel, Color32, Context, CornerRadius, Frame, RichText, SidePanel, TopBottomPanel, Vec2};
use tracing::{debug, info};

use crate::board::{BoardSize, Player};
use crate::game::{ConfigPatch, Difficulty, GameConfig, GameEngine, GameMode, GameState, SubState};
use crate::items::ItemType;

use super::board_view::BoardView;
use super::theme::*;

/// Repaint interval while timers or the AI are running
const TICK: Duration = Duration::from_millis(50);

pub struct BlindBoxApp {
    engine: GameEngine,
    board_view: BoardView,
    /// Set by the engine's change subscription
    dirty: Rc<Cell<bool>>,
}

impl BlindBoxApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: GameConfig) -> Self {
        let mut engine = GameEngine::new(config);
        let dirty = Rc::new(Cell::new(true));
        let flag = Rc::clone(&dirty);
        engine.subscribe(move || flag.set(true));
        engine.start_new_game();

        Self {
            engine,
            board_view: BoardView::default(),
            dirty,
        }
    }

    /// Apply a settings change and start over with it
    fn new_game_with(&mut self, patch: ConfigPatch) {
        if !self.engine.update_config(&patch) {
            self.engine.restart();
        }
        info!(?patch, "new game from menu");
    }

    fn render_menu_bar(&mut self, ctx: &Context) {
        TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("Game", |ui| {
                    let modes = [
                        ("New Game (PvE - Black)", GameMode::Pve, Player::Black),
                        ("New Game (PvE - White)", GameMode::Pve, Player::White),
                        ("New Game (PvP)", GameMode::Pvp, Player::Black),
                    ];
                    for (label, mode, color) in modes {
                        if ui.button(label).clicked() {
                            self.new_game_with(ConfigPatch {
                                mode: Some(mode),
                                player_color: Some(color),
                                ..Default::default()
                            });
                            ui.close_menu();
                        }
                    }
                    ui.separator();
                    if ui.button("Undo (U)").clicked() {
                        self.engine.undo_move();
                        ui.close_menu();
                    }
                });

                ui.menu_button("Settings", |ui| {
                    let config = self.engine.config();

                    ui.label(RichText::new("Board").color(TEXT_MUTED));
                    for size in [BoardSize::Fifteen, BoardSize::Nineteen] {
                        let label = format!("{0}x{0}", size.side());
                        if ui.radio(config.board_size == size, label).clicked() {
                            self.engine.set_board_size(size);
                            ui.close_menu();
                        }
                    }

                    ui.separator();
                    ui.label(RichText::new("Difficulty").color(TEXT_MUTED));
                    for difficulty in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
                        let label = format!("{:?}", difficulty);
                        if ui.radio(config.difficulty == difficulty, label).clicked() {
                            self.engine.update_config(&ConfigPatch {
                                difficulty: Some(difficulty),
                                ..Default::default()
                            });
                        }
                    }

                    ui.separator();
                    let mut items = config.enable_items;
                    if ui.checkbox(&mut items, "Blind boxes").changed() {
                        self.new_game_with(ConfigPatch {
                            enable_items: Some(items),
                            ..Default::default()
                        });
                    }
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let config = self.engine.config();
                    let mode_text = match config.mode {
                        GameMode::Pve => format!("PvE - You: {}", config.player_color.name()),
                        GameMode::Pvp => "PvP - Hotseat".to_string(),
                    };
                    ui.label(mode_text);
                });
            });
        });
    }

    fn render_side_panel(&mut self, ctx: &Context) {
        SidePanel::right("info_panel")
            .min_width(240.0)
            .max_width(280.0)
            .frame(Frame::new().fill(PANEL_BG))
            .show(ctx, |ui| {
                ui.add_space(12.0);
                self.render_title_card(ui);
                ui.add_space(12.0);
                self.render_turn_card(ui);
                ui.add_space(10.0);
                self.render_effects_card(ui);

                if let Some(item) = self.engine.last_item_used() {
                    ui.add_space(10.0);
                    self.render_item_card(ui, item);
                }

                ui.add_space(10.0);
                self.render_actions_card(ui);

                if self.engine.state() == GameState::Over {
                    ui.add_space(10.0);
                    self.render_game_over_card(ui);
                }

                if let Some(text) = self.engine.notification() {
                    ui.add_space(10.0);
                    Self::render_message_card(ui, text);
                }
            });
    }

    fn card_frame() -> Frame {
        Frame::new()
            .fill(CARD_BG)
            .corner_radius(CornerRadius::same(8))
            .inner_margin(12.0)
    }

    fn button(ui: &mut egui::Ui, label: &str) -> bool {
        Frame::new()
            .fill(BUTTON_BG)
            .corner_radius(CornerRadius::same(6))
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.add(egui::Label::new(RichText::new(label).size(12.0).color(TEXT_PRIMARY)).sense(egui::Sense::click()))
                    .clicked()
            })
            .inner
    }

    fn render_title_card(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.add_space(8.0);
            ui.label(RichText::new("GOMOKU").size(22.0).strong().color(TEXT_PRIMARY));
        });
        ui.horizontal(|ui| {
            ui.add_space(8.0);
            ui.label(RichText::new("Blind Box Edition").size(11.0).color(TEXT_MUTED));
        });
    }

    fn turn_status(&self) -> (String, Color32) {
        let engine = &self.engine;
        match engine.state() {
            GameState::Ready => ("Press N to start".into(), TEXT_MUTED),
            GameState::Paused => ("Paused".into(), STATUS_WARNING),
            GameState::Over => ("Game over".into(), WIN_HIGHLIGHT),
            GameState::Playing => match engine.sub_state() {
                SubState::SelectingStrikeTarget { .. } => ("Pick a stone to strike".into(), STATUS_ALERT),
                SubState::HandSlipPenalty { .. } => ("Hand slipped: orange cells only".into(), STATUS_WARNING),
                SubState::ShowingStrategyGuide { .. } => ("Guide: blue cells recommended".into(), GUIDE_MARKER),
                SubState::ShowingItemName { item, .. } => (format!("Opened {}", item.name()), BLIND_BOX_TEXT),
                SubState::Normal if engine.ai_pending() => ("AI thinking...".into(), STATUS_WARNING),
                SubState::Normal if engine.is_ai_turn() => ("AI to move".into(), STATUS_WARNING),
                SubState::Normal => ("Your turn".into(), STATUS_OK),
            },
        }
    }

    fn render_turn_card(&self, ui: &mut egui::Ui) {
        Self::card_frame().show(ui, |ui| {
            let player = self.engine.current_player();
            let (accent, fg) = match player {
                Player::Black => (Color32::from_rgb(70, 70, 75), TEXT_PRIMARY),
                Player::White => (Color32::from_rgb(220, 220, 225), Color32::from_rgb(30, 30, 35)),
            };

            ui.horizontal(|ui| {
                let (rect, _) = ui.allocate_exact_size(Vec2::new(48.0, 48.0), egui::Sense::hover());
                ui.painter().circle_filled(rect.center(), 22.0, accent);
                let extra = self.engine.move_counts(player).current_extra_moves;
                if extra > 0 {
                    ui.painter().text(
                        rect.center(),
                        egui::Align2::CENTER_CENTER,
                        format!("+{}", extra),
                        egui::FontId::proportional(16.0),
                        fg,
                    );
                }

                ui.add_space(12.0);
                ui.vertical(|ui| {
                    ui.add_space(4.0);
                    ui.label(RichText::new(player.name().to_uppercase()).size(18.0).strong().color(TEXT_PRIMARY));
                    let (status, color) = self.turn_status();
                    ui.label(RichText::new(status).size(12.0).color(color));
                });
            });
        });
    }

    /// Live effects and move counters for both sides
    fn render_effects_card(&self, ui: &mut egui::Ui) {
        Self::card_frame().show(ui, |ui| {
            ui.label(RichText::new("PLAYERS").size(10.0).color(TEXT_MUTED));
            ui.add_space(6.0);

            for player in [Player::Black, Player::White] {
                let counts = self.engine.move_counts(player);
                ui.horizontal(|ui| {
                    ui.label(RichText::new(player.name()).size(13.0).strong().color(TEXT_PRIMARY));
                    if self.engine.has_effect(player, ItemType::ToughenHeart) {
                        ui.label(RichText::new(ItemType::ToughenHeart.info().icon).size(13.0).color(STRENGTHENING));
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            RichText::new(format!(
                                "{} stones",
                                self.engine.board().stone_count(player)
                            ))
                            .size(11.0)
                            .color(TEXT_SECONDARY),
                        );
                    });
                });
                ui.label(
                    RichText::new(format!(
                        "moves {}  extra {}/{}  banked {}",
                        counts.original_move_count,
                        counts.extra_moves_used,
                        counts.extra_moves_earned,
                        counts.current_extra_moves
                    ))
                    .size(10.0)
                    .color(TEXT_MUTED),
                );
                ui.add_space(4.0);
            }
        });
    }

    fn render_item_card(&self, ui: &mut egui::Ui, item: ItemType) {
        let info = item.info();
        let accent = if info.strengthening { STRENGTHENING } else { WEAKENING };
        Self::card_frame().show(ui, |ui| {
            ui.label(RichText::new("LAST ITEM").size(10.0).color(TEXT_MUTED));
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.label(RichText::new(info.icon).size(18.0));
                ui.label(RichText::new(info.name).size(14.0).strong().color(accent));
            });
            ui.label(RichText::new(info.description).size(11.0).color(TEXT_SECONDARY));
        });
    }

    fn render_actions_card(&mut self, ui: &mut egui::Ui) {
        Self::card_frame().show(ui, |ui| {
            ui.label(RichText::new("ACTIONS").size(10.0).color(TEXT_MUTED));
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                if Self::button(ui, "Undo") {
                    self.engine.undo_move();
                }
                ui.add_space(4.0);
                let pause_label = if self.engine.state() == GameState::Paused { "Resume" } else { "Pause" };
                if Self::button(ui, pause_label) {
                    self.toggle_pause();
                }
                ui.add_space(4.0);
                if Self::button(ui, "New") {
                    self.engine.restart();
                }
            });

            ui.add_space(8.0);
            let boxes = self.engine.blind_boxes().iter().filter(|b| !b.opened).count();
            ui.label(
                RichText::new(format!(
                    "Move #{}  |  boxes on board: {}",
                    self.engine.board().moves().len(),
                    boxes
                ))
                .size(11.0)
                .color(TEXT_SECONDARY),
            );
        });
    }

    fn render_game_over_card(&mut self, ui: &mut egui::Ui) {
        let headline = match self.engine.winner() {
            Some(player) => format!("{} WINS!", player.name().to_uppercase()),
            None => "DRAW".to_string(),
        };

        Frame::new()
            .fill(Color32::from_rgb(45, 80, 55))
            .corner_radius(CornerRadius::same(8))
            .inner_margin(16.0)
            .show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new("GAME OVER").size(12.0).color(Color32::from_rgb(180, 255, 180)));
                    ui.add_space(8.0);
                    ui.label(RichText::new(headline).size(18.0).strong().color(TEXT_PRIMARY));
                    ui.add_space(12.0);
                    if Self::button(ui, "New Game") {
                        self.engine.restart();
                    }
                });
            });
    }

    fn render_message_card(ui: &mut egui::Ui, msg: &str) {
        Frame::new()
            .fill(Color32::from_rgb(80, 60, 30))
            .corner_radius(CornerRadius::same(8))
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.label(RichText::new(msg).size(11.0).color(TEXT_PRIMARY));
            });
    }

    fn render_board(&mut self, ctx: &Context) {
        CentralPanel::default()
            .frame(Frame::new().fill(BOARD_AREA_BG).inner_margin(10.0))
            .show(ctx, |ui| {
                if let Some(pos) = self.board_view.show(ui, &self.engine) {
                    if let Err(err) = self.engine.try_move(pos) {
                        debug!(%pos, %err, "click rejected");
                    }
                }
            });
    }

    fn toggle_pause(&mut self) {
        if !self.engine.pause() {
            self.engine.resume();
        }
    }

    fn handle_input(&mut self, ctx: &Context) {
        let (new_game, undo, pause) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::N),
                i.key_pressed(egui::Key::U),
                i.key_pressed(egui::Key::P),
            )
        });
        if new_game {
            self.engine.restart();
        }
        if undo {
            self.engine.undo_move();
        }
        if pause {
            self.toggle_pause();
        }
    }

    /// Something on the clock is still counting down
    fn has_timers(&self) -> bool {
        self.engine.ai_pending()
            || self.engine.notification().is_some()
            || matches!(self.engine.sub_state(), SubState::ShowingItemName { .. })
    }
}

impl eframe::App for BlindBoxApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.handle_input(ctx);

        let dt = ctx.input(|i| i.stable_dt).clamp(0.0, 0.25);
        self.engine.advance(Duration::from_secs_f32(dt));

        self.render_menu_bar(ctx);
        self.render_side_panel(ctx);
        self.render_board(ctx);

        if self.dirty.replace(false) {
            ctx.request_repaint();
        } else if self.has_timers() {
            ctx.request_repaint_after(TICK);
        }
    }
}
