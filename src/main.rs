//! Blind-box Gomoku GUI

use blindbox_gomoku::ui::BlindBoxApp;
use blindbox_gomoku::GameConfig;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Path to a JSON game config
const CONFIG_ENV: &str = "BLINDBOX_GOMOKU_CONFIG";

fn load_config() -> GameConfig {
    let Ok(path) = std::env::var(CONFIG_ENV) else {
        return GameConfig::default();
    };
    match GameConfig::load(&path) {
        Ok(config) => {
            info!(%path, "config loaded");
            config
        }
        Err(err) => {
            warn!(%path, %err, "could not load config, using defaults");
            GameConfig::default()
        }
    }
}

fn main() -> Result<(), eframe::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 750.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Gomoku - Blind Box"),
        ..Default::default()
    };

    eframe::run_native(
        "Blind Box Gomoku",
        options,
        Box::new(move |cc| Ok(Box::new(BlindBoxApp::new(cc, config)))),
    )
}
