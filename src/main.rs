mod app;
mod color;
mod config;
mod data;
mod format;
mod pipeline;
mod state;
mod ui;

use app::TradeLensApp;
use config::DashboardConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::default();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("IMPORT EXPORT!!!")
            .with_inner_size(config.window_size)
            .with_min_inner_size(config.min_window_size)
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "IMPORT EXPORT!!!",
        options,
        Box::new(|_cc| Ok(Box::new(TradeLensApp::new(config)))),
    )
}
