use eframe::egui;

use crate::config::DashboardConfig;
use crate::data::loader::DataSource;
use crate::state::AppState;
use crate::ui::{dashboard, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct TradeLensApp {
    pub state: AppState,
}

impl TradeLensApp {
    /// Start on the sampled fallback dataset, like a fresh page with no upload.
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = AppState::new(config);
        state.load(DataSource::Fallback);
        Self { state }
    }
}

impl eframe::App for TradeLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        panels::handle_dropped_files(ctx, &mut self.state);

        // The whole pipeline runs again every frame from the raw rows.
        let view = self.state.current_view();
        let stages = view.as_ref().map(|v| v.stages.as_slice()).unwrap_or_default();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state, view.as_ref().map(|v| v.summary.row_count));
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(self.state.config.sidebar_width)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state, stages);
            });

        // ---- Central panel: metrics, tables and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            dashboard::central_panel(ui, &mut self.state, view.as_ref());
        });
    }
}
