use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::FilterStage;
use crate::data::loader::DataSource;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – cascading multiselects
// ---------------------------------------------------------------------------

/// Render the sidebar filters in cascade order.
pub fn side_panel(ui: &mut Ui, state: &mut AppState, stages: &[FilterStage]) {
    ui.heading("Choose your filter: ");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for stage in stages {
                multiselect(ui, state, stage);
                ui.add_space(4.0);
            }
        });
}

fn multiselect(ui: &mut Ui, state: &mut AppState, stage: &FilterStage) {
    let label = stage.column.label();
    let options = match &stage.options {
        Ok(options) => options,
        Err(e) => {
            ui.strong(label);
            ui.label(RichText::new(e.to_string()).color(Color32::RED));
            return;
        }
    };

    // Show count of selected / offered in the header
    let header_text = format!("{label}  ({}/{})", stage.selected.len(), options.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(label)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(stage.column, options);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(stage.column);
                }
            });

            ui.label(RichText::new(format!("{} → {} rows", stage.rows_in, stage.rows_out)).weak());
            if options.is_empty() {
                ui.label(RichText::new("No values left").weak());
            }
            for value in options {
                let mut checked = stage.selected.contains(value);
                if ui.checkbox(&mut checked, value.as_str()).changed() {
                    state.toggle_filter_value(stage.column, value);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState, rows_shown: Option<usize>) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Load sample dataset").clicked() {
                state.load(DataSource::Fallback);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} rows loaded, {} after filters",
                ds.len(),
                rows_shown.unwrap_or(0)
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

/// The upload control at the top of the page.
pub fn upload_row(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("📁 Upload a file").clicked() {
            open_file_dialog(state);
        }
        match &state.source_label {
            Some(label) => ui.label(format!("Showing {label}")),
            None => ui.label("No file loaded"),
        };
        ui.label(RichText::new("(or drop a .csv, .txt, .xlsx or .xls file on the window)").weak());
    });
}

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Upload a file")
        .add_filter("Supported files", &["csv", "txt", "xlsx", "xls"])
        .add_filter("Delimited text", &["csv", "txt"])
        .add_filter("Excel", &["xlsx", "xls"])
        .pick_file();

    if let Some(path) = file {
        state.load(DataSource::Upload(path));
    }
}

/// Load the last file dropped onto the window, whatever its type. Unsupported
/// types end up as a visible error.
pub fn handle_dropped_files(ctx: &egui::Context, state: &mut AppState) {
    let dropped = ctx.input(|i| i.raw.dropped_files.clone());
    if let Some(path) = dropped.into_iter().rev().find_map(|f| f.path) {
        state.load(DataSource::Upload(path));
    }
}
