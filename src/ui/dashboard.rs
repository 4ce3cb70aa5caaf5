use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use super::{charts, panels, table};
use crate::data::aggregate::Summary;
use crate::data::dates::DateRange;
use crate::data::error::DashboardError;
use crate::data::model::Table;
use crate::format::{format_currency, format_thousands};
use crate::pipeline::{DashboardView, DateWindow};
use crate::state::AppState;

const PREVIEW_HEIGHT: f32 = 260.0;

fn error_label(ui: &mut Ui, err: &DashboardError) {
    ui.label(RichText::new(err.to_string()).color(Color32::RED));
}

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

pub fn central_panel(ui: &mut Ui, state: &mut AppState, view: Option<&DashboardView>) {
    ui.heading(RichText::new("📊 Sample Import Export EDA").size(28.0).strong());
    ui.add_space(4.0);
    panels::upload_row(ui, state);
    ui.separator();

    let Some(view) = view else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Upload a file to explore transactions  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            date_section(ui, state, &view.dates);
            ui.separator();

            if view.table.is_empty() {
                ui.label(RichText::new("No rows match the current filters.").weak());
            }
            metric_cards(ui, &view.summary);
            ui.add_space(8.0);
            top_countries(ui, &view.summary);
            ui.separator();

            ui.heading("Dashboard Overview");
            ui.columns(3, |cols: &mut [Ui]| {
                charts::quantity_by_category(&mut cols[0], &view.summary.quantity_by_category);
                charts::quantity_by_shipping(&mut cols[1], &view.summary.quantity_by_shipping);
                charts::weight_by_category_shipping(
                    &mut cols[2],
                    &view.summary.weight_by_category_shipping,
                );
            });
            ui.separator();

            charts::value_by_category(ui, &view.summary.value_by_category);
            ui.separator();

            final_table(ui, &view.table);
            monthly_section(ui, &view.summary);
        });
}

// ---------------------------------------------------------------------------
// Date pickers and preview
// ---------------------------------------------------------------------------

fn date_section(ui: &mut Ui, state: &mut AppState, dates: &Result<DateWindow, DashboardError>) {
    let window = match dates {
        Ok(window) => window,
        Err(e) => {
            error_label(ui, e);
            return;
        }
    };

    let (Some(bounds), Some(chosen)) = (window.bounds, window.chosen) else {
        ui.label(
            RichText::new(format!(
                "No rows with a valid Date ({} rows with an unparseable Date were dropped).",
                window.dropped
            ))
            .color(Color32::RED),
        );
        return;
    };

    let mut start = chosen.start;
    let mut end = chosen.end;
    ui.columns(2, |cols: &mut [Ui]| {
        cols[0].label("Start Date");
        cols[0].add(
            DatePickerButton::new(&mut start).id_salt("start_date"),
        );
        cols[1].label("End Date");
        cols[1].add(
            DatePickerButton::new(&mut end).id_salt("end_date"),
        );
    });
    if start != chosen.start || end != chosen.end {
        state.set_date_range(DateRange::new(start, end).clamp_to(bounds));
    }

    if window.dropped > 0 {
        ui.label(
            RichText::new(format!(
                "{} rows with an unparseable Date were dropped",
                window.dropped
            ))
            .weak(),
        );
    }

    ui.add_space(4.0);
    egui::CollapsingHeader::new(format!("Filtered data ({} rows)", window.filtered.len()))
        .id_salt("date_preview")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            table::data_table(ui, "date_preview_table", &window.filtered, PREVIEW_HEIGHT);
        });
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

fn metric_card(ui: &mut Ui, label: &str, value: Result<String, &DashboardError>) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.label(RichText::new(label).weak());
        match value {
            Ok(v) => ui.label(RichText::new(v).size(26.0).strong()),
            Err(e) => ui.label(RichText::new(e.to_string()).color(Color32::RED)),
        };
    });
}

fn metric_cards(ui: &mut Ui, summary: &Summary) {
    let counts = summary.import_export.as_ref();
    ui.columns(4, |cols: &mut [Ui]| {
        metric_card(&mut cols[0], "Total Imports", counts.map(|c| c.imports.to_string()));
        metric_card(&mut cols[1], "Total Exports", counts.map(|c| c.exports.to_string()));
        metric_card(
            &mut cols[2],
            "Total Transaction Value",
            summary.total_value.as_ref().map(|v| format_currency(*v)),
        );
        metric_card(
            &mut cols[3],
            "Total Quantity",
            summary.total_quantity.as_ref().map(|v| format_thousands(*v, 2)),
        );
    });
}

fn top_countries(ui: &mut Ui, summary: &Summary) {
    ui.heading("Top 5 Countries by Transaction Value");
    match &summary.top_countries {
        Ok(groups) => {
            let rows: Vec<(String, String)> = groups
                .iter()
                .map(|g| (g.key.clone(), format_thousands(g.total, 2)))
                .collect();
            table::key_value_table(ui, "top_countries", ["Country", "Value"], &rows);
        }
        Err(e) => error_label(ui, e),
    }
}

/// Rows left after every filter, with the derived `Month` column.
fn final_table(ui: &mut Ui, filtered: &Table) {
    egui::CollapsingHeader::new(format!("Final filtered data ({} rows)", filtered.len()))
        .id_salt("final_table")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            table::data_table(ui, "final_table_grid", filtered, PREVIEW_HEIGHT);
        });
    ui.add_space(4.0);
}

// ---------------------------------------------------------------------------
// Monthly trend
// ---------------------------------------------------------------------------

fn monthly_section(ui: &mut Ui, summary: &Summary) {
    ui.heading("Monthly Trend of Transactions");
    match &summary.monthly_value {
        Ok(months) => {
            let rows: Vec<(String, String)> = months
                .iter()
                .map(|m| (m.month.clone(), format_thousands(m.total, 2)))
                .collect();
            table::key_value_table(ui, "monthly_trend_table", ["Month", "Value"], &rows);
            ui.add_space(4.0);
            charts::monthly_trend(ui, months);
        }
        Err(e) => error_label(ui, e),
    }
}
