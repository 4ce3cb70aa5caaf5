use eframe::egui::{ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{CellValue, Table};

const ROW_HEIGHT: f32 = 18.0;

fn cell_text(value: &CellValue) -> String {
    match value {
        CellValue::Null => String::new(),
        other => other.to_string(),
    }
}

/// Scrollable grid of every row and column of `table`.
pub fn data_table(ui: &mut Ui, id: &str, table: &Table, max_height: f32) {
    let names = table.column_names();
    if names.is_empty() {
        ui.label("No columns.");
        return;
    }

    ui.push_id(id, |ui: &mut Ui| {
        ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .max_scroll_height(max_height)
                .columns(Column::auto().at_least(70.0), names.len())
                .header(ROW_HEIGHT + 2.0, |mut header| {
                    for name in &names {
                        header.col(|ui: &mut Ui| {
                            ui.strong(*name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, table.len(), |mut row| {
                        let i = row.index();
                        for c in 0..names.len() {
                            row.col(|ui: &mut Ui| {
                                if let Some(value) = table.cell(i, c) {
                                    ui.label(cell_text(value));
                                }
                            });
                        }
                    });
                });
        });
    });
}

/// Two-column label/value listing, used for the small aggregate tables.
pub fn key_value_table(ui: &mut Ui, id: &str, headers: [&str; 2], rows: &[(String, String)]) {
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().at_least(120.0))
            .column(Column::remainder().at_least(120.0))
            .header(ROW_HEIGHT + 2.0, |mut header| {
                for h in headers {
                    header.col(|ui: &mut Ui| {
                        ui.strong(h);
                    });
                }
            })
            .body(|mut body| {
                for (key, value) in rows {
                    body.row(ROW_HEIGHT, |mut row| {
                        row.col(|ui: &mut Ui| {
                            ui.label(key);
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(value);
                        });
                    });
                }
            });
    });
}
