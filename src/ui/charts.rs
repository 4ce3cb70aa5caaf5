use std::f64::consts::{FRAC_PI_2, TAU};

use eframe::egui::{Align2, Color32, RichText, Stroke, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Polygon, Text};

use crate::color::{set2, ColorMap};
use crate::data::aggregate::{GroupTotal, MonthTotal, PairMean};
use crate::data::error::DashboardError;
use crate::format::format_thousands;

const CHART_HEIGHT: f32 = 320.0;
const BAR_COLOR: Color32 = Color32::from_rgb(0x4c, 0x72, 0xb0);
/// Fraction of the radius each pie slice is pushed out by.
const PIE_PULL: f64 = 0.05;
/// Inner radius of the donut relative to the outer one.
const DONUT_HOLE: f64 = 0.4;
/// Largest angle one polygon may span; plot polygons are filled as convex.
const MAX_PIECE_ANGLE: f64 = 4.0 * std::f64::consts::PI / 180.0;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// One wedge of a pie, angles in radians, drawn clockwise from 12 o'clock.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub fraction: f64,
    pub start: f64,
    pub end: f64,
}

impl Slice {
    pub fn mid_angle(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// Lay out labelled values as pie slices. Non-positive values get no slice;
/// an all-zero input gives no slices at all.
pub fn pie_slices(items: &[(String, f64)]) -> Vec<Slice> {
    let positive = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
    let total: f64 = items.iter().map(|(_, v)| positive(*v)).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut cumulative = 0.0;
    items
        .iter()
        .filter(|(_, v)| positive(*v) > 0.0)
        .map(|(label, value)| {
            let fraction = value / total;
            let start = FRAC_PI_2 - TAU * cumulative;
            cumulative += fraction;
            Slice {
                label: label.clone(),
                fraction,
                start,
                end: FRAC_PI_2 - TAU * cumulative,
            }
        })
        .collect()
}

/// Split an annular sector into convex polygons. `inner == 0` gives plain
/// pie triangles meeting at `center`.
pub fn sector_pieces(center: [f64; 2], inner: f64, outer: f64, a0: f64, a1: f64) -> Vec<Vec<[f64; 2]>> {
    let steps = ((a1 - a0).abs() / MAX_PIECE_ANGLE - 1e-9).ceil().max(1.0) as usize;
    let at = |r: f64, t: f64| [center[0] + r * t.cos(), center[1] + r * t.sin()];

    (0..steps)
        .map(|k| {
            let t0 = a0 + (a1 - a0) * k as f64 / steps as f64;
            let t1 = a0 + (a1 - a0) * (k + 1) as f64 / steps as f64;
            if inner <= 0.0 {
                vec![center, at(outer, t0), at(outer, t1)]
            } else {
                vec![at(inner, t0), at(outer, t0), at(outer, t1), at(inner, t1)]
            }
        })
        .collect()
}

/// Axis label for a categorical axis: the label under each integer tick.
pub fn category_tick(labels: &[String], value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Widgets
// ---------------------------------------------------------------------------

fn show_error(ui: &mut Ui, err: &DashboardError) {
    ui.label(RichText::new(err.to_string()).color(Color32::RED));
}

fn bar_chart(ui: &mut Ui, id: &str, y_label: &str, groups: &[GroupTotal], color_of: impl Fn(&str) -> Color32) {
    let labels: Vec<String> = groups.iter().map(|g| g.key.clone()).collect();
    let bars: Vec<Bar> = groups
        .iter()
        .enumerate()
        .map(|(i, g)| {
            Bar::new(i as f64, g.total)
                .name(&g.key)
                .fill(color_of(&g.key))
                .width(0.6)
        })
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .y_axis_label(y_label)
        .x_axis_formatter(move |mark, _range| category_tick(&labels, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
            for (i, g) in groups.iter().enumerate() {
                plot_ui.text(
                    Text::new(PlotPoint::new(i as f64, g.total), format_thousands(g.total, 2))
                        .anchor(Align2::CENTER_BOTTOM),
                );
            }
        });
}

fn pie_chart(ui: &mut Ui, id: &str, slices: &[Slice], hole: f64, pull: f64, color_of: impl Fn(usize, &str) -> Color32) {
    if slices.is_empty() {
        ui.label("No data for the current filters.");
        return;
    }

    Plot::new(id)
        .height(CHART_HEIGHT)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            for (i, slice) in slices.iter().enumerate() {
                let mid = slice.mid_angle();
                let offset = [pull * mid.cos(), pull * mid.sin()];
                let color = color_of(i, &slice.label);

                for piece in sector_pieces(offset, hole, 1.0, slice.start, slice.end) {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::new(piece))
                            .fill_color(color)
                            .stroke(Stroke::new(0.5, color))
                            .name(&slice.label),
                    );
                }

                let label_radius = if hole > 0.0 { (hole + 1.0) / 2.0 } else { 0.65 };
                plot_ui.text(Text::new(
                    PlotPoint::new(
                        offset[0] + label_radius * mid.cos(),
                        offset[1] + label_radius * mid.sin(),
                    ),
                    RichText::new(format!("{}\n{:.1}%", slice.label, slice.fraction * 100.0))
                        .color(Color32::BLACK),
                ));
            }
        });
}

/// Bar chart of quantity per category with value labels.
pub fn quantity_by_category(ui: &mut Ui, groups: &Result<Vec<GroupTotal>, DashboardError>) {
    ui.heading("Category-wise Quantity");
    match groups {
        Ok(groups) => bar_chart(ui, "category_quantity", "Quantity", groups, |_| BAR_COLOR),
        Err(e) => show_error(ui, e),
    }
}

/// Pie of quantity per shipping method, slices pulled apart.
pub fn quantity_by_shipping(ui: &mut Ui, groups: &Result<Vec<GroupTotal>, DashboardError>) {
    ui.heading("Shipping Method-wise Quantity");
    match groups {
        Ok(groups) => {
            let items: Vec<(String, f64)> = groups.iter().map(|g| (g.key.clone(), g.total)).collect();
            let colors = ColorMap::new(groups.iter().map(|g| g.key.as_str()));
            pie_chart(ui, "shipping_quantity", &pie_slices(&items), 0.0, PIE_PULL, |_, label| {
                colors.color_for(label)
            });
        }
        Err(e) => show_error(ui, e),
    }
}

/// Donut of the average weight per (category, shipping method) pair.
pub fn weight_by_category_shipping(ui: &mut Ui, means: &Result<Vec<PairMean>, DashboardError>) {
    ui.heading("Average Weight by Category and Shipping Method");
    match means {
        Ok(means) => {
            let items: Vec<(String, f64)> = means
                .iter()
                .map(|m| (format!("{} · {}", m.first, m.second), m.mean))
                .collect();
            pie_chart(ui, "weight_donut", &pie_slices(&items), DONUT_HOLE, 0.0, |i, _| set2(i));
        }
        Err(e) => show_error(ui, e),
    }
}

/// Bar chart of transaction value per category, one colour per category.
pub fn value_by_category(ui: &mut Ui, groups: &Result<Vec<GroupTotal>, DashboardError>) {
    ui.heading("Category-wise Transaction Value");
    match groups {
        Ok(groups) => {
            let colors = ColorMap::new(groups.iter().map(|g| g.key.as_str()));
            bar_chart(ui, "category_value", "Value", groups, |key| colors.color_for(key));
        }
        Err(e) => show_error(ui, e),
    }
}

/// Line with point markers of the value per month.
pub fn monthly_trend(ui: &mut Ui, months: &[MonthTotal]) {
    let labels: Vec<String> = months.iter().map(|m| m.month.clone()).collect();
    let points: Vec<[f64; 2]> = months
        .iter()
        .enumerate()
        .map(|(i, m)| [i as f64, m.total])
        .collect();

    Plot::new("monthly_trend")
        .height(CHART_HEIGHT)
        .x_axis_label("Month")
        .y_axis_label("Value")
        .x_axis_formatter(move |mark, _range| category_tick(&labels, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(PlotPoints::new(points.clone())).name("Value").width(2.0));
            plot_ui.points(Points::new(PlotPoints::new(points)).radius(4.0).name("Value"));
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(values: &[(&str, f64)]) -> Vec<(String, f64)> {
        values.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn slices_cover_the_full_circle() {
        let slices = pie_slices(&items(&[("Air", 1.0), ("Sea", 2.0), ("Land", 1.0)]));
        assert_eq!(slices.len(), 3);
        assert!((slices[0].start - FRAC_PI_2).abs() < 1e-12);
        assert!((slices[2].end - (FRAC_PI_2 - TAU)).abs() < 1e-12);
        assert!((slices[1].fraction - 0.5).abs() < 1e-12);
        for pair in slices.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn zero_and_negative_values_get_no_slice() {
        assert!(pie_slices(&items(&[("a", 0.0), ("b", -1.0)])).is_empty());
        let slices = pie_slices(&items(&[("a", 0.0), ("b", 3.0)]));
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].label, "b");
        assert_eq!(slices[0].fraction, 1.0);
    }

    #[test]
    fn sector_pieces_are_small_and_shaped() {
        let pie = sector_pieces([0.0, 0.0], 0.0, 1.0, FRAC_PI_2, FRAC_PI_2 - TAU);
        assert_eq!(pie.len(), 90);
        assert!(pie.iter().all(|p| p.len() == 3 && p[0] == [0.0, 0.0]));

        let donut = sector_pieces([0.1, 0.0], 0.4, 1.0, 0.0, 0.01);
        assert_eq!(donut.len(), 1);
        assert_eq!(donut[0].len(), 4);
        assert!((donut[0][0][0] - 0.5).abs() < 1e-12);
        assert!((donut[0][1][0] - 1.1).abs() < 1e-12);
    }

    #[test]
    fn ticks_only_on_whole_positions() {
        let labels = vec!["2023-01".to_string(), "2023-02".to_string()];
        assert_eq!(category_tick(&labels, 1.0), "2023-02");
        assert_eq!(category_tick(&labels, 0.5), "");
        assert_eq!(category_tick(&labels, 2.0), "");
        assert_eq!(category_tick(&labels, -1.0), "");
    }
}
