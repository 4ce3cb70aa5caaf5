//! The whole dashboard as one pure function of the raw table and the widget
//! selections. The app calls [`render`] every frame and draws the result.

use crate::data::aggregate::{with_month_column, Summary};
use crate::data::dates::{normalize_dates, DateBounds, DateRange};
use crate::data::error::DashboardError;
use crate::data::filter::{filter_date_range, run_cascade, FilterStage, Selections};
use crate::data::model::Table;

/// Everything the user can change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiSelections {
    /// `None` until the user touches a date picker: the full data range.
    pub date_range: Option<DateRange>,
    pub categorical: Selections,
}

/// Date section of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct DateWindow {
    /// `None` when no row has a valid date.
    pub bounds: Option<DateBounds>,
    /// The window actually applied, already clamped into `bounds`.
    pub chosen: Option<DateRange>,
    /// Rows discarded for an unparseable date.
    pub dropped: usize,
    /// Rows inside the window; shown as the preview table.
    pub filtered: Table,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    /// `Err` when the table has no `Date` column; the cascade then runs on the
    /// undated table.
    pub dates: Result<DateWindow, DashboardError>,
    pub stages: Vec<FilterStage>,
    /// Final filtered rows with the derived `Month` column when it could be
    /// computed.
    pub table: Table,
    pub summary: Summary,
}

pub fn render(raw: &Table, selections: &UiSelections) -> DashboardView {
    let dates = date_window(raw, selections.date_range);

    let dated = match &dates {
        Ok(window) => &window.filtered,
        Err(_) => raw,
    };
    let cascade = run_cascade(dated, &selections.categorical);
    let summary = Summary::compute(&cascade.table);
    let table = with_month_column(&cascade.table).unwrap_or(cascade.table);

    DashboardView {
        dates,
        stages: cascade.stages,
        table,
        summary,
    }
}

fn date_window(raw: &Table, requested: Option<DateRange>) -> Result<DateWindow, DashboardError> {
    let normalized = normalize_dates(raw)?;
    if normalized.dropped > 0 {
        log::debug!("dropped {} rows with unparseable dates", normalized.dropped);
    }

    let bounds = DateBounds::of(&normalized.table);
    let chosen = bounds.map(|b| requested.map_or(b.full_range(), |r| r.clamp_to(b)));
    let filtered = match chosen {
        Some(range) => filter_date_range(&normalized.table, range)?,
        None => normalized.table,
    };

    Ok(DateWindow {
        bounds,
        chosen,
        dropped: normalized.dropped,
        filtered,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::NaiveDate;

    use super::*;
    use crate::data::aggregate::ImportExportCounts;
    use crate::data::filter::FilterColumn;
    use crate::data::model::CellValue;
    use crate::format::format_currency;

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn two_months() -> Table {
        Table::from_rows(
            ["Date", "Category", "Shipping_Method", "Import_Export", "Payment_Terms", "Country", "Value", "Quantity", "Weight"]
                .map(String::from)
                .to_vec(),
            vec![
                vec![s("2023-01-15"), s("A"), s("Air"), s("Import"), s("Prepaid"), s("Chile"), CellValue::Integer(100), CellValue::Integer(1), CellValue::Float(2.0)],
                vec![s("2023-02-20"), s("A"), s("Sea"), s("Export"), s("Net 30"), s("Peru"), CellValue::Integer(50), CellValue::Integer(3), CellValue::Float(4.0)],
                vec![s("someday"), s("B"), s("Sea"), s("Export"), s("Net 30"), s("Peru"), CellValue::Integer(7), CellValue::Integer(1), CellValue::Float(1.0)],
            ],
        )
    }

    #[test]
    fn defaults_to_the_full_date_range() {
        let view = render(&two_months(), &UiSelections::default());
        let window = view.dates.unwrap();
        assert_eq!(window.dropped, 1);
        assert_eq!(window.chosen, Some(DateRange::new(d(2023, 1, 15), d(2023, 2, 20))));
        assert_eq!(view.table.len(), 2);
        assert_eq!(view.summary.total_value, Ok(150.0));
    }

    #[test]
    fn january_window_keeps_only_the_first_row() {
        let selections = UiSelections {
            date_range: Some(DateRange::new(d(2023, 1, 1), d(2023, 1, 31))),
            ..UiSelections::default()
        };
        let view = render(&two_months(), &selections);

        let window = view.dates.as_ref().unwrap();
        // Requested start lies before the data and is clamped.
        assert_eq!(window.chosen, Some(DateRange::new(d(2023, 1, 15), d(2023, 1, 31))));
        assert_eq!(window.filtered.len(), 1);
        assert_eq!(view.table.len(), 1);
        assert_eq!(
            view.summary.total_value.as_ref().map(|v| format_currency(*v)),
            Ok("$100.00".to_string())
        );
    }

    #[test]
    fn unknown_category_zeroes_every_metric() {
        let mut categorical = Selections::new();
        categorical.insert(FilterColumn::Category, BTreeSet::from(["Z".to_string()]));
        let view = render(
            &two_months(),
            &UiSelections {
                date_range: None,
                categorical,
            },
        );

        assert!(view.table.is_empty());
        assert_eq!(view.summary.import_export, Ok(ImportExportCounts::default()));
        assert_eq!(view.summary.total_value, Ok(0.0));
        assert_eq!(view.summary.total_quantity, Ok(0.0));
        assert_eq!(view.summary.top_countries, Ok(vec![]));
        assert_eq!(view.summary.monthly_value, Ok(vec![]));
    }

    #[test]
    fn missing_date_column_still_runs_the_cascade() {
        let raw = Table::from_rows(
            vec!["Category".into(), "Value".into()],
            vec![vec![s("A"), CellValue::Integer(5)], vec![s("B"), CellValue::Integer(6)]],
        );
        let mut categorical = Selections::new();
        categorical.insert(FilterColumn::Category, BTreeSet::from(["B".to_string()]));
        let view = render(
            &raw,
            &UiSelections {
                date_range: None,
                categorical,
            },
        );

        assert_eq!(view.dates, Err(DashboardError::MissingColumn("Date".into())));
        assert_eq!(view.summary.total_value, Ok(6.0));
        assert!(view.table.column("Month").is_err());
    }

    #[test]
    fn final_table_carries_month_column() {
        let view = render(&two_months(), &UiSelections::default());
        assert_eq!(
            view.table.column("Month").unwrap().values,
            vec![s("2023-01"), s("2023-02")]
        );
        // The preview is left as filtered.
        assert!(view.dates.unwrap().filtered.column("Month").is_err());
    }
}
