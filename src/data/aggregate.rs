use std::collections::BTreeMap;

use chrono::Datelike;

use super::error::DashboardError;
use super::model::{columns, CellValue, Table};

// ---------------------------------------------------------------------------
// Result rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportExportCounts {
    pub imports: usize,
    pub exports: usize,
}

/// One group of a single-key group-by.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTotal {
    pub key: String,
    pub total: f64,
}

/// One group of the (Category, Shipping_Method) mean.
#[derive(Debug, Clone, PartialEq)]
pub struct PairMean {
    pub first: String,
    pub second: String,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthTotal {
    /// `YYYY-MM`.
    pub month: String,
    pub total: f64,
}

// ---------------------------------------------------------------------------
// Primitive aggregations
// ---------------------------------------------------------------------------

fn numeric(column: &str, row: usize, value: &CellValue) -> Result<Option<f64>, DashboardError> {
    match value {
        CellValue::Null => Ok(None),
        other => other
            .as_f64()
            .map(Some)
            .ok_or_else(|| DashboardError::NonNumeric {
                column: column.to_string(),
                row,
                value: other.to_string(),
            }),
    }
}

/// Exact `"Import"` / `"Export"` counts; other values count towards neither.
pub fn import_export_counts(table: &Table) -> Result<ImportExportCounts, DashboardError> {
    let mut counts = ImportExportCounts::default();
    for value in &table.column(columns::IMPORT_EXPORT)?.values {
        match value {
            CellValue::String(s) if s == "Import" => counts.imports += 1,
            CellValue::String(s) if s == "Export" => counts.exports += 1,
            _ => {}
        }
    }
    Ok(counts)
}

/// Sum of a numeric column, skipping nulls.
pub fn sum_column(table: &Table, column: &str) -> Result<f64, DashboardError> {
    let mut total = 0.0;
    for (row, value) in table.column(column)?.values.iter().enumerate() {
        total += numeric(column, row, value)?.unwrap_or(0.0);
    }
    Ok(total)
}

/// Sum of `value` per distinct `key`, in ascending key order. Rows with a null
/// key are dropped.
pub fn sum_by(table: &Table, key: &str, value: &str) -> Result<Vec<GroupTotal>, DashboardError> {
    let keys = &table.column(key)?.values;
    let values = &table.column(value)?.values;

    let mut groups: BTreeMap<String, f64> = BTreeMap::new();
    for (row, (k, v)) in keys.iter().zip(values).enumerate() {
        let Some(k) = k.key() else {
            continue;
        };
        let v = numeric(value, row, v)?.unwrap_or(0.0);
        *groups.entry(k).or_insert(0.0) += v;
    }

    Ok(groups
        .into_iter()
        .map(|(key, total)| GroupTotal { key, total })
        .collect())
}

/// The `n` groups with the largest sums, descending. Equal sums keep
/// ascending key order.
pub fn top_n_by_sum(
    table: &Table,
    key: &str,
    value: &str,
    n: usize,
) -> Result<Vec<GroupTotal>, DashboardError> {
    let mut groups = sum_by(table, key, value)?;
    groups.sort_by(|a, b| b.total.total_cmp(&a.total));
    groups.truncate(n);
    Ok(groups)
}

/// Mean of `value` for each (`first`, `second`) pair. Nulls are skipped and
/// pairs without a single number are omitted.
pub fn mean_by_pair(
    table: &Table,
    first: &str,
    second: &str,
    value: &str,
) -> Result<Vec<PairMean>, DashboardError> {
    let firsts = &table.column(first)?.values;
    let seconds = &table.column(second)?.values;
    let values = &table.column(value)?.values;

    let mut groups: BTreeMap<(String, String), (f64, usize)> = BTreeMap::new();
    for row in 0..table.len() {
        let (Some(a), Some(b)) = (firsts[row].key(), seconds[row].key()) else {
            continue;
        };
        let entry = groups.entry((a, b)).or_insert((0.0, 0));
        if let Some(v) = numeric(value, row, &values[row])? {
            entry.0 += v;
            entry.1 += 1;
        }
    }

    Ok(groups
        .into_iter()
        .filter(|(_, (_, count))| *count > 0)
        .map(|((first, second), (sum, count))| PairMean {
            first,
            second,
            mean: sum / count as f64,
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Monthly trend
// ---------------------------------------------------------------------------

/// Copy of `table` with a `Month` column (`YYYY-MM`) truncated from `Date`.
pub fn with_month_column(table: &Table) -> Result<Table, DashboardError> {
    let months = table
        .column(columns::DATE)?
        .values
        .iter()
        .map(|v| match v.as_date() {
            Some(d) => CellValue::String(d.format("%Y-%m").to_string()),
            None => CellValue::Null,
        })
        .collect();
    table.with_column(columns::MONTH, months)
}

/// Sum of `value` per calendar month, oldest month first.
pub fn monthly_totals(table: &Table, value: &str) -> Result<Vec<MonthTotal>, DashboardError> {
    let dates = &table.column(columns::DATE)?.values;
    let values = &table.column(value)?.values;

    let mut months: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for (row, (date, v)) in dates.iter().zip(values).enumerate() {
        let Some(date) = date.as_date() else {
            continue;
        };
        let v = numeric(value, row, v)?.unwrap_or(0.0);
        *months.entry((date.year(), date.month())).or_insert(0.0) += v;
    }

    Ok(months
        .into_iter()
        .map(|((year, month), total)| MonthTotal {
            month: format!("{year:04}-{month:02}"),
            total,
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Summary – everything the dashboard shows
// ---------------------------------------------------------------------------

pub const TOP_COUNTRIES: usize = 5;

/// Every aggregate of the final filtered table. Each section keeps its own
/// `Result` so one missing column only blanks the widgets that need it.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub row_count: usize,
    pub import_export: Result<ImportExportCounts, DashboardError>,
    pub total_value: Result<f64, DashboardError>,
    pub total_quantity: Result<f64, DashboardError>,
    pub top_countries: Result<Vec<GroupTotal>, DashboardError>,
    pub quantity_by_category: Result<Vec<GroupTotal>, DashboardError>,
    pub quantity_by_shipping: Result<Vec<GroupTotal>, DashboardError>,
    pub weight_by_category_shipping: Result<Vec<PairMean>, DashboardError>,
    pub value_by_category: Result<Vec<GroupTotal>, DashboardError>,
    pub monthly_value: Result<Vec<MonthTotal>, DashboardError>,
}

impl Summary {
    pub fn compute(table: &Table) -> Summary {
        use columns::*;
        Summary {
            row_count: table.len(),
            import_export: import_export_counts(table),
            total_value: sum_column(table, VALUE),
            total_quantity: sum_column(table, QUANTITY),
            top_countries: top_n_by_sum(table, COUNTRY, VALUE, TOP_COUNTRIES),
            quantity_by_category: sum_by(table, CATEGORY, QUANTITY),
            quantity_by_shipping: sum_by(table, SHIPPING_METHOD, QUANTITY),
            weight_by_category_shipping: mean_by_pair(table, CATEGORY, SHIPPING_METHOD, WEIGHT),
            value_by_category: sum_by(table, CATEGORY, VALUE),
            monthly_value: monthly_totals(table, VALUE),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    fn date(y: i32, m: u32, d: u32) -> CellValue {
        CellValue::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn trades() -> Table {
        Table::from_rows(
            ["Date", "Category", "Shipping_Method", "Import_Export", "Country", "Value", "Quantity", "Weight"]
                .map(String::from)
                .to_vec(),
            vec![
                vec![date(2023, 3, 2), s("A"), s("Air"), s("Import"), s("France"), CellValue::Float(100.0), CellValue::Integer(2), CellValue::Float(10.0)],
                vec![date(2023, 1, 9), s("A"), s("Sea"), s("Export"), s("Chile"), CellValue::Float(300.0), CellValue::Integer(1), CellValue::Float(4.0)],
                vec![date(2023, 1, 20), s("B"), s("Air"), s("Import"), s("Peru"), CellValue::Float(50.5), CellValue::Integer(4), CellValue::Null],
                vec![date(2022, 12, 31), s("A"), s("Air"), s("Transit"), s("France"), CellValue::Integer(250), CellValue::Null, CellValue::Float(20.0)],
                vec![date(2023, 3, 28), s("C"), s("Land"), s("Export"), s("Japan"), CellValue::Float(10.0), CellValue::Integer(3), CellValue::Float(1.5)],
                vec![date(2023, 1, 1), s("B"), s("Land"), s("Import"), s("Kenya"), CellValue::Float(50.5), CellValue::Integer(5), CellValue::Float(2.0)],
                vec![date(2023, 2, 14), s("C"), s("Sea"), s("Export"), s("Brazil"), CellValue::Float(5.0), CellValue::Integer(6), CellValue::Float(3.0)],
            ],
        )
    }

    #[test]
    fn counts_only_exact_import_and_export() {
        let table = trades();
        let counts = import_export_counts(&table).unwrap();
        assert_eq!(counts, ImportExportCounts { imports: 3, exports: 3 });
        assert!(counts.imports + counts.exports <= table.len());
    }

    #[test]
    fn sums_skip_nulls() {
        let table = trades();
        assert_eq!(sum_column(&table, "Value").unwrap(), 766.0);
        assert_eq!(sum_column(&table, "Quantity").unwrap(), 21.0);
    }

    #[test]
    fn non_numeric_cells_are_reported() {
        let table = Table::from_rows(vec!["Value".into()], vec![vec![s("lots")]]);
        assert_eq!(
            sum_column(&table, "Value").unwrap_err(),
            DashboardError::NonNumeric {
                column: "Value".into(),
                row: 0,
                value: "lots".into()
            }
        );
    }

    #[test]
    fn top_countries_sorted_descending_and_capped() {
        let table = trades();
        let top = top_n_by_sum(&table, "Country", "Value", TOP_COUNTRIES).unwrap();
        let keys: Vec<&str> = top.iter().map(|g| g.key.as_str()).collect();
        // Kenya and Peru tie at 50.5 and keep key order.
        assert_eq!(keys, vec!["France", "Chile", "Kenya", "Peru", "Japan"]);
        assert_eq!(top[0].total, 350.0);
        assert!(top.windows(2).all(|w| w[0].total >= w[1].total));

        let present = unique_countries(&table);
        assert!(top.iter().all(|g| present.contains(&g.key)));
    }

    fn unique_countries(table: &Table) -> Vec<String> {
        table
            .column("Country")
            .unwrap()
            .values
            .iter()
            .map(|v| v.to_string())
            .collect()
    }

    #[test]
    fn group_sums_in_key_order() {
        let by_category = sum_by(&trades(), "Category", "Quantity").unwrap();
        assert_eq!(
            by_category,
            vec![
                GroupTotal { key: "A".into(), total: 3.0 },
                GroupTotal { key: "B".into(), total: 9.0 },
                GroupTotal { key: "C".into(), total: 9.0 },
            ]
        );
    }

    #[test]
    fn pair_means_skip_nulls_and_empty_groups() {
        let means = mean_by_pair(&trades(), "Category", "Shipping_Method", "Weight").unwrap();
        let find = |a: &str, b: &str| {
            means
                .iter()
                .find(|m| m.first == a && m.second == b)
                .map(|m| m.mean)
        };
        assert_eq!(find("A", "Air"), Some(15.0));
        assert_eq!(find("B", "Land"), Some(2.0));
        // B/Air only has a null weight.
        assert_eq!(find("B", "Air"), None);
    }

    #[test]
    fn monthly_totals_are_chronological() {
        let months = monthly_totals(&trades(), "Value").unwrap();
        let labels: Vec<&str> = months.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(labels, vec!["2022-12", "2023-01", "2023-02", "2023-03"]);
        assert_eq!(months[1].total, 401.0);
        assert_eq!(months[3].total, 110.0);
    }

    #[test]
    fn month_column_is_added_to_a_copy() {
        let table = trades();
        let with_month = with_month_column(&table).unwrap();
        assert!(table.column("Month").is_err());
        assert_eq!(with_month.cell(0, with_month.columns().len() - 1), Some(&s("2023-03")));
    }

    #[test]
    fn empty_table_degrades_to_zero() {
        let empty = trades().filter_rows(|_| false);
        let summary = Summary::compute(&empty);
        assert_eq!(summary.row_count, 0);
        assert_eq!(summary.import_export, Ok(ImportExportCounts::default()));
        assert_eq!(summary.total_value, Ok(0.0));
        assert_eq!(summary.top_countries, Ok(vec![]));
        assert_eq!(summary.monthly_value, Ok(vec![]));
    }

    #[test]
    fn missing_columns_only_blank_their_section() {
        let table = Table::from_rows(
            vec!["Category".into(), "Quantity".into()],
            vec![vec![s("A"), CellValue::Integer(2)]],
        );
        let summary = Summary::compute(&table);
        assert_eq!(summary.total_quantity, Ok(2.0));
        assert_eq!(summary.total_value, Err(DashboardError::MissingColumn("Value".into())));
        assert_eq!(
            summary.quantity_by_shipping,
            Err(DashboardError::MissingColumn("Shipping_Method".into()))
        );
        assert_eq!(summary.monthly_value, Err(DashboardError::MissingColumn("Date".into())));
    }
}
