use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use csv::ByteRecord;
use encoding_rs::WINDOWS_1252;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::error::DashboardError;
use super::model::{CellValue, Table};
use crate::config::DashboardConfig;

/// Where the dashboard gets its rows from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// A file the user picked or dropped onto the window.
    Upload(PathBuf),
    /// The local sample dataset.
    Fallback,
}

#[derive(Debug, Clone)]
pub struct LoadedData {
    pub table: Table,
    /// Shown next to the upload button.
    pub source_label: String,
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Resolve a data source into a table.
pub fn resolve(source: &DataSource, config: &DashboardConfig) -> Result<LoadedData> {
    match source {
        DataSource::Upload(path) => {
            let table = load_file(path)?;
            Ok(LoadedData {
                table,
                source_label: file_label(path),
            })
        }
        DataSource::Fallback => {
            let path = &config.fallback_path;
            let full = load_csv(path)
                .with_context(|| format!("reading fallback dataset {}", path.display()))?;
            if full.len() < config.sample_size {
                log::warn!(
                    "fallback dataset has {} rows, fewer than the sample size {}; using all rows",
                    full.len(),
                    config.sample_size
                );
            }
            let table = sample_rows(&full, config.sample_size, config.sample_seed);
            Ok(LoadedData {
                table,
                source_label: format!(
                    "{} (sample of {} rows, seed {})",
                    file_label(path),
                    config.sample_size,
                    config.sample_seed
                ),
            })
        }
    }
}

/// Load a transactions table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – comma-delimited text with a header row, Latin-1 encoded
/// * `.xlsx` / `.xls` / `.xlsm` – first worksheet, first row as header
pub fn load_file(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" | "txt" => load_csv(path),
        "xlsx" | "xls" | "xlsm" => load_workbook(path),
        _ => Err(DashboardError::UnsupportedFileType { extension: ext }.into()),
    }
}

/// Deterministic sample of `n` rows without replacement. Tables with fewer
/// rows are returned whole.
pub fn sample_rows(table: &Table, n: usize, seed: u64) -> Table {
    if table.len() <= n {
        return table.clone();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let indices = rand::seq::index::sample(&mut rng, table.len(), n).into_vec();
    table.take(&indices)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    read_delimited(file).with_context(|| format!("parsing {}", path.display()))
}

/// Parse comma-delimited text. Bytes are decoded as Windows-1252 (a superset
/// of ISO-8859-1), so no input is rejected for its encoding.
pub fn read_delimited<R: std::io::Read>(reader: R) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut record = ByteRecord::new();
    if !csv_reader
        .read_byte_record(&mut record)
        .context("reading header row")?
    {
        return Ok(Table::default());
    }

    let headers: Vec<String> = record
        .iter()
        .enumerate()
        .map(|(i, field)| {
            // A UTF-8 BOM decodes to "ï»¿" under a single-byte charset.
            let field = if i == 0 {
                field.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(field)
            } else {
                field
            };
            decode_field(field).trim().to_string()
        })
        .collect();

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    let mut row_no = 1usize;
    while csv_reader
        .read_byte_record(&mut record)
        .with_context(|| format!("CSV row {row_no}"))?
    {
        row_no += 1;
        rows.push(
            record
                .iter()
                .map(|field| guess_cell_value(&decode_field(field)))
                .collect(),
        );
    }

    Ok(Table::from_rows(headers, rows))
}

fn decode_field(field: &[u8]) -> String {
    let (text, _, _) = WINDOWS_1252.decode(field);
    text.into_owned()
}

/// Infer the cell type from its text.
pub fn guess_cell_value(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Workbook loader
// ---------------------------------------------------------------------------

fn load_workbook(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("opening workbook {}", path.display()))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(DashboardError::EmptyWorkbook)?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("reading sheet '{sheet_name}'"))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Table::default());
    };
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();
    let rows: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();

    Ok(Table::from_rows(headers, rows))
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => guess_cell_value(s),
        // calamine applies the workbook's 1900 or 1904 date system.
        Data::DateTime(dt) if dt.is_datetime() => dt
            .as_datetime()
            .map(|t| CellValue::Date(t.date()))
            .unwrap_or(CellValue::Null),
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::String(s.clone()),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(_) => CellValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use calamine::{ExcelDateTime, ExcelDateTimeType};
    use chrono::NaiveDate;

    use super::*;

    const CSV: &str = "Date,Category,Value\n2023-01-15,A,100\n2023-02-20,B,50.5\n,C,\n";

    #[test]
    fn reads_header_and_typed_cells() {
        let table = read_delimited(CSV.as_bytes()).unwrap();
        assert_eq!(table.column_names(), vec!["Date", "Category", "Value"]);
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.column("Value").unwrap().values,
            vec![CellValue::Integer(100), CellValue::Float(50.5), CellValue::Null]
        );
        assert_eq!(table.cell(0, 0), Some(&CellValue::String("2023-01-15".into())));
    }

    #[test]
    fn decodes_latin1_and_strips_bom() {
        let mut bytes = b"\xEF\xBB\xBFCountry,Value\n".to_vec();
        bytes.extend_from_slice(b"C\xF4te d'Ivoire,1\n");
        let table = read_delimited(bytes.as_slice()).unwrap();
        assert_eq!(table.column_names(), vec!["Country", "Value"]);
        assert_eq!(
            table.cell(0, 0),
            Some(&CellValue::String("Côte d'Ivoire".into()))
        );
    }

    #[test]
    fn ragged_rows_are_tolerated() {
        let table = read_delimited("a,b,c\n1\n1,2,3,4\n".as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 2), Some(&CellValue::Null));
        assert_eq!(table.cell(1, 2), Some(&CellValue::Integer(3)));
    }

    #[test]
    fn empty_input_gives_empty_table() {
        let table = read_delimited("".as_bytes()).unwrap();
        assert!(table.is_empty());
        assert!(table.columns().is_empty());
    }

    #[test]
    fn unsupported_extension_is_an_explicit_error() {
        let err = load_file(Path::new("report.pdf")).unwrap_err();
        let err = err.downcast_ref::<DashboardError>().unwrap();
        assert_eq!(
            *err,
            DashboardError::UnsupportedFileType {
                extension: "pdf".into()
            }
        );
        assert!(err.to_string().contains("unsupported file type"));
    }

    #[test]
    fn loads_csv_and_txt_uploads() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["trades.csv", "trades.TXT"] {
            let path = dir.path().join(name);
            std::fs::File::create(&path)
                .unwrap()
                .write_all(CSV.as_bytes())
                .unwrap();
            let loaded = resolve(&DataSource::Upload(path), &DashboardConfig::default()).unwrap();
            assert_eq!(loaded.table.len(), 3);
            assert_eq!(loaded.source_label, name);
        }
    }

    #[test]
    fn fallback_is_sampled_deterministically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Imports_Exports_Dataset.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "Transaction_ID,Value").unwrap();
        for i in 0..50 {
            writeln!(file, "T{i},{i}").unwrap();
        }
        drop(file);

        let config = DashboardConfig {
            fallback_path: path,
            sample_size: 10,
            ..DashboardConfig::default()
        };
        let first = resolve(&DataSource::Fallback, &config).unwrap();
        let second = resolve(&DataSource::Fallback, &config).unwrap();
        assert_eq!(first.table.len(), 10);
        assert_eq!(first.table, second.table);

        let ids = &first.table.column("Transaction_ID").unwrap().values;
        let distinct: std::collections::BTreeSet<_> = ids.iter().collect();
        assert_eq!(distinct.len(), 10);
    }

    #[test]
    fn compact_dates_survive_loading() {
        let table = read_delimited("Date,Value\n20230115,1\n2023-01-16,2\n".as_bytes()).unwrap();
        assert_eq!(table.cell(0, 0), Some(&CellValue::Integer(20230115)));

        let normalized = crate::data::dates::normalize_dates(&table).unwrap();
        assert_eq!(normalized.dropped, 0);
        assert_eq!(
            normalized.table.column("Date").unwrap().values,
            vec![
                CellValue::Date(NaiveDate::from_ymd_opt(2023, 1, 15).unwrap()),
                CellValue::Date(NaiveDate::from_ymd_opt(2023, 1, 16).unwrap()),
            ]
        );
    }

    #[test]
    fn reads_first_worksheet_of_a_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trades.XLSX");

        let mut workbook = rust_xlsxwriter::Workbook::new();
        let date_format = rust_xlsxwriter::Format::new().set_num_format("yyyy-mm-dd");
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Date").unwrap();
        sheet.write_string(0, 1, "Category").unwrap();
        sheet.write_string(0, 2, "Value").unwrap();
        let day = rust_xlsxwriter::ExcelDateTime::from_ymd(2023, 1, 15).unwrap();
        sheet.write_datetime_with_format(1, 0, &day, &date_format).unwrap();
        sheet.write_string(1, 1, "Toys").unwrap();
        sheet.write_number(1, 2, 100.5).unwrap();
        sheet.write_datetime_with_format(2, 0, &day, &date_format).unwrap();
        sheet.write_number(2, 2, 7).unwrap();
        workbook.save(&path).unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.column_names(), vec!["Date", "Category", "Value"]);
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.cell(0, 0),
            Some(&CellValue::Date(NaiveDate::from_ymd_opt(2023, 1, 15).unwrap()))
        );
        assert_eq!(table.cell(0, 1), Some(&CellValue::String("Toys".into())));
        assert_eq!(table.cell(0, 2), Some(&CellValue::Float(100.5)));
        assert_eq!(table.cell(1, 1), Some(&CellValue::Null));
    }

    #[test]
    fn workbook_dates_follow_the_date_system() {
        let jan_15 = CellValue::Date(NaiveDate::from_ymd_opt(2023, 1, 15).unwrap());
        let cell = |serial: f64, is_1904: bool| {
            convert_cell(&Data::DateTime(ExcelDateTime::new(
                serial,
                ExcelDateTimeType::DateTime,
                is_1904,
            )))
        };
        assert_eq!(cell(44941.0, false), jan_15);
        assert_eq!(cell(44941.75, false), jan_15);
        assert_eq!(cell(43479.0, true), jan_15);
        assert_eq!(
            cell(1.0, false),
            CellValue::Date(NaiveDate::from_ymd_opt(1900, 1, 1).unwrap())
        );

        let duration = Data::DateTime(ExcelDateTime::new(1.5, ExcelDateTimeType::TimeDelta, false));
        assert_eq!(convert_cell(&duration), CellValue::Float(1.5));
    }

    #[test]
    fn small_fallback_is_used_whole() {
        let table = read_delimited(CSV.as_bytes()).unwrap();
        assert_eq!(sample_rows(&table, 3001, 55005), table);
    }

    #[test]
    fn missing_fallback_reports_path() {
        let config = DashboardConfig {
            fallback_path: PathBuf::from("/nonexistent/trades.csv"),
            ..DashboardConfig::default()
        };
        let err = resolve(&DataSource::Fallback, &config).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/trades.csv"));
    }
}
