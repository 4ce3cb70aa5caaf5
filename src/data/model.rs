use std::fmt;

use chrono::NaiveDate;

use super::error::DashboardError;

/// Column names the dashboard reads. Matching is case-exact.
pub mod columns {
    pub const DATE: &str = "Date";
    pub const CATEGORY: &str = "Category";
    pub const SHIPPING_METHOD: &str = "Shipping_Method";
    pub const IMPORT_EXPORT: &str = "Import_Export";
    pub const PAYMENT_TERMS: &str = "Payment_Terms";
    pub const COUNTRY: &str = "Country";
    pub const VALUE: &str = "Value";
    pub const QUANTITY: &str = "Quantity";
    pub const WEIGHT: &str = "Weight";
    /// Derived by the monthly aggregation, never present in source files.
    pub const MONTH: &str = "Month";
}

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the dtypes a CSV or workbook yields.
/// Used as a key in ordered collections, so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Date(_) => 5,
            }
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            _ => discriminant(self).cmp(&discriminant(other)),
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Date(d) => d.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Numeric view of the cell. `None` for anything that is not a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Text used for categorical matching and group keys; `None` for nulls.
    pub fn key(&self) -> Option<String> {
        if self.is_null() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Column / Table – the in-memory columnar dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }
}

/// A columnar table. Every filtering operation returns a fresh copy; rows are
/// never edited in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Build a table from row-major records. Short rows are padded with nulls,
    /// extra trailing cells are ignored.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|name| Column::new(name, Vec::with_capacity(rows.len())))
            .collect();
        let n_rows = rows.len();
        for row in rows {
            let mut cells = row.into_iter();
            for column in &mut columns {
                column.values.push(cells.next().unwrap_or(CellValue::Null));
            }
        }
        Table { columns, n_rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.n_rows
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns().iter().map(|c| c.name.as_str()).collect()
    }

    /// Look up a column by exact name.
    pub fn column(&self, name: &str) -> Result<&Column, DashboardError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| DashboardError::missing(name))
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.columns.get(column)?.values.get(row)
    }

    /// Copy of the rows at `indices`, in that order.
    pub fn take(&self, indices: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: indices.iter().map(|&i| c.values[i].clone()).collect(),
            })
            .collect();
        Table {
            columns,
            n_rows: indices.len(),
        }
    }

    /// Copy of the rows for which `keep(row_index)` holds.
    pub fn filter_rows(&self, keep: impl Fn(usize) -> bool) -> Table {
        let indices: Vec<usize> = (0..self.n_rows).filter(|&i| keep(i)).collect();
        self.take(&indices)
    }

    /// Copy with `name` set to `values`, replacing a same-named column or
    /// appending a new one.
    pub fn with_column(&self, name: &str, values: Vec<CellValue>) -> Result<Table, DashboardError> {
        if values.len() != self.n_rows {
            return Err(DashboardError::RaggedColumns {
                column: name.to_string(),
                expected: self.n_rows,
                found: values.len(),
            });
        }
        let mut columns = self.columns.clone();
        match columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.values = values,
            None => columns.push(Column::new(name, values)),
        }
        Ok(Table {
            columns,
            n_rows: self.n_rows,
        })
    }
}
