use chrono::NaiveDate;

use super::error::DashboardError;
use super::model::{columns, CellValue, Table};

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Coerce a cell to a calendar date. Anything that cannot be read as a date
/// yields `None` so the caller can drop the row.
///
/// Accepted text forms: `YYYY-MM-DD`, `YYYY/MM/DD`, `YYYYMMDD` and
/// `A-B-YYYY` / `A/B/YYYY`. The latter is month-first unless the first
/// component cannot be a month. A trailing time part is ignored.
///
/// Integer cells are read as `YYYYMMDD`, since the loader types an unquoted
/// compact date as a number.
pub fn parse_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Date(d) => Some(*d),
        CellValue::String(s) => parse_date_str(s),
        CellValue::Integer(i) if (10_000_000..=99_999_999).contains(i) => {
            parse_date_str(&i.to_string())
        }
        _ => None,
    }
}

pub fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let date_end = s
        .bytes()
        .position(|b| !(b.is_ascii_digit() || b == b'-' || b == b'/'))
        .unwrap_or(s.len());
    let (date_part, rest) = s.split_at(date_end);
    if date_part.is_empty() || !(rest.is_empty() || rest.starts_with(['T', ' '])) {
        return None;
    }

    if date_part.len() == 8 && date_part.bytes().all(|b| b.is_ascii_digit()) {
        let year = date_part[0..4].parse().ok()?;
        let month = date_part[4..6].parse().ok()?;
        let day = date_part[6..8].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let parts: Vec<&str> = date_part.split(['-', '/']).collect();
    let [a, b, c] = parts.as_slice() else {
        return None;
    };

    if a.len() == 4 {
        return NaiveDate::from_ymd_opt(a.parse().ok()?, b.parse().ok()?, c.parse().ok()?);
    }

    if c.len() == 4 {
        let year: i32 = c.parse().ok()?;
        let first: u32 = a.parse().ok()?;
        let second: u32 = b.parse().ok()?;
        let (month, day) = if first > 12 && second <= 12 {
            (second, first)
        } else {
            (first, second)
        };
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

// ---------------------------------------------------------------------------
// Normalisation
// ---------------------------------------------------------------------------

/// A table whose `Date` column holds only parsed dates.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDates {
    pub table: Table,
    /// Rows discarded because their date could not be parsed.
    pub dropped: usize,
}

/// Parse every value of the `Date` column and discard rows that fail.
pub fn normalize_dates(table: &Table) -> Result<NormalizedDates, DashboardError> {
    let parsed: Vec<Option<NaiveDate>> = table
        .column(columns::DATE)?
        .values
        .iter()
        .map(parse_date)
        .collect();

    let keep: Vec<usize> = parsed
        .iter()
        .enumerate()
        .filter_map(|(i, d)| d.map(|_| i))
        .collect();
    let dropped = table.len() - keep.len();

    let dates = keep
        .iter()
        .filter_map(|&i| parsed[i])
        .map(CellValue::Date)
        .collect();
    let table = table.take(&keep).with_column(columns::DATE, dates)?;

    Ok(NormalizedDates { table, dropped })
}

// ---------------------------------------------------------------------------
// Bounds and the chosen window
// ---------------------------------------------------------------------------

/// Earliest and latest date present in a normalised table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DateBounds {
    pub fn of(table: &Table) -> Option<DateBounds> {
        let dates = table.column(columns::DATE).ok()?;
        let mut iter = dates.values.iter().filter_map(CellValue::as_date);
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(DateBounds { min, max })
    }

    pub fn full_range(&self) -> DateRange {
        DateRange {
            start: self.min,
            end: self.max,
        }
    }
}

/// Inclusive user-chosen window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// Narrow both ends into `bounds`. The window may shrink but never exceed
    /// the data. `start > end` is kept as is and selects nothing.
    pub fn clamp_to(self, bounds: DateBounds) -> DateRange {
        DateRange {
            start: self.start.clamp(bounds.min, bounds.max),
            end: self.end.clamp(bounds.min, bounds.max),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
