use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::dates::DateRange;
use super::error::DashboardError;
use super::model::{columns, CellValue, Table};

// ---------------------------------------------------------------------------
// Date window
// ---------------------------------------------------------------------------

/// Keep rows whose (normalised) date lies inside `range`, both ends included.
pub fn filter_date_range(table: &Table, range: DateRange) -> Result<Table, DashboardError> {
    let dates = &table.column(columns::DATE)?.values;
    Ok(table.filter_rows(|i| dates[i].as_date().is_some_and(|d| range.contains(d))))
}

// ---------------------------------------------------------------------------
// Categorical cascade
// ---------------------------------------------------------------------------

/// The four sidebar filters, in the order they narrow the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterColumn {
    Category,
    ShippingMethod,
    ImportExport,
    PaymentTerms,
}

impl FilterColumn {
    pub const CASCADE: [FilterColumn; 4] = [
        FilterColumn::Category,
        FilterColumn::ShippingMethod,
        FilterColumn::ImportExport,
        FilterColumn::PaymentTerms,
    ];

    pub fn column_name(self) -> &'static str {
        match self {
            FilterColumn::Category => columns::CATEGORY,
            FilterColumn::ShippingMethod => columns::SHIPPING_METHOD,
            FilterColumn::ImportExport => columns::IMPORT_EXPORT,
            FilterColumn::PaymentTerms => columns::PAYMENT_TERMS,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterColumn::Category => "Pick your Category",
            FilterColumn::ShippingMethod => "Pick the Shipping Method",
            FilterColumn::ImportExport => "Pick Import/Export",
            FilterColumn::PaymentTerms => "Pick the Payment Terms",
        }
    }
}

/// Per-column selection state. An absent or empty set means "no filter".
pub type Selections = BTreeMap<FilterColumn, BTreeSet<String>>;

/// Distinct non-null values of `column`, in order of first appearance.
pub fn unique_options(table: &Table, column: &str) -> Result<Vec<String>, DashboardError> {
    let mut seen = HashSet::new();
    Ok(table
        .column(column)?
        .values
        .iter()
        .filter_map(CellValue::key)
        .filter(|k| seen.insert(k.clone()))
        .collect())
}

/// One cascade stage: an empty selection passes the input through as a copy,
/// otherwise only rows whose value is selected survive.
pub fn apply_selection(
    table: &Table,
    column: &str,
    selected: &BTreeSet<String>,
) -> Result<Table, DashboardError> {
    let values = &table.column(column)?.values;
    if selected.is_empty() {
        return Ok(table.clone());
    }
    Ok(table.filter_rows(|i| {
        values[i]
            .key()
            .is_some_and(|k| selected.contains(&k))
    }))
}

/// What a single multiselect saw and did.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterStage {
    pub column: FilterColumn,
    /// Choices offered, drawn from the previous stage's output.
    pub options: Result<Vec<String>, DashboardError>,
    pub selected: BTreeSet<String>,
    pub rows_in: usize,
    pub rows_out: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cascade {
    pub stages: Vec<FilterStage>,
    /// Output of the last stage; the single source for every aggregate.
    pub table: Table,
}

/// Run the four categorical filters in order, each one offering the values
/// left over by the one before it.
pub fn run_cascade(table: &Table, selections: &Selections) -> Cascade {
    let mut current = table.clone();
    let mut stages = Vec::with_capacity(FilterColumn::CASCADE.len());

    for column in FilterColumn::CASCADE {
        let selected = selections.get(&column).cloned().unwrap_or_default();
        let rows_in = current.len();
        let options = unique_options(&current, column.column_name());

        // A missing column cannot be selected on, so the stage is a no-op.
        if options.is_ok() {
            if let Ok(next) = apply_selection(&current, column.column_name(), &selected) {
                current = next;
            }
        }

        stages.push(FilterStage {
            column,
            options,
            selected,
            rows_in,
            rows_out: current.len(),
        });
    }

    Cascade {
        stages,
        table: current,
    }
}
