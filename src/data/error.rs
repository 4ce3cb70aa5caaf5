use thiserror::Error;

/// Errors raised by the data layer that the UI shows to the user verbatim.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    #[error("the dataset does not contain a '{0}' column")]
    MissingColumn(String),

    #[error("unsupported file type: .{extension} (expected .csv, .txt, .xlsx or .xls)")]
    UnsupportedFileType { extension: String },

    #[error("column '{column}' row {row}: '{value}' is not a number")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    #[error("column '{column}' has {found} values, expected {expected}")]
    RaggedColumns {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("workbook contains no worksheets")]
    EmptyWorkbook,
}

impl DashboardError {
    pub fn missing(column: &str) -> Self {
        DashboardError::MissingColumn(column.to_string())
    }
}
