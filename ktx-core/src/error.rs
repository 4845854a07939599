/// Error types for the ridership pipeline
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// The pipeline stage an error belongs to.
///
/// Load errors halt everything before a single view renders. Filter errors
/// halt only the current filter change; the controls stay usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStage {
    Load,
    Filter,
    Render,
}

/// Main error type for ridership operations
#[derive(Error, Debug)]
pub enum KtxError {
    /// Input file does not exist
    #[error("Data file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Every candidate encoding failed to decode the input
    #[error("Could not determine the encoding of {} (tried: {})", path.display(), tried.join(", "))]
    EncodingUndetermined { path: PathBuf, tried: Vec<String> },

    /// Reading the input failed
    #[error("Failed to read data file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse CSV data
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A required header is absent
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// The period cell of a row is not a calendar month
    #[error("Malformed date at row {row}: {value:?}")]
    MalformedDate { row: usize, value: String },

    /// The station cell of a row is blank
    #[error("Missing station name at row {row}")]
    MissingStation { row: usize },

    /// A passenger count is non-numeric, or negative under the reject policy
    #[error("Invalid count in column {column} at row {row}: {value:?}")]
    InvalidCount {
        row: usize,
        column: String,
        value: String,
    },

    /// Start date is after end date
    #[error("Invalid date range: {from} is after {to}")]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },

    /// Filtering left no rows
    #[error("No rows match the selected stations and date range")]
    EmptyResult,

    /// A view could not be serialized or written
    #[error("Failed to render view {view}: {message}")]
    Render { view: String, message: String },

    /// Configuration is unreadable or inconsistent
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl KtxError {
    /// Which stage of the pipeline produced this error.
    pub fn stage(&self) -> ErrorStage {
        match self {
            KtxError::InvalidDateRange { .. } | KtxError::EmptyResult => ErrorStage::Filter,
            KtxError::Render { .. } => ErrorStage::Render,
            _ => ErrorStage::Load,
        }
    }

    /// True when no view may be rendered at all.
    pub fn halts_pipeline(&self) -> bool {
        self.stage() == ErrorStage::Load
    }

    /// The message shown to the user. Each filter-stage kind gets its own wording.
    pub fn user_message(&self) -> String {
        match self {
            KtxError::FileNotFound(path) => format!(
                "Could not find {}. Check that the file is in the expected location.",
                path.display()
            ),
            KtxError::EncodingUndetermined { tried, .. } => format!(
                "Could not determine the file encoding. Check that the file is encoded as one of: {}.",
                tried.join(", ")
            ),
            KtxError::InvalidDateRange { .. } => {
                "The start date is later than the end date. Please choose again.".to_string()
            }
            KtxError::EmptyResult => {
                "No data matches the selected conditions. Please choose different conditions."
                    .to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Type alias for Results using KtxError
pub type Result<T> = std::result::Result<T, KtxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_errors_have_distinct_messages() {
        let from = NaiveDate::from_ymd_opt(2023, 5, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let range = KtxError::InvalidDateRange { from, to };
        let empty = KtxError::EmptyResult;

        assert_eq!(range.stage(), ErrorStage::Filter);
        assert_eq!(empty.stage(), ErrorStage::Filter);
        assert_ne!(range.user_message(), empty.user_message());
        assert!(!range.halts_pipeline());
    }

    #[test]
    fn load_errors_halt_pipeline() {
        let missing = KtxError::FileNotFound(PathBuf::from("ktx.csv"));
        assert!(missing.halts_pipeline());
        assert!(missing.user_message().contains("ktx.csv"));

        let encoding = KtxError::EncodingUndetermined {
            path: PathBuf::from("ktx.csv"),
            tried: vec!["euc-kr".to_string(), "cp949".to_string()],
        };
        assert!(encoding.halts_pipeline());
        assert!(encoding.to_string().contains("euc-kr, cp949"));
    }

    #[test]
    fn malformed_date_cites_row() {
        let err = KtxError::MalformedDate {
            row: 7,
            value: "2023-13".to_string(),
        };
        assert_eq!(err.to_string(), "Malformed date at row 7: \"2023-13\"");
    }
}
