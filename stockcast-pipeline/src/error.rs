//! Analysis error types.
//!
//! Every failure mode has a named variant. All of them are terminal: a
//! request either yields a complete report or exactly one of these.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("No dataset was supplied")]
    InputAbsent,

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Could not parse date value '{0}'")]
    DateParseFailure(String),

    #[error("Dataset contains no rows")]
    EmptyDataset,

    #[error("Invalid number in column '{column}' at line {line}: '{value}'")]
    InvalidNumber {
        column: String,
        line: usize,
        value: String,
    },
}

impl AnalysisError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::InputAbsent => "InputAbsent",
            AnalysisError::UnsupportedFormat(_) => "UnsupportedFormat",
            AnalysisError::MissingColumns(_) => "MissingColumns",
            AnalysisError::DateParseFailure(_) => "DateParseFailure",
            AnalysisError::EmptyDataset => "EmptyDataset",
            AnalysisError::InvalidNumber { .. } => "InvalidNumber",
        }
    }

    /// Offending column names or raw values, for reporting.
    pub fn details(&self) -> Vec<String> {
        match self {
            AnalysisError::MissingColumns(names) => names.clone(),
            AnalysisError::DateParseFailure(raw) => vec![raw.clone()],
            AnalysisError::InvalidNumber { column, value, .. } => {
                vec![column.clone(), value.clone()]
            }
            _ => Vec::new(),
        }
    }
}

/// Result type alias for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Structured error returned across the request boundary in place of a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl From<&AnalysisError> for ErrorBody {
    fn from(err: &AnalysisError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            details: err.details(),
        }
    }
}
