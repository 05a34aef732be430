//! Error types shared by every stage of the analysis.

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can abort an analysis run.
///
/// Variants fall into three families: I/O (`Io`, `FileNotFound`), parsing
/// (`Parse`, `InvalidValue`, `Csv`, `Json`), schema or configuration
/// mismatches (`Schema`, `ColumnType`, `Config`) and failures inside polars
/// (`Polars`). None of them is recoverable.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Parse error at line {line}: {message}")]
    Parse { line: u64, message: String },

    #[error("Invalid value in column `{column}` at row {row}: {message}")]
    InvalidValue {
        column: String,
        row: usize,
        message: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Column `{column}` not found")]
    Schema { column: String },

    #[error("Column `{column}` is not {expected}")]
    ColumnType { column: String, expected: &'static str },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Table error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

impl AnalysisError {
    pub fn schema(column: impl Into<String>) -> Self {
        Self::Schema {
            column: column.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn invalid_value(column: impl Into<String>, row: usize, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            column: column.into(),
            row,
            message: message.into(),
        }
    }
}
