use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading an input file. All of them are fatal for the
/// table being loaded: no partial table is ever returned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("required column '{column}' missing from {}", .path.display())]
    MissingColumn { path: PathBuf, column: String },

    /// Nothing is left to use as the emissions value once the known columns
    /// are removed.
    #[error("no emissions value column in {} (columns: {columns:?})", .path.display())]
    Schema { path: PathBuf, columns: Vec<String> },

    #[error("row {row}, column '{column}': cannot parse '{value}'")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("reading CSV")]
    Csv(#[from] csv::Error),

    #[error("reading Parquet")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("decoding Arrow batch")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

/// Rejected query parameters. Empty results are never reported here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("invalid year range: {lo} > {hi}")]
    InvalidRange { lo: i64, hi: i64 },
}
