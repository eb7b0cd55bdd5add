//! Error type shared by every preparation stage

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PrepError>;

#[derive(Error, Debug)]
pub enum PrepError {
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Column '{column}' is not numeric (found {dtype})")]
    NonNumericColumn { column: String, dtype: String },

    #[error("Column '{0}' has no non-missing values")]
    EmptyColumn(String),

    #[error("Column '{0}' already exists")]
    DuplicateColumn(String),

    #[error("Column '{column}' contains {count} missing values")]
    MissingValues { column: String, count: usize },

    #[error("Invalid proportion for {name}: {value} (expected {expected})")]
    InvalidProportion {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("The {0} partition is empty; too few rows survived to fit the scaler")]
    EmptyPartition(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Source error: {0}")]
    Source(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}
