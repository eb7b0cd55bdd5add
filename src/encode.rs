//! One-hot encoding of categorical (string) columns
//!
//! Reference policy: distinct values are ordered lexically and the first one
//! is the implicit baseline, so a column with N distinct values yields N-1
//! indicator columns. The source column is kept; use
//! [`Dataset::drop_categorical`] for a purely numeric table.

use crate::data::Dataset;
use crate::error::{PrepError, Result};
use polars::prelude::*;
use std::collections::BTreeSet;
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct CategoricalEncoder;

impl CategoricalEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Distinct non-missing values of a categorical column, lexically ordered
    pub fn categories(data: &Dataset, column: &str) -> Result<Vec<String>> {
        let series = data.column(column)?.as_materialized_series();
        let values: BTreeSet<&str> = series.str()?.into_iter().flatten().collect();
        Ok(values.into_iter().map(str::to_string).collect())
    }

    /// Append `{column}_{value}` indicator columns for every categorical column
    pub fn apply(&self, data: Dataset) -> Result<Dataset> {
        let columns = data.categorical_columns();
        if columns.is_empty() {
            return Ok(data);
        }

        let mut data = data;
        let mut added = 0usize;
        for column in &columns {
            let categories = Self::categories(&data, column)?;
            let source: Vec<Option<String>> = data
                .column(column)?
                .as_materialized_series()
                .str()?
                .into_iter()
                .map(|v| v.map(str::to_string))
                .collect();

            // the first category is the reference and gets no column
            for category in categories.iter().skip(1) {
                let name = format!("{}_{}", column, category);
                if data.has_column(&name) {
                    return Err(PrepError::DuplicateColumn(name));
                }

                let indicator: Vec<f64> = source
                    .iter()
                    .map(|v| if v.as_deref() == Some(category.as_str()) { 1.0 } else { 0.0 })
                    .collect();
                data = data.with_column(Series::new(name.as_str().into(), indicator))?;
                added += 1;
            }

            debug!(
                column = column.as_str(),
                categories = categories.len(),
                reference = categories.first().map(String::as_str).unwrap_or(""),
                "encoded column"
            );
        }

        info!(columns = columns.len(), indicators = added, "categorical encoding complete");
        Ok(data)
    }
}
