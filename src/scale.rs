//! Min-max feature scaling with reusable fitted bounds

use crate::data::Dataset;
use crate::error::{PrepError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Observed range of one column in the fitting data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnBounds {
    pub column: String,
    pub min: f64,
    pub max: f64,
}

impl ColumnBounds {
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// `(value - min) / (max - min)`, or 0.0 when the column was constant
    pub fn scale(&self, value: f64) -> f64 {
        let range = self.range();
        if range == 0.0 {
            0.0
        } else {
            (value - self.min) / range
        }
    }
}

/// Linear rescaling to [0, 1] using the min and max seen at fit time.
///
/// Fit on the training partition only and reuse the same scaler for the
/// validation and test partitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    bounds: Vec<ColumnBounds>,
}

impl MinMaxScaler {
    /// Fit every numeric column of `data`
    pub fn fit(data: &Dataset) -> Result<Self> {
        let columns = data.numeric_columns();
        let names: Vec<&str> = columns.iter().map(String::as_str).collect();
        Self::fit_columns(data, &names)
    }

    /// Fit only the named columns
    pub fn fit_columns(data: &Dataset, columns: &[&str]) -> Result<Self> {
        let mut bounds = Vec::with_capacity(columns.len());
        for &column in columns {
            let (min, max) = data
                .numeric_values(column)?
                .into_iter()
                .flatten()
                .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                    None => Some((v, v)),
                    Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                })
                .ok_or_else(|| PrepError::EmptyColumn(column.to_string()))?;

            bounds.push(ColumnBounds {
                column: column.to_string(),
                min,
                max,
            });
        }
        Ok(Self { bounds })
    }

    /// Rebuild a scaler from previously fitted bounds
    pub fn from_bounds(bounds: Vec<ColumnBounds>) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> &[ColumnBounds] {
        &self.bounds
    }

    pub fn column_bounds(&self, column: &str) -> Option<&ColumnBounds> {
        self.bounds.iter().find(|b| b.column == column)
    }

    /// Scale the fitted columns of `data`; other columns pass through.
    ///
    /// Values outside the fitted range map outside [0, 1]; nothing is clipped.
    pub fn transform(&self, data: Dataset) -> Result<Dataset> {
        let mut data = data;
        for bounds in &self.bounds {
            let scaled: Vec<Option<f64>> = data
                .numeric_values(&bounds.column)?
                .into_iter()
                .map(|v| v.map(|v| bounds.scale(v)))
                .collect();
            data = data.with_column(Series::new(bounds.column.as_str().into(), scaled))?;
        }
        Ok(data)
    }

    /// Fit on `data` and scale it in one call
    pub fn fit_transform(data: Dataset) -> Result<(Self, Dataset)> {
        let scaler = Self::fit(&data)?;
        let scaled = scaler.transform(data)?;
        info!(columns = scaler.bounds.len(), rows = scaled.height(), "min-max scaling complete");
        Ok((scaler, scaled))
    }
}
