//! Missing-value triage: sparse column and row removal, targeted fills, final drop
//!
//! Phases always run in this order because the row threshold is judged
//! against the columns that survive the column threshold.

use crate::data::Dataset;
use crate::error::{PrepError, Result};
use polars::prelude::*;
use tracing::{debug, info};

/// Deterministic replacement for missing entries in one column
#[derive(Debug, Clone, PartialEq)]
pub enum FillRule {
    /// Missing entries become `value`
    Constant { column: String, value: f64 },
    /// Missing entries become `minuend - subtrahend` when both are present
    Difference {
        column: String,
        minuend: String,
        subtrahend: String,
    },
}

impl FillRule {
    pub fn target(&self) -> &str {
        match self {
            FillRule::Constant { column, .. } | FillRule::Difference { column, .. } => column,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MissingValueTriage {
    /// Fraction of rows a column must have present to be kept
    pub prop_required_column: f64,
    /// Fraction of surviving columns a row must have present to be kept
    pub prop_required_row: f64,
    pub fills: Vec<FillRule>,
}

impl Default for MissingValueTriage {
    fn default() -> Self {
        Self {
            prop_required_column: 0.5,
            prop_required_row: 0.75,
            fills: Vec::new(),
        }
    }
}

impl MissingValueTriage {
    pub fn new(prop_required_column: f64, prop_required_row: f64) -> Self {
        Self {
            prop_required_column,
            prop_required_row,
            fills: Vec::new(),
        }
    }

    /// Parcel table defaults: a missing unit count means one unit, and a
    /// missing structure value is total value minus land value.
    pub fn zillow() -> Self {
        Self::default()
            .with_fill(FillRule::Constant {
                column: "unitcnt".to_string(),
                value: 1.0,
            })
            .with_fill(FillRule::Difference {
                column: "structuretaxvaluedollarcnt".to_string(),
                minuend: "taxvaluedollarcnt".to_string(),
                subtrahend: "landtaxvaluedollarcnt".to_string(),
            })
    }

    pub fn with_fill(mut self, rule: FillRule) -> Self {
        self.fills.push(rule);
        self
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("prop_required_column", self.prop_required_column),
            ("prop_required_row", self.prop_required_row),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PrepError::InvalidProportion {
                    name,
                    value,
                    expected: "a value in [0, 1]",
                });
            }
        }
        Ok(())
    }

    /// Run all phases: columns, rows, targeted fills, then drop what is left incomplete
    pub fn apply(&self, data: Dataset) -> Result<Dataset> {
        self.validate()?;
        let (rows, cols) = (data.height(), data.width());

        let data = self.drop_sparse_columns(data)?;
        let data = self.drop_sparse_rows(data)?;
        let data = self.fill_targeted(data)?;
        let data = drop_incomplete_rows(data)?;

        info!(
            rows_before = rows,
            cols_before = cols,
            rows_after = data.height(),
            cols_after = data.width(),
            "missing-value triage complete"
        );
        Ok(data)
    }

    /// Drop columns whose present count is below `ceil(prop_required_column * rows)`
    pub fn drop_sparse_columns(&self, data: Dataset) -> Result<Dataset> {
        self.validate()?;
        let threshold = column_threshold(self.prop_required_column, data.height());

        let mut keep = Vec::new();
        for name in data.column_names() {
            let present = data.height() - data.missing_count(&name)?;
            if present >= threshold {
                keep.push(name);
            } else {
                debug!(column = name.as_str(), present, threshold, "dropping sparse column");
            }
        }

        // a table without columns has no rows either
        if keep.is_empty() {
            return Ok(Dataset::from_frame(DataFrame::empty()));
        }
        data.select_columns(&keep)
    }

    /// Drop rows whose present count is below
    /// `round_half_even(prop_required_row * remaining_columns)`
    pub fn drop_sparse_rows(&self, data: Dataset) -> Result<Dataset> {
        self.validate()?;
        let width = data.width();
        let threshold = row_threshold(self.prop_required_row, width);

        let keep: Vec<bool> = data
            .row_missing_counts()
            .into_iter()
            .map(|missing| width - missing >= threshold)
            .collect();

        let before = data.height();
        let data = data.filter_rows(&keep)?;
        debug!(threshold, removed = before - data.height(), "dropped sparse rows");
        Ok(data)
    }

    /// Apply each fill rule in order
    pub fn fill_targeted(&self, data: Dataset) -> Result<Dataset> {
        let mut data = data;
        for rule in &self.fills {
            if !data.has_column(rule.target()) {
                debug!(column = rule.target(), "fill target absent, skipping");
                continue;
            }
            data = apply_fill(data, rule)?;
        }
        Ok(data)
    }
}

fn apply_fill(data: Dataset, rule: &FillRule) -> Result<Dataset> {
    let target = rule.target();
    let dtype = data.column(target)?.dtype().clone();
    let current = data.numeric_values(target)?;

    let filled: Vec<Option<f64>> = match rule {
        FillRule::Constant { value, .. } => current
            .into_iter()
            .map(|v| v.or(Some(*value)))
            .collect(),
        FillRule::Difference {
            minuend,
            subtrahend,
            ..
        } => {
            if !data.has_column(minuend) || !data.has_column(subtrahend) {
                debug!(column = target, "difference operands absent, leaving missing");
                return Ok(data);
            }
            let left = data.numeric_values(minuend)?;
            let right = data.numeric_values(subtrahend)?;
            current
                .into_iter()
                .zip(left.into_iter().zip(right))
                .map(|(v, (l, r))| match (v, l, r) {
                    (Some(v), _, _) => Some(v),
                    (None, Some(l), Some(r)) => Some(l - r),
                    _ => None,
                })
                .collect()
        }
    };

    let series = Series::new(target.into(), filled).cast(&dtype)?;
    data.with_column(series)
}

/// Drop every row that still has a missing entry in any column
pub fn drop_incomplete_rows(data: Dataset) -> Result<Dataset> {
    let keep: Vec<bool> = data.row_missing_counts().into_iter().map(|m| m == 0).collect();
    data.filter_rows(&keep)
}

/// Minimum present count for a column. The product is nudged down before
/// `ceil` so representation noise (0.7 * 10 = 7.000000000000001) is ignored.
pub fn column_threshold(prop: f64, rows: usize) -> usize {
    ((prop * rows as f64) - 1e-9).ceil().max(0.0) as usize
}

/// Minimum present count for a row, rounding half to even
pub fn row_threshold(prop: f64, columns: usize) -> usize {
    (prop * columns as f64).round_ties_even().max(0.0) as usize
}
