//! Read-only missing-value reports

use crate::data::Dataset;
use serde::Serialize;
use std::collections::BTreeMap;

/// Missing entries in one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMissing {
    pub column: String,
    pub count: usize,
    pub percent: f64,
}

/// How many rows miss exactly `num_cols_missing` columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowMissing {
    pub num_cols_missing: usize,
    pub pct_cols_missing: f64,
    pub num_rows: usize,
}

/// Count and fraction of missing entries (null or NaN) per column, in column order.
///
/// The fraction is 0.0 for a dataset without rows.
pub fn missing_col_values(data: &Dataset) -> Vec<ColumnMissing> {
    let rows = data.height();
    data.column_names()
        .into_iter()
        .map(|column| {
            let count = data.missing_count(&column).unwrap_or(0);
            ColumnMissing {
                column,
                count,
                percent: fraction(count, rows),
            }
        })
        .collect()
}

/// Frequency table of per-row missing counts, ascending by count
pub fn missing_row_values(data: &Dataset) -> Vec<RowMissing> {
    let width = data.width();

    // the fraction is a function of the count, so grouping by count is enough
    let mut table: BTreeMap<usize, usize> = BTreeMap::new();
    for missing in data.row_missing_counts() {
        *table.entry(missing).or_default() += 1;
    }

    table
        .into_iter()
        .map(|(num_cols_missing, num_rows)| RowMissing {
            num_cols_missing,
            pct_cols_missing: fraction(num_cols_missing, width),
            num_rows,
        })
        .collect()
}

fn fraction(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
