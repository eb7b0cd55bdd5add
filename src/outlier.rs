//! Interquartile-range outlier removal

use crate::data::Dataset;
use crate::error::{PrepError, Result};
use tracing::{debug, info};

/// Fence derived from the quartiles of one column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrBounds {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrBounds {
    /// Strictly inside the fence
    pub fn contains(&self, value: f64) -> bool {
        value > self.lower && value < self.upper
    }
}

/// Removes rows whose values fall outside `q1 - k*iqr .. q3 + k*iqr`.
///
/// Columns are filtered one after another, each against the rows that
/// survived the previous columns, so column order matters.
#[derive(Debug, Clone)]
pub struct OutlierFilter {
    pub k: f64,
    pub columns: Vec<String>,
}

impl Default for OutlierFilter {
    fn default() -> Self {
        Self {
            k: 1.5,
            columns: Vec::new(),
        }
    }
}

impl OutlierFilter {
    pub fn new<S: Into<String>>(k: f64, columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            k,
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Compute the IQR fence for `column` over its current non-missing values
    pub fn bounds(&self, data: &Dataset, column: &str) -> Result<IqrBounds> {
        let mut values: Vec<f64> = data.numeric_values(column)?.into_iter().flatten().collect();
        if values.is_empty() {
            return Err(PrepError::EmptyColumn(column.to_string()));
        }
        values.sort_by(f64::total_cmp);

        let q1 = quantile_sorted(&values, 0.25);
        let q3 = quantile_sorted(&values, 0.75);
        let iqr = q3 - q1;

        Ok(IqrBounds {
            q1,
            q3,
            lower: q1 - self.k * iqr,
            upper: q3 + self.k * iqr,
        })
    }

    /// Filter the dataset column by column
    pub fn apply(&self, data: Dataset) -> Result<Dataset> {
        if !self.k.is_finite() || self.k < 0.0 {
            return Err(PrepError::InvalidConfig(format!(
                "outlier multiplier must be finite and non-negative, got {}",
                self.k
            )));
        }

        let starting_rows = data.height();
        let mut data = data;

        for column in &self.columns {
            let bounds = self.bounds(&data, column)?;
            let keep: Vec<bool> = data
                .numeric_values(column)?
                .into_iter()
                .map(|v| v.is_some_and(|v| bounds.contains(v)))
                .collect();

            let before = data.height();
            data = data.filter_rows(&keep)?;
            debug!(
                column = column.as_str(),
                lower = bounds.lower,
                upper = bounds.upper,
                removed = before - data.height(),
                "applied IQR fence"
            );
        }

        info!(
            removed = starting_rows - data.height(),
            remaining = data.height(),
            "outlier filter complete"
        );
        Ok(data)
    }
}

/// Quantile with linear interpolation between the closest ranks.
///
/// `sorted` must be non-empty and ascending.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn create_test_data() -> Dataset {
        let frame = df!(
            "id" => &[1i64, 2, 3, 4, 5, 6, 7, 8, 9, 10],
            "age" => &[20.0, 22.0, 25.0, 27.0, 30.0, 31.0, 33.0, 35.0, 38.0, 95.0],
            "income" => &[15.0, 18.0, 400.0, 20.0, 22.0, 25.0, 27.0, 30.0, 33.0, 35.0],
            "gender" => &["M", "F", "F", "M", "F", "M", "F", "M", "F", "M"]
        )
        .unwrap();
        Dataset::from_frame(frame)
    }

    fn ids(data: &Dataset) -> Vec<i64> {
        data.frame()
            .column("id")
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_no_null_iter()
            .collect()
    }

    #[test]
    fn test_quantile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&values, 0.25), 1.75);
        assert_eq!(quantile_sorted(&values, 0.75), 3.25);
        assert_eq!(quantile_sorted(&[7.0], 0.25), 7.0);
    }

    #[test]
    fn test_removes_outliers_in_each_column() {
        let data = create_test_data();
        let filter = OutlierFilter::new(1.5, ["age", "income"]);

        let result = filter.apply(data).unwrap();
        assert_eq!(ids(&result), vec![1, 2, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_retained_rows_inside_bounds_and_never_grows() {
        let data = create_test_data();
        let filter = OutlierFilter::new(1.5, ["age", "income"]);

        let first = filter.apply(data.clone()).unwrap();
        assert!(first.height() <= data.height());

        let second = filter.apply(first.clone()).unwrap();
        assert!(second.height() <= first.height());

        // age is fenced on the full data, income on what survived age
        let age_bounds = filter.bounds(&data, "age").unwrap();
        let after_age = OutlierFilter::new(1.5, ["age"]).apply(data).unwrap();
        let income_bounds = filter.bounds(&after_age, "income").unwrap();

        for v in first.numeric_values("age").unwrap().into_iter().flatten() {
            assert!(age_bounds.contains(v));
        }
        for v in first.numeric_values("income").unwrap().into_iter().flatten() {
            assert!(income_bounds.contains(v));
        }
    }

    #[test]
    fn test_missing_values_are_dropped() {
        let frame = df!(
            "x" => &[Some(1.0), Some(2.0), None, Some(3.0), Some(4.0)]
        )
        .unwrap();
        let result = OutlierFilter::new(1.5, ["x"])
            .apply(Dataset::from_frame(frame))
            .unwrap();
        assert_eq!(result.height(), 4);
    }

    #[test]
    fn test_nan_is_skipped_like_missing() {
        let frame = df!(
            "x" => &[1.0, 2.0, 3.0, 4.0, 5.0, f64::NAN, f64::NAN]
        )
        .unwrap();
        let data = Dataset::from_frame(frame);
        let filter = OutlierFilter::new(1.5, ["x"]);

        let bounds = filter.bounds(&data, "x").unwrap();
        assert_eq!((bounds.q1, bounds.q3), (2.0, 4.0));

        let result = filter.apply(data).unwrap();
        assert_eq!(
            result.numeric_values("x").unwrap(),
            vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)]
        );
    }

    #[test]
    fn test_descriptive_errors() {
        let data = create_test_data();

        let err = OutlierFilter::new(1.5, ["gender"]).apply(data.clone()).unwrap_err();
        assert!(matches!(err, PrepError::NonNumericColumn { .. }));
        assert!(err.to_string().contains("gender"));

        let err = OutlierFilter::new(1.5, ["missing"]).apply(data.clone()).unwrap_err();
        assert!(matches!(err, PrepError::ColumnNotFound(_)));

        let empty = Dataset::from_frame(df!("x" => &[None::<f64>, None]).unwrap());
        let err = OutlierFilter::new(1.5, ["x"]).apply(empty).unwrap_err();
        assert!(matches!(err, PrepError::EmptyColumn(_)));

        let err = OutlierFilter::new(-1.0, ["age"]).apply(data).unwrap_err();
        assert!(matches!(err, PrepError::InvalidConfig(_)));
    }

    #[test]
    fn test_no_columns_is_noop() {
        let data = create_test_data();
        let result = OutlierFilter::default().apply(data.clone()).unwrap();
        assert_eq!(result.height(), data.height());
    }
}
