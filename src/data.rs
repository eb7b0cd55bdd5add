//! Dataset wrapper over a Polars `DataFrame`, CSV persistence and feature export

use crate::error::{PrepError, Result};
use ndarray::Array2;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Field values read as missing in CSV input, besides empty fields
pub const NULL_TOKENS: &[&str] = &["NA", "N/A", "NaN", "nan", "null", "NULL"];

/// Semantic classification of a column, derived from its current dtype
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Primitive numeric or boolean values
    Numeric,
    /// String values, treated as discrete categories
    Categorical,
    /// Anything else (temporal, nested, all-null)
    Other,
}

impl ColumnKind {
    pub fn of(dtype: &DataType) -> Self {
        if dtype.is_primitive_numeric() || matches!(dtype, DataType::Boolean) {
            ColumnKind::Numeric
        } else if matches!(dtype, DataType::String) {
            ColumnKind::Categorical
        } else {
            ColumnKind::Other
        }
    }
}

/// An in-memory table threaded by value through the preparation stages.
///
/// Missing entries are Polars nulls; float NaN is read as missing too. Every stage consumes a `Dataset` and
/// returns a new one; cloning is cheap because column buffers are shared.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
}

impl Dataset {
    pub fn from_frame(frame: DataFrame) -> Self {
        Self { frame }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.frame
            .column(name)
            .map_err(|_| PrepError::ColumnNotFound(name.to_string()))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    pub fn column_kind(&self, name: &str) -> Result<ColumnKind> {
        Ok(ColumnKind::of(self.column(name)?.dtype()))
    }

    /// Names of all numeric columns, in column order
    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns_of_kind(ColumnKind::Numeric)
    }

    /// Names of all categorical (string) columns, in column order
    pub fn categorical_columns(&self) -> Vec<String> {
        self.columns_of_kind(ColumnKind::Categorical)
    }

    fn columns_of_kind(&self, kind: ColumnKind) -> Vec<String> {
        self.frame
            .get_columns()
            .iter()
            .filter(|c| ColumnKind::of(c.dtype()) == kind)
            .map(|c| c.name().to_string())
            .collect()
    }

    /// Read a numeric column as `f64`, keeping missing entries as `None`.
    /// Float NaN counts as missing.
    ///
    /// Fails with a descriptive error when the column is absent or not numeric.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let column = self.column(name)?;
        if ColumnKind::of(column.dtype()) != ColumnKind::Numeric {
            return Err(PrepError::NonNumericColumn {
                column: name.to_string(),
                dtype: column.dtype().to_string(),
            });
        }

        let values = column
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        Ok(values
            .f64()?
            .into_iter()
            .map(|v| v.filter(|v| !v.is_nan()))
            .collect())
    }

    /// Per-row missing flags for one column
    pub fn missing_mask(&self, name: &str) -> Result<Vec<bool>> {
        Ok(null_flags(self.column(name)?))
    }

    /// Number of missing entries (null or NaN) in one column
    pub fn missing_count(&self, name: &str) -> Result<usize> {
        Ok(null_flags(self.column(name)?).into_iter().filter(|&m| m).count())
    }

    /// Number of missing entries in each row, across all current columns
    pub fn row_missing_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.height()];
        for column in self.frame.get_columns() {
            for (count, missing) in counts.iter_mut().zip(null_flags(column)) {
                if missing {
                    *count += 1;
                }
            }
        }
        counts
    }

    /// Keep the rows whose flag is `true`
    pub fn filter_rows(&self, keep: &[bool]) -> Result<Dataset> {
        let mask = BooleanChunked::from_slice("mask".into(), keep);
        Ok(Dataset::from_frame(self.frame.filter(&mask)?))
    }

    /// Gather rows by position, in the given order
    pub fn take_rows(&self, rows: &[usize]) -> Result<Dataset> {
        let indices: Vec<IdxSize> = rows.iter().map(|&i| i as IdxSize).collect();
        let indices = IdxCa::from_vec("idx".into(), indices);
        Ok(Dataset::from_frame(self.frame.take(&indices)?))
    }

    /// Keep only the named columns, in the given order
    pub fn select_columns(&self, names: &[String]) -> Result<Dataset> {
        for name in names {
            self.column(name)?;
        }
        Ok(Dataset::from_frame(self.frame.select(names.iter().cloned())?))
    }

    /// Add a column, replacing any existing column of the same name
    pub fn with_column(mut self, series: Series) -> Result<Dataset> {
        self.frame.with_column(series)?;
        Ok(self)
    }

    /// Drop the named columns. Every name must exist.
    pub fn drop_columns(self, names: &[&str]) -> Result<Dataset> {
        for name in names {
            self.column(name)?;
        }
        let keep: Vec<String> = self
            .column_names()
            .into_iter()
            .filter(|c| !names.contains(&c.as_str()))
            .collect();
        self.select_columns(&keep)
    }

    /// Drop every categorical column, leaving only numeric and other columns
    pub fn drop_categorical(self) -> Result<Dataset> {
        let categorical = self.categorical_columns();
        let names: Vec<&str> = categorical.iter().map(String::as_str).collect();
        self.drop_columns(&names)
    }

    /// Load a comma-separated file with a header row.
    ///
    /// Empty fields and the [`NULL_TOKENS`] are read as missing.
    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Dataset> {
        let file = File::open(path.as_ref())?;
        let null_values = NullValues::AllColumns(NULL_TOKENS.iter().map(|&t| t.into()).collect());
        let parse_opts = CsvParseOptions::default().with_null_values(Some(null_values));

        let frame = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(file)
            .finish()?;
        Ok(Dataset::from_frame(frame))
    }

    /// Write the dataset as comma-separated text with a header row
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = File::create(path.as_ref())?;
        let mut frame = self.frame.clone();
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut frame)?;
        Ok(())
    }

    /// Export all numeric columns as a dense feature matrix (rows, columns)
    ///
    /// # Returns
    /// * The matrix and the column names matching its columns
    pub fn to_ndarray(&self) -> Result<(Array2<f64>, Vec<String>)> {
        let names = self.numeric_columns();
        let n_samples = self.height();

        let mut columns = Vec::with_capacity(names.len());
        for name in &names {
            let values = self.numeric_values(name)?;
            let missing = values.iter().filter(|v| v.is_none()).count();
            if missing > 0 {
                return Err(PrepError::MissingValues {
                    column: name.clone(),
                    count: missing,
                });
            }
            columns.push(values.into_iter().flatten().collect::<Vec<f64>>());
        }

        let mut data = Vec::with_capacity(n_samples * names.len());
        for i in 0..n_samples {
            data.extend(columns.iter().map(|c| c[i]));
        }

        let features = Array2::from_shape_vec((n_samples, names.len()), data)?;
        Ok((features, names))
    }
}

impl From<DataFrame> for Dataset {
    fn from(frame: DataFrame) -> Self {
        Dataset::from_frame(frame)
    }
}

fn null_flags(column: &Column) -> Vec<bool> {
    let series = column.as_materialized_series();
    if series.dtype().is_float() {
        if let Ok(values) = series.cast(&DataType::Float64) {
            if let Ok(values) = values.f64() {
                return values
                    .into_iter()
                    .map(|v| v.map_or(true, f64::is_nan))
                    .collect();
            }
        }
    }

    series
        .is_null()
        .into_iter()
        .map(|flag| flag.unwrap_or(false))
        .collect()
}
