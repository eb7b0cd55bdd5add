//! clusterprep: data preparation for clustering
//!
//! Cleans a tabular dataset into a numeric, split and scaled form:
//! IQR outlier removal, missing-value triage, domain filtering, one-hot
//! encoding, seeded train/validate/test partitioning and min-max scaling.
//! Acquisition sits behind the [`SourceProvider`] trait.

pub mod cli;
pub mod data;
pub mod diagnostics;
pub mod encode;
pub mod error;
pub mod filter;
pub mod missing;
pub mod outlier;
pub mod pipeline;
pub mod scale;
pub mod source;
pub mod split;

// Re-export public items for easier access
pub use data::{ColumnKind, Dataset};
pub use diagnostics::{missing_col_values, missing_row_values, ColumnMissing, RowMissing};
pub use encode::CategoricalEncoder;
pub use error::{PrepError, Result};
pub use filter::DomainFilter;
pub use missing::{FillRule, MissingValueTriage};
pub use outlier::{IqrBounds, OutlierFilter};
pub use pipeline::{MallPipeline, Prepared, ZillowPipeline};
pub use scale::{ColumnBounds, MinMaxScaler};
pub use source::{
    CachedSource, CredentialResolver, CsvSource, EnvCredentials, RemoteSource, SourceConfig,
    SourceProvider,
};
pub use split::{Partition, Partitioner};
