//! Dataset-specific row selection by allow-list and exclude-list membership

use crate::data::Dataset;
use crate::error::Result;
use tracing::{debug, info};

/// Keeps rows whose `column` is in `allow` and whose `exclude_column` is not in `exclude`.
///
/// A missing `column` value never matches the allow-list; a missing
/// `exclude_column` value never matches the exclude-list. An absent
/// `exclude_column` (dropped as too sparse, say) excludes nothing.
#[derive(Debug, Clone)]
pub struct DomainFilter {
    pub column: String,
    pub allow: Vec<f64>,
    pub exclude_column: String,
    pub exclude: Vec<f64>,
}

impl DomainFilter {
    /// Single-unit residential parcels: single family, condominium,
    /// mobile home and cluster home land-use codes, excluding duplexes and triplexes.
    pub fn single_unit_properties() -> Self {
        Self {
            column: "propertylandusetypeid".to_string(),
            allow: vec![261.0, 263.0, 265.0, 275.0],
            exclude_column: "unitcnt".to_string(),
            exclude: vec![2.0, 3.0],
        }
    }

    pub fn apply(&self, data: Dataset) -> Result<Dataset> {
        let kinds = data.numeric_values(&self.column)?;
        let units = if data.has_column(&self.exclude_column) {
            data.numeric_values(&self.exclude_column)?
        } else {
            debug!(column = self.exclude_column.as_str(), "exclude column absent, excluding nothing");
            vec![None; data.height()]
        };

        let keep: Vec<bool> = kinds
            .iter()
            .zip(&units)
            .map(|(kind, unit)| {
                let allowed = kind.is_some_and(|k| self.allow.contains(&k));
                let excluded = unit.is_some_and(|u| self.exclude.contains(&u));
                allowed && !excluded
            })
            .collect();

        let before = data.height();
        let data = data.filter_rows(&keep)?;
        info!(
            column = self.column.as_str(),
            removed = before - data.height(),
            remaining = data.height(),
            "domain filter complete"
        );
        Ok(data)
    }
}
