//! End-to-end preparation for the mall-customer and parcel tables
//!
//! Both pipelines finish the same way: encode, drop the string sources,
//! partition, fit the scaler on train and apply it to all three subsets.
//! A table with no surviving rows yields three empty partitions and an
//! empty scaler; rows that all land outside train are an error.

use crate::data::Dataset;
use crate::encode::CategoricalEncoder;
use crate::error::{PrepError, Result};
use crate::filter::DomainFilter;
use crate::missing::MissingValueTriage;
use crate::outlier::OutlierFilter;
use crate::scale::MinMaxScaler;
use crate::split::{Partition, Partitioner};
use tracing::{info, warn};

/// Scaled partitions plus the scaler fitted on the training subset
#[derive(Debug, Clone)]
pub struct Prepared {
    pub partition: Partition,
    pub scaler: MinMaxScaler,
}

#[derive(Debug, Clone)]
pub struct MallPipeline {
    pub outlier: OutlierFilter,
    pub partitioner: Partitioner,
    pub drop_columns: Vec<String>,
}

impl Default for MallPipeline {
    fn default() -> Self {
        Self {
            outlier: OutlierFilter::new(1.5, ["age", "annual_income", "spending_score"]),
            partitioner: Partitioner::default(),
            drop_columns: vec!["customer_id".to_string()],
        }
    }
}

impl MallPipeline {
    pub fn with_partitioner(mut self, partitioner: Partitioner) -> Self {
        self.partitioner = partitioner;
        self
    }

    pub fn prepare(&self, data: Dataset) -> Result<Prepared> {
        info!(rows = data.height(), columns = data.width(), "preparing mall dataset");
        let data = self.outlier.apply(data)?;
        let data = drop_present(data, &self.drop_columns)?;
        finish(data, &self.partitioner)
    }
}

#[derive(Debug, Clone)]
pub struct ZillowPipeline {
    pub outlier: OutlierFilter,
    pub triage: MissingValueTriage,
    pub domain: DomainFilter,
    pub partitioner: Partitioner,
    pub drop_columns: Vec<String>,
}

impl Default for ZillowPipeline {
    fn default() -> Self {
        Self {
            outlier: OutlierFilter::default(),
            triage: MissingValueTriage::zillow(),
            domain: DomainFilter::single_unit_properties(),
            partitioner: Partitioner::default(),
            drop_columns: vec!["id".to_string(), "parcelid".to_string()],
        }
    }
}

impl ZillowPipeline {
    pub fn with_partitioner(mut self, partitioner: Partitioner) -> Self {
        self.partitioner = partitioner;
        self
    }

    pub fn prepare(&self, data: Dataset) -> Result<Prepared> {
        info!(rows = data.height(), columns = data.width(), "preparing zillow dataset");
        let data = self.outlier.apply(data)?;
        let data = self.triage.apply(data)?;
        let data = self.domain.apply(data)?;
        let data = drop_present(data, &self.drop_columns)?;
        finish(data, &self.partitioner)
    }
}

/// Drop the listed columns that exist; absent ones are ignored
fn drop_present(data: Dataset, columns: &[String]) -> Result<Dataset> {
    let present: Vec<&str> = columns
        .iter()
        .map(String::as_str)
        .filter(|c| data.has_column(c))
        .collect();
    data.drop_columns(&present)
}

fn finish(data: Dataset, partitioner: &Partitioner) -> Result<Prepared> {
    let data = CategoricalEncoder::new().apply(data)?;
    let data = data.drop_categorical()?;

    if data.is_empty() {
        warn!("no rows left to partition");
        return Ok(Prepared {
            partition: Partition {
                train: data.clone(),
                validate: data.clone(),
                test: data,
            },
            scaler: MinMaxScaler::default(),
        });
    }

    let partition = partitioner.split(data)?;
    if partition.train.is_empty() {
        return Err(PrepError::EmptyPartition("train"));
    }
    let scaler = MinMaxScaler::fit(&partition.train)?;

    let partition = Partition {
        train: scaler.transform(partition.train)?,
        validate: scaler.transform(partition.validate)?,
        test: scaler.transform(partition.test)?,
    };
    info!(columns = scaler.bounds().len(), "scaled partitions with train bounds");

    Ok(Prepared { partition, scaler })
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn create_mall_data() -> Dataset {
        let n = 40i64;
        let ids: Vec<i64> = (1..=n).collect();
        let genders: Vec<&str> = (0..n).map(|i| if i % 3 == 0 { "Female" } else { "Male" }).collect();
        let mut ages: Vec<f64> = (0..n).map(|i| 18.0 + (i % 30) as f64 * 1.5).collect();
        ages[5] = 400.0;
        let incomes: Vec<f64> = (0..n).map(|i| 15.0 + i as f64 * 3.0).collect();
        let scores: Vec<f64> = (0..n).map(|i| ((i * 37) % 99 + 1) as f64).collect();

        Dataset::from_frame(
            df!(
                "customer_id" => ids,
                "gender" => genders,
                "age" => ages,
                "annual_income" => incomes,
                "spending_score" => scores
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_mall_pipeline() {
        let prepared = MallPipeline::default().prepare(create_mall_data()).unwrap();
        let (train, validate, test) = prepared.partition.sizes();

        // the 400-year-old customer is gone
        assert_eq!(train + validate + test, 39);

        let names = prepared.partition.train.column_names();
        assert_eq!(names, vec!["age", "annual_income", "spending_score", "gender_Male"]);

        for name in &names {
            for v in prepared.partition.train.numeric_values(name).unwrap() {
                let v = v.unwrap();
                assert!((0.0..=1.0).contains(&v), "{} out of range: {}", name, v);
            }
        }
    }

    #[test]
    fn test_zillow_pipeline_fills_and_filters() {
        let n = 20usize;
        let parcel: Vec<i64> = (0..n as i64).map(|i| 1000 + i).collect();
        let land_use: Vec<f64> = (0..n).map(|i| if i % 5 == 0 { 246.0 } else { 261.0 }).collect();
        let units: Vec<Option<f64>> = (0..n).map(|i| if i % 2 == 0 { None } else { Some(1.0) }).collect();
        let tax: Vec<f64> = (0..n).map(|i| 100_000.0 + i as f64 * 5_000.0).collect();
        let land: Vec<f64> = (0..n).map(|i| 40_000.0 + i as f64 * 1_000.0).collect();
        let structure: Vec<Option<f64>> = (0..n)
            .map(|i| if i % 4 == 1 { None } else { Some(60_000.0 + i as f64 * 4_000.0) })
            .collect();
        let pool: Vec<Option<f64>> = (0..n).map(|i| if i < 3 { Some(1.0) } else { None }).collect();
        let heating: Vec<Option<&str>> = (0..n)
            .map(|i| match i % 3 {
                0 => Some("Central"),
                1 => Some("Floor/Wall"),
                _ => None,
            })
            .collect();

        let frame = df!(
            "parcelid" => parcel,
            "propertylandusetypeid" => land_use,
            "unitcnt" => units,
            "taxvaluedollarcnt" => tax,
            "landtaxvaluedollarcnt" => land,
            "structuretaxvaluedollarcnt" => structure,
            "poolcnt" => pool,
            "heatingorsystemdesc" => heating
        )
        .unwrap();

        let prepared = ZillowPipeline::default()
            .prepare(Dataset::from_frame(frame))
            .unwrap();
        let (train, validate, test) = prepared.partition.sizes();

        // heating is 1/3 missing, kept at 0.5; rows missing it are dropped by
        // the final incomplete-row pass; 246 land use is excluded
        let expected = (0..n).filter(|i| i % 3 != 2 && i % 5 != 0).count();
        assert_eq!(train + validate + test, expected);

        let names = prepared.partition.train.column_names();
        assert!(!names.contains(&"poolcnt".to_string()));
        assert!(!names.contains(&"parcelid".to_string()));
        assert!(names.contains(&"heatingorsystemdesc_Floor/Wall".to_string()));
        assert!(prepared.scaler.column_bounds("structuretaxvaluedollarcnt").is_some());
    }

    fn create_parcels(land_use: Vec<f64>, units: Vec<Option<f64>>) -> Dataset {
        let n = land_use.len();
        let tax: Vec<f64> = (0..n).map(|i| 100_000.0 + i as f64 * 5_000.0).collect();
        Dataset::from_frame(
            df!(
                "propertylandusetypeid" => land_use,
                "unitcnt" => units,
                "taxvaluedollarcnt" => tax
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_zillow_pipeline_without_sparse_unit_count() {
        // 7 of 10 unit counts missing, so triage drops the column before the domain filter
        let units: Vec<Option<f64>> = (0..10).map(|i| if i < 7 { None } else { Some(1.0) }).collect();
        let data = create_parcels(vec![261.0; 10], units);

        let prepared = ZillowPipeline::default().prepare(data).unwrap();
        let (train, validate, test) = prepared.partition.sizes();

        assert_eq!(train + validate + test, 10);
        assert!(!prepared.partition.train.has_column("unitcnt"));
    }

    #[test]
    fn test_no_surviving_rows_gives_empty_partitions() {
        let data = create_parcels(vec![999.0; 6], vec![Some(1.0); 6]);

        let prepared = ZillowPipeline::default().prepare(data).unwrap();

        assert_eq!(prepared.partition.sizes(), (0, 0, 0));
        assert!(prepared.scaler.bounds().is_empty());
    }

    #[test]
    fn test_empty_train_partition_is_an_error() {
        let data = create_parcels(vec![261.0], vec![Some(1.0)]);

        let err = ZillowPipeline::default().prepare(data).unwrap_err();

        assert!(matches!(err, PrepError::EmptyPartition("train")));
        assert!(err.to_string().contains("train"));
    }
}
