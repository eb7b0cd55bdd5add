//! Reproducible train / validate / test partitioning

use crate::data::Dataset;
use crate::error::{PrepError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::info;

/// Three disjoint subsets whose union is the partitioned dataset
#[derive(Debug, Clone)]
pub struct Partition {
    pub train: Dataset,
    pub validate: Dataset,
    pub test: Dataset,
}

impl Partition {
    pub fn sizes(&self) -> (usize, usize, usize) {
        (self.train.height(), self.validate.height(), self.test.height())
    }
}

/// Two successive seeded splits: first (train+validate) vs. test at
/// `train_fraction`, then train vs. validate at `inner_train_fraction`.
/// No stratification.
#[derive(Debug, Clone)]
pub struct Partitioner {
    pub train_fraction: f64,
    pub inner_train_fraction: f64,
    pub seed: u64,
}

impl Default for Partitioner {
    fn default() -> Self {
        Self {
            train_fraction: 0.8,
            inner_train_fraction: 0.7,
            seed: 123,
        }
    }
}

impl Partitioner {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_fractions(mut self, train_fraction: f64, inner_train_fraction: f64) -> Self {
        self.train_fraction = train_fraction;
        self.inner_train_fraction = inner_train_fraction;
        self
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("train_fraction", self.train_fraction),
            ("inner_train_fraction", self.inner_train_fraction),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(PrepError::InvalidProportion {
                    name,
                    value,
                    expected: "a value strictly between 0 and 1",
                });
            }
        }
        Ok(())
    }

    pub fn split(&self, data: Dataset) -> Result<Partition> {
        self.validate()?;

        let (train_validate, test) = split_once(&data, self.train_fraction, self.seed)?;
        let (train, validate) = split_once(&train_validate, self.inner_train_fraction, self.seed)?;

        let partition = Partition {
            train,
            validate,
            test,
        };
        let (n_train, n_validate, n_test) = partition.sizes();
        info!(
            train = n_train,
            validate = n_validate,
            test = n_test,
            seed = self.seed,
            "partitioned dataset"
        );
        Ok(partition)
    }
}

/// Shuffle row positions with a seeded generator and cut at `floor(fraction * n)`
fn split_once(data: &Dataset, fraction: f64, seed: u64) -> Result<(Dataset, Dataset)> {
    let n_samples = data.height();
    let mut rows: Vec<usize> = (0..n_samples).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    rows.shuffle(&mut rng);

    let cut = (fraction * n_samples as f64).floor() as usize;
    let (first, second) = rows.split_at(cut);
    Ok((data.take_rows(first)?, data.take_rows(second)?))
}
