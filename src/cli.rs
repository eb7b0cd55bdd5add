//! Command-line interface definitions and argument parsing

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Prepare mall-customer and parcel tables for clustering
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Clean, encode, split and scale a dataset
    Prepare {
        /// Which preparation pipeline to run
        #[arg(short, long, value_enum)]
        dataset: DatasetKind,

        /// Input CSV file; defaults to the dataset's cache file
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Directory for train.csv, validate.csv, test.csv and scaler.json
        #[arg(short, long, default_value = "prepared")]
        output_dir: PathBuf,

        /// Seed for the train/validate/test shuffle
        #[arg(long, default_value_t = 123)]
        seed: u64,

        /// Fraction of rows kept for train+validate
        #[arg(long, default_value_t = 0.8)]
        train_fraction: f64,

        /// Fraction of train+validate kept for train
        #[arg(long, default_value_t = 0.7)]
        inner_train_fraction: f64,
    },

    /// Print missing-value reports for a CSV file as JSON
    Diagnose {
        /// Input CSV file
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatasetKind {
    Mall,
    Zillow,
}

impl Args {
    /// Parse the log level string, defaulting to info
    pub fn tracing_level(&self) -> tracing::Level {
        match self.log_level.to_ascii_lowercase().as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "warn" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            _ => tracing::Level::INFO,
        }
    }
}
