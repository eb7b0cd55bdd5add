//! clusterprep: command-line entry point
//!
//! Thin wrapper that loads a CSV, runs the matching preparation pipeline and
//! writes the scaled partitions, or prints missing-value diagnostics.

use anyhow::{Context, Result};
use clap::Parser;
use clusterprep::cli::{Args, Command, DatasetKind};
use clusterprep::{
    missing_col_values, missing_row_values, CsvSource, MallPipeline, Partitioner, Prepared,
    SourceConfig, SourceProvider, ZillowPipeline,
};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.tracing_level())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Prepare {
            dataset,
            input,
            output_dir,
            seed,
            train_fraction,
            inner_train_fraction,
        } => {
            let partitioner = Partitioner::default()
                .with_seed(seed)
                .with_fractions(train_fraction, inner_train_fraction);
            run_prepare(dataset, input, &output_dir, partitioner)
        }
        Command::Diagnose { input } => run_diagnose(&input),
    }
}

fn run_prepare(
    dataset: DatasetKind,
    input: Option<PathBuf>,
    output_dir: &Path,
    partitioner: Partitioner,
) -> Result<()> {
    let start_time = Instant::now();

    let input = input.unwrap_or_else(|| match dataset {
        DatasetKind::Mall => SourceConfig::mall().cache_path,
        DatasetKind::Zillow => SourceConfig::zillow().cache_path,
    });
    let data = CsvSource::new(&input)
        .acquire()
        .with_context(|| format!("failed to load {}", input.display()))?;

    let Prepared { partition, scaler } = match dataset {
        DatasetKind::Mall => MallPipeline::default()
            .with_partitioner(partitioner)
            .prepare(data)?,
        DatasetKind::Zillow => ZillowPipeline::default()
            .with_partitioner(partitioner)
            .prepare(data)?,
    };

    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;
    for (name, subset) in [
        ("train", &partition.train),
        ("validate", &partition.validate),
        ("test", &partition.test),
    ] {
        let path = output_dir.join(format!("{}.csv", name));
        subset
            .write_csv(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), rows = subset.height(), "wrote partition");
    }

    let scaler_path = output_dir.join("scaler.json");
    serde_json::to_writer_pretty(File::create(&scaler_path)?, &scaler)?;

    let (train, validate, test) = partition.sizes();
    println!("✓ Prepared {:?} dataset", dataset);
    println!("  Train: {} rows, Validate: {} rows, Test: {} rows", train, validate, test);
    println!("  Features: {}", partition.train.width());
    println!("  Output directory: {}", output_dir.display());
    println!("  Processing time: {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(())
}

fn run_diagnose(input: &Path) -> Result<()> {
    let data = CsvSource::new(input)
        .acquire()
        .with_context(|| format!("failed to load {}", input.display()))?;

    let report = serde_json::json!({
        "rows": data.height(),
        "columns": data.width(),
        "missing_by_column": missing_col_values(&data),
        "missing_by_row": missing_row_values(&data),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
