//! Shared "train pipeline" logic used by the `train`, `demo` and `evaluate`
//! commands.
//!
//! load records -> hold-out split -> train -> evaluate
//!
//! The commands can then focus on presentation and file output.

use std::time::{Duration, Instant};

use tracing::info;

use crate::data::{SampleConfig, generate_training_set};
use crate::domain::{DataSource, HearingSetRecord, RunConfig};
use crate::error::AppError;
use crate::eval::{CrossValidation, EvaluationReport, cross_validate, evaluate, train_test_split};
use crate::io::ingest::{IngestOptions, RowError, load_dataset};
use crate::model::ClassifierArtifact;
use crate::train::{SoftmaxTrainer, train};

/// Records loaded from a data source.
#[derive(Debug, Clone)]
pub struct LoadedRecords {
    pub records: Vec<HearingSetRecord>,
    /// Skipped CSV rows (always empty for synthetic data).
    pub row_errors: Vec<RowError>,
    pub description: String,
}

/// All computed outputs of a single training run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub loaded: LoadedRecords,
    pub n_train: usize,
    pub artifact: ClassifierArtifact,
    /// Metrics on the held-out records, when a hold-out was requested.
    pub holdout: Option<EvaluationReport>,
    pub elapsed: Duration,
}

pub fn load_records(source: &DataSource, seed: u64) -> Result<LoadedRecords, AppError> {
    match source {
        DataSource::Csv { path, strict } => {
            let options = IngestOptions {
                strict: *strict,
                ..IngestOptions::default()
            };
            let data = load_dataset(path, &options)?;
            Ok(LoadedRecords {
                description: format!(
                    "{} ({} rows, {} skipped)",
                    path.display(),
                    data.rows_read,
                    data.row_errors.len()
                ),
                records: data.records,
                row_errors: data.row_errors,
            })
        }
        DataSource::Synthetic { count } => {
            let records = generate_training_set(&SampleConfig {
                count: *count,
                seed,
                ..SampleConfig::default()
            })?;
            Ok(LoadedRecords {
                description: format!("synthetic ({count} records, seed {seed})"),
                records,
                row_errors: Vec::new(),
            })
        }
    }
}

/// Execute the training pipeline and return the computed outputs.
pub fn run_train(config: &RunConfig) -> Result<RunOutput, AppError> {
    let loaded = load_records(&config.source, config.seed)?;
    run_train_with_records(config, loaded)
}

/// Training pipeline over already-loaded records.
pub fn run_train_with_records(config: &RunConfig, loaded: LoadedRecords) -> Result<RunOutput, AppError> {
    let (train_set, test_set) = if config.holdout > 0.0 {
        train_test_split(&loaded.records, config.holdout, config.seed)
    } else {
        (loaded.records.clone(), Vec::new())
    };

    let started = Instant::now();
    let artifact = train(&train_set, &config.train)?;
    let elapsed = started.elapsed();
    info!(records = train_set.len(), ?elapsed, "training finished");

    let holdout = if test_set.is_empty() {
        None
    } else {
        Some(evaluate(&artifact, &test_set)?)
    };

    Ok(RunOutput {
        n_train: train_set.len(),
        loaded,
        artifact,
        holdout,
        elapsed,
    })
}

/// k-fold cross-validation over the configured source.
pub fn run_cross_validation(config: &RunConfig, folds: usize) -> Result<CrossValidation, AppError> {
    let loaded = load_records(&config.source, config.seed)?;
    let trainer = SoftmaxTrainer::new(config.train.clone());
    Ok(cross_validate(&trainer, &loaded.records, folds, config.seed)?)
}
