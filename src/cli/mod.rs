//! Command-line parsing for the `audiogram` classifier.
//!
//! The goal of this module is to keep **argument parsing** separate from
//! command dispatch (`app`) and from the modeling code.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

use crate::domain::TrainConfig;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "audiogram", version, about = "Audiogram hearing-loss classifier")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Train a classifier, report hold-out metrics and optionally save it.
    Train(TrainArgs),
    /// Classify records with a saved classifier.
    Predict(PredictArgs),
    /// k-fold cross-validation of the training settings.
    Evaluate(EvaluateArgs),
    /// Train, then classify the built-in fixtures (the default command).
    Demo(TrainArgs),
}

/// Where training records come from.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Training CSV (Type, Degree, Config, then the 24 thresholds).
    ///
    /// Falls back to `AUDIOGRAM_DATASET`, then to synthetic data.
    #[arg(long, value_name = "CSV")]
    pub data: Option<PathBuf>,

    /// Number of synthetic records when no CSV is used.
    #[arg(long, default_value_t = 400)]
    pub synthetic: usize,

    /// Abort on the first bad CSV row instead of skipping it.
    #[arg(long)]
    pub strict: bool,

    /// Seed for synthetic data and shuffling.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Optimizer settings.
#[derive(Debug, Args, Clone)]
pub struct HyperArgs {
    /// Maximum gradient-descent epochs per head.
    #[arg(long, default_value_t = 500)]
    pub epochs: usize,

    /// Step size as a fraction of the safe step (0 < r <= 2).
    #[arg(long, default_value_t = 1.0)]
    pub learning_rate: f64,

    /// Heavy-ball momentum in [0, 1).
    #[arg(long, default_value_t = 0.9)]
    pub momentum: f64,

    /// L2 penalty on head weights.
    #[arg(long, default_value_t = 1e-3)]
    pub l2: f64,
}

impl HyperArgs {
    pub fn to_train_config(&self) -> TrainConfig {
        TrainConfig {
            learning_rate: self.learning_rate,
            momentum: self.momentum,
            l2: self.l2,
            max_epochs: self.epochs,
            ..TrainConfig::default()
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct TrainArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub hyper: HyperArgs,

    /// Fraction of records held out for evaluation (0 disables).
    #[arg(long, default_value_t = 0.2)]
    pub holdout: f64,

    /// Save the trained model as JSON (falls back to `AUDIOGRAM_MODEL`).
    #[arg(long, value_name = "JSON")]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
#[command(group(
    ArgGroup::new("input")
        .required(true)
        .args(["fixture", "record", "data"])
))]
pub struct PredictArgs {
    /// Model JSON written by `audiogram train --out` (falls back to `AUDIOGRAM_MODEL`).
    #[arg(long, value_name = "JSON")]
    pub model: Option<PathBuf>,

    /// Built-in fixture: conductive, mixed, none, sensorineural, low-frequency.
    #[arg(long)]
    pub fixture: Option<String>,

    /// Inline record, e.g. "AC_L_250=10,AC_L_500=15,...".
    #[arg(long, value_name = "LIST")]
    pub record: Option<String>,

    /// CSV of records to classify (labels, if present, are shown but not used).
    #[arg(long, value_name = "CSV")]
    pub data: Option<PathBuf>,

    /// Print one JSON object per record instead of the text report.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub hyper: HyperArgs,

    /// Number of cross-validation folds.
    #[arg(long, default_value_t = 5)]
    pub folds: usize,
}
