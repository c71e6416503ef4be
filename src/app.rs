//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - runs training / evaluation / prediction
//! - prints reports and writes the optional model file

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, EvaluateArgs, PredictArgs, SourceArgs, TrainArgs};
use crate::data::fixtures;
use crate::domain::{DATASET_ENV, DataSource, HearingSetRecord, MODEL_ENV, RunConfig};
use crate::error::AppError;
use crate::io::ingest::{IngestOptions, load_dataset, parse_record_list};
use crate::io::model_file::{read_artifact_json, write_artifact_json};
use crate::predict::{predict, predict_batch};
use crate::report;

pub mod pipeline;

/// Entry point for the `audiogram` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    // `audiogram` and `audiogram --synthetic 200` behave like `audiogram demo ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Train(args) => handle_train(args),
        Command::Predict(args) => handle_predict(args),
        Command::Evaluate(args) => handle_evaluate(args),
        Command::Demo(args) => handle_demo(args),
    }
}

/// Logs go to stderr so stdout carries only the report. `RUST_LOG` overrides
/// the default `info` filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_train(args: TrainArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args, env_path(DATASET_ENV), env_path(MODEL_ENV));
    let run = pipeline::run_train(&config)?;

    println!("{}", format_run_summary(&run));
    if let Some(path) = &config.model_out {
        write_artifact_json(path, &run.artifact)?;
        println!("Model written to {}", path.display());
    }
    Ok(())
}

fn handle_demo(args: TrainArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args, env_path(DATASET_ENV), None);
    let run = pipeline::run_train(&config)?;
    println!("{}", format_run_summary(&run));
    println!("\n============================================\n");

    for (name, record) in fixtures::all() {
        let prediction = predict(&run.artifact, &record)?;
        println!("Using model to make predictions for '{name}':\n");
        println!("{}", report::format_record(&record));
        println!("{}", report::format_prediction(&prediction));
    }
    Ok(())
}

fn handle_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let config = RunConfig {
        source: data_source(&args.source, env_path(DATASET_ENV)),
        seed: args.source.seed,
        holdout: 0.0,
        train: args.hyper.to_train_config(),
        model_out: None,
    };
    let cv = pipeline::run_cross_validation(&config, args.folds)?;
    println!("{}", report::format_cross_validation(&cv));
    Ok(())
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let model_path = args.model.clone().or_else(|| env_path(MODEL_ENV)).ok_or_else(|| {
        AppError::new(2, format!("No model given: pass --model or set {MODEL_ENV}."))
    })?;
    let artifact = read_artifact_json(&model_path)?;
    if !args.json {
        println!("{}", report::format_artifact_summary(&artifact));
    }

    let (names, records): (Vec<String>, Vec<HearingSetRecord>) =
        predict_inputs(&args)?.into_iter().unzip();
    let predictions = predict_batch(&artifact, &records);
    for ((label, record), result) in names.iter().zip(&records).zip(predictions) {
        let prediction = result?;
        if args.json {
            println!("{}", report::format_prediction_json(label, &prediction)?);
            continue;
        }
        println!("Record {label}:\n");
        println!("{}", report::format_record(record));
        println!("{}", report::format_prediction(&prediction));
    }
    Ok(())
}

fn predict_inputs(args: &PredictArgs) -> Result<Vec<(String, HearingSetRecord)>, AppError> {
    if let Some(name) = &args.fixture {
        let record = fixtures::get(name).ok_or_else(|| {
            AppError::new(
                2,
                format!("Unknown fixture '{name}' (expected one of: {}).", fixtures::NAMES.join(", ")),
            )
        })?;
        return Ok(vec![(name.clone(), record)]);
    }
    if let Some(list) = &args.record {
        return Ok(vec![("inline".to_string(), parse_record_list(list)?)]);
    }
    if let Some(path) = &args.data {
        let data = load_dataset(path, &IngestOptions::default())?;
        return Ok(data
            .records
            .into_iter()
            .enumerate()
            .map(|(i, r)| (format!("#{}", i + 1), r))
            .collect());
    }
    Err(AppError::new(2, "Nothing to predict: pass --fixture, --record or --data."))
}

fn format_run_summary(run: &pipeline::RunOutput) -> String {
    let mut out = String::new();
    out.push_str("=== audiogram - hearing loss classifier ===\n");
    out.push_str(&format!("Data: {}\n", run.loaded.description));
    out.push_str(&format!("Training records: {}\n", run.n_train));
    out.push_str(&format!("{}\n", report::format_elapsed(run.elapsed)));
    out.push_str(&report::format_artifact_summary(&run.artifact));
    match &run.holdout {
        Some(holdout) => {
            out.push_str("\nHold-out evaluation:\n");
            out.push_str(&report::format_evaluation(holdout));
        }
        None => out.push_str("\nNo hold-out evaluation (holdout = 0).\n"),
    }
    out
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Flags win over environment; with neither, synthetic data is used.
fn data_source(args: &SourceArgs, env_dataset: Option<PathBuf>) -> DataSource {
    match args.data.clone().or(env_dataset) {
        Some(path) => DataSource::Csv {
            path,
            strict: args.strict,
        },
        None => DataSource::Synthetic {
            count: args.synthetic,
        },
    }
}

pub fn run_config_from_args(
    args: &TrainArgs,
    env_dataset: Option<PathBuf>,
    env_model: Option<PathBuf>,
) -> RunConfig {
    RunConfig {
        source: data_source(&args.source, env_dataset),
        seed: args.source.seed,
        holdout: args.holdout,
        train: args.hyper.to_train_config(),
        model_out: args.out.clone().or(env_model),
    }
}

/// Rewrite argv so `audiogram` defaults to `audiogram demo`.
///
/// Rules:
/// - `audiogram`                      -> `audiogram demo`
/// - `audiogram --synthetic 200 ...`  -> `audiogram demo --synthetic 200 ...`
/// - `audiogram --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("demo".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "demo".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_demo() {
        assert_eq!(rewrite_args(argv(&["audiogram"])), argv(&["audiogram", "demo"]));
        assert_eq!(
            rewrite_args(argv(&["audiogram", "--synthetic", "80"])),
            argv(&["audiogram", "demo", "--synthetic", "80"])
        );
        assert_eq!(
            rewrite_args(argv(&["audiogram", "--help"])),
            argv(&["audiogram", "--help"])
        );
        assert_eq!(
            rewrite_args(argv(&["audiogram", "train", "--strict"])),
            argv(&["audiogram", "train", "--strict"])
        );
    }

    fn train_args(extra: &[&str]) -> TrainArgs {
        let mut args = vec!["audiogram", "train"];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Command::Train(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn flags_win_over_environment() {
        let args = train_args(&["--data", "flag.csv", "--out", "flag.json"]);
        let config = run_config_from_args(
            &args,
            Some(PathBuf::from("env.csv")),
            Some(PathBuf::from("env.json")),
        );
        assert_eq!(
            config.source,
            DataSource::Csv {
                path: PathBuf::from("flag.csv"),
                strict: false
            }
        );
        assert_eq!(config.model_out, Some(PathBuf::from("flag.json")));
    }

    #[test]
    fn environment_fills_missing_flags() {
        let args = train_args(&["--strict"]);
        let config = run_config_from_args(&args, Some(PathBuf::from("env.csv")), None);
        assert_eq!(
            config.source,
            DataSource::Csv {
                path: PathBuf::from("env.csv"),
                strict: true
            }
        );
        assert_eq!(config.model_out, None);
    }

    #[test]
    fn no_dataset_means_synthetic() {
        let args = train_args(&["--synthetic", "64", "--seed", "3"]);
        let config = run_config_from_args(&args, None, None);
        assert_eq!(config.source, DataSource::Synthetic { count: 64 });
        assert_eq!(config.seed, 3);
        assert_eq!(config.holdout, 0.2);
    }
}
