//! Model evaluation: hold-out splits, multiclass metrics and k-fold
//! cross-validation.
//!
//! Metrics mirror what a multiclass trainer usually reports:
//! - micro accuracy: fraction of records whose Type is predicted correctly
//! - macro accuracy: mean per-class recall over the Type classes present
//! - log-loss of the Type score vector
//! - plain accuracy for Degree and Config

use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;
use tracing::info;

use crate::domain::{HearingSetRecord, LabelSpace, TYPE_CLASS_COUNT, TypeLabel};
use crate::error::ClassifyError;
use crate::model::Classifier;
use crate::predict::predict;
use crate::train::Trainer;

/// Probabilities are clipped here before taking the log.
const LOG_LOSS_EPS: f64 = 1e-15;

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub n: usize,
    pub type_micro_accuracy: f64,
    pub type_macro_accuracy: f64,
    pub type_log_loss: f64,
    pub degree_accuracy: f64,
    pub config_accuracy: f64,
    /// `type_confusion[actual][predicted]`, indexed by `TypeLabel::ALL`.
    pub type_confusion: [[usize; TYPE_CLASS_COUNT]; TYPE_CLASS_COUNT],
}

/// Per-fold reports plus their average.
#[derive(Debug, Clone)]
pub struct CrossValidation {
    pub folds: Vec<EvaluationReport>,
    pub mean: EvaluationReport,
}

/// Shuffle and split into `(train, test)`.
///
/// The test share is `round(n * test_fraction)`, capped so the training side
/// keeps at least one record.
pub fn train_test_split(
    records: &[HearingSetRecord],
    test_fraction: f64,
    seed: u64,
) -> (Vec<HearingSetRecord>, Vec<HearingSetRecord>) {
    let n = records.len();
    let fraction = if test_fraction.is_finite() {
        test_fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let n_test = ((n as f64 * fraction).round() as usize).min(n.saturating_sub(1));

    let order = shuffled_indices(n, seed);
    let test = order[..n_test].iter().map(|&i| records[i].clone()).collect();
    let train = order[n_test..].iter().map(|&i| records[i].clone()).collect();
    (train, test)
}

/// Score a classifier against labeled records.
pub fn evaluate<C: Classifier + ?Sized>(
    classifier: &C,
    records: &[HearingSetRecord],
) -> Result<EvaluationReport, ClassifyError> {
    if records.is_empty() {
        return Err(ClassifyError::EmptyDataset);
    }

    let mut confusion = [[0usize; TYPE_CLASS_COUNT]; TYPE_CLASS_COUNT];
    let mut log_loss = 0.0;
    let mut degree_hits = 0usize;
    let mut config_hits = 0usize;

    for (idx, record) in records.iter().enumerate() {
        let truth = record.label_triple(idx)?;
        let p = predict(classifier, record)?;

        let actual = truth.type_label.index();
        confusion[actual][p.type_prediction.index()] += 1;
        log_loss -= p.score[actual].max(LOG_LOSS_EPS).ln();
        degree_hits += usize::from(p.degree_prediction == truth.degree);
        config_hits += usize::from(p.config_prediction == truth.config);
    }

    let n = records.len();
    let correct: usize = (0..TYPE_CLASS_COUNT).map(|k| confusion[k][k]).sum();
    let recalls: Vec<f64> = confusion
        .iter()
        .enumerate()
        .filter_map(|(k, row)| {
            let support: usize = row.iter().sum();
            (support > 0).then(|| row[k] as f64 / support as f64)
        })
        .collect();

    Ok(EvaluationReport {
        n,
        type_micro_accuracy: correct as f64 / n as f64,
        type_macro_accuracy: recalls.iter().sum::<f64>() / recalls.len().max(1) as f64,
        type_log_loss: log_loss / n as f64,
        degree_accuracy: degree_hits as f64 / n as f64,
        config_accuracy: config_hits as f64 / n as f64,
        type_confusion: confusion,
    })
}

/// k-fold cross-validation. Folds are trained and scored in parallel.
pub fn cross_validate<T: Trainer>(
    trainer: &T,
    records: &[HearingSetRecord],
    folds: usize,
    seed: u64,
) -> Result<CrossValidation, ClassifyError> {
    if records.is_empty() {
        return Err(ClassifyError::EmptyDataset);
    }
    if folds < 2 || folds > records.len() {
        return Err(ClassifyError::InvalidConfig(format!(
            "folds must be in 2..={}, got {folds}",
            records.len()
        )));
    }

    let order = shuffled_indices(records.len(), seed);
    let reports: Vec<EvaluationReport> = (0..folds)
        .into_par_iter()
        .map(|fold| -> Result<EvaluationReport, ClassifyError> {
            let (mut train, mut test) = (Vec::new(), Vec::new());
            for (pos, &i) in order.iter().enumerate() {
                if pos % folds == fold {
                    test.push(records[i].clone());
                } else {
                    train.push(records[i].clone());
                }
            }
            let model = trainer.train(&train)?;
            let report = evaluate(&model, &test)?;
            info!(
                fold,
                micro = report.type_micro_accuracy,
                macro_ = report.type_macro_accuracy,
                "fold evaluated"
            );
            Ok(report)
        })
        .collect::<Result<_, _>>()?;

    let mean = mean_report(&reports);
    Ok(CrossValidation {
        folds: reports,
        mean,
    })
}

fn mean_report(reports: &[EvaluationReport]) -> EvaluationReport {
    let k = reports.len().max(1) as f64;
    let avg = |f: fn(&EvaluationReport) -> f64| reports.iter().map(f).sum::<f64>() / k;

    let mut confusion = [[0usize; TYPE_CLASS_COUNT]; TYPE_CLASS_COUNT];
    for r in reports {
        for (a, row) in r.type_confusion.iter().enumerate() {
            for (p, count) in row.iter().enumerate() {
                confusion[a][p] += count;
            }
        }
    }

    EvaluationReport {
        n: reports.iter().map(|r| r.n).sum(),
        type_micro_accuracy: avg(|r| r.type_micro_accuracy),
        type_macro_accuracy: avg(|r| r.type_macro_accuracy),
        type_log_loss: avg(|r| r.type_log_loss),
        degree_accuracy: avg(|r| r.degree_accuracy),
        config_accuracy: avg(|r| r.config_accuracy),
        type_confusion: confusion,
    }
}

fn shuffled_indices(n: usize, seed: u64) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);
    order
}

/// Type names for the rows/columns of `type_confusion`.
pub fn confusion_labels() -> &'static [TypeLabel] {
    TypeLabel::ALL
}
