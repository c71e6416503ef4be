//! Formatted terminal output.
//!
//! Formatting lives here so the core stays free of presentation concerns and
//! output changes stay localized.

use std::time::Duration;

use serde::Serialize;

use crate::domain::{
    ConfigLabel, DegreeLabel, HearingSetPrediction, HearingSetRecord, LabelSpace, THRESHOLD_FIELDS,
    TypeLabel,
};
use crate::error::AppError;
use crate::eval::{CrossValidation, EvaluationReport, confusion_labels};
use crate::model::ClassifierArtifact;

const RULE: &str = "*******************************************";

/// One line per threshold, in schema order; missing values print as `-`.
pub fn format_record(record: &HearingSetRecord) -> String {
    let mut out = String::new();
    for f in THRESHOLD_FIELDS.iter() {
        let value = record
            .threshold_at(f.position)
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!("{:<10} {value}\n", format!("{}:", f.name)));
    }
    if let (Some(t), Some(d), Some(c)) = (record.type_label(), record.degree_label(), record.config_label()) {
        out.push_str(&format!("Labels:    {t} / {d} / {c}\n"));
    }
    out
}

/// Prediction block with the full Type score vector.
pub fn format_prediction(prediction: &HearingSetPrediction) -> String {
    let mut out = String::new();
    out.push_str(RULE);
    out.push('\n');
    out.push_str("*             Prediction Metrics\n");
    out.push_str("*------------------------------------------\n");
    out.push_str(&format!("*   Predicted Type: {}\n", prediction.type_prediction));
    out.push_str("*       Predicted Type Scores:\n");
    for label in TypeLabel::ALL {
        out.push_str(&format!(
            "*           {:<13} = {:.6}\n",
            label.as_str(),
            prediction.score_of(*label)
        ));
    }
    out.push_str(&format!("*   Predicted Degree: {}\n", prediction.degree_prediction));
    out.push_str(&format!("*   Predicted Config: {}\n", prediction.config_prediction));
    out.push_str(RULE);
    out.push('\n');
    out
}

#[derive(Serialize)]
struct PredictionLine<'a> {
    record: &'a str,
    #[serde(flatten)]
    prediction: &'a HearingSetPrediction,
}

/// One compact JSON object per prediction, for scripting.
pub fn format_prediction_json(record: &str, prediction: &HearingSetPrediction) -> Result<String, AppError> {
    serde_json::to_string(&PredictionLine { record, prediction })
        .map_err(|e| AppError::new(2, format!("Failed to encode prediction JSON: {e}")))
}

/// Metrics plus the Type confusion matrix (rows = actual, columns = predicted).
pub fn format_evaluation(report: &EvaluationReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("Evaluated records: {}\n", report.n));
    out.push_str(&format!("  Type micro accuracy:  {:.4}\n", report.type_micro_accuracy));
    out.push_str(&format!("  Type macro accuracy:  {:.4}\n", report.type_macro_accuracy));
    out.push_str(&format!("  Type log-loss:        {:.4}\n", report.type_log_loss));
    out.push_str(&format!("  Degree accuracy:      {:.4}\n", report.degree_accuracy));
    out.push_str(&format!("  Config accuracy:      {:.4}\n", report.config_accuracy));

    out.push_str("\nType confusion (rows = actual, cols = predicted):\n");
    let labels = confusion_labels();
    out.push_str(&format!("{:<14}", ""));
    for label in labels {
        out.push_str(&format!("{:>14}", label.as_str()));
    }
    out.push('\n');
    for (label, row) in labels.iter().zip(report.type_confusion.iter()) {
        out.push_str(&format!("{:<14}", label.as_str()));
        for count in row {
            out.push_str(&format!("{count:>14}"));
        }
        out.push('\n');
    }
    out
}

pub fn format_cross_validation(cv: &CrossValidation) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}-fold cross-validation\n", cv.folds.len()));
    for (k, fold) in cv.folds.iter().enumerate() {
        out.push_str(&format!(
            "  fold {:>2}: n={:<5} type micro={:.4} macro={:.4} degree={:.4} config={:.4}\n",
            k + 1,
            fold.n,
            fold.type_micro_accuracy,
            fold.type_macro_accuracy,
            fold.degree_accuracy,
            fold.config_accuracy
        ));
    }
    out.push_str("\nMean over folds:\n");
    out.push_str(&format_evaluation(&cv.mean));
    out
}

/// Short description of a trained artifact.
pub fn format_artifact_summary(artifact: &ClassifierArtifact) -> String {
    let heads = artifact.heads();
    let mut out = String::new();
    out.push_str(&format!(
        "Model: trained {} on {} records\n",
        artifact.trained_at().format("%Y-%m-%d %H:%M:%S UTC"),
        artifact.n_records()
    ));
    for (name, head) in [
        (TypeLabel::NAME, &heads.type_head),
        (DegreeLabel::NAME, &heads.degree),
        (ConfigLabel::NAME, &heads.config),
    ] {
        out.push_str(&format!(
            "  {name:<7} head: epochs={:<4} loss={:.5}{}\n",
            head.epochs,
            head.final_loss,
            if head.converged { "" } else { " (epoch limit)" }
        ));
    }
    out
}

/// Elapsed wall time as `minutes:seconds`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("Elapsed Time: {}:{:02} (Min:Sec)", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;

    #[test]
    fn record_lists_every_threshold() {
        let text = format_record(&fixtures::conductive());
        assert_eq!(text.lines().count(), 24);
        assert!(text.starts_with("AC_L_250:"));
        assert!(text.contains("BC_R_8000:"));

        let partial = HearingSetRecord::builder().build();
        assert!(format_record(&partial).lines().all(|l| l.ends_with('-')));
    }

    #[test]
    fn prediction_shows_scores_in_label_order() {
        let p = HearingSetPrediction {
            type_prediction: TypeLabel::None,
            degree_prediction: DegreeLabel::Normal,
            config_prediction: ConfigLabel::Normal,
            score: [0.1, 0.05, 0.8, 0.05],
        };
        let text = format_prediction(&p);
        let conductive = text.find("Conductive    = 0.100000").unwrap();
        let none = text.find("None          = 0.800000").unwrap();
        assert!(conductive < none);
        assert!(text.contains("Predicted Type: None"));
        assert!(text.contains("Predicted Degree: Normal"));
    }

    #[test]
    fn prediction_json_carries_labels_and_scores() {
        let p = HearingSetPrediction {
            type_prediction: TypeLabel::Mixed,
            degree_prediction: DegreeLabel::ModeratelySevere,
            config_prediction: ConfigLabel::CookieBite,
            score: [0.1, 0.6, 0.1, 0.2],
        };
        let line = format_prediction_json("mixed", &p).unwrap();
        assert!(!line.contains('\n'));

        let doc: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(doc["record"], "mixed");
        assert_eq!(doc["type_prediction"], "Mixed");
        assert_eq!(doc["degree_prediction"], "Moderately Severe");
        assert_eq!(doc["config_prediction"], "Cookie Bite");
        assert_eq!(doc["score"][1], 0.6);
    }

    #[test]
    fn evaluation_includes_confusion_matrix() {
        let mut confusion = [[0usize; 4]; 4];
        confusion[0][0] = 3;
        confusion[3][1] = 1;
        let report = EvaluationReport {
            n: 4,
            type_micro_accuracy: 0.75,
            type_macro_accuracy: 0.5,
            type_log_loss: 0.4,
            degree_accuracy: 1.0,
            config_accuracy: 0.5,
            type_confusion: confusion,
        };
        let text = format_evaluation(&report);
        assert!(text.contains("Type micro accuracy:  0.7500"));
        let row = text.lines().find(|l| l.starts_with("Sensorineural")).unwrap();
        assert_eq!(
            row.split_whitespace().skip(1).collect::<Vec<_>>(),
            ["0", "1", "0", "0"]
        );
    }

    #[test]
    fn elapsed_is_minutes_and_seconds() {
        assert_eq!(format_elapsed(Duration::from_secs(0)), "Elapsed Time: 0:00 (Min:Sec)");
        assert_eq!(format_elapsed(Duration::from_millis(125_900)), "Elapsed Time: 2:05 (Min:Sec)");
    }
}
