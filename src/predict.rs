//! Prediction: one record in, one `HearingSetPrediction` out.
//!
//! The classifier is passed explicitly and only borrowed, so any number of
//! artifacts can coexist and any number of threads can predict against the
//! same one.

use rayon::prelude::*;

use crate::domain::{HearingSetPrediction, HearingSetRecord, LabelSpace, TypeLabel};
use crate::error::ClassifyError;
use crate::features::encode;
use crate::math::argmax;
use crate::model::Classifier;

/// Classify one record. Labels on the record, if any, are ignored.
pub fn predict<C: Classifier + ?Sized>(
    classifier: &C,
    record: &HearingSetRecord,
) -> Result<HearingSetPrediction, ClassifyError> {
    classifier.ensure_trained()?;
    let features = encode(record)?;

    let score = classifier.predict_type(&features)?;
    let type_prediction = argmax(&score)
        .and_then(TypeLabel::from_index)
        .ok_or_else(|| ClassifyError::UntrainedArtifact {
            reason: "Type head produced no finite score".to_string(),
        })?;

    Ok(HearingSetPrediction {
        type_prediction,
        degree_prediction: classifier.predict_degree(&features)?,
        config_prediction: classifier.predict_config(&features)?,
        score,
    })
}

/// Classify many records in parallel; output order matches input order.
pub fn predict_batch<C: Classifier + ?Sized>(
    classifier: &C,
    records: &[HearingSetRecord],
) -> Vec<Result<HearingSetPrediction, ClassifyError>> {
    records
        .par_iter()
        .map(|record| predict(classifier, record))
        .collect()
}
