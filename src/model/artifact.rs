//! The trained classifier artifact.
//!
//! An artifact bundles the standardizer, one softmax head per label space and
//! the class orderings the heads were trained with. It is immutable after
//! construction and is shared by reference (or `Arc`) between predictions.
//!
//! The JSON form is the persistence format. Loading checks the recorded schema
//! (format version, feature names, class orderings) against the compiled-in
//! one; head shapes are checked lazily on use, which is where an incomplete
//! artifact surfaces as `UntrainedArtifact`.

use std::io::{Read, Write};

use chrono::{DateTime, Utc};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::domain::{
    ConfigLabel, DegreeLabel, FEATURE_COUNT, LabelSpace, TYPE_CLASS_COUNT, TypeLabel, feature_names,
};
use crate::error::ClassifyError;
use crate::features::FeatureVector;
use crate::math::{Standardizer, argmax};
use crate::model::head::SoftmaxHead;
use crate::model::Classifier;

/// Bumped whenever the JSON layout changes incompatibly.
pub const FORMAT_VERSION: u32 = 1;

const TOOL: &str = "audiogram";

/// The three fitted heads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadBundle {
    #[serde(rename = "type")]
    pub type_head: SoftmaxHead,
    pub degree: SoftmaxHead,
    pub config: SoftmaxHead,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierArtifact {
    format_version: u32,
    tool: String,
    trained_at: DateTime<Utc>,
    n_records: usize,
    feature_names: Vec<String>,
    type_classes: Vec<String>,
    degree_classes: Vec<String>,
    config_classes: Vec<String>,
    standardizer: Standardizer,
    heads: HeadBundle,
}

impl ClassifierArtifact {
    pub(crate) fn new(standardizer: Standardizer, heads: HeadBundle, n_records: usize) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            tool: TOOL.to_string(),
            trained_at: Utc::now(),
            n_records,
            feature_names: feature_names(),
            type_classes: TypeLabel::names(),
            degree_classes: DegreeLabel::names(),
            config_classes: ConfigLabel::names(),
            standardizer,
            heads,
        }
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    /// Number of records the artifact was trained on.
    pub fn n_records(&self) -> usize {
        self.n_records
    }

    pub fn heads(&self) -> &HeadBundle {
        &self.heads
    }

    pub fn standardizer(&self) -> &Standardizer {
        &self.standardizer
    }

    pub fn to_json(&self) -> Result<String, ClassifyError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ClassifyError::ArtifactFormat(format!("failed to encode: {e}")))
    }

    pub fn from_json(json: &str) -> Result<Self, ClassifyError> {
        let artifact: Self = serde_json::from_str(json)
            .map_err(|e| ClassifyError::ArtifactFormat(e.to_string()))?;
        artifact.check_schema()?;
        Ok(artifact)
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), ClassifyError> {
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| ClassifyError::ArtifactFormat(format!("failed to encode: {e}")))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ClassifyError> {
        let artifact: Self = serde_json::from_reader(reader)
            .map_err(|e| ClassifyError::ArtifactFormat(e.to_string()))?;
        artifact.check_schema()?;
        Ok(artifact)
    }

    /// Compare the recorded schema and class orderings with the compiled-in ones.
    fn check_schema(&self) -> Result<(), ClassifyError> {
        if self.format_version != FORMAT_VERSION {
            return Err(ClassifyError::ArtifactFormat(format!(
                "unsupported format_version {} (expected {FORMAT_VERSION})",
                self.format_version
            )));
        }
        if self.feature_names != feature_names() {
            return Err(ClassifyError::ArtifactFormat(
                "feature order differs from the threshold schema".to_string(),
            ));
        }
        check_classes::<TypeLabel>(&self.type_classes)?;
        check_classes::<DegreeLabel>(&self.degree_classes)?;
        check_classes::<ConfigLabel>(&self.config_classes)?;
        Ok(())
    }

    /// The standardizer is validated once by `ensure_trained`; the head shape
    /// is checked here because `predict_type` copies into a fixed array.
    fn head_probabilities<L: LabelSpace>(
        &self,
        head: &SoftmaxHead,
        features: &FeatureVector,
    ) -> Result<DVector<f64>, ClassifyError> {
        head.check(L::count(), FEATURE_COUNT)
            .map_err(|e| ClassifyError::untrained(format!("{} head: {e}", L::NAME)))?;
        Ok(head.probabilities(&self.standardizer.transform(features)))
    }

    fn head_label<L: LabelSpace>(
        &self,
        head: &SoftmaxHead,
        features: &FeatureVector,
    ) -> Result<L, ClassifyError> {
        let p = self.head_probabilities::<L>(head, features)?;
        argmax(p.as_slice())
            .and_then(L::from_index)
            .ok_or_else(|| ClassifyError::untrained(format!("{} head produced no finite score", L::NAME)))
    }
}

fn check_classes<L: LabelSpace>(recorded: &[String]) -> Result<(), ClassifyError> {
    if recorded != L::names().as_slice() {
        return Err(ClassifyError::ArtifactFormat(format!(
            "{} classes {:?} do not match the expected order {:?}",
            L::NAME,
            recorded,
            L::names()
        )));
    }
    Ok(())
}

impl Classifier for ClassifierArtifact {
    fn ensure_trained(&self) -> Result<(), ClassifyError> {
        if !self.standardizer.is_well_formed(FEATURE_COUNT) {
            return Err(ClassifyError::untrained(format!(
                "standardizer does not cover {FEATURE_COUNT} features"
            )));
        }
        let checks = [
            (TypeLabel::NAME, &self.heads.type_head, TypeLabel::count()),
            (DegreeLabel::NAME, &self.heads.degree, DegreeLabel::count()),
            (ConfigLabel::NAME, &self.heads.config, ConfigLabel::count()),
        ];
        for (name, head, classes) in checks {
            head.check(classes, FEATURE_COUNT)
                .map_err(|e| ClassifyError::untrained(format!("{name} head: {e}")))?;
        }
        Ok(())
    }

    fn predict_type(&self, features: &FeatureVector) -> Result<[f64; TYPE_CLASS_COUNT], ClassifyError> {
        let p = self.head_probabilities::<TypeLabel>(&self.heads.type_head, features)?;
        let mut score = [0.0; TYPE_CLASS_COUNT];
        score.copy_from_slice(p.as_slice());
        Ok(score)
    }

    fn predict_degree(&self, features: &FeatureVector) -> Result<DegreeLabel, ClassifyError> {
        self.head_label::<DegreeLabel>(&self.heads.degree, features)
    }

    fn predict_config(&self, features: &FeatureVector) -> Result<ConfigLabel, ClassifyError> {
        self.head_label::<ConfigLabel>(&self.heads.config, features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;
    use crate::features::encode;
    use crate::predict::predict;
    use crate::train::test_support::trained_artifact;

    fn edited(edit: impl FnOnce(&mut serde_json::Value)) -> Result<ClassifierArtifact, ClassifyError> {
        let mut doc: serde_json::Value =
            serde_json::from_str(&trained_artifact().to_json().unwrap()).unwrap();
        edit(&mut doc);
        ClassifierArtifact::from_json(&doc.to_string())
    }

    #[test]
    fn short_standardizer_is_stopped_by_ensure_trained() {
        let broken = edited(|doc| {
            doc["standardizer"]["mean"] = doc["heads"]["type"]["bias"].clone();
        })
        .unwrap();

        let err = broken.ensure_trained().unwrap_err();
        assert!(matches!(err, ClassifyError::UntrainedArtifact { ref reason } if reason.contains("standardizer")));
        assert_eq!(predict(&broken, &fixtures::none()).unwrap_err(), err);
    }

    #[test]
    fn head_outputs_match_their_label_spaces() {
        let artifact = trained_artifact();
        let features = encode(&fixtures::mixed()).unwrap();
        let score = artifact.predict_type(&features).unwrap();
        assert!((score.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(artifact.predict_degree(&features).is_ok());
        assert!(artifact.predict_config(&features).is_ok());
    }

    #[test]
    fn reordered_classes_are_rejected_on_load() {
        let err = edited(|doc| {
            doc["type_classes"] = serde_json::json!(["Mixed", "Conductive", "None", "Sensorineural"]);
        })
        .unwrap_err();
        assert!(matches!(err, ClassifyError::ArtifactFormat(_)), "{err:?}");

        let err = edited(|doc| doc["format_version"] = serde_json::json!(FORMAT_VERSION + 1)).unwrap_err();
        assert!(matches!(err, ClassifyError::ArtifactFormat(_)), "{err:?}");
    }
}
