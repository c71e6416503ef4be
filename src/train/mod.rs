//! Model training.
//!
//! Responsibilities:
//!
//! - validate the dataset (non-empty, labels inside their spaces, complete records)
//! - encode and standardize features
//! - fit the Type / Degree / Config heads (in parallel)
//! - package everything into one immutable `ClassifierArtifact`
//!
//! Any failure aborts the run; no partially trained artifact is returned.

use rayon::join;
use tracing::info;

use crate::domain::{
    ConfigLabel, DegreeLabel, HearingSetRecord, LabelSpace, LabelTriple, TrainConfig, TypeLabel,
};
use crate::error::ClassifyError;
use crate::features::encode_all;
use crate::math::Standardizer;
use crate::model::{Classifier, ClassifierArtifact, HeadBundle, fit_head};

/// A learning backend: labeled records in, trained classifier out.
pub trait Trainer: Sync {
    type Output: Classifier;

    fn train(&self, records: &[HearingSetRecord]) -> Result<Self::Output, ClassifyError>;
}

/// Softmax-regression backend.
#[derive(Debug, Clone, Default)]
pub struct SoftmaxTrainer {
    pub config: TrainConfig,
}

impl SoftmaxTrainer {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }
}

impl Trainer for SoftmaxTrainer {
    type Output = ClassifierArtifact;

    fn train(&self, records: &[HearingSetRecord]) -> Result<ClassifierArtifact, ClassifyError> {
        train(records, &self.config)
    }
}

/// Train an artifact from labeled records.
pub fn train(
    records: &[HearingSetRecord],
    config: &TrainConfig,
) -> Result<ClassifierArtifact, ClassifyError> {
    if records.is_empty() {
        return Err(ClassifyError::EmptyDataset);
    }
    config.validate()?;

    let labels: Vec<LabelTriple> = records
        .iter()
        .enumerate()
        .map(|(idx, r)| r.label_triple(idx))
        .collect::<Result<_, _>>()?;
    let features = encode_all(records)?;

    let standardizer = Standardizer::fit(&features);
    let x = standardizer.transform_all(&features);

    let type_targets: Vec<usize> = labels.iter().map(|l| l.type_label.index()).collect();
    let degree_targets: Vec<usize> = labels.iter().map(|l| l.degree.index()).collect();
    let config_targets: Vec<usize> = labels.iter().map(|l| l.config.index()).collect();

    info!(
        records = records.len(),
        features = x.ncols(),
        "training type/degree/config heads"
    );

    // The heads share nothing but the (read-only) design matrix.
    let (type_head, (degree_head, config_head)) = join(
        || fit_head(TypeLabel::NAME, &x, &type_targets, TypeLabel::count(), config),
        || {
            join(
                || fit_head(DegreeLabel::NAME, &x, &degree_targets, DegreeLabel::count(), config),
                || fit_head(ConfigLabel::NAME, &x, &config_targets, ConfigLabel::count(), config),
            )
        },
    );

    let heads = HeadBundle {
        type_head: type_head?,
        degree: degree_head?,
        config: config_head?,
    };

    Ok(ClassifierArtifact::new(standardizer, heads, records.len()))
}


#[cfg(test)]
mod tests {
    use super::test_support::{trained_artifact, training_set};
    use super::*;
    use crate::domain::{Audiogram, THRESHOLD_FIELDS};
    use crate::predict::predict;

    #[test]
    fn empty_dataset_is_rejected() {
        assert_eq!(
            train(&[], &TrainConfig::default()).unwrap_err(),
            ClassifyError::EmptyDataset
        );
    }

    #[test]
    fn unknown_label_is_rejected() {
        let mut records = training_set()[..8].to_vec();
        records.push(
            Audiogram::uniform(30)
                .to_builder()
                .labels("Sensorineural", "Mild", "Zigzag")
                .build(),
        );
        let err = train(&records, &TrainConfig::default()).unwrap_err();
        assert_eq!(
            err,
            ClassifyError::UnknownLabelClass {
                space: "Config",
                value: "Zigzag".to_string(),
                record: 8,
            }
        );
    }

    #[test]
    fn unlabeled_record_is_rejected() {
        let records = vec![Audiogram::uniform(0).to_record()];
        assert!(matches!(
            train(&records, &TrainConfig::default()),
            Err(ClassifyError::UnknownLabelClass { space: "Type", record: 0, .. })
        ));
    }

    #[test]
    fn incomplete_record_is_rejected() {
        let mut builder = HearingSetRecord::builder().labels("None", "Normal", "Normal");
        for f in THRESHOLD_FIELDS.iter().skip(1) {
            builder = builder.threshold(f, 0);
        }
        let err = train(&[builder.build()], &TrainConfig::default()).unwrap_err();
        assert!(matches!(err, ClassifyError::InvalidRecord { ref field, .. } if field == "AC_L_250"));
    }

    #[test]
    fn invalid_config_is_rejected_before_fitting() {
        let config = TrainConfig {
            learning_rate: -1.0,
            ..TrainConfig::default()
        };
        assert!(matches!(
            train(training_set(), &config),
            Err(ClassifyError::InvalidConfig(_))
        ));
    }

    #[test]
    fn single_record_trains() {
        let records = training_set()[..1].to_vec();
        let artifact = train(&records, &TrainConfig::default()).unwrap();
        assert!(artifact.ensure_trained().is_ok());
        assert_eq!(artifact.n_records(), 1);
    }

    #[test]
    fn artifact_covers_all_heads() {
        let artifact = trained_artifact();
        assert!(artifact.ensure_trained().is_ok());
        assert_eq!(artifact.n_records(), training_set().len());
        assert!(artifact.heads().type_head.final_loss < (4.0f64).ln());
    }

    #[test]
    fn retraining_reproduces_predictions() {
        let again = train(training_set(), &TrainConfig::default()).unwrap();
        assert_eq!(again.heads(), trained_artifact().heads());
        for (_, record) in crate::data::fixtures::all() {
            assert_eq!(
                predict(&again, &record).unwrap(),
                predict(trained_artifact(), &record).unwrap()
            );
        }
    }

    #[test]
    fn trainer_trait_matches_free_function() {
        let records = training_set()[..40].to_vec();
        let via_trait = SoftmaxTrainer::default().train(&records).unwrap();
        let direct = train(&records, &TrainConfig::default()).unwrap();
        assert_eq!(via_trait.heads(), direct.heads());
    }
}
