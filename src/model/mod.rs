//! Trained classifiers.
//!
//! `Classifier` is the seam between a learning backend and the predictor: one
//! object answering all three label spaces from an encoded feature vector.
//! `ClassifierArtifact` is the softmax-regression implementation.

pub mod artifact;
pub mod head;

pub use artifact::*;
pub use head::*;

use crate::domain::{ConfigLabel, DegreeLabel, TYPE_CLASS_COUNT};
use crate::error::ClassifyError;
use crate::features::FeatureVector;

/// A trained, read-only classifier.
///
/// Implementations must be safe to share between threads and must not mutate
/// themselves while predicting. `ensure_trained` is the gate: the `predict_*`
/// methods may assume it has succeeded.
pub trait Classifier: Send + Sync {
    /// Fails with `UntrainedArtifact` unless every head is usable.
    fn ensure_trained(&self) -> Result<(), ClassifyError>;

    /// Type probabilities in `TypeLabel::ALL` order.
    fn predict_type(&self, features: &FeatureVector) -> Result<[f64; TYPE_CLASS_COUNT], ClassifyError>;

    fn predict_degree(&self, features: &FeatureVector) -> Result<DegreeLabel, ClassifyError>;

    fn predict_config(&self, features: &FeatureVector) -> Result<ConfigLabel, ClassifyError>;
}
