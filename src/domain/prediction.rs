use serde::Serialize;

use crate::domain::labels::{ConfigLabel, DegreeLabel, LabelSpace, TypeLabel};

/// Number of Type classes (length of `HearingSetPrediction::score`).
pub const TYPE_CLASS_COUNT: usize = 4;

const _: () = assert!(<TypeLabel as LabelSpace>::ALL.len() == TYPE_CLASS_COUNT);

/// Output of one prediction call.
///
/// `score` is a probability distribution over `TypeLabel::ALL`, in that order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HearingSetPrediction {
    pub type_prediction: TypeLabel,
    pub degree_prediction: DegreeLabel,
    pub config_prediction: ConfigLabel,
    pub score: [f64; TYPE_CLASS_COUNT],
}

impl HearingSetPrediction {
    /// Score of the predicted Type class.
    pub fn confidence(&self) -> f64 {
        self.score[self.type_prediction.index()]
    }

    pub fn score_of(&self, label: TypeLabel) -> f64 {
        self.score[label.index()]
    }
}
