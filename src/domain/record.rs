//! Hearing-set records: the input entity of the pipeline.

use crate::domain::labels::{ConfigLabel, DegreeLabel, LabelSpace, LabelTriple, TypeLabel};
use crate::domain::schema::{
    FEATURE_COUNT, FieldSpec, Frequency, THRESHOLD_FIELDS, Threshold, field_by_name,
};
use crate::error::ClassifyError;

/// One audiometric test: 24 thresholds plus optional ground truth.
///
/// Records are immutable once built. Thresholds that were never supplied stay
/// `None` and are reported by the encoder rather than defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HearingSetRecord {
    thresholds: [Option<Threshold>; FEATURE_COUNT],
    type_label: Option<String>,
    degree: Option<String>,
    config: Option<String>,
}

impl HearingSetRecord {
    pub fn builder() -> RecordBuilder {
        RecordBuilder::default()
    }

    /// Threshold at a canonical feature position.
    pub fn threshold_at(&self, position: usize) -> Option<Threshold> {
        self.thresholds.get(position).copied().flatten()
    }

    /// Threshold by column name (e.g. `"BC_R_1000"`).
    pub fn threshold(&self, name: &str) -> Option<Threshold> {
        field_by_name(name).and_then(|f| self.threshold_at(f.position))
    }

    pub fn thresholds(&self) -> &[Option<Threshold>; FEATURE_COUNT] {
        &self.thresholds
    }

    /// Schema fields that have no value.
    pub fn missing_fields(&self) -> impl Iterator<Item = &'static FieldSpec> + '_ {
        THRESHOLD_FIELDS
            .iter()
            .filter(|f| self.thresholds[f.position].is_none())
    }

    pub fn type_label(&self) -> Option<&str> {
        self.type_label.as_deref()
    }

    pub fn degree_label(&self) -> Option<&str> {
        self.degree.as_deref()
    }

    pub fn config_label(&self) -> Option<&str> {
        self.config.as_deref()
    }

    pub fn has_labels(&self) -> bool {
        self.type_label.is_some() || self.degree.is_some() || self.config.is_some()
    }

    /// Copy of this record with the ground truth removed.
    pub fn unlabeled(&self) -> Self {
        Self {
            thresholds: self.thresholds,
            ..Self::default()
        }
    }

    /// Resolve the ground-truth triple against the closed label spaces.
    ///
    /// `record` is the dataset index used in the error. An absent label is
    /// reported as an empty value.
    pub fn label_triple(&self, record: usize) -> Result<LabelTriple, ClassifyError> {
        Ok(LabelTriple {
            type_label: resolve_label::<TypeLabel>(self.type_label.as_deref(), record)?,
            degree: resolve_label::<DegreeLabel>(self.degree.as_deref(), record)?,
            config: resolve_label::<ConfigLabel>(self.config.as_deref(), record)?,
        })
    }
}

fn resolve_label<L: LabelSpace>(raw: Option<&str>, record: usize) -> Result<L, ClassifyError> {
    let value = raw.unwrap_or_default();
    L::parse_label(value).ok_or_else(|| ClassifyError::UnknownLabelClass {
        space: L::NAME,
        value: value.to_string(),
        record,
    })
}

/// Incremental construction of a `HearingSetRecord`.
#[derive(Debug, Clone, Default)]
pub struct RecordBuilder {
    record: HearingSetRecord,
}

impl RecordBuilder {
    /// Set a threshold through its schema entry.
    pub fn threshold(mut self, field: &FieldSpec, db: Threshold) -> Self {
        self.record.thresholds[field.position] = Some(db);
        self
    }

    /// Set a threshold by column name.
    pub fn set_named(mut self, name: &str, db: Threshold) -> Result<Self, ClassifyError> {
        let field = field_by_name(name)
            .ok_or_else(|| ClassifyError::invalid_record(name.trim(), "is not a threshold column"))?;
        self.record.thresholds[field.position] = Some(db);
        Ok(self)
    }

    /// Set a threshold from text; non-integer values are rejected.
    pub fn parse_named(self, name: &str, raw: &str) -> Result<Self, ClassifyError> {
        let db = parse_threshold(name, raw)?;
        self.set_named(name, db)
    }

    pub fn labels(
        mut self,
        type_label: impl Into<String>,
        degree: impl Into<String>,
        config: impl Into<String>,
    ) -> Self {
        self.record.type_label = Some(type_label.into());
        self.record.degree = Some(degree.into());
        self.record.config = Some(config.into());
        self
    }

    /// Attach ground truth from resolved labels.
    pub fn label_triple(self, labels: LabelTriple) -> Self {
        self.labels(
            labels.type_label.as_str(),
            labels.degree.as_str(),
            labels.config.as_str(),
        )
    }

    pub fn build(self) -> HearingSetRecord {
        self.record
    }
}

/// Parse one threshold cell.
///
/// Integers are accepted directly; a float with no fractional part (`"15.0"`)
/// is accepted too, since spreadsheet exports commonly write them that way.
pub fn parse_threshold(name: &str, raw: &str) -> Result<Threshold, ClassifyError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(ClassifyError::invalid_record(name.trim(), "is empty"));
    }
    if let Ok(v) = s.parse::<Threshold>() {
        return Ok(v);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() <= Threshold::MAX as f64 => {
            Ok(v as Threshold)
        }
        _ => Err(ClassifyError::invalid_record(
            name.trim(),
            format!("is not an integer ('{s}')"),
        )),
    }
}

/// Per-ear air/bone thresholds, ordered by `Frequency::ALL`.
///
/// Convenience form for fixtures and generated data; converts into a complete
/// record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Audiogram {
    pub ac_left: [Threshold; 6],
    pub ac_right: [Threshold; 6],
    pub bc_left: [Threshold; 6],
    pub bc_right: [Threshold; 6],
}

impl Audiogram {
    /// Same thresholds for both ears.
    pub fn symmetric(ac: [Threshold; 6], bc: [Threshold; 6]) -> Self {
        Self {
            ac_left: ac,
            ac_right: ac,
            bc_left: bc,
            bc_right: bc,
        }
    }

    /// Every air and bone threshold set to `db`.
    pub fn uniform(db: Threshold) -> Self {
        Self::symmetric([db; 6], [db; 6])
    }

    fn values(&self) -> [Threshold; FEATURE_COUNT] {
        let mut out = [0; FEATURE_COUNT];
        let blocks = [self.ac_left, self.ac_right, self.bc_left, self.bc_right];
        for (b, block) in blocks.iter().enumerate() {
            out[b * Frequency::ALL.len()..(b + 1) * Frequency::ALL.len()].copy_from_slice(block);
        }
        out
    }

    pub fn to_builder(&self) -> RecordBuilder {
        self.values()
            .iter()
            .zip(THRESHOLD_FIELDS.iter())
            .fold(HearingSetRecord::builder(), |b, (v, f)| b.threshold(f, *v))
    }

    pub fn to_record(&self) -> HearingSetRecord {
        self.to_builder().build()
    }
}

impl From<Audiogram> for HearingSetRecord {
    fn from(value: Audiogram) -> Self {
        value.to_record()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{Ear, Modality, position_of};

    #[test]
    fn audiogram_fills_canonical_positions() {
        let gram = Audiogram {
            ac_left: [1, 2, 3, 4, 5, 6],
            ac_right: [7, 8, 9, 10, 11, 12],
            bc_left: [13, 14, 15, 16, 17, 18],
            bc_right: [19, 20, 21, 22, 23, 24],
        };
        let rec = gram.to_record();
        assert_eq!(rec.threshold("AC_L_250"), Some(1));
        assert_eq!(rec.threshold("AC_R_8000"), Some(12));
        assert_eq!(rec.threshold("BC_L_1000"), Some(15));
        assert_eq!(
            rec.threshold_at(position_of(Modality::Bc, Ear::Right, Frequency::F8000)),
            Some(24)
        );
        assert_eq!(rec.missing_fields().count(), 0);
        assert!(!rec.has_labels());
    }

    #[test]
    fn builder_rejects_unknown_and_non_numeric_fields() {
        let err = HearingSetRecord::builder().set_named("AC_X_250", 10).unwrap_err();
        assert!(matches!(err, ClassifyError::InvalidRecord { ref field, .. } if field == "AC_X_250"));

        let err = HearingSetRecord::builder()
            .parse_named("AC_L_250", "ten")
            .unwrap_err();
        assert!(matches!(err, ClassifyError::InvalidRecord { .. }));

        let err = HearingSetRecord::builder()
            .parse_named("AC_L_250", "12.5")
            .unwrap_err();
        assert!(matches!(err, ClassifyError::InvalidRecord { .. }));
    }

    #[test]
    fn parse_threshold_accepts_negative_and_whole_floats() {
        assert_eq!(parse_threshold("BC_L_500", "-10"), Ok(-10));
        assert_eq!(parse_threshold("BC_L_500", " 35.0 "), Ok(35));
        assert!(parse_threshold("BC_L_500", "").is_err());
    }

    #[test]
    fn label_triple_reports_unknown_and_missing_labels() {
        let rec = Audiogram::uniform(0)
            .to_builder()
            .labels("None", "Normal", "Normal")
            .build();
        let triple = rec.label_triple(0).unwrap();
        assert_eq!(triple.type_label, TypeLabel::None);

        let rec = Audiogram::uniform(0)
            .to_builder()
            .labels("None", "Catastrophic", "Normal")
            .build();
        assert_eq!(
            rec.label_triple(7),
            Err(ClassifyError::UnknownLabelClass {
                space: "Degree",
                value: "Catastrophic".to_string(),
                record: 7,
            })
        );

        let rec = Audiogram::uniform(0).to_record();
        assert!(matches!(
            rec.label_triple(1),
            Err(ClassifyError::UnknownLabelClass { space: "Type", .. })
        ));
    }

    #[test]
    fn unlabeled_drops_ground_truth_only() {
        let rec = Audiogram::uniform(20)
            .to_builder()
            .labels("Sensorineural", "Mild", "Flat")
            .build();
        let bare = rec.unlabeled();
        assert!(!bare.has_labels());
        assert_eq!(bare.thresholds(), rec.thresholds());
    }
}
