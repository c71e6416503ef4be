//! Feature encoding: record -> fixed-order numeric vector.
//!
//! The encoder reads thresholds strictly in `THRESHOLD_FIELDS` order and never
//! looks at labels. It does no scaling; the standardizer stored in the trained
//! artifact is applied on both the training and prediction paths.

use crate::domain::{FEATURE_COUNT, HearingSetRecord, THRESHOLD_FIELDS};
use crate::error::ClassifyError;

/// Encoded thresholds in canonical order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_array(self) -> [f64; FEATURE_COUNT] {
        self.0
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(value: [f64; FEATURE_COUNT]) -> Self {
        Self(value)
    }
}

/// Encode a record. Fails on the first missing threshold (canonical order).
pub fn encode(record: &HearingSetRecord) -> Result<FeatureVector, ClassifyError> {
    let mut out = [0.0; FEATURE_COUNT];
    for field in THRESHOLD_FIELDS.iter() {
        let value = record
            .threshold_at(field.position)
            .ok_or_else(|| ClassifyError::invalid_record(field.name, "is missing"))?;
        out[field.position] = f64::from(value);
    }
    Ok(FeatureVector(out))
}

/// Encode every record, annotating failures with the record index.
pub fn encode_all(records: &[HearingSetRecord]) -> Result<Vec<FeatureVector>, ClassifyError> {
    records
        .iter()
        .enumerate()
        .map(|(idx, r)| {
            encode(r).map_err(|e| match e {
                ClassifyError::InvalidRecord { field, reason } => ClassifyError::InvalidRecord {
                    field,
                    reason: format!("{reason} (record {idx})"),
                },
                other => other,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Audiogram, HearingSetRecord};

    fn sample() -> HearingSetRecord {
        Audiogram {
            ac_left: [10, 15, 20, 25, 30, 35],
            ac_right: [-5, 0, 5, 10, 15, 20],
            bc_left: [0, 5, 10, 15, 20, 25],
            bc_right: [-10, -5, 0, 5, 10, 15],
        }
        .to_builder()
        .labels("Sensorineural", "Mild", "Sloping")
        .build()
    }

    #[test]
    fn encode_follows_canonical_order() {
        let v = encode(&sample()).unwrap();
        let s = v.as_slice();
        assert_eq!(s.len(), FEATURE_COUNT);
        assert_eq!(s[0], 10.0);
        assert_eq!(s[6], -5.0);
        assert_eq!(s[12], 0.0);
        assert_eq!(s[23], 15.0);
    }

    #[test]
    fn encode_is_deterministic_and_ignores_labels() {
        let rec = sample();
        let a = encode(&rec).unwrap();
        let b = encode(&rec).unwrap();
        let c = encode(&rec.unlabeled()).unwrap();
        let bits = |v: &FeatureVector| v.as_slice().iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
        assert_eq!(bits(&a), bits(&c));
    }

    #[test]
    fn encode_is_independent_of_construction_order() {
        let forward = THRESHOLD_FIELDS
            .iter()
            .fold(HearingSetRecord::builder(), |b, f| b.threshold(f, f.position as i32))
            .build();
        let backward = THRESHOLD_FIELDS
            .iter()
            .rev()
            .fold(HearingSetRecord::builder(), |b, f| b.threshold(f, f.position as i32))
            .build();
        assert_eq!(encode(&forward).unwrap(), encode(&backward).unwrap());
    }

    #[test]
    fn missing_threshold_is_invalid_record() {
        let mut builder = HearingSetRecord::builder();
        for f in THRESHOLD_FIELDS.iter().filter(|f| f.name != "BC_L_2000") {
            builder = builder.threshold(f, 10);
        }
        let err = encode(&builder.build()).unwrap_err();
        assert_eq!(
            err,
            ClassifyError::InvalidRecord {
                field: "BC_L_2000".to_string(),
                reason: "is missing".to_string(),
            }
        );
    }

    #[test]
    fn encode_all_reports_record_index() {
        let records = vec![sample(), HearingSetRecord::default()];
        let err = encode_all(&records).unwrap_err();
        match err {
            ClassifyError::InvalidRecord { field, reason } => {
                assert_eq!(field, "AC_L_250");
                assert!(reason.contains("record 1"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
