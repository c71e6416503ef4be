//! Per-feature standardization fitted on the training set.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;

/// Standard deviations below this are treated as constant features.
const MIN_SCALE: f64 = 1e-9;

/// `(x - mean) / scale`, with `scale` the population standard deviation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standardizer {
    pub mean: DVector<f64>,
    pub scale: DVector<f64>,
}

impl Standardizer {
    /// Fit on a non-empty set of vectors. Constant features get scale 1.
    pub fn fit(features: &[FeatureVector]) -> Self {
        let d = features.first().map(|f| f.as_slice().len()).unwrap_or(0);
        let n = features.len().max(1) as f64;

        let mut mean = DVector::<f64>::zeros(d);
        for f in features {
            mean += DVector::from_column_slice(f.as_slice());
        }
        mean /= n;

        let mut var = DVector::<f64>::zeros(d);
        for f in features {
            let diff = DVector::from_column_slice(f.as_slice()) - &mean;
            var += diff.component_mul(&diff);
        }
        var /= n;

        let scale = var.map(|v| {
            let s = v.sqrt();
            if s.is_finite() && s > MIN_SCALE { s } else { 1.0 }
        });

        Self { mean, scale }
    }

    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, features: &FeatureVector) -> DVector<f64> {
        let x = DVector::from_column_slice(features.as_slice());
        (x - &self.mean).component_div(&self.scale)
    }

    /// Row-per-record design matrix (n × d).
    pub fn transform_all(&self, features: &[FeatureVector]) -> DMatrix<f64> {
        let d = self.dim();
        let mut out = DMatrix::<f64>::zeros(features.len(), d);
        for (i, f) in features.iter().enumerate() {
            let z = self.transform(f);
            out.row_mut(i).copy_from(&z.transpose());
        }
        out
    }

    /// True when every entry is finite and every scale is positive.
    pub fn is_well_formed(&self, expected_dim: usize) -> bool {
        self.mean.len() == expected_dim
            && self.scale.len() == expected_dim
            && self.mean.iter().all(|v| v.is_finite())
            && self.scale.iter().all(|v| v.is_finite() && *v > 0.0)
    }
}
