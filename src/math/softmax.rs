//! Softmax and arg-max helpers.
//!
//! Scores are shifted by their maximum before exponentiation so large logits do
//! not overflow.

use nalgebra::DVector;

/// Numerically stable softmax.
pub fn softmax(logits: &DVector<f64>) -> DVector<f64> {
    if logits.is_empty() {
        return logits.clone();
    }
    let max = logits.max();
    let exp = logits.map(|z| (z - max).exp());
    let sum = exp.sum();
    exp / sum
}

/// Index of the largest value; ties resolve to the lowest index.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &v) in values.iter().enumerate() {
        if !v.is_finite() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((idx, v)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// `ln(Σ exp(z_i))` computed without overflow.
pub fn log_sum_exp(logits: &[f64]) -> f64 {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    max + logits.iter().map(|z| (z - max).exp()).sum::<f64>().ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn softmax_is_a_distribution() {
        let p = softmax(&DVector::from_row_slice(&[1.0, 2.0, 3.0, 4.0]));
        assert!((p.sum() - 1.0).abs() < 1e-12);
        assert!(p.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(p[3] > p[2] && p[2] > p[1]);
    }

    #[test]
    fn softmax_survives_huge_logits() {
        let p = softmax(&DVector::from_row_slice(&[1000.0, 999.0, -1000.0]));
        assert!(p.iter().all(|v| v.is_finite()));
        assert!((p.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn argmax_prefers_first_on_ties() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), Some(1));
        assert_eq!(argmax(&[f64::NAN, 0.1]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn log_sum_exp_matches_naive_form() {
        let z = [0.5, -1.0, 2.0];
        let naive = z.iter().map(|v: &f64| v.exp()).sum::<f64>().ln();
        assert!((log_sum_exp(&z) - naive).abs() < 1e-12);
    }
}
