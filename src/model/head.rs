//! Multinomial logistic regression head.
//!
//! Given standardized features `x_i` (rows of `X`) and class targets `y_i` we
//! minimize
//!
//! ```text
//! L(W, b) = -1/n Σ log softmax(W x_i + b)[y_i] + l2/2 ||W||²
//! ```
//!
//! with full-batch gradient descent plus heavy-ball momentum. The step size is
//! `learning_rate / L` where `L = 0.5 * (mean ||x||² + 1) + l2` bounds the
//! Lipschitz constant of the gradient, so the default `learning_rate = 1`
//! needs no tuning per dataset. Weights start at zero, so fitting is fully
//! deterministic.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::TrainConfig;
use crate::error::ClassifyError;
use crate::math::{log_sum_exp, softmax};

/// A fitted softmax classifier over one label space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftmaxHead {
    /// `classes × features`.
    pub weights: DMatrix<f64>,
    /// One bias per class.
    pub bias: DVector<f64>,
    pub epochs: usize,
    pub final_loss: f64,
    pub converged: bool,
}

impl SoftmaxHead {
    /// Class probabilities for one standardized feature vector.
    pub fn probabilities(&self, x: &DVector<f64>) -> DVector<f64> {
        softmax(&(&self.weights * x + &self.bias))
    }

    /// Shape and finiteness check against the expected label space.
    pub fn check(&self, classes: usize, features: usize) -> Result<(), String> {
        if self.weights.nrows() != classes || self.weights.ncols() != features {
            return Err(format!(
                "weights are {}x{}, expected {classes}x{features}",
                self.weights.nrows(),
                self.weights.ncols()
            ));
        }
        if self.bias.len() != classes {
            return Err(format!("bias has {} entries, expected {classes}", self.bias.len()));
        }
        if !self.weights.iter().chain(self.bias.iter()).all(|v| v.is_finite()) {
            return Err("parameters contain non-finite values".to_string());
        }
        Ok(())
    }
}

/// Fit one head.
///
/// `x` is `n × d` (already standardized), `targets[i]` is the class index of
/// row `i` and must be `< classes`.
pub fn fit_head(
    name: &'static str,
    x: &DMatrix<f64>,
    targets: &[usize],
    classes: usize,
    config: &TrainConfig,
) -> Result<SoftmaxHead, ClassifyError> {
    let n = x.nrows();
    let d = x.ncols();
    debug_assert_eq!(targets.len(), n);

    let mean_sq = if n == 0 { 0.0 } else { x.norm_squared() / n as f64 };
    let lipschitz = 0.5 * (mean_sq + 1.0) + config.l2;
    let step = config.learning_rate / lipschitz;

    let mut w = DMatrix::<f64>::zeros(classes, d);
    let mut b = DVector::<f64>::zeros(classes);
    let mut vw = DMatrix::<f64>::zeros(classes, d);
    let mut vb = DVector::<f64>::zeros(classes);

    let mut initial_loss: Option<f64> = None;
    let mut prev_loss = f64::INFINITY;
    let mut epochs = 0usize;
    let mut converged = false;

    for epoch in 0..config.max_epochs {
        let (mut grad, loss) = forward(x, targets, &w, &b, config.l2);
        if !loss.is_finite() {
            return Err(ClassifyError::TrainingDivergence {
                head: name,
                epoch,
                loss,
            });
        }
        let initial = *initial_loss.get_or_insert(loss);

        if (prev_loss - loss).abs() < config.tolerance {
            converged = true;
            break;
        }
        prev_loss = loss;

        if epoch % 100 == 0 {
            debug!(head = name, epoch, loss, initial, "softmax head progress");
        }

        // dL/dz = (P - Y) / n
        for (i, &t) in targets.iter().enumerate() {
            grad[(i, t)] -= 1.0;
        }
        grad /= n.max(1) as f64;

        let gw = grad.transpose() * x + &w * config.l2;
        let gb = grad.row_sum().transpose();

        vw = vw * config.momentum - gw * step;
        vb = vb * config.momentum - gb * step;
        w += &vw;
        b += &vb;
        epochs = epoch + 1;

        if !w.iter().chain(b.iter()).all(|v| v.is_finite()) {
            return Err(ClassifyError::TrainingDivergence {
                head: name,
                epoch,
                loss: f64::NAN,
            });
        }
    }

    let (_, final_loss) = forward(x, targets, &w, &b, config.l2);
    let initial = initial_loss.unwrap_or(final_loss);
    if !final_loss.is_finite() || final_loss > initial + 1e-12 {
        return Err(ClassifyError::TrainingDivergence {
            head: name,
            epoch: epochs,
            loss: final_loss,
        });
    }

    info!(
        head = name,
        epochs,
        converged,
        initial_loss = initial,
        final_loss,
        "fitted softmax head"
    );

    Ok(SoftmaxHead {
        weights: w,
        bias: b,
        epochs,
        final_loss,
        converged,
    })
}

/// Row-wise class probabilities and the regularized loss.
fn forward(
    x: &DMatrix<f64>,
    targets: &[usize],
    w: &DMatrix<f64>,
    b: &DVector<f64>,
    l2: f64,
) -> (DMatrix<f64>, f64) {
    let n = x.nrows();
    let k = w.nrows();
    let mut probs = x * w.transpose();
    let mut row = vec![0.0; k];
    let mut nll = 0.0;

    for i in 0..n {
        for j in 0..k {
            row[j] = probs[(i, j)] + b[j];
        }
        let lse = log_sum_exp(&row);
        for j in 0..k {
            probs[(i, j)] = (row[j] - lse).exp();
        }
        nll += lse - row[targets[i]];
    }

    let penalty = 0.5 * l2 * w.norm_squared();
    (probs, nll / n.max(1) as f64 + penalty)
}
