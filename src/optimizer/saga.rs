//! SAGA: stochastic average gradient with unbiased updates.
//!
//! Minimizes the mean loss plus `alpha / 2 * ‖w‖²` (intercept unpenalized).
//! The solver keeps the last margin-gradient seen for every sample and the
//! running sum of `g_i * x_i`, so each step corrects a single-sample gradient
//! with the average of the remembered ones.

use crate::loss::Loss;
use crate::model::LogisticParams;
use ndarray::{Array1, Array2, ArrayView1};

/// Step size for SAGA on a smooth loss.
///
/// `L = 0.25 * (max_i ‖x_i‖² + 1) + alpha` bounds the per-sample Lipschitz
/// constant of the log loss with an intercept; the step is
/// `1 / (2L + min(2 n alpha, L))`.
pub fn saga_step_size(max_squared_sum: f64, alpha: f64, n_samples: usize) -> f64 {
    let lipschitz = 0.25 * (max_squared_sum + 1.0) + alpha;
    let mun = (2.0 * n_samples as f64 * alpha).min(lipschitz);
    1.0 / (2.0 * lipschitz + mun)
}

/// Largest squared row norm of `x`.
pub fn max_squared_row_norm(x: &Array2<f64>) -> f64 {
    x.rows()
        .into_iter()
        .map(|row| row.dot(&row))
        .fold(0.0, f64::max)
}

/// SAGA solver state for one training run.
#[derive(Clone, Debug)]
pub struct Saga {
    alpha: f64,
    step_size: f64,
    grad_memory: Vec<f64>,
    seen: Vec<bool>,
    num_seen: usize,
    sum_grad: Array1<f64>,
    sum_grad_intercept: f64,
}

impl Saga {
    /// Fresh solver for `x` with L2 strength `alpha`.
    pub fn new(x: &Array2<f64>, alpha: f64) -> Self {
        let n_samples = x.nrows();
        Self {
            alpha,
            step_size: saga_step_size(max_squared_row_norm(x), alpha, n_samples),
            grad_memory: vec![0.0; n_samples],
            seen: vec![false; n_samples],
            num_seen: 0,
            sum_grad: Array1::zeros(x.ncols()),
            sum_grad_intercept: 0.0,
        }
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// One update using sample `index` with features `x_i` and target `y_i`.
    pub fn step<L: Loss>(
        &mut self,
        loss: &L,
        params: &mut LogisticParams,
        index: usize,
        x_i: ArrayView1<'_, f64>,
        y_i: f64,
    ) {
        let grad = loss.grad_wrt_margin(params.margin(x_i), y_i);
        let correction = grad - self.grad_memory[index];

        if !self.seen[index] {
            self.seen[index] = true;
            self.num_seen += 1;
        }
        let inv_seen = 1.0 / self.num_seen as f64;
        let step = self.step_size;

        // w <- w - step * (corr * x_i + avg_grad + alpha * w)
        let decay = 1.0 - step * self.alpha;
        params
            .coef
            .zip_mut_with(&self.sum_grad, |w, &s| *w = decay * *w - step * s * inv_seen);
        params.coef.scaled_add(-step * correction, &x_i);
        params.intercept -= step * (correction + self.sum_grad_intercept * inv_seen);

        self.sum_grad.scaled_add(correction, &x_i);
        self.sum_grad_intercept += correction;
        self.grad_memory[index] = grad;
    }
}
