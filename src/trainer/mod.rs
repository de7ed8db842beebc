//! Training loop for logistic regression.
//!
//! [`Trainer`] runs SAGA epochs over a feature matrix and converts the
//! trained [`LogisticRegression`] into an inference-only model. Each epoch
//! draws `n` sample indices uniformly from a `ChaCha8Rng` seeded once per
//! fit, so the same data and seed always give the same coefficients.

use crate::error::{ChurnError, Result};
use crate::loss::{LogLoss, Loss};
use crate::model::{Fitted, LogisticModel, LogisticParams, LogisticRegression};
use crate::optimizer::Saga;
use ndarray::{Array2, ArrayView1};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use rayon::ThreadPool;
use tracing::{debug, info, warn};

/// Build a rayon pool; `None` lets rayon use one thread per core.
pub fn build_thread_pool(max_workers: Option<usize>) -> Result<ThreadPool> {
    if max_workers == Some(0) {
        return Err(ChurnError::Configuration(
            "max_workers must be at least 1".to_string(),
        ));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(max_workers.unwrap_or(0))
        .build()
        .map_err(|e| ChurnError::Configuration(format!("cannot start worker pool: {}", e)))
}

/// Outcome of a training run.
#[derive(Clone, Debug, PartialEq)]
pub struct FitSummary {
    /// Epochs actually run.
    pub n_iter: usize,
    pub converged: bool,
    /// Regularized objective `C * Σ loss + ½‖w‖²` at the final parameters.
    pub objective: f64,
}

/// Trains logistic models. Immutable once built; reusable across fits.
#[derive(Clone, Debug)]
pub struct Trainer {
    pub(crate) max_iter: usize,
    pub(crate) tol: f64,
    pub(crate) c: f64,
    pub(crate) seed: u64,
    pub(crate) max_workers: Option<usize>,
    loss_fn: LogLoss,
}

/// Fluent builder for [`Trainer`].
///
/// Defaults:
/// - `max_iter`: 5000
/// - `tol`: 1e-4
/// - `c`: 1.0
/// - `seed`: 42
/// - `max_workers`: `None` (all cores)
#[derive(Clone, Debug)]
pub struct TrainerBuilder {
    max_iter: usize,
    tol: f64,
    c: f64,
    seed: u64,
    max_workers: Option<usize>,
}

impl Default for TrainerBuilder {
    fn default() -> Self {
        Self {
            max_iter: 5000,
            tol: 1e-4,
            c: 1.0,
            seed: 42,
            max_workers: None,
        }
    }
}

impl TrainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum number of epochs.
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Stopping tolerance on the relative coefficient change per epoch.
    pub fn tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Inverse regularization strength.
    pub fn c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Threads for row-parallel work. `None` uses every core.
    pub fn max_workers(mut self, max_workers: Option<usize>) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// Validate the hyperparameters and build the trainer.
    pub fn build(self) -> Result<Trainer> {
        if self.max_iter == 0 {
            return Err(ChurnError::Configuration(
                "max_iter must be positive".to_string(),
            ));
        }
        if !(self.tol.is_finite() && self.tol > 0.0) {
            return Err(ChurnError::Configuration(format!(
                "tol must be positive, got {}",
                self.tol
            )));
        }
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(ChurnError::Configuration(format!(
                "C must be positive, got {}",
                self.c
            )));
        }
        if self.max_workers == Some(0) {
            return Err(ChurnError::Configuration(
                "max_workers must be at least 1".to_string(),
            ));
        }
        Ok(Trainer {
            max_iter: self.max_iter,
            tol: self.tol,
            c: self.c,
            seed: self.seed,
            max_workers: self.max_workers,
            loss_fn: LogLoss,
        })
    }
}

/// Largest absolute entry over coefficients and intercept.
fn max_abs(params: &LogisticParams) -> f64 {
    params
        .coef
        .iter()
        .fold(params.intercept.abs(), |acc, w| acc.max(w.abs()))
}

/// Largest absolute change between two parameter sets.
fn max_change(old: &LogisticParams, new: &LogisticParams) -> f64 {
    old.coef
        .iter()
        .zip(new.coef.iter())
        .fold((old.intercept - new.intercept).abs(), |acc, (a, b)| {
            acc.max((a - b).abs())
        })
}

impl Trainer {
    /// Starts the builder pattern.
    pub fn builder() -> TrainerBuilder {
        TrainerBuilder::new()
    }

    pub fn max_workers(&self) -> Option<usize> {
        self.max_workers
    }

    /// Regularized objective, summed row-parallel then reduced in row order.
    fn objective(&self, params: &LogisticParams, x: &Array2<f64>, y: &[f64]) -> f64 {
        let losses: Vec<f64> = (0..x.nrows())
            .into_par_iter()
            .map(|i| self.loss_fn.loss(params.margin(x.row(i)), y[i]))
            .collect();
        self.c * losses.iter().sum::<f64>() + 0.5 * params.coef.dot(&params.coef)
    }

    /// Train `model` on `x` (one sample per row) and binary labels `y`.
    ///
    /// # Errors
    /// - [`ChurnError::Data`] if `x` is empty, shapes disagree, labels are not
    ///   0/1, or features are not finite.
    /// - [`ChurnError::Configuration`] if the worker pool cannot be started.
    pub fn fit(
        &self,
        model: LogisticRegression,
        x: &Array2<f64>,
        y: &[u8],
    ) -> Result<LogisticModel<Fitted>> {
        self.fit_with_summary(model, x, y).map(|(fitted, _)| fitted)
    }

    /// Like [`fit`](Self::fit), also reporting iterations and convergence.
    pub fn fit_with_summary(
        &self,
        mut model: LogisticRegression,
        x: &Array2<f64>,
        y: &[u8],
    ) -> Result<(LogisticModel<Fitted>, FitSummary)> {
        let (n_samples, n_features) = x.dim();
        if n_samples == 0 {
            return Err(ChurnError::Data("cannot train on zero rows".to_string()));
        }
        if y.len() != n_samples {
            return Err(ChurnError::Data(format!(
                "feature matrix has {} rows but {} labels were given",
                n_samples,
                y.len()
            )));
        }
        if model.params().n_features() != n_features {
            return Err(ChurnError::Data(format!(
                "model expects {} features, matrix has {}",
                model.params().n_features(),
                n_features
            )));
        }
        if let Some(bad) = y.iter().find(|&&label| label > 1) {
            return Err(ChurnError::Data(format!(
                "labels must be 0 or 1, found {}",
                bad
            )));
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(ChurnError::Data(
                "feature matrix contains non-finite values".to_string(),
            ));
        }

        let pool = build_thread_pool(self.max_workers)?;
        let targets: Vec<f64> = y.iter().map(|&label| f64::from(label)).collect();
        let alpha = 1.0 / (self.c * n_samples as f64);
        let mut saga = Saga::new(x, alpha);
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut params = model.params().clone();

        info!(
            n_samples,
            n_features,
            alpha,
            step_size = saga.step_size(),
            max_iter = self.max_iter,
            "training logistic regression with SAGA"
        );

        let mut converged = false;
        let mut n_iter = 0;
        while n_iter < self.max_iter {
            let previous = params.clone();
            for _ in 0..n_samples {
                let i = rng.gen_range(0..n_samples);
                let row: ArrayView1<'_, f64> = x.row(i);
                saga.step(&self.loss_fn, &mut params, i, row, targets[i]);
            }
            n_iter += 1;

            let change = max_change(&previous, &params);
            let weight = max_abs(&params);
            if n_iter % 100 == 0 && tracing::enabled!(tracing::Level::DEBUG) {
                let objective = pool.install(|| self.objective(&params, x, &targets));
                debug!(epoch = n_iter, objective, change, "SAGA progress");
            }
            if (weight == 0.0 && change == 0.0) || (weight > 0.0 && change / weight < self.tol) {
                converged = true;
                break;
            }
        }

        let objective = pool.install(|| self.objective(&params, x, &targets));
        if converged {
            info!(n_iter, objective, "SAGA converged");
        } else {
            warn!(
                max_iter = self.max_iter,
                objective, "SAGA did not converge; coefficients may be suboptimal"
            );
        }

        model.update_params(params);
        Ok((
            model.into_fitted(),
            FitSummary {
                n_iter,
                converged,
                objective,
            },
        ))
    }
}
