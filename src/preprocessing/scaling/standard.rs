//! Standard Scaler (Z-score normalization).
//!
//! Transforms features by removing the mean and scaling to unit variance.
//!
//! The standard score of a sample `x` is calculated as:
//! ```text
//! z = (x - u) / s
//! ```
//! where `u` is the mean of the training samples and `s` their population
//! standard deviation. Constant columns keep `s = 1`. `NaN` cells are ignored
//! when fitting and passed through when transforming.

use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// Configuration for StandardScaler.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StandardScalerConfig {
    /// If true, center the data before scaling.
    pub with_mean: bool,
    /// If true, scale the data to unit variance.
    pub with_std: bool,
}

impl Default for StandardScalerConfig {
    fn default() -> Self {
        Self {
            with_mean: true,
            with_std: true,
        }
    }
}

/// Serializable parameters for a fitted StandardScaler.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StandardScalerParams {
    /// Configuration options.
    pub config: StandardScalerConfig,
    /// Mean of each feature.
    pub mean: Vec<f64>,
    /// Population variance of each feature.
    pub var: Vec<f64>,
    /// Divisor applied to each feature.
    pub scale: Vec<f64>,
    /// Number of features seen during fit.
    pub n_features: usize,
}

/// StandardScaler transformer (unfitted).
#[derive(Clone, Debug, Default)]
pub struct StandardScaler {
    config: StandardScalerConfig,
}

impl StandardScaler {
    /// Create a new StandardScaler with default settings (center and scale).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to center the data.
    pub fn with_mean(mut self, with_mean: bool) -> Self {
        self.config.with_mean = with_mean;
        self
    }

    /// Set whether to scale to unit variance.
    pub fn with_std(mut self, with_std: bool) -> Self {
        self.config.with_std = with_std;
        self
    }
}

/// Count, mean and population variance of the non-NaN cells.
fn moments(column: ArrayView1<'_, f64>) -> (usize, f64, f64) {
    let present: Vec<f64> = column.iter().copied().filter(|v| !v.is_nan()).collect();
    if present.is_empty() {
        return (0, 0.0, 0.0);
    }
    let n = present.len() as f64;
    let mean = present.iter().sum::<f64>() / n;
    let var = present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (present.len(), mean, var)
}

/// A column is constant when its variance is within the rounding error of
/// the two-pass variance computation, relative to its own magnitude.
fn is_constant(n_samples: usize, mean: f64, var: f64) -> bool {
    let n = n_samples as f64;
    let eps = f64::EPSILON;
    var <= n * eps * var + (n * mean * eps).powi(2)
}

impl Transformer for StandardScaler {
    type Input = Array2<f64>;
    type Output = Array2<f64>;
    type Params = StandardScalerParams;
    type Fitted = FittedStandardScaler;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        if data.nrows() == 0 {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit StandardScaler on empty data".to_string(),
            ));
        }

        let stats: Vec<(usize, f64, f64)> = data.axis_iter(Axis(1)).map(moments).collect();
        let means: Vec<f64> = stats.iter().map(|&(_, m, _)| m).collect();
        let vars: Vec<f64> = stats.iter().map(|&(_, _, v)| v).collect();

        let mean = if self.config.with_mean {
            Array1::from(means)
        } else {
            Array1::zeros(data.ncols())
        };
        let scale = if self.config.with_std {
            stats
                .iter()
                .map(|&(n, m, v)| if is_constant(n, m, v) { 1.0 } else { v.sqrt() })
                .collect()
        } else {
            Array1::ones(data.ncols())
        };

        Ok(FittedStandardScaler {
            config: self.config.clone(),
            mean,
            var: Array1::from(vars),
            scale,
        })
    }
}

/// Fitted StandardScaler ready for inference.
#[derive(Clone, Debug)]
pub struct FittedStandardScaler {
    config: StandardScalerConfig,
    mean: Array1<f64>,
    var: Array1<f64>,
    scale: Array1<f64>,
}

impl FittedStandardScaler {
    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn var(&self) -> &Array1<f64> {
        &self.var
    }

    pub fn scale(&self) -> &Array1<f64> {
        &self.scale
    }
}

impl FittedTransformer for FittedStandardScaler {
    type Input = Array2<f64>;
    type Output = Array2<f64>;
    type Params = StandardScalerParams;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        if data.ncols() != self.mean.len() {
            return Err(PreprocessingError::FeatureMismatch {
                expected_features: self.mean.len(),
                got_features: data.ncols(),
            });
        }
        Ok((data - &self.mean) / &self.scale)
    }

    fn extract_params(&self) -> Self::Params {
        StandardScalerParams {
            config: self.config.clone(),
            mean: self.mean.to_vec(),
            var: self.var.to_vec(),
            scale: self.scale.to_vec(),
            n_features: self.mean.len(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError> {
        let n = params.n_features;
        for (name, len) in [
            ("mean", params.mean.len()),
            ("var", params.var.len()),
            ("scale", params.scale.len()),
        ] {
            if len != n {
                return Err(PreprocessingError::InvalidParameter(format!(
                    "StandardScaler {} has {} entries, expected {}",
                    name, len, n
                )));
            }
        }
        if params.scale.iter().any(|&s| s == 0.0 || !s.is_finite()) {
            return Err(PreprocessingError::InvalidParameter(
                "StandardScaler scale must be finite and non-zero".to_string(),
            ));
        }

        Ok(Self {
            config: params.config,
            mean: Array1::from(params.mean),
            var: Array1::from(params.var),
            scale: Array1::from(params.scale),
        })
    }

    fn n_features_in(&self) -> usize {
        self.mean.len()
    }
}
