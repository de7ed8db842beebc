//! Binary logistic regression.
//!
//! - [`LogisticRegression`] = `LogisticModel<Unfitted>`: zero-initialized, handed to a
//!   [`Trainer`](crate::trainer::Trainer).
//! - `LogisticModel<Fitted>`: inference-only, serializable predictor.
//!
//! Prediction is row-parallel on the current `rayon` pool; every row is computed
//! independently, so results do not depend on the number of workers.

use crate::error::{ChurnError, Result};
use crate::loss::sigmoid;
use crate::model::{Fitted, InferenceModel, Unfitted};
use ndarray::{Array1, Array2, ArrayView1};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// Class labels, negative first. Probabilities refer to the second one.
pub const CLASSES: [u8; 2] = [0, 1];

/// Trainable parameters: one coefficient per feature plus an intercept.
#[derive(Clone, Debug, PartialEq)]
pub struct LogisticParams {
    pub coef: Array1<f64>,
    pub intercept: f64,
}

impl LogisticParams {
    pub fn zeros(n_features: usize) -> Self {
        Self {
            coef: Array1::zeros(n_features),
            intercept: 0.0,
        }
    }

    /// Raw margin `w·x + b` for one sample.
    pub fn margin(&self, x: ArrayView1<'_, f64>) -> f64 {
        self.coef.dot(&x) + self.intercept
    }

    pub fn n_features(&self) -> usize {
        self.coef.len()
    }
}

/// Serializable representation of a fitted logistic model.
///
/// Floats are kept as `f64` so a reload reproduces probabilities exactly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializableLogisticParams {
    pub coef: Vec<f64>,
    pub intercept: f64,
    pub classes: Vec<u8>,
}

impl From<&LogisticParams> for SerializableLogisticParams {
    fn from(params: &LogisticParams) -> Self {
        Self {
            coef: params.coef.to_vec(),
            intercept: params.intercept,
            classes: CLASSES.to_vec(),
        }
    }
}

impl TryFrom<SerializableLogisticParams> for LogisticParams {
    type Error = ChurnError;

    fn try_from(value: SerializableLogisticParams) -> Result<Self> {
        if value.classes != CLASSES {
            return Err(ChurnError::Serialization(format!(
                "expected classes {:?}, found {:?}",
                CLASSES, value.classes
            )));
        }
        if !value.intercept.is_finite() || value.coef.iter().any(|c| !c.is_finite()) {
            return Err(ChurnError::Serialization(
                "logistic coefficients must be finite".to_string(),
            ));
        }
        Ok(Self {
            coef: Array1::from(value.coef),
            intercept: value.intercept,
        })
    }
}

/// A logistic model with its training state encoded at the type level.
#[derive(Clone, Debug)]
pub struct LogisticModel<S> {
    params: LogisticParams,
    _state: PhantomData<S>,
}

/// An **unfitted** logistic regression model.
pub type LogisticRegression = LogisticModel<Unfitted>;

impl LogisticModel<Unfitted> {
    /// Zero-initialized model for `n_features` inputs.
    pub fn new(n_features: usize) -> Self {
        Self {
            params: LogisticParams::zeros(n_features),
            _state: PhantomData,
        }
    }

    /// Starting point for training, e.g. a warm start.
    pub fn from_params(params: LogisticParams) -> Self {
        Self {
            params,
            _state: PhantomData,
        }
    }

    pub fn params(&self) -> &LogisticParams {
        &self.params
    }

    pub fn update_params(&mut self, params: LogisticParams) {
        self.params = params;
    }

    /// Freeze the current parameters into an inference model.
    pub fn into_fitted(self) -> LogisticModel<Fitted> {
        LogisticModel::<Fitted>::new(self.params)
    }
}

impl LogisticModel<Fitted> {
    pub fn new(params: LogisticParams) -> Self {
        Self {
            params,
            _state: PhantomData,
        }
    }

    pub fn coef(&self) -> &Array1<f64> {
        &self.params.coef
    }

    pub fn intercept(&self) -> f64 {
        self.params.intercept
    }

    pub fn n_features(&self) -> usize {
        self.params.n_features()
    }

    /// Margins `X·w + b`, one per row.
    ///
    /// # Errors
    /// [`ChurnError::Data`] if `x` does not have `n_features` columns.
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if x.ncols() != self.n_features() {
            return Err(ChurnError::Data(format!(
                "input has {} features, model expects {}",
                x.ncols(),
                self.n_features()
            )));
        }
        let margins: Vec<f64> = (0..x.nrows())
            .into_par_iter()
            .map(|i| self.params.margin(x.row(i)))
            .collect();
        Ok(Array1::from(margins))
    }

    /// Positive-class probabilities in `[0, 1]`, one per row.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self.decision_function(x)?.mapv(sigmoid))
    }

    /// Hard labels at the 0.5 threshold.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<u8>> {
        Ok(self
            .decision_function(x)?
            .iter()
            .map(|&z| if z > 0.0 { CLASSES[1] } else { CLASSES[0] })
            .collect())
    }
}

impl InferenceModel for LogisticModel<Fitted> {
    type InputBatch = Array2<f64>;
    type OutputBatch = Array1<f64>;
    type ParamsRepr = SerializableLogisticParams;

    fn predict_batch(&self, input: &Self::InputBatch) -> Result<Self::OutputBatch> {
        self.predict_proba(input)
    }

    fn extract_params(&self) -> Self::ParamsRepr {
        (&self.params).into()
    }

    fn from_params(params: Self::ParamsRepr) -> Result<Self> {
        let params = LogisticParams::try_from(params)?;
        Ok(Self::new(params))
    }
}
