//! Simple Imputer.
//!
//! Imputation transformer for completing missing values with a per-column
//! statistic learned at fit time. `NaN` marks a missing value.
//!
//! # Example
//! ```
//! use churnsense::preprocessing::{FittedTransformer, ImputeStrategy, SimpleImputer, Transformer};
//! use ndarray::array;
//!
//! let train = array![[1.0, f64::NAN], [3.0, 4.0], [5.0, 6.0]];
//! let fitted = SimpleImputer::new(ImputeStrategy::Median).fit(&train).unwrap();
//! let filled = fitted.transform(&train).unwrap();
//! assert_eq!(filled[[0, 1]], 5.0);
//! ```

use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// Strategy for imputing missing values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace missing values with the median of each column.
    #[default]
    Median,
    /// Replace missing values with the mean of each column.
    Mean,
}

/// Serializable parameters for a fitted SimpleImputer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimpleImputerParams {
    /// Strategy used for imputation.
    pub strategy: ImputeStrategy,
    /// Fill value for each feature.
    pub statistics: Vec<f64>,
    /// Number of features seen during fit.
    pub n_features: usize,
}

/// SimpleImputer transformer (unfitted).
#[derive(Clone, Debug, Default)]
pub struct SimpleImputer {
    strategy: ImputeStrategy,
}

impl SimpleImputer {
    /// Create a new SimpleImputer with the specified strategy.
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> ImputeStrategy {
        self.strategy
    }
}

/// Median of a non-empty, NaN-free sample.
fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let n = values.len();
    if n % 2 == 0 {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    } else {
        values[n / 2]
    }
}

/// Fill value for one column, ignoring NaN. All-missing columns get 0.0.
fn column_statistic(column: ArrayView1<'_, f64>, strategy: ImputeStrategy) -> f64 {
    let present: Vec<f64> = column.iter().copied().filter(|v| !v.is_nan()).collect();
    if present.is_empty() {
        return 0.0;
    }
    match strategy {
        ImputeStrategy::Median => median(present),
        ImputeStrategy::Mean => present.iter().sum::<f64>() / present.len() as f64,
    }
}

impl Transformer for SimpleImputer {
    type Input = Array2<f64>;
    type Output = Array2<f64>;
    type Params = SimpleImputerParams;
    type Fitted = FittedSimpleImputer;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        if data.nrows() == 0 {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit SimpleImputer on empty data".to_string(),
            ));
        }

        let statistics: Array1<f64> = data
            .axis_iter(Axis(1))
            .map(|column| column_statistic(column, self.strategy))
            .collect();

        Ok(FittedSimpleImputer {
            strategy: self.strategy,
            statistics,
        })
    }
}

/// Fitted SimpleImputer ready for inference.
#[derive(Clone, Debug)]
pub struct FittedSimpleImputer {
    strategy: ImputeStrategy,
    statistics: Array1<f64>,
}

impl FittedSimpleImputer {
    /// Fill values for each feature.
    pub fn statistics(&self) -> &Array1<f64> {
        &self.statistics
    }
}

impl FittedTransformer for FittedSimpleImputer {
    type Input = Array2<f64>;
    type Output = Array2<f64>;
    type Params = SimpleImputerParams;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        if data.ncols() != self.statistics.len() {
            return Err(PreprocessingError::FeatureMismatch {
                expected_features: self.statistics.len(),
                got_features: data.ncols(),
            });
        }

        let mut result = data.clone();
        for (mut column, &fill) in result.axis_iter_mut(Axis(1)).zip(self.statistics.iter()) {
            column.mapv_inplace(|v| if v.is_nan() { fill } else { v });
        }
        Ok(result)
    }

    fn extract_params(&self) -> Self::Params {
        SimpleImputerParams {
            strategy: self.strategy,
            statistics: self.statistics.to_vec(),
            n_features: self.statistics.len(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError> {
        if params.statistics.len() != params.n_features {
            return Err(PreprocessingError::FeatureMismatch {
                expected_features: params.n_features,
                got_features: params.statistics.len(),
            });
        }
        Ok(Self {
            strategy: params.strategy,
            statistics: Array1::from(params.statistics),
        })
    }

    fn n_features_in(&self) -> usize {
        self.statistics.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn create_test_data_with_missing() -> Array2<f64> {
        // [[1, NaN], [3, 4], [5, 6], [10, NaN]]
        array![[1.0, f64::NAN], [3.0, 4.0], [5.0, 6.0], [10.0, f64::NAN]]
    }

    #[test]
    fn test_simple_imputer_median() {
        let data = create_test_data_with_missing();
        let fitted = SimpleImputer::new(ImputeStrategy::Median).fit(&data).unwrap();

        // Column 0: median of [1, 3, 5, 10] = 4
        // Column 1: median of [4, 6] = 5
        assert_eq!(fitted.statistics().to_vec(), vec![4.0, 5.0]);

        let imputed = fitted.transform(&data).unwrap();
        assert_eq!(imputed[[0, 1]], 5.0);
        assert_eq!(imputed[[3, 1]], 5.0);
        assert_eq!(imputed[[1, 1]], 4.0);
        assert_eq!(imputed[[3, 0]], 10.0);
    }

    #[test]
    fn test_simple_imputer_mean() {
        let data = create_test_data_with_missing();
        let fitted = SimpleImputer::new(ImputeStrategy::Mean).fit(&data).unwrap();

        let stats = fitted.statistics();
        assert!((stats[0] - 4.75).abs() < 1e-12);
        assert!((stats[1] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_all_missing_column_fills_zero() {
        let data = array![[f64::NAN, 1.0], [f64::NAN, 2.0]];
        let fitted = SimpleImputer::default().fit(&data).unwrap();
        let imputed = fitted.transform(&data).unwrap();
        assert_eq!(imputed[[0, 0]], 0.0);
        assert_eq!(imputed[[1, 0]], 0.0);
    }

    #[test]
    fn test_statistics_come_from_fit_data_only() {
        let train = array![[1.0], [2.0], [3.0]];
        let fitted = SimpleImputer::default().fit(&train).unwrap();

        let test = array![[f64::NAN], [1000.0], [1000.0]];
        let imputed = fitted.transform(&test).unwrap();
        assert_eq!(imputed[[0, 0]], 2.0);
    }

    #[test]
    fn test_refit_does_not_retain_statistics() {
        let imputer = SimpleImputer::default();
        let first = imputer.fit(&array![[1.0], [3.0]]).unwrap();
        let second = imputer.fit(&array![[10.0], [30.0]]).unwrap();
        assert_eq!(first.statistics()[0], 2.0);
        assert_eq!(second.statistics()[0], 20.0);
    }

    #[test]
    fn test_simple_imputer_feature_mismatch() {
        let data = create_test_data_with_missing();
        let fitted = SimpleImputer::default().fit(&data).unwrap();

        let wrong_data = array![[1.0, 2.0, 3.0]];
        let result = fitted.transform(&wrong_data);

        assert!(matches!(
            result,
            Err(PreprocessingError::FeatureMismatch {
                expected_features: 2,
                got_features: 3
            })
        ));
    }

    #[test]
    fn test_simple_imputer_empty_data() {
        let data = Array2::<f64>::zeros((0, 2));
        assert!(SimpleImputer::default().fit(&data).is_err());
    }

    #[test]
    fn test_simple_imputer_save_load_file() {
        let data = create_test_data_with_missing();
        let fitted = SimpleImputer::default().fit(&data).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("imputer.bin");
        fitted.save_to_file(&path).unwrap();

        let loaded = FittedSimpleImputer::load_from_file(&path).unwrap();
        assert_eq!(loaded.n_features_in(), fitted.n_features_in());
        assert_eq!(loaded.statistics(), fitted.statistics());
    }

    #[test]
    fn test_from_params_rejects_inconsistent_lengths() {
        let params = SimpleImputerParams {
            strategy: ImputeStrategy::Median,
            statistics: vec![1.0],
            n_features: 2,
        };
        assert!(FittedSimpleImputer::from_params(params).is_err());
    }
}
