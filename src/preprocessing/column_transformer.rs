//! ColumnTransformer implementation.
//!
//! Splits a feature [`Table`] by column kind, runs numeric columns through a
//! numeric [`Pipeline`] and optionally one-hot encodes the categorical and
//! boolean columns. Output is the numeric block followed by the one-hot block.

use crate::dataset::{ColumnData, ColumnKind, Table};
use crate::preprocessing::encoding::{FittedOneHotEncoder, OneHotEncoder, OneHotEncoderParams};
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::pipeline::{FittedPipeline, Pipeline, PipelineParams};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::{concatenate, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Gather named numeric columns into a row-major matrix.
fn numeric_matrix(table: &Table, names: &[String]) -> Result<Array2<f64>, PreprocessingError> {
    let mut matrix = Array2::zeros((table.n_rows(), names.len()));
    for (j, name) in names.iter().enumerate() {
        let column = table
            .column(name)
            .ok_or_else(|| PreprocessingError::MissingColumn(name.clone()))?;
        match column.data() {
            ColumnData::Numeric(values) => {
                for (i, &v) in values.iter().enumerate() {
                    matrix[[i, j]] = v;
                }
            }
            other => {
                return Err(PreprocessingError::WrongColumnKind {
                    column: name.clone(),
                    expected: ColumnKind::Numeric,
                    got: other.kind(),
                })
            }
        }
    }
    Ok(matrix)
}

/// ColumnTransformer (unfitted).
///
/// # Example
/// ```
/// use churnsense::dataset::{Column, ColumnData, Table};
/// use churnsense::preprocessing::{
///     ColumnTransformer, FittedTransformer, ImputeStrategy, Pipeline, SimpleImputer,
///     StandardScaler, Transformer,
/// };
///
/// let table = Table::new(vec![
///     Column::new("tenure", ColumnData::Numeric(vec![1.0, f64::NAN, 3.0])),
///     Column::new("Contract", ColumnData::Categorical(vec![
///         Some("Month".into()), Some("Year".into()), None,
///     ])),
/// ])
/// .unwrap();
///
/// let numeric = Pipeline::new()
///     .add_simple_imputer(SimpleImputer::new(ImputeStrategy::Median))
///     .add_standard_scaler(StandardScaler::new());
/// let fitted = ColumnTransformer::new(numeric).fit(&table).unwrap();
///
/// // Contract is excluded unless categorical encoding is enabled.
/// assert_eq!(fitted.transform(&table).unwrap().ncols(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct ColumnTransformer {
    numeric: Pipeline,
    encode_categorical: bool,
}

impl ColumnTransformer {
    /// Create a transformer with the given numeric pipeline. Categorical
    /// columns are excluded.
    pub fn new(numeric: Pipeline) -> Self {
        Self {
            numeric,
            encode_categorical: false,
        }
    }

    /// One-hot encode categorical and boolean columns instead of excluding them.
    pub fn with_encode_categorical(mut self, encode: bool) -> Self {
        self.encode_categorical = encode;
        self
    }
}

/// Serializable parameters for a fitted ColumnTransformer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColumnTransformerParams {
    /// Every feature column seen during fit, in table order.
    pub input_columns: Vec<String>,
    /// Columns handled by the numeric pipeline.
    pub numeric_columns: Vec<String>,
    /// Categorical and boolean columns.
    pub categorical_columns: Vec<String>,
    /// Numeric pipeline parameters.
    pub numeric: PipelineParams,
    /// One-hot parameters; absent when categorical columns are excluded.
    pub one_hot: Option<OneHotEncoderParams>,
}

/// Fitted ColumnTransformer ready for inference.
#[derive(Clone, Debug)]
pub struct FittedColumnTransformer {
    input_columns: Vec<String>,
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
    numeric: FittedPipeline,
    one_hot: Option<FittedOneHotEncoder>,
}

impl FittedColumnTransformer {
    pub fn input_columns(&self) -> &[String] {
        &self.input_columns
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical_columns
    }

    pub fn encodes_categorical(&self) -> bool {
        self.one_hot.is_some()
    }

    pub fn numeric_pipeline(&self) -> &FittedPipeline {
        &self.numeric
    }

    pub fn one_hot(&self) -> Option<&FittedOneHotEncoder> {
        self.one_hot.as_ref()
    }

    /// Width of the transformed matrix.
    pub fn n_features_out(&self) -> usize {
        self.numeric_columns.len() + self.one_hot.as_ref().map_or(0, |e| e.n_features_out())
    }

    /// Output feature names: numeric column names, then `column=category`.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self.numeric_columns.clone();
        if let Some(encoder) = &self.one_hot {
            names.extend(encoder.feature_names());
        }
        names
    }
}

impl Transformer for ColumnTransformer {
    type Input = Table;
    type Output = Array2<f64>;
    type Params = ColumnTransformerParams;
    type Fitted = FittedColumnTransformer;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        if data.n_rows() == 0 {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit ColumnTransformer on empty data".to_string(),
            ));
        }

        let owned = |names: Vec<&str>| names.into_iter().map(String::from).collect::<Vec<_>>();
        let input_columns = owned(data.column_names());
        let numeric_columns = owned(data.numeric_column_names());
        let categorical_columns = owned(data.categorical_column_names());

        let numeric = self.numeric.fit(&numeric_matrix(data, &numeric_columns)?)?;

        let one_hot = if self.encode_categorical {
            Some(OneHotEncoder::new(categorical_columns.iter().cloned()).fit(data)?)
        } else {
            if !categorical_columns.is_empty() {
                info!(
                    columns = ?categorical_columns,
                    "categorical columns excluded from features"
                );
            }
            None
        };

        let fitted = FittedColumnTransformer {
            input_columns,
            numeric_columns,
            categorical_columns,
            numeric,
            one_hot,
        };
        debug!(
            n_features_out = fitted.n_features_out(),
            "column transformer fitted"
        );
        Ok(fitted)
    }
}

impl FittedTransformer for FittedColumnTransformer {
    type Input = Table;
    type Output = Array2<f64>;
    type Params = ColumnTransformerParams;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        if let Some(missing) = self.input_columns.iter().find(|c| !data.contains(c)) {
            return Err(PreprocessingError::MissingColumn(missing.clone()));
        }

        let numeric = self
            .numeric
            .transform(&numeric_matrix(data, &self.numeric_columns)?)?;

        match &self.one_hot {
            Some(encoder) => {
                let encoded = encoder.transform(data)?;
                concatenate(Axis(1), &[numeric.view(), encoded.view()]).map_err(|e| {
                    PreprocessingError::InvalidParameter(format!(
                        "cannot join numeric and one-hot blocks: {}",
                        e
                    ))
                })
            }
            None => Ok(numeric),
        }
    }

    fn extract_params(&self) -> Self::Params {
        ColumnTransformerParams {
            input_columns: self.input_columns.clone(),
            numeric_columns: self.numeric_columns.clone(),
            categorical_columns: self.categorical_columns.clone(),
            numeric: self.numeric.extract_params(),
            one_hot: self.one_hot.as_ref().map(FittedTransformer::extract_params),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError> {
        let numeric = FittedPipeline::from_params(params.numeric)?;
        if numeric.n_features_in() != params.numeric_columns.len() {
            return Err(PreprocessingError::FeatureMismatch {
                expected_features: params.numeric_columns.len(),
                got_features: numeric.n_features_in(),
            });
        }

        let one_hot = params
            .one_hot
            .map(FittedOneHotEncoder::from_params)
            .transpose()?;
        if let Some(encoder) = &one_hot {
            if encoder.columns() != params.categorical_columns.as_slice() {
                return Err(PreprocessingError::InvalidParameter(
                    "one-hot columns differ from the categorical columns".to_string(),
                ));
            }
        }

        let unknown = params
            .numeric_columns
            .iter()
            .chain(&params.categorical_columns)
            .find(|c| !params.input_columns.contains(*c));
        if let Some(column) = unknown {
            return Err(PreprocessingError::InvalidParameter(format!(
                "column '{}' is not part of the input schema",
                column
            )));
        }

        Ok(Self {
            input_columns: params.input_columns,
            numeric_columns: params.numeric_columns,
            categorical_columns: params.categorical_columns,
            numeric,
            one_hot,
        })
    }

    fn n_features_in(&self) -> usize {
        self.input_columns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;
    use crate::preprocessing::imputation::{ImputeStrategy, SimpleImputer};
    use crate::preprocessing::scaling::StandardScaler;

    fn numeric_pipeline() -> Pipeline {
        Pipeline::new()
            .add_simple_imputer(SimpleImputer::new(ImputeStrategy::Median))
            .add_standard_scaler(StandardScaler::new())
    }

    fn create_table(tenure: Vec<f64>) -> Table {
        let n = tenure.len();
        let contracts = ["Month", "Year"];
        Table::new(vec![
            Column::new(
                "Contract",
                ColumnData::Categorical(
                    (0..n).map(|i| Some(contracts[i % 2].to_string())).collect(),
                ),
            ),
            Column::new("tenure", ColumnData::Numeric(tenure)),
            Column::new(
                "charges",
                ColumnData::Numeric((0..n).map(|i| 10.0 * i as f64).collect()),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_excludes_categorical_by_default() {
        let table = create_table(vec![1.0, 2.0, f64::NAN, 4.0]);
        let fitted = ColumnTransformer::new(numeric_pipeline())
            .fit(&table)
            .unwrap();

        assert_eq!(fitted.numeric_columns(), ["tenure", "charges"]);
        assert_eq!(fitted.categorical_columns(), ["Contract"]);
        assert!(!fitted.encodes_categorical());

        let out = fitted.transform(&table).unwrap();
        assert_eq!(out.dim(), (4, 2));
        assert!(out.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_one_hot_block_follows_numeric_block() {
        let table = create_table(vec![1.0, 2.0, 3.0, 4.0]);
        let fitted = ColumnTransformer::new(numeric_pipeline())
            .with_encode_categorical(true)
            .fit(&table)
            .unwrap();

        assert_eq!(
            fitted.feature_names(),
            vec!["tenure", "charges", "Contract=Month", "Contract=Year"]
        );
        let out = fitted.transform(&table).unwrap();
        assert_eq!(out.ncols(), 4);
        assert_eq!(out.row(0).to_vec()[2..], [1.0, 0.0]);
        assert_eq!(out.row(1).to_vec()[2..], [0.0, 1.0]);
    }

    #[test]
    fn test_test_rows_do_not_influence_transform() {
        let train = create_table(vec![1.0, 2.0, f64::NAN, 4.0]);
        let fitted = ColumnTransformer::new(numeric_pipeline())
            .fit(&train)
            .unwrap();

        let test_a = create_table(vec![f64::NAN, 3.0]);
        let test_b = create_table(vec![f64::NAN, 3000.0]);
        let out_a = fitted.transform(&test_a).unwrap();
        let out_b = fitted.transform(&test_b).unwrap();
        assert_eq!(out_a.row(0), out_b.row(0));
    }

    #[test]
    fn test_missing_column_error() {
        let table = create_table(vec![1.0, 2.0]);
        let fitted = ColumnTransformer::new(numeric_pipeline())
            .fit(&table)
            .unwrap();

        let reduced = table.drop_columns(&["tenure"]);
        assert!(matches!(
            fitted.transform(&reduced),
            Err(PreprocessingError::MissingColumn(c)) if c == "tenure"
        ));
    }

    #[test]
    fn test_wrong_column_kind_error() {
        let table = create_table(vec![1.0, 2.0]);
        let fitted = ColumnTransformer::new(numeric_pipeline())
            .fit(&table)
            .unwrap();

        let changed = Table::new(vec![
            Column::new(
                "Contract",
                ColumnData::Categorical(vec![Some("Month".into()), None]),
            ),
            Column::new(
                "tenure",
                ColumnData::Categorical(vec![Some("one".into()), None]),
            ),
            Column::new("charges", ColumnData::Numeric(vec![0.0, 1.0])),
        ])
        .unwrap();
        assert!(matches!(
            fitted.transform(&changed),
            Err(PreprocessingError::WrongColumnKind { .. })
        ));
    }

    #[test]
    fn test_params_roundtrip() {
        let table = create_table(vec![1.0, f64::NAN, 3.0, 7.0]);
        let fitted = ColumnTransformer::new(numeric_pipeline())
            .with_encode_categorical(true)
            .fit(&table)
            .unwrap();
        let restored = FittedColumnTransformer::from_params(fitted.extract_params()).unwrap();
        assert_eq!(
            fitted.transform(&table).unwrap(),
            restored.transform(&table).unwrap()
        );
    }

    #[test]
    fn test_empty_table_rejected() {
        let table = create_table(vec![]);
        assert!(matches!(
            ColumnTransformer::new(numeric_pipeline()).fit(&table),
            Err(PreprocessingError::EmptyData(_))
        ));
    }
}
