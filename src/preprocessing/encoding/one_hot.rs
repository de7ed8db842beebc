//! One-hot encoding for categorical features.
//!
//! Transforms the text cells of named table columns into one-hot (dummy)
//! encoded indicator columns.

use crate::dataset::{Column, ColumnData, Table};
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One-hot encoder for categorical features.
///
/// Each selected column is treated as a categorical feature and the encoder
/// learns the distinct non-missing values present in it during fitting.
/// Boolean cells count as the categories `"false"` and `"true"`.
///
/// At transform time a value not seen during fit, or a missing cell, encodes
/// as all zeros for that column.
///
/// # Example
/// ```
/// use churnsense::dataset::{Column, ColumnData, Table};
/// use churnsense::preprocessing::{FittedTransformer, OneHotEncoder, Transformer};
///
/// let table = Table::new(vec![Column::new(
///     "Contract",
///     ColumnData::Categorical(vec![Some("Monthly".into()), Some("Yearly".into())]),
/// )])
/// .unwrap();
///
/// let fitted = OneHotEncoder::new(["Contract"]).fit(&table).unwrap();
/// let encoded = fitted.transform(&table).unwrap();
/// assert_eq!(encoded.row(0).to_vec(), vec![1.0, 0.0]);
/// assert_eq!(fitted.feature_names(), vec!["Contract=Monthly", "Contract=Yearly"]);
/// ```
#[derive(Clone, Debug)]
pub struct OneHotEncoder {
    columns: Vec<String>,
}

impl OneHotEncoder {
    /// Create an encoder for the named columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// Serializable parameters for a fitted OneHotEncoder.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OneHotEncoderParams {
    /// Encoded column names, in output order.
    pub columns: Vec<String>,
    /// Sorted categories for each column.
    pub categories: Vec<Vec<String>>,
    /// Total number of output features.
    pub n_features_out: usize,
}

/// Fitted OneHotEncoder ready for inference.
#[derive(Clone, Debug)]
pub struct FittedOneHotEncoder {
    columns: Vec<String>,
    categories: Vec<Vec<String>>,
    n_features_out: usize,
}

impl FittedOneHotEncoder {
    /// Categories learned for each column.
    pub fn categories(&self) -> &[Vec<String>] {
        &self.categories
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn n_features_out(&self) -> usize {
        self.n_features_out
    }

    /// Output feature names as `column=category`.
    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .zip(&self.categories)
            .flat_map(|(col, cats)| cats.iter().map(move |cat| format!("{}={}", col, cat)))
            .collect()
    }
}

/// Text form of every cell; `None` for missing cells.
fn cell_labels(column: &Column) -> Vec<Option<String>> {
    match column.data() {
        ColumnData::Categorical(v) => v.clone(),
        ColumnData::Boolean(v) => v.iter().map(|b| b.map(|b| b.to_string())).collect(),
        ColumnData::Numeric(v) => v
            .iter()
            .map(|x| if x.is_nan() { None } else { Some(x.to_string()) })
            .collect(),
    }
}

fn lookup<'a>(table: &'a Table, name: &str) -> Result<&'a Column, PreprocessingError> {
    table
        .column(name)
        .ok_or_else(|| PreprocessingError::MissingColumn(name.to_string()))
}

impl Transformer for OneHotEncoder {
    type Input = Table;
    type Output = Array2<f64>;
    type Params = OneHotEncoderParams;
    type Fitted = FittedOneHotEncoder;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        if data.n_rows() == 0 {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit OneHotEncoder on empty data".to_string(),
            ));
        }

        let mut categories = Vec::with_capacity(self.columns.len());
        for name in &self.columns {
            let column = lookup(data, name)?;
            let distinct: BTreeSet<String> = cell_labels(column).into_iter().flatten().collect();
            categories.push(distinct.into_iter().collect::<Vec<_>>());
        }

        let n_features_out = categories.iter().map(Vec::len).sum();
        Ok(FittedOneHotEncoder {
            columns: self.columns.clone(),
            categories,
            n_features_out,
        })
    }
}

impl FittedTransformer for FittedOneHotEncoder {
    type Input = Table;
    type Output = Array2<f64>;
    type Params = OneHotEncoderParams;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        let mut result = Array2::zeros((data.n_rows(), self.n_features_out));

        let mut offset = 0;
        for (name, cats) in self.columns.iter().zip(&self.categories) {
            let column = lookup(data, name)?;
            for (row, label) in cell_labels(column).iter().enumerate() {
                let position = label
                    .as_ref()
                    .and_then(|l| cats.binary_search(l).ok());
                if let Some(pos) = position {
                    result[[row, offset + pos]] = 1.0;
                }
            }
            offset += cats.len();
        }

        Ok(result)
    }

    fn extract_params(&self) -> Self::Params {
        OneHotEncoderParams {
            columns: self.columns.clone(),
            categories: self.categories.clone(),
            n_features_out: self.n_features_out,
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError> {
        if params.columns.len() != params.categories.len() {
            return Err(PreprocessingError::InvalidParameter(format!(
                "OneHotEncoder has {} columns but {} category lists",
                params.columns.len(),
                params.categories.len()
            )));
        }
        let total: usize = params.categories.iter().map(Vec::len).sum();
        if total != params.n_features_out {
            return Err(PreprocessingError::FeatureMismatch {
                expected_features: params.n_features_out,
                got_features: total,
            });
        }
        if params
            .categories
            .iter()
            .any(|cats| cats.windows(2).any(|w| w[0] >= w[1]))
        {
            return Err(PreprocessingError::InvalidParameter(
                "OneHotEncoder categories must be sorted and distinct".to_string(),
            ));
        }

        Ok(Self {
            columns: params.columns,
            categories: params.categories,
            n_features_out: params.n_features_out,
        })
    }

    fn n_features_in(&self) -> usize {
        self.columns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_table() -> Table {
        Table::new(vec![
            Column::new(
                "Contract",
                ColumnData::Categorical(vec![
                    Some("Two year".into()),
                    Some("Month".into()),
                    None,
                    Some("Month".into()),
                ]),
            ),
            Column::new(
                "Paperless",
                ColumnData::Boolean(vec![Some(true), Some(false), Some(true), None]),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_one_hot_basic() {
        let table = create_table();
        let fitted = OneHotEncoder::new(["Contract", "Paperless"])
            .fit(&table)
            .unwrap();

        assert_eq!(fitted.n_features_out(), 4);
        assert_eq!(
            fitted.feature_names(),
            vec![
                "Contract=Month",
                "Contract=Two year",
                "Paperless=false",
                "Paperless=true"
            ]
        );

        let encoded = fitted.transform(&table).unwrap();
        assert_eq!(encoded.row(0).to_vec(), vec![0.0, 1.0, 0.0, 1.0]);
        assert_eq!(encoded.row(1).to_vec(), vec![1.0, 0.0, 1.0, 0.0]);
        // missing cells encode as zeros
        assert_eq!(encoded.row(2).to_vec(), vec![0.0, 0.0, 0.0, 1.0]);
        assert_eq!(encoded.row(3).to_vec(), vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_unknown_category_encodes_zeros() {
        let fitted = OneHotEncoder::new(["Contract"])
            .fit(&create_table())
            .unwrap();

        let unseen = Table::new(vec![Column::new(
            "Contract",
            ColumnData::Categorical(vec![Some("Weekly".into())]),
        )])
        .unwrap();
        let encoded = fitted.transform(&unseen).unwrap();
        assert!(encoded.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_missing_column() {
        let result = OneHotEncoder::new(["Region"]).fit(&create_table());
        assert!(matches!(result, Err(PreprocessingError::MissingColumn(c)) if c == "Region"));
    }

    #[test]
    fn test_params_roundtrip() {
        let table = create_table();
        let fitted = OneHotEncoder::new(["Contract"]).fit(&table).unwrap();
        let restored = FittedOneHotEncoder::from_params(fitted.extract_params()).unwrap();
        assert_eq!(
            fitted.transform(&table).unwrap(),
            restored.transform(&table).unwrap()
        );
    }

    #[test]
    fn test_from_params_rejects_unsorted_categories() {
        let params = OneHotEncoderParams {
            columns: vec!["c".to_string()],
            categories: vec![vec!["b".to_string(), "a".to_string()]],
            n_features_out: 2,
        };
        assert!(FittedOneHotEncoder::from_params(params).is_err());
    }
}
