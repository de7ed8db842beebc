//! Feature preprocessing for the churn baseline.
//!
//! Transformers follow a fit/transform split: an unfitted [`Transformer`]
//! holds hyperparameters only, and `fit` returns a separate
//! [`FittedTransformer`] holding the learned statistics. Fitting borrows the
//! transformer immutably, so nothing carries over between fits.
//!
//! # Available Transformers
//!
//! ## Imputation
//! - [`SimpleImputer`]: fill missing values with the column median or mean
//!
//! ## Scaling
//! - [`StandardScaler`]: Z-score normalization
//!
//! ## Encoding
//! - [`OneHotEncoder`]: indicator columns for categorical values
//!
//! ## Composition
//! - [`Pipeline`]: chain numeric transformers
//! - [`ColumnTransformer`]: numeric pipeline plus optional one-hot branch over a [`Table`]
//!
//! [`Table`]: crate::dataset::Table

pub mod column_transformer;
pub mod encoding;
pub mod error;
pub mod imputation;
pub mod pipeline;
pub mod scaling;
pub mod traits;

pub use column_transformer::{
    ColumnTransformer, ColumnTransformerParams, FittedColumnTransformer,
};
pub use encoding::{FittedOneHotEncoder, OneHotEncoder, OneHotEncoderParams};
pub use error::PreprocessingError;
pub use imputation::{FittedSimpleImputer, ImputeStrategy, SimpleImputer, SimpleImputerParams};
pub use pipeline::{FittedPipeline, Pipeline, PipelineParams, PipelineStepParams};
pub use scaling::{FittedStandardScaler, StandardScaler, StandardScalerConfig, StandardScalerParams};
pub use traits::{FittedTransformer, Transformer};
