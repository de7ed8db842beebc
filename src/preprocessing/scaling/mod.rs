//! Feature scaling transformers.
//!
//! - [`StandardScaler`]: Z-score normalization using training mean and variance.

pub mod standard;

pub use standard::{
    FittedStandardScaler, StandardScaler, StandardScalerConfig, StandardScalerParams,
};
