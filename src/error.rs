//! Crate-wide error type.
//!
//! Every stage of the training job fails fast with a [`ChurnError`]. The
//! variants map onto the failure classes an operator has to tell apart:
//! a misconfigured run, bad input data, or an unusable filesystem location.

use crate::preprocessing::PreprocessingError;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ChurnError>;

/// Error type for the churn training job.
#[derive(Debug, Error)]
pub enum ChurnError {
    /// The run cannot proceed with the current configuration
    /// (no target column, infeasible stratified split).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Input data is present but unusable (unmapped label values, ragged table).
    #[error("data error: {0}")]
    Data(String),

    /// The source dataset could not be read.
    #[error("failed to read dataset {}: {source}", path.display())]
    DataSource {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The artifact could not be written to or read from disk.
    #[error("artifact I/O failed for {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact could not be encoded or decoded.
    #[error("artifact serialization error: {0}")]
    Serialization(String),

    /// A metric is undefined for the given labels/scores.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// A preprocessing transformer rejected its input.
    #[error(transparent)]
    Preprocessing(#[from] PreprocessingError),
}

impl ChurnError {
    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ChurnError::Persistence {
            path: path.into(),
            source,
        }
    }

    /// True for errors caused by the run configuration rather than the data or filesystem.
    pub fn is_configuration(&self) -> bool {
        matches!(self, ChurnError::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_display() {
        let err = ChurnError::Configuration("no target".to_string());
        assert!(err.to_string().contains("configuration error"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_persistence_display_includes_path() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ChurnError::persistence("/models/out.joblib", io);
        let msg = err.to_string();
        assert!(msg.contains("/models/out.joblib"));
        assert!(msg.contains("denied"));
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_preprocessing_error_converts() {
        let err: ChurnError = PreprocessingError::EmptyData("no rows".to_string()).into();
        assert!(matches!(err, ChurnError::Preprocessing(_)));
        assert!(err.to_string().contains("Empty data"));
    }

    #[test]
    fn test_error_is_std_error() {
        let err = ChurnError::Data("bad".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
