//! Run configuration.
//!
//! Every knob of the training job is an explicit field of [`PipelineConfig`].
//! The defaults reproduce the baseline run: the conventional project layout
//! under the current directory, an 80/20 split with seed 42 and a logistic
//! regression with a 5000-epoch budget.

use crate::artifact::ArtifactFormat;
use crate::preprocessing::ImputeStrategy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Relative location of the raw dataset inside a project root.
pub const RAW_DATA_PATH: &str = "data/raw/churn.csv";

/// Relative location of the persisted model inside a project root.
pub const MODEL_PATH: &str = "models/baseline_logreg.joblib";

/// Label column names, in priority order.
pub const TARGET_CANDIDATES: [&str; 4] = ["ChurnLabel", "Churn", "Exited", "is_churn"];

/// Columns that leak the answer in common churn datasets.
pub const LEAKAGE_COLUMNS: [&str; 4] = ["CustomerStatus", "ChurnScore", "ChurnReason", "ChurnCategory"];

/// Complete configuration of one training run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// CSV file to train on.
    pub data_path: PathBuf,
    /// Where the fitted pipeline is written.
    pub artifact_path: PathBuf,
    /// Encoding of the artifact container.
    pub artifact_format: ArtifactFormat,
    /// Fraction of rows held out for evaluation.
    pub test_fraction: f64,
    /// Seed for the split and the solver's sampling order.
    pub seed: u64,
    /// Candidate label column names, first match wins.
    pub target_candidates: Vec<String>,
    /// Columns dropped from the features when present.
    pub leakage_columns: Vec<String>,
    /// Epoch budget of the solver.
    pub max_iter: usize,
    /// Relative coefficient change under which the solver stops.
    pub tol: f64,
    /// Inverse regularization strength.
    pub c: f64,
    /// Worker threads for row-parallel work; `None` uses every core.
    pub max_workers: Option<usize>,
    /// How missing numeric values are filled.
    pub impute_strategy: ImputeStrategy,
    /// One-hot encode categorical/boolean columns instead of excluding them.
    pub encode_categorical: bool,
}

impl PipelineConfig {
    /// Configuration for the conventional layout under `root`
    /// (`data/raw/churn.csv` in, `models/baseline_logreg.joblib` out).
    pub fn for_project_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            data_path: root.join(RAW_DATA_PATH),
            artifact_path: root.join(MODEL_PATH),
            artifact_format: ArtifactFormat::Json,
            test_fraction: 0.2,
            seed: 42,
            target_candidates: TARGET_CANDIDATES.iter().map(|s| s.to_string()).collect(),
            leakage_columns: LEAKAGE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            max_iter: 5000,
            tol: 1e-4,
            c: 1.0,
            max_workers: None,
            impute_strategy: ImputeStrategy::Median,
            encode_categorical: false,
        }
    }

    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    pub fn with_artifact_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifact_path = path.into();
        self
    }

    pub fn with_artifact_format(mut self, format: ArtifactFormat) -> Self {
        self.artifact_format = format;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn with_impute_strategy(mut self, strategy: ImputeStrategy) -> Self {
        self.impute_strategy = strategy;
        self
    }

    pub fn with_max_workers(mut self, workers: Option<usize>) -> Self {
        self.max_workers = workers;
        self
    }

    /// Enable the one-hot branch for categorical and boolean columns.
    pub fn with_encode_categorical(mut self, enabled: bool) -> Self {
        self.encode_categorical = enabled;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::for_project_root(".")
    }
}
