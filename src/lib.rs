//! # churnsense
//!
//! A reproducible baseline for customer-churn prediction: load a tabular
//! dataset, find and normalize the churn label, drop columns that leak the
//! answer, split with stratification, impute and scale numeric features, fit
//! an L2-regularized logistic regression, report ROC-AUC and average
//! precision on the held-out rows, and persist the fitted pipeline.
//!
//! ## Design
//!
//! - Preprocessing uses a fit/transform split ([`preprocessing::Transformer`] /
//!   [`preprocessing::FittedTransformer`]); fitted objects are separate values
//!   so refitting never leaks earlier statistics.
//! - Models encode their training state in the type:
//!   [`model::LogisticRegression`] is trained by a [`trainer::Trainer`] into a
//!   `LogisticModel<Fitted>` that carries inference parameters only.
//! - The persisted artifact is a versioned container of plain parameters
//!   ([`artifact::ArtifactEnvelope`]).
//!
//! ## Example
//!
//! ```no_run
//! use churnsense::config::PipelineConfig;
//!
//! let outcome = churnsense::pipeline::run(&PipelineConfig::for_project_root("."))?;
//! println!("ROC-AUC: {:.4}", outcome.report.evaluation.roc_auc);
//! # Ok::<(), churnsense::ChurnError>(())
//! ```

pub mod artifact;
pub mod config;
pub mod dataset;
pub mod error;
pub mod leakage;
pub mod loss;
pub mod metrics;
pub mod model;
pub mod optimizer;
pub mod pipeline;
pub mod preprocessing;
pub mod serialization;
pub mod split;
pub mod target;
pub mod trainer;

pub use error::{ChurnError, Result};
