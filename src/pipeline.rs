//! End-to-end training job.
//!
//! Stages, each failing fast:
//! 1. load the CSV into a [`Table`];
//! 2. resolve and normalize the label column;
//! 3. drop the label and leakage columns;
//! 4. stratified train/test split;
//! 5. fit the column transformer on the training rows only;
//! 6. fit the logistic regression;
//! 7. score the held-out rows;
//! 8. persist the fitted pipeline.
//!
//! Nothing is written to disk unless every earlier stage succeeded.

use crate::artifact::{save_artifact, ArtifactMetadata, ChurnModel};
use crate::config::PipelineConfig;
use crate::dataset::{load_csv, Table};
use crate::error::{ChurnError, Result};
use crate::leakage::drop_leakage_columns;
use crate::metrics::{evaluate, Evaluation};
use crate::model::LogisticRegression;
use crate::preprocessing::{
    ColumnTransformer, FittedTransformer, Pipeline, SimpleImputer, StandardScaler, Transformer,
};
use crate::split::{train_test_split, StratifiedSplit};
use crate::target::resolve_target;
use crate::trainer::{build_thread_pool, FitSummary, Trainer};
use std::path::PathBuf;
use tracing::info;

/// Summary of a completed training run.
#[derive(Clone, Debug)]
pub struct TrainingReport {
    pub target_column: String,
    /// Leakage columns removed from the features (target excluded).
    pub dropped_columns: Vec<String>,
    /// Feature columns fed to the preprocessor.
    pub n_input_features: usize,
    /// Width of the preprocessed matrix.
    pub n_model_features: usize,
    pub n_train: usize,
    pub n_test: usize,
    /// Share of positive labels in the test partition.
    pub test_positive_rate: f64,
    pub fit: FitSummary,
    pub evaluation: Evaluation,
}

/// A fitted, evaluated, not yet persisted pipeline.
#[derive(Clone, Debug)]
pub struct TrainedPipeline {
    pub model: ChurnModel,
    pub report: TrainingReport,
}

/// Outcome of [`run`].
#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub artifact_path: PathBuf,
    pub report: TrainingReport,
}

/// Fit and evaluate the baseline on an in-memory table.
pub fn train(config: &PipelineConfig, table: &Table) -> Result<TrainedPipeline> {
    let (target_column, labels) = resolve_target(table, &config.target_candidates)?;
    let positives = labels.iter().filter(|&&y| y == 1).count();
    info!(
        target = %target_column,
        rows = labels.len(),
        positives,
        "resolved target column"
    );

    let filtered = drop_leakage_columns(table, &target_column, &config.leakage_columns);
    let dropped_columns: Vec<String> = filtered
        .dropped
        .into_iter()
        .filter(|name| *name != target_column)
        .collect();

    let split = train_test_split(
        &filtered.features,
        &labels,
        &StratifiedSplit::new(config.test_fraction, config.seed),
    )?;

    let numeric = Pipeline::new()
        .add_simple_imputer(SimpleImputer::new(config.impute_strategy))
        .add_standard_scaler(StandardScaler::new());
    let preprocessor = ColumnTransformer::new(numeric)
        .with_encode_categorical(config.encode_categorical)
        .fit(&split.x_train)?;
    let x_train = preprocessor.transform(&split.x_train)?;
    let x_test = preprocessor.transform(&split.x_test)?;
    info!(
        input_features = preprocessor.n_features_in(),
        model_features = x_train.ncols(),
        "features prepared"
    );
    if x_train.ncols() == 0 {
        return Err(ChurnError::Configuration(format!(
            "no model features after preprocessing (input columns: {:?}, encode_categorical: {})",
            preprocessor.input_columns(),
            config.encode_categorical
        )));
    }

    let trainer = Trainer::builder()
        .max_iter(config.max_iter)
        .tol(config.tol)
        .c(config.c)
        .seed(config.seed)
        .max_workers(config.max_workers)
        .build()?;
    let (classifier, fit) = trainer.fit_with_summary(
        LogisticRegression::new(x_train.ncols()),
        &x_train,
        &split.y_train,
    )?;

    let pool = build_thread_pool(config.max_workers)?;
    let scores = pool.install(|| classifier.predict_proba(&x_test))?.to_vec();
    let evaluation = evaluate(&split.y_test, &scores)?;
    info!(
        roc_auc = evaluation.roc_auc,
        pr_auc = evaluation.pr_auc,
        "held-out evaluation"
    );

    let n_test = split.y_test.len();
    let report = TrainingReport {
        target_column: target_column.clone(),
        dropped_columns: dropped_columns.clone(),
        n_input_features: preprocessor.n_features_in(),
        n_model_features: x_train.ncols(),
        n_train: split.y_train.len(),
        n_test,
        test_positive_rate: split.y_test.iter().filter(|&&y| y == 1).count() as f64
            / n_test as f64,
        fit,
        evaluation,
    };

    let metadata = ArtifactMetadata {
        target_column,
        dropped_columns,
        seed: config.seed,
        test_fraction: config.test_fraction,
        n_train: report.n_train,
        crate_version: env!("CARGO_PKG_VERSION").to_string(),
    };
    let model = ChurnModel::new(preprocessor, classifier, metadata)?;

    Ok(TrainedPipeline { model, report })
}

/// Run the whole job: load `config.data_path`, train, evaluate and write the
/// artifact to `config.artifact_path`.
pub fn run(config: &PipelineConfig) -> Result<RunOutcome> {
    info!(config = ?config, "starting churn baseline");
    let table = load_csv(&config.data_path)?;
    let TrainedPipeline { model, report } = train(config, &table)?;

    save_artifact(&model, &config.artifact_path, config.artifact_format)?;

    Ok(RunOutcome {
        artifact_path: config.artifact_path.clone(),
        report,
    })
}
