//! Churn baseline - command-line entry point.
//!
//! Trains on `data/raw/churn.csv` under the current directory and writes
//! `models/baseline_logreg.joblib`. Diagnostics go to stderr; stdout carries
//! only the result lines.

use anyhow::Context;
use churnsense::config::PipelineConfig;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "churnsense=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = PipelineConfig::default();
    let outcome = churnsense::pipeline::run(&config)
        .with_context(|| format!("training on {} failed", config.data_path.display()))?;

    println!("✅ Saved model: {}", outcome.artifact_path.display());
    println!("ROC-AUC: {:.4}", outcome.report.evaluation.roc_auc);
    println!("PR-AUC : {:.4}", outcome.report.evaluation.pr_auc);
    Ok(())
}
