mod common;

use churnsense::artifact::{load_artifact, ArtifactFormat};
use churnsense::config::PipelineConfig;
use churnsense::pipeline::{run, train};
use churnsense::preprocessing::FittedTransformer;
use churnsense::split::StratifiedSplit;
use common::{customers, to_csv, to_table, write_dataset};
use std::process::Command;

#[test]
fn test_synthetic_run_end_to_end() {
    let root = tempfile::tempdir().unwrap();
    write_dataset(root.path(), &to_csv(&customers(1000, 1), "ChurnLabel"));

    let config = PipelineConfig::for_project_root(root.path());
    let outcome = run(&config).unwrap();
    let report = &outcome.report;

    assert_eq!(report.target_column, "ChurnLabel");
    assert_eq!(report.dropped_columns, vec!["ChurnScore"]);
    // CustomerID, tenure, MonthlyCharges, Contract, Partner
    assert_eq!(report.n_input_features, 5);
    assert_eq!(report.n_model_features, 2);
    assert_eq!(report.n_train, 800);
    assert_eq!(report.n_test, 200);
    assert!((report.test_positive_rate - 0.3).abs() < 1e-12);

    let eval = report.evaluation;
    assert!((0.0..=1.0).contains(&eval.roc_auc));
    assert!((0.0..=1.0).contains(&eval.pr_auc));
    // tenure and charges separate the classes well
    assert!(eval.roc_auc > 0.8, "roc_auc = {}", eval.roc_auc);
    assert!(eval.pr_auc > 0.3);

    assert_eq!(
        outcome.artifact_path,
        root.path().join("models").join("baseline_logreg.joblib")
    );
    let model = load_artifact(&outcome.artifact_path).unwrap();
    assert_eq!(model.metadata().target_column, "ChurnLabel");
    assert_eq!(model.metadata().n_train, 800);
    assert_eq!(model.metadata().dropped_columns, vec!["ChurnScore"]);
}

#[test]
fn test_artifact_scores_raw_tables() {
    let root = tempfile::tempdir().unwrap();
    let data = customers(400, 2);
    write_dataset(root.path(), &to_csv(&data, "ChurnLabel"));

    let outcome = run(&PipelineConfig::for_project_root(root.path())).unwrap();
    let model = load_artifact(&outcome.artifact_path).unwrap();

    // the target and leakage columns are ignored when scoring
    let proba = model.predict_proba(&to_table(&data)).unwrap();
    assert_eq!(proba.len(), 400);
    assert!(proba.iter().all(|p| (0.0..=1.0).contains(p)));
}

#[test]
fn test_reruns_are_reproducible() {
    let table = to_table(&customers(500, 3));
    let config = PipelineConfig::default();

    let first = train(&config, &table).unwrap();
    let second = train(&config, &table).unwrap();

    assert_eq!(
        first.model.classifier().coef(),
        second.model.classifier().coef()
    );
    assert_eq!(first.report.evaluation, second.report.evaluation);
}

#[test]
fn test_worker_count_does_not_change_model() {
    let table = to_table(&customers(300, 4));
    let one = train(&PipelineConfig::default().with_max_workers(Some(1)), &table).unwrap();
    let many = train(&PipelineConfig::default().with_max_workers(Some(3)), &table).unwrap();

    assert_eq!(one.model.classifier().coef(), many.model.classifier().coef());
    assert_eq!(one.report.evaluation, many.report.evaluation);
}

#[test]
fn test_test_rows_do_not_influence_fit() {
    let base = customers(500, 5);
    let labels: Vec<u8> = base.iter().map(|c| c.churned as u8).collect();
    let test_rows = StratifiedSplit::new(0.2, 42).split(&labels).unwrap().test;

    let mut perturbed = base.clone();
    for &i in &test_rows {
        perturbed[i].tenure = Some(10_000.0);
        perturbed[i].monthly_charges = None;
    }

    let config = PipelineConfig::default();
    let a = train(&config, &to_table(&base)).unwrap();
    let b = train(&config, &to_table(&perturbed)).unwrap();

    let params_json = |model: &churnsense::artifact::ChurnModel| {
        serde_json::to_string(&model.preprocessor().extract_params()).unwrap()
    };
    assert_eq!(params_json(&a.model), params_json(&b.model));
    assert_eq!(a.model.classifier().coef(), b.model.classifier().coef());
    assert_eq!(a.model.classifier().intercept(), b.model.classifier().intercept());
}

#[test]
fn test_encode_categorical_adds_one_hot_features() {
    let table = to_table(&customers(200, 6));
    let config = PipelineConfig::default().with_encode_categorical(true);
    let trained = train(&config, &table).unwrap();

    // 2 numeric + Partner (2) + Contract (3) + one column per training CustomerID
    let preprocessor = trained.model.preprocessor();
    assert!(preprocessor.encodes_categorical());
    assert_eq!(preprocessor.numeric_columns(), ["tenure", "MonthlyCharges"]);
    assert_eq!(
        trained.report.n_model_features,
        2 + 2 + 3 + trained.report.n_train
    );
    assert!((0.0..=1.0).contains(&trained.report.evaluation.roc_auc));
}

#[test]
fn test_bincode_artifact_run() {
    let root = tempfile::tempdir().unwrap();
    write_dataset(root.path(), &to_csv(&customers(300, 7), "Churn"));

    let config = PipelineConfig::for_project_root(root.path())
        .with_artifact_format(ArtifactFormat::Bincode);
    let outcome = run(&config).unwrap();
    assert_eq!(outcome.report.target_column, "Churn");

    let model = load_artifact(&outcome.artifact_path).unwrap();
    assert_eq!(model.metadata().target_column, "Churn");
}

#[test]
fn test_binary_prints_three_lines() {
    let root = tempfile::tempdir().unwrap();
    write_dataset(root.path(), &to_csv(&customers(300, 8), "ChurnLabel"));

    let output = Command::new(env!("CARGO_BIN_EXE_churnsense"))
        .current_dir(root.path())
        .env_remove("RUST_LOG")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("✅ Saved model: "));
    assert!(lines[0].ends_with("baseline_logreg.joblib"));
    assert!(lines[1].starts_with("ROC-AUC: "));
    assert!(lines[2].starts_with("PR-AUC : "));
    // four decimals
    assert_eq!(lines[1].trim_start_matches("ROC-AUC: ").len(), 6);
    assert!(root
        .path()
        .join("models")
        .join("baseline_logreg.joblib")
        .exists());
}
