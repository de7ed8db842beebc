//! Fitted pipeline artifact.
//!
//! A [`ChurnModel`] bundles the fitted [`FittedColumnTransformer`] with the
//! fitted logistic classifier, so raw feature tables can be scored with the
//! exact preprocessing learned at training time.
//!
//! On disk the model is an [`ArtifactEnvelope`]: a tagged, versioned container
//! holding plain parameters only. JSON is the default encoding; bincode is
//! available for compact storage. Both keep `f64` values bit-exact.

use crate::dataset::Table;
use crate::error::{ChurnError, Result};
use crate::model::{Fitted, InferenceModel, LogisticModel, SerializableLogisticParams};
use crate::preprocessing::{ColumnTransformerParams, FittedColumnTransformer, FittedTransformer};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Format tag stored in every artifact.
pub const ARTIFACT_FORMAT: &str = "churnsense.pipeline";
/// Current container version.
pub const ARTIFACT_VERSION: u32 = 1;

/// Encoding of the artifact file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    /// Self-describing JSON.
    #[default]
    Json,
    /// Compact binary via bincode.
    Bincode,
}

/// Provenance of a fitted model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub target_column: String,
    /// Leakage columns that were present and removed before training.
    pub dropped_columns: Vec<String>,
    pub seed: u64,
    pub test_fraction: f64,
    pub n_train: usize,
    pub crate_version: String,
}

/// On-disk container.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArtifactEnvelope {
    pub format: String,
    pub version: u32,
    pub metadata: ArtifactMetadata,
    pub preprocessor: ColumnTransformerParams,
    pub classifier: SerializableLogisticParams,
}

/// Preprocessing plus classifier, ready to score raw feature tables.
#[derive(Clone, Debug)]
pub struct ChurnModel {
    preprocessor: FittedColumnTransformer,
    classifier: LogisticModel<Fitted>,
    metadata: ArtifactMetadata,
}

impl ChurnModel {
    /// Bundle a fitted preprocessor and classifier.
    ///
    /// # Errors
    /// [`ChurnError::Data`] if the classifier width differs from the
    /// preprocessor output.
    pub fn new(
        preprocessor: FittedColumnTransformer,
        classifier: LogisticModel<Fitted>,
        metadata: ArtifactMetadata,
    ) -> Result<Self> {
        if preprocessor.n_features_out() != classifier.n_features() {
            return Err(ChurnError::Data(format!(
                "preprocessor produces {} features but classifier expects {}",
                preprocessor.n_features_out(),
                classifier.n_features()
            )));
        }
        Ok(Self {
            preprocessor,
            classifier,
            metadata,
        })
    }

    pub fn preprocessor(&self) -> &FittedColumnTransformer {
        &self.preprocessor
    }

    pub fn classifier(&self) -> &LogisticModel<Fitted> {
        &self.classifier
    }

    pub fn metadata(&self) -> &ArtifactMetadata {
        &self.metadata
    }

    /// Apply the fitted preprocessing to a raw feature table.
    pub fn preprocess(&self, features: &Table) -> Result<Array2<f64>> {
        Ok(self.preprocessor.transform(features)?)
    }

    /// Positive-class probability for every row of a raw feature table.
    pub fn predict_proba(&self, features: &Table) -> Result<Array1<f64>> {
        let x = self.preprocess(features)?;
        self.classifier.predict_batch(&x)
    }

    pub fn to_envelope(&self) -> ArtifactEnvelope {
        ArtifactEnvelope {
            format: ARTIFACT_FORMAT.to_string(),
            version: ARTIFACT_VERSION,
            metadata: self.metadata.clone(),
            preprocessor: self.preprocessor.extract_params(),
            classifier: self.classifier.extract_params(),
        }
    }

    /// Rebuild a model, checking the format tag and version.
    pub fn from_envelope(envelope: ArtifactEnvelope) -> Result<Self> {
        if envelope.format != ARTIFACT_FORMAT {
            return Err(ChurnError::Serialization(format!(
                "unexpected artifact format '{}', expected '{}'",
                envelope.format, ARTIFACT_FORMAT
            )));
        }
        if envelope.version != ARTIFACT_VERSION {
            return Err(ChurnError::Serialization(format!(
                "unsupported artifact version {}, expected {}",
                envelope.version, ARTIFACT_VERSION
            )));
        }
        let preprocessor = FittedColumnTransformer::from_params(envelope.preprocessor)
            .map_err(|e| ChurnError::Serialization(format!("invalid preprocessor: {}", e)))?;
        let classifier = LogisticModel::<Fitted>::from_params(envelope.classifier)?;
        Self::new(preprocessor, classifier, envelope.metadata)
            .map_err(|e| ChurnError::Serialization(e.to_string()))
    }
}

fn encode(envelope: &ArtifactEnvelope, format: ArtifactFormat) -> Result<Vec<u8>> {
    match format {
        ArtifactFormat::Json => serde_json::to_vec_pretty(envelope)
            .map_err(|e| ChurnError::Serialization(format!("JSON encoding failed: {}", e))),
        ArtifactFormat::Bincode => bincode::serialize(envelope)
            .map_err(|e| ChurnError::Serialization(format!("bincode encoding failed: {}", e))),
    }
}

/// JSON artifacts start with `{`; bincode ones with a length prefix.
fn detect_format(bytes: &[u8]) -> ArtifactFormat {
    match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'{') => ArtifactFormat::Json,
        _ => ArtifactFormat::Bincode,
    }
}

/// Write `model` to `path` atomically.
///
/// Missing parent directories are created. The bytes go to a temporary file
/// in the target directory which is then renamed over `path`, so readers see
/// either the previous artifact or the complete new one.
pub fn save_artifact(model: &ChurnModel, path: &Path, format: ArtifactFormat) -> Result<()> {
    let bytes = encode(&model.to_envelope(), format)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| ChurnError::persistence(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| ChurnError::persistence(dir, e))?;
    tmp.write_all(&bytes)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| ChurnError::persistence(tmp.path(), e))?;
    debug!(tmp = %tmp.path().display(), bytes = bytes.len(), "artifact staged");

    tmp.persist(path)
        .map_err(|e| ChurnError::persistence(path, e.error))?;
    info!(path = %path.display(), ?format, "artifact saved");
    Ok(())
}

/// Read an artifact written by [`save_artifact`] in either format.
pub fn load_artifact(path: &Path) -> Result<ChurnModel> {
    let bytes = fs::read(path).map_err(|e| ChurnError::persistence(path, e))?;
    let envelope: ArtifactEnvelope = match detect_format(&bytes) {
        ArtifactFormat::Json => serde_json::from_slice(&bytes)
            .map_err(|e| ChurnError::Serialization(format!("JSON decoding failed: {}", e)))?,
        ArtifactFormat::Bincode => bincode::deserialize(&bytes)
            .map_err(|e| ChurnError::Serialization(format!("bincode decoding failed: {}", e)))?,
    };
    ChurnModel::from_envelope(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Column, ColumnData};
    use crate::model::LogisticParams;
    use crate::preprocessing::{
        ColumnTransformer, ImputeStrategy, Pipeline, SimpleImputer, StandardScaler, Transformer,
    };

    fn sample_table() -> Table {
        Table::new(vec![
            Column::new(
                "tenure",
                ColumnData::Numeric(vec![1.0, 12.5, f64::NAN, 40.0, 7.25]),
            ),
            Column::new(
                "charges",
                ColumnData::Numeric(vec![29.85, 56.95, 53.85, 42.3, 70.7]),
            ),
            Column::new(
                "Contract",
                ColumnData::Categorical(vec![
                    Some("Month".into()),
                    Some("Year".into()),
                    None,
                    Some("Month".into()),
                    Some("Two year".into()),
                ]),
            ),
        ])
        .unwrap()
    }

    fn sample_model(encode_categorical: bool) -> ChurnModel {
        let table = sample_table();
        let preprocessor = ColumnTransformer::new(
            Pipeline::new()
                .add_simple_imputer(SimpleImputer::new(ImputeStrategy::Median))
                .add_standard_scaler(StandardScaler::new()),
        )
        .with_encode_categorical(encode_categorical)
        .fit(&table)
        .unwrap();
        let n = preprocessor.n_features_out();
        let coef: Vec<f64> = (0..n).map(|j| 0.1 + 1.0 / (3.0 + j as f64)).collect();
        let classifier = LogisticModel::<Fitted>::new(LogisticParams {
            coef: Array1::from(coef),
            intercept: -0.123456789,
        });
        let metadata = ArtifactMetadata {
            target_column: "Churn".to_string(),
            dropped_columns: vec!["ChurnScore".to_string()],
            seed: 42,
            test_fraction: 0.2,
            n_train: 5,
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
        };
        ChurnModel::new(preprocessor, classifier, metadata).unwrap()
    }

    #[test]
    fn test_json_roundtrip_is_bit_identical() {
        let model = sample_model(true);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("model.joblib");

        save_artifact(&model, &path, ArtifactFormat::Json).unwrap();
        let loaded = load_artifact(&path).unwrap();

        let table = sample_table();
        let before = model.predict_proba(&table).unwrap();
        let after = loaded.predict_proba(&table).unwrap();
        for (a, b) in before.iter().zip(after.iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
        assert_eq!(loaded.metadata(), model.metadata());
    }

    #[test]
    fn test_bincode_roundtrip_is_bit_identical() {
        let model = sample_model(false);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");

        save_artifact(&model, &path, ArtifactFormat::Bincode).unwrap();
        let loaded = load_artifact(&path).unwrap();

        let table = sample_table();
        assert_eq!(
            model.predict_proba(&table).unwrap(),
            loaded.predict_proba(&table).unwrap()
        );
    }

    #[test]
    fn test_json_is_self_describing() {
        let model = sample_model(false);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.joblib");
        save_artifact(&model, &path, ArtifactFormat::default()).unwrap();

        let value: serde_json::Value =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(value["format"], ARTIFACT_FORMAT);
        assert_eq!(value["version"], 1);
        assert_eq!(value["metadata"]["target_column"], "Churn");
        assert_eq!(value["classifier"]["classes"], serde_json::json!([0, 1]));
    }

    #[test]
    fn test_overwrite_replaces_previous_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.joblib");
        fs::write(&path, b"stale").unwrap();

        save_artifact(&sample_model(false), &path, ArtifactFormat::Json).unwrap();
        assert!(load_artifact(&path).is_ok());
        // no temporary files left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_wrong_version_rejected() {
        let mut envelope = sample_model(false).to_envelope();
        envelope.version = 2;
        assert!(matches!(
            ChurnModel::from_envelope(envelope),
            Err(ChurnError::Serialization(_))
        ));

        let mut envelope = sample_model(false).to_envelope();
        envelope.format = "something.else".to_string();
        assert!(ChurnModel::from_envelope(envelope).is_err());
    }

    #[test]
    fn test_load_missing_file_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_artifact(&dir.path().join("absent.joblib"));
        assert!(matches!(result, Err(ChurnError::Persistence { .. })));
    }

    #[test]
    fn test_load_garbage_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.joblib");
        fs::write(&path, b"{not json").unwrap();
        assert!(matches!(
            load_artifact(&path),
            Err(ChurnError::Serialization(_))
        ));
    }

    #[test]
    fn test_unwritable_parent_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();
        let result = save_artifact(
            &sample_model(false),
            &blocker.join("model.joblib"),
            ArtifactFormat::Json,
        );
        assert!(matches!(result, Err(ChurnError::Persistence { .. })));
    }

    #[test]
    fn test_width_mismatch_rejected() {
        let model = sample_model(false);
        let classifier = LogisticModel::<Fitted>::new(LogisticParams::zeros(7));
        assert!(ChurnModel::new(
            model.preprocessor().clone(),
            classifier,
            model.metadata().clone()
        )
        .is_err());
    }
}
