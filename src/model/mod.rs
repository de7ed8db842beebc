//! Classifier models with compile-time training state.

pub mod logistic;
pub mod state;

pub use logistic::{
    LogisticModel, LogisticParams, LogisticRegression, SerializableLogisticParams, CLASSES,
};
pub use state::{Fitted, Unfitted};

/// Interface of a trained model.
pub trait InferenceModel: Sized {
    /// Batch input, one sample per row.
    type InputBatch;
    /// Batch output, one value per row.
    type OutputBatch;
    /// Plain serializable parameters.
    type ParamsRepr;

    /// Fails when the batch does not match the model's input width.
    fn predict_batch(&self, input: &Self::InputBatch) -> crate::Result<Self::OutputBatch>;

    fn extract_params(&self) -> Self::ParamsRepr;

    fn from_params(params: Self::ParamsRepr) -> crate::Result<Self>;
}
