/// Marker for a model that has **not been trained yet**.
///
/// Only the trainer consumes `Model<Unfitted>`; prediction methods are not
/// available on it.
#[derive(Clone, Copy, Debug)]
pub struct Unfitted;

/// Marker for a **trained** model.
///
/// A `Model<Fitted>` holds inference parameters only: no solver state,
/// loss or training hyperparameters.
#[derive(Clone, Copy, Debug)]
pub struct Fitted;
