//! Solvers for regularized logistic regression.
//!
//! Training logic (epochs, sampling, convergence) lives in
//! [`Trainer`](crate::trainer::Trainer); a solver only knows how to apply one
//! parameter update.

pub mod saga;

pub use saga::{max_squared_row_norm, saga_step_size, Saga};
