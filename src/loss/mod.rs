//! Per-sample losses for margin-based classifiers.
//!
//! A loss maps a raw margin `z = w·x + b` and a target in `{0, 1}` to a scalar,
//! and exposes its derivative with respect to `z`. The solver only ever needs
//! that scalar derivative: the gradient with respect to the weights is
//! `dloss(z, y) * x`.

/// A differentiable loss on a single margin.
pub trait Loss {
    /// Loss value for one sample.
    fn loss(&self, margin: f64, target: f64) -> f64;

    /// Derivative of the loss with respect to the margin: `∂L/∂z`.
    fn grad_wrt_margin(&self, margin: f64, target: f64) -> f64;
}

/// Logistic function `1 / (1 + exp(-z))`, evaluated without overflow.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Binary cross-entropy on logits (log loss).
///
/// Computes `L = -(t * log(σ(z)) + (1-t) * log(1 - σ(z)))`
/// using the stable formulation `max(z,0) - z*t + log(1 + exp(-|z|))`.
///
/// Gradient w.r.t. the logit: `∂L/∂z = σ(z) - t`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogLoss;

impl Loss for LogLoss {
    fn loss(&self, margin: f64, target: f64) -> f64 {
        margin.max(0.0) - margin * target + (-margin.abs()).exp().ln_1p()
    }

    fn grad_wrt_margin(&self, margin: f64, target: f64) -> f64 {
        sigmoid(margin) - target
    }
}
