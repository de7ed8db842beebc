//! Ranking metrics for binary classifiers.

use crate::error::{ChurnError, Result};
use serde::Serialize;

/// Threshold-free scores of a fitted classifier on held-out rows.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Evaluation {
    pub roc_auc: f64,
    /// Average precision, reported as PR-AUC.
    pub pr_auc: f64,
}

/// Cumulative (false positives, true positives) at each distinct score,
/// walking thresholds from the highest score down.
fn confusion_steps(y_true: &[u8], scores: &[f64]) -> Result<(Vec<(f64, f64)>, f64, f64)> {
    if y_true.len() != scores.len() {
        return Err(ChurnError::Evaluation(format!(
            "{} labels but {} scores",
            y_true.len(),
            scores.len()
        )));
    }
    if y_true.is_empty() {
        return Err(ChurnError::Evaluation("no samples to score".to_string()));
    }
    if let Some(bad) = y_true.iter().find(|&&label| label > 1) {
        return Err(ChurnError::Evaluation(format!(
            "labels must be 0 or 1, found {}",
            bad
        )));
    }
    if scores.iter().any(|s| s.is_nan()) {
        return Err(ChurnError::Evaluation("scores contain NaN".to_string()));
    }

    let positives = y_true.iter().filter(|&&label| label == 1).count() as f64;
    let negatives = y_true.len() as f64 - positives;
    if positives == 0.0 || negatives == 0.0 {
        return Err(ChurnError::Evaluation(
            "only one class present in y_true; metric is undefined".to_string(),
        ));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut steps = Vec::new();
    let (mut fp, mut tp) = (0.0, 0.0);
    for (k, &i) in order.iter().enumerate() {
        if y_true[i] == 1 {
            tp += 1.0;
        } else {
            fp += 1.0;
        }
        let last_of_tie = order
            .get(k + 1)
            .map_or(true, |&next| scores[next] != scores[i]);
        if last_of_tie {
            steps.push((fp, tp));
        }
    }
    Ok((steps, positives, negatives))
}

/// Metrics for evaluating probabilistic binary classifiers.
pub struct Metrics;

impl Metrics {
    /// Area under the ROC curve.
    ///
    /// Trapezoidal area over the (FPR, TPR) points of all distinct thresholds,
    /// so tied scores count as half-ordered.
    ///
    /// # Errors
    /// [`ChurnError::Evaluation`] on length mismatch, empty input, NaN scores
    /// or when `y_true` holds a single class.
    pub fn roc_auc(y_true: &[u8], scores: &[f64]) -> Result<f64> {
        let (steps, positives, negatives) = confusion_steps(y_true, scores)?;

        let mut area = 0.0;
        let (mut prev_fpr, mut prev_tpr) = (0.0, 0.0);
        for (fp, tp) in steps {
            let (fpr, tpr) = (fp / negatives, tp / positives);
            area += (fpr - prev_fpr) * (tpr + prev_tpr) / 2.0;
            prev_fpr = fpr;
            prev_tpr = tpr;
        }
        Ok(area)
    }

    /// Average precision: `Σ (R_k − R_{k−1}) P_k` over distinct thresholds
    /// in decreasing order.
    ///
    /// # Errors
    /// Same conditions as [`Metrics::roc_auc`].
    pub fn average_precision(y_true: &[u8], scores: &[f64]) -> Result<f64> {
        let (steps, positives, _) = confusion_steps(y_true, scores)?;

        let mut ap = 0.0;
        let mut prev_recall = 0.0;
        for (fp, tp) in steps {
            let recall = tp / positives;
            let precision = tp / (tp + fp);
            ap += (recall - prev_recall) * precision;
            prev_recall = recall;
        }
        Ok(ap)
    }
}

/// ROC-AUC and average precision in one call.
pub fn evaluate(y_true: &[u8], scores: &[f64]) -> Result<Evaluation> {
    Ok(Evaluation {
        roc_auc: Metrics::roc_auc(y_true, scores)?,
        pr_auc: Metrics::average_precision(y_true, scores)?,
    })
}
