//! Multinomial logistic regression over scaled embedding vectors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod train;
pub use train::{TrainError, TrainOptions, TrainingReport, train_logreg};

/// Errors raised at prediction time.
#[derive(Debug, Error)]
pub enum PredictError {
    /// The input's dimensionality differs from the fitted dimensionality.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Fitted multinomial logistic regression parameters.
///
/// Owns only its parameters; no training data is retained after fitting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRegModel {
    /// Input dimensionality D.
    pub embedding_dim: usize,
    /// Row-major `[n_classes * embedding_dim]` weight matrix.
    pub weights: Vec<f32>,
    /// Per-class bias terms.
    pub bias: Vec<f32>,
}

impl LogRegModel {
    /// Number of classes K.
    pub fn num_classes(&self) -> usize {
        self.bias.len()
    }

    /// Compute the class-probability distribution for one scaled embedding.
    pub fn predict_proba(&self, x: &[f32]) -> Result<Vec<f32>, PredictError> {
        if x.len() != self.embedding_dim {
            return Err(PredictError::DimensionMismatch {
                expected: self.embedding_dim,
                actual: x.len(),
            });
        }
        let classes = self.num_classes();
        let mut logits = vec![0.0f32; classes];
        for c in 0..classes {
            let base = c * self.embedding_dim;
            let mut sum = self.bias[c];
            for i in 0..self.embedding_dim {
                sum += self.weights[base + i] * x[i];
            }
            logits[c] = sum;
        }
        Ok(softmax(&logits))
    }

    /// Predict the argmax class code plus the full distribution.
    pub fn predict(&self, x: &[f32]) -> Result<(usize, Vec<f32>), PredictError> {
        let proba = self.predict_proba(x)?;
        let mut best = 0usize;
        let mut best_val = f32::NEG_INFINITY;
        for (idx, &p) in proba.iter().enumerate() {
            if p > best_val {
                best_val = p;
                best = idx;
            }
        }
        Ok((best, proba))
    }
}

/// Numerically stable softmax over raw logits.
pub fn softmax(raw: &[f32]) -> Vec<f32> {
    if raw.is_empty() {
        return Vec::new();
    }
    let max = raw.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut out = vec![0.0f32; raw.len()];
    let mut sum = 0.0f32;
    for (slot, &value) in out.iter_mut().zip(raw) {
        let e = (value - max).exp();
        *slot = e;
        sum += e;
    }
    if sum == 0.0 {
        let uniform = 1.0 / raw.len() as f32;
        for value in &mut out {
            *value = uniform;
        }
        return out;
    }
    for value in &mut out {
        *value /= sum;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_model(dim: usize, classes: usize) -> LogRegModel {
        LogRegModel {
            embedding_dim: dim,
            weights: vec![0.0; classes * dim],
            bias: vec![0.0; classes],
        }
    }

    #[test]
    fn softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn softmax_is_shift_invariant() {
        let a = softmax(&[0.0, 1.0]);
        let b = softmax(&[100.0, 101.0]);
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn distribution_has_one_entry_per_class() {
        let model = zero_model(4, 3);
        let probs = model.predict_proba(&[0.0; 4]).unwrap();
        assert_eq!(probs.len(), 3);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn predict_rejects_wrong_dimensionality() {
        let model = zero_model(4, 2);
        assert!(matches!(
            model.predict(&[0.0; 3]),
            Err(PredictError::DimensionMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn predict_returns_argmax_code() {
        let mut model = zero_model(2, 2);
        // Class 1 responds strongly to the second feature.
        model.weights = vec![1.0, 0.0, 0.0, 1.0];
        let (code, probs) = model.predict(&[0.0, 3.0]).unwrap();
        assert_eq!(code, 1);
        assert!(probs[1] > probs[0]);
    }
}
