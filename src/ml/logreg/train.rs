use rand::rngs::StdRng;
use rand::{Rng, SeedableRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{LogRegModel, PredictError, softmax};
use crate::ml::metrics::{ConfusionMatrix, accuracy};

/// Training options for the diagnosis classifier.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// Fraction of the data held out for evaluation, in `(0, 1)`.
    pub test_fraction: f32,
    /// Gradient-descent step size.
    pub learning_rate: f32,
    /// L2 penalty applied to weights (not biases).
    pub l2: f32,
    /// Iteration cap for gradient descent.
    pub max_iterations: usize,
    /// Loss-improvement threshold that counts as convergence.
    pub tolerance: f32,
    /// Seed for the split and weight initialization.
    pub seed: u64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            learning_rate: 0.1,
            l2: 1e-4,
            max_iterations: 500,
            tolerance: 1e-5,
            seed: 0,
        }
    }
}

/// Evaluation summary for one training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Exact-match fraction on the held-out partition.
    pub accuracy: f32,
    /// Reported as the same exact-match fraction as `accuracy`, not a
    /// per-class precision; downstream consumers rely on this definition.
    pub precision: f32,
    /// Whether the loss improvement dropped below tolerance before the cap.
    pub converged: bool,
    /// Gradient-descent iterations actually run.
    pub iterations: usize,
    /// Samples in the training partition.
    pub train_size: usize,
    /// Samples in the held-out partition.
    pub test_size: usize,
}

/// Errors raised by classifier training.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("empty training set")]
    EmptyDataset,
    #[error("mismatched inputs: {inputs} rows, {labels} labels")]
    LengthMismatch { inputs: usize, labels: usize },
    #[error("test_fraction must be in (0, 1), got {0}")]
    BadTestFraction(f32),
    #[error("need at least 2 distinct classes, got {0}")]
    TooFewClasses(usize),
    #[error("need at least 2 samples to split, got {0}")]
    TooFewSamples(usize),
    #[error("row {row} has {actual} features, expected {expected}")]
    RaggedInput {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("label {label} out of range for {classes} classes")]
    LabelOutOfRange { label: usize, classes: usize },
    #[error(transparent)]
    Predict(#[from] PredictError),
}

/// Fit a multinomial logistic regression on scaled embeddings.
///
/// Splits `(x, y)` into train/holdout partitions by uniform sampling without
/// replacement (no stratification), minimizes the softmax cross-entropy with
/// L2 by batch gradient descent, and evaluates on the holdout. Hitting the
/// iteration cap is not fatal: the lowest-loss iterate seen is kept.
pub fn train_logreg(
    x: &[Vec<f32>],
    y: &[usize],
    n_classes: usize,
    options: &TrainOptions,
) -> Result<(LogRegModel, TrainingReport), TrainError> {
    if x.is_empty() || y.is_empty() {
        return Err(TrainError::EmptyDataset);
    }
    if x.len() != y.len() {
        return Err(TrainError::LengthMismatch {
            inputs: x.len(),
            labels: y.len(),
        });
    }
    if n_classes < 2 {
        return Err(TrainError::TooFewClasses(n_classes));
    }
    if !(options.test_fraction > 0.0 && options.test_fraction < 1.0) {
        return Err(TrainError::BadTestFraction(options.test_fraction));
    }
    let n = x.len();
    if n < 2 {
        return Err(TrainError::TooFewSamples(n));
    }
    let dim = x[0].len();
    for (row_idx, row) in x.iter().enumerate() {
        if row.len() != dim {
            return Err(TrainError::RaggedInput {
                row: row_idx,
                expected: dim,
                actual: row.len(),
            });
        }
    }
    for &label in y {
        if label >= n_classes {
            return Err(TrainError::LabelOutOfRange {
                label,
                classes: n_classes,
            });
        }
    }

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut rng);
    let test_len = (((n as f32) * options.test_fraction).round() as usize).clamp(1, n - 1);
    let (test_idx, train_idx) = indices.split_at(test_len);

    let mut weights = vec![0.0f32; n_classes * dim];
    let mut bias = vec![0.0f32; n_classes];
    for w in &mut weights {
        *w = (rng.random::<f32>() - 0.5) * 0.01;
    }

    let lr = options.learning_rate;
    let l2 = options.l2.max(0.0);
    let inv_train = 1.0 / train_idx.len() as f32;

    let mut best_loss = f32::INFINITY;
    let mut best_weights = weights.clone();
    let mut best_bias = bias.clone();
    let mut prev_loss = f32::INFINITY;
    let mut converged = false;
    let mut iterations = 0usize;

    let mut logits = vec![0.0f32; n_classes];
    for iteration in 0..options.max_iterations {
        iterations = iteration + 1;
        let mut grad_w = vec![0.0f32; weights.len()];
        let mut grad_b = vec![0.0f32; bias.len()];
        let mut loss = 0.0f32;

        for &idx in train_idx {
            let row = &x[idx];
            let target = y[idx];
            for c in 0..n_classes {
                let base = c * dim;
                let mut sum = bias[c];
                for i in 0..dim {
                    sum += weights[base + i] * row[i];
                }
                logits[c] = sum;
            }
            let probs = softmax(&logits);
            loss -= probs[target].max(1e-12).ln();
            for c in 0..n_classes {
                let diff = probs[c] - if c == target { 1.0 } else { 0.0 };
                let base = c * dim;
                for i in 0..dim {
                    grad_w[base + i] += diff * row[i];
                }
                grad_b[c] += diff;
            }
        }

        loss *= inv_train;
        loss += 0.5 * l2 * weights.iter().map(|w| w * w).sum::<f32>();

        if loss < best_loss {
            best_loss = loss;
            best_weights.copy_from_slice(&weights);
            best_bias.copy_from_slice(&bias);
        }
        if (prev_loss - loss).abs() < options.tolerance {
            converged = true;
            break;
        }
        prev_loss = loss;

        for c in 0..n_classes {
            let base = c * dim;
            for i in 0..dim {
                let idx = base + i;
                weights[idx] -= lr * (grad_w[idx] * inv_train + l2 * weights[idx]);
            }
            bias[c] -= lr * grad_b[c] * inv_train;
        }
    }
    tracing::debug!(iterations, converged, best_loss, "classifier fit finished");

    let model = LogRegModel {
        embedding_dim: dim,
        weights: best_weights,
        bias: best_bias,
    };

    let mut cm = ConfusionMatrix::new(n_classes);
    let mut exact_matches = 0usize;
    for &idx in test_idx {
        let (predicted, _) = model.predict(&x[idx])?;
        cm.add(y[idx], predicted);
        if predicted == y[idx] {
            exact_matches += 1;
        }
    }
    let holdout_accuracy = accuracy(&cm);
    // Same exact-match fraction computed directly; see TrainingReport docs.
    let precision = exact_matches as f32 / test_idx.len() as f32;

    let report = TrainingReport {
        accuracy: holdout_accuracy,
        precision,
        converged,
        iterations,
        train_size: train_idx.len(),
        test_size: test_idx.len(),
    };
    Ok((model, report))
}
