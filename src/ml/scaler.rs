//! Per-feature standardization fitted on training embeddings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by scaler fitting and application.
#[derive(Debug, Error)]
pub enum ScalerError {
    /// `transform` was called before `fit`.
    #[error("scaler has not been fitted")]
    NotFitted,
    /// `fit` was called with no rows or zero-width rows.
    #[error("cannot fit a scaler on an empty matrix")]
    EmptyInput,
    /// The fit input rows do not share one width.
    #[error("row {row} has {actual} features, expected {expected}")]
    RaggedInput {
        row: usize,
        expected: usize,
        actual: usize,
    },
    /// An input's dimensionality differs from the fitted dimensionality.
    #[error("feature dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScalerState {
    mean: Vec<f32>,
    std: Vec<f32>,
}

/// Zero-mean, unit-variance standardization.
///
/// Fit once on the training matrix and reuse unchanged at inference; the
/// state is immutable after `fit`. Columns with zero variance store a
/// standard deviation of 1 so they pass through unscaled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureScaler {
    state: Option<ScalerState>,
}

impl FeatureScaler {
    /// Compute per-column mean and population standard deviation.
    pub fn fit(&mut self, rows: &[Vec<f32>]) -> Result<(), ScalerError> {
        let Some(first) = rows.first() else {
            return Err(ScalerError::EmptyInput);
        };
        let dim = first.len();
        if dim == 0 {
            return Err(ScalerError::EmptyInput);
        }
        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != dim {
                return Err(ScalerError::RaggedInput {
                    row: row_idx,
                    expected: dim,
                    actual: row.len(),
                });
            }
        }

        let n = rows.len() as f32;
        let mut mean = vec![0.0f32; dim];
        for row in rows {
            for (acc, &value) in mean.iter_mut().zip(row) {
                *acc += value;
            }
        }
        for value in &mut mean {
            *value /= n;
        }

        let mut std = vec![0.0f32; dim];
        for row in rows {
            for i in 0..dim {
                let diff = row[i] - mean[i];
                std[i] += diff * diff;
            }
        }
        for value in &mut std {
            *value = (*value / n).sqrt();
            // Constant columns divide by 1 and pass through unchanged.
            if *value == 0.0 {
                *value = 1.0;
            }
        }

        self.state = Some(ScalerState { mean, std });
        Ok(())
    }

    /// Whether `fit` has produced scaler state.
    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    /// Fitted dimensionality D, if any.
    pub fn dim(&self) -> Option<usize> {
        self.state.as_ref().map(|state| state.mean.len())
    }

    /// Standardize one row with the fitted state.
    pub fn transform_one(&self, row: &[f32]) -> Result<Vec<f32>, ScalerError> {
        let state = self.state.as_ref().ok_or(ScalerError::NotFitted)?;
        if row.len() != state.mean.len() {
            return Err(ScalerError::DimensionMismatch {
                expected: state.mean.len(),
                actual: row.len(),
            });
        }
        Ok(row
            .iter()
            .zip(state.mean.iter().zip(&state.std))
            .map(|(&value, (&mean, &std))| (value - mean) / std)
            .collect())
    }

    /// Standardize a matrix row by row.
    pub fn transform(&self, rows: &[Vec<f32>]) -> Result<Vec<Vec<f32>>, ScalerError> {
        rows.iter().map(|row| self.transform_one(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(rows: &[Vec<f32>], index: usize) -> Vec<f32> {
        rows.iter().map(|row| row[index]).collect()
    }

    #[test]
    fn training_matrix_standardizes_to_zero_mean_unit_std() {
        let rows = vec![
            vec![1.0, 10.0],
            vec![2.0, 20.0],
            vec![3.0, 30.0],
            vec![4.0, 40.0],
        ];
        let mut scaler = FeatureScaler::default();
        scaler.fit(&rows).unwrap();
        let scaled = scaler.transform(&rows).unwrap();

        for dim in 0..2 {
            let values = column(&scaled, dim);
            let mean: f32 = values.iter().sum::<f32>() / values.len() as f32;
            let var: f32 =
                values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / values.len() as f32;
            assert!(mean.abs() < 1e-5, "column {dim} mean {mean}");
            assert!((var.sqrt() - 1.0).abs() < 1e-4, "column {dim} std {}", var.sqrt());
        }
    }

    #[test]
    fn zero_variance_column_passes_through() {
        let rows = vec![vec![5.0, 1.0], vec![5.0, 2.0], vec![5.0, 3.0]];
        let mut scaler = FeatureScaler::default();
        scaler.fit(&rows).unwrap();
        let scaled = scaler.transform(&rows).unwrap();
        // (5 - 5) / 1 stays 0 for every row.
        for row in &scaled {
            assert_eq!(row[0], 0.0);
        }
    }

    #[test]
    fn transform_before_fit_fails() {
        let scaler = FeatureScaler::default();
        assert!(matches!(
            scaler.transform_one(&[1.0]),
            Err(ScalerError::NotFitted)
        ));
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let mut scaler = FeatureScaler::default();
        scaler.fit(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert!(matches!(
            scaler.transform_one(&[1.0, 2.0, 3.0]),
            Err(ScalerError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn ragged_fit_input_is_rejected() {
        let mut scaler = FeatureScaler::default();
        assert!(matches!(
            scaler.fit(&[vec![1.0, 2.0], vec![3.0]]),
            Err(ScalerError::RaggedInput { row: 1, .. })
        ));
    }

    #[test]
    fn empty_fit_input_is_rejected() {
        let mut scaler = FeatureScaler::default();
        assert!(matches!(scaler.fit(&[]), Err(ScalerError::EmptyInput)));
    }
}
