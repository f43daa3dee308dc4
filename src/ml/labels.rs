//! Bidirectional mapping between diagnosis labels and dense class codes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by label encoding and decoding.
#[derive(Debug, Error)]
pub enum LabelCodecError {
    /// The codec was used before `fit`.
    #[error("label codec has not been fitted")]
    NotFitted,
    /// `fit` was called with no labels.
    #[error("cannot fit a label codec on an empty label set")]
    EmptyLabelSet,
    /// A label was never seen during `fit`.
    #[error("unknown label `{0}`")]
    UnknownLabel(String),
    /// A class code was never assigned during `fit`.
    #[error("unknown class code {0}")]
    UnknownCode(usize),
}

/// Bijection between string labels and dense `0..K` class codes.
///
/// Codes are assigned in sorted order over the distinct labels, so a given
/// label set always produces the same mapping. Re-fitting replaces the
/// mapping entirely; models trained against the old codes must be retrained
/// with it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelCodec {
    classes: Vec<String>,
}

impl LabelCodec {
    /// Build the mapping over the distinct values in `labels`.
    pub fn fit(&mut self, labels: &[String]) -> Result<(), LabelCodecError> {
        if labels.is_empty() {
            return Err(LabelCodecError::EmptyLabelSet);
        }
        let mut classes = labels.to_vec();
        classes.sort();
        classes.dedup();
        self.classes = classes;
        Ok(())
    }

    /// Whether `fit` has produced a mapping.
    pub fn is_fitted(&self) -> bool {
        !self.classes.is_empty()
    }

    /// Distinct labels in code order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Number of distinct classes K.
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// Encode one label to its class code.
    pub fn encode_one(&self, label: &str) -> Result<usize, LabelCodecError> {
        if !self.is_fitted() {
            return Err(LabelCodecError::NotFitted);
        }
        self.classes
            .binary_search_by(|class| class.as_str().cmp(label))
            .map_err(|_| LabelCodecError::UnknownLabel(label.to_string()))
    }

    /// Encode a label sequence, preserving order.
    pub fn encode(&self, labels: &[String]) -> Result<Vec<usize>, LabelCodecError> {
        labels.iter().map(|label| self.encode_one(label)).collect()
    }

    /// Decode one class code back to its label.
    pub fn decode_one(&self, code: usize) -> Result<&str, LabelCodecError> {
        if !self.is_fitted() {
            return Err(LabelCodecError::NotFitted);
        }
        self.classes
            .get(code)
            .map(String::as_str)
            .ok_or(LabelCodecError::UnknownCode(code))
    }

    /// Decode a code sequence, preserving order.
    pub fn decode(&self, codes: &[usize]) -> Result<Vec<String>, LabelCodecError> {
        codes
            .iter()
            .map(|&code| self.decode_one(code).map(str::to_string))
            .collect()
    }
}
