//! Labeled symptom datasets for training and inference.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod export;
pub mod loader;

/// A single `text → diagnosis` training example.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledRecord {
    /// Free-text symptom description.
    pub text: String,
    /// Diagnosis label attached to the text.
    pub label: String,
    /// Embedding vector, present once the record has been processed.
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

/// Errors raised by dataset consistency checks.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The dataset holds no records.
    #[error("dataset is empty")]
    Empty,
    /// Gateway output does not line up with the records.
    #[error("expected {expected} embeddings, got {actual}")]
    EmbeddingCountMismatch { expected: usize, actual: usize },
    /// Embedding dimensionality is not uniform across records.
    #[error("record {row} has embedding dimension {actual}, expected {expected}")]
    InconsistentDimension {
        row: usize,
        expected: usize,
        actual: usize,
    },
    /// A record has not been embedded yet.
    #[error("record {0} has no embedding; process the dataset first")]
    MissingEmbedding(usize),
}

/// Ordered collection of labeled records.
///
/// Insertion order is preserved for export; training does not depend on it.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<LabeledRecord>,
}

impl Dataset {
    /// Wrap a record collection.
    pub fn new(records: Vec<LabeledRecord>) -> Self {
        Self { records }
    }

    /// Build a dataset from `(text, label)` pairs with no embeddings yet.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            records: pairs
                .into_iter()
                .map(|(text, label)| LabeledRecord {
                    text,
                    label,
                    embedding: None,
                })
                .collect(),
        }
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[LabeledRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Texts in record order, as gateway input.
    pub fn texts(&self) -> Vec<String> {
        self.records.iter().map(|record| record.text.clone()).collect()
    }

    /// Labels in record order.
    pub fn labels(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|record| record.label.clone())
            .collect()
    }

    /// Attach gateway output to the records, in order.
    ///
    /// Replaces any previously attached embeddings. The vectors must match
    /// the record count and share one dimensionality.
    pub fn attach_embeddings(&mut self, vectors: Vec<Vec<f32>>) -> Result<(), DatasetError> {
        if vectors.len() != self.records.len() {
            return Err(DatasetError::EmbeddingCountMismatch {
                expected: self.records.len(),
                actual: vectors.len(),
            });
        }
        if let Some(first) = vectors.first() {
            let dim = first.len();
            for (row, vector) in vectors.iter().enumerate() {
                if vector.len() != dim {
                    return Err(DatasetError::InconsistentDimension {
                        row,
                        expected: dim,
                        actual: vector.len(),
                    });
                }
            }
        }
        for (record, vector) in self.records.iter_mut().zip(vectors) {
            record.embedding = Some(vector);
        }
        Ok(())
    }

    /// Embedding dimensionality, if any record is embedded.
    pub fn embedding_dim(&self) -> Option<usize> {
        self.records
            .iter()
            .find_map(|record| record.embedding.as_ref().map(Vec::len))
    }

    /// Embedded rows in record order; every record must be embedded and all
    /// dimensions uniform.
    pub fn embedded_rows(&self) -> Result<Vec<Vec<f32>>, DatasetError> {
        if self.records.is_empty() {
            return Err(DatasetError::Empty);
        }
        let mut rows = Vec::with_capacity(self.records.len());
        let mut dim: Option<usize> = None;
        for (row_idx, record) in self.records.iter().enumerate() {
            let embedding = record
                .embedding
                .as_ref()
                .ok_or(DatasetError::MissingEmbedding(row_idx))?;
            match dim {
                None => dim = Some(embedding.len()),
                Some(expected) if embedding.len() != expected => {
                    return Err(DatasetError::InconsistentDimension {
                        row: row_idx,
                        expected,
                        actual: embedding.len(),
                    });
                }
                Some(_) => {}
            }
            rows.push(embedding.clone());
        }
        Ok(rows)
    }
}
