//! Session aggregate: the trained pipeline, prediction history, and tier
//! thresholds, passed explicitly into every operation.

use thiserror::Error;

use crate::dataset::{Dataset, DatasetError};
use crate::ml::labels::{LabelCodec, LabelCodecError};
use crate::ml::logreg::{
    LogRegModel, PredictError, TrainError, TrainOptions, TrainingReport, train_logreg,
};
use crate::ml::scaler::{FeatureScaler, ScalerError};
use crate::provider::{EmbeddingClient, ProviderError};
use crate::triage::history::{HistoryAggregator, HistoryEntry};
use crate::triage::{Tier, TierThresholds};

/// Errors surfaced by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No trained model yet; train the session first.
    #[error("no trained model; train the session first")]
    NotFitted,
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),
    #[error("label codec error: {0}")]
    Labels(#[from] LabelCodecError),
    #[error("scaler error: {0}")]
    Scaler(#[from] ScalerError),
    #[error("training error: {0}")]
    Train(#[from] TrainError),
    #[error("prediction error: {0}")]
    Predict(#[from] PredictError),
}

/// Codec, scaler, and classifier from one fit cycle.
///
/// Always built and replaced as a unit: its parts reference each other's
/// class codes and dimensionality, so partial updates are never valid.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    codec: LabelCodec,
    scaler: FeatureScaler,
    model: LogRegModel,
    report: TrainingReport,
}

impl TrainedModel {
    /// Label codec fitted in this cycle.
    pub fn codec(&self) -> &LabelCodec {
        &self.codec
    }

    /// Feature scaler fitted in this cycle.
    pub fn scaler(&self) -> &FeatureScaler {
        &self.scaler
    }

    /// Classifier parameters fitted in this cycle.
    pub fn model(&self) -> &LogRegModel {
        &self.model
    }

    /// Evaluation report from this cycle.
    pub fn report(&self) -> &TrainingReport {
        &self.report
    }

    /// Embedding dimensionality the pipeline expects.
    pub fn embedding_dim(&self) -> usize {
        self.model.embedding_dim
    }
}

/// One diagnostic prediction with its banded confidence.
#[derive(Debug, Clone)]
pub struct Diagnosis {
    /// Predicted condition label.
    pub condition: String,
    /// Confidence in `[0, 1]` (the maximum class probability).
    pub confidence: f32,
    /// Risk tier of the confidence under the session thresholds.
    pub tier: Tier,
    /// Full class-probability distribution in class-code order.
    pub probabilities: Vec<f32>,
}

/// Mutable pipeline state for one sitting.
///
/// The trained model is swapped as a whole by [`Session::train`]; the history
/// log lives independently of the model lifecycle.
#[derive(Debug, Default)]
pub struct Session {
    trained: Option<TrainedModel>,
    /// Append-only prediction log.
    pub history: HistoryAggregator,
    /// Confidence tier configuration.
    pub thresholds: TierThresholds,
}

impl Session {
    /// Create an untrained session with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a trained model is available.
    pub fn is_trained(&self) -> bool {
        self.trained.is_some()
    }

    /// The current trained model, if any.
    pub fn trained(&self) -> Option<&TrainedModel> {
        self.trained.as_ref()
    }

    /// The current training report, if any.
    pub fn training_report(&self) -> Option<&TrainingReport> {
        self.trained.as_ref().map(TrainedModel::report)
    }

    /// Fit codec, scaler, and classifier on an embedded dataset, replacing
    /// any previous model as a single unit.
    pub fn train(
        &mut self,
        dataset: &Dataset,
        options: &TrainOptions,
    ) -> Result<&TrainingReport, SessionError> {
        let rows = dataset.embedded_rows()?;
        let labels = dataset.labels();

        let mut codec = LabelCodec::default();
        codec.fit(&labels)?;
        let codes = codec.encode(&labels)?;

        let mut scaler = FeatureScaler::default();
        scaler.fit(&rows)?;
        let scaled = scaler.transform(&rows)?;

        let (model, report) = train_logreg(&scaled, &codes, codec.num_classes(), options)?;
        tracing::info!(
            classes = codec.num_classes(),
            accuracy = report.accuracy,
            "trained diagnosis model"
        );

        let trained = self.trained.insert(TrainedModel {
            codec,
            scaler,
            model,
            report,
        });
        Ok(&trained.report)
    }

    /// Classify one raw (unscaled) embedding with the trained pipeline.
    ///
    /// This is the provider-free inner step of [`Session::diagnose`]; it does
    /// not touch the history log.
    pub fn classify_embedding(&self, embedding: &[f32]) -> Result<Diagnosis, SessionError> {
        let trained = self.trained.as_ref().ok_or(SessionError::NotFitted)?;
        let scaled = trained.scaler.transform_one(embedding)?;
        let (code, probabilities) = trained.model.predict(&scaled)?;
        let condition = trained.codec.decode_one(code)?.to_string();
        let confidence = probabilities[code];
        let tier = self.thresholds.band(confidence * 100.0);
        Ok(Diagnosis {
            condition,
            confidence,
            tier,
            probabilities,
        })
    }

    /// Embed symptom text, classify it, and log the prediction.
    pub fn diagnose(
        &mut self,
        embeddings: &EmbeddingClient,
        text: &str,
    ) -> Result<Diagnosis, SessionError> {
        if !self.is_trained() {
            return Err(SessionError::NotFitted);
        }
        let embedding = embeddings.embed_one(text)?;
        let diagnosis = self.classify_embedding(&embedding)?;
        self.history.append(HistoryEntry::new(
            text,
            &diagnosis.condition,
            diagnosis.confidence,
        ));
        Ok(diagnosis)
    }
}

/// Embed every record of a dataset through the gateway, in order.
pub fn embed_dataset(
    client: &EmbeddingClient,
    dataset: &mut Dataset,
    chunk_size: usize,
) -> Result<(), SessionError> {
    let texts = dataset.texts();
    let vectors = client.embed_batch(&texts, chunk_size)?;
    dataset.attach_embeddings(vectors)?;
    Ok(())
}
