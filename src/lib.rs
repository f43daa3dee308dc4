//! Embedding-based symptom triage pipeline: free-text symptom descriptions
//! are embedded by an external provider, classified into probable diagnoses
//! with calibrated confidence, banded into risk tiers, and logged for
//! per-condition reliability analysis.
/// Provider configuration loaded from TOML and the environment.
pub mod config;
/// Labeled symptom datasets plus CSV import/export.
pub mod dataset;
mod http_client;
/// Logging setup shared by the binaries.
pub mod logging;
/// Classifier, scaler, label codec, and evaluation metrics.
pub mod ml;
/// Clients for the external embedding and text-generation provider.
pub mod provider;
/// Session aggregate tying the trained model to history and thresholds.
pub mod session;
/// Confidence tiers and prediction-history analytics.
pub mod triage;
