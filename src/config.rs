//! Provider configuration: a TOML file with an environment override for the
//! API key so credentials stay out of checked-in config.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default filename probed for configuration.
pub const CONFIG_FILE_NAME: &str = "dxassist.toml";
/// Environment variable that supplies (or overrides) the provider API key.
pub const API_KEY_ENV: &str = "DXASSIST_API_KEY";

fn default_base_url() -> String {
    "https://api.mistral.ai".to_string()
}

fn default_embedding_model() -> String {
    "mistral-embed".to_string()
}

fn default_chat_model() -> String {
    "mistral-medium".to_string()
}

fn default_chunk_size() -> usize {
    50
}

/// Connection settings for the external embedding/chat provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Bearer token for the provider API.
    #[serde(default)]
    pub api_key: String,
    /// Base URL of the provider; endpoints are appended to it.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model id used for text embeddings.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    /// Model id used for free-text condition descriptions.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    /// Maximum number of texts per embedding request.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            embedding_model: default_embedding_model(),
            chat_model: default_chat_model(),
            chunk_size: default_chunk_size(),
        }
    }
}

/// Errors that may occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Config file is not valid TOML for this schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// No API key in either the file or the environment.
    #[error("No API key configured; set {API_KEY_ENV} or api_key in the config file")]
    MissingApiKey,
    /// A zero chunk size can never satisfy the provider batch contract.
    #[error("chunk_size must be greater than zero")]
    ZeroChunkSize,
}

impl ProviderConfig {
    /// Load configuration from an optional TOML file, then apply the
    /// environment override for the API key.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                toml::from_str(&text)?
            }
            None => Self::default(),
        };
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                config.api_key = key;
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Validate that the configuration can drive provider calls.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        Ok(())
    }
}
