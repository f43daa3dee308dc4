//! Clients for the external embedding and text-generation provider.
//!
//! Both clients are long-lived: construct once, inject, reuse. Every call is
//! a single blocking round trip with no internal retry; the provider meters
//! quota per region, so retry policy belongs to the caller.

use crate::http_client;

mod chat;
mod embeddings;

pub use chat::ChatClient;
pub use embeddings::EmbeddingClient;

const MAX_RESPONSE_BYTES: usize = 8 * 1024 * 1024;

/// Errors surfaced by provider calls. Never retried internally.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The request could not be built or was rejected as invalid.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// API key invalid or missing.
    #[error("API key invalid or missing")]
    Unauthorized,
    /// Quota or rate limit hit; surfaced to the caller, not retried.
    #[error("Rate limited; try again later")]
    RateLimited,
    /// The provider reported a server-side failure.
    #[error("Server error: {0}")]
    ServerError(String),
    /// Transport-level failure before a response arrived.
    #[error("HTTP error: {0}")]
    Transport(String),
    /// The response body could not be read or decoded.
    #[error("JSON error: {0}")]
    Json(String),
    /// The response decoded but violated the embedding contract.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

fn map_status_error(code: u16, body: String) -> ProviderError {
    match code {
        400 | 422 => ProviderError::InvalidRequest(body),
        401 | 403 => ProviderError::Unauthorized,
        429 => ProviderError::RateLimited,
        500..=599 => ProviderError::ServerError(body),
        _ => ProviderError::Transport(format!("HTTP {code}: {body}")),
    }
}

fn post_json<T: serde::Serialize>(
    agent: &ureq::Agent,
    url: &str,
    api_key: &str,
    payload: &T,
) -> Result<String, ProviderError> {
    let request = agent
        .post(url)
        .set("Accept", "application/json")
        .set("Content-Type", "application/json")
        .set("Authorization", &format!("Bearer {}", api_key.trim()));

    let response = match request.send_json(payload) {
        Ok(response) => response,
        Err(ureq::Error::Status(code, response)) => {
            let body = read_body_limited(response).unwrap_or_else(|err| err);
            return Err(map_status_error(code, body));
        }
        Err(ureq::Error::Transport(err)) => {
            return Err(ProviderError::Transport(err.to_string()));
        }
    };

    read_body_limited(response).map_err(ProviderError::Json)
}

fn read_body_limited(response: ureq::Response) -> Result<String, String> {
    let bytes = http_client::read_response_bytes(response, MAX_RESPONSE_BYTES)
        .map_err(|err| err.to_string())?;
    String::from_utf8(bytes).map_err(|err| err.to_string())
}
