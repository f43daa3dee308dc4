//! Embedding gateway: batches of texts in, fixed-length vectors out.

use serde::{Deserialize, Serialize};

use super::{ProviderError, post_json};
use crate::config::ProviderConfig;
use crate::http_client;

/// Client for the provider's embedding endpoint.
///
/// Owns no state across calls beyond its HTTP agent; responses are never
/// cached and failed calls are never retried here.
#[derive(Debug)]
pub struct EmbeddingClient {
    agent: ureq::Agent,
    config: ProviderConfig,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequestWire<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponseWire {
    data: Vec<EmbeddingItemWire>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItemWire {
    embedding: Vec<f32>,
}

impl EmbeddingClient {
    /// Create a client for the configured provider. Construct once and reuse.
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            agent: http_client::build_agent(),
            config,
        }
    }

    /// Embed a batch of texts, preserving input order.
    ///
    /// The input is split into contiguous chunks of at most `chunk_size` to
    /// respect the provider's batch limit; one request is issued per chunk
    /// and the results are concatenated in the original order. All returned
    /// vectors must share one dimensionality.
    pub fn embed_batch(
        &self,
        texts: &[String],
        chunk_size: usize,
    ) -> Result<Vec<Vec<f32>>, ProviderError> {
        if chunk_size == 0 {
            return Err(ProviderError::InvalidRequest(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(texts.len());
        let mut dim: Option<usize> = None;
        for chunk in texts.chunks(chunk_size) {
            for vector in self.request_chunk(chunk)? {
                match dim {
                    None => dim = Some(vector.len()),
                    Some(expected) if vector.len() != expected => {
                        return Err(ProviderError::MalformedResponse(format!(
                            "embedding dimensionality changed mid-batch: expected {expected}, got {}",
                            vector.len()
                        )));
                    }
                    Some(_) => {}
                }
                vectors.push(vector);
            }
        }
        Ok(vectors)
    }

    /// Embed a single text.
    pub fn embed_one(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let input = vec![text.to_string()];
        let mut vectors = self.embed_batch(&input, 1)?;
        vectors.pop().ok_or_else(|| {
            ProviderError::MalformedResponse("provider returned no embedding".to_string())
        })
    }

    fn request_chunk(&self, chunk: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        let url = format!(
            "{}/v1/embeddings",
            self.config.base_url.trim_end_matches('/')
        );
        let payload = EmbeddingRequestWire {
            model: &self.config.embedding_model,
            input: chunk,
        };
        tracing::debug!(items = chunk.len(), "requesting embeddings");
        let body = post_json(&self.agent, &url, &self.config.api_key, &payload)?;
        parse_embedding_response(&body, chunk.len())
    }
}

fn parse_embedding_response(
    body: &str,
    expected: usize,
) -> Result<Vec<Vec<f32>>, ProviderError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(ProviderError::Json("Empty response body".to_string()));
    }
    let parsed: EmbeddingResponseWire = serde_json::from_str(trimmed)
        .map_err(|err| ProviderError::Json(format!("{err}: {trimmed}")))?;
    if parsed.data.len() != expected {
        return Err(ProviderError::MalformedResponse(format!(
            "expected {expected} embeddings, got {}",
            parsed.data.len()
        )));
    }
    let vectors: Vec<Vec<f32>> = parsed.data.into_iter().map(|item| item.embedding).collect();
    if let Some(first) = vectors.first() {
        if first.is_empty() {
            return Err(ProviderError::MalformedResponse(
                "provider returned an empty embedding vector".to_string(),
            ));
        }
        if let Some(ragged) = vectors.iter().find(|vector| vector.len() != first.len()) {
            return Err(ProviderError::MalformedResponse(format!(
                "embedding dimensionality is not uniform: {} vs {}",
                first.len(),
                ragged.len()
            )));
        }
    }
    Ok(vectors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_embeddings_in_order() {
        let body = r#"{ "data": [
            { "index": 0, "embedding": [1.0, 0.0] },
            { "index": 1, "embedding": [0.0, 1.0] }
        ] }"#;
        let vectors = parse_embedding_response(body, 2).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn rejects_count_mismatch() {
        let body = r#"{ "data": [ { "embedding": [1.0] } ] }"#;
        let err = parse_embedding_response(body, 2).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[test]
    fn rejects_ragged_dimensions() {
        let body = r#"{ "data": [
            { "embedding": [1.0, 0.0] },
            { "embedding": [0.5] }
        ] }"#;
        let err = parse_embedding_response(body, 2).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[test]
    fn rejects_empty_body() {
        let err = parse_embedding_response("  ", 1).unwrap_err();
        assert!(matches!(err, ProviderError::Json(_)));
    }

    #[test]
    fn rejects_zero_chunk_size() {
        let client = EmbeddingClient::new(ProviderConfig {
            api_key: "k".to_string(),
            ..ProviderConfig::default()
        });
        let err = client.embed_batch(&["a".to_string()], 0).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidRequest(_)));
    }
}
