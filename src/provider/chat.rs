//! One-shot free-text condition descriptions from the chat endpoint.

use serde::{Deserialize, Serialize};

use super::{ProviderError, post_json};
use crate::config::ProviderConfig;
use crate::http_client;

/// Client for the provider's chat-completion endpoint.
///
/// One long-lived instance serves every description request; clients are not
/// rebuilt per call.
#[derive(Debug)]
pub struct ChatClient {
    agent: ureq::Agent,
    config: ProviderConfig,
}

#[derive(Debug, Serialize)]
struct ChatRequestWire<'a> {
    model: &'a str,
    messages: Vec<MessageWire<'a>>,
}

#[derive(Debug, Serialize)]
struct MessageWire<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponseWire {
    choices: Vec<ChoiceWire>,
}

#[derive(Debug, Deserialize)]
struct ChoiceWire {
    message: ChoiceMessageWire,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessageWire {
    content: String,
}

impl ChatClient {
    /// Create a client for the configured provider. Construct once and reuse.
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            agent: http_client::build_agent(),
            config,
        }
    }

    /// Fetch a short clinician-readable description of a predicted condition.
    pub fn describe_condition(&self, condition: &str) -> Result<String, ProviderError> {
        self.complete(&description_prompt(condition))
    }

    /// Send a single user message and return the first choice's content.
    pub fn complete(&self, user_message: &str) -> Result<String, ProviderError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let payload = ChatRequestWire {
            model: &self.config.chat_model,
            messages: vec![MessageWire {
                role: "user",
                content: user_message,
            }],
        };
        tracing::debug!(model = %self.config.chat_model, "requesting completion");
        let body = post_json(&self.agent, &url, &self.config.api_key, &payload)?;
        parse_chat_response(&body)
    }
}

fn description_prompt(condition: &str) -> String {
    format!(
        "Provide a short medical description for {condition}. Keep it clear, \
         crisp and to the point, describe its most common cause or set of \
         causes, list the top 5 symptoms, and always advise seeking medical \
         advice as soon as possible."
    )
}

fn parse_chat_response(body: &str) -> Result<String, ProviderError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(ProviderError::Json("Empty response body".to_string()));
    }
    let parsed: ChatResponseWire = serde_json::from_str(trimmed)
        .map_err(|err| ProviderError::Json(format!("{err}: {trimmed}")))?;
    parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| {
            ProviderError::MalformedResponse("response contained no choices".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_choice_content() {
        let body = r#"{ "choices": [
            { "message": { "role": "assistant", "content": "A common viral infection." } }
        ] }"#;
        let content = parse_chat_response(body).unwrap();
        assert_eq!(content, "A common viral infection.");
    }

    #[test]
    fn rejects_missing_choices() {
        let err = parse_chat_response(r#"{ "choices": [] }"#).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[test]
    fn description_prompt_names_the_condition() {
        let prompt = description_prompt("influenza");
        assert!(prompt.contains("influenza"));
        assert!(prompt.contains("medical advice"));
    }
}
