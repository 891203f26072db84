//! OpenAI-compatible chat completion client.
//!
//! Small async wrapper around the `/v1/chat/completions` endpoint. The
//! dashboard only ever needs single-shot completions: a system prompt, a
//! user prompt and a temperature in, one message text out.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use desk_core::error::{DeskError, Result};

// ── Defaults ──────────────────────────────────────────────────────────────────

/// Upper bound for a single completion round trip.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

// ── CompletionClient ──────────────────────────────────────────────────────────

/// Async client for an OpenAI-compatible completion endpoint.
///
/// Cloning is cheap: the underlying [`reqwest::Client`] is a shared handle.
/// The key is held in memory for the lifetime of the process and never
/// written anywhere.
#[derive(Clone)]
pub struct CompletionClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl CompletionClient {
    /// Create a client. `endpoint` is the API base, e.g.
    /// `https://api.openai.com`; the completions path is appended per call.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Model name sent with every request.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Endpoint base this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run one completion round trip and return the first choice's text.
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f64,
    ) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.endpoint);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            temperature,
        };

        debug!(
            model = %self.model,
            prompt_chars = user_prompt.len(),
            temperature,
            "sending completion request"
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DeskError::Completion(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DeskError::Completion(format!(
                "endpoint returned {}: {}",
                status, body
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| DeskError::Completion(format!("unreadable response: {}", e)))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DeskError::Completion("response carried no choices".to_string()))?;

        debug!(
            answer_chars = choice.message.content.len(),
            "completion received"
        );
        Ok(choice.message.content)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = CompletionClient::new("https://api.openai.com/", "sk-test", "gpt-4o-mini");
        assert_eq!(client.endpoint(), "https://api.openai.com");
        assert_eq!(client.model(), "gpt-4o-mini");
    }

    #[test]
    fn test_request_serialization_shape() {
        let request = ChatRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "hello".to_string(),
            }],
            temperature: 0.5,
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
        assert_eq!(json["temperature"], 0.5);
    }

    #[test]
    fn test_response_parsing_takes_first_choice() {
        let raw = r#"{
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "first"}},
                {"index": 1, "message": {"role": "assistant", "content": "second"}}
            ],
            "usage": {"prompt_tokens": 10, "completion_tokens": 2}
        }"#;

        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices.len(), 2);
        assert_eq!(parsed.choices[0].message.content, "first");
    }

    #[test]
    fn test_response_parsing_empty_choices() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(parsed.choices.is_empty());
    }

    #[tokio::test]
    async fn test_complete_unreachable_endpoint_is_completion_error() {
        // Port 9 (discard) is never serving; the call must fail cleanly.
        let client = CompletionClient::new("http://127.0.0.1:9", "sk-test", "gpt-4o-mini");
        let err = client.complete("system", "user", 0.5).await.unwrap_err();
        assert!(matches!(err, DeskError::Completion(_)));
    }
}
