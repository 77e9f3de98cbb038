/// LLM Client: the single point of entry for language-model calls in Compass.
///
/// ARCHITECTURAL RULE: No other module may call the completion API directly.
/// Callers depend on the `ChatModel` trait; `LlmClient` is the production implementation.
///
/// Speaks the OpenAI chat-completions format (OpenRouter by default).
/// The model identifier is a constant; sampling parameters come from `Config`.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::LlmSettings;

pub mod prompts;

/// The model used for every chat answer.
pub const MODEL: &str = "openai/gpt-oss-20b:free";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A single-turn completion backend. Swapped for fakes in tests.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;

    fn model(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl CompletionResponse {
    /// Text of the first choice, if it has any.
    fn text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
    }
}

/// HTTP client for the completion endpoint. Cheap to clone; the inner
/// `reqwest::Client` pools connections and is safe to share across tasks.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    endpoint: String,
    settings: LlmSettings,
}

impl LlmClient {
    pub fn new(api_key: String, settings: LlmSettings) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            endpoint: format!("{}/chat/completions", settings.base_url.trim_end_matches('/')),
            settings,
        })
    }

    pub fn settings(&self) -> &LlmSettings {
        &self.settings
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    /// One request, no retries. Retry policy belongs to the caller.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let request_body = CompletionRequest {
            model: MODEL,
            messages,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: CompletionResponse = response.json().await?;

        if let Some(usage) = &completion.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        completion.text().ok_or(LlmError::EmptyContent)
    }

    fn model(&self) -> &str {
        MODEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_serialize_with_lowercase_roles() {
        let messages = [ChatMessage::system("persona"), ChatMessage::user("question")];
        let json = serde_json::to_value(messages).unwrap();
        assert_eq!(json[0]["role"], "system");
        assert_eq!(json[1]["role"], "user");
        assert_eq!(json[1]["content"], "question");
    }

    #[test]
    fn test_request_carries_sampling_settings() {
        let messages = [ChatMessage::user("hi")];
        let request = CompletionRequest {
            model: MODEL,
            messages: &messages,
            temperature: 0.3,
            max_tokens: 1024,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], MODEL);
        assert_eq!(json["max_tokens"], 1024);
        assert!((json["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_response_text_takes_first_choice() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": "This is the final AI answer."}}],
                       "usage": {"prompt_tokens": 12, "completion_tokens": 7}}"#;
        let response: CompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.text().as_deref(), Some("This is the final AI answer."));
    }

    #[test]
    fn test_response_without_content_is_empty() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        let response: CompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.text(), None);

        let no_choices: CompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert_eq!(no_choices.text(), None);
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let settings = LlmSettings {
            base_url: "https://openrouter.ai/api/v1/".to_string(),
            ..LlmSettings::default()
        };
        let client = LlmClient::new("key".to_string(), settings).unwrap();
        assert_eq!(client.endpoint, "https://openrouter.ai/api/v1/chat/completions");
    }
}
