//! OpenAI-compatible `/chat/completions` provider.
//!
//! Works against any endpoint that speaks the OpenAI chat-completions
//! protocol (Groq by default). The target schema is embedded in the system
//! message and the provider is asked for a JSON object response.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::LlmConfig;
use crate::error::GenerationError;
use crate::provider::{CompletionProvider, CompletionRequest};

/// HTTP client for one chat-completions endpoint.
pub struct ChatCompletionsProvider {
    client: reqwest::Client,
    config: LlmConfig,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// Subset of the chat-completions response we read.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

impl ChatCompletionsProvider {
    /// Build a provider with its own connection pool and the configured
    /// request timeout.
    pub fn new(config: LlmConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client, config })
    }

    /// Create a provider reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: LlmConfig) -> Self {
        Self { client, config }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    /// Request body for one completion.
    fn build_body(&self, request: &CompletionRequest) -> serde_json::Value {
        let system = format!(
            "{}\n\nRespond with a single JSON object that conforms to this JSON Schema \
             (schema name: {}). Do not wrap it in markdown.\n{}",
            request.system.trim_end(),
            request.schema_name,
            request.schema
        );

        serde_json::json!({
            "model": &self.config.model,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": &request.user },
            ],
        })
    }

    /// Ensure the response has a success status code, otherwise turn it into
    /// [`GenerationError::Api`] carrying the status and body text.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GenerationError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

/// Pull the first non-empty message content out of a response.
fn first_content(response: ChatResponse) -> Result<String, GenerationError> {
    response
        .choices
        .into_iter()
        .filter_map(|c| c.message.content)
        .find(|c| !c.trim().is_empty())
        .ok_or(GenerationError::EmptyResponse)
}

#[async_trait]
impl CompletionProvider for ChatCompletionsProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError> {
        tracing::debug!(
            model = %self.config.model,
            schema = %request.schema_name,
            "Sending chat completion request",
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&self.build_body(request))
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let parsed: ChatResponse = response.json().await?;
        first_content(parsed)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn provider() -> ChatCompletionsProvider {
        let mut config = LlmConfig::with_api_key("test-key");
        config.base_url = "http://localhost:9999/v1".into();
        ChatCompletionsProvider::with_client(reqwest::Client::new(), config)
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            system: "You design courses.".into(),
            user: "Make one about Rust".into(),
            schema_name: "CourseOutline".into(),
            schema: serde_json::json!({ "type": "object", "title": "CourseOutline" }),
        }
    }

    #[test]
    fn body_carries_model_sampling_and_schema() {
        let body = provider().build_body(&request());

        assert_eq!(body["model"], "openai/gpt-oss-20b");
        assert_eq!(body["max_tokens"], 4000);
        assert_eq!(body["response_format"]["type"], "json_object");

        let system = body["messages"][0]["content"].as_str().unwrap();
        assert!(system.starts_with("You design courses."));
        assert!(system.contains("schema name: CourseOutline"));
        assert!(system.contains("\"title\":\"CourseOutline\""));
        assert_eq!(body["messages"][1]["content"], "Make one about Rust");
    }

    #[test]
    fn endpoint_appends_chat_completions() {
        assert_eq!(
            provider().endpoint(),
            "http://localhost:9999/v1/chat/completions"
        );
    }

    #[test]
    fn first_content_skips_empty_choices() {
        let parsed: ChatResponse = serde_json::from_value(serde_json::json!({
            "choices": [
                { "message": { "content": null } },
                { "message": { "content": "  " } },
                { "message": { "content": "{\"ok\":true}" } }
            ]
        }))
        .unwrap();
        assert_eq!(first_content(parsed).unwrap(), "{\"ok\":true}");
    }

    #[test]
    fn no_choices_is_empty_response() {
        let parsed: ChatResponse =
            serde_json::from_value(serde_json::json!({ "choices": [] })).unwrap();
        assert_matches!(first_content(parsed), Err(GenerationError::EmptyResponse));
    }
}
