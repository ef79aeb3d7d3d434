use std::time::Duration;

/// Default OpenAI-compatible endpoint (Groq).
const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
/// Default model identifier.
const DEFAULT_MODEL: &str = "openai/gpt-oss-20b";
const DEFAULT_TEMPERATURE: f32 = 0.3;
const DEFAULT_MAX_TOKENS: u32 = 4000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Connection and sampling settings for the generation provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Bearer token for the provider API.
    pub api_key: String,
    /// Base URL without trailing slash; `/chat/completions` is appended.
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Per-request timeout covering connect, send, and the full response.
    pub request_timeout: Duration,
}

impl LlmConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                    | Required | Default                            |
    /// |----------------------------|----------|------------------------------------|
    /// | `LLM_API_KEY`              | **yes**  | falls back to `GROQ_API_KEY`       |
    /// | `LLM_BASE_URL`             | no       | `https://api.groq.com/openai/v1`   |
    /// | `LLM_MODEL`                | no       | `openai/gpt-oss-20b`               |
    /// | `LLM_TEMPERATURE`          | no       | `0.3`                              |
    /// | `LLM_MAX_TOKENS`           | no       | `4000`                             |
    /// | `LLM_REQUEST_TIMEOUT_SECS` | no       | `120`                              |
    ///
    /// # Panics
    ///
    /// Panics if neither `LLM_API_KEY` nor `GROQ_API_KEY` is set, or if a
    /// numeric variable does not parse.
    pub fn from_env() -> Self {
        let api_key = std::env::var("LLM_API_KEY")
            .or_else(|_| std::env::var("GROQ_API_KEY"))
            .expect("LLM_API_KEY (or GROQ_API_KEY) must be set in the environment");

        let base_url = std::env::var("LLM_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.into())
            .trim_end_matches('/')
            .to_string();

        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

        let temperature: f32 = std::env::var("LLM_TEMPERATURE")
            .unwrap_or_else(|_| DEFAULT_TEMPERATURE.to_string())
            .parse()
            .expect("LLM_TEMPERATURE must be a valid f32");

        let max_tokens: u32 = std::env::var("LLM_MAX_TOKENS")
            .unwrap_or_else(|_| DEFAULT_MAX_TOKENS.to_string())
            .parse()
            .expect("LLM_MAX_TOKENS must be a valid u32");

        let timeout_secs: u64 = std::env::var("LLM_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_REQUEST_TIMEOUT_SECS.to_string())
            .parse()
            .expect("LLM_REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            api_key,
            base_url,
            model,
            temperature,
            max_tokens,
            request_timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Configuration with defaults for everything but the key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}
