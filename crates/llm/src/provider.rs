use async_trait::async_trait;

use crate::error::GenerationError;

/// System + user instruction pair for one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// One request to the external generator: instructions plus the
/// machine-checkable schema the answer must follow.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    /// Schema title, used in logs and errors.
    pub schema_name: String,
    /// JSON Schema of the expected answer.
    pub schema: serde_json::Value,
}

/// A single raw call to the external structured-text generator.
///
/// Implementations return the model's raw text. They do not retry; the
/// caller decides what a failure means.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError>;

    /// Model identifier for logging.
    fn model_name(&self) -> &str;
}
