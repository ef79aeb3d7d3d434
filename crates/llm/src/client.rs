//! Schema-constrained generation with a single repair pass.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use crate::error::GenerationError;
use crate::provider::{CompletionProvider, CompletionRequest, Prompt};

const REPAIR_SYSTEM: &str = "You fix JSON documents so that they conform to a JSON Schema. \
Return only the corrected JSON object. Keep every value that already conforms.";

/// Turns a [`Prompt`] into a value of a target type `T`.
///
/// The schema sent to the provider is derived from `T` itself, so the
/// declared shape and the validation can never drift apart. Output that does
/// not deserialize into `T` gets exactly one repair request; a second failure
/// is reported as [`GenerationError::NonConformant`]. Provider errors are
/// never retried.
#[derive(Clone)]
pub struct GenerationClient {
    provider: Arc<dyn CompletionProvider>,
}

impl GenerationClient {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// Model identifier of the underlying provider.
    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Generate a `T` from the given instructions.
    pub async fn generate<T>(&self, prompt: &Prompt) -> Result<T, GenerationError>
    where
        T: DeserializeOwned + JsonSchema,
    {
        let schema_name = T::schema_name();
        let schema = serde_json::to_value(schemars::schema_for!(T)).map_err(|e| {
            GenerationError::NonConformant {
                schema: schema_name.clone(),
                detail: format!("schema derivation failed: {e}"),
            }
        })?;

        let request = CompletionRequest {
            system: prompt.system.clone(),
            user: prompt.user.clone(),
            schema_name: schema_name.clone(),
            schema,
        };

        let raw = self.provider.complete(&request).await?;
        let first_error = match parse_output::<T>(&raw) {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        tracing::warn!(
            schema = %schema_name,
            error = %first_error,
            "Generated output did not conform, requesting repair",
        );

        let repair = CompletionRequest {
            system: REPAIR_SYSTEM.to_string(),
            user: format!(
                "The following output does not conform to the {schema_name} schema.\n\
                 Validation error: {first_error}\n\n\
                 Output:\n{raw}\n\n\
                 Return a corrected JSON object."
            ),
            schema_name: schema_name.clone(),
            schema: request.schema,
        };

        let repaired = self.provider.complete(&repair).await?;
        parse_output::<T>(&repaired).map_err(|e| {
            tracing::error!(schema = %schema_name, error = %e, "Repair pass failed");
            GenerationError::NonConformant {
                schema: schema_name,
                detail: e.to_string(),
            }
        })
    }
}

/// Locate the JSON object in raw model text.
///
/// Accepts a bare object, an object wrapped in a markdown code fence, or an
/// object surrounded by prose (first `{` to last `}`).
fn extract_json(raw: &str) -> &str {
    let trimmed = raw.trim();

    if let Some(rest) = trimmed.strip_prefix("```") {
        let body = rest.strip_prefix("json").unwrap_or(rest);
        let body = body.strip_suffix("```").unwrap_or(body);
        return body.trim();
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

fn parse_output<T: DeserializeOwned>(raw: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(extract_json(raw))
}
