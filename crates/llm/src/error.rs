/// Failure of a generation call.
///
/// Raised on transport or provider failure, and when the output still does
/// not conform to the target schema after the repair pass.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Provider API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The provider answered without any message content.
    #[error("Provider returned no content")]
    EmptyResponse,

    /// The output could not be made to conform to the target schema.
    #[error("Output does not conform to {schema}: {detail}")]
    NonConformant { schema: String, detail: String },
}
