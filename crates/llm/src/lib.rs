//! Structured-output generation client.
//!
//! - [`provider`] -- the [`CompletionProvider`] seam: one raw model call.
//! - [`chat`] -- an OpenAI-compatible `/chat/completions` provider over `reqwest`.
//! - [`client`] -- [`GenerationClient`], which derives the target schema,
//!   validates the model output against it, and runs one repair pass.

pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod provider;

pub use chat::ChatCompletionsProvider;
pub use client::GenerationClient;
pub use config::LlmConfig;
pub use error::GenerationError;
pub use provider::{CompletionProvider, CompletionRequest, Prompt};
