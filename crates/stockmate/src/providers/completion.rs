//! Completion provider trait for the remote text-generation endpoint

use async_trait::async_trait;

use crate::config::DecodingParams;
use crate::error::Result;

/// What the endpoint answered
///
/// A non-200 status is not an `Err`: the bridges decide how to surface it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// HTTP 200 with the text of the first choice
    Text(String),
    /// Any other status, with the raw response body
    Rejected { status: u16, body: String },
}

/// Trait for prompt completion
///
/// Implementations:
/// - `CompletionClient`: OpenAI-style `/completions` endpoint (Together API)
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send one prompt with the given decoding parameters
    ///
    /// Transport failures and malformed 200 bodies are errors.
    async fn complete(&self, prompt: &str, params: DecodingParams) -> Result<CompletionOutcome>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
