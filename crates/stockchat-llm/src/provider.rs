//! Seam between the pipeline and a remote text generator

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// A remote service that turns one prompt into generated text
///
/// Implementations make a single HTTP round trip per call and report every
/// failure as an [`LLMError`](crate::LLMError). They never retry; switching
/// models or falling back to rule-based output is up to the caller.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Run `request.model` on the request's messages
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Short identifier used in logs, e.g. `"gemini"`
    fn name(&self) -> &str;
}
