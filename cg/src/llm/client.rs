//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless LLM client - each call is independent (fresh context)
///
/// Every calendar generation is a single completion request; no
/// conversation state is kept between calls. Transient transport errors
/// are the implementation's problem (retry inside `complete`), permanent
/// ones surface as [`LlmError`].
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request (blocking until complete)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}
