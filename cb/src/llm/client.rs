//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless LLM client - each call is independent (fresh context)
///
/// One request in, one response out. Implementations make a single attempt
/// per call and surface every failure to the caller.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request and wait for the full response
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

/// Stand-in for commands that never reach the model
///
/// Every call fails with [`LlmError::Config`], so nothing needs an API key
/// until a suggestion is actually requested.
pub struct UnconfiguredClient;

#[async_trait]
impl LlmClient for UnconfiguredClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        Err(LlmError::Config("No LLM provider configured for this command".to_string()))
    }
}
