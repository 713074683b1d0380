//! LLM client module
//!
//! Provider clients behind the [`LlmClient`] trait, plus [`execute`], the
//! text-in/text-out call the suggestion pipeline is written against.

use std::sync::Arc;

use tracing::debug;

mod anthropic;
pub mod client;
mod error;
mod openai;
mod types;

pub use anthropic::AnthropicClient;
pub use client::{LlmClient, UnconfiguredClient};
pub use error::LlmError;
pub use openai::OpenAIClient;
pub use types::{CompletionRequest, CompletionResponse, Message, Role, StopReason, TokenUsage};

use crate::config::LlmConfig;

/// System prompt sent with every suggestion request
pub const SYSTEM_PROMPT: &str = "You are an expert music theory assistant. \
                                 Follow the requested output format exactly and add nothing else.";

/// Create an LLM client based on the provider specified in config
///
/// Supports "openai" (any chat-completions endpoint) and "anthropic" providers.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(provider = %config.provider, model = %config.model, "create_client: called");
    match config.provider.as_str() {
        "anthropic" => {
            debug!("create_client: creating Anthropic client");
            Ok(Arc::new(AnthropicClient::from_config(config)?))
        }
        "openai" => {
            debug!("create_client: creating OpenAI client");
            Ok(Arc::new(OpenAIClient::from_config(config)?))
        }
        other => {
            debug!(provider = %other, "create_client: unknown provider");
            Err(LlmError::Config(format!(
                "Unknown LLM provider: '{}'. Supported: anthropic, openai",
                other
            )))
        }
    }
}

/// Send one prompt and return the response text
///
/// A response without text content yields an empty string.
pub async fn execute(llm: &dyn LlmClient, prompt: &str, max_tokens: u32) -> Result<String, LlmError> {
    debug!(prompt_len = prompt.len(), %max_tokens, "execute: called");
    let request = CompletionRequest {
        system_prompt: SYSTEM_PROMPT.to_string(),
        messages: vec![Message::user(prompt)],
        max_tokens,
    };

    let response = llm.complete(request).await?;
    debug!(
        stop_reason = ?response.stop_reason,
        tokens = response.usage.total(),
        "execute: response received"
    );
    Ok(response.content.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::mock::MockLlmClient;

    #[tokio::test]
    async fn test_execute_returns_text() {
        let mock = MockLlmClient::with_texts(&["C, F, G"]);
        let text = execute(&mock, "Suggest chords", 100).await.unwrap();
        assert_eq!(text, "C, F, G");
        assert_eq!(mock.prompts(), vec!["Suggest chords"]);
    }

    #[tokio::test]
    async fn test_execute_missing_content_is_empty() {
        let mock = MockLlmClient::new(vec![CompletionResponse {
            content: None,
            stop_reason: StopReason::MaxTokens,
            usage: TokenUsage::default(),
        }]);
        assert_eq!(execute(&mock, "x", 10).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_execute_propagates_error() {
        let mock = MockLlmClient::failing(LlmError::ApiError {
            status: 500,
            message: "down".to_string(),
        });
        let err = execute(&mock, "x", 10).await.unwrap_err();
        assert_eq!(err.to_string(), "API error 500: down");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_unconfigured_client_fails() {
        let err = execute(&UnconfiguredClient, "x", 10).await.unwrap_err();
        assert!(matches!(err, LlmError::Config(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_create_client_unknown_provider() {
        let config = LlmConfig {
            provider: "nope".to_string(),
            ..LlmConfig::default()
        };
        let result = create_client(&config);
        assert!(matches!(result, Err(LlmError::Config(msg)) if msg.contains("nope")));
    }

    #[test]
    fn test_create_client_missing_key() {
        let config = LlmConfig {
            api_key_env: "CB_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..LlmConfig::default()
        };
        assert!(matches!(create_client(&config), Err(LlmError::Config(_))));
    }
}
