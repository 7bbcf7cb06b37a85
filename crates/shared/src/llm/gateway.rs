use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

pub type LlmGatewayFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, LlmGatewayError>> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f32,
}

/// Every way the provider call can fail. Callers treat all variants as one
/// upstream failure; the variants only feed logs.
#[derive(Debug, Error)]
pub enum LlmGatewayError {
    #[error("llm provider request timed out")]
    Timeout,
    #[error("llm provider request failed: {0}")]
    ProviderFailure(String),
    #[error("llm provider returned an invalid payload: {0}")]
    InvalidProviderPayload(String),
}

/// Text-completion capability: one system prompt and one user prompt in, the
/// raw assistant text out.
pub trait LlmGateway: Send + Sync {
    fn complete<'a>(&'a self, request: CompletionRequest) -> LlmGatewayFuture<'a>;
}
