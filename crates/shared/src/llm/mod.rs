pub mod chat_completions;
pub mod gateway;

pub use chat_completions::{ChatCompletionsGateway, ChatCompletionsGatewayError};
pub use gateway::{CompletionRequest, LlmGateway, LlmGatewayError, LlmGatewayFuture};
