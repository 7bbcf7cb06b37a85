use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

use super::gateway::{CompletionRequest, LlmGateway, LlmGatewayError, LlmGatewayFuture};
use crate::config::ModelClientConfig;

#[derive(Debug, Error)]
pub enum ChatCompletionsGatewayError {
    #[error("failed to build chat completions http client: {0}")]
    HttpClient(String),
}

/// OpenAI-compatible chat-completions client (Perplexity by default). One
/// request per call; retry policy belongs to callers, and the diagnosis flow
/// does not retry.
#[derive(Clone)]
pub struct ChatCompletionsGateway {
    client: reqwest::Client,
    config: ModelClientConfig,
}

impl ChatCompletionsGateway {
    pub fn new(config: ModelClientConfig) -> Result<Self, ChatCompletionsGatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| ChatCompletionsGatewayError::HttpClient(err.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn send_once(&self, request: &CompletionRequest) -> Result<String, LlmGatewayError> {
        let request_body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": request.system_prompt },
                { "role": "user", "content": request.user_prompt }
            ],
            "temperature": request.temperature
        });

        let response = self
            .client
            .post(&self.config.chat_completions_url)
            .bearer_auth(&self.config.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    LlmGatewayError::Timeout
                } else {
                    LlmGatewayError::ProviderFailure("request_unavailable".to_string())
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|err| {
            if err.is_timeout() {
                LlmGatewayError::Timeout
            } else {
                LlmGatewayError::InvalidProviderPayload("response_body_read_failed".to_string())
            }
        })?;

        if !status.is_success() {
            let provider_code = parse_provider_error_code(&body);
            return Err(LlmGatewayError::ProviderFailure(format!(
                "status={} code={provider_code}",
                status.as_u16()
            )));
        }

        let parsed: ChatCompletionsResponse = serde_json::from_str(&body).map_err(|_| {
            LlmGatewayError::InvalidProviderPayload("response_json_parse_failed".to_string())
        })?;

        let choice = parsed.choices.into_iter().next().ok_or_else(|| {
            LlmGatewayError::InvalidProviderPayload("missing_choice".to_string())
        })?;

        match choice.message.content {
            Value::String(content) => {
                debug!(
                    model = parsed.model.as_deref().unwrap_or(self.config.model.as_str()),
                    content_chars = content.len(),
                    "chat completion received"
                );
                Ok(content)
            }
            value @ Value::Object(_) => Ok(value.to_string()),
            _ => Err(LlmGatewayError::InvalidProviderPayload(
                "unsupported_content_shape".to_string(),
            )),
        }
    }
}

impl LlmGateway for ChatCompletionsGateway {
    fn complete<'a>(&'a self, request: CompletionRequest) -> LlmGatewayFuture<'a> {
        Box::pin(async move { self.send_once(&request).await })
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    model: Option<String>,
    choices: Vec<ChatCompletionsChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsChoice {
    message: ChatCompletionsMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsMessage {
    content: Value,
}

fn parse_provider_error_code(body: &str) -> String {
    #[derive(Deserialize)]
    struct ProviderErrorEnvelope {
        error: Option<ProviderErrorDetails>,
    }

    #[derive(Deserialize)]
    struct ProviderErrorDetails {
        code: Option<Value>,
        #[serde(rename = "type")]
        kind: Option<String>,
    }

    let Some(details) = serde_json::from_str::<ProviderErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
    else {
        return "unknown".to_string();
    };

    match details.code {
        Some(Value::String(code)) => code,
        Some(Value::Number(code)) => code.to_string(),
        _ => details.kind.unwrap_or_else(|| "unknown".to_string()),
    }
}
