use std::time::Duration;

use thiserror::Error;

use crate::config_env::{optional_trimmed_env, parse_u64_env, require_non_empty_env};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_CHAT_COMPLETIONS_URL: &str = "https://api.perplexity.ai/chat/completions";
pub const DEFAULT_MODEL: &str = "sonar";
const DEFAULT_MODEL_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_SESSION_TTL_SECONDS: u64 = 3600;
const DEFAULT_SESSION_SWEEP_INTERVAL_SECONDS: u64 = 60;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub session_ttl_seconds: u64,
    pub session_sweep_interval_seconds: u64,
}

/// Settings for the outbound chat-completions client. Built separately from
/// [`ApiConfig`] so a missing credential does not stop the session endpoints.
#[derive(Debug, Clone)]
pub struct ModelClientConfig {
    pub chat_completions_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    MissingVar(String),
    #[error("invalid integer in env var {0}")]
    ParseInt(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = match optional_trimmed_env("API_BIND_ADDR") {
            Some(addr) => addr,
            None => match optional_trimmed_env("PORT") {
                Some(port) => {
                    let port = port
                        .parse::<u16>()
                        .map_err(|_| ConfigError::ParseInt("PORT".to_string()))?;
                    format!("0.0.0.0:{port}")
                }
                None => DEFAULT_BIND_ADDR.to_string(),
            },
        };

        let session_ttl_seconds =
            parse_u64_env("SESSION_TTL_SECONDS", DEFAULT_SESSION_TTL_SECONDS)?;
        if session_ttl_seconds == 0 {
            return Err(ConfigError::InvalidConfiguration(
                "SESSION_TTL_SECONDS must be greater than zero".to_string(),
            ));
        }

        let session_sweep_interval_seconds = parse_u64_env(
            "SESSION_SWEEP_INTERVAL_SECONDS",
            DEFAULT_SESSION_SWEEP_INTERVAL_SECONDS,
        )?;
        if session_sweep_interval_seconds == 0 {
            return Err(ConfigError::InvalidConfiguration(
                "SESSION_SWEEP_INTERVAL_SECONDS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            bind_addr,
            session_ttl_seconds,
            session_sweep_interval_seconds,
        })
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_seconds)
    }

    pub fn session_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.session_sweep_interval_seconds)
    }
}

impl ModelClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = require_non_empty_env("PERPLEXITY_API_KEY")?;
        let chat_completions_url = optional_trimmed_env("PERPLEXITY_CHAT_COMPLETIONS_URL")
            .unwrap_or_else(|| DEFAULT_CHAT_COMPLETIONS_URL.to_string());
        if !chat_completions_url.starts_with("http://")
            && !chat_completions_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidConfiguration(
                "PERPLEXITY_CHAT_COMPLETIONS_URL must start with http:// or https://".to_string(),
            ));
        }

        let timeout_ms = parse_u64_env("PERPLEXITY_TIMEOUT_MS", DEFAULT_MODEL_TIMEOUT_MS)?;
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidConfiguration(
                "PERPLEXITY_TIMEOUT_MS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            chat_completions_url,
            api_key,
            model: optional_trimmed_env("PERPLEXITY_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout_ms,
        })
    }
}
