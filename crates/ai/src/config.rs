//! Provider configuration passed explicitly to every client.

use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo-16k";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_VISION_MODEL: &str = "gpt-4o-mini";

/// Settings for the embedding, chat and vision providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Bearer token; requests are sent unauthenticated when absent.
    pub api_key: Option<String>,
    /// Root of an OpenAI-compatible API, without a trailing slash.
    pub base_url: String,
    pub chat_model: String,
    pub embedding_model: String,
    /// Model used to read data tables out of chart images.
    pub vision_model: String,
    /// Cap on generated tokens per completion.
    pub max_output_tokens: u32,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Retries after the first attempt for rate limits, 5xx and network errors.
    pub max_retries: u32,
    /// Backoff before the first retry; doubles on each further retry.
    pub retry_base_delay_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            max_output_tokens: 1500,
            timeout_secs: 120,
            max_retries: 3,
            retry_base_delay_ms: 1000,
        }
    }
}

impl ProviderConfig {
    /// Defaults overridden by `OPENAI_API_KEY`, `OPENAI_BASE_URL`,
    /// `SLIDEKIT_CHAT_MODEL` and `SLIDEKIT_EMBEDDING_MODEL`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            config.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            config = config.with_base_url(url);
        }
        if let Ok(model) = std::env::var("SLIDEKIT_CHAT_MODEL") {
            config.chat_model = model;
        }
        if let Ok(model) = std::env::var("SLIDEKIT_EMBEDDING_MODEL") {
            config.embedding_model = model;
        }
        config
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = model.into();
        self
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
        }
    }
}
