//! Local OpenAI-compatible proxy provider.
//!
//! The proxy listens on `http://localhost:3000/v1` by default and accepts
//! `POST /chat/completions` in both buffered and streaming modes. It does not
//! require an API key, but one is sent as a bearer token when configured.

use crate::completions::{ChatCompletionsClient, CompletionProviderConfig};
use crate::core::{HttpClientConfig, LlmError};
use crate::provider::constants::local_proxy;

use super::Provider;

pub type LocalProxyClient = ChatCompletionsClient<LocalProxyConfig>;

#[derive(Debug, Clone)]
pub struct LocalProxyConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub http_config: HttpClientConfig,
}

impl Default for LocalProxyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: local_proxy::API_BASE.to_string(),
            http_config: HttpClientConfig::default(),
        }
    }
}

impl LocalProxyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_http_config(mut self, config: HttpClientConfig) -> Self {
        self.http_config = config;
        self
    }

    pub fn into_client(self) -> Result<LocalProxyClient, LlmError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(LlmError::ProviderConfiguration(format!(
                "Base URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        ChatCompletionsClient::new(self)
    }
}

impl CompletionProviderConfig for LocalProxyConfig {
    fn provider(&self) -> Provider {
        Provider::LocalProxy
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> &str {
        local_proxy::CHAT_COMPLETIONS_ENDPOINT
    }

    fn auth_header(&self) -> Option<(String, String)> {
        self.api_key
            .as_ref()
            .map(|key| ("Authorization".to_string(), format!("Bearer {key}")))
    }

    fn http_config(&self) -> HttpClientConfig {
        self.http_config.clone()
    }
}
