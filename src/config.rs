//! Configuration for the smoke-test run.
//!
//! Defaults reproduce a fixed run against the local proxy. Every value can be
//! overridden from the environment (or a `.env` file); none has to be.

use std::time::Duration;

use crate::core::HttpClientConfig;
use crate::provider::{ApiKey, LocalProxyConfig, Provider, defaults};

pub const MODEL_ENV_VAR: &str = "COMPLETION_MODEL";
pub const PROMPT_ENV_VAR: &str = "COMPLETION_PROMPT";

pub const DEFAULT_PROMPT: &str = "Create a fibonacci function in Python";

#[derive(Debug, Clone)]
pub struct InvokerConfig {
    pub model: String,
    pub prompt: String,
    pub api_base: String,
    pub api_key: ApiKey,
    pub http: HttpClientConfig,
}

impl Default for InvokerConfig {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_MODEL.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            api_base: defaults::API_BASE.to_string(),
            api_key: ApiKey::Default,
            // single attempt, generous timeout
            http: HttpClientConfig {
                timeout: Duration::from_secs(600),
                max_retries: 0,
                ..HttpClientConfig::default()
            },
        }
    }
}

impl InvokerConfig {
    /// Defaults with overrides from `.env` and the process environment.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(model) = get(MODEL_ENV_VAR) {
            config.model = model;
        }
        if let Some(prompt) = get(PROMPT_ENV_VAR) {
            config.prompt = prompt;
        }
        if let Some(base) = get(defaults::API_BASE_ENV_VAR) {
            config.api_base = base;
        }
        if let Some(key) = get(Provider::LocalProxy.default_api_key_env_var()) {
            config.api_key = ApiKey::Custom(key);
        }

        tracing::debug!(model = %config.model, api_base = %config.api_base, "loaded configuration");
        config
    }

    pub fn provider_config(&self) -> LocalProxyConfig {
        LocalProxyConfig::new()
            .with_base_url(self.api_base.clone())
            .with_api_key(self.api_key.resolve(Provider::LocalProxy))
            .with_http_config(self.http.clone())
    }
}
