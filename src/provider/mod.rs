pub(crate) mod constants;
pub(crate) mod local_proxy;

pub use constants::local_proxy as defaults;
pub use local_proxy::{LocalProxyClient, LocalProxyConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    LocalProxy,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::LocalProxy => write!(f, "LocalProxy"),
        }
    }
}

impl Provider {
    /// Get the default environment variable name for this provider's API key
    pub fn default_api_key_env_var(&self) -> &'static str {
        match self {
            Provider::LocalProxy => constants::local_proxy::API_KEY_ENV_VAR,
        }
    }
}

/// Where the API key for a provider comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ApiKey {
    /// Read the provider's default environment variable; absent means no key.
    #[default]
    Default,
    Custom(String),
    None,
}

impl ApiKey {
    pub fn resolve(&self, provider: Provider) -> Option<String> {
        match self {
            ApiKey::Default => std::env::var(provider.default_api_key_env_var())
                .ok()
                .filter(|key| !key.trim().is_empty()),
            ApiKey::Custom(key) => Some(key.clone()),
            ApiKey::None => None,
        }
    }
}
