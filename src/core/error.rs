use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Request builder error: {0}")]
    Builder(String),

    #[error("Provider configuration error: {0}")]
    ProviderConfiguration(String),

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error(
        "API error{}: {message}",
        .status_code.map(|c| format!(" ({c})")).unwrap_or_default()
    )]
    Api {
        message: String,
        status_code: Option<u16>,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Parse error: {message}")]
    Parse {
        message: String,
        #[source]
        source: BoxError,
    },

    /// The server answered a streaming request with something other than an event stream.
    #[error("Stream error: {0}")]
    Stream(String),
}

/// Coarse category of an [`LlmError`], for callers that branch on the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Builder,
    Configuration,
    Network,
    Api,
    Parse,
    Stream,
}

impl LlmError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LlmError::Builder(_) => ErrorKind::Builder,
            LlmError::ProviderConfiguration(_) => ErrorKind::Configuration,
            LlmError::Network { .. } => ErrorKind::Network,
            LlmError::Api { .. } => ErrorKind::Api,
            LlmError::Parse { .. } => ErrorKind::Parse,
            LlmError::Stream(_) => ErrorKind::Stream,
        }
    }

    /// Whether the failure came from the transport timing out.
    pub fn is_timeout(&self) -> bool {
        match self {
            LlmError::Network { source, .. } => source
                .downcast_ref::<reqwest::Error>()
                .is_some_and(reqwest::Error::is_timeout),
            _ => false,
        }
    }
}
