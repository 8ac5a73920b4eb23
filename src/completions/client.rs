//! Client for OpenAI-style `/chat/completions` endpoints.
//!
//! This module provides the HTTP implementation of [`CompletionService`] for both
//! buffered and streamed responses.

use async_trait::async_trait;

use super::{ChatCompletion, ChunkStream, request::Request};
use crate::{
    Provider,
    core::{ChatRequest, CompletionService, HttpClient, HttpClientConfig, LlmError},
};

/// Configuration trait for chat-completion style providers.
pub trait CompletionProviderConfig: Send + Sync {
    /// Get the provider type
    fn provider(&self) -> Provider;

    /// Get the base URL for the API (e.g. `http://localhost:3000/v1`)
    fn base_url(&self) -> &str;

    /// Get the API endpoint for chat completions (e.g. `/chat/completions`)
    fn endpoint(&self) -> &str;

    /// Get the authentication header as (name, value) tuple, if the provider needs one
    fn auth_header(&self) -> Option<(String, String)>;

    /// Get additional headers to include with each request
    fn extra_headers(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Get the HTTP client configuration
    fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig::default()
    }

    /// Get the user agent string
    fn user_agent(&self) -> String {
        format!("copilot-proxy-client/{}", env!("CARGO_PKG_VERSION"))
    }
}

/// Generic client for chat-completion style providers.
pub struct ChatCompletionsClient<P: CompletionProviderConfig> {
    pub config: P,
    http: HttpClient,
}

impl<P: CompletionProviderConfig> ChatCompletionsClient<P> {
    /// Create a new completions client with the given configuration.
    pub fn new(config: P) -> Result<Self, LlmError> {
        let http_config = config.http_config();
        let user_agent = config.user_agent();

        let http = HttpClient::new(http_config, Some(&user_agent))?;

        Ok(Self { config, http })
    }

    fn url(&self) -> String {
        format!(
            "{}{}",
            self.config.base_url().trim_end_matches('/'),
            self.config.endpoint()
        )
    }

    fn headers(&self) -> Vec<(String, String)> {
        let mut headers: Vec<_> = self.config.auth_header().into_iter().collect();
        headers.extend(self.config.extra_headers());
        headers
    }
}

#[async_trait]
impl<P: CompletionProviderConfig> CompletionService for ChatCompletionsClient<P> {
    #[tracing::instrument(
        name = "chat_completion",
        skip(self, request),
        fields(provider = %self.config.provider(), model = %request.model),
        err
    )]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, LlmError> {
        let body = Request::from_chat(request, false);
        self.http.post_json(&self.url(), &self.headers(), &body).await
    }

    #[tracing::instrument(
        name = "chat_completion_stream",
        skip(self, request),
        fields(provider = %self.config.provider(), model = %request.model),
        err
    )]
    async fn complete_stream(&self, request: &ChatRequest) -> Result<ChunkStream, LlmError> {
        let body = Request::from_chat(request, true);
        let response = self
            .http
            .post_stream(&self.url(), &self.headers(), &body)
            .await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .map(|ct| String::from_utf8_lossy(ct.as_bytes()).into_owned());
        if let Some(content_type) = content_type
            && !content_type.starts_with("text/event-stream")
        {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(%content_type, "streaming response is not text/event-stream");
            return Err(LlmError::Stream(format!(
                "Expected text/event-stream response, got {content_type}: {text}"
            )));
        }

        Ok(ChunkStream::from_sse(response.bytes_stream()))
    }
}
