use async_trait::async_trait;

use crate::completions::{ChatCompletion, ChunkStream};

use super::{error::LlmError, types::ChatRequest};

/// A service that answers chat requests, either in one piece or as a stream of chunks.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Submit the request and wait for the complete response.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, LlmError>;

    /// Submit the request and return the response as it is generated.
    async fn complete_stream(&self, request: &ChatRequest) -> Result<ChunkStream, LlmError>;
}

/// Outcome of [`completion`]: which shape depends on the request's `stream` flag.
#[derive(Debug)]
pub enum Completion {
    Buffered(ChatCompletion),
    Streamed(ChunkStream),
}

/// Dispatch a request to the buffered or streaming entry point based on `request.stream`.
pub async fn completion<S>(service: &S, request: &ChatRequest) -> Result<Completion, LlmError>
where
    S: CompletionService + ?Sized,
{
    if request.stream {
        service.complete_stream(request).await.map(Completion::Streamed)
    } else {
        service.complete(request).await.map(Completion::Buffered)
    }
}
