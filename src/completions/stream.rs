//! Finite, single-pass stream of chat completion chunks.

use std::collections::VecDeque;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::stream::{BoxStream, FusedStream};
use futures::{Stream, StreamExt};
use serde_json::Value;
use tracing::debug;

use super::response::ChatCompletionChunk;
use super::sse::{SseDecoder, SseEvent};
use crate::core::LlmError;

type ChunkResult = Result<ChatCompletionChunk, LlmError>;

/// A streamed chat completion.
///
/// Chunks are yielded in arrival order and can be consumed only once. The
/// stream is exhausted after it yields `None` or its first error; from then
/// on every poll returns `None`.
pub struct ChunkStream {
    inner: Option<BoxStream<'static, ChunkResult>>,
}

impl ChunkStream {
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = ChunkResult> + Send + 'static,
    {
        Self {
            inner: Some(stream.boxed()),
        }
    }

    /// Stream over chunks that are already in memory.
    pub fn from_chunks(chunks: Vec<ChatCompletionChunk>) -> Self {
        Self::new(futures::stream::iter(chunks.into_iter().map(Ok)))
    }

    /// Decode a `text/event-stream` body of `data: {chunk}` events.
    pub fn from_sse<B, E>(body: B) -> Self
    where
        B: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        let state = SseState {
            body: body.boxed(),
            decoder: SseDecoder::new(),
            pending: VecDeque::new(),
            finished: false,
        };

        Self::new(futures::stream::unfold(state, |mut state| async move {
            loop {
                if let Some(item) = state.pending.pop_front() {
                    return Some((item, state));
                }
                if state.finished {
                    return None;
                }

                match state.body.next().await {
                    Some(Ok(bytes)) => {
                        for event in state.decoder.push(&bytes) {
                            state.enqueue(event);
                        }
                    }
                    Some(Err(e)) => {
                        state.finished = true;
                        state.pending.push_back(Err(LlmError::Network {
                            message: "Failed to read stream body".to_string(),
                            source: Box::new(e),
                        }));
                    }
                    None => {
                        debug!("stream body ended without [DONE]");
                        state.finished = true;
                        if let Some(event) = state.decoder.finish() {
                            state.enqueue(event);
                        }
                    }
                }
            }
        }))
    }

    pub fn is_exhausted(&self) -> bool {
        self.inner.is_none()
    }

    /// Drain the stream, concatenating every chunk's content.
    pub async fn collect_content(mut self) -> Result<String, LlmError> {
        let mut text = String::new();
        while let Some(chunk) = self.next().await {
            text.push_str(&chunk?.content());
        }
        Ok(text)
    }
}

impl Stream for ChunkStream {
    type Item = ChunkResult;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let Some(inner) = self.inner.as_mut() else {
            return Poll::Ready(None);
        };

        match inner.poll_next_unpin(cx) {
            Poll::Ready(None) => {
                self.inner = None;
                Poll::Ready(None)
            }
            Poll::Ready(Some(Err(e))) => {
                self.inner = None;
                Poll::Ready(Some(Err(e)))
            }
            other => other,
        }
    }
}

impl FusedStream for ChunkStream {
    fn is_terminated(&self) -> bool {
        self.is_exhausted()
    }
}

impl fmt::Debug for ChunkStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkStream")
            .field("exhausted", &self.is_exhausted())
            .finish()
    }
}

struct SseState<E> {
    body: BoxStream<'static, Result<Bytes, E>>,
    decoder: SseDecoder,
    pending: VecDeque<ChunkResult>,
    finished: bool,
}

impl<E> SseState<E> {
    fn enqueue(&mut self, event: SseEvent) {
        match event {
            SseEvent::Done => {
                debug!("received [DONE]");
                self.finished = true;
            }
            SseEvent::Data(data) => self.pending.push_back(parse_chunk(&data)),
        }
    }
}

fn parse_chunk(data: &str) -> ChunkResult {
    let value: Value = serde_json::from_str(data).map_err(|e| LlmError::Parse {
        message: "Failed to parse stream event as JSON".to_string(),
        source: Box::new(e),
    })?;

    if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| error.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(LlmError::Api {
            message,
            status_code: None,
            source: None,
        });
    }

    serde_json::from_value(value).map_err(|e| LlmError::Parse {
        message: "Failed to parse chat completion chunk".to_string(),
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorKind;

    type Body = futures::stream::Iter<std::vec::IntoIter<Result<Bytes, std::io::Error>>>;

    fn sse_body(parts: Vec<String>) -> Body {
        futures::stream::iter(parts.into_iter().map(|p| Ok(Bytes::from(p))).collect::<Vec<_>>())
    }

    fn chunk_event(content: &str) -> String {
        format!(
            "data: {}\n\n",
            serde_json::json!({
                "id": "chatcmpl-stream",
                "object": "chat.completion.chunk",
                "created": 1,
                "model": "gpt-4o",
                "choices": [{ "index": 0, "delta": { "content": content }, "finish_reason": "" }]
            })
        )
    }

    #[tokio::test]
    async fn yields_chunks_in_order_until_done() {
        let body = format!(
            "{}{}{}data: [DONE]\n\n{}",
            chunk_event("Hello"),
            chunk_event(", "),
            chunk_event("world"),
            chunk_event("ignored")
        );
        let stream = ChunkStream::from_sse(sse_body(vec![body]));

        assert_eq!(stream.collect_content().await.unwrap(), "Hello, world");
    }

    #[tokio::test]
    async fn exhausted_stream_stays_exhausted() {
        let mut stream = ChunkStream::from_sse(sse_body(vec![
            chunk_event("a"),
            "data: [DONE]\n\n".to_string(),
        ]));

        assert_eq!(stream.next().await.unwrap().unwrap().content(), "a");
        assert!(!stream.is_exhausted());
        assert!(stream.next().await.is_none());
        assert!(stream.is_exhausted());
        assert!(stream.is_terminated());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn error_event_ends_stream() {
        let mut stream = ChunkStream::from_sse(sse_body(vec![
            chunk_event("partial"),
            "data: {\"error\":{\"message\":\"Streaming error\"}}\n\n".to_string(),
            chunk_event("never"),
        ]));

        assert_eq!(stream.next().await.unwrap().unwrap().content(), "partial");
        let err = stream.next().await.unwrap().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Api);
        assert!(err.to_string().contains("Streaming error"));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn malformed_event_is_parse_error() {
        let mut stream = ChunkStream::from_sse(sse_body(vec!["data: {not json\n\n".to_string()]));
        let err = stream.next().await.unwrap().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(stream.is_exhausted());
    }

    #[tokio::test]
    async fn body_read_failure_is_network_error() {
        let body = futures::stream::iter(vec![
            Ok(Bytes::from(chunk_event("a"))),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ]);
        let mut stream = ChunkStream::from_sse(body);

        assert!(stream.next().await.unwrap().is_ok());
        let err = stream.next().await.unwrap().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn body_without_done_ends_after_last_event() {
        let stream = ChunkStream::from_sse(sse_body(vec![
            chunk_event("x"),
            "data: {\"choices\":[]}".to_string(),
        ]));
        assert_eq!(stream.collect_content().await.unwrap(), "x");
    }

    #[tokio::test]
    async fn null_error_field_is_not_a_failure() {
        let stream = ChunkStream::from_sse(sse_body(vec![
            concat!(
                r#"data: {"id":"c","choices":[{"index":0,"delta":{"content":"hi"}}],"#,
                r#""error":null}"#,
                "\n\n"
            )
            .to_string(),
            "data: [DONE]\n\n".to_string(),
        ]));
        assert_eq!(stream.collect_content().await.unwrap(), "hi");
    }

    #[tokio::test]
    async fn in_memory_chunks_stream_then_exhaust() {
        let chunks = ["Hel", "lo"]
            .iter()
            .map(|text| {
                serde_json::from_value(serde_json::json!({
                    "choices": [{ "index": 0, "delta": { "content": text } }]
                }))
                .unwrap()
            })
            .collect();
        let mut stream = ChunkStream::from_chunks(chunks);

        assert_eq!(stream.next().await.unwrap().unwrap().content(), "Hel");
        assert_eq!(stream.next().await.unwrap().unwrap().content(), "lo");
        assert!(stream.next().await.is_none());
        assert!(stream.is_terminated());
    }
}
