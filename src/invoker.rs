//! Runs one buffered and one streaming completion and prints what comes back.
//!
//! The `try_*` operations return typed failures. The `run_*` wrappers print
//! those failures under a per-mode banner and carry on, so a failed call never
//! stops the next one.

use std::error::Error as _;
use std::io::Write;

use futures::StreamExt;
use thiserror::Error;
use tracing::{debug, info};

use crate::completions::ChatCompletion;
use crate::core::{ChatRequest, ChatRole, CompletionService, ErrorKind, LlmError, request};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMode {
    Buffered,
    Streaming,
}

impl CallMode {
    pub fn error_banner(self) -> &'static str {
        match self {
            CallMode::Buffered => "Error in non-stream mode:",
            CallMode::Streaming => "Error in streaming mode:",
        }
    }
}

#[derive(Debug, Error)]
pub enum InvocationFailure {
    /// The request could not be built, sent, or its response consumed.
    #[error("{source}")]
    Service {
        mode: CallMode,
        #[source]
        source: LlmError,
    },

    /// Writing to the output failed.
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl InvocationFailure {
    fn service(mode: CallMode) -> impl FnOnce(LlmError) -> Self {
        move |source| InvocationFailure::Service { mode, source }
    }

    /// Category of the service failure; `None` for output failures.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            InvocationFailure::Service { source, .. } => Some(source.kind()),
            InvocationFailure::Output(_) => None,
        }
    }

    /// The failure and all of its causes on one line.
    pub fn description(&self) -> String {
        let mut text = self.to_string();
        let mut cause = match self {
            InvocationFailure::Service { source, .. } => source.source(),
            InvocationFailure::Output(e) => e.source(),
        };
        while let Some(err) = cause {
            text.push_str(": ");
            text.push_str(&err.to_string());
            cause = err.source();
        }
        text
    }
}

/// What a completed streaming call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSummary {
    pub chunks: usize,
    pub text: String,
}

pub struct Invoker<S> {
    service: S,
    model: String,
    prompt: String,
}

impl<S: CompletionService> Invoker<S> {
    pub fn new(service: S, model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            service,
            model: model.into(),
            prompt: prompt.into(),
        }
    }

    fn request(&self, stream: bool) -> Result<ChatRequest, LlmError> {
        let builder =
            request::with(self.model.as_str()).message(ChatRole::User, self.prompt.as_str());
        if stream {
            builder.build_stream()
        } else {
            builder.build()
        }
    }

    /// Buffered call: submit the request and wait for the whole response.
    pub async fn try_buffered(&self) -> Result<ChatCompletion, InvocationFailure> {
        let mode = CallMode::Buffered;
        let request = self.request(false).map_err(InvocationFailure::service(mode))?;

        let completion = self
            .service
            .complete(&request)
            .await
            .map_err(InvocationFailure::service(mode))?;

        info!(id = %completion.id, "buffered completion received");
        Ok(completion)
    }

    /// Streaming call: print the banner once the stream is open, then each
    /// chunk's content as it arrives, flushing after every chunk.
    pub async fn try_streaming<W: Write>(
        &self,
        out: &mut W,
    ) -> Result<StreamSummary, InvocationFailure> {
        let mode = CallMode::Streaming;
        let request = self.request(true).map_err(InvocationFailure::service(mode))?;

        let mut stream = self
            .service
            .complete_stream(&request)
            .await
            .map_err(InvocationFailure::service(mode))?;

        writeln!(out, "Streaming response:")?;

        let mut summary = StreamSummary {
            chunks: 0,
            text: String::new(),
        };
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(InvocationFailure::service(mode))?;
            let content = chunk.content();

            write!(out, "{content}")?;
            out.flush()?;

            summary.chunks += 1;
            summary.text.push_str(&content);
        }

        debug!(chunks = summary.chunks, "stream exhausted");
        Ok(summary)
    }

    /// Operation A: print the buffered response, or the failure, on one line.
    pub async fn run_buffered<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        match self.try_buffered().await {
            Ok(completion) => writeln!(out, "Non-streaming response: {completion}"),
            Err(failure) => report(out, CallMode::Buffered, failure),
        }
    }

    /// Operation B: stream the response to `out`, or report the failure.
    pub async fn run_streaming<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        match self.try_streaming(out).await {
            Ok(_) => Ok(()),
            Err(failure) => report(out, CallMode::Streaming, failure),
        }
    }

    /// Both operations in order, each under its own banner.
    pub async fn run<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "Running completion client in non-stream mode:")?;
        self.run_buffered(out).await?;
        writeln!(out, "\nRunning completion client in stream mode:")?;
        self.run_streaming(out).await?;
        writeln!(out)?;
        out.flush()
    }
}

fn report<W: Write>(
    out: &mut W,
    mode: CallMode,
    failure: InvocationFailure,
) -> std::io::Result<()> {
    match failure {
        InvocationFailure::Output(e) => Err(e),
        failure => {
            tracing::warn!(?mode, kind = ?failure.kind(), "completion call failed");
            writeln!(out, "{} {}", mode.error_banner(), failure.description())?;
            out.flush()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::completions::{ChatCompletionChunk, ChunkStream};

    #[derive(Default)]
    struct FakeService {
        buffered: Mutex<Option<Result<ChatCompletion, LlmError>>>,
        streamed: Mutex<Option<Result<Vec<Result<ChatCompletionChunk, LlmError>>, LlmError>>>,
        seen: Mutex<Vec<ChatRequest>>,
    }

    #[async_trait]
    impl CompletionService for FakeService {
        async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, LlmError> {
            self.seen.lock().unwrap().push(request.clone());
            self.buffered
                .lock()
                .unwrap()
                .take()
                .expect("buffered result scripted")
        }

        async fn complete_stream(&self, request: &ChatRequest) -> Result<ChunkStream, LlmError> {
            self.seen.lock().unwrap().push(request.clone());
            let chunks = self
                .streamed
                .lock()
                .unwrap()
                .take()
                .expect("stream result scripted")?;
            Ok(ChunkStream::new(futures::stream::iter(chunks)))
        }
    }

    fn completion(text: &str) -> ChatCompletion {
        serde_json::from_value(json!({
            "id": "chatcmpl-nonstream",
            "object": "chat.completion",
            "created": 1,
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": text },
                "finish_reason": "stop"
            }]
        }))
        .unwrap()
    }

    fn chunk(text: &str) -> ChatCompletionChunk {
        serde_json::from_value(json!({
            "id": "chatcmpl-stream-0",
            "object": "chat.completion.chunk",
            "created": 1,
            "choices": [{ "index": 0, "delta": { "content": text } }]
        }))
        .unwrap()
    }

    fn api_error(message: &str) -> LlmError {
        LlmError::Api {
            message: message.to_string(),
            status_code: Some(500),
            source: None,
        }
    }

    fn invoker(service: FakeService) -> Invoker<FakeService> {
        Invoker::new(service, "gpt-4o", "Create a fibonacci function in Python")
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn buffered_prints_single_line_with_prefix() {
        let service = FakeService::default();
        *service.buffered.lock().unwrap() = Some(Ok(completion("def fib(n): ...")));
        let invoker = invoker(service);

        let mut out = Vec::new();
        invoker.run_buffered(&mut out).await.unwrap();
        let text = output(out);

        assert!(text.starts_with("Non-streaming response: {"));
        assert!(text.ends_with("}\n"));
        assert_eq!(text.lines().count(), 1);
        assert_eq!(text.matches("def fib(n): ...").count(), 1);

        let seen = invoker.service.seen.lock().unwrap();
        assert!(!seen[0].stream);
        assert_eq!(seen[0].model, "gpt-4o");
        assert_eq!(seen[0].messages[0].content, "Create a fibonacci function in Python");
    }

    #[tokio::test]
    async fn streaming_concatenates_chunks_without_separators() {
        let service = FakeService::default();
        *service.streamed.lock().unwrap() =
            Some(Ok(vec![Ok(chunk("Hello")), Ok(chunk(", ")), Ok(chunk("world"))]));
        let invoker = invoker(service);

        let mut out = Vec::new();
        let summary = invoker.try_streaming(&mut out).await.unwrap();

        assert_eq!(output(out), "Streaming response:\nHello, world");
        assert_eq!(summary.chunks, 3);
        assert_eq!(summary.text, "Hello, world");
        assert!(invoker.service.seen.lock().unwrap()[0].stream);
    }

    #[tokio::test]
    async fn failure_mid_stream_stops_printing() {
        let service = FakeService::default();
        *service.streamed.lock().unwrap() = Some(Ok(vec![
            Ok(chunk("Hel")),
            Err(api_error("Streaming error")),
            Ok(chunk("never")),
        ]));
        let invoker = invoker(service);

        let mut out = Vec::new();
        invoker.run_streaming(&mut out).await.unwrap();

        assert_eq!(
            output(out),
            "Streaming response:\nHelError in streaming mode: API error (500): Streaming error\n"
        );
    }

    #[tokio::test]
    async fn typed_failure_exposes_category() {
        let service = FakeService::default();
        *service.buffered.lock().unwrap() = Some(Err(api_error("boom")));
        let invoker = invoker(service);

        let failure = invoker.try_buffered().await.unwrap_err();
        assert_eq!(failure.kind(), Some(ErrorKind::Api));
        assert!(matches!(failure, InvocationFailure::Service { mode: CallMode::Buffered, .. }));
    }

    #[tokio::test]
    async fn both_calls_run_even_when_both_fail() {
        let service = FakeService::default();
        *service.buffered.lock().unwrap() = Some(Err(api_error("down")));
        *service.streamed.lock().unwrap() = Some(Err(api_error("down")));
        let invoker = invoker(service);

        let mut out = Vec::new();
        invoker.run(&mut out).await.unwrap();

        assert_eq!(
            output(out),
            "Running completion client in non-stream mode:\n\
             Error in non-stream mode: API error (500): down\n\
             \n\
             Running completion client in stream mode:\n\
             Error in streaming mode: API error (500): down\n\
             \n"
        );
    }

    #[tokio::test]
    async fn rejected_stream_prints_only_the_banner() {
        let service = FakeService::default();
        *service.streamed.lock().unwrap() = Some(Err(LlmError::Stream(
            "Expected text/event-stream response, got application/json: {}".to_string(),
        )));
        let invoker = invoker(service);

        let mut out = Vec::new();
        invoker.run_streaming(&mut out).await.unwrap();

        assert_eq!(
            output(out),
            "Error in streaming mode: Stream error: Expected text/event-stream response, \
             got application/json: {}\n"
        );
    }

    #[tokio::test]
    async fn blank_model_is_reported_not_panicked() {
        let invoker = Invoker::new(FakeService::default(), "", "hi");

        let mut out = Vec::new();
        invoker.run_buffered(&mut out).await.unwrap();

        assert!(
            output(out)
                .starts_with("Error in non-stream mode: Request builder error: Missing model")
        );
        assert!(invoker.service.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn description_includes_cause_chain() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let cause = source.to_string();
        let failure = InvocationFailure::Service {
            mode: CallMode::Buffered,
            source: LlmError::Parse {
                message: "Failed to parse API response".to_string(),
                source: Box::new(source),
            },
        };

        assert_eq!(
            failure.description(),
            format!("Parse error: Failed to parse API response: {cause}")
        );
    }
}
