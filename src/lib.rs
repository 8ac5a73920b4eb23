//! # copilot-proxy-client
//!
//! Chat-completion client for OpenAI-compatible endpoints, with buffered and
//! streaming (server-sent events) response modes, plus a small runner that
//! exercises both against a local proxy.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use copilot_proxy_client::{ChatRole, CompletionService, LocalProxyConfig, request};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = LocalProxyConfig::new().into_client()?;
//!
//!     let req = request::with("gpt-4o")
//!         .message(ChatRole::User, "Create a fibonacci function in Python")
//!         .build_stream()?;
//!
//!     let mut stream = client.complete_stream(&req).await?;
//!     while let Some(chunk) = stream.next().await {
//!         print!("{}", chunk?.content());
//!     }
//!     Ok(())
//! }
//! ```

pub mod completions;
pub mod config;
pub mod core;
pub mod invoker;
pub mod provider;

pub use completions::{ChatCompletion, ChatCompletionChunk, ChunkStream};
pub use config::InvokerConfig;
pub use crate::core::{
    ChatRequest, ChatRole, Completion, CompletionService, ErrorKind, GenerationConfig,
    HttpClientConfig, LlmError, Message, completion, request,
};
pub use invoker::{CallMode, InvocationFailure, Invoker, StreamSummary};
pub use provider::{ApiKey, LocalProxyClient, LocalProxyConfig, Provider};
