pub(crate) mod client;
pub(crate) mod request;
pub(crate) mod response;
pub(crate) mod sse;
pub(crate) mod stream;

pub use client::{ChatCompletionsClient, CompletionProviderConfig};
pub use response::{
    ChatCompletion, ChatCompletionChunk, Choice, ChunkChoice, Delta, ResponseMessage, Usage,
};
pub use sse::{SseDecoder, SseEvent};
pub use stream::ChunkStream;
