pub mod builder;
pub mod error;
pub mod http;
pub mod traits;
pub mod types;

pub use builder::{MessagesSet, ModelSet, RequestBuilder, request};
pub use error::{ErrorKind, LlmError};
pub use http::{HttpClient, HttpClientConfig};
pub use traits::{Completion, CompletionService, completion};
pub use types::{ChatRequest, ChatRole, GenerationConfig, Message};
