use serde::Serialize;

use crate::core::{ChatRequest, Message};

/// Wire body for `POST /chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct Request<'a> {
    pub model: &'a str,

    pub messages: &'a [Message],

    pub stream: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Alter this or temperature but not both.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

impl<'a> Request<'a> {
    /// `stream` is taken from the caller rather than the request so the body always
    /// matches the entry point that sends it.
    pub fn from_chat(request: &'a ChatRequest, stream: bool) -> Self {
        let generation = request.generation.as_ref();
        Self {
            model: &request.model,
            messages: &request.messages,
            stream,
            max_tokens: generation.and_then(|g| g.max_tokens),
            temperature: generation.and_then(|g| g.temperature),
            top_p: generation.and_then(|g| g.top_p),
        }
    }
}
