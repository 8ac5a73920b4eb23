//! Chat completion response types.
//!
//! Fields the proxy may leave out are optional or defaulted, and anything not
//! modelled here is kept in `extra` so printing a response shows what the server sent.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Buffered chat completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub object: String,

    #[serde(default)]
    pub created: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default)]
    pub choices: Vec<Choice>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatCompletion {
    /// Generated text of the first choice, if any.
    pub fn text(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.message.content.as_deref())
    }
}

/// Renders as compact single-line JSON.
impl fmt::Display for ChatCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,

    #[serde(default)]
    pub message: ResponseMessage,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Role is kept as sent; servers may use roles outside [`ChatRole`](crate::core::ChatRole).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default)]
    pub content: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One streamed fragment of a chat completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub object: String,

    #[serde(default)]
    pub created: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

impl ChatCompletionChunk {
    /// Text carried by this chunk, empty when the chunk only announces a role or finish reason.
    pub fn content(&self) -> String {
        self.choices
            .iter()
            .filter_map(|c| c.delta.content.as_deref())
            .collect()
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.choices
            .iter()
            .filter_map(|c| c.finish_reason.as_deref())
            .find(|reason| !reason.is_empty())
    }
}

impl fmt::Display for ChatCompletionChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for choice in &self.choices {
            if let Some(content) = &choice.delta.content {
                f.write_str(content)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub index: u32,

    #[serde(default)]
    pub delta: Delta,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Delta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}
