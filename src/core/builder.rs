use std::marker::PhantomData;

use super::{
    error::LlmError,
    types::{ChatRequest, ChatRole, GenerationConfig, Message},
};

pub struct ModelSet;
pub struct MessagesSet;

pub struct RequestBuilder<State> {
    model: String,
    messages: Vec<Message>,
    generation: Option<GenerationConfig>,
    _state: PhantomData<State>,
}

impl<State> RequestBuilder<State> {
    pub fn generation(mut self, config: GenerationConfig) -> Self {
        self.generation = Some(config);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.generation.get_or_insert_with(GenerationConfig::default).max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.generation.get_or_insert_with(GenerationConfig::default).temperature =
            Some(temperature);
        self
    }

    fn into_state<Next>(self) -> RequestBuilder<Next> {
        RequestBuilder {
            model: self.model,
            messages: self.messages,
            generation: self.generation,
            _state: PhantomData,
        }
    }
}

impl RequestBuilder<ModelSet> {
    pub fn messages(mut self, messages: Vec<Message>) -> RequestBuilder<MessagesSet> {
        self.messages = messages;
        self.into_state()
    }

    pub fn message(
        self,
        role: ChatRole,
        content: impl Into<String>,
    ) -> RequestBuilder<MessagesSet> {
        self.messages(Vec::new()).message(role, content)
    }
}

impl RequestBuilder<MessagesSet> {
    pub fn message(mut self, role: ChatRole, content: impl Into<String>) -> Self {
        self.messages.push(Message {
            role,
            content: content.into(),
        });
        self
    }

    /// Build a buffered request.
    pub fn build(self) -> Result<ChatRequest, LlmError> {
        self.finish(false)
    }

    /// Build a streaming request.
    pub fn build_stream(self) -> Result<ChatRequest, LlmError> {
        self.finish(true)
    }

    fn finish(self, stream: bool) -> Result<ChatRequest, LlmError> {
        if self.messages.is_empty() {
            return Err(LlmError::Builder(
                "Missing messages. Make sure to add at least one message.".to_string(),
            ));
        }

        if self.model.trim().is_empty() {
            return Err(LlmError::Builder(
                "Missing model. Make sure to specify a model identifier.".to_string(),
            ));
        }

        Ok(ChatRequest {
            model: self.model,
            messages: self.messages,
            stream,
            generation: self.generation,
        })
    }
}

pub mod request {
    use super::*;

    pub fn with(model: impl Into<String>) -> RequestBuilder<ModelSet> {
        RequestBuilder {
            model: model.into(),
            messages: Vec::new(),
            generation: None,
            _state: PhantomData,
        }
    }
}
