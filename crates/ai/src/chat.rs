//! Chat completion providers and the message-history client.

use crate::config::ProviderConfig;
use crate::http::HttpClient;
use crate::retry::CancelToken;
use serde::{Deserialize, Serialize};
use slidekit_core::{Error, Result};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A role-tagged chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Produces one completion for an ordered message list.
pub trait ChatProvider {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

impl<T: ChatProvider + ?Sized> ChatProvider for &T {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        (**self).complete(messages)
    }
}

impl<T: ChatProvider + ?Sized> ChatProvider for Box<T> {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        (**self).complete(messages)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Deserialize)]
pub(crate) struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatResponse {
    /// Text of the first choice.
    pub(crate) fn into_text(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::permanent(None, "Chat response contained no message"))
    }
}

/// Completions from an OpenAI-compatible `/chat/completions` endpoint,
/// with greedy decoding and a bounded output length.
#[derive(Debug, Clone)]
pub struct OpenAiChat {
    http: HttpClient,
    model: String,
    max_tokens: u32,
}

impl OpenAiChat {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        log::info!("Chat client: {} at {}", config.chat_model, config.base_url);
        Ok(Self {
            http: HttpClient::new(config)?,
            model: config.chat_model.clone(),
            max_tokens: config.max_output_tokens,
        })
    }

    /// Abort in-flight retries when `cancel` fires.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.http.set_cancel_token(cancel);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl ChatProvider for OpenAiChat {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: 0.0,
            max_tokens: self.max_tokens,
            stream: false,
        };
        let response: ChatResponse = self.http.post_json("chat/completions", &request)?;
        response.into_text()
    }
}

/// A linear chat history bound to a provider.
///
/// The history only grows. Use a fresh client for each independent prompt.
pub struct ChatClient<'a> {
    provider: &'a dyn ChatProvider,
    messages: Vec<ChatMessage>,
}

impl<'a> ChatClient<'a> {
    pub fn new(provider: &'a dyn ChatProvider) -> Self {
        Self {
            provider,
            messages: Vec::new(),
        }
    }

    /// Append a system message. Repeated calls append more system messages.
    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.messages.push(ChatMessage::new(Role::System, prompt));
    }

    /// Append a completed user/assistant exchange.
    pub fn append_turn(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.messages.push(ChatMessage::new(Role::User, user));
        self.messages.push(ChatMessage::new(Role::Assistant, assistant));
    }

    /// Append `prompt` as a user message and send the whole history.
    pub fn complete(&mut self, prompt: impl Into<String>) -> Result<String> {
        self.messages.push(ChatMessage::new(Role::User, prompt));
        let text = self.provider.complete(&self.messages)?;
        Ok(text.trim().to_string())
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}
