//! OpenAI chat-completion payload serde models and conversion helpers.

use serde::{Deserialize, Serialize};

use crate::{ProviderError, RequestSpec, Role};

pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a helpful AI assistant.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    fn new(role: &'static str, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

/// System instruction, history, then the prompt. In JSON mode `json_suffix`
/// is appended to the prompt.
pub fn build_messages(request: &RequestSpec, json_suffix: &str) -> Vec<ChatMessage> {
    let system = request
        .system_instruction
        .as_deref()
        .filter(|instruction| !instruction.trim().is_empty())
        .unwrap_or(DEFAULT_SYSTEM_INSTRUCTION);

    let mut messages = Vec::with_capacity(request.history.len() + 2);
    messages.push(ChatMessage::new("system", system));
    messages.extend(request.history.iter().map(|turn| {
        let role = match turn.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        ChatMessage::new(role, turn.text.clone())
    }));

    let mut prompt = request.prompt.clone();
    if request.json_mode {
        prompt.push_str(json_suffix);
    }
    messages.push(ChatMessage::new("user", prompt));
    messages
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionChoice {
    #[serde(default)]
    pub message: Option<ChatCompletionMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Reads `choices[0].message.content` from a buffered response body.
pub(crate) fn parse_completion(body: &[u8]) -> Result<String, ProviderError> {
    let parsed = serde_json::from_slice::<ChatCompletionResponse>(body)?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| ProviderError::malformed("response has no choices[0].message.content"))
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Detailed { message: String },
    Plain(String),
}

pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok()?;
    Some(match parsed.error {
        ErrorBody::Detailed { message } => message,
        ErrorBody::Plain(message) => message,
    })
}
