//! Provider-agnostic request, conversation, and provider identity types.
//!
//! ```rust
//! use rprovider::{ConversationTurn, ProviderErrorKind, RequestSpec};
//!
//! let ok = RequestSpec::new("Summarize this diff")
//!     .with_history(vec![ConversationTurn::user("hi"), ConversationTurn::assistant("hello")])
//!     .with_system_instruction("Be terse.");
//! assert!(ok.validate().is_ok());
//!
//! let err = RequestSpec::new("   ").validate().expect_err("blank prompt should fail");
//! assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);
//! ```

use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use serde::Deserialize;

use crate::ProviderError;

/// The backend families a request can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProviderKind {
    /// Managed primary service; always selectable.
    Gemini,
    /// OpenAI-compatible marketplace of free-tier models.
    OpenRouter,
    /// Single OpenAI-compatible endpoint configured by the user.
    Custom,
    /// Low-resource hosted inference API.
    HuggingFace,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Gemini,
        ProviderKind::OpenRouter,
        ProviderKind::Custom,
        ProviderKind::HuggingFace,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenRouter => "openrouter",
            Self::Custom => "custom",
            Self::HuggingFace => "huggingface",
        }
    }

    /// Human label used when answers from several providers are combined.
    pub fn source_label(self) -> &'static str {
        match self {
            Self::Gemini => "Gemini",
            Self::OpenRouter => "OpenRouter",
            Self::Custom => "Custom",
            Self::HuggingFace => "HuggingFace",
        }
    }
}

impl Display for ProviderKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// File content sent inline with a turn, already base64-encoded by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

impl InlineData {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
    pub attachments: Vec<InlineData>,
}

impl ConversationTurn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            attachments: Vec::new(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    pub fn with_attachment(mut self, attachment: InlineData) -> Self {
        self.attachments.push(attachment);
        self
    }
}

/// Receives streamed text increments in wire order.
pub type DeltaCallback = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Clone, Default)]
pub struct RequestSpec {
    pub prompt: String,
    pub history: Vec<ConversationTurn>,
    pub system_instruction: Option<String>,
    pub json_mode: bool,
    pub use_tools: bool,
    pub attachments: Vec<InlineData>,
    pub on_delta: Option<DeltaCallback>,
    /// Pins a model for providers that would otherwise pick one themselves.
    pub model: Option<String>,
}

impl RequestSpec {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.history = history;
        self
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_attachments(mut self, attachments: Vec<InlineData>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_delta_callback(mut self, on_delta: DeltaCallback) -> Self {
        self.on_delta = Some(on_delta);
        self
    }

    pub fn enable_json_mode(mut self) -> Self {
        self.json_mode = true;
        self
    }

    pub fn enable_tools(mut self) -> Self {
        self.use_tools = true;
        self
    }

    pub fn is_streaming(&self) -> bool {
        self.on_delta.is_some()
    }

    pub fn emit_delta(&self, delta: &str) {
        if let Some(on_delta) = &self.on_delta {
            on_delta(delta);
        }
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.prompt.trim().is_empty() && self.attachments.is_empty() {
            return Err(ProviderError::invalid_request(
                "prompt must not be empty without attachments",
            ));
        }

        let all_attachments = self
            .attachments
            .iter()
            .chain(self.history.iter().flat_map(|turn| turn.attachments.iter()));
        for attachment in all_attachments {
            if attachment.mime_type.trim().is_empty() {
                return Err(ProviderError::invalid_request(
                    "attachment mime type must not be empty",
                ));
            }
        }

        Ok(())
    }
}

impl Debug for RequestSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSpec")
            .field("prompt", &self.prompt)
            .field("history", &self.history.len())
            .field("system_instruction", &self.system_instruction)
            .field("json_mode", &self.json_mode)
            .field("use_tools", &self.use_tools)
            .field("attachments", &self.attachments.len())
            .field("streaming", &self.is_streaming())
            .field("model", &self.model)
            .finish()
    }
}
