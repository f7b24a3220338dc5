//! Execution results and the plain values structured-output features return.

use std::collections::BTreeMap;

use rprovider::{ConversationTurn, DeltaCallback, InlineData, ProviderKind, Settings};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub text: String,
    /// The provider whose answer was returned.
    pub provider: ProviderKind,
    /// Every provider tried, in order, including the successful one.
    pub attempted: Vec<ProviderKind>,
    /// Source labels combined by a hybrid synthesis pass.
    pub synthesized_from: Vec<&'static str>,
}

impl ExecutionResult {
    pub fn new(text: impl Into<String>, provider: ProviderKind) -> Self {
        Self {
            text: text.into(),
            provider,
            attempted: vec![provider],
            synthesized_from: Vec::new(),
        }
    }

    pub fn is_synthesized(&self) -> bool {
        !self.synthesized_from.is_empty()
    }
}

/// One successful branch of a hybrid run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcedAnswer {
    pub source: &'static str,
    pub text: String,
}

impl SourcedAnswer {
    pub fn new(source: &'static str, text: impl Into<String>) -> Self {
        Self {
            source,
            text: text.into(),
        }
    }
}

/// Inbound chat submission.
#[derive(Clone)]
pub struct SubmitRequest {
    pub prompt: String,
    pub history: Vec<ConversationTurn>,
    pub settings: Settings,
    pub attachments: Vec<InlineData>,
    pub system_instruction: Option<String>,
    pub on_delta: Option<DeltaCallback>,
}

impl SubmitRequest {
    pub fn new(prompt: impl Into<String>, settings: Settings) -> Self {
        Self {
            prompt: prompt.into(),
            history: Vec::new(),
            settings,
            attachments: Vec::new(),
            system_instruction: None,
            on_delta: None,
        }
    }

    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.history = history;
        self
    }

    pub fn with_attachments(mut self, attachments: Vec<InlineData>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_delta_callback(mut self, on_delta: DeltaCallback) -> Self {
        self.on_delta = Some(on_delta);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub description: String,
    pub code: String,
}

/// A matched skill and the arguments to run it with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPlan {
    pub skill_name: String,
    pub code: String,
    pub args: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    /// 1 to 10.
    pub importance: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
}

impl SessionSummary {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            last_message: None,
        }
    }

    pub fn with_last_message(mut self, message: impl Into<String>) -> Self {
        self.last_message = Some(message.into());
        self
    }
}

pub type OfflineCache = BTreeMap<String, String>;
