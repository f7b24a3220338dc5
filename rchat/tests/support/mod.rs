//! Scripted provider callers shared by the executor behavior tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use rchat::{ChatService, FallbackExecutor};
use rprovider::{
    ProviderCaller, ProviderError, ProviderFuture, ProviderKind, ProviderRegistry, RequestSpec,
    Settings,
};

/// Order in which providers were called, across every caller.
pub type Journal = Arc<Mutex<Vec<ProviderKind>>>;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub system_instruction: Option<String>,
    pub model: Option<String>,
    pub json_mode: bool,
    pub use_tools: bool,
    pub streaming: bool,
    pub history_len: usize,
    pub attachment_count: usize,
}

pub struct ScriptedCaller {
    kind: ProviderKind,
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    calls: Mutex<Vec<RecordedCall>>,
    journal: Journal,
}

impl ScriptedCaller {
    pub fn new(
        kind: ProviderKind,
        replies: Vec<Result<&str, ProviderError>>,
        journal: &Journal,
    ) -> Arc<Self> {
        Arc::new(Self {
            kind,
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|reply| reply.map(ToString::to_string))
                    .collect(),
            ),
            calls: Mutex::new(Vec::new()),
            journal: Arc::clone(journal),
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl ProviderCaller for ScriptedCaller {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn call<'a>(
        &'a self,
        request: &'a RequestSpec,
        _settings: &'a Settings,
    ) -> ProviderFuture<'a, Result<String, ProviderError>> {
        Box::pin(async move {
            self.journal.lock().expect("journal lock").push(self.kind);
            self.calls.lock().expect("calls lock").push(RecordedCall {
                prompt: request.prompt.clone(),
                system_instruction: request.system_instruction.clone(),
                model: request.model.clone(),
                json_mode: request.json_mode,
                use_tools: request.use_tools,
                streaming: request.is_streaming(),
                history_len: request.history.len(),
                attachment_count: request.attachments.len(),
            });

            let reply = self
                .replies
                .lock()
                .expect("replies lock")
                .pop_front()
                .unwrap_or_else(|| Err(ProviderError::other("script exhausted")));
            if let Ok(text) = &reply {
                request.emit_delta(text);
            }
            reply
        })
    }
}

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn executor(callers: &[Arc<ScriptedCaller>]) -> FallbackExecutor {
    let mut registry = ProviderRegistry::new();
    for caller in callers {
        registry.register_shared(caller.clone());
    }
    FallbackExecutor::new(registry)
}

pub fn service(callers: &[Arc<ScriptedCaller>]) -> ChatService {
    ChatService::new(Arc::new(executor(callers)))
}
