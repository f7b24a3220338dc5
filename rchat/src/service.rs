//! Chat submission entry point over the fallback executor.

use std::sync::Arc;

use rprovider::RequestSpec;

use crate::{ChatError, ExecutionResult, FallbackExecutor, SubmitRequest};

pub const DEFAULT_PERSONA: &str = "You are Relay, an expert software engineer and helpful \
                                   personal assistant. Respond in Markdown.";

#[derive(Clone)]
pub struct ChatService {
    executor: Arc<FallbackExecutor>,
    persona: String,
}

impl ChatService {
    pub fn new(executor: Arc<FallbackExecutor>) -> Self {
        Self {
            executor,
            persona: DEFAULT_PERSONA.to_string(),
        }
    }

    /// System instruction used for conversational turns.
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    pub fn executor(&self) -> &FallbackExecutor {
        &self.executor
    }

    pub fn persona(&self) -> &str {
        &self.persona
    }

    /// Answers `request`, streaming deltas to its callback when one is set.
    pub async fn submit(&self, request: SubmitRequest) -> Result<String, ChatError> {
        Ok(self.execute(request).await?.text)
    }

    /// Like [`ChatService::submit`], but failures come back as an inline
    /// markdown message suitable for a transcript.
    pub async fn submit_rendered(&self, request: SubmitRequest) -> String {
        match self.submit(request).await {
            Ok(text) => text,
            Err(error) => render_error(&error),
        }
    }

    pub async fn execute(&self, request: SubmitRequest) -> Result<ExecutionResult, ChatError> {
        let SubmitRequest {
            prompt,
            history,
            settings,
            attachments,
            system_instruction,
            on_delta,
        } = request;

        let mut spec = RequestSpec::new(prompt)
            .with_history(history)
            .with_attachments(attachments);
        spec.system_instruction = system_instruction;
        spec.on_delta = on_delta;

        self.executor.execute(&spec, &settings).await
    }
}

pub fn render_error(error: &ChatError) -> String {
    format!("**Error:** {}", error.message)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use rprovider::{
        ProviderCaller, ProviderError, ProviderFuture, ProviderKind, ProviderRegistry, Settings,
    };

    use super::*;
    use crate::ChatErrorKind;

    #[derive(Default)]
    struct EchoCaller {
        seen: Mutex<Vec<RequestSpec>>,
        fail: bool,
    }

    impl ProviderCaller for EchoCaller {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Gemini
        }

        fn call<'a>(
            &'a self,
            request: &'a RequestSpec,
            _settings: &'a Settings,
        ) -> ProviderFuture<'a, Result<String, ProviderError>> {
            Box::pin(async move {
                self.seen.lock().expect("seen lock").push(request.clone());
                if self.fail {
                    return Err(ProviderError::timeout("generation timed out"));
                }
                request.emit_delta("echo: ");
                request.emit_delta(&request.prompt);
                Ok(format!("echo: {}", request.prompt))
            })
        }
    }

    fn service(caller: Arc<EchoCaller>) -> ChatService {
        let mut registry = ProviderRegistry::new();
        registry.register_shared(caller);
        ChatService::new(Arc::new(FallbackExecutor::new(registry)))
    }

    #[tokio::test]
    async fn submit_forwards_instruction_and_streams_deltas() {
        let caller = Arc::new(EchoCaller::default());
        let deltas = Arc::new(Mutex::new(String::new()));
        let sink = Arc::clone(&deltas);
        let request = SubmitRequest::new("ping", Settings::default())
            .with_system_instruction("Be brief.")
            .with_delta_callback(Arc::new(move |delta: &str| {
                sink.lock().expect("deltas lock").push_str(delta);
            }));

        let text = service(caller.clone())
            .submit(request)
            .await
            .expect("submit should succeed");

        assert_eq!(text, "echo: ping");
        assert_eq!(*deltas.lock().expect("deltas lock"), "echo: ping");
        let seen = caller.seen.lock().expect("seen lock");
        assert_eq!(seen[0].system_instruction.as_deref(), Some("Be brief."));
    }

    #[tokio::test]
    async fn submit_rendered_formats_total_failure_inline() {
        let caller = Arc::new(EchoCaller {
            fail: true,
            ..EchoCaller::default()
        });

        let rendered = service(caller)
            .submit_rendered(SubmitRequest::new("ping", Settings::default()))
            .await;

        assert_eq!(
            rendered,
            "**Error:** All available AI providers failed. Last error: generation timed out"
        );
    }

    #[tokio::test]
    async fn submit_rejects_blank_prompt() {
        let error = service(Arc::new(EchoCaller::default()))
            .submit(SubmitRequest::new(" ", Settings::default()))
            .await
            .expect_err("blank prompt");
        assert_eq!(error.kind, ChatErrorKind::InvalidRequest);
    }
}
