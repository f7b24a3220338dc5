//! Single user-configured OpenAI-compatible endpoint.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::adapters::openai::{
    ChatOutcome, build_messages, completion_body, send_chat_completion,
};
use crate::{
    HttpRequest, HttpTransport, ProviderCaller, ProviderError, ProviderFuture, ProviderKind,
    RequestSpec, Settings, StatusPolicy,
};

pub const CUSTOM_JSON_SUFFIX: &str = "\n\nResponse must be valid JSON.";

#[derive(Clone)]
pub struct CustomEndpointCaller {
    transport: Arc<dyn HttpTransport>,
    policy: StatusPolicy,
    deadline: Duration,
}

impl CustomEndpointCaller {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            policy: StatusPolicy::terminal(),
            deadline: Duration::from_secs(30),
        }
    }

    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    async fn call_inner(
        &self,
        request: &RequestSpec,
        settings: &Settings,
    ) -> Result<String, ProviderError> {
        request.validate()?;
        let url = settings.custom.completions_url().ok_or_else(|| {
            ProviderError::credential_exhausted("custom endpoint base URL is not configured")
        })?;
        let model = settings.custom.model_or_default();

        let body = completion_body(
            model,
            build_messages(request, CUSTOM_JSON_SUFFIX),
            request.is_streaming(),
        )?;
        let http = HttpRequest::post(url)
            .with_bearer(settings.custom.api_key_or_default())
            .with_json(body);

        debug!(provider = "custom", model, "calling custom endpoint");
        match send_chat_completion(self.transport.as_ref(), http, self.deadline, request).await? {
            ChatOutcome::Completed(text) => Ok(text),
            ChatOutcome::Rejected { status, message } => {
                warn!(provider = "custom", model, status, "custom endpoint rejected request");
                Err(self
                    .policy
                    .error_for(status, message)
                    .context("custom endpoint"))
            }
        }
    }
}

impl ProviderCaller for CustomEndpointCaller {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Custom
    }

    fn call<'a>(
        &'a self,
        request: &'a RequestSpec,
        settings: &'a Settings,
    ) -> ProviderFuture<'a, Result<String, ProviderError>> {
        Box::pin(self.call_inner(request, settings))
    }
}
