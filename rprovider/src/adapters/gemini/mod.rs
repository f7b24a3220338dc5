//! Primary managed-service caller over the Gemini REST API.
//!
//! The primary caller is always selectable; a missing key surfaces as a
//! `CredentialExhausted` failure at call time.

mod serde_api;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::{
    FrameFormat, HttpRequest, HttpTransport, ProviderCaller, ProviderError, ProviderFuture,
    ProviderKind, RequestSpec, SecretString, Settings, StatusPolicy, decode_event_stream,
};

pub use serde_api::THINKING_BUDGET;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEEP_REASONING_MODEL: &str = "gemini-3-pro-preview";
pub const HYBRID_MODEL: &str = "gemini-2.5-pro";

const ERROR_BODY_LIMIT: usize = 200;

#[derive(Clone)]
pub struct GeminiCaller {
    transport: Arc<dyn HttpTransport>,
    api_key: Option<SecretString>,
    policy: StatusPolicy,
    deadline: Duration,
    base_url: String,
}

impl GeminiCaller {
    pub fn new(transport: Arc<dyn HttpTransport>, api_key: Option<SecretString>) -> Self {
        Self {
            transport,
            api_key,
            policy: StatusPolicy::terminal(),
            deadline: Duration::from_secs(30),
            base_url: GEMINI_BASE_URL.to_string(),
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

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Pinned model wins; otherwise deep reasoning picks the pro preview
    /// model with a thinking budget.
    fn select_model(request: &RequestSpec, settings: &Settings) -> (String, Option<u32>) {
        match request.model.as_deref() {
            Some(model) if !model.trim().is_empty() => (model.to_string(), None),
            _ if settings.deep_reasoning => {
                (DEEP_REASONING_MODEL.to_string(), Some(THINKING_BUDGET))
            }
            _ => (DEFAULT_MODEL.to_string(), None),
        }
    }

    fn endpoint(&self, model: &str, streaming: bool) -> String {
        let base = self.base_url.trim_end_matches('/');
        if streaming {
            format!("{base}/models/{model}:streamGenerateContent?alt=sse")
        } else {
            format!("{base}/models/{model}:generateContent")
        }
    }

    async fn call_inner(
        &self,
        request: &RequestSpec,
        settings: &Settings,
    ) -> Result<String, ProviderError> {
        request.validate()?;
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| ProviderError::credential_exhausted("no Gemini API key configured"))?;

        let (model, thinking_budget) = Self::select_model(request, settings);
        let body = serde_json::to_value(serde_api::build_request(request, thinking_budget))?;
        let streaming = request.is_streaming();
        let http = HttpRequest::post(self.endpoint(&model, streaming))
            .with_header("x-goog-api-key", api_key.expose())
            .with_json(body);

        debug!(provider = "gemini", model = %model, streaming, "calling primary service");
        let response = self.transport.send(http, self.deadline).await?;

        if !response.is_success() {
            let status = response.status;
            let body = response.text().await.unwrap_or_default();
            let message = serde_api::extract_error_message(&body).unwrap_or_else(|| {
                format!(
                    "request failed with status {status}: {}",
                    rcommon::truncate(body.trim(), ERROR_BODY_LIMIT)
                )
            });
            warn!(provider = "gemini", model = %model, status, "primary service rejected request");
            return Err(self
                .policy
                .error_for(status, message)
                .context(format!("gemini model {model}")));
        }

        if streaming {
            decode_event_stream(response.body, FrameFormat::Gemini, request).await
        } else {
            serde_api::parse_buffered(&response.bytes().await?)
        }
    }
}

impl ProviderCaller for GeminiCaller {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn call<'a>(
        &'a self,
        request: &'a RequestSpec,
        settings: &'a Settings,
    ) -> ProviderFuture<'a, Result<String, ProviderError>> {
        Box::pin(self.call_inner(request, settings))
    }
}
