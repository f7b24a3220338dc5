//! Marketplace caller: ranked free models × rotating credentials over the
//! OpenAI-compatible chat API.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::adapters::openai::{
    ChatOutcome, build_messages, completion_body, send_chat_completion,
};
use crate::{
    DiscoveryCache, HttpRequest, HttpTransport, ProviderCaller, ProviderError, ProviderFuture,
    ProviderKind, RequestSpec, ReqwestTransport, Settings, StatusAction, StatusPolicy,
};

pub const OPENROUTER_CHAT_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const OPENROUTER_JSON_SUFFIX: &str = "\n\nRespond with valid JSON only.";

#[derive(Clone)]
pub struct OpenRouterCaller {
    transport: Arc<dyn HttpTransport>,
    discovery: Arc<DiscoveryCache>,
    policy: StatusPolicy,
    deadline: Duration,
    endpoint: String,
    referer: Option<String>,
    title: Option<String>,
}

impl OpenRouterCaller {
    pub fn new(transport: Arc<dyn HttpTransport>, discovery: Arc<DiscoveryCache>) -> Self {
        Self {
            transport,
            discovery,
            policy: StatusPolicy::marketplace(),
            deadline: Duration::from_secs(30),
            endpoint: OPENROUTER_CHAT_URL.to_string(),
            referer: None,
            title: None,
        }
    }

    pub fn with_http_client(client: reqwest::Client) -> Self {
        Self::new(
            Arc::new(ReqwestTransport::new(client)),
            DiscoveryCache::global(),
        )
    }

    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Attribution headers sent as `HTTP-Referer` and `X-Title`.
    pub fn with_attribution(mut self, referer: impl Into<String>, title: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self.title = Some(title.into());
        self
    }

    /// A cold cache is filled before the first walk so discovered models are used.
    async fn candidate_models(&self, request: &RequestSpec) -> Vec<String> {
        if let Some(model) = request.model.as_deref().filter(|model| !model.trim().is_empty()) {
            return vec![model.to_string()];
        }
        if self.discovery.last_refreshed().is_none() {
            self.discovery.ensure_fresh().await;
        }
        self.discovery.marketplace_models()
    }

    async fn call_inner(
        &self,
        request: &RequestSpec,
        settings: &Settings,
    ) -> Result<String, ProviderError> {
        request.validate()?;
        if settings.open_router.is_empty() {
            return Err(ProviderError::credential_exhausted(
                "no OpenRouter API keys configured",
            ));
        }

        let messages = build_messages(request, OPENROUTER_JSON_SUFFIX);
        let keys = settings.open_router.rotation_order();
        let mut last_error = None;

        'models: for model in self.candidate_models(request).await {
            let body = completion_body(&model, messages.clone(), request.is_streaming())?;

            for (slot, key) in keys.iter().enumerate() {
                debug!(provider = "openrouter", model = %model, key_slot = slot, "attempting model");

                let mut http = HttpRequest::post(&self.endpoint)
                    .with_bearer((*key).clone())
                    .with_json(body.clone());
                if let Some(referer) = &self.referer {
                    http = http.with_header("HTTP-Referer", referer);
                }
                if let Some(title) = &self.title {
                    http = http.with_header("X-Title", title);
                }

                match send_chat_completion(self.transport.as_ref(), http, self.deadline, request)
                    .await
                {
                    Ok(ChatOutcome::Completed(text)) => return Ok(text),
                    Ok(ChatOutcome::Rejected { status, message }) => {
                        let error = self
                            .policy
                            .error_for(status, message)
                            .context(format!("openrouter model {model}"));
                        match self.policy.classify(status) {
                            StatusAction::NextCredential => {
                                warn!(provider = "openrouter", model = %model, key_slot = slot, status, "credential rejected; rotating");
                                last_error = Some(error);
                            }
                            StatusAction::NextModel => {
                                warn!(provider = "openrouter", model = %model, status, "model rejected; trying next model");
                                last_error = Some(error);
                                continue 'models;
                            }
                            StatusAction::Abort => return Err(error),
                        }
                    }
                    Err(error) => {
                        warn!(provider = "openrouter", model = %model, key_slot = slot, error = %error, "attempt failed");
                        last_error = Some(error.context(format!("openrouter model {model}")));
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ProviderError::credential_exhausted("OpenRouter had no model to try")
        }))
    }
}

impl ProviderCaller for OpenRouterCaller {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenRouter
    }

    fn call<'a>(
        &'a self,
        request: &'a RequestSpec,
        settings: &'a Settings,
    ) -> ProviderFuture<'a, Result<String, ProviderError>> {
        Box::pin(self.call_inner(request, settings))
    }
}
