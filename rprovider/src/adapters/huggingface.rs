//! Low-resource hosted inference caller.
//!
//! Cold models answer with a "loading" error; that and every other
//! non-answer advances to the next credential without sleeping.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::{
    DiscoveryCache, HttpRequest, HttpTransport, ProviderCaller, ProviderError, ProviderFuture,
    ProviderKind, RequestSpec, Role, Settings, StatusAction, StatusPolicy,
};

pub const HUGGINGFACE_INFERENCE_URL: &str = "https://api-inference.huggingface.co/models";
pub const MAX_NEW_TOKENS: u32 = 1024;
pub const TEMPERATURE: f64 = 0.7;

#[derive(Clone)]
pub struct HuggingFaceCaller {
    transport: Arc<dyn HttpTransport>,
    discovery: Arc<DiscoveryCache>,
    policy: StatusPolicy,
    deadline: Duration,
    base_url: String,
}

impl HuggingFaceCaller {
    pub fn new(transport: Arc<dyn HttpTransport>, discovery: Arc<DiscoveryCache>) -> Self {
        Self {
            transport,
            discovery,
            policy: StatusPolicy::low_resource(),
            deadline: Duration::from_secs(45),
            base_url: HUGGINGFACE_INFERENCE_URL.to_string(),
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

    /// A cold cache is filled before the first walk so discovered models are used.
    async fn candidate_models(&self, request: &RequestSpec) -> Vec<String> {
        if let Some(model) = request.model.as_deref().filter(|model| !model.trim().is_empty()) {
            return vec![model.to_string()];
        }
        if self.discovery.last_refreshed().is_none() {
            self.discovery.ensure_fresh().await;
        }
        self.discovery.low_resource_models()
    }

    async fn call_inner(
        &self,
        request: &RequestSpec,
        settings: &Settings,
    ) -> Result<String, ProviderError> {
        request.validate()?;
        if settings.hugging_face.is_empty() {
            return Err(ProviderError::credential_exhausted(
                "no Hugging Face API keys configured",
            ));
        }

        let body = json!({
            "inputs": render_prompt(request),
            "parameters": {
                "max_new_tokens": MAX_NEW_TOKENS,
                "temperature": TEMPERATURE,
                "return_full_text": false,
            },
        });
        let keys = settings.hugging_face.rotation_order();
        let mut last_error = None;

        'models: for model in self.candidate_models(request).await {
            let url = format!("{}/{model}", self.base_url.trim_end_matches('/'));

            for (slot, key) in keys.iter().enumerate() {
                debug!(provider = "huggingface", model = %model, key_slot = slot, "attempting model");
                let http = HttpRequest::post(url.as_str())
                    .with_bearer((*key).clone())
                    .with_json(body.clone());

                let response = match self.transport.send(http, self.deadline).await {
                    Ok(response) => response,
                    Err(error) => {
                        warn!(provider = "huggingface", model = %model, key_slot = slot, error = %error, "attempt failed");
                        last_error = Some(error.context(format!("huggingface model {model}")));
                        continue;
                    }
                };

                if !response.is_success() {
                    let status = response.status;
                    let body = response.text().await.unwrap_or_default();
                    let error = self
                        .policy
                        .error_for(status, rcommon::truncate(body.trim(), 200))
                        .context(format!("huggingface model {model}"));
                    warn!(provider = "huggingface", model = %model, key_slot = slot, status, "model rejected request");
                    match self.policy.classify(status) {
                        StatusAction::NextCredential => {
                            last_error = Some(error);
                            continue;
                        }
                        StatusAction::NextModel => {
                            last_error = Some(error);
                            continue 'models;
                        }
                        StatusAction::Abort => return Err(error),
                    }
                }

                let parsed = match response.json::<Value>().await {
                    Ok(parsed) => parsed,
                    Err(error) => {
                        last_error = Some(error.context(format!("huggingface model {model}")));
                        continue;
                    }
                };
                match read_generation(&parsed) {
                    Ok(text) => return Ok(text),
                    Err(error) => {
                        warn!(provider = "huggingface", model = %model, key_slot = slot, error = %error, "no usable generation");
                        last_error = Some(error.context(format!("huggingface model {model}")));
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ProviderError::credential_exhausted("Hugging Face had no model to try")
        }))
    }
}

impl ProviderCaller for HuggingFaceCaller {
    fn kind(&self) -> ProviderKind {
        ProviderKind::HuggingFace
    }

    fn call<'a>(
        &'a self,
        request: &'a RequestSpec,
        settings: &'a Settings,
    ) -> ProviderFuture<'a, Result<String, ProviderError>> {
        Box::pin(self.call_inner(request, settings))
    }
}

/// Chat template with flattened history; JSON mode ends with `JSON:`.
/// History lines use the chat log's sender labels, `user` and `ai`.
pub fn render_prompt(request: &RequestSpec) -> String {
    let mut context = request
        .history
        .iter()
        .map(|turn| format!("{}: {}", history_label(turn.role), turn.text))
        .collect::<Vec<_>>()
        .join("\n");
    context.push_str("\nUser: ");
    context.push_str(&request.prompt);
    if request.json_mode {
        context.push_str("\nJSON:");
    }

    match request
        .system_instruction
        .as_deref()
        .filter(|instruction| !instruction.trim().is_empty())
    {
        Some(system) => {
            format!("<|system|>\n{system}</s>\n<|user|>\n{context}</s>\n<|assistant|>")
        }
        None => format!("<|user|>\n{context}</s>\n<|assistant|>"),
    }
}

fn history_label(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "ai",
    }
}

/// Accepts `{generated_text}`, `[{generated_text}, ..]`, or a bare string.
pub fn read_generation(value: &Value) -> Result<String, ProviderError> {
    if let Some(error) = value.get("error").and_then(Value::as_str) {
        return if error.contains("loading") {
            Err(ProviderError::transient(format!("model loading: {error}")))
        } else {
            Err(ProviderError::permanent(error.to_string()))
        };
    }

    let text = match value {
        Value::String(text) => Some(text.as_str()),
        Value::Array(items) => items
            .first()
            .and_then(|item| item.get("generated_text"))
            .and_then(Value::as_str),
        other => other.get("generated_text").and_then(Value::as_str),
    };

    match text {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        _ => Err(ProviderError::malformed("empty generation")),
    }
}
