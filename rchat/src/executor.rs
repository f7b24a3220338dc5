//! Sequential provider fallback.
//!
//! The executor walks the selector's provider list in order and returns
//! the first answer. Credential and model rotation happen inside each
//! caller, so no provider is tried twice here.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use rchat::FallbackExecutor;
//! use rprovider::{NoopAttemptHooks, ProviderRegistry};
//!
//! let executor = FallbackExecutor::new(ProviderRegistry::new())
//!     .with_hooks(Arc::new(NoopAttemptHooks));
//! assert!(executor.registry().is_empty());
//! ```

use std::sync::Arc;

use rprovider::adapters::gemini::HYBRID_MODEL;
use rprovider::{
    AttemptHooks, DiscoveryCache, NoopAttemptHooks, ProviderError, ProviderKind,
    ProviderRegistry, RequestSpec, Settings,
};
use tracing::{debug, warn};

use crate::hybrid::run_hybrid;
use crate::{ChatError, ExecutionResult, ProviderPlan, plan_for_settings};

pub const EXECUTE_OPERATION: &str = "execute";

#[derive(Clone)]
pub struct FallbackExecutor {
    registry: ProviderRegistry,
    discovery: Option<Arc<DiscoveryCache>>,
    hooks: Arc<dyn AttemptHooks>,
    hybrid_model: String,
}

impl FallbackExecutor {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry,
            discovery: None,
            hooks: Arc::new(NoopAttemptHooks),
            hybrid_model: HYBRID_MODEL.to_string(),
        }
    }

    /// Catalog refreshed in the background before each execution.
    pub fn with_discovery(mut self, discovery: Arc<DiscoveryCache>) -> Self {
        self.discovery = Some(discovery);
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn AttemptHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Model pinned on the primary branch of a hybrid run.
    pub fn with_hybrid_model(mut self, model: impl Into<String>) -> Self {
        self.hybrid_model = model.into();
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn hooks(&self) -> &dyn AttemptHooks {
        self.hooks.as_ref()
    }

    pub fn hybrid_model(&self) -> &str {
        &self.hybrid_model
    }

    /// Runs `request` against the providers `settings` selects.
    ///
    /// Fails only when every attempted provider fails, with a
    /// `TotalFailure` naming the last underlying error.
    pub async fn execute(
        &self,
        request: &RequestSpec,
        settings: &Settings,
    ) -> Result<ExecutionResult, ChatError> {
        request.validate()?;
        self.trigger_refresh();

        match plan_for_settings(settings) {
            ProviderPlan::Hybrid => run_hybrid(self, request, settings).await,
            ProviderPlan::Sequence(providers) => {
                self.execute_sequential(request, settings, &providers).await
            }
        }
    }

    /// Tries `providers` strictly in order; hybrid is never entered from here.
    pub async fn execute_sequential(
        &self,
        request: &RequestSpec,
        settings: &Settings,
        providers: &[ProviderKind],
    ) -> Result<ExecutionResult, ChatError> {
        self.run_sequence(request, settings, providers, EXECUTE_OPERATION)
            .await
    }

    pub(crate) async fn run_sequence(
        &self,
        request: &RequestSpec,
        settings: &Settings,
        providers: &[ProviderKind],
        operation: &str,
    ) -> Result<ExecutionResult, ChatError> {
        let mut attempted = Vec::with_capacity(providers.len());
        let mut last_error = None;

        for provider in providers.iter().copied() {
            attempted.push(provider);
            let attempt = attempted.len() as u32;
            self.hooks.on_attempt_start(provider, operation, attempt);
            debug!(provider = %provider, operation, attempt, "attempting provider");

            let result = match self.registry.get(provider) {
                Some(caller) => caller.call(request, settings).await,
                None => Err(ProviderError::other(format!(
                    "no caller registered for {provider}"
                ))),
            };

            match result {
                Ok(text) => {
                    self.hooks.on_success(provider, operation, attempt);
                    return Ok(ExecutionResult {
                        text,
                        provider,
                        attempted,
                        synthesized_from: Vec::new(),
                    });
                }
                Err(error) => {
                    warn!(
                        provider = %provider,
                        operation,
                        attempt,
                        error_kind = ?error.kind,
                        error = %error,
                        "provider failed; trying next"
                    );
                    self.hooks
                        .on_attempt_failure(provider, operation, attempt, &error);
                    last_error = Some(error);
                }
            }
        }

        let error = last_error.unwrap_or_else(|| ProviderError::other("no providers to attempt"));
        self.hooks
            .on_exhausted(operation, attempted.len() as u32, &error);
        Err(ChatError::total_failure(error, attempted))
    }

    fn trigger_refresh(&self) {
        let Some(discovery) = &self.discovery else {
            return;
        };
        if !discovery.is_stale() {
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let discovery = Arc::clone(discovery);
                handle.spawn(async move {
                    discovery.ensure_fresh().await;
                });
            }
            Err(_) => debug!("no async runtime available; skipping catalog refresh"),
        }
    }
}
