//! Runtime wiring from environment configuration.
//!
//! [`build_runtime`] assembles the production stack: one reqwest-backed
//! transport shared by every caller, the process-wide discovery cache, and
//! tracing attempt hooks guarded against panics.

use std::sync::Arc;

use reqwest::Client;
use tracing::{debug, warn};

use crate::{
    AttemptHooks, ChatService, Deadlines, DiscoveryCache, FallbackExecutor, HttpTransport,
    ProviderError, ProviderRegistry, ReqwestTransport, SafeAttemptHooks, SecretString,
    TracingAttemptHooks,
};

pub const PRIMARY_KEY_VAR: &str = "GEMINI_API_KEY";
pub const FALLBACK_KEY_VAR: &str = "API_KEY";
pub const MISSING_KEY_PLACEHOLDER: &str = "MISSING_KEY";
pub const MIN_KEY_LEN: usize = 10;

/// Marketplace attribution sent as `HTTP-Referer` and `X-Title`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    pub referer: String,
    pub title: String,
}

#[derive(Clone, Default)]
pub struct RuntimeConfig {
    pub primary_key: Option<SecretString>,
    pub deadlines: Deadlines,
    pub attribution: Option<Attribution>,
    pub persona: Option<String>,
    pub hooks: Option<Arc<dyn AttemptHooks>>,
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the primary service key from `GEMINI_API_KEY`, then `API_KEY`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`RuntimeConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = lookup(PRIMARY_KEY_VAR).or_else(|| lookup(FALLBACK_KEY_VAR));
        Self {
            primary_key: raw.and_then(|value| validate_primary_key(&value)),
            ..Self::default()
        }
    }

    pub fn with_primary_key(mut self, key: impl Into<String>) -> Self {
        self.primary_key = validate_primary_key(&key.into());
        self
    }

    pub fn with_deadlines(mut self, deadlines: Deadlines) -> Self {
        self.deadlines = deadlines;
        self
    }

    pub fn with_attribution(mut self, referer: impl Into<String>, title: impl Into<String>) -> Self {
        self.attribution = Some(Attribution {
            referer: referer.into(),
            title: title.into(),
        });
        self
    }

    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = Some(persona.into());
        self
    }

    /// Replaces the default panic-guarded tracing hooks.
    pub fn with_hooks(mut self, hooks: Arc<dyn AttemptHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn has_primary_key(&self) -> bool {
        self.primary_key.is_some()
    }
}

impl std::fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeConfig")
            .field("primary_key", &self.primary_key)
            .field("deadlines", &self.deadlines)
            .field("attribution", &self.attribution)
            .field("persona", &self.persona)
            .field("custom_hooks", &self.hooks.is_some())
            .finish()
    }
}

/// Keys that are too short or still hold the build placeholder count as absent.
pub fn validate_primary_key(value: &str) -> Option<SecretString> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if value == MISSING_KEY_PLACEHOLDER || value.len() < MIN_KEY_LEN {
        warn!(
            provider = "gemini",
            length = value.len(),
            "primary service key is missing or invalid; requests to it will fail"
        );
        return None;
    }
    Some(SecretString::new(value))
}

#[derive(Clone)]
pub struct RuntimeBundle {
    pub discovery: Arc<DiscoveryCache>,
    pub executor: Arc<FallbackExecutor>,
    pub chat: ChatService,
}

/// Registers a caller for every enabled provider family.
pub fn build_registry(
    config: &RuntimeConfig,
    transport: Arc<dyn HttpTransport>,
    discovery: Arc<DiscoveryCache>,
) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();

    #[cfg(feature = "provider-gemini")]
    registry.register(
        rprovider::adapters::gemini::GeminiCaller::new(
            Arc::clone(&transport),
            config.primary_key.clone(),
        )
        .with_deadline(config.deadlines.generation),
    );

    #[cfg(feature = "provider-openrouter")]
    {
        let mut caller = rprovider::adapters::openrouter::OpenRouterCaller::new(
            Arc::clone(&transport),
            Arc::clone(&discovery),
        )
        .with_deadline(config.deadlines.generation);
        if let Some(attribution) = &config.attribution {
            caller = caller.with_attribution(&attribution.referer, &attribution.title);
        }
        registry.register(caller);
    }

    #[cfg(feature = "provider-custom")]
    registry.register(
        rprovider::adapters::custom::CustomEndpointCaller::new(Arc::clone(&transport))
            .with_deadline(config.deadlines.generation),
    );

    #[cfg(feature = "provider-huggingface")]
    registry.register(
        rprovider::adapters::huggingface::HuggingFaceCaller::new(
            Arc::clone(&transport),
            Arc::clone(&discovery),
        )
        .with_deadline(config.deadlines.low_resource),
    );

    debug!(providers = registry.len(), "provider registry built");
    registry
}

pub fn chat_service(executor: Arc<FallbackExecutor>, config: &RuntimeConfig) -> ChatService {
    let service = ChatService::new(executor);
    match &config.persona {
        Some(persona) => service.with_persona(persona.clone()),
        None => service,
    }
}

/// Production runtime over reqwest. Uses the process-wide discovery cache
/// unless the discovery deadline was changed.
pub fn build_runtime(config: RuntimeConfig) -> Result<RuntimeBundle, ProviderError> {
    let client = Client::builder()
        .build()
        .map_err(|err| ProviderError::transport(err.to_string()))?;
    let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new(client));

    let discovery = if config.deadlines.discovery == Deadlines::default().discovery {
        DiscoveryCache::global()
    } else {
        Arc::new(
            DiscoveryCache::new(Arc::clone(&transport)).with_deadline(config.deadlines.discovery),
        )
    };

    Ok(build_runtime_with(config, transport, discovery))
}

pub fn build_runtime_with(
    config: RuntimeConfig,
    transport: Arc<dyn HttpTransport>,
    discovery: Arc<DiscoveryCache>,
) -> RuntimeBundle {
    let registry = build_registry(&config, transport, Arc::clone(&discovery));
    let hooks: Arc<dyn AttemptHooks> = match config.hooks.clone() {
        Some(hooks) => hooks,
        None => Arc::new(SafeAttemptHooks::new(TracingAttemptHooks)),
    };

    let executor = Arc::new(
        FallbackExecutor::new(registry)
            .with_discovery(Arc::clone(&discovery))
            .with_hooks(hooks),
    );
    let chat = chat_service(Arc::clone(&executor), &config);

    RuntimeBundle {
        discovery,
        executor,
        chat,
    }
}
