//! Unified facade over the relay workspace crates.
//!
//! Most applications depend on this crate alone. It re-exports the provider,
//! chat, extraction, and observability crates, wires a ready-to-use
//! [`ChatService`] from the environment, and offers a few helpers and macros
//! for building requests.
//!
//! ```rust,no_run
//! use relay::{RuntimeConfig, Settings, SubmitRequest, build_runtime};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let runtime = build_runtime(RuntimeConfig::from_env())?;
//! let answer = runtime
//!     .chat
//!     .submit(SubmitRequest::new("Explain borrowing.", Settings::default()))
//!     .await?;
//! println!("{answer}");
//! # Ok(())
//! # }
//! ```

mod macros;

pub mod prelude;
pub mod runtime;
pub mod util;

pub use rchat;
pub use rcommon;
pub use rextract;
pub use robserve;
pub use rprovider;

pub use rchat::{
    ChatError, ChatErrorKind, ChatService, DEFAULT_PERSONA, ExecutionPlan, ExecutionResult,
    FallbackExecutor, MemoryRecord, OfflineCache, ProviderPlan, SessionSummary, Skill,
    SourcedAnswer, SubmitRequest, plan_for_settings, plan_providers, relevant_memories,
    render_error,
};
pub use rcommon::BoxFuture;
pub use rextract::{ExtractError, ExtractErrorKind, extract_as, extract_json, strip_code_fences};
pub use robserve::{MetricsAttemptHooks, SafeAttemptHooks, TracingAttemptHooks};
pub use rprovider::{
    AttemptHooks, ConversationTurn, CredentialList, CustomEndpoint, Deadlines, DeltaCallback,
    DiscoveryCache, HttpTransport, InlineData, NoopAttemptHooks, ProviderCaller, ProviderError,
    ProviderErrorKind, ProviderFuture, ProviderKind, ProviderPreference, ProviderRegistry,
    ReqwestTransport, RequestSpec, Role, SecretString, Settings, StatusPolicy,
};

pub use runtime::{
    Attribution, RuntimeBundle, RuntimeConfig, build_registry, build_runtime, build_runtime_with,
    chat_service,
};
pub use util::{assistant_turn, parse_provider_preference, request, streaming_request, user_turn};

#[cfg(test)]
mod tests {
    use crate::{ProviderPreference, Role};

    #[test]
    fn relay_turn_macro_creates_expected_turn() {
        let turn = crate::relay_turn!(user => "hello");
        assert_eq!(turn.role, Role::User);
        assert_eq!(turn.text, "hello");
    }

    #[test]
    fn relay_history_macro_builds_turn_vector() {
        let history = crate::relay_history![
            user => "What is a lifetime?",
            model => "A region of code where a reference is valid.",
        ];

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[1].role, Role::Assistant);
        assert!(crate::relay_history![].is_empty());
    }

    #[test]
    fn relay_settings_macro_supports_preference_shorthand() {
        let settings = crate::relay_settings!(openrouter, ["or-key-1", "or-key-2"]);
        assert_eq!(settings.provider, ProviderPreference::OpenRouter);
        assert_eq!(settings.open_router.len(), 2);

        let hybrid = crate::relay_settings!(hybrid);
        assert_eq!(hybrid.provider, ProviderPreference::Hybrid);
        assert!(hybrid.open_router.is_empty());
    }
}
