//! Common imports for most relay applications.

pub use crate::{
    assistant_turn, build_runtime, build_runtime_with, chat_service, parse_provider_preference,
    request, streaming_request, user_turn,
};
pub use crate::{relay_history, relay_settings, relay_turn};
pub use crate::{
    AttemptHooks, BoxFuture, ChatError, ChatErrorKind, ChatService, ConversationTurn,
    CredentialList, CustomEndpoint, Deadlines, DeltaCallback, ExecutionResult, FallbackExecutor,
    InlineData, ProviderError, ProviderErrorKind, ProviderKind, ProviderPreference, Role,
    RuntimeBundle, RuntimeConfig, Settings, SubmitRequest,
};
