//! Common `rprovider` imports for downstream crates.

pub use crate::{
    AttemptHooks, ConversationTurn, CredentialList, CustomEndpoint, Deadlines, DiscoveryCache,
    HttpTransport, InlineData, NoopAttemptHooks, ProviderCaller, ProviderError,
    ProviderErrorKind, ProviderFuture, ProviderKind, ProviderPreference, ProviderRegistry,
    RequestSpec, Role, SecretString, Settings, StatusAction, StatusPolicy,
};
pub use rcommon::BoxFuture;
