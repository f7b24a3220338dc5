//! Provider callers, streaming decode, and model discovery for relay.
//!
//! Each backend family implements [`ProviderCaller`]. Callers share a
//! deadline-guarded [`HttpTransport`], the [`SseDecoder`] for event-stream
//! bodies, and the process-wide [`DiscoveryCache`] of free models.
//!
//! ```rust
//! use rprovider::{CredentialList, ProviderPreference, RequestSpec, Settings};
//!
//! let settings = Settings::new(ProviderPreference::OpenRouter)
//!     .with_open_router(CredentialList::new(["k1", "k2"]));
//! let request = RequestSpec::new("hello").enable_json_mode();
//!
//! assert_eq!(settings.open_router.len(), 2);
//! assert!(request.validate().is_ok());
//! ```

pub mod adapters;
mod credentials;
pub mod discovery;
mod error;
mod model;
pub mod prelude;
mod provider;
mod registry;
mod resilience;
mod settings;
mod stream;
mod transport;

pub use credentials::{CredentialList, SecretString};
pub use discovery::{CatalogEntry, DiscoveryCache};
pub use error::{ProviderError, ProviderErrorKind};
pub use model::{ConversationTurn, DeltaCallback, InlineData, ProviderKind, RequestSpec, Role};
pub use provider::{ProviderCaller, ProviderFuture};
pub use registry::ProviderRegistry;
pub use resilience::{AttemptHooks, NoopAttemptHooks, StatusAction, StatusPolicy};
pub use settings::{CustomEndpoint, ProviderPreference, Settings};
pub use stream::{FrameFormat, SseDecoder, decode_event_stream};
pub use transport::{
    ByteStream, Deadlines, HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport,
    with_deadline,
};
pub use rcommon::BoxFuture;
