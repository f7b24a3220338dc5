//! Shared provider error kinds and error value helpers.
//!
//! ```rust
//! use rprovider::{ProviderError, ProviderErrorKind};
//!
//! let limited = ProviderError::transient("rate limited").with_status(429);
//! assert!(limited.retryable);
//! assert_eq!(limited.status, Some(429));
//!
//! let bad = ProviderError::permanent("model not found");
//! assert!(!bad.retryable);
//! assert_eq!(bad.kind, ProviderErrorKind::Permanent);
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// No usable credential remains for the provider.
    CredentialExhausted,
    /// Rate-limit, auth, or payment status: another credential may work.
    Transient,
    /// Any other bad status: skip the model or provider.
    Permanent,
    /// The deadline elapsed before the backend answered.
    Timeout,
    /// The backend answered with something that could not be decoded.
    MalformedResponse,
    Transport,
    InvalidRequest,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
    pub retryable: bool,
    pub status: Option<u16>,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
            status: None,
        }
    }

    pub fn credential_exhausted(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::CredentialExhausted, message, false)
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Transient, message, true)
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Permanent, message, false)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Timeout, message, true)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::MalformedResponse, message, false)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Transport, message, true)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::InvalidRequest, message, false)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Other, message, false)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Wraps this error's message in a provider-specific prefix, keeping kind and status.
    pub fn context(mut self, prefix: impl Display) -> Self {
        self.message = format!("{prefix}: {}", self.message);
        self
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{:?} (http {status}): {}", self.kind, self.message),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for ProviderError {}

impl From<serde_json::Error> for ProviderError {
    fn from(value: serde_json::Error) -> Self {
        ProviderError::malformed(value.to_string())
    }
}
