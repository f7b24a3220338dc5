//! Chat-layer errors and classification.

use std::error::Error;
use std::fmt::{Display, Formatter};

use rextract::ExtractError;
use rprovider::{ProviderError, ProviderErrorKind, ProviderKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    InvalidRequest,
    /// Every attempted provider failed.
    TotalFailure,
    /// A structured-output feature could not read the model's answer.
    Extraction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
    pub retryable: bool,
    /// The error reported by the last provider tried.
    pub last_error: Option<ProviderError>,
    /// Providers tried before giving up, in attempt order.
    pub attempted: Vec<ProviderKind>,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
            last_error: None,
            attempted: Vec::new(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidRequest, message, false)
    }

    pub fn total_failure(last_error: ProviderError, attempted: Vec<ProviderKind>) -> Self {
        let mut error = Self::new(
            ChatErrorKind::TotalFailure,
            format!(
                "All available AI providers failed. Last error: {}",
                last_error.message
            ),
            true,
        );
        error.last_error = Some(last_error);
        error.attempted = attempted;
        error
    }

    pub fn extraction(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Extraction, message, false)
    }

    pub fn is_total_failure(&self) -> bool {
        self.kind == ChatErrorKind::TotalFailure
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ChatError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.last_error
            .as_ref()
            .map(|error| error as &(dyn Error + 'static))
    }
}

impl From<ProviderError> for ChatError {
    fn from(value: ProviderError) -> Self {
        match value.kind {
            ProviderErrorKind::InvalidRequest => ChatError::invalid_request(value.message),
            _ => ChatError::total_failure(value, Vec::new()),
        }
    }
}

impl From<ExtractError> for ChatError {
    fn from(value: ExtractError) -> Self {
        ChatError::extraction(value.to_string())
    }
}
