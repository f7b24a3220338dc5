//! Extraction errors and classifications.

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractErrorKind {
    /// No strategy in the cascade produced valid JSON.
    NoParseableJson,
    MissingField,
    /// JSON parsed but does not have the expected shape.
    InvalidShape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractError {
    pub kind: ExtractErrorKind,
    pub message: String,
    pub retryable: bool,
    pub field: Option<String>,
}

impl ExtractError {
    pub fn new(kind: ExtractErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
            field: None,
        }
    }

    /// A different completion may well contain parseable JSON, so this one is retryable.
    pub fn no_parseable_json(message: impl Into<String>) -> Self {
        Self::new(ExtractErrorKind::NoParseableJson, message, true)
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(
            ExtractErrorKind::MissingField,
            format!("missing required field: '{field}'"),
            false,
        )
        .with_field(field)
    }

    pub fn invalid_shape(message: impl Into<String>) -> Self {
        Self::new(ExtractErrorKind::InvalidShape, message, false)
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }
}

impl Display for ExtractError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.field {
            Some(field) if self.kind != ExtractErrorKind::MissingField => {
                write!(f, "{:?} [field={}]: {}", self.kind, field, self.message)
            }
            _ => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for ExtractError {}
