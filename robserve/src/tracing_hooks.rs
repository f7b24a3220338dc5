//! Tracing-based attempt hooks.
//!
//! ```rust
//! use robserve::TracingAttemptHooks;
//! use rprovider::AttemptHooks;
//!
//! fn accepts_attempt_hooks(_hooks: &dyn AttemptHooks) {}
//!
//! let hooks = TracingAttemptHooks;
//! accepts_attempt_hooks(&hooks);
//! ```

use rprovider::{AttemptHooks, ProviderError, ProviderKind};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAttemptHooks;

impl AttemptHooks for TracingAttemptHooks {
    fn on_attempt_start(&self, provider: ProviderKind, operation: &str, attempt: u32) {
        tracing::info!(
            phase = "provider",
            event = "attempt_start",
            provider = %provider,
            operation,
            attempt
        );
    }

    fn on_attempt_failure(
        &self,
        provider: ProviderKind,
        operation: &str,
        attempt: u32,
        error: &ProviderError,
    ) {
        tracing::warn!(
            phase = "provider",
            event = "attempt_failure",
            provider = %provider,
            operation,
            attempt,
            error_kind = ?error.kind,
            status = error.status,
            retryable = error.retryable,
            error = %error
        );
    }

    fn on_success(&self, provider: ProviderKind, operation: &str, attempts: u32) {
        tracing::info!(
            phase = "provider",
            event = "success",
            provider = %provider,
            operation,
            attempts
        );
    }

    fn on_exhausted(&self, operation: &str, attempts: u32, error: &ProviderError) {
        tracing::error!(
            phase = "provider",
            event = "exhausted",
            operation,
            attempts,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }
}
