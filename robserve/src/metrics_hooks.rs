//! Metrics-based attempt hooks.
//!
//! ```rust
//! use robserve::MetricsAttemptHooks;
//! use rprovider::AttemptHooks;
//!
//! fn accepts_attempt_hooks(_hooks: &dyn AttemptHooks) {}
//!
//! let hooks = MetricsAttemptHooks;
//! accepts_attempt_hooks(&hooks);
//! ```

use rprovider::{AttemptHooks, ProviderError, ProviderKind};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsAttemptHooks;

impl AttemptHooks for MetricsAttemptHooks {
    fn on_attempt_start(&self, provider: ProviderKind, operation: &str, _attempt: u32) {
        metrics::counter!(
            "relay_provider_attempt_start_total",
            "provider" => provider.as_str(),
            "operation" => operation.to_string()
        )
        .increment(1);
    }

    fn on_attempt_failure(
        &self,
        provider: ProviderKind,
        operation: &str,
        _attempt: u32,
        error: &ProviderError,
    ) {
        metrics::counter!(
            "relay_provider_attempt_failure_total",
            "provider" => provider.as_str(),
            "operation" => operation.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }

    fn on_success(&self, provider: ProviderKind, operation: &str, attempts: u32) {
        metrics::counter!(
            "relay_provider_success_total",
            "provider" => provider.as_str(),
            "operation" => operation.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "relay_provider_attempts_per_success",
            "provider" => provider.as_str(),
            "operation" => operation.to_string()
        )
        .record(attempts as f64);
    }

    fn on_exhausted(&self, operation: &str, attempts: u32, error: &ProviderError) {
        metrics::counter!(
            "relay_provider_exhausted_total",
            "operation" => operation.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "relay_provider_attempts_per_exhaustion",
            "operation" => operation.to_string()
        )
        .record(attempts as f64);
    }
}
