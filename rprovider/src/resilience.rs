//! Per-provider HTTP status classification and attempt hook contracts.

use std::collections::BTreeSet;

use crate::{ProviderError, ProviderKind};

/// What a caller does after a non-OK status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
    /// Same model, next credential.
    NextCredential,
    /// Abandon the model, continue with the next one.
    NextModel,
    /// Terminal for this provider.
    Abort,
}

/// Maps non-OK statuses to a [`StatusAction`].
///
/// ```rust
/// use rprovider::{StatusAction, StatusPolicy};
///
/// let policy = StatusPolicy::marketplace();
/// assert_eq!(policy.classify(429), StatusAction::NextCredential);
/// assert_eq!(policy.classify(404), StatusAction::NextModel);
///
/// let strict = StatusPolicy::terminal().with_credential_rotation_on([429]);
/// assert_eq!(strict.classify(429), StatusAction::NextCredential);
/// assert_eq!(strict.classify(500), StatusAction::Abort);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPolicy {
    rotate_credential_on: BTreeSet<u16>,
    otherwise: StatusAction,
}

impl StatusPolicy {
    pub fn new(otherwise: StatusAction) -> Self {
        Self {
            rotate_credential_on: BTreeSet::new(),
            otherwise,
        }
    }

    /// Rotates on auth, payment, and rate-limit statuses; drops the model otherwise.
    pub fn marketplace() -> Self {
        Self::new(StatusAction::NextModel).with_credential_rotation_on([401, 402, 429])
    }

    /// Every non-OK status moves on to the next credential.
    pub fn low_resource() -> Self {
        Self::new(StatusAction::NextCredential)
    }

    pub fn terminal() -> Self {
        Self::new(StatusAction::Abort)
    }

    pub fn with_credential_rotation_on(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.rotate_credential_on.extend(statuses);
        self
    }

    pub fn with_fallback_action(mut self, action: StatusAction) -> Self {
        self.otherwise = action;
        self
    }

    pub fn classify(&self, status: u16) -> StatusAction {
        if self.rotate_credential_on.contains(&status) {
            StatusAction::NextCredential
        } else {
            self.otherwise
        }
    }

    /// Builds the error recorded for a non-OK status under this policy.
    pub fn error_for(&self, status: u16, message: impl Into<String>) -> ProviderError {
        let error = match self.classify(status) {
            StatusAction::NextCredential => ProviderError::transient(message),
            StatusAction::NextModel | StatusAction::Abort => ProviderError::permanent(message),
        };
        error.with_status(status)
    }
}

/// Observes the fallback executor's walk over providers.
pub trait AttemptHooks: Send + Sync {
    fn on_attempt_start(&self, _provider: ProviderKind, _operation: &str, _attempt: u32) {}

    fn on_attempt_failure(
        &self,
        _provider: ProviderKind,
        _operation: &str,
        _attempt: u32,
        _error: &ProviderError,
    ) {
    }

    fn on_success(&self, _provider: ProviderKind, _operation: &str, _attempts: u32) {}

    fn on_exhausted(&self, _operation: &str, _attempts: u32, _error: &ProviderError) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAttemptHooks;

impl AttemptHooks for NoopAttemptHooks {}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::ProviderErrorKind;

    #[test]
    fn default_policies_match_provider_behavior() {
        let marketplace = StatusPolicy::marketplace();
        for status in [401, 402, 429] {
            assert_eq!(marketplace.classify(status), StatusAction::NextCredential);
        }
        assert_eq!(marketplace.classify(500), StatusAction::NextModel);

        let low_resource = StatusPolicy::low_resource();
        assert_eq!(low_resource.classify(503), StatusAction::NextCredential);
        assert_eq!(low_resource.classify(400), StatusAction::NextCredential);

        let terminal = StatusPolicy::terminal();
        assert_eq!(terminal.classify(429), StatusAction::Abort);
    }

    #[test]
    fn error_for_uses_classification_for_kind() {
        let marketplace = StatusPolicy::marketplace();

        let limited = marketplace.error_for(429, "slow down");
        assert_eq!(limited.kind, ProviderErrorKind::Transient);
        assert_eq!(limited.status, Some(429));

        let missing = marketplace.error_for(404, "no such model");
        assert_eq!(missing.kind, ProviderErrorKind::Permanent);
        assert!(!missing.retryable);
    }

    #[test]
    fn fallback_action_can_be_overridden() {
        let policy = StatusPolicy::marketplace().with_fallback_action(StatusAction::Abort);
        assert_eq!(policy.classify(500), StatusAction::Abort);
        assert_eq!(policy.classify(402), StatusAction::NextCredential);
    }

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl AttemptHooks for RecordingHooks {
        fn on_attempt_start(&self, provider: ProviderKind, operation: &str, attempt: u32) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("start:{provider}:{operation}:{attempt}"));
        }
    }

    #[test]
    fn hooks_default_methods_are_no_ops() {
        let hooks = RecordingHooks::default();
        let error = ProviderError::timeout("slow");
        hooks.on_attempt_start(ProviderKind::Gemini, "chat", 1);
        hooks.on_attempt_failure(ProviderKind::Gemini, "chat", 1, &error);
        hooks.on_exhausted("chat", 1, &error);

        let events = hooks.events.lock().expect("events lock").clone();
        assert_eq!(events, vec!["start:gemini:chat:1".to_string()]);

        NoopAttemptHooks.on_success(ProviderKind::Custom, "chat", 1);
    }
}
