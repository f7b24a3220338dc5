use std::sync::{Arc, Mutex};

use rprovider::{AttemptHooks, ProviderError, ProviderKind};

use crate::{MetricsAttemptHooks, SafeAttemptHooks, TracingAttemptHooks};

fn drive(hooks: &dyn AttemptHooks) {
    let error = ProviderError::transient("rate limited").with_status(429);

    hooks.on_attempt_start(ProviderKind::OpenRouter, "execute", 1);
    hooks.on_attempt_failure(ProviderKind::OpenRouter, "execute", 1, &error);
    hooks.on_attempt_start(ProviderKind::Gemini, "execute", 2);
    hooks.on_success(ProviderKind::Gemini, "execute", 2);
    hooks.on_exhausted("hybrid_synthesis", 3, &error);
}

#[test]
fn tracing_hooks_smoke_test_all_callbacks() {
    drive(&TracingAttemptHooks);
}

#[test]
fn metrics_hooks_smoke_test_all_callbacks() {
    drive(&MetricsAttemptHooks);
}

#[derive(Default, Clone)]
struct RecordingHooks {
    events: Arc<Mutex<Vec<&'static str>>>,
}

impl AttemptHooks for RecordingHooks {
    fn on_attempt_start(&self, _provider: ProviderKind, _operation: &str, _attempt: u32) {
        self.events.lock().expect("events lock").push("attempt_start");
    }

    fn on_attempt_failure(
        &self,
        _provider: ProviderKind,
        _operation: &str,
        _attempt: u32,
        _error: &ProviderError,
    ) {
        self.events.lock().expect("events lock").push("attempt_failure");
    }

    fn on_success(&self, _provider: ProviderKind, _operation: &str, _attempts: u32) {
        self.events.lock().expect("events lock").push("success");
    }

    fn on_exhausted(&self, _operation: &str, _attempts: u32, _error: &ProviderError) {
        self.events.lock().expect("events lock").push("exhausted");
    }
}

#[test]
fn safe_hooks_forward_every_callback() {
    let recording = RecordingHooks::default();
    let events = Arc::clone(&recording.events);

    drive(&SafeAttemptHooks::new(recording));

    assert_eq!(
        *events.lock().expect("events lock"),
        vec![
            "attempt_start",
            "attempt_failure",
            "attempt_start",
            "success",
            "exhausted"
        ]
    );
}

struct PanickingHooks;

impl AttemptHooks for PanickingHooks {
    fn on_attempt_start(&self, _provider: ProviderKind, _operation: &str, _attempt: u32) {
        panic!("attempt start hook panic");
    }

    fn on_exhausted(&self, _operation: &str, _attempts: u32, _error: &ProviderError) {
        panic!("exhausted hook panic");
    }
}

#[test]
fn safe_hooks_swallow_panics() {
    drive(&SafeAttemptHooks::new(PanickingHooks));
}
