use std::panic::{AssertUnwindSafe, catch_unwind};

use rprovider::{AttemptHooks, ProviderError, ProviderKind};

/// Wraps another hook so a panic inside it never reaches the executor.
pub struct SafeAttemptHooks<H> {
    inner: H,
}

impl<H> SafeAttemptHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> H {
        self.inner
    }
}

impl<H> AttemptHooks for SafeAttemptHooks<H>
where
    H: AttemptHooks,
{
    fn on_attempt_start(&self, provider: ProviderKind, operation: &str, attempt: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_attempt_start(provider, operation, attempt)
        }));
    }

    fn on_attempt_failure(
        &self,
        provider: ProviderKind,
        operation: &str,
        attempt: u32,
        error: &ProviderError,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_attempt_failure(provider, operation, attempt, error)
        }));
    }

    fn on_success(&self, provider: ProviderKind, operation: &str, attempts: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_success(provider, operation, attempts)
        }));
    }

    fn on_exhausted(&self, operation: &str, attempts: u32, error: &ProviderError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_exhausted(operation, attempts, error)
        }));
    }
}
