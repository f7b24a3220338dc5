use std::future::Future;
use std::pin::Pin;

use crate::{ProviderError, ProviderKind, RequestSpec, Settings};

pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One backend family. Credential and model rotation happen inside `call`;
/// callers see a single success or the last failure.
pub trait ProviderCaller: Send + Sync {
    fn kind(&self) -> ProviderKind;

    fn call<'a>(
        &'a self,
        request: &'a RequestSpec,
        settings: &'a Settings,
    ) -> ProviderFuture<'a, Result<String, ProviderError>>;
}
