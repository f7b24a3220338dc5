mod support;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rchat::ChatErrorKind;
use rprovider::discovery::{LOW_RESOURCE_SAFETY_MODELS, MARKETPLACE_SAFETY_MODELS};
use rprovider::{
    CredentialList, CustomEndpoint, DiscoveryCache, HttpRequest, HttpResponse, HttpTransport,
    ProviderError, ProviderErrorKind, ProviderFuture, ProviderKind, ProviderPreference,
    RequestSpec, Settings,
};
use support::{ScriptedCaller, executor, journal};

use rprovider::ProviderKind::{Custom, Gemini, HuggingFace, OpenRouter};

fn auto_with_everything() -> Settings {
    Settings::new(ProviderPreference::Auto)
        .with_custom_endpoint(CustomEndpoint::new("http://localhost:8080/v1"))
        .with_open_router(CredentialList::new(["k1"]))
}

#[tokio::test]
async fn third_provider_answers_after_first_two_fail_once_each() {
    let journal = journal();
    let custom = ScriptedCaller::new(Custom, vec![Err(ProviderError::permanent("502"))], &journal);
    let gemini = ScriptedCaller::new(
        Gemini,
        vec![Err(ProviderError::credential_exhausted("no primary key"))],
        &journal,
    );
    let market = ScriptedCaller::new(OpenRouter, vec![Ok("third")], &journal);
    let executor = executor(&[custom.clone(), gemini.clone(), market.clone()]);

    let result = executor
        .execute(&RequestSpec::new("hello"), &auto_with_everything())
        .await
        .expect("third provider should answer");

    assert_eq!(result.text, "third");
    assert_eq!(result.provider, OpenRouter);
    assert_eq!(*journal.lock().expect("journal lock"), vec![Custom, Gemini, OpenRouter]);
    assert_eq!(custom.calls().len(), 1);
    assert_eq!(gemini.calls().len(), 1);
}

#[tokio::test]
async fn first_success_wins_without_trying_later_providers() {
    let journal = journal();
    let custom = ScriptedCaller::new(Custom, vec![Ok("local")], &journal);
    let gemini = ScriptedCaller::new(Gemini, vec![Ok("unused")], &journal);
    let executor = executor(&[custom, gemini.clone()]);

    let result = executor
        .execute(&RequestSpec::new("hello"), &auto_with_everything())
        .await
        .expect("custom should answer");

    assert_eq!(result.text, "local");
    assert!(gemini.calls().is_empty());
}

#[tokio::test]
async fn exhaustion_reports_last_error_and_attempt_order() {
    let journal = journal();
    let low = ScriptedCaller::new(
        HuggingFace,
        vec![Err(ProviderError::transient("Model is currently loading"))],
        &journal,
    );
    let gemini = ScriptedCaller::new(
        Gemini,
        vec![Err(ProviderError::timeout("generation exceeded deadline"))],
        &journal,
    );
    let executor = executor(&[low, gemini]);
    let settings = Settings::new(ProviderPreference::HuggingFace)
        .with_hugging_face(CredentialList::new(["h1"]));

    let error = executor
        .execute(&RequestSpec::new("hello"), &settings)
        .await
        .expect_err("every provider fails");

    assert_eq!(error.kind, ChatErrorKind::TotalFailure);
    assert_eq!(error.attempted, vec![HuggingFace, Gemini]);
    let last = error.last_error.expect("last error is kept");
    assert_eq!(last.kind, ProviderErrorKind::Timeout);
    assert!(error.message.ends_with("generation exceeded deadline"));
}

#[tokio::test]
async fn auto_without_configuration_only_tries_primary() {
    let journal = journal();
    let gemini = ScriptedCaller::new(Gemini, vec![Ok("primary")], &journal);
    let market = ScriptedCaller::new(OpenRouter, vec![Ok("unused")], &journal);
    let executor = executor(&[gemini, market.clone()]);

    let result = executor
        .execute(&RequestSpec::new("hello"), &Settings::default())
        .await
        .expect("primary answers");

    assert_eq!(result.attempted, vec![Gemini]);
    assert!(market.calls().is_empty());
}

#[tokio::test]
async fn pinned_provider_falls_back_to_primary_then_custom() {
    let journal = journal();
    let market = ScriptedCaller::new(OpenRouter, vec![Err(ProviderError::permanent("404"))], &journal);
    let gemini = ScriptedCaller::new(Gemini, vec![Err(ProviderError::permanent("400"))], &journal);
    let custom = ScriptedCaller::new(Custom, vec![Ok("safety net")], &journal);
    let executor = executor(&[market, gemini, custom]);
    let settings = Settings::new(ProviderPreference::OpenRouter)
        .with_custom_endpoint(CustomEndpoint::new("http://localhost:8080/v1"));

    let result = executor
        .execute(&RequestSpec::new("hello"), &settings)
        .await
        .expect("custom endpoint answers");

    assert_eq!(result.text, "safety net");
    assert_eq!(*journal.lock().expect("journal lock"), vec![OpenRouter, Gemini, Custom]);
}

#[derive(Default)]
struct OfflineTransport {
    urls: Mutex<Vec<String>>,
}

impl HttpTransport for OfflineTransport {
    fn send<'a>(
        &'a self,
        request: HttpRequest,
        _deadline: Duration,
    ) -> ProviderFuture<'a, Result<HttpResponse, ProviderError>> {
        Box::pin(async move {
            self.urls.lock().expect("urls lock").push(request.url);
            Err(ProviderError::transport("network unreachable"))
        })
    }
}

#[tokio::test]
async fn stale_catalog_refreshes_in_background_without_failing_the_call() {
    let journal = journal();
    let gemini = ScriptedCaller::new(Gemini, vec![Ok("answer")], &journal);
    let transport = Arc::new(OfflineTransport::default());
    let discovery = Arc::new(DiscoveryCache::new(transport.clone()));
    let executor = executor(&[gemini]).with_discovery(discovery.clone());

    let result = executor
        .execute(&RequestSpec::new("hello"), &Settings::default())
        .await
        .expect("refresh failure must not fail the call");
    assert_eq!(result.text, "answer");

    for _ in 0..100 {
        if discovery.last_refreshed().is_some() {
            break;
        }
        tokio::task::yield_now().await;
    }

    assert!(discovery.last_refreshed().is_some());
    assert_eq!(transport.urls.lock().expect("urls lock").len(), 2);
    assert_eq!(discovery.marketplace_models(), MARKETPLACE_SAFETY_MODELS.to_vec());
    assert_eq!(discovery.low_resource_models(), LOW_RESOURCE_SAFETY_MODELS.to_vec());
}
