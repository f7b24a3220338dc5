mod support;

use std::sync::{Arc, Mutex};

use rchat::{DEGRADED_INSTRUCTION, SYNTHESIS_INSTRUCTION};
use rprovider::ProviderKind::{Gemini, OpenRouter};
use rprovider::{CredentialList, ProviderError, ProviderPreference, RequestSpec, Settings};
use support::{ScriptedCaller, executor, journal};

fn hybrid_settings() -> Settings {
    Settings::new(ProviderPreference::Hybrid).with_open_router(CredentialList::new(["k1"]))
}

#[tokio::test]
async fn single_marketplace_success_is_still_synthesized() {
    let journal = journal();
    let gemini = ScriptedCaller::new(
        Gemini,
        vec![
            Err(ProviderError::timeout("pro model timed out")),
            Ok("synthesized"),
        ],
        &journal,
    );
    let market = ScriptedCaller::new(OpenRouter, vec![Ok("market answer")], &journal);
    let executor = executor(&[gemini.clone(), market.clone()]);

    let result = executor
        .execute(&RequestSpec::new("what is rust?"), &hybrid_settings())
        .await
        .expect("synthesis should run");

    assert_eq!(result.text, "synthesized");
    assert_eq!(result.synthesized_from, vec!["OpenRouter"]);
    assert!(result.is_synthesized());

    let gemini_calls = gemini.calls();
    assert_eq!(gemini_calls.len(), 2);
    assert_eq!(gemini_calls[0].model.as_deref(), Some("gemini-2.5-pro"));
    assert_eq!(gemini_calls[0].prompt, "what is rust?");
    let synthesis = &gemini_calls[1];
    assert!(synthesis.prompt.contains("--- OpenRouter ---\nmarket answer"));
    assert_eq!(synthesis.system_instruction.as_deref(), Some(SYNTHESIS_INSTRUCTION));
    assert_eq!(synthesis.model, None);
    assert_eq!(synthesis.history_len, 0);

    assert_eq!(market.calls().len(), 1);
    assert_eq!(market.calls()[0].model, None);
}

#[tokio::test]
async fn both_answers_are_labeled_in_synthesis_prompt() {
    let journal = journal();
    let gemini = ScriptedCaller::new(Gemini, vec![Ok("from pro"), Ok("merged")], &journal);
    let market = ScriptedCaller::new(OpenRouter, vec![Ok("from market")], &journal);
    let executor = executor(&[gemini.clone(), market]);

    let result = executor
        .execute(&RequestSpec::new("compare"), &hybrid_settings())
        .await
        .expect("synthesis should run");

    assert_eq!(result.text, "merged");
    assert_eq!(result.synthesized_from, vec!["Gemini", "OpenRouter"]);
    let prompt = &gemini.calls()[1].prompt;
    let gemini_at = prompt.find("--- Gemini ---\nfrom pro").expect("gemini section");
    let market_at = prompt.find("--- OpenRouter ---\nfrom market").expect("market section");
    assert!(gemini_at < market_at);
}

#[tokio::test]
async fn zero_successes_degrade_to_single_pass_on_original_prompt() {
    let journal = journal();
    let gemini = ScriptedCaller::new(
        Gemini,
        vec![Err(ProviderError::permanent("400")), Ok("plain answer")],
        &journal,
    );
    let market = ScriptedCaller::new(
        OpenRouter,
        vec![Err(ProviderError::transient("429"))],
        &journal,
    );
    let executor = executor(&[gemini.clone(), market]);

    let result = executor
        .execute(&RequestSpec::new("original prompt"), &hybrid_settings())
        .await
        .expect("degraded pass should answer");

    assert_eq!(result.text, "plain answer");
    assert!(!result.is_synthesized());
    let degraded = &gemini.calls()[1];
    assert_eq!(degraded.prompt, "original prompt");
    assert_eq!(degraded.system_instruction.as_deref(), Some(DEGRADED_INSTRUCTION));
    assert_eq!(degraded.model, None);
}

#[tokio::test]
async fn deltas_stream_only_from_the_final_pass() {
    let journal = journal();
    let gemini = ScriptedCaller::new(Gemini, vec![Ok("draft"), Ok("final")], &journal);
    let executor = executor(&[gemini.clone()]);
    let deltas = Arc::new(Mutex::new(Vec::<String>::new()));
    let sink = Arc::clone(&deltas);
    let request = RequestSpec::new("stream me").with_delta_callback(Arc::new(move |delta: &str| {
        sink.lock().expect("deltas lock").push(delta.to_string());
    }));

    let result = executor
        .execute(&request, &Settings::new(ProviderPreference::Hybrid))
        .await
        .expect("synthesis should run");

    assert_eq!(result.text, "final");
    assert_eq!(*deltas.lock().expect("deltas lock"), vec!["final"]);
    let calls = gemini.calls();
    assert!(!calls[0].streaming);
    assert!(calls[1].streaming);
}

#[tokio::test]
async fn marketplace_branch_is_skipped_without_keys() {
    let journal = journal();
    let gemini = ScriptedCaller::new(Gemini, vec![Ok("solo"), Ok("solo merged")], &journal);
    let market = ScriptedCaller::new(OpenRouter, vec![Ok("unused")], &journal);
    let executor = executor(&[gemini, market.clone()]);

    let result = executor
        .execute(&RequestSpec::new("hi"), &Settings::new(ProviderPreference::Hybrid))
        .await
        .expect("synthesis should run");

    assert_eq!(result.text, "solo merged");
    assert_eq!(result.synthesized_from, vec!["Gemini"]);
    assert!(market.calls().is_empty());
    assert_eq!(*journal.lock().expect("journal lock"), vec![Gemini, Gemini]);
}
