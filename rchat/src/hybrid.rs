//! Concurrent primary + marketplace answers merged by a synthesis pass.
//!
//! Both branches run at once and fail independently. Whatever succeeds
//! is handed to a second round-trip through the fallback executor, even a
//! single answer. When nothing succeeds the original prompt is answered by
//! a plain sequential pass instead. Both final passes run as `auto`, so
//! hybrid never re-enters itself.

use std::sync::Arc;

use futures_util::future::join;
use rprovider::{ProviderError, ProviderKind, ProviderPreference, RequestSpec, Settings};
use tracing::{debug, warn};

use crate::{ChatError, ExecutionResult, FallbackExecutor, SourcedAnswer, plan_for_settings};

pub const HYBRID_OPERATION: &str = "hybrid";
pub const SYNTHESIS_OPERATION: &str = "hybrid_synthesis";
pub const DEGRADED_OPERATION: &str = "hybrid_degraded";

pub const SYNTHESIS_INSTRUCTION: &str =
    "You are a synthesis engine. Combine multiple AI responses into one coherent answer.";
pub const DEGRADED_INSTRUCTION: &str = "You are a helpful AI assistant.";

/// Builds the prompt that asks a model to merge labeled answers.
///
/// ```rust
/// use rchat::{SourcedAnswer, synthesis_prompt};
///
/// let prompt = synthesis_prompt(&[SourcedAnswer::new("Gemini", "42")]);
/// assert!(prompt.contains("--- Gemini ---\n42"));
/// assert!(prompt.ends_with("Provide a unified response:"));
/// ```
pub fn synthesis_prompt(answers: &[SourcedAnswer]) -> String {
    let sections = answers
        .iter()
        .map(|answer| format!("--- {} ---\n{}", answer.source, answer.text))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "Synthesize the following AI responses into one coherent answer. \
         Choose the best parts from each:\n\n{sections}\n\nProvide a unified response:"
    )
}

pub(crate) async fn run_hybrid(
    executor: &FallbackExecutor,
    request: &RequestSpec,
    settings: &Settings,
) -> Result<ExecutionResult, ChatError> {
    let answers = collect_answers(executor, request, settings).await;

    let final_settings = settings.clone().with_provider(ProviderPreference::Auto);
    let providers = plan_for_settings(&final_settings).providers().to_vec();

    if answers.is_empty() {
        warn!("every hybrid branch failed; answering with a single pass");
        let degraded = RequestSpec {
            system_instruction: Some(DEGRADED_INSTRUCTION.to_string()),
            model: None,
            ..request.clone()
        };
        return executor
            .run_sequence(&degraded, &final_settings, &providers, DEGRADED_OPERATION)
            .await;
    }

    debug!(answers = answers.len(), "synthesizing hybrid answers");
    let mut synthesis = RequestSpec::new(synthesis_prompt(&answers))
        .with_system_instruction(SYNTHESIS_INSTRUCTION);
    synthesis.json_mode = request.json_mode;
    if let Some(on_delta) = &request.on_delta {
        synthesis = synthesis.with_delta_callback(Arc::clone(on_delta));
    }

    let mut result = executor
        .run_sequence(&synthesis, &final_settings, &providers, SYNTHESIS_OPERATION)
        .await?;
    result.synthesized_from = answers.iter().map(|answer| answer.source).collect();
    Ok(result)
}

async fn collect_answers(
    executor: &FallbackExecutor,
    request: &RequestSpec,
    settings: &Settings,
) -> Vec<SourcedAnswer> {
    let branch = RequestSpec {
        on_delta: None,
        model: None,
        ..request.clone()
    };
    let primary_request = branch.clone().with_model(executor.hybrid_model());

    let primary = run_branch(
        executor,
        ProviderKind::Gemini,
        1,
        &primary_request,
        settings,
    );
    let marketplace = async {
        if settings.open_router.is_empty() {
            return None;
        }
        run_branch(executor, ProviderKind::OpenRouter, 2, &branch, settings).await
    };

    let (primary, marketplace) = join(primary, marketplace).await;
    [primary, marketplace].into_iter().flatten().collect()
}

async fn run_branch(
    executor: &FallbackExecutor,
    provider: ProviderKind,
    attempt: u32,
    request: &RequestSpec,
    settings: &Settings,
) -> Option<SourcedAnswer> {
    let hooks = executor.hooks();
    hooks.on_attempt_start(provider, HYBRID_OPERATION, attempt);

    let result = match executor.registry().get(provider) {
        Some(caller) => caller.call(request, settings).await,
        None => Err(ProviderError::other(format!(
            "no caller registered for {provider}"
        ))),
    };

    match result {
        Ok(text) => {
            hooks.on_success(provider, HYBRID_OPERATION, attempt);
            Some(SourcedAnswer::new(provider.source_label(), text))
        }
        Err(error) => {
            warn!(
                provider = %provider,
                error_kind = ?error.kind,
                error = %error,
                "hybrid branch failed"
            );
            hooks.on_attempt_failure(provider, HYBRID_OPERATION, attempt, &error);
            None
        }
    }
}
