//! Small convenience constructors for common request types.

use crate::{ConversationTurn, DeltaCallback, ProviderPreference, Settings, SubmitRequest};

pub fn user_turn(text: impl Into<String>) -> ConversationTurn {
    ConversationTurn::user(text)
}

pub fn assistant_turn(text: impl Into<String>) -> ConversationTurn {
    ConversationTurn::assistant(text)
}

pub fn request(prompt: impl Into<String>, settings: Settings) -> SubmitRequest {
    SubmitRequest::new(prompt, settings)
}

pub fn streaming_request(
    prompt: impl Into<String>,
    settings: Settings,
    on_delta: DeltaCallback,
) -> SubmitRequest {
    SubmitRequest::new(prompt, settings).with_delta_callback(on_delta)
}

/// Parses a provider preference, accepting a few common spellings beyond
/// the canonical persisted names.
pub fn parse_provider_preference(value: &str) -> Option<ProviderPreference> {
    match value.trim().to_ascii_lowercase().as_str() {
        "auto" | "default" => Some(ProviderPreference::Auto),
        "gemini" | "google" => Some(ProviderPreference::Gemini),
        "openrouter" | "open-router" | "open_router" => Some(ProviderPreference::OpenRouter),
        "huggingface" | "hugging-face" | "hugging_face" | "hf" => {
            Some(ProviderPreference::HuggingFace)
        }
        "hybrid" => Some(ProviderPreference::Hybrid),
        "custom" | "local" => Some(ProviderPreference::Custom),
        _ => None,
    }
}
