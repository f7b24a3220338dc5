//! Payload and exchange helpers shared by OpenAI-compatible endpoints.

mod exchange;
mod serde_api;

pub(crate) use exchange::{ChatOutcome, completion_body, send_chat_completion};
pub use serde_api::{ChatCompletionRequest, ChatMessage, DEFAULT_SYSTEM_INSTRUCTION, build_messages};
