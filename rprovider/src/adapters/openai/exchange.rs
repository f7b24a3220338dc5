//! One chat-completion round trip shared by the OpenAI-compatible callers.

use std::time::Duration;

use serde_json::Value;

use crate::{
    FrameFormat, HttpRequest, HttpTransport, ProviderError, RequestSpec, decode_event_stream,
};

use super::serde_api::{
    ChatCompletionRequest, ChatMessage, extract_error_message, parse_completion,
};

const ERROR_BODY_LIMIT: usize = 200;

/// A completed exchange: either text or a non-OK status for the caller's
/// [`StatusPolicy`](crate::StatusPolicy) to classify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ChatOutcome {
    Completed(String),
    Rejected { status: u16, message: String },
}

pub(crate) fn completion_body(
    model: &str,
    messages: Vec<ChatMessage>,
    stream: bool,
) -> Result<Value, ProviderError> {
    Ok(serde_json::to_value(ChatCompletionRequest {
        model: model.to_string(),
        messages,
        stream,
    })?)
}

/// Streams when the request carries a delta callback, buffers otherwise.
pub(crate) async fn send_chat_completion(
    transport: &dyn HttpTransport,
    http: HttpRequest,
    deadline: Duration,
    request: &RequestSpec,
) -> Result<ChatOutcome, ProviderError> {
    let response = transport.send(http, deadline).await?;

    if !response.is_success() {
        let status = response.status;
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body).unwrap_or_else(|| {
            format!(
                "request failed with status {status}: {}",
                rcommon::truncate(body.trim(), ERROR_BODY_LIMIT)
            )
        });
        return Ok(ChatOutcome::Rejected { status, message });
    }

    let text = if request.is_streaming() {
        decode_event_stream(response.body, FrameFormat::OpenAiChat, request).await?
    } else {
        parse_completion(&response.bytes().await?)?
    };
    Ok(ChatOutcome::Completed(text))
}
