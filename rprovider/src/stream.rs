//! Incremental decoder for `data: ...` event-stream bodies.
//!
//! Bytes are buffered until a newline arrives, so frames (and UTF-8
//! sequences) split across reads decode exactly once.
//!
//! ```rust
//! use rprovider::{FrameFormat, SseDecoder};
//!
//! let mut decoder = SseDecoder::new(FrameFormat::OpenAiChat);
//! assert!(decoder.push(b"data: {\"choices\":[{\"delta\":{\"con").is_empty());
//! assert_eq!(decoder.push(b"tent\":\"hi\"}}]}\n"), vec!["hi".to_string()]);
//! assert!(decoder.push(b"data: [DONE]\n").is_empty());
//! assert_eq!(decoder.into_text(), "hi");
//! ```

use futures_util::StreamExt;
use serde::Deserialize;

use crate::{ByteStream, ProviderError, RequestSpec};

/// Payload shape carried by each `data:` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// `{"choices":[{"delta":{"content":...}}]}`
    OpenAiChat,
    /// `{"candidates":[{"content":{"parts":[{"text":...}]}}]}`
    Gemini,
}

#[derive(Debug)]
pub struct SseDecoder {
    format: FrameFormat,
    pending: Vec<u8>,
    text: String,
}

impl SseDecoder {
    pub fn new(format: FrameFormat) -> Self {
        Self {
            format,
            pending: Vec::new(),
            text: String::new(),
        }
    }

    /// Feeds one read and returns the deltas completed by it, in wire order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut deltas = Vec::new();
        while let Some(newline) = self.pending.iter().position(|byte| *byte == b'\n') {
            let line = self.pending.drain(..=newline).collect::<Vec<_>>();
            if let Some(delta) = self.decode_line(&line) {
                deltas.push(delta);
            }
        }
        deltas
    }

    /// Decodes a trailing line that arrived without a newline.
    pub fn finish(&mut self) -> Vec<String> {
        let line = std::mem::take(&mut self.pending);
        self.decode_line(&line).into_iter().collect()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    fn decode_line(&mut self, line: &[u8]) -> Option<String> {
        let line = std::str::from_utf8(line).ok()?.trim();
        let payload = line.strip_prefix("data:")?.trim_start();
        if payload.trim() == "[DONE]" {
            return None;
        }

        let delta = match self.format {
            FrameFormat::OpenAiChat => openai_delta(payload),
            FrameFormat::Gemini => gemini_delta(payload),
        }?;
        if delta.is_empty() {
            return None;
        }

        self.text.push_str(&delta);
        Some(delta)
    }
}

/// Drains `body`, forwarding each delta to the request's callback, and
/// returns the concatenated text.
pub async fn decode_event_stream(
    mut body: ByteStream,
    format: FrameFormat,
    request: &RequestSpec,
) -> Result<String, ProviderError> {
    let mut decoder = SseDecoder::new(format);
    while let Some(chunk) = body.next().await {
        for delta in decoder.push(&chunk?) {
            request.emit_delta(&delta);
        }
    }
    for delta in decoder.finish() {
        request.emit_delta(&delta);
    }

    Ok(decoder.into_text())
}

#[derive(Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChatChunkChoice>,
}

#[derive(Deserialize)]
struct ChatChunkChoice {
    #[serde(default)]
    delta: Option<ChatDelta>,
}

#[derive(Deserialize)]
struct ChatDelta {
    #[serde(default)]
    content: Option<String>,
}

fn openai_delta(payload: &str) -> Option<String> {
    let chunk = serde_json::from_str::<ChatChunk>(payload).ok()?;
    chunk.choices.into_iter().next()?.delta?.content
}

#[derive(Deserialize)]
struct GeminiChunk {
    #[serde(default)]
    candidates: Vec<GeminiChunkCandidate>,
}

#[derive(Deserialize)]
struct GeminiChunkCandidate {
    #[serde(default)]
    content: Option<GeminiChunkContent>,
}

#[derive(Deserialize)]
struct GeminiChunkContent {
    #[serde(default)]
    parts: Vec<GeminiChunkPart>,
}

#[derive(Deserialize)]
struct GeminiChunkPart {
    #[serde(default)]
    text: Option<String>,
}

fn gemini_delta(payload: &str) -> Option<String> {
    let chunk = serde_json::from_str::<GeminiChunk>(payload).ok()?;
    let content = chunk.candidates.into_iter().next()?.content?;
    Some(
        content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect::<String>(),
    )
}
