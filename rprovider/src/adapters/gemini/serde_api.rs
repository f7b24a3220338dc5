//! Gemini `generateContent` payload models.

use serde::{Deserialize, Serialize};

use crate::{ProviderError, RequestSpec, Role};

pub const THINKING_BUDGET: u32 = 32_768;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<SystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Content {
    pub role: &'static str,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum Part {
    Text { text: String },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlinePart,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlinePart {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SystemInstruction {
    pub parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<ThinkingConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ThinkingConfig {
    pub thinking_budget: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Tool {
    pub google_search: EmptyObject,
}

#[derive(Debug, Serialize)]
pub(crate) struct EmptyObject {}

/// History as `user`/`model` turns; attachments ride on the final user turn.
pub(crate) fn build_request(
    request: &RequestSpec,
    thinking_budget: Option<u32>,
) -> GenerateContentRequest {
    let mut contents = request
        .history
        .iter()
        .map(|turn| Content {
            role: match turn.role {
                Role::User => "user",
                Role::Assistant => "model",
            },
            parts: vec![Part::Text {
                text: turn.text.clone(),
            }],
        })
        .collect::<Vec<_>>();

    let mut user_parts = Vec::new();
    if !request.prompt.trim().is_empty() || request.attachments.is_empty() {
        user_parts.push(Part::Text {
            text: request.prompt.clone(),
        });
    }
    user_parts.extend(request.attachments.iter().map(|attachment| Part::Inline {
        inline_data: InlinePart {
            mime_type: attachment.mime_type.clone(),
            data: attachment.data.clone(),
        },
    }));
    contents.push(Content {
        role: "user",
        parts: user_parts,
    });

    let system_instruction = request
        .system_instruction
        .as_deref()
        .filter(|instruction| !instruction.trim().is_empty())
        .map(|instruction| SystemInstruction {
            parts: vec![Part::Text {
                text: instruction.to_string(),
            }],
        });

    let config = GenerationConfig {
        response_mime_type: request.json_mode.then_some("application/json"),
        thinking_config: thinking_budget.map(|thinking_budget| ThinkingConfig { thinking_budget }),
    };
    let generation_config = (config.response_mime_type.is_some()
        || config.thinking_config.is_some())
    .then_some(config);

    let tools = if request.use_tools && !request.json_mode {
        vec![Tool {
            google_search: EmptyObject {},
        }]
    } else {
        Vec::new()
    };

    GenerateContentRequest {
        contents,
        system_instruction,
        generation_config,
        tools,
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GroundingChunk {
    #[serde(default)]
    pub web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WebSource {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Text of the first candidate, followed by a deduplicated `**Sources:**`
/// block when grounding metadata carries web links.
pub(crate) fn parse_buffered(body: &[u8]) -> Result<String, ProviderError> {
    let parsed = serde_json::from_slice::<GenerateContentResponse>(body)?;
    let candidate = parsed
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::malformed("response has no candidates"))?;

    let mut text = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    let links = candidate
        .grounding_metadata
        .map(|metadata| {
            metadata
                .grounding_chunks
                .into_iter()
                .filter_map(|chunk| chunk.web)
                .filter_map(|web| {
                    let uri = web.uri.filter(|uri| !uri.is_empty())?;
                    let title = web.title.unwrap_or_else(|| uri.clone());
                    Some(format!("[{title}]({uri})"))
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    if text.is_empty() && links.is_empty() {
        return Err(ProviderError::malformed("response candidate has no text"));
    }

    let links = rcommon::dedupe_preserving_order(links);
    if !links.is_empty() {
        text.push_str("\n\n**Sources:**\n");
        text.push_str(&links.join("\n"));
    }
    Ok(text)
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok()?;
    Some(parsed.error.message).filter(|message| !message.is_empty())
}
