//! Structured-output features built on the chat service.
//!
//! Each feature builds one request, runs it through the fallback executor
//! and, where it expects JSON, reads the answer with `rextract`. Features
//! documented as silent return `None` on any failure; the rest surface
//! [`ChatError`].

use rextract::{
    extract_json, extract_object, flag, optional_string, optional_u64, required_string,
    strip_code_fences, string_list, value_list,
};
use rprovider::{ConversationTurn, RequestSpec, Settings};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::{
    ChatError, ChatService, ExecutionPlan, MemoryRecord, OfflineCache, SessionSummary, Skill,
    SubmitRequest,
};

const SKILL_SHAPE: &str = r#"Return JSON { "skillName": "", "description": "", "code": "" }."#;
const MEMORY_SHAPE: &str =
    r#"Return JSON { "worthy": boolean, "title": "", "content": "", "tags": [], "importance": 1 }."#;
const SESSION_PREVIEW_CHARS: usize = 50;
const PROPOSAL_HISTORY_TURNS: usize = 5;
const MAX_RELEVANT_MEMORIES: usize = 3;

impl ChatService {
    /// A conversational turn under the service persona.
    ///
    /// `relevant_memories` are prepended as `[MEMORY]` context unless the
    /// turn carries attachments.
    pub async fn chat_response(
        &self,
        request: SubmitRequest,
        relevant_memories: &[String],
    ) -> Result<String, ChatError> {
        let mut request = request.with_system_instruction(self.persona());
        if request.attachments.is_empty() && !relevant_memories.is_empty() {
            let context = format!("\n\n[MEMORY]:\n{}\n", relevant_memories.join("\n"));
            request.prompt = format!("{context}\n{}", request.prompt);
        }
        self.submit(request).await
    }

    pub async fn analyze_url(&self, url: &str, settings: &Settings) -> Result<String, ChatError> {
        let request = RequestSpec::new(format!("Analyze this URL: {url}"))
            .with_system_instruction(
                "You are a Web Content Analyst. Summarize the page content concisely.",
            )
            .enable_tools();
        self.answer(&request, settings).await
    }

    pub async fn deep_research(&self, topic: &str, settings: &Settings) -> Result<String, ChatError> {
        let request = RequestSpec::new(format!("Research on: \"{topic}\""))
            .with_system_instruction("You are a Research Analyst. Provide a comprehensive report.")
            .enable_tools();
        self.answer(&request, settings).await
    }

    /// The id of a known session the prompt asks to switch to. Silent.
    pub async fn detect_session_switch(
        &self,
        prompt: &str,
        sessions: &[SessionSummary],
        settings: &Settings,
    ) -> Option<String> {
        if sessions.is_empty() {
            return None;
        }

        let previews = sessions.iter().map(session_preview).collect::<Vec<_>>();
        let available = serde_json::to_string(&previews).ok()?;
        let request = RequestSpec::new("Analyze intent.")
            .with_system_instruction(format!(
                "Session Manager. User Prompt: \"{prompt}\". Available: {available}. \
                 Return JSON {{ \"switch\": true, \"sessionId\": \"...\" }} if user wants to switch context."
            ))
            .enable_json_mode();

        let object = self.structured(&request, settings).await.ok()?;
        if !flag(&object, "switch") {
            return None;
        }
        let session_id = optional_string(&object, "sessionId")?;
        sessions
            .iter()
            .any(|session| session.id == session_id)
            .then_some(session_id)
    }

    /// The skill the prompt should run, with its arguments. Silent.
    pub async fn match_skill(
        &self,
        prompt: &str,
        skills: &[Skill],
        settings: &Settings,
    ) -> Option<ExecutionPlan> {
        if skills.is_empty() {
            return None;
        }

        let names = skills.iter().map(|skill| skill.name.as_str()).collect::<Vec<_>>();
        let request = RequestSpec::new(format!(
            "Match skill: \"{prompt}\"\nSkills: {}\nReturn JSON {{ \"match\": true, \"skillName\": \"\", \"args\": [] }}",
            json!(names)
        ))
        .enable_json_mode();

        let object = self.structured(&request, settings).await.ok()?;
        if !flag(&object, "match") {
            return None;
        }
        let name = optional_string(&object, "skillName")?;
        let skill = skills.iter().find(|skill| skill.name == name)?;
        Some(ExecutionPlan {
            skill_name: skill.name.clone(),
            code: skill.code.clone(),
            args: value_list(&object, "args"),
        })
    }

    pub async fn learn_skill(&self, prompt: &str, settings: &Settings) -> Result<Skill, ChatError> {
        let request = RequestSpec::new(prompt)
            .with_system_instruction(SKILL_SHAPE)
            .enable_json_mode();
        let object = self.structured(&request, settings).await?;
        read_skill(&object)
    }

    pub async fn learn_skill_from_url(
        &self,
        prompt: &str,
        settings: &Settings,
    ) -> Result<Skill, ChatError> {
        let request = RequestSpec::new(prompt)
            .with_system_instruction(format!("Extract skill from URL content. {SKILL_SHAPE}"))
            .enable_json_mode();
        let object = self.structured(&request, settings).await?;
        read_skill(&object)
    }

    /// Asks for a new skill that complements `skills`, then learns it.
    pub async fn propose_self_upgrade(
        &self,
        skills: &[Skill],
        settings: &Settings,
    ) -> Result<Skill, ChatError> {
        let names = skills.iter().map(|skill| skill.name.as_str()).collect::<Vec<_>>();
        let request = RequestSpec::new(format!(
            "Propose skill from: {}. Return \"learn how to...\"",
            json!(names)
        ));
        let proposal = self.answer(&request, settings).await?;
        self.learn_skill(&proposal, settings).await
    }

    /// A skill suggested by the recent conversation, if any. Silent.
    pub async fn propose_skill_from_history(
        &self,
        history: &[ConversationTurn],
        settings: &Settings,
    ) -> Option<Skill> {
        let recent = history
            .iter()
            .skip(history.len().saturating_sub(PROPOSAL_HISTORY_TURNS))
            .map(|turn| turn.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let request = RequestSpec::new(format!(
            "Suggest skill? Return \"learn how to...\" or \"NO\".\n{recent}"
        ));

        let proposal = self.answer(&request, settings).await.ok()?;
        if proposal.contains("NO") {
            return None;
        }
        self.learn_skill(&proposal, settings).await.ok()
    }

    /// Repaired code with markdown fences removed.
    pub async fn fix_skill_code(
        &self,
        code: &str,
        error: &str,
        settings: &Settings,
    ) -> Result<String, ChatError> {
        let request = RequestSpec::new(format!("Error: \"{error}\"\nCode:\n{code}"))
            .with_system_instruction("Fix JS code. Return ONLY code.");
        let fixed = self.answer(&request, settings).await?;
        Ok(strip_code_fences(&fixed))
    }

    /// A memory worth keeping from the conversation. Silent.
    pub async fn extract_memory(
        &self,
        history: &[ConversationTurn],
        settings: &Settings,
    ) -> Option<MemoryRecord> {
        if history.len() < 3 {
            return None;
        }

        let request = RequestSpec::new(format!("Analyze chat for memory. {MEMORY_SHAPE}"))
            .with_history(history.to_vec())
            .enable_json_mode();
        let object = match self.structured(&request, settings).await {
            Ok(object) => object,
            Err(error) => {
                debug!(error = %error, "memory extraction produced no result");
                return None;
            }
        };
        if !flag(&object, "worthy") {
            return None;
        }
        read_memory(&object).ok()
    }

    pub async fn structure_memory(
        &self,
        content: &str,
        settings: &Settings,
    ) -> Result<MemoryRecord, ChatError> {
        let request = RequestSpec::new(format!(
            "Analyze and structure this memory: \"{content}\". \
             Return JSON {{ \"title\": \"\", \"content\": \"\", \"tags\": [], \"importance\": 1 }}."
        ))
        .enable_json_mode();
        let object = self.structured(&request, settings).await?;
        read_memory(&object)
    }

    /// Key-value summary of the conversation for offline use. Silent.
    pub async fn offline_cache(
        &self,
        history: &[ConversationTurn],
        settings: &Settings,
    ) -> Option<OfflineCache> {
        if history.len() < 2 {
            return None;
        }

        let request = RequestSpec::new("Summarize to JSON key-value.")
            .with_history(history.to_vec())
            .enable_json_mode();
        let text = self.answer(&request, settings).await.ok()?;
        match extract_json(&text).ok()? {
            Value::Object(object) => Some(
                object
                    .into_iter()
                    .map(|(key, value)| match value {
                        Value::String(text) => (key, text),
                        other => (key, other.to_string()),
                    })
                    .collect(),
            ),
            _ => None,
        }
    }

    async fn answer(&self, request: &RequestSpec, settings: &Settings) -> Result<String, ChatError> {
        Ok(self.executor().execute(request, settings).await?.text)
    }

    async fn structured(
        &self,
        request: &RequestSpec,
        settings: &Settings,
    ) -> Result<Map<String, Value>, ChatError> {
        let text = self.answer(request, settings).await?;
        Ok(extract_object(&text)?)
    }
}

/// Up to three memory snippets whose words overlap `query`, best first.
///
/// Only query words longer than three characters count. A word in the
/// title or a tag scores more than one found only in the content.
pub fn relevant_memories(query: &str, memories: &[MemoryRecord]) -> Vec<String> {
    let keywords = query
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|word| word.chars().count() > 3)
        .collect::<Vec<_>>();
    if keywords.is_empty() {
        return Vec::new();
    }

    let mut scored = memories
        .iter()
        .map(|memory| {
            let title = memory.title.to_lowercase();
            let tags = memory.tags.iter().map(|tag| tag.to_lowercase()).collect::<Vec<_>>();
            let haystack = format!("{title} {} {}", tags.join(" "), memory.content.to_lowercase());
            let score = keywords
                .iter()
                .map(|word| {
                    let mut score = 0;
                    if haystack.contains(word.as_str()) {
                        score += 1;
                    }
                    if title.contains(word.as_str()) {
                        score += 2;
                    }
                    if tags.iter().any(|tag| tag.contains(word.as_str())) {
                        score += 2;
                    }
                    score
                })
                .sum::<u32>();
            (memory, score)
        })
        .filter(|(_, score)| *score > 0)
        .collect::<Vec<_>>();
    scored.sort_by(|left, right| right.1.cmp(&left.1));

    scored
        .into_iter()
        .take(MAX_RELEVANT_MEMORIES)
        .map(|(memory, _)| format!("[Memory (Offline Match): {}]\n{}", memory.title, memory.content))
        .collect()
}

fn session_preview(session: &SessionSummary) -> SessionSummary {
    SessionSummary {
        id: session.id.clone(),
        title: session.title.clone(),
        last_message: session
            .last_message
            .as_ref()
            .map(|message| message.chars().take(SESSION_PREVIEW_CHARS).collect()),
    }
}

fn read_skill(object: &Map<String, Value>) -> Result<Skill, ChatError> {
    Ok(Skill {
        name: required_string(object, "skillName")?,
        description: optional_string(object, "description").unwrap_or_default(),
        code: required_string(object, "code")?,
    })
}

fn read_memory(object: &Map<String, Value>) -> Result<MemoryRecord, ChatError> {
    let importance = optional_u64(object, "importance").unwrap_or(1).clamp(1, 10);
    Ok(MemoryRecord {
        title: required_string(object, "title")?,
        content: required_string(object, "content")?,
        tags: string_list(object, "tags"),
        importance: importance as u8,
    })
}
