mod support;

use rchat::{SessionSummary, Skill, SubmitRequest};
use rprovider::ProviderKind::Gemini;
use rprovider::{ConversationTurn, InlineData, ProviderError, Settings};
use serde_json::json;
use support::{ScriptedCaller, journal, service};

fn skills() -> Vec<Skill> {
    vec![Skill {
        name: "weather".to_string(),
        description: "Looks up the weather".to_string(),
        code: "return fetchWeather(args[0]);".to_string(),
    }]
}

fn turns(count: usize) -> Vec<ConversationTurn> {
    (0..count)
        .map(|index| ConversationTurn::user(format!("turn {index}")))
        .collect()
}

#[tokio::test]
async fn match_skill_reads_fenced_json_and_known_skill() {
    let gemini = ScriptedCaller::new(
        Gemini,
        vec![Ok(
            "Sure:\n```json\n{\"match\": true, \"skillName\": \"weather\", \"args\": [\"Oslo\"]}\n```",
        )],
        &journal(),
    );
    let service = service(&[gemini.clone()]);

    let plan = service
        .match_skill("weather in Oslo", &skills(), &Settings::default())
        .await
        .expect("skill should match");

    assert_eq!(plan.skill_name, "weather");
    assert_eq!(plan.code, "return fetchWeather(args[0]);");
    assert_eq!(plan.args, vec![json!("Oslo")]);
    let call = &gemini.calls()[0];
    assert!(call.json_mode);
    assert!(call.prompt.contains("Skills: [\"weather\"]"));
}

#[tokio::test]
async fn match_skill_is_silent_on_unknown_skill_or_failure() {
    let gemini = ScriptedCaller::new(
        Gemini,
        vec![
            Ok(r#"{"match": true, "skillName": "calendar", "args": []}"#),
            Ok("I cannot help with that"),
            Err(ProviderError::timeout("slow")),
        ],
        &journal(),
    );
    let service = service(&[gemini]);
    let settings = Settings::default();

    assert!(service.match_skill("book", &skills(), &settings).await.is_none());
    assert!(service.match_skill("book", &skills(), &settings).await.is_none());
    assert!(service.match_skill("book", &skills(), &settings).await.is_none());
}

#[tokio::test]
async fn match_skill_without_skills_makes_no_call() {
    let gemini = ScriptedCaller::new(Gemini, Vec::new(), &journal());
    let service = service(&[gemini.clone()]);

    assert!(service.match_skill("anything", &[], &Settings::default()).await.is_none());
    assert!(gemini.calls().is_empty());
}

#[tokio::test]
async fn learn_skill_surfaces_extraction_errors() {
    let gemini = ScriptedCaller::new(
        Gemini,
        vec![
            Ok(r#"{"skillName":"greet","description":"Says hi","code":"return 'hi';"}"#),
            Ok("no json here"),
        ],
        &journal(),
    );
    let service = service(&[gemini]);
    let settings = Settings::default();

    let skill = service
        .learn_skill("learn how to greet", &settings)
        .await
        .expect("skill should parse");
    assert_eq!(skill.name, "greet");
    assert_eq!(skill.code, "return 'hi';");

    let error = service
        .learn_skill("learn how to fly", &settings)
        .await
        .expect_err("unparseable answer");
    assert_eq!(error.kind, rchat::ChatErrorKind::Extraction);
}

#[tokio::test]
async fn propose_skill_from_history_respects_no() {
    let gemini = ScriptedCaller::new(Gemini, vec![Ok("NO")], &journal());
    let service = service(&[gemini.clone()]);

    assert!(
        service
            .propose_skill_from_history(&turns(8), &Settings::default())
            .await
            .is_none()
    );
    let prompt = &gemini.calls()[0].prompt;
    assert!(prompt.contains("turn 3\nturn 4"));
    assert!(!prompt.contains("turn 2"));
}

#[tokio::test]
async fn fix_skill_code_strips_fences() {
    let gemini = ScriptedCaller::new(
        Gemini,
        vec![Ok("```javascript\nreturn 1 + 1;\n```")],
        &journal(),
    );
    let service = service(&[gemini.clone()]);

    let code = service
        .fix_skill_code("return 1 +;", "Unexpected token ;", &Settings::default())
        .await
        .expect("fix should succeed");

    assert_eq!(code, "return 1 + 1;");
    assert!(gemini.calls()[0].prompt.starts_with("Error: \"Unexpected token ;\"\nCode:\n"));
}

#[tokio::test]
async fn extract_memory_needs_three_turns_and_a_worthy_answer() {
    let gemini = ScriptedCaller::new(
        Gemini,
        vec![
            Ok(r#"{"worthy": false}"#),
            Ok(r#"{"worthy": true, "title": "Editor", "content": "Prefers helix", "tags": ["tools"], "importance": 4}"#),
        ],
        &journal(),
    );
    let service = service(&[gemini.clone()]);
    let settings = Settings::default();

    assert!(service.extract_memory(&turns(2), &settings).await.is_none());
    assert!(gemini.calls().is_empty());

    assert!(service.extract_memory(&turns(3), &settings).await.is_none());
    let memory = service
        .extract_memory(&turns(3), &settings)
        .await
        .expect("worthy memory");
    assert_eq!(memory.title, "Editor");
    assert_eq!(memory.tags, vec!["tools"]);
    assert_eq!(memory.importance, 4);
    assert_eq!(gemini.calls()[0].history_len, 3);
}

#[tokio::test]
async fn structure_memory_defaults_importance() {
    let gemini = ScriptedCaller::new(
        Gemini,
        vec![Ok(r#"{"title": "Birthday", "content": "March 3", "tags": []}"#)],
        &journal(),
    );
    let service = service(&[gemini]);

    let memory = service
        .structure_memory("my birthday is March 3", &Settings::default())
        .await
        .expect("memory should parse");
    assert_eq!(memory.importance, 1);
}

#[tokio::test]
async fn detect_session_switch_only_returns_known_sessions() {
    let gemini = ScriptedCaller::new(
        Gemini,
        vec![
            Ok(r#"{"switch": true, "sessionId": "s2"}"#),
            Ok(r#"{"switch": true, "sessionId": "ghost"}"#),
            Ok(r#"{"switch": false}"#),
        ],
        &journal(),
    );
    let service = service(&[gemini.clone()]);
    let sessions = vec![
        SessionSummary::new("s1", "Taxes"),
        SessionSummary::new("s2", "Rust questions").with_last_message("what is a trait?"),
    ];
    let settings = Settings::default();

    assert_eq!(
        service
            .detect_session_switch("back to rust", &sessions, &settings)
            .await,
        Some("s2".to_string())
    );
    assert_eq!(
        service
            .detect_session_switch("back to rust", &sessions, &settings)
            .await,
        None
    );
    assert_eq!(
        service
            .detect_session_switch("back to rust", &sessions, &settings)
            .await,
        None
    );
    let instruction = gemini.calls()[0]
        .system_instruction
        .clone()
        .expect("instruction");
    assert!(instruction.contains("\"lastMessage\":\"what is a trait?\""));
}

#[tokio::test]
async fn offline_cache_stringifies_values() {
    let gemini = ScriptedCaller::new(
        Gemini,
        vec![Ok(r#"{"topic": "rust", "turns": 4}"#)],
        &journal(),
    );
    let service = service(&[gemini]);

    let cache = service
        .offline_cache(&turns(2), &Settings::default())
        .await
        .expect("cache");
    assert_eq!(cache.get("topic").map(String::as_str), Some("rust"));
    assert_eq!(cache.get("turns").map(String::as_str), Some("4"));
}

#[tokio::test]
async fn research_features_enable_tools() {
    let gemini = ScriptedCaller::new(Gemini, vec![Ok("summary"), Ok("report")], &journal());
    let service = service(&[gemini.clone()]);
    let settings = Settings::default();

    assert_eq!(
        service
            .analyze_url("https://example.com", &settings)
            .await
            .expect("summary"),
        "summary"
    );
    assert_eq!(
        service
            .deep_research("async rust", &settings)
            .await
            .expect("report"),
        "report"
    );
    let calls = gemini.calls();
    assert!(calls.iter().all(|call| call.use_tools));
    assert_eq!(calls[1].prompt, "Research on: \"async rust\"");
}

#[tokio::test]
async fn chat_response_prefixes_memories_only_without_attachments() {
    let gemini = ScriptedCaller::new(Gemini, vec![Ok("one"), Ok("two")], &journal());
    let service = service(&[gemini.clone()]).with_persona("You are terse.");
    let memories = vec!["[Memory (Offline Match): Editor]\nPrefers helix".to_string()];

    service
        .chat_response(SubmitRequest::new("which editor?", Settings::default()), &memories)
        .await
        .expect("chat");
    service
        .chat_response(
            SubmitRequest::new("what is this?", Settings::default())
                .with_attachments(vec![InlineData::new("image/png", "aGk=")]),
            &memories,
        )
        .await
        .expect("chat");

    let calls = gemini.calls();
    assert!(calls[0].prompt.starts_with("\n\n[MEMORY]:\n[Memory (Offline Match): Editor]"));
    assert!(calls[0].prompt.ends_with("\nwhich editor?"));
    assert_eq!(calls[0].system_instruction.as_deref(), Some("You are terse."));
    assert_eq!(calls[1].prompt, "what is this?");
}

#[tokio::test]
async fn chat_response_accepts_attachment_without_caption() {
    let gemini = ScriptedCaller::new(Gemini, vec![Ok("a cat on a keyboard")], &journal());
    let service = service(&[gemini.clone()]);

    let answer = service
        .chat_response(
            SubmitRequest::new("", Settings::default())
                .with_attachments(vec![InlineData::new("image/png", "aGk=")]),
            &[],
        )
        .await
        .expect("image without caption should be answered");

    assert_eq!(answer, "a cat on a keyboard");
    let calls = gemini.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].prompt, "");
    assert_eq!(calls[0].attachment_count, 1);
}
