//! Scripted transport shared by the caller behavior tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rprovider::{HttpRequest, HttpResponse, HttpTransport, ProviderError, ProviderFuture};
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct Captured {
    pub url: String,
    pub model: String,
    pub key: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Value,
    pub deadline: Duration,
}

impl Captured {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

pub enum Reply {
    Text(u16, String),
    Chunks(u16, Vec<String>),
    Fail(ProviderError),
}

pub fn ok(body: &str) -> Reply {
    Reply::Text(200, body.to_string())
}

pub fn status(status: u16, body: &str) -> Reply {
    Reply::Text(status, body.to_string())
}

pub fn chunks(parts: &[&str]) -> Reply {
    Reply::Chunks(200, parts.iter().map(|part| part.to_string()).collect())
}

pub fn fail(error: ProviderError) -> Reply {
    Reply::Fail(error)
}

#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    captured: Mutex<Vec<Captured>>,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            captured: Mutex::new(Vec::new()),
        })
    }

    pub fn captured(&self) -> Vec<Captured> {
        self.captured.lock().expect("captured lock").clone()
    }
}

impl HttpTransport for ScriptedTransport {
    fn send<'a>(
        &'a self,
        request: HttpRequest,
        deadline: Duration,
    ) -> ProviderFuture<'a, Result<HttpResponse, ProviderError>> {
        Box::pin(async move {
            let body = request.body.clone().unwrap_or(Value::Null);
            self.captured.lock().expect("captured lock").push(Captured {
                url: request.url.clone(),
                model: body["model"].as_str().unwrap_or_default().to_string(),
                key: request.bearer_token().map(str::to_string),
                headers: request.headers.clone(),
                body,
                deadline,
            });

            let reply = self
                .replies
                .lock()
                .expect("replies lock")
                .pop_front()
                .unwrap_or_else(|| Reply::Fail(ProviderError::other("no scripted reply")));
            match reply {
                Reply::Text(status, body) => Ok(HttpResponse::from_text(status, body)),
                Reply::Chunks(status, parts) => Ok(HttpResponse::from_chunks(status, parts)),
                Reply::Fail(error) => Err(error),
            }
        })
    }
}
