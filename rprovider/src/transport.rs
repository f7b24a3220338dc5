//! Deadline-guarded HTTP transport shared by every provider caller.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use rprovider::{Deadlines, HttpRequest};
//!
//! let deadlines = Deadlines::default().with_generation(Duration::from_secs(20));
//! assert_eq!(deadlines.discovery, Duration::from_secs(15));
//! assert_eq!(deadlines.generation, Duration::from_secs(20));
//!
//! let request = HttpRequest::post("https://example.test/v1/chat/completions")
//!     .with_header("X-Title", "relay")
//!     .with_json(serde_json::json!({"model": "m"}));
//! assert_eq!(request.header("x-title"), Some("relay"));
//! ```

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::{Instant, timeout, timeout_at};

use crate::{ProviderError, ProviderFuture, SecretString};

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, ProviderError>> + Send>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadlines {
    /// Catalog listing calls.
    pub discovery: Duration,
    pub generation: Duration,
    /// Cold-starting low-resource inference.
    pub low_resource: Duration,
}

impl Default for Deadlines {
    fn default() -> Self {
        Self {
            discovery: Duration::from_secs(15),
            generation: Duration::from_secs(30),
            low_resource: Duration::from_secs(45),
        }
    }
}

impl Deadlines {
    pub fn with_discovery(mut self, deadline: Duration) -> Self {
        self.discovery = deadline;
        self
    }

    pub fn with_generation(mut self, deadline: Duration) -> Self {
        self.generation = deadline;
        self
    }

    pub fn with_low_resource(mut self, deadline: Duration) -> Self {
        self.low_resource = deadline;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub bearer: Option<SecretString>,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            bearer: None,
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_bearer(mut self, token: SecretString) -> Self {
        self.bearer = Some(token);
        self
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer.as_ref().map(SecretString::expose)
    }
}

pub struct HttpResponse {
    pub status: u16,
    pub body: ByteStream,
}

impl HttpResponse {
    pub fn new(status: u16, body: ByteStream) -> Self {
        Self { status, body }
    }

    /// Response whose body arrives in the given read-sized chunks.
    pub fn from_chunks<I, C>(status: u16, chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        let chunks = chunks
            .into_iter()
            .map(|chunk| Ok(chunk.into()))
            .collect::<Vec<_>>();
        Self::new(status, Box::pin(futures_util::stream::iter(chunks)))
    }

    pub fn from_text(status: u16, text: impl Into<String>) -> Self {
        let text: String = text.into();
        Self::from_chunks(status, [text.into_bytes()])
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub async fn bytes(mut self) -> Result<Vec<u8>, ProviderError> {
        let mut output = Vec::new();
        while let Some(chunk) = self.body.next().await {
            output.extend_from_slice(&chunk?);
        }
        Ok(output)
    }

    pub async fn text(self) -> Result<String, ProviderError> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub async fn json<T>(self) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
    {
        let bytes = self.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Sends one request. The deadline bounds the whole exchange, body included;
/// exceeding it yields a `Timeout` error.
pub trait HttpTransport: Send + Sync {
    fn send<'a>(
        &'a self,
        request: HttpRequest,
        deadline: Duration,
    ) -> ProviderFuture<'a, Result<HttpResponse, ProviderError>>;
}

/// Races `future` against `deadline`, mapping expiry to a `Timeout` error.
pub async fn with_deadline<F, T>(deadline: Duration, label: &str, future: F) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match timeout(deadline, future).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::timeout(format!(
            "{label} exceeded deadline of {deadline:?}"
        ))),
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn map_error(err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::timeout(err.to_string())
        } else {
            ProviderError::transport(err.to_string())
        }
    }
}

impl HttpTransport for ReqwestTransport {
    fn send<'a>(
        &'a self,
        request: HttpRequest,
        deadline: Duration,
    ) -> ProviderFuture<'a, Result<HttpResponse, ProviderError>> {
        Box::pin(async move {
            let expires_at = Instant::now() + deadline;
            let mut builder = match request.method {
                HttpMethod::Get => self.client.get(request.url.as_str()),
                HttpMethod::Post => self.client.post(request.url.as_str()),
            };
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(token) = &request.bearer {
                builder = builder.bearer_auth(token.expose());
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = with_deadline(deadline, &request.url, async {
                builder.send().await.map_err(Self::map_error)
            })
            .await?;

            let status = response.status().as_u16();
            let url = request.url;
            let body = try_stream! {
                let mut chunks = response.bytes_stream();
                loop {
                    let next = timeout_at(expires_at, chunks.next()).await.map_err(|_| {
                        ProviderError::timeout(format!("{url} body exceeded deadline of {deadline:?}"))
                    })?;
                    match next {
                        Some(chunk) => yield chunk.map_err(Self::map_error)?.to_vec(),
                        None => break,
                    }
                }
            };

            Ok(HttpResponse::new(status, Box::pin(body)))
        })
    }
}
