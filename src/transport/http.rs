use super::{ChatTransport, TransportError, TransportFactory};
use crate::client::CallParameters;
use crate::types::Message;
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use keyring::Entry;
use reqwest::Proxy;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Body keys the transport owns. Passthrough options may not set them.
const RESERVED_KEYS: &[&str] = &["messages", "stream"];

/// OpenAI-compatible `/chat/completions` client over a pooled `reqwest::Client`.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpTransport {
    pub fn new(params: &CallParameters, api_key: Option<String>) -> Result<Self> {
        params.validate()?;
        for key in RESERVED_KEYS {
            if params.options.contains_key(*key) {
                return Err(Error::validation_with_context(
                    format!("option '{}' is managed by the transport", key),
                    ErrorContext::new()
                        .with_field_path(format!("params.options.{}", key))
                        .with_source("http_transport"),
                ));
            }
        }

        let mut builder = reqwest::Client::builder()
            .timeout(params.timeout)
            // In-flight requests are already capped by the limiter; keep at most
            // that many idle sockets around.
            .pool_max_idle_per_host(params.max_concurrent)
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Some(proxy) = proxy_from_env()? {
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        let endpoint = format!("{}/chat/completions", params.base_url.trim_end_matches('/'));
        debug!(%endpoint, pool = params.max_concurrent, "opened HTTP transport");

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.or_else(Self::get_api_key),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn get_api_key() -> Option<String> {
        // 1. Try Keyring
        if let Ok(entry) = Entry::new("simple-infer", "openai") {
            if let Ok(key) = entry.get_password() {
                return Some(key);
            }
        }

        // 2. Try Environment Variable
        env::var("OPENAI_API_KEY").ok()
    }
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn complete(&self, messages: &[Message], params: &Map<String, Value>) -> Result<String> {
        let mut body = params.clone();
        body.insert("messages".to_string(), serde_json::to_value(messages)?);

        let mut req = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await.map_err(TransportError::Http)?;
        let status = resp.status();
        let text = resp.text().await.map_err(TransportError::Http)?;

        if !status.is_success() {
            return Err(remote_error(status.as_u16(), &text));
        }

        let parsed: CompletionResponse = serde_json::from_str(&text)
            .map_err(|e| TransportError::MalformedResponse(e.to_string()))?;
        let choice = parsed.choices.into_iter().next().ok_or_else(|| {
            TransportError::MalformedResponse("response contained no choices".to_string())
        })?;

        Ok(choice.message.content.unwrap_or_default())
    }
}

/// Opens a fresh [`HttpTransport`] per batch.
#[derive(Debug, Clone, Default)]
pub struct HttpTransportFactory {
    api_key: Option<String>,
}

impl HttpTransportFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit key instead of keyring / `OPENAI_API_KEY`.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

impl TransportFactory for HttpTransportFactory {
    fn open(&self, params: &CallParameters) -> Result<Arc<dyn ChatTransport>> {
        Ok(Arc::new(HttpTransport::new(params, self.api_key.clone())?))
    }
}

/// Map an HTTP status to a stable error class name.
fn proxy_from_env() -> Result<Option<Proxy>> {
    proxy_from(env::var("SIMPLE_INFER_PROXY_URL").ok())
}

/// A set but unusable proxy is a configuration error, not a silent direct
/// connection.
fn proxy_from(url: Option<String>) -> Result<Option<Proxy>> {
    let Some(url) = url else {
        return Ok(None);
    };
    Proxy::all(url.as_str()).map(Some).map_err(|e| {
        Error::configuration_with_context(
            format!("invalid proxy url '{}': {}", url, e),
            ErrorContext::new()
                .with_field_path("SIMPLE_INFER_PROXY_URL")
                .with_source("http_transport"),
        )
    })
}

pub(crate) fn error_class(status: u16) -> &'static str {
    match status {
        400 => "invalid_request",
        401 => "authentication",
        403 => "permission_denied",
        404 => "not_found",
        408 => "timeout",
        409 => "conflict",
        413 => "request_too_large",
        429 => "rate_limited",
        500 => "server_error",
        503 | 529 => "overloaded",
        _ => "http_error",
    }
}

fn is_retryable_class(class: &str) -> bool {
    matches!(
        class,
        "rate_limited" | "overloaded" | "server_error" | "timeout" | "conflict"
    )
}

fn remote_error(status: u16, body: &str) -> Error {
    let class = error_class(status);
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect());
    Error::Remote {
        status,
        class: class.to_string(),
        message,
        retryable: is_retryable_class(class),
    }
}
