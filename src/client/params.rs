//! Per-batch call parameters.

use crate::client::retry::RetryPolicy;
use crate::{Error, ErrorContext, Result};
use serde_json::{Map, Value};
use std::env;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MAX_CONCURRENT: usize = 64;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration bag for one batch invocation.
///
/// `model` plus the optional sampling fields and `options` are what reaches the
/// provider. `base_url`, `max_concurrent`, `timeout` and `retry` configure the
/// session and the executor and are never forwarded.
#[derive(Debug, Clone, PartialEq)]
pub struct CallParameters {
    pub model: String,
    pub base_url: String,
    pub max_concurrent: usize,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    /// Provider-specific passthrough options (e.g. `top_p`, `seed`).
    pub options: Map<String, Value>,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for CallParameters {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            temperature: None,
            max_tokens: None,
            options: Map::new(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

impl CallParameters {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by environment:
    /// - `SIMPLE_INFER_MODEL`
    /// - `SIMPLE_INFER_BASE_URL`
    /// - `SIMPLE_INFER_MAX_CONCURRENT`
    /// - `SIMPLE_INFER_TIMEOUT_SECS`
    ///
    /// Values that fail to parse leave the default in place.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut params = Self::default();
        if let Some(model) = lookup("SIMPLE_INFER_MODEL") {
            params.model = model;
        }
        if let Some(url) = lookup("SIMPLE_INFER_BASE_URL") {
            params.base_url = url;
        }
        if let Some(n) = lookup("SIMPLE_INFER_MAX_CONCURRENT").and_then(|s| s.parse::<usize>().ok())
        {
            params.max_concurrent = n;
        }
        if let Some(secs) = lookup("SIMPLE_INFER_TIMEOUT_SECS").and_then(|s| s.parse::<u64>().ok())
        {
            params.timeout = Duration::from_secs(secs);
        }
        params
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    pub fn with_temperature(mut self, t: f64) -> Self {
        self.temperature = Some(t);
        self
    }

    pub fn with_max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = Some(n);
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Reject values that can never produce a working batch.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(invalid("model must not be empty", "params.model"));
        }
        if self.max_concurrent == 0 {
            return Err(invalid(
                "max_concurrent must be a positive integer",
                "params.max_concurrent",
            ));
        }
        match url::Url::parse(&self.base_url) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => {}
            Ok(u) => {
                return Err(invalid(
                    format!("unsupported base_url scheme '{}'", u.scheme()),
                    "params.base_url",
                ))
            }
            Err(e) => {
                return Err(invalid(
                    format!("invalid base_url '{}': {}", self.base_url, e),
                    "params.base_url",
                ))
            }
        }
        if let Some(t) = self.temperature {
            if !t.is_finite() || t < 0.0 {
                return Err(invalid(
                    format!("temperature must be a non-negative number, got {}", t),
                    "params.temperature",
                ));
            }
        }
        if self.max_tokens == Some(0) {
            return Err(invalid(
                "max_tokens must be a positive integer",
                "params.max_tokens",
            ));
        }
        if self.timeout.is_zero() {
            return Err(invalid("timeout must be non-zero", "params.timeout"));
        }
        Ok(())
    }

    /// The parameter set sent alongside the messages.
    ///
    /// Unset optional fields are left out entirely; they are never sent as null.
    pub fn forwarded(&self) -> Map<String, Value> {
        let mut out = Map::new();
        out.insert("model".to_string(), Value::String(self.model.clone()));
        if let Some(t) = self.temperature {
            out.insert("temperature".to_string(), Value::from(t));
        }
        if let Some(n) = self.max_tokens {
            out.insert("max_tokens".to_string(), Value::from(n));
        }
        for (k, v) in &self.options {
            out.entry(k.clone()).or_insert_with(|| v.clone());
        }
        out
    }
}

fn invalid(msg: impl Into<String>, field: &str) -> Error {
    Error::configuration_with_context(
        msg,
        ErrorContext::new()
            .with_field_path(field)
            .with_source("call_parameters"),
    )
}
