//! Structured batch jobs and their result summaries.
//!
//! A job bundles conversations with the call configuration. It is the shape
//! used by the CLI and by callers that load work from JSON or YAML files.

use crate::client::{
    CallParameters, DEFAULT_BASE_URL, DEFAULT_MAX_CONCURRENT, DEFAULT_MODEL,
};
use crate::types::Conversation;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_max_concurrent() -> usize {
    DEFAULT_MAX_CONCURRENT
}

/// A batch inference job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceJob {
    pub conversations: Vec<Conversation>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Provider-specific passthrough options.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub options: Map<String, Value>,
}

impl InferenceJob {
    pub fn new(conversations: Vec<Conversation>) -> Self {
        Self {
            conversations,
            model: default_model(),
            base_url: default_base_url(),
            max_concurrent: default_max_concurrent(),
            temperature: None,
            max_tokens: None,
            options: Map::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
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

    /// Load a job from a `.json`, `.yaml` or `.yml` file and validate it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();
        let job: Self = match ext.as_str() {
            "json" => serde_json::from_str(&raw)?,
            "yaml" | "yml" => serde_yaml::from_str(&raw)?,
            other => {
                return Err(Error::configuration_with_context(
                    format!("unsupported job file extension '{}'", other),
                    ErrorContext::new()
                        .with_field_path(path.display().to_string())
                        .with_details("expected .json, .yaml or .yml")
                        .with_source("job_loader"),
                ))
            }
        };
        job.validate()?;
        Ok(job)
    }

    pub fn validate(&self) -> Result<()> {
        self.call_parameters().map(|_| ())
    }

    pub fn to_conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// Job configuration as a flat parameter map, for display and echo.
    /// Dispatch goes through [`InferenceJob::call_parameters`].
    ///
    /// Always contains `model`, `base_url` and `max_concurrent`; `temperature`
    /// and `max_tokens` appear only when set on the job.
    pub fn api_params(&self) -> Map<String, Value> {
        let mut out = Map::new();
        out.insert("model".into(), Value::String(self.model.clone()));
        out.insert("base_url".into(), Value::String(self.base_url.clone()));
        out.insert("max_concurrent".into(), Value::from(self.max_concurrent));
        if let Some(t) = self.temperature {
            out.insert("temperature".into(), Value::from(t));
        }
        if let Some(n) = self.max_tokens {
            out.insert("max_tokens".into(), Value::from(n));
        }
        for (k, v) in &self.options {
            out.entry(k.clone()).or_insert_with(|| v.clone());
        }
        out
    }

    /// Validated parameters for the dispatcher.
    ///
    /// Job fields win; everything the job does not carry (the per-call
    /// timeout, for one) comes from [`CallParameters::from_env`].
    pub fn call_parameters(&self) -> Result<CallParameters> {
        self.parameters_over(CallParameters::from_env())
    }

    fn parameters_over(&self, base: CallParameters) -> Result<CallParameters> {
        let params = CallParameters {
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            max_concurrent: self.max_concurrent,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            options: self.options.clone(),
            ..base
        };
        params.validate()?;
        Ok(params)
    }
}

/// Outcome of a batch job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    pub responses: Vec<String>,
    pub job_config: InferenceJob,
    pub success_count: usize,
    pub failure_count: usize,
}

impl InferenceResult {
    /// Summarize raw responses. A response counts as a success when it has
    /// non-whitespace content.
    pub fn from_responses(responses: Vec<String>, job: InferenceJob) -> Self {
        let success_count = responses.iter().filter(|r| is_success(r)).count();
        let failure_count = responses.len() - success_count;
        Self {
            responses,
            job_config: job,
            success_count,
            failure_count,
        }
    }

    pub fn failed_indices(&self) -> Vec<usize> {
        self.responses
            .iter()
            .enumerate()
            .filter(|(_, r)| !is_success(r))
            .map(|(i, _)| i)
            .collect()
    }
}

pub fn is_success(response: &str) -> bool {
    !response.trim().is_empty()
}
