//! Single-call executor: one conversation, bounded retries, never errors out.

use crate::client::params::CallParameters;
use crate::client::retry::RetryPolicy;
use crate::transport::ChatTransport;
use crate::types::Message;
use crate::Error;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// What happened to one call after the retry budget was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// The provider answered. The text may legitimately be empty.
    Completed(String),
    /// Every attempt failed; `reason` is the last error.
    Failed { attempts: u32, reason: String },
}

impl CallOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, CallOutcome::Completed(_))
    }

    /// Flatten to the positional sentinel: failures become `""`.
    pub fn into_response(self) -> String {
        match self {
            CallOutcome::Completed(text) => text,
            CallOutcome::Failed { .. } => String::new(),
        }
    }
}

/// Call the provider once for `messages`, retrying per `params.retry`.
///
/// Returns the completion text, or an empty string if every attempt failed.
/// Failures are logged at warn level and never propagated.
pub async fn call_llm(
    transport: &dyn ChatTransport,
    messages: &[Message],
    params: &CallParameters,
) -> String {
    try_call_llm(transport, messages, params)
        .await
        .into_response()
}

/// Like [`call_llm`] but keeps failures distinguishable from empty completions.
pub async fn try_call_llm(
    transport: &dyn ChatTransport,
    messages: &[Message],
    params: &CallParameters,
) -> CallOutcome {
    let forwarded = params.forwarded();
    run_with_retries(transport, messages, &forwarded, &params.retry, params.timeout).await
}

pub(crate) async fn run_with_retries(
    transport: &dyn ChatTransport,
    messages: &[Message],
    forwarded: &Map<String, Value>,
    retry: &RetryPolicy,
    timeout: Duration,
) -> CallOutcome {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let call = transport.complete(messages, forwarded);
        let result = match tokio::time::timeout(timeout, call).await {
            Ok(r) => r,
            Err(_) => Err(Error::Timeout(timeout)),
        };

        let err = match result {
            Ok(text) => return CallOutcome::Completed(text),
            Err(e) => e,
        };

        match retry.delay_after(attempt) {
            Some(delay) => {
                debug!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "chat call failed; retrying"
                );
                tokio::time::sleep(delay).await;
            }
            None => {
                warn!(attempts = attempt, error = %err, "API call failed after all retries");
                return CallOutcome::Failed {
                    attempts: attempt,
                    reason: err.to_string(),
                };
            }
        }
    }
}
