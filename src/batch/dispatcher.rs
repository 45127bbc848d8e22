//! Batch dispatcher.

use super::progress::{noop_sink, ProgressEvent, ProgressSink};
use crate::client::executor::{run_with_retries, CallOutcome};
use crate::client::CallParameters;
use crate::resilience::ConcurrencyLimiter;
use crate::transport::ChatTransport;
use crate::types::Conversation;
use crate::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Fans conversations out to the executor under a shared concurrency cap.
///
/// Every conversation is submitted up front and polled cooperatively on the
/// caller's task; the limiter decides how many actually run. Results come back
/// index-aligned with the input no matter which call finishes first.
pub struct BatchDispatcher {
    limiter: ConcurrencyLimiter,
    progress: Arc<dyn ProgressSink>,
}

impl BatchDispatcher {
    pub fn new(max_concurrent: usize) -> Result<Self> {
        Ok(Self {
            limiter: ConcurrencyLimiter::new(max_concurrent)?,
            progress: noop_sink(),
        })
    }

    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    pub fn limiter(&self) -> &ConcurrencyLimiter {
        &self.limiter
    }

    /// Run every conversation and return one response per input, in order.
    ///
    /// A failed conversation yields `""` at its position.
    pub async fn dispatch(
        &self,
        transport: &dyn ChatTransport,
        conversations: &[Conversation],
        params: &CallParameters,
    ) -> Vec<String> {
        self.dispatch_outcomes(transport, conversations, params)
            .await
            .into_iter()
            .map(CallOutcome::into_response)
            .collect()
    }

    /// Like [`BatchDispatcher::dispatch`] but keeps per-call failure details.
    pub async fn dispatch_outcomes(
        &self,
        transport: &dyn ChatTransport,
        conversations: &[Conversation],
        params: &CallParameters,
    ) -> Vec<CallOutcome> {
        let total = conversations.len();
        if total == 0 {
            return Vec::new();
        }

        let started = Instant::now();
        let forwarded = params.forwarded();
        let forwarded = &forwarded;
        self.progress.report(ProgressEvent::Started { total });
        debug!(total, max_concurrent = self.limiter.max(), "dispatching batch");

        let mut pending: FuturesUnordered<_> = conversations
            .iter()
            .enumerate()
            .map(|(index, conv)| async move {
                let outcome = match self.limiter.acquire().await {
                    Ok(_permit) => {
                        run_with_retries(
                            transport,
                            conv.messages(),
                            forwarded,
                            &params.retry,
                            params.timeout,
                        )
                        .await
                    }
                    Err(e) => CallOutcome::Failed {
                        attempts: 0,
                        reason: e.to_string(),
                    },
                };
                (index, outcome)
            })
            .collect();

        let mut slots: Vec<Option<CallOutcome>> = (0..total).map(|_| None).collect();
        let mut completed = 0usize;
        let mut successes = 0usize;

        while let Some((index, outcome)) = pending.next().await {
            completed += 1;
            let success = matches!(
                &outcome,
                CallOutcome::Completed(text) if !text.trim().is_empty()
            );
            if success {
                successes += 1;
            }
            self.progress.report(ProgressEvent::ItemFinished {
                index,
                completed,
                total,
                success,
            });
            slots[index] = Some(outcome);
        }

        self.progress.report(ProgressEvent::Finished {
            total,
            successes,
            failures: total - successes,
            elapsed: started.elapsed(),
        });

        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| CallOutcome::Failed {
                    attempts: 0,
                    reason: "call was never scheduled".to_string(),
                })
            })
            .collect()
    }
}
