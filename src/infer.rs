//! Batch entry points.
//!
//! [`BatchInference`] ties the pieces together for one invocation: validate the
//! parameters, open a transport session, dispatch through the limiter, close
//! the session. The free functions use the default engine (HTTP transport,
//! `tracing` progress).

use crate::batch::{log_sink, BatchDispatcher, ProgressSink};
use crate::client::{CallOutcome, CallParameters};
use crate::job::{InferenceJob, InferenceResult};
use crate::transport::{HttpTransportFactory, TransportFactory, TransportSession};
use crate::types::Conversation;
use crate::{Error, ErrorContext, Result};
use std::sync::Arc;
use tracing::info;

/// Reusable batch engine. Holds no per-batch state: every run opens and closes
/// its own session and limiter.
pub struct BatchInference {
    factory: Arc<dyn TransportFactory>,
    progress: Arc<dyn ProgressSink>,
}

impl Default for BatchInference {
    fn default() -> Self {
        Self {
            factory: Arc::new(HttpTransportFactory::new()),
            progress: log_sink(),
        }
    }
}

impl BatchInference {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap the transport backend (mock servers, other providers, tests).
    pub fn with_transport_factory(mut self, factory: Arc<dyn TransportFactory>) -> Self {
        self.factory = factory;
        self
    }

    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    /// Run a batch and return one response per conversation, in input order.
    ///
    /// Only construction-time problems (invalid parameters, session open
    /// failure) are returned as errors. Individual call failures show up as
    /// `""` at their index.
    pub async fn run(
        &self,
        conversations: &[Conversation],
        params: &CallParameters,
    ) -> Result<Vec<String>> {
        Ok(self
            .run_outcomes(conversations, params)
            .await?
            .into_iter()
            .map(CallOutcome::into_response)
            .collect())
    }

    /// Like [`BatchInference::run`] but keeps failed calls distinguishable from
    /// empty completions.
    pub async fn run_outcomes(
        &self,
        conversations: &[Conversation],
        params: &CallParameters,
    ) -> Result<Vec<CallOutcome>> {
        params.validate()?;
        if conversations.is_empty() {
            return Ok(Vec::new());
        }

        let dispatcher =
            BatchDispatcher::new(params.max_concurrent)?.with_progress(self.progress.clone());
        let session = TransportSession::open(self.factory.as_ref(), params)?;
        let outcomes = dispatcher
            .dispatch_outcomes(session.transport(), conversations, params)
            .await;
        session.close().await;
        Ok(outcomes)
    }

    /// Blocking variant. Builds a current-thread runtime for this call only and
    /// drops it before returning.
    pub fn run_blocking(
        &self,
        conversations: &[Conversation],
        params: &CallParameters,
    ) -> Result<Vec<String>> {
        let rt = dedicated_runtime()?;
        rt.block_on(self.run(conversations, params))
    }

    pub async fn run_job(&self, job: &InferenceJob) -> Result<InferenceResult> {
        let params = job.call_parameters()?;
        info!(
            conversations = job.conversations.len(),
            model = %params.model,
            max_concurrent = params.max_concurrent,
            "running inference job"
        );
        let responses = self.run(job.to_conversations(), &params).await?;
        Ok(InferenceResult::from_responses(responses, job.clone()))
    }

    pub fn run_job_blocking(&self, job: &InferenceJob) -> Result<InferenceResult> {
        let rt = dedicated_runtime()?;
        rt.block_on(self.run_job(job))
    }
}

fn dedicated_runtime() -> Result<tokio::runtime::Runtime> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(Error::runtime_with_context(
            "blocking entry point called from inside an async runtime",
            ErrorContext::new()
                .with_details("use the async variant instead")
                .with_source("infer"),
        ));
    }
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            Error::runtime_with_context(
                format!("failed to start runtime: {}", e),
                ErrorContext::new().with_source("infer"),
            )
        })
}

/// Run a batch to completion, blocking the calling thread.
///
/// ```rust,no_run
/// use simple_infer::{infer, CallParameters, Conversation, Message};
///
/// let convs = vec![
///     Conversation::new(vec![Message::user("What is 2+2?")]),
///     Conversation::new(vec![Message::user("What is 3+3?")]),
/// ];
/// let params = CallParameters::new("gpt-4.1-nano").with_max_concurrent(10);
/// let results = infer(&convs, &params)?;
/// assert_eq!(results.len(), 2);
/// # Ok::<(), simple_infer::Error>(())
/// ```
pub fn infer(conversations: &[Conversation], params: &CallParameters) -> Result<Vec<String>> {
    BatchInference::new().run_blocking(conversations, params)
}

/// Async form of [`infer`] for callers that already own a runtime.
pub async fn infer_async(
    conversations: &[Conversation],
    params: &CallParameters,
) -> Result<Vec<String>> {
    BatchInference::new().run(conversations, params).await
}

/// Run a structured job and summarize it.
pub fn batch_infer_job(job: &InferenceJob) -> Result<InferenceResult> {
    BatchInference::new().run_job_blocking(job)
}
