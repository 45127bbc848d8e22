//! # simple-infer
//!
//! 这是一个面向聊天补全接口的有界并发批量推理库。
//!
//! Bounded-concurrency batch inference against OpenAI-compatible chat-completion
//! APIs, without a server-side batch endpoint.
//!
//! ## Overview
//!
//! Give the library many independent conversations and it dispatches them
//! concurrently, caps the number of in-flight requests, retries transient
//! failures with exponential backoff, and hands back one response per
//! conversation in the original order. A conversation that keeps failing
//! becomes an empty string at its position; the rest of the batch is unaffected.
//!
//! ## Key Features
//!
//! - **Ordered results**: output index `i` always answers input conversation `i`
//! - **Concurrency cap**: at most `max_concurrent` calls in flight ([`resilience`])
//! - **Retry with backoff**: 3 attempts, 1s/2s/4s... capped at 10s ([`client::RetryPolicy`])
//! - **Fault isolation**: per-call failures are absorbed, never abort the batch
//! - **Scoped transport**: one connection pool per batch, always torn down ([`transport`])
//! - **Jobs**: JSON/YAML job files with success/failure summaries ([`job`])
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use simple_infer::{infer, CallParameters, Conversation, Message};
//!
//! fn main() -> simple_infer::Result<()> {
//!     let convs = vec![Conversation::new(vec![
//!         Message::system("You are a helpful assistant."),
//!         Message::user("What is the capital of France?"),
//!     ])];
//!
//!     let params = CallParameters::new("gpt-4.1-nano").with_max_concurrent(32);
//!     for (i, r) in infer(&convs, &params)?.iter().enumerate() {
//!         println!("[{}] {}", i, if r.is_empty() { "FAILED" } else { r.as_str() });
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Messages and conversations |
//! | [`client`] | Call parameters, retry policy, single-call executor |
//! | [`resilience`] | Concurrency limiter |
//! | [`batch`] | Batch dispatcher and progress reporting |
//! | [`transport`] | Chat transport trait, HTTP client, per-batch sessions |
//! | [`job`] | Structured jobs and result summaries |

pub mod batch;
pub mod client;
pub mod infer;
pub mod job;
pub mod resilience;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::{call_llm, try_call_llm, CallOutcome, CallParameters, RetryPolicy};
pub use infer::{batch_infer_job, infer, infer_async, BatchInference};
pub use job::{InferenceJob, InferenceResult};
pub use transport::{ChatTransport, TransportFactory};
pub use types::{Conversation, Message, MessageRole};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
