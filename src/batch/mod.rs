//! 批量分发模块：有界并发地执行多组独立对话并按输入顺序收集结果。
//!
//! # Batch Dispatch Module
//!
//! Client-side batching: many independent conversations are sent concurrently
//! through one transport, capped by a [`ConcurrencyLimiter`](crate::resilience::ConcurrencyLimiter).
//!
//! ## Guarantees
//!
//! - Output has exactly one entry per input conversation, at the same index
//! - At most `max_concurrent` calls are in flight at any instant
//! - A failing conversation yields `""` at its index and never stops the batch
//! - An empty input returns immediately without touching the transport
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`BatchDispatcher`] | Fan-out, ordering and failure aggregation |
//! | [`ProgressSink`] | Observer for per-item progress |
//! | [`LogProgressSink`] | Default `tracing`-based progress output |
//!
//! ## Example
//!
//! ```rust,no_run
//! use simple_infer::batch::BatchDispatcher;
//! use simple_infer::transport::{HttpTransportFactory, TransportSession};
//! use simple_infer::{CallParameters, Conversation, Message};
//!
//! # async fn demo() -> simple_infer::Result<()> {
//! let params = CallParameters::new("gpt-4.1-nano").with_max_concurrent(10);
//! let convs = vec![Conversation::new(vec![Message::user("What is 2+2?")])];
//!
//! let session = TransportSession::open(&HttpTransportFactory::new(), &params)?;
//! let dispatcher = BatchDispatcher::new(params.max_concurrent)?;
//! let responses = dispatcher.dispatch(session.transport(), &convs, &params).await;
//! session.close().await;
//! # Ok(())
//! # }
//! ```

mod dispatcher;
pub mod progress;

pub use dispatcher::BatchDispatcher;
pub use progress::{
    log_sink, noop_sink, InMemoryProgressSink, LogProgressSink, NoopProgressSink, ProgressEvent,
    ProgressSink,
};
