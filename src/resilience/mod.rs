//! 弹性模式模块：提供并发上限等可靠性保障机制。
//!
//! # Resilience Primitives Module
//!
//! Backpressure for batch dispatch. The only shared mutable state in a batch is
//! the limiter's permit count.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ConcurrencyLimiter`] | Semaphore-backed cap on in-flight calls |
//! | [`InflightSnapshot`] | Facts-only view of limiter usage |
//!
//! ```rust
//! use simple_infer::resilience::ConcurrencyLimiter;
//!
//! # async fn demo() -> simple_infer::Result<()> {
//! let limiter = ConcurrencyLimiter::new(10)?;
//! {
//!     let _permit = limiter.acquire().await?;
//!     assert_eq!(limiter.in_flight(), 1);
//! }
//! assert_eq!(limiter.in_flight(), 0);
//! # Ok(())
//! # }
//! ```

pub mod limiter;

pub use limiter::{ConcurrencyLimiter, InflightSnapshot};
