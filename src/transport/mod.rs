//! 传输层模块：聊天补全调用的协作者接口与 HTTP 实现。
//!
//! # Transport Module
//!
//! The dispatcher never speaks HTTP itself. It talks to a [`ChatTransport`],
//! which takes an ordered list of messages plus the forwarded parameter map and
//! returns the completion text, or an error the executor will retry.
//!
//! A [`TransportSession`] owns one transport for the lifetime of one batch and
//! is opened through a [`TransportFactory`], so every batch gets a fresh pool.

pub mod http;
pub mod session;

pub use http::{HttpTransport, HttpTransportFactory};
pub use session::TransportSession;

use crate::client::CallParameters;
use crate::types::Message;
use crate::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

/// A chat-completion backend.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Run one completion. `params` already has unset optionals removed.
    async fn complete(&self, messages: &[Message], params: &Map<String, Value>) -> Result<String>;

    /// Release pooled resources. Called once when the owning session closes.
    async fn shutdown(&self) {}
}

#[async_trait]
impl<T: ChatTransport + ?Sized> ChatTransport for Arc<T> {
    async fn complete(&self, messages: &[Message], params: &Map<String, Value>) -> Result<String> {
        (**self).complete(messages, params).await
    }

    async fn shutdown(&self) {
        (**self).shutdown().await
    }
}

/// Builds a transport for one batch invocation.
pub trait TransportFactory: Send + Sync {
    fn open(&self, params: &CallParameters) -> Result<Arc<dyn ChatTransport>>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Transport error: {0}")]
    Other(String),
}
