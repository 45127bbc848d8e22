//! Scoped ownership of one transport for one batch invocation.

use super::{ChatTransport, TransportFactory};
use crate::client::CallParameters;
use crate::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// A transport opened for exactly one batch.
///
/// Close it with [`TransportSession::close`] once dispatch has finished. If the
/// session is dropped without closing (e.g. the caller's future was dropped),
/// the underlying pool is still released when the last reference goes away.
pub struct TransportSession {
    transport: Arc<dyn ChatTransport>,
    opened_at: Instant,
    pool_size: usize,
    closed: bool,
}

impl TransportSession {
    /// Open a session sized for `params.max_concurrent` calls.
    ///
    /// Failures here abort the batch before any call is made.
    pub fn open(factory: &dyn TransportFactory, params: &CallParameters) -> Result<Self> {
        params.validate()?;
        let transport = factory.open(params)?;
        debug!(pool_size = params.max_concurrent, "transport session opened");
        Ok(Self {
            transport,
            opened_at: Instant::now(),
            pool_size: params.max_concurrent,
            closed: false,
        })
    }

    pub fn transport(&self) -> &dyn ChatTransport {
        self.transport.as_ref()
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub async fn close(mut self) {
        self.transport.shutdown().await;
        self.closed = true;
        debug!(
            elapsed_ms = self.opened_at.elapsed().as_millis() as u64,
            "transport session closed"
        );
    }
}

impl Drop for TransportSession {
    fn drop(&mut self) {
        if !self.closed {
            warn!("transport session dropped without close; releasing pool");
        }
    }
}
