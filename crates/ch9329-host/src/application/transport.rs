//! The transport seam: how the engine talks to the byte stream.
//!
//! The engine only ever does two things with the link: it writes a complete
//! frame, and it reads whatever bytes the chip sent back.  Writing goes
//! through the [`Transport`] trait; reading goes the other way, with the
//! adapter's read loop pushing bytes into an [`InboundBuffer`] that the reply
//! correlator scans.
//!
//! Implementations live in `infrastructure::transport`.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use ch9329_core::protocol::{try_parse, ReplyFrame};
use thiserror::Error;
use tokio::sync::Notify;
use tracing::trace;

/// Error type for transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No open stream: the port was never opened, or it has been closed.
    #[error("transport is not open")]
    Closed,

    /// The operating system rejected an open, read or write.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outbound half of the link.
///
/// Implementations must write the whole slice or fail; a partially written
/// frame is reported as an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Writes one complete frame.
    async fn write(&self, bytes: &[u8]) -> Result<(), TransportError>;
}

// ── Inbound buffer ────────────────────────────────────────────────────────────

#[derive(Default)]
struct Inbound {
    bytes: Mutex<Vec<u8>>,
    arrived: Notify,
}

/// Bytes received from the chip since the last matched reply.
///
/// Cloning yields another handle to the same buffer: the transport's read
/// loop holds one to [`push`](Self::push) into, the correlator holds another
/// to scan.  Every push wakes the correlator if it is waiting.
#[derive(Clone, Default)]
pub struct InboundBuffer {
    inner: Arc<Inbound>,
}

impl InboundBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends bytes read from the link and wakes the waiting correlator.
    pub fn push(&self, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        self.lock().extend_from_slice(data);
        trace!(len = data.len(), "inbound bytes");
        self.inner.arrived.notify_one();
    }

    /// Drops everything buffered.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the buffered bytes, for diagnostics and tests.
    pub fn snapshot(&self) -> Vec<u8> {
        self.lock().clone()
    }

    /// Scans for the reply to `expected` and removes it, together with every
    /// byte in front of it, from the buffer.
    ///
    /// Leaves the buffer untouched when no reply is complete yet.
    pub fn take_reply(&self, expected: u8) -> Option<ReplyFrame> {
        let mut bytes = self.lock();
        let outcome = try_parse(&bytes, expected);
        let frame = outcome.frame?;
        if outcome.skipped > 0 {
            trace!(skipped = outcome.skipped, "discarding noise before reply");
        }
        bytes.drain(..outcome.consumed);
        Some(frame)
    }

    /// Resolves after the next [`push`](Self::push).
    ///
    /// A push that happened since the last wait is not lost: it completes
    /// this wait immediately.
    pub async fn wait_for_data(&self) {
        self.inner.arrived.notified().await;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<u8>> {
        self.inner
            .bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for InboundBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InboundBuffer")
            .field("len", &self.len())
            .finish()
    }
}
