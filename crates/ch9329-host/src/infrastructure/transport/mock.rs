//! In-memory transport for tests and dry runs.
//!
//! # Why a mock transport?
//!
//! A real CH9329 needs a serial port and a USB target, and its replies cannot
//! be steered from test code.  `MockTransport` replaces the wire with a
//! `Mutex<Vec<...>>` that records every frame written, plus an optional
//! responder closure that decides what the "chip" sends back.  Replies are
//! pushed into the shared [`InboundBuffer`] from inside `write`, exactly where
//! a real read loop would deliver them.
//!
//! # Usage in tests
//!
//! ```ignore
//! let inbound = InboundBuffer::new();
//! let transport = Arc::new(MockTransport::acking(inbound.clone()));
//! let correlator = ReplyCorrelator::new(transport.clone(), inbound);
//!
//! correlator.request(CommandId::SoftReset, &[], timeout).await?;
//!
//! assert_eq!(transport.command_ids(), vec![0x0F]);
//! ```

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, PoisonError,
};

use async_trait::async_trait;
use ch9329_core::protocol::{encode_frame, CommandId, FRAME_HEADER};

use crate::application::transport::{InboundBuffer, Transport, TransportError};

/// Decides the chip's answer to one written frame.  `None` means silence.
pub type Responder = Box<dyn Fn(&[u8]) -> Option<Vec<u8>> + Send + Sync>;

/// Payload the chip returns for GetInfo in acking mode: V3.0, USB enumerated, no LEDs.
const MOCK_CHIP_INFO: [u8; 8] = [0x30, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];

/// A transport that records writes and answers from a script.
pub struct MockTransport {
    writes: Mutex<Vec<Vec<u8>>>,
    inbound: InboundBuffer,
    responder: Option<Responder>,
    closed: AtomicBool,
}

impl MockTransport {
    /// A transport that never answers.  Every request times out.
    pub fn silent(inbound: InboundBuffer) -> Self {
        Self {
            writes: Mutex::new(Vec::new()),
            inbound,
            responder: None,
            closed: AtomicBool::new(false),
        }
    }

    /// A transport that answers every command with a success reply.
    pub fn acking(inbound: InboundBuffer) -> Self {
        Self::with_responder(inbound, success_reply)
    }

    /// A transport whose answers come from `responder`.
    pub fn with_responder<F>(inbound: InboundBuffer, responder: F) -> Self
    where
        F: Fn(&[u8]) -> Option<Vec<u8>> + Send + Sync + 'static,
    {
        Self {
            responder: Some(Box::new(responder)),
            ..Self::silent(inbound)
        }
    }

    /// Simulates the port going away; later writes fail with [`TransportError::Closed`].
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Every frame written so far, in order.
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.lock().clone()
    }

    /// Command byte of every frame written so far.
    pub fn command_ids(&self) -> Vec<u8> {
        self.lock().iter().map(|frame| frame[3]).collect()
    }

    /// Payload of every frame written so far.
    pub fn payloads(&self) -> Vec<Vec<u8>> {
        self.lock()
            .iter()
            .map(|frame| frame[5..frame.len() - 1].to_vec())
            .collect()
    }

    /// Forgets recorded writes.
    pub fn clear_written(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Vec<u8>>> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn write(&self, bytes: &[u8]) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        self.lock().push(bytes.to_vec());
        if let Some(reply) = self.responder.as_ref().and_then(|respond| respond(bytes)) {
            self.inbound.push(&reply);
        }
        Ok(())
    }
}

/// The reply a healthy chip sends for `frame`: success code with a `0x00`
/// status byte, or an 8-byte info block for GetInfo.
pub fn success_reply(frame: &[u8]) -> Option<Vec<u8>> {
    if frame.len() < FRAME_HEADER.len() + 2 {
        return None;
    }
    let command = frame[3];
    let payload: &[u8] = if command == CommandId::GetInfo.as_u8() {
        &MOCK_CHIP_INFO
    } else {
        &[0x00]
    };
    encode_frame(command | 0x80, payload).ok()
}

/// An error reply carrying device error `code` for `frame`.
pub fn error_reply(frame: &[u8], code: u8) -> Option<Vec<u8>> {
    let command = *frame.get(3)?;
    encode_frame(command | 0xC0, &[code]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_writes_are_recorded_in_order() {
        // Arrange
        let transport = MockTransport::silent(InboundBuffer::new());

        // Act
        transport.write(&encode_frame(0x02, &[0; 8]).unwrap()).await.unwrap();
        transport.write(&encode_frame(0x0F, &[]).unwrap()).await.unwrap();

        // Assert
        assert_eq!(transport.command_ids(), vec![0x02, 0x0F]);
        assert_eq!(transport.payloads(), vec![vec![0; 8], vec![]]);
    }

    #[tokio::test]
    async fn test_acking_transport_pushes_success_reply() {
        let inbound = InboundBuffer::new();
        let transport = MockTransport::acking(inbound.clone());

        transport.write(&encode_frame(0x04, &[0; 7]).unwrap()).await.unwrap();

        assert_eq!(inbound.snapshot(), encode_frame(0x84, &[0x00]).unwrap());
    }

    #[tokio::test]
    async fn test_closed_transport_rejects_writes() {
        let transport = MockTransport::silent(InboundBuffer::new());
        transport.close();

        let result = transport.write(&[0x57]).await;

        assert!(matches!(result, Err(TransportError::Closed)));
        assert!(transport.written().is_empty());
    }

    #[test]
    fn test_error_reply_uses_error_code() {
        let frame = encode_frame(0x02, &[0; 8]).unwrap();
        let reply = error_reply(&frame, 0xE5).unwrap();
        assert_eq!(reply[3], 0xC2);
        assert_eq!(reply[5], 0xE5);
    }
}
