//! ReplyCorrelator: one command out, one matching reply back.
//!
//! The chip answers every command, but the answer arrives on a byte stream
//! that may also carry line noise, late replies to earlier commands, and
//! replies whose checksum got mangled.  The correlator:
//!
//! 1. takes the single in-flight slot (a second caller waits here),
//! 2. clears the inbound buffer so stale bytes cannot match,
//! 3. writes the frame,
//! 4. re-scans the buffer each time the read loop pushes bytes, until the
//!    matching reply is found or the deadline passes.
//!
//! A timeout drops whatever partial data was buffered and is reported as its
//! own outcome.  There is no retry: the frame may well have reached the chip,
//! and re-sending a keyboard report is the caller's decision.

use std::sync::Arc;
use std::time::Duration;

use ch9329_core::protocol::{CommandFrame, CommandId, DeviceErrorCode, ReplyStatus};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::application::error::HidError;
use crate::application::transport::{InboundBuffer, Transport};

/// Matches replies to commands over a shared transport.
pub struct ReplyCorrelator {
    transport: Arc<dyn Transport>,
    inbound: InboundBuffer,
    in_flight: Mutex<()>,
}

impl ReplyCorrelator {
    /// Creates a correlator writing to `transport` and scanning `inbound`.
    ///
    /// `inbound` must be the buffer the transport's read loop pushes into.
    pub fn new(transport: Arc<dyn Transport>, inbound: InboundBuffer) -> Self {
        Self {
            transport,
            inbound,
            in_flight: Mutex::new(()),
        }
    }

    pub fn inbound(&self) -> &InboundBuffer {
        &self.inbound
    }

    /// Sends `command` and waits for its reply, returning the reply payload.
    ///
    /// # Errors
    ///
    /// See [`send_and_await`](Self::send_and_await).
    pub async fn request(
        &self,
        command: CommandId,
        payload: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, HidError> {
        self.send_and_await(command.as_u8(), payload, command.as_u8(), timeout)
            .await
    }

    /// Writes `command_id` with `payload`, then waits up to `timeout` for the
    /// reply to `expected` (success `expected | 0x80`, error `expected | 0xC0`).
    ///
    /// # Errors
    ///
    /// - [`HidError::Device`] when the chip sends an error reply.
    /// - [`HidError::Timeout`] when no matching reply arrives in time.
    /// - [`HidError::TransportUnavailable`] / [`HidError::Transport`] when the
    ///   write fails.
    /// - [`HidError::Protocol`] when `payload` is longer than 255 bytes.
    pub async fn send_and_await(
        &self,
        command_id: u8,
        payload: &[u8],
        expected: u8,
        timeout: Duration,
    ) -> Result<Vec<u8>, HidError> {
        let frame = CommandFrame::new(command_id, payload.to_vec())?;
        let bytes = frame.encode();

        let _slot = self.in_flight.lock().await;
        self.inbound.clear();
        debug!(
            command = format_args!("0x{command_id:02X}"),
            frame = ?bytes,
            "sending frame"
        );
        self.transport.write(&bytes).await?;

        let deadline = Instant::now() + timeout;
        loop {
            if let Some(reply) = self.inbound.take_reply(expected) {
                return match reply.status {
                    ReplyStatus::Success => {
                        debug!(
                            command = format_args!("0x{command_id:02X}"),
                            len = reply.payload.len(),
                            "reply received"
                        );
                        Ok(reply.payload)
                    }
                    ReplyStatus::Error => {
                        let code = DeviceErrorCode(reply.error_code());
                        warn!(
                            command = format_args!("0x{command_id:02X}"),
                            %code,
                            "device reported error"
                        );
                        Err(HidError::Device {
                            command: command_id,
                            code,
                        })
                    }
                };
            }

            if tokio::time::timeout_at(deadline, self.inbound.wait_for_data())
                .await
                .is_err()
            {
                let dropped = self.inbound.len();
                self.inbound.clear();
                warn!(
                    command = format_args!("0x{command_id:02X}"),
                    ?timeout,
                    dropped,
                    "no reply before deadline"
                );
                return Err(HidError::Timeout {
                    command: command_id,
                    after: timeout,
                });
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
