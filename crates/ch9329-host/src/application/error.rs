//! Error type shared by the correlator, the controller and the input sequences.

use std::time::Duration;

use ch9329_core::protocol::{DeviceErrorCode, ProtocolError};
use ch9329_core::report::ReportError;
use thiserror::Error;

use crate::application::transport::TransportError;

/// Everything that can go wrong while driving the chip.
///
/// All variants are recoverable: the controller stays usable after any of
/// them.  Noise on the link never shows up here; only a missing, rejected or
/// unsendable reply does.
#[derive(Debug, Error)]
pub enum HidError {
    /// The host key code has no HID usage.  Nothing was changed or sent.
    #[error("unsupported host key code {keycode}")]
    TranslationUnsupported { keycode: u16 },

    /// The host key code is not Shift, Ctrl, Alt or Meta.
    #[error("host key code {keycode} is not a modifier")]
    NotAModifier { keycode: u16 },

    /// A report mutation was rejected.  The report is unchanged.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// The chip answered with an error reply.
    #[error("device rejected command 0x{command:02X}: error {code}")]
    Device { command: u8, code: DeviceErrorCode },

    /// No matching reply arrived in time.  The command may still have reached
    /// the chip.
    #[error("no reply to command 0x{command:02X} within {after:?}")]
    Timeout { command: u8, after: Duration },

    /// No open stream to write to.
    #[error("transport unavailable")]
    TransportUnavailable,

    /// Writing to the stream failed.
    #[error("transport failure: {0}")]
    Transport(TransportError),

    /// A frame could not be built, or a reply payload had the wrong shape.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Text passed to `type_text` is longer than the configured limit.
    #[error("text has {len} characters, limit is {max}")]
    TextTooLong { len: usize, max: usize },
}

impl From<TransportError> for HidError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Closed => HidError::TransportUnavailable,
            other => HidError::Transport(other),
        }
    }
}

impl HidError {
    /// `true` for [`HidError::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, HidError::Timeout { .. })
    }
}
