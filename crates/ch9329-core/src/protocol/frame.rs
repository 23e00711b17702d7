//! Frame types and constants for the CH9329 serial protocol.
//!
//! Every packet on the UART, in either direction, has the same shape:
//!
//! ```text
//! [0x57][0xAB][0x00][code:1][len:1][payload:len][checksum:1]
//! ```
//!
//! The checksum is the sum of every preceding byte (header included) modulo
//! 256.  The chip answers command `id` with reply code `id | 0x80` on success
//! or `id | 0xC0` on failure.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::codec::ProtocolError;

// ── Protocol constants ────────────────────────────────────────────────────────

/// The three fixed bytes that open every frame (two magic bytes + address 0x00).
pub const FRAME_HEADER: [u8; 3] = [0x57, 0xAB, 0x00];

/// Bytes before the payload: header (3) + code (1) + length (1).
pub const PREFIX_SIZE: usize = 5;

/// Size of a frame with an empty payload: prefix + checksum.
pub const MIN_FRAME_SIZE: usize = PREFIX_SIZE + 1;

/// Largest payload the one-byte length field can describe.
pub const MAX_PAYLOAD_LEN: usize = u8::MAX as usize;

/// OR-ed into a command id to form its success reply code.
pub const REPLY_SUCCESS_MASK: u8 = 0x80;

/// OR-ed into a command id to form its error reply code.
pub const REPLY_ERROR_MASK: u8 = 0xC0;

// ── Command ids ───────────────────────────────────────────────────────────────

/// Command ids understood by the chip that this crate builds frames for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CommandId {
    /// Chip version, USB enumeration state and keyboard LED state.
    GetInfo = 0x01,
    /// Standard 8-byte keyboard report.
    KeyboardReport = 0x02,
    /// Absolute-positioning mouse report.
    MouseAbsolute = 0x04,
    /// Relative-motion mouse report.
    MouseRelative = 0x05,
    /// Software reset; the chip drops all held inputs.
    SoftReset = 0x0F,
}

impl CommandId {
    /// Raw command byte.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Reply code the chip sends when this command succeeds.
    pub fn success_code(self) -> u8 {
        self.as_u8() | REPLY_SUCCESS_MASK
    }

    /// Reply code the chip sends when this command fails.
    pub fn error_code(self) -> u8 {
        self.as_u8() | REPLY_ERROR_MASK
    }
}

impl TryFrom<u8> for CommandId {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(CommandId::GetInfo),
            0x02 => Ok(CommandId::KeyboardReport),
            0x04 => Ok(CommandId::MouseAbsolute),
            0x05 => Ok(CommandId::MouseRelative),
            0x0F => Ok(CommandId::SoftReset),
            _ => Err(()),
        }
    }
}

impl From<CommandId> for u8 {
    fn from(id: CommandId) -> Self {
        id.as_u8()
    }
}

// ── Command frame ─────────────────────────────────────────────────────────────

/// An outgoing command: id plus payload of at most 255 bytes.
///
/// The length limit is checked once, in [`CommandFrame::new`], so encoding a
/// constructed frame can never fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFrame {
    command_id: u8,
    payload: Vec<u8>,
}

impl CommandFrame {
    /// Builds a frame for `command_id` carrying `payload`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::PayloadTooLarge`] if `payload` is longer than
    /// [`MAX_PAYLOAD_LEN`].
    pub fn new(command_id: impl Into<u8>, payload: impl Into<Vec<u8>>) -> Result<Self, ProtocolError> {
        let payload = payload.into();
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(ProtocolError::PayloadTooLarge(payload.len()));
        }
        Ok(Self {
            command_id: command_id.into(),
            payload,
        })
    }

    pub fn command_id(&self) -> u8 {
        self.command_id
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

// ── Reply frame ───────────────────────────────────────────────────────────────

/// Whether the chip accepted or rejected the command it is answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplyStatus {
    Success,
    Error,
}

/// A checksum-valid reply pulled out of the inbound byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyFrame {
    /// Success or error, decoded from the top bits of the reply code.
    pub status: ReplyStatus,
    /// The command id this reply answers (reply code with the status bits removed).
    pub command_echo: u8,
    /// Reply payload exactly as received.
    pub payload: Vec<u8>,
}

impl ReplyFrame {
    /// The device error code carried by an error reply.
    ///
    /// The chip puts the code in the first payload byte; an error reply with
    /// an empty payload reports `0xFF`.
    pub fn error_code(&self) -> u8 {
        self.payload.first().copied().unwrap_or(0xFF)
    }
}

// ── Device error codes ────────────────────────────────────────────────────────

/// An error code reported by the chip in an error reply.
///
/// The value is opaque to the engine and is surfaced verbatim; [`fmt::Display`]
/// adds the vendor's description for the codes the datasheet documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceErrorCode(pub u8);

impl DeviceErrorCode {
    /// Serial receive timeout inside the chip.
    pub const TIMEOUT: u8 = 0xE1;
    /// The chip saw a bad packet header.
    pub const INVALID_HEADER: u8 = 0xE2;
    /// Unknown command code.
    pub const INVALID_COMMAND: u8 = 0xE3;
    /// The chip computed a different checksum than the one we sent.
    pub const CHECKSUM: u8 = 0xE4;
    /// A payload field was out of range.
    pub const PARAMETER: u8 = 0xE5;
    /// The command was well-formed but could not be executed.
    pub const OPERATION_FAILED: u8 = 0xE6;

    /// Vendor description for documented codes, `None` for anything else.
    pub fn description(self) -> Option<&'static str> {
        match self.0 {
            Self::TIMEOUT => Some("serial receive timeout"),
            Self::INVALID_HEADER => Some("invalid packet header"),
            Self::INVALID_COMMAND => Some("invalid command code"),
            Self::CHECKSUM => Some("checksum mismatch"),
            Self::PARAMETER => Some("parameter error"),
            Self::OPERATION_FAILED => Some("operation failed"),
            _ => None,
        }
    }
}

impl fmt::Display for DeviceErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.description() {
            Some(text) => write!(f, "0x{:02X} ({text})", self.0),
            None => write!(f, "0x{:02X}", self.0),
        }
    }
}

// ── Chip information ──────────────────────────────────────────────────────────

/// Decoded reply to [`CommandId::GetInfo`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipInfo {
    /// Firmware version as printed on the datasheet, e.g. `"V1.0"`.
    pub version: String,
    /// Raw version byte (major in the high nibble, minor in the low nibble).
    pub version_raw: u8,
    /// `true` once the target machine has enumerated the chip over USB.
    pub usb_connected: bool,
    pub num_lock: bool,
    pub caps_lock: bool,
    pub scroll_lock: bool,
}

impl ChipInfo {
    /// Parses the 8-byte GetInfo reply payload.
    ///
    /// Returns `None` if the payload is shorter than 8 bytes.
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        if payload.len() < 8 {
            return None;
        }
        let version_raw = payload[0];
        let leds = payload[2];
        Some(Self {
            version: format!("V{}.{}", version_raw >> 4, version_raw & 0x0F),
            version_raw,
            usb_connected: payload[1] == 0x01,
            num_lock: leds & 0x01 != 0,
            caps_lock: leds & 0x02 != 0,
            scroll_lock: leds & 0x04 != 0,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
