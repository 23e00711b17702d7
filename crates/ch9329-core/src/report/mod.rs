//! HID report state: what the target machine currently sees as held down.
//!
//! Reports are level-triggered.  The chip forwards each report to the target
//! as a complete snapshot, so every mutation here is followed (by the caller)
//! by re-sending the whole serialized report, never a delta.
//!
//! The types in this module only hold state and serialize it.  They perform
//! no I/O and never fail half-way: an operation that returns an error leaves
//! the report exactly as it was.

pub mod keyboard;
pub mod modifier;
pub mod mouse;

pub use keyboard::{KeyboardReport, KEY_SLOTS};
pub use modifier::ModifierKey;
pub use mouse::{MouseButton, MouseReport, PositioningMode, MAX_ABSOLUTE_COORD};

use thiserror::Error;

/// Errors raised by report mutations.  The report is unchanged when one is returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReportError {
    /// All six key slots are occupied.
    #[error("cannot press usage 0x{usage:02X}: all 6 key slots are held")]
    CapacityExceeded { usage: u8 },

    /// An absolute coordinate is outside `0..=4095`.
    #[error("absolute coordinate ({x}, {y}) is outside 0..=4095")]
    CoordinateOutOfRange { x: u16, y: u16 },

    /// `MouseButton::All` can only be released, never pressed.
    #[error("button {0:?} cannot be pressed")]
    InvalidButton(MouseButton),

    /// The operation needs a different positioning mode than the report was built with.
    #[error("operation requires {required:?} positioning")]
    PositioningMode { required: PositioningMode },
}
