//! # ch9329-core
//!
//! Protocol engine for CH9329 serial HID chips: the packet codec, the HID
//! report state, and the key translation tables.
//!
//! This crate is pure.  It builds and parses bytes and tracks what is held
//! down, but never touches a serial port, a clock, or an async runtime; the
//! `ch9329-host` crate wires it to real I/O.
//!
//! # Architecture overview (for beginners)
//!
//! A CH9329 is a small chip that sits between a UART and a USB port.  The
//! host writes short binary packets to the UART; the chip turns them into USB
//! keyboard and mouse reports for whatever machine its USB side is plugged
//! into.  Each packet is answered by a reply packet.
//!
//! - **`protocol`** – The wire format.  Command frames are encoded as
//!   `57 AB 00 <id> <len> <payload> <checksum>` and reply frames are pulled
//!   out of a noisy inbound byte stream by [`protocol::try_parse`].
//!
//! - **`report`** – The state the target machine sees: a modifier byte, six
//!   key slots, a mouse button mask, and the last absolute mouse position.
//!   Every change is serialized into a complete report payload.
//!
//! - **`keymap`** – Translation from the key codes a browser or terminal
//!   reports (and from typed characters) into USB HID Usage IDs.

pub mod keymap;
pub mod protocol;
pub mod report;

pub use keymap::{HidKeyCode, KeyMapper, Keystroke};
pub use protocol::{
    try_parse, ChipInfo, CommandFrame, CommandId, DeviceErrorCode, ParseOutcome, ProtocolError,
    ReplyFrame, ReplyStatus,
};
pub use report::{
    KeyboardReport, ModifierKey, MouseButton, MouseReport, PositioningMode, ReportError,
};
