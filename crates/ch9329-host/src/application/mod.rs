//! Application layer: driving a CH9329 over an abstract byte stream.
//!
//! # What lives here?
//!
//! - **`transport`** – The `Transport` trait (the outbound half of the link)
//!   and the `InboundBuffer` the adapter's read loop pushes received bytes
//!   into.  Concrete adapters live in `infrastructure::transport`.
//!
//! - **`correlator`** – `ReplyCorrelator`: writes one command frame at a time
//!   and waits for the matching reply, skipping noise and giving up after a
//!   deadline.
//!
//! - **`controller`** – `HidController`: owns the keyboard and mouse reports
//!   and re-sends the full report after every change.
//!
//! - **`sequences`** – Key combinations, the hotkey catalogue, text typing and
//!   the stuck-key recovery routine.
//!
//! - **`error`** – `HidError`, returned by everything above.

pub mod controller;
pub mod correlator;
pub mod error;
pub mod sequences;
pub mod transport;
