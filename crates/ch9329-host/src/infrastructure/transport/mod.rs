//! Transport adapters.
//!
//! - [`serial::SerialTransport`] – a real UART via the `serialport` crate,
//!   with a background reader thread.
//! - [`mock::MockTransport`] – records every write and can answer with
//!   scripted replies; used by tests and by `--dry-run`.

pub mod mock;
pub mod serial;
