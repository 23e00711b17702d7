//! Infrastructure layer: OS-facing adapters.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `ch9329_core`, but MUST NOT be imported by the `application` layer outside
//! of tests.
//!
//! # Sub-modules
//!
//! - **`transport`** – `SerialTransport` (a UART opened through the
//!   `serialport` crate) and `MockTransport` (in-memory, scriptable replies).
//!
//! - **`storage`** – TOML configuration file: load, save and the platform
//!   config directory.

pub mod storage;
pub mod transport;
