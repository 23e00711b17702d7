//! ch9329-host library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does ch9329-host do? (for beginners)
//!
//! A CH9329 is a small chip that shows up as a USB keyboard and mouse on one
//! computer (the *target*) while taking commands over a serial line from
//! another computer (the *host*).  Plugged between two machines it becomes a
//! one-way KVM: the host types and clicks, the target sees a real keyboard.
//!
//! This crate is the host side:
//!
//! 1. Opens the serial port the chip is wired to.
//! 2. Keeps the keyboard and mouse state the target is supposed to see.
//! 3. After every change, sends the whole report to the chip and waits for
//!    the chip's acknowledgement (or its error code, or a timeout).
//! 4. Builds higher-level actions on top: hotkeys, typing text, and a
//!    recovery routine for stuck keys.
//!
//! The wire format and the report layouts live in `ch9329-core`; this crate
//! adds the I/O, the state machine and the command-line tool.

/// Application layer: reply correlation, HID state and input sequences.
pub mod application;

/// Infrastructure layer: serial and mock transports, config storage.
pub mod infrastructure;
