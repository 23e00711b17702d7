//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module reads the TOML configuration file from the
//! platform config directory, writes it back, and falls back to defaults
//! when the file does not exist yet (first run).

pub mod config;
