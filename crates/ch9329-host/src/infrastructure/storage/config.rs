//! TOML-based configuration for the host tool.
//!
//! Reads and writes `AppConfig` at the platform config location:
//! - Windows:  `%APPDATA%\ch9329-host\config.toml`
//! - Linux:    `$XDG_CONFIG_HOME/ch9329-host/config.toml` (or `~/.config/...`)
//! - macOS:    `~/Library/Application Support/ch9329-host/config.toml`
//!
//! Example file:
//!
//! ```toml
//! log_level = "info"
//!
//! [serial]
//! port = "/dev/ttyUSB0"
//! baud_rate = 115200
//!
//! [hid]
//! absolute_mode = true
//! scroll_sensitivity = 1
//! reply_timeout_ms = 300
//!
//! [typing]
//! key_delay_ms = 30
//! max_chars = 1000
//! ```
//!
//! Every field has a `#[serde(default = "...")]` helper, so a partial file
//! (or a file written by an older version) still loads.  Command-line flags
//! override whatever the file says.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ch9329_core::report::PositioningMode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::controller::HidConfig;
use crate::application::sequences::TypeOptions;
use crate::infrastructure::transport::serial::DEFAULT_BAUD_RATE;

const APP_DIR: &str = "ch9329-host";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// `tracing` level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub hid: HidSettings,
    #[serde(default)]
    pub typing: TypingConfig,
}

/// Which serial port the dongle is on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SerialConfig {
    /// Device path, e.g. `/dev/ttyUSB0` or `COM3`.  Unset means "ask on the
    /// command line".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

/// How the dongle is driven.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HidSettings {
    /// `true` for absolute pointer positioning, `false` for relative.
    #[serde(default = "default_true")]
    pub absolute_mode: bool,
    #[serde(default = "default_scroll_sensitivity")]
    pub scroll_sensitivity: u8,
    #[serde(default = "default_reply_timeout_ms")]
    pub reply_timeout_ms: u64,
}

/// Pacing for typed text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TypingConfig {
    #[serde(default = "default_key_delay_ms")]
    pub key_delay_ms: u64,
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}
fn default_true() -> bool {
    true
}
fn default_scroll_sensitivity() -> u8 {
    1
}
fn default_reply_timeout_ms() -> u64 {
    300
}
fn default_key_delay_ms() -> u64 {
    30
}
fn default_max_chars() -> usize {
    1000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            serial: SerialConfig::default(),
            hid: HidSettings::default(),
            typing: TypingConfig::default(),
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: default_baud_rate(),
        }
    }
}

impl Default for HidSettings {
    fn default() -> Self {
        Self {
            absolute_mode: default_true(),
            scroll_sensitivity: default_scroll_sensitivity(),
            reply_timeout_ms: default_reply_timeout_ms(),
        }
    }
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            key_delay_ms: default_key_delay_ms(),
            max_chars: default_max_chars(),
        }
    }
}

impl AppConfig {
    /// Controller settings derived from the `[hid]` table.
    pub fn hid_config(&self) -> HidConfig {
        HidConfig {
            mode: if self.hid.absolute_mode {
                PositioningMode::Absolute
            } else {
                PositioningMode::Relative
            },
            scroll_sensitivity: self.hid.scroll_sensitivity,
            reply_timeout: Duration::from_millis(self.hid.reply_timeout_ms),
        }
    }

    /// Typing options derived from the `[typing]` table.
    pub fn type_options(&self) -> TypeOptions {
        TypeOptions {
            key_delay: Duration::from_millis(self.typing.key_delay_ms),
            max_chars: self.typing.max_chars,
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from the platform location, or defaults if the file
/// does not exist yet.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_from(&config_file_path()?)
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the file
/// does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Persists `config` to the platform location.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_to(&config_file_path()?, config)
}

/// Persists `config` to `path`, creating the parent directory if needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_to(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join(APP_DIR))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join(APP_DIR))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(|h| PathBuf::from(h).join("Library").join("Application Support").join(APP_DIR))
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ch9329_host_{tag}_{}", std::process::id()))
    }

    #[test]
    fn test_app_config_default_matches_chip_defaults() {
        // Arrange / Act
        let cfg = AppConfig::default();

        // Assert
        assert_eq!(cfg.serial.baud_rate, 115_200);
        assert_eq!(cfg.serial.port, None);
        assert!(cfg.hid.absolute_mode);
        assert_eq!(cfg.hid.reply_timeout_ms, 300);
        assert_eq!(cfg.typing.key_delay_ms, 30);
        assert_eq!(cfg.typing.max_chars, 1000);
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn test_hid_config_follows_mode_flag() {
        // Arrange
        let mut cfg = AppConfig::default();
        cfg.hid.absolute_mode = false;
        cfg.hid.scroll_sensitivity = 3;

        // Act
        let hid = cfg.hid_config();

        // Assert
        assert_eq!(hid.mode, PositioningMode::Relative);
        assert_eq!(hid.scroll_sensitivity, 3);
        assert_eq!(hid.reply_timeout, Duration::from_millis(300));
    }

    #[test]
    fn test_type_options_use_typing_table() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.type_options(), TypeOptions::default());
    }

    #[test]
    fn test_app_config_serializes_and_deserializes_round_trip() {
        // Arrange
        let mut cfg = AppConfig::default();
        cfg.serial.port = Some("/dev/ttyUSB0".to_string());
        cfg.hid.reply_timeout_ms = 500;

        // Act
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: AppConfig = toml::from_str(&toml_str).expect("deserialize");

        // Assert
        assert_eq!(cfg, restored);
    }

    #[test]
    fn test_unset_port_is_omitted_from_toml() {
        let toml_str = toml::to_string_pretty(&AppConfig::default()).expect("serialize");
        assert!(!toml_str.contains("port ="), "None port must be omitted");
    }

    #[test]
    fn test_deserialize_empty_toml_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_deserialize_partial_table_overrides_defaults() {
        // Arrange
        let toml_str = r#"
[serial]
port = "COM3"

[hid]
absolute_mode = false
"#;

        // Act
        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(cfg.serial.port.as_deref(), Some("COM3"));
        assert!(!cfg.hid.absolute_mode);
        // Unspecified fields keep their defaults
        assert_eq!(cfg.serial.baud_rate, 115_200);
        assert_eq!(cfg.hid.scroll_sensitivity, 1);
    }

    #[test]
    fn test_invalid_toml_returns_parse_error() {
        // Arrange
        let dir = temp_dir("invalid");
        let path = dir.join("config.toml");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(&path, "[[[ not valid toml").unwrap();

        // Act
        let result = load_from(&path);

        // Assert
        assert!(matches!(result, Err(ConfigError::Parse(_))));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_from_missing_file_returns_default() {
        let path = PathBuf::from("/nonexistent/path/that/cannot/exist/config.toml");

        let cfg = load_from(&path).expect("missing file is not an error");

        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_save_and_load_round_trip_via_temp_dir() {
        // Arrange
        let dir = temp_dir("round_trip");
        let path = dir.join("nested").join("config.toml");
        let mut cfg = AppConfig::default();
        cfg.serial.port = Some("/dev/ttyACM0".to_string());
        cfg.log_level = "debug".to_string();

        // Act
        save_to(&path, &cfg).expect("save");
        let loaded = load_from(&path).expect("load");

        // Assert
        assert_eq!(loaded, cfg);

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_config_file_path_ends_with_app_dir_and_file_name() {
        if let Ok(path) = config_file_path() {
            assert!(path.ends_with("ch9329-host/config.toml"), "got {path:?}");
        }
        // NoPlatformConfigDir in a stripped environment is also acceptable.
    }
}
