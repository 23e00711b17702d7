//! ch9329-host command-line tool.
//!
//! Opens the serial port a CH9329 is attached to and performs one action on
//! the target machine: type text, send a hotkey, click, move, scroll, or
//! recover from stuck keys.
//!
//! # Usage
//!
//! ```text
//! ch9329-host [OPTIONS] <COMMAND>
//!
//! Commands:
//!   type     Type text on the target
//!   hotkey   Send a predefined key combination
//!   key      Press and release a browser key code
//!   click    Click a mouse button (optionally at a position)
//!   move     Move the pointer
//!   scroll   Scroll the wheel one step
//!   reset    Soft-reset the chip and release stuck modifiers
//!   info     Print chip firmware version and lock LEDs
//!   ports    List serial ports
//!   hotkeys  List hotkey names
//!   save-config  Write the effective settings to the config file
//!
//! Options:
//!   --port <PATH>       Serial device [env: CH9329_PORT]
//!   --baud <RATE>       Baud rate [env: CH9329_BAUD]
//!   --config <FILE>     Config file instead of the platform default
//!   --relative          Use relative pointer positioning
//!   --timeout-ms <MS>   Reply timeout per command
//!   --dry-run           Log frames instead of opening a port
//! ```
//!
//! Flags override the config file, which overrides built-in defaults.

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::{bail, Context};
use ch9329_core::report::{MouseButton, PositioningMode};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ch9329_host::application::controller::HidController;
use ch9329_host::application::correlator::ReplyCorrelator;
use ch9329_host::application::sequences::{self, Hotkey, COMBINATION_GAP};
use ch9329_host::application::transport::{InboundBuffer, Transport};
use ch9329_host::infrastructure::storage::config::{self, AppConfig};
use ch9329_host::infrastructure::transport::{mock::MockTransport, serial};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Drive a remote keyboard and mouse through a CH9329 serial HID dongle.
#[derive(Debug, Parser)]
#[command(name = "ch9329-host", version)]
struct Cli {
    /// Serial device the chip is attached to, e.g. `/dev/ttyUSB0` or `COM3`.
    #[arg(long, env = "CH9329_PORT", global = true)]
    port: Option<String>,

    /// Serial baud rate.
    #[arg(long, env = "CH9329_BAUD", global = true)]
    baud: Option<u32>,

    /// Config file to use instead of the platform default.
    #[arg(long, env = "CH9329_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Use relative pointer positioning.
    #[arg(long, global = true)]
    relative: bool,

    /// Reply timeout per command, in milliseconds.
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Do not open a port; log every frame and pretend the chip acknowledged it.
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Type text on the target (US layout).  Ctrl+C stops between characters.
    Type {
        text: String,
        /// Pause after each character, in milliseconds.
        #[arg(long)]
        delay_ms: Option<u64>,
    },
    /// Send a predefined key combination, e.g. `ctrl-alt-del`.
    Hotkey {
        name: Hotkey,
    },
    /// Press and release one browser `KeyboardEvent.keyCode`.
    Key {
        keycode: u16,
    },
    /// Click a mouse button, optionally moving to `x,y` first (absolute mode).
    Click {
        #[arg(value_enum, default_value_t = ButtonArg::Left)]
        button: ButtonArg,
        #[arg(long)]
        x: Option<u16>,
        #[arg(long)]
        y: Option<u16>,
    },
    /// Move the pointer: to `x y` on the 0..=4095 grid, or by `dx dy` with `--by`.
    Move {
        #[arg(allow_negative_numbers = true)]
        x: i32,
        #[arg(allow_negative_numbers = true)]
        y: i32,
        /// Treat the coordinates as a relative step.
        #[arg(long)]
        by: bool,
    },
    /// Scroll one step: negative up, positive down.
    Scroll {
        #[arg(allow_negative_numbers = true)]
        delta: i32,
    },
    /// Soft-reset the chip and pulse Shift, Ctrl and Alt to release stuck keys.
    Reset,
    /// Print firmware version, USB status and lock LEDs.
    Info,
    /// List serial ports.
    Ports,
    /// List hotkey names.
    Hotkeys,
    /// Write the effective settings (file plus flags) to the config file.
    SaveConfig,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ButtonArg {
    Left,
    Right,
    Middle,
}

impl From<ButtonArg> for MouseButton {
    fn from(arg: ButtonArg) -> Self {
        match arg {
            ButtonArg::Left => MouseButton::Left,
            ButtonArg::Right => MouseButton::Right,
            ButtonArg::Middle => MouseButton::Middle,
        }
    }
}

impl Cli {
    /// Applies command-line overrides on top of the loaded config file.
    fn apply_overrides(&self, cfg: &mut AppConfig) {
        if let Some(port) = &self.port {
            cfg.serial.port = Some(port.clone());
        }
        if let Some(baud) = self.baud {
            cfg.serial.baud_rate = baud;
        }
        if self.relative {
            cfg.hid.absolute_mode = false;
        }
        if let Some(ms) = self.timeout_ms {
            cfg.hid.reply_timeout_ms = ms;
        }
        if let Command::Type { delay_ms: Some(ms), .. } = self.command {
            cfg.typing.key_delay_ms = ms;
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => config::load_from(path),
        None => config::load_config(),
    }
    .context("failed to load configuration")?;
    cli.apply_overrides(&mut cfg);

    // RUST_LOG wins; otherwise the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level)),
        )
        .init();

    match cli.command {
        Command::Ports => return list_ports(),
        Command::Hotkeys => {
            for hotkey in Hotkey::ALL {
                println!("{hotkey}");
            }
            return Ok(());
        }
        Command::SaveConfig => {
            match &cli.config {
                Some(path) => config::save_to(path, &cfg),
                None => config::save_config(&cfg),
            }
            .context("failed to write configuration")?;
            info!("configuration saved");
            return Ok(());
        }
        _ => {}
    }

    let inbound = InboundBuffer::new();
    let transport = open_transport(&cfg, cli.dry_run, inbound.clone())?;
    let correlator = Arc::new(ReplyCorrelator::new(transport, inbound));
    let mut hid = HidController::new(correlator, cfg.hid_config());

    run(&mut hid, cli.command, &cfg).await
}

fn open_transport(cfg: &AppConfig, dry_run: bool, inbound: InboundBuffer) -> anyhow::Result<Arc<dyn Transport>> {
    if dry_run {
        info!("dry run: frames are logged, not sent");
        return Ok(Arc::new(MockTransport::acking(inbound)));
    }
    let Some(port) = cfg.serial.port.as_deref() else {
        bail!("no serial port given; pass --port or set [serial] port in the config file");
    };
    let transport = serial::SerialTransport::open(port, cfg.serial.baud_rate, inbound)
        .with_context(|| format!("failed to open {port} at {} baud", cfg.serial.baud_rate))?;
    Ok(Arc::new(transport))
}

fn list_ports() -> anyhow::Result<()> {
    let ports = serial::available_ports().context("failed to enumerate serial ports")?;
    if ports.is_empty() {
        warn!("no serial ports found");
    }
    for port in ports {
        println!("{port}");
    }
    Ok(())
}

async fn run(hid: &mut HidController, command: Command, cfg: &AppConfig) -> anyhow::Result<()> {
    match command {
        Command::Type { text, .. } => {
            let cancel = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&cancel);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    flag.store(true, Ordering::Relaxed);
                }
            });
            let summary = sequences::type_text(hid, &text, &cfg.type_options(), &cancel)
                .await
                .context("typing failed")?;
            println!(
                "sent {} characters, skipped {}{}",
                summary.sent,
                summary.skipped,
                if summary.cancelled { " (cancelled)" } else { "" }
            );
        }
        Command::Hotkey { name } => {
            sequences::send_hotkey(hid, name)
                .await
                .with_context(|| format!("failed to send {name}"))?;
        }
        Command::Key { keycode } => {
            hid.press_host_key(keycode)
                .await
                .with_context(|| format!("failed to press key code {keycode}"))?;
            tokio::time::sleep(COMBINATION_GAP).await;
            hid.release_host_key(keycode)
                .await
                .with_context(|| format!("failed to release key code {keycode}"))?;
        }
        Command::Click { button, x, y } => {
            if let (Some(x), Some(y)) = (x, y) {
                hid.move_to(x, y).await.context("failed to move pointer")?;
            }
            let button = MouseButton::from(button);
            hid.button_down(button).await.context("failed to press button")?;
            tokio::time::sleep(COMBINATION_GAP).await;
            hid.button_up(button).await.context("failed to release button")?;
        }
        Command::Move { x, y, by } => {
            if by || hid.config().mode == PositioningMode::Relative {
                let dx = i8::try_from(x).context("dx must be within -128..=127")?;
                let dy = i8::try_from(y).context("dy must be within -128..=127")?;
                hid.move_by(dx, dy, 0).await.context("failed to move pointer")?;
            } else {
                let x = u16::try_from(x).context("x must be within 0..=4095")?;
                let y = u16::try_from(y).context("y must be within 0..=4095")?;
                hid.move_to(x, y).await.context("failed to move pointer")?;
            }
        }
        Command::Scroll { delta } => {
            hid.scroll(delta).await.context("failed to scroll")?;
        }
        Command::Reset => {
            sequences::recover(hid).await.context("recovery failed")?;
            println!("chip reset, modifiers released");
        }
        Command::Info => {
            let info = hid.query_info().await.context("failed to query chip")?;
            println!("firmware:   {}", info.version);
            println!("usb:        {}", if info.usb_connected { "connected" } else { "not connected" });
            println!(
                "leds:       num={} caps={} scroll={}",
                info.num_lock, info.caps_lock, info.scroll_lock
            );
        }
        Command::Ports | Command::Hotkeys | Command::SaveConfig => {}
    }
    Ok(())
}
