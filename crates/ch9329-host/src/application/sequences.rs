//! Multi-report input sequences built on top of [`HidController`].
//!
//! - [`send_key_combination`] and the [`Hotkey`] catalogue: chorded shortcuts
//!   such as Ctrl+Alt+Del.
//! - [`type_text`]: types a string one character at a time on a US layout.
//! - [`recover`]: resets the chip and pulses the modifiers so the target
//!   forgets any key it believes is stuck.
//!
//! All delays are `tokio::time::sleep` calls awaited in line; nothing is left
//! running in the background once a function returns.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use ch9329_core::keymap::{HidKeyCode, KeyMapper, Keystroke};
use ch9329_core::report::ModifierKey;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::application::controller::HidController;
use crate::application::error::HidError;

/// Pause between the individual presses and releases of a key combination.
pub const COMBINATION_GAP: Duration = Duration::from_millis(10);

const RECOVER_SETTLE: Duration = Duration::from_millis(50);
const RECOVER_PULSE: Duration = Duration::from_millis(50);
const RECOVER_BETWEEN_PULSES: Duration = Duration::from_millis(100);

// ── Key combinations ──────────────────────────────────────────────────────────

/// Presses `keys` in order, then releases them in reverse order, with
/// [`COMBINATION_GAP`] after every step.
///
/// Modifier usages (0xE0–0xE7) go to the modifier byte rather than a key slot.
///
/// # Errors
///
/// The first controller error.  Pressing stops at a failed key, but every key
/// up to and including it is still released, so no key is left held.
pub async fn send_key_combination(hid: &mut HidController, keys: &[HidKeyCode]) -> Result<(), HidError> {
    debug!(?keys, "sending key combination");
    let mut first_error = None;
    let mut held = 0;
    for &key in keys {
        held += 1;
        let result = hold(hid, key).await;
        sleep(COMBINATION_GAP).await;
        if let Err(e) = result {
            warn!(?key, error = %e, "press failed; releasing held keys");
            first_error = Some(e);
            break;
        }
    }
    for &key in keys[..held].iter().rev() {
        let result = let_go(hid, key).await;
        sleep(COMBINATION_GAP).await;
        if let Err(e) = result {
            first_error.get_or_insert(e);
        }
    }
    first_error.map_or(Ok(()), Err)
}

async fn hold(hid: &mut HidController, key: HidKeyCode) -> Result<(), HidError> {
    match ModifierKey::from_hid(key) {
        Some(modifier) => hid.set_modifier(modifier).await,
        None => hid.press(key).await,
    }
}

async fn let_go(hid: &mut HidController, key: HidKeyCode) -> Result<(), HidError> {
    match ModifierKey::from_hid(key) {
        Some(modifier) => hid.clear_modifier(modifier).await,
        None => hid.release(key).await,
    }
}

/// Error returned when parsing an unknown hotkey name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown hotkey '{0}'")]
pub struct UnknownHotkey(pub String);

/// Predefined shortcuts, named the way they are typed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hotkey {
    CtrlAltDel,
    WinShiftS,
    WinL,
    WinD,
    WinE,
    WinR,
    CtrlShiftEsc,
    AltF4,
    PrintScreen,
    AltPrintScreen,
    CmdShift3,
    CmdShift4,
    AltTab,
    F2,
    F5,
    CtrlC,
    CtrlV,
    CtrlZ,
    CtrlY,
    CtrlA,
    CtrlF,
    CtrlS,
    CtrlP,
    CtrlW,
    CtrlAltT,
    SuperL,
}

impl Hotkey {
    pub const ALL: [Hotkey; 26] = [
        Hotkey::CtrlAltDel,
        Hotkey::WinShiftS,
        Hotkey::WinL,
        Hotkey::WinD,
        Hotkey::WinE,
        Hotkey::WinR,
        Hotkey::CtrlShiftEsc,
        Hotkey::AltF4,
        Hotkey::PrintScreen,
        Hotkey::AltPrintScreen,
        Hotkey::CmdShift3,
        Hotkey::CmdShift4,
        Hotkey::AltTab,
        Hotkey::F2,
        Hotkey::F5,
        Hotkey::CtrlC,
        Hotkey::CtrlV,
        Hotkey::CtrlZ,
        Hotkey::CtrlY,
        Hotkey::CtrlA,
        Hotkey::CtrlF,
        Hotkey::CtrlS,
        Hotkey::CtrlP,
        Hotkey::CtrlW,
        Hotkey::CtrlAltT,
        Hotkey::SuperL,
    ];

    /// Kebab-case name, e.g. `"ctrl-alt-del"`.
    pub fn name(self) -> &'static str {
        match self {
            Hotkey::CtrlAltDel => "ctrl-alt-del",
            Hotkey::WinShiftS => "win-shift-s",
            Hotkey::WinL => "win-l",
            Hotkey::WinD => "win-d",
            Hotkey::WinE => "win-e",
            Hotkey::WinR => "win-r",
            Hotkey::CtrlShiftEsc => "ctrl-shift-esc",
            Hotkey::AltF4 => "alt-f4",
            Hotkey::PrintScreen => "printscreen",
            Hotkey::AltPrintScreen => "alt-printscreen",
            Hotkey::CmdShift3 => "cmd-shift-3",
            Hotkey::CmdShift4 => "cmd-shift-4",
            Hotkey::AltTab => "alt-tab",
            Hotkey::F2 => "f2",
            Hotkey::F5 => "f5",
            Hotkey::CtrlC => "ctrl-c",
            Hotkey::CtrlV => "ctrl-v",
            Hotkey::CtrlZ => "ctrl-z",
            Hotkey::CtrlY => "ctrl-y",
            Hotkey::CtrlA => "ctrl-a",
            Hotkey::CtrlF => "ctrl-f",
            Hotkey::CtrlS => "ctrl-s",
            Hotkey::CtrlP => "ctrl-p",
            Hotkey::CtrlW => "ctrl-w",
            Hotkey::CtrlAltT => "ctrl-alt-t",
            Hotkey::SuperL => "super-l",
        }
    }

    /// Keys of the combination, in press order.
    pub fn keys(self) -> &'static [HidKeyCode] {
        use HidKeyCode::*;
        match self {
            Hotkey::CtrlAltDel => &[ControlLeft, AltLeft, Delete],
            Hotkey::WinShiftS => &[MetaLeft, ShiftLeft, KeyS],
            Hotkey::WinL | Hotkey::SuperL => &[MetaLeft, KeyL],
            Hotkey::WinD => &[MetaLeft, KeyD],
            Hotkey::WinE => &[MetaLeft, KeyE],
            Hotkey::WinR => &[MetaLeft, KeyR],
            Hotkey::CtrlShiftEsc => &[ControlLeft, ShiftLeft, Escape],
            Hotkey::AltF4 => &[AltLeft, HidKeyCode::F4],
            Hotkey::PrintScreen => &[HidKeyCode::PrintScreen],
            Hotkey::AltPrintScreen => &[AltLeft, HidKeyCode::PrintScreen],
            Hotkey::CmdShift3 => &[MetaLeft, ShiftLeft, Digit3],
            Hotkey::CmdShift4 => &[MetaLeft, ShiftLeft, Digit4],
            Hotkey::AltTab => &[AltLeft, Tab],
            Hotkey::F2 => &[HidKeyCode::F2],
            Hotkey::F5 => &[HidKeyCode::F5],
            Hotkey::CtrlC => &[ControlLeft, KeyC],
            Hotkey::CtrlV => &[ControlLeft, KeyV],
            Hotkey::CtrlZ => &[ControlLeft, KeyZ],
            Hotkey::CtrlY => &[ControlLeft, KeyY],
            Hotkey::CtrlA => &[ControlLeft, KeyA],
            Hotkey::CtrlF => &[ControlLeft, KeyF],
            Hotkey::CtrlS => &[ControlLeft, KeyS],
            Hotkey::CtrlP => &[ControlLeft, KeyP],
            Hotkey::CtrlW => &[ControlLeft, KeyW],
            Hotkey::CtrlAltT => &[ControlLeft, AltLeft, KeyT],
        }
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Hotkey {
    type Err = UnknownHotkey;

    /// Accepts the kebab-case name, case-insensitively.  The macOS shortcuts
    /// also answer to a `mac-` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let name = lowered.strip_prefix("mac-").unwrap_or(&lowered);
        Hotkey::ALL
            .into_iter()
            .find(|hotkey| hotkey.name() == name)
            .filter(|hotkey| {
                name.len() == lowered.len() || matches!(hotkey, Hotkey::CmdShift3 | Hotkey::CmdShift4)
            })
            .ok_or_else(|| UnknownHotkey(s.to_string()))
    }
}

/// Sends `hotkey` as a key combination.
pub async fn send_hotkey(hid: &mut HidController, hotkey: Hotkey) -> Result<(), HidError> {
    info!(%hotkey, "sending hotkey");
    send_key_combination(hid, hotkey.keys()).await
}

// ── Typing ────────────────────────────────────────────────────────────────────

/// Pacing and size limit for [`type_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeOptions {
    /// Pause after every character, typed or skipped.
    pub key_delay: Duration,
    /// Longest text accepted.
    pub max_chars: usize,
}

impl Default for TypeOptions {
    fn default() -> Self {
        Self {
            key_delay: Duration::from_millis(30),
            max_chars: 1000,
        }
    }
}

/// Outcome of a [`type_text`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeSummary {
    pub sent: usize,
    /// Characters with no key on a US layout.
    pub skipped: usize,
    pub cancelled: bool,
}

/// Types `text` one character at a time.
///
/// Each character is a full press/release, wrapped in Left Shift when the
/// character needs it.  `cancel` is checked before every character; setting
/// it stops the loop with the keys typed so far left in place.
///
/// # Errors
///
/// [`HidError::TextTooLong`] before anything is sent when `text` exceeds
/// `options.max_chars`.  A controller error aborts the loop after the key and
/// Shift of the failed character have been released.
pub async fn type_text(
    hid: &mut HidController,
    text: &str,
    options: &TypeOptions,
    cancel: &AtomicBool,
) -> Result<TypeSummary, HidError> {
    let len = text.chars().count();
    if len > options.max_chars {
        return Err(HidError::TextTooLong {
            len,
            max: options.max_chars,
        });
    }

    let mut summary = TypeSummary::default();
    for c in text.chars() {
        if cancel.load(Ordering::Relaxed) {
            summary.cancelled = true;
            break;
        }
        match KeyMapper::char_to_keystroke(c) {
            Some(stroke) => {
                if let Err(e) = tap(hid, stroke).await {
                    warn!(?c, error = %e, sent = summary.sent, "typing aborted");
                    return Err(e);
                }
                summary.sent += 1;
            }
            None => {
                debug!(?c, "no key for character");
                summary.skipped += 1;
            }
        }
        sleep(options.key_delay).await;
    }

    info!(
        sent = summary.sent,
        skipped = summary.skipped,
        cancelled = summary.cancelled,
        "finished typing"
    );
    Ok(summary)
}

/// Presses and releases one keystroke, Shift included.
///
/// The release and the Shift clear are attempted even after a failed step,
/// so the report is empty again whatever happens.  Returns the first error.
async fn tap(hid: &mut HidController, stroke: Keystroke) -> Result<(), HidError> {
    let shift = if stroke.shift {
        hid.set_modifier(ModifierKey::LeftShift).await
    } else {
        Ok(())
    };
    let press = match shift {
        Ok(()) => hid.press(stroke.key).await,
        Err(e) => Err(e),
    };
    let release = hid.release(stroke.key).await;
    let unshift = if stroke.shift {
        hid.clear_modifier(ModifierKey::LeftShift).await
    } else {
        Ok(())
    };
    press.and(release).and(unshift)
}

// ── Recovery ──────────────────────────────────────────────────────────────────

/// Resets the chip, clears local state and pulses Shift, Ctrl and Alt.
///
/// Used when the target behaves as if a key were stuck.
pub async fn recover(hid: &mut HidController) -> Result<(), HidError> {
    info!("recovering HID state");
    hid.soft_reset().await?;
    hid.reset_state();
    sleep(RECOVER_SETTLE).await;

    let pulses = [ModifierKey::LeftShift, ModifierKey::LeftCtrl, ModifierKey::LeftAlt];
    for (i, modifier) in pulses.into_iter().enumerate() {
        if i > 0 {
            sleep(RECOVER_BETWEEN_PULSES).await;
        }
        hid.set_modifier(modifier).await?;
        sleep(RECOVER_PULSE).await;
        hid.clear_modifier(modifier).await?;
    }
    Ok(())
}
