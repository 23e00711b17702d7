//! HidController: the keyboard and mouse state of one connected dongle.
//!
//! Every mutation follows the same pattern:
//!
//! 1. validate and translate the input (no state touched on failure),
//! 2. apply the change to the in-memory report,
//! 3. send the whole report through the [`ReplyCorrelator`].
//!
//! If step 3 fails the report keeps the new state.  The frame may have
//! reached the chip, and the next successful flush carries the full report
//! anyway, so the two sides converge on the next change.

use std::sync::Arc;
use std::time::Duration;

use ch9329_core::keymap::{HidKeyCode, KeyMapper};
use ch9329_core::protocol::{ChipInfo, CommandId, ProtocolError};
use ch9329_core::report::mouse::scroll_wheel_byte;
use ch9329_core::report::{KeyboardReport, ModifierKey, MouseButton, MouseReport, PositioningMode};
use tracing::{debug, info};

use crate::application::correlator::ReplyCorrelator;
use crate::application::error::HidError;

/// Reply timeout the chip is given for every command.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_millis(300);

/// Wheel byte magnitude used for one scroll step.
pub const DEFAULT_SCROLL_SENSITIVITY: u8 = 1;

/// Runtime settings of a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HidConfig {
    pub mode: PositioningMode,
    pub scroll_sensitivity: u8,
    pub reply_timeout: Duration,
}

impl Default for HidConfig {
    fn default() -> Self {
        Self {
            mode: PositioningMode::Absolute,
            scroll_sensitivity: DEFAULT_SCROLL_SENSITIVITY,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
        }
    }
}

/// Owns the keyboard and mouse reports for one dongle.
pub struct HidController {
    correlator: Arc<ReplyCorrelator>,
    keyboard: KeyboardReport,
    mouse: MouseReport,
    config: HidConfig,
}

impl HidController {
    pub fn new(correlator: Arc<ReplyCorrelator>, config: HidConfig) -> Self {
        Self {
            correlator,
            keyboard: KeyboardReport::new(),
            mouse: MouseReport::new(config.mode),
            config,
        }
    }

    pub fn keyboard(&self) -> &KeyboardReport {
        &self.keyboard
    }

    pub fn mouse(&self) -> &MouseReport {
        &self.mouse
    }

    pub fn config(&self) -> &HidConfig {
        &self.config
    }

    // ── Keyboard ──────────────────────────────────────────────────────────────

    /// Holds `key` down.  Already held keys send nothing.
    ///
    /// # Errors
    ///
    /// [`HidError::Report`] with `CapacityExceeded` when six keys are already
    /// held, plus any error from the flush.
    pub async fn press(&mut self, key: HidKeyCode) -> Result<(), HidError> {
        if self.keyboard.press(key)? {
            self.flush().await?;
        }
        Ok(())
    }

    /// Lets go of `key`.  Keys that are not held send nothing.
    pub async fn release(&mut self, key: HidKeyCode) -> Result<(), HidError> {
        if self.keyboard.release(key) {
            self.flush().await?;
        }
        Ok(())
    }

    /// Translates a browser key code and presses it.
    ///
    /// # Errors
    ///
    /// [`HidError::TranslationUnsupported`] for key codes with no usage; the
    /// report is untouched and nothing is sent.
    pub async fn press_host_key(&mut self, keycode: u16) -> Result<(), HidError> {
        let key = translate(keycode)?;
        self.press(key).await
    }

    pub async fn release_host_key(&mut self, keycode: u16) -> Result<(), HidError> {
        let key = translate(keycode)?;
        self.release(key).await
    }

    pub async fn set_modifier(&mut self, modifier: ModifierKey) -> Result<(), HidError> {
        self.keyboard.set_modifier(modifier);
        self.flush().await
    }

    pub async fn clear_modifier(&mut self, modifier: ModifierKey) -> Result<(), HidError> {
        self.keyboard.clear_modifier(modifier);
        self.flush().await
    }

    /// Sets the modifier for host key code 16, 17, 18 or 91.
    ///
    /// # Errors
    ///
    /// [`HidError::NotAModifier`] for any other key code.
    pub async fn set_host_modifier(&mut self, keycode: u16, right_side: bool) -> Result<(), HidError> {
        let modifier = host_modifier(keycode, right_side)?;
        self.set_modifier(modifier).await
    }

    pub async fn clear_host_modifier(&mut self, keycode: u16, right_side: bool) -> Result<(), HidError> {
        let modifier = host_modifier(keycode, right_side)?;
        self.clear_modifier(modifier).await
    }

    /// Sends the keyboard report as it stands.
    pub async fn flush(&mut self) -> Result<(), HidError> {
        let payload = self.keyboard.payload();
        self.send(CommandId::KeyboardReport, &payload).await
    }

    // ── Mouse ─────────────────────────────────────────────────────────────────

    /// Moves the pointer to `(x, y)` on the 0..=4095 grid.
    ///
    /// # Errors
    ///
    /// [`HidError::Report`] with `PositioningMode` in relative mode, or with
    /// `CoordinateOutOfRange` when either axis exceeds 4095.
    pub async fn move_to(&mut self, x: u16, y: u16) -> Result<(), HidError> {
        self.mouse.set_position(x, y)?;
        let payload = self.mouse.absolute_payload(0);
        self.send(CommandId::MouseAbsolute, &payload).await
    }

    /// Moves the pointer by a relative step.  Allowed in either mode.
    pub async fn move_by(&mut self, dx: i8, dy: i8, wheel: i8) -> Result<(), HidError> {
        let payload = self.mouse.relative_payload(dx, dy, wheel as u8);
        self.send(CommandId::MouseRelative, &payload).await
    }

    /// Presses `button` and re-sends the last positioning report.
    ///
    /// # Errors
    ///
    /// [`HidError::Report`] with `InvalidButton` for [`MouseButton::All`].
    pub async fn button_down(&mut self, button: MouseButton) -> Result<(), HidError> {
        self.mouse.press_button(button)?;
        self.resend_position().await
    }

    /// Releases `button` (every button for `All`) and re-sends the last
    /// positioning report.
    pub async fn button_up(&mut self, button: MouseButton) -> Result<(), HidError> {
        self.mouse.release_button(button);
        self.resend_position().await
    }

    /// Scrolls one step in the direction of `delta`.  Zero sends nothing.
    ///
    /// Always sent as a zero-motion relative report, in both modes.
    pub async fn scroll(&mut self, delta: i32) -> Result<(), HidError> {
        let Some(wheel) = scroll_wheel_byte(delta, self.config.scroll_sensitivity) else {
            return Ok(());
        };
        let payload = self.mouse.relative_payload(0, 0, wheel);
        self.send(CommandId::MouseRelative, &payload).await
    }

    async fn resend_position(&mut self) -> Result<(), HidError> {
        match self.mouse.mode() {
            PositioningMode::Absolute => {
                let payload = self.mouse.absolute_payload(0);
                self.send(CommandId::MouseAbsolute, &payload).await
            }
            PositioningMode::Relative => {
                let payload = self.mouse.relative_payload(0, 0, 0);
                self.send(CommandId::MouseRelative, &payload).await
            }
        }
    }

    // ── Device ────────────────────────────────────────────────────────────────

    /// Restarts the chip.  Local state is left alone; see [`reset_state`](Self::reset_state).
    pub async fn soft_reset(&mut self) -> Result<(), HidError> {
        info!("soft-resetting chip");
        self.send(CommandId::SoftReset, &[]).await
    }

    /// Reads firmware version, USB status and lock LEDs.
    ///
    /// # Errors
    ///
    /// [`HidError::Protocol`] when the reply payload is shorter than 8 bytes.
    pub async fn query_info(&self) -> Result<ChipInfo, HidError> {
        let payload = self
            .correlator
            .request(CommandId::GetInfo, &[], self.config.reply_timeout)
            .await?;
        ChipInfo::from_payload(&payload).ok_or_else(|| {
            HidError::Protocol(ProtocolError::MalformedPayload(format!(
                "chip info needs 8 bytes, got {}",
                payload.len()
            )))
        })
    }

    /// Forgets every held key, modifier and button without sending anything.
    pub fn reset_state(&mut self) {
        debug!("clearing local report state");
        self.keyboard.reset();
        self.mouse.reset();
    }

    async fn send(&self, command: CommandId, payload: &[u8]) -> Result<(), HidError> {
        self.correlator
            .request(command, payload, self.config.reply_timeout)
            .await
            .map(drop)
    }
}

fn translate(keycode: u16) -> Result<HidKeyCode, HidError> {
    KeyMapper::browser_to_hid(keycode).ok_or(HidError::TranslationUnsupported { keycode })
}

fn host_modifier(keycode: u16, right_side: bool) -> Result<ModifierKey, HidError> {
    ModifierKey::from_host_keycode(keycode, right_side).ok_or(HidError::NotAModifier { keycode })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
