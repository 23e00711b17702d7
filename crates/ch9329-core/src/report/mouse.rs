//! Mouse report: button mask plus position.
//!
//! The chip accepts two mouse report shapes:
//!
//! ```text
//! absolute (command 0x04): [0x02][buttons][xL][xH][yL][yH][wheel]
//! relative (command 0x05): [0x01][buttons][dx][dy][wheel]
//! ```
//!
//! Absolute coordinates span `0..=4095` on both axes regardless of the target
//! screen's resolution.  Relative deltas and the wheel are signed bytes.
//!
//! The positioning mode is fixed when the report is created: a dongle is
//! configured for one or the other, and button changes must be re-sent in the
//! same shape as the last movement.

use serde::{Deserialize, Serialize};

use super::ReportError;

/// Largest absolute coordinate on either axis.
pub const MAX_ABSOLUTE_COORD: u16 = 4095;

/// First payload byte of an absolute mouse report.
pub const ABSOLUTE_REPORT_TYPE: u8 = 0x02;

/// First payload byte of a relative mouse report.
pub const RELATIVE_REPORT_TYPE: u8 = 0x01;

/// `-128` is reserved by the chip; deltas that would encode to it are sent as `-127`.
const RESERVED_DELTA: u8 = 0x80;

/// How mouse movement is expressed to the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositioningMode {
    Absolute,
    Relative,
}

/// Mouse buttons.  `All` is only meaningful for release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    All,
}

impl MouseButton {
    /// Bits this button occupies in the button mask.
    pub fn mask(self) -> u8 {
        match self {
            MouseButton::Left => 0x01,
            MouseButton::Right => 0x02,
            MouseButton::Middle => 0x04,
            MouseButton::All => 0x07,
        }
    }
}

/// Mouse button and position state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseReport {
    mode: PositioningMode,
    buttons: u8,
    x: u16,
    y: u16,
}

impl MouseReport {
    pub fn new(mode: PositioningMode) -> Self {
        Self {
            mode,
            buttons: 0,
            x: 0,
            y: 0,
        }
    }

    pub fn mode(&self) -> PositioningMode {
        self.mode
    }

    /// Raw button mask.
    pub fn buttons(&self) -> u8 {
        self.buttons
    }

    /// Last absolute position sent, `(0, 0)` in relative mode.
    pub fn position(&self) -> (u16, u16) {
        (self.x, self.y)
    }

    /// Records a new absolute position.
    ///
    /// # Errors
    ///
    /// - [`ReportError::PositioningMode`] on a relative-mode report.
    /// - [`ReportError::CoordinateOutOfRange`] if either axis exceeds 4095.
    pub fn set_position(&mut self, x: u16, y: u16) -> Result<(), ReportError> {
        if self.mode != PositioningMode::Absolute {
            return Err(ReportError::PositioningMode {
                required: PositioningMode::Absolute,
            });
        }
        if x > MAX_ABSOLUTE_COORD || y > MAX_ABSOLUTE_COORD {
            return Err(ReportError::CoordinateOutOfRange { x, y });
        }
        self.x = x;
        self.y = y;
        Ok(())
    }

    /// Adds `button` to the mask.
    ///
    /// # Errors
    ///
    /// [`ReportError::InvalidButton`] for [`MouseButton::All`].
    pub fn press_button(&mut self, button: MouseButton) -> Result<(), ReportError> {
        if button == MouseButton::All {
            return Err(ReportError::InvalidButton(button));
        }
        self.buttons |= button.mask();
        Ok(())
    }

    /// Removes `button` from the mask; `All` clears it.
    pub fn release_button(&mut self, button: MouseButton) {
        self.buttons &= !button.mask();
    }

    pub fn reset(&mut self) {
        self.buttons = 0;
        self.x = 0;
        self.y = 0;
    }

    /// Command 0x04 payload for the current buttons and position.
    pub fn absolute_payload(&self, wheel: u8) -> [u8; 7] {
        let [x_lo, x_hi] = self.x.to_le_bytes();
        let [y_lo, y_hi] = self.y.to_le_bytes();
        [ABSOLUTE_REPORT_TYPE, self.buttons, x_lo, x_hi, y_lo, y_hi, wheel]
    }

    /// Command 0x05 payload for the current buttons and the given motion.
    pub fn relative_payload(&self, dx: i8, dy: i8, wheel: u8) -> [u8; 5] {
        [
            RELATIVE_REPORT_TYPE,
            self.buttons,
            relative_delta_byte(dx),
            relative_delta_byte(dy),
            wheel,
        ]
    }
}

/// Encodes a relative delta, replacing the reserved `0x80` with `0x81`.
pub fn relative_delta_byte(delta: i8) -> u8 {
    let byte = delta as u8;
    if byte == RESERVED_DELTA {
        RESERVED_DELTA + 1
    } else {
        byte
    }
}

/// Wheel byte for a scroll of `delta` notches, `None` when `delta` is zero.
///
/// Scrolling up (negative delta) sends `sensitivity`; scrolling down sends
/// `255 - sensitivity`.  Only the direction of `delta` matters.
pub fn scroll_wheel_byte(delta: i32, sensitivity: u8) -> Option<u8> {
    match delta.signum() {
        0 => None,
        -1 => Some(sensitivity),
        _ => Some(u8::MAX - sensitivity),
    }
}
