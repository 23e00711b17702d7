//! Modifier keys and their bits in the keyboard report's first byte.

use serde::{Deserialize, Serialize};

use crate::keymap::HidKeyCode;

/// One of the eight modifier keys.  The discriminant is the key's bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ModifierKey {
    LeftCtrl = 0x01,
    LeftShift = 0x02,
    LeftAlt = 0x04,
    LeftMeta = 0x08,
    RightCtrl = 0x10,
    RightShift = 0x20,
    RightAlt = 0x40,
    RightMeta = 0x80,
}

impl ModifierKey {
    pub const ALL: [ModifierKey; 8] = [
        ModifierKey::LeftCtrl,
        ModifierKey::LeftShift,
        ModifierKey::LeftAlt,
        ModifierKey::LeftMeta,
        ModifierKey::RightCtrl,
        ModifierKey::RightShift,
        ModifierKey::RightAlt,
        ModifierKey::RightMeta,
    ];

    /// Bit in the modifier byte.
    pub fn bit(self) -> u8 {
        self as u8
    }

    /// Modifier for a browser key code (16 Shift, 17 Ctrl, 18 Alt, 91 Meta).
    ///
    /// `right_side` selects the right-hand key, as reported by
    /// `KeyboardEvent.location`.  Any other key code returns `None`.
    pub fn from_host_keycode(keycode: u16, right_side: bool) -> Option<Self> {
        let (left, right) = match keycode {
            16 => (ModifierKey::LeftShift, ModifierKey::RightShift),
            17 => (ModifierKey::LeftCtrl, ModifierKey::RightCtrl),
            18 => (ModifierKey::LeftAlt, ModifierKey::RightAlt),
            91 => (ModifierKey::LeftMeta, ModifierKey::RightMeta),
            _ => return None,
        };
        Some(if right_side { right } else { left })
    }

    /// Modifier controlled by a modifier usage (0xE0–0xE7).
    pub fn from_hid(key: HidKeyCode) -> Option<Self> {
        let bit = key.modifier_bit()?;
        Self::ALL.into_iter().find(|m| m.bit() == bit)
    }
}
