//! USB HID Usage IDs (page 0x07, Keyboard/Keypad page).
//!
//! The chip takes these codes verbatim: a keyboard report carries up to six
//! of them in its key slots, and the eight modifier usages (0xE0–0xE7) map onto
//! the bits of the report's modifier byte.
//!
//! Reference: USB HID Usage Tables 1.3, Section 10 (Keyboard/Keypad page 0x07).
//!
//! # Usage IDs vs. characters
//!
//! HID codes describe **physical key positions**, not characters.  Letter A is
//! 0x04 whether the target machine uses QWERTY or AZERTY, and `!` is not a key
//! at all: it is Digit1 with Shift held.  Everything that turns characters or
//! browser key codes into usages lives in the sibling modules.

use serde::{Deserialize, Serialize};

/// USB HID Usage ID for keyboard keys (page 0x07).
///
/// The numeric value of each variant is the byte the chip expects in a
/// keyboard report slot.  Only usages the translation tables can produce are
/// named here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum HidKeyCode {
    // Letters (HID 0x04–0x1D)
    KeyA = 0x04,
    KeyB = 0x05,
    KeyC = 0x06,
    KeyD = 0x07,
    KeyE = 0x08,
    KeyF = 0x09,
    KeyG = 0x0A,
    KeyH = 0x0B,
    KeyI = 0x0C,
    KeyJ = 0x0D,
    KeyK = 0x0E,
    KeyL = 0x0F,
    KeyM = 0x10,
    KeyN = 0x11,
    KeyO = 0x12,
    KeyP = 0x13,
    KeyQ = 0x14,
    KeyR = 0x15,
    KeyS = 0x16,
    KeyT = 0x17,
    KeyU = 0x18,
    KeyV = 0x19,
    KeyW = 0x1A,
    KeyX = 0x1B,
    KeyY = 0x1C,
    KeyZ = 0x1D,

    // Digits (HID 0x1E–0x27)
    Digit1 = 0x1E,
    Digit2 = 0x1F,
    Digit3 = 0x20,
    Digit4 = 0x21,
    Digit5 = 0x22,
    Digit6 = 0x23,
    Digit7 = 0x24,
    Digit8 = 0x25,
    Digit9 = 0x26,
    Digit0 = 0x27,

    // Control keys (HID 0x28–0x38)
    Enter = 0x28,
    Escape = 0x29,
    Backspace = 0x2A,
    Tab = 0x2B,
    Space = 0x2C,
    Minus = 0x2D,
    Equal = 0x2E,
    BracketLeft = 0x2F,
    BracketRight = 0x30,
    Backslash = 0x31,
    Semicolon = 0x33,
    Quote = 0x34,
    Backquote = 0x35,
    Comma = 0x36,
    Period = 0x37,
    Slash = 0x38,

    // Lock keys
    CapsLock = 0x39,

    // Function keys (HID 0x3A–0x45)
    F1 = 0x3A,
    F2 = 0x3B,
    F3 = 0x3C,
    F4 = 0x3D,
    F5 = 0x3E,
    F6 = 0x3F,
    F7 = 0x40,
    F8 = 0x41,
    F9 = 0x42,
    F10 = 0x43,
    F11 = 0x44,
    F12 = 0x45,

    // Navigation cluster (HID 0x46–0x52)
    PrintScreen = 0x46,
    ScrollLock = 0x47,
    Pause = 0x48,
    Insert = 0x49,
    Home = 0x4A,
    PageUp = 0x4B,
    Delete = 0x4C,
    End = 0x4D,
    PageDown = 0x4E,
    ArrowRight = 0x4F,
    ArrowLeft = 0x50,
    ArrowDown = 0x51,
    ArrowUp = 0x52,

    // Numpad (HID 0x53–0x63)
    NumLock = 0x53,
    NumpadDivide = 0x54,
    NumpadMultiply = 0x55,
    NumpadSubtract = 0x56,
    NumpadAdd = 0x57,
    NumpadEnter = 0x58,
    Numpad1 = 0x59,
    Numpad2 = 0x5A,
    Numpad3 = 0x5B,
    Numpad4 = 0x5C,
    Numpad5 = 0x5D,
    Numpad6 = 0x5E,
    Numpad7 = 0x5F,
    Numpad8 = 0x60,
    Numpad9 = 0x61,
    Numpad0 = 0x62,
    NumpadDecimal = 0x63,

    // Application key (HID 0x65)
    ContextMenu = 0x65,

    // Modifier keys (HID 0xE0–0xE7)
    ControlLeft = 0xE0,
    ShiftLeft = 0xE1,
    AltLeft = 0xE2,
    MetaLeft = 0xE3,
    ControlRight = 0xE4,
    ShiftRight = 0xE5,
    AltRight = 0xE6,
    MetaRight = 0xE7,
}

impl HidKeyCode {
    /// Converts a raw usage byte to a [`HidKeyCode`].
    ///
    /// Returns `None` for usages this crate does not name (reserved codes,
    /// international keys, media keys).
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x04 => Some(HidKeyCode::KeyA),
            0x05 => Some(HidKeyCode::KeyB),
            0x06 => Some(HidKeyCode::KeyC),
            0x07 => Some(HidKeyCode::KeyD),
            0x08 => Some(HidKeyCode::KeyE),
            0x09 => Some(HidKeyCode::KeyF),
            0x0A => Some(HidKeyCode::KeyG),
            0x0B => Some(HidKeyCode::KeyH),
            0x0C => Some(HidKeyCode::KeyI),
            0x0D => Some(HidKeyCode::KeyJ),
            0x0E => Some(HidKeyCode::KeyK),
            0x0F => Some(HidKeyCode::KeyL),
            0x10 => Some(HidKeyCode::KeyM),
            0x11 => Some(HidKeyCode::KeyN),
            0x12 => Some(HidKeyCode::KeyO),
            0x13 => Some(HidKeyCode::KeyP),
            0x14 => Some(HidKeyCode::KeyQ),
            0x15 => Some(HidKeyCode::KeyR),
            0x16 => Some(HidKeyCode::KeyS),
            0x17 => Some(HidKeyCode::KeyT),
            0x18 => Some(HidKeyCode::KeyU),
            0x19 => Some(HidKeyCode::KeyV),
            0x1A => Some(HidKeyCode::KeyW),
            0x1B => Some(HidKeyCode::KeyX),
            0x1C => Some(HidKeyCode::KeyY),
            0x1D => Some(HidKeyCode::KeyZ),
            0x1E => Some(HidKeyCode::Digit1),
            0x1F => Some(HidKeyCode::Digit2),
            0x20 => Some(HidKeyCode::Digit3),
            0x21 => Some(HidKeyCode::Digit4),
            0x22 => Some(HidKeyCode::Digit5),
            0x23 => Some(HidKeyCode::Digit6),
            0x24 => Some(HidKeyCode::Digit7),
            0x25 => Some(HidKeyCode::Digit8),
            0x26 => Some(HidKeyCode::Digit9),
            0x27 => Some(HidKeyCode::Digit0),
            0x28 => Some(HidKeyCode::Enter),
            0x29 => Some(HidKeyCode::Escape),
            0x2A => Some(HidKeyCode::Backspace),
            0x2B => Some(HidKeyCode::Tab),
            0x2C => Some(HidKeyCode::Space),
            0x2D => Some(HidKeyCode::Minus),
            0x2E => Some(HidKeyCode::Equal),
            0x2F => Some(HidKeyCode::BracketLeft),
            0x30 => Some(HidKeyCode::BracketRight),
            0x31 => Some(HidKeyCode::Backslash),
            0x33 => Some(HidKeyCode::Semicolon),
            0x34 => Some(HidKeyCode::Quote),
            0x35 => Some(HidKeyCode::Backquote),
            0x36 => Some(HidKeyCode::Comma),
            0x37 => Some(HidKeyCode::Period),
            0x38 => Some(HidKeyCode::Slash),
            0x39 => Some(HidKeyCode::CapsLock),
            0x3A => Some(HidKeyCode::F1),
            0x3B => Some(HidKeyCode::F2),
            0x3C => Some(HidKeyCode::F3),
            0x3D => Some(HidKeyCode::F4),
            0x3E => Some(HidKeyCode::F5),
            0x3F => Some(HidKeyCode::F6),
            0x40 => Some(HidKeyCode::F7),
            0x41 => Some(HidKeyCode::F8),
            0x42 => Some(HidKeyCode::F9),
            0x43 => Some(HidKeyCode::F10),
            0x44 => Some(HidKeyCode::F11),
            0x45 => Some(HidKeyCode::F12),
            0x46 => Some(HidKeyCode::PrintScreen),
            0x47 => Some(HidKeyCode::ScrollLock),
            0x48 => Some(HidKeyCode::Pause),
            0x49 => Some(HidKeyCode::Insert),
            0x4A => Some(HidKeyCode::Home),
            0x4B => Some(HidKeyCode::PageUp),
            0x4C => Some(HidKeyCode::Delete),
            0x4D => Some(HidKeyCode::End),
            0x4E => Some(HidKeyCode::PageDown),
            0x4F => Some(HidKeyCode::ArrowRight),
            0x50 => Some(HidKeyCode::ArrowLeft),
            0x51 => Some(HidKeyCode::ArrowDown),
            0x52 => Some(HidKeyCode::ArrowUp),
            0x53 => Some(HidKeyCode::NumLock),
            0x54 => Some(HidKeyCode::NumpadDivide),
            0x55 => Some(HidKeyCode::NumpadMultiply),
            0x56 => Some(HidKeyCode::NumpadSubtract),
            0x57 => Some(HidKeyCode::NumpadAdd),
            0x58 => Some(HidKeyCode::NumpadEnter),
            0x59 => Some(HidKeyCode::Numpad1),
            0x5A => Some(HidKeyCode::Numpad2),
            0x5B => Some(HidKeyCode::Numpad3),
            0x5C => Some(HidKeyCode::Numpad4),
            0x5D => Some(HidKeyCode::Numpad5),
            0x5E => Some(HidKeyCode::Numpad6),
            0x5F => Some(HidKeyCode::Numpad7),
            0x60 => Some(HidKeyCode::Numpad8),
            0x61 => Some(HidKeyCode::Numpad9),
            0x62 => Some(HidKeyCode::Numpad0),
            0x63 => Some(HidKeyCode::NumpadDecimal),
            0x65 => Some(HidKeyCode::ContextMenu),
            0xE0 => Some(HidKeyCode::ControlLeft),
            0xE1 => Some(HidKeyCode::ShiftLeft),
            0xE2 => Some(HidKeyCode::AltLeft),
            0xE3 => Some(HidKeyCode::MetaLeft),
            0xE4 => Some(HidKeyCode::ControlRight),
            0xE5 => Some(HidKeyCode::ShiftRight),
            0xE6 => Some(HidKeyCode::AltRight),
            0xE7 => Some(HidKeyCode::MetaRight),
            _ => None,
        }
    }

    /// Raw usage byte as written into a keyboard report slot.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns `true` for the eight modifier usages (0xE0–0xE7).
    pub fn is_modifier(self) -> bool {
        self.modifier_bit().is_some()
    }

    /// Bit in the report's modifier byte that this usage controls.
    ///
    /// Usage `0xE0 + n` maps to bit `1 << n`; non-modifier keys return `None`.
    pub fn modifier_bit(self) -> Option<u8> {
        let code = self.as_u8();
        if (0xE0..=0xE7).contains(&code) {
            Some(1 << (code - 0xE0))
        } else {
            None
        }
    }
}

impl From<HidKeyCode> for u8 {
    fn from(key: HidKeyCode) -> Self {
        key.as_u8()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STANDARD_KEYS: &[(u8, HidKeyCode)] = &[
        (0x04, HidKeyCode::KeyA),
        (0x1D, HidKeyCode::KeyZ),
        (0x1E, HidKeyCode::Digit1),
        (0x27, HidKeyCode::Digit0),
        (0x28, HidKeyCode::Enter),
        (0x29, HidKeyCode::Escape),
        (0x2A, HidKeyCode::Backspace),
        (0x2B, HidKeyCode::Tab),
        (0x2C, HidKeyCode::Space),
        (0x39, HidKeyCode::CapsLock),
        (0x3A, HidKeyCode::F1),
        (0x45, HidKeyCode::F12),
        (0x46, HidKeyCode::PrintScreen),
        (0x48, HidKeyCode::Pause),
        (0x4C, HidKeyCode::Delete),
        (0x52, HidKeyCode::ArrowUp),
        (0x53, HidKeyCode::NumLock),
        (0x57, HidKeyCode::NumpadAdd),
        (0x62, HidKeyCode::Numpad0),
        (0x65, HidKeyCode::ContextMenu),
        (0xE0, HidKeyCode::ControlLeft),
        (0xE7, HidKeyCode::MetaRight),
    ];

    #[test]
    fn test_from_u8_produces_correct_key_codes() {
        for &(raw, expected) in STANDARD_KEYS {
            assert_eq!(
                HidKeyCode::from_u8(raw),
                Some(expected),
                "from_u8(0x{raw:02X}) should produce {expected:?}"
            );
            assert_eq!(expected.as_u8(), raw);
        }
    }

    #[test]
    fn test_every_named_usage_survives_from_u8() {
        for raw in 0..=u8::MAX {
            if let Some(code) = HidKeyCode::from_u8(raw) {
                assert_eq!(code.as_u8(), raw, "round-trip for 0x{raw:02X} failed");
            }
        }
    }

    #[test]
    fn test_unassigned_values_return_none() {
        for unassigned in [0x00, 0x01, 0x02, 0x03, 0x32, 0x64, 0xA0, 0xE8, 0xFF] {
            assert_eq!(
                HidKeyCode::from_u8(unassigned),
                None,
                "0x{unassigned:02X} should not be named"
            );
        }
    }

    #[test]
    fn test_modifier_bits_follow_usage_order() {
        // Arrange
        let expected = [
            (HidKeyCode::ControlLeft, 0x01),
            (HidKeyCode::ShiftLeft, 0x02),
            (HidKeyCode::AltLeft, 0x04),
            (HidKeyCode::MetaLeft, 0x08),
            (HidKeyCode::ControlRight, 0x10),
            (HidKeyCode::ShiftRight, 0x20),
            (HidKeyCode::AltRight, 0x40),
            (HidKeyCode::MetaRight, 0x80),
        ];

        for (key, bit) in expected {
            // Act / Assert
            assert!(key.is_modifier(), "{key:?} should be a modifier key");
            assert_eq!(key.modifier_bit(), Some(bit));
        }
    }

    #[test]
    fn test_non_modifier_keys_have_no_modifier_bit() {
        for key in [
            HidKeyCode::KeyA,
            HidKeyCode::Enter,
            HidKeyCode::F1,
            HidKeyCode::ContextMenu,
            HidKeyCode::Numpad0,
        ] {
            assert!(!key.is_modifier(), "{key:?} should NOT be a modifier key");
            assert_eq!(key.modifier_bit(), None);
        }
    }

    #[test]
    fn test_letters_are_contiguous() {
        assert_eq!(HidKeyCode::KeyA.as_u8() + 25, HidKeyCode::KeyZ.as_u8());
        assert_eq!(HidKeyCode::Digit1.as_u8() + 9, HidKeyCode::Digit0.as_u8());
    }
}
