//! Key code translation tables.
//!
//! The canonical representation is USB HID Usage IDs (page 0x07,
//! Keyboard/Keypad).  Host key codes and typed characters are translated into
//! usages here, before any report state is touched.

pub mod browser;
pub mod hid;
pub mod text;

pub use hid::HidKeyCode;
pub use text::Keystroke;

/// Unified key mapper for host key codes and typed characters.
pub struct KeyMapper;

impl KeyMapper {
    /// Translates a browser `KeyboardEvent.keyCode` to a [`HidKeyCode`].
    ///
    /// Returns `None` if the key code has no keyboard usage.
    pub fn browser_to_hid(keycode: u16) -> Option<HidKeyCode> {
        browser::translate(keycode)
    }

    /// Keystroke (key plus Shift flag) that types `c` on a US layout.
    pub fn char_to_keystroke(c: char) -> Option<Keystroke> {
        text::char_to_keystroke(c)
    }
}
