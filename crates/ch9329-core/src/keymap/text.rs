//! Character to keystroke table for typing text on a US layout.
//!
//! Each printable ASCII character becomes one key plus an optional Shift.
//! `\n` types Enter and `\t` types Tab.  Anything else (accented letters,
//! emoji, control characters) has no keystroke and is reported as `None`.

use serde::{Deserialize, Serialize};

use super::hid::HidKeyCode;

/// One key press needed to produce a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keystroke {
    pub key: HidKeyCode,
    /// Hold Left Shift while the key is down.
    pub shift: bool,
}

impl Keystroke {
    const fn plain(key: HidKeyCode) -> Option<Self> {
        Some(Self { key, shift: false })
    }

    const fn shifted(key: HidKeyCode) -> Option<Self> {
        Some(Self { key, shift: true })
    }
}

/// Looks up the keystroke that types `c` on a US layout.
pub fn char_to_keystroke(c: char) -> Option<Keystroke> {
    let index = c as u32;
    if index < 128 {
        ASCII_TABLE[index as usize]
    } else {
        None
    }
}

const ASCII_TABLE: [Option<Keystroke>; 128] = {
    use HidKeyCode::*;
    let mut t: [Option<Keystroke>; 128] = [None; 128];

    t[b'\t' as usize] = Keystroke::plain(Tab);
    t[b'\n' as usize] = Keystroke::plain(Enter);
    t[b' ' as usize] = Keystroke::plain(Space);

    // Letters: lowercase plain, uppercase shifted.
    let letters = [
        KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI, KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO,
        KeyP, KeyQ, KeyR, KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,
    ];
    let mut i = 0;
    while i < letters.len() {
        t[b'a' as usize + i] = Keystroke::plain(letters[i]);
        t[b'A' as usize + i] = Keystroke::shifted(letters[i]);
        i += 1;
    }

    // Digit row and its shifted symbols.
    t[b'1' as usize] = Keystroke::plain(Digit1);
    t[b'2' as usize] = Keystroke::plain(Digit2);
    t[b'3' as usize] = Keystroke::plain(Digit3);
    t[b'4' as usize] = Keystroke::plain(Digit4);
    t[b'5' as usize] = Keystroke::plain(Digit5);
    t[b'6' as usize] = Keystroke::plain(Digit6);
    t[b'7' as usize] = Keystroke::plain(Digit7);
    t[b'8' as usize] = Keystroke::plain(Digit8);
    t[b'9' as usize] = Keystroke::plain(Digit9);
    t[b'0' as usize] = Keystroke::plain(Digit0);
    t[b'!' as usize] = Keystroke::shifted(Digit1);
    t[b'@' as usize] = Keystroke::shifted(Digit2);
    t[b'#' as usize] = Keystroke::shifted(Digit3);
    t[b'$' as usize] = Keystroke::shifted(Digit4);
    t[b'%' as usize] = Keystroke::shifted(Digit5);
    t[b'^' as usize] = Keystroke::shifted(Digit6);
    t[b'&' as usize] = Keystroke::shifted(Digit7);
    t[b'*' as usize] = Keystroke::shifted(Digit8);
    t[b'(' as usize] = Keystroke::shifted(Digit9);
    t[b')' as usize] = Keystroke::shifted(Digit0);

    // Punctuation pairs.
    t[b'-' as usize] = Keystroke::plain(Minus);
    t[b'_' as usize] = Keystroke::shifted(Minus);
    t[b'=' as usize] = Keystroke::plain(Equal);
    t[b'+' as usize] = Keystroke::shifted(Equal);
    t[b'[' as usize] = Keystroke::plain(BracketLeft);
    t[b'{' as usize] = Keystroke::shifted(BracketLeft);
    t[b']' as usize] = Keystroke::plain(BracketRight);
    t[b'}' as usize] = Keystroke::shifted(BracketRight);
    t[b'\\' as usize] = Keystroke::plain(Backslash);
    t[b'|' as usize] = Keystroke::shifted(Backslash);
    t[b';' as usize] = Keystroke::plain(Semicolon);
    t[b':' as usize] = Keystroke::shifted(Semicolon);
    t[b'\'' as usize] = Keystroke::plain(Quote);
    t[b'"' as usize] = Keystroke::shifted(Quote);
    t[b',' as usize] = Keystroke::plain(Comma);
    t[b'<' as usize] = Keystroke::shifted(Comma);
    t[b'.' as usize] = Keystroke::plain(Period);
    t[b'>' as usize] = Keystroke::shifted(Period);
    t[b'/' as usize] = Keystroke::plain(Slash);
    t[b'?' as usize] = Keystroke::shifted(Slash);
    t[b'`' as usize] = Keystroke::plain(Backquote);
    t[b'~' as usize] = Keystroke::shifted(Backquote);

    t
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_letters_are_unshifted() {
        let stroke = char_to_keystroke('h').unwrap();
        assert_eq!(stroke, Keystroke { key: HidKeyCode::KeyH, shift: false });
    }

    #[test]
    fn test_uppercase_letters_use_shift() {
        let stroke = char_to_keystroke('H').unwrap();
        assert_eq!(stroke, Keystroke { key: HidKeyCode::KeyH, shift: true });
    }

    #[test]
    fn test_shifted_symbols_share_base_key() {
        // Arrange
        let pairs = [('1', '!'), ('-', '_'), (';', ':'), ('/', '?'), ('`', '~'), ('\'', '"')];

        for (base, symbol) in pairs {
            // Act
            let plain = char_to_keystroke(base).unwrap();
            let shifted = char_to_keystroke(symbol).unwrap();

            // Assert
            assert_eq!(plain.key, shifted.key, "{base} and {symbol} share a key");
            assert!(!plain.shift);
            assert!(shifted.shift);
        }
    }

    #[test]
    fn test_whitespace_maps_to_control_keys() {
        assert_eq!(char_to_keystroke('\n').map(|k| k.key), Some(HidKeyCode::Enter));
        assert_eq!(char_to_keystroke('\t').map(|k| k.key), Some(HidKeyCode::Tab));
        assert_eq!(char_to_keystroke(' ').map(|k| k.key), Some(HidKeyCode::Space));
    }

    #[test]
    fn test_every_printable_ascii_character_is_typeable() {
        for c in ' '..='~' {
            assert!(char_to_keystroke(c).is_some(), "{c:?} should be typeable");
        }
    }

    #[test]
    fn test_unsupported_characters_return_none() {
        for c in ['\r', '\0', '\u{7f}', 'é', 'ß', '€', '😀'] {
            assert_eq!(char_to_keystroke(c), None, "{c:?} should be unsupported");
        }
    }
}
