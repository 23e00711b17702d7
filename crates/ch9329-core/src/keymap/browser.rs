//! Browser `KeyboardEvent.keyCode` to USB HID Usage ID translation table.
//!
//! Host key events arrive as legacy DOM key codes (`VK`-style numbers: 65 for
//! A, 13 for Enter, 186 for `;`).  The table below turns them into the usage
//! bytes the chip expects.
//!
//! # How this table works
//!
//! `BROWSER_TO_HID_TABLE` is a compile-time array of 256 entries indexed by
//! key code.  Entries without a keyboard usage hold `None`, which callers
//! surface as "unsupported" instead of sending a blank slot.  Key codes above
//! 255 do not occur in practice and are always unsupported.
//!
//! Some keys have two codes depending on the browser (Firefox reports `;` as
//! 59 and `-` as 173); both point at the same usage.

use super::hid::HidKeyCode;

/// Translates a browser key code to a HID Usage ID.
///
/// Returns `None` for key codes with no keyboard usage.
pub fn translate(keycode: u16) -> Option<HidKeyCode> {
    BROWSER_TO_HID_TABLE.get(keycode as usize).copied().flatten()
}

/// Browser key code → HID mapping indexed by key code (0–255).
const BROWSER_TO_HID_TABLE: [Option<HidKeyCode>; 256] = {
    use HidKeyCode::*;
    let mut t: [Option<HidKeyCode>; 256] = [None; 256];

    // ── Control keys ──────────────────────────────────────────────────────────
    t[8] = Some(Backspace);
    t[9] = Some(Tab);
    t[13] = Some(Enter);
    t[16] = Some(ShiftLeft);
    t[17] = Some(ControlLeft);
    t[18] = Some(AltRight);
    t[19] = Some(Pause);
    t[20] = Some(CapsLock);
    t[27] = Some(Escape);
    t[32] = Some(Space);

    // ── Navigation cluster ────────────────────────────────────────────────────
    t[33] = Some(PageUp);
    t[34] = Some(PageDown);
    t[35] = Some(End);
    t[36] = Some(Home);
    t[37] = Some(ArrowLeft);
    t[38] = Some(ArrowUp);
    t[39] = Some(ArrowRight);
    t[40] = Some(ArrowDown);
    // Print Screen (reported as F13 by Firefox).
    t[44] = Some(PrintScreen);
    t[45] = Some(Insert);
    t[46] = Some(Delete);

    // ── Digits (48 = '0', 49..=57 = '1'..'9') ─────────────────────────────────
    t[48] = Some(Digit0);
    t[49] = Some(Digit1);
    t[50] = Some(Digit2);
    t[51] = Some(Digit3);
    t[52] = Some(Digit4);
    t[53] = Some(Digit5);
    t[54] = Some(Digit6);
    t[55] = Some(Digit7);
    t[56] = Some(Digit8);
    t[57] = Some(Digit9);

    // Firefox-only punctuation codes.
    t[59] = Some(Semicolon);
    t[61] = Some(Equal);

    // ── Letters (65..=90) ─────────────────────────────────────────────────────
    t[65] = Some(KeyA);
    t[66] = Some(KeyB);
    t[67] = Some(KeyC);
    t[68] = Some(KeyD);
    t[69] = Some(KeyE);
    t[70] = Some(KeyF);
    t[71] = Some(KeyG);
    t[72] = Some(KeyH);
    t[73] = Some(KeyI);
    t[74] = Some(KeyJ);
    t[75] = Some(KeyK);
    t[76] = Some(KeyL);
    t[77] = Some(KeyM);
    t[78] = Some(KeyN);
    t[79] = Some(KeyO);
    t[80] = Some(KeyP);
    t[81] = Some(KeyQ);
    t[82] = Some(KeyR);
    t[83] = Some(KeyS);
    t[84] = Some(KeyT);
    t[85] = Some(KeyU);
    t[86] = Some(KeyV);
    t[87] = Some(KeyW);
    t[88] = Some(KeyX);
    t[89] = Some(KeyY);
    t[90] = Some(KeyZ);

    // ── OS keys ───────────────────────────────────────────────────────────────
    t[91] = Some(MetaLeft);
    t[92] = Some(MetaRight);
    t[93] = Some(ContextMenu);

    // ── Numpad ────────────────────────────────────────────────────────────────
    t[96] = Some(Numpad0);
    t[97] = Some(Numpad1);
    t[98] = Some(Numpad2);
    t[99] = Some(Numpad3);
    t[100] = Some(Numpad4);
    t[101] = Some(Numpad5);
    t[102] = Some(Numpad6);
    t[103] = Some(Numpad7);
    t[104] = Some(Numpad8);
    t[105] = Some(Numpad9);
    t[106] = Some(NumpadMultiply);
    t[107] = Some(NumpadAdd);
    t[109] = Some(NumpadSubtract);
    t[110] = Some(NumpadDecimal);
    t[111] = Some(NumpadDivide);

    // ── Function keys (112..=123) ─────────────────────────────────────────────
    t[112] = Some(F1);
    t[113] = Some(F2);
    t[114] = Some(F3);
    t[115] = Some(F4);
    t[116] = Some(F5);
    t[117] = Some(F6);
    t[118] = Some(F7);
    t[119] = Some(F8);
    t[120] = Some(F9);
    t[121] = Some(F10);
    t[122] = Some(F11);
    t[123] = Some(F12);

    // ── Locks ─────────────────────────────────────────────────────────────────
    t[144] = Some(NumLock);
    t[145] = Some(ScrollLock);
    t[146] = Some(NumpadEnter);

    // ── Punctuation ───────────────────────────────────────────────────────────
    t[173] = Some(Minus);
    t[186] = Some(Semicolon);
    t[187] = Some(Equal);
    t[188] = Some(Comma);
    t[189] = Some(Minus);
    t[190] = Some(Period);
    t[191] = Some(Slash);
    t[192] = Some(Backquote);
    t[219] = Some(BracketLeft);
    t[220] = Some(Backslash);
    t[221] = Some(BracketRight);
    t[222] = Some(Quote);

    t
};
