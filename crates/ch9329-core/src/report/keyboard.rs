//! Keyboard report: modifier byte plus six key slots.
//!
//! Serialized as the 8-byte payload of command 0x02:
//!
//! ```text
//! [modifiers][0x00][k1][k2][k3][k4][k5][k6]
//! ```
//!
//! A slot holding `0x00` is empty.  A usage occupies at most one slot, and
//! slot order carries no meaning to the target.

use serde::{Deserialize, Serialize};

use super::{ModifierKey, ReportError};
use crate::keymap::HidKeyCode;

/// Number of simultaneous non-modifier keys a boot keyboard report carries.
pub const KEY_SLOTS: usize = 6;

/// Length of the serialized keyboard report.
pub const KEYBOARD_PAYLOAD_LEN: usize = 2 + KEY_SLOTS;

const EMPTY_SLOT: u8 = 0x00;

/// Pressed modifiers and keys, as last reported to the chip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardReport {
    modifiers: u8,
    slots: [u8; KEY_SLOTS],
}

impl KeyboardReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts `key` into the first empty slot.
    ///
    /// Returns `Ok(false)` if the key is already held; the report is then
    /// unchanged and there is nothing to send.
    ///
    /// # Errors
    ///
    /// [`ReportError::CapacityExceeded`] when all six slots are taken.
    pub fn press(&mut self, key: HidKeyCode) -> Result<bool, ReportError> {
        let usage = key.as_u8();
        if self.slots.contains(&usage) {
            return Ok(false);
        }
        match self.slots.iter_mut().find(|slot| **slot == EMPTY_SLOT) {
            Some(slot) => {
                *slot = usage;
                Ok(true)
            }
            None => Err(ReportError::CapacityExceeded { usage }),
        }
    }

    /// Empties the slot holding `key`.  Returns `false` if it was not held.
    pub fn release(&mut self, key: HidKeyCode) -> bool {
        let usage = key.as_u8();
        match self.slots.iter_mut().find(|slot| **slot == usage) {
            Some(slot) => {
                *slot = EMPTY_SLOT;
                true
            }
            None => false,
        }
    }

    pub fn set_modifier(&mut self, modifier: ModifierKey) {
        self.modifiers |= modifier.bit();
    }

    pub fn clear_modifier(&mut self, modifier: ModifierKey) {
        self.modifiers &= !modifier.bit();
    }

    pub fn is_pressed(&self, key: HidKeyCode) -> bool {
        self.slots.contains(&key.as_u8())
    }

    pub fn modifier_held(&self, modifier: ModifierKey) -> bool {
        self.modifiers & modifier.bit() != 0
    }

    /// Raw modifier bitmask.
    pub fn modifiers(&self) -> u8 {
        self.modifiers
    }

    /// Raw key slots, empty slots as `0x00`.
    pub fn slots(&self) -> [u8; KEY_SLOTS] {
        self.slots
    }

    /// Number of occupied key slots.
    pub fn pressed_count(&self) -> usize {
        self.slots.iter().filter(|&&slot| slot != EMPTY_SLOT).count()
    }

    /// Releases every key and modifier.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Serializes the report into the command 0x02 payload.
    pub fn payload(&self) -> [u8; KEYBOARD_PAYLOAD_LEN] {
        let mut out = [0u8; KEYBOARD_PAYLOAD_LEN];
        out[0] = self.modifiers;
        out[2..].copy_from_slice(&self.slots);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIX_KEYS: [HidKeyCode; 6] = [
        HidKeyCode::KeyA,
        HidKeyCode::KeyB,
        HidKeyCode::KeyC,
        HidKeyCode::KeyD,
        HidKeyCode::KeyE,
        HidKeyCode::KeyF,
    ];

    #[test]
    fn test_press_fills_first_empty_slot() {
        // Arrange
        let mut report = KeyboardReport::new();

        // Act
        let changed = report.press(HidKeyCode::KeyA).unwrap();

        // Assert
        assert!(changed);
        assert_eq!(report.payload(), [0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_press_is_idempotent() {
        let mut report = KeyboardReport::new();
        report.press(HidKeyCode::KeyA).unwrap();

        let changed = report.press(HidKeyCode::KeyA).unwrap();

        assert!(!changed);
        assert_eq!(report.pressed_count(), 1);
    }

    #[test]
    fn test_seventh_key_exceeds_capacity_and_leaves_state_unchanged() {
        // Arrange
        let mut report = KeyboardReport::new();
        for key in SIX_KEYS {
            report.press(key).unwrap();
        }
        let before = report.clone();

        // Act
        let result = report.press(HidKeyCode::KeyG);

        // Assert
        assert_eq!(result, Err(ReportError::CapacityExceeded { usage: 0x0A }));
        assert_eq!(report, before);
    }

    #[test]
    fn test_repressing_held_key_at_capacity_is_not_an_error() {
        let mut report = KeyboardReport::new();
        for key in SIX_KEYS {
            report.press(key).unwrap();
        }
        assert_eq!(report.press(HidKeyCode::KeyC), Ok(false));
    }

    #[test]
    fn test_release_frees_slot_for_reuse() {
        // Arrange
        let mut report = KeyboardReport::new();
        report.press(HidKeyCode::KeyA).unwrap();
        report.press(HidKeyCode::KeyB).unwrap();

        // Act
        assert!(report.release(HidKeyCode::KeyA));
        report.press(HidKeyCode::KeyC).unwrap();

        // Assert: KeyC took the slot KeyA left behind
        assert_eq!(report.slots(), [0x06, 0x05, 0, 0, 0, 0]);
    }

    #[test]
    fn test_release_of_unheld_key_is_a_no_op() {
        let mut report = KeyboardReport::new();
        assert!(!report.release(HidKeyCode::KeyA));
        assert_eq!(report, KeyboardReport::new());
    }

    #[test]
    fn test_modifiers_set_and_clear_bits() {
        // Arrange
        let mut report = KeyboardReport::new();

        // Act
        report.set_modifier(ModifierKey::LeftCtrl);
        report.set_modifier(ModifierKey::RightAlt);
        report.clear_modifier(ModifierKey::LeftCtrl);

        // Assert
        assert_eq!(report.modifiers(), 0x40);
        assert!(report.modifier_held(ModifierKey::RightAlt));
        assert!(!report.modifier_held(ModifierKey::LeftCtrl));
        assert_eq!(report.payload()[0], 0x40);
    }

    #[test]
    fn test_slots_never_hold_duplicates() {
        let mut report = KeyboardReport::new();
        for key in [HidKeyCode::KeyA, HidKeyCode::KeyB, HidKeyCode::KeyA, HidKeyCode::KeyB] {
            report.press(key).unwrap();
        }
        let held: Vec<u8> = report.slots().into_iter().filter(|&s| s != 0).collect();
        assert_eq!(held, vec![0x04, 0x05]);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut report = KeyboardReport::new();
        report.press(HidKeyCode::Enter).unwrap();
        report.set_modifier(ModifierKey::LeftShift);

        report.reset();

        assert_eq!(report.payload(), [0u8; KEYBOARD_PAYLOAD_LEN]);
    }
}
