//! Integration tests for the ch9329-core codec and report state.
//!
//! These tests drive the public API the way the host crate does: a report is
//! mutated, serialized and framed, and the chip's answer is fed back in
//! arbitrary chunks through `try_parse` on an accumulating buffer.

use ch9329_core::{
    protocol::{encode_frame, try_parse, CommandFrame, CommandId, ReplyFrame, ReplyStatus},
    report::{KeyboardReport, MouseButton, MouseReport, PositioningMode},
    HidKeyCode, KeyMapper, ModifierKey,
};

/// Feeds `stream` into a buffer `chunk` bytes at a time and returns the first
/// matching reply plus what is left in the buffer afterwards.
fn feed_in_chunks(stream: &[u8], chunk: usize, expected: u8) -> Option<(ReplyFrame, Vec<u8>)> {
    let mut buffer = Vec::new();
    for piece in stream.chunks(chunk) {
        buffer.extend_from_slice(piece);
        let outcome = try_parse(&buffer, expected);
        if let Some(frame) = outcome.frame {
            buffer.drain(..outcome.consumed);
            return Some((frame, buffer));
        }
    }
    None
}

#[test]
fn test_keyboard_press_produces_expected_wire_frame() {
    // Arrange
    let mut report = KeyboardReport::new();
    let key = KeyMapper::browser_to_hid(65).expect("A is mapped");

    // Act
    report.press(key).unwrap();
    let bytes = CommandFrame::new(CommandId::KeyboardReport, report.payload().to_vec())
        .unwrap()
        .encode();

    // Assert
    assert_eq!(
        bytes,
        [0x57, 0xAB, 0x00, 0x02, 0x08, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10]
    );
}

#[test]
fn test_keyboard_release_produces_all_zero_report() {
    let mut report = KeyboardReport::new();
    report.press(HidKeyCode::KeyA).unwrap();
    report.release(HidKeyCode::KeyA);

    let bytes = encode_frame(CommandId::KeyboardReport, &report.payload()).unwrap();

    assert_eq!(
        bytes,
        [0x57, 0xAB, 0x00, 0x02, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0C]
    );
}

#[test]
fn test_modifier_and_key_share_one_report() {
    // Arrange
    let mut report = KeyboardReport::new();

    // Act
    report.set_modifier(ModifierKey::LeftCtrl);
    report.press(HidKeyCode::KeyC).unwrap();

    // Assert
    assert_eq!(report.payload(), [0x01, 0x00, 0x06, 0x00, 0x00, 0x00, 0x00, 0x00]);
}

#[test]
fn test_reply_is_found_regardless_of_chunking() {
    // Arrange: noise, a reply for another command, then ours
    let mut stream = vec![0x00, 0x57, 0x13];
    stream.extend(encode_frame(0x84, &[0x00]).unwrap());
    stream.extend(encode_frame(0x82, &[0x00]).unwrap());
    stream.extend([0x57, 0xAB]);

    for chunk in 1..=stream.len() {
        // Act
        let (frame, rest) =
            feed_in_chunks(&stream, chunk, 0x02).expect("reply must be found");

        // Assert
        assert_eq!(frame.status, ReplyStatus::Success, "chunk size {chunk}");
        assert_eq!(frame.payload, vec![0x00]);
        assert!(rest.len() <= 2, "only the trailing partial header may remain");
    }
}

#[test]
fn test_error_reply_in_stream_carries_device_code() {
    let stream = encode_frame(0xC5, &[0xE5]).unwrap();

    let (frame, rest) = feed_in_chunks(&stream, 3, 0x05).unwrap();

    assert_eq!(frame.status, ReplyStatus::Error);
    assert_eq!(frame.error_code(), 0xE5);
    assert!(rest.is_empty());
}

#[test]
fn test_absolute_click_frame_resends_position_with_button() {
    // Arrange
    let mut report = MouseReport::new(PositioningMode::Absolute);
    report.set_position(100, 200).unwrap();

    // Act
    report.press_button(MouseButton::Left).unwrap();
    let bytes = encode_frame(CommandId::MouseAbsolute, &report.absolute_payload(0)).unwrap();

    // Assert
    assert_eq!(&bytes[..5], &[0x57, 0xAB, 0x00, 0x04, 0x07]);
    assert_eq!(&bytes[5..12], &[0x02, 0x01, 100, 0x00, 200, 0x00, 0x00]);
}
