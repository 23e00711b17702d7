//! Binary codec for CH9329 command and reply frames.
//!
//! Wire format (both directions):
//! ```text
//! [0x57][0xAB][0x00][code:1][len:1][payload:len][checksum:1]
//! ```
//! `checksum` is the sum of all preceding bytes modulo 256.
//!
//! Encoding is a pure function of `(command_id, payload)`.  Decoding works on
//! an *accumulating* byte buffer: serial links drop and corrupt bytes, so
//! [`try_parse`] scans for the first frame that has a correct header, a
//! correct checksum and the reply code the caller is waiting for.  Anything
//! else in front of that frame is noise and is skipped, never reported as an
//! error.

use thiserror::Error;
use tracing::trace;

use crate::protocol::frame::{
    CommandFrame, ReplyFrame, ReplyStatus, FRAME_HEADER, MIN_FRAME_SIZE, PREFIX_SIZE,
    REPLY_ERROR_MASK, REPLY_SUCCESS_MASK,
};

/// Errors that can occur while building or interpreting frames.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The payload does not fit in the one-byte length field.
    #[error("payload of {0} bytes exceeds the 255-byte frame limit")]
    PayloadTooLarge(usize),

    /// A reply arrived intact but its payload does not have the expected shape.
    #[error("malformed reply payload: {0}")]
    MalformedPayload(String),
}

// ── Encoding ──────────────────────────────────────────────────────────────────

/// Sum of `bytes` modulo 256.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, &b| sum.wrapping_add(b))
}

impl CommandFrame {
    /// Serializes the frame: header, command id, length, payload, checksum.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ch9329_core::protocol::{CommandFrame, CommandId};
    ///
    /// let frame = CommandFrame::new(CommandId::SoftReset, Vec::new()).unwrap();
    /// assert_eq!(frame.encode(), vec![0x57, 0xAB, 0x00, 0x0F, 0x00, 0x11]);
    /// ```
    pub fn encode(&self) -> Vec<u8> {
        let payload = self.payload();
        let mut buf = Vec::with_capacity(MIN_FRAME_SIZE + payload.len());
        buf.extend_from_slice(&FRAME_HEADER);
        buf.push(self.command_id());
        // `CommandFrame::new` guarantees the length fits in one byte.
        buf.push(payload.len() as u8);
        buf.extend_from_slice(payload);
        buf.push(checksum(&buf));
        buf
    }
}

/// Builds and serializes a frame in one step.
///
/// # Errors
///
/// Returns [`ProtocolError::PayloadTooLarge`] for payloads over 255 bytes.
pub fn encode_frame(command_id: impl Into<u8>, payload: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    Ok(CommandFrame::new(command_id, payload.to_vec())?.encode())
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// Result of one scan over the inbound buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    /// Bytes to drop from the front of the buffer: everything through the end
    /// of the matched frame, or `0` when no frame matched yet.
    pub consumed: usize,
    /// Leading bytes that were recognised as noise.  On a match this is the
    /// offset of the matched frame; otherwise it is the offset of the first
    /// byte that could still begin a frame once more data arrives.
    pub skipped: usize,
    /// The matched reply, if any.
    pub frame: Option<ReplyFrame>,
}

impl ParseOutcome {
    fn need_more(skipped: usize) -> Self {
        Self {
            consumed: 0,
            skipped,
            frame: None,
        }
    }

    /// `true` when the scan stopped without finding a matching frame.
    pub fn is_incomplete(&self) -> bool {
        self.frame.is_none()
    }
}

/// Scans `buffer` for the reply to command `expected`.
///
/// The scan looks for the first offset holding `57 AB 00`.  If the frame that
/// starts there is not fully buffered yet the scan stops and reports "need
/// more data".  A frame with a bad checksum is noise: the scan resumes one
/// byte later.  A checksum-valid frame whose code is neither
/// `expected | 0x80` (success) nor `expected | 0xC0` (error) belongs to some
/// other exchange and is skipped as a whole.
///
/// # Examples
///
/// ```rust
/// use ch9329_core::protocol::{try_parse, ReplyStatus};
///
/// // Two bytes of line noise, then the success reply to command 0x02.
/// let buffer = [0xFF, 0xFF, 0x57, 0xAB, 0x00, 0x82, 0x01, 0x00, 0x85];
/// let outcome = try_parse(&buffer, 0x02);
///
/// assert_eq!(outcome.skipped, 2);
/// assert_eq!(outcome.consumed, buffer.len());
/// assert_eq!(outcome.frame.unwrap().status, ReplyStatus::Success);
/// ```
pub fn try_parse(buffer: &[u8], expected: u8) -> ParseOutcome {
    let success_code = expected | REPLY_SUCCESS_MASK;
    let error_code = expected | REPLY_ERROR_MASK;

    let mut i = 0;
    while i + FRAME_HEADER.len() <= buffer.len() {
        if buffer[i..i + FRAME_HEADER.len()] != FRAME_HEADER {
            i += 1;
            continue;
        }

        if buffer.len() < i + PREFIX_SIZE {
            return ParseOutcome::need_more(i);
        }
        let code = buffer[i + 3];
        let len = buffer[i + 4] as usize;
        let checksum_at = i + PREFIX_SIZE + len;
        if buffer.len() <= checksum_at {
            return ParseOutcome::need_more(i);
        }

        if checksum(&buffer[i..checksum_at]) != buffer[checksum_at] {
            trace!(offset = i, "checksum mismatch, treating header as noise");
            i += 1;
            continue;
        }

        let status = if code == success_code {
            ReplyStatus::Success
        } else if code == error_code {
            ReplyStatus::Error
        } else {
            trace!(offset = i, code, expected, "skipping reply for another command");
            i = checksum_at + 1;
            continue;
        };

        return ParseOutcome {
            consumed: checksum_at + 1,
            skipped: i,
            frame: Some(ReplyFrame {
                status,
                command_echo: expected,
                payload: buffer[i + PREFIX_SIZE..checksum_at].to_vec(),
            }),
        };
    }

    ParseOutcome::need_more(partial_header_start(buffer, i))
}

/// First offset at or after `from` whose tail is a prefix of the header, i.e.
/// where a frame could still begin once more bytes arrive.
fn partial_header_start(buffer: &[u8], from: usize) -> usize {
    (from..buffer.len())
        .find(|&k| FRAME_HEADER.starts_with(&buffer[k..]))
        .unwrap_or(buffer.len())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::frame::{CommandId, MAX_PAYLOAD_LEN};

    /// Builds the wire bytes the chip would send as a reply.
    fn reply_bytes(code: u8, payload: &[u8]) -> Vec<u8> {
        encode_frame(code, payload).expect("reply payload fits")
    }

    // ── Encoding ──────────────────────────────────────────────────────────────

    #[test]
    fn test_checksum_wraps_modulo_256() {
        assert_eq!(checksum(&[]), 0);
        assert_eq!(checksum(&[0xFF, 0x02]), 0x01);
        assert_eq!(checksum(&[0x57, 0xAB, 0x00, 0x0F, 0x00]), 0x11);
    }

    #[test]
    fn test_encode_keyboard_report_for_letter_a() {
        // Arrange
        let payload = [0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00];

        // Act
        let bytes = encode_frame(CommandId::KeyboardReport, &payload).unwrap();

        // Assert
        assert_eq!(
            bytes,
            vec![0x57, 0xAB, 0x00, 0x02, 0x08, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10]
        );
    }

    #[test]
    fn test_encode_rejects_oversized_payload() {
        let result = encode_frame(0x06, &[0u8; 300]);
        assert_eq!(result, Err(ProtocolError::PayloadTooLarge(300)));
    }

    #[test]
    fn test_encoded_length_is_payload_plus_six() {
        let bytes = encode_frame(0x06, &[1, 2, 3]).unwrap();
        assert_eq!(bytes.len(), 3 + 6);
        assert_eq!(bytes[4], 3);
    }

    // ── Decoding ──────────────────────────────────────────────────────────────

    #[test]
    fn test_round_trip_recovers_payload_for_every_length() {
        for len in 0..=MAX_PAYLOAD_LEN {
            // Arrange: payload bytes below 0x57 can never form a header.
            let payload: Vec<u8> = (0..len).map(|n| (n % 0x50) as u8).collect();
            let bytes = reply_bytes(0x02 | REPLY_SUCCESS_MASK, &payload);

            // Act
            let outcome = try_parse(&bytes, 0x02);

            // Assert
            let frame = outcome.frame.expect("frame must parse");
            assert_eq!(frame.payload, payload, "payload mismatch at len {len}");
            assert_eq!(frame.command_echo, 0x02);
            assert_eq!(outcome.consumed, bytes.len());
            assert_eq!(outcome.skipped, 0);
        }
    }

    #[test]
    fn test_success_reply_is_recognised() {
        let bytes = reply_bytes(0x82, &[0x00]);
        assert_eq!(bytes, vec![0x57, 0xAB, 0x00, 0x82, 0x01, 0x00, 0x85]);

        let frame = try_parse(&bytes, 0x02).frame.unwrap();
        assert_eq!(frame.status, ReplyStatus::Success);
        assert_eq!(frame.payload, vec![0x00]);
    }

    #[test]
    fn test_error_reply_is_recognised_with_device_code() {
        // Arrange
        let bytes = reply_bytes(0xC4, &[0xE5]);

        // Act
        let frame = try_parse(&bytes, 0x04).frame.unwrap();

        // Assert
        assert_eq!(frame.status, ReplyStatus::Error);
        assert_eq!(frame.error_code(), 0xE5);
    }

    #[test]
    fn test_error_reply_with_empty_payload_reports_ff() {
        let bytes = reply_bytes(0xC2, &[]);
        let frame = try_parse(&bytes, 0x02).frame.unwrap();
        assert_eq!(frame.error_code(), 0xFF);
    }

    #[test]
    fn test_leading_noise_is_skipped_not_reported() {
        // Arrange
        let mut buffer = vec![0xFF, 0xFF];
        buffer.extend(reply_bytes(0x82, &[0x00]));

        // Act
        let outcome = try_parse(&buffer, 0x02);

        // Assert
        assert_eq!(outcome.skipped, 2);
        assert_eq!(outcome.consumed, buffer.len());
        assert!(outcome.frame.is_some());
    }

    #[test]
    fn test_partial_frame_reports_need_more_data() {
        // Arrange: drop the checksum byte
        let full = reply_bytes(0x82, &[0x00]);
        let partial = &full[..full.len() - 1];

        // Act
        let outcome = try_parse(partial, 0x02);

        // Assert
        assert_eq!(outcome.consumed, 0);
        assert!(outcome.is_incomplete());
    }

    #[test]
    fn test_header_without_length_byte_needs_more_data() {
        let outcome = try_parse(&[0x00, 0x57, 0xAB, 0x00, 0x82], 0x02);
        assert_eq!(outcome.consumed, 0);
        assert_eq!(outcome.skipped, 1);
        assert!(outcome.frame.is_none());
    }

    #[test]
    fn test_empty_buffer_needs_more_data() {
        let outcome = try_parse(&[], 0x02);
        assert_eq!(outcome, ParseOutcome::need_more(0));
    }

    #[test]
    fn test_trailing_partial_header_is_not_counted_as_noise() {
        let outcome = try_parse(&[0x11, 0x22, 0x57, 0xAB], 0x02);
        assert_eq!(outcome.skipped, 2);
        assert!(outcome.frame.is_none());
    }

    #[test]
    fn test_flipping_any_single_byte_turns_frame_into_noise() {
        let original = reply_bytes(0x82, &[0x00, 0x11, 0x22]);
        for index in 0..original.len() {
            // Arrange
            let mut corrupted = original.clone();
            corrupted[index] ^= 0xFF;

            // Act
            let outcome = try_parse(&corrupted, 0x02);

            // Assert
            assert!(
                outcome.frame.is_none(),
                "flipping byte {index} must not yield a frame"
            );
            assert_eq!(outcome.consumed, 0);
        }
    }

    #[test]
    fn test_bad_checksum_frame_is_skipped_and_next_frame_wins() {
        // Arrange
        let mut bad = reply_bytes(0x82, &[0x01]);
        let last = bad.len() - 1;
        bad[last] = bad[last].wrapping_add(1);
        let good = reply_bytes(0x82, &[0x00]);
        let mut buffer = bad.clone();
        buffer.extend_from_slice(&good);

        // Act
        let outcome = try_parse(&buffer, 0x02);

        // Assert
        assert_eq!(outcome.skipped, bad.len());
        assert_eq!(outcome.consumed, buffer.len());
        assert_eq!(outcome.frame.unwrap().payload, vec![0x00]);
    }

    #[test]
    fn test_noise_header_with_long_length_holds_back_the_reply_behind_it() {
        // Arrange: `57 AB 00 82 FF` claims a 255-byte payload
        let noise = [0x57, 0xAB, 0x00, 0x82, 0xFF];
        let good = reply_bytes(0x82, &[0x00]);
        let mut buffer = noise.to_vec();
        buffer.extend_from_slice(&good);

        // Act
        let waiting = try_parse(&buffer, 0x02);
        buffer.resize(PREFIX_SIZE + MAX_PAYLOAD_LEN, 0x00);
        let bad_checksum = checksum(&buffer).wrapping_add(1);
        buffer.push(bad_checksum);
        let resolved = try_parse(&buffer, 0x02);

        // Assert: the candidate is kept until its checksum byte arrives,
        // then rejected, and the reply behind it is found
        assert!(waiting.is_incomplete());
        assert_eq!(waiting.consumed, 0);
        assert_eq!(waiting.skipped, 0);
        assert_eq!(resolved.skipped, noise.len());
        assert_eq!(resolved.consumed, noise.len() + good.len());
        assert_eq!(resolved.frame.unwrap().payload, vec![0x00]);
    }

    #[test]
    fn test_reply_for_other_command_is_skipped_whole() {
        // Arrange: a valid mouse reply sits in front of the keyboard reply
        let other = reply_bytes(0x84, &[0x00]);
        let wanted = reply_bytes(0xC2, &[0xE4]);
        let mut buffer = other.clone();
        buffer.extend_from_slice(&wanted);

        // Act
        let outcome = try_parse(&buffer, 0x02);

        // Assert
        assert_eq!(outcome.skipped, other.len());
        let frame = outcome.frame.unwrap();
        assert_eq!(frame.status, ReplyStatus::Error);
        assert_eq!(frame.error_code(), 0xE4);
    }

    #[test]
    fn test_only_other_replies_present_needs_more_data() {
        let buffer = reply_bytes(0x84, &[0x00]);
        let outcome = try_parse(&buffer, 0x02);
        assert!(outcome.frame.is_none());
        assert_eq!(outcome.consumed, 0);
        assert_eq!(outcome.skipped, buffer.len());
    }

    #[test]
    fn test_trailing_bytes_after_frame_are_left_in_buffer() {
        let mut buffer = reply_bytes(0x8F, &[0x00]);
        let frame_len = buffer.len();
        buffer.extend_from_slice(&[0x57, 0xAB]);

        let outcome = try_parse(&buffer, 0x0F);
        assert_eq!(outcome.consumed, frame_len);
    }
}
