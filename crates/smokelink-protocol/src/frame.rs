//! Frame type.
//!
//! A frame is `[command, data..., checksum]` once decoded from hex. The
//! checksum is validated and stripped on the way in and computed on the way
//! out, so a [`Frame`] value only ever holds the command and its data.

use crate::codec::{checksum, encode_frame_text, hex_decode, wrap_frame};
use crate::constants::MIN_DECODED_FRAME_LEN;
use crate::error::{ProtocolError, ProtocolResult};

/// A decoded protocol frame without its checksum byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command or response code.
    pub command: u8,
    /// Bytes following the command.
    pub data: Vec<u8>,
}

impl Frame {
    /// Create a frame from a command code and its data bytes.
    pub fn new(command: u8, data: impl Into<Vec<u8>>) -> Self {
        Frame {
            command,
            data: data.into(),
        }
    }

    /// Parse the hex text received between STX and ETX.
    ///
    /// The checksum is computed over the text minus its trailing two
    /// characters and compared against the last decoded byte.
    pub fn from_text(text: &[u8]) -> ProtocolResult<Frame> {
        if text.len() % 2 != 0 {
            return Err(ProtocolError::OddLength { len: text.len() });
        }

        let mut bytes = hex_decode(text)?;
        if bytes.len() < MIN_DECODED_FRAME_LEN {
            return Err(ProtocolError::FrameTooShort {
                expected: MIN_DECODED_FRAME_LEN,
                actual: bytes.len(),
            });
        }

        let expected = checksum(&text[..text.len() - 2]);
        let actual = bytes.pop().unwrap_or_default();
        if expected != actual {
            log::debug!(
                "checksum mismatch on {:?}: expected {:02X}, got {:02X}",
                String::from_utf8_lossy(text),
                expected,
                actual
            );
            return Err(ProtocolError::ChecksumMismatch { expected, actual });
        }

        let command = bytes.remove(0);
        Ok(Frame {
            command,
            data: bytes,
        })
    }

    /// The command byte followed by the data bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + self.data.len());
        bytes.push(self.command);
        bytes.extend_from_slice(&self.data);
        bytes
    }

    /// Hex text including the trailing checksum characters.
    pub fn to_text(&self) -> String {
        encode_frame_text(&self.to_bytes())
    }

    /// Complete outbound wire bytes, `NUL STX text ETX`.
    pub fn to_wire(&self) -> Vec<u8> {
        wrap_frame(self.to_text().as_bytes())
    }

    /// Byte at `index` of the decoded frame (index 0 is the command).
    pub fn byte(&self, index: usize) -> ProtocolResult<u8> {
        match index {
            0 => Ok(self.command),
            i => self
                .data
                .get(i - 1)
                .copied()
                .ok_or(ProtocolError::FrameTooShort {
                    expected: i + 1,
                    actual: 1 + self.data.len(),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{ETX, NUL, STX};

    #[test]
    fn test_frame_text_roundtrip() {
        let frame = Frame::new(0x03, vec![0x00, 0x10]);
        let text = frame.to_text();
        assert_eq!(text.len(), 8);
        assert_eq!(Frame::from_text(text.as_bytes()).unwrap(), frame);
    }

    #[test]
    fn test_from_text_known_request() {
        // "02" sums to 0x30 + 0x32 = 0x62
        let frame = Frame::from_text(b"0262").unwrap();
        assert_eq!(frame.command, 0x02);
        assert!(frame.data.is_empty());
    }

    #[test]
    fn test_from_text_rejects_odd_length() {
        assert_eq!(
            Frame::from_text(b"02620"),
            Err(ProtocolError::OddLength { len: 5 })
        );
    }

    #[test]
    fn test_from_text_rejects_bad_checksum() {
        assert_eq!(
            Frame::from_text(b"0263"),
            Err(ProtocolError::ChecksumMismatch {
                expected: 0x62,
                actual: 0x63
            })
        );
    }

    #[test]
    fn test_from_text_rejects_short_frames() {
        assert_eq!(
            Frame::from_text(b""),
            Err(ProtocolError::FrameTooShort {
                expected: 2,
                actual: 0
            })
        );
        assert_eq!(
            Frame::from_text(b"00"),
            Err(ProtocolError::FrameTooShort {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_to_wire_markers() {
        let wire = Frame::new(0x82, vec![]).to_wire();
        assert_eq!(wire.first(), Some(&NUL));
        assert_eq!(wire.get(1), Some(&STX));
        assert_eq!(wire.last(), Some(&ETX));
        assert_eq!(&wire[2..wire.len() - 1], b"826A");
    }

    #[test]
    fn test_byte_access() {
        let frame = Frame::new(0x03, vec![0x00, 0x91]);
        assert_eq!(frame.byte(0), Ok(0x03));
        assert_eq!(frame.byte(2), Ok(0x91));
        assert!(matches!(
            frame.byte(3),
            Err(ProtocolError::FrameTooShort { expected: 4, actual: 3 })
        ));
    }
}
