//! Hex codec and checksum.
//!
//! Frame bytes travel as uppercase hex text. The checksum appended to a frame
//! is the low byte of the sum of the *ASCII codes of that hex text*, not of
//! the binary values it encodes. The base station computes it the same way,
//! so this must not be "corrected".
//!
//! ```text
//! payload  C4 0F AB 1A 90
//! text     "C40FAB1A90"
//! checksum sum(b'C', b'4', b'0', ...) & 0xFF
//! on wire  NUL STX "C40FAB1A90" <2 hex chars of checksum> ETX
//! ```

use bytes::BufMut;

use crate::constants::{ETX, NUL, STX};
use crate::error::{ProtocolError, ProtocolResult};

/// Render bytes as uppercase hex, two characters per byte.
pub fn hex_encode(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// Parse hex text back into bytes. Accepts either case.
pub fn hex_decode(text: &[u8]) -> ProtocolResult<Vec<u8>> {
    hex::decode(text).map_err(|err| match err {
        hex::FromHexError::OddLength => ProtocolError::OddLength { len: text.len() },
        _ => ProtocolError::InvalidHex,
    })
}

/// Additive checksum: sum of all byte values modulo 256.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Encode a payload as frame text: hex of the payload followed by the hex of
/// the checksum over that text.
pub fn encode_frame_text(payload: &[u8]) -> String {
    let mut text = hex_encode(payload);
    let sum = checksum(text.as_bytes());
    text.push_str(&hex_encode(&[sum]));
    text
}

/// Wrap frame text in the outbound control markers: `NUL STX text ETX`.
pub fn wrap_frame(text: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(text.len() + 3);
    buf.put_u8(NUL);
    buf.put_u8(STX);
    buf.put_slice(text);
    buf.put_u8(ETX);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_encode_uppercase() {
        assert_eq!(hex_encode(&[0xC4, 0x0F, 0xAB]), "C40FAB");
        assert_eq!(hex_encode(&[]), "");
    }

    #[test]
    fn test_hex_decode_inverse() {
        let bytes: Vec<u8> = (0..=15).map(|i| i * 17).collect();
        let text = hex_encode(&bytes);
        assert_eq!(text.len(), bytes.len() * 2);
        assert_eq!(hex_decode(text.as_bytes()).unwrap(), bytes);
        assert_eq!(hex_decode(b"c40fab").unwrap(), vec![0xC4, 0x0F, 0xAB]);
    }

    #[test]
    fn test_hex_decode_rejects_odd_length() {
        assert_eq!(
            hex_decode(b"C40"),
            Err(ProtocolError::OddLength { len: 3 })
        );
    }

    #[test]
    fn test_hex_decode_rejects_garbage() {
        assert_eq!(hex_decode(b"C4ZZ"), Err(ProtocolError::InvalidHex));
    }

    #[test]
    fn test_checksum_wraps() {
        assert_eq!(checksum(&[]), 0);
        assert_eq!(checksum(&[0xFF, 0x02]), 0x01);
        assert_eq!(checksum(&[0x10, 0x20, 0x30]), 0x60);
    }

    #[test]
    fn test_checksum_is_over_ascii_text() {
        // "82" = 0x38 + 0x32 = 0x6A, not 0x82
        let text = encode_frame_text(&[0x82]);
        assert_eq!(text, "826A");

        let text = encode_frame_text(&[0x82, 0x00, 0x00, 0x00, 0x00]);
        // '8' + '2' + 8 * '0' = 0x38 + 0x32 + 8 * 0x30 = 0x1EA
        assert_eq!(text, "8200000000EA");
    }

    #[test]
    fn test_wrap_frame() {
        let wire = wrap_frame(b"826A");
        assert_eq!(wire, vec![NUL, STX, b'8', b'2', b'6', b'A', ETX]);
    }
}
