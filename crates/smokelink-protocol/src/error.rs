//! Protocol error types.

use thiserror::Error;

/// Faults detected while exchanging frames with the base station.
///
/// None of these are fatal. Inbound faults are answered with NAK and the frame
/// is discarded; [`ProtocolError::RetryExhausted`] drops the pending outbound
/// frame and the link resynchronizes on the next start marker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Hex text with an odd number of characters.
    #[error("odd hex length: {len} characters")]
    OddLength {
        /// Number of hex characters received.
        len: usize,
    },

    /// A character outside `0-9A-Fa-f` inside a frame.
    #[error("invalid hex digit in frame")]
    InvalidHex,

    /// Frame is too short to hold a command and a checksum.
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Expected minimum length.
        expected: usize,
        /// Actual length received.
        actual: usize,
    },

    /// Frame exceeded the receive buffer.
    #[error("frame too long: maximum {max} hex characters")]
    FrameTooLong {
        /// Maximum allowed length.
        max: usize,
    },

    /// Trailing checksum byte disagrees with the computed one.
    #[error("checksum mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    ChecksumMismatch {
        /// Checksum computed over the received hex text.
        expected: u8,
        /// Checksum byte carried by the frame.
        actual: u8,
    },

    /// Command byte not in the dispatch table.
    #[error("unknown command code: 0x{0:02X}")]
    UnknownCommand(u8),

    /// No ACK after the configured number of attempts.
    #[error("no ACK after {attempts} attempts, frame dropped")]
    RetryExhausted {
        /// Number of transmissions made.
        attempts: u8,
    },
}

impl ProtocolError {
    /// Short machine-friendly name, used as a metric label.
    pub fn reason(&self) -> &'static str {
        match self {
            ProtocolError::OddLength { .. } => "odd_length",
            ProtocolError::InvalidHex => "invalid_hex",
            ProtocolError::FrameTooShort { .. } => "too_short",
            ProtocolError::FrameTooLong { .. } => "too_long",
            ProtocolError::ChecksumMismatch { .. } => "checksum",
            ProtocolError::UnknownCommand(_) => "unknown_command",
            ProtocolError::RetryExhausted { .. } => "retry_exhausted",
        }
    }

    /// Whether this is a framing fault (bad shape rather than bad content).
    pub fn is_framing(&self) -> bool {
        matches!(
            self,
            ProtocolError::OddLength { .. }
                | ProtocolError::InvalidHex
                | ProtocolError::FrameTooShort { .. }
                | ProtocolError::FrameTooLong { .. }
        )
    }
}

/// Result type alias for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
