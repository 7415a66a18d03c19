//! Byte-at-a-time frame receiver.
//!
//! Control bytes are recognised in any state. Everything else is only
//! accumulated between STX and ETX:
//!
//! ```text
//!            STX (clears buffer)
//!   Idle ─────────────────────────▶ InFrame ──┐ data byte: append
//!    ▲                                 │  ▲   │
//!    └──── ETX: validate & emit ───────┘  └───┘
//!    └──── overflow: abort & emit ─────┘
//! ```

use bytes::BytesMut;

use crate::constants::{ACK, ETX, MAX_ENCODED_FRAME_LEN, NAK, NUL, STX};
use crate::error::ProtocolError;
use crate::frame::Frame;

/// Receiver state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxState {
    /// Waiting for a start marker; data bytes are dropped.
    Idle,
    /// Accumulating hex text until the end marker.
    InFrame,
}

/// Something the receiver recognised in the byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RxEvent {
    /// Peer acknowledged our last frame.
    Ack,
    /// Peer rejected our last frame.
    Nak,
    /// A complete frame with a valid checksum.
    Frame(Frame),
    /// A complete or aborted frame that failed validation. Answer with NAK.
    Rejected(ProtocolError),
}

/// Accumulates bytes between control markers into frames.
#[derive(Debug)]
pub struct FrameReceiver {
    state: RxState,
    buffer: BytesMut,
    max_len: usize,
}

impl Default for FrameReceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameReceiver {
    /// Create a receiver with the protocol's maximum frame length.
    pub fn new() -> Self {
        Self::with_capacity(MAX_ENCODED_FRAME_LEN)
    }

    /// Create a receiver accepting at most `max_len` hex characters per frame.
    pub fn with_capacity(max_len: usize) -> Self {
        FrameReceiver {
            state: RxState::Idle,
            buffer: BytesMut::with_capacity(max_len),
            max_len,
        }
    }

    /// Current state.
    pub fn state(&self) -> RxState {
        self.state
    }

    /// Number of hex characters accumulated for the current frame.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Drop any partial frame and return to idle.
    pub fn reset(&mut self) {
        self.state = RxState::Idle;
        self.buffer.clear();
    }

    /// Consume one byte.
    pub fn push(&mut self, byte: u8) -> Option<RxEvent> {
        match byte {
            NUL => None,
            ACK => Some(RxEvent::Ack),
            NAK => Some(RxEvent::Nak),
            STX => {
                if self.state == RxState::InFrame && !self.buffer.is_empty() {
                    log::trace!("resync: discarding {} buffered characters", self.buffer.len());
                }
                self.state = RxState::InFrame;
                self.buffer.clear();
                None
            }
            ETX if self.state == RxState::InFrame => {
                self.state = RxState::Idle;
                let text = self.buffer.split();
                Some(match Frame::from_text(&text) {
                    Ok(frame) => RxEvent::Frame(frame),
                    Err(err) => RxEvent::Rejected(err),
                })
            }
            _ if self.state == RxState::InFrame => {
                if self.buffer.len() < self.max_len {
                    self.buffer.extend_from_slice(&[byte]);
                    None
                } else {
                    self.reset();
                    Some(RxEvent::Rejected(ProtocolError::FrameTooLong {
                        max: self.max_len,
                    }))
                }
            }
            // Stray data or ETX outside a frame.
            _ => None,
        }
    }

    /// Consume a run of bytes, collecting every event in order.
    pub fn feed(&mut self, data: &[u8]) -> Vec<RxEvent> {
        data.iter().filter_map(|&b| self.push(b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framed(text: &[u8]) -> Vec<u8> {
        let mut v = vec![STX];
        v.extend_from_slice(text);
        v.push(ETX);
        v
    }

    #[test]
    fn test_receives_valid_frame() {
        let mut rx = FrameReceiver::new();
        let events = rx.feed(&framed(b"0262"));
        assert_eq!(events, vec![RxEvent::Frame(Frame::new(0x02, vec![]))]);
        assert_eq!(rx.state(), RxState::Idle);
    }

    #[test]
    fn test_control_bytes_in_any_state() {
        let mut rx = FrameReceiver::new();
        assert_eq!(rx.push(ACK), Some(RxEvent::Ack));
        assert_eq!(rx.push(NUL), None);

        rx.push(STX);
        rx.push(b'0');
        assert_eq!(rx.push(NAK), Some(RxEvent::Nak));
        assert_eq!(rx.state(), RxState::InFrame);
        assert_eq!(rx.buffered_len(), 1);
    }

    #[test]
    fn test_idle_drops_data() {
        let mut rx = FrameReceiver::new();
        assert!(rx.feed(b"0262").is_empty());
        assert_eq!(rx.push(ETX), None);
        assert_eq!(rx.buffered_len(), 0);
    }

    #[test]
    fn test_odd_length_rejected() {
        let mut rx = FrameReceiver::new();
        let events = rx.feed(&framed(b"026"));
        assert_eq!(
            events,
            vec![RxEvent::Rejected(ProtocolError::OddLength { len: 3 })]
        );
    }

    #[test]
    fn test_bad_checksum_rejected() {
        let mut rx = FrameReceiver::new();
        let events = rx.feed(&framed(b"0200"));
        assert!(matches!(
            events.as_slice(),
            [RxEvent::Rejected(ProtocolError::ChecksumMismatch { .. })]
        ));
    }

    #[test]
    fn test_start_marker_resynchronizes() {
        let mut rx = FrameReceiver::new();
        let mut data = vec![STX, b'F', b'F', b'F'];
        data.extend(framed(b"0262"));
        let events = rx.feed(&data);
        assert_eq!(events, vec![RxEvent::Frame(Frame::new(0x02, vec![]))]);
    }

    #[test]
    fn test_overflow_aborts_frame() {
        let mut rx = FrameReceiver::with_capacity(4);
        rx.push(STX);
        assert!(rx.feed(b"0000").is_empty());
        assert_eq!(
            rx.push(b'0'),
            Some(RxEvent::Rejected(ProtocolError::FrameTooLong { max: 4 }))
        );
        assert_eq!(rx.state(), RxState::Idle);

        // The rest of the oversized frame is ignored, including its ETX.
        assert!(rx.feed(b"00").is_empty());
        assert_eq!(rx.push(ETX), None);

        assert_eq!(
            rx.feed(&framed(b"0262")),
            vec![RxEvent::Frame(Frame::new(0x02, vec![]))]
        );
    }
}
