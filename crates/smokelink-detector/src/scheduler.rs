//! Single-slot transmit scheduler.
//!
//! At most one outbound frame is pending. The attempt counter drives it:
//!
//! | counter            | meaning                                     |
//! |--------------------|---------------------------------------------|
//! | 0                  | idle                                        |
//! | 1                  | queued, first send on the next poll         |
//! | 2 ..= max_tries    | sent `counter - 1` times, awaiting ACK      |
//! | max_tries + 1      | sent `max_tries` times; dropped on timeout  |
//!
//! Queueing a new frame replaces whatever was pending.

use std::time::Duration;

use smokelink_protocol::{Frame, ProtocolError};

/// What the scheduler wants done on this poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxAction {
    /// Nothing to send.
    Idle,
    /// Write these bytes to the transport.
    Send {
        /// Complete wire bytes, markers included.
        wire: Vec<u8>,
        /// 1 for the first transmission, 2 for the first retry, ...
        attempt: u8,
    },
    /// The pending frame was dropped after the retry ceiling.
    Abandoned(ProtocolError),
}

/// Owns the pending outbound frame and its retry state.
#[derive(Debug)]
pub struct TransmitScheduler {
    pending: Option<Vec<u8>>,
    counter: u8,
    first_send: Duration,
    last_send: Duration,
    fast_retry: bool,
    max_tries: u8,
    ack_timeout: Duration,
}

impl TransmitScheduler {
    /// Create an idle scheduler.
    pub fn new(max_tries: u8, ack_timeout: Duration) -> Self {
        TransmitScheduler {
            pending: None,
            counter: 0,
            first_send: Duration::ZERO,
            last_send: Duration::ZERO,
            fast_retry: false,
            max_tries,
            ack_timeout,
        }
    }

    /// No frame pending.
    pub fn is_idle(&self) -> bool {
        self.counter == 0
    }

    /// Raw attempt counter.
    pub fn counter(&self) -> u8 {
        self.counter
    }

    /// Wire bytes of the pending frame.
    pub fn pending(&self) -> Option<&[u8]> {
        self.pending.as_deref()
    }

    /// Queue a frame, replacing any pending one.
    pub fn enqueue(&mut self, frame: &Frame) {
        if !self.is_idle() {
            tracing::debug!(
                "replacing pending frame after {} attempt(s)",
                self.counter.saturating_sub(1)
            );
        }
        self.pending = Some(frame.to_wire());
        self.counter = 1;
        self.fast_retry = false;
    }

    /// Decide whether to (re)send or drop the pending frame.
    pub fn poll(&mut self, now: Duration) -> TxAction {
        if self.counter == 0 {
            return TxAction::Idle;
        }

        let timed_out = self.fast_retry || now.saturating_sub(self.last_send) >= self.ack_timeout;
        let due = self.counter == 1 || (self.counter <= self.max_tries.saturating_add(1) && timed_out);
        if !due {
            return TxAction::Idle;
        }

        if self.counter > self.max_tries {
            let attempts = self.counter - 1;
            self.clear();
            return TxAction::Abandoned(ProtocolError::RetryExhausted { attempts });
        }

        let Some(wire) = self.pending.clone() else {
            self.clear();
            return TxAction::Idle;
        };
        if self.counter == 1 {
            self.first_send = now;
        }
        let attempt = self.counter;
        self.counter += 1;
        self.last_send = now;
        self.fast_retry = false;
        TxAction::Send { wire, attempt }
    }

    /// Peer ACK: retire the pending frame, sent or not. Returns the time since
    /// its first transmission, or `None` if it was never sent.
    pub fn acknowledge(&mut self, now: Duration) -> Option<Duration> {
        let sent = self.counter >= 2;
        if self.counter > 0 {
            self.clear();
        }
        sent.then(|| now.saturating_sub(self.first_send))
    }

    /// Peer NAK: make the pending frame due on the next poll.
    pub fn reject(&mut self) {
        if self.counter >= 2 {
            self.fast_retry = true;
        }
    }

    fn clear(&mut self) {
        self.pending = None;
        self.counter = 0;
        self.fast_retry = false;
    }
}
