//! Smoke Detector RF Link Protocol
//!
//! Types and utilities for the serial protocol between a wired smoke detector
//! and the RF base station it is plugged into. The link is half-duplex and
//! carries hex-encoded frames bounded by control bytes.
//!
//! # Protocol Overview
//!
//! ```text
//! outbound:  NUL STX <hex frame> ETX
//! inbound:   STX <hex frame> ETX | ACK | NAK | NUL
//! frame:     [command, data..., checksum]
//! ```
//!
//! - **Commands** (base station → detector): codes `0x02..=0x0F`
//! - **Responses** (detector → base station): lead byte `0x80 | code`,
//!   plus `0x40` when answering a request
//! - Every frame is acknowledged with a single ACK or NAK byte
//!
//! # Example
//!
//! ```rust
//! use smokelink_protocol::{Command, FrameReceiver, RxEvent, ETX, STX};
//!
//! let mut rx = FrameReceiver::new();
//! let mut bytes = vec![STX];
//! bytes.extend_from_slice(b"0262");
//! bytes.push(ETX);
//!
//! let events = rx.feed(&bytes);
//! let RxEvent::Frame(frame) = &events[0] else { panic!() };
//! assert_eq!(Command::decode(frame).unwrap(), Command::RequestStatus);
//! ```

mod codec;
mod commands;
mod constants;
mod error;
mod frame;
mod receiver;
mod responses;
mod types;

pub use codec::*;
pub use commands::*;
pub use constants::*;
pub use error::*;
pub use frame::*;
pub use receiver::*;
pub use responses::*;
pub use types::*;
