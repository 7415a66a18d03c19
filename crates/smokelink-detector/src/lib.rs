//! Smoke detector endpoint for the smokelink protocol.
//!
//! [`Detector`] ties together the frame receiver, the command processor and
//! the single-slot transmit scheduler over any [`Transport`]. The host drives
//! it by calling [`Detector::tick`] with a monotonic timestamp; all protocol
//! faults are resolved on the wire with ACK/NAK and retransmission.
//!
//! ```rust
//! use std::time::Duration;
//! use smokelink_detector::{Detector, DetectorConfig, MemoryTransport};
//!
//! let mut detector = Detector::new(DetectorConfig::default(), MemoryTransport::new()).unwrap();
//! detector.set_on_alarm(|active| println!("alarm: {active}"));
//! detector.update_local_status(|s| s.alarm_local = true);
//! detector.tick(Duration::ZERO).unwrap();
//! detector.tick(Duration::from_millis(1)).unwrap();
//! assert!(!detector.transport().outbound().is_empty());
//! ```

mod config;
mod detector;
mod error;
mod notify;
mod processor;
mod scheduler;
mod transport;

pub use config::DetectorConfig;
pub use detector::Detector;
pub use error::{DetectorError, DetectorResult};
pub use notify::{Handler, NotificationKind, Notifications};
pub use processor::CommandProcessor;
pub use scheduler::{TransmitScheduler, TxAction};
pub use transport::{MemoryTransport, Transport};
