//! Runner library for the `smokelink` binary.
//!
//! Loads the runner configuration, connects a detector to a TCP client or a
//! serial port, and drives it from a wall-clock poll loop.

pub mod config;
pub mod host;
pub mod link;

pub use config::{ConfigError, RunnerConfig, TransportConfig};
pub use host::{LoopStats, PollLoop};
pub use link::{spawn_tcp_bridge, ChannelPeer, ChannelTransport, SerialTransport};
