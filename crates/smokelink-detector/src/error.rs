//! Detector error types.

use thiserror::Error;

/// Errors surfaced to the host loop.
///
/// Protocol faults are handled inside the detector (NAK, drop, resync) and
/// never appear here.
#[derive(Debug, Error)]
pub enum DetectorError {
    /// Reading from or writing to the transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Configuration rejected by [`crate::DetectorConfig::validate`].
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for detector operations.
pub type DetectorResult<T> = Result<T, DetectorError>;
