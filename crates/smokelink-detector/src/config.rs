//! Detector configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use smokelink_protocol::{
    LocalStatus, DEFAULT_ACK_TIMEOUT_MS, DEFAULT_MAX_TX_TRIES, DEFAULT_SERIAL_NUMBER,
    DEFAULT_UPTIME_UNIT_MS,
};

use crate::error::{DetectorError, DetectorResult};

/// Configuration for one emulated detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Detector name, used in logs and metric labels.
    pub name: String,
    /// Time to wait for an ACK before retransmitting (milliseconds).
    pub ack_timeout_ms: u64,
    /// Transmission attempts before a frame is dropped.
    pub max_tx_tries: u8,
    /// Interval for unsolicited status pushes (seconds). 0 disables them.
    pub status_interval_secs: u64,
    /// Length of one uptime tick (milliseconds).
    pub uptime_unit_ms: u64,
    /// Serial number reported to the base station.
    pub serial_number: [u8; 4],
    /// Local status flags at startup.
    pub initial_status: LocalStatus,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            name: "detector".to_string(),
            ack_timeout_ms: DEFAULT_ACK_TIMEOUT_MS,
            max_tx_tries: DEFAULT_MAX_TX_TRIES,
            status_interval_secs: 0,
            uptime_unit_ms: DEFAULT_UPTIME_UNIT_MS,
            serial_number: DEFAULT_SERIAL_NUMBER,
            initial_status: LocalStatus::default(),
        }
    }
}

impl DetectorConfig {
    /// Check values the detector cannot run with.
    pub fn validate(&self) -> DetectorResult<()> {
        if self.max_tx_tries == 0 {
            return Err(DetectorError::InvalidConfig(
                "max_tx_tries must be at least 1".to_string(),
            ));
        }
        if self.max_tx_tries == u8::MAX {
            return Err(DetectorError::InvalidConfig(format!(
                "max_tx_tries must be below {}",
                u8::MAX
            )));
        }
        if self.ack_timeout_ms == 0 {
            return Err(DetectorError::InvalidConfig(
                "ack_timeout_ms must be positive".to_string(),
            ));
        }
        if self.uptime_unit_ms == 0 {
            return Err(DetectorError::InvalidConfig(
                "uptime_unit_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// ACK timeout as a duration.
    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.ack_timeout_ms)
    }

    /// Auto-status interval, or `None` when disabled.
    pub fn status_interval(&self) -> Option<Duration> {
        (self.status_interval_secs > 0).then(|| Duration::from_secs(self.status_interval_secs))
    }

    /// Uptime tick length as a duration.
    pub fn uptime_unit(&self) -> Duration {
        Duration::from_millis(self.uptime_unit_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DetectorConfig::default();
        assert_eq!(config.ack_timeout(), Duration::from_secs(2));
        assert_eq!(config.max_tx_tries, 3);
        assert_eq!(config.status_interval(), None);
        assert_eq!(config.uptime_unit(), Duration::from_millis(250));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_tries() {
        let config = DetectorConfig {
            max_tx_tries: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(DetectorError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = DetectorConfig {
            ack_timeout_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_yaml() {
        let config: DetectorConfig = serde_yaml::from_str(
            "name: kitchen\nstatus_interval_secs: 60\ninitial_status:\n  battery_powered: true\n",
        )
        .unwrap();
        assert_eq!(config.name, "kitchen");
        assert_eq!(config.status_interval(), Some(Duration::from_secs(60)));
        assert!(config.initial_status.battery_powered);
        assert!(!config.initial_status.alarm_local);
        assert_eq!(config.max_tx_tries, DEFAULT_MAX_TX_TRIES);
        assert_eq!(config.serial_number, DEFAULT_SERIAL_NUMBER);
    }
}
