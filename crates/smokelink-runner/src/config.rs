//! Runner configuration, loaded from YAML.
//!
//! ```yaml
//! detector:
//!   name: hallway
//!   status_interval_secs: 60
//! transport:
//!   type: serial
//!   path: /dev/ttyUSB0
//!   baud_rate: 9600
//! tick_interval_ms: 2
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use smokelink_detector::DetectorConfig;
use thiserror::Error;

/// Default TCP listen address.
pub const DEFAULT_LISTEN: &str = "127.0.0.1:7420";
/// Baud rate of the base station's serial interface.
pub const DEFAULT_BAUD_RATE: u32 = 9600;
/// Default idle sleep between ticks (milliseconds).
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 2;

/// Errors loading the runner configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// How the detector reaches the base station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransportConfig {
    /// Accept one TCP client at a time on `listen`.
    Tcp {
        #[serde(default = "default_listen")]
        listen: String,
    },
    /// Open a serial port.
    Serial {
        path: String,
        #[serde(default = "default_baud_rate")]
        baud_rate: u32,
    },
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig::Tcp {
            listen: default_listen(),
        }
    }
}

/// Top-level runner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub detector: DetectorConfig,
    pub transport: TransportConfig,
    /// Sleep between ticks when no inbound data is waiting.
    pub tick_interval_ms: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            detector: DetectorConfig::default(),
            transport: TransportConfig::default(),
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

impl RunnerConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_gives_defaults() {
        let config = RunnerConfig::from_yaml("{}").unwrap();
        assert_eq!(config, RunnerConfig::default());
        assert_eq!(
            config.transport,
            TransportConfig::Tcp {
                listen: DEFAULT_LISTEN.to_string()
            }
        );
    }

    #[test]
    fn test_serial_transport() {
        let config = RunnerConfig::from_yaml(
            "transport:\n  type: serial\n  path: /dev/ttyUSB0\ntick_interval_ms: 5\n",
        )
        .unwrap();
        assert_eq!(
            config.transport,
            TransportConfig::Serial {
                path: "/dev/ttyUSB0".to_string(),
                baud_rate: DEFAULT_BAUD_RATE
            }
        );
        assert_eq!(config.tick_interval(), Duration::from_millis(5));
    }

    #[test]
    fn test_detector_section() {
        let config = RunnerConfig::from_yaml(
            "detector:\n  name: hallway\n  max_tx_tries: 5\n  serial_number: [1, 2, 3, 4]\n",
        )
        .unwrap();
        assert_eq!(config.detector.name, "hallway");
        assert_eq!(config.detector.max_tx_tries, 5);
        assert_eq!(config.detector.serial_number, [1, 2, 3, 4]);
    }

    #[test]
    fn test_unknown_transport_rejected() {
        let result = RunnerConfig::from_yaml("transport:\n  type: carrier_pigeon\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
