//! Commands the base station sends to the detector.

use crate::constants::*;
use crate::error::{ProtocolError, ProtocolResult};
use crate::frame::Frame;
use crate::types::RemoteStatus;

/// A command received from the base station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Request a status report.
    RequestStatus,
    /// The base station's own status.
    Status(RemoteStatus),
    /// Request the serial number.
    RequestSerial,
    /// Diagnosis mode announcement.
    Diagnosis,
    /// Undocumented query 0x08.
    Unknown08,
    /// Request the uptime counter.
    Uptime,
    /// Request smoke chamber readings.
    Smokebox,
    /// Request battery and temperature readings.
    BatteryTemp,
    /// Request alarm counters.
    AlarmCount,
    /// Request test-alarm counters.
    TestAlarmCount,
    /// Undocumented query 0x0F.
    Unknown0F,
}

impl Command {
    /// Decode a frame into a command.
    ///
    /// A status frame carries the remote flags in byte 2; a status frame
    /// without that byte is reported as too short.
    pub fn decode(frame: &Frame) -> ProtocolResult<Command> {
        let command = match frame.command {
            CMD_REQUEST_STATUS => Command::RequestStatus,
            CMD_STATUS => Command::Status(RemoteStatus::from_status_byte(frame.byte(2)?)),
            CMD_REQUEST_SERIAL => Command::RequestSerial,
            CMD_DIAGNOSIS => Command::Diagnosis,
            CMD_UNKNOWN_08 => Command::Unknown08,
            CMD_UPTIME => Command::Uptime,
            CMD_SMOKEBOX => Command::Smokebox,
            CMD_BATTERY_TEMP => Command::BatteryTemp,
            CMD_ALARM_COUNT => Command::AlarmCount,
            CMD_TESTALARM_COUNT => Command::TestAlarmCount,
            CMD_UNKNOWN_0F => Command::Unknown0F,
            other => return Err(ProtocolError::UnknownCommand(other)),
        };
        Ok(command)
    }

    /// Command code byte.
    pub fn code(&self) -> u8 {
        match self {
            Command::RequestStatus => CMD_REQUEST_STATUS,
            Command::Status(_) => CMD_STATUS,
            Command::RequestSerial => CMD_REQUEST_SERIAL,
            Command::Diagnosis => CMD_DIAGNOSIS,
            Command::Unknown08 => CMD_UNKNOWN_08,
            Command::Uptime => CMD_UPTIME,
            Command::Smokebox => CMD_SMOKEBOX,
            Command::BatteryTemp => CMD_BATTERY_TEMP,
            Command::AlarmCount => CMD_ALARM_COUNT,
            Command::TestAlarmCount => CMD_TESTALARM_COUNT,
            Command::Unknown0F => CMD_UNKNOWN_0F,
        }
    }

    /// Name for log output.
    pub fn name(&self) -> &'static str {
        match self {
            Command::RequestStatus => "request_status",
            Command::Status(_) => "status",
            Command::RequestSerial => "request_serial",
            Command::Diagnosis => "diagnosis",
            Command::Unknown08 => "unknown_08",
            Command::Uptime => "uptime",
            Command::Smokebox => "smokebox",
            Command::BatteryTemp => "battery_temp",
            Command::AlarmCount => "alarm_count",
            Command::TestAlarmCount => "testalarm_count",
            Command::Unknown0F => "unknown_0f",
        }
    }

    /// Build the frame a base station would send for this command.
    pub fn encode(&self) -> Frame {
        match self {
            Command::Status(remote) => Frame::new(CMD_STATUS, vec![0x00, remote.to_status_byte()]),
            other => Frame::new(other.code(), Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_simple_commands() {
        for code in [0x02, 0x04, 0x07, 0x08, 0x09, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F] {
            let cmd = Command::decode(&Frame::new(code, vec![])).unwrap();
            assert_eq!(cmd.code(), code);
            assert_eq!(cmd.encode(), Frame::new(code, vec![]));
        }
    }

    #[test]
    fn test_decode_status() {
        let cmd = Command::decode(&Frame::new(CMD_STATUS, vec![0x00, 0x10])).unwrap();
        let Command::Status(remote) = cmd else {
            panic!("expected status, got {cmd:?}");
        };
        assert!(remote.alarm);
        assert!(!remote.battery_low);
        assert_eq!(cmd.encode(), Frame::new(CMD_STATUS, vec![0x00, 0x10]));
    }

    #[test]
    fn test_decode_short_status() {
        assert!(matches!(
            Command::decode(&Frame::new(CMD_STATUS, vec![0x00])),
            Err(ProtocolError::FrameTooShort { .. })
        ));
    }

    #[test]
    fn test_decode_unknown() {
        assert_eq!(
            Command::decode(&Frame::new(0x0A, vec![])),
            Err(ProtocolError::UnknownCommand(0x0A))
        );
        assert_eq!(
            Command::decode(&Frame::new(0x01, vec![])),
            Err(ProtocolError::UnknownCommand(0x01))
        );
    }
}
