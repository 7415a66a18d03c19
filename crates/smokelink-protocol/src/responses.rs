//! Frames the detector sends to the base station.
//!
//! Every lead byte has [`RESPONSE_FLAG`] set. Answers to a request also carry
//! [`REQUESTED_FLAG`], so a status report reads `0x82` when pushed and `0xC2`
//! when requested; the rest of the frame is identical.

use crate::constants::*;
use crate::error::{ProtocolError, ProtocolResult};
use crate::frame::Frame;
use crate::types::LocalStatus;

/// A frame originated by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// Status report.
    Status {
        /// Answers a [`CMD_REQUEST_STATUS`] rather than being pushed.
        requested: bool,
        /// Flags reported.
        status: LocalStatus,
    },
    /// Serial number.
    SerialNumber([u8; 4]),
    /// Fixed answer to query 0x08.
    Unknown08,
    /// Uptime in configured tick units.
    Uptime {
        /// Tick count, sent little-endian.
        ticks: u32,
    },
    /// Smoke chamber readings.
    Smokebox,
    /// Battery and temperature readings.
    BatteryTemp,
    /// Alarm counters.
    AlarmCount,
    /// Test-alarm counters.
    TestAlarmCount,
    /// Fixed answer to query 0x0F.
    Unknown0F,
}

impl Response {
    /// Lead byte of the frame.
    pub fn lead_byte(&self) -> u8 {
        let (code, requested) = match self {
            Response::Status { requested, .. } => (CMD_REQUEST_STATUS, *requested),
            Response::SerialNumber(_) => (CMD_REQUEST_SERIAL, true),
            Response::Unknown08 => (CMD_UNKNOWN_08, true),
            Response::Uptime { .. } => (CMD_UPTIME, true),
            Response::Smokebox => (CMD_SMOKEBOX, true),
            Response::BatteryTemp => (CMD_BATTERY_TEMP, true),
            Response::AlarmCount => (CMD_ALARM_COUNT, true),
            Response::TestAlarmCount => (CMD_TESTALARM_COUNT, true),
            Response::Unknown0F => (CMD_UNKNOWN_0F, true),
        };
        if requested {
            RESPONSE_FLAG | REQUESTED_FLAG | code
        } else {
            RESPONSE_FLAG | code
        }
    }

    /// Build the frame.
    pub fn to_frame(&self) -> Frame {
        let data: Vec<u8> = match self {
            Response::Status { status, .. } => status.report_bytes().to_vec(),
            Response::SerialNumber(serial) => serial.to_vec(),
            Response::Unknown08 => UNKNOWN_08_PAYLOAD.to_vec(),
            Response::Uptime { ticks } => ticks.to_le_bytes().to_vec(),
            Response::Smokebox => SMOKEBOX_PAYLOAD.to_vec(),
            Response::BatteryTemp => BATTERY_TEMP_PAYLOAD.to_vec(),
            Response::AlarmCount => ALARM_COUNT_PAYLOAD.to_vec(),
            Response::TestAlarmCount => TESTALARM_COUNT_PAYLOAD.to_vec(),
            Response::Unknown0F => UNKNOWN_0F_PAYLOAD.to_vec(),
        };
        Frame::new(self.lead_byte(), data)
    }

    /// Parse a detector frame, as the base station sees it.
    pub fn decode(frame: &Frame) -> ProtocolResult<Response> {
        if frame.command & RESPONSE_FLAG == 0 {
            return Err(ProtocolError::UnknownCommand(frame.command));
        }
        let requested = frame.command & REQUESTED_FLAG != 0;
        let code = frame.command & !(RESPONSE_FLAG | REQUESTED_FLAG);

        let response = match (code, requested) {
            (CMD_REQUEST_STATUS, _) => Response::Status {
                requested,
                status: LocalStatus::from_report_bytes(frame.byte(1)?, frame.byte(2)?),
            },
            (CMD_REQUEST_SERIAL, true) => Response::SerialNumber([
                frame.byte(1)?,
                frame.byte(2)?,
                frame.byte(3)?,
                frame.byte(4)?,
            ]),
            (CMD_UNKNOWN_08, true) => Response::Unknown08,
            (CMD_UPTIME, true) => Response::Uptime {
                ticks: u32::from_le_bytes([
                    frame.byte(1)?,
                    frame.byte(2)?,
                    frame.byte(3)?,
                    frame.byte(4)?,
                ]),
            },
            (CMD_SMOKEBOX, true) => Response::Smokebox,
            (CMD_BATTERY_TEMP, true) => Response::BatteryTemp,
            (CMD_ALARM_COUNT, true) => Response::AlarmCount,
            (CMD_TESTALARM_COUNT, true) => Response::TestAlarmCount,
            (CMD_UNKNOWN_0F, true) => Response::Unknown0F,
            _ => return Err(ProtocolError::UnknownCommand(frame.command)),
        };
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_lead_bytes() {
        let status = LocalStatus {
            battery_low: true,
            ..Default::default()
        };
        let pushed = Response::Status {
            requested: false,
            status,
        }
        .to_frame();
        let requested = Response::Status {
            requested: true,
            status,
        }
        .to_frame();

        assert_eq!(pushed.command, 0x82);
        assert_eq!(requested.command, 0xC2);
        assert_eq!(pushed.data, requested.data);
        assert_eq!(pushed.data, vec![0x00, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn test_serial_number_frame() {
        let frame = Response::SerialNumber(DEFAULT_SERIAL_NUMBER).to_frame();
        assert_eq!(frame.to_bytes(), vec![0xC4, 0x0F, 0xAB, 0x1A, 0x90]);
    }

    #[test]
    fn test_uptime_little_endian() {
        let frame = Response::Uptime { ticks: 0x0403_0201 }.to_frame();
        assert_eq!(frame.to_bytes(), vec![0xC9, 0x01, 0x02, 0x03, 0x04]);
        assert_eq!(
            Response::decode(&frame).unwrap(),
            Response::Uptime { ticks: 0x0403_0201 }
        );
    }

    #[test]
    fn test_fixed_answers() {
        assert_eq!(
            Response::Unknown08.to_frame().to_bytes(),
            vec![0xC8, 0x01, 0x72, 0x01, 0x45]
        );
        assert_eq!(
            Response::Smokebox.to_frame().to_bytes(),
            vec![0xCB, 0x00, 0x5C, 0x00, 0x00]
        );
        assert_eq!(
            Response::BatteryTemp.to_frame().to_bytes(),
            vec![0xCC, 0x00, 0x01, 0x52, 0x52]
        );
        assert_eq!(
            Response::AlarmCount.to_frame().to_bytes(),
            vec![0xCD, 0x00, 0x00, 0x00, 0x00]
        );
        assert_eq!(
            Response::TestAlarmCount.to_frame().to_bytes(),
            vec![0xCE, 0x00, 0x00]
        );
        assert_eq!(
            Response::Unknown0F.to_frame().to_bytes(),
            vec![0xCF, 0x00, 0x84, 0x00, 0x77]
        );
    }

    #[test]
    fn test_decode_status_report() {
        let status = LocalStatus {
            alarm_wireless: true,
            battery_powered: true,
            ..Default::default()
        };
        let frame = Response::Status {
            requested: false,
            status,
        }
        .to_frame();
        assert_eq!(
            Response::decode(&frame).unwrap(),
            Response::Status {
                requested: false,
                status
            }
        );
    }

    #[test]
    fn test_decode_rejects_commands() {
        assert_eq!(
            Response::decode(&Frame::new(0x02, vec![])),
            Err(ProtocolError::UnknownCommand(0x02))
        );
    }
}
