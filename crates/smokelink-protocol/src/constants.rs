//! Protocol constants
//!
//! Control bytes, command codes and the fixed answers the emulated detector
//! gives to the base station's diagnostic queries.

// ============================================================================
// Control Bytes
// ============================================================================

/// Start of frame.
pub const STX: u8 = 0x02;
/// End of frame.
pub const ETX: u8 = 0x03;
/// Idle filler, ignored on receive and sent ahead of every outbound frame.
pub const NUL: u8 = 0x00;
/// Positive acknowledgment of the last frame.
pub const ACK: u8 = 0x06;
/// Negative acknowledgment of the last frame.
pub const NAK: u8 = 0x15;

// ============================================================================
// Sizes and Timing
// ============================================================================

/// Maximum number of hex characters accepted between STX and ETX.
pub const MAX_ENCODED_FRAME_LEN: usize = 32;

/// Smallest decoded frame: a command byte followed by the checksum byte.
pub const MIN_DECODED_FRAME_LEN: usize = 2;

/// Default time to wait for an ACK before retransmitting (milliseconds).
pub const DEFAULT_ACK_TIMEOUT_MS: u64 = 2000;

/// Default number of transmission attempts before a frame is abandoned.
pub const DEFAULT_MAX_TX_TRIES: u8 = 3;

/// Default uptime tick length (milliseconds). The base station expects quarter seconds.
pub const DEFAULT_UPTIME_UNIT_MS: u64 = 250;

// ============================================================================
// Command Codes (base station → detector)
// ============================================================================

/// Request a status report.
pub const CMD_REQUEST_STATUS: u8 = 0x02;
/// Base station pushes its own status.
pub const CMD_STATUS: u8 = 0x03;
/// Request the detector serial number.
pub const CMD_REQUEST_SERIAL: u8 = 0x04;
/// Diagnosis mode announcement. Acknowledged without an answer.
pub const CMD_DIAGNOSIS: u8 = 0x07;
/// Undocumented diagnostic query 0x08.
pub const CMD_UNKNOWN_08: u8 = 0x08;
/// Request the uptime counter.
pub const CMD_UPTIME: u8 = 0x09;
/// Request smoke chamber readings.
pub const CMD_SMOKEBOX: u8 = 0x0B;
/// Request battery and temperature sensor readings.
pub const CMD_BATTERY_TEMP: u8 = 0x0C;
/// Request alarm counters.
pub const CMD_ALARM_COUNT: u8 = 0x0D;
/// Request test-alarm counters.
pub const CMD_TESTALARM_COUNT: u8 = 0x0E;
/// Undocumented diagnostic query 0x0F.
pub const CMD_UNKNOWN_0F: u8 = 0x0F;

// ============================================================================
// Response Lead Byte Flags
// ============================================================================

/// Set on every frame the detector originates.
pub const RESPONSE_FLAG: u8 = 0x80;
/// Additionally set when the frame answers a request.
pub const REQUESTED_FLAG: u8 = 0x40;

// ============================================================================
// Status Report Bits (detector → base station)
// ============================================================================

/// Byte 1: test button pressed.
pub const STATUS1_BUTTON: u8 = 0x08;
/// Byte 1: local smoke alarm.
pub const STATUS1_ALARM_LOCAL: u8 = 0x10;
/// Byte 1: running on battery.
pub const STATUS1_BATTERY_POWERED: u8 = 0x20;

/// Byte 2: battery low.
pub const STATUS2_BATTERY_LOW: u8 = 0x01;
/// Byte 2: local alarm.
pub const STATUS2_ALARM_LOCAL: u8 = 0x04;
/// Byte 2: alarm via the wired bus.
pub const STATUS2_ALARM_WIRED: u8 = 0x08;
/// Byte 2: alarm via RF.
pub const STATUS2_ALARM_WIRELESS: u8 = 0x10;
/// Byte 2: local test alarm.
pub const STATUS2_ALARM_LOCAL_TEST: u8 = 0x20;
/// Byte 2: test alarm via the wired bus.
pub const STATUS2_ALARM_WIRED_TEST: u8 = 0x40;
/// Byte 2: test alarm via RF.
pub const STATUS2_ALARM_WIRELESS_TEST: u8 = 0x80;

// ============================================================================
// Remote Status Bits (base station → detector, byte 2 of a CMD_STATUS frame)
// ============================================================================

/// Battery low somewhere on the RF network.
pub const REMOTE_BATTERY_LOW: u8 = 0x01;
/// Base station is in pairing mode.
pub const REMOTE_PAIRING: u8 = 0x02;
/// Alarm raised via RF.
pub const REMOTE_ALARM: u8 = 0x10;
/// Test alarm raised via RF.
pub const REMOTE_ALARM_TEST: u8 = 0x80;

// ============================================================================
// Fixed Answers
// ============================================================================

/// Default serial number reported by the emulated detector.
pub const DEFAULT_SERIAL_NUMBER: [u8; 4] = [0x0F, 0xAB, 0x1A, 0x90];

/// Payload of the answer to [`CMD_UNKNOWN_08`].
pub const UNKNOWN_08_PAYLOAD: [u8; 4] = [0x01, 0x72, 0x01, 0x45];
/// Smoke chamber readings of a clean chamber.
pub const SMOKEBOX_PAYLOAD: [u8; 4] = [0x00, 0x5C, 0x00, 0x00];
/// Battery state followed by both temperature sensors.
pub const BATTERY_TEMP_PAYLOAD: [u8; 4] = [0x00, 0x01, 0x52, 0x52];
/// Local, local test, wired and wireless alarm counts.
pub const ALARM_COUNT_PAYLOAD: [u8; 4] = [0x00, 0x00, 0x00, 0x00];
/// Wired and wireless test-alarm counts.
pub const TESTALARM_COUNT_PAYLOAD: [u8; 2] = [0x00, 0x00];
/// Payload of the answer to [`CMD_UNKNOWN_0F`].
pub const UNKNOWN_0F_PAYLOAD: [u8; 4] = [0x00, 0x84, 0x00, 0x77];
