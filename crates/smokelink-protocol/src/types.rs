//! Status flag sets shared by the detector and the base station.

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Conditions known to this detector. Reported to the base station in
/// status frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalStatus {
    /// Smoke alarm raised by this detector.
    pub alarm_local: bool,
    /// Test alarm raised by this detector.
    pub alarm_local_test: bool,
    /// Alarm received over the wired bus.
    pub alarm_wired: bool,
    /// Test alarm received over the wired bus.
    pub alarm_wired_test: bool,
    /// Alarm received over RF.
    pub alarm_wireless: bool,
    /// Test alarm received over RF.
    pub alarm_wireless_test: bool,
    /// Test button held.
    pub button: bool,
    /// Battery low.
    pub battery_low: bool,
    /// Running on battery rather than mains.
    pub battery_powered: bool,
}

impl LocalStatus {
    /// Any alarm-family flag set.
    pub fn any_alarm(&self) -> bool {
        self.alarm_local || self.alarm_wired || self.alarm_wireless
    }

    /// Any test-alarm-family flag set.
    pub fn any_test_alarm(&self) -> bool {
        self.alarm_local_test || self.alarm_wired_test || self.alarm_wireless_test
    }

    /// The four bytes following the lead byte of a status report.
    pub fn report_bytes(&self) -> [u8; 4] {
        let mut b1 = 0u8;
        if self.button {
            b1 |= STATUS1_BUTTON;
        }
        if self.alarm_local {
            b1 |= STATUS1_ALARM_LOCAL;
        }
        if self.battery_powered {
            b1 |= STATUS1_BATTERY_POWERED;
        }

        let flags2 = [
            (self.battery_low, STATUS2_BATTERY_LOW),
            (self.alarm_local, STATUS2_ALARM_LOCAL),
            (self.alarm_wired, STATUS2_ALARM_WIRED),
            (self.alarm_wireless, STATUS2_ALARM_WIRELESS),
            (self.alarm_local_test, STATUS2_ALARM_LOCAL_TEST),
            (self.alarm_wired_test, STATUS2_ALARM_WIRED_TEST),
            (self.alarm_wireless_test, STATUS2_ALARM_WIRELESS_TEST),
        ];
        let b2 = flags2
            .iter()
            .filter(|(set, _)| *set)
            .fold(0u8, |acc, (_, bit)| acc | bit);

        [b1, b2, 0x00, 0x00]
    }

    /// Rebuild flags from the bytes of a status report.
    pub fn from_report_bytes(b1: u8, b2: u8) -> Self {
        LocalStatus {
            alarm_local: b2 & STATUS2_ALARM_LOCAL != 0,
            alarm_local_test: b2 & STATUS2_ALARM_LOCAL_TEST != 0,
            alarm_wired: b2 & STATUS2_ALARM_WIRED != 0,
            alarm_wired_test: b2 & STATUS2_ALARM_WIRED_TEST != 0,
            alarm_wireless: b2 & STATUS2_ALARM_WIRELESS != 0,
            alarm_wireless_test: b2 & STATUS2_ALARM_WIRELESS_TEST != 0,
            button: b1 & STATUS1_BUTTON != 0,
            battery_low: b2 & STATUS2_BATTERY_LOW != 0,
            battery_powered: b1 & STATUS1_BATTERY_POWERED != 0,
        }
    }
}

/// Conditions last reported by the base station.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteStatus {
    /// A device on the RF network reports battery low.
    pub battery_low: bool,
    /// Base station is pairing.
    pub pairing: bool,
    /// Alarm on the RF network.
    pub alarm: bool,
    /// Test alarm on the RF network.
    pub alarm_test: bool,
}

/// Individual remote flags, in the order they are examined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteFlag {
    /// [`RemoteStatus::battery_low`]
    BatteryLow,
    /// [`RemoteStatus::pairing`]
    Pairing,
    /// [`RemoteStatus::alarm`]
    Alarm,
    /// [`RemoteStatus::alarm_test`]
    AlarmTest,
}

impl RemoteFlag {
    /// Priority order used when several flags change at once.
    pub const PRIORITY: [RemoteFlag; 4] = [
        RemoteFlag::BatteryLow,
        RemoteFlag::Pairing,
        RemoteFlag::Alarm,
        RemoteFlag::AlarmTest,
    ];
}

impl RemoteStatus {
    /// Decode from the flag byte of a peer status frame.
    pub fn from_status_byte(bits: u8) -> Self {
        RemoteStatus {
            battery_low: bits & REMOTE_BATTERY_LOW != 0,
            pairing: bits & REMOTE_PAIRING != 0,
            alarm: bits & REMOTE_ALARM != 0,
            alarm_test: bits & REMOTE_ALARM_TEST != 0,
        }
    }

    /// Encode into the flag byte of a peer status frame.
    pub fn to_status_byte(&self) -> u8 {
        let mut bits = 0u8;
        if self.battery_low {
            bits |= REMOTE_BATTERY_LOW;
        }
        if self.pairing {
            bits |= REMOTE_PAIRING;
        }
        if self.alarm {
            bits |= REMOTE_ALARM;
        }
        if self.alarm_test {
            bits |= REMOTE_ALARM_TEST;
        }
        bits
    }

    /// Value of a single flag.
    pub fn get(&self, flag: RemoteFlag) -> bool {
        match flag {
            RemoteFlag::BatteryLow => self.battery_low,
            RemoteFlag::Pairing => self.pairing,
            RemoteFlag::Alarm => self.alarm,
            RemoteFlag::AlarmTest => self.alarm_test,
        }
    }

    /// Set a single flag.
    pub fn set(&mut self, flag: RemoteFlag, value: bool) {
        match flag {
            RemoteFlag::BatteryLow => self.battery_low = value,
            RemoteFlag::Pairing => self.pairing = value,
            RemoteFlag::Alarm => self.alarm = value,
            RemoteFlag::AlarmTest => self.alarm_test = value,
        }
    }

    /// First flag, in [`RemoteFlag::PRIORITY`] order, that differs from `other`.
    pub fn first_change(&self, other: &RemoteStatus) -> Option<RemoteFlag> {
        RemoteFlag::PRIORITY
            .into_iter()
            .find(|&flag| self.get(flag) != other.get(flag))
    }
}
