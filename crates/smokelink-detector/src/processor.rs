//! Command processor: owns both status tables and turns inbound frames into
//! responses, state changes and notifications.

use std::time::Duration;

use smokelink_metrics::{metric_defs, MetricLabels};
use smokelink_protocol::{
    Command, Frame, LocalStatus, ProtocolResult, RemoteFlag, RemoteStatus, Response,
};
use tracing::{debug, info};

use crate::config::DetectorConfig;
use crate::notify::{NotificationKind, Notifications};

/// Dispatches inbound commands against the detector's state.
#[derive(Debug)]
pub struct CommandProcessor {
    local: LocalStatus,
    remote: RemoteStatus,
    notifications: Notifications,
    serial_number: [u8; 4],
    uptime_unit: Duration,
    labels: MetricLabels,
}

impl CommandProcessor {
    /// Create a processor with the configured initial status.
    pub fn new(config: &DetectorConfig) -> Self {
        CommandProcessor {
            local: config.initial_status,
            remote: RemoteStatus::default(),
            notifications: Notifications::default(),
            serial_number: config.serial_number,
            uptime_unit: config.uptime_unit(),
            labels: MetricLabels::new(config.name.clone()),
        }
    }

    /// Current local status.
    pub fn local(&self) -> LocalStatus {
        self.local
    }

    /// Replace the local status.
    pub fn set_local(&mut self, status: LocalStatus) {
        self.local = status;
    }

    /// Last status reported by the base station.
    pub fn remote(&self) -> RemoteStatus {
        self.remote
    }

    /// Notification slots.
    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    /// Status report with the current local flags.
    pub fn status_report(&self, requested: bool) -> Response {
        Response::Status {
            requested,
            status: self.local,
        }
    }

    /// Uptime in configured ticks. Wraps after `u32::MAX` ticks.
    pub fn uptime_ticks(&self, now: Duration) -> u32 {
        let unit = self.uptime_unit.as_millis().max(1);
        (now.as_millis() / unit) as u32
    }

    /// Handle one validated frame.
    ///
    /// `Ok(Some(_))` is a response to queue, `Ok(None)` means the frame was
    /// accepted without an answer. Errors are answered with NAK by the caller.
    pub fn process(&mut self, frame: &Frame, now: Duration) -> ProtocolResult<Option<Response>> {
        let command = Command::decode(frame)?;
        debug!(
            "Detector[{}]: command {} (0x{:02X})",
            self.labels.detector,
            command.name(),
            command.code()
        );

        let response = match command {
            Command::RequestStatus => Some(self.status_report(true)),
            Command::Status(reported) => {
                self.apply_remote_status(reported);
                None
            }
            Command::RequestSerial => Some(Response::SerialNumber(self.serial_number)),
            Command::Diagnosis => None,
            Command::Unknown08 => Some(Response::Unknown08),
            Command::Uptime => Some(Response::Uptime {
                ticks: self.uptime_ticks(now),
            }),
            Command::Smokebox => Some(Response::Smokebox),
            Command::BatteryTemp => Some(Response::BatteryTemp),
            Command::AlarmCount => Some(Response::AlarmCount),
            Command::TestAlarmCount => Some(Response::TestAlarmCount),
            Command::Unknown0F => Some(Response::Unknown0F),
        };
        Ok(response)
    }

    /// Apply a status pushed by the base station.
    ///
    /// Only the first flag that differs from the stored remote status, in
    /// [`RemoteFlag::PRIORITY`] order, is applied per call. Other changed flags
    /// are picked up by later pushes. Returns the flag that was applied.
    pub fn apply_remote_status(&mut self, reported: RemoteStatus) -> Option<RemoteFlag> {
        let flag = reported.first_change(&self.remote)?;
        let value = reported.get(flag);
        self.remote.set(flag, value);

        match flag {
            RemoteFlag::BatteryLow => {
                let active = self.remote.battery_low || self.local.battery_low;
                self.raise(NotificationKind::BatteryWarning, active);
            }
            RemoteFlag::Pairing => {
                info!("Detector[{}]: pairing={}", self.labels.detector, value);
            }
            RemoteFlag::Alarm => {
                self.local.alarm_wireless = value;
                let active = self.remote.alarm || self.local.any_alarm();
                self.raise(NotificationKind::Alarm, active);
            }
            RemoteFlag::AlarmTest => {
                self.local.alarm_wireless_test = value;
                let active = self.remote.alarm_test || self.local.any_test_alarm();
                self.raise(NotificationKind::TestAlarm, active);
            }
        }
        Some(flag)
    }

    fn raise(&mut self, kind: NotificationKind, active: bool) {
        info!("Detector[{}]: {} -> {}", self.labels.detector, kind, active);
        if self.notifications.notify(kind, active) {
            let labels = self.labels.with(&[("kind", kind.as_str().to_string())]);
            metrics::counter!(metric_defs::NOTIFICATIONS.name, &labels).increment(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smokelink_protocol::{ProtocolError, CMD_STATUS};
    use std::sync::{Arc, Mutex};

    type Seen = Arc<Mutex<Vec<(NotificationKind, bool)>>>;

    fn processor() -> (CommandProcessor, Seen) {
        let mut p = CommandProcessor::new(&DetectorConfig::default());
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        for kind in [
            NotificationKind::Alarm,
            NotificationKind::TestAlarm,
            NotificationKind::BatteryWarning,
        ] {
            let seen = Arc::clone(&seen);
            p.notifications_mut()
                .set(kind, Some(Box::new(move |v| seen.lock().unwrap().push((kind, v)))));
        }
        (p, seen)
    }

    fn status_frame(bits: u8) -> Frame {
        Frame::new(CMD_STATUS, vec![0x00, bits])
    }

    #[test]
    fn test_request_status_answers_with_report() {
        let (mut p, _) = processor();
        p.set_local(LocalStatus {
            battery_low: true,
            ..Default::default()
        });
        let response = p.process(&Frame::new(0x02, vec![]), Duration::ZERO).unwrap();
        let frame = response.unwrap().to_frame();
        assert_eq!(frame.to_bytes(), vec![0xC2, 0x00, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn test_diagnosis_has_no_answer() {
        let (mut p, _) = processor();
        assert_eq!(p.process(&Frame::new(0x07, vec![]), Duration::ZERO), Ok(None));
    }

    #[test]
    fn test_unknown_command_fails() {
        let (mut p, _) = processor();
        assert_eq!(
            p.process(&Frame::new(0x55, vec![]), Duration::ZERO),
            Err(ProtocolError::UnknownCommand(0x55))
        );
    }

    #[test]
    fn test_uptime_in_quarter_seconds() {
        let (mut p, _) = processor();
        let response = p
            .process(&Frame::new(0x09, vec![]), Duration::from_millis(10_100))
            .unwrap();
        assert_eq!(response, Some(Response::Uptime { ticks: 40 }));
    }

    #[test]
    fn test_repeated_status_is_edge_triggered() {
        let (mut p, seen) = processor();
        assert_eq!(p.process(&status_frame(0x00), Duration::ZERO), Ok(None));
        assert!(seen.lock().unwrap().is_empty());

        p.process(&status_frame(0x10), Duration::ZERO).unwrap();
        p.process(&status_frame(0x10), Duration::ZERO).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![(NotificationKind::Alarm, true)]);
        assert!(p.remote().alarm);
        assert!(p.local().alarm_wireless);
    }

    #[test]
    fn test_alarm_notification_ors_local_flags() {
        let (mut p, seen) = processor();
        p.set_local(LocalStatus {
            alarm_wired: true,
            ..Default::default()
        });
        p.process(&status_frame(0x10), Duration::ZERO).unwrap();
        p.process(&status_frame(0x00), Duration::ZERO).unwrap();

        // The wired alarm keeps the condition active after the RF alarm clears.
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                (NotificationKind::Alarm, true),
                (NotificationKind::Alarm, true)
            ]
        );
        assert!(!p.local().alarm_wireless);
    }

    #[test]
    fn test_first_changed_flag_wins() {
        let (mut p, seen) = processor();
        // battery low, alarm and test alarm all at once
        let frame = status_frame(0x91);

        assert_eq!(
            p.apply_remote_status(RemoteStatus::from_status_byte(0x91)),
            Some(RemoteFlag::BatteryLow)
        );
        p.process(&frame, Duration::ZERO).unwrap();
        p.process(&frame, Duration::ZERO).unwrap();
        p.process(&frame, Duration::ZERO).unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                (NotificationKind::BatteryWarning, true),
                (NotificationKind::Alarm, true),
                (NotificationKind::TestAlarm, true)
            ]
        );
        assert_eq!(p.remote(), RemoteStatus::from_status_byte(0x91));
    }

    #[test]
    fn test_pairing_has_no_notification() {
        let (mut p, seen) = processor();
        assert_eq!(
            p.apply_remote_status(RemoteStatus {
                pairing: true,
                ..Default::default()
            }),
            Some(RemoteFlag::Pairing)
        );
        assert!(seen.lock().unwrap().is_empty());
        assert!(p.remote().pairing);
    }

    #[test]
    fn test_battery_warning_includes_local_battery() {
        let (mut p, seen) = processor();
        p.set_local(LocalStatus {
            battery_low: true,
            ..Default::default()
        });
        p.process(&status_frame(0x01), Duration::ZERO).unwrap();
        p.process(&status_frame(0x00), Duration::ZERO).unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                (NotificationKind::BatteryWarning, true),
                (NotificationKind::BatteryWarning, true)
            ]
        );
    }
}
