//! Application notification slots.

use std::fmt;

/// A notification handler. Called with whether the condition is currently
/// active anywhere, locally or on the RF network.
pub type Handler = Box<dyn FnMut(bool) + Send>;

/// The conditions the host application can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// Smoke alarm.
    Alarm,
    /// Test alarm.
    TestAlarm,
    /// Battery warning.
    BatteryWarning,
}

impl NotificationKind {
    /// Label value used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Alarm => "alarm",
            NotificationKind::TestAlarm => "test_alarm",
            NotificationKind::BatteryWarning => "battery_warning",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One optional handler per [`NotificationKind`]. Handlers can be replaced or
/// cleared at any time; an empty slot makes the notification a no-op.
#[derive(Default)]
pub struct Notifications {
    alarm: Option<Handler>,
    test_alarm: Option<Handler>,
    battery_warning: Option<Handler>,
}

impl fmt::Debug for Notifications {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifications")
            .field("alarm", &self.alarm.is_some())
            .field("test_alarm", &self.test_alarm.is_some())
            .field("battery_warning", &self.battery_warning.is_some())
            .finish()
    }
}

impl Notifications {
    fn slot(&mut self, kind: NotificationKind) -> &mut Option<Handler> {
        match kind {
            NotificationKind::Alarm => &mut self.alarm,
            NotificationKind::TestAlarm => &mut self.test_alarm,
            NotificationKind::BatteryWarning => &mut self.battery_warning,
        }
    }

    /// Install, replace or clear (`None`) the handler for `kind`.
    pub fn set(&mut self, kind: NotificationKind, handler: Option<Handler>) {
        *self.slot(kind) = handler;
    }

    /// Whether a handler is installed for `kind`.
    pub fn is_set(&self, kind: NotificationKind) -> bool {
        match kind {
            NotificationKind::Alarm => self.alarm.is_some(),
            NotificationKind::TestAlarm => self.test_alarm.is_some(),
            NotificationKind::BatteryWarning => self.battery_warning.is_some(),
        }
    }

    /// Invoke the handler for `kind`. Returns false if none is installed.
    pub fn notify(&mut self, kind: NotificationKind, active: bool) -> bool {
        match self.slot(kind) {
            Some(handler) => {
                handler(active);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_empty_slot_is_noop() {
        let mut notifications = Notifications::default();
        assert!(!notifications.notify(NotificationKind::Alarm, true));
    }

    #[test]
    fn test_replace_and_clear() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut notifications = Notifications::default();

        let first = Arc::clone(&seen);
        notifications.set(
            NotificationKind::Alarm,
            Some(Box::new(move |v| first.lock().unwrap().push(("first", v)))),
        );
        let second = Arc::clone(&seen);
        notifications.set(
            NotificationKind::Alarm,
            Some(Box::new(move |v| second.lock().unwrap().push(("second", v)))),
        );

        assert!(notifications.notify(NotificationKind::Alarm, true));
        assert!(!notifications.notify(NotificationKind::TestAlarm, true));
        notifications.set(NotificationKind::Alarm, None);
        assert!(!notifications.is_set(NotificationKind::Alarm));
        assert!(!notifications.notify(NotificationKind::Alarm, false));

        assert_eq!(*seen.lock().unwrap(), vec![("second", true)]);
    }
}
