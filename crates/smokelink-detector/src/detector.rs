//! The detector endpoint: one poll-driven session over a [`Transport`].

use std::time::Duration;

use smokelink_metrics::{metric_defs, MetricLabels};
use smokelink_protocol::{
    Frame, FrameReceiver, LocalStatus, ProtocolError, RemoteStatus, Response, RxEvent, ACK, NAK,
};
use tracing::{debug, trace, warn};

use crate::config::DetectorConfig;
use crate::error::DetectorResult;
use crate::notify::NotificationKind;
use crate::processor::CommandProcessor;
use crate::scheduler::{TransmitScheduler, TxAction};
use crate::transport::Transport;

/// A smoke detector talking to its RF base station.
///
/// Nothing happens between calls to [`Detector::tick`]. Each tick:
///
/// 1. sends or retransmits the pending outbound frame if it is due,
/// 2. reads at most one inbound byte and acts on it,
/// 3. queues a status report if the auto-status interval elapsed and nothing
///    is pending,
/// 4. queues a status report if local or remote status changed since the
///    last report.
///
/// Time is supplied by the caller as the elapsed time since start, which keeps
/// the session deterministic under test.
#[derive(Debug)]
pub struct Detector<T: Transport> {
    config: DetectorConfig,
    transport: T,
    receiver: FrameReceiver,
    scheduler: TransmitScheduler,
    processor: CommandProcessor,
    labels: MetricLabels,
    last_status_at: Option<Duration>,
    published: (LocalStatus, RemoteStatus),
    now: Duration,
}

impl<T: Transport> Detector<T> {
    /// Create a detector on `transport`.
    pub fn new(config: DetectorConfig, transport: T) -> DetectorResult<Self> {
        config.validate()?;
        let processor = CommandProcessor::new(&config);
        let published = (processor.local(), processor.remote());
        debug!(
            "Detector[{}]: created, serial {:02X?}",
            config.name, config.serial_number
        );
        Ok(Detector {
            scheduler: TransmitScheduler::new(config.max_tx_tries, config.ack_timeout()),
            labels: MetricLabels::new(config.name.clone()),
            receiver: FrameReceiver::new(),
            processor,
            transport,
            config,
            last_status_at: None,
            published,
            now: Duration::ZERO,
        })
    }

    /// The configuration this detector runs with.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detector name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// No outbound frame pending.
    pub fn is_idle(&self) -> bool {
        self.scheduler.is_idle()
    }

    /// Current local status.
    pub fn local_status(&self) -> LocalStatus {
        self.processor.local()
    }

    /// Last status reported by the base station, as applied so far.
    pub fn remote_status(&self) -> RemoteStatus {
        self.processor.remote()
    }

    /// Replace the local status. A report goes out at the end of the next tick
    /// if anything changed.
    pub fn set_local_status(&mut self, status: LocalStatus) {
        self.processor.set_local(status);
    }

    /// Modify the local status in place.
    pub fn update_local_status(&mut self, f: impl FnOnce(&mut LocalStatus)) {
        let mut status = self.processor.local();
        f(&mut status);
        self.processor.set_local(status);
    }

    /// Queue an unsolicited status report now.
    pub fn push_status(&mut self) {
        let report = self.processor.status_report(false);
        self.queue_response(&report);
    }

    /// Handler for alarm changes.
    pub fn set_on_alarm(&mut self, handler: impl FnMut(bool) + Send + 'static) {
        self.set_handler(NotificationKind::Alarm, handler);
    }

    /// Handler for test-alarm changes.
    pub fn set_on_test_alarm(&mut self, handler: impl FnMut(bool) + Send + 'static) {
        self.set_handler(NotificationKind::TestAlarm, handler);
    }

    /// Handler for battery warnings.
    pub fn set_on_battery_warning(&mut self, handler: impl FnMut(bool) + Send + 'static) {
        self.set_handler(NotificationKind::BatteryWarning, handler);
    }

    /// Remove the handler for `kind`.
    pub fn clear_handler(&mut self, kind: NotificationKind) {
        self.processor.notifications_mut().set(kind, None);
    }

    fn set_handler(&mut self, kind: NotificationKind, handler: impl FnMut(bool) + Send + 'static) {
        self.processor
            .notifications_mut()
            .set(kind, Some(Box::new(handler)));
    }

    /// Run one iteration of the session at time `now`.
    ///
    /// Protocol faults are answered on the wire and never returned. Only
    /// transport failures are.
    pub fn tick(&mut self, now: Duration) -> DetectorResult<()> {
        self.now = now;

        self.drive_transmit()?;

        if self.transport.available()? {
            let byte = self.transport.read_byte()?;
            trace!("Detector[{}]: rx 0x{:02X}", self.config.name, byte);
            if let Some(event) = self.receiver.push(byte) {
                self.handle_event(event)?;
            }
        }

        self.check_auto_status();

        if (self.processor.local(), self.processor.remote()) != self.published {
            debug!("Detector[{}]: status changed, pushing report", self.config.name);
            self.push_status();
        }
        Ok(())
    }

    fn drive_transmit(&mut self) -> DetectorResult<()> {
        match self.scheduler.poll(self.now) {
            TxAction::Idle => {}
            TxAction::Send { wire, attempt } => {
                debug!(
                    "Detector[{}]: tx attempt {} ({} bytes)",
                    self.config.name,
                    attempt,
                    wire.len()
                );
                self.transport.write_all(&wire)?;
                let labels = self.labels.to_labels();
                metrics::counter!(metric_defs::FRAMES_SENT.name, &labels).increment(1);
                if attempt > 1 {
                    metrics::counter!(metric_defs::RETRANSMISSIONS.name, &labels).increment(1);
                }
            }
            TxAction::Abandoned(err) => {
                warn!("Detector[{}]: {}", self.config.name, err);
                metrics::counter!(metric_defs::FRAMES_ABANDONED.name, &self.labels.to_labels())
                    .increment(1);
            }
        }
        Ok(())
    }

    fn handle_event(&mut self, event: RxEvent) -> DetectorResult<()> {
        let labels = self.labels.to_labels();
        match event {
            RxEvent::Ack => {
                metrics::counter!(metric_defs::ACKS_RECEIVED.name, &labels).increment(1);
                match self.scheduler.acknowledge(self.now) {
                    Some(latency) => {
                        metrics::histogram!(metric_defs::ACK_LATENCY.name, &labels)
                            .record(latency.as_secs_f64() * 1000.0);
                    }
                    None => debug!("Detector[{}]: ACK before first send", self.config.name),
                }
            }
            RxEvent::Nak => {
                metrics::counter!(metric_defs::NAKS_RECEIVED.name, &labels).increment(1);
                self.scheduler.reject();
            }
            RxEvent::Frame(frame) => self.handle_frame(&frame)?,
            RxEvent::Rejected(err) => self.reject_frame(&err)?,
        }
        Ok(())
    }

    fn handle_frame(&mut self, frame: &Frame) -> DetectorResult<()> {
        let command = format!("0x{:02X}", frame.command);
        metrics::counter!(
            metric_defs::FRAMES_RECEIVED.name,
            &self.labels.with(&[("command", command)])
        )
        .increment(1);

        match self.processor.process(frame, self.now) {
            Ok(response) => {
                self.transport.write_byte(ACK)?;
                metrics::counter!(metric_defs::ACKS_SENT.name, &self.labels.to_labels())
                    .increment(1);
                if let Some(response) = response {
                    self.queue_response(&response);
                }
                Ok(())
            }
            Err(err) => self.reject_frame(&err),
        }
    }

    fn reject_frame(&mut self, err: &ProtocolError) -> DetectorResult<()> {
        warn!("Detector[{}]: rejecting frame: {}", self.config.name, err);
        self.transport.write_byte(NAK)?;
        metrics::counter!(
            metric_defs::FRAMES_REJECTED.name,
            &self.labels.with(&[("reason", err.reason().to_string())])
        )
        .increment(1);
        metrics::counter!(metric_defs::NAKS_SENT.name, &self.labels.to_labels()).increment(1);
        Ok(())
    }

    fn queue_response(&mut self, response: &Response) {
        if let Response::Status { .. } = response {
            self.published = (self.processor.local(), self.processor.remote());
            self.last_status_at = Some(self.now);
        }
        self.scheduler.enqueue(&response.to_frame());
    }

    fn check_auto_status(&mut self) {
        let Some(interval) = self.config.status_interval() else {
            return;
        };
        match self.last_status_at {
            None => self.last_status_at = Some(self.now),
            Some(at) if self.scheduler.is_idle() && self.now.saturating_sub(at) >= interval => {
                debug!("Detector[{}]: periodic status report", self.config.name);
                self.push_status();
            }
            Some(_) => {}
        }
    }
}
