//! Metrics for the smoke detector link emulator.
//!
//! Every metric the detector records is declared here as a const [`Metric`]
//! so names, units and label keys live in one place. The `metrics` crate is
//! re-exported; no recorder is installed by this crate.
//!
//! # Example
//!
//! ```rust,ignore
//! use smokelink_metrics::{describe_metrics, metric_defs, MetricLabels};
//!
//! describe_metrics();
//!
//! let labels = MetricLabels::new("hallway");
//! metrics::counter!(metric_defs::FRAMES_SENT.name, &labels.to_labels()).increment(1);
//! ```

pub use metrics;

use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};

/// The kind of metric (counter, gauge, or histogram).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// A monotonically increasing counter.
    Counter,
    /// A gauge that can go up and down.
    Gauge,
    /// A histogram for recording distributions.
    Histogram,
}

impl MetricKind {
    /// Returns the kind as a lowercase string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric declaration with its metadata.
///
/// ```rust
/// use smokelink_metrics::{Metric, MetricKind};
/// use metrics::Unit;
///
/// const RETRIES: Metric = Metric::counter("smokelink.tx.retries")
///     .with_description("Retransmitted frames")
///     .with_unit(Unit::Count)
///     .with_labels(&["detector"]);
///
/// assert_eq!(RETRIES.kind, MetricKind::Counter);
/// ```
#[derive(Debug, Clone)]
pub struct Metric {
    /// The metric name (e.g., "smokelink.tx.frames").
    pub name: &'static str,
    /// The kind of metric.
    pub kind: MetricKind,
    /// Human-readable description.
    pub description: &'static str,
    /// The unit of measurement (optional).
    pub unit: Option<Unit>,
    /// Expected label keys.
    pub labels: &'static [&'static str],
}

impl Metric {
    const fn with_kind(name: &'static str, kind: MetricKind) -> Self {
        Self {
            name,
            kind,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Creates a new counter metric with the given name.
    pub const fn counter(name: &'static str) -> Self {
        Self::with_kind(name, MetricKind::Counter)
    }

    /// Creates a new gauge metric with the given name.
    pub const fn gauge(name: &'static str) -> Self {
        Self::with_kind(name, MetricKind::Gauge)
    }

    /// Creates a new histogram metric with the given name.
    pub const fn histogram(name: &'static str) -> Self {
        Self::with_kind(name, MetricKind::Histogram)
    }

    /// Sets the description for the metric.
    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the unit for the metric.
    pub const fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Sets the expected label keys for the metric.
    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// Registers this metric's description with the installed recorder.
    pub fn describe(&self) {
        match (self.kind, self.unit) {
            (MetricKind::Counter, Some(unit)) => {
                describe_counter!(self.name, unit, self.description);
            }
            (MetricKind::Counter, None) => {
                describe_counter!(self.name, self.description);
            }
            (MetricKind::Gauge, Some(unit)) => {
                describe_gauge!(self.name, unit, self.description);
            }
            (MetricKind::Gauge, None) => {
                describe_gauge!(self.name, self.description);
            }
            (MetricKind::Histogram, Some(unit)) => {
                describe_histogram!(self.name, unit, self.description);
            }
            (MetricKind::Histogram, None) => {
                describe_histogram!(self.name, self.description);
            }
        }
    }
}

/// All metric definitions recorded by the detector.
pub mod metric_defs {
    use super::{Metric, Unit};

    /// Labels present on every detector metric.
    pub const STANDARD_LABELS: &[&str] = &["detector"];

    // ========================================================================
    // Receive Path
    // ========================================================================

    /// Valid frames received, by command name.
    pub const FRAMES_RECEIVED: Metric = Metric::counter("smokelink.rx.frames")
        .with_description("Frames received with a valid checksum")
        .with_unit(Unit::Count)
        .with_labels(&["detector", "command"]);

    /// Frames rejected with NAK, by reason.
    pub const FRAMES_REJECTED: Metric = Metric::counter("smokelink.rx.rejected")
        .with_description("Inbound frames answered with NAK")
        .with_unit(Unit::Count)
        .with_labels(&["detector", "reason"]);

    /// ACK bytes received from the base station.
    pub const ACKS_RECEIVED: Metric = Metric::counter("smokelink.rx.acks")
        .with_description("ACK bytes received")
        .with_unit(Unit::Count)
        .with_labels(&["detector"]);

    /// NAK bytes received from the base station.
    pub const NAKS_RECEIVED: Metric = Metric::counter("smokelink.rx.naks")
        .with_description("NAK bytes received")
        .with_unit(Unit::Count)
        .with_labels(&["detector"]);

    // ========================================================================
    // Transmit Path
    // ========================================================================

    /// Frames written to the transport, including retransmissions.
    pub const FRAMES_SENT: Metric = Metric::counter("smokelink.tx.frames")
        .with_description("Frames written to the transport")
        .with_unit(Unit::Count)
        .with_labels(&["detector"]);

    /// Frames written again after an ACK timeout or NAK.
    pub const RETRANSMISSIONS: Metric = Metric::counter("smokelink.tx.retransmissions")
        .with_description("Frames retransmitted after ACK timeout or NAK")
        .with_unit(Unit::Count)
        .with_labels(&["detector"]);

    /// Frames dropped after the retry ceiling.
    pub const FRAMES_ABANDONED: Metric = Metric::counter("smokelink.tx.abandoned")
        .with_description("Frames dropped without ever being acknowledged")
        .with_unit(Unit::Count)
        .with_labels(&["detector"]);

    /// ACK bytes sent in answer to inbound frames.
    pub const ACKS_SENT: Metric = Metric::counter("smokelink.tx.acks")
        .with_description("ACK bytes sent")
        .with_unit(Unit::Count)
        .with_labels(&["detector"]);

    /// NAK bytes sent in answer to inbound frames.
    pub const NAKS_SENT: Metric = Metric::counter("smokelink.tx.naks")
        .with_description("NAK bytes sent")
        .with_unit(Unit::Count)
        .with_labels(&["detector"]);

    /// Time from first transmission to ACK.
    pub const ACK_LATENCY: Metric = Metric::histogram("smokelink.tx.ack_latency_ms")
        .with_description("Time from first transmission of a frame to its ACK")
        .with_unit(Unit::Milliseconds)
        .with_labels(&["detector"]);

    // ========================================================================
    // Application
    // ========================================================================

    /// Notification callbacks fired, by kind (alarm, test_alarm, battery_warning).
    pub const NOTIFICATIONS: Metric = Metric::counter("smokelink.notify.fired")
        .with_description("Notification callbacks fired on remote status edges")
        .with_unit(Unit::Count)
        .with_labels(&["detector", "kind"]);

    /// Returns a slice of all defined metrics.
    pub const ALL: &[&Metric] = &[
        &FRAMES_RECEIVED,
        &FRAMES_REJECTED,
        &ACKS_RECEIVED,
        &NAKS_RECEIVED,
        &FRAMES_SENT,
        &RETRANSMISSIONS,
        &FRAMES_ABANDONED,
        &ACKS_SENT,
        &NAKS_SENT,
        &ACK_LATENCY,
        &NOTIFICATIONS,
    ];
}

/// Labels identifying one emulated detector.
#[derive(Debug, Clone)]
pub struct MetricLabels {
    /// Detector name.
    pub detector: String,
}

impl MetricLabels {
    /// Creates labels for the named detector.
    pub fn new(detector: impl Into<String>) -> Self {
        Self {
            detector: detector.into(),
        }
    }

    /// Converts the labels to the metrics crate label format.
    pub fn to_labels(&self) -> Vec<(&'static str, String)> {
        vec![("detector", self.detector.clone())]
    }

    /// Returns labels with additional key-value pairs.
    pub fn with(&self, extra: &[(&'static str, String)]) -> Vec<(&'static str, String)> {
        let mut labels = self.to_labels();
        labels.extend_from_slice(extra);
        labels
    }
}

/// Describes all metrics with the installed recorder. Call once at startup,
/// after installing a recorder.
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}
