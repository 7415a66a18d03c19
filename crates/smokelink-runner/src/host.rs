//! Host poll loop: ticks a detector against the wall clock until stopped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use smokelink_detector::{Detector, DetectorResult, Transport};
use tracing::{debug, info};

/// Drives [`Detector::tick`] with the elapsed time since the loop started.
///
/// The loop spins while inbound bytes are waiting and sleeps for the tick
/// interval otherwise.
#[derive(Debug)]
pub struct PollLoop {
    tick_interval: Duration,
    running: Arc<AtomicBool>,
    start: Instant,
}

/// Counters reported when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub ticks: u64,
    pub elapsed: Duration,
}

impl PollLoop {
    pub fn new(tick_interval: Duration) -> Self {
        PollLoop {
            tick_interval,
            running: Arc::new(AtomicBool::new(true)),
            start: Instant::now(),
        }
    }

    /// Flag that stops the loop when cleared. Hand it to a signal handler.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Time since the loop was created, as passed to `tick`.
    pub fn now(&self) -> Duration {
        self.start.elapsed()
    }

    /// Run until the stop flag is cleared or the transport fails.
    pub fn run<T: Transport>(&self, detector: &mut Detector<T>) -> DetectorResult<LoopStats> {
        info!("Detector[{}]: poll loop started", detector.name());
        let mut ticks = 0u64;

        while self.running.load(Ordering::SeqCst) {
            detector.tick(self.now())?;
            ticks += 1;
            if !detector.transport_mut().available()? {
                std::thread::sleep(self.tick_interval);
            }
        }

        let stats = LoopStats {
            ticks,
            elapsed: self.now(),
        };
        debug!("Detector[{}]: poll loop stopped: {:?}", detector.name(), stats);
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smokelink_detector::{DetectorConfig, MemoryTransport};
    use smokelink_protocol::{Frame, ACK, ETX, STX};

    #[test]
    fn test_stops_when_flag_cleared() {
        let poll = PollLoop::new(Duration::from_millis(1));
        poll.stop_handle().store(false, Ordering::SeqCst);

        let mut detector = Detector::new(DetectorConfig::default(), MemoryTransport::new()).unwrap();
        let stats = poll.run(&mut detector).unwrap();
        assert_eq!(stats.ticks, 0);
    }

    #[test]
    fn test_handler_can_stop_loop() {
        let poll = PollLoop::new(Duration::from_millis(1));
        let stop = poll.stop_handle();

        let mut detector = Detector::new(DetectorConfig::default(), MemoryTransport::new()).unwrap();
        detector.set_on_alarm(move |_| stop.store(false, Ordering::SeqCst));

        let mut bytes = vec![STX];
        bytes.extend_from_slice(Frame::new(0x03, vec![0x00, 0x10]).to_text().as_bytes());
        bytes.push(ETX);
        detector.transport_mut().push_inbound(&bytes);

        let stats = poll.run(&mut detector).unwrap();
        assert_eq!(stats.ticks, bytes.len() as u64);
        assert_eq!(detector.transport().outbound(), &[ACK]);
    }
}
