//! Acquisition loop: device session → encoder → delivery.
//!
//! The loop is the only actor that calls into the device source and the
//! delivery channel. It blocks on the driver's event queue, encodes every
//! tracking frame into one bounded record, and writes it to the lone peer
//! when one is attached. Shutdown is cooperative: the run flag is observed
//! at the top of each iteration, never preemptively.

use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::delivery::DeliveryChannel;
use crate::encode::encode_frame;
use crate::error::BridgeError;
use crate::source::{DeviceEvent, DeviceSource, PolicyFlags};
use crate::types::SessionState;

/// Interval between throughput heartbeat log lines.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);

/// Run/stop states of the acquisition loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Constructed, not yet polling.
    Idle,
    /// Blocking on the driver's event queue.
    Polling,
    /// Terminal; the loop never restarts itself.
    Stopped,
}

/// How the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOutcome {
    /// The driver reported the session over; the natural end of streaming.
    DriverEnded,
    /// The consumer went away mid-session.
    PeerLost,
    /// The driver returned a fatal error outside the event protocol.
    Faulted,
    /// The run flag was cleared from outside the loop.
    Cancelled,
}

impl LoopOutcome {
    /// Whether the process may exit zero after this outcome.
    pub fn is_clean(self) -> bool {
        matches!(self, LoopOutcome::DriverEnded | LoopOutcome::Cancelled)
    }
}

/// Handle to a spawned acquisition loop.
pub struct BridgeHandle<S> {
    run: CancellationToken,
    task: JoinHandle<(LoopOutcome, S)>,
}

impl<S: DeviceSource> BridgeHandle<S> {
    /// The shared run flag; clearing it stops the loop at the next
    /// iteration boundary.
    pub fn run_flag(&self) -> CancellationToken {
        self.run.clone()
    }

    /// Wait for the loop to stop and take the device source back so
    /// teardown can close it in the fixed order.
    pub async fn join(self) -> (LoopOutcome, Option<S>) {
        match self.task.await {
            Ok((outcome, source)) => (outcome, Some(source)),
            Err(err) => {
                error!(error = %err, "acquisition loop task failed");
                (LoopOutcome::Faulted, None)
            }
        }
    }
}

/// The background worker driving source → encoder → delivery.
pub struct AcquisitionLoop<S> {
    source: S,
    channel: DeliveryChannel,
    run: CancellationToken,
    poll_timeout: Duration,
    record_capacity: usize,
    policy: PolicyFlags,
}

impl<S: DeviceSource> AcquisitionLoop<S> {
    /// Build a loop over an opened device source.
    pub fn new(
        source: S,
        channel: DeliveryChannel,
        poll_timeout: Duration,
        record_capacity: usize,
    ) -> Self {
        Self {
            source,
            channel,
            run: CancellationToken::new(),
            poll_timeout,
            record_capacity,
            policy: PolicyFlags::BACKGROUND_FRAMES,
        }
    }

    /// Override the policy flags requested from the driver at startup.
    pub fn with_policy(mut self, policy: PolicyFlags) -> Self {
        self.policy = policy;
        self
    }

    /// Share an externally created run flag instead of the loop's own.
    ///
    /// Lets the acceptor and the loop observe the same flag even before
    /// the loop is spawned.
    pub fn with_run_flag(mut self, run: CancellationToken) -> Self {
        self.run = run;
        self
    }

    /// Spawn the loop onto the runtime.
    pub fn spawn(self) -> BridgeHandle<S> {
        let run = self.run.clone();
        let task = tokio::spawn(self.run_loop());
        BridgeHandle { run, task }
    }

    async fn run_loop(mut self) -> (LoopOutcome, S) {
        let mut state = LoopState::Idle;
        trace!(state = ?state, "acquisition loop constructed");
        let mut session = SessionState::Open;
        let mut frames_seen = 0u64;
        let mut frames_sent = 0u64;
        let started = Instant::now();
        let mut last_heartbeat = started;

        // Background capture is an optimization, not a correctness
        // requirement; a rejection must not stop the pipeline.
        if let Err(err) = self.source.set_policy(self.policy) {
            warn!(error = %err, "policy request rejected, continuing without it");
        }

        state = LoopState::Polling;
        info!(state = ?state, "acquisition loop started");

        let outcome = loop {
            if self.run.is_cancelled() {
                info!("run flag cleared, stopping acquisition");
                break LoopOutcome::Cancelled;
            }

            let event = match self.source.next_event(self.poll_timeout).await {
                Ok(event) => event,
                Err(BridgeError::PollTimeout) => {
                    trace!("poll timeout, no event yet");
                    continue;
                }
                Err(err) if !err.is_fatal() => {
                    // Transient driver errors never surface past this
                    // point; the driver queue is assumed self-healing.
                    warn!(error = %err, "driver poll error, continuing");
                    continue;
                }
                Err(err) => {
                    error!(error = %err, "fatal driver error, stopping");
                    self.run.cancel();
                    break LoopOutcome::Faulted;
                }
            };

            let next = session.on_event(&event);
            if next != session {
                info!(from = ?session, to = ?next, "session state changed");
                session = next;
            }

            match event {
                DeviceEvent::Connected => {
                    info!("connected to tracking service");
                }
                DeviceEvent::DeviceFound => {
                    info!("tracking device found");
                }
                DeviceEvent::DeviceLost => {
                    // Tracking may resume when the device returns.
                    warn!("tracking device lost, continuing to poll");
                }
                DeviceEvent::Other => {
                    trace!("ignoring unhandled driver event");
                }
                DeviceEvent::ConnectionLost => {
                    warn!("connection to tracking service lost, stopping");
                    self.run.cancel();
                    break LoopOutcome::DriverEnded;
                }
                DeviceEvent::Tracking(frame) => {
                    frames_seen += 1;
                    trace!(frame_id = frame.frame_id, hands = frame.hands.len(), "tracking frame");

                    let record = encode_frame(&frame, self.record_capacity);
                    if record.is_empty() {
                        debug!(frame_id = frame.frame_id, "record capacity too small, frame dropped");
                    } else if self.channel.attached() {
                        if let Err(err) = self.channel.write(&record).await {
                            error!(error = %err, "peer write failed, stopping");
                            self.run.cancel();
                            break LoopOutcome::PeerLost;
                        }
                        frames_sent += 1;
                    }
                    // Frames are dropped silently while no consumer is
                    // attached.

                    if last_heartbeat.elapsed() >= HEARTBEAT_INTERVAL {
                        debug!(
                            frames_seen,
                            frames_sent,
                            elapsed_s = started.elapsed().as_secs(),
                            "throughput heartbeat"
                        );
                        last_heartbeat = Instant::now();
                    }
                }
            }
        };

        state = LoopState::Stopped;
        info!(state = ?state, frames_seen, frames_sent, outcome = ?outcome, "acquisition loop stopped");

        // Scoped release on every exit path: peer first, then the driver
        // session. Both are idempotent.
        let AcquisitionLoop { mut source, mut channel, .. } = self;
        channel.close().await;
        source.close().await;

        (outcome, source)
    }
}
