//! Capture replay source.
//!
//! Plays back a JSONL capture of tracking frames the way the live driver
//! would deliver them: `Connected` and `DeviceFound` first, frames paced
//! at the capture's framerate, `ConnectionLost` at end of file. End of
//! file deliberately looks like the driver going away, so the bridge runs
//! the same shutdown path it would in production.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

use tokio::time::{Interval, interval};
use tracing::{debug, info};

use crate::error::{BridgeError, Result};
use crate::source::{DeviceEvent, DeviceSource, PolicyFlags};
use crate::types::TrackingFrame;

/// Pacing used when the capture does not carry a usable framerate.
const DEFAULT_FRAMERATE: f64 = 90.0;

/// Device source that replays a recorded capture file.
#[derive(Debug)]
pub struct ReplaySource {
    intro: VecDeque<DeviceEvent>,
    frames: VecDeque<TrackingFrame>,
    interval: Interval,
    finished: bool,
    closed: bool,
}

impl ReplaySource {
    /// Load a capture file: one JSON tracking frame per line.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).map_err(|source| BridgeError::capture(path.to_path_buf(), source))?;
        let reader = BufReader::new(file);

        let mut frames = VecDeque::new();
        for (index, line) in reader.lines().enumerate() {
            let line =
                line.map_err(|source| BridgeError::capture(path.to_path_buf(), source))?;
            if line.trim().is_empty() {
                continue;
            }
            let frame: TrackingFrame = serde_json::from_str(&line)
                .map_err(|source| BridgeError::CaptureParse { line: index + 1, source })?;
            frames.push_back(frame);
        }

        let rate = frames
            .front()
            .map(|frame| frame.framerate as f64)
            .filter(|rate| rate.is_finite() && *rate > 0.0)
            .unwrap_or(DEFAULT_FRAMERATE);

        info!(path = %path.display(), frames = frames.len(), rate, "capture loaded");

        Ok(Self {
            intro: VecDeque::from([DeviceEvent::Connected, DeviceEvent::DeviceFound]),
            frames,
            interval: interval(Duration::from_secs_f64(1.0 / rate)),
            finished: false,
            closed: false,
        })
    }

    /// Frames left to play.
    pub fn remaining_frames(&self) -> usize {
        self.frames.len()
    }
}

#[async_trait::async_trait]
impl DeviceSource for ReplaySource {
    async fn next_event(&mut self, timeout: Duration) -> Result<DeviceEvent> {
        if self.closed {
            tokio::time::sleep(timeout).await;
            return Err(BridgeError::PollTimeout);
        }

        if let Some(event) = self.intro.pop_front() {
            return Ok(event);
        }

        match self.frames.pop_front() {
            Some(frame) => {
                self.interval.tick().await;
                Ok(DeviceEvent::Tracking(frame))
            }
            None if !self.finished => {
                self.finished = true;
                debug!("capture exhausted, reporting connection lost");
                Ok(DeviceEvent::ConnectionLost)
            }
            None => {
                tokio::time::sleep(timeout).await;
                Err(BridgeError::PollTimeout)
            }
        }
    }

    fn set_policy(&mut self, flags: PolicyFlags) -> Result<()> {
        debug!(flags = flags.bits(), "policy flags accepted");
        Ok(())
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            info!("replay source closed");
        }
    }
}
