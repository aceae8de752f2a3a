//! Scripted device source for tests and demos.
//!
//! Yields a fixed sequence of events, errors, and empty-queue polls, and
//! counts collaborator calls so tests can verify shutdown behavior (how
//! many times the session was closed, how many polls happened).

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use crate::error::{BridgeError, Result};
use crate::source::{DeviceEvent, DeviceSource, PolicyFlags};

/// One scripted poll result.
#[derive(Debug)]
pub enum Step {
    /// Deliver this event.
    Event(DeviceEvent),
    /// Fail the poll with this error.
    Error(BridgeError),
    /// Behave like an empty driver queue for one poll: wait out the
    /// timeout, then report it.
    Timeout,
}

/// Collaborator call counts, shared with the test that built the source.
#[derive(Debug, Default)]
pub struct ScriptedCounters {
    polls: AtomicU32,
    policy_calls: AtomicU32,
    close_calls: AtomicU32,
}

impl ScriptedCounters {
    pub fn polls(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn policy_calls(&self) -> u32 {
        self.policy_calls.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> u32 {
        self.close_calls.load(Ordering::SeqCst)
    }
}

/// Device source that replays a fixed script.
///
/// Once the script runs dry every further poll waits out the timeout and
/// reports it, like a healthy driver with nothing to say.
pub struct ScriptedSource {
    steps: VecDeque<Step>,
    counters: Arc<ScriptedCounters>,
}

impl ScriptedSource {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps: steps.into(), counters: Arc::new(ScriptedCounters::default()) }
    }

    /// Shared counters for asserting collaborator calls after the fact.
    pub fn counters(&self) -> Arc<ScriptedCounters> {
        Arc::clone(&self.counters)
    }
}

#[async_trait::async_trait]
impl DeviceSource for ScriptedSource {
    async fn next_event(&mut self, timeout: Duration) -> Result<DeviceEvent> {
        self.counters.polls.fetch_add(1, Ordering::SeqCst);
        match self.steps.pop_front() {
            Some(Step::Event(event)) => Ok(event),
            Some(Step::Error(err)) => Err(err),
            Some(Step::Timeout) | None => {
                // Driver-side wait, not a spin loop.
                tokio::time::sleep(timeout).await;
                Err(BridgeError::PollTimeout)
            }
        }
    }

    fn set_policy(&mut self, _flags: PolicyFlags) -> Result<()> {
        self.counters.policy_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&mut self) {
        self.counters.close_calls.fetch_add(1, Ordering::SeqCst);
    }
}
