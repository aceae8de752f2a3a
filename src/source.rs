//! Device source contract and driver-reported event types
//!
//! The bridge treats the tracking driver as an opaque blocking queue of
//! events behind the [`DeviceSource`] trait: poll, act on the event,
//! repeat. Implementations own the lifecycle of one driver connection;
//! there is no reconnection anywhere in this design.

use std::fmt;
use std::time::Duration;

use crate::Result;
use crate::types::TrackingFrame;

/// Driver status codes surfaced by connect and poll failures.
///
/// Mirrors the tracking service's result codes; codes the bridge has no
/// name for travel as [`DriverStatus::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverStatus {
    UnknownError,
    InvalidArgument,
    InsufficientResources,
    InsufficientBuffer,
    NotConnected,
    HandshakeIncomplete,
    ConcurrentPoll,
    NotStreaming,
    CannotOpenDevice,
    Other(i32),
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverStatus::UnknownError => f.write_str("unknown error"),
            DriverStatus::InvalidArgument => f.write_str("invalid argument"),
            DriverStatus::InsufficientResources => f.write_str("insufficient resources"),
            DriverStatus::InsufficientBuffer => f.write_str("insufficient buffer"),
            DriverStatus::NotConnected => f.write_str("not connected"),
            DriverStatus::HandshakeIncomplete => f.write_str("handshake incomplete"),
            DriverStatus::ConcurrentPoll => f.write_str("concurrent poll"),
            DriverStatus::NotStreaming => f.write_str("not streaming"),
            DriverStatus::CannotOpenDevice => f.write_str("cannot open device"),
            DriverStatus::Other(code) => write!(f, "driver status {code}"),
        }
    }
}

/// Policy flags requested from the driver.
///
/// Policies are optimization hints, not correctness requirements; a driver
/// that rejects them still streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PolicyFlags(u32);

impl PolicyFlags {
    /// Keep frames flowing while the consumer application is unfocused.
    pub const BACKGROUND_FRAMES: PolicyFlags = PolicyFlags(1 << 0);

    pub const fn empty() -> Self {
        PolicyFlags(0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: PolicyFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: PolicyFlags) -> PolicyFlags {
        PolicyFlags(self.0 | other.0)
    }
}

/// One event from the driver's queue.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    /// Tracking-capable connection to the service established.
    Connected,
    /// Connection to the service lost. The only event that terminates the
    /// acquisition loop.
    ConnectionLost,
    /// A tracking device appeared.
    DeviceFound,
    /// The tracking device went away; tracking may later resume.
    DeviceLost,
    /// One tracking frame.
    Tracking(TrackingFrame),
    /// Event kinds the bridge does not act on (images, policy echoes, ...).
    Other,
}

/// Blocking source of driver events.
///
/// The acquisition loop is the only caller. Timing lives inside the
/// implementation: a poll waits driver-side up to the given timeout, so
/// the loop never spins.
#[async_trait::async_trait]
pub trait DeviceSource: Send + 'static {
    /// Wait up to `timeout` for the next driver event.
    ///
    /// Returns [`BridgeError::PollTimeout`] when no event arrived in time;
    /// that is a retry signal, not a failure. Any other error is logged by
    /// the caller and polling continues — the driver queue is assumed
    /// self-healing for transient errors.
    ///
    /// [`BridgeError::PollTimeout`]: crate::BridgeError::PollTimeout
    async fn next_event(&mut self, timeout: Duration) -> Result<DeviceEvent>;

    /// Request driver policy flags. Best-effort: a failure is logged by the
    /// caller and is never fatal.
    fn set_policy(&mut self, flags: PolicyFlags) -> Result<()>;

    /// Release the driver connection.
    ///
    /// Idempotent. The acquisition loop calls this on every exit path, and
    /// process teardown may call it again.
    async fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_flags_combine() {
        let flags = PolicyFlags::empty().union(PolicyFlags::BACKGROUND_FRAMES);
        assert!(flags.contains(PolicyFlags::BACKGROUND_FRAMES));
        assert_eq!(flags.bits(), 1);
        assert!(!PolicyFlags::empty().contains(PolicyFlags::BACKGROUND_FRAMES));
    }

    #[test]
    fn driver_status_display_names_the_code() {
        assert_eq!(DriverStatus::NotConnected.to_string(), "not connected");
        assert_eq!(DriverStatus::Other(-17).to_string(), "driver status -17");
    }
}
