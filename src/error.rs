//! Error types for the bridge pipeline.
//!
//! One taxonomy covers the whole pipeline:
//!
//! - **Startup errors**: the driver connection could not be created or
//!   opened — the process cannot proceed.
//! - **Poll errors**: transient driver states, swallowed at the polling
//!   site; [`BridgeError::PollTimeout`] is not a failure at all, just a
//!   retry signal.
//! - **Peer errors**: the listening endpoint failed or the lone consumer
//!   went away — always fatal, there is no reconnection.
//! - **Capture errors**: the replay source could not read or parse its
//!   capture file.
//!
//! [`BridgeError::is_fatal`] encodes the propagation policy: everything
//! fatal is converted into "stop the acquisition loop" and the process
//! unwinds through the fixed teardown order.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::source::DriverStatus;

/// Result type alias for bridge operations.
pub type Result<T, E = BridgeError> = std::result::Result<T, E>;

/// Main error type for bridge operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BridgeError {
    /// The driver connection could not be created.
    #[error("failed to create driver connection: {status}")]
    ConnectFailed { status: DriverStatus },

    /// The driver connection could not be opened.
    #[error("failed to open driver connection: {status}")]
    OpenFailed { status: DriverStatus },

    /// No driver event arrived within the poll timeout. A retry signal,
    /// not a failure.
    #[error("no driver event within the poll timeout")]
    PollTimeout,

    /// Transient driver error while polling; the loop logs and continues.
    #[error("driver poll error: {status}")]
    Poll { status: DriverStatus },

    /// The listening endpoint could not be bound.
    #[error("failed to bind listener on {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The single consumer connection could not be accepted.
    #[error("failed to accept the consumer connection")]
    Accept {
        #[source]
        source: std::io::Error,
    },

    /// The lone consumer is gone. Fatal for the rest of the process
    /// lifetime; the delivery slot stays empty.
    #[error("peer connection lost")]
    PeerGone {
        #[source]
        source: std::io::Error,
    },

    /// The capture file could not be read.
    #[error("capture file error: {path}")]
    Capture {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A capture line is not a valid tracking frame.
    #[error("capture parse error at line {line}")]
    CaptureParse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl BridgeError {
    /// Whether this error must tear the whole session down.
    ///
    /// Transient poll errors never surface past the polling call; timeouts
    /// are retried immediately. Everything else stops the pipeline.
    pub fn is_fatal(&self) -> bool {
        match self {
            BridgeError::PollTimeout | BridgeError::Poll { .. } => false,
            BridgeError::ConnectFailed { .. }
            | BridgeError::OpenFailed { .. }
            | BridgeError::Bind { .. }
            | BridgeError::Accept { .. }
            | BridgeError::PeerGone { .. }
            | BridgeError::Capture { .. }
            | BridgeError::CaptureParse { .. } => true,
        }
    }

    /// Helper constructor for driver connect failures.
    pub fn connect_failed(status: DriverStatus) -> Self {
        BridgeError::ConnectFailed { status }
    }

    /// Helper constructor for driver open failures.
    pub fn open_failed(status: DriverStatus) -> Self {
        BridgeError::OpenFailed { status }
    }

    /// Helper constructor for transient poll errors.
    pub fn poll(status: DriverStatus) -> Self {
        BridgeError::Poll { status }
    }

    /// Helper constructor for peer write failures.
    pub fn peer_gone(source: std::io::Error) -> Self {
        BridgeError::PeerGone { source }
    }

    /// Helper constructor for bind failures with address context.
    pub fn bind(addr: SocketAddr, source: std::io::Error) -> Self {
        BridgeError::Bind { addr, source }
    }

    /// Helper constructor for capture file errors with path context.
    pub fn capture(path: PathBuf, source: std::io::Error) -> Self {
        BridgeError::Capture { path, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn error_traits_validation() {
        // Compile-time check: BridgeError must be Send + Sync + 'static
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<BridgeError>();

        let error = BridgeError::poll(DriverStatus::NotConnected);
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn fatality_follows_the_propagation_policy() {
        assert!(!BridgeError::PollTimeout.is_fatal());
        assert!(!BridgeError::poll(DriverStatus::ConcurrentPoll).is_fatal());

        assert!(BridgeError::connect_failed(DriverStatus::NotConnected).is_fatal());
        assert!(BridgeError::open_failed(DriverStatus::CannotOpenDevice).is_fatal());
        assert!(
            BridgeError::peer_gone(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
                .is_fatal()
        );
        assert!(
            BridgeError::Accept {
                source: std::io::Error::from(std::io::ErrorKind::ConnectionReset)
            }
            .is_fatal()
        );
    }

    #[test]
    fn peer_gone_preserves_the_io_source() {
        let error =
            BridgeError::peer_gone(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "EPIPE"));
        let source = std::error::Error::source(&error).expect("source");
        assert_eq!(source.to_string(), "EPIPE");
    }

    proptest! {
        #[test]
        fn display_names_any_driver_status(code in any::<i32>()) {
            let status = DriverStatus::Other(code);
            let message = BridgeError::poll(status).to_string();
            prop_assert!(message.contains(&code.to_string()));
            prop_assert!(!BridgeError::poll(status).is_fatal());
            prop_assert!(BridgeError::connect_failed(status).is_fatal());
        }
    }
}
