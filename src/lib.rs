//! Local bridge that republishes hand-tracking frames to one consumer.
//!
//! Handlink sits between a hand-tracking device driver and a single local
//! consumer process: a background acquisition loop blocks on the driver's
//! event queue, every tracking frame is re-encoded into one bounded,
//! newline-terminated JSON record, and records are written to the lone
//! TCP peer on `127.0.0.1`.
//!
//! # Features
//!
//! - **Bounded encoding**: records never exceed a configured capacity;
//!   truncation drops whole hands and keeps the record complete JSON
//! - **Single consumer**: one peer per process lifetime, installed once,
//!   never replaced
//! - **Graceful degradation**: frames drop silently while unconnected;
//!   peer loss and driver loss both end in one orderly shutdown
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use handlink::{Acceptor, AcquisitionLoop, DeliveryChannel, ReplaySource};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let source = ReplaySource::open("session.jsonl")?;
//!     let (channel, peer_tx) = DeliveryChannel::new();
//!     let handle =
//!         AcquisitionLoop::new(source, channel, Duration::from_millis(1000), 4096).spawn();
//!
//!     let acceptor = Acceptor::bind(8000)?;
//!     let run: CancellationToken = handle.run_flag();
//!     let listener = acceptor.accept_one(peer_tx, &run).await?;
//!
//!     let (outcome, _source) = handle.join().await;
//!     drop(listener);
//!     println!("bridge stopped: {outcome:?}");
//!     Ok(())
//! }
//! ```

pub mod acceptor;
pub mod bridge;
pub mod config;
pub mod delivery;
pub mod encode;
mod error;
pub mod source;
pub mod sources;
pub mod types;

// Core exports
pub use error::{BridgeError, Result};
pub use types::*;

// Pipeline exports
pub use acceptor::Acceptor;
pub use bridge::{AcquisitionLoop, BridgeHandle, LoopOutcome, LoopState};
pub use config::{Config, ConfigError};
pub use delivery::{DeliveryChannel, PeerSender};
pub use encode::{DEFAULT_RECORD_CAPACITY, EncodedRecord, RecordBuffer, RecordFull, encode_frame};
pub use source::{DeviceEvent, DeviceSource, DriverStatus, PolicyFlags};
pub use sources::{ReplaySource, ScriptedSource};
