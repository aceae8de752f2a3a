//! Core types for hand-tracking data representation.
//!
//! This module provides the foundational data structures flowing through
//! the bridge:
//! - [`TrackingFrame`], [`Hand`], and [`Finger`] mirror what the device
//!   driver reports, in device-reported order
//! - [`SessionState`] models the lifecycle of the driver connection
//!
//! Frame types derive serde traits for capture files and test fixtures;
//! the wire encoder in [`crate::encode`] never goes through serde.

mod frame;
mod session_state;

pub use frame::{FINGER_NAMES, Finger, Hand, HandSide, Quat, TrackingFrame, Vec3};
pub use session_state::SessionState;
