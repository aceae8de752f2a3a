//! Tracking frame types reported by the device driver
//!
//! A [`TrackingFrame`] is one immutable snapshot of everything the device
//! saw: a monotonically increasing frame id, the capture framerate, and the
//! hands in device-reported order. Hand order is not guaranteed stable
//! across frames for the same physical hand, so nothing downstream may
//! sort or reorder it.

use serde::{Deserialize, Serialize};

/// Canonical finger names in fixed anatomical order.
///
/// Every hand carries exactly five fingers in this order; the encoder keys
/// its `fingers` and `fingerExtended` maps with these names.
pub const FINGER_NAMES: [&str; 5] = ["thumb", "index", "middle", "ring", "pinky"];

/// 3D vector in device coordinate space.
///
/// Units are millimeters for positions and mm/s for velocities.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Unit quaternion describing palm orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Identity rotation.
    pub const IDENTITY: Quat = Quat::new(0.0, 0.0, 0.0, 1.0);
}

impl Default for Quat {
    fn default() -> Self {
        Quat::IDENTITY
    }
}

/// Which physical hand a [`Hand`] record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandSide {
    Left,
    Right,
}

impl HandSide {
    /// Wire token carried in the `type` field of encoded records.
    pub const fn as_str(self) -> &'static str {
        match self {
            HandSide::Left => "left",
            HandSide::Right => "right",
        }
    }
}

/// One tracked finger.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Finger {
    /// Tip position: the far joint of the distal bone.
    pub tip_position: Vec3,
    /// Whether the device reports the finger as extended.
    pub is_extended: bool,
}

/// One tracked hand.
///
/// `id` is device-assigned and stable across frames while the hand stays in
/// view; ids are reused after a hand leaves and re-enters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hand {
    pub id: u32,
    pub side: HandSide,
    /// Palm center in device coordinates (mm).
    pub palm_position: Vec3,
    /// Smoothed palm position used for steadier pointing (mm).
    pub palm_stabilized: Vec3,
    /// Palm velocity (mm/s).
    pub palm_velocity: Vec3,
    /// Palm orientation as a unit quaternion.
    pub palm_orientation: Quat,
    /// Grab strength in [0, 1].
    pub grab_strength: f32,
    /// Pinch strength in [0, 1].
    pub pinch_strength: f32,
    /// Thumb-to-index distance in millimeters.
    pub pinch_distance: f32,
    /// Grab angle in radians.
    pub grab_angle: f32,
    /// Exactly five fingers, ordered as [`FINGER_NAMES`].
    pub fingers: [Finger; 5],
}

/// One immutable snapshot of all detected hands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingFrame {
    /// Monotonically increasing frame id assigned by the driver.
    pub frame_id: i64,
    /// Capture framerate in frames per second.
    pub framerate: f32,
    /// Hands in device-reported order.
    pub hands: Vec<Hand>,
}

impl TrackingFrame {
    /// Frame with no hands in view.
    pub fn empty(frame_id: i64, framerate: f32) -> Self {
        Self { frame_id, framerate, hands: Vec::new() }
    }
}
