//! Bounded JSON encoding of tracking frames.
//!
//! [`encode_frame`] is a pure transform: one [`TrackingFrame`] in, one
//! newline-terminated JSON record out, never exceeding the caller's
//! capacity. Hands are appended atomically — a hand that does not fit is
//! dropped along with every later hand, and the record is complete JSON
//! either way. Ordering mirrors the input exactly.
//!
//! Numeric formatting is fixed-precision with tiers per field: palm
//! vectors feed visualization and are coarser than the pinch, angle, and
//! quaternion values that feed gesture thresholds.

mod writer;

pub use writer::{RecordBuffer, RecordFull};

use std::fmt::Write as _;

use crate::types::{FINGER_NAMES, Hand, TrackingFrame};

/// Default capacity for encoded records.
///
/// Two fully-populated hands fit comfortably; anything beyond is truncated
/// at hand granularity.
pub const DEFAULT_RECORD_CAPACITY: usize = 4096;

/// Closes the hands array and the record, plus the record separator.
const RECORD_TAIL: &str = "]}\n";

/// One encoded, newline-terminated record ready for the delivery channel.
///
/// An empty record means the frame was dropped whole: the capacity could
/// not hold even the frame envelope. Nothing should be written in that
/// case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRecord(String);

impl EncodedRecord {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Encode one frame into a record of at most `capacity` bytes.
///
/// Pure and deterministic: the same frame and capacity always produce
/// byte-identical output. Hands that do not fit are omitted from the end;
/// every emitted record is syntactically complete. If even the envelope
/// (`{"frameId": ..., "framerate": ..., "hands": []}` plus newline) does
/// not fit, the record comes back empty and the frame is dropped whole.
pub fn encode_frame(frame: &TrackingFrame, capacity: usize) -> EncodedRecord {
    // Reserve the tail up front so closing the record can never overflow.
    let mut out = RecordBuffer::new(capacity.saturating_sub(RECORD_TAIL.len()));

    if out
        .push_fmt(format_args!(
            "{{\"frameId\": {}, \"framerate\": {:.1}, \"hands\": [",
            frame.frame_id, frame.framerate
        ))
        .is_err()
    {
        return EncodedRecord(String::new());
    }

    // Each hand is rendered off to the side and committed only if the whole
    // hand (and its separator) fits.
    let mut scratch = String::new();
    for (index, hand) in frame.hands.iter().enumerate() {
        scratch.clear();
        render_hand(&mut scratch, hand);

        let separator = if index == 0 { "" } else { ", " };
        let mark = out.checkpoint();
        if out.push_str(separator).is_err() || out.push_str(&scratch).is_err() {
            out.rollback_to(mark);
            break;
        }
    }

    let mut record = out.into_string();
    record.push_str(RECORD_TAIL);
    EncodedRecord(record)
}

/// Render one hand object into `out` with the fixed precision tiers.
///
/// Writing into a `String` is infallible; capacity enforcement happens at
/// the commit site in [`encode_frame`].
fn render_hand(out: &mut String, hand: &Hand) {
    let _ = write!(
        out,
        "{{\"id\": {}, \"type\": \"{}\", \"palmPosition\": [{:.2}, {:.2}, {:.2}]",
        hand.id,
        hand.side.as_str(),
        hand.palm_position.x,
        hand.palm_position.y,
        hand.palm_position.z,
    );
    let _ = write!(
        out,
        ", \"grab\": {:.3}, \"pinch\": {:.3}, \"pinchDistance\": {:.2}, \"grabAngle\": {:.3}",
        hand.grab_strength, hand.pinch_strength, hand.pinch_distance, hand.grab_angle,
    );
    let _ = write!(
        out,
        ", \"palmStab\": [{:.2}, {:.2}, {:.2}], \"palmVel\": [{:.2}, {:.2}, {:.2}]",
        hand.palm_stabilized.x,
        hand.palm_stabilized.y,
        hand.palm_stabilized.z,
        hand.palm_velocity.x,
        hand.palm_velocity.y,
        hand.palm_velocity.z,
    );
    let q = hand.palm_orientation;
    let _ = write!(out, ", \"palmQuat\": [{:.4}, {:.4}, {:.4}, {:.4}]", q.x, q.y, q.z, q.w);

    out.push_str(", \"fingers\": {");
    for (index, (name, finger)) in FINGER_NAMES.iter().zip(hand.fingers.iter()).enumerate() {
        let separator = if index == 0 { "" } else { ", " };
        let tip = finger.tip_position;
        let _ = write!(out, "{separator}\"{name}\": [{:.1}, {:.1}, {:.1}]", tip.x, tip.y, tip.z);
    }

    out.push_str("}, \"fingerExtended\": {");
    for (index, (name, finger)) in FINGER_NAMES.iter().zip(hand.fingers.iter()).enumerate() {
        let separator = if index == 0 { "" } else { ", " };
        let _ = write!(out, "{separator}\"{name}\": {}", finger.is_extended);
    }
    out.push_str("}}");
}
