//! Capacity-capped record writer
//!
//! [`RecordBuffer`] is a growable string with an explicit cap: every append
//! either fits entirely or leaves the buffer untouched. The encoder builds
//! records on top of it instead of ad hoc length arithmetic, which makes
//! overflow impossible by construction.

use std::fmt::Write as _;

/// Marker returned when an append would push the buffer past its cap.
///
/// The buffer is unchanged when this is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordFull;

/// Growable text buffer with a hard capacity.
#[derive(Debug)]
pub struct RecordBuffer {
    buf: String,
    cap: usize,
}

impl RecordBuffer {
    /// Create a buffer that will never hold more than `cap` bytes.
    pub fn new(cap: usize) -> Self {
        Self { buf: String::with_capacity(cap.min(4096)), cap }
    }

    /// Bytes still available before the cap.
    pub fn remaining(&self) -> usize {
        self.cap - self.buf.len()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Consume the buffer; the returned string is at most `cap` bytes.
    pub fn into_string(self) -> String {
        self.buf
    }

    /// Mark the current length so a failed multi-part append can be undone.
    pub fn checkpoint(&self) -> usize {
        self.buf.len()
    }

    /// Roll back to a mark taken with [`checkpoint`](Self::checkpoint).
    pub fn rollback_to(&mut self, mark: usize) {
        self.buf.truncate(mark);
    }

    /// Append a literal string, all or nothing.
    pub fn push_str(&mut self, s: &str) -> Result<(), RecordFull> {
        if s.len() > self.remaining() {
            return Err(RecordFull);
        }
        self.buf.push_str(s);
        Ok(())
    }

    /// Append formatted text, all or nothing.
    ///
    /// The text is rendered first and truncated away again if it does not
    /// fit, so a failed append never leaves a partial token behind.
    pub fn push_fmt(&mut self, args: std::fmt::Arguments<'_>) -> Result<(), RecordFull> {
        let start = self.buf.len();
        // Writing into a String cannot fail.
        let _ = self.buf.write_fmt(args);
        if self.buf.len() > self.cap {
            self.buf.truncate(start);
            return Err(RecordFull);
        }
        Ok(())
    }
}
