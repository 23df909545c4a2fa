//! Core types for the bounded-buffer device.

use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Platform page size used to size the default buffer.
pub const PAGE_SIZE: usize = 4096;

/// Number of pages backing the default buffer.
pub const BUFFER_PAGES: usize = 16;

/// Default buffer capacity in bytes (16 pages).
pub const DEFAULT_CAPACITY: usize = BUFFER_PAGES * PAGE_SIZE;

/// Result of a single read or write.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Bytes actually moved (may be fewer than requested)
    pub bytes: usize,
    /// Cursor the caller should pass to its next operation
    pub new_pos: usize,
}

impl Transfer {
    /// Build a transfer of `bytes` starting at `pos`.
    pub fn at(pos: usize, bytes: usize) -> Self {
        Self {
            bytes,
            new_pos: pos + bytes,
        }
    }

    /// True when nothing was transferred (end of buffer).
    pub fn is_eof(&self) -> bool {
        self.bytes == 0
    }
}

/// Bytes returned by a read along with the transfer accounting.
///
/// No terminator is appended to `data`; a caller that treats the result as
/// a C string terminates it itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReadOutcome {
    pub data: Vec<u8>,
    pub transfer: Transfer,
}

/// Errors from device state operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceError {
    /// Cursor lies past the end of the buffer
    InvalidPosition {
        /// Position supplied by the caller
        pos: usize,
        /// Buffer capacity
        capacity: usize,
    },
}

impl DeviceError {
    /// Create an invalid position error.
    pub fn invalid_position(pos: usize, capacity: usize) -> Self {
        Self::InvalidPosition { pos, capacity }
    }

    /// Check if this is an out-of-range cursor.
    pub fn is_invalid_position(&self) -> bool {
        matches!(self, DeviceError::InvalidPosition { .. })
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::InvalidPosition { pos, capacity } => {
                write!(f, "Position {} is past the end of a {} byte buffer", pos, capacity)
            }
        }
    }
}

/// Clamp a requested length so that `pos + len <= capacity`.
///
/// Callers must have already checked `pos <= capacity`.
#[inline]
pub const fn clamp_len(requested: usize, pos: usize, capacity: usize) -> usize {
    let room = capacity - pos;
    if requested < room {
        requested
    } else {
        room
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity_is_sixteen_pages() {
        assert_eq!(DEFAULT_CAPACITY, 65536);
        assert_eq!(DEFAULT_CAPACITY % PAGE_SIZE, 0);
    }

    #[test]
    fn test_clamp_len() {
        assert_eq!(clamp_len(5, 0, 32), 5);
        assert_eq!(clamp_len(40, 0, 32), 32);
        assert_eq!(clamp_len(10, 30, 32), 2);
        assert_eq!(clamp_len(10, 32, 32), 0);
        assert_eq!(clamp_len(0, 7, 32), 0);
    }

    #[test]
    fn test_transfer_at() {
        let t = Transfer::at(2, 5);
        assert_eq!(t.bytes, 5);
        assert_eq!(t.new_pos, 7);
        assert!(!t.is_eof());
        assert!(Transfer::at(32, 0).is_eof());
    }

    #[test]
    fn test_error_construction() {
        let err = DeviceError::invalid_position(40, 32);
        assert!(err.is_invalid_position());
        assert_eq!(err, DeviceError::InvalidPosition { pos: 40, capacity: 32 });
    }

    #[test]
    fn test_error_serializes_with_context() {
        let json = serde_json::to_string(&DeviceError::invalid_position(9, 8)).unwrap();
        assert_eq!(json, r#"{"InvalidPosition":{"pos":9,"capacity":8}}"#);
    }
}
