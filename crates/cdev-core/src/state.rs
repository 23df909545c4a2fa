//! Device state: the buffer, the open counter and the transfer logic.

use alloc::vec;
use alloc::vec::Vec;

use crate::types::{clamp_len, DeviceError, ReadOutcome, Transfer};

/// State of one bounded-buffer character device.
///
/// The buffer is allocated once, zeroed, and never grows. All sessions share
/// this single value; cursors are supplied by the caller on every call.
#[derive(Clone, Debug)]
pub struct DeviceState {
    buffer: Vec<u8>,
    capacity: usize,
    open_count: u64,
}

impl DeviceState {
    /// Create a device with a freshly allocated, zeroed buffer.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0u8; capacity],
            capacity,
            open_count: 0,
        }
    }

    /// Adopt a buffer handed over by the host.
    ///
    /// The capacity is the buffer's length. Its contents are zeroed.
    pub fn with_buffer(mut buffer: Vec<u8>) -> Self {
        buffer.fill(0);
        let capacity = buffer.len();
        Self {
            buffer,
            capacity,
            open_count: 0,
        }
    }

    /// Buffer capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of opens since creation.
    pub fn open_count(&self) -> u64 {
        self.open_count
    }

    /// Current buffer contents.
    pub fn contents(&self) -> &[u8] {
        &self.buffer
    }

    /// Record an open and return the updated count.
    pub fn open(&mut self) -> u64 {
        self.open_count = self.open_count.saturating_add(1);
        self.open_count
    }

    /// Record a close. The counter is not decremented.
    pub fn close(&self) {}

    fn check_pos(&self, pos: usize) -> Result<(), DeviceError> {
        if pos > self.capacity {
            return Err(DeviceError::invalid_position(pos, self.capacity));
        }
        Ok(())
    }

    /// Copy up to `dst.len()` bytes starting at `pos` into `dst`.
    ///
    /// Exactly `bytes` bytes of `dst` are written; the remainder is left as
    /// the caller supplied it.
    pub fn read_into(&self, dst: &mut [u8], pos: usize) -> Result<Transfer, DeviceError> {
        self.check_pos(pos)?;
        let len = clamp_len(dst.len(), pos, self.capacity);
        dst[..len].copy_from_slice(&self.buffer[pos..pos + len]);
        Ok(Transfer::at(pos, len))
    }

    /// Read up to `len` bytes starting at `pos`.
    pub fn read(&self, len: usize, pos: usize) -> Result<ReadOutcome, DeviceError> {
        self.check_pos(pos)?;
        let len = clamp_len(len, pos, self.capacity);
        Ok(ReadOutcome {
            data: self.buffer[pos..pos + len].to_vec(),
            transfer: Transfer::at(pos, len),
        })
    }

    /// Zero the whole buffer, then copy as much of `data` as fits at `pos`.
    ///
    /// Anything written earlier, even outside the target range, is lost.
    /// A rejected cursor leaves the buffer untouched.
    pub fn write(&mut self, data: &[u8], pos: usize) -> Result<Transfer, DeviceError> {
        self.check_pos(pos)?;
        let len = clamp_len(data.len(), pos, self.capacity);
        self.buffer.fill(0);
        self.buffer[pos..pos + len].copy_from_slice(&data[..len]);
        Ok(Transfer::at(pos, len))
    }

    /// Take the buffer out for release, leaving an empty one behind.
    pub fn take_buffer(&mut self) -> Vec<u8> {
        self.capacity = 0;
        core::mem::take(&mut self.buffer)
    }
}
