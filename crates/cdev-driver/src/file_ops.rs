//! File-like operation table a host routes calls through.

use cdev_core::{ReadOutcome, Transfer};
use cdev_hal::DevNumber;

use crate::error::DriverError;

/// Session returned by `open()`.
///
/// Carries the instance token of the device that issued it, which is how
/// later calls are matched to their device. Device numbers repeat across
/// hosts and after release, so they are informational only. Cursors are
/// not stored here; the caller passes its position on every read and write.
#[derive(Debug, PartialEq, Eq)]
pub struct SessionHandle {
    instance: u64,
    dev: DevNumber,
    session: u64,
}

impl SessionHandle {
    pub(crate) fn new(instance: u64, dev: DevNumber, session: u64) -> Self {
        Self {
            instance,
            dev,
            session,
        }
    }

    pub(crate) fn instance(&self) -> u64 {
        self.instance
    }

    /// Device this handle targets.
    pub fn dev_number(&self) -> DevNumber {
        self.dev
    }

    /// Sequence number of the open that produced this handle (1-based).
    pub fn session(&self) -> u64 {
        self.session
    }
}

/// Operations a host invokes on a registered character device.
pub trait FileOperations {
    /// Open a session. Always succeeds.
    fn open(&self) -> SessionHandle;

    /// Close a session. Always succeeds and changes no device state.
    fn close(&self, handle: SessionHandle);

    /// Read up to `len` bytes at `pos`.
    fn read(&self, handle: &SessionHandle, len: usize, pos: usize)
        -> Result<ReadOutcome, DriverError>;

    /// Replace the buffer with `data` placed at `pos`.
    fn write(&self, handle: &SessionHandle, data: &[u8], pos: usize)
        -> Result<Transfer, DriverError>;
}
