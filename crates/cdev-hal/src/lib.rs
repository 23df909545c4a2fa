//! Host Abstraction Layer for character devices
//!
//! This crate defines the trait a host implements so a character device can
//! be registered with it: device-number allocation, the device class, the
//! cdev entry, the addressable node, the backing buffer, and a debug console.
//! The driver only ever talks to its host through this trait.
//!
//! # Host Implementations
//!
//! - **Mock**: `cdev-hal-mock`, records every call and can fail on demand
//! - **Test**: [`TestHal`], a stub that accepts everything and prints nothing

#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;

/// Character device number (major/minor pair)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DevNumber {
    pub major: u32,
    pub minor: u32,
}

impl DevNumber {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for DevNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.major, self.minor)
    }
}

/// Width of the minor field in a host device number
pub const MINOR_BITS: u32 = 20;

/// Largest minor number a host can address
pub const MINOR_MASK: u32 = (1 << MINOR_BITS) - 1;

/// Host Abstraction Layer trait
///
/// Implementations provide the platform side of a character device:
/// - Device number allocation
/// - Device class and node management
/// - Backing buffer memory
/// - Debug output
///
/// Every acquiring call has a matching release call. The driver guarantees
/// each release is issued exactly once per successful acquire, in reverse
/// order of acquisition.
///
/// # Associated Types
///
/// - `ClassHandle`: platform handle to a created device class
pub trait DeviceHal {
    /// Handle to a created device class
    type ClassHandle: Clone;

    // === Device Numbers ===

    /// Reserve `count` minors starting at `first_minor` under a dynamic major
    ///
    /// # Returns
    /// * `Ok(DevNumber)` - First device number of the reserved range
    /// * `Err(HalError::NoDeviceNumbers)` - No major available
    fn alloc_chrdev_region(
        &self,
        first_minor: u32,
        count: u32,
        name: &str,
    ) -> Result<DevNumber, HalError>;

    /// Release a range reserved by `alloc_chrdev_region`
    fn unregister_chrdev_region(&self, first: DevNumber, count: u32);

    // === Class ===

    /// Create a device class
    ///
    /// # Returns
    /// * `Ok(ClassHandle)` - Handle used to create nodes in the class
    /// * `Err(HalError::AlreadyExists)` - A class with this name exists
    fn class_create(&self, name: &str) -> Result<Self::ClassHandle, HalError>;

    /// Destroy a class created by `class_create`
    fn class_destroy(&self, class: Self::ClassHandle);

    // === Cdev ===

    /// Make the device live for `count` minors starting at `first`
    fn cdev_add(&self, first: DevNumber, count: u32) -> Result<(), HalError>;

    /// Remove a cdev added by `cdev_add`
    fn cdev_del(&self, first: DevNumber);

    // === Device Node ===

    /// Create the addressable node `name` for `dev` inside `class`
    fn device_create(
        &self,
        class: &Self::ClassHandle,
        dev: DevNumber,
        name: &str,
    ) -> Result<(), HalError>;

    /// Destroy a node created by `device_create`
    fn device_destroy(&self, class: &Self::ClassHandle, dev: DevNumber);

    // === Memory ===

    /// Allocate a zeroed buffer of exactly `len` bytes
    ///
    /// # Returns
    /// * `Ok(buffer)` - Zero-filled buffer with `buffer.len() == len`
    /// * `Err(HalError::OutOfMemory)` - Allocation failed
    fn allocate_buffer(&self, len: usize) -> Result<Vec<u8>, HalError> {
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(len)
            .map_err(|_| HalError::OutOfMemory)?;
        buffer.resize(len, 0);
        Ok(buffer)
    }

    /// Return a buffer obtained from `allocate_buffer`
    fn free_buffer(&self, buffer: Vec<u8>) {
        drop(buffer);
    }

    // === Debug ===

    /// Write a debug message to the host's console/log
    fn debug_write(&self, msg: &str);
}

impl<T: DeviceHal + ?Sized> DeviceHal for &T {
    type ClassHandle = T::ClassHandle;

    fn alloc_chrdev_region(
        &self,
        first_minor: u32,
        count: u32,
        name: &str,
    ) -> Result<DevNumber, HalError> {
        (**self).alloc_chrdev_region(first_minor, count, name)
    }

    fn unregister_chrdev_region(&self, first: DevNumber, count: u32) {
        (**self).unregister_chrdev_region(first, count)
    }

    fn class_create(&self, name: &str) -> Result<Self::ClassHandle, HalError> {
        (**self).class_create(name)
    }

    fn class_destroy(&self, class: Self::ClassHandle) {
        (**self).class_destroy(class)
    }

    fn cdev_add(&self, first: DevNumber, count: u32) -> Result<(), HalError> {
        (**self).cdev_add(first, count)
    }

    fn cdev_del(&self, first: DevNumber) {
        (**self).cdev_del(first)
    }

    fn device_create(
        &self,
        class: &Self::ClassHandle,
        dev: DevNumber,
        name: &str,
    ) -> Result<(), HalError> {
        (**self).device_create(class, dev, name)
    }

    fn device_destroy(&self, class: &Self::ClassHandle, dev: DevNumber) {
        (**self).device_destroy(class, dev)
    }

    fn allocate_buffer(&self, len: usize) -> Result<Vec<u8>, HalError> {
        (**self).allocate_buffer(len)
    }

    fn free_buffer(&self, buffer: Vec<u8>) {
        (**self).free_buffer(buffer)
    }

    fn debug_write(&self, msg: &str) {
        (**self).debug_write(msg)
    }
}

/// HAL errors
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HalError {
    /// Not enough memory available
    OutOfMemory,
    /// No device numbers left to hand out
    NoDeviceNumbers,
    /// Name or number already registered
    AlreadyExists,
    /// Invalid argument
    InvalidArgument,
    /// Operation not supported on this platform
    NotSupported,
    /// I/O error
    IoError,
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            HalError::OutOfMemory => "out of memory",
            HalError::NoDeviceNumbers => "no device numbers available",
            HalError::AlreadyExists => "already exists",
            HalError::InvalidArgument => "invalid argument",
            HalError::NotSupported => "not supported",
            HalError::IoError => "I/O error",
        };
        f.write_str(msg)
    }
}

/// A minimal test HAL for unit testing
///
/// Accepts every registration, hands out major 240 and prints nothing.
#[derive(Default)]
pub struct TestHal;

impl TestHal {
    pub fn new() -> Self {
        Self
    }
}

impl DeviceHal for TestHal {
    type ClassHandle = ();

    fn alloc_chrdev_region(
        &self,
        first_minor: u32,
        _count: u32,
        _name: &str,
    ) -> Result<DevNumber, HalError> {
        Ok(DevNumber::new(240, first_minor))
    }

    fn unregister_chrdev_region(&self, _first: DevNumber, _count: u32) {}

    fn class_create(&self, _name: &str) -> Result<Self::ClassHandle, HalError> {
        Ok(())
    }

    fn class_destroy(&self, _class: Self::ClassHandle) {}

    fn cdev_add(&self, _first: DevNumber, _count: u32) -> Result<(), HalError> {
        Ok(())
    }

    fn cdev_del(&self, _first: DevNumber) {}

    fn device_create(
        &self,
        _class: &Self::ClassHandle,
        _dev: DevNumber,
        _name: &str,
    ) -> Result<(), HalError> {
        Ok(())
    }

    fn device_destroy(&self, _class: &Self::ClassHandle, _dev: DevNumber) {}

    fn debug_write(&self, _msg: &str) {
        // No-op for tests
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dev_number_display() {
        assert_eq!(alloc::format!("{}", DevNumber::new(250, 3)), "250/3");
        assert_eq!(MINOR_MASK, 0xF_FFFF);
    }

    #[test]
    fn test_default_buffer_allocation_is_zeroed() {
        let hal = TestHal::new();
        let buffer = hal.allocate_buffer(64).unwrap();
        assert_eq!(buffer.len(), 64);
        assert!(buffer.iter().all(|&b| b == 0));
        hal.free_buffer(buffer);
    }

    #[test]
    fn test_reference_forwards_to_host() {
        let hal = TestHal::new();
        let by_ref = &hal;
        let dev = by_ref.alloc_chrdev_region(7, 1, "x").unwrap();
        assert_eq!(dev, DevNumber::new(240, 7));
    }
}
