//! Mock HAL implementation for testing character devices
//!
//! This provides a mock implementation of the `DeviceHal` trait that records
//! every registration call, tracks which resources are still live, captures
//! debug output and can be told to fail a given step. It lets driver tests
//! check rollback and teardown without a real kernel.

#![no_std]
extern crate alloc;

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use alloc::vec::Vec;
use cdev_hal::{DevNumber, DeviceHal, HalError};
use core::cell::{Cell, RefCell};

/// Registration steps the mock can be told to fail
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MockStep {
    Region,
    Class,
    Buffer,
    Cdev,
    Node,
}

/// Calls observed by the mock, in order
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MockEvent {
    RegionAllocated(DevNumber),
    RegionReleased(DevNumber),
    ClassCreated(String),
    ClassDestroyed(String),
    CdevAdded(DevNumber),
    CdevDeleted(DevNumber),
    NodeCreated(String),
    NodeDestroyed(DevNumber),
    BufferAllocated(usize),
    BufferFreed(usize),
}

/// Class handle handed out by the mock
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct MockClass(pub u64);

/// Mock HAL for unit testing
///
/// Hands out majors from 250 upwards, one per region.
pub struct MockHal {
    /// Next major number to assign
    next_major: Cell<u32>,
    /// Next class id to assign
    next_class: Cell<u64>,
    /// Step that should fail on its next call
    fail_on: Cell<Option<MockStep>>,
    /// Hand out one byte less than asked on the next buffer allocation
    short_buffer: Cell<bool>,
    /// Captured debug messages
    debug_log: RefCell<Vec<String>>,
    /// Every call, in order
    events: RefCell<Vec<MockEvent>>,
    /// Live regions (first number -> count)
    regions: RefCell<BTreeMap<DevNumber, u32>>,
    /// Live classes (handle -> name)
    classes: RefCell<BTreeMap<MockClass, String>>,
    /// Live cdevs
    cdevs: RefCell<BTreeSet<DevNumber>>,
    /// Live nodes (number -> name)
    nodes: RefCell<BTreeMap<DevNumber, String>>,
    /// Buffers handed out and not yet freed
    live_buffers: Cell<usize>,
    /// Releases of resources that were not live
    double_releases: Cell<usize>,
}

impl MockHal {
    /// Create a new mock HAL
    pub fn new() -> Self {
        Self::with_first_major(250)
    }

    /// Create a mock HAL that starts handing out majors at `major`
    pub fn with_first_major(major: u32) -> Self {
        Self {
            next_major: Cell::new(major),
            next_class: Cell::new(1),
            fail_on: Cell::new(None),
            short_buffer: Cell::new(false),
            debug_log: RefCell::new(Vec::new()),
            events: RefCell::new(Vec::new()),
            regions: RefCell::new(BTreeMap::new()),
            classes: RefCell::new(BTreeMap::new()),
            cdevs: RefCell::new(BTreeSet::new()),
            nodes: RefCell::new(BTreeMap::new()),
            live_buffers: Cell::new(0),
            double_releases: Cell::new(0),
        }
    }

    /// Make the next call for `step` fail
    pub fn fail_on(&self, step: MockStep) {
        self.fail_on.set(Some(step));
    }

    /// Clear any pending failure
    pub fn clear_failure(&self) {
        self.fail_on.set(None);
        self.short_buffer.set(false);
    }

    /// Make the next buffer allocation succeed with one byte too few
    pub fn short_buffer_on_next_alloc(&self) {
        self.short_buffer.set(true);
    }

    fn should_fail(&self, step: MockStep) -> bool {
        if self.fail_on.get() == Some(step) {
            self.fail_on.set(None);
            true
        } else {
            false
        }
    }

    fn record(&self, event: MockEvent) {
        self.events.borrow_mut().push(event);
    }

    fn log(&self, msg: String) {
        self.debug_log.borrow_mut().push(msg);
    }

    fn double_release(&self, what: &str) {
        self.double_releases.set(self.double_releases.get() + 1);
        self.log(alloc::format!("[mock-hal] Released {} that was not live", what));
    }

    /// Get all captured debug messages
    pub fn get_debug_log(&self) -> Vec<String> {
        self.debug_log.borrow().clone()
    }

    /// Clear the debug log
    pub fn clear_debug_log(&self) {
        self.debug_log.borrow_mut().clear();
    }

    /// Check if a specific message was logged
    pub fn has_log_containing(&self, substr: &str) -> bool {
        self.debug_log
            .borrow()
            .iter()
            .any(|msg| msg.contains(substr))
    }

    /// Get every recorded call, in order
    pub fn events(&self) -> Vec<MockEvent> {
        self.events.borrow().clone()
    }

    /// Clear the recorded calls
    pub fn clear_events(&self) {
        self.events.borrow_mut().clear();
    }

    /// Number of regions still reserved
    pub fn live_regions(&self) -> usize {
        self.regions.borrow().len()
    }

    /// Number of classes still alive
    pub fn live_classes(&self) -> usize {
        self.classes.borrow().len()
    }

    /// Number of cdevs still added
    pub fn live_cdevs(&self) -> usize {
        self.cdevs.borrow().len()
    }

    /// Number of nodes still present
    pub fn live_nodes(&self) -> usize {
        self.nodes.borrow().len()
    }

    /// Number of buffers not yet freed
    pub fn live_buffers(&self) -> usize {
        self.live_buffers.get()
    }

    /// Name of the node registered for `dev`, if any
    pub fn node_name(&self, dev: DevNumber) -> Option<String> {
        self.nodes.borrow().get(&dev).cloned()
    }

    /// Total live resources of every kind
    pub fn live_resources(&self) -> usize {
        self.live_regions()
            + self.live_classes()
            + self.live_cdevs()
            + self.live_nodes()
            + self.live_buffers()
    }

    /// Releases that targeted something not live
    pub fn double_releases(&self) -> usize {
        self.double_releases.get()
    }
}

impl Default for MockHal {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceHal for MockHal {
    type ClassHandle = MockClass;

    fn alloc_chrdev_region(
        &self,
        first_minor: u32,
        count: u32,
        name: &str,
    ) -> Result<DevNumber, HalError> {
        if count == 0 {
            return Err(HalError::InvalidArgument);
        }
        if self.should_fail(MockStep::Region) {
            return Err(HalError::NoDeviceNumbers);
        }

        let major = self.next_major.get();
        self.next_major.set(major + 1);
        let dev = DevNumber::new(major, first_minor);

        self.regions.borrow_mut().insert(dev, count);
        self.record(MockEvent::RegionAllocated(dev));
        self.log(alloc::format!(
            "[mock-hal] Reserved {} minor(s) at {} for '{}'",
            count,
            dev,
            name
        ));
        Ok(dev)
    }

    fn unregister_chrdev_region(&self, first: DevNumber, _count: u32) {
        self.record(MockEvent::RegionReleased(first));
        if self.regions.borrow_mut().remove(&first).is_none() {
            self.double_release("region");
        }
    }

    fn class_create(&self, name: &str) -> Result<Self::ClassHandle, HalError> {
        if self.should_fail(MockStep::Class) {
            return Err(HalError::OutOfMemory);
        }
        if self.classes.borrow().values().any(|n| n == name) {
            return Err(HalError::AlreadyExists);
        }

        let id = self.next_class.get();
        self.next_class.set(id + 1);
        let class = MockClass(id);

        self.classes.borrow_mut().insert(class, String::from(name));
        self.record(MockEvent::ClassCreated(String::from(name)));
        Ok(class)
    }

    fn class_destroy(&self, class: Self::ClassHandle) {
        match self.classes.borrow_mut().remove(&class) {
            Some(name) => self.record(MockEvent::ClassDestroyed(name)),
            None => self.double_release("class"),
        }
    }

    fn cdev_add(&self, first: DevNumber, _count: u32) -> Result<(), HalError> {
        if self.should_fail(MockStep::Cdev) {
            return Err(HalError::IoError);
        }
        if !self.cdevs.borrow_mut().insert(first) {
            return Err(HalError::AlreadyExists);
        }
        self.record(MockEvent::CdevAdded(first));
        Ok(())
    }

    fn cdev_del(&self, first: DevNumber) {
        self.record(MockEvent::CdevDeleted(first));
        if !self.cdevs.borrow_mut().remove(&first) {
            self.double_release("cdev");
        }
    }

    fn device_create(
        &self,
        class: &Self::ClassHandle,
        dev: DevNumber,
        name: &str,
    ) -> Result<(), HalError> {
        if !self.classes.borrow().contains_key(class) {
            return Err(HalError::InvalidArgument);
        }
        if self.should_fail(MockStep::Node) {
            return Err(HalError::IoError);
        }

        self.nodes.borrow_mut().insert(dev, String::from(name));
        self.record(MockEvent::NodeCreated(String::from(name)));
        Ok(())
    }

    fn device_destroy(&self, _class: &Self::ClassHandle, dev: DevNumber) {
        self.record(MockEvent::NodeDestroyed(dev));
        if self.nodes.borrow_mut().remove(&dev).is_none() {
            self.double_release("node");
        }
    }

    fn allocate_buffer(&self, len: usize) -> Result<Vec<u8>, HalError> {
        if self.should_fail(MockStep::Buffer) {
            return Err(HalError::OutOfMemory);
        }
        let len = if self.short_buffer.replace(false) {
            len.saturating_sub(1)
        } else {
            len
        };
        // Dirty memory, so callers that forget to zero are caught
        let buffer = alloc::vec![0xA5u8; len];
        self.live_buffers.set(self.live_buffers.get() + 1);
        self.record(MockEvent::BufferAllocated(len));
        Ok(buffer)
    }

    fn free_buffer(&self, buffer: Vec<u8>) {
        self.record(MockEvent::BufferFreed(buffer.len()));
        match self.live_buffers.get().checked_sub(1) {
            Some(n) => self.live_buffers.set(n),
            None => self.double_release("buffer"),
        }
    }

    fn debug_write(&self, msg: &str) {
        self.log(String::from(msg));
    }
}
