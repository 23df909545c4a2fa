//! Registered character device
//!
//! `CharDevice` owns the device state and every host resource acquired for
//! it. Initialization is all-or-nothing: if any step fails, the steps that
//! already succeeded are undone in reverse order before the error is
//! returned. Teardown walks the same resources in reverse acquisition order
//! and releases each exactly once, whether it runs through `teardown` or
//! through `Drop`.
//!
//! The single `DeviceState` is guarded by a spin lock. Every open, read and
//! write runs under it, so a session never observes the zero-fill of a write
//! without its copy.

use alloc::vec::Vec;
use cdev_core::{check_transfer, DeviceState, ReadOutcome, Transfer};
use cdev_hal::{DevNumber, DeviceHal, HalError};
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use spin::Mutex;

use crate::config::DeviceConfig;
use crate::error::{DriverError, InitStage};
use crate::file_ops::{FileOperations, SessionHandle};
use crate::stats::DeviceStats;

/// Source of per-device instance tokens, never reused within a process
static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// A character device registered with host `H`.
pub struct CharDevice<H: DeviceHal> {
    hal: H,
    instance: u64,
    config: DeviceConfig,
    dev: DevNumber,
    class: Option<H::ClassHandle>,
    region_held: bool,
    buffer_held: bool,
    cdev_added: bool,
    node_created: bool,
    state: Mutex<DeviceState>,
}

impl<H: DeviceHal> CharDevice<H> {
    /// Register a device with the host.
    ///
    /// Steps, in order: reserve device numbers, create the class, allocate
    /// the buffer, add the cdev, create the node.
    pub fn init(hal: H, config: DeviceConfig) -> Result<Self, DriverError> {
        config.validate()?;
        let count = config.minor_count;

        let dev = match hal.alloc_chrdev_region(config.first_minor, count, &config.name) {
            Ok(dev) => dev,
            Err(e) => return Err(init_failed(&hal, &config, InitStage::DeviceNumbers, e)),
        };

        let class = match hal.class_create(&config.name) {
            Ok(class) => class,
            Err(e) => {
                hal.unregister_chrdev_region(dev, count);
                return Err(init_failed(&hal, &config, InitStage::Class, e));
            }
        };

        let buffer = match hal.allocate_buffer(config.capacity) {
            Ok(buffer) if buffer.len() == config.capacity => buffer,
            Ok(short) => {
                hal.free_buffer(short);
                hal.class_destroy(class);
                hal.unregister_chrdev_region(dev, count);
                return Err(init_failed(
                    &hal,
                    &config,
                    InitStage::Buffer,
                    HalError::InvalidArgument,
                ));
            }
            Err(e) => {
                hal.class_destroy(class);
                hal.unregister_chrdev_region(dev, count);
                return Err(init_failed(&hal, &config, InitStage::Buffer, e));
            }
        };

        // From here on, dropping `device` rolls back whatever it holds
        let mut device = Self {
            hal,
            instance: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
            config,
            dev,
            class: Some(class),
            region_held: true,
            buffer_held: true,
            cdev_added: false,
            node_created: false,
            state: Mutex::new(DeviceState::with_buffer(buffer)),
        };

        if let Err(e) = device.hal.cdev_add(dev, count) {
            return Err(device.abort(InitStage::Cdev, e));
        }
        device.cdev_added = true;

        let created = match device.class.as_ref() {
            Some(class) => device.hal.device_create(class, dev, &device.config.node_name),
            None => Err(HalError::InvalidArgument),
        };
        if let Err(e) = created {
            return Err(device.abort(InitStage::Node, e));
        }
        device.node_created = true;

        device.log(&alloc::format!("driver initialized [{}]", dev));
        Ok(device)
    }

    /// Unregister the device and release its buffer.
    pub fn teardown(mut self) {
        self.release();
        self.log("driver removed");
    }

    fn abort(mut self, stage: InitStage, err: HalError) -> DriverError {
        self.release();
        init_failed(&self.hal, &self.config, stage, err)
    }

    /// Release held resources in reverse acquisition order. Idempotent.
    fn release(&mut self) {
        if self.node_created {
            if let Some(class) = self.class.as_ref() {
                self.hal.device_destroy(class, self.dev);
            }
            self.node_created = false;
        }
        if self.cdev_added {
            self.hal.cdev_del(self.dev);
            self.cdev_added = false;
        }
        if self.buffer_held {
            let buffer = self.state.get_mut().take_buffer();
            self.hal.free_buffer(buffer);
            self.buffer_held = false;
        }
        if let Some(class) = self.class.take() {
            self.hal.class_destroy(class);
        }
        if self.region_held {
            self.hal
                .unregister_chrdev_region(self.dev, self.config.minor_count);
            self.region_held = false;
        }
    }

    fn log(&self, msg: &str) {
        self.hal
            .debug_write(&alloc::format!("[{}] {}", self.config.name, msg));
    }

    fn check_handle(&self, handle: &SessionHandle) -> Result<(), DriverError> {
        if handle.instance() != self.instance {
            return Err(DriverError::InvalidHandle);
        }
        Ok(())
    }

    /// First device number of the registered range.
    pub fn dev_number(&self) -> DevNumber {
        self.dev
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Host this device is registered with.
    pub fn hal(&self) -> &H {
        &self.hal
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().capacity()
    }

    pub fn open_count(&self) -> u64 {
        self.state.lock().open_count()
    }

    /// Copy of the current buffer contents.
    pub fn snapshot(&self) -> Vec<u8> {
        self.state.lock().contents().to_vec()
    }

    pub fn stats(&self) -> DeviceStats {
        let state = self.state.lock();
        DeviceStats {
            name: self.config.name.clone(),
            node_name: self.config.node_name.clone(),
            major: self.dev.major,
            minor: self.dev.minor,
            capacity: state.capacity(),
            open_count: state.open_count(),
        }
    }

    /// Open a session on this device.
    pub fn open(&self) -> SessionHandle {
        let count = self.state.lock().open();
        self.log(&alloc::format!("device opened {} time(s)", count));
        SessionHandle::new(self.instance, self.dev, count)
    }

    /// Close a session. The open count is left as is.
    pub fn close(&self, handle: SessionHandle) {
        self.state.lock().close();
        self.log(&alloc::format!("device closed (session {})", handle.session()));
    }

    /// Read up to `len` bytes starting at `pos`.
    pub fn read(
        &self,
        handle: &SessionHandle,
        len: usize,
        pos: usize,
    ) -> Result<ReadOutcome, DriverError> {
        self.check_handle(handle)?;
        let state = self.state.lock();
        let out = state.read(len, pos)?;
        debug_assert!(check_transfer(state.capacity(), pos, len, &out.transfer).is_empty());
        Ok(out)
    }

    /// Read into a caller buffer; the requested length is `dst.len()`.
    pub fn read_into(
        &self,
        handle: &SessionHandle,
        dst: &mut [u8],
        pos: usize,
    ) -> Result<Transfer, DriverError> {
        self.check_handle(handle)?;
        Ok(self.state.lock().read_into(dst, pos)?)
    }

    /// Zero the buffer, then write as much of `data` as fits at `pos`.
    pub fn write(
        &self,
        handle: &SessionHandle,
        data: &[u8],
        pos: usize,
    ) -> Result<Transfer, DriverError> {
        self.check_handle(handle)?;
        let mut state = self.state.lock();
        let transfer = state.write(data, pos)?;
        debug_assert!(check_transfer(state.capacity(), pos, data.len(), &transfer).is_empty());
        Ok(transfer)
    }
}

fn init_failed<H: DeviceHal>(
    hal: &H,
    config: &DeviceConfig,
    stage: InitStage,
    err: HalError,
) -> DriverError {
    hal.debug_write(&alloc::format!(
        "[{}] init failed at {}: {}, rolled back",
        config.name,
        stage.as_str(),
        err
    ));
    DriverError::init(stage, err)
}

impl<H: DeviceHal> fmt::Debug for CharDevice<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CharDevice")
            .field("instance", &self.instance)
            .field("dev", &self.dev)
            .field("config", &self.config)
            .field("node_created", &self.node_created)
            .finish_non_exhaustive()
    }
}

impl<H: DeviceHal> Drop for CharDevice<H> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<H: DeviceHal> FileOperations for CharDevice<H> {
    fn open(&self) -> SessionHandle {
        CharDevice::open(self)
    }

    fn close(&self, handle: SessionHandle) {
        CharDevice::close(self, handle)
    }

    fn read(
        &self,
        handle: &SessionHandle,
        len: usize,
        pos: usize,
    ) -> Result<ReadOutcome, DriverError> {
        CharDevice::read(self, handle, len, pos)
    }

    fn write(
        &self,
        handle: &SessionHandle,
        data: &[u8],
        pos: usize,
    ) -> Result<Transfer, DriverError> {
        CharDevice::write(self, handle, data, pos)
    }
}
