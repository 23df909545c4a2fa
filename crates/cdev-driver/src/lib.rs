//! Bounded-Buffer Character Device Driver
//!
//! This crate registers a bounded-buffer character device with a host and
//! exposes it through a file-like interface:
//!
//! - **Device**: `CharDevice`, all-or-nothing registration and exactly-once teardown
//! - **FileOperations**: open/close/read/write table a host routes calls through
//! - **Config**: device, class and node names, buffer capacity, minor range
//! - **Stats**: serializable snapshot of a registered device
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Host                                │
//! │   numbers · class · cdev · node · buffer memory · console    │
//! └──────────────▲───────────────────────────────┬───────────────┘
//!                │ DeviceHal                     │ FileOperations
//!                │                               ▼
//! ┌──────────────┴───────────────────────────────────────────────┐
//! │                       CharDevice<H>                          │
//! │   init / teardown          open / close / read / write       │
//! │                 ┌─────────────────────────┐                  │
//! │                 │ Mutex<DeviceState>      │                  │
//! │                 │ (cdev-core)             │                  │
//! │                 └─────────────────────────┘                  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Sessions
//!
//! Every `open()` returns a `SessionHandle` tied to the device that issued
//! it. Sessions do not carry a cursor: each read and write takes the caller's
//! position and returns the next one. All sessions share one buffer, and
//! every write zeroes the whole buffer before copying its data in.

#![no_std]
extern crate alloc;

pub mod config;
pub mod device;
pub mod error;
pub mod file_ops;
pub mod stats;

pub use config::{DeviceConfig, DEFAULT_NAME, DEFAULT_NODE_NAME};
pub use device::CharDevice;
pub use error::{DriverError, InitStage};
pub use file_ops::{FileOperations, SessionHandle};
pub use stats::DeviceStats;

// Re-export core and HAL types
pub use cdev_core::{DeviceError, DeviceState, ReadOutcome, Transfer, DEFAULT_CAPACITY};
pub use cdev_hal::{DevNumber, DeviceHal, HalError};
