//! Error types for the driver layer.

use alloc::string::String;
use cdev_core::DeviceError;
use cdev_hal::HalError;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Initialization steps, in the order they run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitStage {
    /// Reserving the device number range
    DeviceNumbers,
    /// Creating the device class
    Class,
    /// Allocating the backing buffer
    Buffer,
    /// Adding the cdev to the host
    Cdev,
    /// Creating the device node
    Node,
}

impl InitStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            InitStage::DeviceNumbers => "device numbers",
            InitStage::Class => "class",
            InitStage::Buffer => "buffer",
            InitStage::Cdev => "cdev",
            InitStage::Node => "node",
        }
    }
}

/// Errors from driver operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DriverError {
    /// Configuration could not be parsed or is out of range
    InvalidConfig(String),

    /// Initialization failed; everything acquired before `stage` was released
    Init {
        /// Step that failed
        stage: InitStage,
        /// Host error reported by that step
        source: HalError,
    },

    /// Handle was issued by a different device
    InvalidHandle,

    /// Device state rejected the operation
    Device(DeviceError),

    /// Stats or config could not be rendered
    Serialization(String),
}

impl DriverError {
    /// Create an invalid config error with message.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an init failure for `stage`.
    pub fn init(stage: InitStage, source: HalError) -> Self {
        Self::Init { stage, source }
    }

    /// Stage at which initialization failed, if this is an init failure.
    pub fn init_stage(&self) -> Option<InitStage> {
        match self {
            DriverError::Init { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Check if this is an out-of-range cursor.
    pub fn is_invalid_position(&self) -> bool {
        matches!(self, DriverError::Device(e) if e.is_invalid_position())
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
            DriverError::Init { stage, source } => {
                write!(f, "Init failed at {}: {}", stage.as_str(), source)
            }
            DriverError::InvalidHandle => write!(f, "Handle belongs to another device"),
            DriverError::Device(e) => write!(f, "Device error: {}", e),
            DriverError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl From<DeviceError> for DriverError {
    fn from(e: DeviceError) -> Self {
        DriverError::Device(e)
    }
}
