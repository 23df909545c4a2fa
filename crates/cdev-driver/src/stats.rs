//! Device statistics snapshot

use alloc::string::{String, ToString};
use serde::{Deserialize, Serialize};

use crate::error::DriverError;

/// Point-in-time view of a registered device
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStats {
    /// Region and class name
    pub name: String,
    /// Device node name
    pub node_name: String,
    /// Major number assigned by the host
    pub major: u32,
    /// First minor number
    pub minor: u32,
    /// Buffer size in bytes
    pub capacity: usize,
    /// Opens since registration
    pub open_count: u64,
}

impl DeviceStats {
    /// Render the snapshot as JSON.
    pub fn to_json(&self) -> Result<String, DriverError> {
        serde_json::to_string(self).map_err(|e| DriverError::Serialization(e.to_string()))
    }
}
