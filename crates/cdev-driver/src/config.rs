//! Device configuration.
//!
//! A `DeviceConfig` names the device, its class and node, sizes the buffer
//! and picks the minor range. It is usually built in code with the builder
//! methods, or loaded from JSON:
//!
//! ```json
//! { "name": "my_char", "node_name": "mychar", "capacity": 65536 }
//! ```
//!
//! Missing fields take their defaults; unknown fields are rejected.

use alloc::string::{String, ToString};
use cdev_core::DEFAULT_CAPACITY;
use cdev_hal::MINOR_MASK;
use serde::{Deserialize, Serialize};

use crate::error::DriverError;

/// Default name for the device number region and class
pub const DEFAULT_NAME: &str = "my_char";

/// Default name of the device node
pub const DEFAULT_NODE_NAME: &str = "mychar";

/// Configuration for one character device.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceConfig {
    /// Region and class name
    pub name: String,
    /// Device node name
    pub node_name: String,
    /// Buffer size in bytes
    pub capacity: usize,
    /// First minor to reserve
    pub first_minor: u32,
    /// Number of minors to reserve
    pub minor_count: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: String::from(DEFAULT_NAME),
            node_name: String::from(DEFAULT_NODE_NAME),
            capacity: DEFAULT_CAPACITY,
            first_minor: 0,
            minor_count: 1,
        }
    }
}

impl DeviceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_node_name(mut self, node_name: impl Into<String>) -> Self {
        self.node_name = node_name.into();
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_minors(mut self, first_minor: u32, minor_count: u32) -> Self {
        self.first_minor = first_minor;
        self.minor_count = minor_count;
        self
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, DriverError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| DriverError::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render the config as JSON.
    pub fn to_json(&self) -> Result<String, DriverError> {
        serde_json::to_string(self).map_err(|e| DriverError::Serialization(e.to_string()))
    }

    /// Check every field is in range.
    pub fn validate(&self) -> Result<(), DriverError> {
        if self.name.is_empty() {
            return Err(DriverError::invalid_config("name must not be empty"));
        }
        if self.node_name.is_empty() {
            return Err(DriverError::invalid_config("node_name must not be empty"));
        }
        if self.capacity == 0 {
            return Err(DriverError::invalid_config("capacity must be at least 1 byte"));
        }
        if self.minor_count == 0 {
            return Err(DriverError::invalid_config("minor_count must be at least 1"));
        }
        let last = self
            .first_minor
            .checked_add(self.minor_count - 1)
            .filter(|&last| last <= MINOR_MASK);
        if last.is_none() {
            return Err(DriverError::invalid_config(alloc::format!(
                "minor range {}+{} exceeds {}",
                self.first_minor,
                self.minor_count,
                MINOR_MASK
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_original_device() {
        let config = DeviceConfig::default();
        assert_eq!(config.name, "my_char");
        assert_eq!(config.node_name, "mychar");
        assert_eq!(config.capacity, 16 * 4096);
        assert_eq!((config.first_minor, config.minor_count), (0, 1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = DeviceConfig::from_json(r#"{ "capacity": 32 }"#).unwrap();
        assert_eq!(config, DeviceConfig::new().with_capacity(32));
    }

    #[test]
    fn test_from_json_rejects_unknown_fields() {
        let err = DeviceConfig::from_json(r#"{ "capacty": 32 }"#).unwrap_err();
        assert!(matches!(err, DriverError::InvalidConfig(_)));
    }

    #[test]
    fn test_from_json_validates() {
        let err = DeviceConfig::from_json(r#"{ "capacity": 0 }"#).unwrap_err();
        assert_eq!(
            err,
            DriverError::invalid_config("capacity must be at least 1 byte")
        );
    }

    #[test]
    fn test_json_round_trip() {
        let config = DeviceConfig::new()
            .with_name("scratch")
            .with_node_name("scratch0")
            .with_capacity(128)
            .with_minors(4, 2);
        let json = config.to_json().unwrap();
        assert_eq!(DeviceConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_minor_range_validation() {
        assert!(DeviceConfig::new().with_minors(0, 0).validate().is_err());
        assert!(DeviceConfig::new().with_minors(MINOR_MASK, 1).validate().is_ok());
        assert!(DeviceConfig::new().with_minors(MINOR_MASK, 2).validate().is_err());
        assert!(DeviceConfig::new().with_minors(u32::MAX, 1).validate().is_err());
    }

    #[test]
    fn test_empty_names_rejected() {
        assert!(DeviceConfig::new().with_name("").validate().is_err());
        assert!(DeviceConfig::new().with_node_name("").validate().is_err());
    }
}
