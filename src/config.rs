//! Device configuration
//!
//! Supports TOML serialization. Every field has a default, so an empty file
//! (or no file at all) yields the stock board layout:
//!
//! ```toml
//! endpoint = 1
//! analog_channel = 0
//!
//! [indicators]
//! primary = 1
//! secondary = 2
//!
//! [buffers.inbound]
//! kind = "fixed_address"
//! address = 0x500
//! ```

use std::path::Path;

use custom_hid_transport::protocol::{DEFAULT_ENDPOINT, MAX_ENDPOINT};
use custom_hid_transport::{BufferPlacement, PACKET_SIZE};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::hal::{AnalogChannel, IndicatorId};

/// The two indicators flipped by TOGGLE_INDICATOR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    /// The "USB custom HID" status indicator
    #[serde(default = "default_primary")]
    pub primary: IndicatorId,
    /// Second board indicator
    #[serde(default = "default_secondary")]
    pub secondary: IndicatorId,
}

fn default_primary() -> IndicatorId {
    IndicatorId(1)
}
fn default_secondary() -> IndicatorId {
    IndicatorId(2)
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            secondary: default_secondary(),
        }
    }
}

/// Memory placement for the two packet buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BufferConfig {
    #[serde(default)]
    pub inbound: BufferPlacement,
    #[serde(default)]
    pub outbound: BufferPlacement,
}

/// Complete device configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Endpoint number of the custom HID interface
    #[serde(default = "default_endpoint")]
    pub endpoint: u8,
    /// ADC channel sampled by the analog commands
    #[serde(default)]
    pub analog_channel: AnalogChannel,
    /// Indicator pair for TOGGLE_INDICATOR
    #[serde(default)]
    pub indicators: IndicatorConfig,
    /// Packet buffer placement
    #[serde(default)]
    pub buffers: BufferConfig,
}

fn default_endpoint() -> u8 {
    DEFAULT_ENDPOINT
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            analog_channel: AnalogChannel::default(),
            indicators: IndicatorConfig::default(),
            buffers: BufferConfig::default(),
        }
    }
}

impl DeviceConfig {
    /// Load config from a file. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: DeviceConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check values a platform driver could not honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint == 0 || self.endpoint > MAX_ENDPOINT {
            return Err(ConfigError::InvalidEndpoint(self.endpoint));
        }
        if self.indicators.primary == self.indicators.secondary {
            return Err(ConfigError::DuplicateIndicator(self.indicators.primary.0));
        }
        if let (Some(inbound), Some(outbound)) = (
            self.buffers.inbound.fixed_address(),
            self.buffers.outbound.fixed_address(),
        ) {
            if inbound.abs_diff(outbound) < PACKET_SIZE as u32 {
                return Err(ConfigError::OverlappingBuffers { inbound, outbound });
            }
        }
        Ok(())
    }
}
