//! Device crate error types

use std::path::PathBuf;

use custom_hid_transport::protocol::MAX_ENDPOINT;
use thiserror::Error;

/// Errors from loading or validating a `DeviceConfig`
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Endpoint {0} out of range (1-{max})", max = MAX_ENDPOINT)]
    InvalidEndpoint(u8),

    #[error("Indicator {0} is configured as both primary and secondary")]
    DuplicateIndicator(u8),

    #[error("Fixed buffers overlap: inbound 0x{inbound:04X}, outbound 0x{outbound:04X}")]
    OverlappingBuffers { inbound: u32, outbound: u32 },
}
