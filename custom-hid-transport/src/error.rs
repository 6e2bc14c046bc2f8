//! Transport error types

use thiserror::Error;

use crate::protocol::PACKET_SIZE;
use crate::types::Direction;

/// Errors raised on the host side of a loopback transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Endpoint not enabled for {0} transfers")]
    EndpointDisabled(Direction),

    #[error("No {direction} transfer armed on endpoint {endpoint}")]
    NotArmed { endpoint: u8, direction: Direction },

    #[error("Invalid transfer length {len} (armed for {armed}, packet size {size})", size = PACKET_SIZE)]
    InvalidLength { len: usize, armed: usize },
}
