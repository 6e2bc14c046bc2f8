//! Endpoint driver contract for the custom HID command protocol
//!
//! This crate describes the single bidirectional interrupt endpoint the
//! device talks to the host over:
//!
//! - `EndpointDriver`: the non-blocking submit / busy-check interface a
//!   platform USB stack provides
//! - `PacketBuffer` / `TransferHandle`: packet memory shared with the driver
//!   and the token for one in-flight transfer
//! - `LoopbackDriver` / `HostPort`: an in-memory driver plus host side, used
//!   by tests and the simulator

pub mod error;
pub mod loopback;
pub mod protocol;
pub mod types;

pub use error::TransportError;
pub use loopback::{HostPort, LoopbackDriver, SubmissionLog};
pub use protocol::{cmd, PACKET_SIZE};
pub use types::{BufferPlacement, Direction, EndpointFlags, Packet, PacketBuffer, TransferHandle};

/// The core driver trait - platform USB stacks implement this
///
/// Every call returns immediately. Completion is observed by polling
/// `is_busy` on the returned handle; there is no cancellation, a new
/// submission in the same direction simply supersedes the old one.
pub trait EndpointDriver {
    /// Enable the endpoint for the transfers described by `flags`
    fn enable_endpoint(&mut self, endpoint: u8, flags: EndpointFlags);

    /// Arm a host-to-device transfer into `buffer`
    ///
    /// The driver writes up to `len` bytes into the buffer when the host
    /// delivers a packet; until then the returned handle is busy.
    fn submit_inbound(
        &mut self,
        endpoint: u8,
        buffer: &PacketBuffer,
        len: usize,
    ) -> TransferHandle;

    /// Queue `len` bytes of `buffer` for the host to read
    ///
    /// The buffer must not be modified until the returned handle is no
    /// longer busy.
    fn submit_outbound(
        &mut self,
        endpoint: u8,
        buffer: &PacketBuffer,
        len: usize,
    ) -> TransferHandle;

    /// Check whether a submitted transfer is still in flight
    fn is_busy(&self, handle: TransferHandle) -> bool;
}

impl<D: EndpointDriver + ?Sized> EndpointDriver for &mut D {
    fn enable_endpoint(&mut self, endpoint: u8, flags: EndpointFlags) {
        (**self).enable_endpoint(endpoint, flags)
    }

    fn submit_inbound(
        &mut self,
        endpoint: u8,
        buffer: &PacketBuffer,
        len: usize,
    ) -> TransferHandle {
        (**self).submit_inbound(endpoint, buffer, len)
    }

    fn submit_outbound(
        &mut self,
        endpoint: u8,
        buffer: &PacketBuffer,
        len: usize,
    ) -> TransferHandle {
        (**self).submit_outbound(endpoint, buffer, len)
    }

    fn is_busy(&self, handle: TransferHandle) -> bool {
        (**self).is_busy(handle)
    }
}
