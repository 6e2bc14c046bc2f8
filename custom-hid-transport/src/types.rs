//! Common types for transport layer

use std::fmt;
use std::num::NonZeroU64;
use std::sync::Arc;

use bitflags::bitflags;
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};

use crate::protocol::PACKET_SIZE;

/// One fixed-size packet as exchanged on the wire
pub type Packet = [u8; PACKET_SIZE];

/// Transfer direction, seen from the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Host to device (the USB OUT endpoint)
    Inbound,
    /// Device to host (the USB IN endpoint)
    Outbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Inbound => f.write_str("inbound"),
            Direction::Outbound => f.write_str("outbound"),
        }
    }
}

bitflags! {
    /// Options passed when enabling the endpoint
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EndpointFlags: u8 {
        /// Device-to-host transfers allowed
        const IN = 0x01;
        /// Host-to-device transfers allowed
        const OUT = 0x02;
        /// ACK/NAK handshake enabled
        const HANDSHAKE = 0x04;
        /// Reject SETUP packets on this endpoint
        const DISALLOW_SETUP = 0x08;
    }
}

impl EndpointFlags {
    /// Bidirectional interrupt endpoint with handshake, no control traffic
    pub const INTERRUPT_DUPLEX: Self = Self::IN
        .union(Self::OUT)
        .union(Self::HANDSHAKE)
        .union(Self::DISALLOW_SETUP);
}

/// Opaque token for one submission to the endpoint.
///
/// `TransferHandle::IDLE` stands for "nothing in flight" and is never busy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TransferHandle(Option<NonZeroU64>);

impl TransferHandle {
    pub const IDLE: Self = Self(None);

    /// Wrap a driver-issued id. Zero maps to `IDLE`.
    pub fn from_raw(id: u64) -> Self {
        Self(NonZeroU64::new(id))
    }

    pub fn raw(self) -> u64 {
        self.0.map_or(0, NonZeroU64::get)
    }

    pub fn is_idle(self) -> bool {
        self.0.is_none()
    }
}

/// Where a packet buffer must live in memory.
///
/// Some USB peripherals can only reach a limited RAM window, so platform
/// drivers may require buffers at a fixed address. Drivers read this from
/// [`PacketBuffer::placement`]; the dispatcher itself never looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BufferPlacement {
    /// Ordinary heap/static storage
    #[default]
    Default,
    /// Platform fixed-address placement
    FixedAddress { address: u32 },
}

impl BufferPlacement {
    pub fn fixed_address(self) -> Option<u32> {
        match self {
            BufferPlacement::Default => None,
            BufferPlacement::FixedAddress { address } => Some(address),
        }
    }
}

/// Packet memory shared between its owner and the endpoint driver.
///
/// Cloning yields another handle to the same storage, the way a DMA
/// descriptor points at the owner's buffer. The owner must only touch the
/// contents while the transfer using it is not busy.
#[derive(Debug, Clone)]
pub struct PacketBuffer {
    data: Arc<Mutex<Packet>>,
    placement: BufferPlacement,
}

impl PacketBuffer {
    pub fn new(placement: BufferPlacement) -> Self {
        Self {
            data: Arc::new(Mutex::new([0u8; PACKET_SIZE])),
            placement,
        }
    }

    pub fn placement(&self) -> BufferPlacement {
        self.placement
    }

    /// Lock the packet for reading or writing
    pub fn lock(&self) -> MutexGuard<'_, Packet> {
        self.data.lock()
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> Packet {
        *self.data.lock()
    }
}

impl Default for PacketBuffer {
    fn default() -> Self {
        Self::new(BufferPlacement::Default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_handle() {
        assert!(TransferHandle::IDLE.is_idle());
        assert_eq!(TransferHandle::IDLE.raw(), 0);
        assert_eq!(TransferHandle::from_raw(0), TransferHandle::IDLE);
        assert_eq!(TransferHandle::default(), TransferHandle::IDLE);

        let h = TransferHandle::from_raw(7);
        assert!(!h.is_idle());
        assert_eq!(h.raw(), 7);
    }

    #[test]
    fn test_interrupt_duplex_flags() {
        let flags = EndpointFlags::INTERRUPT_DUPLEX;
        assert!(flags.contains(EndpointFlags::IN | EndpointFlags::OUT));
        assert!(flags.contains(EndpointFlags::HANDSHAKE));
        assert!(flags.contains(EndpointFlags::DISALLOW_SETUP));
        assert_eq!(flags.bits(), 0x0F);
    }

    #[test]
    fn test_packet_buffer_clone_shares_storage() {
        let a = PacketBuffer::new(BufferPlacement::Default);
        let b = a.clone();
        b.lock()[0] = 0x37;
        assert_eq!(a.snapshot()[0], 0x37);

        let c = PacketBuffer::default();
        c.lock()[0] = 0x11;
        assert_eq!(a.snapshot()[0], 0x37);
    }

    #[test]
    fn test_default_packet_buffer() {
        let buf = PacketBuffer::default();
        assert_eq!(buf.placement(), BufferPlacement::Default);
        assert_eq!(buf.snapshot(), [0u8; PACKET_SIZE]);
    }

    #[test]
    fn test_placement() {
        let buf = PacketBuffer::new(BufferPlacement::FixedAddress { address: 0x500 });
        assert_eq!(buf.placement().fixed_address(), Some(0x500));
        assert_eq!(BufferPlacement::default().fixed_address(), None);
    }
}
