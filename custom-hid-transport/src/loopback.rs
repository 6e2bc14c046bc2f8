//! In-memory endpoint driver
//!
//! `LoopbackDriver` stands in for the platform USB stack. Its other half,
//! `HostPort`, plays the host: sending a packet completes the armed inbound
//! transfer, receiving completes the pending outbound transfer.
//!
//! ```text
//! [CommandDispatcher] --EndpointDriver--> [LoopbackDriver]
//!                                              | shared state
//!                                         [HostPort]  <- tests / simulator
//! ```
//!
//! Outbound data is copied when the host reads it, not at submit time, so a
//! buffer mutated while its transfer is busy shows up on the wire exactly as
//! it would with real endpoint DMA.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::error::TransportError;
use crate::protocol::PACKET_SIZE;
use crate::types::{Direction, EndpointFlags, Packet, PacketBuffer, TransferHandle};
use crate::EndpointDriver;

/// Per-direction submission counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmissionLog {
    /// `enable_endpoint` calls
    pub enables: usize,
    /// `submit_inbound` calls
    pub inbound: usize,
    /// `submit_outbound` calls
    pub outbound: usize,
}

#[derive(Debug)]
struct PendingTransfer {
    handle: TransferHandle,
    endpoint: u8,
    buffer: PacketBuffer,
    len: usize,
}

#[derive(Debug, Default)]
struct LoopbackState {
    enabled: Option<(u8, EndpointFlags)>,
    next_id: u64,
    inbound: Option<PendingTransfer>,
    outbound: Option<PendingTransfer>,
    log: SubmissionLog,
}

impl LoopbackState {
    fn issue_handle(&mut self) -> TransferHandle {
        // Zero is reserved for IDLE; a u64 id never wraps in practice
        self.next_id += 1;
        TransferHandle::from_raw(self.next_id)
    }

    fn slot(&mut self, direction: Direction) -> &mut Option<PendingTransfer> {
        match direction {
            Direction::Inbound => &mut self.inbound,
            Direction::Outbound => &mut self.outbound,
        }
    }

    fn arm(
        &mut self,
        direction: Direction,
        endpoint: u8,
        buffer: &PacketBuffer,
        len: usize,
    ) -> TransferHandle {
        let len = if len > PACKET_SIZE {
            warn!("{direction} submit of {len} bytes clamped to {PACKET_SIZE}");
            PACKET_SIZE
        } else {
            len
        };
        let handle = self.issue_handle();
        let previous = self.slot(direction).replace(PendingTransfer {
            handle,
            endpoint,
            buffer: buffer.clone(),
            len,
        });
        if let Some(prev) = previous {
            trace!(
                "{direction} handle {} superseded by {}",
                prev.handle.raw(),
                handle.raw()
            );
        }
        match direction {
            Direction::Inbound => self.log.inbound += 1,
            Direction::Outbound => self.log.outbound += 1,
        }
        handle
    }

    fn pending_handle(&self, direction: Direction) -> TransferHandle {
        let slot = match direction {
            Direction::Inbound => &self.inbound,
            Direction::Outbound => &self.outbound,
        };
        slot.as_ref().map_or(TransferHandle::IDLE, |p| p.handle)
    }

    fn check_enabled(&self, direction: Direction) -> Result<(), TransportError> {
        let required = match direction {
            Direction::Inbound => EndpointFlags::OUT,
            Direction::Outbound => EndpointFlags::IN,
        };
        match self.enabled {
            Some((_, flags)) if flags.contains(required) => Ok(()),
            _ => Err(TransportError::EndpointDisabled(direction)),
        }
    }
}

/// Device-side half of the loopback transport
#[derive(Debug, Default)]
pub struct LoopbackDriver {
    state: Arc<Mutex<LoopbackState>>,
}

impl LoopbackDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a host-side port connected to this driver
    pub fn host_port(&self) -> HostPort {
        HostPort {
            state: Arc::clone(&self.state),
        }
    }

    /// Submission counters since creation
    pub fn submissions(&self) -> SubmissionLog {
        self.state.lock().log
    }
}

impl EndpointDriver for LoopbackDriver {
    fn enable_endpoint(&mut self, endpoint: u8, flags: EndpointFlags) {
        let mut state = self.state.lock();
        debug!("Enabling endpoint {endpoint} with {flags:?}");
        state.enabled = Some((endpoint, flags));
        state.log.enables += 1;
    }

    fn submit_inbound(
        &mut self,
        endpoint: u8,
        buffer: &PacketBuffer,
        len: usize,
    ) -> TransferHandle {
        self.state
            .lock()
            .arm(Direction::Inbound, endpoint, buffer, len)
    }

    fn submit_outbound(
        &mut self,
        endpoint: u8,
        buffer: &PacketBuffer,
        len: usize,
    ) -> TransferHandle {
        self.state
            .lock()
            .arm(Direction::Outbound, endpoint, buffer, len)
    }

    fn is_busy(&self, handle: TransferHandle) -> bool {
        if handle.is_idle() {
            return false;
        }
        let state = self.state.lock();
        state.pending_handle(Direction::Inbound) == handle
            || state.pending_handle(Direction::Outbound) == handle
    }
}

/// Host-side half of the loopback transport
#[derive(Debug, Clone)]
pub struct HostPort {
    state: Arc<Mutex<LoopbackState>>,
}

impl HostPort {
    /// Deliver a packet to the device, completing the armed inbound transfer.
    ///
    /// Packets shorter than the armed length are zero padded, as a host HID
    /// stack pads short output reports.
    pub fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        state.check_enabled(Direction::Inbound)?;

        let armed_len = match &state.inbound {
            Some(pending) => pending.len,
            None => {
                let endpoint = state.enabled.map_or(0, |(ep, _)| ep);
                return Err(TransportError::NotArmed {
                    endpoint,
                    direction: Direction::Inbound,
                });
            }
        };
        if data.len() > armed_len {
            return Err(TransportError::InvalidLength {
                len: data.len(),
                armed: armed_len,
            });
        }

        if let Some(pending) = state.inbound.take() {
            let mut buf = pending.buffer.lock();
            buf[..data.len()].copy_from_slice(data);
            buf[data.len()..pending.len].fill(0);
            trace!(
                "Host -> EP{} ({} bytes), handle {} complete",
                pending.endpoint,
                data.len(),
                pending.handle.raw()
            );
        }
        Ok(())
    }

    /// Collect the pending device reply, completing the outbound transfer
    pub fn receive(&self) -> Option<Packet> {
        let mut state = self.state.lock();
        let pending = state.outbound.take()?;
        let mut packet = [0u8; PACKET_SIZE];
        packet[..pending.len].copy_from_slice(&pending.buffer.lock()[..pending.len]);
        trace!(
            "EP{} -> host ({} bytes), handle {} complete",
            pending.endpoint,
            pending.len,
            pending.handle.raw()
        );
        Some(packet)
    }

    /// True if the device has an inbound transfer armed
    pub fn is_armed(&self) -> bool {
        self.state.lock().inbound.is_some()
    }

    /// True if a device reply is waiting to be collected
    pub fn has_reply(&self) -> bool {
        self.state.lock().outbound.is_some()
    }

    /// Endpoint number and flags last passed to `enable_endpoint`
    pub fn endpoint(&self) -> Option<(u8, EndpointFlags)> {
        self.state.lock().enabled
    }

    pub fn submissions(&self) -> SubmissionLog {
        self.state.lock().log
    }
}
