//! Dispatch outcomes and counters
//!
//! The host never learns about a dropped reply or an unknown opcode. These
//! types make both conditions visible to the firmware side.

use std::fmt;

use custom_hid_transport::cmd;

use crate::opcode::Opcode;

/// What happened to one completed inbound packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Action performed and a reply submitted
    Replied(Opcode),
    /// Action performed, the command has no reply
    Handled(Opcode),
    /// Outbound transfer still in flight; reply dropped and action skipped
    TransportBusy(Opcode),
    /// Opcode outside the command set; nothing done
    UnknownOpcode(u8),
}

impl DispatchOutcome {
    /// The raw opcode byte that produced this outcome
    pub fn opcode_byte(&self) -> u8 {
        match *self {
            DispatchOutcome::Replied(op)
            | DispatchOutcome::Handled(op)
            | DispatchOutcome::TransportBusy(op) => op.as_byte(),
            DispatchOutcome::UnknownOpcode(byte) => byte,
        }
    }

    pub fn is_reply(&self) -> bool {
        matches!(self, DispatchOutcome::Replied(_))
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchOutcome::Replied(op) => write!(f, "{op}: replied"),
            DispatchOutcome::Handled(op) => write!(f, "{op}: handled"),
            DispatchOutcome::TransportBusy(op) => write!(f, "{op}: dropped, outbound busy"),
            DispatchOutcome::UnknownOpcode(byte) => {
                write!(f, "{} (0x{byte:02X}): ignored", cmd::name(*byte))
            }
        }
    }
}

/// Running counters, updated once per completed inbound packet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Inbound packets taken off the endpoint
    pub dispatched: u64,
    /// Replies submitted to the host
    pub replies_sent: u64,
    /// Commands without a reply that ran
    pub handled_silent: u64,
    /// Replies dropped because the outbound transfer was busy
    pub dropped_busy: u64,
    /// Packets whose opcode was not recognized
    pub unknown_opcodes: u64,
}

impl DispatchStats {
    pub fn record(&mut self, outcome: &DispatchOutcome) {
        self.dispatched += 1;
        match outcome {
            DispatchOutcome::Replied(_) => self.replies_sent += 1,
            DispatchOutcome::Handled(_) => self.handled_silent += 1,
            DispatchOutcome::TransportBusy(_) => self.dropped_busy += 1,
            DispatchOutcome::UnknownOpcode(_) => self.unknown_opcodes += 1,
        }
    }
}
