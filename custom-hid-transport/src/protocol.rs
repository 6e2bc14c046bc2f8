//! Protocol constants and utilities for the custom HID command protocol

use std::fmt::Write as _;

/// Size of every packet in either direction. There is no length field;
/// the transport's own framing defines packet boundaries.
pub const PACKET_SIZE: usize = 64;

/// Endpoint number used when no configuration overrides it
pub const DEFAULT_ENDPOINT: u8 = 1;

/// Highest endpoint number a full-speed device can address
pub const MAX_ENDPOINT: u8 = 15;

/// Host command opcodes (byte 0 of an inbound packet)
pub mod cmd {
    /// Toggle both indicators. No reply.
    pub const TOGGLE_INDICATOR: u8 = 0x80;
    /// Input state query. Replies with the echoed opcode only.
    pub const GET_INPUT_STATE: u8 = 0x81;
    /// One 10-bit analog sample, little-endian in bytes 1..=2
    pub const READ_ANALOG_10BIT: u8 = 0x37;
    /// 63 bit-weighted waveform bytes synthesized from percentage samples
    pub const SAMPLE_DIGITAL_WAVEFORM: u8 = 0x10;
    /// 31 consecutive 10-bit samples, little-endian pairs in bytes 1..=62
    pub const GENERATE_ANALOG_SERIES: u8 = 0x11;

    /// Get human-readable name for command byte
    pub fn name(cmd: u8) -> &'static str {
        match cmd {
            TOGGLE_INDICATOR => "TOGGLE_INDICATOR",
            GET_INPUT_STATE => "GET_INPUT_STATE",
            READ_ANALOG_10BIT => "READ_ANALOG_10BIT",
            SAMPLE_DIGITAL_WAVEFORM => "SAMPLE_DIGITAL_WAVEFORM",
            GENERATE_ANALOG_SERIES => "GENERATE_ANALOG_SERIES",
            _ => "UNKNOWN",
        }
    }
}

/// Build a host command packet: opcode in byte 0, `data` after it, zero padded.
///
/// Data beyond the packet size is truncated.
pub fn build_command(cmd: u8, data: &[u8]) -> [u8; PACKET_SIZE] {
    let mut buf = [0u8; PACKET_SIZE];
    buf[0] = cmd;
    let len = std::cmp::min(data.len(), PACKET_SIZE - 1);
    buf[1..1 + len].copy_from_slice(&data[..len]);
    buf
}

/// Format bytes as space separated hex, 16 per line
pub fn hex_dump(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 3);
    for (i, chunk) in data.chunks(16).enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{:04X}:", i * 16);
        for b in chunk {
            let _ = write!(out, " {b:02X}");
        }
    }
    out
}
