//! Reply encoders
//!
//! Each encoder writes the echoed opcode into byte 0 and its payload into
//! the bytes it owns. Bytes outside that range keep whatever the outbound
//! packet held before.

use custom_hid_transport::{cmd, Packet};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Percentage readings are scaled down by this (integer division) before weighting
pub const PERCENT_DIVISOR: u8 = 50;

/// Percentage samples folded into one waveform byte
pub const WAVEFORM_BITS: u32 = 8;

/// Analog samples in a GENERATE_ANALOG_SERIES reply (offsets 1, 3, ..., 61)
pub const SERIES_SLOTS: usize = 31;

/// End of the series payload (exclusive). Byte 63 is left untouched.
const SERIES_END: usize = 1 + SERIES_SLOTS * 2;

/// A 10-bit analog reading as it appears on the wire: low byte, then high byte.
///
/// Only the low two bits of `high` are ever set for in-range readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct AnalogSample {
    low: u8,
    high: u8,
}

impl AnalogSample {
    pub fn new(raw: u16) -> Self {
        Self {
            low: (raw & 0xFF) as u8,
            high: (raw >> 8) as u8,
        }
    }
}

/// GET_INPUT_STATE: echo only, nothing else is populated
pub fn encode_input_state(out: &mut Packet) {
    out[0] = cmd::GET_INPUT_STATE;
}

/// READ_ANALOG_10BIT: `[0x37, low, high]`
pub fn encode_analog_10bit(out: &mut Packet, raw: u16) {
    out[0] = cmd::READ_ANALOG_10BIT;
    out[1..3].copy_from_slice(AnalogSample::new(raw).as_bytes());
}

/// One waveform byte from eight percentage samples.
///
/// Sample `j` contributes `2^j * (pct / 50)` with truncating division; the
/// sum wraps at 8 bits.
pub fn waveform_byte<F: FnMut() -> u8>(mut sample: F) -> u8 {
    let mut acc: u8 = 0;
    for bit in 0..WAVEFORM_BITS {
        let weight = 1u16 << bit;
        let level = u16::from(sample() / PERCENT_DIVISOR);
        acc = acc.wrapping_add((weight * level) as u8);
    }
    acc
}

/// SAMPLE_DIGITAL_WAVEFORM: one waveform byte per index 1..=63
pub fn encode_digital_waveform<F: FnMut() -> u8>(out: &mut Packet, mut sample: F) {
    out[0] = cmd::SAMPLE_DIGITAL_WAVEFORM;
    for slot in out[1..].iter_mut() {
        *slot = waveform_byte(&mut sample);
    }
}

/// GENERATE_ANALOG_SERIES: 31 `(low, high)` pairs at offsets 1..=62
pub fn encode_analog_series<F: FnMut() -> u16>(out: &mut Packet, mut sample: F) {
    out[0] = cmd::GENERATE_ANALOG_SERIES;
    for pair in out[1..SERIES_END].chunks_exact_mut(2) {
        pair.copy_from_slice(AnalogSample::new(sample()).as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custom_hid_transport::PACKET_SIZE;

    #[test]
    fn test_analog_sample_split() {
        let s = AnalogSample::new(0x2F3);
        assert_eq!(s.as_bytes(), &[0xF3, 0x02]);

        let max = AnalogSample::new(1023);
        assert_eq!(max.as_bytes(), &[0xFF, 0x03]);
    }

    #[test]
    fn test_encode_analog_10bit() {
        let mut out = [0xEEu8; PACKET_SIZE];
        encode_analog_10bit(&mut out, 755);
        assert_eq!(&out[..3], &[0x37, 0xF3, 0x02]);
        assert!(out[3..].iter().all(|&b| b == 0xEE));
    }

    #[test]
    fn test_encode_input_state_echo_only() {
        let mut out = [0x55u8; PACKET_SIZE];
        encode_input_state(&mut out);
        assert_eq!(out[0], 0x81);
        assert!(out[1..].iter().all(|&b| b == 0x55));
    }

    #[test]
    fn test_waveform_byte_levels() {
        // pct < 50 contributes nothing
        assert_eq!(waveform_byte(|| 49), 0);
        // pct in 50..100 gives level 1 on every bit
        assert_eq!(waveform_byte(|| 50), 0xFF);
        assert_eq!(waveform_byte(|| 99), 0xFF);
        // pct == 100 gives level 2: 2 * 255 = 510, wraps to 254
        assert_eq!(waveform_byte(|| 100), 0xFE);
    }

    #[test]
    fn test_waveform_byte_bit_order() {
        // Only the first sample is high: weight 2^0
        let mut samples = [100u8, 0, 0, 0, 0, 0, 0, 0].into_iter();
        assert_eq!(waveform_byte(|| samples.next().unwrap()), 2);

        // Only the last sample is at level 1: weight 2^7
        let mut samples = [0u8, 0, 0, 0, 0, 0, 0, 75].into_iter();
        assert_eq!(waveform_byte(|| samples.next().unwrap()), 0x80);

        // Last sample at level 2: 256 wraps to 0
        let mut samples = [0u8, 0, 0, 0, 0, 0, 0, 100].into_iter();
        assert_eq!(waveform_byte(|| samples.next().unwrap()), 0);
    }

    #[test]
    fn test_encode_digital_waveform_fills_63_bytes() {
        let mut out = [0u8; PACKET_SIZE];
        let mut calls = 0;
        encode_digital_waveform(&mut out, || {
            calls += 1;
            60
        });
        assert_eq!(calls, 63 * 8);
        assert_eq!(out[0], 0x10);
        assert!(out[1..].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_encode_analog_series_leaves_last_byte() {
        let mut out = [0xAAu8; PACKET_SIZE];
        let mut calls = 0;
        encode_analog_series(&mut out, || {
            calls += 1;
            1000
        });
        assert_eq!(calls, SERIES_SLOTS);
        assert_eq!(out[0], 0x11);
        for i in (1..63).step_by(2) {
            assert_eq!((out[i], out[i + 1]), (0xE8, 0x03), "offset {i}");
        }
        assert_eq!(out[63], 0xAA);
    }

    #[test]
    fn test_encode_analog_series_order() {
        let mut out = [0u8; PACKET_SIZE];
        let mut next = 0u16;
        encode_analog_series(&mut out, || {
            next += 1;
            next
        });
        assert_eq!(&out[1..5], &[1, 0, 2, 0]);
        assert_eq!(&out[61..63], &[31, 0]);
    }
}
