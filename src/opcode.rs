//! Opcode decoding for inbound command packets

use std::fmt;

use custom_hid_transport::cmd;

/// Commands the device understands (byte 0 of an inbound packet)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    ToggleIndicator = cmd::TOGGLE_INDICATOR,
    GetInputState = cmd::GET_INPUT_STATE,
    ReadAnalog10Bit = cmd::READ_ANALOG_10BIT,
    SampleDigitalWaveform = cmd::SAMPLE_DIGITAL_WAVEFORM,
    GenerateAnalogSeries = cmd::GENERATE_ANALOG_SERIES,
}

impl Opcode {
    /// All recognized opcodes
    pub const ALL: [Opcode; 5] = [
        Opcode::ToggleIndicator,
        Opcode::GetInputState,
        Opcode::ReadAnalog10Bit,
        Opcode::SampleDigitalWaveform,
        Opcode::GenerateAnalogSeries,
    ];

    /// Decode a command byte. `None` for anything outside the closed set.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            cmd::TOGGLE_INDICATOR => Some(Opcode::ToggleIndicator),
            cmd::GET_INPUT_STATE => Some(Opcode::GetInputState),
            cmd::READ_ANALOG_10BIT => Some(Opcode::ReadAnalog10Bit),
            cmd::SAMPLE_DIGITAL_WAVEFORM => Some(Opcode::SampleDigitalWaveform),
            cmd::GENERATE_ANALOG_SERIES => Some(Opcode::GenerateAnalogSeries),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Whether the command answers with an outbound packet
    pub fn has_reply(self) -> bool {
        !matches!(self, Opcode::ToggleIndicator)
    }

    pub fn name(self) -> &'static str {
        cmd::name(self.as_byte())
    }
}

impl TryFrom<u8> for Opcode {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Opcode::from_byte(byte).ok_or(byte)
    }
}

impl From<Opcode> for u8 {
    fn from(op: Opcode) -> u8 {
        op.as_byte()
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02X})", self.name(), self.as_byte())
    }
}
