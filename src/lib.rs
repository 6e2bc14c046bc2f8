// Custom HID Device - Shared Library
// Command dispatch, reply encoding, and board access for the 64-byte
// custom HID protocol

pub mod board;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod hal;
pub mod opcode;
pub mod reply;
pub mod stats;

pub use board::{SignalSource, SimulatedBoard};
pub use config::{BufferConfig, DeviceConfig, IndicatorConfig};
pub use dispatcher::CommandDispatcher;
pub use error::ConfigError;
pub use hal::{AnalogChannel, BoardHal, IndicatorId};
pub use opcode::Opcode;
pub use stats::{DispatchOutcome, DispatchStats};

pub use custom_hid_transport::cmd;
