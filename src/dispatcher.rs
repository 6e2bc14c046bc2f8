//! Command dispatcher
//!
//! Owns the inbound and outbound packet buffers and their transfer handles.
//! `run_once` is polled by the surrounding scheduler:
//!
//! ```text
//! inbound busy? ──yes──> return
//!      │ no
//! decode byte 0 ──> action ──> outbound busy? ──yes──> drop reply
//!      │                             │ no
//!      │                      encode + submit outbound
//!      └──────────────> re-arm inbound (always)
//! ```
//!
//! A buffer is only touched while its handle is not busy: check before
//! mutate, mutate before resubmit.

use custom_hid_transport::{
    EndpointDriver, EndpointFlags, Packet, PacketBuffer, TransferHandle, PACKET_SIZE,
};
use tracing::{debug, trace, warn};

use crate::config::DeviceConfig;
use crate::hal::{AnalogChannel, BoardHal};
use crate::opcode::Opcode;
use crate::reply;
use crate::stats::{DispatchOutcome, DispatchStats};

/// Single-endpoint command dispatcher
pub struct CommandDispatcher<D: EndpointDriver, H: BoardHal> {
    driver: D,
    board: H,
    config: DeviceConfig,
    inbound: PacketBuffer,
    outbound: PacketBuffer,
    inbound_handle: TransferHandle,
    outbound_handle: TransferHandle,
    initialized: bool,
    stats: DispatchStats,
    last_outcome: Option<DispatchOutcome>,
}

impl<D: EndpointDriver, H: BoardHal> CommandDispatcher<D, H> {
    /// Create a dispatcher. Nothing touches the endpoint until `initialize`.
    pub fn new(driver: D, board: H, config: DeviceConfig) -> Self {
        let inbound = PacketBuffer::new(config.buffers.inbound);
        let outbound = PacketBuffer::new(config.buffers.outbound);
        Self {
            driver,
            board,
            config,
            inbound,
            outbound,
            inbound_handle: TransferHandle::IDLE,
            outbound_handle: TransferHandle::IDLE,
            initialized: false,
            stats: DispatchStats::default(),
            last_outcome: None,
        }
    }

    /// Enable the endpoint and arm the first inbound transfer
    pub fn initialize(&mut self) {
        self.outbound_handle = TransferHandle::IDLE;
        let endpoint = self.config.endpoint;
        self.driver
            .enable_endpoint(endpoint, EndpointFlags::INTERRUPT_DUPLEX);
        self.inbound_handle = self
            .driver
            .submit_inbound(endpoint, &self.inbound, PACKET_SIZE);
        self.initialized = true;
        debug!(
            "Custom HID endpoint {endpoint} ready, inbound handle {}",
            self.inbound_handle.raw()
        );
    }

    /// Process at most one command. Never blocks.
    pub fn run_once(&mut self) {
        if !self.initialized {
            warn!("run_once called before initialize; ignoring");
            return;
        }
        if self.driver.is_busy(self.inbound_handle) {
            trace!("No inbound packet yet");
            return;
        }

        let byte = self.inbound.lock()[0];
        let outcome = match Opcode::from_byte(byte) {
            Some(op) => self.execute(op),
            None => {
                debug!("Ignoring unknown opcode 0x{byte:02X}");
                DispatchOutcome::UnknownOpcode(byte)
            }
        };
        self.stats.record(&outcome);
        self.last_outcome = Some(outcome);

        self.inbound_handle =
            self.driver
                .submit_inbound(self.config.endpoint, &self.inbound, PACKET_SIZE);
    }

    fn execute(&mut self, op: Opcode) -> DispatchOutcome {
        let channel = self.config.analog_channel;
        match op {
            Opcode::ToggleIndicator => {
                self.board.toggle_indicator(self.config.indicators.primary);
                self.board.toggle_indicator(self.config.indicators.secondary);
                debug!("{op}: indicators toggled");
                DispatchOutcome::Handled(op)
            }
            Opcode::GetInputState => self.reply_with(op, |out, _| reply::encode_input_state(out)),
            Opcode::ReadAnalog10Bit => self.reply_with(op, |out, board| {
                reply::encode_analog_10bit(out, board.read_analog_10bit(channel))
            }),
            Opcode::SampleDigitalWaveform => self.reply_with(op, |out, board| {
                reply::encode_digital_waveform(out, || board.read_analog_percentage(channel))
            }),
            Opcode::GenerateAnalogSeries => self.reply_with(op, |out, board| {
                reply::encode_analog_series(out, || board.read_analog_10bit(channel))
            }),
        }
    }

    /// Encode and submit a reply if the outbound transfer is free.
    ///
    /// The encoder (and with it every hardware read) only runs once the
    /// busy check has passed.
    fn reply_with<F>(&mut self, op: Opcode, encode: F) -> DispatchOutcome
    where
        F: FnOnce(&mut Packet, &mut H),
    {
        if self.driver.is_busy(self.outbound_handle) {
            warn!("{op}: outbound transfer busy, reply dropped");
            return DispatchOutcome::TransportBusy(op);
        }

        {
            let mut out = self.outbound.lock();
            encode(&mut *out, &mut self.board);
            trace!("{op} reply: {:02X?}", &out[..8]);
        }
        self.outbound_handle =
            self.driver
                .submit_outbound(self.config.endpoint, &self.outbound, PACKET_SIZE);
        debug!("{op}: reply queued, handle {}", self.outbound_handle.raw());
        DispatchOutcome::Replied(op)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Outcome of the most recent completed inbound packet
    pub fn last_outcome(&self) -> Option<DispatchOutcome> {
        self.last_outcome
    }

    pub fn inbound_handle(&self) -> TransferHandle {
        self.inbound_handle
    }

    pub fn outbound_handle(&self) -> TransferHandle {
        self.outbound_handle
    }

    /// Copy of the outbound packet as it currently stands
    pub fn outbound_snapshot(&self) -> Packet {
        self.outbound.snapshot()
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn analog_channel(&self) -> AnalogChannel {
        self.config.analog_channel
    }

    pub fn board(&self) -> &H {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut H {
        &mut self.board
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::IndicatorId;
    use custom_hid_transport::{BufferPlacement, LoopbackDriver};

    #[derive(Default)]
    struct FixedBoard {
        toggles: Vec<IndicatorId>,
        raw: u16,
    }

    impl BoardHal for FixedBoard {
        fn toggle_indicator(&mut self, id: IndicatorId) {
            self.toggles.push(id);
        }
        fn read_analog_percentage(&mut self, _channel: AnalogChannel) -> u8 {
            (u32::from(self.raw) * 100 / 1023) as u8
        }
        fn read_analog_10bit(&mut self, _channel: AnalogChannel) -> u16 {
            self.raw
        }
    }

    #[test]
    fn test_initialize_enables_and_arms() {
        let driver = LoopbackDriver::new();
        let host = driver.host_port();
        let mut dispatcher =
            CommandDispatcher::new(driver, FixedBoard::default(), DeviceConfig::default());
        assert!(!host.is_armed());

        dispatcher.initialize();
        assert!(dispatcher.is_initialized());
        assert!(host.is_armed());
        assert_eq!(host.endpoint(), Some((1, EndpointFlags::INTERRUPT_DUPLEX)));
        assert!(dispatcher.outbound_handle().is_idle());
        assert!(!dispatcher.inbound_handle().is_idle());
    }

    #[test]
    fn test_run_once_before_initialize_is_noop() {
        let driver = LoopbackDriver::new();
        let host = driver.host_port();
        let mut dispatcher =
            CommandDispatcher::new(driver, FixedBoard::default(), DeviceConfig::default());
        dispatcher.run_once();
        assert_eq!(host.submissions().inbound, 0);
        assert_eq!(dispatcher.stats(), DispatchStats::default());
        assert_eq!(dispatcher.last_outcome(), None);
    }

    #[test]
    fn test_toggle_uses_configured_indicators() {
        let mut config = DeviceConfig::default();
        config.indicators.primary = IndicatorId(7);
        config.indicators.secondary = IndicatorId(9);

        let driver = LoopbackDriver::new();
        let host = driver.host_port();
        let mut dispatcher = CommandDispatcher::new(driver, FixedBoard::default(), config);
        dispatcher.initialize();

        host.send(&[0x80]).unwrap();
        dispatcher.run_once();
        assert_eq!(
            dispatcher.board().toggles,
            vec![IndicatorId(7), IndicatorId(9)]
        );
        assert_eq!(
            dispatcher.last_outcome(),
            Some(DispatchOutcome::Handled(Opcode::ToggleIndicator))
        );
    }

    #[test]
    fn test_reply_on_configured_endpoint() {
        let mut config = DeviceConfig::default();
        config.endpoint = 4;
        let driver = LoopbackDriver::new();
        let host = driver.host_port();
        let board = FixedBoard {
            raw: 0x2F3,
            ..Default::default()
        };
        let mut dispatcher = CommandDispatcher::new(driver, board, config);
        dispatcher.initialize();
        assert_eq!(host.endpoint().map(|(ep, _)| ep), Some(4));

        host.send(&[0x37]).unwrap();
        dispatcher.run_once();
        let reply = host.receive().unwrap();
        assert_eq!(&reply[..3], &[0x37, 0xF3, 0x02]);
    }

    #[test]
    fn test_buffers_carry_configured_placement() {
        let mut config = DeviceConfig::default();
        config.buffers.inbound = BufferPlacement::FixedAddress { address: 0x500 };
        let dispatcher =
            CommandDispatcher::new(LoopbackDriver::new(), FixedBoard::default(), config);
        assert_eq!(
            dispatcher.inbound.placement(),
            BufferPlacement::FixedAddress { address: 0x500 }
        );
        assert_eq!(dispatcher.outbound.placement(), BufferPlacement::Default);
    }
}
