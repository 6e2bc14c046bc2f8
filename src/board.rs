//! Simulated board peripherals for running without hardware

use std::collections::BTreeMap;

use tracing::debug;

use crate::hal::{AnalogChannel, BoardHal, IndicatorId, ANALOG_10BIT_MAX, ANALOG_PERCENT_MAX};

/// What the simulated ADC returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalSource {
    /// Every read returns the same 10-bit level
    Constant(u16),
    /// Triangle wave between 0 and 1023, moving `step` per read
    Sweep { step: u16 },
}

impl Default for SignalSource {
    fn default() -> Self {
        SignalSource::Constant(ANALOG_10BIT_MAX / 2)
    }
}

/// In-memory board: indicator state plus a synthetic analog input
#[derive(Debug, Default)]
pub struct SimulatedBoard {
    source: SignalSource,
    level: u16,
    rising: bool,
    indicators: BTreeMap<IndicatorId, bool>,
    samples_taken: u64,
}

impl SimulatedBoard {
    pub fn new(source: SignalSource) -> Self {
        Self {
            source,
            rising: true,
            ..Default::default()
        }
    }

    /// Current state of an indicator (off until first toggled)
    pub fn indicator(&self, id: IndicatorId) -> bool {
        self.indicators.get(&id).copied().unwrap_or(false)
    }

    /// Total analog reads on any channel
    pub fn samples_taken(&self) -> u64 {
        self.samples_taken
    }

    fn next_sample(&mut self) -> u16 {
        self.samples_taken += 1;
        match self.source {
            SignalSource::Constant(level) => level.min(ANALOG_10BIT_MAX),
            SignalSource::Sweep { step } => {
                let value = self.level;
                if self.rising {
                    self.level = self.level.saturating_add(step).min(ANALOG_10BIT_MAX);
                    if self.level == ANALOG_10BIT_MAX {
                        self.rising = false;
                    }
                } else {
                    self.level = self.level.saturating_sub(step);
                    if self.level == 0 {
                        self.rising = true;
                    }
                }
                value
            }
        }
    }
}

/// Scale a 10-bit reading to 0..=100
pub fn to_percentage(raw: u16) -> u8 {
    let raw = u32::from(raw.min(ANALOG_10BIT_MAX));
    (raw * u32::from(ANALOG_PERCENT_MAX) / u32::from(ANALOG_10BIT_MAX)) as u8
}

impl BoardHal for SimulatedBoard {
    fn toggle_indicator(&mut self, id: IndicatorId) {
        let state = self.indicators.entry(id).or_insert(false);
        *state = !*state;
        debug!("Indicator {} -> {}", id.0, if *state { "on" } else { "off" });
    }

    fn read_analog_percentage(&mut self, _channel: AnalogChannel) -> u8 {
        let raw = self.next_sample();
        to_percentage(raw)
    }

    fn read_analog_10bit(&mut self, _channel: AnalogChannel) -> u16 {
        self.next_sample()
    }
}
