// Hardware Abstraction Layer (HAL) for board peripherals
//
// The dispatcher only needs three things from the board: flip an indicator,
// take a percentage reading, take a raw 10-bit reading.

use serde::{Deserialize, Serialize};

/// Board indicator (LED) identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorId(pub u8);

/// ADC input channel
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AnalogChannel(pub u8);

/// Full-scale value of a 10-bit reading
pub const ANALOG_10BIT_MAX: u16 = 1023;

/// Full-scale value of a percentage reading
pub const ANALOG_PERCENT_MAX: u8 = 100;

/// Peripheral access required by the command dispatcher
pub trait BoardHal {
    /// Invert the state of an indicator
    fn toggle_indicator(&mut self, id: IndicatorId);

    /// Sample `channel` scaled to 0..=100
    fn read_analog_percentage(&mut self, channel: AnalogChannel) -> u8;

    /// Sample `channel` as a raw value in 0..=1023
    fn read_analog_10bit(&mut self, channel: AnalogChannel) -> u16;
}

impl<H: BoardHal + ?Sized> BoardHal for &mut H {
    fn toggle_indicator(&mut self, id: IndicatorId) {
        (**self).toggle_indicator(id)
    }

    fn read_analog_percentage(&mut self, channel: AnalogChannel) -> u8 {
        (**self).read_analog_percentage(channel)
    }

    fn read_analog_10bit(&mut self, channel: AnalogChannel) -> u16 {
        (**self).read_analog_10bit(channel)
    }
}
