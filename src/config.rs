//! Wiring of the display
//!
//! The defaults describe the reference board: the PCD8544 on SPI bus 0, chip select 11, clocked
//! at 2MHz, with RESET on GPIO 3 and Data/Command on GPIO 8.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{attach::ChipSelect, error::PCDError};

/// The PCD8544 serial interface is specified up to 4MHz
pub const MAX_SPEED_HZ: u32 = 4_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// number of the SPI master the display hangs on
    pub bus: u16,
    /// chip select of the display on that bus
    pub chip_select: u8,
    /// SPI clock, fixed for every transfer
    pub speed_hz: u32,
    /// GPIO connected to RST on the display
    pub reset_gpio: u32,
    /// GPIO connected to DC on the display
    pub dc_gpio: u32,
}

impl Config {
    pub const fn new() -> Self {
        Config {
            bus: 0,
            chip_select: 11,
            speed_hz: 2_000_000,
            reset_gpio: 3,
            dc_gpio: 8,
        }
    }

    pub fn address(&self) -> ChipSelect {
        ChipSelect::new(self.bus, self.chip_select)
    }

    /// Checks the clock against the controller limit and that both control lines are distinct.
    pub fn validate(&self) -> Result<(), PCDError> {
        if self.speed_hz == 0 || self.speed_hz > MAX_SPEED_HZ {
            log::error!("spi clock of {}Hz is out of range", self.speed_hz);
            return Err(PCDError::InvalidConfig);
        }
        if self.reset_gpio == self.dc_gpio {
            log::error!("reset and data/command share gpio {}", self.reset_gpio);
            return Err(PCDError::InvalidConfig);
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_board() {
        let config = Config::default();
        assert_eq!(config.address(), ChipSelect::new(0, 11));
        assert_eq!(config.speed_hz, 2_000_000);
        assert_eq!((config.reset_gpio, config.dc_gpio), (3, 8));
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_wiring() {
        let too_fast = Config { speed_hz: 8_000_000, ..Config::new() };
        assert_eq!(too_fast.validate(), Err(PCDError::InvalidConfig));

        let stopped = Config { speed_hz: 0, ..Config::new() };
        assert_eq!(stopped.validate(), Err(PCDError::InvalidConfig));

        let shared = Config { dc_gpio: 3, ..Config::new() };
        assert_eq!(shared.validate(), Err(PCDError::InvalidConfig));
    }
}
