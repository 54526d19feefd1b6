//! # The RESET and Data/Command lines
//!
//! Both lines are plain outputs. They are requested together when the display is probed and
//! released together when it is removed. Releasing is dropping: a `ControlLines` that goes out of
//! scope frees RESET first and then D/C, whichever way the scope is left.
use hal::digital::v2::OutputPin;

use crate::{config::Config, error::PCDError, platform::GpioChip};

pub const RESET_LABEL: &str = "PCD8544 Reset Pin";
pub const DC_LABEL: &str = "PCD8544 Data/Command Pin";

/// What the controller does with the bytes of the next transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// D/C low, bytes are instructions
    Command,
    /// D/C high, bytes go to DDRAM
    Data,
}

#[derive(Debug)]
pub struct ControlLines<L> {
    // declaration order is release order
    rst: L,
    dc: L,
}

impl<L: OutputPin> ControlLines<L> {
    /// Requests RESET and D/C from the GPIO chip, both driven low.
    ///
    /// If D/C is unavailable, RESET is released again before returning the error.
    pub fn request<G>(gpio: &G, config: &Config) -> Result<Self, PCDError>
    where
        G: GpioChip<Line = L> + ?Sized,
    {
        let rst = request_output(gpio, config.reset_gpio, RESET_LABEL)?;
        let dc = request_output(gpio, config.dc_gpio, DC_LABEL)?;
        log::debug!(
            "control lines requested: reset={}, dc={}",
            config.reset_gpio,
            config.dc_gpio
        );
        Ok(ControlLines { rst, dc })
    }

    /// Uses two already configured output pins.
    pub fn from_pins(rst: L, dc: L) -> Self {
        ControlLines { rst, dc }
    }

    /// Drives RESET. Low holds the controller in reset.
    pub fn set_reset(&mut self, high: bool) -> Result<(), PCDError> {
        if high {
            PCDError::pin(self.rst.set_high())
        } else {
            PCDError::pin(self.rst.set_low())
        }
    }

    pub fn set_mode(&mut self, mode: Mode) -> Result<(), PCDError> {
        match mode {
            Mode::Command => PCDError::pin(self.dc.set_low()),
            Mode::Data => PCDError::pin(self.dc.set_high()),
        }
    }
}

impl<L> ControlLines<L> {
    /// Gives both lines back, RESET first.
    pub fn release(self) {
        let ControlLines { rst, dc } = self;
        drop(rst);
        drop(dc);
        log::debug!("control lines released");
    }
}

fn request_output<G>(gpio: &G, line: u32, label: &'static str) -> Result<G::Line, PCDError>
where
    G: GpioChip + ?Sized,
{
    gpio.request(line, label).map_err(|e| {
        log::error!("gpio_request({}, \"{}\") failed: {:?}", line, label, e);
        PCDError::GpioUnavailable(line)
    })
}
