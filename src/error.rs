//! Errors of the PCD8544 driver
//!
//! Everything the driver can fail on ends up in `PCDError`. Errors coming out of embedded_hal
//! pins and SPI are generic and often not `Debug`, so they are folded into `Pin` and
//! `BusTransport` with the `pin()` and `spi()` helpers.
use thiserror::Error;

use crate::attach::ChipSelect;

/// Which registration was refused while loading the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// character device region and cdev
    CharDevice,
    /// device class and node
    DeviceNode,
    /// SPI driver registration
    BusDriver,
    /// SPI peripheral at the configured chip select
    BusDevice,
}

impl core::fmt::Display for Registration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Registration::CharDevice => "character device",
            Registration::DeviceNode => "device node",
            Registration::BusDriver => "spi driver",
            Registration::BusDevice => "spi device",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PCDError {
    /// a SPI transfer failed at the bus level
    #[error("spi transfer failed")]
    BusTransport,

    /// a control line could not be driven
    #[error("control line could not be set")]
    Pin,

    /// there is no SPI master with this bus number
    #[error("no spi master for bus {0}")]
    NoSuchBus(u16),

    /// the chip select is already bound to a different driver
    #[error("{0} is claimed by another driver")]
    AttachConflict(ChipSelect),

    #[error("registering the {0} failed")]
    RegisterFailed(Registration),

    /// the SPI peripheral could not be opened for transfers
    #[error("no spi device at {0}")]
    NoSuchDevice(ChipSelect),

    #[error("gpio {0} is unavailable")]
    GpioUnavailable(u32),

    /// the byte has no glyph in the font
    #[error("no glyph for byte {0:#04x}")]
    GlyphOutOfRange(u8),

    /// the caller's buffer could not be read
    #[error("could not copy from caller buffer")]
    CopyFault,

    /// the display is not probed (removed or never attached)
    #[error("display is not attached")]
    NotAttached,

    #[error("invalid configuration")]
    InvalidConfig,
}

const EIO: i32 = 5;
const ENOMEM: i32 = 12;
const EFAULT: i32 = 14;
const EBUSY: i32 = 16;
const ENODEV: i32 = 19;
const EINVAL: i32 = 22;

impl PCDError {
    /// maps any pin error into `PCDError::Pin`
    pub fn pin<T, E>(result: Result<T, E>) -> Result<T, PCDError> {
        result.map_err(|_| PCDError::Pin)
    }

    /// maps any SPI error into `PCDError::BusTransport`
    pub fn spi<T, E>(result: Result<T, E>) -> Result<T, PCDError> {
        result.map_err(|_| PCDError::BusTransport)
    }

    /// Negative errno as returned through a file interface.
    pub fn errno(&self) -> i32 {
        -match self {
            PCDError::BusTransport | PCDError::Pin => EIO,
            PCDError::NoSuchBus(_) | PCDError::NoSuchDevice(_) | PCDError::NotAttached => ENODEV,
            PCDError::AttachConflict(_) | PCDError::GpioUnavailable(_) => EBUSY,
            PCDError::RegisterFailed(_) => ENOMEM,
            PCDError::GlyphOutOfRange(_) | PCDError::InvalidConfig => EINVAL,
            PCDError::CopyFault => EFAULT,
        }
    }
}

/// A write that stopped early. `written` bytes were rendered before `error` occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("write stopped after {written} bytes")]
pub struct WriteError {
    pub written: usize,
    #[source]
    pub error: PCDError,
}

impl WriteError {
    pub fn new(written: usize, error: PCDError) -> Self {
        WriteError { written, error }
    }
}
