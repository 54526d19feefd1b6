//! # What the driver needs from the operating system
//!
//! The driver does not talk to registries or pin controllers directly. Whoever hosts it provides
//! these traits: a character device registry for the device node, the SPI bus registry for
//! driver and peripheral registration, and a GPIO chip for the two control lines.
//!
//! All methods take `&self`; the registries are shared, process wide services and do their own
//! locking.
use core::fmt::Debug;

use hal::blocking::spi::Write as SpiWrite;
use hal::digital::v2::OutputPin;

use crate::attach::{ChipSelect, DeviceDescriptor};

/// Major/minor number of a registered character device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DevNum {
    pub major: u32,
    pub minor: u32,
}

/// What is currently registered at a chip select
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupant<'a> {
    /// a peripheral exists but no driver is bound to it
    Unbound,
    /// a peripheral exists and is bound to the named driver
    Driver(&'a str),
}

pub trait CharDevRegistry {
    type Error: Debug;

    /// allocate a device number region and add the character device
    fn register_chrdev(&self, name: &'static str) -> Result<DevNum, Self::Error>;

    fn unregister_chrdev(&self, devt: DevNum);

    /// create the device class and the node users open
    fn create_node(&self, devt: DevNum, name: &'static str) -> Result<(), Self::Error>;

    fn destroy_node(&self, devt: DevNum);
}

pub trait SpiBusRegistry {
    /// handle to a registered peripheral, every write is one synchronous transfer
    type Spi: SpiWrite<u8>;
    type Error: Debug;

    fn register_driver(&self, name: &'static str) -> Result<(), Self::Error>;

    fn unregister_driver(&self, name: &'static str);

    /// true if a SPI master with this bus number exists
    fn has_master(&self, bus: u16) -> bool;

    /// the peripheral registered at `address`, if any
    fn occupant(&self, address: ChipSelect) -> Option<Occupant<'_>>;

    fn add_device(&self, device: &DeviceDescriptor) -> Result<(), Self::Error>;

    /// unregister the peripheral at `address`; nothing happens if there is none
    fn remove_device(&self, address: ChipSelect);

    /// open the peripheral at `address` for transfers
    fn open(&self, address: ChipSelect) -> Result<Self::Spi, Self::Error>;
}

pub trait GpioChip {
    /// an output line, freed again when dropped
    type Line: OutputPin;
    type Error: Debug;

    /// request `gpio` as output, driven low
    fn request(&self, gpio: u32, label: &'static str) -> Result<Self::Line, Self::Error>;
}

/// Everything the driver lifecycle needs, in one bound.
pub trait Platform: CharDevRegistry + SpiBusRegistry + GpioChip {}

impl<T: CharDevRegistry + SpiBusRegistry + GpioChip> Platform for T {}
