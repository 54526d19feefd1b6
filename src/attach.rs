//! # Putting the display on the SPI bus
//!
//! The display is not discovered, it is declared: at load time the driver registers a SPI
//! peripheral at the configured chip select. That address may already be taken, for example by a
//! previous load of this driver that was not cleaned up, or by some other driver entirely.
//! `attach()` tells the three cases apart:
//!
//!  - nothing there: the peripheral is registered (`Registered`)
//!  - a peripheral bound to this driver, or to no driver yet: it is used as is (`AlreadyOurs`)
//!  - a peripheral bound to another driver: `PCDError::AttachConflict`, and the foreign
//!    registration is left alone
use core::fmt;

use hal::spi::{Mode, Phase, Polarity, MODE_0};

use crate::{
    error::{PCDError, Registration},
    platform::{Occupant, SpiBusRegistry},
    DRIVER_NAME,
};

/// Address of a peripheral: SPI bus number and chip select on that bus.
///
/// Displays as `spi<bus>.<cs>`, the name the bus gives the peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChipSelect {
    pub bus: u16,
    pub cs: u8,
}

impl ChipSelect {
    pub const fn new(bus: u16, cs: u8) -> Self {
        ChipSelect { bus, cs }
    }
}

impl fmt::Display for ChipSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "spi{}.{}", self.bus, self.cs)
    }
}

/// Everything the bus needs to register the display.
#[derive(Clone, Copy, PartialEq)]
pub struct DeviceDescriptor {
    pub address: ChipSelect,
    pub max_speed_hz: u32,
    pub mode: Mode,
    pub bits_per_word: u8,
    /// the PCD8544 has no interrupt line
    pub irq: Option<u32>,
    /// name of the driver that binds to this peripheral
    pub modalias: &'static str,
}

impl DeviceDescriptor {
    /// The PCD8544 wants SPI mode 0 and 8 bit words.
    pub fn new(address: ChipSelect, max_speed_hz: u32) -> Self {
        DeviceDescriptor {
            address,
            max_speed_hz,
            mode: MODE_0,
            bits_per_word: 8,
            irq: None,
            modalias: DRIVER_NAME,
        }
    }
}

// hal::spi::Mode, Polarity and Phase have no Debug, so they are formatted by hand
impl fmt::Debug for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceDescriptor")
            .field("address", &self.address)
            .field("max_speed_hz", &self.max_speed_hz)
            .field(
                "polarity",
                &format_args!(
                    "{}",
                    match self.mode.polarity {
                        Polarity::IdleLow => "IdleLow",
                        Polarity::IdleHigh => "IdleHigh",
                    }
                ),
            )
            .field(
                "phase",
                &format_args!(
                    "{}",
                    match self.mode.phase {
                        Phase::CaptureOnFirstTransition => "CaptureOnFirstTransition",
                        Phase::CaptureOnSecondTransition => "CaptureOnSecondTransition",
                    }
                ),
            )
            .field("bits_per_word", &self.bits_per_word)
            .field("irq", &self.irq)
            .field("modalias", &self.modalias)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    /// the peripheral was already there for us, nothing was registered
    AlreadyOurs,
    /// the peripheral was registered
    Registered,
}

pub fn attach<R>(registry: &R, address: ChipSelect, speed_hz: u32) -> Result<AttachOutcome, PCDError>
where
    R: SpiBusRegistry + ?Sized,
{
    if !registry.has_master(address.bus) {
        log::error!("no spi master for bus {}, is the bus controller driver loaded?", address.bus);
        return Err(PCDError::NoSuchBus(address.bus));
    }

    let device = DeviceDescriptor::new(address, speed_hz);

    match registry.occupant(address) {
        Some(Occupant::Driver(name)) if name != DRIVER_NAME => {
            log::error!("driver [{}] already registered for {}", name, address);
            Err(PCDError::AttachConflict(address))
        }
        Some(occupant) => {
            log::debug!("{} already present ({:?}), not registering", address, occupant);
            Ok(AttachOutcome::AlreadyOurs)
        }
        None => {
            registry.add_device(&device).map_err(|e| {
                log::error!("adding spi device {} failed: {:?}", address, e);
                PCDError::RegisterFailed(Registration::BusDevice)
            })?;
            log::debug!(
                "registered {} at {}Hz, mode 0, {} bits per word",
                address,
                speed_hz,
                device.bits_per_word
            );
            Ok(AttachOutcome::Registered)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use std::vec::Vec;

    struct NoSpi;

    impl hal::blocking::spi::Write<u8> for NoSpi {
        type Error = ();
        fn write(&mut self, _words: &[u8]) -> Result<(), ()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct Registry {
        masters: Vec<u16>,
        bound: Vec<(ChipSelect, Option<&'static str>)>,
        refuse: bool,
        added: RefCell<Vec<DeviceDescriptor>>,
    }

    impl SpiBusRegistry for Registry {
        type Spi = NoSpi;
        type Error = &'static str;

        fn register_driver(&self, _name: &'static str) -> Result<(), Self::Error> {
            Ok(())
        }

        fn unregister_driver(&self, _name: &'static str) {}

        fn has_master(&self, bus: u16) -> bool {
            self.masters.contains(&bus)
        }

        fn occupant(&self, address: ChipSelect) -> Option<Occupant<'_>> {
            self.bound
                .iter()
                .find(|(at, _)| *at == address)
                .map(|(_, driver)| match driver {
                    Some(name) => Occupant::Driver(name),
                    None => Occupant::Unbound,
                })
        }

        fn add_device(&self, device: &DeviceDescriptor) -> Result<(), Self::Error> {
            if self.refuse {
                return Err("out of memory");
            }
            self.added.borrow_mut().push(*device);
            Ok(())
        }

        fn remove_device(&self, _address: ChipSelect) {}

        fn open(&self, _address: ChipSelect) -> Result<NoSpi, Self::Error> {
            Ok(NoSpi)
        }
    }

    const AT: ChipSelect = ChipSelect::new(0, 11);

    #[test]
    fn registers_free_chip_select() {
        let registry = Registry {
            masters: vec![0],
            ..Registry::default()
        };
        assert_eq!(attach(&registry, AT, 2_000_000), Ok(AttachOutcome::Registered));

        let added = registry.added.borrow();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].address, AT);
        assert_eq!(added[0].max_speed_hz, 2_000_000);
        assert!(added[0].mode == MODE_0);
        assert_eq!(added[0].bits_per_word, 8);
        assert_eq!(added[0].irq, None);
        assert_eq!(added[0].modalias, "pcd8544");
    }

    #[test]
    fn own_registration_is_reused() {
        let registry = Registry {
            masters: vec![0],
            bound: vec![(AT, Some(DRIVER_NAME))],
            ..Registry::default()
        };
        assert_eq!(attach(&registry, AT, 2_000_000), Ok(AttachOutcome::AlreadyOurs));
        assert!(registry.added.borrow().is_empty());
    }

    #[test]
    fn unbound_peripheral_is_reused() {
        let registry = Registry {
            masters: vec![0],
            bound: vec![(AT, None)],
            ..Registry::default()
        };
        assert_eq!(attach(&registry, AT, 2_000_000), Ok(AttachOutcome::AlreadyOurs));
        assert!(registry.added.borrow().is_empty());
    }

    #[test]
    fn foreign_driver_is_a_conflict() {
        let registry = Registry {
            masters: vec![0],
            bound: vec![(AT, Some("spidev"))],
            ..Registry::default()
        };
        assert_eq!(attach(&registry, AT, 2_000_000), Err(PCDError::AttachConflict(AT)));
        assert!(registry.added.borrow().is_empty());
        assert_eq!(registry.occupant(AT), Some(Occupant::Driver("spidev")));
    }

    #[test]
    fn missing_master() {
        let registry = Registry::default();
        assert_eq!(attach(&registry, AT, 2_000_000), Err(PCDError::NoSuchBus(0)));
    }

    #[test]
    fn refused_registration() {
        let registry = Registry {
            masters: vec![0],
            refuse: true,
            ..Registry::default()
        };
        assert_eq!(
            attach(&registry, AT, 2_000_000),
            Err(PCDError::RegisterFailed(Registration::BusDevice))
        );
    }

    #[test]
    fn address_display() {
        assert_eq!(std::format!("{}", ChipSelect::new(1, 0)), "spi1.0");
    }

    #[test]
    fn descriptor_debug_shows_mode() {
        let device = DeviceDescriptor::new(AT, 2_000_000);
        let text = std::format!("{:?}", device);
        assert!(text.contains("polarity: IdleLow"));
        assert!(text.contains("phase: CaptureOnFirstTransition"));
        assert!(text.contains("modalias: \"pcd8544\""));
    }
}
