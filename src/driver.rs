//! # Loading and unloading the driver
//!
//! `Driver::load()` acquires, in this order:
//!
//!  1. the character device (device number region + cdev)
//!  2. the device class and node
//!  3. the SPI driver registration
//!  4. the SPI peripheral at the configured chip select
//!
//! and then probes the display, which requests RESET and D/C and sends the init sequence.
//!
//! Every acquired step is held as a guard that undoes it when dropped. The guards are fields of
//! `Driver`, declared in reverse acquisition order, so dropping the driver (or a load that fails
//! half way) releases exactly what was acquired, last step first.
use crate::{
    attach::{self, AttachOutcome, ChipSelect},
    chardev::{self, UserBuffer},
    config::Config,
    display::Session,
    error::{PCDError, Registration, WriteError},
    font::{Font6x8, GlyphTable},
    lines::ControlLines,
    platform::{DevNum, GpioChip, Platform, SpiBusRegistry},
    DRIVER_NAME,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resource {
    CharDevice(DevNum),
    DeviceNode(DevNum),
    BusDriver,
    BusDevice(ChipSelect),
}

// one acquired load step, undone on drop
struct Acquired<'p, P: Platform> {
    platform: &'p P,
    resource: Resource,
}

impl<'p, P: Platform> Acquired<'p, P> {
    fn new(platform: &'p P, resource: Resource) -> Self {
        Acquired { platform, resource }
    }
}

impl<'p, P: Platform> Drop for Acquired<'p, P> {
    fn drop(&mut self) {
        match self.resource {
            Resource::BusDevice(address) => {
                log::debug!("unregistering spi device {}", address);
                self.platform.remove_device(address);
            }
            Resource::BusDriver => {
                log::debug!("unregistering spi driver");
                self.platform.unregister_driver(DRIVER_NAME);
            }
            Resource::DeviceNode(devt) => {
                log::debug!("destroying device node {}:{}", devt.major, devt.minor);
                self.platform.destroy_node(devt);
            }
            Resource::CharDevice(devt) => {
                log::debug!("releasing character device {}:{}", devt.major, devt.minor);
                self.platform.unregister_chrdev(devt);
            }
        }
    }
}

pub struct Driver<'p, P: Platform, F = Font6x8> {
    // drop order is the reverse of load order
    session: Option<Session<<P as SpiBusRegistry>::Spi, <P as GpioChip>::Line, F>>,
    _device: Acquired<'p, P>,
    _bus_driver: Acquired<'p, P>,
    _node: Acquired<'p, P>,
    _chrdev: Acquired<'p, P>,
    platform: &'p P,
    devt: DevNum,
    config: Config,
    outcome: AttachOutcome,
    font: F,
}

impl<'p, P: Platform> Driver<'p, P> {
    /// Loads the driver with the built-in font.
    pub fn load(platform: &'p P, config: Config) -> Result<Self, PCDError> {
        Driver::load_with_font(platform, config, Font6x8)
    }
}

impl<'p, P, F> Driver<'p, P, F>
where
    P: Platform,
    F: GlyphTable + Clone,
{
    /// Registers everything, attaches the peripheral and probes the display.
    ///
    /// On failure everything acquired so far is released again before the error is returned.
    pub fn load_with_font(platform: &'p P, config: Config, font: F) -> Result<Self, PCDError> {
        config.validate()?;

        let devt = platform.register_chrdev(DRIVER_NAME).map_err(|e| {
            log::error!("registering character device failed: {:?}", e);
            PCDError::RegisterFailed(Registration::CharDevice)
        })?;
        let chrdev = Acquired::new(platform, Resource::CharDevice(devt));

        platform.create_node(devt, DRIVER_NAME).map_err(|e| {
            log::error!("creating device node {} failed: {:?}", DRIVER_NAME, e);
            PCDError::RegisterFailed(Registration::DeviceNode)
        })?;
        let node = Acquired::new(platform, Resource::DeviceNode(devt));

        platform.register_driver(DRIVER_NAME).map_err(|e| {
            log::error!("registering spi driver failed: {:?}", e);
            PCDError::RegisterFailed(Registration::BusDriver)
        })?;
        let bus_driver = Acquired::new(platform, Resource::BusDriver);

        let address = config.address();
        let outcome = attach::attach(platform, address, config.speed_hz)?;
        let device = Acquired::new(platform, Resource::BusDevice(address));

        let mut driver = Driver {
            session: None,
            _device: device,
            _bus_driver: bus_driver,
            _node: node,
            _chrdev: chrdev,
            platform,
            devt,
            config,
            outcome,
            font,
        };
        driver.probe()?;

        log::info!(
            "{} loaded on {} as {}:{}",
            DRIVER_NAME,
            address,
            devt.major,
            devt.minor
        );
        Ok(driver)
    }

    /// Binds the display: opens the peripheral, requests the control lines and initializes it.
    ///
    /// Does nothing if the display is already probed.
    pub fn probe(&mut self) -> Result<(), PCDError> {
        if self.session.is_some() {
            return Ok(());
        }

        let address = self.config.address();
        let spi = self.platform.open(address).map_err(|e| {
            log::error!("opening {} failed: {:?}", address, e);
            PCDError::NoSuchDevice(address)
        })?;
        let lines = ControlLines::request(self.platform, &self.config)?;
        let session = Session::attach(spi, lines, self.font.clone())?;

        log::debug!("probed {}", address);
        self.session = Some(session);
        Ok(())
    }

    /// Renders a caller buffer, see `chardev::write()`.
    pub fn write<U>(&self, src: &U) -> Result<usize, WriteError>
    where
        U: UserBuffer + ?Sized,
    {
        match &self.session {
            Some(session) => chardev::write(session, src),
            None => Err(WriteError::new(0, PCDError::NotAttached)),
        }
    }

    /// The probed display, if any.
    pub fn session(&self) -> Option<&Session<<P as SpiBusRegistry>::Spi, <P as GpioChip>::Line, F>> {
        self.session.as_ref()
    }
}

impl<'p, P: Platform, F> Driver<'p, P, F> {
    /// Unbinds the display and releases the control lines. The registrations stay.
    pub fn remove(&mut self) {
        if let Some(session) = self.session.take() {
            session.detach();
            log::debug!("removed {}", self.config.address());
        }
    }

    pub fn is_attached(&self) -> bool {
        self.session.is_some()
    }

    /// How the peripheral was found at load time.
    pub fn attach_outcome(&self) -> AttachOutcome {
        self.outcome
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Device number of the character device.
    pub fn devt(&self) -> DevNum {
        self.devt
    }

    /// Removes the display and releases every registration, last one first.
    pub fn unload(self) {
        drop(self)
    }
}

impl<'p, P: Platform, F> Drop for Driver<'p, P, F> {
    fn drop(&mut self) {
        self.remove();
        log::info!("{} unloading", DRIVER_NAME);
    }
}
