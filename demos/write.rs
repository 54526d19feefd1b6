use embedded_hal::blocking::spi::Write as SpiWrite;
use embedded_hal::digital::v2::OutputPin;
use pcd8544_chardev::{
    platform::{CharDevRegistry, DevNum, GpioChip, Occupant, SpiBusRegistry},
    ChipSelect, Config, DeviceDescriptor, Driver,
};
use std::cell::Cell;
use std::convert::Infallible;

/// Prints every transfer instead of clocking it out
pub struct PrintSpi;

impl SpiWrite<u8> for PrintSpi {
    type Error = Infallible;

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        println!("spi: {:02x?}", words);
        Ok(())
    }
}

pub struct PrintPin(u32);

impl OutputPin for PrintPin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        println!("gpio{}: low", self.0);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        println!("gpio{}: high", self.0);
        Ok(())
    }
}

/// One SPI master on bus 0, nothing attached yet
#[derive(Default)]
pub struct Board {
    attached: Cell<bool>,
}

impl CharDevRegistry for Board {
    type Error = Infallible;

    fn register_chrdev(&self, name: &'static str) -> Result<DevNum, Self::Error> {
        println!("register_chrdev({})", name);
        Ok(DevNum { major: 240, minor: 0 })
    }

    fn unregister_chrdev(&self, devt: DevNum) {
        println!("unregister_chrdev({}:{})", devt.major, devt.minor);
    }

    fn create_node(&self, _devt: DevNum, name: &'static str) -> Result<(), Self::Error> {
        println!("create /dev/{}", name);
        Ok(())
    }

    fn destroy_node(&self, _devt: DevNum) {
        println!("destroy node");
    }
}

impl SpiBusRegistry for Board {
    type Spi = PrintSpi;
    type Error = Infallible;

    fn register_driver(&self, name: &'static str) -> Result<(), Self::Error> {
        println!("spi_register_driver({})", name);
        Ok(())
    }

    fn unregister_driver(&self, name: &'static str) {
        println!("spi_unregister_driver({})", name);
    }

    fn has_master(&self, bus: u16) -> bool {
        bus == 0
    }

    fn occupant(&self, _address: ChipSelect) -> Option<Occupant<'_>> {
        self.attached.get().then_some(Occupant::Unbound)
    }

    fn add_device(&self, device: &DeviceDescriptor) -> Result<(), Self::Error> {
        println!(
            "spi_new_device({}, {} Hz, {})",
            device.address, device.max_speed_hz, device.modalias
        );
        self.attached.set(true);
        Ok(())
    }

    fn remove_device(&self, address: ChipSelect) {
        println!("spi_unregister_device({})", address);
        self.attached.set(false);
    }

    fn open(&self, _address: ChipSelect) -> Result<PrintSpi, Self::Error> {
        Ok(PrintSpi)
    }
}

impl GpioChip for Board {
    type Line = PrintPin;
    type Error = Infallible;

    fn request(&self, gpio: u32, label: &'static str) -> Result<PrintPin, Self::Error> {
        println!("gpio_request({}, \"{}\")", gpio, label);
        Ok(PrintPin(gpio))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let board = Board::default();
    let driver = Driver::load(&board, Config::new())?;

    let written = driver.write("Hello World")?;
    println!("{} bytes written", written);

    driver.unload();
    Ok(())
}
