//! Recording platform for the integration tests.
//!
//! Every registry call, GPIO request/set/free and SPI transfer is appended to one shared event
//! log, in the order it happened.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use embedded_hal::blocking::spi::Write as SpiWrite;
use embedded_hal::digital::v2::OutputPin;

use pcd8544_chardev::{
    font::{GLYPH_COLUMNS, GLYPH_SIZE},
    platform::{CharDevRegistry, DevNum, GpioChip, Occupant, SpiBusRegistry},
    ChipSelect, Config, DeviceDescriptor, Font6x8, GlyphTable, DRIVER_NAME,
};

pub const RESET: u32 = 3;
pub const DC: u32 = 8;
pub const AT: ChipSelect = ChipSelect::new(0, 11);
pub const DEVT: DevNum = DevNum { major: 240, minor: 0 };

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    RegisterChrdev,
    UnregisterChrdev,
    CreateNode,
    DestroyNode,
    RegisterDriver,
    UnregisterDriver,
    AddDevice(ChipSelect),
    RemoveDevice(ChipSelect),
    Open(ChipSelect),
    Request(u32),
    Free(u32),
    Set(u32, bool),
    Transfer(Vec<u8>),
}

/// Where the fake platform refuses to cooperate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fail {
    Chrdev,
    Node,
    Driver,
    AddDevice,
    Open,
    Gpio(u32),
    /// the n-th transfer (counting from 0) fails
    Transfer(usize),
}

pub type Log = Arc<Mutex<Vec<Event>>>;

pub struct FakePlatform {
    pub log: Log,
    pub masters: Vec<u16>,
    pub occupants: Vec<(ChipSelect, Option<&'static str>)>,
    pub fail: Option<Fail>,
    pub added: Mutex<Vec<ChipSelect>>,
    pub transfers: Arc<AtomicUsize>,
}

impl FakePlatform {
    pub fn new() -> Self {
        FakePlatform {
            log: Arc::new(Mutex::new(Vec::new())),
            masters: vec![0],
            occupants: Vec::new(),
            fail: None,
            added: Mutex::new(Vec::new()),
            transfers: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(fail: Fail) -> Self {
        FakePlatform {
            fail: Some(fail),
            ..FakePlatform::new()
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.log.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }

    pub fn transfers(&self) -> Vec<Vec<u8>> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Transfer(bytes) => Some(bytes),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: Event) {
        self.log.lock().unwrap().push(event);
    }

    fn fails(&self, at: Fail) -> bool {
        self.fail == Some(at)
    }
}

pub struct FakeSpi {
    log: Log,
    transfers: Arc<AtomicUsize>,
    fail_at: Option<usize>,
}

impl SpiWrite<u8> for FakeSpi {
    type Error = &'static str;

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        let n = self.transfers.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == Some(n) {
            return Err("transfer timed out");
        }
        self.log.lock().unwrap().push(Event::Transfer(words.to_vec()));
        Ok(())
    }
}

pub struct FakeLine {
    gpio: u32,
    log: Log,
}

impl OutputPin for FakeLine {
    type Error = ();

    fn set_low(&mut self) -> Result<(), ()> {
        self.log.lock().unwrap().push(Event::Set(self.gpio, false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), ()> {
        self.log.lock().unwrap().push(Event::Set(self.gpio, true));
        Ok(())
    }
}

impl Drop for FakeLine {
    fn drop(&mut self) {
        self.log.lock().unwrap().push(Event::Free(self.gpio));
    }
}

impl CharDevRegistry for FakePlatform {
    type Error = &'static str;

    fn register_chrdev(&self, name: &'static str) -> Result<DevNum, Self::Error> {
        assert_eq!(name, DRIVER_NAME);
        if self.fails(Fail::Chrdev) {
            return Err("no free major");
        }
        self.record(Event::RegisterChrdev);
        Ok(DEVT)
    }

    fn unregister_chrdev(&self, devt: DevNum) {
        assert_eq!(devt, DEVT);
        self.record(Event::UnregisterChrdev);
    }

    fn create_node(&self, devt: DevNum, _name: &'static str) -> Result<(), Self::Error> {
        assert_eq!(devt, DEVT);
        if self.fails(Fail::Node) {
            return Err("class exists");
        }
        self.record(Event::CreateNode);
        Ok(())
    }

    fn destroy_node(&self, _devt: DevNum) {
        self.record(Event::DestroyNode);
    }
}

impl SpiBusRegistry for FakePlatform {
    type Spi = FakeSpi;
    type Error = &'static str;

    fn register_driver(&self, _name: &'static str) -> Result<(), Self::Error> {
        if self.fails(Fail::Driver) {
            return Err("driver exists");
        }
        self.record(Event::RegisterDriver);
        Ok(())
    }

    fn unregister_driver(&self, _name: &'static str) {
        self.record(Event::UnregisterDriver);
    }

    fn has_master(&self, bus: u16) -> bool {
        self.masters.contains(&bus)
    }

    fn occupant(&self, address: ChipSelect) -> Option<Occupant<'_>> {
        if let Some((_, driver)) = self.occupants.iter().find(|(at, _)| *at == address) {
            return Some(match driver {
                Some(name) => Occupant::Driver(name),
                None => Occupant::Unbound,
            });
        }
        if self.added.lock().unwrap().contains(&address) {
            return Some(Occupant::Driver(DRIVER_NAME));
        }
        None
    }

    fn add_device(&self, device: &DeviceDescriptor) -> Result<(), Self::Error> {
        if self.fails(Fail::AddDevice) {
            return Err("out of memory");
        }
        self.added.lock().unwrap().push(device.address);
        self.record(Event::AddDevice(device.address));
        Ok(())
    }

    fn remove_device(&self, address: ChipSelect) {
        self.added.lock().unwrap().retain(|at| *at != address);
        self.record(Event::RemoveDevice(address));
    }

    fn open(&self, address: ChipSelect) -> Result<FakeSpi, Self::Error> {
        if self.fails(Fail::Open) {
            return Err("no such device");
        }
        self.record(Event::Open(address));
        let fail_at = match self.fail {
            Some(Fail::Transfer(n)) => Some(n),
            _ => None,
        };
        Ok(FakeSpi {
            log: self.log.clone(),
            transfers: self.transfers.clone(),
            fail_at,
        })
    }
}

impl GpioChip for FakePlatform {
    type Line = FakeLine;
    type Error = &'static str;

    fn request(&self, gpio: u32, _label: &'static str) -> Result<FakeLine, Self::Error> {
        if self.fails(Fail::Gpio(gpio)) {
            return Err("line busy");
        }
        self.record(Event::Request(gpio));
        Ok(FakeLine {
            gpio,
            log: self.log.clone(),
        })
    }
}

pub fn config() -> Config {
    Config::new()
}

/// The 7 bytes a character turns into on the wire.
pub fn glyph_frame(code: u8) -> Vec<u8> {
    let columns: &[u8; GLYPH_COLUMNS] = Font6x8.glyph(code).expect("code has a glyph");
    let mut frame = columns.to_vec();
    frame.resize(GLYPH_SIZE, 0x00);
    frame
}

/// The release event matching an acquire event, if it has one.
pub fn release_of(event: &Event) -> Option<Event> {
    match event {
        Event::RegisterChrdev => Some(Event::UnregisterChrdev),
        Event::CreateNode => Some(Event::DestroyNode),
        Event::RegisterDriver => Some(Event::UnregisterDriver),
        Event::AddDevice(at) => Some(Event::RemoveDevice(*at)),
        Event::Request(gpio) => Some(Event::Free(*gpio)),
        _ => None,
    }
}

pub fn is_release(event: &Event) -> bool {
    matches!(
        event,
        Event::UnregisterChrdev
            | Event::DestroyNode
            | Event::UnregisterDriver
            | Event::RemoveDevice(_)
            | Event::Free(_)
    )
}
