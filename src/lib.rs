//! # PCD8544 text sink driver
//!
//! Exposes a PCD8544 (Nokia 5110) display as a plain byte sink: every byte written is looked up
//! in a 6x8 ascii font and streamed to the controller as one glyph. The display is attached to a
//! registered SPI bus at a fixed chip select, with two GPIO lines for RESET and Data/Command.
//!
//! The crate is split along the way the driver is brought up:
//!  - `driver::Driver::load()` registers the character device, the device node, the bus driver and
//!    the SPI peripheral, then probes the display. Dropping the driver tears everything down in
//!    reverse order.
//!  - `display::Session` is the probed display. It runs the init sequence once and renders text
//!    with `render()` (or `write!`).
//!  - the `platform` traits are everything the driver needs from the OS: registries, the SPI bus
//!    and the GPIO chip.
#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

extern crate embedded_hal as hal;

pub mod attach;
pub mod backend;
pub mod chardev;
pub mod config;
pub mod display;
pub mod driver;
pub mod error;
pub mod font;
pub mod instructions;
pub mod lines;
pub mod platform;

/// Name of the driver, used as SPI modalias, character device region and device node name.
pub const DRIVER_NAME: &str = "pcd8544";

/// Size of the transfer buffer. Every glyph and the init sequence are staged through it.
pub const TX_BUFFER_SIZE: usize = 32;

pub use crate::{
    attach::{AttachOutcome, ChipSelect, DeviceDescriptor},
    config::Config,
    display::Session,
    driver::Driver,
    error::{PCDError, WriteError},
    font::{Font6x8, GlyphTable, GLYPH_SIZE},
};
