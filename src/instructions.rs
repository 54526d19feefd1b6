//! # The part of the PCD8544 instruction set used to bring the display up
//!
//! Instructions are written to resemble the data sheet:
//! <https://www.sparkfun.com/datasheets/LCD/Monochrome/Nokia5110.pdf>
//!
//! The driver only ever sends one fixed command list, `INIT_SEQUENCE`, right after reset. It
//! switches to the extended instruction set, sets the operating voltage, temperature
//! coefficient and bias, switches back and turns the display on in normal mode. Everything after
//! that is data: the controller advances its address pointer on its own for every byte.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
/// The Temperature Coefficient, the slope of the LCD voltage compensation (mV/K).
pub enum TemperatureCoefficient {
    /// Adds 1 mV/K
    TC0 = 0b00,
    /// Adds 9 mV/K
    TC1 = 0b01,
    /// Adds 17 mV/K
    TC2 = 0b10,
    /// Adds 24 mV/K
    TC3 = 0b11,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
/// The bias voltage for multiplexing the LCD glass, named after the multiplex ratio.
pub enum MuxRate {
    Bias1To100 = 0,
    Bias1To80 = 1,
    Bias1To65 = 2,
    Bias1To48 = 3,
    Bias1To40 = 4,
    Bias1To24 = 5,
    Bias1To18 = 6,
    Bias1To10 = 7,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DisplayMode {
    /// all pixels off
    DisplayBlank = 0b000,
    /// show DDRAM, a set bit is a black pixel
    Normal = 0b100,
    /// all pixels on
    AllSegmentsOn = 0b001,
    /// show DDRAM inverted
    InverseVideo = 0b101,
}

/// Instructions used during initialization, basic and extended.
///
/// FunctionSet selects with `h` which of the two sets the following instructions belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// pd: power down, v: vertical addressing, h: extended instruction set
    FunctionSet { pd: bool, v: bool, h: bool },

    /// basic set
    SetDisplayMode(DisplayMode),

    /// extended set
    SetTempCoefficient(TemperatureCoefficient),

    /// extended set
    SetBiasMode(MuxRate),

    /// extended set, operating voltage (contrast) in 0..128
    SetVop(u8),
}

use Instruction::*;

impl Instruction {
    /// The instruction as it goes over the wire.
    pub const fn byte(self) -> u8 {
        match self {
            FunctionSet { pd, v, h } => 0b0010_0000 | ((pd as u8) << 2) | ((v as u8) << 1) | h as u8,
            SetDisplayMode(mode) => 0b0000_1000 | mode as u8,
            SetTempCoefficient(coeff) => 0b0000_0100 | coeff as u8,
            SetBiasMode(mux) => 0b0001_0000 | mux as u8,
            SetVop(vop) => 0b1000_0000 | (vop & 0x7f),
        }
    }
}

/// Sent once in command mode after every reset.
pub const INIT_SEQUENCE: [u8; 6] = [
    FunctionSet { pd: false, v: false, h: true }.byte(),
    SetVop(0x2c).byte(),
    SetTempCoefficient(TemperatureCoefficient::TC0).byte(),
    SetBiasMode(MuxRate::Bias1To40).byte(),
    FunctionSet { pd: false, v: false, h: false }.byte(),
    SetDisplayMode(DisplayMode::Normal).byte(),
];
