//! # Bus transfers to the PCD8544
//!
//! `SpiBackend` owns everything that touches the wire: the SPI peripheral, the control lines and
//! the one transfer buffer. Every command list and every glyph is staged in that buffer and sent
//! as one synchronous `write`. There is no retry; a failed transfer is returned to the caller.
use hal::blocking::spi::Write as SpiWrite;
use hal::digital::v2::OutputPin;

use crate::{
    error::PCDError,
    font::{GLYPH_COLUMNS, GLYPH_SIZE},
    lines::{ControlLines, Mode},
    TX_BUFFER_SIZE,
};

#[derive(Debug)]
pub struct SpiBackend<SPI, L> {
    spi: SPI,
    lines: ControlLines<L>,
    buffer: [u8; TX_BUFFER_SIZE],
}

impl<SPI, L> SpiBackend<SPI, L>
where
    SPI: SpiWrite<u8>,
    L: OutputPin,
{
    pub fn new(spi: SPI, lines: ControlLines<L>) -> Self {
        SpiBackend {
            spi,
            lines,
            buffer: [0u8; TX_BUFFER_SIZE],
        }
    }

    pub fn set_reset(&mut self, high: bool) -> Result<(), PCDError> {
        self.lines.set_reset(high)
    }

    pub fn set_mode(&mut self, mode: Mode) -> Result<(), PCDError> {
        self.lines.set_mode(mode)
    }

    /// Sends a command list with D/C low, as one transfer if it fits the buffer.
    pub fn write_commands(&mut self, commands: &[u8]) -> Result<(), PCDError> {
        self.lines.set_mode(Mode::Command)?;
        for chunk in commands.chunks(TX_BUFFER_SIZE) {
            self.buffer[..chunk.len()].copy_from_slice(chunk);
            self.transfer(chunk.len())?;
        }
        Ok(())
    }

    /// Sends one glyph followed by its blank columns as one transfer.
    ///
    /// D/C is left alone, the caller switches to data mode once for a whole run of glyphs.
    pub fn write_glyph(&mut self, columns: &[u8; GLYPH_COLUMNS]) -> Result<(), PCDError> {
        self.buffer[..GLYPH_COLUMNS].copy_from_slice(columns);
        self.buffer[GLYPH_COLUMNS..GLYPH_SIZE].fill(0x00);
        self.transfer(GLYPH_SIZE)
    }

    // the first `len` bytes of the buffer in one synchronous transfer
    fn transfer(&mut self, len: usize) -> Result<(), PCDError> {
        debug_assert!(len > 0 && len <= TX_BUFFER_SIZE);
        PCDError::spi(self.spi.write(&self.buffer[..len]))
    }
}

impl<SPI, L> SpiBackend<SPI, L> {
    /// Splits the backend, the lines are released by the caller.
    pub fn release(self) -> (SPI, ControlLines<L>) {
        (self.spi, self.lines)
    }
}
