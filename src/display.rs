//! # The probed display
//!
//! A `Session` exists from the moment the display is probed until it is removed. Creating one
//! brings the controller up: RESET goes high and the init sequence goes out in command mode, as a
//! single transfer. After that the display is a text sink. `render()` switches D/C to data mode
//! once and sends one glyph per byte, in order. There is no cursor, wrapping or escape handling;
//! the controller advances its own address pointer and wraps at the end of the screen.
//!
//! The backend (SPI, control lines, transfer buffer) sits behind a mutex. A render call holds it
//! for its whole length, so writers on different threads never interleave inside a glyph, and
//! never flip D/C under each other.
//!
//! The mutex spins. A writer waiting for it busy-waits until the render holding it is done, so
//! hosts with many concurrent writers should queue them before they get here.
//!
//! Rendering stops at the first byte it cannot send, either because there is no glyph for it or
//! because the transfer failed. The session stays usable for the next call.
use core::fmt::{Error as FmtError, Result as FmtResult, Write};

use hal::blocking::spi::Write as SpiWrite;
use hal::digital::v2::OutputPin;
use spin::Mutex;

use crate::{
    backend::SpiBackend,
    error::{PCDError, WriteError},
    font::{Font6x8, GlyphTable},
    instructions::INIT_SEQUENCE,
    lines::{ControlLines, Mode},
};

pub struct Session<SPI, L, F = Font6x8> {
    backend: Mutex<SpiBackend<SPI, L>>,
    font: F,
}

impl<SPI, L, F> Session<SPI, L, F>
where
    SPI: SpiWrite<u8>,
    L: OutputPin,
    F: GlyphTable,
{
    /// Takes over a probed display and initializes it.
    ///
    /// Arguments:
    ///
    /// - spi: the peripheral, every `write` is one transfer at the configured clock
    /// - lines: RESET and D/C, as requested (both low)
    /// - font: glyphs used by `render()`
    ///
    /// If initialization fails the lines are released before the error is returned.
    pub fn attach(spi: SPI, lines: ControlLines<L>, font: F) -> Result<Self, PCDError> {
        let mut backend = SpiBackend::new(spi, lines);
        if let Err(e) = init(&mut backend) {
            log::error!("display initialization failed: {}", e);
            let (_, lines) = backend.release();
            lines.release();
            return Err(e);
        }
        log::debug!("display initialized");
        Ok(Session {
            backend: Mutex::new(backend),
            font,
        })
    }

    /// Pulses RESET and sends the init sequence again.
    ///
    /// Display contents are lost, the address pointer is back at the top left.
    pub fn reset(&self) -> Result<(), PCDError> {
        let mut backend = self.backend.lock();
        backend.set_reset(false)?;
        init(&mut *backend)
    }

    /// Renders `text` as glyphs, one transfer per byte.
    ///
    /// Returns the number of bytes rendered. On failure the error carries how many bytes made it
    /// to the display before the failing one; nothing after it is sent.
    pub fn render(&self, text: &[u8]) -> Result<usize, WriteError> {
        if text.is_empty() {
            return Ok(0);
        }

        let mut backend = self.backend.lock();
        backend
            .set_mode(Mode::Data)
            .map_err(|e| WriteError::new(0, e))?;

        for (written, &code) in text.iter().enumerate() {
            let sent = match self.font.glyph(code) {
                Some(columns) => backend.write_glyph(columns),
                None => Err(PCDError::GlyphOutOfRange(code)),
            };
            if let Err(e) = sent {
                log::warn!("render stopped after {} of {} bytes: {}", written, text.len(), e);
                return Err(WriteError::new(written, e));
            }
        }
        Ok(text.len())
    }
}

impl<SPI, L, F> Session<SPI, L, F> {
    /// Ends the session and releases RESET and D/C.
    pub fn detach(self) {
        let (_, lines) = self.backend.into_inner().release();
        lines.release();
        log::debug!("display detached");
    }
}

// RESET high, then the init sequence in command mode as one transfer
fn init<SPI, L>(backend: &mut SpiBackend<SPI, L>) -> Result<(), PCDError>
where
    SPI: SpiWrite<u8>,
    L: OutputPin,
{
    backend.set_reset(true)?;
    backend.write_commands(&INIT_SEQUENCE)
}

// write!() works on the display. writeln!() renders the text and then fails, a newline has no
// glyph.
impl<SPI, L, F> Write for Session<SPI, L, F>
where
    SPI: SpiWrite<u8>,
    L: OutputPin,
    F: GlyphTable,
{
    fn write_str(&mut self, s: &str) -> FmtResult {
        self.render(s.as_bytes()).map(|_| ()).map_err(|_| FmtError)
    }
}
