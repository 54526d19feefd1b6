//! # The write side of the device node
//!
//! Whatever backs the device node hands the driver a buffer it may not be able to read in one go,
//! like user memory behind a system call. `UserBuffer` is that buffer. The driver copies it in
//! chunks of `CHUNK_SIZE` bytes onto the stack and renders chunk by chunk, so a write of any
//! length needs no allocation.
//!
//! Each chunk is rendered under the session lock. A concurrent writer can get its glyphs in
//! between two chunks, but never inside a glyph.
use hal::blocking::spi::Write as SpiWrite;
use hal::digital::v2::OutputPin;

use crate::{
    display::Session,
    error::{PCDError, WriteError},
    font::GlyphTable,
    TX_BUFFER_SIZE,
};

pub const CHUNK_SIZE: usize = TX_BUFFER_SIZE;

/// A caller owned buffer that is copied in before rendering.
pub trait UserBuffer {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy `dst.len()` bytes starting at `offset` into `dst`.
    ///
    /// Fails with `PCDError::CopyFault` if that part of the buffer cannot be read.
    fn copy_to(&self, offset: usize, dst: &mut [u8]) -> Result<(), PCDError>;
}

impl UserBuffer for [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn copy_to(&self, offset: usize, dst: &mut [u8]) -> Result<(), PCDError> {
        let src = self
            .get(offset..offset + dst.len())
            .ok_or(PCDError::CopyFault)?;
        dst.copy_from_slice(src);
        Ok(())
    }
}

impl UserBuffer for str {
    fn len(&self) -> usize {
        str::len(self)
    }

    fn copy_to(&self, offset: usize, dst: &mut [u8]) -> Result<(), PCDError> {
        self.as_bytes().copy_to(offset, dst)
    }
}

/// Copies `src` in and renders it.
///
/// Returns the number of bytes rendered. A copy fault or render error stops the write; the error
/// tells how many bytes were rendered before it.
pub fn write<SPI, L, F, U>(session: &Session<SPI, L, F>, src: &U) -> Result<usize, WriteError>
where
    SPI: SpiWrite<u8>,
    L: OutputPin,
    F: GlyphTable,
    U: UserBuffer + ?Sized,
{
    let mut chunk = [0u8; CHUNK_SIZE];
    let mut written = 0;

    while written < src.len() {
        let len = CHUNK_SIZE.min(src.len() - written);
        if let Err(e) = src.copy_to(written, &mut chunk[..len]) {
            log::warn!("copy from caller failed at byte {}", written);
            return Err(WriteError::new(written, e));
        }
        match session.render(&chunk[..len]) {
            Ok(n) => written += n,
            Err(e) => return Err(WriteError::new(written + e.written, e.error)),
        }
    }
    Ok(written)
}

/// Folds a write result into what a `write()` system call returns: the byte count if anything
/// was rendered, the negative errno otherwise.
pub fn ssize(result: Result<usize, WriteError>) -> isize {
    match result {
        Ok(n) => n as isize,
        Err(WriteError { written, error }) if written > 0 => {
            log::debug!("short write of {} bytes: {}", written, error);
            written as isize
        }
        Err(WriteError { error, .. }) => error.errno() as isize,
    }
}
