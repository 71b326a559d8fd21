//! Sequential little-endian input stream.

use std::io::{self, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use super::packed::{parse_format, FieldKind, Packed};
use crate::util::{Error, Result};

/// Largest up-front allocation made for a single `read_bytes` call.
const MAX_PREALLOC: usize = 1 << 20;

/// Input stream for reading VEC3 data.
///
/// Wraps any reader and tracks the byte position so truncation errors can
/// report where the input ran out.
pub struct IStream<R> {
    reader: R,
    pos: u64,
}

impl<R: Read> IStream<R> {
    /// Wrap a reader positioned at the start of the data.
    pub fn new(reader: R) -> Self {
        Self { reader, pos: 0 }
    }

    /// Get the current read position.
    #[inline]
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Release the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Map an I/O failure, turning a short read into `UnexpectedEof`.
    fn fail(&self, err: io::Error, wanted: usize) -> Error {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Error::UnexpectedEof(self.pos + wanted as u64)
        } else {
            Error::Io(err)
        }
    }

    /// Read a u8 value.
    pub fn read_u8(&mut self) -> Result<u8> {
        let value = self.reader.read_u8();
        let value = value.map_err(|e| self.fail(e, 1))?;
        self.pos += 1;
        Ok(value)
    }

    /// Read a u16 value (little-endian).
    pub fn read_u16(&mut self) -> Result<u16> {
        let value = self.reader.read_u16::<LittleEndian>();
        let value = value.map_err(|e| self.fail(e, 2))?;
        self.pos += 2;
        Ok(value)
    }

    /// Read a u32 value (little-endian).
    pub fn read_u32(&mut self) -> Result<u32> {
        let value = self.reader.read_u32::<LittleEndian>();
        let value = value.map_err(|e| self.fail(e, 4))?;
        self.pos += 4;
        Ok(value)
    }

    /// Read an f32 value (little-endian).
    pub fn read_f32(&mut self) -> Result<f32> {
        let value = self.reader.read_f32::<LittleEndian>();
        let value = value.map_err(|e| self.fail(e, 4))?;
        self.pos += 4;
        Ok(value)
    }

    /// Read exactly `len` bytes.
    ///
    /// Memory grows with the bytes actually present, so a corrupt length
    /// cannot trigger a huge allocation before the truncation is detected.
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(len.min(MAX_PREALLOC));
        let read = (&mut self.reader).take(len as u64).read_to_end(&mut buf);
        read.map_err(|e| self.fail(e, len))?;

        if buf.len() < len {
            return Err(Error::UnexpectedEof(self.pos + len as u64));
        }

        self.pos += len as u64;
        Ok(buf)
    }

    /// Read an ASCII string of exactly `len` bytes (no terminator).
    pub fn read_ascii_string(&mut self, len: usize) -> Result<String> {
        let start = self.pos;
        let bytes = self.read_bytes(len)?;
        if !bytes.is_ascii() {
            return Err(Error::invalid(format!("non-ASCII name at offset {}", start)));
        }
        String::from_utf8(bytes).map_err(|e| Error::invalid(format!("bad name at offset {}: {}", start, e)))
    }

    /// Read the fields described by a packed format string.
    pub fn read_packed(&mut self, fmt: &str) -> Result<Vec<Packed>> {
        parse_format(fmt)?
            .into_iter()
            .map(|kind| match kind {
                FieldKind::U8 => self.read_u8().map(Packed::U8),
                FieldKind::U16 => self.read_u16().map(Packed::U16),
                FieldKind::U32 => self.read_u32().map(Packed::U32),
                FieldKind::F32 => self.read_f32().map(Packed::F32),
            })
            .collect()
    }
}
