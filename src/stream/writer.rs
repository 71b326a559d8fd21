//! Sequential little-endian output stream.
//!
//! Generic over the sink; encoding works into memory as well as files.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use super::packed::{parse_format, Packed};
use crate::util::{Error, Result};

/// Output stream for writing VEC3 data.
pub struct OStream<W> {
    writer: W,
    pos: u64,
}

impl OStream<BufWriter<File>> {
    /// Create a new output stream for the given file path.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        Ok(Self::new(BufWriter::with_capacity(1024 * 1024, file)))
    }
}

impl<W: Write> OStream<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self { writer, pos: 0 }
    }

    /// Get the current write position.
    #[inline]
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Release the underlying writer without flushing.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Flush and release the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }

    /// Write bytes and advance position.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        self.pos += data.len() as u64;
        Ok(())
    }

    /// Write a u32 value (little-endian).
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.writer.write_u32::<LittleEndian>(value)?;
        self.pos += 4;
        Ok(())
    }

    /// Write a u16 value (little-endian).
    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.writer.write_u16::<LittleEndian>(value)?;
        self.pos += 2;
        Ok(())
    }

    /// Write a u8 value.
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.writer.write_u8(value)?;
        self.pos += 1;
        Ok(())
    }

    /// Write an f32 value (little-endian).
    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.writer.write_f32::<LittleEndian>(value)?;
        self.pos += 4;
        Ok(())
    }

    /// Write the bytes of an ASCII string (no length, no terminator).
    pub fn write_ascii_string(&mut self, s: &str) -> Result<()> {
        if !s.is_ascii() {
            return Err(Error::NonAsciiName(s.to_string()));
        }
        self.write_bytes(s.as_bytes())
    }

    /// Write values according to a packed format string.
    ///
    /// Each value must match the kind of its field exactly.
    pub fn write_packed(&mut self, fmt: &str, values: &[Packed]) -> Result<()> {
        let kinds = parse_format(fmt)?;
        if kinds.len() != values.len() {
            return Err(Error::InvalidFormat(format!(
                "{:?} needs {} values, got {}",
                fmt,
                kinds.len(),
                values.len()
            )));
        }
        if let Some((kind, value)) = kinds.iter().zip(values).find(|(k, v)| **k != v.kind()) {
            return Err(Error::InvalidFormat(format!("{:?} does not fit {:?} field", value, kind)));
        }

        for value in values {
            match *value {
                Packed::U8(v) => self.write_u8(v)?,
                Packed::U16(v) => self.write_u16(v)?,
                Packed::U32(v) => self.write_u32(v)?,
                Packed::F32(v) => self.write_f32(v)?,
            }
        }
        Ok(())
    }

    /// Flush the buffer to the sink.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::IStream;

    #[test]
    fn test_write_le() {
        let mut s = OStream::new(Vec::new());
        s.write_u8(0x01).unwrap();
        s.write_u16(0x0302).unwrap();
        s.write_u32(0x07060504).unwrap();
        assert_eq!(s.pos(), 7);
        assert_eq!(s.into_inner(), vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_write_ascii() {
        let mut s = OStream::new(Vec::new());
        s.write_ascii_string("Mat").unwrap();
        assert!(matches!(s.write_ascii_string("Matériau"), Err(Error::NonAsciiName(_))));
        assert_eq!(s.into_inner(), b"Mat".to_vec());
    }

    #[test]
    fn test_write_packed() {
        let mut s = OStream::new(Vec::new());
        s.write_packed("3f", &[Packed::F32(1.0), Packed::F32(2.0), Packed::F32(3.0)]).unwrap();
        assert!(s.write_packed("2H", &[Packed::U16(1)]).is_err());
        assert!(s.write_packed("H", &[Packed::U32(1)]).is_err());
        let bytes = s.into_inner();
        assert_eq!(bytes.len(), 12);

        let mut r = IStream::new(&bytes[..]);
        let fields = r.read_packed("3f").unwrap();
        assert_eq!(fields[2], Packed::F32(3.0));
    }
}
