//! Streaming binary writer.

use std::io::{Read, Seek, SeekFrom, Write};

use zerocopy::{Immutable, IntoBytes};

use crate::fixed::FixedValue;
use crate::scratch::{Scratch, CHUNK_SIZE};
use crate::{text, Error, Result};

/// A little-endian binary writer that tracks its stream offset.
#[derive(Debug)]
pub struct ByteWriter<W> {
    inner: W,
    position: u64,
    scratch: Scratch,
}

impl<W: Write> ByteWriter<W> {
    /// Create a writer whose first byte lands at offset 0.
    pub fn new(inner: W) -> Self {
        Self::with_position(inner, 0)
    }

    /// Create a writer whose first byte lands at `position`.
    pub fn with_position(inner: W, position: u64) -> Self {
        Self {
            inner,
            position,
            scratch: Scratch::new(),
        }
    }

    /// Current stream offset.
    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Flush and unwrap the underlying stream.
    pub fn into_inner(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Write raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        self.position += bytes.len() as u64;
        Ok(())
    }

    /// Write a fixed-width little-endian value.
    pub fn write_fixed<T: FixedValue>(&mut self, value: T) -> Result<()> {
        let buffer = self.scratch.get(T::SIZE);
        value.encode(buffer);
        self.inner.write_all(buffer)?;
        self.position += T::SIZE as u64;
        Ok(())
    }

    /// Write a single byte.
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write_bytes(&[value])
    }

    /// Write a little-endian u16.
    #[inline]
    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.write_fixed(value)
    }

    /// Write a little-endian i32.
    #[inline]
    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write_fixed(value)
    }

    /// Write a little-endian u32.
    #[inline]
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write_fixed(value)
    }

    /// Write a little-endian i64.
    #[inline]
    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.write_fixed(value)
    }

    /// Write a little-endian u64.
    #[inline]
    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.write_fixed(value)
    }

    /// Write a struct using zerocopy.
    pub fn write_struct<T: IntoBytes + Immutable>(&mut self, value: &T) -> Result<()> {
        self.write_bytes(value.as_bytes())
    }

    /// Write an i32 byte count followed by the code page 437 bytes of `value`.
    pub fn write_length_prefixed_string(&mut self, value: &str) -> Result<()> {
        let mut bytes = Vec::with_capacity(4 + value.len());
        bytes.extend_from_slice(&[0; 4]);
        text::encode_into(value, &mut bytes)?;
        let len = bytes.len() - 4;
        let len = i32::try_from(len).map_err(|_| Error::SizeOverflow {
            what: "string length",
            value: len as u64,
            limit: i32::MAX as u64,
        })?;
        len.encode(&mut bytes[..4]);
        self.write_bytes(&bytes)
    }

    /// Copy exactly `length` bytes from `src` in bounded chunks.
    pub fn copy_from<R: Read + ?Sized>(&mut self, src: &mut R, length: u64) -> Result<()> {
        let start = self.position;
        let mut remaining = length;
        while remaining > 0 {
            let chunk = remaining.min(CHUNK_SIZE as u64) as usize;
            let buffer = self.scratch.get(chunk);
            let read = loop {
                match src.read(buffer) {
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    other => break other?,
                }
            };
            if read == 0 {
                return Err(Error::UnexpectedEof {
                    offset: start,
                    needed: length,
                    available: length - remaining,
                });
            }
            self.inner.write_all(&buffer[..read])?;
            self.position += read as u64;
            remaining -= read as u64;
        }
        Ok(())
    }
}

impl<W: Write + Seek> ByteWriter<W> {
    /// Create a writer positioned wherever the stream currently is.
    pub fn from_current(mut inner: W) -> Result<Self> {
        let position = inner.stream_position()?;
        Ok(Self::with_position(inner, position))
    }

    /// Seek to an absolute offset.
    pub fn seek_to(&mut self, position: u64) -> Result<()> {
        self.position = self.inner.seek(SeekFrom::Start(position))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_write_primitives() {
        let mut writer = ByteWriter::new(Vec::new());
        writer.write_i32(1).unwrap();
        writer.write_u8(1).unwrap();
        writer.write_i64(-2).unwrap();
        assert_eq!(writer.position(), 13);

        let bytes = writer.into_inner().unwrap();
        assert_eq!(&bytes[..5], &[1, 0, 0, 0, 1]);
        assert_eq!(&bytes[5..], &[0xFE, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_length_prefixed_string() {
        let mut writer = ByteWriter::new(Vec::new());
        writer.write_length_prefixed_string("<g>:ü").unwrap();
        assert_eq!(
            writer.into_inner().unwrap(),
            vec![5, 0, 0, 0, b'<', b'g', b'>', b':', 0x81]
        );
    }

    #[test]
    fn test_unencodable_string_writes_nothing() {
        let mut writer = ByteWriter::new(Vec::new());
        assert!(writer.write_length_prefixed_string("€").is_err());
        assert_eq!(writer.position(), 0);
    }

    #[test]
    fn test_copy_from_short_source() {
        let mut writer = ByteWriter::new(Vec::new());
        let mut source = &[1u8, 2, 3][..];
        assert!(matches!(
            writer.copy_from(&mut source, 4),
            Err(Error::UnexpectedEof { needed: 4, available: 3, .. })
        ));
    }

    #[test]
    fn test_backfill_with_seek() {
        let mut writer = ByteWriter::new(Cursor::new(Vec::new()));
        writer.write_u32(0).unwrap();
        writer.write_u32(7).unwrap();
        writer.seek_to(0).unwrap();
        writer.write_u32(0xAABBCCDD).unwrap();
        assert_eq!(writer.position(), 4);

        let bytes = writer.into_inner().unwrap().into_inner();
        assert_eq!(bytes, vec![0xDD, 0xCC, 0xBB, 0xAA, 7, 0, 0, 0]);
    }
}
