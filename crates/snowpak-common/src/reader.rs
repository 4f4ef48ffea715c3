//! Streaming binary reader.
//!
//! This module provides [`ByteReader`], a wrapper over any [`Read`] that keeps
//! track of the stream offset so that format errors can name the exact byte
//! position they were detected at.

use std::io::{self, Read, Seek, SeekFrom, Write};

use zerocopy::FromBytes;

use crate::crc::Hasher;
use crate::error::MagicKind;
use crate::fixed::FixedValue;
use crate::scratch::{Scratch, CHUNK_SIZE};
use crate::{text, Error, Result};

/// A little-endian binary reader over a byte stream.
///
/// # Example
///
/// ```
/// use snowpak_common::ByteReader;
///
/// let data = [0x01, 0x00, 0x00, 0x00, 0x01, 0x05, 0x00, 0x00, 0x00];
/// let mut reader = ByteReader::new(&data[..]);
///
/// reader.read_magic_u32(1).unwrap();
/// reader.read_magic_u8(1).unwrap();
/// assert_eq!(reader.read_i32().unwrap(), 5);
/// assert_eq!(reader.position(), 9);
/// ```
#[derive(Debug)]
pub struct ByteReader<R> {
    inner: R,
    position: u64,
    scratch: Scratch,
}

impl<R: Read> ByteReader<R> {
    /// Create a reader whose first byte is at offset 0.
    pub fn new(inner: R) -> Self {
        Self::with_position(inner, 0)
    }

    /// Create a reader whose first byte is at `position`.
    pub fn with_position(inner: R, position: u64) -> Self {
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

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    ///
    /// Reading through this reference desynchronizes [`position`](Self::position).
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Unwrap the underlying stream.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Read exactly `len` bytes into the scratch buffer.
    ///
    /// The buffer grows one chunk at a time, so a corrupt length costs no
    /// more memory than the bytes the stream actually holds.
    fn fill(&mut self, len: usize) -> Result<&[u8]> {
        let offset = self.position;
        let mut filled = 0;
        while filled < len {
            let end = len.min(filled.saturating_add(CHUNK_SIZE));
            let buffer = self.scratch.get(end);
            let read = read_full(&mut self.inner, &mut buffer[filled..])?;
            filled += read;
            if filled < end {
                return Err(Error::UnexpectedEof {
                    offset,
                    needed: len as u64,
                    available: filled as u64,
                });
            }
        }
        self.position += len as u64;
        Ok(self.scratch.get(len))
    }

    /// Read a fixed-width little-endian value.
    #[inline]
    pub fn read_fixed<T: FixedValue>(&mut self) -> Result<T> {
        self.fill(T::SIZE).map(T::decode)
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        self.fill(1).map(|b| b[0])
    }

    /// Read a little-endian u16.
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_fixed()
    }

    /// Read a little-endian i32.
    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_fixed()
    }

    /// Read a little-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_fixed()
    }

    /// Read a little-endian i64.
    #[inline]
    pub fn read_i64(&mut self) -> Result<i64> {
        self.read_fixed()
    }

    /// Read a little-endian u64.
    #[inline]
    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_fixed()
    }

    /// Read a non-negative i32 count or length.
    pub fn read_length_i32(&mut self) -> Result<usize> {
        let offset = self.position;
        let length = self.read_i32()?;
        usize::try_from(length).map_err(|_| Error::InvalidLength {
            offset,
            length: length as i64,
        })
    }

    /// Read `len` bytes into a new vector.
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        self.fill(len).map(<[u8]>::to_vec)
    }

    /// Read bytes into `out`, failing if the stream ends early.
    pub fn read_exact_into(&mut self, out: &mut [u8]) -> Result<()> {
        let offset = self.position;
        let read = read_full(&mut self.inner, out)?;
        if read < out.len() {
            return Err(Error::UnexpectedEof {
                offset,
                needed: out.len() as u64,
                available: read as u64,
            });
        }
        self.position += out.len() as u64;
        Ok(())
    }

    /// Read a struct using zerocopy.
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let offset = self.position;
        let bytes = self.fill(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::UnexpectedEof {
            offset,
            needed: size as u64,
            available: 0,
        })
    }

    /// Read a byte and verify it equals `expected`.
    pub fn read_magic_u8(&mut self, expected: u8) -> Result<()> {
        let offset = self.position;
        let actual = self.read_u8()?;
        if actual != expected {
            return Err(Error::BadMagic {
                offset,
                kind: MagicKind::Byte,
                expected: expected as u64,
                actual: actual as u64,
            });
        }
        Ok(())
    }

    /// Read a little-endian u32 and verify it equals `expected`.
    pub fn read_magic_u32(&mut self, expected: u32) -> Result<()> {
        let offset = self.position;
        let actual = self.read_u32()?;
        if actual != expected {
            return Err(Error::BadMagic {
                offset,
                kind: MagicKind::Dword,
                expected: expected as u64,
                actual: actual as u64,
            });
        }
        Ok(())
    }

    /// Read `len` bytes of code page 437 text.
    pub fn read_string(&mut self, len: usize) -> Result<String> {
        self.fill(len).map(text::decode)
    }

    /// Read an i32 byte count followed by that many bytes of code page 437 text.
    pub fn read_length_prefixed_string(&mut self) -> Result<String> {
        let len = self.read_length_i32()?;
        self.read_string(len)
    }

    /// Copy exactly `length` bytes to `dst` in bounded chunks.
    pub fn copy_to<W: Write + ?Sized>(&mut self, dst: &mut W, length: u64) -> Result<()> {
        let start = self.position;
        let mut remaining = length;
        while remaining > 0 {
            let chunk = remaining.min(CHUNK_SIZE as u64) as usize;
            let buffer = self.scratch.get(chunk);
            let read = read_some(&mut self.inner, buffer)?;
            if read == 0 {
                return Err(Error::UnexpectedEof {
                    offset: start,
                    needed: length,
                    available: length - remaining,
                });
            }
            dst.write_all(&buffer[..read])?;
            self.position += read as u64;
            remaining -= read as u64;
        }
        Ok(())
    }

    /// Skip `length` bytes.
    pub fn skip(&mut self, length: u64) -> Result<()> {
        self.copy_to(&mut io::sink(), length)
    }

    /// Compute the CRC32 of the next `length` bytes, consuming them.
    pub fn crc32(&mut self, length: u64) -> Result<u32> {
        let start = self.position;
        let mut hasher = Hasher::new();
        let mut remaining = length;
        while remaining > 0 {
            let chunk = remaining.min(CHUNK_SIZE as u64) as usize;
            let buffer = self.scratch.get(chunk);
            let read = read_some(&mut self.inner, buffer)?;
            if read == 0 {
                return Err(Error::UnexpectedEof {
                    offset: start,
                    needed: length,
                    available: length - remaining,
                });
            }
            hasher.update(&buffer[..read]);
            self.position += read as u64;
            remaining -= read as u64;
        }
        Ok(hasher.finalize())
    }

    /// Fail with [`Error::TrailingData`] unless the stream is at its end.
    pub fn ensure_exhausted(&mut self) -> Result<()> {
        let mut probe = [0u8; 1];
        if read_some(&mut self.inner, &mut probe)? != 0 {
            return Err(Error::TrailingData {
                offset: self.position,
            });
        }
        Ok(())
    }
}

impl<R: Read + Seek> ByteReader<R> {
    /// Create a reader positioned wherever the stream currently is.
    pub fn from_current(mut inner: R) -> Result<Self> {
        let position = inner.stream_position()?;
        Ok(Self::with_position(inner, position))
    }

    /// Seek to an absolute offset.
    pub fn seek_to(&mut self, position: u64) -> Result<()> {
        self.position = self.inner.seek(SeekFrom::Start(position))?;
        Ok(())
    }
}

fn read_some<R: Read + ?Sized>(reader: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buffer) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}

fn read_full<R: Read + ?Sized>(reader: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match read_some(reader, &mut buffer[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}
