//! cache_block reader.

use std::fs::{self, File};
use std::io::{BufReader, Read, Seek, Write};
use std::path::Path;

use snowpak_common::fs::create_new_file;
use snowpak_common::ByteReader;
use tracing::{debug, trace};

use crate::entry::FileEntry;
use crate::format::{SEPARATOR, SIGNATURE, TABLE_TAG, VERSION};
use crate::{Error, Result};

/// Options for [`CacheBlockReader::unpack_all`].
#[derive(Debug, Clone, Default)]
pub struct UnpackOptions {
    /// Unpack into a directory that already exists. Individual files are
    /// never overwritten either way.
    pub allow_existing_directory: bool,
}

/// A parsed cache_block file.
///
/// The whole file table is read on construction; payloads are read on demand.
///
/// # Example
///
/// ```no_run
/// use snowpak_cache_block::CacheBlockReader;
///
/// let mut reader = CacheBlockReader::open("initial.cache_block")?;
/// for entry in reader.entries() {
///     println!("{}: {} bytes", entry.internal_name(), entry.size());
/// }
/// # Ok::<(), snowpak_cache_block::Error>(())
/// ```
#[derive(Debug)]
pub struct CacheBlockReader<R> {
    reader: ByteReader<R>,
    entries: Vec<FileEntry>,
    base_offset: u64,
}

impl CacheBlockReader<BufReader<File>> {
    /// Open a cache_block file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> CacheBlockReader<R> {
    /// Read the file table from the current stream position.
    pub fn new(inner: R) -> Result<Self> {
        let mut reader = ByteReader::from_current(inner)?;
        let count = read_header(&mut reader)?;
        let entries = read_file_table(&mut reader, count)?;
        let base_offset = reader.position();
        debug!(entries = entries.len(), base_offset, "read cache_block file table");

        Ok(Self {
            reader,
            entries,
            base_offset,
        })
    }

    /// Entries in table order.
    #[inline]
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    /// Stream offset the relative payload offsets are counted from.
    #[inline]
    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    /// Absolute stream offset of an entry's payload.
    #[inline]
    pub fn absolute_offset(&self, entry: &FileEntry) -> u64 {
        self.base_offset + entry.relative_offset()
    }

    /// Read an entry's payload into memory.
    pub fn read_entry(&mut self, entry: &FileEntry) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(entry.size() as usize);
        self.extract_entry(entry, &mut data)?;
        Ok(data)
    }

    /// Copy an entry's payload to `dst`.
    pub fn extract_entry<W: Write + ?Sized>(&mut self, entry: &FileEntry, dst: &mut W) -> Result<()> {
        self.copy_payload(entry.relative_offset(), entry.size(), dst)
    }

    fn copy_payload<W: Write + ?Sized>(
        &mut self,
        relative_offset: u64,
        size: u32,
        dst: &mut W,
    ) -> Result<()> {
        self.reader.seek_to(self.base_offset + relative_offset)?;
        self.reader.copy_to(dst, size as u64)?;
        Ok(())
    }

    /// Unpack every entry below `target`, creating directories as needed.
    ///
    /// `progress` is called with `(done, total)` after each entry.
    pub fn unpack_all(
        &mut self,
        target: &Path,
        options: &UnpackOptions,
        mut progress: impl FnMut(usize, usize),
    ) -> Result<()> {
        if !options.allow_existing_directory && target.exists() {
            return Err(snowpak_common::Error::DestinationExists(target.to_path_buf()).into());
        }

        let total = self.entries.len();
        for index in 0..total {
            let entry = &self.entries[index];
            let path = entry.output_path(target);
            let (relative_offset, size) = (entry.relative_offset(), entry.size());
            trace!(name = entry.internal_name(), size, path = %path.display(), "unpacking entry");

            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut file = create_new_file(&path)?;
            self.copy_payload(relative_offset, size, &mut file)?;
            file.flush()?;
            progress(index + 1, total);
        }

        debug!(entries = total, target = %target.display(), "unpacked cache_block");
        Ok(())
    }

    /// Unwrap the underlying stream.
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}

fn read_header<R: Read>(reader: &mut ByteReader<R>) -> Result<usize> {
    let mut signature = [0u8; SIGNATURE.len()];
    match reader.read_exact_into(&mut signature) {
        Ok(()) if signature == SIGNATURE => {}
        Ok(()) | Err(snowpak_common::Error::UnexpectedEof { .. }) => {
            return Err(snowpak_common::Error::MalformedSignature.into());
        }
        Err(e) => return Err(e.into()),
    }

    reader.read_magic_u32(VERSION)?;
    reader.read_magic_u8(SEPARATOR)?;
    let count = reader.read_length_i32()?;
    reader.read_magic_u32(TABLE_TAG)?;
    reader.read_magic_u8(SEPARATOR)?;
    Ok(count)
}

fn read_file_table<R: Read>(reader: &mut ByteReader<R>, count: usize) -> Result<Vec<FileEntry>> {
    let mut entries = Vec::with_capacity(count.min(1 << 16));
    for _ in 0..count {
        let name = reader.read_length_prefixed_string()?;
        entries.push(FileEntry::from_internal_name(&name)?);
    }

    reader.read_magic_u8(SEPARATOR)?;
    let mut offsets = Vec::with_capacity(entries.len());
    for index in 0..count {
        let offset = reader.read_i64()?;
        let offset = u64::try_from(offset).map_err(|_| Error::NegativeOffset { index, offset })?;
        offsets.push(offset);
    }

    reader.read_magic_u8(SEPARATOR)?;
    let mut sizes = Vec::with_capacity(entries.len());
    for _ in 0..count {
        sizes.push(reader.read_length_i32()? as u32);
    }

    reader.read_magic_u8(SEPARATOR)?;
    for _ in 0..count {
        reader.read_magic_u32(0)?;
    }

    for ((entry, offset), size) in entries.iter_mut().zip(offsets).zip(sizes) {
        entry.set_location(offset, size);
        trace!(name = entry.internal_name(), offset, size, "file table entry");
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use snowpak_common::{ByteWriter, MagicKind};

    use super::*;
    use crate::format::HEADER_SIZE;

    fn build(names: &[&str], payloads: &[&[u8]]) -> Vec<u8> {
        let mut w = ByteWriter::new(Vec::new());
        w.write_bytes(&SIGNATURE).unwrap();
        w.write_u32(1).unwrap();
        w.write_u8(1).unwrap();
        w.write_i32(names.len() as i32).unwrap();
        w.write_u32(4).unwrap();
        w.write_u8(1).unwrap();
        for name in names {
            w.write_length_prefixed_string(name).unwrap();
        }
        w.write_u8(1).unwrap();
        let mut offset = 0i64;
        for p in payloads {
            w.write_i64(offset).unwrap();
            offset += p.len() as i64;
        }
        w.write_u8(1).unwrap();
        for p in payloads {
            w.write_i32(p.len() as i32).unwrap();
        }
        w.write_u8(1).unwrap();
        for _ in payloads {
            w.write_i32(0).unwrap();
        }
        for p in payloads {
            w.write_bytes(p).unwrap();
        }
        w.into_inner().unwrap()
    }

    #[test]
    fn test_read_table_and_payloads() {
        let data = build(&["<g>:a.txt", "<g>\\d\\b.txt"], &[b"hello12345", b"xy"]);
        let mut reader = CacheBlockReader::new(Cursor::new(data)).unwrap();

        let names_size = (4 + 9) + (4 + 11);
        assert_eq!(
            reader.base_offset(),
            HEADER_SIZE + names_size + 1 + 16 + 1 + 8 + 1 + 8
        );

        let entries = reader.entries().to_vec();
        assert_eq!(entries[0].external_name(), "[g]\\a.txt");
        assert_eq!(entries[1].relative_offset(), 10);
        assert_eq!(reader.read_entry(&entries[1]).unwrap(), b"xy");
        assert_eq!(reader.read_entry(&entries[0]).unwrap(), b"hello12345");
    }

    #[test]
    fn test_bad_signature() {
        let mut data = build(&[], &[]);
        data[0x24] = b'X';
        assert!(matches!(
            CacheBlockReader::new(Cursor::new(data)),
            Err(Error::Common(snowpak_common::Error::MalformedSignature))
        ));

        assert!(matches!(
            CacheBlockReader::new(Cursor::new(vec![0x31, 0x53])),
            Err(Error::Common(snowpak_common::Error::MalformedSignature))
        ));
    }

    #[test]
    fn test_bad_table_tag_offset() {
        let mut data = build(&[], &[]);
        data[64 + 4 + 1 + 4] = 5;
        match CacheBlockReader::new(Cursor::new(data)).unwrap_err() {
            Error::Common(snowpak_common::Error::BadMagic {
                offset,
                kind,
                expected,
                actual,
            }) => {
                assert_eq!(offset, 73);
                assert_eq!(kind, MagicKind::Dword);
                assert_eq!((expected, actual), (4, 5));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_nonzero_padding_is_rejected() {
        let mut data = build(&["<g>:a"], &[b"z"]);
        let zero_at = data.len() - 1 - 4;
        data[zero_at] = 7;
        assert!(matches!(
            CacheBlockReader::new(Cursor::new(data)),
            Err(Error::Common(snowpak_common::Error::BadMagic { expected: 0, actual: 7, .. }))
        ));
    }

    #[test]
    fn test_corrupt_name_length() {
        let mut data = build(&[], &[]);
        data.truncate(HEADER_SIZE as usize);
        data[69..73].copy_from_slice(&1i32.to_le_bytes());
        data.extend_from_slice(&0x7FFF_FFFFi32.to_le_bytes());
        data.extend_from_slice(b"<g>");

        match CacheBlockReader::new(Cursor::new(data)).unwrap_err() {
            Error::Common(snowpak_common::Error::UnexpectedEof {
                offset,
                needed,
                available,
            }) => {
                assert_eq!(offset, HEADER_SIZE + 4);
                assert_eq!((needed, available), (0x7FFF_FFFF, 3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_truncated_payload() {
        let mut data = build(&["<g>:a"], &[b"abcdef"]);
        data.truncate(data.len() - 2);
        let mut reader = CacheBlockReader::new(Cursor::new(data)).unwrap();
        let entry = reader.entries()[0].clone();
        assert!(matches!(
            reader.read_entry(&entry),
            Err(Error::Common(snowpak_common::Error::UnexpectedEof { .. }))
        ));
    }
}
