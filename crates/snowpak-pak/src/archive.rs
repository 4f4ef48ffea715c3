//! Pak archive reader.
//!
//! Only what the tools need: the central directory, stored member data and
//! a walk over the local headers.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use memchr::memmem;
use memmap2::Mmap;
use snowpak_common::{crc, ByteReader, DosDateTime};
use tracing::{debug, trace};

use crate::entry::PakEntry;
use crate::zip::extra::resolve;
use crate::zip::{
    CentralDirectoryHeader, CompressionMethod, Eocd64Locator, Eocd64Record, EocdRecord,
    LocalFileHeader, Zip64Extra,
};
use crate::{Error, Result};

/// Largest distance of the EOCD signature from the end: record plus comment.
const EOCD_SEARCH_SPAN: usize = 4 + std::mem::size_of::<EocdRecord>() + u16::MAX as usize;

/// A memory-mapped pak archive.
pub struct PakArchive {
    mmap: Mmap,
    name: String,
    entries: Vec<PakEntry>,
}

impl PakArchive {
    /// Open an archive and parse its central directory.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let entries = parse_central_directory(&mmap)?;
        debug!(archive = %name, entries = entries.len(), "opened pak");

        Ok(Self {
            mmap,
            name,
            entries,
        })
    }

    /// Get the archive file name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of entries.
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// All entries in central directory order.
    #[inline]
    pub fn entries(&self) -> &[PakEntry] {
        &self.entries
    }

    /// Get entry by index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&PakEntry> {
        self.entries.get(index)
    }

    /// Find an entry by name (case-insensitive, either separator).
    pub fn find(&self, name: &str) -> Option<&PakEntry> {
        let normalized = name.replace('/', "\\");
        self.entries
            .iter()
            .find(|e| e.name.replace('/', "\\").eq_ignore_ascii_case(&normalized))
    }

    /// Read a stored entry's contents, verifying its checksum.
    pub fn read(&self, entry: &PakEntry) -> Result<Vec<u8>> {
        read_stored(&self.mmap, entry)
    }
}

/// A reader over `data` starting at `offset`; reads past the end fail with
/// the offset they were attempted at.
fn reader_at(data: &[u8], offset: u64) -> ByteReader<&[u8]> {
    let start = usize::try_from(offset).map_or(data.len(), |o| o.min(data.len()));
    ByteReader::with_position(&data[start..], offset)
}

fn expect_signature<R: Read>(reader: &mut ByteReader<R>, expected: u32) -> Result<()> {
    let offset = reader.position();
    let actual = reader.read_u32()?;
    if actual != expected {
        return Err(Error::InvalidSignature {
            offset,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Parse every central directory record of the archive in `data`.
pub(crate) fn parse_central_directory(data: &[u8]) -> Result<Vec<PakEntry>> {
    let eocd_offset = find_eocd(data)?;
    let mut reader = reader_at(data, eocd_offset as u64 + 4);
    let eocd: EocdRecord = reader.read_struct()?;

    let (count, directory_offset) = if eocd.is_zip64() {
        let record = read_zip64_eocd(data, eocd_offset)?;
        (record.central_dir_count_total, record.central_dir_offset)
    } else {
        (
            eocd.central_dir_count_total as u64,
            eocd.central_dir_offset as u64,
        )
    };
    debug!(entries = count, directory_offset, "reading central directory");

    let mut reader = reader_at(data, directory_offset);
    let mut entries = Vec::with_capacity(count.min(1 << 20) as usize);
    for _ in 0..count {
        entries.push(read_directory_entry(&mut reader)?);
    }
    Ok(entries)
}

fn find_eocd(data: &[u8]) -> Result<usize> {
    let search_start = data.len().saturating_sub(EOCD_SEARCH_SPAN);
    memmem::rfind(&data[search_start..], &EocdRecord::MAGIC)
        .map(|i| search_start + i)
        .ok_or(Error::EocdNotFound)
}

fn read_zip64_eocd(data: &[u8], eocd_offset: usize) -> Result<Eocd64Record> {
    let locator_size = std::mem::size_of::<Eocd64Locator>() + 4;
    let locator_offset = eocd_offset
        .checked_sub(locator_size)
        .ok_or(Error::Zip64EocdNotFound)?;
    if data[locator_offset..locator_offset + 4] != Eocd64Locator::MAGIC {
        return Err(Error::Zip64EocdNotFound);
    }

    let mut reader = reader_at(data, locator_offset as u64 + 4);
    let locator: Eocd64Locator = reader.read_struct()?;

    let mut reader = reader_at(data, locator.zip64_eocd_offset);
    expect_signature(&mut reader, Eocd64Record::SIGNATURE)?;
    Ok(reader.read_struct()?)
}

fn read_directory_entry(reader: &mut ByteReader<&[u8]>) -> Result<PakEntry> {
    expect_signature(reader, CentralDirectoryHeader::SIGNATURE)?;
    let header: CentralDirectoryHeader = reader.read_struct()?;

    let name = reader.read_string(header.file_name_length as usize)?;
    let extra_offset = reader.position();
    let block = reader.read_bytes(header.extra_field_length as usize)?;
    reader.skip(header.file_comment_length as u64)?;

    let (compressed, uncompressed, local) = (
        header.compressed_size,
        header.uncompressed_size,
        header.local_header_offset,
    );
    let extra = Zip64Extra::parse(
        &block,
        extra_offset,
        uncompressed == u32::MAX,
        compressed == u32::MAX,
        local == u32::MAX,
    )?;

    let entry = PakEntry {
        name,
        compressed_size: resolve(compressed, extra.compressed_size, "compressed size")?,
        uncompressed_size: resolve(uncompressed, extra.uncompressed_size, "uncompressed size")?,
        method: header.compression_method,
        crc32: header.crc32,
        local_header_offset: resolve(local, extra.local_header_offset, "local header offset")?,
        modified: DosDateTime {
            time: header.last_modified_time,
            date: header.last_modified_date,
        },
    };
    trace!(
        name = %entry.name,
        offset = entry.local_header_offset,
        size = entry.uncompressed_size,
        "central directory entry"
    );
    Ok(entry)
}

fn read_stored(data: &[u8], entry: &PakEntry) -> Result<Vec<u8>> {
    if entry.compression_method() != Some(CompressionMethod::Store) {
        return Err(Error::UnsupportedCompression(entry.method));
    }

    let mut reader = reader_at(data, entry.local_header_offset);
    expect_signature(&mut reader, LocalFileHeader::SIGNATURE)?;
    let header: LocalFileHeader = reader.read_struct()?;
    reader.skip(header.variable_data_size() as u64)?;

    let bytes = reader.read_bytes(entry.compressed_size as usize)?;
    let actual = crc::hash_bytes(&bytes);
    if actual != entry.crc32 {
        return Err(Error::CrcMismatch {
            name: entry.name.clone(),
            expected: entry.crc32,
            actual,
        });
    }
    Ok(bytes)
}

/// A local file header found by [`local_headers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalHeaderRecord {
    /// Offset of the record's signature.
    pub offset: u64,
    pub header: LocalFileHeader,
    pub name: String,
    /// Sizes with ZIP64 values applied.
    pub compressed_size: u64,
    pub uncompressed_size: u64,
}

/// Walk the local headers of the archive at `path` from its first byte.
pub fn local_headers<P: AsRef<Path>>(path: P) -> Result<Vec<LocalHeaderRecord>> {
    let file = File::open(path.as_ref())?;
    read_local_headers(BufReader::new(file))
}

/// Walk local headers from the start of `inner` until a record with another
/// signature, or the end of the stream.
pub fn read_local_headers<R: Read>(inner: R) -> Result<Vec<LocalHeaderRecord>> {
    let mut reader = ByteReader::new(inner);
    let mut records = Vec::new();

    loop {
        let offset = reader.position();
        let signature = match reader.read_u32() {
            Ok(signature) => signature,
            Err(snowpak_common::Error::UnexpectedEof { available: 0, .. }) => break,
            Err(e) => return Err(e.into()),
        };
        if signature != LocalFileHeader::SIGNATURE {
            break;
        }

        let header: LocalFileHeader = reader.read_struct()?;
        let name = reader.read_string(header.file_name_length as usize)?;
        let extra_offset = reader.position();
        let block = reader.read_bytes(header.extra_field_length as usize)?;

        let (compressed, uncompressed) = (header.compressed_size, header.uncompressed_size);
        let extra = Zip64Extra::parse(
            &block,
            extra_offset,
            uncompressed == u32::MAX,
            compressed == u32::MAX,
            false,
        )?;
        let compressed_size = resolve(compressed, extra.compressed_size, "compressed size")?;
        let uncompressed_size =
            resolve(uncompressed, extra.uncompressed_size, "uncompressed size")?;

        reader.skip(compressed_size)?;
        records.push(LocalHeaderRecord {
            offset,
            header,
            name,
            compressed_size,
            uncompressed_size,
        });
    }
    debug!(records = records.len(), "walked local headers");
    Ok(records)
}
