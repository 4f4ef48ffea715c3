//! Stored ZIP64 archive writer.
//!
//! Every member is stored without compression. Sizes, offsets and the entry
//! count that do not fit their legacy fields are sentineled and carried in
//! ZIP64 records instead.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use snowpak_common::fs::{create_new_file, walk_files, WalkedFile};
use snowpak_common::{text, ByteReader, ByteWriter, DosDateTime};
use tracing::{debug, trace, warn};

use crate::comparer::{PakableNameComparer, LOAD_LIST_NAME};
use crate::zip::{
    fit_u32, CentralDirectoryHeader, CompressionMethod, Eocd64Locator, Eocd64Record, EocdRecord,
    LocalFileHeader, Zip64Extra, ZIP_VERSION,
};
use crate::{Error, Result};

/// Options for packing a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PakOptions {
    /// Member that must come first; a warning is logged when it is missing.
    pub list_file_name: String,
}

impl Default for PakOptions {
    fn default() -> Self {
        Self {
            list_file_name: LOAD_LIST_NAME.to_string(),
        }
    }
}

/// A member whose local record is written and whose central record is pending.
#[derive(Debug)]
struct PendingRecord {
    name: Vec<u8>,
    local_header_offset: u64,
    crc32: u32,
    size: u64,
    modified: DosDateTime,
}

/// Writes a stored pak archive member by member.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use snowpak_common::DosDateTime;
/// use snowpak_pak::PakWriter;
///
/// let mut writer = PakWriter::new(Vec::new());
/// writer.add_reader("pak.load_list", &mut Cursor::new(b"list"), DosDateTime::default())?;
/// let bytes = writer.finish()?;
/// assert_eq!(&bytes[..4], b"PK\x03\x04");
/// # Ok::<(), snowpak_pak::Error>(())
/// ```
#[derive(Debug)]
pub struct PakWriter<W: Write> {
    writer: ByteWriter<W>,
    records: Vec<PendingRecord>,
    zip64: bool,
}

impl<W: Write> PakWriter<W> {
    /// Start an archive at offset 0 of `inner`.
    pub fn new(inner: W) -> Self {
        Self::with_offset(inner, 0)
    }

    /// Start an archive whose first byte lands at `offset` of the final file.
    pub fn with_offset(inner: W, offset: u64) -> Self {
        Self {
            writer: ByteWriter::with_position(inner, offset),
            records: Vec::new(),
            zip64: false,
        }
    }

    /// Number of members written so far.
    pub fn entry_count(&self) -> usize {
        self.records.len()
    }

    /// Add a member from a file on disk, using its modification time.
    pub fn add_file(&mut self, name: &str, path: &Path) -> Result<()> {
        let mut file = File::open(path)?;
        let modified = file
            .metadata()?
            .modified()
            .map(DosDateTime::from_system_time)
            .unwrap_or_default();
        self.add_reader(name, &mut file, modified)
    }

    /// Add a member whose data is the whole of `source`.
    ///
    /// The source is read twice: once for the checksum, once for the copy.
    pub fn add_reader<R: Read + Seek>(
        &mut self,
        name: &str,
        source: &mut R,
        modified: DosDateTime,
    ) -> Result<()> {
        let size = source.seek(SeekFrom::End(0))?;
        source.seek(SeekFrom::Start(0))?;
        let crc32 = ByteReader::new(&mut *source).crc32(size)?;
        source.seek(SeekFrom::Start(0))?;

        let name_bytes = encode_name(name)?;
        let local_header_offset = self.writer.position();
        let size_fit = fit_u32(size);
        let extra = Zip64Extra {
            uncompressed_size: size_fit.extended.then_some(size),
            compressed_size: size_fit.extended.then_some(size),
            local_header_offset: None,
        };
        self.zip64 |= size_fit.extended;

        let header = LocalFileHeader {
            version_needed: ZIP_VERSION,
            flags: 0,
            compression_method: CompressionMethod::Store as u16,
            last_modified_time: modified.time,
            last_modified_date: modified.date,
            crc32,
            compressed_size: size_fit.legacy,
            uncompressed_size: size_fit.legacy,
            file_name_length: name_bytes.len() as u16,
            extra_field_length: extra.encoded_len(),
        };
        trace!(name, offset = local_header_offset, size, crc32, "writing member");

        self.writer.write_u32(LocalFileHeader::SIGNATURE)?;
        self.writer.write_struct(&header)?;
        self.writer.write_bytes(&name_bytes)?;
        self.write_extra(&extra)?;
        self.writer.copy_from(source, size)?;

        self.records.push(PendingRecord {
            name: name_bytes,
            local_header_offset,
            crc32,
            size,
            modified,
        });
        Ok(())
    }

    /// Write the central directory and end records, returning the stream.
    pub fn finish(mut self) -> Result<W> {
        let directory_start = self.writer.position();
        let records = std::mem::take(&mut self.records);

        for record in &records {
            let (header, extra) = CentralDirectoryHeader::stored(
                record.name.len() as u16,
                record.crc32,
                record.size,
                record.local_header_offset,
                record.modified,
            );
            self.zip64 |= !extra.is_empty();

            self.writer.write_u32(CentralDirectoryHeader::SIGNATURE)?;
            self.writer.write_struct(&header)?;
            self.writer.write_bytes(&record.name)?;
            self.write_extra(&extra)?;
        }

        let directory_end = self.writer.position();
        let directory_size = directory_end - directory_start;
        let count = records.len() as u64;
        let (eocd, extended) = EocdRecord::for_directory(count, directory_size, directory_start);
        self.zip64 |= extended;

        if self.zip64 {
            let record = Eocd64Record::for_directory(count, directory_size, directory_start);
            self.writer.write_u32(Eocd64Record::SIGNATURE)?;
            self.writer.write_struct(&record)?;

            self.writer.write_u32(Eocd64Locator::SIGNATURE)?;
            self.writer.write_struct(&Eocd64Locator::pointing_at(directory_end))?;
        }

        self.writer.write_u32(EocdRecord::SIGNATURE)?;
        self.writer.write_struct(&eocd)?;

        debug!(
            entries = count,
            directory_start,
            directory_size,
            zip64 = self.zip64,
            "finished pak"
        );
        Ok(self.writer.into_inner()?)
    }

    fn write_extra(&mut self, extra: &Zip64Extra) -> Result<()> {
        if extra.is_empty() {
            return Ok(());
        }
        let mut bytes = Vec::with_capacity(extra.encoded_len() as usize);
        extra.encode_into(&mut bytes);
        Ok(self.writer.write_bytes(&bytes)?)
    }
}

/// Encode a member name, which must fit the 16-bit name length field.
fn encode_name(name: &str) -> Result<Vec<u8>> {
    let bytes = text::encode(name)?;
    if bytes.len() > u16::MAX as usize {
        return Err(snowpak_common::Error::SizeOverflow {
            what: "pak member name length",
            value: bytes.len() as u64,
            limit: u16::MAX as u64,
        }
        .into());
    }
    Ok(bytes)
}

/// List the files below `source_dir` in pak order.
pub fn collect_files(source_dir: &Path, options: &PakOptions) -> Result<Vec<WalkedFile>> {
    if !source_dir.is_dir() {
        return Err(Error::NotADirectory(source_dir.to_path_buf()));
    }
    let list_file = source_dir.join(&options.list_file_name);
    if !list_file.is_file() {
        warn!(path = %list_file.display(), "list file does not exist");
    }

    let comparer = PakableNameComparer::new(&options.list_file_name);
    let mut files = walk_files(source_dir)?;
    files.sort_by(|a, b| comparer.compare(&a.relative_name, &b.relative_name));
    Ok(files)
}

/// Pack `files` into `inner`, returning the stream after the end record.
pub fn pack_files<W: Write>(
    files: &[WalkedFile],
    inner: W,
    mut progress: impl FnMut(usize, usize),
) -> Result<W> {
    let mut writer = PakWriter::new(inner);
    for (index, file) in files.iter().enumerate() {
        writer.add_file(&file.relative_name, &file.path)?;
        progress(index + 1, files.len());
    }
    writer.finish()
}

/// Pack the contents of `source_dir` into a new pak at `target`.
///
/// The target must not exist. On failure the partially written file is
/// removed. Returns the number of members.
pub fn write_pak(
    source_dir: &Path,
    target: &Path,
    options: &PakOptions,
    progress: impl FnMut(usize, usize),
) -> Result<usize> {
    let files = collect_files(source_dir, options)?;
    let file = create_new_file(target)?;
    debug!(source = %source_dir.display(), files = files.len(), "packing pak");

    let result = pack_files(&files, BufWriter::new(file), progress).and_then(|writer| {
        writer.into_inner().map_err(|e| e.into_error())?;
        Ok(())
    });
    if let Err(e) = result {
        let _ = fs::remove_file(target);
        return Err(e);
    }
    Ok(files.len())
}
