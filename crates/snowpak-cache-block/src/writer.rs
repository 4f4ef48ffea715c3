//! cache_block writer.

use std::fs::{self, File};
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use snowpak_common::fs::{create_new_file, top_level_files, walk_files};
use snowpak_common::ByteWriter;
use tracing::{debug, trace};

use crate::entry::FileEntry;
use crate::format::{MAX_FILE_SIZE, SEPARATOR, SIGNATURE, TABLE_TAG, VERSION};
use crate::{Error, Result};

/// Check that a payload of `len` bytes fits the signed 32-bit size table.
pub fn checked_payload_size(len: u64) -> Result<u32> {
    if len > MAX_FILE_SIZE {
        return Err(snowpak_common::Error::SizeOverflow {
            what: "cache_block payload size",
            value: len,
            limit: MAX_FILE_SIZE,
        }
        .into());
    }
    Ok(len as u32)
}

/// Collect the entries for packing the contents of `dir`.
///
/// Every file must live below a `[group]` directory; files directly in
/// `dir` are rejected. Entries are sorted by internal name.
pub fn scan_directory(dir: &Path) -> Result<Vec<FileEntry>> {
    if !dir.is_dir() {
        return Err(Error::NotADirectory(dir.to_path_buf()));
    }
    if let Some(loose) = top_level_files(dir)?.first() {
        return Err(snowpak_common::Error::InvalidName {
            name: loose.display().to_string(),
            reason: "source directory must only contain group directories",
        }
        .into());
    }

    let mut entries = walk_files(dir)?
        .iter()
        .map(|file| FileEntry::from_external_name(&file.relative_name))
        .collect::<Result<Vec<_>>>()?;
    entries.sort_by(|a, b| a.internal_name().cmp(b.internal_name()));
    debug!(entries = entries.len(), source = %dir.display(), "scanned cache_block source");
    Ok(entries)
}

/// Pack the contents of `source_dir` into a new file at `target`.
///
/// The target must not exist. On failure the partially written file is removed.
pub fn pack_file(
    source_dir: &Path,
    target: &Path,
    progress: impl FnMut(usize, usize),
) -> Result<Vec<FileEntry>> {
    let mut entries = scan_directory(source_dir)?;
    let file = create_new_file(target)?;

    let result = CacheBlockWriter::new(BufWriter::new(file)).and_then(|mut writer| {
        writer.pack(source_dir, &mut entries, progress)?;
        writer.into_inner()?.into_inner().map_err(|e| e.into_error())?;
        Ok(())
    });
    if let Err(e) = result {
        let _ = fs::remove_file(target);
        return Err(e);
    }
    Ok(entries)
}

/// Writes a cache_block file.
#[derive(Debug)]
pub struct CacheBlockWriter<W> {
    writer: ByteWriter<W>,
}

impl<W: Write + Seek> CacheBlockWriter<W> {
    /// Start writing at the current stream position.
    pub fn new(inner: W) -> Result<Self> {
        Ok(Self {
            writer: ByteWriter::from_current(inner)?,
        })
    }

    /// Write a complete cache_block for `entries`, reading each payload from
    /// its external name below `source_dir`.
    ///
    /// Payloads are written first; the offset, size and zero tables are then
    /// filled in. Each entry's location is updated in place. Returns the base
    /// offset.
    pub fn pack(
        &mut self,
        source_dir: &Path,
        entries: &mut [FileEntry],
        mut progress: impl FnMut(usize, usize),
    ) -> Result<u64> {
        let count = i32::try_from(entries.len()).map_err(|_| snowpak_common::Error::SizeOverflow {
            what: "cache_block entry count",
            value: entries.len() as u64,
            limit: i32::MAX as u64,
        })?;
        let n = entries.len() as u64;

        self.write_header(count)?;
        for entry in entries.iter() {
            self.writer.write_length_prefixed_string(entry.internal_name())?;
        }
        self.writer.write_u8(SEPARATOR)?;

        let tables_at = self.writer.position();
        let base_offset = tables_at + 8 * n + 1 + 4 * n + 1 + 4 * n;
        debug!(entries = n, base_offset, "packing cache_block");

        self.writer.seek_to(base_offset)?;
        let total = entries.len();
        let mut relative_offset = 0u64;
        for (index, entry) in entries.iter_mut().enumerate() {
            let path = entry.output_path(source_dir);
            let mut source = File::open(&path)?;
            let size = checked_payload_size(source.metadata()?.len())?;
            trace!(name = entry.internal_name(), relative_offset, size, "packing entry");

            self.writer.copy_from(&mut source, size as u64)?;
            entry.set_location(relative_offset, size);
            relative_offset += size as u64;
            progress(index + 1, total);
        }
        let end = self.writer.position();

        self.writer.seek_to(tables_at)?;
        for entry in entries.iter() {
            self.writer.write_i64(entry.relative_offset() as i64)?;
        }
        self.writer.write_u8(SEPARATOR)?;
        for entry in entries.iter() {
            self.writer.write_i32(entry.size() as i32)?;
        }
        self.writer.write_u8(SEPARATOR)?;
        for _ in entries.iter() {
            self.writer.write_i32(0)?;
        }
        self.writer.seek_to(end)?;
        Ok(base_offset)
    }

    fn write_header(&mut self, count: i32) -> Result<()> {
        self.writer.write_bytes(&SIGNATURE)?;
        self.writer.write_u32(VERSION)?;
        self.writer.write_u8(SEPARATOR)?;
        self.writer.write_i32(count)?;
        self.writer.write_u32(TABLE_TAG)?;
        self.writer.write_u8(SEPARATOR)?;
        Ok(())
    }

    /// Flush and unwrap the underlying stream.
    pub fn into_inner(self) -> Result<W> {
        Ok(self.writer.into_inner()?)
    }
}
