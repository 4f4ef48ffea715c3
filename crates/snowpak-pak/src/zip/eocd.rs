//! Records closing a pak: the legacy end record and, when any value
//! outgrows it, the ZIP64 end record plus its locator.
//!
//! A pak that needs ZIP64 ends with
//!
//! ```text
//! central directory | ZIP64 end record | locator | legacy end record
//! ```

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::{fit_u16, fit_u32, ZIP_VERSION};

/// Legacy end record following the `PK\x05\x06` signature.
///
/// An entry count of `0xFFFF` or a directory size or offset of `0xFFFFFFFF`
/// means the real value lives in the [`Eocd64Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct EocdRecord {
    pub disk_number: u16,
    pub central_dir_disk: u16,
    pub central_dir_count_disk: u16,
    pub central_dir_count_total: u16,
    pub central_dir_size: u32,
    pub central_dir_offset: u32,
    pub comment_length: u16,
}

impl EocdRecord {
    pub const MAGIC: [u8; 4] = [0x50, 0x4b, 0x05, 0x06];
    pub const SIGNATURE: u32 = 0x06054b50;

    /// End record for a single-disk directory, sentineling what does not fit.
    ///
    /// The flag is set when a ZIP64 end record has to precede this one.
    pub fn for_directory(count: u64, size: u64, offset: u64) -> (Self, bool) {
        let count_fit = fit_u16(count);
        let size_fit = fit_u32(size);
        let offset_fit = fit_u32(offset);
        let record = Self {
            disk_number: 0,
            central_dir_disk: 0,
            central_dir_count_disk: count_fit.legacy,
            central_dir_count_total: count_fit.legacy,
            central_dir_size: size_fit.legacy,
            central_dir_offset: offset_fit.legacy,
            comment_length: 0,
        };
        let extended = count_fit.extended || size_fit.extended || offset_fit.extended;
        (record, extended)
    }

    /// Whether any field holds a sentinel.
    pub fn is_zip64(&self) -> bool {
        self.central_dir_count_total == u16::MAX
            || self.central_dir_count_disk == u16::MAX
            || self.central_dir_offset == u32::MAX
            || self.central_dir_size == u32::MAX
    }
}

/// Locator following the `PK\x06\x07` signature, written between the ZIP64
/// end record and the legacy one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct Eocd64Locator {
    pub zip64_eocd_disk: u32,
    /// Where the ZIP64 end record starts, which is right after the directory.
    pub zip64_eocd_offset: u64,
    pub total_disks: u32,
}

impl Eocd64Locator {
    pub const MAGIC: [u8; 4] = [0x50, 0x4b, 0x06, 0x07];
    pub const SIGNATURE: u32 = 0x07064b50;

    /// Locator for a ZIP64 end record at `offset` of a single-disk pak.
    pub fn pointing_at(offset: u64) -> Self {
        Self {
            zip64_eocd_disk: 0,
            zip64_eocd_offset: offset,
            total_disks: 1,
        }
    }
}

/// ZIP64 end record following the `PK\x06\x06` signature.
///
/// Carries the unnarrowed entry count, directory size and directory offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct Eocd64Record {
    /// Bytes after this field; paks never append extensible data.
    pub record_size: u64,
    pub version_made_by: u16,
    pub version_needed: u16,
    pub disk_number: u32,
    pub central_dir_disk: u32,
    pub central_dir_count_disk: u64,
    pub central_dir_count_total: u64,
    pub central_dir_size: u64,
    pub central_dir_offset: u64,
}

impl Eocd64Record {
    pub const MAGIC: [u8; 4] = [0x50, 0x4b, 0x06, 0x06];
    pub const SIGNATURE: u32 = 0x06064b50;

    /// `record_size` of a record without extensible data.
    pub const RECORD_SIZE: u64 = (std::mem::size_of::<Self>() - 8) as u64;

    /// ZIP64 end record for a single-disk directory.
    pub fn for_directory(count: u64, size: u64, offset: u64) -> Self {
        Self {
            record_size: Self::RECORD_SIZE,
            version_made_by: ZIP_VERSION,
            version_needed: ZIP_VERSION,
            disk_number: 0,
            central_dir_disk: 0,
            central_dir_count_disk: count,
            central_dir_count_total: count,
            central_dir_size: size,
            central_dir_offset: offset,
        }
    }
}
