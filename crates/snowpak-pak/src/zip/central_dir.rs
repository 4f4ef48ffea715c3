//! Central directory record, one per pak member.

use snowpak_common::DosDateTime;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::{fit_u32, CompressionMethod, Zip64Extra, ZIP_VERSION};

/// Central directory record following the `PK\x01\x02` signature.
///
/// Both size fields and the local header offset are sentineled to
/// `0xFFFFFFFF` when the real value moves into the record's ZIP64 extra.
/// Paks never carry comments or attributes, so those fields stay zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct CentralDirectoryHeader {
    pub version_made_by: u16,
    pub version_needed: u16,
    pub flags: u16,
    pub compression_method: u16,
    pub last_modified_time: u16,
    pub last_modified_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name_length: u16,
    pub extra_field_length: u16,
    pub file_comment_length: u16,
    pub disk_number_start: u16,
    pub internal_attrs: u16,
    pub external_attrs: u32,
    /// Offset of the member's local record from the start of the archive.
    pub local_header_offset: u32,
}

impl CentralDirectoryHeader {
    pub const MAGIC: [u8; 4] = [0x50, 0x4b, 0x01, 0x02];
    pub const SIGNATURE: u32 = 0x02014b50;

    /// Record for a stored member, with the ZIP64 extra it needs.
    ///
    /// The offset is checked on its own: a member whose size fits can still
    /// start past 4 GiB.
    pub fn stored(
        name_length: u16,
        crc32: u32,
        size: u64,
        local_header_offset: u64,
        modified: DosDateTime,
    ) -> (Self, Zip64Extra) {
        let size_fit = fit_u32(size);
        let offset_fit = fit_u32(local_header_offset);
        let extra = Zip64Extra {
            uncompressed_size: size_fit.extended.then_some(size),
            compressed_size: size_fit.extended.then_some(size),
            local_header_offset: offset_fit.extended.then_some(local_header_offset),
        };
        let header = Self {
            version_made_by: ZIP_VERSION,
            version_needed: ZIP_VERSION,
            flags: 0,
            compression_method: CompressionMethod::Store as u16,
            last_modified_time: modified.time,
            last_modified_date: modified.date,
            crc32,
            compressed_size: size_fit.legacy,
            uncompressed_size: size_fit.legacy,
            file_name_length: name_length,
            extra_field_length: extra.encoded_len(),
            file_comment_length: 0,
            disk_number_start: 0,
            internal_attrs: 0,
            external_attrs: 0,
            local_header_offset: offset_fit.legacy,
        };
        (header, extra)
    }

    /// Bytes of name, extra and comment after the fixed part.
    pub fn variable_data_size(&self) -> usize {
        self.file_name_length as usize
            + self.extra_field_length as usize
            + self.file_comment_length as usize
    }
}
