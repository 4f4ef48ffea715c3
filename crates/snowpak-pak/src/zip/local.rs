//! Local File Header structures.

use std::fmt;
use std::str::FromStr;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Local File Header (without signature).
///
/// This structure precedes the name, extra block and data of each entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct LocalFileHeader {
    /// Version needed to extract
    pub version_needed: u16,
    /// General purpose bit flag
    pub flags: u16,
    /// Compression method
    pub compression_method: u16,
    /// File last modification time (DOS format)
    pub last_modified_time: u16,
    /// File last modification date (DOS format)
    pub last_modified_date: u16,
    /// CRC-32 of uncompressed data
    pub crc32: u32,
    /// Compressed size
    pub compressed_size: u32,
    /// Uncompressed size
    pub uncompressed_size: u32,
    /// File name length
    pub file_name_length: u16,
    /// Extra field length
    pub extra_field_length: u16,
}

impl LocalFileHeader {
    /// Local File Header signature bytes.
    pub const MAGIC: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];

    /// Local File Header signature as u32.
    pub const SIGNATURE: u32 = 0x04034b50;

    /// Total variable-length data size following this header.
    pub fn variable_data_size(&self) -> usize {
        self.file_name_length as usize + self.extra_field_length as usize
    }
}

/// A field of [`LocalFileHeader`] selectable for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalHeaderField {
    Signature,
    VersionNeeded,
    Flags,
    Compression,
    Time,
    Date,
    Crc32,
    CompressedSize,
    UncompressedSize,
    NameLength,
    ExtraLength,
}

impl LocalHeaderField {
    /// Every field, in record order.
    pub const ALL: [Self; 11] = [
        Self::Signature,
        Self::VersionNeeded,
        Self::Flags,
        Self::Compression,
        Self::Time,
        Self::Date,
        Self::Crc32,
        Self::CompressedSize,
        Self::UncompressedSize,
        Self::NameLength,
        Self::ExtraLength,
    ];

    /// Width of the field in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::Signature | Self::Crc32 | Self::CompressedSize | Self::UncompressedSize => 4,
            _ => 2,
        }
    }

    /// The field's raw value in `header`.
    pub fn value(self, header: &LocalFileHeader) -> u32 {
        match self {
            Self::Signature => LocalFileHeader::SIGNATURE,
            Self::VersionNeeded => header.version_needed as u32,
            Self::Flags => header.flags as u32,
            Self::Compression => header.compression_method as u32,
            Self::Time => header.last_modified_time as u32,
            Self::Date => header.last_modified_date as u32,
            Self::Crc32 => header.crc32,
            Self::CompressedSize => header.compressed_size,
            Self::UncompressedSize => header.uncompressed_size,
            Self::NameLength => header.file_name_length as u32,
            Self::ExtraLength => header.extra_field_length as u32,
        }
    }

    /// The field value as fixed-width upper-case hex.
    pub fn format(self, header: &LocalFileHeader) -> String {
        format!("{:0width$X}", self.value(header), width = self.size() * 2)
    }

    fn name(self) -> &'static str {
        match self {
            Self::Signature => "Signature",
            Self::VersionNeeded => "VersionNeeded",
            Self::Flags => "Flags",
            Self::Compression => "Compression",
            Self::Time => "Time",
            Self::Date => "Date",
            Self::Crc32 => "Crc32",
            Self::CompressedSize => "CompressedSize",
            Self::UncompressedSize => "UncompressedSize",
            Self::NameLength => "NameLength",
            Self::ExtraLength => "ExtraLength",
        }
    }
}

impl fmt::Display for LocalHeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LocalHeaderField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.chars().filter(|c| *c != '-' && *c != '_').collect();
        Self::ALL
            .into_iter()
            .find(|field| field.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| format!("unknown local header field '{s}'"))
    }
}
