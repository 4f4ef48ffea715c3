//! ZIP format structures.
//!
//! This module contains the low-level records of a stored ZIP archive,
//! including the ZIP64 extensions needed once sizes, offsets or the entry
//! count outgrow their legacy fields.

pub mod central_dir;
mod eocd;
pub mod extra;
pub mod local;

pub use central_dir::CentralDirectoryHeader;
pub use eocd::{Eocd64Locator, Eocd64Record, EocdRecord};
pub use extra::{ExtraFieldHeader, Zip64Extra};
pub use local::{LocalFileHeader, LocalHeaderField};

/// Version made by and version needed on every record (4.5, ZIP64).
pub const ZIP_VERSION: u16 = 0x2D;

/// Compression methods known to the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum CompressionMethod {
    /// No compression (stored).
    Store = 0,
    /// DEFLATE compression.
    Deflate = 8,
}

impl TryFrom<u16> for CompressionMethod {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Store),
            8 => Ok(Self::Deflate),
            other => Err(other),
        }
    }
}

/// A value narrowed to its legacy field width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldFit<T> {
    /// Value for the legacy field; the all-ones sentinel when extended.
    pub legacy: T,
    /// The real value has to be carried in a ZIP64 record.
    pub extended: bool,
}

/// Fit a value into a 32-bit field. Values of `0xFFFFFFFF` and above are
/// sentineled, since the all-ones value is reserved.
#[inline]
pub fn fit_u32(value: u64) -> FieldFit<u32> {
    if value >= u32::MAX as u64 {
        FieldFit {
            legacy: u32::MAX,
            extended: true,
        }
    } else {
        FieldFit {
            legacy: value as u32,
            extended: false,
        }
    }
}

/// Fit a value into a 16-bit field, sentineling `0xFFFF` and above.
#[inline]
pub fn fit_u16(value: u64) -> FieldFit<u16> {
    if value >= u16::MAX as u64 {
        FieldFit {
            legacy: u16::MAX,
            extended: true,
        }
    } else {
        FieldFit {
            legacy: value as u16,
            extended: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_u32_boundary() {
        assert_eq!(
            fit_u32(0xFFFF_FFFE),
            FieldFit {
                legacy: 0xFFFF_FFFE,
                extended: false
            }
        );
        assert!(fit_u32(0xFFFF_FFFF).extended);
        assert_eq!(fit_u32(1 << 40).legacy, u32::MAX);
    }

    #[test]
    fn test_fit_u16_entry_count() {
        assert_eq!(fit_u16(0xFFFE).legacy, 0xFFFE);
        assert!(!fit_u16(0xFFFE).extended);
        assert_eq!(
            fit_u16(0xFFFF),
            FieldFit {
                legacy: 0xFFFF,
                extended: true
            }
        );
    }

    #[test]
    fn test_compression_method() {
        assert_eq!(CompressionMethod::try_from(0), Ok(CompressionMethod::Store));
        assert_eq!(CompressionMethod::try_from(93), Err(93));
    }
}
