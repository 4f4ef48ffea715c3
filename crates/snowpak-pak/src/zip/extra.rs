//! Extensible extra fields.

use snowpak_common::ByteReader;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::{Error, Result};

/// ZIP64 extended information extra field.
pub const ZIP64: u16 = 0x0001;

/// Header of one extensible extra field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct ExtraFieldHeader {
    /// Field id
    pub id: u16,
    /// Size of the data following this header
    pub size: u16,
}

/// Values carried by a ZIP64 extra field.
///
/// Only the values whose legacy field holds the sentinel are present, always
/// in the order uncompressed size, compressed size, local header offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Zip64Extra {
    pub uncompressed_size: Option<u64>,
    pub compressed_size: Option<u64>,
    pub local_header_offset: Option<u64>,
}

impl Zip64Extra {
    /// Whether no value needs to be carried.
    pub fn is_empty(&self) -> bool {
        self.values().all(|v| v.is_none())
    }

    /// Encoded length including the field header; 0 when empty.
    pub fn encoded_len(&self) -> u16 {
        if self.is_empty() {
            return 0;
        }
        let values = self.values().flatten().count() as u16;
        std::mem::size_of::<ExtraFieldHeader>() as u16 + 8 * values
    }

    /// Append the encoded field to `out`. Nothing is written when empty.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        if self.is_empty() {
            return;
        }
        let header = ExtraFieldHeader {
            id: ZIP64,
            size: self.encoded_len() - std::mem::size_of::<ExtraFieldHeader>() as u16,
        };
        out.extend_from_slice(header.as_bytes());
        for value in self.values().flatten() {
            out.extend_from_slice(&value.to_le_bytes());
        }
    }

    /// Read the ZIP64 values out of an extra block.
    ///
    /// Each `*_sentineled` flag tells whether the legacy field held the
    /// sentinel, and therefore whether the value is present. Other fields
    /// are skipped.
    pub fn parse(
        block: &[u8],
        block_offset: u64,
        uncompressed_sentineled: bool,
        compressed_sentineled: bool,
        offset_sentineled: bool,
    ) -> Result<Self> {
        let mut extra = Self::default();
        let mut reader = ByteReader::with_position(block, block_offset);
        let end = block_offset + block.len() as u64;

        while reader.position() + 4 <= end {
            let header: ExtraFieldHeader = reader.read_struct()?;
            let data = reader.read_bytes(header.size as usize)?;
            if header.id != ZIP64 {
                continue;
            }

            let mut values = ByteReader::new(&data[..]);
            if uncompressed_sentineled {
                extra.uncompressed_size = Some(values.read_u64()?);
            }
            if compressed_sentineled {
                extra.compressed_size = Some(values.read_u64()?);
            }
            if offset_sentineled {
                extra.local_header_offset = Some(values.read_u64()?);
            }
        }
        Ok(extra)
    }

    fn values(&self) -> impl Iterator<Item = Option<u64>> {
        [
            self.uncompressed_size,
            self.compressed_size,
            self.local_header_offset,
        ]
        .into_iter()
    }
}

/// Pick the real value of a legacy field, looking it up in `extra` when the
/// field holds the sentinel.
pub(crate) fn resolve(
    legacy: u32,
    extended: Option<u64>,
    what: &'static str,
) -> Result<u64> {
    if legacy != u32::MAX {
        return Ok(legacy as u64);
    }
    extended.ok_or(Error::MissingZip64Field(what))
}
