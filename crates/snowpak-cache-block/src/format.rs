//! On-disk constants of the cache_block format.
//!
//! ```text
//! signature   64 bytes
//! header      i32(1) u8(1) i32 count i32(4) u8(1)
//! names       count x (i32 length, bytes)
//! u8(1)
//! offsets     count x i64
//! u8(1)
//! sizes       count x i32
//! u8(1)
//! zeros       count x i32(0)
//! payloads    from the base offset
//! ```

/// Fixed file signature: `1SERcache_block` and `S3DRESOURCE` tags, zero padded.
pub const SIGNATURE: [u8; 64] = [
    0x31, 0x53, 0x45, 0x52, 0x63, 0x61, 0x63, 0x68, 0x65, 0x5F, 0x62, 0x6C, 0x6F, 0x63, 0x6B, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x53, 0x33, 0x44, 0x52, 0x45, 0x53, 0x4F, 0x55, 0x52, 0x43, 0x45, 0x20,
    0x20, 0x20, 0x20, 0x20, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Leading header dword.
pub const VERSION: u32 = 1;

/// Header dword following the entry count.
pub const TABLE_TAG: u32 = 4;

/// Separator byte between header fields and tables.
pub const SEPARATOR: u8 = 1;

/// Bytes from the start of the file to the first name.
pub const HEADER_SIZE: u64 = SIGNATURE.len() as u64 + 4 + 1 + 4 + 4 + 1;

/// Largest payload a single entry can hold.
pub const MAX_FILE_SIZE: u64 = i32::MAX as u64;
