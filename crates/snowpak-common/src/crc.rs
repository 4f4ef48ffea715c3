//! CRC32 for ZIP-compatible archives.
//!
//! Reflected CRC32, polynomial 0xEDB88320. Streams are hashed through
//! [`ByteReader::crc32`](crate::ByteReader::crc32).

pub use crc32fast::Hasher;

/// CRC32 of an in-memory buffer.
#[inline]
pub fn hash_bytes(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_value() {
        assert_eq!(hash_bytes(&[]), 0);
        assert_eq!(hash_bytes(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_hasher_matches_one_shot() {
        let mut hasher = Hasher::new();
        hasher.update(b"hello");
        hasher.update(b"12345");
        assert_eq!(hasher.finalize(), hash_bytes(b"hello12345"));
    }
}
