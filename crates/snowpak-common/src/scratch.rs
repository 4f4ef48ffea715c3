//! Reusable scratch buffer.

/// Size of the chunks used for stream-to-stream copies and hashing.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// A growable byte buffer reused across calls of a single codec instance.
///
/// The buffer grows to the largest request seen so far and never shrinks.
/// It is owned by one reader or writer, so it is never shared between
/// concurrent operations.
#[derive(Debug, Default)]
pub struct Scratch {
    buffer: Vec<u8>,
}

impl Scratch {
    /// Create an empty scratch buffer.
    pub const fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Get a slice of exactly `len` bytes, growing the buffer if needed.
    ///
    /// The contents are unspecified; callers overwrite the whole slice.
    #[inline]
    pub fn get(&mut self, len: usize) -> &mut [u8] {
        if self.buffer.len() < len {
            self.buffer.resize(len, 0);
        }
        &mut self.buffer[..len]
    }

    /// Current size of the backing buffer.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}
