//! Fixed-width little-endian values.

use byteorder::{ByteOrder, LittleEndian};

mod sealed {
    pub trait Sealed {}
}

/// A numeric type with a fixed little-endian encoding.
///
/// The set is closed: signed and unsigned 16, 32 and 64-bit integers.
pub trait FixedValue: Copy + sealed::Sealed {
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Decode from the first `SIZE` bytes of `bytes`.
    fn decode(bytes: &[u8]) -> Self;

    /// Encode into the first `SIZE` bytes of `out`.
    fn encode(self, out: &mut [u8]);
}

macro_rules! impl_fixed_value {
    ($($ty:ty => $read:ident, $write:ident;)*) => {
        $(
            impl sealed::Sealed for $ty {}

            impl FixedValue for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                #[inline]
                fn decode(bytes: &[u8]) -> Self {
                    LittleEndian::$read(bytes)
                }

                #[inline]
                fn encode(self, out: &mut [u8]) {
                    LittleEndian::$write(out, self)
                }
            }
        )*
    };
}

impl_fixed_value! {
    i16 => read_i16, write_i16;
    u16 => read_u16, write_u16;
    i32 => read_i32, write_i32;
    u32 => read_u32, write_u32;
    i64 => read_i64, write_i64;
    u64 => read_u64, write_u64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(i16::SIZE, 2);
        assert_eq!(u32::SIZE, 4);
        assert_eq!(i64::SIZE, 8);
    }

    #[test]
    fn test_little_endian() {
        let mut out = [0u8; 4];
        0x0403_0201u32.encode(&mut out);
        assert_eq!(out, [1, 2, 3, 4]);
        assert_eq!(i32::decode(&[0xFF, 0xFF, 0xFF, 0xFF]), -1);
    }
}
