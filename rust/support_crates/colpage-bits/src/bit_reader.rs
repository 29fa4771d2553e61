//! LSB-first bit reader over a shared byte buffer, with ULEB128 and zigzag varints.
//!
//! This is the primitive underneath the RLE / bit-packing hybrid stream and the
//! delta binary packed blocks: both interleave byte-aligned headers (varints,
//! little-endian fixed-width values) with bit-packed runs.

use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;

/// All possible masks for an 8-byte wide value.
/// BITPACK_MASKS[n] = (1 << n) - 1
pub const BITPACK_MASKS: [u64; 65] = {
    let mut masks = [0; 65];
    let mut i = 0;
    while i < 64 {
        masks[i] = (1u64 << i) - 1;
        i += 1;
    }
    masks[64] = u64::MAX;
    masks
};

/// Maximum number of bytes in a ULEB128-encoded 64-bit integer.
pub const MAX_VLQ_BYTE_LEN: usize = 10;

/// A value type that bit-packed integers of up to 64 bits can be unpacked into.
///
/// The conversion truncates to the width of the target type, which is how
/// bit-packed deltas of 32-bit columns are reinterpreted.
pub trait FromBitPacked: Copy {
    fn from_u64(value: u64) -> Self;
}

macro_rules! impl_from_bit_packed {
    ($($T:ty),*) => {
        $(
            impl FromBitPacked for $T {
                #[inline]
                fn from_u64(value: u64) -> Self {
                    value as $T
                }
            }
        )*
    };
}

impl_from_bit_packed!(u8, u16, u32, u64, i32, i64, usize);

impl FromBitPacked for bool {
    #[inline]
    fn from_u64(value: u64) -> Self {
        value != 0
    }
}

/// Reads from a shared, reference-counted buffer, so a reader can outlive the
/// caller's handle to the page bytes.
#[derive(Debug, Clone, Default)]
pub struct BitReader {
    data: Bytes,
    /// Absolute bit position of the next bit to read.
    bit_pos: usize,
}

impl BitReader {
    pub fn new(data: Bytes) -> Self {
        Self { data, bit_pos: 0 }
    }

    /// Replaces the underlying buffer and rewinds to its first bit.
    pub fn reset(&mut self, data: Bytes) {
        self.data = data;
        self.bit_pos = 0;
    }

    /// Byte offset of the next byte-aligned read, rounding a partially consumed
    /// byte up.
    #[inline]
    pub fn byte_offset(&self) -> usize {
        self.bit_pos.div_ceil(8)
    }

    #[inline]
    pub fn bits_left(&self) -> usize {
        self.data.len() * 8 - self.bit_pos.min(self.data.len() * 8)
    }

    /// Reads a single value of `num_bits` bits, or `None` if the buffer is exhausted.
    pub fn get_value(&mut self, num_bits: usize) -> Option<u64> {
        debug_assert!(num_bits <= 64);
        if num_bits == 0 {
            return Some(0);
        }
        if self.bits_left() < num_bits {
            return None;
        }

        let byte = self.bit_pos / 8;
        let shift = self.bit_pos % 8;
        let value = if shift + num_bits <= 64 && byte + 8 <= self.data.len() {
            (LittleEndian::read_u64(&self.data[byte..byte + 8]) >> shift) & BITPACK_MASKS[num_bits]
        } else {
            self.read_bits_slow(num_bits)
        };
        self.bit_pos += num_bits;
        Some(value)
    }

    fn read_bits_slow(&self, num_bits: usize) -> u64 {
        let mut value = 0u64;
        let mut written = 0;
        let mut pos = self.bit_pos;
        while written < num_bits {
            let byte = self.data[pos / 8] as u64;
            let bit = pos % 8;
            let take = (8 - bit).min(num_bits - written);
            value |= ((byte >> bit) & BITPACK_MASKS[take]) << written;
            written += take;
            pos += take;
        }
        value
    }

    /// Unpacks up to `out.len()` values of `num_bits` bits each.
    ///
    /// Returns the number of values read, which is less than `out.len()` only when
    /// the buffer runs out.
    pub fn get_batch<T: FromBitPacked>(&mut self, out: &mut [T], num_bits: usize) -> usize {
        debug_assert!(num_bits <= 64);
        let available = if num_bits == 0 {
            out.len()
        } else {
            self.bits_left() / num_bits
        };
        let count = out.len().min(available);
        for dst in &mut out[..count] {
            // Bounds were established above.
            *dst = T::from_u64(self.get_value(num_bits).unwrap_or_default());
        }
        count
    }

    /// Skips up to `num_values` values of `num_bits` bits each, returning how many
    /// were skipped.
    pub fn skip(&mut self, num_values: usize, num_bits: usize) -> usize {
        let available = if num_bits == 0 {
            num_values
        } else {
            self.bits_left() / num_bits
        };
        let count = num_values.min(available);
        self.bit_pos += count * num_bits;
        count
    }

    /// Reads a `num_bytes` wide little-endian value starting at the next byte
    /// boundary.
    pub fn get_aligned<T: FromBitPacked>(&mut self, num_bytes: usize) -> Option<T> {
        debug_assert!(num_bytes <= 8);
        let start = self.byte_offset();
        let end = start.checked_add(num_bytes)?;
        if end > self.data.len() {
            return None;
        }
        let value = if num_bytes == 0 {
            0
        } else {
            LittleEndian::read_uint(&self.data[start..end], num_bytes)
        };
        self.bit_pos = end * 8;
        Some(T::from_u64(value))
    }

    /// Appends `num_bytes` aligned bytes to `out`, returning how many were available.
    pub fn get_aligned_bytes(&mut self, out: &mut Vec<u8>, num_bytes: usize) -> usize {
        let start = self.byte_offset().min(self.data.len());
        let end = (start + num_bytes).min(self.data.len());
        out.extend_from_slice(&self.data[start..end]);
        self.bit_pos = end * 8;
        end - start
    }

    /// Reads an unsigned LEB128 varint starting at the next byte boundary.
    pub fn get_vlq_int(&mut self) -> Option<u64> {
        let mut pos = self.byte_offset();
        let mut value = 0u64;
        for i in 0..MAX_VLQ_BYTE_LEN {
            let byte = *self.data.get(pos)?;
            pos += 1;
            value |= ((byte & 0x7f) as u64) << (7 * i);
            if byte & 0x80 == 0 {
                self.bit_pos = pos * 8;
                return Some(value);
            }
        }
        None
    }

    /// Reads a zigzag-encoded signed varint.
    pub fn get_zigzag_vlq_int(&mut self) -> Option<i64> {
        self.get_vlq_int()
            .map(|u| ((u >> 1) as i64) ^ -((u & 1) as i64))
    }
}
