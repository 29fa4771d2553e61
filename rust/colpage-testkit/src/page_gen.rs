//! Encoders producing data pages in each supported page encoding.
//!
//! The builders favor simplicity over compression: the hybrid encoder switches
//! to a repeated run only for runs of at least 8 values, and delta pages always
//! use blocks of 128 values in 4 mini blocks.

use bytes::Bytes;
use colpage_bits::bitpacking::pack_bools_to_bits;
use colpage_format::values::{FixedLenByteArray, Int96};

/// A value type with a PLAIN encoding.
pub trait PlainEncode: Clone + PartialEq {
    fn encode_plain(values: &[Self], out: &mut Vec<u8>);
}

macro_rules! impl_plain_encode {
    ($($T:ty),*) => {
        $(
            impl PlainEncode for $T {
                fn encode_plain(values: &[$T], out: &mut Vec<u8>) {
                    for value in values {
                        out.extend_from_slice(&value.to_le_bytes());
                    }
                }
            }
        )*
    };
}

impl_plain_encode!(i32, i64, f32, f64);

impl PlainEncode for bool {
    fn encode_plain(values: &[bool], out: &mut Vec<u8>) {
        let start = out.len();
        out.resize(start + values.len().div_ceil(8), 0);
        pack_bools_to_bits(values, &mut out[start..]);
    }
}

impl PlainEncode for Int96 {
    fn encode_plain(values: &[Int96], out: &mut Vec<u8>) {
        for value in values {
            out.extend_from_slice(&value.to_le_bytes());
        }
    }
}

impl PlainEncode for FixedLenByteArray {
    fn encode_plain(values: &[FixedLenByteArray], out: &mut Vec<u8>) {
        for value in values {
            out.extend_from_slice(value.as_bytes());
        }
    }
}

pub fn plain_page<T: PlainEncode>(values: &[T]) -> Bytes {
    let mut page = Vec::new();
    T::encode_plain(values, &mut page);
    page.into()
}

/// LSB-first bit writer, the counterpart of `colpage_bits::bit_reader::BitReader`.
#[derive(Debug, Default)]
pub struct BitWriter {
    buffer: Vec<u8>,
    bit_pos: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the low `num_bits` bits of `value`.
    pub fn put_value(&mut self, value: u64, num_bits: usize) {
        for i in 0..num_bits {
            if self.bit_pos % 8 == 0 {
                self.buffer.push(0);
            }
            if (value >> i) & 1 == 1 {
                self.buffer[self.bit_pos / 8] |= 1 << (self.bit_pos % 8);
            }
            self.bit_pos += 1;
        }
    }

    /// Moves to the next byte boundary.
    pub fn align(&mut self) {
        self.bit_pos = self.buffer.len() * 8;
    }

    pub fn put_aligned_bytes(&mut self, bytes: &[u8]) {
        self.align();
        self.buffer.extend_from_slice(bytes);
        self.align();
    }

    /// Appends the `num_bytes` low bytes of `value`, little-endian.
    pub fn put_aligned_le(&mut self, value: u64, num_bytes: usize) {
        self.put_aligned_bytes(&value.to_le_bytes()[..num_bytes]);
    }

    pub fn put_vlq_int(&mut self, mut value: u64) {
        self.align();
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.buffer.push(byte);
                break;
            }
            self.buffer.push(byte | 0x80);
        }
        self.align();
    }

    pub fn put_zigzag_vlq_int(&mut self, value: i64) {
        self.put_vlq_int(((value << 1) ^ (value >> 63)) as u64);
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

/// Number of bits needed to represent `value`.
pub fn bit_width(value: u64) -> u8 {
    (64 - value.leading_zeros()) as u8
}

/// Encodes `values` as an RLE / bit-packing hybrid stream of `bit_width` bits,
/// without a length prefix.
pub fn rle_hybrid(values: &[u64], bit_width: u8) -> Vec<u8> {
    let mut writer = BitWriter::new();
    let mut literals: Vec<u64> = Vec::new();
    let mut i = 0;
    while i < values.len() {
        let run_end = values[i..]
            .iter()
            .position(|&v| v != values[i])
            .map_or(values.len(), |p| i + p);
        let run_len = run_end - i;
        // Bit-packed runs other than the last must not be padded.
        if run_len >= 8 && literals.len() % 8 == 0 {
            flush_bit_packed(&mut writer, &mut literals, bit_width);
            writer.put_vlq_int((run_len as u64) << 1);
            writer.put_aligned_le(values[i], (bit_width as usize).div_ceil(8));
            i = run_end;
        } else {
            literals.push(values[i]);
            i += 1;
        }
    }
    flush_bit_packed(&mut writer, &mut literals, bit_width);
    writer.into_bytes()
}

fn flush_bit_packed(writer: &mut BitWriter, literals: &mut Vec<u64>, bit_width: u8) {
    if literals.is_empty() {
        return;
    }
    let groups = literals.len().div_ceil(8);
    writer.put_vlq_int(((groups as u64) << 1) | 1);
    literals.resize(groups * 8, 0);
    for &value in literals.iter() {
        writer.put_value(value, bit_width as usize);
    }
    writer.align();
    literals.clear();
}

/// Encodes booleans as an RLE page: a 4-byte little-endian length followed by a
/// hybrid stream of bit width 1.
pub fn rle_bool_page(values: &[bool]) -> Bytes {
    let values: Vec<u64> = values.iter().map(|&v| v as u64).collect();
    let stream = rle_hybrid(&values, 1);
    let mut page = (stream.len() as u32).to_le_bytes().to_vec();
    page.extend_from_slice(&stream);
    page.into()
}

/// A PLAIN dictionary page and the dictionary-encoded data page referencing it.
#[derive(Debug, Clone)]
pub struct DictionaryPages {
    pub dictionary: Bytes,
    pub num_dict_values: usize,
    pub data: Bytes,
}

/// Dictionary-encodes `values`, assigning indices in order of first occurrence.
pub fn dictionary_pages<T: PlainEncode>(values: &[T]) -> DictionaryPages {
    let mut dictionary: Vec<T> = Vec::new();
    let mut indices = Vec::with_capacity(values.len());
    for value in values {
        let index = match dictionary.iter().position(|entry| entry == value) {
            Some(index) => index,
            None => {
                dictionary.push(value.clone());
                dictionary.len() - 1
            }
        };
        indices.push(index as u64);
    }

    let width = bit_width(dictionary.len().saturating_sub(1) as u64);
    let mut data = vec![width];
    data.extend_from_slice(&rle_hybrid(&indices, width));
    DictionaryPages {
        dictionary: plain_page(&dictionary),
        num_dict_values: dictionary.len(),
        data: data.into(),
    }
}

const DELTA_BLOCK_SIZE: usize = 128;
const DELTA_MINI_BLOCKS: usize = 4;
const DELTA_MINI_BLOCK_SIZE: usize = DELTA_BLOCK_SIZE / DELTA_MINI_BLOCKS;

macro_rules! delta_page {
    ($name:ident, $T:ty, $U:ty) => {
        /// Encodes the values as a DELTA_BINARY_PACKED page.
        pub fn $name(values: &[$T]) -> Bytes {
            let mut writer = BitWriter::new();
            writer.put_vlq_int(DELTA_BLOCK_SIZE as u64);
            writer.put_vlq_int(DELTA_MINI_BLOCKS as u64);
            writer.put_vlq_int(values.len() as u64);
            writer.put_zigzag_vlq_int(values.first().copied().unwrap_or_default() as i64);

            let deltas: Vec<$T> = values.windows(2).map(|w| w[1].wrapping_sub(w[0])).collect();
            for block in deltas.chunks(DELTA_BLOCK_SIZE) {
                let min_delta = block.iter().copied().min().unwrap_or_default();
                writer.put_zigzag_vlq_int(min_delta as i64);

                let packed: Vec<u64> = block
                    .iter()
                    .map(|d| d.wrapping_sub(min_delta) as $U as u64)
                    .collect();
                let mut widths = [0u8; DELTA_MINI_BLOCKS];
                for (width, mini_block) in widths.iter_mut().zip(packed.chunks(DELTA_MINI_BLOCK_SIZE)) {
                    *width = bit_width(mini_block.iter().copied().max().unwrap_or(0));
                }
                writer.put_aligned_bytes(&widths);

                for (mini_block, &width) in packed.chunks(DELTA_MINI_BLOCK_SIZE).zip(&widths) {
                    for i in 0..DELTA_MINI_BLOCK_SIZE {
                        writer.put_value(mini_block.get(i).copied().unwrap_or(0), width as usize);
                    }
                }
            }
            writer.into_bytes().into()
        }
    };
}

delta_page!(delta_page_i32, i32, u32);
delta_page!(delta_page_i64, i64, u64);

/// Rearranges a PLAIN page of `width`-byte values into byte streams.
pub fn byte_stream_split_page(plain: &[u8], width: usize) -> Bytes {
    assert_eq!(plain.len() % width, 0);
    let stride = plain.len() / width;
    let mut page = vec![0u8; plain.len()];
    for (i, value) in plain.chunks_exact(width).enumerate() {
        for (b, &byte) in value.iter().enumerate() {
            page[b * stride + i] = byte;
        }
    }
    page.into()
}
