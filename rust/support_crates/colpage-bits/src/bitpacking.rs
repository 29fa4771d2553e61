//! Conversions between LSB-first bit-packed booleans and expanded `bool` slices.
//!
//! Plain-encoded boolean pages and validity bitmaps both store one value per bit,
//! least significant bit first.
//!
//! # Usage Examples
//!
//! ```rust
//! use colpage_bits::bitpacking::{pack_bools_to_bits, unpack_bits_to_bools};
//!
//! let input = [true, false, true, true, false, false, true, false];
//! let mut packed = vec![0u8; 1];
//! pack_bools_to_bits(&input, &mut packed);
//! assert_eq!(packed[0], 0b01001101);
//!
//! let mut unpacked = [false; 8];
//! unpack_bits_to_bools(&packed, 0, &mut unpacked);
//! assert_eq!(unpacked, input);
//! ```

/// Converts expanded booleans to bit-packed format.
///
/// # Arguments
/// * `input` - Boolean values to pack
/// * `output_buffer` - Output buffer to write packed bits to, at least
///   `input.len().div_ceil(8)` bytes long
///
/// # Panics
/// Panics if `output_buffer` is too small.
pub fn pack_bools_to_bits(input: &[bool], output_buffer: &mut [u8]) {
    let expected_output_bytes = input.len().div_ceil(8);
    assert!(
        output_buffer.len() >= expected_output_bytes,
        "Output buffer too small: got {}, need {}",
        output_buffer.len(),
        expected_output_bytes
    );

    for (byte_idx, chunk) in input.chunks(8).enumerate() {
        let mut byte_val = 0u8;
        for (bit_idx, &value) in chunk.iter().enumerate() {
            byte_val |= (value as u8) << bit_idx;
        }
        output_buffer[byte_idx] = byte_val;
    }
}

/// Converts bit-packed boolean data into `output`.
///
/// Reads `output.len()` bits starting at bit `offset` of `bits`.
///
/// # Panics
/// Panics if `bits` holds fewer than `offset + output.len()` bits.
pub fn unpack_bits_to_bools(bits: &[u8], offset: usize, output: &mut [bool]) {
    let len = output.len();
    let bits_len = bits.len();
    assert!(offset + len <= bits_len * 8);

    if len == 0 {
        return;
    }

    // 1. Initial unaligned bits from the first partial byte.
    // 2. Whole bytes through the lookup table.
    // 3. Trailing partial byte.
    let mut output_idx = 0;
    let mut remaining_len = len;
    let mut current_offset = offset;

    let start_byte = current_offset / 8;
    let start_bit = current_offset % 8;

    if start_bit != 0 {
        let bits_in_first_byte = (8 - start_bit).min(remaining_len);
        let byte_val = bits[start_byte] as usize;
        let output_end = output_idx + bits_in_first_byte;
        output[output_idx..output_end].copy_from_slice(
            &BIT_UNPACK_LOOKUP_TABLE[byte_val][start_bit..start_bit + bits_in_first_byte],
        );
        output_idx = output_end;
        remaining_len -= bits_in_first_byte;
        current_offset += bits_in_first_byte;
    }

    let byte_offset = current_offset / 8;
    let complete_bytes = remaining_len / 8;
    let final_bits = remaining_len % 8;

    for &byte_val in &bits[byte_offset..byte_offset + complete_bytes] {
        output[output_idx..output_idx + 8]
            .copy_from_slice(&BIT_UNPACK_LOOKUP_TABLE[byte_val as usize]);
        output_idx += 8;
    }

    if final_bits > 0 {
        let byte_val = bits[byte_offset + complete_bytes] as usize;
        output[output_idx..output_idx + final_bits]
            .copy_from_slice(&BIT_UNPACK_LOOKUP_TABLE[byte_val][..final_bits]);
    }
}

/// Counts set bits in the `len` bits starting at bit `offset`.
///
/// # Panics
/// Panics if `bits` holds fewer than `offset + len` bits.
pub fn count_set_bits(bits: &[u8], offset: usize, len: usize) -> usize {
    assert!(offset + len <= bits.len() * 8);
    if len == 0 {
        return 0;
    }

    let end = offset + len;
    let first_byte = offset / 8;
    let last_byte = (end - 1) / 8;

    if first_byte == last_byte {
        let mask = BYTE_MASKS[end - first_byte * 8] & !BYTE_MASKS[offset % 8];
        return (bits[first_byte] & mask).count_ones() as usize;
    }

    let head = (bits[first_byte] & !BYTE_MASKS[offset % 8]).count_ones() as usize;
    let middle: usize = bits[first_byte + 1..last_byte]
        .iter()
        .map(|b| b.count_ones() as usize)
        .sum();
    let tail = (bits[last_byte] & BYTE_MASKS[end - last_byte * 8]).count_ones() as usize;
    head + middle + tail
}

/// BYTE_MASKS[n] keeps the lowest `n` bits of a byte.
const BYTE_MASKS: [u8; 9] = [0x00, 0x01, 0x03, 0x07, 0x0f, 0x1f, 0x3f, 0x7f, 0xff];

static BIT_UNPACK_LOOKUP_TABLE: [[bool; 8]; 256] = {
    let mut table = [[false; 8]; 256];
    let mut i = 0;
    while i < 256 {
        let mut bit = 0;
        while bit < 8 {
            table[i][bit] = (i >> bit) & 1 == 1;
            bit += 1;
        }
        i += 1;
    }
    table
};
