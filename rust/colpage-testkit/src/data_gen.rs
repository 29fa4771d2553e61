//! Random data generation for tests.
//!
//! Values come from `fastrand`, seeded per thread; tests that need reproducible
//! data can call `fastrand::seed` first.

use colpage_bits::bitpacking::pack_bools_to_bits;
use colpage_format::values::{FixedLenByteArray, Int96};

/// Generates `len` validity flags, each slot being null with probability `null_prob`.
pub fn random_valid_flags(len: usize, null_prob: f64) -> Vec<bool> {
    (0..len).map(|_| fastrand::f64() >= null_prob).collect()
}

/// Packs validity flags into an LSB-first bitmap, returning the bitmap bytes
/// and the number of null slots.
pub fn pack_validity(valid: &[bool]) -> (Vec<u8>, usize) {
    let mut bits = vec![0u8; valid.len().div_ceil(8)];
    pack_bools_to_bits(valid, &mut bits);
    let null_count = valid.iter().filter(|&&v| !v).count();
    (bits, null_count)
}

/// Generates a random validity bitmap of `len` slots, returning the bitmap bytes
/// and the number of null slots.
pub fn random_validity(len: usize, null_prob: f64) -> (Vec<u8>, usize) {
    pack_validity(&random_valid_flags(len, null_prob))
}

pub fn random_bools(len: usize) -> Vec<bool> {
    (0..len).map(|_| fastrand::bool()).collect()
}

pub fn random_i32s(len: usize) -> Vec<i32> {
    (0..len).map(|_| fastrand::i32(..)).collect()
}

pub fn random_i64s(len: usize) -> Vec<i64> {
    (0..len).map(|_| fastrand::i64(..)).collect()
}

pub fn random_f32s(len: usize) -> Vec<f32> {
    (0..len).map(|_| fastrand::f32() * 2e4 - 1e4).collect()
}

pub fn random_f64s(len: usize) -> Vec<f64> {
    (0..len).map(|_| fastrand::f64() * 2e6 - 1e6).collect()
}

pub fn random_int96s(len: usize) -> Vec<Int96> {
    (0..len)
        .map(|_| Int96::new([fastrand::u32(..), fastrand::u32(..), fastrand::u32(..)]))
        .collect()
}

/// Generates `len` fixed-length byte arrays of `width` random bytes.
pub fn random_flbas(len: usize, width: usize) -> Vec<FixedLenByteArray> {
    (0..len)
        .map(|_| FixedLenByteArray::new((0..width).map(|_| fastrand::u8(..)).collect()))
        .collect()
}

/// Generates `len` integers drawn from `cardinality` distinct values, suitable
/// for dictionary encoding.
pub fn low_cardinality_i32s(len: usize, cardinality: usize) -> Vec<i32> {
    assert_ne!(cardinality, 0);
    (0..len)
        .map(|_| fastrand::i32(0..cardinality as i32) * 1009 - 500)
        .collect()
}
