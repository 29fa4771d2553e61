//! Bit-level building blocks: validity bitmaps, boolean bit unpacking and an
//! LSB-first bit reader.

pub mod bit_reader;
pub mod bitmap;
pub mod bitpacking;
