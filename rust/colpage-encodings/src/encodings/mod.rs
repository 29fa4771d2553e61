//! Concrete decoders, one module per page encoding.

pub mod byte_stream_split;
pub mod delta;
pub mod dictionary;
pub mod plain;
pub mod rle;
