//! Decoding of typed column data pages.
//!
//! A [`Decoder`](decoder::Decoder) turns the encoded values of one data page into
//! a sequence of native values, either densely or spread over the non-null slots
//! of a validity bitmap. Decoders are created per column with
//! [`get_decoder`](factory::get_decoder) or
//! [`get_dictionary_decoder`](factory::get_dictionary_decoder) and reused across
//! the pages of a column chunk.

pub mod config;
pub mod data_type;
pub mod decoder;
pub mod encodings;
pub mod factory;
pub mod spaced;
pub mod value;

pub use config::DecoderConfig;
pub use decoder::{Decoder, DecoderBase};
pub use factory::{get_decoder, get_dictionary_decoder};
