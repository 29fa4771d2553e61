//! RLE / bit-packing hybrid encoding.
//!
//! The stream is a sequence of runs, each introduced by a ULEB128 header. The
//! lowest header bit selects the run kind:
//! - `1`: a bit-packed run of `(header >> 1) * 8` values, each `bit_width` bits
//!   wide, packed LSB-first.
//! - `0`: a repeated run of `header >> 1` copies of one value, stored in
//!   `ceil(bit_width / 8)` little-endian bytes.
//!
//! The hybrid stream carries dictionary indices and boolean values. As a
//! page encoding of its own (`RLE`, booleans only) it is prefixed with its
//! length as a 4-byte little-endian integer.

use std::marker::PhantomData;

use crate::{
    data_type::DataType,
    decoder::{Decoder, DecoderBase},
};
use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;
use colpage_bits::bit_reader::{BitReader, FromBitPacked};
use colpage_common::{Result, error::Error, verify_data};
use colpage_format::{encoding::Encoding, schema::ColumnDescriptor};

/// Number of dictionary indices unpacked per step.
const INDEX_BATCH_SIZE: usize = 1024;

/// Decoder for a raw hybrid stream with a known bit width.
#[derive(Debug, Clone, Default)]
pub struct RleDecoder {
    bit_width: u8,
    reader: BitReader,
    /// Values left in the current repeated run.
    rle_left: usize,
    /// Values left in the current bit-packed run.
    bit_packed_left: usize,
    current_value: u64,
}

impl RleDecoder {
    pub fn new(bit_width: u8) -> Self {
        Self {
            bit_width,
            ..Default::default()
        }
    }

    #[inline]
    pub fn bit_width(&self) -> u8 {
        self.bit_width
    }

    pub fn set_data(&mut self, data: Bytes) {
        self.reader.reset(data);
        self.rle_left = 0;
        self.bit_packed_left = 0;
        self.current_value = 0;
    }

    /// Reads the next run header. Returns `false` at the end of the stream.
    fn reload(&mut self) -> Result<bool> {
        let Some(header) = self.reader.get_vlq_int() else {
            return Ok(false);
        };
        let run_len = (header >> 1) as usize;
        if header & 1 == 1 {
            self.bit_packed_left = run_len.saturating_mul(8);
        } else {
            let value_bytes = (self.bit_width as usize).div_ceil(8);
            self.current_value = self
                .reader
                .get_aligned::<u64>(value_bytes)
                .ok_or_else(|| Error::unexpected_eof("RLE run value"))?;
            self.rle_left = run_len;
        }
        Ok(true)
    }

    /// Decodes up to `out.len()` values, returning how many were decoded.
    ///
    /// Fewer values are returned only when the stream is exhausted.
    pub fn get_batch<T: FromBitPacked>(&mut self, out: &mut [T]) -> Result<usize> {
        let mut read = 0;
        while read < out.len() {
            if self.rle_left > 0 {
                let n = self.rle_left.min(out.len() - read);
                out[read..read + n].fill(T::from_u64(self.current_value));
                self.rle_left -= n;
                read += n;
            } else if self.bit_packed_left > 0 {
                let n = self.bit_packed_left.min(out.len() - read);
                let got = self
                    .reader
                    .get_batch(&mut out[read..read + n], self.bit_width as usize);
                read += got;
                if got < n {
                    // Truncated run.
                    self.bit_packed_left = 0;
                    break;
                }
                self.bit_packed_left -= got;
            } else if !self.reload()? {
                break;
            }
        }
        Ok(read)
    }

    /// Decodes up to `out.len()` dictionary indices and writes the referenced
    /// dictionary entries to `out`.
    ///
    /// An out-of-range index fails the call after the indices read so far have
    /// been consumed from the stream, with `out` partially written.
    pub fn get_batch_with_dict<V: Clone>(&mut self, dict: &[V], out: &mut [V]) -> Result<usize> {
        let mut indices = [0u32; INDEX_BATCH_SIZE];
        let mut read = 0;
        while read < out.len() {
            if self.rle_left > 0 {
                let n = self.rle_left.min(out.len() - read);
                let value = lookup(dict, self.current_value as usize)?;
                for dst in &mut out[read..read + n] {
                    value.clone_into(dst);
                }
                self.rle_left -= n;
                read += n;
            } else if self.bit_packed_left > 0 {
                let n = self
                    .bit_packed_left
                    .min(out.len() - read)
                    .min(INDEX_BATCH_SIZE);
                let got = self
                    .reader
                    .get_batch(&mut indices[..n], self.bit_width as usize);
                // Truncated run.
                self.bit_packed_left = if got < n {
                    0
                } else {
                    self.bit_packed_left - got
                };
                for (dst, &index) in out[read..read + got].iter_mut().zip(&indices[..got]) {
                    lookup(dict, index as usize)?.clone_into(dst);
                }
                read += got;
                if got < n {
                    break;
                }
            } else if !self.reload()? {
                break;
            }
        }
        Ok(read)
    }

    /// Skips up to `num_values` values, returning how many were skipped.
    pub fn skip(&mut self, num_values: usize) -> Result<usize> {
        let mut skipped = 0;
        while skipped < num_values {
            if self.rle_left > 0 {
                let n = self.rle_left.min(num_values - skipped);
                self.rle_left -= n;
                skipped += n;
            } else if self.bit_packed_left > 0 {
                let n = self.bit_packed_left.min(num_values - skipped);
                let got = self.reader.skip(n, self.bit_width as usize);
                skipped += got;
                if got < n {
                    self.bit_packed_left = 0;
                    break;
                }
                self.bit_packed_left -= got;
            } else if !self.reload()? {
                break;
            }
        }
        Ok(skipped)
    }
}

#[inline]
fn lookup<V>(dict: &[V], index: usize) -> Result<&V> {
    dict.get(index).ok_or_else(|| {
        Error::invalid_format(
            "dictionary index",
            format!("index {index} out of range for dictionary of {}", dict.len()),
        )
    })
}

/// Decoder for RLE-encoded pages: a length-prefixed hybrid stream with a bit
/// width of 1. Only booleans use this encoding.
pub struct RleValueDecoder<'a, T: DataType> {
    base: DecoderBase<'a>,
    decoder: RleDecoder,
    _phantom: PhantomData<T>,
}

impl<'a, T: DataType> RleValueDecoder<'a, T>
where
    T::T: FromBitPacked,
{
    pub fn new(descr: &'a ColumnDescriptor) -> Self {
        Self {
            base: DecoderBase::new(descr, Encoding::Rle),
            decoder: RleDecoder::new(1),
            _phantom: PhantomData,
        }
    }
}

impl<'a, T: DataType> Decoder<'a, T> for RleValueDecoder<'a, T>
where
    T::T: FromBitPacked,
{
    fn base(&self) -> &DecoderBase<'a> {
        &self.base
    }

    fn set_data(&mut self, num_values: usize, data: Bytes) -> Result<()> {
        self.base.clear();
        verify_data!(data, data.len() >= 4);
        let len = LittleEndian::read_u32(&data[..4]) as usize;
        verify_data!(len, len <= data.len() - 4);

        self.base.reset(num_values, data.len());
        self.decoder.set_data(data.slice(4..4 + len));
        Ok(())
    }

    fn decode(&mut self, buffer: &mut [T::T]) -> Result<usize> {
        let count = buffer.len().min(self.base.values_left());
        let read = self.decoder.get_batch(&mut buffer[..count])?;
        self.base.consume(read);
        Ok(read)
    }

    fn skip(&mut self, num_values: usize) -> Result<usize> {
        let count = num_values.min(self.base.values_left());
        let skipped = self.decoder.skip(count)?;
        self.base.consume(skipped);
        Ok(skipped)
    }
}
