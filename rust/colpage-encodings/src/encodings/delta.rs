//! DELTA_BINARY_PACKED encoding for `INT32` and `INT64` columns.
//!
//! Layout:
//! ```text
//! header: <block size> <mini blocks per block> <total value count> <first value>
//! block:  <min delta> <bit width of each mini block> <mini block 0> ... <mini block N>
//! ```
//! Header fields are ULEB128 varints (the first value and every min delta are
//! zigzag encoded). Each mini block holds `block_size / mini_blocks` deltas,
//! bit-packed at its own width after subtracting the block's min delta.

use crate::{
    data_type::DataType,
    decoder::{Decoder, DecoderBase},
    value::DeltaValue,
};
use bytes::Bytes;
use colpage_bits::bit_reader::BitReader;
use colpage_common::{Result, error::Error, verify_data};
use colpage_format::{encoding::Encoding, schema::ColumnDescriptor};
use num_traits::{FromPrimitive, WrappingAdd};

/// Page header preceding the first block.
struct PageHeader {
    mini_blocks_per_block: usize,
    values_per_mini_block: usize,
    total_values: usize,
    first_value: i64,
}

impl PageHeader {
    fn read(reader: &mut BitReader) -> Result<Self> {
        let block_size = read_header_field(reader, "block_size")?;
        let mini_blocks_per_block = read_header_field(reader, "mini_blocks_per_block")?;
        let total_values = read_header_field(reader, "total_value_count")?;
        let first_value = reader
            .get_zigzag_vlq_int()
            .ok_or_else(|| Error::unexpected_eof("first_value"))?;

        verify_data!(block_size, block_size > 0 && block_size % 128 == 0);
        verify_data!(
            mini_blocks_per_block,
            mini_blocks_per_block > 0 && block_size % mini_blocks_per_block == 0
        );
        let values_per_mini_block = block_size / mini_blocks_per_block;
        verify_data!(values_per_mini_block, values_per_mini_block % 32 == 0);

        Ok(Self {
            mini_blocks_per_block,
            values_per_mini_block,
            total_values,
            first_value,
        })
    }
}

fn read_header_field(reader: &mut BitReader, element: &str) -> Result<usize> {
    let value = reader
        .get_vlq_int()
        .ok_or_else(|| Error::unexpected_eof(element))?;
    usize::try_from(value).map_err(|_| Error::invalid_format(element, "value too large"))
}

pub struct DeltaBitPackDecoder<'a, T: DataType>
where
    T::T: DeltaValue,
{
    base: DecoderBase<'a>,
    reader: BitReader,

    mini_blocks_per_block: usize,
    values_per_mini_block: usize,
    /// Values left according to the page header, which may disagree with the
    /// count passed to `set_data`.
    total_remaining: usize,

    min_delta: T::T,
    mini_block_idx: usize,
    mini_block_bit_widths: Vec<u8>,
    mini_block_remaining: usize,

    /// Header value, until it is emitted.
    first_value: Option<T::T>,
    last_value: T::T,
}

impl<'a, T: DataType> DeltaBitPackDecoder<'a, T>
where
    T::T: DeltaValue,
{
    pub fn new(descr: &'a ColumnDescriptor) -> Self {
        Self {
            base: DecoderBase::new(descr, Encoding::DeltaBinaryPacked),
            reader: BitReader::default(),
            mini_blocks_per_block: 0,
            values_per_mini_block: 0,
            total_remaining: 0,
            min_delta: Default::default(),
            mini_block_idx: 0,
            mini_block_bit_widths: Vec::new(),
            mini_block_remaining: 0,
            first_value: None,
            last_value: Default::default(),
        }
    }

    fn next_block(&mut self) -> Result<()> {
        let min_delta = self
            .reader
            .get_zigzag_vlq_int()
            .ok_or_else(|| Error::unexpected_eof("min_delta"))?;
        self.min_delta = T::T::from_i64(min_delta)
            .ok_or_else(|| Error::invalid_format("min_delta", "out of range for column type"))?;

        self.mini_block_bit_widths.clear();
        let read = self
            .reader
            .get_aligned_bytes(&mut self.mini_block_bit_widths, self.mini_blocks_per_block);
        if read != self.mini_blocks_per_block {
            return Err(Error::unexpected_eof("mini block bit widths"));
        }

        // Widths of mini blocks past the last value may hold anything.
        let mut remaining = self.total_remaining;
        for bit_width in &mut self.mini_block_bit_widths {
            if remaining == 0 {
                *bit_width = 0;
            }
            remaining = remaining.saturating_sub(self.values_per_mini_block);
            verify_data!(
                bit_width,
                (*bit_width as usize) <= <T::T as DeltaValue>::BITS
            );
        }

        self.mini_block_idx = 0;
        self.mini_block_remaining = self.values_per_mini_block;
        Ok(())
    }

    fn next_mini_block(&mut self) -> Result<()> {
        if self.mini_block_idx + 1 < self.mini_block_bit_widths.len() {
            self.mini_block_idx += 1;
            self.mini_block_remaining = self.values_per_mini_block;
            Ok(())
        } else {
            self.next_block()
        }
    }
}

impl<'a, T: DataType> Decoder<'a, T> for DeltaBitPackDecoder<'a, T>
where
    T::T: DeltaValue,
{
    fn base(&self) -> &DecoderBase<'a> {
        &self.base
    }

    fn set_data(&mut self, num_values: usize, data: Bytes) -> Result<()> {
        self.base.clear();
        let data_len = data.len();
        let mut reader = BitReader::new(data);
        let header = PageHeader::read(&mut reader)?;
        let first_value = if header.total_values > 0 {
            Some(T::T::from_i64(header.first_value).ok_or_else(|| {
                Error::invalid_format("first_value", "out of range for column type")
            })?)
        } else {
            None
        };

        self.reader = reader;
        self.mini_blocks_per_block = header.mini_blocks_per_block;
        self.values_per_mini_block = header.values_per_mini_block;
        self.total_remaining = header.total_values;
        self.first_value = first_value;
        self.mini_block_idx = 0;
        self.mini_block_remaining = 0;
        self.mini_block_bit_widths.clear();

        self.base.reset(num_values, data_len);
        Ok(())
    }

    fn decode(&mut self, buffer: &mut [T::T]) -> Result<usize> {
        let to_read = buffer
            .len()
            .min(self.base.values_left())
            .min(self.total_remaining);
        if to_read == 0 {
            return Ok(0);
        }

        let mut read = 0;
        if let Some(value) = self.first_value.take() {
            self.last_value = value;
            buffer[0] = value;
            read += 1;
            self.total_remaining -= 1;
        }

        while read < to_read {
            if self.mini_block_remaining == 0 {
                self.next_mini_block()?;
            }

            let bit_width = self.mini_block_bit_widths[self.mini_block_idx] as usize;
            let batch = self.mini_block_remaining.min(to_read - read);
            let got = self
                .reader
                .get_batch(&mut buffer[read..read + batch], bit_width);
            if got != batch {
                return Err(Error::unexpected_eof("delta mini block"));
            }

            // Deltas may overflow the column type, e.g. i64::MAX - i64::MIN.
            for v in &mut buffer[read..read + batch] {
                *v = v
                    .wrapping_add(&self.min_delta)
                    .wrapping_add(&self.last_value);
                self.last_value = *v;
            }

            read += batch;
            self.mini_block_remaining -= batch;
            self.total_remaining -= batch;
        }

        self.base.consume(to_read);
        Ok(to_read)
    }
}
