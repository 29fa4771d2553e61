//! PLAIN encoding: values stored back to back in their little-endian binary form.
//!
//! Booleans are bit-packed LSB-first, `INT96` values take 12 bytes and fixed-length
//! byte arrays take the column's `type_length` bytes each.

use std::marker::PhantomData;

use crate::{
    data_type::DataType,
    decoder::{Decoder, DecoderBase},
    spaced,
    value::FixedWidthValue,
};
use bytes::Bytes;
use colpage_bits::{bitmap::ValidityBitmap, bitpacking::unpack_bits_to_bools};
use colpage_common::{Result, error::Error};
use colpage_format::{
    encoding::Encoding,
    schema::ColumnDescriptor,
    values::{FixedLenByteArray, Int96},
};

/// Read cursor over a plain-encoded page.
#[derive(Debug, Clone, Default)]
pub struct PlainState {
    data: Bytes,
    /// Byte offset of the next value.
    offset: usize,
    /// Bit offset within `data[offset]`, only used by booleans.
    bit_offset: usize,
    /// Width of fixed-length byte array values.
    type_length: usize,
}

impl PlainState {
    fn new(type_length: usize) -> Self {
        Self {
            type_length,
            ..Default::default()
        }
    }

    fn reset(&mut self, data: Bytes) {
        self.data = data;
        self.offset = 0;
        self.bit_offset = 0;
    }

    #[inline]
    fn bytes_left(&self) -> usize {
        self.data.len() - self.offset
    }

    #[inline]
    fn bits_left(&self) -> usize {
        self.bytes_left() * 8 - self.bit_offset
    }

    /// Consumes the next `len` bytes.
    fn take(&mut self, len: usize, element: &str) -> Result<&[u8]> {
        if len > self.bytes_left() {
            return Err(Error::unexpected_eof(element));
        }
        let start = self.offset;
        self.offset += len;
        Ok(&self.data[start..start + len])
    }

    fn take_bits(&mut self, count: usize) -> Result<(&[u8], usize)> {
        if count > self.bits_left() {
            return Err(Error::unexpected_eof("BOOLEAN"));
        }
        let (start, start_bit) = (self.offset, self.bit_offset);
        let end = self.bit_offset + count;
        self.offset += end / 8;
        self.bit_offset = end % 8;
        Ok((&self.data[start..], start_bit))
    }
}

/// A value type that can be read from a plain-encoded page.
///
/// Decoding either fills the whole output or fails without consuming anything.
pub trait PlainValue: Sized {
    fn decode_plain(state: &mut PlainState, out: &mut [Self]) -> Result<()>;

    fn skip_plain(state: &mut PlainState, count: usize) -> Result<()>;

    /// Number of whole values left in the page data.
    fn plain_values_available(state: &PlainState) -> usize;
}

#[cfg(target_endian = "little")]
#[inline]
fn copy_le<T: bytemuck::Pod + FixedWidthValue>(bytes: &[u8], out: &mut [T]) {
    bytemuck::cast_slice_mut::<T, u8>(out).copy_from_slice(bytes);
}

#[cfg(not(target_endian = "little"))]
#[inline]
fn copy_le<T: bytemuck::Pod + FixedWidthValue>(bytes: &[u8], out: &mut [T]) {
    let size = std::mem::size_of::<T>();
    for (dst, chunk) in out.iter_mut().zip(bytes.chunks_exact(size)) {
        T::read_le(chunk, dst);
    }
}

macro_rules! impl_plain_primitive {
    ($($T:ty => $name:literal),*) => {
        $(
            impl PlainValue for $T {
                fn decode_plain(state: &mut PlainState, out: &mut [$T]) -> Result<()> {
                    let bytes = state.take(out.len() * std::mem::size_of::<$T>(), $name)?;
                    copy_le(bytes, out);
                    Ok(())
                }

                fn skip_plain(state: &mut PlainState, count: usize) -> Result<()> {
                    state.take(count.saturating_mul(std::mem::size_of::<$T>()), $name)?;
                    Ok(())
                }

                #[inline]
                fn plain_values_available(state: &PlainState) -> usize {
                    state.bytes_left() / std::mem::size_of::<$T>()
                }
            }
        )*
    };
}

impl_plain_primitive!(i32 => "INT32", i64 => "INT64", f32 => "FLOAT", f64 => "DOUBLE");

impl PlainValue for bool {
    fn decode_plain(state: &mut PlainState, out: &mut [bool]) -> Result<()> {
        let (bits, offset) = state.take_bits(out.len())?;
        unpack_bits_to_bools(bits, offset, out);
        Ok(())
    }

    fn skip_plain(state: &mut PlainState, count: usize) -> Result<()> {
        state.take_bits(count)?;
        Ok(())
    }

    fn plain_values_available(state: &PlainState) -> usize {
        state.bits_left()
    }
}

impl PlainValue for Int96 {
    fn decode_plain(state: &mut PlainState, out: &mut [Int96]) -> Result<()> {
        let bytes = state.take(out.len() * Int96::SIZE, "INT96")?;
        for (dst, chunk) in out.iter_mut().zip(bytes.chunks_exact(Int96::SIZE)) {
            Int96::read_le(chunk, dst);
        }
        Ok(())
    }

    fn skip_plain(state: &mut PlainState, count: usize) -> Result<()> {
        state.take(count.saturating_mul(Int96::SIZE), "INT96")?;
        Ok(())
    }

    fn plain_values_available(state: &PlainState) -> usize {
        state.bytes_left() / Int96::SIZE
    }
}

impl PlainValue for FixedLenByteArray {
    fn decode_plain(state: &mut PlainState, out: &mut [FixedLenByteArray]) -> Result<()> {
        let width = state.type_length;
        let bytes = state.take(out.len() * width, "FIXED_LEN_BYTE_ARRAY")?;
        if width == 0 {
            out.iter_mut().for_each(|dst| dst.set_from_slice(&[]));
            return Ok(());
        }
        for (dst, chunk) in out.iter_mut().zip(bytes.chunks_exact(width)) {
            FixedLenByteArray::read_le(chunk, dst);
        }
        Ok(())
    }

    fn skip_plain(state: &mut PlainState, count: usize) -> Result<()> {
        state.take(count.saturating_mul(state.type_length), "FIXED_LEN_BYTE_ARRAY")?;
        Ok(())
    }

    fn plain_values_available(state: &PlainState) -> usize {
        state
            .bytes_left()
            .checked_div(state.type_length)
            .unwrap_or(usize::MAX)
    }
}

/// Decoder for PLAIN-encoded pages of any physical type.
pub struct PlainDecoder<'a, T: DataType> {
    base: DecoderBase<'a>,
    state: PlainState,
    _phantom: PhantomData<T>,
}

impl<'a, T: DataType> PlainDecoder<'a, T> {
    pub fn new(descr: &'a ColumnDescriptor) -> Self {
        Self {
            base: DecoderBase::new(descr, Encoding::Plain),
            state: PlainState::new(descr.type_length()),
            _phantom: PhantomData,
        }
    }
}

impl<'a, T: DataType> Decoder<'a, T> for PlainDecoder<'a, T> {
    fn base(&self) -> &DecoderBase<'a> {
        &self.base
    }

    fn set_data(&mut self, num_values: usize, data: Bytes) -> Result<()> {
        self.base.reset(num_values, data.len());
        self.state.reset(data);
        Ok(())
    }

    fn decode(&mut self, buffer: &mut [T::T]) -> Result<usize> {
        let count = buffer.len().min(self.base.values_left());
        T::T::decode_plain(&mut self.state, &mut buffer[..count])?;
        self.base.consume(count);
        Ok(count)
    }

    /// Decodes each run of non-null slots in place, in a single forward pass.
    fn decode_spaced(
        &mut self,
        buffer: &mut [T::T],
        null_count: usize,
        valid_bits: &ValidityBitmap<'_>,
    ) -> Result<usize> {
        let num_slots = buffer.len();
        let values_to_read = spaced::check_spaced_args(num_slots, null_count, valid_bits)?;

        let values_left = self.base.values_left();
        if values_left < values_to_read {
            return Err(Error::decode_count_mismatch(values_to_read, values_left));
        }
        if T::T::plain_values_available(&self.state) < values_to_read {
            return Err(Error::unexpected_eof(T::get_physical_type().to_string()));
        }

        for (start, end) in valid_bits.valid_runs(num_slots) {
            T::T::decode_plain(&mut self.state, &mut buffer[start..end])?;
            self.base.consume(end - start);
        }
        Ok(num_slots)
    }

    fn skip(&mut self, num_values: usize) -> Result<usize> {
        let count = num_values.min(self.base.values_left());
        T::T::skip_plain(&mut self.state, count)?;
        self.base.consume(count);
        Ok(count)
    }
}
