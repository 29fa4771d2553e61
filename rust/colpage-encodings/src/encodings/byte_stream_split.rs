//! BYTE_STREAM_SPLIT encoding: the page is split into `width` streams, stream `b`
//! holding byte `b` of every value. Byte `b` of value `i` is at `b * stride + i`,
//! where `stride` is the number of values in the page.

use std::marker::PhantomData;

use bytes::Bytes;

use crate::{
    data_type::DataType,
    decoder::{Decoder, DecoderBase},
    value::FixedWidthValue,
};
use colpage_common::{Result, verify_data};
use colpage_format::{encoding::Encoding, schema::ColumnDescriptor};

pub struct ByteStreamSplitDecoder<'a, T: DataType>
where
    T::T: FixedWidthValue,
{
    base: DecoderBase<'a>,
    data: Bytes,
    width: usize,
    /// Number of values in the page data.
    stride: usize,
    /// Index of the next value.
    position: usize,
    scratch: Vec<u8>,
    _phantom: PhantomData<T>,
}

impl<'a, T: DataType> ByteStreamSplitDecoder<'a, T>
where
    T::T: FixedWidthValue,
{
    pub fn new(descr: &'a ColumnDescriptor) -> Self {
        let width = <T::T as FixedWidthValue>::SIZE.unwrap_or_else(|| descr.type_length());
        Self {
            base: DecoderBase::new(descr, Encoding::ByteStreamSplit),
            data: Bytes::new(),
            width,
            stride: 0,
            position: 0,
            scratch: vec![0; width],
            _phantom: PhantomData,
        }
    }
}

impl<'a, T: DataType> Decoder<'a, T> for ByteStreamSplitDecoder<'a, T>
where
    T::T: FixedWidthValue,
{
    fn base(&self) -> &DecoderBase<'a> {
        &self.base
    }

    fn set_data(&mut self, num_values: usize, data: Bytes) -> Result<()> {
        self.base.clear();
        verify_data!(width, self.width > 0);
        verify_data!(data, data.len() % self.width == 0);

        self.base.reset(num_values, data.len());
        self.stride = data.len() / self.width;
        self.position = 0;
        self.data = data;
        Ok(())
    }

    fn decode(&mut self, buffer: &mut [T::T]) -> Result<usize> {
        let count = buffer
            .len()
            .min(self.base.values_left())
            .min(self.stride - self.position);

        for (i, dst) in buffer[..count].iter_mut().enumerate() {
            let index = self.position + i;
            for (b, byte) in self.scratch.iter_mut().enumerate() {
                *byte = self.data[b * self.stride + index];
            }
            T::T::read_le(&self.scratch, dst);
        }

        self.position += count;
        self.base.consume(count);
        Ok(count)
    }

    fn skip(&mut self, num_values: usize) -> Result<usize> {
        let count = num_values
            .min(self.base.values_left())
            .min(self.stride - self.position);
        self.position += count;
        self.base.consume(count);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::ByteStreamSplitDecoder;
    use crate::{
        data_type::{DoubleType, FixedLenByteArrayType, FloatType, Int32Type},
        decoder::Decoder,
    };
    use bytes::Bytes;
    use colpage_bits::bitmap::ValidityBitmap;
    use colpage_common::error::ErrorKind;
    use colpage_format::{
        schema::{ColumnDescriptor, PhysicalType},
        values::FixedLenByteArray,
    };
    use colpage_testkit::{
        data_gen::{pack_validity, random_f64s},
        page_gen::{byte_stream_split_page, plain_page},
    };

    #[test]
    fn test_layout() {
        // Two floats, bytes [a0 a1 a2 a3] and [b0 b1 b2 b3], stored as a0 b0 a1 b1 ...
        let a = 1.5f32.to_le_bytes();
        let b = (-2.25f32).to_le_bytes();
        let page = [a[0], b[0], a[1], b[1], a[2], b[2], a[3], b[3]];

        let descr = ColumnDescriptor::new("f", PhysicalType::Float);
        let mut decoder = ByteStreamSplitDecoder::<FloatType>::new(&descr);
        decoder.set_data(2, Bytes::copy_from_slice(&page)).unwrap();
        let mut out = [0f32; 2];
        assert_eq!(decoder.decode(&mut out).unwrap(), 2);
        assert_eq!(out, [1.5, -2.25]);
    }

    #[test]
    fn test_doubles_in_batches() {
        let values = random_f64s(257);
        let page = byte_stream_split_page(&plain_page(&values), 8);
        let descr = ColumnDescriptor::new("d", PhysicalType::Double);
        let mut decoder = ByteStreamSplitDecoder::<DoubleType>::new(&descr);
        decoder.set_data(values.len(), page).unwrap();

        let mut out = vec![0f64; values.len()];
        let first = decoder.decode(&mut out[..100]).unwrap();
        assert_eq!(decoder.skip(7).unwrap(), 7);
        let rest = decoder.decode(&mut out[107..]).unwrap();
        assert_eq!(first + 7 + rest, values.len());
        assert_eq!(&out[..100], &values[..100]);
        assert_eq!(&out[107..], &values[107..]);
    }

    #[test]
    fn test_flba_spaced() {
        let dense: Vec<FixedLenByteArray> = (0u8..50)
            .map(|i| FixedLenByteArray::from(&[i, i + 1, i + 2][..]))
            .collect();
        let page = byte_stream_split_page(&plain_page(&dense), 3);
        let valid: Vec<bool> = (0..80).map(|i| !matches!(i % 8, 1 | 3 | 6)).collect();
        let (bits, null_count) = pack_validity(&valid);
        assert_eq!(null_count, 30);
        let bitmap = ValidityBitmap::new(&bits, 0);

        let descr =
            ColumnDescriptor::new("f", PhysicalType::FixedLenByteArray).with_type_length(3);
        let mut decoder = ByteStreamSplitDecoder::<FixedLenByteArrayType>::new(&descr);
        decoder.set_data(dense.len(), page).unwrap();
        let mut out = vec![FixedLenByteArray::default(); 80];
        decoder.decode_spaced(&mut out, null_count, &bitmap).unwrap();
        let non_null: Vec<_> = out
            .iter()
            .enumerate()
            .filter(|(i, _)| bitmap.is_valid(*i))
            .map(|(_, v)| v.clone())
            .collect();
        assert_eq!(non_null, dense);
    }

    #[test]
    fn test_invalid_page_size() {
        let descr = ColumnDescriptor::new("i", PhysicalType::Int32);
        let mut decoder = ByteStreamSplitDecoder::<Int32Type>::new(&descr);
        let page = byte_stream_split_page(&plain_page(&[1i32, 2]), 4);
        decoder.set_data(2, page).unwrap();
        let err = decoder
            .set_data(2, Bytes::from_static(&[0u8; 7]))
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidFormat { .. }));
        assert_eq!(decoder.values_left(), 0);
        let mut out = [0i32; 2];
        assert_eq!(decoder.decode(&mut out).unwrap(), 0);
    }

    #[test]
    fn test_page_holds_fewer_values() {
        let descr = ColumnDescriptor::new("i", PhysicalType::Int32);
        let page = byte_stream_split_page(&plain_page(&[1i32, 2]), 4);
        let mut decoder = ByteStreamSplitDecoder::<Int32Type>::new(&descr);
        decoder.set_data(3, page).unwrap();
        let mut out = [0i32; 3];
        assert_eq!(decoder.decode(&mut out).unwrap(), 2);
        assert_eq!(&out[..2], &[1, 2]);
        assert_eq!(decoder.values_left(), 1);
    }
}
