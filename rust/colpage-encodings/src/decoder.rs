use crate::{data_type::DataType, spaced};
use bytes::Bytes;
use colpage_bits::bitmap::ValidityBitmap;
use colpage_common::{Result, error::Error};
use colpage_format::{encoding::Encoding, schema::ColumnDescriptor};

/// Number of values decoded per step when skipping through a scratch buffer.
const SKIP_BATCH_SIZE: usize = 1024;

/// Page state shared by every decoder: the column it decodes, the encoding it
/// implements and the number of values left in the current page.
#[derive(Debug, Clone)]
pub struct DecoderBase<'a> {
    /// Type-specific metadata, e.g. the width of fixed-length byte arrays.
    descr: &'a ColumnDescriptor,
    encoding: Encoding,
    num_values: usize,
}

impl<'a> DecoderBase<'a> {
    pub fn new(descr: &'a ColumnDescriptor, encoding: Encoding) -> Self {
        Self {
            descr,
            encoding,
            num_values: 0,
        }
    }

    #[inline]
    pub fn descriptor(&self) -> &'a ColumnDescriptor {
        self.descr
    }

    #[inline]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    #[inline]
    pub fn values_left(&self) -> usize {
        self.num_values
    }

    /// Starts a new page of `num_values` values, `data_len` encoded bytes long.
    pub fn reset(&mut self, num_values: usize, data_len: usize) {
        log::trace!(
            "{} page for column '{}': {} values, {} bytes",
            self.encoding,
            self.descr.path(),
            num_values,
            data_len
        );
        self.num_values = num_values;
    }

    /// Drops the current page, e.g. after it turned out to be malformed. Until the
    /// next successful [`Decoder::set_data`] the decoder yields no values.
    #[inline]
    pub fn clear(&mut self) {
        self.num_values = 0;
    }

    /// Records that `count` values have been emitted from the current page.
    #[inline]
    pub fn consume(&mut self, count: usize) {
        debug_assert!(count <= self.num_values);
        self.num_values -= count;
    }
}

/// A decoder for the values of one column, encoded with one encoding.
///
/// A decoder borrows its column descriptor for `'a` and is reused across the
/// data pages of a column chunk. Page bytes are handed over as shared [`Bytes`],
/// so the caller may recycle its own page buffers between loads. Every
/// [`set_data`](Decoder::set_data) call discards whatever was left of the previous
/// page, and a load that fails leaves no page behind.
pub trait Decoder<'a, T: DataType>: Send {
    /// Page state shared by all decoders.
    fn base(&self) -> &DecoderBase<'a>;

    /// Sets the data for a new page, which holds `num_values` values.
    ///
    /// This resets all internal state; the number of values left becomes
    /// `num_values`. On error the number of values left is zero.
    fn set_data(&mut self, num_values: usize, data: Bytes) -> Result<()>;

    /// Decodes values into `buffer`, trying to fill it.
    ///
    /// Returns the number of values decoded, which equals `buffer.len()` unless the
    /// page has fewer values left, in which case it is the number left.
    fn decode(&mut self, buffer: &mut [T::T]) -> Result<usize>;

    /// Decodes values into `buffer`, leaving spaces for null entries.
    ///
    /// `buffer.len()` is the number of slots, including the `null_count` nulls.
    /// `valid_bits` marks non-null slots and must cover `buffer.len()` bits.
    /// Null slots keep the placeholders the caller put in the buffer.
    ///
    /// Returns `buffer.len()`. Fails with `DecodeCountMismatch` if the page holds
    /// fewer than `buffer.len() - null_count` values.
    fn decode_spaced(
        &mut self,
        buffer: &mut [T::T],
        null_count: usize,
        valid_bits: &ValidityBitmap<'_>,
    ) -> Result<usize> {
        let num_slots = buffer.len();
        let values_to_read = spaced::check_spaced_args(num_slots, null_count, valid_bits)?;

        let values_read = self.decode(&mut buffer[..values_to_read])?;
        if values_read != values_to_read {
            return Err(Error::decode_count_mismatch(values_to_read, values_read));
        }

        if null_count > 0 {
            spaced::spread_dense_values(buffer, values_read, valid_bits);
        }
        Ok(num_slots)
    }

    /// Skips up to `num_values` values, returning the number skipped.
    fn skip(&mut self, num_values: usize) -> Result<usize> {
        let to_skip = num_values.min(self.values_left());
        let mut scratch = vec![T::T::default(); to_skip.min(SKIP_BATCH_SIZE)];
        let mut skipped = 0;
        while skipped < to_skip {
            let batch = (to_skip - skipped).min(scratch.len());
            let read = self.decode(&mut scratch[..batch])?;
            if read == 0 {
                break;
            }
            skipped += read;
        }
        Ok(skipped)
    }

    /// Returns the number of values left in the current page.
    fn values_left(&self) -> usize {
        self.base().values_left()
    }

    /// Returns the encoding this decoder implements.
    fn encoding(&self) -> Encoding {
        self.base().encoding()
    }

    fn descriptor(&self) -> &'a ColumnDescriptor {
        self.base().descriptor()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{Decoder, DecoderBase};
    use crate::data_type::Int32Type;
    use bytes::Bytes;
    use colpage_bits::{bitmap::ValidityBitmap, bitpacking::pack_bools_to_bits};
    use colpage_common::{Result, error::ErrorKind};
    use colpage_format::{
        encoding::Encoding,
        schema::{ColumnDescriptor, PhysicalType},
    };

    /// Emits one `i32` per page byte and relies on the provided spaced decode.
    pub(crate) struct ByteValuesDecoder<'a> {
        base: DecoderBase<'a>,
        data: Bytes,
        pos: usize,
    }

    impl<'a> ByteValuesDecoder<'a> {
        pub(crate) fn new(descr: &'a ColumnDescriptor) -> Self {
            Self {
                base: DecoderBase::new(descr, Encoding::Plain),
                data: Bytes::new(),
                pos: 0,
            }
        }
    }

    impl<'a> Decoder<'a, Int32Type> for ByteValuesDecoder<'a> {
        fn base(&self) -> &DecoderBase<'a> {
            &self.base
        }

        fn set_data(&mut self, num_values: usize, data: Bytes) -> Result<()> {
            self.base.reset(num_values, data.len());
            self.data = data;
            self.pos = 0;
            Ok(())
        }

        fn decode(&mut self, buffer: &mut [i32]) -> Result<usize> {
            let count = buffer
                .len()
                .min(self.values_left())
                .min(self.data.len() - self.pos);
            for (dst, &b) in buffer.iter_mut().zip(&self.data[self.pos..self.pos + count]) {
                *dst = b as i32;
            }
            self.pos += count;
            self.base.consume(count);
            Ok(count)
        }
    }

    fn pack(valid: &[bool]) -> Vec<u8> {
        let mut bits = vec![0u8; valid.len().div_ceil(8)];
        pack_bools_to_bits(valid, &mut bits);
        bits
    }

    fn int32_column() -> ColumnDescriptor {
        ColumnDescriptor::new("c", PhysicalType::Int32)
    }

    #[test]
    fn test_decode_counts() {
        let descr = int32_column();
        let page: Vec<u8> = (0..10).collect();
        let mut decoder = ByteValuesDecoder::new(&descr);
        decoder.set_data(10, Bytes::copy_from_slice(&page)).unwrap();
        assert_eq!(decoder.values_left(), 10);

        let mut buffer = [0i32; 4];
        assert_eq!(decoder.decode(&mut buffer).unwrap(), 4);
        assert_eq!(buffer, [0, 1, 2, 3]);
        assert_eq!(decoder.values_left(), 6);

        let mut buffer = [0i32; 10];
        assert_eq!(decoder.decode(&mut buffer).unwrap(), 6);
        assert_eq!(&buffer[..6], &[4, 5, 6, 7, 8, 9]);
        assert_eq!(decoder.decode(&mut buffer[..1]).unwrap(), 0);
        assert_eq!(decoder.values_left(), 0);
    }

    #[test]
    fn test_set_data_resets_values_left() {
        let descr = int32_column();
        let page: Vec<u8> = (0..10).collect();
        let mut decoder = ByteValuesDecoder::new(&descr);
        decoder.set_data(10, Bytes::copy_from_slice(&page)).unwrap();
        let mut buffer = [0i32; 3];
        decoder.decode(&mut buffer).unwrap();
        assert_eq!(decoder.values_left(), 7);

        decoder.set_data(4, Bytes::copy_from_slice(&page[..4])).unwrap();
        assert_eq!(decoder.values_left(), 4);
        assert_eq!(decoder.decode(&mut buffer).unwrap(), 3);
        assert_eq!(buffer, [0, 1, 2]);
        assert_eq!(decoder.encoding(), Encoding::Plain);
        assert_eq!(decoder.descriptor().path(), "c");
    }

    #[test]
    fn test_default_decode_spaced() {
        let descr = int32_column();
        let page = [10u8, 11, 12];
        let mut decoder = ByteValuesDecoder::new(&descr);
        decoder.set_data(3, Bytes::copy_from_slice(&page)).unwrap();

        let bits = pack(&[true, false, true, false, true]);
        let mut buffer = [-1i32; 5];
        let filled = decoder
            .decode_spaced(&mut buffer, 2, &ValidityBitmap::new(&bits, 0))
            .unwrap();
        assert_eq!(filled, 5);
        assert_eq!(buffer, [10, -1, 11, -1, 12]);
        assert_eq!(decoder.values_left(), 0);
    }

    #[test]
    fn test_decode_spaced_exhausted_page() {
        let descr = int32_column();
        let page = [10u8, 11];
        let mut decoder = ByteValuesDecoder::new(&descr);
        decoder.set_data(2, Bytes::copy_from_slice(&page)).unwrap();

        let bits = pack(&[true, false, true, false, true]);
        let mut buffer = [-1i32; 5];
        let err = decoder
            .decode_spaced(&mut buffer, 2, &ValidityBitmap::new(&bits, 0))
            .unwrap_err();
        match err.kind() {
            ErrorKind::DecodeCountMismatch { expected, actual } => {
                assert_eq!(*expected, 3);
                assert_eq!(*actual, 2);
            }
            other => panic!("unexpected error {other:?}"),
        }
        // Only the safely decoded prefix was written.
        assert_eq!(buffer, [10, 11, -1, -1, -1]);
    }

    #[test]
    fn test_decode_spaced_without_nulls() {
        let descr = int32_column();
        let page: Vec<u8> = (0..=255).cycle().take(1000).collect();
        let mut decoder = ByteValuesDecoder::new(&descr);
        decoder.set_data(1000, Bytes::copy_from_slice(&page)).unwrap();

        let bits = vec![0xffu8; 125];
        let mut buffer = vec![0i32; 1000];
        decoder
            .decode_spaced(&mut buffer, 0, &ValidityBitmap::new(&bits, 0))
            .unwrap();
        let expected: Vec<i32> = page.iter().map(|&b| b as i32).collect();
        assert_eq!(buffer, expected);
    }

    #[test]
    fn test_decode_spaced_rejects_inconsistent_null_count() {
        let descr = int32_column();
        let page = [1u8, 2, 3];
        let mut decoder = ByteValuesDecoder::new(&descr);
        decoder.set_data(3, Bytes::copy_from_slice(&page)).unwrap();

        let bits = pack(&[true, false, true, false, true]);
        let mut buffer = [0i32; 5];
        let err = decoder
            .decode_spaced(&mut buffer, 1, &ValidityBitmap::new(&bits, 0))
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument { .. }));
        // Nothing was consumed.
        assert_eq!(decoder.values_left(), 3);
    }

    #[test]
    fn test_default_skip() {
        let descr = int32_column();
        let page: Vec<u8> = (0..=255).cycle().take(3000).collect();
        let mut decoder = ByteValuesDecoder::new(&descr);
        decoder.set_data(3000, Bytes::copy_from_slice(&page)).unwrap();

        assert_eq!(decoder.skip(2500).unwrap(), 2500);
        let mut buffer = [0i32; 1];
        decoder.decode(&mut buffer).unwrap();
        assert_eq!(buffer[0], page[2500] as i32);
        assert_eq!(decoder.skip(1000).unwrap(), 499);
        assert_eq!(decoder.values_left(), 0);
    }
}
