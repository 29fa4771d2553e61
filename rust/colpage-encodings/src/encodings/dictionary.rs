use crate::{
    data_type::DataType,
    decoder::{Decoder, DecoderBase},
    encodings::rle::RleDecoder,
};
use bytes::Bytes;
use colpage_common::{Result, error::Error, verify_arg, verify_data};
use colpage_format::{encoding::Encoding, schema::ColumnDescriptor};

/// Decoder for PLAIN_DICTIONARY and RLE_DICTIONARY data pages.
///
/// Each data page holds one byte with the index bit width followed by a hybrid
/// stream of indices into the dictionary, which is installed separately with
/// [`DictDecoder::set_dict`] from the column chunk's dictionary page.
///
/// A page referencing an entry outside the dictionary is dropped on the first
/// failed decode.
pub struct DictDecoder<'a, T: DataType> {
    base: DecoderBase<'a>,
    dictionary: Vec<T::T>,
    has_dictionary: bool,
    max_dictionary_len: Option<usize>,
    rle_decoder: Option<RleDecoder>,
}

impl<'a, T: DataType> DictDecoder<'a, T> {
    pub fn new(descr: &'a ColumnDescriptor) -> Self {
        Self::with_encoding(descr, Encoding::RleDictionary)
    }

    /// Creates a decoder reporting `encoding`, which must be a dictionary encoding.
    pub fn with_encoding(descr: &'a ColumnDescriptor, encoding: Encoding) -> Self {
        debug_assert!(encoding.is_dictionary());
        Self {
            base: DecoderBase::new(descr, encoding),
            dictionary: Vec::new(),
            has_dictionary: false,
            max_dictionary_len: None,
            rle_decoder: None,
        }
    }

    /// Limits the number of entries [`set_dict`](Self::set_dict) accepts.
    pub fn with_max_dictionary_len(mut self, max_len: Option<usize>) -> Self {
        self.max_dictionary_len = max_len;
        self
    }

    /// Decodes every remaining value of `decoder` into the dictionary, replacing
    /// any previous one.
    pub fn set_dict<'b, D>(&mut self, decoder: &mut D) -> Result<()>
    where
        D: Decoder<'b, T> + ?Sized,
    {
        let num_values = decoder.values_left();
        if let Some(max_len) = self.max_dictionary_len {
            verify_arg!(num_values, num_values <= max_len);
        }

        let mut dictionary = std::mem::take(&mut self.dictionary);
        dictionary.clear();
        dictionary.resize(num_values, T::T::default());
        let read = decoder.decode(&mut dictionary)?;
        if read != num_values {
            return Err(Error::decode_count_mismatch(num_values, read));
        }

        log::debug!(
            "installed dictionary of {} entries for column '{}'",
            num_values,
            self.base.descriptor().path()
        );
        self.dictionary = dictionary;
        self.has_dictionary = true;
        Ok(())
    }

    pub fn dictionary(&self) -> &[T::T] {
        &self.dictionary
    }
}

impl<'a, T: DataType> Decoder<'a, T> for DictDecoder<'a, T> {
    fn base(&self) -> &DecoderBase<'a> {
        &self.base
    }

    fn set_data(&mut self, num_values: usize, data: Bytes) -> Result<()> {
        self.base.clear();
        self.rle_decoder = None;
        let Some(&bit_width) = data.first() else {
            // A page without values may omit the bit width.
            verify_data!(data, num_values == 0);
            self.base.reset(0, 0);
            return Ok(());
        };
        verify_data!(bit_width, bit_width <= 32);

        self.base.reset(num_values, data.len());
        let mut rle_decoder = RleDecoder::new(bit_width);
        rle_decoder.set_data(data.slice(1..));
        self.rle_decoder = Some(rle_decoder);
        Ok(())
    }

    fn decode(&mut self, buffer: &mut [T::T]) -> Result<usize> {
        if !self.has_dictionary {
            return Err(Error::invalid_operation("decode before set_dict"));
        }
        let count = buffer.len().min(self.base.values_left());
        let Some(rle_decoder) = self.rle_decoder.as_mut() else {
            return Ok(0);
        };
        let result = rle_decoder.get_batch_with_dict(&self.dictionary, &mut buffer[..count]);
        let read = match result {
            Ok(read) => read,
            Err(e) => {
                self.base.clear();
                return Err(e);
            }
        };
        self.base.consume(read);
        Ok(read)
    }

    fn skip(&mut self, num_values: usize) -> Result<usize> {
        let count = num_values.min(self.base.values_left());
        let Some(rle_decoder) = self.rle_decoder.as_mut() else {
            return Ok(0);
        };
        let skipped = rle_decoder.skip(count)?;
        self.base.consume(skipped);
        Ok(skipped)
    }
}
