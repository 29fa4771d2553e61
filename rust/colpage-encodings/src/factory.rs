//! Creation of boxed decoders for a column and an encoding.

use crate::{
    config::DecoderConfig,
    data_type::DataType,
    decoder::Decoder,
    encodings::{
        byte_stream_split::ByteStreamSplitDecoder, delta::DeltaBitPackDecoder,
        dictionary::DictDecoder, plain::PlainDecoder, rle::RleValueDecoder,
    },
};
use bytes::Bytes;
use colpage_common::{Result, error::Error, verify_arg};
use colpage_format::{
    encoding::Encoding,
    schema::ColumnDescriptor,
    values::{FixedLenByteArray, Int96},
};

/// A boxed decoder borrowing its column descriptor for `'a`.
pub type BoxedDecoder<'a, T> = Box<dyn Decoder<'a, T> + 'a>;

/// Encodings a native value type can be decoded from.
///
/// Every type supports PLAIN. Types override [`make_decoder`](Self::make_decoder)
/// to add the encodings that apply to them.
pub trait DecoderSupport: Sized {
    fn make_decoder<'a, T>(descr: &'a ColumnDescriptor, encoding: Encoding) -> Result<BoxedDecoder<'a, T>>
    where
        T: DataType<T = Self>,
    {
        plain_or_unsupported::<T>(descr, encoding)
    }
}

fn plain_or_unsupported<'a, T: DataType>(
    descr: &'a ColumnDescriptor,
    encoding: Encoding,
) -> Result<BoxedDecoder<'a, T>> {
    match encoding {
        Encoding::Plain => Ok(Box::new(PlainDecoder::<T>::new(descr))),
        encoding if encoding.is_dictionary() => Err(Error::invalid_arg(
            "encoding",
            format!("{encoding} pages are decoded with get_dictionary_decoder"),
        )),
        encoding => Err(Error::unsupported(format!(
            "{encoding} encoding for {} columns",
            T::get_physical_type()
        ))),
    }
}

impl DecoderSupport for bool {
    fn make_decoder<'a, T>(descr: &'a ColumnDescriptor, encoding: Encoding) -> Result<BoxedDecoder<'a, T>>
    where
        T: DataType<T = bool>,
    {
        match encoding {
            Encoding::Rle => Ok(Box::new(RleValueDecoder::<T>::new(descr))),
            _ => plain_or_unsupported::<T>(descr, encoding),
        }
    }
}

macro_rules! impl_integer_decoder_support {
    ($($T:ty),*) => {
        $(
            impl DecoderSupport for $T {
                fn make_decoder<'a, T>(
                    descr: &'a ColumnDescriptor,
                    encoding: Encoding,
                ) -> Result<BoxedDecoder<'a, T>>
                where
                    T: DataType<T = $T>,
                {
                    match encoding {
                        Encoding::DeltaBinaryPacked => Ok(Box::new(DeltaBitPackDecoder::<T>::new(descr))),
                        Encoding::ByteStreamSplit => Ok(Box::new(ByteStreamSplitDecoder::<T>::new(descr))),
                        _ => plain_or_unsupported::<T>(descr, encoding),
                    }
                }
            }
        )*
    };
}

impl_integer_decoder_support!(i32, i64);

macro_rules! impl_byte_stream_split_support {
    ($($T:ty),*) => {
        $(
            impl DecoderSupport for $T {
                fn make_decoder<'a, T>(
                    descr: &'a ColumnDescriptor,
                    encoding: Encoding,
                ) -> Result<BoxedDecoder<'a, T>>
                where
                    T: DataType<T = $T>,
                {
                    match encoding {
                        Encoding::ByteStreamSplit => Ok(Box::new(ByteStreamSplitDecoder::<T>::new(descr))),
                        _ => plain_or_unsupported::<T>(descr, encoding),
                    }
                }
            }
        )*
    };
}

impl_byte_stream_split_support!(f32, f64, FixedLenByteArray);

impl DecoderSupport for Int96 {}

fn check_column<T: DataType>(descr: &ColumnDescriptor) -> Result<()> {
    verify_arg!(
        descr,
        descr.physical_type() == T::get_physical_type()
    );
    descr.validate()
}

/// Creates a decoder for data pages of `descr` written with a non-dictionary
/// `encoding`.
///
/// Fails with `Unsupported` when the encoding does not apply to the column's
/// physical type or is excluded by `config`, and with `InvalidArgument` when
/// `T` does not match the column or `encoding` is a dictionary encoding.
pub fn get_decoder<'a, T: DataType>(
    descr: &'a ColumnDescriptor,
    encoding: Encoding,
    config: &DecoderConfig,
) -> Result<BoxedDecoder<'a, T>> {
    check_column::<T>(descr)?;
    config.check_encoding(encoding)?;
    let decoder = <T::T as DecoderSupport>::make_decoder::<T>(descr, encoding)?;
    log::debug!(
        "created {} decoder for {} column '{}'",
        encoding,
        descr.physical_type(),
        descr.path()
    );
    Ok(decoder)
}

/// Creates a decoder for dictionary-encoded data pages of `descr`.
///
/// The dictionary is decoded from `dictionary_page`, a PLAIN-encoded page of
/// `num_dict_values` values, and owned by the returned decoder.
pub fn get_dictionary_decoder<'a, T: DataType>(
    descr: &'a ColumnDescriptor,
    encoding: Encoding,
    dictionary_page: Bytes,
    num_dict_values: usize,
    config: &DecoderConfig,
) -> Result<BoxedDecoder<'a, T>> {
    check_column::<T>(descr)?;
    verify_arg!(encoding, encoding.is_dictionary());
    config.check_encoding(encoding)?;

    let mut dictionary = PlainDecoder::<T>::new(descr);
    dictionary.set_data(num_dict_values, dictionary_page)?;
    let mut decoder = DictDecoder::<T>::with_encoding(descr, encoding)
        .with_max_dictionary_len(config.max_dictionary_len);
    decoder.set_dict(&mut dictionary)?;
    log::debug!(
        "created {} decoder for {} column '{}'",
        encoding,
        descr.physical_type(),
        descr.path()
    );
    Ok(Box::new(decoder))
}

#[cfg(test)]
mod tests {
    use super::{get_decoder, get_dictionary_decoder};
    use crate::{
        config::DecoderConfig,
        data_type::{
            BoolType, DataType, DoubleType, FixedLenByteArrayType, FloatType, Int32Type,
            Int64Type, Int96Type,
        },
    };
    use colpage_common::error::ErrorKind;
    use colpage_format::{
        encoding::Encoding,
        schema::{ColumnDescriptor, PhysicalType},
    };
    use colpage_testkit::{data_gen::low_cardinality_i32s, page_gen::dictionary_pages};

    fn column<T: DataType>() -> ColumnDescriptor {
        let descr = ColumnDescriptor::new("c", T::get_physical_type());
        if T::get_physical_type() == PhysicalType::FixedLenByteArray {
            descr.with_type_length(16)
        } else {
            descr
        }
    }

    fn supports<T: DataType>(encoding: Encoding) -> bool {
        let descr = column::<T>();
        match get_decoder::<T>(&descr, encoding, &DecoderConfig::default()) {
            Ok(decoder) => {
                assert_eq!(decoder.encoding(), encoding);
                assert_eq!(decoder.values_left(), 0);
                true
            }
            Err(e) => {
                assert!(
                    matches!(e.kind(), ErrorKind::Unsupported { .. }),
                    "{encoding}: {e}"
                );
                false
            }
        }
    }

    fn supported_encodings<T: DataType>() -> Vec<Encoding> {
        [
            Encoding::Plain,
            Encoding::Rle,
            Encoding::BitPacked,
            Encoding::DeltaBinaryPacked,
            Encoding::DeltaLengthByteArray,
            Encoding::DeltaByteArray,
            Encoding::ByteStreamSplit,
        ]
        .into_iter()
        .filter(|&encoding| supports::<T>(encoding))
        .collect()
    }

    #[test]
    fn test_supported_encodings() {
        use Encoding::*;
        assert_eq!(supported_encodings::<BoolType>(), vec![Plain, Rle]);
        assert_eq!(
            supported_encodings::<Int32Type>(),
            vec![Plain, DeltaBinaryPacked, ByteStreamSplit]
        );
        assert_eq!(
            supported_encodings::<Int64Type>(),
            vec![Plain, DeltaBinaryPacked, ByteStreamSplit]
        );
        assert_eq!(supported_encodings::<Int96Type>(), vec![Plain]);
        assert_eq!(
            supported_encodings::<FloatType>(),
            vec![Plain, ByteStreamSplit]
        );
        assert_eq!(
            supported_encodings::<DoubleType>(),
            vec![Plain, ByteStreamSplit]
        );
        assert_eq!(
            supported_encodings::<FixedLenByteArrayType>(),
            vec![Plain, ByteStreamSplit]
        );
    }

    #[test]
    fn test_invalid_requests() {
        let config = DecoderConfig::default();

        // Dictionary encodings need the dictionary page.
        let descr = column::<Int32Type>();
        let err = get_decoder::<Int32Type>(&descr, Encoding::RleDictionary, &config).err();
        assert!(matches!(
            err.as_ref().map(|e| e.kind()),
            Some(ErrorKind::InvalidArgument { .. })
        ));

        // Mismatched physical type.
        let err = get_decoder::<Int64Type>(&descr, Encoding::Plain, &config).err();
        assert!(matches!(
            err.as_ref().map(|e| e.kind()),
            Some(ErrorKind::InvalidArgument { .. })
        ));

        // Zero-width fixed-length column.
        let descr = ColumnDescriptor::new("f", PhysicalType::FixedLenByteArray);
        let err = get_decoder::<FixedLenByteArrayType>(&descr, Encoding::Plain, &config).err();
        assert!(matches!(
            err.as_ref().map(|e| e.kind()),
            Some(ErrorKind::InvalidArgument { .. })
        ));

        // Disabled by configuration.
        let descr = column::<DoubleType>();
        let config = config.with_disallowed_encodings(&[Encoding::ByteStreamSplit]);
        let err = get_decoder::<DoubleType>(&descr, Encoding::ByteStreamSplit, &config).err();
        assert!(matches!(
            err.as_ref().map(|e| e.kind()),
            Some(ErrorKind::Unsupported { .. })
        ));
    }

    #[test]
    fn test_dictionary_decoder() {
        let values = low_cardinality_i32s(300, 9);
        let pages = dictionary_pages(&values);
        let descr = column::<Int32Type>();
        let config = DecoderConfig::default();

        let mut decoder = get_dictionary_decoder::<Int32Type>(
            &descr,
            Encoding::PlainDictionary,
            pages.dictionary.clone(),
            pages.num_dict_values,
            &config,
        )
        .unwrap();
        assert_eq!(decoder.encoding(), Encoding::PlainDictionary);
        decoder.set_data(values.len(), pages.data.clone()).unwrap();
        let mut out = vec![0i32; values.len()];
        assert_eq!(decoder.decode(&mut out).unwrap(), values.len());
        assert_eq!(out, values);

        let err = get_dictionary_decoder::<Int32Type>(
            &descr,
            Encoding::Plain,
            pages.dictionary.clone(),
            pages.num_dict_values,
            &config,
        )
        .err();
        assert!(matches!(
            err.as_ref().map(|e| e.kind()),
            Some(ErrorKind::InvalidArgument { .. })
        ));

        let limited = config.with_max_dictionary_len(pages.num_dict_values - 1);
        let err = get_dictionary_decoder::<Int32Type>(
            &descr,
            Encoding::RleDictionary,
            pages.dictionary.clone(),
            pages.num_dict_values,
            &limited,
        )
        .err();
        assert!(matches!(
            err.as_ref().map(|e| e.kind()),
            Some(ErrorKind::InvalidArgument { .. })
        ));
    }
}
