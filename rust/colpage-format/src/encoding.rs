use colpage_common::{Result, error::Error};
use serde::{Deserialize, Serialize};

/// Wire-level encoding of the values in a data page.
///
/// The discriminants follow the Parquet thrift `Encoding` ids (id 1, the
/// pre-release `GROUP_VAR_INT`, was never written by any writer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum Encoding {
    Plain = 0,
    PlainDictionary = 2,
    Rle = 3,
    BitPacked = 4,
    DeltaBinaryPacked = 5,
    DeltaLengthByteArray = 6,
    DeltaByteArray = 7,
    RleDictionary = 8,
    ByteStreamSplit = 9,
}

impl Encoding {
    /// Returns `true` for encodings whose data pages hold dictionary indices.
    pub fn is_dictionary(&self) -> bool {
        matches!(self, Encoding::PlainDictionary | Encoding::RleDictionary)
    }
}

impl TryFrom<i32> for Encoding {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(Encoding::Plain),
            2 => Ok(Encoding::PlainDictionary),
            3 => Ok(Encoding::Rle),
            4 => Ok(Encoding::BitPacked),
            5 => Ok(Encoding::DeltaBinaryPacked),
            6 => Ok(Encoding::DeltaLengthByteArray),
            7 => Ok(Encoding::DeltaByteArray),
            8 => Ok(Encoding::RleDictionary),
            9 => Ok(Encoding::ByteStreamSplit),
            _ => Err(Error::invalid_format(
                "encoding",
                format!("unknown encoding id {value}"),
            )),
        }
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Encoding::Plain => "PLAIN",
            Encoding::PlainDictionary => "PLAIN_DICTIONARY",
            Encoding::Rle => "RLE",
            Encoding::BitPacked => "BIT_PACKED",
            Encoding::DeltaBinaryPacked => "DELTA_BINARY_PACKED",
            Encoding::DeltaLengthByteArray => "DELTA_LENGTH_BYTE_ARRAY",
            Encoding::DeltaByteArray => "DELTA_BYTE_ARRAY",
            Encoding::RleDictionary => "RLE_DICTIONARY",
            Encoding::ByteStreamSplit => "BYTE_STREAM_SPLIT",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::Encoding;

    #[test]
    fn test_encoding_ids() {
        assert_eq!(Encoding::try_from(8).unwrap(), Encoding::RleDictionary);
        assert_eq!(Encoding::try_from(0).unwrap(), Encoding::Plain);
        assert!(Encoding::try_from(1).is_err());
        assert!(Encoding::try_from(10).is_err());
        assert_eq!(
            Encoding::try_from(Encoding::ByteStreamSplit as i32).unwrap(),
            Encoding::ByteStreamSplit
        );
    }

    #[test]
    fn test_dictionary_encodings() {
        assert!(Encoding::PlainDictionary.is_dictionary());
        assert!(Encoding::RleDictionary.is_dictionary());
        assert!(!Encoding::Rle.is_dictionary());
        assert_eq!(Encoding::RleDictionary.to_string(), "RLE_DICTIONARY");
    }
}
